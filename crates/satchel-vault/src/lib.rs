//! # satchel-vault
//!
//! Storage-facing half of satchel: the storage adapter contract, the
//! engines that act through it, and the host bindings.
//!
//! - [`Storage`] — the adapter trait, with [`LocalStorage`] (real file
//!   system) and [`MemoryStorage`] (deterministic test double)
//! - [`relocate`] — rename propagation for attachment folders and files
//! - [`intake`] — placement of newly created attachments
//! - [`VaultHandler`] — event orchestration plus settings persistence
//! - [`VaultWatcher`] — notify-based event source
//!
//! All engines are plain functions over the [`Storage`] trait so the
//! event-subscription layer stays a thin adapter.

pub mod handler;
pub mod intake;
pub mod link;
pub mod relocate;
pub mod storage;
pub mod store;
pub mod watcher;

pub use handler::VaultHandler;
pub use intake::{ActiveDocument, Intake, IntakeSkip};
pub use relocate::{Relocation, RenameEvent, SkipReason};
pub use storage::{Listing, LocalStorage, MemoryStorage, Storage, StorageError};
pub use store::SettingsStore;
pub use watcher::{VaultEvent, VaultWatcher};
