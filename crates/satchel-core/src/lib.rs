//! # satchel-core
//!
//! Pure logic for attachment path management in a markdown vault.
//!
//! This crate owns everything that can be computed without touching storage:
//! - [`Settings`] / [`AttachmentPathSettings`] — the layered configuration model
//! - [`template`] — attachment folder and filename resolution from templates
//! - [`overrides`] — most-specific-wins configuration lookup
//! - [`rename`] — rename classification and minimal folder-rename computation
//! - [`vpath`] — vault-relative path string helpers
//! - Error hierarchy ([`SatchelError`], [`ValidationError`])
//!
//! The storage-facing engines live in `satchel-vault`; this crate never
//! performs I/O.

pub mod error;
pub mod kind;
pub mod overrides;
pub mod rename;
pub mod settings;
pub mod template;
pub mod vpath;

pub use error::{Result, SatchelError, ValidationError};
pub use overrides::SettingLookup;
pub use rename::{AttachScope, RenameKind};
pub use settings::{AttachmentPathSettings, ExtensionOverride, SaveMode, ScopeType, Settings};
