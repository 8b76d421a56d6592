//! satchel CLI — attachment path management for markdown vaults
//!
//! Commands: watch, resolve, rename, intake, override, config

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use chrono::Utc;
use clap::{Parser, Subcommand, ValueEnum};
use tracing::warn;
use tracing_subscriber::EnvFilter;

use satchel_core::overrides::resolve_setting;
use satchel_core::template::{resolve_attachment_folder, resolve_attachment_name};
use satchel_core::{vpath, AttachmentPathSettings, SaveMode, ScopeType, SettingLookup};
use satchel_vault::{
    ActiveDocument, Intake, LocalStorage, Relocation, SettingsStore, Storage, VaultEvent,
    VaultHandler, VaultWatcher,
};

#[derive(Parser)]
#[command(name = "satchel")]
#[command(version)]
#[command(about = "Attachment path management for markdown vaults")]
struct Cli {
    /// Vault root directory
    #[arg(long, global = true, default_value = ".")]
    vault: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Watch the vault and react to create and rename events
    Watch {
        /// Note that newly created attachments are attributed to
        #[arg(long)]
        active_note: Option<String>,
    },
    /// Print the attachment folder and file name resolved for a note
    Resolve { note: String },
    /// Move a note or folder and propagate the rename to attachments
    Rename { old: String, new: String },
    /// Take in a created file as an attachment of a note
    Intake {
        file: String,
        /// The note the attachment belongs to
        #[arg(long)]
        note: String,
    },
    /// Manage per-path setting overrides
    #[command(subcommand)]
    Override(OverrideCommands),
    /// Print the effective settings
    Config,
}

#[derive(Subcommand)]
enum OverrideCommands {
    /// Override the attachment setting for a file or folder
    Set {
        path: String,
        #[arg(long)]
        root: Option<String>,
        #[arg(long, value_enum)]
        save_mode: Option<SaveModeArg>,
        #[arg(long)]
        path_template: Option<String>,
        #[arg(long)]
        name_format: Option<String>,
    },
    /// Remove the override for a file or folder
    Reset { path: String },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum SaveModeArg {
    FixedFolder,
    NextToNote,
    VaultDefault,
}

impl From<SaveModeArg> for SaveMode {
    fn from(arg: SaveModeArg) -> Self {
        match arg {
            SaveModeArg::FixedFolder => SaveMode::FixedFolder,
            SaveModeArg::NextToNote => SaveMode::NextToNote,
            SaveModeArg::VaultDefault => SaveMode::VaultDefault,
        }
    }
}

/// Active-document accessor over a note file on disk. Writes are buffered
/// and flushed by the caller so failures surface as command errors.
struct FileDocument {
    path: PathBuf,
    content: String,
    dirty: bool,
}

impl FileDocument {
    fn open(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("cannot read note {}", path.display()))?;
        Ok(Self {
            path: path.to_path_buf(),
            content,
            dirty: false,
        })
    }

    fn flush(&self) -> Result<()> {
        if self.dirty {
            fs::write(&self.path, &self.content)
                .with_context(|| format!("cannot write note {}", self.path.display()))?;
        }
        Ok(())
    }
}

impl ActiveDocument for FileDocument {
    fn content(&self) -> String {
        self.content.clone()
    }

    fn set_content(&mut self, content: String) {
        self.content = content;
        self.dirty = true;
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let storage = LocalStorage::new(&cli.vault);
    let store = SettingsStore::new(cli.vault.join(".satchel").join("settings.json"));
    let mut handler = VaultHandler::new(storage, store)?;

    match cli.command {
        Commands::Watch { active_note } => watch(&cli.vault, &mut handler, active_note.as_deref()),
        Commands::Resolve { note } => {
            resolve(&handler, &note);
            Ok(())
        }
        Commands::Rename { old, new } => rename(&cli.vault, &mut handler, &old, &new),
        Commands::Intake { file, note } => intake(&cli.vault, &handler, &file, &note),
        Commands::Override(cmd) => override_cmd(&cli.vault, &mut handler, cmd),
        Commands::Config => {
            let json = serde_json::to_string_pretty(handler.settings())?;
            println!("{json}");
            Ok(())
        }
    }
}

fn resolve(handler: &VaultHandler<LocalStorage>, note: &str) {
    let settings = handler.settings();
    match resolve_setting(settings, note) {
        SettingLookup::Excluded => println!("{note}: excluded from attachment handling"),
        SettingLookup::Resolved {
            setting,
            used_override,
        } => {
            let stem = vpath::stem(note);
            let folder = resolve_attachment_folder(
                stem,
                vpath::parent(note),
                &setting,
                &settings.vault_attachment_dir,
            );
            let name = resolve_attachment_name(
                stem,
                "original",
                &setting,
                &settings.date_format,
                Utc::now(),
            );
            println!("attachment folder: {folder}");
            println!("attachment name:   {name}");
            if used_override {
                println!("(per-path override active)");
            }
        }
    }
}

fn rename(
    vault: &Path,
    handler: &mut VaultHandler<LocalStorage>,
    old: &str,
    new: &str,
) -> Result<()> {
    let is_folder = handler.storage().resolve(old).is_dir();
    handler
        .storage()
        .rename(old, new)
        .with_context(|| format!("cannot move {old} to {new}"))?;
    report_relocation(&handler.on_rename(new, old, is_folder)?);
    if is_folder {
        propagate_descendants(handler, vault, old, new)?;
    }
    Ok(())
}

/// The host delivers one rename event per descendant of a renamed folder;
/// replay that contract for a manual folder move.
fn propagate_descendants(
    handler: &mut VaultHandler<LocalStorage>,
    vault: &Path,
    old: &str,
    new: &str,
) -> Result<()> {
    let abs = vault.join(new);
    for entry in fs::read_dir(&abs).with_context(|| format!("cannot list {new}"))? {
        let entry = entry?;
        let name = entry.file_name().to_string_lossy().into_owned();
        let child_old = format!("{old}/{name}");
        let child_new = format!("{new}/{name}");
        let child_is_folder = entry.file_type()?.is_dir();
        report_relocation(&handler.on_rename(&child_new, &child_old, child_is_folder)?);
        if child_is_folder {
            propagate_descendants(handler, vault, &child_old, &child_new)?;
        }
    }
    Ok(())
}

fn intake(vault: &Path, handler: &VaultHandler<LocalStorage>, file: &str, note: &str) -> Result<()> {
    let mut doc = FileDocument::open(&vault.join(note))?;
    let outcome = handler.on_create(file, Some(note), None, Utc::now(), Some(&mut doc))?;
    doc.flush()?;
    match outcome {
        Intake::Moved {
            from,
            dest,
            link_updated,
        } => {
            println!("moved {from} to {dest}");
            if link_updated {
                println!("updated 1 link in {note}");
            }
        }
        Intake::Skipped(reason) => println!("skipped: {reason:?}"),
    }
    Ok(())
}

fn override_cmd(
    vault: &Path,
    handler: &mut VaultHandler<LocalStorage>,
    cmd: OverrideCommands,
) -> Result<()> {
    match cmd {
        OverrideCommands::Set {
            path,
            root,
            save_mode,
            path_template,
            name_format,
        } => {
            let scope = if vault.join(&path).is_dir() {
                ScopeType::Folder
            } else {
                ScopeType::File
            };
            // start from whatever currently applies, like the host's
            // override editor does
            let base = match resolve_setting(handler.settings(), &path) {
                SettingLookup::Resolved { setting, .. } => setting,
                SettingLookup::Excluded => AttachmentPathSettings::default(),
            };
            let setting = AttachmentPathSettings {
                attachment_root: root.unwrap_or(base.attachment_root),
                save_mode: save_mode.map_or(base.save_mode, SaveMode::from),
                attachment_path: path_template.unwrap_or(base.attachment_path),
                attach_format: name_format.unwrap_or(base.attach_format),
                scope,
                extension_overrides: base.extension_overrides,
            };
            handler.set_override(&path, setting)?;
            println!("override set for {path}");
        }
        OverrideCommands::Reset { path } => {
            if handler.reset_override(&path)? {
                println!("reset attachment setting of {path}");
            } else {
                println!("no override set for {path}");
            }
        }
    }
    Ok(())
}

fn watch(
    vault: &Path,
    handler: &mut VaultHandler<LocalStorage>,
    active_note: Option<&str>,
) -> Result<()> {
    let watcher = VaultWatcher::start(vault)?;
    println!("watching {} (ctrl-c to stop)", vault.display());
    loop {
        let Some(event) = watcher.recv_timeout(Duration::from_millis(250)) else {
            continue;
        };
        match event {
            VaultEvent::Created { path } => {
                let age = fs::metadata(vault.join(&path))
                    .and_then(|m| m.modified())
                    .ok()
                    .and_then(|t| t.elapsed().ok());
                let mut doc = match active_note {
                    Some(note) => match FileDocument::open(&vault.join(note)) {
                        Ok(doc) => Some(doc),
                        Err(err) => {
                            warn!("cannot open active note: {err}");
                            None
                        }
                    },
                    None => None,
                };
                let outcome = handler.on_create(
                    &path,
                    active_note,
                    age,
                    Utc::now(),
                    doc.as_mut().map(|d| d as &mut dyn ActiveDocument),
                );
                match outcome {
                    Ok(Intake::Moved { from, dest, .. }) => println!("moved {from} to {dest}"),
                    Ok(Intake::Skipped(_)) => {}
                    Err(err) => warn!("intake failed for {path}: {err}"),
                }
                if let Some(doc) = doc {
                    if let Err(err) = doc.flush() {
                        warn!("{err}");
                    }
                }
            }
            VaultEvent::Renamed {
                old_path,
                new_path,
                is_folder,
            } => match handler.on_rename(&new_path, &old_path, is_folder) {
                Ok(outcome) => report_relocation(&outcome),
                Err(err) => warn!("rename propagation failed for {new_path}: {err}"),
            },
        }
    }
}

fn report_relocation(outcome: &Relocation) {
    match outcome {
        Relocation::Completed {
            folder_move,
            file_moves,
        } => {
            if let Some((src, dst)) = folder_move {
                println!("moved attachment folder {src} to {dst}");
            }
            for (src, dst) in file_moves {
                println!("renamed attachment {src} to {dst}");
            }
        }
        Relocation::Conflict { dest, .. } => println!("conflict: {dest} already exists"),
        Relocation::Skipped(_) => {}
    }
}
