use std::path::PathBuf;

use serde::Serialize;
use tokio::sync::{mpsc, watch};

use crate::error::AppError;
use crate::models::file_entry::FileEntry;
use crate::services::extension_service;
use crate::services::grant_service::GrantStore;
use crate::services::scanner_service::{self, DirectoryLister, FsLister};
use crate::services::settings_service::SettingsStore;

pub const WATCHED_FOLDER_KEY: &str = "watchedFolder";
pub const WATCHED_EXTENSION_KEY: &str = "watchedExtension";
pub const DEFAULT_EXTENSION: &str = ".TiVo";
pub const FOLDER_PLACEHOLDER: &str = "Select folder to watch...";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WatchPhase {
    Uninitialized,
    FolderUnset,
    FolderSet,
}

/// User actions the UI feeds into the watch task. Processed strictly one at
/// a time; a cancelled folder pick never produces a command at all.
#[derive(Debug)]
pub enum WatchCommand {
    PickFolder(PathBuf),
    ConfirmExtension(String),
    Rescan,
    SetFlag { index: usize, flagged: bool },
}

/// Read-only view handed to the UI after every processed command.
#[derive(Debug, Clone, Serialize)]
pub struct WatchSnapshot {
    pub folder_path: String,
    pub extension: String,
    pub phase: WatchPhase,
    pub files: Vec<FileEntry>,
}

/// Coordinates folder selection, the extension filter, and the derived file
/// list. Owns the list exclusively; everything observable leaves as a
/// snapshot. Folder and filesystem failures degrade to "no change" here,
/// they never escape.
pub struct WatchState {
    settings: SettingsStore,
    grants: GrantStore,
    lister: Box<dyn DirectoryLister>,
    folder: Option<PathBuf>,
    extension: String,
    files: Vec<FileEntry>,
    phase: WatchPhase,
}

impl WatchState {
    pub fn new(settings: SettingsStore, grants: GrantStore) -> Self {
        Self::with_lister(settings, grants, Box::new(FsLister))
    }

    pub fn with_lister(
        settings: SettingsStore,
        grants: GrantStore,
        lister: Box<dyn DirectoryLister>,
    ) -> Self {
        Self {
            settings,
            grants,
            lister,
            folder: None,
            extension: DEFAULT_EXTENSION.to_string(),
            files: Vec::new(),
            phase: WatchPhase::Uninitialized,
        }
    }

    /// Restores the persisted folder token and extension filter. A token
    /// that no longer resolves leaves the folder unset with an empty list;
    /// the user re-picks from there.
    pub fn load(&mut self) {
        let token = self.settings.get_raw(WATCHED_FOLDER_KEY);
        self.extension = self
            .settings
            .get(WATCHED_EXTENSION_KEY, DEFAULT_EXTENSION.to_string());
        match self.grants.resolve(token.as_deref()) {
            Some(folder) => {
                tracing::debug!(path = %folder.display(), "restored watched folder");
                self.folder = Some(folder);
                self.phase = WatchPhase::FolderSet;
                self.rescan();
            }
            None => {
                self.folder = None;
                self.phase = WatchPhase::FolderUnset;
                self.files.clear();
            }
        }
    }

    /// Accepts a folder the picker already validated. The fresh grant token
    /// overwrites the previous one under the same settings key, so at most
    /// one persisted token exists at any time.
    pub fn pick_folder(&mut self, folder: PathBuf) {
        tracing::debug!(path = %folder.display(), "picked folder");
        match self.grants.grant(&folder, WATCHED_FOLDER_KEY) {
            Ok(token) => self.settings.set(WATCHED_FOLDER_KEY, token),
            Err(e) => tracing::warn!(error = %e, "failed to persist folder grant"),
        }
        self.folder = Some(folder);
        self.phase = WatchPhase::FolderSet;
        self.rescan();
    }

    /// Normalizes the typed extension and, only if it differs from the
    /// persisted value, stores it and rescans. Re-confirming an unchanged
    /// value is a no-op.
    pub fn confirm_extension(&mut self, raw: &str) {
        let normalized = extension_service::normalize(raw);
        let previous = self
            .settings
            .get(WATCHED_EXTENSION_KEY, DEFAULT_EXTENSION.to_string());
        if normalized == previous {
            return;
        }
        self.settings.set(WATCHED_EXTENSION_KEY, normalized.as_str());
        self.extension = normalized;
        self.rescan();
    }

    /// Rebuilds the file list from scratch. Entries are recreated, never
    /// updated, so any per-item flags are reset.
    pub fn rescan(&mut self) {
        let Some(folder) = self.folder.clone() else {
            tracing::debug!("rescan skipped, no watched folder");
            return;
        };
        let files = scanner_service::scan(self.lister.as_ref(), &folder, &self.extension);
        tracing::debug!(count = files.len(), path = %folder.display(), "rescan complete");
        self.files = files;
    }

    /// Toggles one entry's checkbox flag. Out-of-range indices are ignored;
    /// the list may have been rebuilt since the UI rendered.
    pub fn set_flagged(&mut self, index: usize, flagged: bool) {
        if let Some(entry) = self.files.get_mut(index) {
            tracing::debug!(name = %entry.name, flagged, "checkbox changed");
            entry.flagged = flagged;
        }
    }

    pub fn apply(&mut self, command: WatchCommand) {
        match command {
            WatchCommand::PickFolder(folder) => self.pick_folder(folder),
            WatchCommand::ConfirmExtension(raw) => self.confirm_extension(&raw),
            WatchCommand::Rescan => self.rescan(),
            WatchCommand::SetFlag { index, flagged } => self.set_flagged(index, flagged),
        }
    }

    pub fn phase(&self) -> WatchPhase {
        self.phase
    }

    pub fn extension(&self) -> &str {
        &self.extension
    }

    pub fn files(&self) -> &[FileEntry] {
        &self.files
    }

    pub fn folder_display(&self) -> String {
        match &self.folder {
            Some(folder) => folder.display().to_string(),
            None => FOLDER_PLACEHOLDER.to_string(),
        }
    }

    pub fn snapshot(&self) -> WatchSnapshot {
        WatchSnapshot {
            folder_path: self.folder_display(),
            extension: self.extension.clone(),
            phase: self.phase,
            files: self.files.clone(),
        }
    }
}

/// Handle the UI side holds: send commands in, read snapshots out.
pub struct WatchHandle {
    commands: mpsc::Sender<WatchCommand>,
    snapshots: watch::Receiver<WatchSnapshot>,
}

impl WatchHandle {
    pub async fn dispatch(&self, command: WatchCommand) -> Result<(), AppError> {
        self.commands
            .send(command)
            .await
            .map_err(|_| AppError::General("watch task is not running".to_string()))
    }

    pub fn snapshot(&self) -> WatchSnapshot {
        self.snapshots.borrow().clone()
    }

    /// Waits until the watch task publishes the next snapshot.
    pub async fn changed(&mut self) -> Result<(), AppError> {
        self.snapshots
            .changed()
            .await
            .map_err(|_| AppError::General("watch task is not running".to_string()))
    }
}

/// Moves `state` onto its own task. Commands are drained from the queue one
/// at a time, so a pick, an extension change, and the rescans they trigger
/// can never overlap. A snapshot is published after every command, even a
/// no-op, so waiters always wake.
pub fn spawn(mut state: WatchState) -> WatchHandle {
    let (commands, mut queue) = mpsc::channel::<WatchCommand>(16);
    let (publisher, snapshots) = watch::channel(state.snapshot());
    tokio::spawn(async move {
        while let Some(command) = queue.recv().await {
            state.apply(command);
            if publisher.send(state.snapshot()).is_err() {
                break;
            }
        }
    });
    WatchHandle { commands, snapshots }
}
