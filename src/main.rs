use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use anyhow::Context;
use tracing_subscriber::EnvFilter;

use tivowatch::services::grant_service::GrantStore;
use tivowatch::services::settings_service::SettingsStore;
use tivowatch::services::watch_service::{self, WatchCommand, WatchState};

/// Headless stand-in for the UI shell: restores persisted state, optionally
/// applies a picked folder and a confirmed extension from the command line,
/// then prints the resulting snapshot.
///
/// Usage: tivowatch [FOLDER [EXTENSION]]
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let (conn, db_path) = tivowatch::init_db().context("open settings database")?;
    tracing::debug!(path = %db_path.display(), "settings database");
    let db = Arc::new(Mutex::new(conn));

    let mut state = WatchState::new(SettingsStore::new(db.clone()), GrantStore::new(db));
    state.load();
    let mut handle = watch_service::spawn(state);

    let mut args = std::env::args().skip(1);
    match args.next() {
        // a folder argument plays the role of a completed picker dialog
        Some(folder) => {
            handle
                .dispatch(WatchCommand::PickFolder(PathBuf::from(folder)))
                .await?;
            handle.changed().await?;
        }
        // no argument behaves like a cancelled dialog: no state change
        None => tracing::debug!("no folder argument, keeping persisted selection"),
    }

    if let Some(raw) = args.next() {
        handle
            .dispatch(WatchCommand::ConfirmExtension(raw))
            .await?;
        handle.changed().await?;
    }

    println!("{}", serde_json::to_string_pretty(&handle.snapshot())?);
    Ok(())
}
