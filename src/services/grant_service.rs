use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};

use rusqlite::Connection;

use crate::data::repository::{self, GrantRecord};
use crate::error::AppError;

/// Persistent directory-access grants. A grant maps an opaque token to a
/// directory path so the folder can be reopened on the next run without
/// asking the user again. Tokens may go stale: the grant row can be revoked
/// or the directory can disappear, so validity is checked on every resolve.
#[derive(Clone)]
pub struct GrantStore {
    db: Arc<Mutex<Connection>>,
}

impl GrantStore {
    pub fn new(db: Arc<Mutex<Connection>>) -> Self {
        Self { db }
    }

    fn conn(&self) -> MutexGuard<'_, Connection> {
        self.db.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Records a grant for `path` and returns its token. Any previous grant
    /// stored under the same hint key is dropped first, so a hint key holds
    /// at most one live grant.
    pub fn grant(&self, path: &Path, hint_key: &str) -> Result<String, AppError> {
        let token = uuid::Uuid::new_v4().to_string();
        let record = GrantRecord {
            token: token.clone(),
            path: path.to_string_lossy().to_string(),
            hint_key: Some(hint_key.to_string()),
        };
        let conn = self.conn();
        repository::delete_grants_by_hint(&conn, hint_key)?;
        repository::insert_grant(&conn, &record, &chrono::Utc::now().to_rfc3339())?;
        Ok(token)
    }

    pub fn has_grant(&self, token: &str) -> bool {
        matches!(repository::get_grant(&self.conn(), token), Ok(Some(_)))
    }

    /// Resolves a token to its directory, or `None` when the token is
    /// absent, the grant was revoked, or the directory is no longer
    /// accessible. Never yields a half-resolved folder.
    pub fn resolve(&self, token: Option<&str>) -> Option<PathBuf> {
        let Some(token) = token else {
            tracing::debug!("no persisted folder token");
            return None;
        };
        let record = match repository::get_grant(&self.conn(), token) {
            Ok(Some(record)) => record,
            Ok(None) => {
                tracing::debug!("access grant missing, folder access revoked or expired");
                return None;
            }
            Err(e) => {
                tracing::warn!(error = %e, "access grant lookup failed");
                return None;
            }
        };
        let path = PathBuf::from(record.path);
        if path.is_dir() {
            Some(path)
        } else {
            tracing::warn!(path = %path.display(), "granted folder is no longer accessible");
            None
        }
    }

    pub fn revoke(&self, token: &str) -> Result<(), AppError> {
        repository::delete_grant(&self.conn(), token)?;
        Ok(())
    }
}
