use std::str::FromStr;
use std::sync::{Arc, Mutex, MutexGuard};

use rusqlite::Connection;

use crate::data::repository;

/// Typed view over the persisted `settings` table. Constructed explicitly
/// and passed to whoever needs it; there is no global instance.
#[derive(Clone)]
pub struct SettingsStore {
    db: Arc<Mutex<Connection>>,
}

impl SettingsStore {
    pub fn new(db: Arc<Mutex<Connection>>) -> Self {
        Self { db }
    }

    fn conn(&self) -> MutexGuard<'_, Connection> {
        self.db.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Reads `key` as a `T`. An absent key, a database error, or a stored
    /// value that does not parse as `T` all yield `default`; none of these
    /// conditions propagate.
    pub fn get<T: FromStr>(&self, key: &str, default: T) -> T {
        match self.get_raw(key) {
            Some(raw) => raw.parse().unwrap_or(default),
            None => default,
        }
    }

    pub fn get_raw(&self, key: &str) -> Option<String> {
        match repository::get_setting(&self.conn(), key) {
            Ok(value) => value,
            Err(e) => {
                tracing::warn!(key, error = %e, "settings read failed, using default");
                None
            }
        }
    }

    pub fn set<T: ToString>(&self, key: &str, value: T) {
        if let Err(e) = repository::set_setting(&self.conn(), key, &value.to_string()) {
            tracing::warn!(key, error = %e, "settings write failed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::migrations;

    fn test_store() -> SettingsStore {
        let conn = Connection::open_in_memory().unwrap();
        migrations::run_migrations(&conn).unwrap();
        SettingsStore::new(Arc::new(Mutex::new(conn)))
    }

    #[test]
    fn test_absent_key_yields_default() {
        let store = test_store();
        assert_eq!(
            store.get("watchedExtension", ".TiVo".to_string()),
            ".TiVo"
        );
        assert!(store.get_raw("watchedFolder").is_none());
    }

    #[test]
    fn test_set_then_get_roundtrip() {
        let store = test_store();
        store.set("watchedExtension", ".mp4");
        assert_eq!(
            store.get("watchedExtension", ".TiVo".to_string()),
            ".mp4"
        );
    }

    #[test]
    fn test_unparseable_value_falls_back_to_default() {
        let store = test_store();
        store.set("scanLimit", "not a number");
        assert_eq!(store.get("scanLimit", 25_i64), 25);

        store.set("scanLimit", 100_i64);
        assert_eq!(store.get("scanLimit", 25_i64), 100);
    }

    #[test]
    fn test_set_overwrites_previous_value() {
        let store = test_store();
        store.set("watchedFolder", "token-a");
        store.set("watchedFolder", "token-b");
        assert_eq!(store.get_raw("watchedFolder").as_deref(), Some("token-b"));
    }
}
