use rusqlite::{params, Connection, OptionalExtension};

use crate::error::AppError;

pub fn get_setting(conn: &Connection, key: &str) -> Result<Option<String>, AppError> {
    let value = conn
        .query_row(
            "SELECT value FROM settings WHERE key = ?1",
            params![key],
            |row| row.get(0),
        )
        .optional()?;
    Ok(value)
}

pub fn set_setting(conn: &Connection, key: &str, value: &str) -> Result<(), AppError> {
    conn.execute(
        "INSERT INTO settings (key, value) VALUES (?1, ?2)
         ON CONFLICT(key) DO UPDATE SET value = excluded.value",
        params![key, value],
    )?;
    Ok(())
}

#[derive(Debug, Clone)]
pub struct GrantRecord {
    pub token: String,
    pub path: String,
    pub hint_key: Option<String>,
}

pub fn insert_grant(conn: &Connection, record: &GrantRecord, granted_at: &str) -> Result<(), AppError> {
    conn.execute(
        "INSERT OR REPLACE INTO access_grants (token, path, hint_key, granted_at)
         VALUES (?1, ?2, ?3, ?4)",
        params![record.token, record.path, record.hint_key, granted_at],
    )?;
    Ok(())
}

pub fn get_grant(conn: &Connection, token: &str) -> Result<Option<GrantRecord>, AppError> {
    let record = conn
        .query_row(
            "SELECT token, path, hint_key FROM access_grants WHERE token = ?1",
            params![token],
            |row| {
                Ok(GrantRecord {
                    token: row.get(0)?,
                    path: row.get(1)?,
                    hint_key: row.get(2)?,
                })
            },
        )
        .optional()?;
    Ok(record)
}

pub fn delete_grant(conn: &Connection, token: &str) -> Result<usize, AppError> {
    let count = conn.execute(
        "DELETE FROM access_grants WHERE token = ?1",
        params![token],
    )?;
    Ok(count)
}

pub fn delete_grants_by_hint(conn: &Connection, hint_key: &str) -> Result<usize, AppError> {
    let count = conn.execute(
        "DELETE FROM access_grants WHERE hint_key = ?1",
        params![hint_key],
    )?;
    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::migrations;

    fn test_conn() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        migrations::run_migrations(&conn).unwrap();
        conn
    }

    #[test]
    fn test_setting_roundtrip() {
        let conn = test_conn();
        assert!(get_setting(&conn, "watchedExtension").unwrap().is_none());

        set_setting(&conn, "watchedExtension", ".TiVo").unwrap();
        assert_eq!(
            get_setting(&conn, "watchedExtension").unwrap().as_deref(),
            Some(".TiVo")
        );

        set_setting(&conn, "watchedExtension", ".mp4").unwrap();
        assert_eq!(
            get_setting(&conn, "watchedExtension").unwrap().as_deref(),
            Some(".mp4")
        );
    }

    #[test]
    fn test_grant_roundtrip_and_delete() {
        let conn = test_conn();
        let record = GrantRecord {
            token: "tok-1".to_string(),
            path: "/videos".to_string(),
            hint_key: Some("watchedFolder".to_string()),
        };
        insert_grant(&conn, &record, "2026-01-01T00:00:00Z").unwrap();

        let fetched = get_grant(&conn, "tok-1").unwrap().unwrap();
        assert_eq!(fetched.path, "/videos");
        assert_eq!(fetched.hint_key.as_deref(), Some("watchedFolder"));

        assert_eq!(delete_grant(&conn, "tok-1").unwrap(), 1);
        assert!(get_grant(&conn, "tok-1").unwrap().is_none());
    }

    #[test]
    fn test_delete_grants_by_hint_clears_previous() {
        let conn = test_conn();
        for token in ["a", "b"] {
            let record = GrantRecord {
                token: token.to_string(),
                path: "/videos".to_string(),
                hint_key: Some("watchedFolder".to_string()),
            };
            insert_grant(&conn, &record, "2026-01-01T00:00:00Z").unwrap();
        }

        assert_eq!(delete_grants_by_hint(&conn, "watchedFolder").unwrap(), 2);
        assert!(get_grant(&conn, "a").unwrap().is_none());
        assert!(get_grant(&conn, "b").unwrap().is_none());
    }
}
