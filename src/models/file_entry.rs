use serde::{Deserialize, Serialize};

/// One row in the watched-file list. `flagged` is the per-item checkbox
/// state; it is never persisted and every rescan recreates entries with
/// `flagged = false`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileEntry {
    pub name: String,
    pub flagged: bool,
}

impl FileEntry {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            flagged: false,
        }
    }
}
