use std::fs;
use std::path::Path;

use crate::error::AppError;
use crate::models::file_entry::FileEntry;

/// Flat, non-recursive listing of the file names in one directory. The
/// filesystem-backed implementation lives below; tests substitute their own
/// to inject failures and count calls.
pub trait DirectoryLister: Send {
    fn list_files(&self, dir: &Path) -> Result<Vec<String>, AppError>;
}

pub struct FsLister;

impl DirectoryLister for FsLister {
    fn list_files(&self, dir: &Path) -> Result<Vec<String>, AppError> {
        let mut names = Vec::new();
        for entry in fs::read_dir(dir)? {
            let entry = entry?;
            if entry.file_type()?.is_file() {
                names.push(entry.file_name().to_string_lossy().to_string());
            }
        }
        Ok(names)
    }
}

/// Lists `dir` and keeps the names containing `filter`, case-folded.
/// Matching is substring containment anywhere in the name, not a suffix
/// check; that mirrors the shipped behavior and tests rely on it. A failed
/// listing degrades to an empty result; the error is logged here so callers
/// never special-case it.
pub fn scan(lister: &dyn DirectoryLister, dir: &Path, filter: &str) -> Vec<FileEntry> {
    let names = match lister.list_files(dir) {
        Ok(names) => names,
        Err(e) => {
            tracing::error!(path = %dir.display(), error = %e, "directory listing failed");
            return Vec::new();
        }
    };
    let needle = filter.to_lowercase();
    names
        .into_iter()
        .filter(|name| name.to_lowercase().contains(&needle))
        .map(FileEntry::new)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;

    #[test]
    fn test_scan_filters_case_insensitively() {
        let dir = tempfile::tempdir().unwrap();
        File::create(dir.path().join("Show.TiVo")).unwrap();
        File::create(dir.path().join("show.mp4")).unwrap();
        File::create(dir.path().join("readme.txt")).unwrap();

        let result = scan(&FsLister, dir.path(), ".tivo");

        assert_eq!(result.len(), 1);
        assert_eq!(result[0].name, "Show.TiVo");
        assert!(!result[0].flagged);
    }

    #[test]
    fn test_scan_matches_substring_not_just_suffix() {
        // Deliberate: the filter text may appear anywhere in the name,
        // so a name with trailing junk after the extension still matches.
        let dir = tempfile::tempdir().unwrap();
        File::create(dir.path().join("show.tivo.partial")).unwrap();

        let result = scan(&FsLister, dir.path(), ".tivo");
        assert_eq!(result.len(), 1);
    }

    #[test]
    fn test_scan_skips_subdirectories() {
        let dir = tempfile::tempdir().unwrap();
        File::create(dir.path().join("a.tivo")).unwrap();
        fs::create_dir(dir.path().join("nested.tivo")).unwrap();

        let result = scan(&FsLister, dir.path(), ".tivo");
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].name, "a.tivo");
    }

    #[test]
    fn test_scan_missing_directory_yields_empty() {
        let result = scan(&FsLister, Path::new("/nonexistent/path/1234567890"), ".tivo");
        assert!(result.is_empty());
    }
}
