//! Temporary directories and directory inspection for tests.

use std::path::Path;

/// A throwaway directory, removed when the returned `TempDir` is dropped.
pub fn temp_test_dir() -> tempfile::TempDir {
    tempfile::Builder::new()
        .prefix("mosaic_test_")
        .tempdir()
        .expect("Failed to create temporary test directory")
}

/// Sorted names of the entries directly inside `dir`.
///
/// A missing directory yields an empty list.
pub fn file_names(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = match std::fs::read_dir(dir) {
        Ok(entries) => entries
            .map(|e| {
                e.expect("Failed to read directory entry")
                    .file_name()
                    .to_string_lossy()
                    .into_owned()
            })
            .collect(),
        Err(_) => Vec::new(),
    };
    names.sort();
    names
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_names_sorted() {
        let dir = temp_test_dir();
        std::fs::write(dir.path().join("b.png"), b"").unwrap();
        std::fs::write(dir.path().join("a.png"), b"").unwrap();

        assert_eq!(file_names(dir.path()), vec!["a.png", "b.png"]);
        assert!(file_names(&dir.path().join("missing")).is_empty());
    }
}
