//! Atomic file persistence.

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::core::{MigrationError, Result};

/// Writes `bytes` to `path` atomically.
///
/// Content goes to a sibling temp file first and is renamed over the
/// destination after a flush and fsync, so readers never observe a
/// partially written file.
pub fn write_atomic(path: &Path, bytes: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).map_err(|e| {
                MigrationError::Io(format!(
                    "Failed to create directory {}: {}",
                    parent.display(),
                    e
                ))
            })?;
        }
    }

    let temp_path = path.with_extension("tmp");
    let temp_file = File::create(&temp_path)
        .map_err(|e| MigrationError::Io(format!("Failed to create temp file: {}", e)))?;
    let mut writer = BufWriter::new(temp_file);
    writer
        .write_all(bytes)
        .map_err(|e| MigrationError::Io(format!("Failed to write {}: {}", temp_path.display(), e)))?;
    writer
        .flush()
        .map_err(|e| MigrationError::Io(format!("Failed to flush {}: {}", temp_path.display(), e)))?;
    writer
        .get_mut()
        .sync_all()
        .map_err(|e| MigrationError::Io(format!("Failed to sync {}: {}", temp_path.display(), e)))?;
    fs::rename(&temp_path, path).map_err(|e| {
        MigrationError::Io(format!(
            "Failed to rename {} to {}: {}",
            temp_path.display(),
            path.display(),
            e
        ))
    })?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_write_and_read_back() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.yaml");
        write_atomic(&path, b"schema_version: 1\n").unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "schema_version: 1\n");
    }

    #[test]
    fn test_overwrites_existing_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.yaml");
        fs::write(&path, "old").unwrap();
        write_atomic(&path, b"new").unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "new");
    }

    #[test]
    fn test_creates_parent_directories() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("nested").join("dir").join("config.yaml");
        write_atomic(&path, b"x").unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "x");
    }

    #[test]
    fn test_leaves_no_temp_file_behind() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.yaml");
        write_atomic(&path, b"data").unwrap();

        let entries: Vec<_> = fs::read_dir(temp_dir.path())
            .unwrap()
            .map(|entry| entry.unwrap().file_name())
            .collect();
        assert_eq!(entries, ["config.yaml"]);
    }
}
