//! Output layer for writing tables to disk

mod xlsx;

use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use tempfile::NamedTempFile;

use crate::model::Table;

pub use xlsx::{XlsxWriter, MAX_COLUMNS, MAX_ROWS, MAX_STRING_CHARS};

/// Trait for table writers
pub trait TableWriter {
    /// Encode the table into the bytes of a complete output file
    fn render(&self, table: &Table) -> Result<Vec<u8>>;

    /// Encode the table and atomically write it to `path`
    fn write(&self, table: &Table, path: &Path) -> Result<()> {
        let bytes = self.render(table)?;
        persist_atomically(&bytes, path)
    }
}

/// Write `bytes` to a temporary file next to `path`, then rename it into place
///
/// `path` is either fully written or left as it was. A new file gets the
/// usual umask-derived mode; a replaced file keeps its permissions.
pub fn persist_atomically(bytes: &[u8], path: &Path) -> Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut file = create_temp_file(dir)
        .with_context(|| format!("Failed to create file in: {}", dir.display()))?;
    if let Ok(existing) = std::fs::metadata(path) {
        if existing.is_file() {
            file.as_file()
                .set_permissions(existing.permissions())
                .with_context(|| format!("Failed to copy permissions of: {}", path.display()))?;
        }
    }
    file.write_all(bytes)
        .and_then(|_| file.as_file().sync_all())
        .with_context(|| format!("Failed to write file: {}", path.display()))?;
    file.persist(path)
        .map_err(|e| e.error)
        .with_context(|| format!("Failed to write file: {}", path.display()))?;

    Ok(())
}

#[cfg(unix)]
fn create_temp_file(dir: &Path) -> std::io::Result<NamedTempFile> {
    use std::os::unix::fs::PermissionsExt;

    // Masked by the process umask, as for any newly created file
    tempfile::Builder::new()
        .permissions(std::fs::Permissions::from_mode(0o666))
        .tempfile_in(dir)
}

#[cfg(not(unix))]
fn create_temp_file(dir: &Path) -> std::io::Result<NamedTempFile> {
    NamedTempFile::new_in(dir)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_persist_atomically_writes_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.bin");

        persist_atomically(b"abc", &path).unwrap();

        assert_eq!(std::fs::read(&path).unwrap(), b"abc");
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[cfg(unix)]
    #[test]
    fn test_persist_atomically_uses_default_file_mode() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let plain = dir.path().join("plain.bin");
        let path = dir.path().join("out.bin");
        std::fs::write(&plain, b"x").unwrap();

        persist_atomically(b"abc", &path).unwrap();

        let mode = |p: &Path| std::fs::metadata(p).unwrap().permissions().mode() & 0o777;
        assert_eq!(mode(&path), mode(&plain));
    }

    #[cfg(unix)]
    #[test]
    fn test_persist_atomically_keeps_existing_mode() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.bin");
        std::fs::write(&path, b"old").unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o640)).unwrap();

        persist_atomically(b"new", &path).unwrap();

        let mode = std::fs::metadata(&path).unwrap().permissions().mode() & 0o777;
        assert_eq!(mode, 0o640);
        assert_eq!(std::fs::read(&path).unwrap(), b"new");
    }

    #[test]
    fn test_persist_atomically_missing_dir() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("no_such_dir").join("out.bin");

        let err = persist_atomically(b"abc", &path).unwrap_err();

        assert!(format!("{:#}", err).contains("Failed to create file in"));
        assert!(!path.exists());
    }

    #[test]
    fn test_persist_atomically_onto_directory_leaves_no_temp_file() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("taken");
        std::fs::create_dir(&target).unwrap();
        std::fs::write(target.join("keep"), b"x").unwrap();

        assert!(persist_atomically(b"abc", &target).is_err());

        let names: Vec<_> = std::fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name())
            .collect();
        assert_eq!(names, vec![std::ffi::OsString::from("taken")]);
    }
}
