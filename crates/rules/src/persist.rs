//! Output file writes.

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::Result;

/// Write `data` to `path` via a hidden `.tmp` sibling and a rename, so a
/// crash never leaves a half-written file at the final path.
pub fn write_atomic(path: &Path, data: &[u8]) -> Result<()> {
    let tmp_path = tmp_sibling(path);
    fs::write(&tmp_path, data)?;
    if let Err(e) = fs::rename(&tmp_path, path) {
        let _ = fs::remove_file(&tmp_path);
        return Err(e.into());
    }
    Ok(())
}

fn tmp_sibling(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "output".to_string());
    path.with_file_name(format!(".{}.tmp", name))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn writes_and_replaces() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("out.json");

        write_atomic(&path, b"first").unwrap();
        write_atomic(&path, b"second").unwrap();

        assert_eq!(fs::read(&path).unwrap(), b"second");
        assert!(!dir.path().join(".out.json.tmp").exists());
    }

    #[test]
    fn missing_parent_is_an_error() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("missing").join("out.json");
        assert!(write_atomic(&path, b"x").is_err());
    }
}
