use crate::error::Result;
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;

/// Atomically write `data` to `path` using a tempfile in the same directory.
pub fn atomic_write(path: &Path, data: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let dir = path.parent().unwrap_or(Path::new("."));
    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(data)?;
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}

/// Write a file only if it does not already exist. Returns true if written.
pub fn write_if_missing(path: &Path, data: &[u8]) -> Result<bool> {
    if path.exists() {
        return Ok(false);
    }
    atomic_write(path, data)?;
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn atomic_write_creates_parents() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested/painpoints.yaml");
        atomic_write(&path, b"cache_ttl_secs: 5").unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "cache_ttl_secs: 5");
    }

    #[test]
    fn write_if_missing_keeps_existing_config() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("painpoints.yaml");
        std::fs::write(&path, b"content:\n  owner: acme\n").unwrap();
        let written = write_if_missing(&path, b"content: {}").unwrap();
        assert!(!written);
        assert!(std::fs::read_to_string(&path).unwrap().contains("acme"));
    }
}
