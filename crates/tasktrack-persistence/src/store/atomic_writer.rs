use std::fs;
use std::io::Write;
use std::path::Path;
use tasktrack_core::TrackerResult;

/// Atomic file writer that prevents data corruption
/// Uses write-to-temp-file → atomic-rename pattern for safety
pub struct AtomicWriter;

impl AtomicWriter {
    /// Write data to a file atomically
    /// The temp file lives in the target's directory so the rename stays on one filesystem
    pub fn write_atomic(path: &Path, data: &[u8]) -> TrackerResult<()> {
        let parent = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        fs::create_dir_all(parent)?;

        let mut temp_file = tempfile::NamedTempFile::new_in(parent)?;
        temp_file.write_all(data)?;
        temp_file.as_file().sync_all()?;
        temp_file.persist(path).map_err(|e| e.error)?;

        tracing::debug!(
            "Atomically wrote {} bytes to {}",
            data.len(),
            path.display()
        );
        Ok(())
    }

    /// Read all data from a file
    pub fn read_all(path: &Path) -> TrackerResult<Vec<u8>> {
        let data = fs::read(path)?;
        tracing::debug!("Read {} bytes from {}", data.len(), path.display());
        Ok(data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_atomic_write() {
        let dir = tempdir().unwrap();
        let file_path = dir.path().join("test.txt");
        let data = b"Hello, World!";

        AtomicWriter::write_atomic(&file_path, data).unwrap();

        let read_data = AtomicWriter::read_all(&file_path).unwrap();
        assert_eq!(read_data, data);
    }

    #[test]
    fn test_atomic_write_overwrites() {
        let dir = tempdir().unwrap();
        let file_path = dir.path().join("test.txt");

        AtomicWriter::write_atomic(&file_path, b"First").unwrap();
        AtomicWriter::write_atomic(&file_path, b"Second").unwrap();

        let read_data = AtomicWriter::read_all(&file_path).unwrap();
        assert_eq!(read_data, b"Second");
    }

    #[test]
    fn test_creates_missing_directories() {
        let dir = tempdir().unwrap();
        let file_path = dir.path().join("nested").join("store.json");

        AtomicWriter::write_atomic(&file_path, b"{}").unwrap();
        assert!(file_path.exists());
    }
}
