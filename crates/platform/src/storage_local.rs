//! Local filesystem Storage implementation for desktop runs.
//!
//! `LocalFileStorage` implements `platform::Storage` using `std::fs`.
//! Used when the `std` feature is enabled (simulator and tests only).
//! All paths are resolved relative to the `root` provided at construction,
//! which plays the part of the SD card's root directory.

use std::fs;
use std::io::{Read, Seek, SeekFrom};
use std::path::PathBuf;

use crate::storage::{File, Storage};

/// Error type for local filesystem operations.
#[derive(Debug)]
pub enum LocalStorageError {
    /// The root directory is missing: the "card" is not inserted.
    NotMounted,
    /// Underlying I/O error.
    Io(std::io::Error),
}

impl core::fmt::Display for LocalStorageError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::NotMounted => f.write_str("local storage: volume not mounted"),
            Self::Io(e) => write!(f, "local storage error: {e}"),
        }
    }
}

impl std::error::Error for LocalStorageError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::NotMounted => None,
            Self::Io(e) => Some(e),
        }
    }
}

impl From<std::io::Error> for LocalStorageError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}

/// An open file on the local filesystem.
pub struct LocalFile {
    inner: fs::File,
    size: u64,
}

impl File for LocalFile {
    type Error = LocalStorageError;

    async fn read(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error> {
        Ok(Read::read(&mut self.inner, buf)?)
    }

    async fn seek(&mut self, pos: u64) -> Result<u64, Self::Error> {
        Ok(Seek::seek(&mut self.inner, SeekFrom::Start(pos))?)
    }

    fn size(&self) -> u64 {
        self.size
    }
}

/// A `platform::Storage` implementation backed by `std::fs`.
///
/// `mount` succeeds only when the root directory exists; every other
/// operation requires a mounted volume, mirroring the SD card driver.
///
/// # Example
/// ```no_run
/// # async fn example() {
/// use platform::storage_local::LocalFileStorage;
/// use platform::Storage;
/// let mut storage = LocalFileStorage::new("/home/user/sdcard");
/// storage.mount().await.unwrap();
/// let file = storage.open_file("1.wav").await.unwrap();
/// # }
/// ```
pub struct LocalFileStorage {
    root: PathBuf,
    mounted: bool,
}

impl LocalFileStorage {
    /// Create a new storage rooted at `root`.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            mounted: false,
        }
    }

    /// `true` between a successful `mount` and the next `unmount`.
    #[must_use]
    pub fn is_mounted(&self) -> bool {
        self.mounted
    }

    fn resolve(&self, path: &str) -> Result<PathBuf, LocalStorageError> {
        if self.mounted {
            Ok(self.root.join(path))
        } else {
            Err(LocalStorageError::NotMounted)
        }
    }
}

impl Storage for LocalFileStorage {
    type Error = LocalStorageError;
    type File = LocalFile;

    async fn mount(&mut self) -> Result<(), Self::Error> {
        if !self.root.is_dir() {
            return Err(LocalStorageError::NotMounted);
        }
        self.mounted = true;
        tracing::debug!(root = %self.root.display(), "local volume mounted");
        Ok(())
    }

    async fn unmount(&mut self) -> Result<(), Self::Error> {
        self.mounted = false;
        Ok(())
    }

    async fn list_dir(&mut self, visit: &mut dyn FnMut(&str)) -> Result<(), Self::Error> {
        let root = self.resolve("")?;
        for entry in fs::read_dir(root)? {
            let entry = entry?;
            if entry.file_type()?.is_dir() {
                continue;
            }
            if let Some(name) = entry.file_name().to_str() {
                visit(name);
            }
        }
        Ok(())
    }

    async fn open_file(&mut self, path: &str) -> Result<Self::File, Self::Error> {
        let full = self.resolve(path)?;
        let file = fs::File::open(&full)?;
        let meta = file.metadata()?;
        Ok(LocalFile {
            inner: file,
            size: meta.len(),
        })
    }

    async fn exists(&mut self, path: &str) -> Result<bool, Self::Error> {
        Ok(self.resolve(path)?.exists())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;
    use crate::storage::{read_full, File, Storage};
    use std::fs;
    use tempfile::TempDir;

    #[tokio::test]
    async fn local_storage_read_full_file() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("1.wav"), b"hello world").unwrap();
        let mut storage = LocalFileStorage::new(tmp.path());
        storage.mount().await.unwrap();
        let mut file = storage.open_file("1.wav").await.unwrap();
        let mut buf = [0u8; 11];
        let n = read_full(&mut file, &mut buf).await.unwrap();
        assert_eq!(n, 11);
        assert_eq!(&buf, b"hello world");
    }

    #[tokio::test]
    async fn local_storage_size_matches() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("size.wav"), [0u8; 64]).unwrap();
        let mut storage = LocalFileStorage::new(tmp.path());
        storage.mount().await.unwrap();
        let file = storage.open_file("size.wav").await.unwrap();
        assert_eq!(file.size(), 64);
    }

    #[tokio::test]
    async fn local_storage_seek_and_read() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("seek.bin"), b"ABCDEFGH").unwrap();
        let mut storage = LocalFileStorage::new(tmp.path());
        storage.mount().await.unwrap();
        let mut file = storage.open_file("seek.bin").await.unwrap();
        file.seek(4).await.unwrap();
        let mut buf = [0u8; 4];
        file.read(&mut buf).await.unwrap();
        assert_eq!(&buf, b"EFGH");
    }

    #[tokio::test]
    async fn local_storage_mount_fails_without_root() {
        let tmp = TempDir::new().unwrap();
        let mut storage = LocalFileStorage::new(tmp.path().join("no-card"));
        assert!(matches!(
            storage.mount().await,
            Err(LocalStorageError::NotMounted)
        ));
    }

    #[tokio::test]
    async fn local_storage_open_requires_mount() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("1.wav"), b"x").unwrap();
        let mut storage = LocalFileStorage::new(tmp.path());
        assert!(matches!(
            storage.open_file("1.wav").await,
            Err(LocalStorageError::NotMounted)
        ));
    }

    #[tokio::test]
    async fn local_storage_lists_files_only() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("1.wav"), b"x").unwrap();
        fs::write(tmp.path().join("DOORBELL.WAV"), b"x").unwrap();
        fs::create_dir(tmp.path().join("2.wav.d")).unwrap();
        let mut storage = LocalFileStorage::new(tmp.path());
        storage.mount().await.unwrap();

        let mut names = Vec::new();
        storage
            .list_dir(&mut |name| names.push(name.to_owned()))
            .await
            .unwrap();
        names.sort();
        assert_eq!(names, vec!["1.wav".to_owned(), "DOORBELL.WAV".to_owned()]);
    }

    #[tokio::test]
    async fn local_storage_exists_after_unmount_errors() {
        let tmp = TempDir::new().unwrap();
        let mut storage = LocalFileStorage::new(tmp.path());
        storage.mount().await.unwrap();
        assert!(!storage.exists("missing.wav").await.unwrap());
        storage.unmount().await.unwrap();
        assert!(!storage.is_mounted());
        assert!(storage.exists("missing.wav").await.is_err());
    }
}
