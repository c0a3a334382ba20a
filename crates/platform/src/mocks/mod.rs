//! Mock implementations for testing
//!
//! This module provides mock implementations of all platform traits
//! for use in unit and integration tests.

// Test doubles: counters cannot realistically overflow.
#![allow(clippy::arithmetic_side_effects, clippy::indexing_slicing)]

use std::cell::RefCell;
use std::rc::Rc;

use crate::{AudioConfig, AudioOutput, File, Storage};

/// Ordered record of calls, shared between a storage and an output so tests
/// can check the sequence across both.
///
/// Events: `mount`, `unmount`, `open`, `close` (file dropped), `configure`,
/// `release`.
pub type EventLog = Rc<RefCell<Vec<&'static str>>>;

fn record(log: Option<&EventLog>, event: &'static str) {
    if let Some(log) = log {
        log.borrow_mut().push(event);
    }
}

/// Error produced by the mocks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MockError {
    /// Operation needs a mounted volume.
    NotMounted,
    /// Mount was scripted to fail.
    MountFailed,
    /// No file with that name.
    NotFound,
    /// Read was scripted to fail.
    ReadFailed,
    /// Write or configure was scripted to fail.
    Rejected,
}

/// Mock storage: an in-memory volume with scripted failures.
pub struct MockStorage {
    files: Vec<(String, Vec<u8>)>,
    mounted: bool,
    fail_mount: bool,
    read_chunk: usize,
    fail_read_at: Option<u64>,
    mounts: usize,
    unmounts: usize,
    log: Option<EventLog>,
    unmount_hook: Option<Box<dyn FnMut()>>,
}

impl MockStorage {
    /// Create an empty, unmounted volume.
    pub fn new() -> Self {
        Self {
            files: Vec::new(),
            mounted: false,
            fail_mount: false,
            read_chunk: usize::MAX,
            fail_read_at: None,
            mounts: 0,
            unmounts: 0,
            log: None,
            unmount_hook: None,
        }
    }

    /// Add a file to the volume root.
    pub fn with_file(mut self, name: &str, data: impl Into<Vec<u8>>) -> Self {
        self.files.push((name.to_owned(), data.into()));
        self
    }

    /// Make every `mount` fail (card absent).
    pub fn with_failing_mount(mut self) -> Self {
        self.fail_mount = true;
        self
    }

    /// Cap the number of bytes a single `read` call returns.
    pub fn with_read_chunk(mut self, chunk: usize) -> Self {
        self.read_chunk = chunk.max(1);
        self
    }

    /// Make reads fail once the file cursor reaches `pos`.
    pub fn with_read_error_at(mut self, pos: u64) -> Self {
        self.fail_read_at = Some(pos);
        self
    }

    /// Record mount, unmount, open and close into `log`.
    pub fn with_log(mut self, log: &EventLog) -> Self {
        self.log = Some(Rc::clone(log));
        self
    }

    /// Run `hook` at the start of every `unmount`.
    pub fn with_unmount_hook(mut self, hook: impl FnMut() + 'static) -> Self {
        self.unmount_hook = Some(Box::new(hook));
        self
    }

    /// Whether the volume is currently mounted.
    pub fn is_mounted(&self) -> bool {
        self.mounted
    }

    /// Number of successful mounts.
    pub fn mounts(&self) -> usize {
        self.mounts
    }

    /// Number of unmounts.
    pub fn unmounts(&self) -> usize {
        self.unmounts
    }
}

impl Default for MockStorage {
    fn default() -> Self {
        Self::new()
    }
}

impl Storage for MockStorage {
    type Error = MockError;
    type File = MockFile;

    async fn mount(&mut self) -> Result<(), Self::Error> {
        if self.fail_mount {
            return Err(MockError::MountFailed);
        }
        self.mounted = true;
        self.mounts += 1;
        record(self.log.as_ref(), "mount");
        Ok(())
    }

    async fn unmount(&mut self) -> Result<(), Self::Error> {
        if let Some(hook) = self.unmount_hook.as_mut() {
            hook();
        }
        record(self.log.as_ref(), "unmount");
        self.mounted = false;
        self.unmounts += 1;
        Ok(())
    }

    async fn list_dir(&mut self, visit: &mut dyn FnMut(&str)) -> Result<(), Self::Error> {
        if !self.mounted {
            return Err(MockError::NotMounted);
        }
        for (name, _) in &self.files {
            visit(name);
        }
        Ok(())
    }

    async fn open_file(&mut self, path: &str) -> Result<Self::File, Self::Error> {
        if !self.mounted {
            return Err(MockError::NotMounted);
        }
        let (_, data) = self
            .files
            .iter()
            .find(|(name, _)| name == path)
            .ok_or(MockError::NotFound)?;
        record(self.log.as_ref(), "open");
        Ok(MockFile {
            data: data.clone(),
            pos: 0,
            read_chunk: self.read_chunk,
            fail_read_at: self.fail_read_at,
            log: self.log.clone(),
        })
    }

    async fn exists(&mut self, path: &str) -> Result<bool, Self::Error> {
        if !self.mounted {
            return Err(MockError::NotMounted);
        }
        Ok(self.files.iter().any(|(name, _)| name == path))
    }
}

/// File handed out by [`MockStorage`].
pub struct MockFile {
    data: Vec<u8>,
    pos: usize,
    read_chunk: usize,
    fail_read_at: Option<u64>,
    log: Option<EventLog>,
}

impl Drop for MockFile {
    fn drop(&mut self) {
        record(self.log.as_ref(), "close");
    }
}

impl File for MockFile {
    type Error = MockError;

    async fn read(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error> {
        if self.fail_read_at.is_some_and(|at| self.pos as u64 >= at) {
            return Err(MockError::ReadFailed);
        }
        let rest = self.data.get(self.pos..).unwrap_or_default();
        let n = rest.len().min(buf.len()).min(self.read_chunk);
        buf[..n].copy_from_slice(&rest[..n]);
        self.pos += n;
        Ok(n)
    }

    async fn seek(&mut self, pos: u64) -> Result<u64, Self::Error> {
        self.pos = usize::try_from(pos).unwrap_or(usize::MAX).min(self.data.len());
        Ok(self.pos as u64)
    }

    fn size(&self) -> u64 {
        self.data.len() as u64
    }
}

/// Mock audio output: records every frame, scripted failures by attempt number.
pub struct MockAudio {
    config: Option<AudioConfig>,
    frames: Vec<Vec<u8>>,
    attempts: usize,
    fail_writes: Vec<usize>,
    stall_writes: Vec<usize>,
    fail_configure: bool,
    releases: usize,
    log: Option<EventLog>,
}

impl MockAudio {
    /// Create new mock audio output
    pub fn new() -> Self {
        Self {
            config: None,
            frames: Vec::new(),
            attempts: 0,
            fail_writes: Vec::new(),
            stall_writes: Vec::new(),
            fail_configure: false,
            releases: 0,
            log: None,
        }
    }

    /// Fail the write attempts with these zero-based numbers.
    pub fn failing_writes(mut self, attempts: &[usize]) -> Self {
        self.fail_writes.extend_from_slice(attempts);
        self
    }

    /// Never complete the write attempts with these zero-based numbers.
    pub fn stalling_writes(mut self, attempts: &[usize]) -> Self {
        self.stall_writes.extend_from_slice(attempts);
        self
    }

    /// Make `configure` fail.
    pub fn with_failing_configure(mut self) -> Self {
        self.fail_configure = true;
        self
    }

    /// Record configure and release into `log`.
    pub fn with_log(mut self, log: &EventLog) -> Self {
        self.log = Some(Rc::clone(log));
        self
    }

    /// Configuration from the last successful `configure`.
    pub fn config(&self) -> Option<AudioConfig> {
        self.config
    }

    /// Frames accepted so far, in order.
    pub fn frames(&self) -> &[Vec<u8>] {
        &self.frames
    }

    /// Total bytes accepted.
    pub fn bytes_written(&self) -> usize {
        self.frames.iter().map(Vec::len).sum()
    }

    /// Number of `write` calls, including failed and stalled ones.
    pub fn attempts(&self) -> usize {
        self.attempts
    }

    /// Number of `release` calls.
    pub fn releases(&self) -> usize {
        self.releases
    }
}

impl Default for MockAudio {
    fn default() -> Self {
        Self::new()
    }
}

impl AudioOutput for MockAudio {
    type Error = MockError;

    async fn configure(&mut self, config: AudioConfig) -> Result<(), Self::Error> {
        if self.fail_configure {
            return Err(MockError::Rejected);
        }
        record(self.log.as_ref(), "configure");
        self.config = Some(config);
        Ok(())
    }

    async fn write(&mut self, frame: &[u8]) -> Result<(), Self::Error> {
        let attempt = self.attempts;
        self.attempts += 1;
        if self.stall_writes.contains(&attempt) {
            core::future::pending::<()>().await;
        }
        if self.fail_writes.contains(&attempt) {
            return Err(MockError::Rejected);
        }
        self.frames.push(frame.to_vec());
        Ok(())
    }

    async fn release(&mut self) -> Result<(), Self::Error> {
        record(self.log.as_ref(), "release");
        self.releases += 1;
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)] // Tests unwrap mock results directly
mod tests {
    use super::*;
    use crate::read_full;

    #[tokio::test]
    async fn test_mock_storage_requires_mount() {
        let mut storage = MockStorage::new().with_file("1.wav", vec![1u8, 2, 3]);
        assert_eq!(
            storage.open_file("1.wav").await.err(),
            Some(MockError::NotMounted)
        );
        storage.mount().await.unwrap();
        assert!(storage.exists("1.wav").await.unwrap());
        storage.unmount().await.unwrap();
        assert_eq!((storage.mounts(), storage.unmounts()), (1, 1));
    }

    #[tokio::test]
    async fn test_mock_storage_chunked_reads_fill_buffer() {
        let data: Vec<u8> = (0u8..100).collect();
        let mut storage = MockStorage::new()
            .with_file("a.wav", data.clone())
            .with_read_chunk(7);
        storage.mount().await.unwrap();
        let mut file = storage.open_file("a.wav").await.unwrap();

        let mut buf = [0u8; 64];
        assert_eq!(file.read(&mut buf).await.unwrap(), 7);
        file.seek(0).await.unwrap();
        assert_eq!(read_full(&mut file, &mut buf).await.unwrap(), 64);
        assert_eq!(&buf[..], &data[..64]);
        assert_eq!(read_full(&mut file, &mut buf).await.unwrap(), 36);
        assert_eq!(read_full(&mut file, &mut buf).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_mock_audio_scripted_failure() {
        let mut audio = MockAudio::new().failing_writes(&[1]);
        audio.configure(AudioConfig::default()).await.unwrap();
        audio.write(&[0u8; 4]).await.unwrap();
        assert_eq!(audio.write(&[0u8; 4]).await, Err(MockError::Rejected));
        audio.write(&[0u8; 2]).await.unwrap();
        assert_eq!(audio.attempts(), 3);
        assert_eq!(audio.bytes_written(), 6);
    }

    #[tokio::test]
    async fn test_event_log_records_file_close_on_drop() {
        let log = EventLog::default();
        let mut storage = MockStorage::new()
            .with_file("1.wav", vec![0u8; 4])
            .with_log(&log);
        storage.mount().await.unwrap();
        let file = storage.open_file("1.wav").await.unwrap();
        drop(file);
        storage.unmount().await.unwrap();
        assert_eq!(*log.borrow(), vec!["mount", "open", "close", "unmount"]);
    }
}
