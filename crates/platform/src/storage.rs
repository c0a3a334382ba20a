//! Storage abstraction for the removable sound volume
//!
//! The volume is only mounted while something needs it: once at boot to
//! build the sound catalog, and once per playback session. Implementations
//! must tolerate repeated `mount`/`unmount` cycles.

/// Storage trait for file system access
pub trait Storage {
    /// Error type
    type Error: core::fmt::Debug;
    /// File type
    type File: File;

    /// Mount the volume. Fails when the card is absent or unreadable.
    fn mount(&mut self) -> impl core::future::Future<Output = Result<(), Self::Error>>;

    /// Unmount the volume. Every open file must have been dropped first.
    fn unmount(&mut self) -> impl core::future::Future<Output = Result<(), Self::Error>>;

    /// Enumerate the root directory once, calling `visit` with each entry name.
    ///
    /// Directories and volume labels are not reported.
    fn list_dir(
        &mut self,
        visit: &mut dyn FnMut(&str),
    ) -> impl core::future::Future<Output = Result<(), Self::Error>>;

    /// Open file for reading
    fn open_file(
        &mut self,
        path: &str,
    ) -> impl core::future::Future<Output = Result<Self::File, Self::Error>>;

    /// Check if path exists
    fn exists(
        &mut self,
        path: &str,
    ) -> impl core::future::Future<Output = Result<bool, Self::Error>>;
}

/// File trait for reading files
///
/// Dropping the file closes it.
pub trait File {
    /// Error type
    type Error: core::fmt::Debug;

    /// Read from current position.
    ///
    /// May return fewer bytes than `buf.len()` before the end of the file;
    /// `Ok(0)` means end of file.
    fn read(
        &mut self,
        buf: &mut [u8],
    ) -> impl core::future::Future<Output = Result<usize, Self::Error>>;

    /// Seek to position
    fn seek(&mut self, pos: u64) -> impl core::future::Future<Output = Result<u64, Self::Error>>;

    /// Get file size
    fn size(&self) -> u64;
}

/// Fill `buf` from `file`, retrying short reads until the buffer is full or
/// the file reports end of file.
///
/// Returns the number of bytes placed in `buf`. A return value smaller than
/// `buf.len()` therefore always means the file is exhausted.
pub async fn read_full<F: File>(file: &mut F, buf: &mut [u8]) -> Result<usize, F::Error> {
    let mut filled = 0usize;
    while let Some(rest) = buf.get_mut(filled..) {
        if rest.is_empty() {
            break;
        }
        let n = file.read(rest).await?;
        if n == 0 {
            break;
        }
        filled = filled.saturating_add(n).min(buf.len());
    }
    Ok(filled)
}
