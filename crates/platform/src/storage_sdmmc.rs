//! SD card Storage for the hardware target, over `embedded-sdmmc`.
//!
//! The block device (SPI or SDMMC host) and its bus setup belong to the
//! board support code; this adapter only maps the FAT volume manager onto
//! [`Storage`]. `mount` opens volume 0 and its root directory, `unmount`
//! closes them again. Names are 8.3 short names, as the card reports them.

use core::fmt::Write as _;

use embedded_sdmmc::{
    BlockDevice, Mode, RawDirectory, RawFile, RawVolume, TimeSource, VolumeIdx, VolumeManager,
};

use crate::storage::{File, Storage};

/// Error type for SD card storage operations.
#[derive(Debug)]
pub enum SdmmcError<E: core::fmt::Debug> {
    /// The operation needs a mounted volume.
    NotMounted,
    /// Error reported by the FAT volume manager or the block device.
    Volume(embedded_sdmmc::Error<E>),
}

impl<E: core::fmt::Debug> From<embedded_sdmmc::Error<E>> for SdmmcError<E> {
    fn from(e: embedded_sdmmc::Error<E>) -> Self {
        Self::Volume(e)
    }
}

impl<E: core::fmt::Debug> core::fmt::Display for SdmmcError<E> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::NotMounted => f.write_str("SD card not mounted"),
            Self::Volume(_) => f.write_str("SD card volume error"),
        }
    }
}

/// A file open on the SD card. Closed on drop.
pub struct SdmmcFile<'a, D: BlockDevice, T: TimeSource> {
    mgr: &'a VolumeManager<D, T>,
    raw: RawFile,
}

impl<D: BlockDevice, T: TimeSource> File for SdmmcFile<'_, D, T> {
    type Error = SdmmcError<D::Error>;

    async fn read(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error> {
        Ok(self.mgr.read(self.raw, buf)?)
    }

    async fn seek(&mut self, pos: u64) -> Result<u64, Self::Error> {
        let offset = u32::try_from(pos).unwrap_or(u32::MAX);
        self.mgr.file_seek_from_start(self.raw, offset)?;
        Ok(u64::from(offset))
    }

    fn size(&self) -> u64 {
        self.mgr.file_length(self.raw).map(u64::from).unwrap_or(0)
    }
}

impl<D: BlockDevice, T: TimeSource> Drop for SdmmcFile<'_, D, T> {
    fn drop(&mut self) {
        if self.mgr.close_file(self.raw).is_err() {
            tracing::warn!("sdmmc: close_file failed");
        }
    }
}

/// SD card backed Storage.
///
/// Borrows the board's [`VolumeManager`]; files borrow it too, so they can
/// outlive a `&mut` borrow of the storage itself.
pub struct SdmmcStorage<'a, D: BlockDevice, T: TimeSource> {
    mgr: &'a VolumeManager<D, T>,
    open: Option<(RawVolume, RawDirectory)>,
}

impl<'a, D: BlockDevice, T: TimeSource> SdmmcStorage<'a, D, T> {
    /// Wrap a volume manager. Nothing is opened until [`Storage::mount`].
    #[must_use]
    pub fn new(mgr: &'a VolumeManager<D, T>) -> Self {
        Self { mgr, open: None }
    }

    fn root(&self) -> Result<RawDirectory, SdmmcError<D::Error>> {
        self.open.map(|(_, dir)| dir).ok_or(SdmmcError::NotMounted)
    }
}

impl<'a, D: BlockDevice, T: TimeSource> Storage for SdmmcStorage<'a, D, T> {
    type Error = SdmmcError<D::Error>;
    type File = SdmmcFile<'a, D, T>;

    async fn mount(&mut self) -> Result<(), Self::Error> {
        if self.open.is_some() {
            return Ok(());
        }
        let volume = self.mgr.open_raw_volume(VolumeIdx(0))?;
        match self.mgr.open_root_dir(volume) {
            Ok(dir) => {
                self.open = Some((volume, dir));
                Ok(())
            }
            Err(e) => {
                // Leave nothing half-open behind a failed mount.
                let _ = self.mgr.close_volume(volume);
                Err(e.into())
            }
        }
    }

    async fn unmount(&mut self) -> Result<(), Self::Error> {
        if let Some((volume, dir)) = self.open.take() {
            self.mgr.close_dir(dir)?;
            self.mgr.close_volume(volume)?;
        }
        Ok(())
    }

    async fn list_dir(&mut self, visit: &mut dyn FnMut(&str)) -> Result<(), Self::Error> {
        let dir = self.root()?;
        self.mgr.iterate_dir(dir, |entry| {
            if entry.attributes.is_directory() || entry.attributes.is_volume() {
                return;
            }
            let mut name: heapless::String<12> = heapless::String::new();
            if write!(name, "{}", entry.name).is_ok() {
                visit(name.as_str());
            }
        })?;
        Ok(())
    }

    async fn open_file(&mut self, path: &str) -> Result<Self::File, Self::Error> {
        let dir = self.root()?;
        let raw = self.mgr.open_file_in_dir(dir, path, Mode::ReadOnly)?;
        Ok(SdmmcFile { mgr: self.mgr, raw })
    }

    async fn exists(&mut self, path: &str) -> Result<bool, Self::Error> {
        let dir = self.root()?;
        match self.mgr.find_directory_entry(dir, path) {
            Ok(_) => Ok(true),
            Err(embedded_sdmmc::Error::NotFound) => Ok(false),
            Err(e) => Err(e.into()),
        }
    }
}
