//! PCM container header and frame pacing.
//!
//! The header is read at fixed offsets and never validated: tags, codec id,
//! byte rate and block alignment are skipped. A malformed file plays as
//! noise until the stream runs short.
//!
//! ```text
//! offset size field
//!      0    4 "RIFF"
//!      4    4 container size
//!      8    4 "WAVE"
//!     12    4 "fmt "
//!     16    4 fmt chunk size
//!     20    2 codec id
//!     22    2 channels          <- read
//!     24    4 sample rate       <- read
//!     28    4 byte rate
//!     32    2 block align
//!     34    2 bits per sample   <- read
//!     36    4 "data"
//!     40    4 data size
//!     44      samples
//! ```

use embassy_time::Duration;
use platform::AudioConfig;

/// Size of the fixed header in bytes; samples start right after it.
pub const HEADER_LEN: usize = 44;

const CHANNELS_OFFSET: usize = 22;
const SAMPLE_RATE_OFFSET: usize = 24;
const BITS_OFFSET: usize = 34;

const MICROS_PER_SECOND: u32 = 1_000_000;

/// Why a header was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum HeaderError {
    /// The file ended before the header did.
    Truncated {
        /// Bytes actually available.
        len: usize,
    },
    /// A sample rate of zero has no pacing interval.
    ZeroSampleRate,
}

impl core::fmt::Display for HeaderError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Truncated { len } => write!(f, "header truncated at {len} bytes"),
            Self::ZeroSampleRate => f.write_str("sample rate is zero"),
        }
    }
}

/// The header fields playback consults.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct WavHeader {
    /// Channel count.
    pub channels: u16,
    /// Samples per second.
    pub sample_rate: u32,
    /// Bits per sample.
    pub bits_per_sample: u16,
}

impl WavHeader {
    /// Parse the first [`HEADER_LEN`] bytes of a file.
    ///
    /// # Errors
    ///
    /// [`HeaderError::Truncated`] when fewer than [`HEADER_LEN`] bytes are
    /// given, [`HeaderError::ZeroSampleRate`] for a zero rate.
    pub fn parse(bytes: &[u8]) -> Result<Self, HeaderError> {
        let header = bytes
            .get(..HEADER_LEN)
            .ok_or(HeaderError::Truncated { len: bytes.len() })?;
        let u16_at = |offset: usize| match header.get(offset..offset.saturating_add(2)) {
            Some(&[lo, hi]) => u16::from_le_bytes([lo, hi]),
            _ => 0,
        };
        let u32_at = |offset: usize| match header.get(offset..offset.saturating_add(4)) {
            Some(&[b0, b1, b2, b3]) => u32::from_le_bytes([b0, b1, b2, b3]),
            _ => 0,
        };

        let parsed = Self {
            channels: u16_at(CHANNELS_OFFSET),
            sample_rate: u32_at(SAMPLE_RATE_OFFSET),
            bits_per_sample: u16_at(BITS_OFFSET),
        };
        if parsed.sample_rate == 0 {
            return Err(HeaderError::ZeroSampleRate);
        }
        Ok(parsed)
    }

    /// Pacing interval in whole microseconds: `1_000_000 / sample_rate`,
    /// truncated. Over long files this drifts from the device clock; alert
    /// sounds are short.
    #[must_use]
    pub fn frame_interval_us(&self) -> u32 {
        MICROS_PER_SECOND.checked_div(self.sample_rate).unwrap_or(0)
    }

    /// [`Self::frame_interval_us`] as a timer duration.
    #[must_use]
    pub fn frame_interval(&self) -> Duration {
        Duration::from_micros(u64::from(self.frame_interval_us()))
    }

    /// Output configuration for this file.
    #[must_use]
    pub fn audio_config(&self) -> AudioConfig {
        AudioConfig {
            sample_rate: self.sample_rate,
            channels: self.channels,
            bits_per_sample: self.bits_per_sample,
        }
    }
}
