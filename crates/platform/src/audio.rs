//! Audio output abstraction

/// Audio output trait
///
/// Models the I2S transmit channel as a blocking buffer sink: one call to
/// [`write`](AudioOutput::write) hands one buffer of raw PCM bytes to the
/// peripheral. The caller bounds each write with its own timeout.
pub trait AudioOutput {
    /// Error type
    type Error: core::fmt::Debug;

    /// Set up the output channel for the stream described by `config`.
    fn configure(
        &mut self,
        config: AudioConfig,
    ) -> impl core::future::Future<Output = Result<(), Self::Error>>;

    /// Write one buffer of PCM bytes
    fn write(&mut self, frame: &[u8]) -> impl core::future::Future<Output = Result<(), Self::Error>>;

    /// Tear the output channel down at the end of a session
    fn release(&mut self) -> impl core::future::Future<Output = Result<(), Self::Error>>;
}

/// Audio configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct AudioConfig {
    /// Sample rate in Hz
    pub sample_rate: u32,
    /// Number of channels (1 = mono, 2 = stereo)
    pub channels: u16,
    /// Bits per sample (8, 16, 24 or 32)
    pub bits_per_sample: u16,
}

impl AudioConfig {
    /// `true` for anything other than a single channel.
    #[must_use]
    pub fn is_stereo(&self) -> bool {
        self.channels != 1
    }
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            sample_rate: 8000,
            channels: 1,
            bits_per_sample: 16,
        }
    }
}
