//! Playback engine: one frame-paced session from the SD card to the output.
//!
//! A session mounts the volume, opens the selected file, reads the header
//! and then loops: wait one pacing interval, read a frame, write it with a
//! bounded timeout. It ends on the first short read. Write failures and
//! timeouts are logged and skipped; only a read error cuts the stream.
//!
//! Teardown runs on every path, in this order: release the output, close
//! the file, unmount, free the [`SessionGuard`]. Steps whose setup never
//! happened are skipped. The engine has no cancellation: once started, a
//! session runs until the stream ends or a resource fails.

use embassy_time::{with_timeout, Duration, Timer};
use platform::{read_full, AudioOutput, Storage};

use crate::guard::SessionGuard;
use crate::wav::{WavHeader, HEADER_LEN};

/// Default frame size in bytes.
pub const DEFAULT_FRAME_BYTES: usize = 512;

/// Default bound on a single output write.
pub const DEFAULT_WRITE_TIMEOUT: Duration = Duration::from_millis(1000);

/// Engine settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineConfig {
    /// Bound on each frame write; a write that takes longer is skipped.
    pub write_timeout: Duration,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            write_timeout: DEFAULT_WRITE_TIMEOUT,
        }
    }
}

/// How a session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SessionOutcome {
    /// Stream played to its final short read.
    Completed,
    /// The requested index has no file; nothing played.
    NoSound,
    /// The volume could not be mounted.
    MountFailed,
    /// The file could not be opened.
    OpenFailed,
    /// Header truncated or unusable.
    MalformedHeader,
    /// The output rejected the stream parameters.
    ConfigureFailed,
    /// A read failed mid-stream.
    ReadFailed,
}

impl SessionOutcome {
    /// Short name for log lines.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Completed => "completed",
            Self::NoSound => "no sound",
            Self::MountFailed => "mount failed",
            Self::OpenFailed => "open failed",
            Self::MalformedHeader => "malformed header",
            Self::ConfigureFailed => "configure failed",
            Self::ReadFailed => "read failed",
        }
    }
}

impl core::fmt::Display for SessionOutcome {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Summary of one session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SessionReport {
    /// How the session ended.
    pub outcome: SessionOutcome,
    /// Parsed header, when the session got that far.
    pub header: Option<WavHeader>,
    /// Frames the output accepted.
    pub frames_written: u32,
    /// Frames skipped after a write error or timeout.
    pub write_failures: u32,
}

impl SessionReport {
    const fn ended(outcome: SessionOutcome) -> Self {
        Self {
            outcome,
            header: None,
            frames_written: 0,
            write_failures: 0,
        }
    }
}

/// Streams one file per session in `FRAME`-byte frames.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlaybackEngine<const FRAME: usize = DEFAULT_FRAME_BYTES> {
    config: EngineConfig,
}

impl<const FRAME: usize> PlaybackEngine<FRAME> {
    /// Create an engine.
    #[must_use]
    pub const fn new(config: EngineConfig) -> Self {
        Self { config }
    }

    /// Engine settings.
    #[must_use]
    pub const fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Run one admitted session and free `guard` when it ends.
    ///
    /// `file_name` is `None` when the catalog has no file for the requested
    /// index; the volume is still mounted and unmounted, nothing plays.
    pub async fn play<S, A>(
        &self,
        guard: &SessionGuard,
        storage: &mut S,
        audio: &mut A,
        file_name: Option<&str>,
    ) -> SessionReport
    where
        S: Storage,
        A: AudioOutput,
    {
        // Declared first, dropped last.
        let _release = guard.release_on_drop();

        if let Err(e) = storage.mount().await {
            tracing::error!(error = ?e, "playback: storage mount failed");
            return self.finish(SessionReport::ended(SessionOutcome::MountFailed));
        }

        let report = match file_name {
            Some(name) => self.stream_file(storage, audio, name).await,
            None => {
                tracing::info!("playback: no sound for this index");
                SessionReport::ended(SessionOutcome::NoSound)
            }
        };

        if let Err(e) = storage.unmount().await {
            tracing::warn!(error = ?e, "playback: storage unmount failed");
        }
        self.finish(report)
    }

    async fn stream_file<S, A>(&self, storage: &mut S, audio: &mut A, name: &str) -> SessionReport
    where
        S: Storage,
        A: AudioOutput,
    {
        let mut file = match storage.open_file(name).await {
            Ok(file) => file,
            Err(e) => {
                tracing::error!(name, error = ?e, "playback: open failed");
                return SessionReport::ended(SessionOutcome::OpenFailed);
            }
        };

        let mut raw = [0u8; HEADER_LEN];
        let header = match read_full(&mut file, &mut raw).await {
            Ok(n) => WavHeader::parse(raw.get(..n).unwrap_or_default()),
            Err(e) => {
                tracing::error!(name, error = ?e, "playback: header read failed");
                return SessionReport::ended(SessionOutcome::ReadFailed);
            }
        };
        let header = match header {
            Ok(header) => header,
            Err(reason) => {
                tracing::warn!(name, %reason, "playback: malformed header");
                return SessionReport::ended(SessionOutcome::MalformedHeader);
            }
        };

        tracing::info!(
            name,
            sample_rate = header.sample_rate,
            channels = header.channels,
            bits = header.bits_per_sample,
            interval_us = header.frame_interval_us(),
            "playback: session start"
        );

        if let Err(e) = audio.configure(header.audio_config()).await {
            tracing::error!(error = ?e, "playback: output configure failed");
            return SessionReport {
                header: Some(header),
                ..SessionReport::ended(SessionOutcome::ConfigureFailed)
            };
        }

        let mut report = self.stream_frames(&mut file, audio, &header).await;
        report.header = Some(header);

        if let Err(e) = audio.release().await {
            tracing::warn!(error = ?e, "playback: output release failed");
        }
        drop(file);
        report
    }

    async fn stream_frames<F, A>(&self, file: &mut F, audio: &mut A, header: &WavHeader) -> SessionReport
    where
        F: platform::File,
        A: AudioOutput,
    {
        let interval = header.frame_interval();
        let mut frame = [0u8; FRAME];
        let mut report = SessionReport::ended(SessionOutcome::Completed);

        loop {
            Timer::after(interval).await;

            let n = match read_full(file, &mut frame).await {
                Ok(n) => n,
                Err(e) => {
                    tracing::error!(error = ?e, "playback: read failed, stopping");
                    report.outcome = SessionOutcome::ReadFailed;
                    return report;
                }
            };
            let Some(chunk) = frame.get(..n).filter(|chunk| !chunk.is_empty()) else {
                return report;
            };

            match with_timeout(self.config.write_timeout, audio.write(chunk)).await {
                Ok(Ok(())) => report.frames_written = report.frames_written.saturating_add(1),
                Ok(Err(e)) => {
                    tracing::warn!(error = ?e, "playback: frame write failed, skipping");
                    report.write_failures = report.write_failures.saturating_add(1);
                }
                Err(_) => {
                    tracing::warn!("playback: frame write timed out, skipping");
                    report.write_failures = report.write_failures.saturating_add(1);
                }
            }

            if n < FRAME {
                return report;
            }
        }
    }

    fn finish(&self, report: SessionReport) -> SessionReport {
        tracing::info!(
            outcome = report.outcome.as_str(),
            frames = report.frames_written,
            write_failures = report.write_failures,
            "playback: session end"
        );
        report
    }
}
