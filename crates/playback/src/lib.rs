//! Alert playback: PCM header parsing, session admission and the
//! frame-paced streaming engine.
//!
//! ```text
//! request ─► SessionGuard::try_acquire ─► PlaybackEngine::play
//!                                            mount → open → header → frames
//!                                            release → close → unmount → guard free
//! ```
#![cfg_attr(not(test), no_std)]
#![deny(clippy::unwrap_used)]

pub mod engine;
pub mod guard;
pub mod wav;

pub use engine::{
    EngineConfig, PlaybackEngine, SessionOutcome, SessionReport, DEFAULT_FRAME_BYTES,
    DEFAULT_WRITE_TIMEOUT,
};
pub use guard::{ReleaseOnDrop, SessionGuard, SessionState};
pub use wav::{HeaderError, WavHeader, HEADER_LEN};

#[cfg(test)]
#[allow(
    clippy::expect_used,
    clippy::unwrap_used,
    clippy::indexing_slicing,
    clippy::arithmetic_side_effects
)] // Tests use expect() and direct indexing for readable assertions
mod tests {
    /// Header parsing and pacing
    mod wav_tests {
        use crate::wav::{HeaderError, WavHeader, HEADER_LEN};
        use embassy_time::Duration;

        fn header(channels: u16, rate: u32, bits: u16) -> [u8; HEADER_LEN] {
            let mut h = [0u8; HEADER_LEN];
            h[0..4].copy_from_slice(b"RIFF");
            h[8..12].copy_from_slice(b"WAVE");
            h[12..16].copy_from_slice(b"fmt ");
            h[22..24].copy_from_slice(&channels.to_le_bytes());
            h[24..28].copy_from_slice(&rate.to_le_bytes());
            h[34..36].copy_from_slice(&bits.to_le_bytes());
            h[36..40].copy_from_slice(b"data");
            h
        }

        #[test]
        fn test_parse_reads_fixed_offsets() {
            let parsed = WavHeader::parse(&header(2, 44_100, 24)).expect("valid header");
            assert_eq!(parsed.channels, 2);
            assert_eq!(parsed.sample_rate, 44_100);
            assert_eq!(parsed.bits_per_sample, 24);
            assert!(parsed.audio_config().is_stereo());
        }

        #[test]
        fn test_8000_hz_paces_at_125_us() {
            let parsed = WavHeader::parse(&header(1, 8000, 16)).expect("valid header");
            assert_eq!(parsed.frame_interval_us(), 125);
            assert_eq!(parsed.frame_interval(), Duration::from_micros(125));
        }

        #[test]
        fn test_interval_truncates() {
            // 1_000_000 / 44_100 = 22.67
            let parsed = WavHeader::parse(&header(2, 44_100, 16)).expect("valid header");
            assert_eq!(parsed.frame_interval_us(), 22);
        }

        #[test]
        fn test_tags_are_not_validated() {
            let mut h = header(1, 16_000, 8);
            h[0..4].copy_from_slice(b"JUNK");
            assert_eq!(WavHeader::parse(&h).map(|p| p.sample_rate), Ok(16_000));
        }

        #[test]
        fn test_short_header_is_truncated() {
            let h = header(1, 8000, 16);
            assert_eq!(
                WavHeader::parse(&h[..30]),
                Err(HeaderError::Truncated { len: 30 })
            );
        }

        #[test]
        fn test_zero_rate_rejected() {
            assert_eq!(
                WavHeader::parse(&header(1, 0, 16)),
                Err(HeaderError::ZeroSampleRate)
            );
        }
    }

    /// Session guard state machine
    mod guard_tests {
        use crate::guard::{SessionGuard, SessionState};

        #[test]
        fn test_guard_starts_idle() {
            assert_eq!(SessionGuard::new().state(), SessionState::Idle);
        }

        #[test]
        fn test_second_acquire_is_refused() {
            let guard = SessionGuard::new();
            assert!(guard.try_acquire());
            assert!(!guard.try_acquire());
            assert_eq!(guard.state(), SessionState::Playing);
            guard.release();
            assert!(guard.try_acquire());
        }

        #[test]
        fn test_release_on_drop_frees_slot() {
            let guard = SessionGuard::new();
            assert!(guard.try_acquire());
            {
                let _release = guard.release_on_drop();
                assert_eq!(guard.state(), SessionState::Playing);
            }
            assert_eq!(guard.state(), SessionState::Idle);
        }

        #[test]
        fn test_concurrent_acquire_admits_exactly_one() {
            let guard = SessionGuard::new();
            let admitted = std::thread::scope(|s| {
                let handles: Vec<_> = (0..8).map(|_| s.spawn(|| guard.try_acquire())).collect();
                handles
                    .into_iter()
                    .map(|h| h.join().expect("thread"))
                    .filter(|&won| won)
                    .count()
            });
            assert_eq!(admitted, 1);
        }
    }
}
