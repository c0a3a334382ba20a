//! End-to-end playback sessions against the platform mocks.
//!
//! Each test admits a session on a fresh guard, runs it to completion and
//! checks the report, what reached the output, and that every resource was
//! handed back.

#![allow(clippy::expect_used, clippy::indexing_slicing, clippy::arithmetic_side_effects)]

use std::cell::Cell;
use std::rc::Rc;

use embassy_time::{Duration, Instant};
use platform::mocks::{EventLog, MockAudio, MockStorage};
use playback::{
    EngineConfig, PlaybackEngine, SessionGuard, SessionOutcome, SessionState, HEADER_LEN,
};

const FRAME: usize = 512;

/// A 44-byte header followed by `data_len` sample bytes counting up.
fn wav(rate: u32, channels: u16, bits: u16, data_len: usize) -> Vec<u8> {
    let mut bytes = vec![0u8; HEADER_LEN];
    bytes[0..4].copy_from_slice(b"RIFF");
    bytes[8..12].copy_from_slice(b"WAVE");
    bytes[12..16].copy_from_slice(b"fmt ");
    bytes[16..20].copy_from_slice(&16u32.to_le_bytes());
    bytes[20..22].copy_from_slice(&1u16.to_le_bytes());
    bytes[22..24].copy_from_slice(&channels.to_le_bytes());
    bytes[24..28].copy_from_slice(&rate.to_le_bytes());
    bytes[34..36].copy_from_slice(&bits.to_le_bytes());
    bytes[36..40].copy_from_slice(b"data");
    bytes[40..44].copy_from_slice(&u32::try_from(data_len).expect("small").to_le_bytes());
    bytes.extend((0..data_len).map(|i| i as u8));
    bytes
}

fn admitted() -> SessionGuard {
    let guard = SessionGuard::new();
    assert!(guard.try_acquire());
    guard
}

fn engine() -> PlaybackEngine<FRAME> {
    PlaybackEngine::new(EngineConfig::default())
}

#[tokio::test]
async fn test_final_short_frame_is_written_then_stream_ends() {
    let guard = admitted();
    let mut storage = MockStorage::new().with_file("1.wav", wav(8000, 1, 16, 2 * FRAME + 100));
    let mut audio = MockAudio::new();

    let report = engine()
        .play(&guard, &mut storage, &mut audio, Some("1.wav"))
        .await;

    assert_eq!(report.outcome, SessionOutcome::Completed);
    assert_eq!(report.frames_written, 3);
    assert_eq!(report.write_failures, 0);
    let lens: Vec<usize> = audio.frames().iter().map(Vec::len).collect();
    assert_eq!(lens, vec![FRAME, FRAME, 100]);
    assert_eq!(audio.frames()[0][..4], [0, 1, 2, 3], "samples start after the header");
    assert_eq!(audio.config().map(|c| c.sample_rate), Some(8000));
    assert_eq!(audio.releases(), 1);
    assert_eq!((storage.mounts(), storage.unmounts()), (1, 1));
    assert_eq!(guard.state(), SessionState::Idle);
}

#[tokio::test]
async fn test_exact_multiple_ends_on_empty_read() {
    let guard = admitted();
    let mut storage = MockStorage::new().with_file("2.wav", wav(16_000, 2, 16, 2 * FRAME));
    let mut audio = MockAudio::new();

    let report = engine()
        .play(&guard, &mut storage, &mut audio, Some("2.wav"))
        .await;

    assert_eq!(report.outcome, SessionOutcome::Completed);
    assert_eq!(report.frames_written, 2);
    assert_eq!(audio.attempts(), 2, "a zero-byte read writes nothing");
}

#[tokio::test]
async fn test_chunked_storage_still_fills_frames() {
    let guard = admitted();
    let mut storage = MockStorage::new()
        .with_file("1.wav", wav(8000, 1, 16, FRAME + 10))
        .with_read_chunk(100);
    let mut audio = MockAudio::new();

    let report = engine()
        .play(&guard, &mut storage, &mut audio, Some("1.wav"))
        .await;

    let lens: Vec<usize> = audio.frames().iter().map(Vec::len).collect();
    assert_eq!(lens, vec![FRAME, 10]);
    assert_eq!(report.header.map(|h| h.channels), Some(1));
}

#[tokio::test]
async fn test_write_failure_is_skipped() {
    let guard = admitted();
    let mut storage = MockStorage::new().with_file("1.wav", wav(8000, 1, 16, 3 * FRAME));
    let mut audio = MockAudio::new().failing_writes(&[1]);

    let report = engine()
        .play(&guard, &mut storage, &mut audio, Some("1.wav"))
        .await;

    assert_eq!(report.outcome, SessionOutcome::Completed);
    assert_eq!(report.frames_written, 2);
    assert_eq!(report.write_failures, 1);
    assert_eq!(audio.attempts(), 3);
}

#[tokio::test]
async fn test_stalled_write_times_out_and_playback_continues() {
    let guard = admitted();
    let mut storage = MockStorage::new().with_file("1.wav", wav(8000, 1, 16, 3 * FRAME));
    let mut audio = MockAudio::new().stalling_writes(&[0]);
    let engine = PlaybackEngine::<FRAME>::new(EngineConfig {
        write_timeout: Duration::from_millis(20),
    });

    let report = engine
        .play(&guard, &mut storage, &mut audio, Some("1.wav"))
        .await;

    assert_eq!(report.outcome, SessionOutcome::Completed);
    assert_eq!(report.write_failures, 1);
    assert_eq!(report.frames_written, 2);
    assert_eq!(guard.state(), SessionState::Idle);
}

#[tokio::test]
async fn test_read_error_ends_session_with_full_teardown() {
    let guard = admitted();
    let mut storage = MockStorage::new()
        .with_file("1.wav", wav(8000, 1, 16, 4 * FRAME))
        .with_read_error_at((HEADER_LEN + FRAME) as u64);
    let mut audio = MockAudio::new();

    let report = engine()
        .play(&guard, &mut storage, &mut audio, Some("1.wav"))
        .await;

    assert_eq!(report.outcome, SessionOutcome::ReadFailed);
    assert_eq!(report.frames_written, 1);
    assert_eq!(audio.releases(), 1);
    assert!(!storage.is_mounted());
    assert_eq!(guard.state(), SessionState::Idle);
}

#[tokio::test]
async fn test_mount_failure_is_a_clean_no_op() {
    let guard = admitted();
    let mut storage = MockStorage::new()
        .with_file("1.wav", wav(8000, 1, 16, FRAME))
        .with_failing_mount();
    let mut audio = MockAudio::new();

    let report = engine()
        .play(&guard, &mut storage, &mut audio, Some("1.wav"))
        .await;

    assert_eq!(report.outcome, SessionOutcome::MountFailed);
    assert_eq!(storage.unmounts(), 0, "nothing to unmount");
    assert_eq!(audio.attempts(), 0);
    assert_eq!(audio.releases(), 0);
    assert_eq!(guard.state(), SessionState::Idle);
}

#[tokio::test]
async fn test_missing_file_unmounts_and_frees_guard() {
    let guard = admitted();
    let mut storage = MockStorage::new();
    let mut audio = MockAudio::new();

    let report = engine()
        .play(&guard, &mut storage, &mut audio, Some("9.wav"))
        .await;

    assert_eq!(report.outcome, SessionOutcome::OpenFailed);
    assert_eq!((storage.mounts(), storage.unmounts()), (1, 1));
    assert_eq!(guard.state(), SessionState::Idle);
}

#[tokio::test]
async fn test_unset_index_plays_nothing() {
    let guard = admitted();
    let mut storage = MockStorage::new().with_file("1.wav", wav(8000, 1, 16, FRAME));
    let mut audio = MockAudio::new();

    let report = engine().play(&guard, &mut storage, &mut audio, None).await;

    assert_eq!(report.outcome, SessionOutcome::NoSound);
    assert_eq!(audio.attempts(), 0);
    assert_eq!(audio.config(), None);
    assert!(!storage.is_mounted());
    assert_eq!(guard.state(), SessionState::Idle);
}

#[tokio::test]
async fn test_truncated_header_is_malformed() {
    let guard = admitted();
    let mut storage = MockStorage::new().with_file("1.wav", vec![0u8; 20]);
    let mut audio = MockAudio::new();

    let report = engine()
        .play(&guard, &mut storage, &mut audio, Some("1.wav"))
        .await;

    assert_eq!(report.outcome, SessionOutcome::MalformedHeader);
    assert_eq!(audio.config(), None);
    assert_eq!(storage.unmounts(), 1);
}

#[tokio::test]
async fn test_zero_sample_rate_is_malformed() {
    let guard = admitted();
    let mut storage = MockStorage::new().with_file("1.wav", wav(0, 1, 16, FRAME));
    let mut audio = MockAudio::new();

    let report = engine()
        .play(&guard, &mut storage, &mut audio, Some("1.wav"))
        .await;

    assert_eq!(report.outcome, SessionOutcome::MalformedHeader);
    assert_eq!(audio.attempts(), 0);
}

#[tokio::test]
async fn test_configure_failure_skips_stream() {
    let guard = admitted();
    let mut storage = MockStorage::new().with_file("1.wav", wav(8000, 1, 16, FRAME));
    let mut audio = MockAudio::new().with_failing_configure();

    let report = engine()
        .play(&guard, &mut storage, &mut audio, Some("1.wav"))
        .await;

    assert_eq!(report.outcome, SessionOutcome::ConfigureFailed);
    assert_eq!(audio.attempts(), 0);
    assert_eq!(audio.releases(), 0);
    assert_eq!(storage.unmounts(), 1);
    assert_eq!(guard.state(), SessionState::Idle);
}

#[tokio::test]
async fn test_frames_are_paced_by_sample_rate() {
    // 100 Hz gives a 10 ms interval, waited before each of the three reads.
    let guard = admitted();
    let mut storage = MockStorage::new().with_file("1.wav", wav(100, 1, 8, 2 * FRAME + 100));
    let mut audio = MockAudio::new();

    let start = Instant::now();
    let report = engine()
        .play(&guard, &mut storage, &mut audio, Some("1.wav"))
        .await;
    let elapsed = start.elapsed();

    assert_eq!(report.frames_written, 3);
    assert_eq!(
        report.header.map(|h| h.frame_interval()),
        Some(Duration::from_millis(10))
    );
    assert!(
        elapsed >= Duration::from_millis(30),
        "three frames took only {} ms",
        elapsed.as_millis()
    );
}

#[tokio::test]
async fn test_teardown_order_output_file_volume_guard() {
    let guard = Rc::new(admitted());
    let state_at_unmount = Rc::new(Cell::new(None));
    let log = EventLog::default();
    let mut storage = MockStorage::new()
        .with_file("1.wav", wav(8000, 1, 16, FRAME + 10))
        .with_log(&log)
        .with_unmount_hook({
            let guard = Rc::clone(&guard);
            let seen = Rc::clone(&state_at_unmount);
            move || seen.set(Some(guard.state()))
        });
    let mut audio = MockAudio::new().with_log(&log);

    let report = engine()
        .play(&guard, &mut storage, &mut audio, Some("1.wav"))
        .await;

    assert_eq!(report.outcome, SessionOutcome::Completed);
    assert_eq!(
        *log.borrow(),
        vec!["mount", "open", "configure", "release", "close", "unmount"]
    );
    assert_eq!(state_at_unmount.get(), Some(SessionState::Playing));
    assert_eq!(guard.state(), SessionState::Idle);
}

#[tokio::test]
async fn test_teardown_order_after_read_error() {
    let guard = admitted();
    let log = EventLog::default();
    let mut storage = MockStorage::new()
        .with_file("1.wav", wav(8000, 1, 16, 2 * FRAME))
        .with_read_error_at(HEADER_LEN as u64)
        .with_log(&log);
    let mut audio = MockAudio::new().with_log(&log);

    let report = engine()
        .play(&guard, &mut storage, &mut audio, Some("1.wav"))
        .await;

    assert_eq!(report.outcome, SessionOutcome::ReadFailed);
    assert_eq!(
        *log.borrow(),
        vec!["mount", "open", "configure", "release", "close", "unmount"]
    );
}

#[tokio::test]
async fn test_configure_failure_still_closes_before_unmount() {
    let guard = admitted();
    let log = EventLog::default();
    let mut storage = MockStorage::new()
        .with_file("1.wav", wav(8000, 1, 16, FRAME))
        .with_log(&log);
    let mut audio = MockAudio::new().with_failing_configure().with_log(&log);

    engine()
        .play(&guard, &mut storage, &mut audio, Some("1.wav"))
        .await;

    assert_eq!(*log.borrow(), vec!["mount", "open", "close", "unmount"]);
}
