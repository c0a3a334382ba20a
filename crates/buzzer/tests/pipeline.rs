//! Scan-side pipeline and playback hand-off, end to end on the host.
//!
//! `CriticalSectionRawMutex` runs on the `critical-section` std
//! implementation; the pacing timer on the embassy-time std driver.

#![allow(clippy::expect_used, clippy::indexing_slicing, clippy::arithmetic_side_effects)]

use bluetooth::AdvertisementReport;
use buzzer::{Admission, Buzzer, BuzzerConfig, Dispatch};
use embassy_futures::join::join;
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use library::SoundCatalog;
use platform::mocks::{MockAudio, MockStorage};
use playback::{SessionOutcome, SessionState, HEADER_LEN};

type TestBuzzer = Buzzer<CriticalSectionRawMutex>;

const PEER: [u8; 6] = [0x01, 0x00, 0x00, 0xEE, 0xFF, 0xC0];

/// Alert advertisement: flags, UUID16 {0x1811}, manufacturer data
/// `[0x59, 0x00, index, token_lo, token_hi]`.
fn alert(index: u8, token: u16) -> Vec<u8> {
    let [lo, hi] = token.to_le_bytes();
    vec![
        0x02, 0x01, 0x06, //
        0x03, 0x03, 0x11, 0x18, //
        0x06, 0xFF, 0x59, 0x00, index, lo, hi,
    ]
}

/// 8 kHz mono 16-bit file with `data_len` sample bytes.
fn wav(data_len: usize) -> Vec<u8> {
    let mut bytes = vec![0u8; HEADER_LEN];
    bytes[22..24].copy_from_slice(&1u16.to_le_bytes());
    bytes[24..28].copy_from_slice(&8000u32.to_le_bytes());
    bytes[34..36].copy_from_slice(&16u16.to_le_bytes());
    bytes.resize(HEADER_LEN + data_len, 0x55);
    bytes
}

fn card() -> MockStorage {
    MockStorage::new()
        .with_file("1.wav", wav(1200))
        .with_file("2.wav", wav(300))
}

async fn buzzer(peer: &str, storage: &mut MockStorage) -> TestBuzzer {
    let config = BuzzerConfig::with_peer(peer).expect("valid peer");
    Buzzer::init(config, storage).await
}

#[tokio::test]
async fn test_init_builds_catalog_and_starts_idle() {
    let mut storage = card();
    let buzzer = buzzer("ADDR_ANY", &mut storage).await;
    assert_eq!(buzzer.catalog().get(1), Some("1.wav"));
    assert_eq!(buzzer.catalog().get(2), Some("2.wav"));
    assert_eq!(buzzer.state(), SessionState::Idle);
    assert!(!storage.is_mounted());
}

#[tokio::test]
async fn test_general_alert_plays_one_wav_and_trigger_reports_accepted() {
    let mut storage = card();
    let buzzer = buzzer("C0:FF:EE:00:00:01", &mut storage).await;
    let payload = alert(1, 0x1234);
    let report = AdvertisementReport::new(PEER, 0x00, &payload);

    assert_eq!(buzzer.classify_and_maybe_trigger(&report), Some("1.wav"));
    assert!(!buzzer.trigger(1), "false means accepted");
    assert_eq!(buzzer.state(), SessionState::Playing);

    let mut audio = MockAudio::new();
    let session = buzzer.play_next(&mut storage, &mut audio).await;

    assert_eq!(session.outcome, SessionOutcome::Completed);
    assert_eq!(audio.bytes_written(), 1200);
    assert_eq!(session.frames_written, 3);
    assert_eq!(buzzer.state(), SessionState::Idle);
}

#[tokio::test]
async fn test_second_request_is_busy_until_session_ends() {
    let mut storage = card();
    let buzzer = buzzer("ADDR_ANY", &mut storage).await;
    let mut audio = MockAudio::new();

    assert_eq!(buzzer.request_playback(2), Admission::Accepted);
    assert_eq!(buzzer.request_playback(1), Admission::Busy);
    assert_eq!(buzzer.state(), SessionState::Playing);

    let session = buzzer.play_next(&mut storage, &mut audio).await;
    assert_eq!(session.outcome, SessionOutcome::Completed);
    assert_eq!(audio.bytes_written(), 300, "the busy request did not replace 2.wav");
    assert_eq!(buzzer.state(), SessionState::Idle);

    assert_eq!(buzzer.request_playback(1), Admission::Accepted);
}

#[tokio::test]
async fn test_parked_worker_wakes_on_trigger() {
    let mut storage = card();
    let buzzer = buzzer("ADDR_ANY", &mut storage).await;
    let mut audio = MockAudio::new();

    let worker = buzzer.play_next(&mut storage, &mut audio);
    let scan = async {
        assert!(!buzzer.trigger(2));
        assert!(buzzer.trigger(2), "true means rejected");
    };
    let (session, ()) = join(worker, scan).await;

    assert_eq!(session.outcome, SessionOutcome::Completed);
    assert_eq!(buzzer.state(), SessionState::Idle);
}

#[tokio::test]
async fn test_retransmission_is_ignored() {
    let mut storage = card();
    let buzzer = buzzer("ADDR_ANY", &mut storage).await;
    let payload = alert(1, 0x0042);
    let report = AdvertisementReport::new(PEER, 0x00, &payload);

    assert_eq!(buzzer.on_advertisement(&report), Dispatch::Started(1));
    assert_eq!(buzzer.on_advertisement(&report), Dispatch::Ignored);

    let fresh = alert(2, 0x0043);
    let report = AdvertisementReport::new(PEER, 0x00, &fresh);
    assert_eq!(buzzer.on_advertisement(&report), Dispatch::Busy);
}

#[tokio::test]
async fn test_unknown_peer_and_wrong_event_type_are_ignored() {
    let mut storage = card();
    let buzzer = buzzer("C0:FF:EE:00:00:01", &mut storage).await;
    let payload = alert(1, 7);

    let stranger = AdvertisementReport::new([0x02; 6], 0x00, &payload);
    assert_eq!(buzzer.on_advertisement(&stranger), Dispatch::Ignored);

    let scan_rsp = AdvertisementReport::new(PEER, 0x04, &payload);
    assert_eq!(buzzer.on_advertisement(&scan_rsp), Dispatch::Ignored);
    assert_eq!(buzzer.state(), SessionState::Idle);
}

#[tokio::test]
async fn test_empty_slot_does_not_consume_token() {
    let mut catalog = SoundCatalog::new();
    catalog.place("1.wav").expect("slot 1");
    let buzzer = TestBuzzer::new(BuzzerConfig::with_peer("ADDR_ANY").expect("wildcard"), catalog);

    let empty_slot = alert(5, 0x0099);
    let report = AdvertisementReport::new(PEER, 0x00, &empty_slot);
    assert_eq!(buzzer.classify_and_maybe_trigger(&report), None);

    // Same token for a populated slot is still new.
    let populated = alert(1, 0x0099);
    let report = AdvertisementReport::new(PEER, 0x00, &populated);
    assert_eq!(buzzer.classify_and_maybe_trigger(&report), Some("1.wav"));
    assert_eq!(buzzer.classify_and_maybe_trigger(&report), None);
}

#[tokio::test]
async fn test_absent_card_session_frees_guard() {
    let mut storage = MockStorage::new().with_failing_mount();
    let buzzer = buzzer("ADDR_ANY", &mut storage).await;
    let mut audio = MockAudio::new();

    assert!(!buzzer.trigger(1));
    let session = buzzer.play_next(&mut storage, &mut audio).await;
    assert_eq!(session.outcome, SessionOutcome::MountFailed);
    assert_eq!(buzzer.state(), SessionState::Idle);
    assert!(!buzzer.trigger(1));
}
