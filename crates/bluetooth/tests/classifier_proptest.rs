//! Property-based tests for the classifier and dedup history.
//! Radio input is untrusted, so every byte sequence must classify without
//! faulting.

// Test files legitimately use expect() for readable assertions.
#![allow(clippy::expect_used, clippy::arithmetic_side_effects)]

use bluetooth::{AdvertisementReport, Classifier, ClassifierConfig, DedupHistory, ALERT_SERVICE_UUID};
use proptest::prelude::*;

/// Flags, a complete UUID16 list with `uuid`, then manufacturer data.
fn payload_with(uuid: u16, mfg: &[u8]) -> Vec<u8> {
    let [lo, hi] = uuid.to_le_bytes();
    let mut payload = vec![0x02, 0x01, 0x06, 0x03, 0x03, lo, hi];
    payload.push(u8::try_from(mfg.len() + 1).expect("short mfg data"));
    payload.push(0xFF);
    payload.extend_from_slice(mfg);
    payload
}

proptest! {
    /// Arbitrary payloads and event types never panic.
    #[test]
    fn classify_never_panics(
        addr in any::<[u8; 6]>(),
        event_type in any::<u8>(),
        data in proptest::collection::vec(any::<u8>(), 0..64),
    ) {
        let report = AdvertisementReport::new(addr, event_type, &data);
        let result = Classifier::default().classify(&report);
        if let Some(index) = result.sound_index {
            prop_assert!(index < 10);
        }
    }

    /// Event types other than general (0x00) and directed (0x01) always reject.
    #[test]
    fn unsupported_event_types_always_reject(
        event_type in 2u8..=255,
        index in 0u8..10,
        token in any::<u16>(),
    ) {
        let [lo, hi] = token.to_le_bytes();
        let data = payload_with(ALERT_SERVICE_UUID, &[0x00, 0x00, index, lo, hi]);
        let report = AdvertisementReport::new([0; 6], event_type, &data);
        prop_assert!(!Classifier::default().classify(&report).is_accepted());
    }

    /// A payload without the alert service UUID always rejects.
    #[test]
    fn missing_alert_service_always_rejects(
        uuid in any::<u16>().prop_filter("not the alert service", |u| *u != ALERT_SERVICE_UUID),
        event_type in 0u8..=1,
        index in 0u8..10,
    ) {
        let data = payload_with(uuid, &[0x00, 0x00, index, 0x01, 0x00]);
        let report = AdvertisementReport::new([0; 6], event_type, &data);
        prop_assert!(!Classifier::new(ClassifierConfig::default()).classify(&report).is_accepted());
    }

    /// A well-formed alert yields the index and the little-endian token.
    #[test]
    fn well_formed_alert_round_trips_fields(index in 0u8..10, token in any::<u16>()) {
        let [lo, hi] = token.to_le_bytes();
        let data = payload_with(ALERT_SERVICE_UUID, &[0xFF, 0xFF, index, lo, hi]);
        let report = AdvertisementReport::new([0; 6], 0x00, &data);
        let result = Classifier::default().classify(&report);
        prop_assert_eq!(result.sound_index, Some(index));
        prop_assert_eq!(result.token, token);
    }

    /// First sight is new, an immediate repeat is a duplicate.
    #[test]
    fn first_sight_new_then_duplicate(token in any::<u16>()) {
        let mut history: DedupHistory = DedupHistory::new();
        prop_assert!(!history.seen_before(token));
        prop_assert!(history.seen_before(token));
    }

    /// After N + 1 distinct tokens the oldest is forgotten.
    #[test]
    fn fifo_evicts_oldest(tokens in proptest::collection::hash_set(any::<u16>(), 6)) {
        let tokens: Vec<u16> = tokens.into_iter().collect();
        let mut history = DedupHistory::<5>::new();
        for &token in &tokens {
            prop_assert!(!history.seen_before(token));
        }
        let first = tokens.first().copied().expect("six tokens");
        prop_assert!(!history.seen_before(first));
    }
}
