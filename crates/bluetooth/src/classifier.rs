//! Advertisement classifier.
//!
//! Decides, for one received report, whether it asks for a sound alert and
//! which catalog slot it selects. Classification is a pure function of the
//! report and a static [`ClassifierConfig`]: no I/O, no retained state. It
//! runs on the scan context and must never fault on untrusted radio input.
//!
//! Checks run in this order, stopping at the first failure:
//!
//! 1. event type is `ADV_IND` or `ADV_DIRECT_IND`
//! 2. sender passes the [`PeerFilter`]
//! 3. payload parses as AD structures
//! 4. the alert service UUID is advertised
//! 5. manufacturer data byte 2 is a valid slot index
//!
//! Manufacturer data layout:
//!
//! ```text
//! [0..2] company id (ignored)
//! [2]    sound index
//! [3..5] dedup token, little-endian
//! ```

use crate::adv::{AdError, AdFields};
use crate::report::{AdvertisementReport, PeerFilter};

/// Alert Notification Service, 16-bit UUID.
pub const ALERT_SERVICE_UUID: u16 = 0x1811;

/// Number of catalog slots an advertisement may select.
pub const DEFAULT_SLOTS: u8 = 10;

const MFG_INDEX_OFFSET: usize = 2;
const MFG_TOKEN_LO_OFFSET: usize = 3;
const MFG_TOKEN_HI_OFFSET: usize = 4;

/// Static classifier settings, fixed at build time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ClassifierConfig {
    /// Which senders may trigger an alert.
    pub peers: PeerFilter,
    /// 16-bit service UUID that marks an alert advertisement.
    pub alert_service: u16,
    /// Exclusive upper bound for a selectable sound index.
    pub slots: u8,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            peers: PeerFilter::Any,
            alert_service: ALERT_SERVICE_UUID,
            slots: DEFAULT_SLOTS,
        }
    }
}

/// Why a report was not accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Rejection {
    /// Event type other than general or directed advertisement.
    UnsupportedEventType(u8),
    /// Sender not on the allow-list.
    UnknownPeer,
    /// AD structures could not be parsed.
    MalformedPayload(AdError),
    /// The alert service UUID is not advertised.
    MissingAlertService,
    /// No manufacturer byte selected an in-range sound index.
    NoSoundSelected,
}

impl core::fmt::Display for Rejection {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::UnsupportedEventType(raw) => write!(f, "unsupported event type {raw:#04x}"),
            Self::UnknownPeer => f.write_str("peer not allowed"),
            Self::MalformedPayload(e) => write!(f, "malformed payload: {e}"),
            Self::MissingAlertService => f.write_str("alert service not advertised"),
            Self::NoSoundSelected => f.write_str("no sound selected"),
        }
    }
}

/// Result of classifying one report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Classification {
    /// Selected catalog slot, if any.
    pub sound_index: Option<u8>,
    /// Dedup token from manufacturer bytes 3..5. Missing bytes read as zero.
    pub token: u16,
}

impl Classification {
    /// A rejected report.
    pub const REJECTED: Self = Self {
        sound_index: None,
        token: 0,
    };

    /// `true` when a sound index was selected.
    #[must_use]
    pub const fn is_accepted(&self) -> bool {
        self.sound_index.is_some()
    }
}

/// Stateless advertisement classifier.
#[derive(Debug, Clone, Copy, Default)]
pub struct Classifier {
    config: ClassifierConfig,
}

impl Classifier {
    /// Create a classifier for `config`.
    #[must_use]
    pub const fn new(config: ClassifierConfig) -> Self {
        Self { config }
    }

    /// The configuration in use.
    #[must_use]
    pub const fn config(&self) -> &ClassifierConfig {
        &self.config
    }

    /// Classify `report`, reporting the reason for a rejection.
    ///
    /// # Errors
    ///
    /// Returns the first check the report failed.
    pub fn evaluate(&self, report: &AdvertisementReport<'_>) -> Result<Classification, Rejection> {
        if !report.event_type.is_alert_capable() {
            return Err(Rejection::UnsupportedEventType(report.event_type.raw()));
        }

        match self.config.peers {
            PeerFilter::Any => tracing::debug!(peer = %report.addr, "advertisement from any peer"),
            PeerFilter::Only(_) if !self.config.peers.allows(&report.addr) => {
                return Err(Rejection::UnknownPeer);
            }
            PeerFilter::Only(_) => {}
        }

        let fields = AdFields::parse(report.data).map_err(Rejection::MalformedPayload)?;
        if !fields.has_service(self.config.alert_service) {
            return Err(Rejection::MissingAlertService);
        }

        let mfg = fields.mfg_data.unwrap_or_default();
        let byte = |offset: usize| mfg.get(offset).copied().unwrap_or(0);
        let token = u16::from_le_bytes([byte(MFG_TOKEN_LO_OFFSET), byte(MFG_TOKEN_HI_OFFSET)]);
        let sound_index = mfg
            .get(MFG_INDEX_OFFSET)
            .copied()
            .filter(|&index| index < self.config.slots)
            .ok_or(Rejection::NoSoundSelected)?;

        Ok(Classification {
            sound_index: Some(sound_index),
            token,
        })
    }

    /// Classify `report`. Rejections are logged at debug level and collapse
    /// to [`Classification::REJECTED`].
    #[must_use]
    pub fn classify(&self, report: &AdvertisementReport<'_>) -> Classification {
        match self.evaluate(report) {
            Ok(classification) => classification,
            Err(reason) => {
                tracing::debug!(peer = %report.addr, %reason, "advertisement rejected");
                Classification::REJECTED
            }
        }
    }
}

#[cfg(test)]
#[allow(
    clippy::expect_used,
    clippy::unwrap_used,
    clippy::indexing_slicing,
    clippy::arithmetic_side_effects
)] // Tests use expect() and direct indexing for readable assertions
mod tests {
    use super::*;
    use crate::report::PeerAddress;

    const PEER: [u8; 6] = [0x01, 0x00, 0x00, 0xEE, 0xFF, 0xC0];

    fn alert_payload(mfg: &[u8]) -> heapless::Vec<u8, 31> {
        let mut payload = heapless::Vec::new();
        payload.extend_from_slice(&[0x02, 0x01, 0x06]).ok();
        payload.extend_from_slice(&[0x03, 0x03, 0x11, 0x18]).ok();
        payload.push(u8::try_from(mfg.len() + 1).unwrap_or(0)).ok();
        payload.push(0xFF).ok();
        payload.extend_from_slice(mfg).ok();
        payload
    }

    fn only_peer() -> Classifier {
        Classifier::new(ClassifierConfig {
            peers: PeerFilter::Only(PeerAddress(PEER)),
            ..ClassifierConfig::default()
        })
    }

    #[test]
    fn test_accepts_index_and_little_endian_token() {
        let payload = alert_payload(&[0xE5, 0x02, 1, 0x34, 0x12]);
        let report = AdvertisementReport::new(PEER, 0x00, &payload);
        let result = only_peer().classify(&report);
        assert!(result.is_accepted());
        assert_eq!(result.sound_index, Some(1));
        assert_eq!(result.token, 0x1234);
    }

    #[test]
    fn test_directed_advertisement_is_recognized() {
        let payload = alert_payload(&[0, 0, 7, 0x01, 0x00]);
        let report = AdvertisementReport::new(PEER, 0x01, &payload);
        assert_eq!(only_peer().evaluate(&report).map(|c| c.sound_index), Ok(Some(7)));
    }

    #[test]
    fn test_rejects_unsupported_event_type() {
        let payload = alert_payload(&[0, 0, 1, 0, 0]);
        let report = AdvertisementReport::new(PEER, 0x04, &payload);
        assert_eq!(
            only_peer().evaluate(&report),
            Err(Rejection::UnsupportedEventType(0x04))
        );
        assert_eq!(only_peer().classify(&report), Classification::REJECTED);
    }

    #[test]
    fn test_rejects_unknown_peer() {
        let payload = alert_payload(&[0, 0, 1, 0, 0]);
        let report = AdvertisementReport::new([0xAA; 6], 0x00, &payload);
        assert_eq!(only_peer().evaluate(&report), Err(Rejection::UnknownPeer));
    }

    #[test]
    fn test_wildcard_accepts_any_peer() {
        let payload = alert_payload(&[0, 0, 3, 0, 0]);
        let report = AdvertisementReport::new([0xAA; 6], 0x00, &payload);
        let result = Classifier::default().classify(&report);
        assert_eq!(result.sound_index, Some(3));
    }

    #[test]
    fn test_rejects_malformed_payload() {
        let payload = [0x09, 0xFF, 0x00];
        let report = AdvertisementReport::new(PEER, 0x00, &payload);
        assert_eq!(
            only_peer().evaluate(&report),
            Err(Rejection::MalformedPayload(AdError::Truncated { offset: 0 }))
        );
    }

    #[test]
    fn test_rejects_without_alert_service() {
        let payload = [0x03, 0x03, 0x0F, 0x18, 0x06, 0xFF, 0, 0, 1, 0, 0];
        let report = AdvertisementReport::new(PEER, 0x00, &payload);
        assert_eq!(
            only_peer().evaluate(&report),
            Err(Rejection::MissingAlertService)
        );
    }

    #[test]
    fn test_out_of_range_index_selects_nothing() {
        let payload = alert_payload(&[0, 0, 10, 0x34, 0x12]);
        let report = AdvertisementReport::new(PEER, 0x00, &payload);
        assert_eq!(
            only_peer().evaluate(&report),
            Err(Rejection::NoSoundSelected)
        );
    }

    #[test]
    fn test_short_manufacturer_data() {
        let classifier = only_peer();

        let payload = alert_payload(&[0, 0]);
        let report = AdvertisementReport::new(PEER, 0x00, &payload);
        assert_eq!(classifier.evaluate(&report), Err(Rejection::NoSoundSelected));

        // Index present, token bytes missing: token reads as zero.
        let payload = alert_payload(&[0, 0, 4]);
        let report = AdvertisementReport::new(PEER, 0x00, &payload);
        assert_eq!(
            classifier.evaluate(&report),
            Ok(Classification {
                sound_index: Some(4),
                token: 0
            })
        );
    }

    #[test]
    fn test_custom_slot_count_bounds_index() {
        let classifier = Classifier::new(ClassifierConfig {
            slots: 2,
            ..ClassifierConfig::default()
        });
        let payload = alert_payload(&[0, 0, 2, 0, 0]);
        let report = AdvertisementReport::new(PEER, 0x00, &payload);
        assert!(!classifier.classify(&report).is_accepted());
    }
}
