//! Build-time configuration.
//!
//! Nothing is persisted on the device. The peer allow-list comes from the
//! `BUZZER_PEER_ADDR` environment variable at compile time:
//!
//! ```bash
//! BUZZER_PEER_ADDR=C0:FF:EE:00:00:01 cargo build -p buzzer
//! ```
//!
//! Unset, it defaults to `ADDR_ANY` and every peer is accepted (and logged).

use bluetooth::{AddressParseError, ClassifierConfig, PeerFilter, ALERT_SERVICE_UUID};
use embassy_time::Duration;
use library::CATALOG_SLOTS;
use playback::EngineConfig;

/// Peer allow-list literal baked into this build.
pub const PEER_ADDR: &str = match option_env!("BUZZER_PEER_ADDR") {
    Some(addr) => addr,
    None => PeerFilter::WILDCARD,
};

/// 16-bit service UUID that marks an alert advertisement.
pub const ALERT_SERVICE: u16 = ALERT_SERVICE_UUID;

/// Bound on a single audio buffer write.
pub const WRITE_TIMEOUT_MS: u64 = 1000;

/// Configuration error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    /// `BUZZER_PEER_ADDR` is neither `ADDR_ANY` nor a valid address.
    InvalidPeerAddress(AddressParseError),
}

impl core::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::InvalidPeerAddress(e) => write!(f, "invalid BUZZER_PEER_ADDR: {e}"),
        }
    }
}

/// Static settings for the whole pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BuzzerConfig {
    /// Classifier settings: allow-list, alert service, slot count.
    pub classifier: ClassifierConfig,
    /// Playback engine settings.
    pub engine: EngineConfig,
}

impl BuzzerConfig {
    /// The configuration compiled into this build.
    pub fn build_time() -> Result<Self, ConfigError> {
        Self::with_peer(PEER_ADDR)
    }

    /// Defaults with the allow-list parsed from `peer`.
    pub fn with_peer(peer: &str) -> Result<Self, ConfigError> {
        let peers = PeerFilter::parse(peer).map_err(ConfigError::InvalidPeerAddress)?;
        Ok(Self {
            classifier: ClassifierConfig {
                peers,
                alert_service: ALERT_SERVICE,
                slots: u8::try_from(CATALOG_SLOTS).unwrap_or(u8::MAX),
            },
            engine: EngineConfig {
                write_timeout: Duration::from_millis(WRITE_TIMEOUT_MS),
            },
        })
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
    use bluetooth::PeerAddress;

    #[test]
    fn test_wildcard_accepts_any_peer() {
        let config = BuzzerConfig::with_peer("ADDR_ANY").expect("wildcard");
        assert_eq!(config.classifier.peers, PeerFilter::Any);
        assert_eq!(config.classifier.alert_service, 0x1811);
        assert_eq!(config.classifier.slots, 10);
        assert_eq!(config.engine.write_timeout, Duration::from_millis(1000));
    }

    #[test]
    fn test_address_literal_selects_single_peer() {
        let config = BuzzerConfig::with_peer("C0:FF:EE:00:00:01").expect("literal");
        assert_eq!(
            config.classifier.peers,
            PeerFilter::Only(PeerAddress([0x01, 0x00, 0x00, 0xEE, 0xFF, 0xC0]))
        );
    }

    #[test]
    fn test_malformed_literal_is_reported() {
        assert!(matches!(
            BuzzerConfig::with_peer("C0:FF:EE"),
            Err(ConfigError::InvalidPeerAddress(_))
        ));
    }

    #[test]
    fn test_build_time_config_parses() {
        assert!(BuzzerConfig::build_time().is_ok());
    }
}
