//! Advertisement report types and the peer allow-list.

/// HCI LE Advertising Report event type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AdvEventType {
    /// `ADV_IND` (0x00): connectable undirected, the general advertisement.
    General,
    /// `ADV_DIRECT_IND` (0x01): connectable directed.
    Directed,
    /// `ADV_SCAN_IND` (0x02): scannable undirected.
    Scannable,
    /// `ADV_NONCONN_IND` (0x03): non-connectable undirected.
    NonConnectable,
    /// `SCAN_RSP` (0x04): scan response.
    ScanResponse,
    /// Any other value reported by the controller.
    Other(u8),
}

impl AdvEventType {
    /// Decode the raw event type byte.
    #[must_use]
    pub const fn from_raw(raw: u8) -> Self {
        match raw {
            0x00 => Self::General,
            0x01 => Self::Directed,
            0x02 => Self::Scannable,
            0x03 => Self::NonConnectable,
            0x04 => Self::ScanResponse,
            other => Self::Other(other),
        }
    }

    /// Raw event type byte.
    #[must_use]
    pub const fn raw(self) -> u8 {
        match self {
            Self::General => 0x00,
            Self::Directed => 0x01,
            Self::Scannable => 0x02,
            Self::NonConnectable => 0x03,
            Self::ScanResponse => 0x04,
            Self::Other(raw) => raw,
        }
    }

    /// Only general and directed advertisements can carry an alert.
    #[must_use]
    pub const fn is_alert_capable(self) -> bool {
        matches!(self, Self::General | Self::Directed)
    }
}

/// 6-byte device address, least-significant byte first (controller order).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PeerAddress(pub [u8; 6]);

/// Error returned for a malformed `AA:BB:CC:DD:EE:FF` literal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddressParseError {
    /// Not exactly six colon-separated groups.
    WrongGroupCount,
    /// A group is not one or two hex digits.
    InvalidHex,
}

impl core::fmt::Display for AddressParseError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::WrongGroupCount => f.write_str("address needs six colon-separated groups"),
            Self::InvalidHex => f.write_str("address group is not a hex byte"),
        }
    }
}

impl PeerAddress {
    /// Parse the human-readable form, most-significant byte first.
    ///
    /// `"C0:FF:EE:00:00:01"` yields the controller-order bytes
    /// `[0x01, 0x00, 0x00, 0xEE, 0xFF, 0xC0]`.
    pub fn parse(text: &str) -> Result<Self, AddressParseError> {
        let mut bytes = [0u8; 6];
        let mut groups = text.trim().split(':');
        // Fill from the back: the first group printed is the last byte stored.
        for slot in bytes.iter_mut().rev() {
            let group = groups.next().ok_or(AddressParseError::WrongGroupCount)?;
            if group.is_empty()
                || group.len() > 2
                || !group.bytes().all(|b| b.is_ascii_hexdigit())
            {
                return Err(AddressParseError::InvalidHex);
            }
            *slot = u8::from_str_radix(group, 16).map_err(|_| AddressParseError::InvalidHex)?;
        }
        if groups.next().is_some() {
            return Err(AddressParseError::WrongGroupCount);
        }
        Ok(Self(bytes))
    }
}

impl core::fmt::Display for PeerAddress {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let [b0, b1, b2, b3, b4, b5] = self.0;
        write!(f, "{b5:02X}:{b4:02X}:{b3:02X}:{b2:02X}:{b1:02X}:{b0:02X}")
    }
}

/// Which peers may trigger an alert.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PeerFilter {
    /// Every peer is accepted; the sender is only logged.
    Any,
    /// Only this peer is accepted.
    Only(PeerAddress),
}

impl PeerFilter {
    /// Literal that selects [`PeerFilter::Any`] in configuration.
    pub const WILDCARD: &'static str = "ADDR_ANY";

    /// Parse a configuration value: [`Self::WILDCARD`] or an address literal.
    pub fn parse(text: &str) -> Result<Self, AddressParseError> {
        if text.trim() == Self::WILDCARD {
            Ok(Self::Any)
        } else {
            PeerAddress::parse(text).map(Self::Only)
        }
    }

    /// `true` when `addr` may trigger an alert.
    #[must_use]
    pub fn allows(&self, addr: &PeerAddress) -> bool {
        match self {
            Self::Any => true,
            Self::Only(expected) => expected == addr,
        }
    }
}

/// One received advertisement, borrowed from the scan layer for the duration
/// of a single classification.
#[derive(Debug, Clone, Copy)]
pub struct AdvertisementReport<'a> {
    /// Sender address.
    pub addr: PeerAddress,
    /// Event type reported by the controller.
    pub event_type: AdvEventType,
    /// Raw advertising data (AD structures).
    pub data: &'a [u8],
}

impl<'a> AdvertisementReport<'a> {
    /// Build a report from the raw values delivered by the scan callback.
    #[must_use]
    pub const fn new(addr: [u8; 6], event_type: u8, data: &'a [u8]) -> Self {
        Self {
            addr: PeerAddress(addr),
            event_type: AdvEventType::from_raw(event_type),
            data,
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

    #[test]
    fn test_address_parse_reverses_to_controller_order() {
        let addr = PeerAddress::parse("C0:FF:EE:00:00:01").expect("valid literal");
        assert_eq!(addr.0, [0x01, 0x00, 0x00, 0xEE, 0xFF, 0xC0]);
    }

    #[test]
    fn test_address_display_round_trips() {
        let addr = PeerAddress([0x01, 0x02, 0x03, 0x04, 0x05, 0xAB]);
        let shown = format!("{addr}");
        assert_eq!(shown, "AB:05:04:03:02:01");
        assert_eq!(PeerAddress::parse(&shown), Ok(addr));
    }

    #[test]
    fn test_address_parse_rejects_short_and_long() {
        assert_eq!(
            PeerAddress::parse("AA:BB:CC"),
            Err(AddressParseError::WrongGroupCount)
        );
        assert_eq!(
            PeerAddress::parse("AA:BB:CC:DD:EE:FF:00"),
            Err(AddressParseError::WrongGroupCount)
        );
    }

    #[test]
    fn test_address_parse_rejects_bad_hex() {
        assert_eq!(
            PeerAddress::parse("AA:BB:CC:DD:EE:GG"),
            Err(AddressParseError::InvalidHex)
        );
        assert_eq!(
            PeerAddress::parse("AA:BB:CC:DD:EE:123"),
            Err(AddressParseError::InvalidHex)
        );
    }

    #[test]
    fn test_address_parse_rejects_sign_prefix() {
        // u8::from_str_radix alone would take "+A" as 0x0A.
        assert_eq!(
            PeerAddress::parse("+A:BB:CC:DD:EE:FF"),
            Err(AddressParseError::InvalidHex)
        );
        assert_eq!(
            PeerFilter::parse("C0:FF:EE:00:00:+1"),
            Err(AddressParseError::InvalidHex)
        );
    }

    #[test]
    fn test_filter_wildcard_allows_everyone() {
        let filter = PeerFilter::parse("ADDR_ANY").expect("wildcard");
        assert_eq!(filter, PeerFilter::Any);
        assert!(filter.allows(&PeerAddress([0x42; 6])));
    }

    #[test]
    fn test_filter_only_matches_exact_peer() {
        let filter = PeerFilter::parse("11:22:33:44:55:66").expect("literal");
        assert!(filter.allows(&PeerAddress([0x66, 0x55, 0x44, 0x33, 0x22, 0x11])));
        assert!(!filter.allows(&PeerAddress([0x11, 0x22, 0x33, 0x44, 0x55, 0x66])));
    }

    #[test]
    fn test_event_type_raw_round_trip() {
        for raw in 0u8..=0x10 {
            assert_eq!(AdvEventType::from_raw(raw).raw(), raw);
        }
        assert!(AdvEventType::from_raw(0x00).is_alert_capable());
        assert!(AdvEventType::from_raw(0x01).is_alert_capable());
        assert!(!AdvEventType::from_raw(0x03).is_alert_capable());
    }
}
