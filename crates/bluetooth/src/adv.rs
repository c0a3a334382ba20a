//! Advertising data (AD structure) parsing.
//!
//! Advertising payloads are a sequence of length-type-value structures as
//! defined in Bluetooth Core Spec v5.x Vol 3, Part C, Section 11:
//!
//! ```text
//! [len][type][data: len - 1 bytes] [len][type][data] ...
//! ```
//!
//! A zero length byte ends the significant part of the payload; anything
//! after it is padding. Only the fields the alert classifier needs are
//! collected:
//!
//! - `0x02` / `0x03`: incomplete / complete list of 16-bit service UUIDs
//! - `0xFF`: manufacturer specific data

/// AD type: incomplete list of 16-bit service UUIDs.
pub const AD_TYPE_UUID16_INCOMPLETE: u8 = 0x02;
/// AD type: complete list of 16-bit service UUIDs.
pub const AD_TYPE_UUID16_COMPLETE: u8 = 0x03;
/// AD type: manufacturer specific data.
pub const AD_TYPE_MANUFACTURER_DATA: u8 = 0xFF;

/// Upper bound on collected 16-bit UUIDs. A legacy 31-byte payload holds at
/// most 14.
pub const MAX_UUIDS16: usize = 16;

/// Errors that can occur when parsing advertising data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AdError {
    /// An AD structure claims more bytes than the payload holds.
    Truncated {
        /// Offset of the offending length byte.
        offset: usize,
    },
    /// A 16-bit UUID list has an odd number of bytes.
    OddUuidList,
    /// More 16-bit UUIDs than [`MAX_UUIDS16`].
    TooManyUuids,
}

impl core::fmt::Display for AdError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Truncated { offset } => write!(f, "AD structure at {offset} runs past payload"),
            Self::OddUuidList => f.write_str("16-bit UUID list has odd length"),
            Self::TooManyUuids => f.write_str("too many 16-bit UUIDs"),
        }
    }
}

/// One AD structure, borrowed from the payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AdStructure<'a> {
    /// AD type byte.
    pub ad_type: u8,
    /// Data bytes following the type.
    pub data: &'a [u8],
}

/// Iterator over the AD structures of a payload.
///
/// Yields `Err` once and then stops when a structure is truncated.
pub struct AdStructures<'a> {
    rest: &'a [u8],
    offset: usize,
}

impl<'a> AdStructures<'a> {
    /// Iterate over `payload`.
    #[must_use]
    pub const fn new(payload: &'a [u8]) -> Self {
        Self {
            rest: payload,
            offset: 0,
        }
    }
}

impl<'a> Iterator for AdStructures<'a> {
    type Item = Result<AdStructure<'a>, AdError>;

    fn next(&mut self) -> Option<Self::Item> {
        let (&len, body) = self.rest.split_first()?;
        if len == 0 {
            self.rest = &[];
            return None;
        }
        let len = usize::from(len);
        let (Some(structure), Some(rest)) = (body.get(..len), body.get(len..)) else {
            let offset = self.offset;
            self.rest = &[];
            return Some(Err(AdError::Truncated { offset }));
        };
        self.rest = rest;
        self.offset = self.offset.saturating_add(len).saturating_add(1);
        // len >= 1, so the type byte is always present.
        let (&ad_type, data) = structure.split_first()?;
        Some(Ok(AdStructure { ad_type, data }))
    }
}

/// The advertising fields the alert pipeline consults.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AdFields<'a> {
    /// Every 16-bit service UUID, from both complete and incomplete lists.
    pub uuids16: heapless::Vec<u16, MAX_UUIDS16>,
    /// Manufacturer specific data, company identifier included. When the
    /// payload repeats the field, the last one wins.
    pub mfg_data: Option<&'a [u8]>,
}

impl<'a> AdFields<'a> {
    /// Parse a raw advertising payload.
    ///
    /// # Errors
    ///
    /// Any malformed structure fails the whole payload.
    pub fn parse(payload: &'a [u8]) -> Result<Self, AdError> {
        let mut fields = Self::default();
        for structure in AdStructures::new(payload) {
            let structure = structure?;
            match structure.ad_type {
                AD_TYPE_UUID16_INCOMPLETE | AD_TYPE_UUID16_COMPLETE => {
                    let pairs = structure.data.chunks_exact(2);
                    if !pairs.remainder().is_empty() {
                        return Err(AdError::OddUuidList);
                    }
                    for pair in pairs {
                        if let [lo, hi] = *pair {
                            fields
                                .uuids16
                                .push(u16::from_le_bytes([lo, hi]))
                                .map_err(|_| AdError::TooManyUuids)?;
                        }
                    }
                }
                AD_TYPE_MANUFACTURER_DATA => fields.mfg_data = Some(structure.data),
                _ => {}
            }
        }
        Ok(fields)
    }

    /// `true` when `uuid` is among the advertised 16-bit services.
    #[must_use]
    pub fn has_service(&self, uuid: u16) -> bool {
        self.uuids16.contains(&uuid)
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
    fn test_parse_flags_uuids_and_mfg_data() {
        let payload = [
            0x02, 0x01, 0x06, // flags
            0x05, 0x03, 0x11, 0x18, 0x0F, 0x18, // complete UUID16: 0x1811, 0x180F
            0x06, 0xFF, 0xAA, 0xBB, 0x01, 0x34, 0x12, // mfg data
        ];
        let fields = AdFields::parse(&payload).expect("well-formed payload");
        assert_eq!(&fields.uuids16[..], &[0x1811, 0x180F]);
        assert_eq!(fields.mfg_data, Some(&[0xAA_u8, 0xBB, 0x01, 0x34, 0x12][..]));
        assert!(fields.has_service(0x1811));
        assert!(!fields.has_service(0x1812));
    }

    #[test]
    fn test_parse_empty_payload_has_no_fields() {
        let fields = AdFields::parse(&[]).expect("empty is valid");
        assert!(fields.uuids16.is_empty());
        assert_eq!(fields.mfg_data, None);
    }

    #[test]
    fn test_zero_length_ends_payload() {
        let payload = [0x03, 0x02, 0x11, 0x18, 0x00, 0xFF, 0xFF, 0xFF];
        let fields = AdFields::parse(&payload).expect("padding after zero length");
        assert_eq!(&fields.uuids16[..], &[0x1811]);
    }

    #[test]
    fn test_truncated_structure_is_error() {
        let payload = [0x02, 0x01, 0x06, 0x09, 0xFF, 0x01];
        assert_eq!(
            AdFields::parse(&payload),
            Err(AdError::Truncated { offset: 3 })
        );
    }

    #[test]
    fn test_odd_uuid_list_is_error() {
        let payload = [0x04, 0x03, 0x11, 0x18, 0x0F];
        assert_eq!(AdFields::parse(&payload), Err(AdError::OddUuidList));
    }

    #[test]
    fn test_incomplete_and_complete_lists_merge() {
        let payload = [0x03, 0x02, 0x0A, 0x18, 0x03, 0x03, 0x11, 0x18];
        let fields = AdFields::parse(&payload).expect("two lists");
        assert_eq!(&fields.uuids16[..], &[0x180A, 0x1811]);
    }

    #[test]
    fn test_iterator_stops_after_error() {
        let payload = [0x05, 0x09, b'a'];
        let mut it = AdStructures::new(&payload);
        assert!(matches!(it.next(), Some(Err(AdError::Truncated { offset: 0 }))));
        assert!(it.next().is_none());
    }
}
