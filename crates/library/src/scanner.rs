//! Filename classification for the sound catalog.

/// Extension of playable sound files, compared case-insensitively.
pub const SOUND_EXTENSION: &str = ".wav";

/// How a filename participates in the catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum NameClass {
    /// Leading decimal digit: the file claims that slot.
    Slot(u8),
    /// Sound file without a digit prefix: takes the lowest free slot.
    Sound,
    /// Not a sound file.
    Ignored,
}

/// Stateless helper for filename classification.
pub struct Scanner;

impl Scanner {
    /// Classify a directory entry name.
    ///
    /// A leading digit wins over the extension check, so `3-door.raw`
    /// claims slot 3.
    pub fn classify(name: &str) -> NameClass {
        match name.as_bytes().first() {
            Some(&digit @ b'0'..=b'9') => NameClass::Slot(digit.wrapping_sub(b'0')),
            _ if Self::is_sound_file(name) => NameClass::Sound,
            _ => NameClass::Ignored,
        }
    }

    /// Returns `true` when `name` ends in [`SOUND_EXTENSION`].
    ///
    /// FAT short names arrive upper case, so the comparison ignores ASCII case.
    pub fn is_sound_file(name: &str) -> bool {
        let ext_len = SOUND_EXTENSION.len();
        name.len()
            .checked_sub(ext_len)
            .and_then(|start| name.get(start..))
            .is_some_and(|ext| ext.eq_ignore_ascii_case(SOUND_EXTENSION))
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
    fn test_leading_digit_claims_slot() {
        assert_eq!(Scanner::classify("1.wav"), NameClass::Slot(1));
        assert_eq!(Scanner::classify("0DOOR.WAV"), NameClass::Slot(0));
        assert_eq!(Scanner::classify("9"), NameClass::Slot(9));
    }

    #[test]
    fn test_extension_is_case_insensitive() {
        assert_eq!(Scanner::classify("BELL.WAV"), NameClass::Sound);
        assert_eq!(Scanner::classify("bell.wav"), NameClass::Sound);
        assert_eq!(Scanner::classify("Bell.Wav"), NameClass::Sound);
    }

    #[test]
    fn test_other_files_ignored() {
        assert_eq!(Scanner::classify("README.TXT"), NameClass::Ignored);
        assert_eq!(Scanner::classify("wav"), NameClass::Ignored);
        assert_eq!(Scanner::classify(""), NameClass::Ignored);
    }

    #[test]
    fn test_multibyte_name_does_not_split_char() {
        assert_eq!(Scanner::classify("ä.wav"), NameClass::Sound);
        assert_eq!(Scanner::classify("éwav"), NameClass::Ignored);
    }
}
