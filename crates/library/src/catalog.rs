//! Sound catalog: a fixed table from catalog index to filename.
//!
//! Built once at boot by listing the volume root, then read-only. An index
//! with no file stays unset and resolves to nothing; playback for it is a
//! silent no-op.

use platform::Storage;

use crate::scanner::{NameClass, Scanner};

/// Number of selectable sounds (indices `0..CATALOG_SLOTS`).
pub const CATALOG_SLOTS: usize = 10;

/// Longest filename the catalog stores, in bytes.
pub const MAX_NAME_LEN: usize = 64;

/// Bounded filename stored in a catalog slot.
pub type SoundName = heapless::String<MAX_NAME_LEN>;

/// Why a directory entry could not be placed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CatalogError {
    /// Name longer than [`MAX_NAME_LEN`].
    NameTooLong,
    /// Every slot is already taken.
    NoFreeSlot,
}

impl core::fmt::Display for CatalogError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::NameTooLong => f.write_str("filename too long"),
            Self::NoFreeSlot => f.write_str("no free catalog slot"),
        }
    }
}

const EMPTY: Option<SoundName> = None;

/// Catalog of sound files by index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SoundCatalog {
    slots: [Option<SoundName>; CATALOG_SLOTS],
}

impl SoundCatalog {
    /// A catalog with every index unset.
    pub const fn new() -> Self {
        Self {
            slots: [EMPTY; CATALOG_SLOTS],
        }
    }

    /// Build the catalog from the volume root.
    ///
    /// Mounts `storage`, lists the root once and unmounts again. Nothing
    /// here is fatal: an absent card or a failed listing leaves the affected
    /// indices unset and is only logged.
    pub async fn build<S: Storage>(storage: &mut S) -> Self {
        let mut catalog = Self::new();

        if let Err(e) = storage.mount().await {
            tracing::warn!(error = ?e, "catalog: storage mount failed, no sounds available");
            return catalog;
        }

        let listed = storage
            .list_dir(&mut |name| {
                tracing::debug!(name, "catalog: directory entry");
                match catalog.place(name) {
                    Ok(Some(index)) => tracing::info!(index, name, "catalog: sound registered"),
                    Ok(None) => {}
                    Err(reason) => tracing::warn!(name, %reason, "catalog: entry dropped"),
                }
            })
            .await;
        if let Err(e) = listed {
            tracing::warn!(error = ?e, "catalog: directory listing failed");
        }

        if let Err(e) = storage.unmount().await {
            tracing::warn!(error = ?e, "catalog: storage unmount failed");
        }

        tracing::info!(sounds = catalog.len(), "catalog: ready");
        catalog
    }

    /// Place one directory entry.
    ///
    /// Returns the index it landed in, or `Ok(None)` for names that are not
    /// sound files. A digit-prefixed name replaces whatever held its slot.
    ///
    /// # Errors
    ///
    /// [`CatalogError::NameTooLong`] or [`CatalogError::NoFreeSlot`]; the
    /// catalog is unchanged.
    pub fn place(&mut self, name: &str) -> Result<Option<u8>, CatalogError> {
        let index = match Scanner::classify(name) {
            NameClass::Ignored => return Ok(None),
            NameClass::Slot(index) => index,
            NameClass::Sound => self.first_free().ok_or(CatalogError::NoFreeSlot)?,
        };
        let stored = SoundName::try_from(name).map_err(|_| CatalogError::NameTooLong)?;
        let slot = self
            .slots
            .get_mut(usize::from(index))
            .ok_or(CatalogError::NoFreeSlot)?;
        if let Some(previous) = slot.replace(stored) {
            tracing::warn!(index, previous = previous.as_str(), name, "catalog: slot replaced");
        }
        Ok(Some(index))
    }

    /// Filename for `index`, or `None` when the slot is unset or out of range.
    pub fn get(&self, index: u8) -> Option<&str> {
        self.slots
            .get(usize::from(index))
            .and_then(Option::as_ref)
            .map(SoundName::as_str)
    }

    /// Number of populated slots.
    pub fn len(&self) -> usize {
        self.slots.iter().filter(|slot| slot.is_some()).count()
    }

    /// Returns `true` when no sound was found.
    pub fn is_empty(&self) -> bool {
        self.slots.iter().all(Option::is_none)
    }

    /// Populated slots in index order.
    pub fn iter(&self) -> impl Iterator<Item = (u8, &str)> {
        (0u8..).zip(self.slots.iter()).filter_map(|(index, slot)| {
            slot.as_ref().map(|name| (index, name.as_str()))
        })
    }

    fn first_free(&self) -> Option<u8> {
        (0u8..)
            .zip(self.slots.iter())
            .find(|(_, slot)| slot.is_none())
            .map(|(index, _)| index)
    }
}

impl Default for SoundCatalog {
    fn default() -> Self {
        Self::new()
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
    fn test_catalog_starts_empty() {
        let catalog = SoundCatalog::new();
        assert!(catalog.is_empty());
        assert_eq!(catalog.get(0), None);
        assert_eq!(catalog.get(200), None);
    }

    #[test]
    fn test_digit_name_claims_its_slot() {
        let mut catalog = SoundCatalog::new();
        assert_eq!(catalog.place("7.wav"), Ok(Some(7)));
        assert_eq!(catalog.get(7), Some("7.wav"));
        assert_eq!(catalog.len(), 1);
    }

    #[test]
    fn test_sound_takes_lowest_free_slot() {
        let mut catalog = SoundCatalog::new();
        catalog.place("0.wav").expect("slot 0");
        assert_eq!(catalog.place("BELL.WAV"), Ok(Some(1)));
        assert_eq!(catalog.place("CHIME.WAV"), Ok(Some(2)));
    }

    #[test]
    fn test_later_digit_name_replaces_slot() {
        let mut catalog = SoundCatalog::new();
        catalog.place("BELL.WAV").expect("slot 0");
        assert_eq!(catalog.place("0-door.wav"), Ok(Some(0)));
        assert_eq!(catalog.get(0), Some("0-door.wav"));
    }

    #[test]
    fn test_ignored_names_do_not_change_catalog() {
        let mut catalog = SoundCatalog::new();
        assert_eq!(catalog.place("notes.txt"), Ok(None));
        assert!(catalog.is_empty());
    }

    #[test]
    fn test_full_catalog_rejects_extra_sound() {
        let mut catalog = SoundCatalog::new();
        for name in ["A.WAV", "B.WAV", "C.WAV", "D.WAV", "E.WAV", "F.WAV", "G.WAV", "H.WAV", "I.WAV", "J.WAV"] {
            catalog.place(name).expect("free slot");
        }
        assert_eq!(catalog.place("K.WAV"), Err(CatalogError::NoFreeSlot));
        assert_eq!(catalog.len(), CATALOG_SLOTS);
        // A digit name still claims its slot in a full catalog.
        assert_eq!(catalog.place("4.wav"), Ok(Some(4)));
    }

    #[test]
    fn test_overlong_name_rejected() {
        let mut catalog = SoundCatalog::new();
        let long = "x".repeat(MAX_NAME_LEN) + ".wav";
        assert_eq!(catalog.place(&long), Err(CatalogError::NameTooLong));
        assert!(catalog.is_empty());
    }

    #[test]
    fn test_iter_in_index_order() {
        let mut catalog = SoundCatalog::new();
        catalog.place("5.wav").expect("slot 5");
        catalog.place("2.wav").expect("slot 2");
        let entries: Vec<(u8, &str)> = catalog.iter().collect();
        assert_eq!(entries, vec![(2, "2.wav"), (5, "5.wav")]);
    }
}
