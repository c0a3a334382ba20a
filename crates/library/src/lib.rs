//! Sound library: which file on the card plays for which alert index.
//!
//! # Modules
//!
//! - [`scanner`]: filename classification (digit slots, `.wav` extension)
//! - [`catalog`]: `SoundCatalog`, built once at boot from a mounted volume

#![cfg_attr(not(test), no_std)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::panic)]
#![deny(clippy::expect_used)]

pub mod catalog;
pub mod scanner;

pub use catalog::{CatalogError, SoundCatalog, SoundName, CATALOG_SLOTS, MAX_NAME_LEN};
pub use scanner::{NameClass, Scanner};
