//! Passive BLE advertisement handling: report types, AD structure parsing,
//! alert classification and retransmission suppression.
//!
//! The radio, the scan loop and the GAP event plumbing live outside this
//! crate; the host hands each received report to the [`Classifier`] and
//! filters accepted triggers through a [`DedupHistory`].
//!
//! This crate is `no_std` by default; it only uses `core` + `heapless`.

#![cfg_attr(not(test), no_std)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]

pub mod adv;
pub mod classifier;
pub mod dedup;
pub mod report;

pub use adv::{AdError, AdFields};
pub use classifier::{Classification, Classifier, ClassifierConfig, Rejection, ALERT_SERVICE_UUID};
pub use dedup::DedupHistory;
pub use report::{AddressParseError, AdvEventType, AdvertisementReport, PeerAddress, PeerFilter};
