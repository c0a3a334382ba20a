//! Hardware Abstraction Layer (HAL) for the Home Buzzer
//!
//! This crate provides trait-based abstractions for the two driver layers the
//! alert pipeline talks to, enabling development and testing without the
//! physical board.
//!
//! # Architecture Layers
//!
//! ```text
//! Application Layer (buzzer crate)
//!         ↓
//! Feature Layers (bluetooth, library, playback)
//!         ↓
//! Platform HAL (this crate - trait abstractions)
//!         ↓
//! Driver Layer (SD card file system, I2S output)
//! ```
//!
//! # High-Level Peripherals
//! - [`Storage`] / [`File`] - Mountable volume with a byte-stream file API
//! - [`AudioOutput`] - Blocking "write one audio buffer" output channel
//!
//! # Features
//!
//! - `std`: [`storage_local::LocalFileStorage`] and the [`mocks`] module
//! - `sdmmc`: `storage_sdmmc::SdmmcStorage` over `embedded-sdmmc`
//! - `defmt`: Enable defmt derives
//!
//! # Example
//!
//! ```no_run
//! use platform::{File, Storage};
//!
//! async fn first_bytes<S: Storage>(storage: &mut S) -> Option<usize> {
//!     storage.mount().await.ok()?;
//!     let mut file = storage.open_file("1.wav").await.ok()?;
//!     let mut buf = [0u8; 16];
//!     let n = file.read(&mut buf).await.ok();
//!     drop(file);
//!     storage.unmount().await.ok();
//!     n
//! }
//! ```

// ── Lint policy ─────────────────────────────────────────────────────────────
#![deny(clippy::unwrap_used)] // no .unwrap() in production code
#![deny(clippy::expect_used)] // no .expect() in production code
#![deny(clippy::panic)] // no panic!() in production code
#![deny(unused_must_use)]
// all Results must be handled
// ────────────────────────────────────────────────────────────────────────────
#![cfg_attr(not(any(test, feature = "std")), no_std)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::print_stdout)] // prefer tracing/defmt over println! in lib code
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(async_fn_in_trait)] // Embassy no_std: single-threaded, Send bounds not needed

pub mod audio;
pub mod config;
pub mod storage;

#[cfg(any(test, feature = "std"))]
pub mod storage_local;

#[cfg(feature = "sdmmc")]
pub mod storage_sdmmc;

#[cfg(any(test, feature = "std"))]
pub mod mocks;

// Re-export main high-level traits
pub use audio::{AudioConfig, AudioOutput};
pub use storage::{read_full, File, Storage};
