//! Home Buzzer application core.
//!
//! Listens for alert advertisements and plays the selected sound from the
//! SD card. The radio stack and the board bring-up live outside this crate;
//! the host wires them to a [`Buzzer`]:
//!
//! ```text
//! scan callback ─► Buzzer::on_advertisement ─► classify → dedup → admit
//!                                                              │ Signal<u8>
//! playback task ─► Buzzer::run_playback ◄──────────────────────┘
//!                    mount → open → header → frames → teardown
//! ```
//!
//! # Features
//!
//! - `std` - Desktop builds (local storage, mocks)
//! - `defmt` - defmt derives on the public data types (hardware builds)

#![cfg_attr(not(test), no_std)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(clippy::await_holding_lock)] // holding a blocking Mutex across .await is a bug
#![warn(clippy::print_stdout)] // prefer tracing/defmt over println! in lib code
#![allow(clippy::module_name_repetitions)]

pub mod app;
pub mod config;

pub use app::{Admission, Buzzer, Dispatch};
pub use config::{BuzzerConfig, ConfigError};
