//! Hardware Abstraction Layer (HAL) for the Money-Eyes face
//!
//! This crate provides trait-based abstractions for every peripheral the face
//! firmware touches, enabling development and testing without the board.
//!
//! # Architecture Layers
//!
//! ```text
//! Application Layer (firmware crate: compositor, boot, tick driver)
//!         ↓
//! Feature Layers (playback, ui)
//!         ↓
//! Platform HAL (this crate - trait abstractions)
//!         ↓
//! Hardware Layer (I²S peripheral, LCD, SD card, radio)
//! ```
//!
//! # Abstractions
//!
//! - [`AudioBus`] - I²S transmit peripheral with a DMA ring
//! - [`QuietEnvironment`] - one-time noise-reduction measures (radio off, pin pull-downs)
//! - [`Storage`] / [`File`] - byte-stream provider for the sound asset
//! - [`FrameSink`] - full-frame pixel sink (LCD blit)
//! - [`Clock`] - monotonic millisecond clock
//!
//! # Features
//!
//! - `std` (default): host support: mocks, [`storage_local`], `std::error::Error`
//! - `defmt`: enable `defmt::Format` derives for hardware logging

// ── Lint policy ─────────────────────────────────────────────────────────────
#![deny(clippy::unwrap_used)] // no .unwrap() in production code
#![deny(clippy::expect_used)] // no .expect() in production code
#![deny(clippy::panic)] // no panic!() in production code
#![deny(unused_must_use)]
// ────────────────────────────────────────────────────────────────────────────
#![cfg_attr(not(any(test, feature = "std")), no_std)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::doc_markdown)] // pin names and register names in doc comments
#![allow(clippy::must_use_candidate)] // hardware accessors, callers decide
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(async_fn_in_trait)] // Embassy no_std: single-threaded, Send bounds not needed

pub mod audio;
pub mod audio_config;
pub mod clock;
pub mod config;
pub mod display;
pub mod environment;
pub mod storage;

#[cfg(any(test, feature = "std"))]
pub mod mocks;
#[cfg(any(test, feature = "std"))]
pub mod storage_local;

// Re-export main high-level traits
pub use audio::{AudioBus, WriteTimeout};
pub use audio_config::{AudioChannelConfig, AudioConfigError, I2sPins};
pub use clock::{Clock, EmbassyClock};
pub use display::{DisplayError, FrameSink};
pub use environment::QuietEnvironment;
pub use storage::{File, Storage};
