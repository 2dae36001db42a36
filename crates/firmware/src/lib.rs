//! Money-Eyes face firmware
//!
//! Two cartoon eyes on a 320×240 LCD. The pupils drift, the eyes blink, and
//! every few seconds the face flips into Special mode, where the pupils turn
//! into `$` signs and a cash-register sound plays once through the I²S
//! amplifier.
//!
//! # Architecture
//!
//! ```text
//! Application Layer (app, boot, compositor)
//!         ↓
//! Feature Layers (ui: animation, playback: PCM → I²S)
//!         ↓
//! Platform HAL (AudioBus, Storage, FrameSink, Clock)
//! ```
//!
//! # Features
//!
//! - `defmt` - hardware logging
//! - `tracing` - desktop logging
//! - `emulator` - desktop window via `embedded-graphics-simulator`
//! - `std` (default) - standard library (emulator and tests); hardware
//!   builds use `--no-default-features --features defmt`
//!
//! # Emulator
//!
//! ```bash
//! MONEY_EYES_ASSETS=./assets cargo run -p firmware --example face_emulator --features emulator
//! ```

#![cfg_attr(all(not(test), not(feature = "std")), no_std)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
// Critical correctness: deny these
#![deny(clippy::await_holding_lock)]
#![deny(unsafe_op_in_unsafe_fn)]
// Logging discipline
#![warn(clippy::print_stdout)]
#![warn(clippy::dbg_macro)]
// Intentional allows for this codebase:
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::return_self_not_must_use)]
#![allow(clippy::doc_markdown)]
#![allow(async_fn_in_trait)]

// Must come first so the logging macros are visible to every module.
mod fmt;

pub mod app;
pub mod audio;
pub mod boot;
pub mod compositor;
pub mod config;
pub mod display;
pub mod ui;

pub use app::FaceApp;
pub use audio::{CueOutcome, EpisodeSound, SoundCue};
pub use boot::{boot, idle_forever, BootReport, StartupError, BOOT_SEQUENCE_STEPS};
pub use compositor::{FrameCompositor, RenderReport};
pub use config::{ConfigError, FaceConfig};
pub use display::{Frame, DISPLAY_HEIGHT, DISPLAY_WIDTH, FRAME_BYTES};
pub use self::ui::{EyeLayout, EyeRenderer};
