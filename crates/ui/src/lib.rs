//! Face UI layer: eye animation with blink and mode scheduling.
//!
//! This crate is `no_std` and performs no I/O. Time is passed in as
//! milliseconds and randomness is injected, so every transition is
//! reproducible on the host.

#![cfg_attr(not(test), no_std)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::panic)]
#![deny(clippy::expect_used)]

pub mod config;
pub mod eyes;
pub mod mode;

pub use config::AnimationConfig;
pub use eyes::{AnimationState, Offset};
pub use mode::{Mode, ModeEdge, PlayedFlag};
