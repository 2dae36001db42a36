//! Episode sound
//!
//! The compositor asks for the sound through the [`SoundCue`] seam; the
//! firmware implements it with [`EpisodeSound`], which owns the asset storage
//! and the I²S [`AudioOutputChannel`](playback::AudioOutputChannel). Tests
//! substitute a scripted cue.

pub mod cue;

pub use cue::{CueOutcome, EpisodeSound, SoundCue};
