//! Face mode, mode edges and the one-shot playback latch.

/// What the face is showing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Mode {
    /// Round pupils that wander.
    #[default]
    Normal,
    /// `$` glyphs in place of pupils; entering it plays the cash sound.
    Special,
}

impl Mode {
    /// The other mode.
    #[must_use]
    pub fn toggled(self) -> Self {
        match self {
            Self::Normal => Self::Special,
            Self::Special => Self::Normal,
        }
    }

    /// Transition between two consecutive observations, if any.
    #[must_use]
    pub fn edge(previous: Self, current: Self) -> Option<ModeEdge> {
        match (previous, current) {
            (Self::Normal, Self::Special) => Some(ModeEdge::Entered),
            (Self::Special, Self::Normal) => Some(ModeEdge::Exited),
            _ => None,
        }
    }
}

/// Change of [`Mode`] between two frames.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ModeEdge {
    /// Normal → Special.
    Entered,
    /// Special → Normal.
    Exited,
}

/// Latch allowing at most one playback per Special episode.
///
/// Set when a playback starts, cleared exactly once when the face returns to
/// [`Mode::Normal`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PlayedFlag {
    set: bool,
}

impl PlayedFlag {
    /// `true` once this episode's sound has been played.
    #[must_use]
    pub fn is_set(&self) -> bool {
        self.set
    }

    /// Latch the flag.
    pub fn set(&mut self) {
        self.set = true;
    }

    /// Release the flag for the next episode.
    pub fn clear(&mut self) {
        self.set = false;
    }
}
