//! Frame compositor
//!
//! Once per tick: draw the face into the off-screen [`Frame`], blit it to the
//! [`FrameSink`], then act on the mode edge. Entering Special plays the
//! episode sound at most once; leaving Special re-arms it.

use platform::FrameSink;
use ui::{AnimationState, Mode, ModeEdge, PlayedFlag};

use crate::audio::{CueOutcome, SoundCue};
use crate::display::Frame;
use crate::ui::{EyeLayout, EyeRenderer};

/// What one [`FrameCompositor::render`] call did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RenderReport {
    /// Mode transition observed this tick, if any.
    pub edge: Option<ModeEdge>,
    /// Outcome of the sound cue, if it was asked to play.
    pub sound: Option<CueOutcome>,
    /// Whether the sink accepted the frame.
    pub pushed: bool,
}

/// Draws frames and triggers the episode sound on mode entry.
pub struct FrameCompositor<'a, K> {
    frame: Frame<'a>,
    sink: K,
    layout: EyeLayout,
    previous_mode: Mode,
    played: PlayedFlag,
}

impl<'a, K: FrameSink> FrameCompositor<'a, K> {
    /// Compositor drawing into `frame` and pushing to `sink`.
    pub fn new(frame: Frame<'a>, sink: K, layout: EyeLayout) -> Self {
        Self { frame, sink, layout, previous_mode: Mode::Normal, played: PlayedFlag::default() }
    }

    /// Render `state`, push it, and play `cue` on a Normal→Special edge.
    ///
    /// Sink errors are logged and never stop the animation.
    pub async fn render<Q: SoundCue>(&mut self, state: &AnimationState, cue: &mut Q) -> RenderReport {
        if let Err(never) = EyeRenderer::render(&mut self.frame, &self.layout, state) {
            match never {}
        }

        let pushed = match self.sink.push_frame(self.frame.as_bytes()).await {
            Ok(()) => true,
            Err(_) => {
                warn!("frame push failed");
                false
            }
        };

        let mode = state.mode();
        let edge = Mode::edge(self.previous_mode, mode);
        self.previous_mode = mode;

        let sound = match edge {
            Some(ModeEdge::Entered) if !self.played.is_set() => {
                info!("special mode entered; playing episode sound");
                let outcome = cue.play_episode_sound().await;
                if outcome.started() {
                    self.played.set();
                } else {
                    debug!("no session started; flag stays clear");
                }
                Some(outcome)
            }
            Some(ModeEdge::Exited) => {
                self.played.clear();
                None
            }
            _ => None,
        };

        RenderReport { edge, sound, pushed }
    }

    /// Whether this Special episode has already played its sound.
    pub fn played(&self) -> bool {
        self.played.is_set()
    }

    /// The pixel sink.
    pub fn sink(&self) -> &K {
        &self.sink
    }

    /// The most recently drawn frame.
    pub fn frame(&self) -> &Frame<'a> {
        &self.frame
    }
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    clippy::indexing_slicing,
    clippy::arithmetic_side_effects
)]
mod tests {
    use super::*;
    use crate::display::FRAME_BYTES;
    use embedded_graphics::pixelcolor::{IntoStorage, Rgb565};
    use embedded_graphics::prelude::RgbColor;
    use platform::mocks::MockFrameSink;
    use playback::{AudioError, PlaybackReport};
    use rand::rngs::SmallRng;
    use rand::SeedableRng;
    use ui::AnimationConfig;

    /// Cue returning a fixed outcome and counting calls.
    struct ScriptedCue {
        outcome: CueOutcome,
        calls: usize,
    }

    impl ScriptedCue {
        fn new(outcome: CueOutcome) -> Self {
            Self { outcome, calls: 0 }
        }
    }

    impl SoundCue for ScriptedCue {
        async fn play_episode_sound(&mut self) -> CueOutcome {
            self.calls += 1;
            self.outcome
        }
    }

    fn state(mode: Mode) -> AnimationState {
        let mut s = AnimationState::new(0, &mut SmallRng::seed_from_u64(3), AnimationConfig::default());
        s.set_mode(mode);
        s
    }

    #[tokio::test]
    async fn test_every_render_pushes_a_full_frame() {
        let mut buf = vec![0u8; FRAME_BYTES];
        let mut comp = FrameCompositor::new(Frame::new(&mut buf).unwrap(), MockFrameSink::new(), EyeLayout::default());
        let mut cue = ScriptedCue::new(CueOutcome::SourceUnavailable);

        let report = comp.render(&state(Mode::Normal), &mut cue).await;
        assert!(report.pushed);
        assert_eq!(report.edge, None);
        assert_eq!(comp.sink().frames(), 1);
        assert_eq!(comp.sink().last_frame().len(), FRAME_BYTES);
        assert_eq!(comp.sink().pixel(140, 120), Some(Rgb565::WHITE.into_storage()));
        assert_eq!(cue.calls, 0);
    }

    #[tokio::test]
    async fn test_entry_plays_once_then_latches() {
        let mut buf = vec![0u8; FRAME_BYTES];
        let mut comp = FrameCompositor::new(Frame::new(&mut buf).unwrap(), MockFrameSink::new(), EyeLayout::default());
        let mut cue = ScriptedCue::new(CueOutcome::Played(PlaybackReport::default()));
        let special = state(Mode::Special);

        let first = comp.render(&special, &mut cue).await;
        assert_eq!(first.edge, Some(ModeEdge::Entered));
        assert!(first.sound.is_some());
        assert!(comp.played());

        for _ in 0..10 {
            let report = comp.render(&special, &mut cue).await;
            assert_eq!(report.edge, None);
            assert_eq!(report.sound, None);
        }
        assert_eq!(cue.calls, 1);
    }

    #[tokio::test]
    async fn test_exit_clears_flag_and_next_entry_plays_again() {
        let mut buf = vec![0u8; FRAME_BYTES];
        let mut comp = FrameCompositor::new(Frame::new(&mut buf).unwrap(), MockFrameSink::new(), EyeLayout::default());
        let mut cue = ScriptedCue::new(CueOutcome::Interrupted(AudioError::DeadlineExceeded));

        comp.render(&state(Mode::Special), &mut cue).await;
        assert!(comp.played());

        let exit = comp.render(&state(Mode::Normal), &mut cue).await;
        assert_eq!(exit.edge, Some(ModeEdge::Exited));
        assert!(!comp.played());

        comp.render(&state(Mode::Special), &mut cue).await;
        assert_eq!(cue.calls, 2);
    }

    #[tokio::test]
    async fn test_unavailable_cue_does_not_latch() {
        let mut buf = vec![0u8; FRAME_BYTES];
        let mut comp = FrameCompositor::new(Frame::new(&mut buf).unwrap(), MockFrameSink::new(), EyeLayout::default());
        let mut cue = ScriptedCue::new(CueOutcome::ChannelUnavailable(AudioError::NotConfigured));

        let report = comp.render(&state(Mode::Special), &mut cue).await;
        assert_eq!(report.sound, Some(CueOutcome::ChannelUnavailable(AudioError::NotConfigured)));
        assert!(!comp.played());
    }

    #[tokio::test]
    async fn test_sink_failure_is_not_fatal() {
        let mut buf = vec![0u8; FRAME_BYTES];
        let mut comp = FrameCompositor::new(Frame::new(&mut buf).unwrap(), MockFrameSink::failing(), EyeLayout::default());
        let mut cue = ScriptedCue::new(CueOutcome::Played(PlaybackReport::default()));

        let report = comp.render(&state(Mode::Special), &mut cue).await;
        assert!(!report.pushed);
        assert_eq!(cue.calls, 1);
        assert_eq!(comp.frame().pixel(140, 120), Some(Rgb565::WHITE));
    }
}
