//! Tick driver
//!
//! One tick advances the animation, renders and pushes the frame, and lets
//! the compositor play the episode sound on a Special entry. The loop then
//! sleeps for whatever is left of the frame period; a tick that overran
//! (playback blocks for up to the session deadline) starts the next one
//! immediately.

use embedded_hal_async::delay::DelayNs;
use platform::{Clock, FrameSink};
use rand::rngs::SmallRng;
use rand::SeedableRng;
use ui::AnimationState;

use crate::audio::SoundCue;
use crate::compositor::{FrameCompositor, RenderReport};
use crate::config::FaceConfig;
use crate::display::Frame;

/// The running face.
pub struct FaceApp<'a, K, Q, C> {
    state: AnimationState,
    compositor: FrameCompositor<'a, K>,
    cue: Q,
    clock: C,
    rng: SmallRng,
    frame_period_ms: u64,
    ticks: u64,
}

impl<'a, K, Q, C> FaceApp<'a, K, Q, C>
where
    K: FrameSink,
    Q: SoundCue,
    C: Clock,
{
    /// Assemble the face. `seed` feeds the animation's random source.
    pub fn new(frame: Frame<'a>, sink: K, cue: Q, clock: C, seed: u64, config: &FaceConfig) -> Self {
        let mut rng = SmallRng::seed_from_u64(seed);
        let state = AnimationState::new(clock.now_ms(), &mut rng, config.animation);
        Self {
            state,
            compositor: FrameCompositor::new(frame, sink, config.layout),
            cue,
            clock,
            rng,
            frame_period_ms: config.frame_period_ms,
            ticks: 0,
        }
    }

    /// Advance to `now_ms` and render one frame.
    pub async fn tick(&mut self, now_ms: u64) -> RenderReport {
        self.state.advance(now_ms, &mut self.rng);
        let report = self.compositor.render(&self.state, &mut self.cue).await;
        self.ticks = self.ticks.saturating_add(1);
        if let Some(edge) = report.edge {
            debug!("tick {}: mode edge {:?}", self.ticks, edge);
        }
        report
    }

    /// Tick forever at the configured frame period.
    pub async fn run<D: DelayNs>(&mut self, mut delay: D) -> ! {
        loop {
            let started = self.clock.now_ms();
            self.tick(started).await;
            let elapsed = self.clock.now_ms().saturating_sub(started);
            let remaining = self.frame_period_ms.saturating_sub(elapsed);
            if remaining > 0 {
                delay.delay_ms(u32::try_from(remaining).unwrap_or(u32::MAX)).await;
            }
        }
    }

    /// Current animation state.
    pub fn state(&self) -> &AnimationState {
        &self.state
    }

    /// Mutable animation state, for forcing a mode.
    pub fn state_mut(&mut self) -> &mut AnimationState {
        &mut self.state
    }

    /// The compositor.
    pub fn compositor(&self) -> &FrameCompositor<'a, K> {
        &self.compositor
    }

    /// The sound cue.
    pub fn cue(&self) -> &Q {
        &self.cue
    }

    /// The sound cue, mutably.
    pub fn cue_mut(&mut self) -> &mut Q {
        &mut self.cue
    }

    /// Ticks rendered so far.
    pub fn ticks(&self) -> u64 {
        self.ticks
    }
}
