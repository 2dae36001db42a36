//! Eye animation state machine.
//!
//! `AnimationState` is advanced once per tick with the current time and a
//! random source. It never blocks: a blink is a window of time during which
//! [`AnimationState::is_blinking`] reports `true`, not a sleep.

use rand::Rng;

use crate::config::AnimationConfig;
use crate::mode::Mode;

/// Pupil displacement from the centre of each eye, in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Offset {
    /// Horizontal displacement (positive = right).
    pub dx: i32,
    /// Vertical displacement (positive = down).
    pub dy: i32,
}

impl Offset {
    /// Create an offset.
    pub const fn new(dx: i32, dy: i32) -> Self {
        Self { dx, dy }
    }

    /// One unit per axis from `self` toward `target`.
    #[must_use]
    pub fn step_toward(self, target: Self) -> Self {
        Self { dx: step(self.dx, target.dx), dy: step(self.dy, target.dy) }
    }
}

fn step(from: i32, to: i32) -> i32 {
    from.saturating_add((to.saturating_sub(from)).signum())
}

/// Everything needed to draw one frame of the face.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnimationState {
    config: AnimationConfig,
    pupil: Offset,
    target: Offset,
    blinking: bool,
    blink_ends_at: u64,
    mode: Mode,
    next_blink_at: u64,
    next_mode_at: u64,
}

impl AnimationState {
    /// Centred pupils, eyes open, [`Mode::Normal`], with the first blink and
    /// the first mode change scheduled in the future.
    pub fn new<R: Rng + ?Sized>(now_ms: u64, rng: &mut R, config: AnimationConfig) -> Self {
        Self {
            config,
            pupil: Offset::default(),
            target: Offset::default(),
            blinking: false,
            blink_ends_at: 0,
            mode: Mode::Normal,
            next_blink_at: now_ms
                .saturating_add(jitter(rng, config.blink_min_ms, config.blink_max_ms)),
            next_mode_at: now_ms.saturating_add(jitter(rng, config.mode_min_ms, config.mode_max_ms)),
        }
    }

    /// Advance one tick.
    ///
    /// - A blink starts once `next_blink_at` is reached and ends
    ///   `blink_hold_ms` later, which schedules the next one.
    /// - The mode flips once `next_mode_at` is reached.
    /// - When the pupil has reached its target a new target is drawn within the
    ///   travel envelope; then each axis steps one unit toward it.
    pub fn advance<R: Rng + ?Sized>(&mut self, now_ms: u64, rng: &mut R) {
        let cfg = self.config;

        if self.blinking {
            if now_ms >= self.blink_ends_at {
                self.blinking = false;
                self.next_blink_at =
                    now_ms.saturating_add(jitter(rng, cfg.blink_min_ms, cfg.blink_max_ms));
            }
        } else if now_ms >= self.next_blink_at {
            self.blinking = true;
            self.blink_ends_at = now_ms.saturating_add(cfg.blink_hold_ms);
        }

        if now_ms >= self.next_mode_at {
            self.mode = self.mode.toggled();
            self.next_mode_at = now_ms.saturating_add(jitter(rng, cfg.mode_min_ms, cfg.mode_max_ms));
        }

        if self.pupil == self.target {
            let max_dx = i32::from(cfg.max_dx);
            let max_dy = i32::from(cfg.max_dy);
            self.target = Offset {
                dx: rng.random_range(max_dx.saturating_neg()..=max_dx),
                dy: rng.random_range(max_dy.saturating_neg()..=max_dy),
            };
        }
        self.pupil = self.pupil.step_toward(self.target);
    }

    /// Force the mode, e.g. from a test harness. Deadlines are left alone.
    pub fn set_mode(&mut self, mode: Mode) {
        self.mode = mode;
    }

    /// Current pupil offset.
    pub fn pupil(&self) -> Offset {
        self.pupil
    }

    /// Offset the pupil is moving toward.
    pub fn target(&self) -> Offset {
        self.target
    }

    /// `true` while the eyes are shut.
    pub fn is_blinking(&self) -> bool {
        self.blinking
    }

    /// Current mode.
    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// When the current blink ends (meaningful only while blinking).
    pub fn blink_ends_at(&self) -> u64 {
        self.blink_ends_at
    }

    /// When the next blink starts (meaningful only while open).
    pub fn next_blink_at(&self) -> u64 {
        self.next_blink_at
    }

    /// When the mode next flips.
    pub fn next_mode_at(&self) -> u64 {
        self.next_mode_at
    }

    /// Tuning in effect.
    pub fn config(&self) -> &AnimationConfig {
        &self.config
    }
}

/// Uniform draw from `[min, max)`; `min` when the range is empty.
fn jitter<R: Rng + ?Sized>(rng: &mut R, min: u64, max: u64) -> u64 {
    if max > min {
        rng.random_range(min..max)
    } else {
        min
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic, clippy::arithmetic_side_effects)]
mod tests {
    use super::*;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    fn rng() -> SmallRng {
        SmallRng::seed_from_u64(7)
    }

    #[test]
    fn test_new_state_is_centred_open_normal() {
        let state = AnimationState::new(1000, &mut rng(), AnimationConfig::default());
        assert_eq!(state.pupil(), Offset::new(0, 0));
        assert!(!state.is_blinking());
        assert_eq!(state.mode(), Mode::Normal);
    }

    #[test]
    fn test_new_state_schedules_in_the_future() {
        let state = AnimationState::new(1000, &mut rng(), AnimationConfig::default());
        assert!((3000..6000).contains(&state.next_blink_at()));
        assert!((5000..9000).contains(&state.next_mode_at()));
    }

    #[test]
    fn test_blink_starts_at_deadline_and_holds() {
        let mut r = rng();
        let mut state = AnimationState::new(0, &mut r, AnimationConfig::default());
        let at = state.next_blink_at();

        state.advance(at - 1, &mut r);
        assert!(!state.is_blinking());

        state.advance(at, &mut r);
        assert!(state.is_blinking());
        assert_eq!(state.blink_ends_at(), at + 120);

        state.advance(at + 119, &mut r);
        assert!(state.is_blinking());

        state.advance(at + 120, &mut r);
        assert!(!state.is_blinking());
        assert!(state.next_blink_at() >= at + 120 + 2000);
        assert!(state.next_blink_at() < at + 120 + 5000);
    }

    #[test]
    fn test_mode_flips_at_deadline_and_reschedules() {
        let mut r = rng();
        let mut state = AnimationState::new(0, &mut r, AnimationConfig::default());
        let at = state.next_mode_at();

        state.advance(at - 1, &mut r);
        assert_eq!(state.mode(), Mode::Normal);

        state.advance(at, &mut r);
        assert_eq!(state.mode(), Mode::Special);
        assert!((at + 4000..at + 8000).contains(&state.next_mode_at()));
    }

    #[test]
    fn test_pupil_steps_one_unit_per_axis() {
        let mut r = rng();
        let mut state = AnimationState::new(0, &mut r, AnimationConfig::default());
        for t in 1..500 {
            let before = state.pupil();
            state.advance(t, &mut r);
            let after = state.pupil();
            assert!((after.dx - before.dx).abs() <= 1);
            assert!((after.dy - before.dy).abs() <= 1);
        }
    }

    #[test]
    fn test_pupil_reaches_target_then_retargets() {
        let mut r = rng();
        let mut state = AnimationState::new(0, &mut r, AnimationConfig::default());
        state.advance(1, &mut r);
        let first_target = state.target();
        let mut reached = state.pupil() == first_target;
        // At most 30 steps per axis to reach any target from the centre.
        for t in 2..70 {
            if reached {
                break;
            }
            state.advance(t, &mut r);
            reached = state.pupil() == first_target;
        }
        assert!(reached);
    }

    #[test]
    fn test_zero_envelope_keeps_pupil_centred() {
        let cfg = AnimationConfig { max_dx: 0, max_dy: 0, ..AnimationConfig::default() };
        let mut r = rng();
        let mut state = AnimationState::new(0, &mut r, cfg);
        for t in 0..50 {
            state.advance(t, &mut r);
            assert_eq!(state.pupil(), Offset::new(0, 0));
        }
    }

    #[test]
    fn test_empty_jitter_range_uses_minimum() {
        let cfg = AnimationConfig { blink_min_ms: 300, blink_max_ms: 300, ..AnimationConfig::default() };
        let state = AnimationState::new(100, &mut rng(), cfg);
        assert_eq!(state.next_blink_at(), 400);
    }

    #[test]
    fn test_set_mode_leaves_deadlines() {
        let mut state = AnimationState::new(0, &mut rng(), AnimationConfig::default());
        let deadline = state.next_mode_at();
        state.set_mode(Mode::Special);
        assert_eq!(state.mode(), Mode::Special);
        assert_eq!(state.next_mode_at(), deadline);
    }

    #[test]
    fn test_step_toward() {
        assert_eq!(Offset::new(0, 0).step_toward(Offset::new(5, -3)), Offset::new(1, -1));
        assert_eq!(Offset::new(5, -3).step_toward(Offset::new(5, -3)), Offset::new(5, -3));
        assert_eq!(Offset::new(5, 0).step_toward(Offset::new(5, 2)), Offset::new(5, 1));
    }
}
