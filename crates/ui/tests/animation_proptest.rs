//! Property-based tests for the eye animation.
//! Invariants must hold for every seed and every tick cadence, not just 30 ms.

#![allow(clippy::arithmetic_side_effects, clippy::unwrap_used)]

use proptest::prelude::*;
use rand::rngs::SmallRng;
use rand::SeedableRng;
use ui::{AnimationConfig, AnimationState, Mode};

proptest! {
    /// The pupil never leaves the travel envelope and never moves more than
    /// one unit per axis per tick.
    #[test]
    fn pupil_stays_in_envelope_and_moves_slowly(
        seed in any::<u64>(),
        steps in proptest::collection::vec(1u64..200, 1..400),
    ) {
        let cfg = AnimationConfig::default();
        let mut rng = SmallRng::seed_from_u64(seed);
        let mut now = 0u64;
        let mut state = AnimationState::new(now, &mut rng, cfg);
        for dt in steps {
            let before = state.pupil();
            now += dt;
            state.advance(now, &mut rng);
            let after = state.pupil();
            prop_assert!(after.dx.abs() <= i32::from(cfg.max_dx));
            prop_assert!(after.dy.abs() <= i32::from(cfg.max_dy));
            prop_assert!((after.dx - before.dx).abs() <= 1);
            prop_assert!((after.dy - before.dy).abs() <= 1);
            prop_assert!(state.target().dx.abs() <= i32::from(cfg.max_dx));
            prop_assert!(state.target().dy.abs() <= i32::from(cfg.max_dy));
        }
    }

    /// The mode only flips once its deadline has passed, and every flip
    /// schedules the next one 4–8 s later.
    #[test]
    fn mode_flips_only_at_deadline(
        seed in any::<u64>(),
        steps in proptest::collection::vec(1u64..500, 1..300),
    ) {
        let mut rng = SmallRng::seed_from_u64(seed);
        let mut now = 0u64;
        let mut state = AnimationState::new(now, &mut rng, AnimationConfig::default());
        for dt in steps {
            let mode = state.mode();
            let deadline = state.next_mode_at();
            now += dt;
            state.advance(now, &mut rng);
            if now < deadline {
                prop_assert_eq!(state.mode(), mode);
                prop_assert_eq!(state.next_mode_at(), deadline);
            } else {
                prop_assert_eq!(state.mode(), mode.toggled());
                prop_assert!(state.next_mode_at() >= now + 4000);
                prop_assert!(state.next_mode_at() < now + 8000);
            }
        }
    }

    /// A blink never ends before its hold time and always ends on the first
    /// tick at or after it; the next blink is always 2–5 s away.
    #[test]
    fn blinks_are_bounded(
        seed in any::<u64>(),
        steps in proptest::collection::vec(1u64..300, 1..400),
    ) {
        let mut rng = SmallRng::seed_from_u64(seed);
        let mut now = 0u64;
        let mut state = AnimationState::new(now, &mut rng, AnimationConfig::default());
        for dt in steps {
            let was_blinking = state.is_blinking();
            let ends = state.blink_ends_at();
            now += dt;
            state.advance(now, &mut rng);
            if was_blinking {
                prop_assert_eq!(state.is_blinking(), now < ends);
                if !state.is_blinking() {
                    prop_assert!(state.next_blink_at() >= now + 2000);
                    prop_assert!(state.next_blink_at() < now + 5000);
                }
            } else if state.is_blinking() {
                prop_assert_eq!(state.blink_ends_at(), now + 120);
            }
        }
    }
}

/// `Mode::edge` agrees with the flips produced by `advance`.
#[test]
fn edges_alternate_entered_and_exited() {
    let mut rng = SmallRng::seed_from_u64(42);
    let mut state = AnimationState::new(0, &mut rng, AnimationConfig::default());
    let mut last = state.mode();
    let mut edges = Vec::new();
    for tick in 1..3000u64 {
        state.advance(tick * 30, &mut rng);
        if let Some(edge) = Mode::edge(last, state.mode()) {
            edges.push(edge);
        }
        last = state.mode();
    }
    assert!(edges.len() >= 2);
    for pair in edges.windows(2) {
        assert_ne!(pair[0], pair[1]);
    }
    assert_eq!(edges[0], ui::ModeEdge::Entered);
}
