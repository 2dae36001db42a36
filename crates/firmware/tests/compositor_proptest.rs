//! Property-based tests for the frame compositor.
//! Whatever the sequence of modes and cue outcomes, the sound is requested
//! exactly once per Special episode whose first attempt started a session.

#![allow(clippy::arithmetic_side_effects, clippy::unwrap_used, clippy::indexing_slicing)]

use firmware::{CueOutcome, EyeLayout, Frame, FrameCompositor, SoundCue, FRAME_BYTES};
use platform::mocks::MockFrameSink;
use playback::{AudioError, PlaybackReport};
use proptest::prelude::*;
use rand::rngs::SmallRng;
use rand::SeedableRng;
use ui::{AnimationConfig, AnimationState, Mode};

/// Cue that cycles through a script of outcomes.
struct ScriptedCue {
    script: Vec<CueOutcome>,
    calls: usize,
}

impl SoundCue for ScriptedCue {
    async fn play_episode_sound(&mut self) -> CueOutcome {
        let outcome = self.script[self.calls % self.script.len()];
        self.calls += 1;
        outcome
    }
}

fn outcome() -> impl Strategy<Value = CueOutcome> {
    prop_oneof![
        Just(CueOutcome::Played(PlaybackReport::default())),
        Just(CueOutcome::Interrupted(AudioError::Write)),
        Just(CueOutcome::SourceUnavailable),
        Just(CueOutcome::ChannelUnavailable(AudioError::NotConfigured)),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn one_request_per_episode(
        modes in proptest::collection::vec(any::<bool>(), 1..60),
        script in proptest::collection::vec(outcome(), 1..6),
    ) {
        let rt = tokio::runtime::Builder::new_current_thread().build().unwrap();
        rt.block_on(async {
            let mut pixels = vec![0u8; FRAME_BYTES];
            let mut comp = FrameCompositor::new(
                Frame::new(&mut pixels).unwrap(),
                MockFrameSink::new(),
                EyeLayout::default(),
            );
            let mut cue = ScriptedCue { script, calls: 0 };
            let mut state =
                AnimationState::new(0, &mut SmallRng::seed_from_u64(0), AnimationConfig::default());

            let mut previous = false;
            let mut entries = 0usize;
            for special in modes {
                state.set_mode(if special { Mode::Special } else { Mode::Normal });
                if special && !previous {
                    entries += 1;
                }
                let before = cue.calls;
                let report = comp.render(&state, &mut cue).await;
                prop_assert!(report.pushed);
                prop_assert_eq!(cue.calls - before, usize::from(special && !previous));
                if let Some(outcome) = report.sound {
                    prop_assert_eq!(comp.played(), outcome.started());
                }
                if !special {
                    prop_assert!(!comp.played());
                }
                previous = special;
            }
            prop_assert_eq!(cue.calls, entries);
            Ok(())
        })?;
    }
}
