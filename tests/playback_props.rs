//! Property tests for the playback state machine under arbitrary host input.
//!
//! 1. The displayed index always stays inside the store
//! 2. A tick moves the index by at most one frame, or rewinds it to zero
//! 3. The clock is armed exactly while playing
//! 4. Seek clamps into `0..N` and always stops

use std::time::Duration;

use asciiplay::{
    AsciiFrame, Clock, FrameStore, ManualClock, PlaybackController, TickOutcome, VideoMetadata,
};
use proptest::prelude::*;

#[derive(Debug, Clone)]
enum Op {
    Play,
    Pause,
    Toggle,
    Seek(i64),
    Step(i64),
    Restart,
    Tick(u64),
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        Just(Op::Play),
        Just(Op::Pause),
        Just(Op::Toggle),
        any::<i64>().prop_map(Op::Seek),
        (-20i64..20).prop_map(Op::Step),
        Just(Op::Restart),
        (0u64..400).prop_map(Op::Tick),
        (0u64..400).prop_map(Op::Tick),
    ]
}

fn store(count: usize, sampled_fps: f64) -> FrameStore {
    let frames = (0..count as u64)
        .map(|i| AsciiFrame::plain(i, i as f64 / sampled_fps, "."))
        .collect();
    FrameStore::new(
        frames,
        VideoMetadata {
            original_size_bytes: 0,
            duration_seconds: count as f64 / sampled_fps,
            original_fps: sampled_fps,
            sampled_fps,
            frame_count: count,
            width: 1,
            height: 1,
        },
    )
}

proptest! {
    #[test]
    fn arbitrary_operations_keep_playback_consistent(
        count in 1usize..40,
        sampled_fps in prop_oneof![Just(1.0), Just(10.0), Just(24.0), Just(60.0)],
        ops in prop::collection::vec(op_strategy(), 1..120),
    ) {
        let mut controller = PlaybackController::new(ManualClock::new());
        controller.load(store(count, sampled_fps)).unwrap();
        let mut now = Duration::ZERO;

        for op in ops {
            let before = controller.snapshot().current_frame_index;
            match op {
                Op::Play => controller.play().unwrap(),
                Op::Pause => controller.pause().unwrap(),
                Op::Toggle => controller.toggle().unwrap(),
                Op::Seek(target) => {
                    controller.seek(target).unwrap();
                    let expected = target.clamp(0, count as i64 - 1) as usize;
                    prop_assert_eq!(controller.snapshot().current_frame_index, expected);
                    prop_assert!(!controller.is_playing());
                }
                Op::Step(delta) => controller.step(delta).unwrap(),
                Op::Restart => {
                    controller.restart().unwrap();
                    prop_assert_eq!(controller.snapshot().current_frame_index, 0);
                }
                Op::Tick(delta_ms) => {
                    now += Duration::from_millis(delta_ms);
                    controller.advance_time(now);
                    let after = match controller.pump() {
                        Some(TickOutcome::Advanced(next)) => {
                            prop_assert_eq!(next, before + 1);
                            next
                        }
                        Some(TickOutcome::Finished) => {
                            prop_assert_eq!(before, count - 1);
                            0
                        }
                        _ => before,
                    };
                    prop_assert_eq!(controller.snapshot().current_frame_index, after);
                }
            }

            let snapshot = controller.snapshot();
            prop_assert!(snapshot.current_frame_index < count);
            prop_assert_eq!(controller.clock().is_running(), snapshot.is_playing);
        }
    }

    #[test]
    fn stale_ticks_never_move_the_index(
        count in 2usize..20,
        late_ms in 100u64..10_000,
    ) {
        let mut controller = PlaybackController::new(ManualClock::new());
        controller.load(store(count, 10.0)).unwrap();
        controller.play().unwrap();
        let stale = controller.take_tick_at(Duration::from_millis(late_ms)).unwrap();

        controller.pause().unwrap();
        controller.play().unwrap();
        prop_assert_eq!(controller.handle_tick(stale), TickOutcome::Ignored);
        prop_assert_eq!(controller.snapshot().current_frame_index, 0);
    }
}
