//! Unit tests for the steppers controller kinematics.

use motion_core::executor::{RegisterImage, STEP_REGISTER};
use motion_core::motion::{SteppersController, TickOutcome};
use motion_core::payload::StepperMovementPayload;
use proptest::prelude::*;

const TICK: f64 = 1e-5;
const MAX_TICKS: usize = 5_000;

/// Profile reaching position factor 1 at `duration`.
fn profile(duration: f64, accel_share: f64) -> StepperMovementPayload {
    let acceleration = 2.0 * accel_share / (duration * duration);
    let initial_speed = (1.0 - accel_share) / duration;
    StepperMovementPayload::new(duration, initial_speed, acceleration)
}

proptest! {
    #[test]
    fn prop_steps_monotonic_and_bounded(
        duration in 1e-4f64..1e-3,
        accel_share in 0.0f64..=1.0,
        targets in prop::collection::vec(-60i32..=60, 1..=8),
    ) {
        let mut movement = profile(duration, accel_share);
        for (pin, &target) in targets.iter().enumerate() {
            movement.add_move(pin as u8, target).unwrap();
        }

        let mut controller = SteppersController::default();
        let mut image = RegisterImage::default();
        controller.queue_movement(movement.clone()).unwrap();

        let mut previous = vec![0u32; targets.len()];
        let mut pulses = vec![0u32; targets.len()];
        let mut finished = false;
        for tick in 1..=MAX_TICKS {
            let outcome = controller.update(tick as f64 * TICK, &mut image);
            let step = image.get(STEP_REGISTER);
            if outcome != TickOutcome::PulseCleared {
                for (pin, count) in pulses.iter_mut().enumerate() {
                    if step & (1 << pin) != 0 {
                        *count += 1;
                    }
                }
            }

            if let Some(current) = controller.current() {
                for (m, prev) in current.moves.iter().zip(previous.iter_mut()) {
                    prop_assert!(m.current >= *prev);
                    prop_assert!(m.current <= m.target.unsigned_abs());
                    *prev = m.current;
                }
                prop_assert!(!current.is_finished());
            }

            if outcome == TickOutcome::Finished {
                finished = true;
                break;
            }
        }

        prop_assert!(finished);
        for (count, target) in pulses.iter().zip(targets.iter()) {
            prop_assert_eq!(*count, target.unsigned_abs());
        }
    }
}

#[test]
fn accelerating_profile_steps_faster_at_the_end() {
    let movement = profile(1e-2, 1.0).with_move(0, 40).unwrap();
    let mut controller = SteppersController::default();
    let mut image = RegisterImage::default();
    controller.queue_movement(movement).unwrap();

    let mut step_ticks = Vec::new();
    for tick in 1..=MAX_TICKS {
        let outcome = controller.update(tick as f64 * TICK, &mut image);
        if outcome != TickOutcome::PulseCleared && image.get(STEP_REGISTER) != 0 {
            step_ticks.push(tick);
        }
        if outcome == TickOutcome::Finished {
            break;
        }
    }

    assert_eq!(step_ticks.len(), 40);
    let first_gap = step_ticks[1] - step_ticks[0];
    let last_gap = step_ticks[39] - step_ticks[38];
    assert!(last_gap < first_gap);
    assert!(controller.diagnostics().is_clean());
}
