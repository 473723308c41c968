//! Steppers controller: turns a movement into step and direction pulses.

use crate::executor::{RegisterImage, DIRECTION_REGISTER, ENABLE_REGISTER, STEP_REGISTER};
use crate::payload::StepperMovementPayload;

use super::diagnostics::TimingDiagnostics;

/// Default minimum interval between two ticks, in seconds.
///
/// Half the period of the 250 kHz maximum strobe frequency of the I/O
/// expanders.
pub const DEFAULT_MIN_UPDATE_INTERVAL: f64 = 2e-6;

/// What a call to [`SteppersController::update`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TickOutcome {
    /// The minimum update interval has not elapsed.
    Skipped,
    /// The step pulse asserted on the previous tick was cleared.
    PulseCleared,
    /// No movement to run.
    Idle,
    /// The current movement was evaluated and is still running.
    Running,
    /// The current movement issued its last steps and was retired.
    Finished,
}

/// Step generator for one movement at a time.
///
/// Every tick either clears the previous step pulse or evaluates the
/// current movement, so a pulse is always held high for one full tick.
#[derive(Debug, Clone)]
pub struct SteppersController {
    current: Option<StepperMovementPayload>,
    queued: Option<StepperMovementPayload>,
    stepping: bool,
    step_time: f64,
    min_update_interval: f64,
    diagnostics: TimingDiagnostics,
}

impl Default for SteppersController {
    fn default() -> Self {
        Self::new(DEFAULT_MIN_UPDATE_INTERVAL)
    }
}

impl SteppersController {
    /// Create an idle controller.
    pub fn new(min_update_interval: f64) -> Self {
        Self {
            current: None,
            queued: None,
            stepping: false,
            step_time: f64::NEG_INFINITY,
            min_update_interval,
            diagnostics: TimingDiagnostics::default(),
        }
    }

    /// Minimum interval between two ticks, in seconds.
    pub fn min_update_interval(&self) -> f64 {
        self.min_update_interval
    }

    /// Movement being executed.
    pub fn current(&self) -> Option<&StepperMovementPayload> {
        self.current.as_ref()
    }

    /// Whether a movement is running or waiting to start.
    pub fn is_busy(&self) -> bool {
        self.current.is_some() || self.queued.is_some()
    }

    /// Timing counters accumulated since creation.
    pub fn diagnostics(&self) -> TimingDiagnostics {
        self.diagnostics
    }

    /// Queue a movement; it starts on the next evaluating tick.
    ///
    /// Hands the movement back if another one is already waiting.
    pub fn queue_movement(
        &mut self,
        movement: StepperMovementPayload,
    ) -> Result<(), StepperMovementPayload> {
        if self.queued.is_some() {
            return Err(movement);
        }
        self.queued = Some(movement);
        Ok(())
    }

    /// Drive the enable register. Set bits of `mask` enable their stepper.
    pub fn enable_steppers(&self, mask: u8, image: &mut RegisterImage) {
        image.set(ENABLE_REGISTER, !mask);
    }

    /// Run one tick at time `now` (seconds).
    pub fn update(&mut self, now: f64, image: &mut RegisterImage) -> TickOutcome {
        if now - self.step_time <= self.min_update_interval {
            return TickOutcome::Skipped;
        }
        self.step_time = now;

        if self.stepping {
            image.set(STEP_REGISTER, 0);
            self.stepping = false;
            return TickOutcome::PulseCleared;
        }

        if self.current.is_none() {
            if let Some(mut movement) = self.queued.take() {
                movement.start_time = now;
                log::debug!(
                    "movement started: mask {:#04x}, duration {}",
                    movement.pin_mask(),
                    movement.duration
                );
                self.current = Some(movement);
            }
        }

        let Some(movement) = self.current.as_mut() else {
            return TickOutcome::Idle;
        };

        let elapsed = now - movement.start_time;
        let position_factor = movement.position_factor(elapsed);
        let overdue = elapsed > movement.duration;

        let mut steps = 0u8;
        let mut direction = 0u8;
        for stepper in movement.moves.iter_mut().filter(|m| !m.is_finished()) {
            if overdue {
                self.diagnostics.record_overrun();
            }
            let ideal = libm::fabs(libm::round(position_factor * f64::from(stepper.target)));
            let shortfall = ideal - f64::from(stepper.current);
            if shortfall > 1.0 {
                self.diagnostics.record_missed_step();
                log::trace!("pin {} lags by {} steps", stepper.pin, shortfall);
            }
            if overdue || shortfall > 0.0 {
                stepper.current += 1;
                steps |= stepper.pin_mask();
                if stepper.target > 0 {
                    direction |= stepper.pin_mask();
                }
            }
        }
        if overdue {
            log::trace!("movement overdue by {}s", elapsed - movement.duration);
        }

        image.set(STEP_REGISTER, steps);
        image.set(DIRECTION_REGISTER, direction);
        self.stepping = steps != 0;

        if movement.is_finished() {
            log::debug!(
                "movement finished in {}s: missed_steps {}, ran_out_of_time {}",
                elapsed,
                self.diagnostics.missed_steps,
                self.diagnostics.ran_out_of_time
            );
            self.current = None;
            return TickOutcome::Finished;
        }
        TickOutcome::Running
    }
}
