//! Timing diagnostics.

/// Counters for timing problems seen by the steppers controller.
///
/// These never stop a movement; they only report that the control loop
/// could not keep up with the ideal trajectory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TimingDiagnostics {
    /// Ticks where a move lagged its ideal position by more than one step.
    pub missed_steps: u32,
    /// Ticks where a move was still running past its movement duration.
    pub ran_out_of_time: u32,
}

impl TimingDiagnostics {
    /// Whether no problem was recorded.
    #[inline]
    pub fn is_clean(&self) -> bool {
        self.missed_steps == 0 && self.ran_out_of_time == 0
    }

    /// Count a tick where a move lagged by more than one step. Saturates.
    pub fn record_missed_step(&mut self) {
        self.missed_steps = self.missed_steps.saturating_add(1);
    }

    /// Count a tick spent past the movement duration. Saturates.
    pub fn record_overrun(&mut self) {
        self.ran_out_of_time = self.ran_out_of_time.saturating_add(1);
    }

    /// Clear both counters.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
