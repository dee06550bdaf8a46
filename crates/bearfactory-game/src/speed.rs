/*
[INPUT]:  Current task index and round length
[OUTPUT]: Per-task deadline (belt traversal time and timeout)
[POS]:    Round timer - conveyor speed controller
[UPDATE]: When the ramp shape or its constants change
*/

use std::time::Duration;

pub const INITIAL_SPEED: Duration = Duration::from_secs(10);
pub const FINAL_SPEED: Duration = Duration::from_secs(4);
/// Number of trailing tasks that always run at the final speed.
pub const FINAL_STRETCH: usize = 4;

/// Linear ramp from `initial` to `final_speed`, flat over the last `final_stretch` tasks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpeedSchedule {
    initial: Duration,
    final_speed: Duration,
    final_stretch: usize,
}

impl Default for SpeedSchedule {
    fn default() -> Self {
        Self {
            initial: INITIAL_SPEED,
            final_speed: FINAL_SPEED,
            final_stretch: FINAL_STRETCH,
        }
    }
}

impl SpeedSchedule {
    pub fn new(initial: Duration, final_speed: Duration, final_stretch: usize) -> Self {
        Self {
            initial,
            final_speed,
            final_stretch,
        }
    }

    pub fn initial(&self) -> Duration {
        self.initial
    }

    pub fn final_speed(&self) -> Duration {
        self.final_speed
    }

    pub fn final_stretch(&self) -> usize {
        self.final_stretch
    }

    /// Deadline for the task at `index` in a round of `total` tasks.
    pub fn deadline(&self, index: usize, total: usize) -> Duration {
        if total <= self.final_stretch {
            return self.final_speed;
        }
        let ramp_len = total - self.final_stretch;
        if index >= ramp_len {
            return self.final_speed;
        }

        let progress = index as f64 / ramp_len as f64;
        let initial = self.initial.as_secs_f64();
        let span = initial - self.final_speed.as_secs_f64();
        Duration::from_secs_f64((initial - span * progress).max(0.0))
    }
}
