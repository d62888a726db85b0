//! Fixed time step accumulator shared by the physics world and the engine loop.

use tracing::warn;

/// Converts variable elapsed time into whole fixed-size steps
///
/// Elapsed time (milliseconds) is added with [`FixedStep::accumulate`] and drained one step at a time
/// with [`FixedStep::try_consume`]. Leftover lag carries into the next report.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FixedStep {
    /// Duration of one step, in milliseconds
    step_time: f64,
    /// Time elapsed but not yet simulated, in milliseconds
    lag: f64,
}

impl FixedStep {
    /// A step of `1000 / steps_per_second` milliseconds
    pub fn per_second(steps_per_second: u32) -> Self {
        Self {
            step_time: 1e3/steps_per_second.max(1) as f64,
            lag: 0.0,
        }
    }

    #[inline]
    pub fn step_time(&self) -> f64 {
        self.step_time
    }

    pub fn set_steps_per_second(&mut self, steps_per_second: u32) {
        self.step_time = 1e3/steps_per_second.max(1) as f64;
    }

    #[inline]
    pub fn lag(&self) -> f64 {
        self.lag
    }

    /// Store the time elapsed since the last report, non-finite reports are dropped
    pub fn accumulate(&mut self, elapsed: f64) {
        if !elapsed.is_finite() {
            warn!(elapsed, "ignoring non-finite elapsed time");
            return;
        }
        self.lag += elapsed;
    }

    /// Removes one step worth of lag, returns false if there is not enough
    pub fn try_consume(&mut self) -> bool {
        if !(self.lag >= self.step_time) {
            return false;
        }

        self.lag -= self.step_time;
        true
    }

    pub fn reset(&mut self) {
        self.lag = 0.0;
    }
}
