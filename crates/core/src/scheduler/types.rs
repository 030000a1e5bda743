//! Timing types for the periodic control cycle
//!
//! - [`CycleTiming`]: period and execution budget of the cycle
//! - [`CycleStats`]: runtime measurements (execution time, jitter, misses)

use crate::control::ControlConfig;

/// Static timing description of the control cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CycleTiming {
    /// Human-readable name for logging
    pub name: &'static str,

    /// Target rate in Hz
    pub rate_hz: u32,

    /// Execution time budget in microseconds
    ///
    /// Health reporting warns when the average execution time exceeds it.
    /// Defaults to the full period.
    pub budget_us: u32,
}

impl CycleTiming {
    pub const fn new(name: &'static str, rate_hz: u32) -> Self {
        let rate_hz = if rate_hz == 0 { 1 } else { rate_hz };
        Self {
            name,
            rate_hz,
            budget_us: 1_000_000 / rate_hz,
        }
    }

    /// Timing for the control cycle described by `config`
    pub fn from_config(config: &ControlConfig) -> Self {
        Self::new("control", config.rate_hz())
    }

    /// Cycle period in microseconds
    #[inline]
    pub const fn period_us(&self) -> u32 {
        1_000_000 / self.rate_hz
    }

    /// Nominal time step in seconds
    #[inline]
    pub fn dt(&self) -> f32 {
        self.period_us() as f32 / 1_000_000.0
    }

    #[inline]
    pub const fn is_within_budget(&self, execution_us: u32) -> bool {
        execution_us <= self.budget_us
    }

    /// Check if period deviation is within 5% of target
    #[inline]
    pub fn is_period_acceptable(&self, actual_period_us: u32) -> bool {
        let target = self.period_us();
        let tolerance = target / 20;
        actual_period_us >= target.saturating_sub(tolerance)
            && actual_period_us <= target.saturating_add(tolerance)
    }
}

/// Runtime statistics for the control cycle
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CycleStats {
    /// Last execution time in microseconds
    pub last_execution_us: u32,

    /// Average execution time (EMA, alpha = 0.1)
    pub avg_execution_us: u32,

    /// Maximum execution time observed
    pub max_execution_us: u32,

    /// Cycles that finished past their deadline
    pub deadline_misses: u32,

    /// Last measured start-to-start period
    pub last_period_us: u32,

    /// Average deviation from the target period (EMA)
    pub avg_jitter_us: u32,

    /// Total number of executions
    pub execution_count: u64,
}

impl CycleStats {
    /// Record one execution.
    ///
    /// `period_us` is the time since the previous start; pass the target
    /// period for the first cycle so it does not register as jitter.
    pub fn update(&mut self, execution_us: u32, period_us: u32, target_period_us: u32) {
        self.last_execution_us = execution_us;
        self.last_period_us = period_us;
        self.execution_count = self.execution_count.saturating_add(1);

        // avg_new = (value + 9 * avg_old) / 10
        if self.avg_execution_us == 0 {
            self.avg_execution_us = execution_us;
        } else {
            self.avg_execution_us =
                ((u64::from(execution_us) + 9 * u64::from(self.avg_execution_us)) / 10) as u32;
        }

        self.max_execution_us = self.max_execution_us.max(execution_us);

        let jitter = period_us.abs_diff(target_period_us);
        if self.avg_jitter_us == 0 {
            self.avg_jitter_us = jitter;
        } else {
            self.avg_jitter_us = ((u64::from(jitter) + 9 * u64::from(self.avg_jitter_us)) / 10) as u32;
        }
    }

    pub fn record_deadline_miss(&mut self) {
        self.deadline_misses = self.deadline_misses.saturating_add(1);
    }

    /// Fraction of cycles that missed their deadline, in percent
    pub fn miss_rate_percent(&self) -> f32 {
        if self.execution_count == 0 {
            0.0
        } else {
            self.deadline_misses as f32 * 100.0 / self.execution_count as f32
        }
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
