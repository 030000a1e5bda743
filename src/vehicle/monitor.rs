//! Control loop health reporting
//!
//! Called about once per second by the runtime. Logs a one-line summary
//! and a warning for each condition that needs attention:
//! - Deadline misses above the tolerated rate
//! - High period jitter
//! - Execution time over budget
//! - Numeric faults since the previous report

use rtos_pilot_core::cycle::FaultCounters;
use rtos_pilot_core::scheduler::{CycleStats, CycleTiming};

/// Deadline miss rate warning threshold (percentage)
const MISS_RATE_WARNING_PERCENT: f32 = 1.0;

/// High jitter warning threshold (microseconds)
const HIGH_JITTER_WARNING_US: u32 = 1000;

/// Health summary of the control loop
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ControlHealth {
    pub uptime_ms: u64,
    pub cycles: u64,
    pub deadline_misses: u32,
    pub miss_rate_percent: f32,
    pub avg_execution_us: u32,
    pub max_execution_us: u32,
    pub avg_jitter_us: u32,
    pub timing_faults: u32,
    /// Numeric faults since startup
    pub numeric_faults: u32,
    /// Numeric faults since the previous report
    pub new_numeric_faults: u32,
    pub over_budget: bool,
}

impl ControlHealth {
    /// No warning condition present
    pub fn is_healthy(&self) -> bool {
        self.miss_rate_percent < MISS_RATE_WARNING_PERCENT
            && self.avg_jitter_us <= HIGH_JITTER_WARNING_US
            && !self.over_budget
            && self.new_numeric_faults == 0
    }
}

/// Periodic health reporter
///
/// Remembers the fault count of the previous report so numeric faults are
/// reported once, not on every report for the rest of the flight.
#[derive(Debug, Clone, Copy, Default)]
pub struct HealthMonitor {
    reported_numeric_faults: u32,
}

impl HealthMonitor {
    pub const fn new() -> Self {
        Self {
            reported_numeric_faults: 0,
        }
    }

    /// Collect the loop statistics, log them, and return the summary
    pub fn report(
        &mut self,
        uptime_ms: u64,
        timing: &CycleTiming,
        stats: &CycleStats,
        faults: &FaultCounters,
    ) -> ControlHealth {
        let new_numeric_faults = faults
            .numeric_faults
            .saturating_sub(self.reported_numeric_faults);
        self.reported_numeric_faults = faults.numeric_faults;

        let health = summarize(uptime_ms, timing, stats, faults, new_numeric_faults);
        log_summary(timing, &health);
        check_warnings(timing, &health);
        health
    }
}

fn summarize(
    uptime_ms: u64,
    timing: &CycleTiming,
    stats: &CycleStats,
    faults: &FaultCounters,
    new_numeric_faults: u32,
) -> ControlHealth {
    ControlHealth {
        uptime_ms,
        cycles: stats.execution_count,
        deadline_misses: stats.deadline_misses,
        miss_rate_percent: stats.miss_rate_percent(),
        avg_execution_us: stats.avg_execution_us,
        max_execution_us: stats.max_execution_us,
        avg_jitter_us: stats.avg_jitter_us,
        timing_faults: faults.timing_faults,
        numeric_faults: faults.numeric_faults,
        new_numeric_faults,
        over_budget: !timing.is_within_budget(stats.avg_execution_us),
    }
}

#[allow(unused_variables)]
fn log_summary(timing: &CycleTiming, health: &ControlHealth) {
    crate::log_info!(
        "{}: uptime={}ms cycles={} exec={}us (max={}us) jitter={}us misses={}",
        timing.name,
        health.uptime_ms,
        health.cycles,
        health.avg_execution_us,
        health.max_execution_us,
        health.avg_jitter_us,
        health.deadline_misses
    );
}

#[allow(unused_variables)]
fn check_warnings(timing: &CycleTiming, health: &ControlHealth) {
    if health.miss_rate_percent >= MISS_RATE_WARNING_PERCENT {
        crate::log_warn!(
            "{}: {} deadline misses ({}%)",
            timing.name,
            health.deadline_misses,
            health.miss_rate_percent
        );
    }

    if health.avg_jitter_us > HIGH_JITTER_WARNING_US {
        crate::log_warn!(
            "{}: high jitter {}us (target period: {}us)",
            timing.name,
            health.avg_jitter_us,
            timing.period_us()
        );
    }

    if health.over_budget {
        crate::log_warn!(
            "{}: execution {}us over budget {}us",
            timing.name,
            health.avg_execution_us,
            timing.budget_us
        );
    }

    if health.new_numeric_faults > 0 {
        crate::log_warn!(
            "{}: {} new numeric faults ({} total)",
            timing.name,
            health.new_numeric_faults,
            health.numeric_faults
        );
    }
}
