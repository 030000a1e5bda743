//! Periodic control-cycle driver.
//!
//! The driver owns the cycle's release schedule. Each [`tick`](CycleDriver::tick)
//! runs exactly one cycle to completion: read the clock, run the control
//! context, write every output to the actuator sink, read the clock again.
//! The caller sleeps until [`next_release_us`](CycleDriver::next_release_us)
//! between ticks, so suspension only ever happens at the top of a cycle.
//!
//! Releases advance by one period each cycle. A cycle that ends after its
//! deadline is a timing fault: it is counted, the outputs it wrote stay in
//! effect, and the schedule is re-anchored at the end of the late cycle
//! instead of bursting to catch up.

use crate::control::ModeTransition;
use crate::cycle::context::ControlContext;
use crate::input::{ChannelInputs, NavigationTarget, SensorSnapshot};
use crate::mixer::ServoOutputs;
use crate::scheduler::{CycleStats, CycleTiming};
use crate::traits::{ActuatorSink, TimeSource};

/// What happened in one tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CycleReport {
    pub outputs: ServoOutputs,
    pub transition: ModeTransition,
    /// Time spent inside the cycle (µs)
    pub execution_us: u32,
    /// Cycle ended after its deadline
    pub deadline_missed: bool,
    pub numeric_faults: u32,
}

/// Fixed-period scheduler for one control context
pub struct CycleDriver<T: TimeSource> {
    time: T,
    timing: CycleTiming,
    next_release_us: Option<u64>,
    last_start_us: Option<u64>,
    stats: CycleStats,
}

impl<T: TimeSource> CycleDriver<T> {
    pub fn new(timing: CycleTiming, time: T) -> Self {
        Self {
            time,
            timing,
            next_release_us: None,
            last_start_us: None,
            stats: CycleStats::default(),
        }
    }

    pub fn timing(&self) -> &CycleTiming {
        &self.timing
    }

    pub fn stats(&self) -> &CycleStats {
        &self.stats
    }

    /// When the next cycle should start.
    ///
    /// Before the first tick this is "now".
    pub fn next_release_us(&self) -> u64 {
        match self.next_release_us {
            Some(release) => release,
            None => self.time.now_us(),
        }
    }

    /// Run one complete control cycle and write its outputs to `sink`
    pub fn tick<S: ActuatorSink + ?Sized>(
        &mut self,
        ctx: &mut ControlContext,
        channels: &ChannelInputs,
        sensors: &SensorSnapshot,
        target: &NavigationTarget,
        sink: &mut S,
    ) -> CycleReport {
        let period_us = u64::from(self.timing.period_us());
        let start_us = self.time.now_us();
        let release_us = self.next_release_us.unwrap_or(start_us);
        let deadline_us = release_us.saturating_add(period_us);

        let outcome = ctx.run_cycle(channels, sensors, target, self.timing.dt());
        for (channel, &pulse) in outcome.outputs.pulses.iter().enumerate() {
            sink.write(channel, pulse);
        }

        let end_us = self.time.now_us();
        let execution_us = u32::try_from(end_us.saturating_sub(start_us)).unwrap_or(u32::MAX);
        let measured_period_us = match self.last_start_us {
            Some(last) => u32::try_from(start_us.saturating_sub(last)).unwrap_or(u32::MAX),
            None => self.timing.period_us(),
        };
        self.stats
            .update(execution_us, measured_period_us, self.timing.period_us());
        self.last_start_us = Some(start_us);

        let deadline_missed = end_us > deadline_us;
        self.next_release_us = Some(if deadline_missed {
            self.stats.record_deadline_miss();
            ctx.record_timing_fault();
            end_us
        } else {
            deadline_us
        });

        CycleReport {
            outputs: outcome.outputs,
            transition: outcome.transition,
            execution_us,
            deadline_missed,
            numeric_faults: outcome.numeric_faults,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::control::ControlConfig;
    use crate::traits::{MockTime, RecordingSink};

    /// Sink that burns time on every write
    struct SlowSink<'a> {
        clock: &'a MockTime,
        cost_us: u64,
        inner: RecordingSink,
    }

    impl ActuatorSink for SlowSink<'_> {
        fn write(&mut self, channel: usize, pulse_us: u16) {
            self.clock.advance(self.cost_us);
            self.inner.write(channel, pulse_us);
        }
    }

    fn manual_inputs() -> ChannelInputs {
        ChannelInputs::centered()
            .with_pulse(4, 1900)
            .with_pulse(0, 1600)
    }

    #[test]
    fn test_tick_writes_every_output() {
        let clock = MockTime::new();
        let mut ctx = ControlContext::new(ControlConfig::default()).unwrap();
        let mut driver = CycleDriver::new(CycleTiming::from_config(ctx.config()), &clock);
        let mut sink = RecordingSink::new();

        let report = driver.tick(
            &mut ctx,
            &manual_inputs(),
            &SensorSnapshot::default(),
            &NavigationTarget::default(),
            &mut sink,
        );

        assert_eq!(sink.writes, 6);
        assert_eq!(sink.pulses, report.outputs.pulses);
        assert_eq!(sink.pulses[0], 1600);
        assert!(!report.deadline_missed);
    }

    #[test]
    fn test_release_schedule_is_monotonic() {
        let clock = MockTime::with_initial(1_000);
        let mut ctx = ControlContext::new(ControlConfig::default()).unwrap();
        let mut driver = CycleDriver::new(CycleTiming::new("control", 100), &clock);
        let mut sink = RecordingSink::new();

        assert_eq!(driver.next_release_us(), 1_000);
        for n in 1..=5u64 {
            clock.set(driver.next_release_us());
            driver.tick(
                &mut ctx,
                &manual_inputs(),
                &SensorSnapshot::default(),
                &NavigationTarget::default(),
                &mut sink,
            );
            assert_eq!(driver.next_release_us(), 1_000 + n * 10_000);
        }
        assert_eq!(driver.stats().execution_count, 5);
        assert_eq!(driver.stats().avg_jitter_us, 0);
    }

    #[test]
    fn test_overrun_counts_timing_fault_and_reanchors() {
        let clock = MockTime::new();
        let mut ctx = ControlContext::new(ControlConfig::default()).unwrap();
        let mut driver = CycleDriver::new(CycleTiming::new("control", 200), &clock);
        let mut sink = SlowSink {
            clock: &clock,
            cost_us: 1_000,
            inner: RecordingSink::new(),
        };

        // 6 writes x 1 ms > 5 ms period
        let report = driver.tick(
            &mut ctx,
            &manual_inputs(),
            &SensorSnapshot::default(),
            &NavigationTarget::default(),
            &mut sink,
        );

        assert!(report.deadline_missed);
        assert_eq!(report.execution_us, 6_000);
        assert_eq!(ctx.faults().timing_faults, 1);
        assert_eq!(driver.stats().deadline_misses, 1);
        assert_eq!(driver.next_release_us(), 6_000);

        // Outputs of the late cycle were still delivered
        assert_eq!(sink.inner.pulses, report.outputs.pulses);
    }

    #[test]
    fn test_on_time_cycle_after_overrun() {
        let clock = MockTime::new();
        let mut ctx = ControlContext::new(ControlConfig::default()).unwrap();
        let mut driver = CycleDriver::new(CycleTiming::new("control", 100), &clock);
        let mut sink = SlowSink {
            clock: &clock,
            cost_us: 2_000,
            inner: RecordingSink::new(),
        };

        driver.tick(
            &mut ctx,
            &manual_inputs(),
            &SensorSnapshot::default(),
            &NavigationTarget::default(),
            &mut sink,
        );
        assert_eq!(driver.next_release_us(), 12_000);

        sink.cost_us = 100;
        clock.set(driver.next_release_us());
        let report = driver.tick(
            &mut ctx,
            &manual_inputs(),
            &SensorSnapshot::default(),
            &NavigationTarget::default(),
            &mut sink,
        );

        assert!(!report.deadline_missed);
        assert_eq!(driver.next_release_us(), 22_000);
        assert_eq!(ctx.faults().timing_faults, 1);
        assert_eq!(ctx.faults().cycles, 2);
    }

    #[test]
    fn test_late_start_inside_period_is_not_a_fault() {
        let clock = MockTime::new();
        let mut ctx = ControlContext::new(ControlConfig::default()).unwrap();
        let mut driver = CycleDriver::new(CycleTiming::new("control", 100), &clock);
        let mut sink = RecordingSink::new();

        driver.tick(
            &mut ctx,
            &manual_inputs(),
            &SensorSnapshot::default(),
            &NavigationTarget::default(),
            &mut sink,
        );
        // Woken 3 ms late, still finishes before 20 ms
        clock.set(13_000);
        let report = driver.tick(
            &mut ctx,
            &manual_inputs(),
            &SensorSnapshot::default(),
            &NavigationTarget::default(),
            &mut sink,
        );

        assert!(!report.deadline_missed);
        assert_eq!(driver.next_release_us(), 20_000);
        assert_eq!(driver.stats().last_period_us, 13_000);
    }
}
