//! Control task
//!
//! Glue between the shared snapshots written by other tasks and the
//! control core. One [`ControlTask`] owns the control context, the cycle
//! driver and the actuator sink; nothing else touches them.
//!
//! ## Data flow per cycle
//!
//! 1. Copy receiver, sensor and navigation snapshots
//! 2. Run one cycle through the driver (writes every servo)
//! 3. Publish telemetry for the reporting tasks

use rtos_pilot_core::control::{ConfigError, ControlConfig, ModeTransition};
use rtos_pilot_core::cycle::{ControlContext, ControlTelemetry, CycleDriver, CycleReport};
use rtos_pilot_core::input::{ChannelInputs, NavigationTarget, SensorSnapshot};
use rtos_pilot_core::mixer::TrimReport;
use rtos_pilot_core::scheduler::{CycleStats, CycleTiming};
use rtos_pilot_core::snapshot::SnapshotCell;
use rtos_pilot_core::traits::{ActuatorSink, TimeSource};

use crate::libraries::{RcInput, RC_INPUT};
use crate::logging::LogThrottle;

use super::monitor::{ControlHealth, HealthMonitor};

/// Log one overrun warning per this many overruns
const OVERRUN_LOG_EVERY: u32 = 100;

/// Log one numeric fault warning per this many faulty cycles
const NUMERIC_LOG_EVERY: u32 = 100;

/// Latest attitude and air data, written by the sensor task
pub static SENSORS: SnapshotCell<SensorSnapshot> = SnapshotCell::new(SensorSnapshot::zeroed());

/// Latest navigation target, written by the navigation task
pub static NAV_TARGET: SnapshotCell<NavigationTarget> = SnapshotCell::new(NavigationTarget::new(0.0));

/// Control state published after every cycle
pub static TELEMETRY: SnapshotCell<ControlTelemetry> = SnapshotCell::new(ControlTelemetry::new());

/// Shared cells the control task reads from and publishes to
#[derive(Clone, Copy)]
pub struct ControlLinks<'a> {
    pub rc: &'a SnapshotCell<RcInput>,
    pub sensors: &'a SnapshotCell<SensorSnapshot>,
    pub target: &'a SnapshotCell<NavigationTarget>,
    pub telemetry: &'a SnapshotCell<ControlTelemetry>,
}

impl ControlLinks<'static> {
    /// Links to the firmware-wide statics
    pub fn global() -> Self {
        Self {
            rc: &RC_INPUT,
            sensors: &SENSORS,
            target: &NAV_TARGET,
            telemetry: &TELEMETRY,
        }
    }
}

/// Owns everything the control cycle needs
pub struct ControlTask<T: TimeSource, S: ActuatorSink> {
    ctx: ControlContext,
    driver: CycleDriver<T>,
    sink: S,
    overrun_log: LogThrottle,
    numeric_log: LogThrottle,
    monitor: HealthMonitor,
}

impl<T: TimeSource, S: ActuatorSink> ControlTask<T, S> {
    /// Validate `config` and set up the task
    ///
    /// # Errors
    ///
    /// Returns the first configuration problem found. The task must not
    /// start with an invalid configuration.
    pub fn new(config: ControlConfig, time: T, sink: S) -> Result<Self, ConfigError> {
        let ctx = match ControlContext::new(config) {
            Ok(ctx) => ctx,
            Err(e) => {
                crate::log_error!("Control configuration rejected: {}", e);
                return Err(e);
            }
        };
        let timing = CycleTiming::from_config(ctx.config());

        crate::log_info!(
            "Control task: airframe={} rate={}Hz period={}us",
            ctx.config().airframe.name(),
            timing.rate_hz,
            timing.period_us()
        );

        Ok(Self {
            ctx,
            driver: CycleDriver::new(timing, time),
            sink,
            overrun_log: LogThrottle::new(OVERRUN_LOG_EVERY),
            numeric_log: LogThrottle::new(NUMERIC_LOG_EVERY),
            monitor: HealthMonitor::new(),
        })
    }

    /// Run before the first cycle: capture trim (if enabled) and drive
    /// every output to its neutral.
    pub fn start(&mut self, channels: &ChannelInputs) -> Option<TrimReport> {
        let report = self.ctx.bootstrap_trim(channels);
        if let Some(trim) = &report {
            log_trim(trim);
        }

        let neutrals = *self.ctx.last_outputs();
        for (channel, &pulse) in neutrals.pulses.iter().enumerate() {
            self.sink.write(channel, pulse);
        }
        report
    }

    /// Airframe wants its outputs switched to the fast ESC refresh rate
    pub fn wants_fast_refresh(&self) -> bool {
        self.ctx.config().airframe.wants_fast_refresh()
    }

    pub fn enable_fast_refresh(&mut self) {
        crate::log_info!("Switching actuator outputs to fast refresh");
        self.sink.enable_fast_refresh();
    }

    /// Run one cycle on explicit inputs
    pub fn step(
        &mut self,
        channels: &ChannelInputs,
        sensors: &SensorSnapshot,
        target: &NavigationTarget,
    ) -> CycleReport {
        let report = self
            .driver
            .tick(&mut self.ctx, channels, sensors, target, &mut self.sink);

        if report.transition.is_change() {
            log_transition(&report.transition);
        }

        if report.deadline_missed && self.overrun_log.should_log() {
            crate::log_warn!(
                "Control cycle overrun: exec={}us period={}us (total {})",
                report.execution_us,
                self.driver.timing().period_us(),
                self.ctx.faults().timing_faults
            );
        }

        if report.numeric_faults > 0 && self.numeric_log.should_log() {
            crate::log_warn!(
                "Numeric fault in {} (total {}), holding last command",
                report.transition.to.name(),
                self.ctx.faults().numeric_faults
            );
        }

        report
    }

    /// Run one cycle on the shared snapshots and publish telemetry
    pub fn step_shared(&mut self, links: &ControlLinks<'_>) -> CycleReport {
        let channels = links.rc.read().channels();
        let sensors = links.sensors.read();
        let target = links.target.read();

        let report = self.step(&channels, &sensors, &target);
        links.telemetry.write(self.ctx.telemetry());
        report
    }

    /// Absolute time (µs) at which the next cycle should be released
    pub fn next_release_us(&self) -> u64 {
        self.driver.next_release_us()
    }

    /// Summarize loop health and log any warnings
    pub fn report_health(&mut self, uptime_ms: u64) -> ControlHealth {
        self.monitor.report(
            uptime_ms,
            self.driver.timing(),
            self.driver.stats(),
            self.ctx.faults(),
        )
    }

    pub fn context(&self) -> &ControlContext {
        &self.ctx
    }

    pub fn stats(&self) -> &CycleStats {
        self.driver.stats()
    }

    pub fn timing(&self) -> &CycleTiming {
        self.driver.timing()
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }
}

#[allow(unused_variables)]
fn log_transition(transition: &ModeTransition) {
    match transition.from {
        Some(from) => crate::log_info!("Mode: {} -> {}", from.name(), transition.to.name()),
        None => crate::log_info!("Initial mode: {}", transition.to.name()),
    }
}

#[allow(unused_variables)]
fn log_trim(trim: &TrimReport) {
    crate::log_info!(
        "Trim captured: channels={:?} servos={:?}",
        trim.channel_neutral,
        trim.servo_neutral
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use rtos_pilot_core::control::{Airframe, FlightMode};
    use rtos_pilot_core::traits::{MockTime, RecordingSink};
    use serial_test::serial;

    fn task(config: ControlConfig) -> ControlTask<MockTime, RecordingSink> {
        ControlTask::new(config, MockTime::new(), RecordingSink::new()).unwrap()
    }

    fn manual_channels() -> ChannelInputs {
        ChannelInputs::centered().with_pulse(4, 1900)
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let mut config = ControlConfig::default();
        config.max_roll = -1.0;

        let result = ControlTask::new(config, MockTime::new(), RecordingSink::new());
        assert!(result.is_err());
    }

    #[test]
    fn test_start_writes_neutrals() {
        let mut task = task(ControlConfig::default());
        assert!(task.start(&ChannelInputs::centered()).is_none());

        assert_eq!(task.sink().writes, 6);
        assert_eq!(task.sink().pulses, [1500; 6]);
    }

    #[test]
    fn test_start_with_manual_trim_writes_trimmed_neutrals() {
        let mut config = ControlConfig::default();
        config.manual_trim = true;
        let mut task = task(config);

        let trim = task.start(&ChannelInputs::centered().with_pulse(1, 1520));
        assert!(trim.is_some());
        assert_eq!(task.sink().pulses[2], 1520);
    }

    #[test]
    fn test_fast_refresh_only_for_quad() {
        let fixed = task(ControlConfig::default());
        assert!(!fixed.wants_fast_refresh());

        let mut config = ControlConfig::default();
        config.airframe = Airframe::QuadRotor;
        config.mixer.topology = rtos_pilot_core::mixer::MixTopology::Quadrocopter;
        let mut quad = task(config);
        assert!(quad.wants_fast_refresh());

        quad.enable_fast_refresh();
        assert!(quad.sink().fast_refresh);
    }

    #[test]
    fn test_step_runs_manual_cycle() {
        let mut task = task(ControlConfig::default());
        let report = task.step(
            &manual_channels().with_pulse(0, 1700),
            &SensorSnapshot::default(),
            &NavigationTarget::default(),
        );

        assert_eq!(report.transition.to, FlightMode::Manual);
        assert_eq!(task.sink().pulses[0], 1700);
        assert_eq!(task.next_release_us(), 10_000);
    }

    #[test]
    fn test_step_shared_publishes_telemetry() {
        let rc = SnapshotCell::new(RcInput::new());
        let sensors = SnapshotCell::new(SensorSnapshot::zeroed());
        let target = SnapshotCell::new(NavigationTarget::default());
        let telemetry = SnapshotCell::new(ControlTelemetry::new());
        let links = ControlLinks {
            rc: &rc,
            sensors: &sensors,
            target: &target,
            telemetry: &telemetry,
        };

        rc.update(|rc| {
            rc.update(&[1500, 1500, 1500, 1500, 1500, 1500, 1500, 1500], 0);
        });
        sensors.update(|s| s.pressure_height = 55.0);

        let mut task = task(ControlConfig::default());
        task.step_shared(&links);

        let published = telemetry.read();
        assert_eq!(published.state.mode, FlightMode::Stabilized);
        assert!((published.state.desired_height - 55.0).abs() < 1e-6);
        assert_eq!(published.faults.cycles, 1);
    }

    #[test]
    #[serial]
    fn test_global_links_share_statics() {
        SENSORS.write(SensorSnapshot::zeroed());
        RC_INPUT.write(RcInput::new());
        crate::libraries::publish_frame(&[1500, 1500, 1500, 1500, 1000, 1500, 1500, 1500], 0);

        let mut task = task(ControlConfig::default());
        let report = task.step_shared(&ControlLinks::global());

        assert_eq!(report.transition.to, FlightMode::Autopilot);
        assert_eq!(TELEMETRY.read().state.mode, FlightMode::Autopilot);
    }

    #[test]
    fn test_health_reflects_faults() {
        let mut task = task(ControlConfig::default());
        task.step(
            &manual_channels(),
            &SensorSnapshot::default(),
            &NavigationTarget::default(),
        );

        let health = task.report_health(1_000);
        assert_eq!(health.cycles, 1);
        assert!(health.is_healthy());
    }

    #[test]
    fn test_numeric_fault_makes_one_report_unhealthy() {
        let clock = MockTime::new();
        let mut task =
            ControlTask::new(ControlConfig::default(), &clock, RecordingSink::new()).unwrap();
        let sensors = SensorSnapshot {
            gps_heading: f32::NAN,
            ..SensorSnapshot::default()
        };

        task.step(
            &ChannelInputs::centered().with_pulse(4, 1100),
            &sensors,
            &NavigationTarget::default(),
        );
        assert!(!task.report_health(1_000).is_healthy());

        clock.set(task.next_release_us());
        task.step(
            &manual_channels(),
            &SensorSnapshot::default(),
            &NavigationTarget::default(),
        );
        let health = task.report_health(2_000);
        assert_eq!(health.numeric_faults, 1);
        assert_eq!(health.new_numeric_faults, 0);
        assert!(health.is_healthy());
    }
}
