//! Owned control context.
//!
//! Holds everything that persists between cycles: configuration, trimmed
//! neutrals, the mode selector, the PID set, the control state and the last
//! commands. One instance belongs to the control task and is passed into
//! each cycle explicitly.

use crate::control::{
    AttitudeController, ConfigError, ControlConfig, ControlState, FlightMode, LawInputs,
    ModeSelector, ModeTransition,
};
use crate::input::{ChannelInputs, NavigationTarget, SensorSnapshot, INPUT_CHANNELS};
use crate::mixer::{bootstrap_trim, mix, AxisCommands, MixerConfig, ServoOutputs, TrimReport};

use super::telemetry::{ControlTelemetry, FaultCounters};

/// Result of one control cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CycleOutcome {
    pub outputs: ServoOutputs,
    pub transition: ModeTransition,
    /// Numeric faults raised during this cycle
    pub numeric_faults: u32,
}

/// Control task state
#[derive(Debug, Clone)]
pub struct ControlContext {
    config: ControlConfig,
    channel_neutral: [u16; INPUT_CHANNELS],
    mixer: MixerConfig,
    selector: ModeSelector,
    attitude: AttitudeController,
    state: ControlState,
    last_commands: AxisCommands,
    last_outputs: ServoOutputs,
    faults: FaultCounters,
}

impl ControlContext {
    /// Validate `config` and build a context ready for the first cycle
    pub fn new(config: ControlConfig) -> Result<Self, ConfigError> {
        config.validate()?;

        Ok(Self {
            channel_neutral: config.channel_neutral,
            mixer: config.mixer,
            selector: ModeSelector::new(config.mode_thresholds),
            attitude: AttitudeController::new(&config),
            state: ControlState::default(),
            last_commands: AxisCommands::default(),
            last_outputs: ServoOutputs::new(config.mixer.neutrals()),
            faults: FaultCounters::default(),
            config,
        })
    }

    /// Run the trim bootstrap if manual trim is enabled.
    ///
    /// Must run before the first cycle, with the sticks centred. Returns the
    /// captured trim, or `None` when manual trim is off.
    pub fn bootstrap_trim(&mut self, inputs: &ChannelInputs) -> Option<TrimReport> {
        if !self.config.manual_trim {
            return None;
        }

        let report = bootstrap_trim(inputs, &self.config.channels, &self.mixer);
        self.channel_neutral = report.channel_neutral;
        self.mixer = self.mixer.with_neutrals(report.servo_neutral);
        self.last_outputs = ServoOutputs::new(report.servo_neutral);
        Some(report)
    }

    /// Run one full cycle: mode selection, control law, mixing.
    ///
    /// # Arguments
    ///
    /// * `channels` - Receiver snapshot
    /// * `sensors` - Sensor snapshot
    /// * `target` - Navigation target (used in autopilot only)
    /// * `dt` - Cycle time step in seconds
    pub fn run_cycle(
        &mut self,
        channels: &ChannelInputs,
        sensors: &SensorSnapshot,
        target: &NavigationTarget,
        dt: f32,
    ) -> CycleOutcome {
        let transition = self
            .selector
            .evaluate(channels.pulse(self.config.channels.mode));
        self.state.mode = transition.to;
        if transition.captures_height() {
            self.state.desired_height = sensors.pressure_height;
        }

        let inputs = LawInputs {
            config: &self.config,
            channel_neutral: &self.channel_neutral,
            channels,
            sensors,
            dt,
        };

        let law = match transition.to {
            FlightMode::Manual => AttitudeController::manual(&inputs),
            FlightMode::Stabilized => self.attitude.stabilized(
                &mut self.state,
                &inputs,
                self.config.law.altitude_hold_in_stabilized,
                &self.last_commands,
            ),
            FlightMode::Autopilot => {
                self.attitude
                    .navigate(&mut self.state, &inputs, target, &self.last_commands)
            }
        };

        let outputs = mix(&law.commands, &self.mixer);

        self.last_commands = law.commands;
        self.last_outputs = outputs;
        self.faults.numeric_faults = self.faults.numeric_faults.saturating_add(law.numeric_faults);
        self.faults.cycles = self.faults.cycles.saturating_add(1);

        CycleOutcome {
            outputs,
            transition,
            numeric_faults: law.numeric_faults,
        }
    }

    pub fn record_timing_fault(&mut self) {
        self.faults.timing_faults = self.faults.timing_faults.saturating_add(1);
    }

    pub fn config(&self) -> &ControlConfig {
        &self.config
    }

    pub fn state(&self) -> &ControlState {
        &self.state
    }

    /// Receiver neutrals in effect
    pub fn channel_neutral(&self) -> &[u16; INPUT_CHANNELS] {
        &self.channel_neutral
    }

    /// Mixer configuration in effect, including trimmed neutrals
    pub fn mixer(&self) -> &MixerConfig {
        &self.mixer
    }

    pub fn attitude(&self) -> &AttitudeController {
        &self.attitude
    }

    pub fn last_commands(&self) -> &AxisCommands {
        &self.last_commands
    }

    /// Outputs of the last cycle, or the neutrals before the first one
    pub fn last_outputs(&self) -> &ServoOutputs {
        &self.last_outputs
    }

    pub fn faults(&self) -> &FaultCounters {
        &self.faults
    }

    /// Copy of the state for other tasks
    pub fn telemetry(&self) -> ControlTelemetry {
        ControlTelemetry {
            state: self.state,
            commands: self.last_commands,
            outputs: self.last_outputs,
            faults: self.faults,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::control::{Airframe, PidGains};
    use crate::mixer::MixTopology;

    const DT: f32 = 0.01;
    const MANUAL: u16 = 1900;
    const STABILIZED: u16 = 1500;
    const AUTOPILOT: u16 = 1100;

    fn context() -> ControlContext {
        ControlContext::new(ControlConfig {
            max_roll: 0.5,
            max_pitch: 0.4,
            ..ControlConfig::default()
        })
        .unwrap()
    }

    fn mode_inputs(ctx: &ControlContext, pulse: u16) -> ChannelInputs {
        ChannelInputs::centered().with_pulse(ctx.config().channels.mode, pulse)
    }

    fn height(h: f32) -> SensorSnapshot {
        SensorSnapshot {
            pressure_height: h,
            ..SensorSnapshot::default()
        }
    }

    #[test]
    fn test_new_rejects_invalid_config() {
        let mut config = ControlConfig::default();
        config.max_roll = -1.0;
        assert_eq!(
            ControlContext::new(config).err(),
            Some(ConfigError::InvalidAngleLimit)
        );
    }

    #[test]
    fn test_manual_to_stabilized_captures_height() {
        let mut ctx = context();
        let target = NavigationTarget::default();

        let manual = mode_inputs(&ctx, MANUAL);
        ctx.run_cycle(&manual, &height(50.0), &target, DT);
        assert_eq!(ctx.state().mode, FlightMode::Manual);

        let stab = mode_inputs(&ctx, STABILIZED);
        let outcome = ctx.run_cycle(&stab, &height(72.5), &target, DT);
        assert!(outcome.transition.captures_height());
        assert_eq!(ctx.state().desired_height, 72.5);

        // Staying in the mode keeps the target
        ctx.run_cycle(&stab, &height(80.0), &target, DT);
        assert_eq!(ctx.state().desired_height, 72.5);
    }

    #[test]
    fn test_manual_to_autopilot_overwrites_stale_height() {
        let mut ctx = context();
        let target = NavigationTarget::default();

        ctx.run_cycle(&mode_inputs(&ctx, STABILIZED), &height(10.0), &target, DT);
        ctx.run_cycle(&mode_inputs(&ctx, MANUAL), &height(20.0), &target, DT);
        assert_eq!(ctx.state().desired_height, 10.0);

        ctx.run_cycle(&mode_inputs(&ctx, AUTOPILOT), &height(300.0), &target, DT);
        assert_eq!(ctx.state().mode, FlightMode::Autopilot);
        assert_eq!(ctx.state().desired_height, 300.0);
    }

    #[test]
    fn test_first_cycle_captures_height_in_stabilized() {
        let mut ctx = context();
        ctx.run_cycle(
            &mode_inputs(&ctx, STABILIZED),
            &height(42.0),
            &NavigationTarget::default(),
            DT,
        );
        assert_eq!(ctx.state().desired_height, 42.0);
    }

    #[test]
    fn test_manual_cycle_mixes_sticks() {
        let mut ctx = context();
        let map = ctx.config().channels;
        let inputs = mode_inputs(&ctx, MANUAL)
            .with_pulse(map.roll, 1700)
            .with_pulse(map.pitch, 1400)
            .with_pulse(map.motor, 1800);

        let outcome = ctx.run_cycle(&inputs, &height(0.0), &NavigationTarget::default(), DT);

        assert_eq!(outcome.outputs.pulses[0], 1700);
        assert_eq!(outcome.outputs.pulses[1], 1300);
        assert_eq!(outcome.outputs.pulses[2], 1400);
        assert_eq!(outcome.outputs.pulses[3], 1800);
        assert_eq!(ctx.last_outputs(), &outcome.outputs);
        assert_eq!(ctx.faults().cycles, 1);
    }

    #[test]
    fn test_trim_bootstrap_updates_neutrals() {
        let mut ctx = ControlContext::new(ControlConfig {
            manual_trim: true,
            ..ControlConfig::default()
        })
        .unwrap();
        let map = ctx.config().channels;
        let sticks = ChannelInputs::centered()
            .with_pulse(map.pitch, 1520)
            .with_pulse(map.motor, 1100);

        let report = ctx.bootstrap_trim(&sticks).unwrap();
        assert_eq!(report.neutral_commands.elevator, 20);
        assert_eq!(ctx.channel_neutral()[map.pitch], 1520);
        assert_eq!(ctx.mixer().servos[2].neutral, 1520);
        assert_eq!(ctx.mixer().servos[3].neutral, 1100);

        // Same stick positions in manual now produce the trimmed neutrals
        let inputs = sticks.with_pulse(map.mode, MANUAL);
        let outcome = ctx.run_cycle(&inputs, &height(0.0), &NavigationTarget::default(), DT);
        assert_eq!(outcome.outputs.pulses[2], 1520);
        assert_eq!(outcome.outputs.pulses[3], 1100);
    }

    #[test]
    fn test_trim_disabled_is_noop() {
        let mut ctx = context();
        let sticks = ChannelInputs::centered().with_pulse(1, 1600);
        assert_eq!(ctx.bootstrap_trim(&sticks), None);
        assert_eq!(ctx.channel_neutral()[1], 1500);
    }

    #[test]
    fn test_invalid_dt_counts_numeric_faults_and_holds_outputs() {
        let mut ctx = context();
        let map = ctx.config().channels;
        let inputs = mode_inputs(&ctx, STABILIZED).with_pulse(map.roll, 1750);
        let target = NavigationTarget::default();

        let first = ctx.run_cycle(&inputs, &height(0.0), &target, DT);
        let second = ctx.run_cycle(&inputs, &height(0.0), &target, 0.0);

        assert_eq!(second.numeric_faults, 2);
        assert_eq!(second.outputs, first.outputs);
        assert_eq!(ctx.faults().numeric_faults, 2);
    }

    #[test]
    fn test_quad_autopilot_cycle() {
        let mut ctx = ControlContext::new(ControlConfig {
            airframe: Airframe::QuadRotor,
            heading_to_roll: PidGains::new(0.5, 0.0, 0.0),
            mixer: MixerConfig {
                topology: MixTopology::Quadrocopter,
                ..MixerConfig::default()
            },
            ..ControlConfig::default()
        })
        .unwrap();
        let inputs = mode_inputs(&ctx, AUTOPILOT);
        let sensors = SensorSnapshot {
            gps_heading: 0.0,
            gps_speed: 20.0,
            pressure_height: 100.0,
            ..SensorSnapshot::default()
        };
        let target = NavigationTarget {
            desired_heading_rad: 0.4,
        };

        let outcome = ctx.run_cycle(&inputs, &sensors, &target, 0.005);

        assert!((ctx.state().desired_roll - 0.2).abs() < 1e-6);
        assert_eq!(ctx.last_commands().aileron, (0.2f32 * 630.0) as i32);
        assert!(outcome.outputs.pulses[0] > outcome.outputs.pulses[2]);
        assert_eq!(outcome.numeric_faults, 0);
    }

    #[test]
    fn test_telemetry_is_a_copy() {
        let mut ctx = context();
        ctx.run_cycle(
            &mode_inputs(&ctx, STABILIZED),
            &height(12.0),
            &NavigationTarget::default(),
            DT,
        );
        ctx.record_timing_fault();

        let telemetry = ctx.telemetry();
        assert_eq!(telemetry.state.desired_height, 12.0);
        assert_eq!(telemetry.outputs, *ctx.last_outputs());
        assert_eq!(telemetry.faults.timing_faults, 1);
        assert_eq!(telemetry.faults.cycles, 1);
    }

    #[test]
    fn test_garbage_attitude_saturates_on_the_right_side() {
        let mut ctx = context();
        let sensors = SensorSnapshot {
            roll: -1.0e7,
            ..SensorSnapshot::default()
        };

        let outcome = ctx.run_cycle(
            &mode_inputs(&ctx, STABILIZED),
            &sensors,
            &NavigationTarget::default(),
            DT,
        );

        // Full right aileron
        assert_eq!(outcome.outputs.pulses[0], 2000);
        assert_eq!(outcome.outputs.pulses[1], 1000);
    }

    #[test]
    fn test_garbage_yaw_rate_saturates_quad_outputs() {
        let mut ctx = ControlContext::new(ControlConfig {
            airframe: Airframe::QuadRotor,
            heading_to_roll: PidGains::new(1.0, 0.0, 0.2),
            mixer: MixerConfig {
                topology: MixTopology::Quadrocopter,
                ..MixerConfig::default()
            },
            ..ControlConfig::default()
        })
        .unwrap();
        let channels = mode_inputs(&ctx, STABILIZED).with_pulse(ctx.config().channels.yaw, 1000);
        let sensors = SensorSnapshot {
            r: 1.0e10,
            ..SensorSnapshot::default()
        };

        let outcome = ctx.run_cycle(&channels, &sensors, &NavigationTarget::default(), DT);

        assert!(ctx.last_commands().yaw < 0);
        assert_eq!(outcome.outputs.pulses[..4], [1000, 2000, 1000, 2000]);
    }
}
