//! Attitude control pipeline.
//!
//! Three control laws, one per flight mode:
//!
//! - **Manual**: stick minus neutral straight to the axes.
//! - **Stabilized**: sticks command roll/pitch angles, optionally with
//!   altitude hold while the pitch stick sits in its deadband.
//! - **Navigate**: heading error drives roll through a P-only loop and an
//!   airspeed gain schedule; pitch holds the captured height.
//!
//! Stabilized and navigate share a final stage that clamps the desired
//! angles, runs the attitude PIDs and scales radians to actuator units.
//! Motor and yaw always come straight from the sticks.
//!
//! Numeric trouble never reaches the mixer. A rejected PID step holds that
//! controller's last output, a bad heading error holds the previous desired
//! roll, and a non-finite command holds the previous axis value. Each case
//! counts one numeric fault.

use core::f32::consts::PI;

use libm::fabsf;

use super::config::{ControlConfig, ControlLawConfig};
use super::pid::{PidController, PidMode};
use super::state::ControlState;
use crate::input::{ChannelInputs, NavigationTarget, SensorSnapshot, INPUT_CHANNELS};
use crate::mixer::AxisCommands;

/// Everything a control law reads in one cycle
#[derive(Debug, Clone, Copy)]
pub struct LawInputs<'a> {
    pub config: &'a ControlConfig,
    /// Receiver neutrals in effect (after trim)
    pub channel_neutral: &'a [u16; INPUT_CHANNELS],
    pub channels: &'a ChannelInputs,
    pub sensors: &'a SensorSnapshot,
    /// Cycle time step (s)
    pub dt: f32,
}

impl LawInputs<'_> {
    /// Stick deflection from neutral in µs
    pub fn stick(&self, channel: usize) -> i32 {
        let neutral = self.channel_neutral.get(channel).copied().unwrap_or(0);
        i32::from(self.channels.pulse(channel)) - i32::from(neutral)
    }

    /// Stick deflection scaled so a half-range throw commands `limit`
    fn stick_angle(&self, channel: usize, limit: f32) -> f32 {
        self.stick(channel) as f32 / self.config.law.stick_half_range_us * limit
    }

    /// Pitch proportional to the error against the height target
    fn height_hold_pitch(&self, desired_height: f32) -> f32 {
        (desired_height - self.sensors.pressure_height) / self.config.law.height_error_scale
            * self.config.max_pitch
    }
}

/// Axis commands plus the numeric faults raised while producing them
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LawOutput {
    pub commands: AxisCommands,
    pub numeric_faults: u32,
}

/// Wrap a heading difference once into `(-π, π]`.
///
/// Returns `None` when the input is not finite or still outside the range
/// after a single wrap.
pub fn wrap_heading_error(error: f32) -> Option<f32> {
    if !error.is_finite() {
        return None;
    }

    let wrapped = if error > PI {
        error - 2.0 * PI
    } else if error <= -PI {
        error + 2.0 * PI
    } else {
        error
    };

    (wrapped > -PI && wrapped <= PI).then_some(wrapped)
}

/// Roll gain multiplier for the current ground speed
pub fn speed_gain(ground_speed: f32, law: &ControlLawConfig) -> f32 {
    (ground_speed / law.cruise_speed).clamp(law.speed_gain_min, law.speed_gain_max)
}

fn clamp_angle(angle: f32, limit: f32) -> f32 {
    angle.clamp(-limit, limit)
}

/// Largest magnitude of a PID-derived axis command, in actuator units
pub const MAX_AXIS_COMMAND: i32 = i16::MAX as i32;

/// Scale radians to actuator units, or hold `previous` if not finite.
///
/// Finite results are bounded to `±MAX_AXIS_COMMAND`.
fn to_units(radians: f32, scale: f32, previous: i32, faults: &mut u32) -> i32 {
    let units = radians * scale;
    if units.is_finite() {
        (units as i32).clamp(-MAX_AXIS_COMMAND, MAX_AXIS_COMMAND)
    } else {
        *faults += 1;
        previous
    }
}

/// PID set for the three PID-driven axes
#[derive(Debug, Clone, Copy)]
pub struct AttitudeController {
    heading_to_roll: PidController,
    pitch_to_elevator: PidController,
    roll_to_aileron: PidController,
}

impl AttitudeController {
    pub fn new(config: &ControlConfig) -> Self {
        Self {
            heading_to_roll: PidController::new(config.heading_to_roll),
            pitch_to_elevator: PidController::new(config.pitch_to_elevator),
            roll_to_aileron: PidController::new(config.roll_to_aileron),
        }
    }

    pub fn heading_to_roll(&self) -> &PidController {
        &self.heading_to_roll
    }

    pub fn pitch_to_elevator(&self) -> &PidController {
        &self.pitch_to_elevator
    }

    pub fn roll_to_aileron(&self) -> &PidController {
        &self.roll_to_aileron
    }

    /// Manual pass-through
    pub fn manual(inputs: &LawInputs<'_>) -> LawOutput {
        let map = inputs.config.channels;
        LawOutput {
            commands: AxisCommands {
                aileron: inputs.stick(map.roll),
                elevator: inputs.stick(map.pitch),
                yaw: inputs.stick(map.yaw),
                motor: inputs.stick(map.motor),
            },
            numeric_faults: 0,
        }
    }

    /// Stabilized: sticks command attitude.
    ///
    /// With `altitude_hold` set, a pitch stick inside the deadband holds
    /// `desired_height`; outside it the stick wins and the current height
    /// becomes the new target.
    pub fn stabilized(
        &mut self,
        state: &mut ControlState,
        inputs: &LawInputs<'_>,
        altitude_hold: bool,
        previous: &AxisCommands,
    ) -> LawOutput {
        let config = inputs.config;
        state.desired_roll = inputs.stick_angle(config.channels.roll, config.max_roll);

        let stick_pitch = inputs.stick_angle(config.channels.pitch, config.max_pitch);
        state.desired_pitch = if !altitude_hold {
            stick_pitch
        } else if fabsf(stick_pitch) > config.max_pitch * config.law.pitch_deadband_fraction {
            state.desired_height = inputs.sensors.pressure_height;
            stick_pitch
        } else {
            inputs.height_hold_pitch(state.desired_height)
        };

        self.desired_to_axes(state, inputs, previous, 0)
    }

    /// Navigate: follow `target` heading and hold the captured height
    pub fn navigate(
        &mut self,
        state: &mut ControlState,
        inputs: &LawInputs<'_>,
        target: &NavigationTarget,
        previous: &AxisCommands,
    ) -> LawOutput {
        let sensors = inputs.sensors;
        let mut faults = 0;

        let roll = wrap_heading_error(target.desired_heading_rad - sensors.gps_heading)
            .and_then(|error| {
                self.heading_to_roll
                    .update_proportional(error, inputs.dt)
                    .ok()
            })
            .map(|roll| roll * speed_gain(sensors.gps_speed, &inputs.config.law))
            .filter(|roll| roll.is_finite());

        match roll {
            Some(roll) => state.desired_roll = roll,
            None => faults += 1,
        }

        state.desired_pitch = inputs.height_hold_pitch(state.desired_height);

        self.desired_to_axes(state, inputs, previous, faults)
    }

    /// Shared final stage: clamp, attitude PIDs, scaling, motor and yaw
    fn desired_to_axes(
        &mut self,
        state: &mut ControlState,
        inputs: &LawInputs<'_>,
        previous: &AxisCommands,
        mut faults: u32,
    ) -> LawOutput {
        let config = inputs.config;
        let sensors = inputs.sensors;
        let law = &config.law;
        let mode = config.airframe.attitude_pid_mode();

        state.desired_pitch = clamp_angle(state.desired_pitch, config.max_pitch);
        state.desired_roll = clamp_angle(state.desired_roll, config.max_roll);

        let mut elevator = Self::attitude_step(
            &mut self.pitch_to_elevator,
            mode,
            state.desired_pitch - sensors.pitch,
            inputs.dt,
            &mut faults,
        );
        let mut aileron = Self::attitude_step(
            &mut self.roll_to_aileron,
            mode,
            state.desired_roll - sensors.roll,
            inputs.dt,
            &mut faults,
        );

        if mode == PidMode::ProportionalOnly {
            elevator -= sensors.q * self.pitch_to_elevator.gains().d;
            aileron -= sensors.p * self.roll_to_aileron.gains().d;
        }

        let mut commands = AxisCommands {
            aileron: to_units(aileron, law.command_scale, previous.aileron, &mut faults),
            elevator: to_units(elevator, law.command_scale, previous.elevator, &mut faults),
            yaw: inputs.stick(config.channels.yaw),
            motor: inputs.stick(config.channels.motor),
        };

        if config.airframe.uses_rate_feedback() && law.yaw_rate_damping {
            let damping = sensors.r * self.heading_to_roll.gains().d;
            let correction = to_units(damping, law.command_scale, 0, &mut faults);
            commands.yaw = commands.yaw.saturating_sub(correction);
        }

        LawOutput {
            commands,
            numeric_faults: faults,
        }
    }

    fn attitude_step(
        pid: &mut PidController,
        mode: PidMode,
        error: f32,
        dt: f32,
        faults: &mut u32,
    ) -> f32 {
        match pid.step(mode, error, dt) {
            Ok(output) => output,
            Err(_) => {
                *faults += 1;
                pid.last_output()
            }
        }
    }
}
