//! Control configuration.
//!
//! Loaded once before the first cycle (see [`ControlConfig::from_store`])
//! and never changed in flight. The only startup mutation is the trim bootstrap, which replaces
//! the receiver and servo neutrals inside the control context.

use super::error::ConfigError;
use super::mode::ModeThresholds;
use super::pid::{PidGains, PidMode};
use crate::input::{ChannelMap, INPUT_CHANNELS, PULSE_CENTER_US};
use crate::mixer::MixerConfig;

/// Highest control cycle rate the scheduler supports
pub const MAX_CYCLE_RATE_HZ: u32 = 400;

/// Airframe control strategy, chosen once at startup
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Airframe {
    /// Fixed wing, attitude loops use full PID
    #[default]
    FixedWingDirect,
    /// Fixed wing, P-only attitude loops damped by gyro rates
    FixedWingRateFeedback,
    /// Quad-rotor, rate-damped like `FixedWingRateFeedback`, runs faster
    QuadRotor,
}

impl Airframe {
    /// Parameter-store encoding
    pub fn from_index(index: i32) -> Option<Self> {
        match index {
            0 => Some(Airframe::FixedWingDirect),
            1 => Some(Airframe::FixedWingRateFeedback),
            2 => Some(Airframe::QuadRotor),
            _ => None,
        }
    }

    pub fn index(&self) -> i32 {
        match self {
            Airframe::FixedWingDirect => 0,
            Airframe::FixedWingRateFeedback => 1,
            Airframe::QuadRotor => 2,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Airframe::FixedWingDirect => "fixed-wing",
            Airframe::FixedWingRateFeedback => "fixed-wing-rate",
            Airframe::QuadRotor => "quad",
        }
    }

    /// Nominal control rate for the airframe class
    pub fn default_rate_hz(&self) -> u32 {
        match self {
            Airframe::FixedWingDirect | Airframe::FixedWingRateFeedback => 100,
            Airframe::QuadRotor => 200,
        }
    }

    /// Whether attitude damping comes from measured body rates
    pub fn uses_rate_feedback(&self) -> bool {
        !matches!(self, Airframe::FixedWingDirect)
    }

    /// PID mode used by the attitude (pitch/roll) loops
    pub fn attitude_pid_mode(&self) -> PidMode {
        if self.uses_rate_feedback() {
            PidMode::ProportionalOnly
        } else {
            PidMode::Full
        }
    }

    /// ESCs on multirotors want the fast PWM frame
    pub fn wants_fast_refresh(&self) -> bool {
        matches!(self, Airframe::QuadRotor)
    }
}

/// Empirically tuned control-law constants
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ControlLawConfig {
    /// Hold altitude in stabilized mode while the pitch stick is centred
    pub altitude_hold_in_stabilized: bool,
    /// Pitch deadband as a fraction of `max_pitch`
    pub pitch_deadband_fraction: f32,
    /// Height error (m) that commands full `max_pitch`
    pub height_error_scale: f32,
    /// Ground speed (m/s) at which the heading gain schedule is 1.0
    pub cruise_speed: f32,
    pub speed_gain_min: f32,
    pub speed_gain_max: f32,
    /// Stick deflection (µs) that commands the full angle limit
    pub stick_half_range_us: f32,
    /// Radians to actuator units
    pub command_scale: f32,
    /// Subtract `r * heading_d` from yaw on rate-feedback airframes
    pub yaw_rate_damping: bool,
}

impl Default for ControlLawConfig {
    fn default() -> Self {
        Self {
            altitude_hold_in_stabilized: false,
            pitch_deadband_fraction: 0.2,
            height_error_scale: 20.0,
            cruise_speed: 20.0,
            speed_gain_min: 0.66,
            speed_gain_max: 1.5,
            stick_half_range_us: 500.0,
            command_scale: 630.0,
            yaw_rate_damping: true,
        }
    }
}

impl ControlLawConfig {
    pub fn is_valid(&self) -> bool {
        let positive = |v: f32| v.is_finite() && v > 0.0;

        (0.0..=1.0).contains(&self.pitch_deadband_fraction)
            && positive(self.height_error_scale)
            && positive(self.cruise_speed)
            && positive(self.speed_gain_min)
            && self.speed_gain_max.is_finite()
            && self.speed_gain_min <= self.speed_gain_max
            && positive(self.stick_half_range_us)
            && positive(self.command_scale)
    }
}

/// Everything the control core reads from configuration
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ControlConfig {
    pub airframe: Airframe,
    /// Cycle rate override, 0 selects the airframe default
    pub cycle_rate_hz: u32,
    pub channels: ChannelMap,
    /// Receiver neutral pulse per channel (µs)
    pub channel_neutral: [u16; INPUT_CHANNELS],
    /// Largest commanded roll angle (rad)
    pub max_roll: f32,
    /// Largest commanded pitch angle (rad)
    pub max_pitch: f32,
    pub heading_to_roll: PidGains,
    pub pitch_to_elevator: PidGains,
    pub roll_to_aileron: PidGains,
    pub mixer: MixerConfig,
    /// Run the trim bootstrap at startup
    pub manual_trim: bool,
    pub mode_thresholds: ModeThresholds,
    pub law: ControlLawConfig,
}

impl Default for ControlConfig {
    fn default() -> Self {
        Self {
            airframe: Airframe::default(),
            cycle_rate_hz: 0,
            channels: ChannelMap::default(),
            channel_neutral: [PULSE_CENTER_US; INPUT_CHANNELS],
            max_roll: 30.0f32.to_radians(),
            max_pitch: 20.0f32.to_radians(),
            heading_to_roll: PidGains::new(1.0, 0.0, 0.0),
            pitch_to_elevator: PidGains::new(1.0, 0.0, 0.0),
            roll_to_aileron: PidGains::new(1.0, 0.0, 0.0),
            mixer: MixerConfig::default(),
            manual_trim: false,
            mode_thresholds: ModeThresholds::default(),
            law: ControlLawConfig::default(),
        }
    }
}

impl ControlConfig {
    /// Effective cycle rate in Hz
    pub fn rate_hz(&self) -> u32 {
        if self.cycle_rate_hz == 0 {
            self.airframe.default_rate_hz()
        } else {
            self.cycle_rate_hz
        }
    }

    /// Cycle period in microseconds
    pub fn period_us(&self) -> u32 {
        1_000_000 / self.rate_hz().max(1)
    }

    /// Nominal time step in seconds
    pub fn dt(&self) -> f32 {
        1.0 / self.rate_hz().max(1) as f32
    }

    /// Reject configurations the control law cannot run with
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self
            .channels
            .indices()
            .iter()
            .any(|&channel| channel >= INPUT_CHANNELS)
        {
            return Err(ConfigError::ChannelOutOfRange);
        }

        for (channel, servo) in self.mixer.servos.iter().enumerate() {
            if !servo.is_valid() {
                return Err(ConfigError::InvalidServoRange { channel });
            }
        }

        let angle_ok = |v: f32| v.is_finite() && v > 0.0;
        if !angle_ok(self.max_roll) || !angle_ok(self.max_pitch) {
            return Err(ConfigError::InvalidAngleLimit);
        }

        if self.rate_hz() > MAX_CYCLE_RATE_HZ {
            return Err(ConfigError::InvalidRate);
        }

        if !self.mode_thresholds.is_valid() {
            return Err(ConfigError::InvalidModeThresholds);
        }

        if !self.law.is_valid() {
            return Err(ConfigError::InvalidControlLaw);
        }

        Ok(())
    }
}
