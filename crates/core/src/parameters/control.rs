//! Control parameter definitions
//!
//! Every field of [`ControlConfig`] is backed by a named parameter. Angles
//! are stored in degrees for readability on a ground station and converted
//! to radians on load. Values outside their legal range are clamped.
//!
//! # Parameters
//!
//! - `FRAME_TYPE` - Airframe strategy (0=fixed wing, 1=fixed wing rate feedback, 2=quad)
//! - `CTL_RATE_HZ` - Cycle rate override (0 = airframe default)
//! - `CH_ROLL`, `CH_PITCH`, `CH_YAW`, `CH_MOTOR`, `CH_MODE` - Receiver channel indices
//! - `CH1_TRIM`..`CH8_TRIM` - Receiver neutral pulses (µs)
//! - `CTL_ROLL_MAX`, `CTL_PITCH_MAX` - Angle limits (deg)
//! - `PID_HDG_*`, `PID_PIT_*`, `PID_ROL_*` - Gains for heading→roll, pitch→elevator, roll→aileron
//! - `MIX_TYPE` - Mixing topology (0=aileron, 1=delta+, 2=delta-, 3=quad)
//! - `MIX_AIL_DIFF` - Aileron differential (%)
//! - `SERVO_REVERSED` - Reversal bitmask, bit 0 = servo 1
//! - `SERVOn_MIN`, `SERVOn_TRIM`, `SERVOn_MAX` - Servo calibration (µs)
//! - `CTL_MANUAL_TRIM` - Capture trims from the sticks at startup
//! - `MODE_AP_BELOW`, `MODE_STAB_BELOW` - Mode channel thresholds (µs)
//! - `CTL_ALT_HOLD`, `CTL_PIT_DBAND`, `CTL_HGT_SCALE` - Altitude hold
//! - `NAV_CRUISE_SPD`, `NAV_SPD_GMIN`, `NAV_SPD_GMAX` - Heading gain schedule
//! - `CTL_STICK_RANGE`, `CTL_CMD_SCALE`, `CTL_YAW_DAMP` - Scaling and damping

use core::fmt::Write;

use heapless::String;

use super::error::ParameterError;
use super::storage::{ParamFlags, ParamValue, ParameterStore, PARAM_NAME_LEN};
use crate::control::{Airframe, ControlConfig, ControlLawConfig, ModeThresholds, PidGains};
use crate::input::{ChannelMap, INPUT_CHANNELS};
use crate::mixer::{MixTopology, MixerConfig, ServoCalibration, ServoReverse, SERVO_CHANNELS};

const MIN_PULSE_US: i32 = 800;
const MAX_PULSE_US: i32 = 2200;

const MIN_ANGLE_DEG: f32 = 1.0;
const MAX_ROLL_DEG: f32 = 80.0;
const MAX_PITCH_DEG: f32 = 60.0;

const MAX_GAIN: f32 = 100.0;

type ParamName = String<PARAM_NAME_LEN>;

/// `SERVO3_MIN`-style names
fn indexed_name(prefix: &str, index: usize, suffix: &str) -> Result<ParamName, ParameterError> {
    let mut name = ParamName::new();
    write!(name, "{}{}{}", prefix, index + 1, suffix).map_err(|_| ParameterError::InvalidConfig)?;
    Ok(name)
}

fn load_float(store: &ParameterStore, name: &str, default: f32, min: f32, max: f32) -> f32 {
    match store.get(name) {
        Some(value) if value.as_f32().is_finite() => value.as_f32().clamp(min, max),
        _ => default,
    }
}

fn load_int(store: &ParameterStore, name: &str, default: i32, min: i32, max: i32) -> i32 {
    store
        .get(name)
        .map_or(default, |value| value.as_i32().clamp(min, max))
}

fn load_bool(store: &ParameterStore, name: &str, default: bool) -> bool {
    store.get(name).map_or(default, |value| value.as_bool())
}

fn load_pulse(store: &ParameterStore, name: &str, default: u16) -> u16 {
    load_int(store, name, i32::from(default), MIN_PULSE_US, MAX_PULSE_US) as u16
}

fn load_channel(store: &ParameterStore, name: &str, default: usize) -> usize {
    load_int(store, name, default as i32, 0, INPUT_CHANNELS as i32 - 1) as usize
}

fn load_gains(store: &ParameterStore, prefix: &str, default: PidGains) -> Result<PidGains, ParameterError> {
    let mut gains = default;
    for (term, slot) in [("_P", &mut gains.p), ("_I", &mut gains.i), ("_D", &mut gains.d)] {
        let mut name = ParamName::new();
        write!(name, "{}{}", prefix, term).map_err(|_| ParameterError::InvalidConfig)?;
        *slot = load_float(store, &name, *slot, 0.0, MAX_GAIN);
    }
    Ok(gains)
}

fn register_gains(store: &mut ParameterStore, prefix: &str, gains: PidGains) -> Result<(), ParameterError> {
    for (term, value) in [("_P", gains.p), ("_I", gains.i), ("_D", gains.d)] {
        let mut name = ParamName::new();
        write!(name, "{}{}", prefix, term).map_err(|_| ParameterError::InvalidConfig)?;
        store.register(&name, ParamValue::Float(value), ParamFlags::empty())?;
    }
    Ok(())
}

impl ControlConfig {
    /// Register every control parameter with its default value
    ///
    /// # Arguments
    ///
    /// * `store` - Parameter store to register parameters in
    ///
    /// # Returns
    ///
    /// Ok if all parameters registered successfully
    pub fn register_defaults(store: &mut ParameterStore) -> Result<(), ParameterError> {
        let d = ControlConfig::default();
        let none = ParamFlags::empty();

        store.register("FRAME_TYPE", ParamValue::Int(d.airframe.index()), none)?;
        store.register("CTL_RATE_HZ", ParamValue::Int(d.cycle_rate_hz as i32), none)?;

        let map = d.channels;
        store.register("CH_ROLL", ParamValue::Int(map.roll as i32), none)?;
        store.register("CH_PITCH", ParamValue::Int(map.pitch as i32), none)?;
        store.register("CH_YAW", ParamValue::Int(map.yaw as i32), none)?;
        store.register("CH_MOTOR", ParamValue::Int(map.motor as i32), none)?;
        store.register("CH_MODE", ParamValue::Int(map.mode as i32), none)?;
        for (i, &neutral) in d.channel_neutral.iter().enumerate() {
            let name = indexed_name("CH", i, "_TRIM")?;
            store.register(&name, ParamValue::Int(i32::from(neutral)), none)?;
        }

        store.register("CTL_ROLL_MAX", ParamValue::Float(d.max_roll.to_degrees()), none)?;
        store.register("CTL_PITCH_MAX", ParamValue::Float(d.max_pitch.to_degrees()), none)?;

        register_gains(store, "PID_HDG", d.heading_to_roll)?;
        register_gains(store, "PID_PIT", d.pitch_to_elevator)?;
        register_gains(store, "PID_ROL", d.roll_to_aileron)?;

        store.register("MIX_TYPE", ParamValue::Int(d.mixer.topology.index()), none)?;
        store.register(
            "MIX_AIL_DIFF",
            ParamValue::Int(i32::from(d.mixer.aileron_differential_pct)),
            none,
        )?;
        store.register(
            "SERVO_REVERSED",
            ParamValue::Int(i32::from(d.mixer.reverse.bits())),
            none,
        )?;
        for (i, servo) in d.mixer.servos.iter().enumerate() {
            store.register(&indexed_name("SERVO", i, "_MIN")?, ParamValue::Int(i32::from(servo.min)), none)?;
            store.register(&indexed_name("SERVO", i, "_TRIM")?, ParamValue::Int(i32::from(servo.neutral)), none)?;
            store.register(&indexed_name("SERVO", i, "_MAX")?, ParamValue::Int(i32::from(servo.max)), none)?;
        }

        store.register("CTL_MANUAL_TRIM", ParamValue::Bool(d.manual_trim), none)?;
        store.register(
            "MODE_AP_BELOW",
            ParamValue::Int(i32::from(d.mode_thresholds.autopilot_below)),
            none,
        )?;
        store.register(
            "MODE_STAB_BELOW",
            ParamValue::Int(i32::from(d.mode_thresholds.stabilized_below)),
            none,
        )?;

        let law = d.law;
        store.register("CTL_ALT_HOLD", ParamValue::Bool(law.altitude_hold_in_stabilized), none)?;
        store.register("CTL_PIT_DBAND", ParamValue::Float(law.pitch_deadband_fraction), none)?;
        store.register("CTL_HGT_SCALE", ParamValue::Float(law.height_error_scale), none)?;
        store.register("NAV_CRUISE_SPD", ParamValue::Float(law.cruise_speed), none)?;
        store.register("NAV_SPD_GMIN", ParamValue::Float(law.speed_gain_min), none)?;
        store.register("NAV_SPD_GMAX", ParamValue::Float(law.speed_gain_max), none)?;
        store.register("CTL_STICK_RANGE", ParamValue::Float(law.stick_half_range_us), none)?;
        store.register("CTL_CMD_SCALE", ParamValue::Float(law.command_scale), none)?;
        store.register("CTL_YAW_DAMP", ParamValue::Bool(law.yaw_rate_damping), none)?;

        Ok(())
    }

    /// Load the control configuration from the parameter store.
    ///
    /// Missing parameters fall back to their defaults. The result still
    /// needs [`ControlConfig::validate`]; clamping keeps each value in range
    /// but cannot fix inconsistent combinations such as `min > max`.
    pub fn from_store(store: &ParameterStore) -> Result<Self, ParameterError> {
        let d = ControlConfig::default();

        let airframe = Airframe::from_index(load_int(store, "FRAME_TYPE", d.airframe.index(), 0, 2))
            .unwrap_or(d.airframe);
        let cycle_rate_hz = load_int(store, "CTL_RATE_HZ", d.cycle_rate_hz as i32, 0, 400) as u32;

        let channels = ChannelMap {
            roll: load_channel(store, "CH_ROLL", d.channels.roll),
            pitch: load_channel(store, "CH_PITCH", d.channels.pitch),
            yaw: load_channel(store, "CH_YAW", d.channels.yaw),
            motor: load_channel(store, "CH_MOTOR", d.channels.motor),
            mode: load_channel(store, "CH_MODE", d.channels.mode),
        };

        let mut channel_neutral = d.channel_neutral;
        for (i, neutral) in channel_neutral.iter_mut().enumerate() {
            *neutral = load_pulse(store, &indexed_name("CH", i, "_TRIM")?, *neutral);
        }

        let max_roll = load_float(
            store,
            "CTL_ROLL_MAX",
            d.max_roll.to_degrees(),
            MIN_ANGLE_DEG,
            MAX_ROLL_DEG,
        )
        .to_radians();
        let max_pitch = load_float(
            store,
            "CTL_PITCH_MAX",
            d.max_pitch.to_degrees(),
            MIN_ANGLE_DEG,
            MAX_PITCH_DEG,
        )
        .to_radians();

        let mut servos = [ServoCalibration::default(); SERVO_CHANNELS];
        for (i, servo) in servos.iter_mut().enumerate() {
            let defaults = d.mixer.servos[i];
            servo.min = load_pulse(store, &indexed_name("SERVO", i, "_MIN")?, defaults.min);
            servo.neutral = load_pulse(store, &indexed_name("SERVO", i, "_TRIM")?, defaults.neutral);
            servo.max = load_pulse(store, &indexed_name("SERVO", i, "_MAX")?, defaults.max);
        }

        let mixer = MixerConfig {
            topology: MixTopology::from_index(load_int(store, "MIX_TYPE", d.mixer.topology.index(), 0, 3))
                .unwrap_or(d.mixer.topology),
            reverse: ServoReverse::from_bits_truncate(
                load_int(store, "SERVO_REVERSED", i32::from(d.mixer.reverse.bits()), 0, 0x3f) as u8,
            ),
            servos,
            aileron_differential_pct: load_int(
                store,
                "MIX_AIL_DIFF",
                i32::from(d.mixer.aileron_differential_pct),
                0,
                100,
            ) as u8,
        };

        let mode_thresholds = ModeThresholds {
            autopilot_below: load_pulse(store, "MODE_AP_BELOW", d.mode_thresholds.autopilot_below),
            stabilized_below: load_pulse(store, "MODE_STAB_BELOW", d.mode_thresholds.stabilized_below),
        };

        let dl = d.law;
        let law = ControlLawConfig {
            altitude_hold_in_stabilized: load_bool(store, "CTL_ALT_HOLD", dl.altitude_hold_in_stabilized),
            pitch_deadband_fraction: load_float(store, "CTL_PIT_DBAND", dl.pitch_deadband_fraction, 0.0, 1.0),
            height_error_scale: load_float(store, "CTL_HGT_SCALE", dl.height_error_scale, 1.0, 1000.0),
            cruise_speed: load_float(store, "NAV_CRUISE_SPD", dl.cruise_speed, 1.0, 100.0),
            speed_gain_min: load_float(store, "NAV_SPD_GMIN", dl.speed_gain_min, 0.1, 5.0),
            speed_gain_max: load_float(store, "NAV_SPD_GMAX", dl.speed_gain_max, 0.1, 5.0),
            stick_half_range_us: load_float(store, "CTL_STICK_RANGE", dl.stick_half_range_us, 100.0, 1000.0),
            command_scale: load_float(store, "CTL_CMD_SCALE", dl.command_scale, 1.0, 5000.0),
            yaw_rate_damping: load_bool(store, "CTL_YAW_DAMP", dl.yaw_rate_damping),
        };

        Ok(Self {
            airframe,
            cycle_rate_hz,
            channels,
            channel_neutral,
            max_roll,
            max_pitch,
            heading_to_roll: load_gains(store, "PID_HDG", d.heading_to_roll)?,
            pitch_to_elevator: load_gains(store, "PID_PIT", d.pitch_to_elevator)?,
            roll_to_aileron: load_gains(store, "PID_ROL", d.roll_to_aileron)?,
            mixer,
            manual_trim: load_bool(store, "CTL_MANUAL_TRIM", d.manual_trim),
            mode_thresholds,
            law,
        })
    }
}
