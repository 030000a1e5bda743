//! Output mixing: abstract control axes to physical actuator pulses.
//!
//! [`mix`] is a pure function of its inputs. One arm per closed topology,
//! then every channel is clamped to its calibrated `[min, max]`. Channels a
//! topology does not drive sit at their neutral pulse.
//!
//! ```text
//!   QUADROCOPTER rotor layout
//!          0
//!        /   \
//!       3     1
//!        \   /
//!          2
//! ```

pub mod trim;

pub use trim::{bootstrap_trim, TrimReport};

use bitflags::bitflags;

/// Number of physical actuator outputs
pub const SERVO_CHANNELS: usize = 6;

/// Nominal servo centre pulse in microseconds
pub const SERVO_CENTER_US: u16 = 1500;

/// Divisor limiting how far attitude corrections perturb quad thrust
const QUAD_CORRECTION_DIVISOR: i32 = 5;

/// Per-cycle axis commands in signed actuator units
///
/// Control axes are nominally ±500, motor 0..1000.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AxisCommands {
    pub aileron: i32,
    pub elevator: i32,
    pub yaw: i32,
    pub motor: i32,
}

/// Mixed, clamped pulse widths ready for the actuator driver
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ServoOutputs {
    pub pulses: [u16; SERVO_CHANNELS],
}

impl ServoOutputs {
    pub const fn new(pulses: [u16; SERVO_CHANNELS]) -> Self {
        Self { pulses }
    }

    pub fn pulse(&self, channel: usize) -> Option<u16> {
        self.pulses.get(channel).copied()
    }
}

impl Default for ServoOutputs {
    fn default() -> Self {
        Self::new([SERVO_CENTER_US; SERVO_CHANNELS])
    }
}

/// Airframe mixing topology
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MixTopology {
    /// Separate aileron, elevator, motor and rudder servos
    #[default]
    Aileron,
    /// Elevons, surface 0 = -(ail + elev), surface 1 = -ail + elev
    DeltaPlus,
    /// Elevons with the elevator sign mirrored relative to `DeltaPlus`
    DeltaMin,
    /// Four rotors, attitude corrections scaled by 1/5
    Quadrocopter,
}

impl MixTopology {
    /// Parameter-store encoding
    pub fn from_index(index: i32) -> Option<Self> {
        match index {
            0 => Some(MixTopology::Aileron),
            1 => Some(MixTopology::DeltaPlus),
            2 => Some(MixTopology::DeltaMin),
            3 => Some(MixTopology::Quadrocopter),
            _ => None,
        }
    }

    pub fn index(&self) -> i32 {
        match self {
            MixTopology::Aileron => 0,
            MixTopology::DeltaPlus => 1,
            MixTopology::DeltaMin => 2,
            MixTopology::Quadrocopter => 3,
        }
    }
}

bitflags! {
    /// Per-output sign reversal
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct ServoReverse: u8 {
        const SERVO1 = 1 << 0;
        const SERVO2 = 1 << 1;
        const SERVO3 = 1 << 2;
        const SERVO4 = 1 << 3;
        const SERVO5 = 1 << 4;
        const SERVO6 = 1 << 5;
    }
}

impl ServoReverse {
    /// Whether output `channel` (0-based) is reversed
    pub fn is_reversed(&self, channel: usize) -> bool {
        channel < SERVO_CHANNELS && self.bits() & (1 << channel) != 0
    }
}

/// Travel limits and neutral of one output, in microseconds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ServoCalibration {
    pub min: u16,
    pub neutral: u16,
    pub max: u16,
}

impl Default for ServoCalibration {
    fn default() -> Self {
        Self {
            min: 1000,
            neutral: SERVO_CENTER_US,
            max: 2000,
        }
    }
}

impl ServoCalibration {
    pub fn is_valid(&self) -> bool {
        self.min <= self.neutral && self.neutral <= self.max
    }

    /// Clamp a raw pulse into `[min, max]`
    pub fn clamp(&self, pulse: i32) -> u16 {
        pulse.clamp(i32::from(self.min), i32::from(self.max)) as u16
    }
}

/// Mixer section of the control configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MixerConfig {
    pub topology: MixTopology,
    pub reverse: ServoReverse,
    pub servos: [ServoCalibration; SERVO_CHANNELS],
    /// Extra deflection given to the leading aileron, percent of command
    pub aileron_differential_pct: u8,
}

impl MixerConfig {
    pub fn neutrals(&self) -> [u16; SERVO_CHANNELS] {
        let mut neutrals = [0; SERVO_CHANNELS];
        for (slot, servo) in neutrals.iter_mut().zip(self.servos.iter()) {
            *slot = servo.neutral;
        }
        neutrals
    }

    /// Copy of this config with the neutral of every output replaced
    pub fn with_neutrals(mut self, neutrals: [u16; SERVO_CHANNELS]) -> Self {
        for (servo, neutral) in self.servos.iter_mut().zip(neutrals) {
            servo.neutral = neutral;
        }
        self
    }
}

/// Split the aileron command into (right, left) surfaces.
///
/// The differential magnitude follows `|aileron|` and is always added to the
/// right surface and taken from the left, whatever the stick direction.
fn split_aileron(aileron: i32, differential_pct: u8) -> (i32, i32) {
    let aileron = i64::from(aileron);
    let extra = aileron.abs() * i64::from(differential_pct) / 100;
    (saturate(aileron + extra), saturate(aileron - extra))
}

fn saturate(value: i64) -> i32 {
    value.clamp(i64::from(i32::MIN), i64::from(i32::MAX)) as i32
}

fn signed(reversed: bool, value: i32) -> i32 {
    if reversed {
        value.saturating_neg()
    } else {
        value
    }
}

/// Map axis commands onto clamped actuator pulses.
///
/// Same inputs always give the same outputs. All arithmetic saturates, so
/// an extreme command ends at the limit on its own side.
pub fn mix(commands: &AxisCommands, config: &MixerConfig) -> ServoOutputs {
    let AxisCommands {
        aileron,
        elevator,
        yaw,
        motor,
    } = *commands;
    let rev = |channel: usize| config.reverse.is_reversed(channel);
    let mut offsets = [0i32; SERVO_CHANNELS];

    match config.topology {
        MixTopology::Aileron => {
            let (right, left) = split_aileron(aileron, config.aileron_differential_pct);
            offsets[0] = signed(rev(0), right);
            offsets[1] = signed(!rev(1), left);
            offsets[2] = signed(rev(2), elevator);
            offsets[3] = signed(rev(3), motor);
            offsets[4] = signed(!rev(4), yaw);
        }
        MixTopology::DeltaPlus => {
            let (right, left) = split_aileron(aileron, config.aileron_differential_pct);
            offsets[0] = signed(!rev(0), right.saturating_add(elevator));
            offsets[1] = signed(!rev(1), left.saturating_sub(elevator));
            offsets[3] = signed(rev(3), motor);
        }
        MixTopology::DeltaMin => {
            let (right, left) = split_aileron(aileron, config.aileron_differential_pct);
            offsets[0] = signed(!rev(0), right.saturating_sub(elevator));
            offsets[1] = signed(!rev(1), left.saturating_add(elevator));
            offsets[3] = signed(rev(3), motor);
        }
        MixTopology::Quadrocopter => {
            let roll = aileron / QUAD_CORRECTION_DIVISOR;
            let pitch = elevator / QUAD_CORRECTION_DIVISOR;
            let yaw = yaw / QUAD_CORRECTION_DIVISOR;
            offsets[0] = motor.saturating_add(signed(rev(0), roll.saturating_add(yaw)));
            offsets[1] = motor.saturating_add(signed(rev(1), pitch.saturating_sub(yaw)));
            offsets[2] = motor.saturating_add(signed(rev(2), yaw.saturating_sub(roll)));
            offsets[3] = motor.saturating_add(signed(
                rev(3),
                pitch.saturating_neg().saturating_sub(yaw),
            ));
        }
    }

    let mut pulses = [0u16; SERVO_CHANNELS];
    for ((pulse, servo), offset) in pulses.iter_mut().zip(config.servos.iter()).zip(offsets) {
        *pulse = servo.clamp(i32::from(servo.neutral).saturating_add(offset));
    }
    ServoOutputs { pulses }
}
