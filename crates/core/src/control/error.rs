//! Control and configuration error types

/// Numeric faults rejected by the control law.
///
/// These never leave the control cycle: the caller holds its previous
/// output and bumps a fault counter instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlError {
    /// Time step was zero, negative or not finite
    InvalidTimeStep,
    /// Error signal was NaN or infinite
    NonFiniteInput,
}

impl core::fmt::Display for ControlError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            ControlError::InvalidTimeStep => write!(f, "invalid time step"),
            ControlError::NonFiniteInput => write!(f, "non-finite control input"),
        }
    }
}

/// Configuration rejected before the first control cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    /// A channel mapping points past the receiver channel count
    ChannelOutOfRange,
    /// Servo calibration is not `min <= neutral <= max`
    InvalidServoRange { channel: usize },
    /// Maximum roll or pitch angle is not a positive finite value
    InvalidAngleLimit,
    /// Cycle rate is zero or faster than the scheduler supports
    InvalidRate,
    /// Mode thresholds are not strictly increasing
    InvalidModeThresholds,
    /// Control law constants are out of their usable range
    InvalidControlLaw,
}

impl core::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            ConfigError::ChannelOutOfRange => write!(f, "channel mapping out of range"),
            ConfigError::InvalidServoRange { channel } => {
                write!(f, "servo {} range must satisfy min <= neutral <= max", channel)
            }
            ConfigError::InvalidAngleLimit => write!(f, "angle limits must be positive"),
            ConfigError::InvalidRate => write!(f, "invalid control cycle rate"),
            ConfigError::InvalidModeThresholds => write!(f, "mode thresholds must increase"),
            ConfigError::InvalidControlLaw => write!(f, "invalid control law constants"),
        }
    }
}
