//! Platform error types

use core::fmt;

/// Result type for platform operations
pub type Result<T> = core::result::Result<T, PlatformError>;

/// Platform-level errors
///
/// HAL-specific failures are mapped onto these variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlatformError {
    /// PWM operation failed
    Pwm(PwmError),
    /// Invalid configuration provided
    InvalidConfig,
}

/// PWM-specific errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PwmError {
    /// Pulse longer than the PWM frame
    InvalidPulseWidth,
    /// Frame rate zero or not achievable
    InvalidFrameRate,
    /// Channel not available
    ChannelUnavailable,
}

impl fmt::Display for PwmError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PwmError::InvalidPulseWidth => write!(f, "pulse exceeds PWM frame"),
            PwmError::InvalidFrameRate => write!(f, "invalid PWM frame rate"),
            PwmError::ChannelUnavailable => write!(f, "PWM channel unavailable"),
        }
    }
}

impl fmt::Display for PlatformError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlatformError::Pwm(e) => write!(f, "PWM error: {}", e),
            PlatformError::InvalidConfig => write!(f, "Invalid configuration"),
        }
    }
}

impl From<PwmError> for PlatformError {
    fn from(e: PwmError) -> Self {
        PlatformError::Pwm(e)
    }
}
