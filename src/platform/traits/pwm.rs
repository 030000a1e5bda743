//! Servo PWM output trait

use crate::platform::Result;

/// Standard servo frame rate (20 ms frame)
pub const SERVO_FRAME_HZ: u32 = 50;

/// Fast frame rate for multirotor ESCs (2.5 ms frame)
pub const FAST_FRAME_HZ: u32 = 400;

/// PWM channel configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PwmConfig {
    /// Frame rate in Hz
    pub frame_hz: u32,
    /// Pulse emitted until the first command (µs)
    pub initial_pulse_us: u16,
}

impl Default for PwmConfig {
    fn default() -> Self {
        Self {
            frame_hz: SERVO_FRAME_HZ,
            initial_pulse_us: 1500,
        }
    }
}

/// Frame period in microseconds for `frame_hz`
pub const fn frame_period_us(frame_hz: u32) -> u32 {
    if frame_hz == 0 {
        0
    } else {
        1_000_000 / frame_hz
    }
}

/// Fraction of the frame the pulse is high, as programmed into the counter
pub fn pulse_to_duty_cycle(pulse_us: u16, frame_hz: u32) -> f32 {
    let period = frame_period_us(frame_hz);
    if period == 0 {
        0.0
    } else {
        f32::from(pulse_us) / period as f32
    }
}

/// One servo/ESC PWM output.
///
/// Platform implementations own the underlying slice and channel; only one
/// owner may drive a channel.
pub trait PwmOutput {
    /// Emit `pulse_us` on every frame from now on
    ///
    /// # Errors
    ///
    /// `PwmError::InvalidPulseWidth` if the pulse does not fit in a frame.
    fn set_pulse_us(&mut self, pulse_us: u16) -> Result<()>;

    /// Pulse currently emitted (µs)
    fn pulse_us(&self) -> u16;

    /// Change the frame rate, keeping the pulse width
    ///
    /// # Errors
    ///
    /// `PwmError::InvalidFrameRate` for zero or unreachable rates, or if the
    /// current pulse no longer fits in the shorter frame.
    fn set_frame_rate(&mut self, frame_hz: u32) -> Result<()>;

    fn frame_rate(&self) -> u32;
}
