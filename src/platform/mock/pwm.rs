//! Mock PWM output for host tests

use crate::platform::{
    error::PwmError,
    traits::{frame_period_us, PwmConfig, PwmOutput},
    Result,
};

/// Records pulse and frame rate, enforcing the same limits as hardware.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MockPwm {
    pulse_us: u16,
    frame_hz: u32,
    /// Number of accepted pulse updates
    pub updates: u32,
    /// Fail every write, for fault-path tests
    pub fail_writes: bool,
}

impl MockPwm {
    pub fn new(config: PwmConfig) -> Self {
        Self {
            pulse_us: config.initial_pulse_us,
            frame_hz: config.frame_hz,
            updates: 0,
            fail_writes: false,
        }
    }
}

impl Default for MockPwm {
    fn default() -> Self {
        Self::new(PwmConfig::default())
    }
}

impl PwmOutput for MockPwm {
    fn set_pulse_us(&mut self, pulse_us: u16) -> Result<()> {
        if self.fail_writes {
            return Err(PwmError::ChannelUnavailable.into());
        }
        if u32::from(pulse_us) >= frame_period_us(self.frame_hz) {
            return Err(PwmError::InvalidPulseWidth.into());
        }
        self.pulse_us = pulse_us;
        self.updates += 1;
        Ok(())
    }

    fn pulse_us(&self) -> u16 {
        self.pulse_us
    }

    fn set_frame_rate(&mut self, frame_hz: u32) -> Result<()> {
        let period = frame_period_us(frame_hz);
        if period == 0 || u32::from(self.pulse_us) >= period {
            return Err(PwmError::InvalidFrameRate.into());
        }
        self.frame_hz = frame_hz;
        Ok(())
    }

    fn frame_rate(&self) -> u32 {
        self.frame_hz
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::{PlatformError, FAST_FRAME_HZ};

    #[test]
    fn test_mock_pwm_pulse() {
        let mut pwm = MockPwm::default();
        assert_eq!(pwm.pulse_us(), 1500);

        pwm.set_pulse_us(1100).unwrap();
        assert_eq!(pwm.pulse_us(), 1100);
        assert_eq!(pwm.updates, 1);

        assert_eq!(
            pwm.set_pulse_us(25_000),
            Err(PlatformError::Pwm(PwmError::InvalidPulseWidth))
        );
    }

    #[test]
    fn test_mock_pwm_frame_rate() {
        let mut pwm = MockPwm::default();
        pwm.set_frame_rate(FAST_FRAME_HZ).unwrap();
        assert_eq!(pwm.frame_rate(), 400);

        assert!(pwm.set_frame_rate(0).is_err());
        // 1500 µs does not fit in a 1 ms frame
        assert!(pwm.set_frame_rate(1000).is_err());
        assert_eq!(pwm.frame_rate(), 400);
    }

    #[test]
    fn test_mock_pwm_forced_failure() {
        let mut pwm = MockPwm::default();
        pwm.fail_writes = true;
        assert_eq!(
            pwm.set_pulse_us(1500),
            Err(PlatformError::Pwm(PwmError::ChannelUnavailable))
        );
    }
}
