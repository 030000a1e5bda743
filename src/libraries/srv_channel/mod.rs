//! Servo output bank
//!
//! Implements the control core's actuator sink on top of one
//! [`PwmOutput`] per physical channel. Writes are fire-and-forget from the
//! control cycle's point of view; failures are counted here and reported
//! by the health monitor.

use rtos_pilot_core::mixer::SERVO_CHANNELS;
use rtos_pilot_core::traits::ActuatorSink;

use crate::platform::{PlatformError, PwmOutput, FAST_FRAME_HZ};

/// All actuator outputs of the airframe
pub struct ServoBank<P: PwmOutput> {
    outputs: [P; SERVO_CHANNELS],
    write_errors: u32,
    last_error: Option<PlatformError>,
}

impl<P: PwmOutput> ServoBank<P> {
    pub fn new(outputs: [P; SERVO_CHANNELS]) -> Self {
        Self {
            outputs,
            write_errors: 0,
            last_error: None,
        }
    }

    pub fn output(&self, channel: usize) -> Option<&P> {
        self.outputs.get(channel)
    }

    pub fn output_mut(&mut self, channel: usize) -> Option<&mut P> {
        self.outputs.get_mut(channel)
    }

    /// Pulses currently emitted on every channel
    pub fn pulses(&self) -> [u16; SERVO_CHANNELS] {
        let mut pulses = [0; SERVO_CHANNELS];
        for (slot, output) in pulses.iter_mut().zip(self.outputs.iter()) {
            *slot = output.pulse_us();
        }
        pulses
    }

    /// Failed writes since startup
    pub fn write_errors(&self) -> u32 {
        self.write_errors
    }

    pub fn last_error(&self) -> Option<PlatformError> {
        self.last_error
    }

    fn record(&mut self, result: Result<(), PlatformError>) {
        if let Err(e) = result {
            self.write_errors = self.write_errors.saturating_add(1);
            self.last_error = Some(e);
        }
    }
}

impl<P: PwmOutput> ActuatorSink for ServoBank<P> {
    fn write(&mut self, channel: usize, pulse_us: u16) {
        let result = match self.outputs.get_mut(channel) {
            Some(output) => output.set_pulse_us(pulse_us),
            None => Err(PlatformError::InvalidConfig),
        };
        self.record(result);
    }

    fn enable_fast_refresh(&mut self) {
        for channel in 0..SERVO_CHANNELS {
            let result = self.outputs[channel].set_frame_rate(FAST_FRAME_HZ);
            self.record(result);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::mock::MockPwm;
    use crate::platform::{PwmError, SERVO_FRAME_HZ};

    fn bank() -> ServoBank<MockPwm> {
        ServoBank::new([MockPwm::default(); SERVO_CHANNELS])
    }

    #[test]
    fn test_write_sets_pulse() {
        let mut bank = bank();
        bank.write(0, 1700);
        bank.write(3, 1100);

        assert_eq!(bank.pulses(), [1700, 1500, 1500, 1100, 1500, 1500]);
        assert_eq!(bank.write_errors(), 0);
    }

    #[test]
    fn test_write_failure_is_counted() {
        let mut bank = bank();
        if let Some(output) = bank.output_mut(2) {
            output.fail_writes = true;
        }
        bank.write(2, 1600);
        bank.write(SERVO_CHANNELS, 1600);

        assert_eq!(bank.write_errors(), 2);
        assert_eq!(bank.last_error(), Some(PlatformError::InvalidConfig));
        assert_eq!(bank.pulses()[2], 1500);
    }

    #[test]
    fn test_fast_refresh_switches_frame_rate() {
        let mut bank = bank();
        bank.enable_fast_refresh();

        for channel in 0..SERVO_CHANNELS {
            assert_eq!(bank.output(channel).map(|o| o.frame_rate()), Some(FAST_FRAME_HZ));
        }
        assert_eq!(bank.write_errors(), 0);
    }

    #[test]
    fn test_fast_refresh_accepts_pulse_that_fits() {
        let mut bank = bank();
        // 2.4 ms still fits the 2.5 ms frame
        bank.write(0, 2400);
        bank.enable_fast_refresh();

        assert_eq!(bank.write_errors(), 0);
        assert_eq!(bank.output(0).map(|o| o.frame_rate()), Some(FAST_FRAME_HZ));
    }

    #[test]
    fn test_fast_refresh_rejects_long_pulse() {
        let mut bank = bank();
        // 2.6 ms is fine at 50 Hz but does not fit the 2.5 ms frame
        bank.write(1, 2600);
        assert_eq!(bank.write_errors(), 0);

        bank.enable_fast_refresh();

        assert_eq!(bank.write_errors(), 1);
        assert_eq!(bank.last_error(), Some(PlatformError::Pwm(PwmError::InvalidFrameRate)));
        assert_eq!(bank.output(1).map(|o| o.frame_rate()), Some(SERVO_FRAME_HZ));
        assert_eq!(bank.output(1).map(|o| o.pulse_us()), Some(2600));
        assert_eq!(bank.output(0).map(|o| o.frame_rate()), Some(FAST_FRAME_HZ));
    }
}
