//! Actuator collaborator seam.
//!
//! The cycle driver hands every mixed servo pulse to an [`ActuatorSink`]
//! once per cycle. Writes are fire-and-forget: there is no acknowledgment,
//! so a sink that fails internally must deal with it on its own side.

use crate::mixer::SERVO_CHANNELS;

/// Receives per-channel pulse widths from the control cycle.
pub trait ActuatorSink {
    /// Write `pulse_us` (microseconds) to physical output `channel`.
    fn write(&mut self, channel: usize, pulse_us: u16);

    /// Switch outputs to the fast refresh rate used by multirotor ESCs.
    ///
    /// Sinks driving plain servos may ignore this.
    fn enable_fast_refresh(&mut self) {}
}

/// Sink that remembers what was written, for host tests.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RecordingSink {
    /// Last pulse written per channel
    pub pulses: [u16; SERVO_CHANNELS],
    /// Total number of writes received
    pub writes: u32,
    /// Whether fast refresh was requested
    pub fast_refresh: bool,
}

impl RecordingSink {
    pub const fn new() -> Self {
        Self {
            pulses: [0; SERVO_CHANNELS],
            writes: 0,
            fast_refresh: false,
        }
    }
}

impl ActuatorSink for RecordingSink {
    fn write(&mut self, channel: usize, pulse_us: u16) {
        if let Some(slot) = self.pulses.get_mut(channel) {
            *slot = pulse_us;
        }
        self.writes = self.writes.saturating_add(1);
    }

    fn enable_fast_refresh(&mut self) {
        self.fast_refresh = true;
    }
}
