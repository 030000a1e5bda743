//! Receiver input state
//!
//! The receiver decoder (PPM capture interrupt or similar) publishes each
//! complete frame with [`publish_frame`]. The control task copies the latest
//! frame out with [`latest_channels`] at the top of every cycle. Both sides
//! go through a critical section, so the control law never sees half a
//! frame.
//!
//! Frames containing an implausible pulse are dropped whole and counted.

use rtos_pilot_core::input::{ChannelInputs, INPUT_CHANNELS};
use rtos_pilot_core::snapshot::SnapshotCell;

/// Shortest pulse accepted from the decoder (µs)
pub const MIN_VALID_PULSE_US: u16 = 800;

/// Longest pulse accepted from the decoder (µs)
pub const MAX_VALID_PULSE_US: u16 = 2200;

/// Latest receiver frame and bookkeeping
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RcInput {
    channels: ChannelInputs,
    /// Timestamp of the last accepted frame (µs)
    pub last_update_us: u64,
    /// Accepted frames
    pub frames: u32,
    /// Frames dropped for an out-of-range pulse
    pub rejected_frames: u32,
}

impl Default for RcInput {
    fn default() -> Self {
        Self::new()
    }
}

impl RcInput {
    pub const fn new() -> Self {
        Self {
            channels: ChannelInputs::centered(),
            last_update_us: 0,
            frames: 0,
            rejected_frames: 0,
        }
    }

    /// Apply a decoded frame.
    ///
    /// Pulses beyond [`INPUT_CHANNELS`] are ignored; channels missing from a
    /// short frame keep their previous value. Returns false if the frame was
    /// rejected.
    pub fn update(&mut self, pulses: &[u16], now_us: u64) -> bool {
        let valid = pulses
            .iter()
            .take(INPUT_CHANNELS)
            .all(|p| (MIN_VALID_PULSE_US..=MAX_VALID_PULSE_US).contains(p));
        if !valid {
            self.rejected_frames = self.rejected_frames.saturating_add(1);
            return false;
        }

        for (slot, &pulse) in self.channels.pulses.iter_mut().zip(pulses) {
            *slot = pulse;
        }
        self.last_update_us = now_us;
        self.frames = self.frames.saturating_add(1);
        true
    }

    pub fn channels(&self) -> ChannelInputs {
        self.channels
    }

    /// Microseconds since the last accepted frame
    pub fn age_us(&self, now_us: u64) -> u64 {
        now_us.saturating_sub(self.last_update_us)
    }
}

/// Receiver state shared between the decoder and the control task
pub static RC_INPUT: SnapshotCell<RcInput> = SnapshotCell::new(RcInput::new());

/// Publish one decoded frame (decoder side)
pub fn publish_frame(pulses: &[u16], now_us: u64) -> bool {
    let mut accepted = false;
    RC_INPUT.update(|rc| accepted = rc.update(pulses, now_us));
    accepted
}

/// Copy of the latest accepted channels (control side)
pub fn latest_channels() -> ChannelInputs {
    RC_INPUT.read().channels()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    fn test_update_copies_frame() {
        let mut rc = RcInput::new();
        assert!(rc.update(&[1100, 1200, 1300, 1400, 1500, 1600, 1700, 1800], 5_000));

        assert_eq!(rc.channels().pulse(0), 1100);
        assert_eq!(rc.channels().pulse(7), 1800);
        assert_eq!(rc.frames, 1);
        assert_eq!(rc.age_us(7_500), 2_500);
    }

    #[test]
    fn test_short_frame_keeps_remaining_channels() {
        let mut rc = RcInput::new();
        rc.update(&[1000; 8], 0);
        rc.update(&[1900, 1900], 10);

        assert_eq!(rc.channels().pulse(1), 1900);
        assert_eq!(rc.channels().pulse(2), 1000);
    }

    #[test]
    fn test_long_frame_is_truncated() {
        let mut rc = RcInput::new();
        assert!(rc.update(&[1600; 12], 0));
        assert_eq!(rc.channels().pulses, [1600; INPUT_CHANNELS]);
    }

    #[test]
    fn test_glitched_frame_is_rejected_whole() {
        let mut rc = RcInput::new();
        assert!(!rc.update(&[1500, 1500, 40, 1500], 100));

        assert_eq!(rc.channels(), ChannelInputs::centered());
        assert_eq!(rc.rejected_frames, 1);
        assert_eq!(rc.frames, 0);
        assert_eq!(rc.last_update_us, 0);
    }

    #[test]
    #[serial]
    fn test_publish_and_read_shared_state() {
        RC_INPUT.write(RcInput::new());

        assert!(publish_frame(&[1700, 1500, 1500, 1500, 1100, 1500, 1500, 1500], 42));
        let channels = latest_channels();
        assert_eq!(channels.pulse(0), 1700);
        assert_eq!(channels.pulse(4), 1100);

        assert!(!publish_frame(&[3000; 8], 43));
        assert_eq!(latest_channels(), channels);
        assert_eq!(RC_INPUT.read().rejected_frames, 1);
    }
}
