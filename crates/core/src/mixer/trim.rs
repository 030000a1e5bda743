//! One-shot trim bootstrap.
//!
//! With manual trim enabled, the receiver positions at startup define the
//! neutral of every pilot channel, and the servo neutrals are whatever the
//! mixer produces for those positions around a 1500 µs centre.
//!
//! The sticks must be centred (throttle at idle) when this runs. There is no
//! way to check that from here; a bootstrap with a deflected stick silently
//! trims the aircraft around that deflection.

use super::{mix, AxisCommands, MixerConfig, SERVO_CENTER_US, SERVO_CHANNELS};
use crate::input::{ChannelInputs, ChannelMap, INPUT_CHANNELS, PULSE_CENTER_US};

/// Result of a trim bootstrap
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrimReport {
    /// Captured receiver neutrals
    pub channel_neutral: [u16; INPUT_CHANNELS],
    /// Axis commands synthesized from the captured neutrals
    pub neutral_commands: AxisCommands,
    /// New servo neutral baseline
    pub servo_neutral: [u16; SERVO_CHANNELS],
}

/// Capture neutrals from `inputs` and derive the servo neutral baseline.
pub fn bootstrap_trim(
    inputs: &ChannelInputs,
    channels: &ChannelMap,
    mixer: &MixerConfig,
) -> TrimReport {
    let channel_neutral = inputs.pulses;
    let offset = |channel: usize| i32::from(inputs.pulse(channel)) - i32::from(PULSE_CENTER_US);

    let neutral_commands = AxisCommands {
        aileron: offset(channels.roll),
        elevator: offset(channels.pitch),
        yaw: offset(channels.yaw),
        motor: offset(channels.motor),
    };

    let centred = mixer.with_neutrals([SERVO_CENTER_US; SERVO_CHANNELS]);
    let servo_neutral = mix(&neutral_commands, &centred).pulses;

    TrimReport {
        channel_neutral,
        neutral_commands,
        servo_neutral,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mixer::{MixTopology, ServoCalibration};

    #[test]
    fn test_pitch_offset_reaches_elevator_neutral() {
        let channels = ChannelMap::default();
        let inputs = ChannelInputs::centered().with_pulse(channels.pitch, 1520);
        let report = bootstrap_trim(&inputs, &channels, &MixerConfig::default());

        assert_eq!(report.neutral_commands.elevator, 20);
        assert_eq!(report.neutral_commands.aileron, 0);
        assert_eq!(report.channel_neutral[channels.pitch], 1520);
        assert_eq!(report.servo_neutral[2], 1520);
        assert_eq!(report.servo_neutral[0], 1500);
    }

    #[test]
    fn test_previous_neutrals_are_ignored() {
        let channels = ChannelMap::default();
        let inputs = ChannelInputs::centered().with_pulse(channels.roll, 1540);
        let mut mixer = MixerConfig::default();
        mixer.servos[0].neutral = 1700;

        let report = bootstrap_trim(&inputs, &channels, &mixer);
        assert_eq!(report.servo_neutral[0], 1540);
        assert_eq!(report.servo_neutral[1], 1460);
    }

    #[test]
    fn test_quad_idle_throttle_sets_rotor_neutral() {
        let channels = ChannelMap::default();
        let inputs = ChannelInputs::centered().with_pulse(channels.motor, 1200);
        let mixer = MixerConfig {
            topology: MixTopology::Quadrocopter,
            ..MixerConfig::default()
        };

        let report = bootstrap_trim(&inputs, &channels, &mixer);
        assert_eq!(report.neutral_commands.motor, -300);
        assert_eq!(report.servo_neutral[..4], [1200; 4]);
        assert_eq!(report.servo_neutral[4], 1500);
    }

    #[test]
    fn test_trim_respects_servo_limits() {
        let channels = ChannelMap::default();
        let inputs = ChannelInputs::centered().with_pulse(channels.motor, 1000);
        let mut mixer = MixerConfig::default();
        mixer.servos[3] = ServoCalibration {
            min: 1100,
            neutral: 1500,
            max: 1900,
        };

        let report = bootstrap_trim(&inputs, &channels, &mixer);
        assert_eq!(report.servo_neutral[3], 1100);
    }
}
