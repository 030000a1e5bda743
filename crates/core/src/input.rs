//! Per-cycle inputs to the control core.
//!
//! All three input types are plain `Copy` snapshots. Producers publish them
//! through [`SnapshotCell`](crate::snapshot::SnapshotCell) and the control
//! cycle copies them out once at the top of each cycle.

/// Number of receiver channels the core reads
pub const INPUT_CHANNELS: usize = 8;

/// Nominal centre pulse width in microseconds
pub const PULSE_CENTER_US: u16 = 1500;

/// Raw receiver pulse widths in microseconds, one per logical channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChannelInputs {
    pub pulses: [u16; INPUT_CHANNELS],
}

impl Default for ChannelInputs {
    fn default() -> Self {
        Self::centered()
    }
}

impl ChannelInputs {
    pub const fn new(pulses: [u16; INPUT_CHANNELS]) -> Self {
        Self { pulses }
    }

    /// All channels at the nominal 1500 µs centre
    pub const fn centered() -> Self {
        Self {
            pulses: [PULSE_CENTER_US; INPUT_CHANNELS],
        }
    }

    /// Pulse width of `channel`, or the nominal centre if the index is unknown
    pub fn pulse(&self, channel: usize) -> u16 {
        self.pulses.get(channel).copied().unwrap_or(PULSE_CENTER_US)
    }

    /// Copy of these inputs with `channel` set to `pulse_us`
    pub fn with_pulse(mut self, channel: usize, pulse_us: u16) -> Self {
        if let Some(slot) = self.pulses.get_mut(channel) {
            *slot = pulse_us;
        }
        self
    }
}

/// Which receiver channel carries which pilot function.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChannelMap {
    pub roll: usize,
    pub pitch: usize,
    pub yaw: usize,
    pub motor: usize,
    /// Auxiliary channel selecting the flight mode
    pub mode: usize,
}

impl Default for ChannelMap {
    fn default() -> Self {
        Self {
            roll: 0,
            pitch: 1,
            yaw: 2,
            motor: 3,
            mode: 4,
        }
    }
}

impl ChannelMap {
    /// All mapped channel indices, in roll/pitch/yaw/motor/mode order
    pub const fn indices(&self) -> [usize; 5] {
        [self.roll, self.pitch, self.yaw, self.motor, self.mode]
    }
}

/// Attitude, rates, height and GPS state from the sensor collaborator.
///
/// Values are used as delivered; sensor health is the producer's concern.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SensorSnapshot {
    /// Roll angle (rad)
    pub roll: f32,
    /// Pitch angle (rad)
    pub pitch: f32,
    /// Body roll rate (rad/s)
    pub p: f32,
    /// Body pitch rate (rad/s)
    pub q: f32,
    /// Body yaw rate (rad/s)
    pub r: f32,
    /// Barometric height (m)
    pub pressure_height: f32,
    /// GPS course over ground (rad)
    pub gps_heading: f32,
    /// GPS ground speed (m/s)
    pub gps_speed: f32,
}

impl SensorSnapshot {
    /// All-zero snapshot, usable in `static` initialisers
    pub const fn zeroed() -> Self {
        Self {
            roll: 0.0,
            pitch: 0.0,
            p: 0.0,
            q: 0.0,
            r: 0.0,
            pressure_height: 0.0,
            gps_heading: 0.0,
            gps_speed: 0.0,
        }
    }
}

/// Target produced by the navigation collaborator.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct NavigationTarget {
    /// Desired heading (rad), only consumed in autopilot mode
    pub desired_heading_rad: f32,
}

impl NavigationTarget {
    pub const fn new(desired_heading_rad: f32) -> Self {
        Self {
            desired_heading_rad,
        }
    }
}
