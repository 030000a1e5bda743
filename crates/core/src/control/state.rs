//! Control state carried from one cycle to the next

use super::mode::FlightMode;

/// Targets owned by the control task.
///
/// Other tasks only ever see a copy (see
/// [`ControlTelemetry`](crate::cycle::ControlTelemetry)).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ControlState {
    pub mode: FlightMode,
    /// Desired roll angle (rad)
    pub desired_roll: f32,
    /// Desired pitch angle (rad)
    pub desired_pitch: f32,
    /// Altitude-hold target, same unit as the barometric height
    pub desired_height: f32,
}

impl ControlState {
    pub const fn new() -> Self {
        Self {
            mode: FlightMode::Manual,
            desired_roll: 0.0,
            desired_pitch: 0.0,
            desired_height: 0.0,
        }
    }
}

impl Default for ControlState {
    fn default() -> Self {
        Self::new()
    }
}
