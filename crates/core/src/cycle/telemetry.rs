//! Copies of control state published for diagnostics

use crate::control::ControlState;
use crate::mixer::{AxisCommands, ServoOutputs, SERVO_CENTER_US, SERVO_CHANNELS};

/// Fault counters exposed to the diagnostic surface
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FaultCounters {
    /// Cycles that finished after their deadline
    pub timing_faults: u32,
    /// Rejected PID steps, bad heading errors and non-finite commands
    pub numeric_faults: u32,
    /// Completed control cycles
    pub cycles: u64,
}

/// Snapshot of the control task's state after one cycle
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ControlTelemetry {
    pub state: ControlState,
    pub commands: AxisCommands,
    pub outputs: ServoOutputs,
    pub faults: FaultCounters,
}

impl ControlTelemetry {
    /// Telemetry before the first cycle, usable in `static` initialisers
    pub const fn new() -> Self {
        Self {
            state: ControlState::new(),
            commands: AxisCommands {
                aileron: 0,
                elevator: 0,
                yaw: 0,
                motor: 0,
            },
            outputs: ServoOutputs::new([SERVO_CENTER_US; SERVO_CHANNELS]),
            faults: FaultCounters {
                timing_faults: 0,
                numeric_faults: 0,
                cycles: 0,
            },
        }
    }
}

impl Default for ControlTelemetry {
    fn default() -> Self {
        Self::new()
    }
}
