//! Vehicle-level control
//!
//! - [`control_task`]: owns the control context and actuators, runs cycles
//! - [`monitor`]: loop health summary and warnings
//! - `runtime` (feature `embassy`): async loop on the embassy timer

pub mod control_task;
pub mod monitor;

#[cfg(feature = "embassy")]
pub mod runtime;

pub use control_task::{ControlLinks, ControlTask, NAV_TARGET, SENSORS, TELEMETRY};
pub use monitor::{ControlHealth, HealthMonitor};

#[cfg(feature = "embassy")]
pub use runtime::{run_control_loop, EmbassyClock, MODE_CHANGED};
