//! Control cycle: owned context, periodic driver, telemetry copies

pub mod context;
pub mod driver;
pub mod telemetry;

pub use context::{ControlContext, CycleOutcome};
pub use driver::{CycleDriver, CycleReport};
pub use telemetry::{ControlTelemetry, FaultCounters};
