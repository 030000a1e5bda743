//! Trait seams between the control core and the platform.
//!
//! Trait definitions carry no feature gates; platform implementations
//! (embassy-time, PWM drivers) live in the firmware crate.

pub mod actuator;
pub mod time;

pub use actuator::{ActuatorSink, RecordingSink};
pub use time::{MockTime, TimeSource};
