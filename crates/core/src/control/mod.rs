//! Control laws and their building blocks
//!
//! - [`pid`]: PID compensator (full and proportional-only)
//! - [`mode`]: flight-mode selection from the mode channel
//! - [`attitude`]: manual / stabilized / navigate control laws
//! - [`config`]: airframe strategy and control configuration

pub mod attitude;
pub mod config;
pub mod error;
pub mod mode;
pub mod pid;
pub mod state;

pub use attitude::{
    speed_gain, wrap_heading_error, AttitudeController, LawInputs, LawOutput, MAX_AXIS_COMMAND,
};
pub use config::{Airframe, ControlConfig, ControlLawConfig, MAX_CYCLE_RATE_HZ};
pub use error::{ConfigError, ControlError};
pub use mode::{FlightMode, ModeSelector, ModeThresholds, ModeTransition};
pub use pid::{PidController, PidGains, PidMode};
pub use state::ControlState;
