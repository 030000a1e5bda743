//! Parameter store and the control parameter group
//!
//! The store is a plain name/value map; [`control`] maps it onto
//! [`ControlConfig`](crate::control::ControlConfig). Saving to flash is the
//! firmware's concern.

pub mod control;
pub mod error;
pub mod storage;

pub use error::ParameterError;
pub use storage::{ParamFlags, ParamValue, ParameterStore, MAX_PARAMS, PARAM_NAME_LEN};
