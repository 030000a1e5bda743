//! Platform abstraction layer
//!
//! Hardware access sits behind the traits in [`traits`]. Board support
//! crates implement them for real PWM slices; [`mock`] implements them for
//! host tests.

pub mod error;
pub mod mock;
pub mod traits;

pub use error::{PlatformError, PwmError, Result};
pub use traits::{PwmConfig, PwmOutput, FAST_FRAME_HZ, SERVO_FRAME_HZ};
