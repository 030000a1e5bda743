//! Platform abstraction traits

pub mod pwm;

pub use pwm::{
    frame_period_us, pulse_to_duty_cycle, PwmConfig, PwmOutput, FAST_FRAME_HZ, SERVO_FRAME_HZ,
};
