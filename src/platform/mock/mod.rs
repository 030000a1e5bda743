//! Mock platform implementations for host tests and simulation

mod pwm;

pub use pwm::MockPwm;
