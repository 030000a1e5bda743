//! PID compensator used by every PID-driven control axis.
//!
//! Two operating modes share one gain set:
//!
//! - [`PidMode::Full`] integrates and differentiates the error signal.
//! - [`PidMode::ProportionalOnly`] returns `p * error` and never touches the
//!   integrator or derivative state. Airframes with gyro rate feedback use it
//!   and inject the derivative term from the measured body rate instead.
//!
//! A step with `dt <= 0` (or a non-finite `dt` / error) is rejected with an
//! error and leaves the controller untouched. The caller then holds
//! [`PidController::last_output`].
//!
//! No clamping happens here; output limits belong to the caller.

use super::error::ControlError;

/// Gain triple for one control axis
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PidGains {
    pub p: f32,
    pub i: f32,
    pub d: f32,
}

impl PidGains {
    pub const fn new(p: f32, i: f32, d: f32) -> Self {
        Self { p, i, d }
    }

    pub const fn zero() -> Self {
        Self::new(0.0, 0.0, 0.0)
    }
}

/// How a step updates the controller
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PidMode {
    /// Proportional, integral and finite-difference derivative
    Full,
    /// Proportional term only, state is left untouched
    ProportionalOnly,
}

/// Stateful PID controller for a single axis
#[derive(Debug, Clone, Copy)]
pub struct PidController {
    gains: PidGains,
    integral: f32,
    previous_error: f32,
    last_output: f32,
}

impl PidController {
    pub const fn new(gains: PidGains) -> Self {
        Self {
            gains,
            integral: 0.0,
            previous_error: 0.0,
            last_output: 0.0,
        }
    }

    pub fn gains(&self) -> PidGains {
        self.gains
    }

    /// Accumulated `sum(error * dt)`
    pub fn integral(&self) -> f32 {
        self.integral
    }

    /// Error seen by the last full update
    pub fn previous_error(&self) -> f32 {
        self.previous_error
    }

    /// Output of the last accepted step, in either mode
    pub fn last_output(&self) -> f32 {
        self.last_output
    }

    /// Clear integrator, derivative history and held output
    pub fn reset(&mut self) {
        self.integral = 0.0;
        self.previous_error = 0.0;
        self.last_output = 0.0;
    }

    /// Run one controller step in `mode`.
    ///
    /// # Arguments
    ///
    /// * `error` - Setpoint minus measurement
    /// * `dt` - Seconds since the previous step, must be positive
    ///
    /// # Errors
    ///
    /// `InvalidTimeStep` for `dt <= 0` or non-finite `dt`, `NonFiniteInput`
    /// for a non-finite error. Controller state is unchanged in both cases.
    pub fn step(&mut self, mode: PidMode, error: f32, dt: f32) -> Result<f32, ControlError> {
        match mode {
            PidMode::Full => self.update(error, dt),
            PidMode::ProportionalOnly => self.update_proportional(error, dt),
        }
    }

    /// Full PID update.
    ///
    /// `integral += error * dt`, `derivative = (error - previous_error) / dt`,
    /// returns `p*error + i*integral + d*derivative`.
    pub fn update(&mut self, error: f32, dt: f32) -> Result<f32, ControlError> {
        Self::check(error, dt)?;

        let integral = self.integral + error * dt;
        let derivative = (error - self.previous_error) / dt;
        let output = self.gains.p * error + self.gains.i * integral + self.gains.d * derivative;

        self.integral = integral;
        self.previous_error = error;
        self.last_output = output;
        Ok(output)
    }

    /// Proportional-only update, integrator and derivative state untouched
    pub fn update_proportional(&mut self, error: f32, dt: f32) -> Result<f32, ControlError> {
        Self::check(error, dt)?;

        let output = self.gains.p * error;
        self.last_output = output;
        Ok(output)
    }

    fn check(error: f32, dt: f32) -> Result<(), ControlError> {
        if !dt.is_finite() || dt <= 0.0 {
            return Err(ControlError::InvalidTimeStep);
        }
        if !error.is_finite() {
            return Err(ControlError::NonFiniteInput);
        }
        Ok(())
    }
}
