#![cfg_attr(not(test), no_std)]

//! rtos_pilot - attitude and flight control for small fixed-wing and
//! quad-rotor autopilots
//!
//! The control laws, mixer and cycle scheduling live in the
//! platform-independent [`rtos_pilot_core`] crate. This crate adds the
//! firmware glue around it: logging, PWM output, receiver input and the
//! control task.

// Logging macros and throttling
pub mod logging;

// Platform abstraction layer
pub mod platform;

// Receiver input and servo output
pub mod libraries;

// Control task, health monitor and runtime
pub mod vehicle;

pub use rtos_pilot_core as control_core;
