//! rtos_pilot_core - Pure no_std flight-control core
//!
//! Everything that decides what the actuators do lives here, free of
//! platform code so it can be tested on the host without feature flags.
//!
//! # Design Principles
//!
//! - **Zero cfg**: No `#[cfg(feature = ...)]` directives
//! - **Pure no_std**: No std library dependencies
//! - **Trait seams**: Time and actuators are injected via traits
//! - **Single owner**: Control state lives in one [`cycle::ControlContext`]
//!
//! # Modules
//!
//! - [`input`]: Receiver, sensor and navigation snapshots
//! - [`snapshot`]: Critical-section snapshot cells for cross-task data
//! - [`control`]: PID, mode selection, attitude control laws, configuration
//! - [`mixer`]: Output mixing and trim bootstrap
//! - [`cycle`]: Control context, periodic driver, telemetry
//! - [`scheduler`]: Cycle timing and statistics
//! - [`parameters`]: Parameter store and control parameters
//! - [`traits`]: Time source and actuator sink

#![no_std]

pub mod control;
pub mod cycle;
pub mod input;
pub mod mixer;
pub mod parameters;
pub mod scheduler;
pub mod snapshot;
pub mod traits;
