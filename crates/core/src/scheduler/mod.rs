//! Control cycle timing
//!
//! Timing metadata and runtime statistics used by the
//! [`CycleDriver`](crate::cycle::CycleDriver).

pub mod types;

pub use types::{CycleStats, CycleTiming};
