//! Receiver input and servo output glue between the platform and the
//! control core

pub mod rc_channel;
pub mod srv_channel;

pub use rc_channel::{latest_channels, publish_frame, RcInput, RC_INPUT};
pub use srv_channel::ServoBank;
