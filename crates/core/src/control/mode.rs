//! Flight-mode selection from the auxiliary receiver channel.
//!
//! Exactly one mode is active per cycle. The selector remembers the mode
//! chosen on the previous cycle so the cycle can tell when a mode was just
//! entered. Before the first cycle there is no previous mode, so the first
//! cycle counts as an entry into whatever the switch reads.

/// Active control law
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlightMode {
    /// Stick pass-through
    Manual,
    /// Stick commands attitude
    Stabilized,
    /// Navigation commands heading, altitude is held
    Autopilot,
}

impl FlightMode {
    pub fn name(&self) -> &'static str {
        match self {
            FlightMode::Manual => "Manual",
            FlightMode::Stabilized => "Stabilized",
            FlightMode::Autopilot => "Autopilot",
        }
    }

    /// Modes that own a `desired_height` target
    pub fn holds_height_target(&self) -> bool {
        matches!(self, FlightMode::Stabilized | FlightMode::Autopilot)
    }
}

/// Pulse-width boundaries on the mode channel (microseconds)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModeThresholds {
    /// Pulses below this select autopilot
    pub autopilot_below: u16,
    /// Pulses below this (and not autopilot) select stabilized
    pub stabilized_below: u16,
}

impl Default for ModeThresholds {
    fn default() -> Self {
        Self {
            autopilot_below: 1333,
            stabilized_below: 1666,
        }
    }
}

impl ModeThresholds {
    /// Map a mode-channel pulse to a flight mode
    pub fn select(&self, pulse_us: u16) -> FlightMode {
        if pulse_us < self.autopilot_below {
            FlightMode::Autopilot
        } else if pulse_us < self.stabilized_below {
            FlightMode::Stabilized
        } else {
            FlightMode::Manual
        }
    }

    pub fn is_valid(&self) -> bool {
        self.autopilot_below < self.stabilized_below
    }
}

/// Outcome of one mode evaluation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModeTransition {
    /// Mode active at the end of the previous cycle, `None` before the first
    pub from: Option<FlightMode>,
    /// Mode active for this cycle
    pub to: FlightMode,
}

impl ModeTransition {
    pub fn is_change(&self) -> bool {
        self.from != Some(self.to)
    }

    /// Entering a height-holding mode re-captures the height target
    pub fn captures_height(&self) -> bool {
        self.is_change() && self.to.holds_height_target()
    }
}

/// Per-cycle mode state machine
#[derive(Debug, Clone, Copy)]
pub struct ModeSelector {
    thresholds: ModeThresholds,
    last: Option<FlightMode>,
}

impl ModeSelector {
    pub const fn new(thresholds: ModeThresholds) -> Self {
        Self {
            thresholds,
            last: None,
        }
    }

    /// Mode chosen on the most recent evaluation
    pub fn current(&self) -> Option<FlightMode> {
        self.last
    }

    /// Resolve this cycle's mode and record it as the new previous mode
    pub fn evaluate(&mut self, mode_pulse_us: u16) -> ModeTransition {
        let to = self.thresholds.select(mode_pulse_us);
        let transition = ModeTransition {
            from: self.last,
            to,
        };
        self.last = Some(to);
        transition
    }
}
