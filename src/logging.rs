//! Logging macros
//!
//! One set of macros for every build:
//! - Embedded (`pico2_w`): forwards to defmt
//! - Host unit tests: prints with a level prefix
//! - Anything else: compiles to nothing
//!
//! Functions whose only use of a value is logging carry
//! `#[allow(unused_variables)]` for the no-op build.

/// Log informational message
#[macro_export]
macro_rules! log_info {
    ($($arg:tt)*) => {{
        #[cfg(feature = "pico2_w")]
        ::defmt::info!($($arg)*);

        #[cfg(all(not(feature = "pico2_w"), test))]
        println!("[INFO] {}", format!($($arg)*));
    }};
}

/// Log warning message
#[macro_export]
macro_rules! log_warn {
    ($($arg:tt)*) => {{
        #[cfg(feature = "pico2_w")]
        ::defmt::warn!($($arg)*);

        #[cfg(all(not(feature = "pico2_w"), test))]
        println!("[WARN] {}", format!($($arg)*));
    }};
}

/// Log error message
#[macro_export]
macro_rules! log_error {
    ($($arg:tt)*) => {{
        #[cfg(feature = "pico2_w")]
        ::defmt::error!($($arg)*);

        #[cfg(all(not(feature = "pico2_w"), test))]
        eprintln!("[ERROR] {}", format!($($arg)*));
    }};
}

/// Log debug message
#[macro_export]
macro_rules! log_debug {
    ($($arg:tt)*) => {{
        #[cfg(feature = "pico2_w")]
        ::defmt::debug!($($arg)*);

        #[cfg(all(not(feature = "pico2_w"), test))]
        println!("[DEBUG] {}", format!($($arg)*));
    }};
}

/// Suppresses repeats of a log line within a window of events.
///
/// A 200 Hz loop that overruns every cycle would otherwise flood the log.
#[derive(Debug, Clone, Copy)]
pub struct LogThrottle {
    every: u32,
    seen: u32,
}

impl LogThrottle {
    /// Allow one message per `every` events (the first one always passes)
    pub const fn new(every: u32) -> Self {
        Self {
            every: if every == 0 { 1 } else { every },
            seen: 0,
        }
    }

    /// Record an event, returns true if it should be logged
    pub fn should_log(&mut self) -> bool {
        let log = self.seen % self.every == 0;
        self.seen = self.seen.wrapping_add(1);
        log
    }

    /// Events recorded so far
    pub fn seen(&self) -> u32 {
        self.seen
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_macros_compile() {
        let value = 42;
        crate::log_info!("info {}", value);
        crate::log_warn!("warn {}", value);
        crate::log_error!("error {}", value);
        crate::log_debug!("debug {}", value);
    }

    #[test]
    fn test_throttle_passes_first_then_every_nth() {
        let mut throttle = LogThrottle::new(3);
        let passed: [bool; 7] = core::array::from_fn(|_| throttle.should_log());

        assert_eq!(passed, [true, false, false, true, false, false, true]);
        assert_eq!(throttle.seen(), 7);
    }

    #[test]
    fn test_throttle_zero_logs_everything() {
        let mut throttle = LogThrottle::new(0);
        assert!(throttle.should_log());
        assert!(throttle.should_log());
    }
}
