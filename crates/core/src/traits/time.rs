//! Monotonic time source used by the control-cycle driver.
//!
//! The driver only needs a microsecond clock to place deadlines and to
//! measure how long a cycle took. Firmware backs this with `embassy-time`;
//! host tests use [`MockTime`].

use core::cell::Cell;

/// Monotonic microsecond clock.
///
/// # Example
///
/// ```
/// use rtos_pilot_core::traits::{MockTime, TimeSource};
///
/// let clock = MockTime::new();
/// let start = clock.now_us();
/// clock.advance(2_500);
/// assert_eq!(clock.elapsed_since(start), 2_500);
/// ```
pub trait TimeSource {
    /// Returns current time in microseconds since system start.
    fn now_us(&self) -> u64;

    /// Returns current time in milliseconds since system start.
    fn now_ms(&self) -> u64 {
        self.now_us() / 1000
    }

    /// Returns elapsed microseconds since `reference_us`, saturating at zero.
    fn elapsed_since(&self, reference_us: u64) -> u64 {
        self.now_us().saturating_sub(reference_us)
    }
}

impl<T: TimeSource + ?Sized> TimeSource for &T {
    fn now_us(&self) -> u64 {
        (**self).now_us()
    }
}

/// Deterministic clock for host tests.
///
/// Besides manual [`set`](Self::set) / [`advance`](Self::advance), the clock
/// can advance itself by a fixed step on every read, which lets a test model
/// the execution cost of a control cycle.
#[derive(Debug, Default)]
pub struct MockTime {
    current_us: Cell<u64>,
    step_per_read_us: Cell<u64>,
}

impl MockTime {
    /// Creates a clock at time 0.
    pub const fn new() -> Self {
        Self {
            current_us: Cell::new(0),
            step_per_read_us: Cell::new(0),
        }
    }

    /// Creates a clock at `us`.
    pub const fn with_initial(us: u64) -> Self {
        Self {
            current_us: Cell::new(us),
            step_per_read_us: Cell::new(0),
        }
    }

    /// Sets the current time to an absolute value.
    pub fn set(&self, us: u64) {
        self.current_us.set(us);
    }

    /// Advances the current time by `us`.
    pub fn advance(&self, us: u64) {
        self.current_us.set(self.current_us.get().saturating_add(us));
    }

    /// Makes every subsequent read advance the clock by `us` after returning.
    pub fn set_step_per_read(&self, us: u64) {
        self.step_per_read_us.set(us);
    }
}

impl TimeSource for MockTime {
    fn now_us(&self) -> u64 {
        let now = self.current_us.get();
        self.advance(self.step_per_read_us.get());
        now
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mock_time_starts_at_zero() {
        let time = MockTime::new();
        assert_eq!(time.now_us(), 0);
        assert_eq!(time.now_ms(), 0);
    }

    #[test]
    fn mock_time_set_and_advance() {
        let time = MockTime::with_initial(1_000);
        time.advance(500);
        assert_eq!(time.now_us(), 1_500);

        time.set(2_999);
        assert_eq!(time.now_ms(), 2);
    }

    #[test]
    fn mock_time_elapsed_since_saturates() {
        let time = MockTime::with_initial(1_000);
        assert_eq!(time.elapsed_since(300), 700);
        assert_eq!(time.elapsed_since(5_000), 0);
    }

    #[test]
    fn mock_time_steps_on_every_read() {
        let time = MockTime::new();
        time.set_step_per_read(250);

        assert_eq!(time.now_us(), 0);
        assert_eq!(time.now_us(), 250);
        assert_eq!(time.now_us(), 500);
    }

    #[test]
    fn borrowed_clock_shares_state() {
        let time = MockTime::new();
        let borrowed = &time;

        time.advance(10_000);
        assert_eq!(borrowed.now_us(), 10_000);
    }
}
