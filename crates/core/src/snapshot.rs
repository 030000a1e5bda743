//! Non-tearing snapshot cells for data shared across tasks.
//!
//! Receiver frames, sensor state and navigation targets are produced by
//! other tasks or interrupt handlers at their own rates. The control cycle
//! must never observe half of an update, so every exchange copies the whole
//! value inside a critical section.
//!
//! The same cell type carries the telemetry copy of the control state out of
//! the control task; nothing outside that task touches live state.

use core::cell::Cell;
use critical_section::Mutex;

/// Copy-in / copy-out cell guarded by a critical section.
///
/// # Example
///
/// ```
/// use rtos_pilot_core::input::SensorSnapshot;
/// use rtos_pilot_core::snapshot::SnapshotCell;
///
/// static SENSORS: SnapshotCell<SensorSnapshot> = SnapshotCell::new(SensorSnapshot::zeroed());
///
/// SENSORS.update(|s| s.pressure_height = 120.0);
/// assert_eq!(SENSORS.read().pressure_height, 120.0);
/// ```
pub struct SnapshotCell<T: Copy> {
    inner: Mutex<Cell<T>>,
}

impl<T: Copy> SnapshotCell<T> {
    pub const fn new(value: T) -> Self {
        Self {
            inner: Mutex::new(Cell::new(value)),
        }
    }

    /// Copy out the latest complete value
    pub fn read(&self) -> T {
        critical_section::with(|cs| self.inner.borrow(cs).get())
    }

    /// Replace the stored value
    pub fn write(&self, value: T) {
        critical_section::with(|cs| self.inner.borrow(cs).set(value));
    }

    /// Read-modify-write inside a single critical section
    pub fn update<F: FnOnce(&mut T)>(&self, f: F) {
        critical_section::with(|cs| {
            let cell = self.inner.borrow(cs);
            let mut value = cell.get();
            f(&mut value);
            cell.set(value);
        });
    }
}

impl<T: Copy + Default> Default for SnapshotCell<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}
