//! Embassy control loop
//!
//! Drives a [`ControlTask`] from the embassy timer. The loop sleeps until
//! the driver's next release time, so a late cycle pushes the schedule back
//! instead of triggering a burst of catch-up cycles.
//!
//! ## Startup
//!
//! 1. Trim bootstrap and neutral outputs
//! 2. Multirotors only: wait for the ESCs to arm, then switch to fast refresh
//! 3. Periodic cycles, with a health report once per second

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::signal::Signal;
use embassy_time::{Duration, Instant, Timer};

use rtos_pilot_core::control::FlightMode;
use rtos_pilot_core::traits::{ActuatorSink, TimeSource};

use super::control_task::{ControlLinks, ControlTask};

/// Time the ESCs need at neutral before they accept commands
pub const ESC_ARM_DELAY_MS: u64 = 1000;

/// Interval between health reports
pub const HEALTH_REPORT_INTERVAL_MS: u64 = 1000;

/// Latest flight mode change, for tasks that react to it (status LED, telemetry)
pub static MODE_CHANGED: Signal<CriticalSectionRawMutex, FlightMode> = Signal::new();

/// Monotonic clock backed by the embassy time driver
#[derive(Debug, Clone, Copy, Default)]
pub struct EmbassyClock;

impl TimeSource for EmbassyClock {
    fn now_us(&self) -> u64 {
        Instant::now().as_micros()
    }
}

/// Run the control loop forever.
///
/// # Example
///
/// ```rust,ignore
/// #[embassy_executor::task]
/// async fn control_task(task: ControlTask<EmbassyClock, ServoBank<RpPwm>>) {
///     run_control_loop(task, ControlLinks::global()).await
/// }
/// ```
pub async fn run_control_loop<S: ActuatorSink>(
    mut task: ControlTask<EmbassyClock, S>,
    links: ControlLinks<'static>,
) -> ! {
    crate::log_info!("Control loop started");

    let channels = links.rc.read().channels();
    task.start(&channels);

    if task.wants_fast_refresh() {
        Timer::after(Duration::from_millis(ESC_ARM_DELAY_MS)).await;
        task.enable_fast_refresh();
    }

    let boot = Instant::now();
    let mut last_report = boot;

    loop {
        Timer::at(Instant::from_micros(task.next_release_us())).await;

        let report = task.step_shared(&links);
        if report.transition.is_change() {
            MODE_CHANGED.signal(report.transition.to);
        }

        if last_report.elapsed() >= Duration::from_millis(HEALTH_REPORT_INTERVAL_MS) {
            last_report = Instant::now();
            task.report_health(boot.elapsed().as_millis());
        }
    }
}
