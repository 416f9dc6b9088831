//! Periodic poll loop persisting the latest record to a status file.

use crate::output::daemon_record;
use crate::session::Settings;
use charger_core::Monitor;
use charger_core::atomic::{ensure_parent_dir, write_atomic};
use charger_traits::Transport;
use charger_traits::clock::{Clock, MonotonicClock};
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// Longest uninterrupted sleep; bounds shutdown latency.
const SLEEP_SLICE: Duration = Duration::from_millis(100);

#[derive(Debug, Clone)]
pub struct DaemonParams {
    pub interval: Duration,
    pub status_path: PathBuf,
    /// Stop after this many cycles; `None` runs until shutdown.
    pub cycles: Option<u64>,
}

pub fn run_daemon(
    transport: Box<dyn Transport>,
    settings: &Settings,
    params: &DaemonParams,
    shutdown: &Arc<AtomicBool>,
) -> eyre::Result<()> {
    // Status directory must be creatable up front; later write failures are only logged
    ensure_parent_dir(&params.status_path)?;
    let clock = MonotonicClock::new();
    let mut monitor = Monitor::new(transport, settings.monitor.clone());
    tracing::info!(
        bus = settings.bus,
        addr = format_args!("0x{:02x}", settings.addr),
        interval_s = params.interval.as_secs(),
        path = %params.status_path.display(),
        "daemon start"
    );

    let mut done: u64 = 0;
    while !shutdown.load(Ordering::Relaxed) {
        match monitor.poll() {
            Ok(rec) => {
                let mut line = daemon_record(&rec, settings.bus, settings.addr, now_ms()).to_string();
                line.push('\n');
                if let Err(e) = write_atomic(&params.status_path, line.as_bytes()) {
                    tracing::warn!(
                        path = %params.status_path.display(),
                        error = %e,
                        "status file write failed"
                    );
                }
            }
            Err(e) => tracing::warn!(error = %e, "poll cycle failed; keeping previous state"),
        }
        done += 1;
        if params.cycles.is_some_and(|n| done >= n) {
            break;
        }
        sleep_until_next(&clock, params.interval, shutdown);
    }
    tracing::info!(cycles = done, "daemon stopped");
    Ok(())
}

fn sleep_until_next(clock: &impl Clock, interval: Duration, shutdown: &AtomicBool) {
    let start = clock.now();
    while !shutdown.load(Ordering::Relaxed) {
        let elapsed = clock.now().saturating_duration_since(start);
        let Some(left) = interval.checked_sub(elapsed).filter(|d| !d.is_zero()) else {
            break;
        };
        clock.sleep(left.min(SLEEP_SLICE));
    }
}

fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}
