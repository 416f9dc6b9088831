//! Poll-cycle orchestration: decode, infer direction, stabilize SoC.
//!
//! `Monitor` owns the transport and the filter for one device. Every call to
//! [`Monitor::poll`] runs one complete cycle synchronously; callers decide the
//! interval and when to stop.

use charger_traits::Transport;
use charger_traits::clock::{Clock, MonotonicClock};
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::decoder::decode_with_curve;
use crate::defaults::{apply_safe_defaults, enable_adc};
use crate::error::Result;
use crate::filter::{DIRECTION_DEADBAND_MA, Direction, SocFilter};
use crate::soc::SocCurve;
use crate::status::StatusSnapshot;

/// Knobs for a monitoring session.
#[derive(Debug, Clone)]
pub struct MonitorOptions {
    /// Enable the ADC (continuous, 15-bit) on every decode.
    pub ensure_adc_on: bool,
    /// Wait after the first ADC enable before reading measurements.
    pub adc_settle: Duration,
    /// Battery current dead-band for direction inference.
    pub deadband_ma: i32,
    pub curve: SocCurve,
}

impl Default for MonitorOptions {
    fn default() -> Self {
        Self {
            ensure_adc_on: true,
            adc_settle: Duration::from_millis(50),
            deadband_ma: DIRECTION_DEADBAND_MA,
            curve: SocCurve::default(),
        }
    }
}

/// Flat per-cycle output.
#[derive(Debug, Clone)]
pub struct TelemetryRecord {
    pub status: StatusSnapshot,
    pub charge_state_str: &'static str,
    pub input_source_str: &'static str,
    pub direction: Direction,
    /// Stabilized SoC for display.
    pub soc_pct: i32,
    /// Unfiltered estimate from this cycle.
    pub soc_raw: i32,
    /// Filter EMA after this cycle.
    pub soc_filt: f32,
}

pub struct Monitor<T: Transport, C: Clock + Clone = MonotonicClock> {
    transport: T,
    clock: C,
    opts: MonitorOptions,
    filter: Option<SocFilter<C>>,
    initialized: bool,
}

impl<T: Transport> Monitor<T, MonotonicClock> {
    pub fn new(transport: T, opts: MonitorOptions) -> Self {
        Self::with_clock(transport, opts, MonotonicClock::new())
    }
}

impl<T: Transport, C: Clock + Clone> Monitor<T, C> {
    pub fn with_clock(transport: T, opts: MonitorOptions, clock: C) -> Self {
        Self {
            transport,
            clock,
            opts,
            filter: None,
            initialized: false,
        }
    }

    /// Run one poll cycle.
    ///
    /// On decode failure the error is returned and the filter is left as it
    /// was; the next successful cycle continues from there.
    pub fn poll(&mut self) -> Result<TelemetryRecord> {
        if !self.initialized {
            self.first_cycle_setup();
        }

        let status = decode_with_curve(
            &mut self.transport,
            self.opts.ensure_adc_on,
            &self.opts.curve,
        )?;
        let direction =
            Direction::from_current_with_deadband(status.battery_current_ma, self.opts.deadband_ma);
        let raw = status.soc_estimate_pct;

        let filter = match self.filter.take() {
            Some(mut f) => {
                f.update(raw, direction);
                f
            }
            None => {
                info!(soc = raw, "SoC filter initialized");
                SocFilter::with_clock(raw, self.clock.clone())
            }
        };

        let record = TelemetryRecord {
            charge_state_str: status.charge_state_str(),
            input_source_str: status.input_source_str(),
            direction,
            soc_pct: filter.display_soc(),
            soc_raw: raw,
            soc_filt: filter.smoothed_soc(),
            status,
        };
        self.filter = Some(filter);
        debug!(
            soc = record.soc_pct,
            raw = record.soc_raw,
            direction = direction.as_str(),
            "poll cycle complete"
        );
        Ok(record)
    }

    /// Safe defaults and ADC warm-up, attempted once per session.
    fn first_cycle_setup(&mut self) {
        self.initialized = true;
        if let Err(e) = apply_safe_defaults(&mut self.transport) {
            warn!(error = %e, "could not apply safe defaults; continuing");
        }
        if self.opts.ensure_adc_on {
            match enable_adc(&mut self.transport, true, true) {
                Ok(()) => self.clock.sleep(self.opts.adc_settle),
                Err(e) => warn!(error = %e, "initial ADC enable failed"),
            }
        }
    }

    pub fn filter(&self) -> Option<&SocFilter<C>> {
        self.filter.as_ref()
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }
}
