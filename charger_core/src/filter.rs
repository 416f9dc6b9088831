//! SoC display stabilization.
//!
//! Raw SoC derived from pack voltage jumps around with load: it sags under
//! discharge current and bounces when the load drops. The filter turns that
//! into a display value that moves by at most one point per update and only
//! after the evidence has been stable for long enough:
//!
//! - EMA smoothing of the raw estimate (`EMA_ALPHA`)
//! - direction-aware hysteresis: moves *with* the current direction need only
//!   the time gate, moves *against* it need a large jump confirmed over several
//!   consecutive updates
//! - rate limit: at most one point per `MIN_STEP_INTERVAL`
//!
//! Upward corrections while discharging need ten times the samples and ten
//! times the interval of every other counter-direction correction.

use charger_traits::clock::{Clock, MonotonicClock};
use std::time::{Duration, Instant};

/// EMA weight of each new raw sample.
pub const EMA_ALPHA: f32 = 0.15;
/// Minimum time between two display steps.
pub const MIN_STEP_INTERVAL: Duration = Duration::from_millis(60_000);
/// Counter-direction deviation (points) that counts as evidence.
pub const BIG_JUMP: i32 = 5;
/// Consecutive qualifying updates required for a counter-direction step.
pub const CONFIRM_SAMPLES: u32 = 6;
/// Extra caution applied to upward corrections while discharging.
pub const DISCHARGE_RISE_FACTOR: u32 = 10;
/// Consecutive qualifying updates before a discharge-direction rise.
pub const DISCHARGE_RISE_SAMPLES: u32 = CONFIRM_SAMPLES * DISCHARGE_RISE_FACTOR;
/// Minimum time since the last step before a discharge-direction rise.
pub const DISCHARGE_RISE_INTERVAL: Duration =
    Duration::from_millis(60_000 * DISCHARGE_RISE_FACTOR as u64);
/// Drift (points) that counts as evidence while idle.
pub const IDLE_DRIFT: i32 = 2;
/// Battery current magnitude (mA) below which the pack is considered idle.
pub const DIRECTION_DEADBAND_MA: i32 = 50;

/// Charge flow direction as seen by the filter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Direction {
    Discharging,
    #[default]
    Idle,
    Charging,
}

impl Direction {
    /// Infer direction from battery current with the default dead-band.
    #[inline]
    pub fn from_current_ma(ibat_ma: i32) -> Self {
        Self::from_current_with_deadband(ibat_ma, DIRECTION_DEADBAND_MA)
    }

    /// Current strictly above `+deadband` is charging, strictly below
    /// `-deadband` is discharging, anything in between is idle.
    pub fn from_current_with_deadband(ibat_ma: i32, deadband_ma: i32) -> Self {
        let band = deadband_ma.abs();
        if ibat_ma > band {
            Direction::Charging
        } else if ibat_ma < -band {
            Direction::Discharging
        } else {
            Direction::Idle
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Direction::Discharging => "discharging",
            Direction::Idle => "idle",
            Direction::Charging => "charging",
        }
    }
}

/// Mutable state of one filter instance.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FilterState {
    /// Externally visible SoC, 0..=100.
    pub display_soc: i32,
    /// EMA of raw estimates.
    pub smoothed_soc: f32,
    /// When `display_soc` last changed (or the filter was created).
    pub last_change: Instant,
    /// Consecutive updates whose evidence argued against the display value.
    pub stable_count: u32,
    pub last_direction: Direction,
}

impl FilterState {
    pub fn new(initial_soc: i32, now: Instant) -> Self {
        let soc = initial_soc.clamp(0, 100);
        Self {
            display_soc: soc,
            smoothed_soc: soc as f32,
            last_change: now,
            stable_count: 0,
            last_direction: Direction::Idle,
        }
    }

    /// Advance the state by one raw sample observed at `now`.
    pub fn update(&mut self, raw_soc: i32, direction: Direction, now: Instant) {
        let raw = raw_soc.clamp(0, 100) as f32;
        self.smoothed_soc += EMA_ALPHA * (raw - self.smoothed_soc);
        let target = ((self.smoothed_soc + 0.5).floor() as i32).clamp(0, 100);

        if direction != self.last_direction {
            self.stable_count = 0;
            self.last_direction = direction;
        }

        let diff = target - self.display_soc;
        if diff == 0 {
            self.stable_count = 0;
            return;
        }

        let elapsed = now.saturating_duration_since(self.last_change);
        let step = match direction {
            Direction::Charging if diff > 0 => self.gate(elapsed, MIN_STEP_INTERVAL, 1),
            Direction::Charging => {
                self.confirm(-diff >= BIG_JUMP, CONFIRM_SAMPLES, elapsed, MIN_STEP_INTERVAL, -1)
            }
            Direction::Discharging if diff < 0 => self.gate(elapsed, MIN_STEP_INTERVAL, -1),
            Direction::Discharging => self.confirm(
                diff >= BIG_JUMP,
                DISCHARGE_RISE_SAMPLES,
                elapsed,
                DISCHARGE_RISE_INTERVAL,
                1,
            ),
            Direction::Idle => self.confirm(
                diff.abs() >= IDLE_DRIFT,
                CONFIRM_SAMPLES,
                elapsed,
                MIN_STEP_INTERVAL,
                diff.signum(),
            ),
        };

        if step != 0 {
            self.display_soc += step;
            self.last_change = now;
            self.stable_count = 0;
        }
        self.display_soc = self.display_soc.clamp(0, 100);
    }

    /// Time-gated step in the direction of travel.
    fn gate(&self, elapsed: Duration, min: Duration, step: i32) -> i32 {
        if elapsed >= min { step } else { 0 }
    }

    /// Evidence-gated step against the direction of travel.
    fn confirm(
        &mut self,
        qualifies: bool,
        samples: u32,
        elapsed: Duration,
        min: Duration,
        step: i32,
    ) -> i32 {
        if !qualifies {
            self.stable_count = 0;
            return 0;
        }
        self.stable_count = self.stable_count.saturating_add(1);
        if self.stable_count >= samples && elapsed >= min {
            step
        } else {
            0
        }
    }
}

/// SoC filter bound to a clock.
///
/// One instance per monitored device, owned by whoever runs the poll loop.
#[derive(Debug, Clone)]
pub struct SocFilter<C: Clock = MonotonicClock> {
    state: FilterState,
    clock: C,
}

impl SocFilter<MonotonicClock> {
    pub fn new(initial_soc: i32) -> Self {
        Self::with_clock(initial_soc, MonotonicClock::new())
    }
}

impl<C: Clock> SocFilter<C> {
    pub fn with_clock(initial_soc: i32, clock: C) -> Self {
        let state = FilterState::new(initial_soc, clock.now());
        Self { state, clock }
    }

    /// Feed one raw estimate taken now.
    pub fn update(&mut self, raw_soc: i32, direction: Direction) {
        let now = self.clock.now();
        self.state.update(raw_soc, direction, now);
    }

    /// Feed one raw estimate taken at `now`.
    pub fn update_at(&mut self, raw_soc: i32, direction: Direction, now: Instant) {
        self.state.update(raw_soc, direction, now);
    }

    pub fn display_soc(&self) -> i32 {
        self.state.display_soc
    }

    pub fn smoothed_soc(&self) -> f32 {
        self.state.smoothed_soc
    }

    pub fn state(&self) -> &FilterState {
        &self.state
    }
}
