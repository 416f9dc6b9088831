//! Open-circuit-voltage to state-of-charge estimation.
//!
//! The default curve assumes a typical LiCoO2/NMC cell resting near its
//! open-circuit voltage. It is a coarse guide, not a fuel gauge: other
//! chemistries (LFP in particular) need their own curve, and load sag makes
//! the estimate read low while discharging.

use crate::error::{ChargerError, Result};

/// Per-cell millivolt breakpoints paired with SoC percent.
pub const DEFAULT_OCV_TABLE: [(i32, i32); 11] = [
    (3300, 0),
    (3400, 10),
    (3500, 20),
    (3600, 30),
    (3650, 40),
    (3700, 50),
    (3800, 60),
    (3900, 70),
    (4000, 80),
    (4100, 90),
    (4200, 100),
];

/// Estimate SoC from per-cell voltage using the default table.
#[inline]
pub fn soc_from_cell_voltage(mv: i32) -> i32 {
    interpolate(&DEFAULT_OCV_TABLE, mv)
}

/// Piecewise-linear lookup with integer arithmetic; clamps outside the table.
fn interpolate(points: &[(i32, i32)], mv: i32) -> i32 {
    let (Some(&(first_mv, first_soc)), Some(&(last_mv, last_soc))) =
        (points.first(), points.last())
    else {
        return 0;
    };
    if mv <= first_mv {
        return first_soc.clamp(0, 100);
    }
    if mv >= last_mv {
        return last_soc.clamp(0, 100);
    }
    for pair in points.windows(2) {
        let (lo_mv, lo_soc) = pair[0];
        let (hi_mv, hi_soc) = pair[1];
        if mv >= lo_mv && mv <= hi_mv {
            // i64: wide custom curves overflow the i32 product
            let num = i64::from(hi_soc - lo_soc) * (i64::from(mv) - i64::from(lo_mv));
            let soc = i64::from(lo_soc) + num / (i64::from(hi_mv) - i64::from(lo_mv));
            return soc.clamp(0, 100) as i32;
        }
    }
    0
}

/// A validated voltage-to-SoC curve.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SocCurve {
    points: Vec<(i32, i32)>,
}

impl Default for SocCurve {
    fn default() -> Self {
        Self {
            points: DEFAULT_OCV_TABLE.to_vec(),
        }
    }
}

impl SocCurve {
    /// Build a curve from `(mv, soc)` points.
    ///
    /// Requires at least two points, strictly increasing millivolts, and
    /// non-decreasing SoC within 0..=100.
    pub fn new(points: Vec<(i32, i32)>) -> Result<Self> {
        if points.len() < 2 {
            return Err(ChargerError::Config(format!(
                "soc curve needs at least two points, got {}",
                points.len()
            )));
        }
        for (i, &(mv, soc)) in points.iter().enumerate() {
            if !(0..=100).contains(&soc) {
                return Err(ChargerError::Config(format!(
                    "soc curve point {i} has soc {soc} outside 0..=100"
                )));
            }
            if mv <= 0 {
                return Err(ChargerError::Config(format!(
                    "soc curve point {i} has non-positive voltage {mv}"
                )));
            }
        }
        for (i, pair) in points.windows(2).enumerate() {
            if pair[1].0 <= pair[0].0 {
                return Err(ChargerError::Config(format!(
                    "soc curve voltages must be strictly increasing (points {} and {})",
                    i,
                    i + 1
                )));
            }
            if pair[1].1 < pair[0].1 {
                return Err(ChargerError::Config(format!(
                    "soc curve percentages must not decrease (points {} and {})",
                    i,
                    i + 1
                )));
            }
        }
        Ok(Self { points })
    }

    pub fn points(&self) -> &[(i32, i32)] {
        &self.points
    }

    /// Estimate SoC for a per-cell voltage in mV.
    pub fn estimate(&self, mv: i32) -> i32 {
        interpolate(&self.points, mv)
    }
}

impl TryFrom<Vec<(i32, i32)>> for SocCurve {
    type Error = ChargerError;
    fn try_from(points: Vec<(i32, i32)>) -> Result<Self> {
        Self::new(points)
    }
}
