//! Register-to-status decoding.
//!
//! Two read paths: `read_required_byte` propagates the transport error and
//! aborts the decode; `read_optional_*` logs the failure, records the register
//! in `StatusSnapshot::missing` and yields `None` so the field stays zero.

use charger_traits::Transport;
use tracing::{debug, warn};

use crate::defaults::enable_adc;
use crate::error::Result;
use crate::hw_error::map_transport_error;
use crate::registers::{self, *};
use crate::soc::{SocCurve, soc_from_cell_voltage};
use crate::status::StatusSnapshot;

/// Decode a status snapshot using the default SoC table.
///
/// When `ensure_adc_on` is set the ADC is (re)enabled in continuous 15-bit
/// mode before the measurement reads. The decoder does not wait for a
/// conversion; callers that just enabled the ADC must allow settling time.
pub fn decode<T: Transport + ?Sized>(
    transport: &mut T,
    ensure_adc_on: bool,
) -> Result<StatusSnapshot> {
    decode_inner(transport, ensure_adc_on, soc_from_cell_voltage)
}

/// Same as [`decode`] with a caller supplied SoC curve.
pub fn decode_with_curve<T: Transport + ?Sized>(
    transport: &mut T,
    ensure_adc_on: bool,
    curve: &SocCurve,
) -> Result<StatusSnapshot> {
    decode_inner(transport, ensure_adc_on, |mv| curve.estimate(mv))
}

fn decode_inner<T: Transport + ?Sized>(
    transport: &mut T,
    ensure_adc_on: bool,
    estimate: impl Fn(i32) -> i32,
) -> Result<StatusSnapshot> {
    let mut st = StatusSnapshot {
        cell_count: 1,
        ..Default::default()
    };

    // Cell count from REG0A[7:6]; absence must not abort telemetry.
    if let Some(v) = read_optional_byte(transport, REG_RECHARGE_CTRL, &mut st.missing) {
        st.cell_count = field(v, CELL_MASK, CELL_SHIFT) + 1;
    }

    let s0 = read_required_byte(transport, REG_CHARGER_STATUS_0)?;
    let s1 = read_required_byte(transport, REG_CHARGER_STATUS_1)?;
    apply_status0(&mut st, s0);
    apply_status1(&mut st, s1);

    st.fault0 = read_optional_byte(transport, REG_FAULT_FLAG_0, &mut st.missing).unwrap_or(0);
    st.fault1 = read_optional_byte(transport, REG_FAULT_FLAG_1, &mut st.missing).unwrap_or(0);
    st.fault_any = st.fault0 != 0 || st.fault1 != 0 || st.watchdog_expired || st.poor_source;

    if ensure_adc_on && let Err(e) = enable_adc(transport, true, true) {
        warn!(error = %e, "ADC enable failed; measurements may be stale");
    }

    let mut word = |reg| read_optional_word(transport, reg, &mut st.missing);
    let ibus = word(REG_IBUS_ADC);
    let ibat = word(REG_IBAT_ADC);
    let vbus = word(REG_VBUS_ADC);
    let vbat = word(REG_VBAT_ADC);
    let vsys = word(REG_VSYS_ADC);
    let tdie = word(REG_TDIE_ADC);

    if let Some(w) = ibus {
        st.bus_current_ma = i32::from(w as i16);
    }
    if let Some(w) = ibat {
        st.battery_current_ma = i32::from(w as i16);
    }
    if let Some(w) = vbus {
        st.bus_voltage_mv = i32::from(w);
    }
    if let Some(w) = vbat {
        st.battery_voltage_mv = i32::from(w);
    }
    if let Some(w) = vsys {
        st.system_voltage_mv = i32::from(w);
    }
    if let Some(w) = tdie {
        st.die_temp_c = f32::from(w as i16) * TDIE_C_PER_COUNT;
    }

    st.cell_count = st.cell_count.clamp(1, 4);
    st.soc_estimate_pct = estimate(st.cell_voltage_mv()).clamp(0, 100);

    debug!(
        chg_stat = st.charge_state,
        vbat_mv = st.battery_voltage_mv,
        ibat_ma = st.battery_current_ma,
        cells = st.cell_count,
        soc_est = st.soc_estimate_pct,
        missing = st.missing.len(),
        "status decoded"
    );
    Ok(st)
}

/// REG1B: DPM, watchdog, power-good and input presence flags.
fn apply_status0(st: &mut StatusSnapshot, s0: u8) {
    st.input_current_limit_active = bit(s0, IINDPM_STAT);
    st.input_voltage_limit_active = bit(s0, VINDPM_STAT);
    st.watchdog_expired = bit(s0, WD_STAT);
    st.poor_source = bit(s0, POORSRC_STAT);
    st.power_good = bit(s0, PG_STAT);
    st.ac2_present = bit(s0, AC2_PRESENT_STAT);
    st.ac1_present = bit(s0, AC1_PRESENT_STAT);
    st.vbus_present = bit(s0, VBUS_PRESENT_STAT);
}

/// REG1C: charge state, input source type and BC1.2 completion.
fn apply_status1(st: &mut StatusSnapshot, s1: u8) {
    st.charge_state = field(s1, CHG_STAT_MASK, CHG_STAT_SHIFT);
    st.input_source_type = field(s1, VBUS_STAT_MASK, VBUS_STAT_SHIFT);
    st.bc12_done = bit(s1, BC12_DONE_STAT);
}

fn read_required_byte<T: Transport + ?Sized>(transport: &mut T, reg: u8) -> Result<u8> {
    transport.read_byte(reg).map_err(|e| {
        let err = map_transport_error(reg, &*e);
        warn!(reg = registers::name(reg), error = %err, "mandatory register read failed");
        err
    })
}

fn read_optional_byte<T: Transport + ?Sized>(
    transport: &mut T,
    reg: u8,
    missing: &mut Vec<&'static str>,
) -> Option<u8> {
    match transport.read_byte(reg) {
        Ok(v) => Some(v),
        Err(e) => {
            debug!(reg = registers::name(reg), error = %e, "best-effort byte read failed");
            missing.push(registers::name(reg));
            None
        }
    }
}

fn read_optional_word<T: Transport + ?Sized>(
    transport: &mut T,
    reg: u8,
    missing: &mut Vec<&'static str>,
) -> Option<u16> {
    match transport.read_word(reg) {
        Ok(v) => Some(v),
        Err(e) => {
            debug!(reg = registers::name(reg), error = %e, "best-effort word read failed");
            missing.push(registers::name(reg));
            None
        }
    }
}
