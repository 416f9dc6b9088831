//! Text and JSON rendering of telemetry.

use charger_core::TelemetryRecord;
use charger_core::registers::{RegisterInfo, Width};
use serde_json::{Map, Value, json};
use std::fmt::Write as _;

fn round_to(v: f32, decimals: i32) -> f64 {
    let scale = 10f64.powi(decimals);
    (f64::from(v) * scale).round() / scale
}

/// Fields shared by `status --json` and the daemon record.
fn snapshot_fields(rec: &TelemetryRecord) -> Map<String, Value> {
    let st = &rec.status;
    let v = json!({
        "vbus_present": st.vbus_present,
        "ac1_present": st.ac1_present,
        "ac2_present": st.ac2_present,
        "pg": st.power_good,
        "iindpm": st.input_current_limit_active,
        "vindpm": st.input_voltage_limit_active,
        "watchdog_expired": st.watchdog_expired,
        "poor_source": st.poor_source,
        "chg_stat": st.charge_state,
        "chg_stat_str": rec.charge_state_str,
        "vbus_stat": st.input_source_type,
        "vbus_stat_str": rec.input_source_str,
        "bc12_done": st.bc12_done,
        "fault_any": st.fault_any,
        "fault0": st.fault0,
        "fault1": st.fault1,
        "vbat_mv": st.battery_voltage_mv,
        "vsys_mv": st.system_voltage_mv,
        "vbus_mv": st.bus_voltage_mv,
        "ibat_ma": st.battery_current_ma,
        "ibus_ma": st.bus_current_ma,
        "tdie_c": round_to(st.die_temp_c, 1),
        "cell_count": st.cell_count,
        "missing": st.missing,
    });
    match v {
        Value::Object(map) => map,
        _ => Map::new(),
    }
}

/// One-shot status object.
pub fn status_json(rec: &TelemetryRecord) -> Value {
    let mut map = snapshot_fields(rec);
    map.insert("soc_pct_est".into(), json!(rec.status.soc_estimate_pct));
    Value::Object(map)
}

/// Daemon status-file record.
pub fn daemon_record(rec: &TelemetryRecord, bus: u8, addr: u8, ts_ms: u64) -> Value {
    let mut map = Map::new();
    map.insert("ts_ms".into(), json!(ts_ms));
    map.insert("bus".into(), json!(bus));
    map.insert("addr".into(), json!(format!("0x{addr:02x}")));
    map.extend(snapshot_fields(rec));
    map.insert("direction".into(), json!(rec.direction.as_str()));
    map.insert("soc_pct".into(), json!(rec.soc_pct));
    map.insert("soc_raw".into(), json!(rec.soc_raw));
    map.insert("soc_filt".into(), json!(round_to(rec.soc_filt, 2)));
    Value::Object(map)
}

pub fn status_text(rec: &TelemetryRecord, bus: u8, addr: u8) -> String {
    let st = &rec.status;
    let b = u8::from;
    let mut s = String::new();
    let _ = writeln!(s, "BQ25792 status (bus={bus} addr=0x{addr:02x})");
    let _ = writeln!(
        s,
        "  Input : VBUS={} AC1={} AC2={} PG={}",
        b(st.vbus_present),
        b(st.ac1_present),
        b(st.ac2_present),
        b(st.power_good)
    );
    let _ = writeln!(
        s,
        "  DPM   : IINDPM={} VINDPM={} poor_src={} wd_exp={}",
        b(st.input_current_limit_active),
        b(st.input_voltage_limit_active),
        b(st.poor_source),
        b(st.watchdog_expired)
    );
    let _ = writeln!(
        s,
        "  Charge: chg_stat={} ({})",
        st.charge_state, rec.charge_state_str
    );
    let _ = writeln!(
        s,
        "          vbus_stat=0x{:X} ({}) bc12_done={}",
        st.input_source_type,
        rec.input_source_str,
        b(st.bc12_done)
    );
    let _ = writeln!(
        s,
        "  ADC   : VBUS={}mV VBAT={}mV VSYS={}mV IBUS={}mA IBAT={}mA TDIE={:.1}C",
        st.bus_voltage_mv,
        st.battery_voltage_mv,
        st.system_voltage_mv,
        st.bus_current_ma,
        st.battery_current_ma,
        st.die_temp_c
    );
    let _ = writeln!(
        s,
        "  Batt  : cells={} SoC_est={}%",
        st.cell_count, st.soc_estimate_pct
    );
    let _ = writeln!(
        s,
        "  Fault : any={} fault0=0x{:02X} fault1=0x{:02X}",
        b(st.fault_any),
        st.fault0,
        st.fault1
    );
    if !st.is_complete() {
        let _ = writeln!(s, "  Missing: {}", st.missing.join(", "));
    }
    s
}

/// Readable registers only, one per line.
pub fn raw_text(dump: &[(RegisterInfo, Option<u16>)]) -> String {
    let mut s = String::new();
    for (info, value) in dump {
        let Some(v) = value else { continue };
        let _ = match info.width {
            Width::Byte => writeln!(s, "REG{:02X} ({}): 0x{:02X}", info.addr, info.name, v),
            Width::Word => writeln!(s, "REG{:02X} ({}): 0x{:04X}", info.addr, info.name, v),
        };
    }
    s
}

#[cfg(test)]
mod tests {
    use super::*;
    use charger_core::Direction;

    use charger_core::status::StatusSnapshot;

    fn snapshot() -> StatusSnapshot {
        StatusSnapshot {
            vbus_present: true,
            power_good: true,
            charge_state: 3,
            input_source_type: 3,
            battery_voltage_mv: 7_400,
            battery_current_ma: -420,
            die_temp_c: 35.5,
            cell_count: 2,
            soc_estimate_pct: 50,
            ..Default::default()
        }
    }

    fn record(status: StatusSnapshot) -> TelemetryRecord {
        TelemetryRecord {
            charge_state_str: status.charge_state_str(),
            input_source_str: status.input_source_str(),
            status,
            direction: Direction::Discharging,
            soc_pct: 51,
            soc_raw: 50,
            soc_filt: 50.123_4,
        }
    }

    #[test]
    fn daemon_record_has_stable_keys() {
        let rec = record(snapshot());
        let v = daemon_record(&rec, 10, 0x6B, 1_700_000_000_000);
        assert_eq!(v["addr"], "0x6b");
        assert_eq!(v["direction"], "discharging");
        assert_eq!(v["soc_filt"], 50.12);
        assert_eq!(v["tdie_c"], 35.5);
        assert_eq!(v["ibat_ma"], -420);
        assert_eq!(v["chg_stat_str"], "Fast charge (CC)");
        assert_eq!(v["vbus_stat_str"], "USB DCP (3.25A)");
        assert!(v["missing"].as_array().is_some_and(Vec::is_empty));
    }

    #[test]
    fn text_lists_missing_registers() {
        let mut rec = record(snapshot());
        assert!(!status_text(&rec, 10, 0x6B).contains("Missing"));
        rec.status.missing = vec!["VBAT_ADC"];
        assert!(status_text(&rec, 10, 0x6B).contains("Missing: VBAT_ADC"));
    }

    #[test]
    fn state_strings_come_from_the_record() {
        let mut rec = record(snapshot());
        rec.charge_state_str = "Taper charge (CV)";
        rec.input_source_str = "OTG mode";
        let text = status_text(&rec, 10, 0x6B);
        assert!(text.contains("chg_stat=3 (Taper charge (CV))"), "{text}");
        assert!(text.contains("(OTG mode)"), "{text}");
        let v = status_json(&rec);
        assert_eq!(v["chg_stat_str"], "Taper charge (CV)");
        assert_eq!(v["vbus_stat_str"], "OTG mode");
    }
}
