use charger_core::error::ChargerError;
use charger_core::mocks::MockTransport;
use charger_core::registers::*;
use charger_core::{SocCurve, StatusSnapshot, charge_state_str, decode, decode_with_curve};
use rstest::rstest;

/// A healthy 2S pack charging at 1.2 A from a DCP adapter.
fn healthy() -> MockTransport {
    MockTransport::new()
        .with_byte(REG_RECHARGE_CTRL, 0b0100_0000)
        .with_byte(REG_CHARGER_STATUS_0, 0b0000_1001)
        .with_byte(REG_CHARGER_STATUS_1, (3 << 5) | (0x3 << 1) | 1)
        .with_word(REG_IBUS_ADC, 1_450)
        .with_word(REG_IBAT_ADC, 1_200)
        .with_word(REG_VBUS_ADC, 5_020)
        .with_word(REG_VBAT_ADC, 7_400)
        .with_word(REG_VSYS_ADC, 7_600)
        .with_word(REG_TDIE_ADC, 71)
}

fn status0_flag(st: &StatusSnapshot, bit: u8) -> bool {
    match bit {
        7 => st.input_current_limit_active,
        6 => st.input_voltage_limit_active,
        5 => st.watchdog_expired,
        4 => st.poor_source,
        3 => st.power_good,
        2 => st.ac2_present,
        1 => st.ac1_present,
        0 => st.vbus_present,
        _ => unreachable!(),
    }
}

#[rstest]
fn each_status0_bit_sets_exactly_one_flag(#[values(0, 1, 2, 3, 4, 5, 6, 7)] bit: u8) {
    let mut t = healthy().with_byte(REG_CHARGER_STATUS_0, 1 << bit);
    let st = decode(&mut t, false).unwrap();
    for other in 0..8u8 {
        assert_eq!(
            status0_flag(&st, other),
            other == bit,
            "bit {bit} leaked into flag {other}"
        );
    }
}

#[test]
fn decodes_full_snapshot() {
    let mut t = healthy();
    let st = decode(&mut t, true).unwrap();
    assert!(st.vbus_present && st.power_good);
    assert!(!st.ac1_present && !st.ac2_present);
    assert_eq!(st.charge_state, 3);
    assert_eq!(st.input_source_type, 0x3);
    assert!(st.bc12_done);
    assert_eq!(st.bus_current_ma, 1_450);
    assert_eq!(st.battery_current_ma, 1_200);
    assert_eq!(st.bus_voltage_mv, 5_020);
    assert_eq!(st.battery_voltage_mv, 7_400);
    assert_eq!(st.system_voltage_mv, 7_600);
    assert!((st.die_temp_c - 35.5).abs() < f32::EPSILON);
    assert_eq!(st.cell_count, 2);
    // 3700 mV per cell
    assert_eq!(st.soc_estimate_pct, 50);
    assert!(!st.fault_any);
    assert!(st.is_complete());
}

#[rstest]
#[case(0b000, 0)]
#[case(0b001, 1)]
#[case(0b101, 5)]
#[case(0b111, 7)]
fn charge_state_uses_top_three_bits(#[case] code: u8, #[case] expected: u8) {
    // Low bits set to make sure they do not bleed into CHG_STAT
    let mut t = healthy().with_byte(REG_CHARGER_STATUS_1, (code << 5) | 0b1_1111);
    let st = decode(&mut t, false).unwrap();
    assert_eq!(st.charge_state, expected);
    assert_eq!(st.input_source_type, 0xF);
    assert!(st.bc12_done);
}

#[test]
fn charge_state_strings_for_every_byte() {
    for b in 0..=255u8 {
        let mut t = healthy().with_byte(REG_CHARGER_STATUS_1, b);
        let st = decode(&mut t, false).unwrap();
        assert_eq!(st.charge_state, (b >> 5) & 0x7);
        let s = charge_state_str(st.charge_state);
        if st.charge_state == 5 {
            assert_eq!(s, "Reserved/unknown");
        } else {
            assert_ne!(s, "Reserved/unknown");
        }
    }
}

#[test]
fn negative_currents_and_temperatures_are_sign_extended() {
    let mut t = healthy()
        .with_word(REG_IBAT_ADC, (-1_850i16) as u16)
        .with_word(REG_IBUS_ADC, 0xFFFF)
        .with_word(REG_TDIE_ADC, (-21i16) as u16);
    let st = decode(&mut t, false).unwrap();
    assert_eq!(st.battery_current_ma, -1_850);
    assert_eq!(st.bus_current_ma, -1);
    assert!((st.die_temp_c + 10.5).abs() < f32::EPSILON);
}

#[test]
fn voltages_are_unsigned_full_range() {
    let mut t = healthy().with_word(REG_VBUS_ADC, 0xFFFF);
    let st = decode(&mut t, false).unwrap();
    assert_eq!(st.bus_voltage_mv, 65_535);
}

#[rstest]
#[case(REG_CHARGER_STATUS_0)]
#[case(REG_CHARGER_STATUS_1)]
fn mandatory_status_failure_aborts(#[case] reg: u8) {
    let mut t = healthy().failing(reg);
    let err = decode(&mut t, true).expect_err("status read failure must be fatal");
    assert_eq!(err.register(), Some(reg));
    assert!(matches!(err, ChargerError::Transport { .. }));
    // Nothing after the failing status read was attempted
    assert!(!t.reads().contains(&REG_VBAT_ADC));
    assert!(t.writes().is_empty());
}

#[rstest]
#[case(REG_IBUS_ADC, "IBUS_ADC")]
#[case(REG_IBAT_ADC, "IBAT_ADC")]
#[case(REG_VBUS_ADC, "VBUS_ADC")]
#[case(REG_VSYS_ADC, "VSYS_ADC")]
#[case(REG_TDIE_ADC, "TDIE_ADC")]
fn failed_measurement_is_zero_and_others_intact(#[case] reg: u8, #[case] name: &'static str) {
    let full = decode(&mut healthy(), false).unwrap();
    let mut t = healthy().failing(reg);
    let st = decode(&mut t, false).unwrap();

    assert_eq!(st.missing, vec![name]);
    let mut expected = full.clone();
    match reg {
        REG_IBUS_ADC => expected.bus_current_ma = 0,
        REG_IBAT_ADC => expected.battery_current_ma = 0,
        REG_VBUS_ADC => expected.bus_voltage_mv = 0,
        REG_VSYS_ADC => expected.system_voltage_mv = 0,
        REG_TDIE_ADC => expected.die_temp_c = 0.0,
        _ => unreachable!(),
    }
    expected.missing = vec![name];
    assert_eq!(st, expected);
}

#[test]
fn failed_battery_voltage_zeroes_soc_estimate() {
    let mut t = healthy().failing(REG_VBAT_ADC);
    let st = decode(&mut t, false).unwrap();
    assert_eq!(st.battery_voltage_mv, 0);
    assert_eq!(st.soc_estimate_pct, 0);
    assert_eq!(st.missing, vec!["VBAT_ADC"]);
    assert_eq!(st.battery_current_ma, 1_200);
}

#[rstest]
#[case(0b0000_0000, 1)]
#[case(0b0100_0000, 2)]
#[case(0b1000_0000, 3)]
#[case(0b1100_0000, 4)]
#[case(0b0011_1111, 1)]
fn cell_count_from_config_bits(#[case] reg0a: u8, #[case] cells: u8) {
    let mut t = healthy().with_byte(REG_RECHARGE_CTRL, reg0a);
    let st = decode(&mut t, false).unwrap();
    assert_eq!(st.cell_count, cells);
}

#[test]
fn unreadable_cell_config_defaults_to_one_cell() {
    let mut t = healthy()
        .failing(REG_RECHARGE_CTRL)
        .with_word(REG_VBAT_ADC, 3_700);
    let st = decode(&mut t, false).unwrap();
    assert_eq!(st.cell_count, 1);
    assert_eq!(st.soc_estimate_pct, 50);
    assert_eq!(st.missing, vec!["RECHG_CTRL"]);
}

#[rstest]
#[case(0x01, 0x00, false, false, true)]
#[case(0x00, 0x80, false, false, true)]
#[case(0x00, 0x00, true, false, true)]
#[case(0x00, 0x00, false, true, true)]
#[case(0x00, 0x00, false, false, false)]
fn fault_any_combines_sources(
    #[case] f0: u8,
    #[case] f1: u8,
    #[case] wd: bool,
    #[case] poor: bool,
    #[case] expected: bool,
) {
    let s0 = (u8::from(wd) << 5) | (u8::from(poor) << 4);
    let mut t = healthy()
        .with_byte(REG_CHARGER_STATUS_0, s0)
        .with_byte(REG_FAULT_FLAG_0, f0)
        .with_byte(REG_FAULT_FLAG_1, f1);
    let st = decode(&mut t, false).unwrap();
    assert_eq!(st.fault0, f0);
    assert_eq!(st.fault1, f1);
    assert_eq!(st.fault_any, expected);
}

#[test]
fn unreadable_fault_bytes_are_not_fatal() {
    let mut t = healthy()
        .with_byte(REG_FAULT_FLAG_0, 0x10)
        .failing(REG_FAULT_FLAG_0)
        .failing(REG_FAULT_FLAG_1);
    let st = decode(&mut t, false).unwrap();
    assert_eq!(st.fault0, 0);
    assert!(!st.fault_any);
    assert_eq!(st.missing, vec!["FAULT_FLAG_0", "FAULT_FLAG_1"]);
}

#[test]
fn ensure_adc_writes_continuous_high_res_before_measurements() {
    let mut t = healthy();
    decode(&mut t, true).unwrap();
    assert_eq!(t.writes(), &[(REG_ADC_CONTROL, 0x80)]);

    let mut t = healthy();
    decode(&mut t, false).unwrap();
    assert!(t.writes().is_empty());
}

#[test]
fn adc_write_failure_does_not_abort_decode() {
    let mut t = healthy().failing(REG_ADC_CONTROL);
    let st = decode(&mut t, true).unwrap();
    assert_eq!(st.battery_voltage_mv, 7_400);
}

#[test]
fn custom_curve_is_used_for_estimate() {
    // Flat LFP-like curve
    let curve = SocCurve::new(vec![(2_900, 0), (3_200, 20), (3_300, 80), (3_450, 100)]).unwrap();
    let mut t = healthy().with_word(REG_VBAT_ADC, 6_500);
    let st = decode_with_curve(&mut t, false, &curve).unwrap();
    // 3250 mV per cell -> 20 + 60*50/100
    assert_eq!(st.soc_estimate_pct, 50);
}
