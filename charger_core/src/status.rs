//! Decoded charger status snapshot and classification strings.

/// Text for codes outside the defined tables.
pub const RESERVED: &str = "Reserved/unknown";

/// Snapshot of one decode pass over the status and ADC registers.
///
/// Measurements whose register read failed are left at zero and listed in
/// `missing`; a zero there means "unknown", not "measured zero".
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StatusSnapshot {
    // Input / adapter
    pub vbus_present: bool,
    pub ac1_present: bool,
    pub ac2_present: bool,
    pub power_good: bool,
    pub input_current_limit_active: bool,
    pub input_voltage_limit_active: bool,
    pub watchdog_expired: bool,
    pub poor_source: bool,

    // Charge state
    /// CHG_STAT, 0..=7
    pub charge_state: u8,
    /// VBUS_STAT, 0..=15
    pub input_source_type: u8,
    pub bc12_done: bool,

    // Faults
    pub fault0: u8,
    pub fault1: u8,
    pub fault_any: bool,

    // ADC measurements
    pub bus_current_ma: i32,
    /// Positive while charging, negative while discharging.
    pub battery_current_ma: i32,
    pub bus_voltage_mv: i32,
    /// Pack voltage.
    pub battery_voltage_mv: i32,
    pub system_voltage_mv: i32,
    pub die_temp_c: f32,

    // Pack
    /// Series cell count, 1..=4
    pub cell_count: u8,
    /// Coarse SoC from per-cell voltage, 0..=100
    pub soc_estimate_pct: i32,

    /// Names of best-effort registers that could not be read.
    pub missing: Vec<&'static str>,
}

impl StatusSnapshot {
    pub fn charge_state_str(&self) -> &'static str {
        charge_state_str(self.charge_state)
    }

    pub fn input_source_str(&self) -> &'static str {
        input_source_str(self.input_source_type)
    }

    /// True when every best-effort register was read.
    pub fn is_complete(&self) -> bool {
        self.missing.is_empty()
    }

    /// Pack voltage divided by the series cell count; 0 when unknown.
    pub fn cell_voltage_mv(&self) -> i32 {
        if self.battery_voltage_mv > 0 {
            self.battery_voltage_mv / i32::from(self.cell_count.max(1))
        } else {
            0
        }
    }
}

/// CHG_STAT description. Only the low three bits are considered.
pub fn charge_state_str(code: u8) -> &'static str {
    match code & 0x7 {
        0 => "Not charging",
        1 => "Trickle charge",
        2 => "Pre-charge",
        3 => "Fast charge (CC)",
        4 => "Taper charge (CV)",
        6 => "Top-off timer active",
        7 => "Charge termination done",
        _ => RESERVED,
    }
}

/// VBUS_STAT description. Only the low four bits are considered.
pub fn input_source_str(code: u8) -> &'static str {
    match code & 0xF {
        0x0 => "No input / BHOT / BCOLD (OTG)",
        0x1 => "USB SDP (500mA)",
        0x2 => "USB CDP (1.5A)",
        0x3 => "USB DCP (3.25A)",
        0x4 => "HVDCP (1.5A)",
        0x5 => "Unknown adaptor (3A)",
        0x6 => "Non-standard adaptor (1A/2A/2.1A/2.4A)",
        0x7 => "OTG mode",
        0x8 => "Not qualified adaptor",
        0xB => "Device directly powered from VBUS",
        _ => RESERVED,
    }
}
