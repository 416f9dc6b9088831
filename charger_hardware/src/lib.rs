pub mod error;
#[cfg(all(feature = "hardware", target_os = "linux"))]
pub mod i2c;
pub mod util;

pub use charger_traits::Transport;
use charger_traits::TransportError;
use std::collections::HashMap;

use crate::error::HwError;
pub use crate::util::WordOrder;

#[cfg(all(feature = "hardware", target_os = "linux"))]
pub use i2c::I2cTransport;

// Register addresses the simulated device answers on.
const SIM_REG_CELL_CFG: u8 = 0x0A;
const SIM_REG_CTRL1: u8 = 0x10;
const SIM_REG_CTRL5: u8 = 0x14;
const SIM_REG_STATUS0: u8 = 0x1B;
const SIM_REG_STATUS1: u8 = 0x1C;
const SIM_REG_FAULT0: u8 = 0x26;
const SIM_REG_FAULT1: u8 = 0x27;
const SIM_REG_ADC_CTRL: u8 = 0x2E;
const SIM_REG_IBUS: u8 = 0x31;
const SIM_REG_IBAT: u8 = 0x33;
const SIM_REG_VBUS: u8 = 0x35;
const SIM_REG_VBAT: u8 = 0x3B;
const SIM_REG_VSYS: u8 = 0x3D;
const SIM_REG_TDIE: u8 = 0x41;
const SIM_ADC_EN: u8 = 1 << 7;

/// Simulated BQ25792 register file.
///
/// Defaults model a 2S pack on fast charge from a DCP adapter. ADC words
/// read as zero until the ADC enable bit has been written, like the real
/// part right after power-up.
#[derive(Debug, Clone)]
pub struct SimulatedCharger {
    bytes: HashMap<u8, u8>,
    words: HashMap<u8, u16>,
    faults: HashMap<u8, SimFault>,
}

/// How an injected register fault shows up on the bus.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SimFault {
    /// NACK / remote I/O error.
    Io,
    /// Bus timeout.
    Timeout,
}

impl Default for SimulatedCharger {
    fn default() -> Self {
        Self::new()
    }
}

impl SimulatedCharger {
    pub fn new() -> Self {
        let bytes = HashMap::from([
            (SIM_REG_CELL_CFG, 0b0100_0000), // CELL = 2S
            (SIM_REG_CTRL1, 0b0000_0101),    // WATCHDOG = 40 s
            (SIM_REG_CTRL5, 0b0000_0000),
            (SIM_REG_STATUS0, 0b0000_1001), // PG, VBUS present
            (SIM_REG_STATUS1, (3 << 5) | (0x3 << 1) | 1), // fast charge, DCP, BC1.2 done
            (SIM_REG_FAULT0, 0),
            (SIM_REG_FAULT1, 0),
            (SIM_REG_ADC_CTRL, 0),
        ]);
        let words = HashMap::from([
            (SIM_REG_IBUS, 1_450),
            (SIM_REG_IBAT, 1_200),
            (SIM_REG_VBUS, 5_020),
            (SIM_REG_VBAT, 7_600),
            (SIM_REG_VSYS, 7_780),
            (SIM_REG_TDIE, 71), // 35.5 C
        ]);
        Self {
            bytes,
            words,
            faults: HashMap::new(),
        }
    }

    /// Build a simulator, applying test overrides from the environment:
    ///
    /// - `CHARGER_SIM_VBAT_MV`: pack voltage in mV
    /// - `CHARGER_SIM_IBAT_MA`: battery current in mA (negative = discharging)
    /// - `CHARGER_SIM_FAIL`: comma separated register list (`0x1b,0x33`) or
    ///   `status` for both status bytes; reads of those registers fail
    /// - `CHARGER_SIM_TIMEOUT`: same syntax, accesses time out instead
    pub fn from_env() -> Self {
        let mut sim = Self::new();
        if let Some(mv) = env_i32("CHARGER_SIM_VBAT_MV") {
            sim.set_word(SIM_REG_VBAT, mv.clamp(0, i32::from(u16::MAX)) as u16);
        }
        if let Some(ma) = env_i32("CHARGER_SIM_IBAT_MA") {
            let ma = ma.clamp(i32::from(i16::MIN), i32::from(i16::MAX)) as i16;
            sim.set_word(SIM_REG_IBAT, ma as u16);
        }
        for (var, fault) in [
            ("CHARGER_SIM_FAIL", SimFault::Io),
            ("CHARGER_SIM_TIMEOUT", SimFault::Timeout),
        ] {
            if let Ok(list) = std::env::var(var) {
                sim.inject_list(&list, fault);
            }
        }
        sim
    }

    pub fn set_byte(&mut self, reg: u8, value: u8) {
        self.bytes.insert(reg, value);
    }

    pub fn set_word(&mut self, reg: u8, value: u16) {
        self.words.insert(reg, value);
    }

    /// Make every subsequent access to `reg` fail.
    pub fn fail_register(&mut self, reg: u8) {
        self.faults.insert(reg, SimFault::Io);
    }

    /// Make every subsequent access to `reg` time out.
    pub fn timeout_register(&mut self, reg: u8) {
        self.faults.insert(reg, SimFault::Timeout);
    }

    fn inject_list(&mut self, list: &str, fault: SimFault) {
        for item in list.split(',').map(str::trim).filter(|s| !s.is_empty()) {
            if item.eq_ignore_ascii_case("status") {
                self.faults.insert(SIM_REG_STATUS0, fault);
                self.faults.insert(SIM_REG_STATUS1, fault);
            } else if let Some(reg) = parse_reg(item) {
                self.faults.insert(reg, fault);
            } else {
                tracing::warn!(item, "ignoring unparsable register in fault list");
            }
        }
    }

    pub fn byte(&self, reg: u8) -> Option<u8> {
        self.bytes.get(&reg).copied()
    }

    fn adc_enabled(&self) -> bool {
        self.bytes
            .get(&SIM_REG_ADC_CTRL)
            .is_some_and(|v| v & SIM_ADC_EN != 0)
    }

    fn check(&self, reg: u8) -> Result<(), HwError> {
        match self.faults.get(&reg) {
            Some(SimFault::Io) => Err(HwError::Io(std::io::Error::other(format!(
                "simulated failure at register 0x{reg:02X}"
            )))),
            Some(SimFault::Timeout) => Err(HwError::Timeout),
            None => Ok(()),
        }
    }
}

impl Transport for SimulatedCharger {
    fn read_byte(&mut self, reg: u8) -> Result<u8, TransportError> {
        self.check(reg)?;
        let v = self.bytes.get(&reg).copied().ok_or(HwError::Unmapped(reg))?;
        tracing::trace!(reg, value = v, "sim read byte");
        Ok(v)
    }

    fn read_word(&mut self, reg: u8) -> Result<u16, TransportError> {
        self.check(reg)?;
        let v = self.words.get(&reg).copied().ok_or(HwError::Unmapped(reg))?;
        let v = if self.adc_enabled() { v } else { 0 };
        tracing::trace!(reg, value = v, "sim read word");
        Ok(v)
    }

    fn write_byte(&mut self, reg: u8, value: u8) -> Result<(), TransportError> {
        self.check(reg)?;
        if !self.bytes.contains_key(&reg) {
            return Err(HwError::Unmapped(reg).into());
        }
        tracing::trace!(reg, value, "sim write byte");
        self.bytes.insert(reg, value);
        Ok(())
    }
}

fn env_i32(name: &str) -> Option<i32> {
    std::env::var(name).ok()?.trim().parse().ok()
}

fn parse_reg(s: &str) -> Option<u8> {
    match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        Some(hex) => u8::from_str_radix(hex, 16).ok(),
        None => s.parse().ok(),
    }
}
