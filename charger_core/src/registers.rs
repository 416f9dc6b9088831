//! Register addresses, bit masks, and decode tags for the BQ25792.

// Configuration / control (1-byte bitfields)
pub const REG_RECHARGE_CTRL: u8 = 0x0A;
pub const CELL_MASK: u8 = 0b1100_0000; // >>6, 0 = 1S .. 3 = 4S
pub const CELL_SHIFT: u8 = 6;

pub const REG_CHARGER_CTRL_1: u8 = 0x10;
pub const WATCHDOG_MASK: u8 = 0b0000_0111; // 0 = watchdog disabled
pub const WD_RST: u8 = 1 << 3;

pub const REG_CHARGER_CTRL_5: u8 = 0x14;
pub const EN_IBAT: u8 = 1 << 5; // battery discharge current sensing

// Status (1-byte bitfields)
pub const REG_CHARGER_STATUS_0: u8 = 0x1B;
pub const IINDPM_STAT: u8 = 1 << 7;
pub const VINDPM_STAT: u8 = 1 << 6;
pub const WD_STAT: u8 = 1 << 5;
pub const POORSRC_STAT: u8 = 1 << 4;
pub const PG_STAT: u8 = 1 << 3;
pub const AC2_PRESENT_STAT: u8 = 1 << 2;
pub const AC1_PRESENT_STAT: u8 = 1 << 1;
pub const VBUS_PRESENT_STAT: u8 = 1 << 0;

pub const REG_CHARGER_STATUS_1: u8 = 0x1C;
pub const CHG_STAT_MASK: u8 = 0b1110_0000; // >>5
pub const CHG_STAT_SHIFT: u8 = 5;
pub const VBUS_STAT_MASK: u8 = 0b0001_1110; // >>1
pub const VBUS_STAT_SHIFT: u8 = 1;
pub const BC12_DONE_STAT: u8 = 1 << 0;

// Fault flags (1-byte, raw)
pub const REG_FAULT_FLAG_0: u8 = 0x26;
pub const REG_FAULT_FLAG_1: u8 = 0x27;

// ADC control
pub const REG_ADC_CONTROL: u8 = 0x2E;
pub const ADC_EN: u8 = 1 << 7;
pub const ADC_RATE_ONE_SHOT: u8 = 1 << 6; // 0 = continuous
pub const ADC_SAMPLE_MASK: u8 = 0b0011_0000; // 00 = 15-bit, 01 = 14-bit
pub const ADC_SAMPLE_14BIT: u8 = 0b01 << 4;

// ADC results (u16, MSB first on the wire)
pub const REG_IBUS_ADC: u8 = 0x31;
pub const REG_IBAT_ADC: u8 = 0x33;
pub const REG_VBUS_ADC: u8 = 0x35;
pub const REG_VBAT_ADC: u8 = 0x3B;
pub const REG_VSYS_ADC: u8 = 0x3D;
pub const REG_TDIE_ADC: u8 = 0x41;

/// Die temperature resolution in degrees Celsius per count.
pub const TDIE_C_PER_COUNT: f32 = 0.5;

/// Transfer width of a register.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Width {
    Byte,
    Word,
}

/// How the raw register value is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodeKind {
    Bitfield,
    /// Two's complement, 1 mA per count.
    SignedAdc,
    /// Unsigned, 1 mV per count.
    UnsignedAdc,
    /// Two's complement, 0.5 degC per count.
    HalfDegree,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegisterInfo {
    pub name: &'static str,
    pub addr: u8,
    pub width: Width,
    pub kind: DecodeKind,
}

const fn byte(name: &'static str, addr: u8) -> RegisterInfo {
    RegisterInfo {
        name,
        addr,
        width: Width::Byte,
        kind: DecodeKind::Bitfield,
    }
}

const fn word(name: &'static str, addr: u8, kind: DecodeKind) -> RegisterInfo {
    RegisterInfo {
        name,
        addr,
        width: Width::Word,
        kind,
    }
}

/// Every register this crate touches, in address order.
pub const REGISTER_MAP: &[RegisterInfo] = &[
    byte("RECHG_CTRL", REG_RECHARGE_CTRL),
    byte("CHG_CTRL_1", REG_CHARGER_CTRL_1),
    byte("CHG_CTRL_5", REG_CHARGER_CTRL_5),
    byte("CHG_STATUS_0", REG_CHARGER_STATUS_0),
    byte("CHG_STATUS_1", REG_CHARGER_STATUS_1),
    byte("FAULT_FLAG_0", REG_FAULT_FLAG_0),
    byte("FAULT_FLAG_1", REG_FAULT_FLAG_1),
    byte("ADC_CONTROL", REG_ADC_CONTROL),
    word("IBUS_ADC", REG_IBUS_ADC, DecodeKind::SignedAdc),
    word("IBAT_ADC", REG_IBAT_ADC, DecodeKind::SignedAdc),
    word("VBUS_ADC", REG_VBUS_ADC, DecodeKind::UnsignedAdc),
    word("VBAT_ADC", REG_VBAT_ADC, DecodeKind::UnsignedAdc),
    word("VSYS_ADC", REG_VSYS_ADC, DecodeKind::UnsignedAdc),
    word("TDIE_ADC", REG_TDIE_ADC, DecodeKind::HalfDegree),
];

/// Look up a register by address.
pub fn info(addr: u8) -> Option<&'static RegisterInfo> {
    REGISTER_MAP.iter().find(|r| r.addr == addr)
}

/// Register name for logs; `"?"` for addresses outside the map.
pub fn name(addr: u8) -> &'static str {
    info(addr).map_or("?", |r| r.name)
}

/// Extract a multi-bit field given its mask and shift.
#[inline]
pub fn field(value: u8, mask: u8, shift: u8) -> u8 {
    (value & mask) >> shift
}

#[inline]
pub fn bit(value: u8, mask: u8) -> bool {
    value & mask != 0
}
