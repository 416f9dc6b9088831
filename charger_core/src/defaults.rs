//! Minimal write path: ADC control and the safe-default register setup.

use charger_traits::Transport;
use tracing::{debug, info};

use crate::error::Result;
use crate::hw_error::map_transport_error;
use crate::registers::*;

/// Encode REG2E for the two modes this crate uses.
///
/// - continuous + high resolution: ADC_EN, continuous, 15-bit (`0x80`)
/// - one-shot + reduced resolution: ADC_EN, one-shot, 14-bit (`0xD0`)
///
/// Mixed combinations follow the same bit layout.
#[inline]
pub fn adc_control_byte(continuous: bool, high_res: bool) -> u8 {
    let mut v = ADC_EN;
    if !continuous {
        v |= ADC_RATE_ONE_SHOT;
    }
    if !high_res {
        v |= ADC_SAMPLE_14BIT;
    }
    v
}

/// Write the ADC control register. Idempotent.
pub fn enable_adc<T: Transport + ?Sized>(
    transport: &mut T,
    continuous: bool,
    high_res: bool,
) -> Result<()> {
    let v = adc_control_byte(continuous, high_res);
    write(transport, REG_ADC_CONTROL, v)?;
    debug!(value = v, "ADC control written");
    Ok(())
}

/// Keep ADC and current sensing alive across host inactivity.
///
/// 1. Disable the I2C watchdog (REG10[2:0] = 0) so ADC_EN and EN_IBAT are
///    not reset to defaults when the host stops talking.
/// 2. Pulse WD_RST to clear a pending watchdog status (ignored on failure).
/// 3. Enable battery discharge current sensing (REG14 EN_IBAT).
pub fn apply_safe_defaults<T: Transport + ?Sized>(transport: &mut T) -> Result<()> {
    modify(transport, REG_CHARGER_CTRL_1, WATCHDOG_MASK, 0)?;
    if let Err(e) = modify(transport, REG_CHARGER_CTRL_1, 0, WD_RST) {
        debug!(error = %e, "WD_RST pulse failed");
    }
    modify(transport, REG_CHARGER_CTRL_5, 0, EN_IBAT)?;
    info!("charger safe defaults applied");
    Ok(())
}

/// Read every register in the map; each read is independent.
pub fn read_raw<T: Transport + ?Sized>(transport: &mut T) -> Vec<(RegisterInfo, Option<u16>)> {
    REGISTER_MAP
        .iter()
        .map(|r| {
            let value = match r.width {
                Width::Byte => transport.read_byte(r.addr).map(u16::from).ok(),
                Width::Word => transport.read_word(r.addr).ok(),
            };
            (*r, value)
        })
        .collect()
}

fn modify<T: Transport + ?Sized>(transport: &mut T, reg: u8, clear: u8, set: u8) -> Result<()> {
    let v = transport
        .read_byte(reg)
        .map_err(|e| map_transport_error(reg, &*e))?;
    write(transport, reg, (v & !clear) | set)
}

fn write<T: Transport + ?Sized>(transport: &mut T, reg: u8, value: u8) -> Result<()> {
    transport
        .write_byte(reg, value)
        .map_err(|e| map_transport_error(reg, &*e))
}
