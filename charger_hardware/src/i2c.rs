use charger_traits::{Transport, TransportError};
use rppal::i2c::I2c;
use tracing::trace;

use crate::error::{HwError, Result};
use crate::util::WordOrder;

impl From<rppal::i2c::Error> for HwError {
    fn from(e: rppal::i2c::Error) -> Self {
        match e {
            rppal::i2c::Error::Io(io) if io.kind() == std::io::ErrorKind::TimedOut => {
                HwError::Timeout
            }
            rppal::i2c::Error::Io(io) => HwError::Io(io),
            other => HwError::I2c(other.to_string()),
        }
    }
}

/// SMBus transport over a Linux `/dev/i2c-N` character device.
pub struct I2cTransport {
    i2c: I2c,
    order: WordOrder,
}

impl I2cTransport {
    pub fn open(bus: u8, addr: u8, order: WordOrder) -> Result<Self> {
        let mut i2c = I2c::with_bus(bus)?;
        i2c.set_slave_address(u16::from(addr))?;
        tracing::debug!(bus, addr = format_args!("0x{addr:02x}"), "i2c device opened");
        Ok(Self { i2c, order })
    }
}

impl Transport for I2cTransport {
    fn read_byte(&mut self, reg: u8) -> std::result::Result<u8, TransportError> {
        let v = self.i2c.smbus_read_byte(reg).map_err(HwError::from)?;
        trace!(reg, value = v, "i2c read byte");
        Ok(v)
    }

    fn read_word(&mut self, reg: u8) -> std::result::Result<u16, TransportError> {
        let raw = self.i2c.smbus_read_word(reg).map_err(HwError::from)?;
        let v = self.order.apply(raw);
        trace!(reg, raw, value = v, "i2c read word");
        Ok(v)
    }

    fn write_byte(&mut self, reg: u8, value: u8) -> std::result::Result<(), TransportError> {
        self.i2c
            .smbus_write_byte(reg, value)
            .map_err(HwError::from)?;
        trace!(reg, value, "i2c write byte");
        Ok(())
    }
}
