pub mod clock;

pub use clock::{Clock, MonotonicClock};

/// Boxed error crossing the transport boundary.
pub type TransportError = Box<dyn std::error::Error + Send + Sync>;

/// Register-oriented bus access to the charger IC.
///
/// Word reads return the value in the device's numeric order; any byte swap
/// the bus needs is the implementation's job and must be applied to every
/// word register the same way.
pub trait Transport {
    fn read_byte(&mut self, reg: u8) -> Result<u8, TransportError>;
    fn read_word(&mut self, reg: u8) -> Result<u16, TransportError>;
    fn write_byte(&mut self, reg: u8, value: u8) -> Result<(), TransportError>;
}

impl<T: Transport + ?Sized> Transport for Box<T> {
    fn read_byte(&mut self, reg: u8) -> Result<u8, TransportError> {
        (**self).read_byte(reg)
    }

    fn read_word(&mut self, reg: u8) -> Result<u16, TransportError> {
        (**self).read_word(reg)
    }

    fn write_byte(&mut self, reg: u8, value: u8) -> Result<(), TransportError> {
        (**self).write_byte(reg, value)
    }
}

impl<T: Transport + ?Sized> Transport for &mut T {
    fn read_byte(&mut self, reg: u8) -> Result<u8, TransportError> {
        (**self).read_byte(reg)
    }

    fn read_word(&mut self, reg: u8) -> Result<u16, TransportError> {
        (**self).read_word(reg)
    }

    fn write_byte(&mut self, reg: u8, value: u8) -> Result<(), TransportError> {
        (**self).write_byte(reg, value)
    }
}
