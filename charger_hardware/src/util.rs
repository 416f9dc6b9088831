/// Byte order of 16-bit register words as delivered by the bus.
///
/// SMBus word transfers put the first byte on the wire in the low half of
/// the result. The BQ25792 sends the MSB first, so its ADC words come back
/// swapped unless the adapter already corrected them.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum WordOrder {
    /// Swap the two bytes of every word read (BQ25792 over plain SMBus).
    #[default]
    Swapped,
    /// Use the word exactly as the bus returned it.
    Native,
}

impl WordOrder {
    #[inline]
    pub fn apply(self, raw: u16) -> u16 {
        match self {
            WordOrder::Swapped => raw.swap_bytes(),
            WordOrder::Native => raw,
        }
    }
}
