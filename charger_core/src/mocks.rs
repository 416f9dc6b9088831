//! Test and helper mocks for charger_core

use charger_traits::{Transport, TransportError};
use std::collections::{HashMap, HashSet};

/// Register-file transport with per-register failure injection.
///
/// Unset registers read as zero, like a quiet device. Writes land in the
/// byte map (so read-modify-write sequences can be checked) and are logged
/// in order.
#[derive(Debug, Default, Clone)]
pub struct MockTransport {
    bytes: HashMap<u8, u8>,
    words: HashMap<u8, u16>,
    failing: HashSet<u8>,
    writes: Vec<(u8, u8)>,
    reads: Vec<u8>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_byte(mut self, reg: u8, value: u8) -> Self {
        self.bytes.insert(reg, value);
        self
    }

    pub fn with_word(mut self, reg: u8, value: u16) -> Self {
        self.words.insert(reg, value);
        self
    }

    /// Every access to `reg` fails with an I/O error.
    pub fn failing(mut self, reg: u8) -> Self {
        self.failing.insert(reg);
        self
    }

    pub fn set_byte(&mut self, reg: u8, value: u8) {
        self.bytes.insert(reg, value);
    }

    pub fn set_word(&mut self, reg: u8, value: u16) {
        self.words.insert(reg, value);
    }

    pub fn set_failing(&mut self, reg: u8, fail: bool) {
        if fail {
            self.failing.insert(reg);
        } else {
            self.failing.remove(&reg);
        }
    }

    pub fn byte(&self, reg: u8) -> u8 {
        self.bytes.get(&reg).copied().unwrap_or(0)
    }

    /// Writes in issue order.
    pub fn writes(&self) -> &[(u8, u8)] {
        &self.writes
    }

    /// Addresses read, in issue order.
    pub fn reads(&self) -> &[u8] {
        &self.reads
    }

    fn check(&self, reg: u8) -> Result<(), TransportError> {
        if self.failing.contains(&reg) {
            return Err(Box::new(std::io::Error::other(format!(
                "mock failure at 0x{reg:02X}"
            ))));
        }
        Ok(())
    }
}

impl Transport for MockTransport {
    fn read_byte(&mut self, reg: u8) -> Result<u8, TransportError> {
        self.reads.push(reg);
        self.check(reg)?;
        Ok(self.byte(reg))
    }

    fn read_word(&mut self, reg: u8) -> Result<u16, TransportError> {
        self.reads.push(reg);
        self.check(reg)?;
        Ok(self.words.get(&reg).copied().unwrap_or(0))
    }

    fn write_byte(&mut self, reg: u8, value: u8) -> Result<(), TransportError> {
        self.check(reg)?;
        self.writes.push((reg, value));
        self.bytes.insert(reg, value);
        Ok(())
    }
}
