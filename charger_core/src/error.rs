use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ChargerError {
    #[error("bus transfer failed at register 0x{reg:02X}: {detail}")]
    Transport { reg: u8, detail: String },
    #[error("bus timeout at register 0x{reg:02X}")]
    Timeout { reg: u8 },
    #[error("configuration error: {0}")]
    Config(String),
    #[error("io error: {0}")]
    Io(String),
}

impl ChargerError {
    /// Register the failing transfer targeted, if this is a bus error.
    pub fn register(&self) -> Option<u8> {
        match self {
            ChargerError::Transport { reg, .. } | ChargerError::Timeout { reg } => Some(*reg),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, ChargerError>;
