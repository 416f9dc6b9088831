//! Maps `Box<dyn Error>` from the transport boundary to typed `ChargerError`.
//!
//! `charger_traits::Transport` returns boxed errors so any bus can plug in;
//! this module converts those to our typed error enum, with an optional
//! feature-gated path for `charger_hardware::HwError` downcasting.

use crate::error::ChargerError;

/// Map a transport error on register `reg` to a typed `ChargerError`.
///
/// Attempts to downcast known hardware error types first, then falls back
/// to string-based heuristics.
pub fn map_transport_error(reg: u8, e: &(dyn std::error::Error + 'static)) -> ChargerError {
    #[cfg(feature = "hardware-errors")]
    {
        if let Some(hw) = e.downcast_ref::<charger_hardware::error::HwError>() {
            return match hw {
                charger_hardware::error::HwError::Timeout => ChargerError::Timeout { reg },
                charger_hardware::error::HwError::Io(io)
                    if io.kind() == std::io::ErrorKind::TimedOut =>
                {
                    ChargerError::Timeout { reg }
                }
                other => ChargerError::Transport {
                    reg,
                    detail: other.to_string(),
                },
            };
        }
    }

    let s = e.to_string();
    if s.to_lowercase().contains("timed out") || s.to_lowercase().contains("timeout") {
        ChargerError::Timeout { reg }
    } else {
        ChargerError::Transport { reg, detail: s }
    }
}
