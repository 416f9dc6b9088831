#![cfg_attr(all(not(debug_assertions), not(test)), deny(warnings))]
#![cfg_attr(
    all(not(debug_assertions), not(test)),
    deny(clippy::all, clippy::pedantic, clippy::nursery)
)]
#![allow(
    clippy::module_name_repetitions,
    clippy::missing_errors_doc,
    clippy::cast_possible_truncation,
    clippy::cast_possible_wrap,
    clippy::cast_precision_loss,
    clippy::cast_sign_loss
)]
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
//! Charger telemetry core (hardware-agnostic).
//!
//! All bus access goes through `charger_traits::Transport`.
//!
//! ## Architecture
//!
//! - **Registers**: addresses, masks and decode tags (`registers`)
//! - **Decoder**: register bytes to [`StatusSnapshot`] (`decoder`)
//! - **Estimator**: per-cell voltage to SoC percent (`soc`)
//! - **Filter**: SoC display stabilization (`filter`)
//! - **Defaults**: ADC control and safe-default writes (`defaults`)
//! - **Monitor**: one poll cycle end to end (`monitor`)
//!
//! Only the two status bytes are mandatory. Everything else is read
//! best-effort and degrades to zero, see [`StatusSnapshot::missing`].

pub mod atomic;
pub mod decoder;
pub mod defaults;
pub mod error;
pub mod filter;
pub mod hw_error;
pub mod mocks;
pub mod monitor;
pub mod registers;
pub mod soc;
pub mod status;

pub use decoder::{decode, decode_with_curve};
pub use defaults::{adc_control_byte, apply_safe_defaults, enable_adc, read_raw};
pub use error::{ChargerError, Result};
pub use filter::{Direction, FilterState, SocFilter};
pub use monitor::{Monitor, MonitorOptions, TelemetryRecord};
pub use soc::{SocCurve, soc_from_cell_voltage};
pub use status::{StatusSnapshot, charge_state_str, input_source_str};
