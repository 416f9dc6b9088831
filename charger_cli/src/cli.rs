//! CLI argument definitions and shared statics.

use charger_config::I2C_ADDR_RANGE;
use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;
use std::sync::OnceLock;

pub static FILE_GUARD: OnceLock<tracing_appender::non_blocking::WorkerGuard> = OnceLock::new();
/// Whether the user asked for JSON logs (controls structured error output).
pub static JSON_MODE: OnceLock<bool> = OnceLock::new();

#[derive(Parser, Debug)]
#[command(name = "bqctl", version, about = "BQ25792 charger telemetry")]
pub struct Cli {
    /// Path to config TOML (optional; built-in defaults otherwise)
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// I2C bus number (/dev/i2c-N)
    #[arg(long, env = "BQ_I2C_BUS", value_name = "N")]
    pub bus: Option<u8>,

    /// 7-bit device address, decimal or 0x-prefixed hex
    #[arg(long, env = "BQ_I2C_ADDR", value_name = "ADDR", value_parser = parse_addr)]
    pub addr: Option<u8>,

    /// Do not touch the ADC control register
    #[arg(long, action = ArgAction::SetTrue)]
    pub no_adc: bool,

    /// Log as JSON lines instead of pretty
    #[arg(long = "log-json", action = ArgAction::SetTrue)]
    pub log_json: bool,

    /// Console log level (error|warn|info|debug|trace)
    #[arg(long = "log-level", value_name = "LEVEL")]
    pub log_level: Option<String>,

    /// Command to execute
    #[command(subcommand)]
    pub cmd: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Decode the charger once and print the result
    Status {
        /// Print a single JSON object instead of text
        #[arg(long, action = ArgAction::SetTrue)]
        json: bool,
    },
    /// Dump every mapped register as hex
    Raw,
    /// Poll periodically and persist the latest record as JSON
    Daemon {
        /// Seconds between poll cycles
        #[arg(long, env = "BQ_INTERVAL_SEC", value_name = "SECS")]
        interval_sec: Option<u64>,
        /// Status file, replaced atomically every cycle
        #[arg(long, env = "BQ_STATUS_PATH", value_name = "FILE")]
        status_path: Option<PathBuf>,
        /// Stop after this many cycles (runs until signalled otherwise)
        #[arg(long, value_name = "N")]
        cycles: Option<u64>,
    },
}

/// Parse `0x6b`, `0X6B` or `107`.
pub fn parse_addr(s: &str) -> Result<u8, String> {
    let s = s.trim();
    let parsed = match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        Some(hex) => u8::from_str_radix(hex, 16),
        None => s.parse::<u8>(),
    };
    match parsed {
        Ok(v) if I2C_ADDR_RANGE.contains(&u16::from(v)) => Ok(v),
        Ok(v) => Err(format!(
            "address 0x{v:X} is outside the usable 7-bit range 0x{:02X}..=0x{:02X}",
            I2C_ADDR_RANGE.start(),
            I2C_ADDR_RANGE.end()
        )),
        Err(e) => Err(format!("invalid address '{s}': {e}")),
    }
}
