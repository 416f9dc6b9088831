#![cfg_attr(all(not(debug_assertions), not(test)), deny(warnings))]
#![cfg_attr(
    all(not(debug_assertions), not(test)),
    deny(clippy::all, clippy::pedantic, clippy::nursery)
)]
#![allow(clippy::module_name_repetitions, clippy::missing_errors_doc)]
//! Config schema and SoC curve parsing for the charger monitor.
//!
//! - `Config` and its sections are deserialized from TOML and validated.
//!   Every field has a default, so an empty file is a valid config.
//! - The SoC curve CSV loader enforces headers and numeric rows; the points
//!   are handed to `charger_core::SocCurve`, which owns the curve rules.
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// SoC curve CSV schema.
///
/// Expected headers:
/// mv,soc
///
/// Example:
/// mv,soc
/// 3300,0
/// 3700,50
/// 4200,100
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
pub struct CurveRow {
    /// Per-cell voltage in millivolts.
    pub mv: i32,
    /// State of charge in percent.
    pub soc: i32,
}

/// Byte order of 16-bit ADC words as delivered by the bus driver.
#[derive(Debug, Deserialize, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum WordOrderCfg {
    /// SMBus little-endian word, swapped to the device's MSB-first layout.
    #[default]
    Swapped,
    Native,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct DeviceCfg {
    /// I2C bus number (`/dev/i2c-N`).
    pub bus: u8,
    /// 7-bit slave address.
    pub addr: u16,
    pub word_order: WordOrderCfg,
}

impl Default for DeviceCfg {
    fn default() -> Self {
        Self {
            bus: 10,
            addr: 0x6B,
            word_order: WordOrderCfg::Swapped,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct AdcCfg {
    /// Enable the ADC before each decode
    pub ensure_on: bool,
    /// Wait after the first enable (ms)
    pub settle_ms: u64,
}

impl Default for AdcCfg {
    fn default() -> Self {
        Self {
            ensure_on: true,
            settle_ms: 50,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct DaemonCfg {
    pub interval_sec: u64,
    /// Where the latest JSON record is written (atomically).
    pub status_path: PathBuf,
    /// Battery current magnitude (mA) treated as idle.
    pub direction_deadband_ma: i32,
}

impl Default for DaemonCfg {
    fn default() -> Self {
        Self {
            interval_sec: 10,
            status_path: PathBuf::from("/run/bq25792/status.json"),
            direction_deadband_ma: 50,
        }
    }
}

#[derive(Debug, Deserialize, Default, Clone)]
#[serde(default)]
pub struct Logging {
    pub file: Option<String>,  // path to .log (JSON lines)
    pub level: Option<String>, // "info","debug"
    /// Log rotation policy: "never" | "daily" | "hourly" (default: never)
    pub rotation: Option<String>,
}

#[derive(Debug, Deserialize, Default, Clone)]
#[serde(default)]
pub struct SocCfg {
    /// Optional CSV with `mv,soc` rows replacing the built-in OCV table.
    pub curve_csv: Option<PathBuf>,
}

#[derive(Debug, Deserialize, Default, Clone)]
#[serde(default)]
pub struct Config {
    pub device: DeviceCfg,
    pub adc: AdcCfg,
    pub daemon: DaemonCfg,
    pub logging: Logging,
    pub soc: SocCfg,
}

pub fn load_toml(s: &str) -> Result<Config, toml::de::Error> {
    toml::from_str::<Config>(s)
}

/// Usable 7-bit I2C addresses; 0x00..=0x07 and 0x78..=0x7F are reserved.
pub const I2C_ADDR_RANGE: std::ops::RangeInclusive<u16> = 0x08..=0x77;

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];
const ROTATIONS: [&str; 3] = ["never", "daily", "hourly"];

impl Config {
    pub fn validate(&self) -> eyre::Result<()> {
        // Device
        if !I2C_ADDR_RANGE.contains(&self.device.addr) {
            eyre::bail!(
                "device.addr must be a 7-bit address in 0x08..=0x77, got 0x{:X}",
                self.device.addr
            );
        }

        // ADC
        if self.adc.settle_ms > 10_000 {
            eyre::bail!("adc.settle_ms is unreasonably large (>10s)");
        }

        // Daemon
        if self.daemon.interval_sec == 0 {
            eyre::bail!("daemon.interval_sec must be >= 1");
        }
        if self.daemon.interval_sec > 24 * 60 * 60 {
            eyre::bail!("daemon.interval_sec is unreasonably large (>24h)");
        }
        if self.daemon.status_path.as_os_str().is_empty() {
            eyre::bail!("daemon.status_path must not be empty");
        }
        if !(0..=5_000).contains(&self.daemon.direction_deadband_ma) {
            eyre::bail!("daemon.direction_deadband_ma must be in [0, 5000]");
        }

        // Logging
        if let Some(level) = self.logging.level.as_deref()
            && !LOG_LEVELS.contains(&level.to_ascii_lowercase().as_str())
        {
            eyre::bail!("logging.level must be one of {}", LOG_LEVELS.join("|"));
        }
        if let Some(rot) = self.logging.rotation.as_deref()
            && !ROTATIONS.contains(&rot.to_ascii_lowercase().as_str())
        {
            eyre::bail!("logging.rotation must be one of {}", ROTATIONS.join("|"));
        }

        // SoC
        if let Some(p) = &self.soc.curve_csv
            && p.as_os_str().is_empty()
        {
            eyre::bail!("soc.curve_csv must not be empty when set");
        }

        Ok(())
    }
}

/// Parse a `mv,soc` curve file.
///
/// Only the file shape is checked here (headers, numeric cells). Whether the
/// points form a usable curve is decided by `charger_core::SocCurve::new`.
pub fn load_soc_curve_csv(path: &Path) -> eyre::Result<Vec<CurveRow>> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_path(path)
        .map_err(|e| eyre::eyre!("open soc curve CSV {:?}: {}", path, e))?;

    // Enforce exact headers
    let headers = rdr
        .headers()
        .map_err(|e| eyre::eyre!("read CSV headers {:?}: {}", path, e))?
        .clone();
    let expected = ["mv", "soc"];
    let actual: Vec<String> = headers.iter().map(|s| s.to_string()).collect();
    if actual != expected {
        eyre::bail!(
            "soc curve CSV must have headers 'mv,soc', got: {}",
            actual.join(",")
        );
    }

    let mut rows = Vec::new();
    for (idx, rec) in rdr.deserialize::<CurveRow>().enumerate() {
        match rec {
            Ok(row) => rows.push(row),
            Err(e) => {
                eyre::bail!("invalid CSV row {}: {}", idx + 2, e);
            }
        }
    }

    Ok(rows)
}
