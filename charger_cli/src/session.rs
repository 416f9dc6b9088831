//! Config mapping and hardware assembly.

use crate::cli::Cli;
use charger_config::{Config, WordOrderCfg, load_soc_curve_csv, load_toml};
use charger_core::{ChargerError, MonitorOptions, SocCurve};
use charger_hardware::WordOrder;
use charger_traits::Transport;
use eyre::Result;
use std::path::Path;
use std::time::Duration;

/// Effective settings after applying CLI/env over config over defaults.
#[derive(Debug, Clone)]
pub struct Settings {
    pub bus: u8,
    pub addr: u8,
    pub word_order: WordOrder,
    pub monitor: MonitorOptions,
}

/// Read, parse and validate the config file. No file means all defaults.
pub fn load_config(path: Option<&Path>) -> Result<Config> {
    let Some(path) = path else {
        return Ok(Config::default());
    };
    let text = std::fs::read_to_string(path)
        .map_err(|e| ChargerError::Config(format!("read {}: {e}", path.display())))?;
    let cfg = load_toml(&text)
        .map_err(|e| ChargerError::Config(format!("parse {}: {e}", path.display())))?;
    cfg.validate()
        .map_err(|e| ChargerError::Config(format!("invalid configuration: {e}")))?;
    Ok(cfg)
}

impl Settings {
    pub fn resolve(cli: &Cli, cfg: &Config) -> Result<Self> {
        let bus = cli.bus.unwrap_or(cfg.device.bus);
        let addr = match cli.addr {
            Some(a) => a,
            None => u8::try_from(cfg.device.addr).map_err(|_| {
                ChargerError::Config(format!("device.addr 0x{:X} out of range", cfg.device.addr))
            })?,
        };
        let word_order = match cfg.device.word_order {
            WordOrderCfg::Swapped => WordOrder::Swapped,
            WordOrderCfg::Native => WordOrder::Native,
        };
        let curve = match &cfg.soc.curve_csv {
            Some(path) => load_curve(path)?,
            None => SocCurve::default(),
        };
        let monitor = MonitorOptions {
            ensure_adc_on: cfg.adc.ensure_on && !cli.no_adc,
            adc_settle: Duration::from_millis(cfg.adc.settle_ms),
            deadband_ma: cfg.daemon.direction_deadband_ma,
            curve,
        };
        Ok(Self {
            bus,
            addr,
            word_order,
            monitor,
        })
    }
}

fn load_curve(path: &Path) -> Result<SocCurve> {
    let rows = load_soc_curve_csv(path).map_err(|e| ChargerError::Config(e.to_string()))?;
    let curve = SocCurve::new(rows.iter().map(|r| (r.mv, r.soc)).collect())?;
    tracing::info!(path = %path.display(), points = curve.points().len(), "custom SoC curve loaded");
    Ok(curve)
}

/// Open the charger: Linux I2C with the `hardware` feature, the simulator otherwise.
pub fn open_transport(s: &Settings) -> Result<Box<dyn Transport>> {
    #[cfg(all(feature = "hardware", target_os = "linux"))]
    {
        use eyre::WrapErr;
        let t = charger_hardware::I2cTransport::open(s.bus, s.addr, s.word_order)
            .wrap_err_with(|| format!("open i2c bus {} addr 0x{:02x}", s.bus, s.addr))?;
        Ok(Box::new(t))
    }
    #[cfg(not(all(feature = "hardware", target_os = "linux")))]
    {
        tracing::info!(
            bus = s.bus,
            addr = format_args!("0x{:02x}", s.addr),
            word_order = ?s.word_order,
            "hardware feature disabled; using simulated charger"
        );
        Ok(Box::new(charger_hardware::SimulatedCharger::from_env()))
    }
}
