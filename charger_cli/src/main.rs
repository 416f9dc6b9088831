mod cli;
mod daemon;
mod error_fmt;
mod output;
mod session;

use crate::cli::{Cli, Commands, FILE_GUARD, JSON_MODE};
use crate::daemon::{DaemonParams, run_daemon};
use crate::error_fmt::{exit_code_for_error, format_error_json, humanize};
use crate::session::{Settings, load_config, open_transport};
use charger_core::{ChargerError, Monitor, read_raw};
use charger_traits::Transport;
use clap::Parser;
use eyre::{Result, WrapErr};
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

fn main() {
    let cli = Cli::parse();
    let json = cli.log_json || matches!(cli.cmd, Commands::Status { json: true });
    let _ = JSON_MODE.set(json);

    if let Err(e) = run(cli) {
        tracing::error!(error = %e, "command failed");
        if JSON_MODE.get().copied().unwrap_or(false) {
            eprintln!("{}", format_error_json(&e));
        } else {
            eprintln!("{}", humanize(&e));
        }
        std::process::exit(exit_code_for_error(&e));
    }
}

fn run(cli: Cli) -> Result<()> {
    color_eyre::install()?;

    let cfg = load_config(cli.config.as_deref())?;
    let level = cli
        .log_level
        .clone()
        .or_else(|| cfg.logging.level.clone())
        .unwrap_or_else(|| "info".to_string());
    init_tracing(cli.log_json, &level, &cfg.logging)?;

    let settings = Settings::resolve(&cli, &cfg)?;
    let transport = open_transport(&settings)?;

    match cli.cmd {
        Commands::Status { json } => run_status(transport, &settings, json),
        Commands::Raw => run_raw(transport),
        Commands::Daemon {
            interval_sec,
            status_path,
            cycles,
        } => {
            let interval_sec = interval_sec.unwrap_or(cfg.daemon.interval_sec);
            if interval_sec == 0 {
                return Err(ChargerError::Config("interval must be >= 1 s".into()).into());
            }
            let params = DaemonParams {
                interval: Duration::from_secs(interval_sec),
                status_path: status_path.unwrap_or_else(|| cfg.daemon.status_path.clone()),
                cycles,
            };
            let shutdown = Arc::new(AtomicBool::new(false));
            let flag = Arc::clone(&shutdown);
            ctrlc::set_handler(move || flag.store(true, Ordering::Relaxed))
                .wrap_err("install signal handler")?;
            run_daemon(transport, &settings, &params, &shutdown)
        }
    }
}

fn run_status(transport: Box<dyn Transport>, settings: &Settings, json: bool) -> Result<()> {
    let mut monitor = Monitor::new(transport, settings.monitor.clone());
    let rec = monitor.poll().wrap_err("read charger status")?;
    if json {
        println!("{}", output::status_json(&rec));
    } else {
        print!(
            "{}",
            output::status_text(&rec, settings.bus, settings.addr)
        );
    }
    Ok(())
}

fn run_raw(mut transport: Box<dyn Transport>) -> Result<()> {
    let dump = read_raw(&mut transport);
    let unreadable = dump.iter().filter(|(_, v)| v.is_none()).count();
    if unreadable > 0 {
        tracing::warn!(unreadable, "some registers could not be read");
    }
    print!("{}", output::raw_text(&dump));
    Ok(())
}

fn init_tracing(json: bool, level: &str, logging: &charger_config::Logging) -> Result<()> {
    use tracing_appender::rolling::{RollingFileAppender, Rotation};
    use tracing_subscriber::{EnvFilter, Layer, fmt, prelude::*};

    // RUST_LOG wins over --log-level / [logging] level
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .wrap_err_with(|| format!("invalid log level '{level}'"))?;

    let console = if json {
        fmt::layer().json().with_writer(std::io::stderr).boxed()
    } else {
        fmt::layer().with_writer(std::io::stderr).boxed()
    };

    let file = match logging.file.as_deref() {
        Some(path) => {
            let path = Path::new(path);
            let dir = path
                .parent()
                .filter(|d| !d.as_os_str().is_empty())
                .unwrap_or_else(|| Path::new("."));
            let name = path
                .file_name()
                .ok_or_else(|| ChargerError::Config(format!("logging.file {path:?} has no file name")))?;
            let rotation = match logging.rotation.as_deref().map(str::to_ascii_lowercase).as_deref() {
                Some("daily") => Rotation::DAILY,
                Some("hourly") => Rotation::HOURLY,
                _ => Rotation::NEVER,
            };
            let (writer, guard) =
                tracing_appender::non_blocking(RollingFileAppender::new(rotation, dir, name));
            let _ = FILE_GUARD.set(guard);
            Some(fmt::layer().json().with_ansi(false).with_writer(writer).boxed())
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(console)
        .with(file)
        .with(filter)
        .try_init()
        .wrap_err("initialize logging")?;
    Ok(())
}
