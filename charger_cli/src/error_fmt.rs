//! Human-readable error descriptions and structured JSON error formatting.

use charger_core::ChargerError;
use charger_core::registers;
use charger_hardware::error::HwError;

/// Map an eyre::Report to a human-readable explanation with likely causes and fix hints.
pub fn humanize(err: &eyre::Report) -> String {
    // Typed matches first
    if let Some(ce) = err.downcast_ref::<ChargerError>() {
        return match ce {
            ChargerError::Timeout { reg } => format!(
                "What happened: Bus timeout reading register 0x{reg:02X} ({}).\nLikely causes: Charger unpowered, wrong bus number, or SDA/SCL wiring.\nHow to fix: Check that /dev/i2c-N matches --bus and that the charger has input or battery power.",
                registers::name(*reg)
            ),
            ChargerError::Transport { reg, detail } => format!(
                "What happened: Reading register 0x{reg:02X} ({}) failed: {detail}.\nLikely causes: Wrong device address or the charger is not on this bus.\nHow to fix: Probe the bus (e.g. `i2cdetect -y N`) and pass the right --addr.",
                registers::name(*reg)
            ),
            ChargerError::Config(msg) => format!(
                "What happened: Invalid configuration ({msg}).\nLikely causes: Missing or out-of-range values in the TOML or SoC curve CSV.\nHow to fix: Edit the config file, then rerun."
            ),
            ChargerError::Io(msg) => format!(
                "What happened: I/O error ({msg}).\nLikely causes: Missing directory or insufficient permissions.\nHow to fix: Check the path and the permissions of the running user."
            ),
        };
    }

    if let Some(hw) = err.downcast_ref::<HwError>() {
        if matches!(hw, HwError::Timeout) {
            return "What happened: I2C bus timed out while opening the device.\nLikely causes: Bus stuck or charger unpowered.\nHow to fix: Power-cycle the charger and verify the wiring.".to_string();
        }
        return format!(
            "What happened: Could not open the I2C device ({hw}).\nLikely causes: Wrong --bus, missing i2c-dev module, or insufficient permissions.\nHow to fix: Check that /dev/i2c-N exists and that the user is in the i2c group."
        );
    }

    // String-based heuristics for errors coming from init
    let msg = err.to_string();
    let lower = msg.to_ascii_lowercase();

    if lower.contains("soc curve csv must have headers") {
        return "Invalid headers in SoC curve CSV. Expected 'mv,soc'.".to_string();
    }

    if lower.contains("signal handler") {
        return format!(
            "What happened: Could not install the shutdown handler ({msg}).\nHow to fix: Re-run; if it persists, report the platform."
        );
    }

    // Generic fallback
    let mut cause = String::new();
    if let Some(src) = err.source() {
        cause = format!(" Cause: {src}");
    }
    format!(
        "Something went wrong.{cause}\nHow to fix: Re-run with --log-level=debug for details. Original: {msg}"
    )
}

/// Stable exit codes: 2 configuration, 3 transport, 4 timeout, 1 anything else.
pub fn exit_code_for_error(err: &eyre::Report) -> i32 {
    if let Some(ce) = err.downcast_ref::<ChargerError>() {
        return match ce {
            ChargerError::Config(_) => 2,
            ChargerError::Transport { .. } => 3,
            ChargerError::Timeout { .. } => 4,
            ChargerError::Io(_) => 1,
        };
    }
    if let Some(hw) = err.downcast_ref::<HwError>() {
        return if matches!(hw, HwError::Timeout) { 4 } else { 3 };
    }
    1
}

fn reason_name(err: &eyre::Report) -> &'static str {
    match err.downcast_ref::<ChargerError>() {
        Some(ChargerError::Config(_)) => "Config",
        Some(ChargerError::Transport { .. }) => "Transport",
        Some(ChargerError::Timeout { .. }) => "Timeout",
        Some(ChargerError::Io(_)) => "Io",
        None if err.downcast_ref::<HwError>().is_some() => "Open",
        None => "Error",
    }
}

/// Structured JSON for errors when JSON output is enabled.
pub fn format_error_json(err: &eyre::Report) -> String {
    use serde_json::json;

    let msg = humanize(err);
    let reg = err
        .downcast_ref::<ChargerError>()
        .and_then(ChargerError::register);
    let obj = match reg {
        Some(r) => json!({
            "reason": reason_name(err),
            "register": format!("0x{r:02X}"),
            "message": msg,
        }),
        None => json!({ "reason": reason_name(err), "message": msg }),
    };
    obj.to_string()
}
