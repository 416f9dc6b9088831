use assert_cmd::prelude::*;
use rstest::rstest;
use serde_json::Value;
use std::fs;
use std::process::Command;
use tempfile::tempdir;

fn bqctl() -> Command {
    let mut cmd = Command::cargo_bin("bqctl").unwrap();
    for var in [
        "BQ_I2C_BUS",
        "BQ_I2C_ADDR",
        "BQ_INTERVAL_SEC",
        "BQ_STATUS_PATH",
        "CHARGER_SIM_FAIL",
        "CHARGER_SIM_TIMEOUT",
        "CHARGER_SIM_VBAT_MV",
        "CHARGER_SIM_IBAT_MA",
        "RUST_LOG",
    ] {
        cmd.env_remove(var);
    }
    cmd.arg("--log-level").arg("error");
    cmd
}

const DAEMON_KEYS: [&str; 31] = [
    "ts_ms",
    "bus",
    "addr",
    "vbus_present",
    "ac1_present",
    "ac2_present",
    "pg",
    "iindpm",
    "vindpm",
    "watchdog_expired",
    "poor_source",
    "chg_stat",
    "chg_stat_str",
    "vbus_stat",
    "vbus_stat_str",
    "bc12_done",
    "fault_any",
    "fault0",
    "fault1",
    "vbat_mv",
    "vsys_mv",
    "vbus_mv",
    "ibat_ma",
    "ibus_ma",
    "tdie_c",
    "cell_count",
    "direction",
    "soc_pct",
    "soc_raw",
    "soc_filt",
    "missing",
];

/// Validate the single JSON object printed by `status --json`.
#[rstest]
fn status_json_schema() {
    let out = bqctl()
        .arg("status")
        .arg("--json")
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let stdout = String::from_utf8_lossy(&out);
    let v: Value = serde_json::from_str(stdout.trim()).expect("valid JSON");

    assert_eq!(v["pg"], true);
    assert_eq!(v["vbus_present"], true);
    assert_eq!(v["chg_stat"], 3);
    assert_eq!(v["chg_stat_str"], "Fast charge (CC)");
    assert_eq!(v["vbus_stat"], 3);
    assert_eq!(v["vbus_stat_str"], "USB DCP (3.25A)");
    assert_eq!(v["bc12_done"], true);
    assert_eq!(v["cell_count"], 2);
    assert_eq!(v["vbat_mv"], 7600);
    assert_eq!(v["ibat_ma"], 1200);
    assert_eq!(v["tdie_c"], 35.5);
    assert_eq!(v["soc_pct_est"], 60);
    assert_eq!(v["fault_any"], false);
    assert!(v["missing"].as_array().is_some_and(Vec::is_empty));
}

#[rstest]
fn status_json_error_is_structured() {
    let out = bqctl()
        .env("CHARGER_SIM_FAIL", "0x1b")
        .arg("status")
        .arg("--json")
        .assert()
        .code(3)
        .get_output()
        .stderr
        .clone();
    let stderr = String::from_utf8_lossy(&out);
    let line = stderr
        .lines()
        .find(|l| l.contains("\"reason\""))
        .unwrap_or("")
        .to_string();
    assert!(!line.is_empty(), "no JSON error on stderr: {stderr}");
    let v: Value = serde_json::from_str(&line).expect("valid JSON");
    assert_eq!(v["reason"], "Transport");
    assert_eq!(v["register"], "0x1B");
}

/// One daemon cycle writes the full record atomically.
#[rstest]
fn daemon_writes_status_file() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("run").join("status.json");

    bqctl()
        .env("CHARGER_SIM_IBAT_MA", "-900")
        .arg("daemon")
        .arg("--cycles")
        .arg("1")
        .arg("--status-path")
        .arg(&path)
        .assert()
        .success();

    let text = fs::read_to_string(&path).expect("status file written");
    assert!(text.ends_with('\n'));
    assert!(!path.with_extension("json.tmp").exists());
    let v: Value = serde_json::from_str(text.trim()).expect("valid JSON");
    for key in DAEMON_KEYS {
        assert!(v.get(key).is_some(), "missing key {key}");
    }
    assert_eq!(v.as_object().map(|m| m.len()), Some(DAEMON_KEYS.len()));

    assert_eq!(v["bus"], 10);
    assert_eq!(v["addr"], "0x6b");
    assert_eq!(v["direction"], "discharging");
    assert_eq!(v["ibat_ma"], -900);
    // First cycle seeds the filter with the raw estimate
    assert_eq!(v["soc_raw"], 60);
    assert_eq!(v["soc_pct"], 60);
    assert_eq!(v["soc_filt"], 60.0);
    assert!(v["ts_ms"].as_u64().is_some_and(|t| t > 0));
}

#[rstest]
fn daemon_path_and_interval_from_env() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("env-status.json");

    bqctl()
        .env("BQ_STATUS_PATH", &path)
        .env("BQ_INTERVAL_SEC", "1")
        .arg("daemon")
        .arg("--cycles")
        .arg("1")
        .assert()
        .success();
    assert!(path.exists());
}

#[rstest]
fn daemon_continues_past_failed_cycles() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("status.json");

    bqctl()
        .env("CHARGER_SIM_FAIL", "status")
        .arg("daemon")
        .arg("--cycles")
        .arg("2")
        .arg("--interval-sec")
        .arg("1")
        .arg("--status-path")
        .arg(&path)
        .assert()
        .success();
    assert!(!path.exists());
}

#[rstest]
fn daemon_fails_fast_when_status_dir_cannot_exist() {
    let dir = tempdir().unwrap();
    let blocker = dir.path().join("not-a-dir");
    fs::write(&blocker, "x").unwrap();
    let path = blocker.join("status.json");

    let out = bqctl()
        .arg("--log-json")
        .arg("daemon")
        .arg("--cycles")
        .arg("1")
        .arg("--status-path")
        .arg(&path)
        .assert()
        .code(1)
        .get_output()
        .stderr
        .clone();
    let stderr = String::from_utf8_lossy(&out);
    let line = stderr
        .lines()
        .find(|l| l.contains("\"reason\""))
        .unwrap_or("")
        .to_string();
    let v: Value = serde_json::from_str(&line).expect("valid JSON error");
    assert_eq!(v["reason"], "Io");
    assert!(v.get("register").is_none());
    assert!(v["message"].as_str().is_some_and(|m| m.contains("I/O error")));
}

#[rstest]
fn daemon_rejects_zero_interval() {
    bqctl()
        .arg("daemon")
        .arg("--interval-sec")
        .arg("0")
        .arg("--cycles")
        .arg("1")
        .assert()
        .code(2);
}
