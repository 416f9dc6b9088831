use charger_config::{Config, WordOrderCfg, load_toml};
use rstest::rstest;
use std::path::PathBuf;

#[test]
fn parses_full_document() {
    let toml = r#"
[device]
bus = 1
addr = 0x6A
word_order = "native"

[adc]
ensure_on = false
settle_ms = 120

[daemon]
interval_sec = 30
status_path = "/tmp/charger/status.json"
direction_deadband_ma = 80

[logging]
file = "/var/log/charger.log"
level = "debug"
rotation = "daily"

[soc]
curve_csv = "/etc/charger/lfp.csv"
"#;

    let cfg = load_toml(toml).expect("parse TOML");
    cfg.validate().expect("valid config should pass");
    assert_eq!(cfg.device.bus, 1);
    assert_eq!(cfg.device.addr, 0x6A);
    assert_eq!(cfg.device.word_order, WordOrderCfg::Native);
    assert!(!cfg.adc.ensure_on);
    assert_eq!(cfg.adc.settle_ms, 120);
    assert_eq!(cfg.daemon.interval_sec, 30);
    assert_eq!(
        cfg.daemon.status_path,
        PathBuf::from("/tmp/charger/status.json")
    );
    assert_eq!(cfg.daemon.direction_deadband_ma, 80);
    assert_eq!(cfg.logging.rotation.as_deref(), Some("daily"));
    assert_eq!(
        cfg.soc.curve_csv,
        Some(PathBuf::from("/etc/charger/lfp.csv"))
    );
}

#[test]
fn partial_sections_keep_defaults() {
    let cfg = load_toml("[daemon]\ninterval_sec = 5\n").expect("parse TOML");
    cfg.validate().unwrap();
    assert_eq!(cfg.daemon.interval_sec, 5);
    assert_eq!(cfg.daemon.direction_deadband_ma, 50);
    assert_eq!(cfg.device.addr, 0x6B);
}

#[rstest]
#[case("[device]\naddr = 0x80\n", "device.addr must be a 7-bit address")]
#[case("[device]\naddr = 3\n", "device.addr must be a 7-bit address")]
#[case("[adc]\nsettle_ms = 60000\n", "adc.settle_ms is unreasonably large")]
#[case("[daemon]\ninterval_sec = 0\n", "daemon.interval_sec must be >= 1")]
#[case("[daemon]\ninterval_sec = 172800\n", "daemon.interval_sec is unreasonably large")]
#[case("[daemon]\nstatus_path = \"\"\n", "daemon.status_path must not be empty")]
#[case("[daemon]\ndirection_deadband_ma = -1\n", "direction_deadband_ma must be in [0, 5000]")]
#[case("[logging]\nlevel = \"loud\"\n", "logging.level must be one of")]
#[case("[logging]\nrotation = \"weekly\"\n", "logging.rotation must be one of")]
#[case("[soc]\ncurve_csv = \"\"\n", "soc.curve_csv must not be empty")]
fn rejects_out_of_range_values(#[case] toml: &str, #[case] needle: &str) {
    let cfg = load_toml(toml).expect("parse TOML");
    let err = cfg.validate().expect_err("should reject");
    assert!(format!("{err}").contains(needle), "got: {err}");
}

#[test]
fn unknown_word_order_is_a_parse_error() {
    let err = load_toml("[device]\nword_order = \"middle\"\n").expect_err("should not parse");
    assert!(format!("{err}").contains("word_order") || format!("{err}").contains("variant"));
}

#[test]
fn log_level_is_case_insensitive() {
    let cfg = load_toml("[logging]\nlevel = \"WARN\"\nrotation = \"Hourly\"\n").unwrap();
    cfg.validate().unwrap();
}

#[rstest]
#[case("[device]\naddr = 0x6A\n", true)]
#[case("[device]\naddr = 0x03\n", false)]
#[case("", true)]
fn direct_toml_deserialize_then_validate(#[case] doc: &str, #[case] ok: bool) {
    let cfg: Config = toml::from_str(doc).expect("well-formed TOML");
    assert_eq!(cfg.validate().is_ok(), ok);
}
