//! Settings loading and validation.

use chrono::{TimeZone, Utc};
use mboxfilter::utils::{Settings, SettingsError};

const OK: &str = r#"
report_start = "2022-01-01"
report_end = "2023-03-12"
received_ip_fragment = "10.1.99."
valid_sender_regexp = "(this|that|another.com)"

[[holidays]]
start = "2022-02-21"
end = "2022-02-22"

[[holidays]]
start = "2022-02-25"
end = "2022-02-27"
"#;

#[test]
fn test_settings_ok() {
    let s = Settings::from_toml_str(OK).unwrap();
    assert_eq!(s.received_ip_fragment, "10.1.99.");
    assert_eq!(s.report_start, Utc.with_ymd_and_hms(2022, 1, 1, 0, 0, 0).unwrap());
    assert_eq!(s.report_end, Utc.with_ymd_and_hms(2023, 3, 12, 0, 0, 0).unwrap());
    assert_eq!(s.holidays.len(), 2);
    assert_eq!(s.holidays[1].to_string(), "2022-02-25 : 2022-02-27");
}

#[test]
fn test_sender_pattern_compiled_case_insensitive() {
    let s = Settings::from_toml_str(OK).unwrap();
    assert!(s.valid_sender.is_match("someone@ANOTHER.COM"));
    assert!(!s.valid_sender.is_match("someone@elsewhere.org"));
}

#[test]
fn test_missing_ip_fragment() {
    let text = OK.replace("received_ip_fragment = \"10.1.99.\"", "");
    assert!(matches!(
        Settings::from_toml_str(&text),
        Err(SettingsError::EmptyIpFragment)
    ));
}

#[test]
fn test_empty_sender_pattern() {
    let text = OK.replace("(this|that|another.com)", "");
    assert!(matches!(
        Settings::from_toml_str(&text),
        Err(SettingsError::EmptySenderPattern)
    ));
}

#[test]
fn test_invalid_sender_pattern() {
    let text = OK.replace("(this|that|another.com)", "(unclosed");
    assert!(matches!(
        Settings::from_toml_str(&text),
        Err(SettingsError::InvalidSenderPattern(_))
    ));
}

#[test]
fn test_holiday_start_after_end() {
    let text = OK.replace("2022-02-21", "2022-02-23");
    match Settings::from_toml_str(&text) {
        Err(SettingsError::HolidayOrder { index, .. }) => assert_eq!(index, 0),
        other => panic!("expected holiday order error, got {other:?}"),
    }
}

#[test]
fn test_bad_date_is_parse_error() {
    let text = OK.replace("2022-01-01", "2022-13-01");
    assert!(matches!(
        Settings::from_toml_str(&text),
        Err(SettingsError::Parse(_))
    ));
}

#[test]
fn test_unknown_key_is_rejected() {
    let text = format!("{OK}\nextra = 1\n");
    // unknown keys after a table header land in the last holiday entry; both are rejected
    assert!(Settings::from_toml_str(&text).is_err());
}

#[test]
fn test_load_from_file() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("mboxfilter.toml");
    std::fs::write(&path, OK)?;
    let s = Settings::load(&path)?;
    assert_eq!(s.holidays.len(), 2);

    let missing = dir.path().join("nope.toml");
    assert!(matches!(
        Settings::load(&missing),
        Err(SettingsError::Read { .. })
    ));
    Ok(())
}

#[test]
fn test_display_lists_parameters() {
    let s = Settings::from_toml_str(OK).unwrap().to_string();
    assert!(s.contains("ReportStart        2022-01-01"));
    assert!(s.contains("ReceivedIPFragment 10.1.99."));
    assert!(s.contains("   2022-02-21 : 2022-02-22"));
}
