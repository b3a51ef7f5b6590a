//! Load and validate the run settings (TOML). Validation happens here, before any
//! pipeline thread exists; a run never starts on invalid settings.

use chrono::{DateTime, NaiveDate, Utc};
use regex::{Regex, RegexBuilder};
use serde::Deserialize;
use std::fmt;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::types::{Holiday, HolidayError, start_of_day};
use crate::utils::config::DATE_FORMAT;

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("could not read settings file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("settings parse error: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("no ip fragment found in settings")]
    EmptyIpFragment,
    #[error("no sender pattern found in settings")]
    EmptySenderPattern,
    #[error("invalid sender pattern: {0}")]
    InvalidSenderPattern(#[from] regex::Error),
    #[error("holiday {index}: {source}")]
    HolidayOrder {
        index: usize,
        #[source]
        source: HolidayError,
    },
}

/// On-disk shape of the settings file.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct SettingsFile {
    report_start: NaiveDate,
    report_end: NaiveDate,
    #[serde(default)]
    received_ip_fragment: String,
    #[serde(default)]
    valid_sender_regexp: String,
    #[serde(default)]
    holidays: Vec<HolidayEntry>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct HolidayEntry {
    start: NaiveDate,
    end: NaiveDate,
}

/// Validated filter parameters.
#[derive(Clone, Debug)]
pub struct Settings {
    pub report_start: DateTime<Utc>,
    pub report_end: DateTime<Utc>,
    pub received_ip_fragment: String,
    /// Compiled case-insensitive.
    pub valid_sender: Regex,
    pub holidays: Vec<Holiday>,
}

impl Settings {
    /// Parse and validate settings from TOML text.
    pub fn from_toml_str(s: &str) -> Result<Self, SettingsError> {
        let file: SettingsFile = toml::from_str(s)?;
        Self::validate(file)
    }

    /// Read, parse and validate the settings file at `path`.
    pub fn load(path: &Path) -> Result<Self, SettingsError> {
        let s = std::fs::read_to_string(path).map_err(|source| SettingsError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&s)
    }

    fn validate(file: SettingsFile) -> Result<Self, SettingsError> {
        if file.received_ip_fragment.is_empty() {
            return Err(SettingsError::EmptyIpFragment);
        }
        if file.valid_sender_regexp.is_empty() {
            return Err(SettingsError::EmptySenderPattern);
        }
        let valid_sender = RegexBuilder::new(&file.valid_sender_regexp)
            .case_insensitive(true)
            .build()?;
        let holidays = file
            .holidays
            .iter()
            .enumerate()
            .map(|(index, h)| {
                Holiday::from_dates(h.start, h.end)
                    .map_err(|source| SettingsError::HolidayOrder { index, source })
            })
            .collect::<Result<Vec<_>, _>>()?;
        if file.report_end <= file.report_start {
            log::warn!(
                "report window {} .. {} is empty; every record will be outside the date range",
                file.report_start,
                file.report_end
            );
        }
        Ok(Self {
            report_start: start_of_day(file.report_start),
            report_end: start_of_day(file.report_end),
            received_ip_fragment: file.received_ip_fragment,
            valid_sender,
            holidays,
        })
    }
}

impl fmt::Display for Settings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f)?;
        writeln!(
            f,
            "ReportStart        {}",
            self.report_start.format(DATE_FORMAT)
        )?;
        writeln!(f, "ReportEnd          {}", self.report_end.format(DATE_FORMAT))?;
        writeln!(f, "ReceivedIPFragment {}", self.received_ip_fragment)?;
        writeln!(f, "ValidSenderRegexp  {}", self.valid_sender.as_str())?;
        for h in &self.holidays {
            writeln!(f, "   {}", h)?;
        }
        Ok(())
    }
}
