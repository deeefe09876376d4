//! Coercion configuration
//!
//! - [`FormatPolicy`]: ordered temporal formats, ISO-8601 first
//! - [`SessionTimeZone`]: zone used to anchor naive values on write
//! - [`DateOverrideZone`]: whether DATE columns with a date-time override are
//!   anchored like TIMESTAMP columns
//! - [`LobConfig`]: LOB streaming limits

use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

use chrono::{DateTime, FixedOffset, Local, NaiveDateTime, Offset, TimeZone, Utc};

use crate::constants::DEFAULT_MAX_LOB_CHUNK_SIZE;
use crate::error::{Error, Result};
use crate::parser::translate_nls;

/// ISO-8601 calendar date pattern
pub const ISO_DATE_FORMAT: &str = "%Y-%m-%d";

/// ISO-8601 date-time pattern (space separated, optional fraction)
pub const ISO_DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.f";

static GLOBAL_POLICY: OnceLock<FormatPolicy> = OnceLock::new();

/// A pair of chrono patterns describing one textual temporal format
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemporalFormat {
    /// Name used in logs ("iso", the NLS model, ...)
    pub name: String,
    /// Pattern for calendar dates
    pub date: String,
    /// Pattern for date-times
    pub datetime: String,
}

impl TemporalFormat {
    /// Create a format from chrono patterns
    pub fn new(
        name: impl Into<String>,
        date: impl Into<String>,
        datetime: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            date: date.into(),
            datetime: datetime.into(),
        }
    }

    /// The ISO-8601 format
    pub fn iso() -> Self {
        Self::new("iso", ISO_DATE_FORMAT, ISO_DATETIME_FORMAT)
    }

    /// Build a format from Oracle NLS format models
    ///
    /// ```rust
    /// use oracle_coerce::config::TemporalFormat;
    ///
    /// let fmt = TemporalFormat::nls("DD.MM.YYYY", "DD.MM.YYYY HH24:MI:SS").unwrap();
    /// assert_eq!(fmt.date, "%d.%m.%Y");
    /// assert_eq!(fmt.datetime, "%d.%m.%Y %H:%M:%S");
    /// ```
    pub fn nls(date_model: &str, datetime_model: &str) -> Result<Self> {
        Ok(Self::new(
            datetime_model,
            translate_nls(date_model)?,
            translate_nls(datetime_model)?,
        ))
    }

    /// Check whether this is the built-in ISO format
    pub fn is_iso(&self) -> bool {
        self.date == ISO_DATE_FORMAT && self.datetime == ISO_DATETIME_FORMAT
    }
}

/// Ordered list of candidate temporal formats
///
/// ISO-8601 is always the first candidate. Additional formats are tried in the
/// order they were added and the first match wins, so the order is part of
/// the parsing contract.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormatPolicy {
    formats: Vec<TemporalFormat>,
}

impl FormatPolicy {
    /// Policy that only accepts ISO-8601
    pub fn iso() -> Self {
        Self {
            formats: vec![TemporalFormat::iso()],
        }
    }

    /// Append a format after the ones already configured
    pub fn with_format(mut self, format: TemporalFormat) -> Self {
        if !format.is_iso() {
            self.formats.push(format);
        }
        self
    }

    /// Append a format given as Oracle NLS format models
    pub fn with_nls(self, date_model: &str, datetime_model: &str) -> Result<Self> {
        Ok(self.with_format(TemporalFormat::nls(date_model, datetime_model)?))
    }

    /// Candidate formats in matching order
    pub fn formats(&self) -> &[TemporalFormat] {
        &self.formats
    }

    /// Install this policy as the process-wide policy
    ///
    /// Can only succeed once, and only before [`FormatPolicy::global`] has
    /// been consulted.
    pub fn install(self) -> Result<()> {
        let names: Vec<String> = self.formats.iter().map(|f| f.name.clone()).collect();
        GLOBAL_POLICY.set(self).map_err(|_| {
            Error::InvalidConfig("a format policy is already installed".to_string())
        })?;
        tracing::debug!(formats = ?names, "Installed process-wide format policy");
        Ok(())
    }

    /// The process-wide policy, ISO-only unless one was installed
    pub fn global() -> &'static FormatPolicy {
        GLOBAL_POLICY.get_or_init(FormatPolicy::iso)
    }
}

impl Default for FormatPolicy {
    fn default() -> Self {
        Self::iso()
    }
}

/// Session time zone used to anchor naive values on write
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionTimeZone {
    /// Coordinated Universal Time
    #[default]
    Utc,
    /// The host's local time zone
    Local,
}

impl SessionTimeZone {
    /// Attach this zone's offset to a wall-clock value
    ///
    /// For `Local`, ambiguous wall-clock times resolve to the earlier instant;
    /// times skipped by a DST transition are rejected.
    pub fn anchor(&self, naive: &NaiveDateTime) -> Result<DateTime<FixedOffset>> {
        match self {
            SessionTimeZone::Utc => Ok(Utc.from_utc_datetime(naive).fixed_offset()),
            SessionTimeZone::Local => Local
                .from_local_datetime(naive)
                .earliest()
                .map(|dt| dt.fixed_offset())
                .ok_or_else(|| {
                    Error::DataConversionError(format!(
                        "{} does not exist in the local time zone",
                        naive
                    ))
                }),
        }
    }

    /// Convert an instant into this zone
    pub fn convert(&self, instant: &DateTime<FixedOffset>) -> DateTime<FixedOffset> {
        match self {
            SessionTimeZone::Utc => instant.with_timezone(&Utc).fixed_offset(),
            SessionTimeZone::Local => instant.with_timezone(&Local).fixed_offset(),
        }
    }

    /// Offset of this zone at the given instant
    pub fn offset_at(&self, instant: &DateTime<FixedOffset>) -> FixedOffset {
        self.convert(instant).offset().fix()
    }
}

impl FromStr for SessionTimeZone {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().trim_start_matches(':').to_ascii_lowercase().as_str() {
            "utc" => Ok(SessionTimeZone::Utc),
            "local" => Ok(SessionTimeZone::Local),
            other => Err(Error::InvalidConfig(format!(
                "unknown session time zone {:?} (expected utc or local)",
                other
            ))),
        }
    }
}

impl fmt::Display for SessionTimeZone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionTimeZone::Utc => write!(f, "utc"),
            SessionTimeZone::Local => write!(f, "local"),
        }
    }
}

/// Time-zone treatment of DATE columns overridden to a date-time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DateOverrideZone {
    /// Anchor exactly like a TIMESTAMP column
    #[default]
    Session,
    /// Store the written wall-clock digits, dropping any offset
    WallClock,
}

/// Settings that stay fixed for the lifetime of a coercion setup
#[derive(Debug, Clone, Default)]
pub struct CoercionConfig {
    /// Treatment of DATE columns with a date-time override
    pub date_override_zone: DateOverrideZone,
}

impl CoercionConfig {
    /// Create the default configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the DATE override zone treatment
    pub fn date_override_zone(mut self, zone: DateOverrideZone) -> Self {
        self.date_override_zone = zone;
        self
    }
}

/// LOB streaming limits
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LobConfig {
    /// Upper bound on the size of one streamed chunk, in bytes for BLOBs and
    /// characters for CLOBs
    pub max_chunk_size: u32,
}

impl LobConfig {
    /// Create the default configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the maximum chunk size
    pub fn max_chunk_size(mut self, size: u32) -> Self {
        self.max_chunk_size = size.max(1);
        self
    }
}

impl Default for LobConfig {
    fn default() -> Self {
        Self {
            max_chunk_size: DEFAULT_MAX_LOB_CHUNK_SIZE,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_policy_keeps_iso_first() {
        let policy = FormatPolicy::iso()
            .with_nls("DD.MM.YYYY", "DD.MM.YYYY HH24:MI:SS")
            .unwrap()
            .with_format(TemporalFormat::iso());

        assert_eq!(policy.formats().len(), 2);
        assert!(policy.formats()[0].is_iso());
        assert_eq!(policy.formats()[1].date, "%d.%m.%Y");
    }

    #[test]
    fn test_session_time_zone_from_str() {
        assert_eq!("utc".parse::<SessionTimeZone>().unwrap(), SessionTimeZone::Utc);
        assert_eq!(":local".parse::<SessionTimeZone>().unwrap(), SessionTimeZone::Local);
        assert_eq!("UTC".parse::<SessionTimeZone>().unwrap(), SessionTimeZone::Utc);
        assert!("berlin".parse::<SessionTimeZone>().is_err());
    }

    #[test]
    fn test_utc_anchor_and_convert() {
        let naive = NaiveDate::from_ymd_opt(2008, 6, 28)
            .unwrap()
            .and_hms_opt(13, 34, 33)
            .unwrap();
        let anchored = SessionTimeZone::Utc.anchor(&naive).unwrap();
        assert_eq!(anchored.naive_local(), naive);
        assert_eq!(anchored.offset().local_minus_utc(), 0);

        let plus_five = FixedOffset::east_opt(5 * 3600)
            .unwrap()
            .from_local_datetime(&naive)
            .unwrap();
        let converted = SessionTimeZone::Utc.convert(&plus_five);
        assert_eq!(converted, plus_five);
        assert_eq!(converted.naive_local().to_string(), "2008-06-28 08:34:33");
    }

    #[test]
    fn test_lob_config_minimum_chunk() {
        assert_eq!(LobConfig::new().max_chunk_size(0).max_chunk_size, 1);
        assert_eq!(LobConfig::default().max_chunk_size, DEFAULT_MAX_LOB_CHUNK_SIZE);
    }
}
