//! Time-window selectors: preset lookbacks and custom calendar ranges.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::ValidationError;

/// Fixed set of named lookback windows understood by the history service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Preset {
    /// Seven calendar days.
    #[default]
    D7,
    /// One month.
    M1,
    /// Three months.
    M3,
    /// Six months.
    M6,
    /// One year.
    Y1,
    /// Two years.
    Y2,
    /// Five years.
    Y5,
}

impl Preset {
    /// Every preset, shortest first.
    pub const ALL: [Self; 7] = [
        Self::D7,
        Self::M1,
        Self::M3,
        Self::M6,
        Self::Y1,
        Self::Y2,
        Self::Y5,
    ];

    /// Wire code sent as the `period` query parameter.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::D7 => "7d",
            Self::M1 => "1mo",
            Self::M3 => "3mo",
            Self::M6 => "6mo",
            Self::Y1 => "1y",
            Self::Y2 => "2y",
            Self::Y5 => "5y",
        }
    }

    /// Label shown on the period buttons.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::D7 => "7 Days",
            Self::M1 => "1 Month",
            Self::M3 => "3 Months",
            Self::M6 => "6 Months",
            Self::Y1 => "1 Year",
            Self::Y2 => "2 Years",
            Self::Y5 => "5 Years",
        }
    }
}

impl fmt::Display for Preset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Preset {
    type Err = ValidationError;

    /// Accepts wire codes (`3mo`) and the dashboard's legacy labels (`3M`).
    /// Matching is case-insensitive except that a bare `m` suffix means months.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let t = s.trim();
        let p = match t.to_ascii_lowercase().as_str() {
            "7d" => Self::D7,
            "1mo" => Self::M1,
            "3mo" => Self::M3,
            "6mo" => Self::M6,
            "1y" => Self::Y1,
            "2y" => Self::Y2,
            "5y" => Self::Y5,
            // Lower-case "1m" is a minute interval in most feeds.
            "1m" if t.ends_with('M') => Self::M1,
            "3m" if t.ends_with('M') => Self::M3,
            "6m" if t.ends_with('M') => Self::M6,
            _ => return Err(ValidationError::UnknownPeriod(t.to_string())),
        };
        Ok(p)
    }
}

impl TryFrom<String> for Preset {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Preset> for String {
    fn from(p: Preset) -> Self {
        p.code().to_string()
    }
}

/// Inclusive calendar range with `start <= end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawDateRange")]
pub struct DateRange {
    start: NaiveDate,
    end: NaiveDate,
}

#[derive(Deserialize)]
struct RawDateRange {
    start: NaiveDate,
    end: NaiveDate,
}

impl TryFrom<RawDateRange> for DateRange {
    type Error = ValidationError;

    fn try_from(raw: RawDateRange) -> Result<Self, Self::Error> {
        Self::new(raw.start, raw.end)
    }
}

impl DateRange {
    /// Build a range, rejecting `start > end`.
    ///
    /// # Errors
    /// `InvertedRange` when the dates are swapped.
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, ValidationError> {
        if start > end {
            return Err(ValidationError::InvertedRange { start, end });
        }
        Ok(Self { start, end })
    }

    /// First day.
    #[must_use]
    pub const fn start(&self) -> NaiveDate {
        self.start
    }

    /// Last day.
    #[must_use]
    pub const fn end(&self) -> NaiveDate {
        self.end
    }
}

/// Which window of history a query covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum PeriodSelector {
    /// A named lookback window.
    Preset {
        /// The lookback code.
        preset: Preset,
    },
    /// Explicit start/end calendar dates.
    Custom {
        /// The committed range.
        range: DateRange,
    },
}

impl PeriodSelector {
    /// Short tag used in filenames and log fields: the preset code or `custom`.
    #[must_use]
    pub const fn tag(&self) -> &'static str {
        match self {
            Self::Preset { preset } => preset.code(),
            Self::Custom { .. } => "custom",
        }
    }
}

impl From<Preset> for PeriodSelector {
    fn from(preset: Preset) -> Self {
        Self::Preset { preset }
    }
}

impl From<DateRange> for PeriodSelector {
    fn from(range: DateRange) -> Self {
        Self::Custom { range }
    }
}
