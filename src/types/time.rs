//! Calendar types for monthly climate time axes.
//!
//! Model output and emission inventories are monthly. A [`YearMonth`]
//! identifies one calendar month; [`Season`] groups months into the
//! standard climatological seasons; [`Calendar`] decodes numeric
//! "days since" time axes for both real-world and 365-day model calendars.

use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, Duration, NaiveDate};

/// Days in each calendar month for a non-leap year.
///
/// CESM-style model calendars have no leap days, so this table is exact
/// for model data and used for emission-flux normalization.
pub const DAYS_PER_MONTH: [u32; 12] = [31, 28, 31, 30, 31, 30, 31, 31, 30, 31, 30, 31];

/// Seconds in one day.
pub const SECONDS_PER_DAY: f64 = 86_400.0;

// =============================================================================
// YearMonth
// =============================================================================

/// One calendar month, e.g. `2038-07`.
///
/// Ordering is chronological. The `Display`/`FromStr` format is `YYYY-MM`,
/// matching the time column of the tabular outputs.
///
/// # Example
///
/// ```
/// use clpost_rs::types::YearMonth;
///
/// let ym: YearMonth = "2038-07".parse().unwrap();
/// assert_eq!(ym.year, 2038);
/// assert_eq!(ym.month, 7);
/// assert_eq!(ym.to_string(), "2038-07");
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct YearMonth {
    pub year: i32,
    pub month: u32,
}

impl YearMonth {
    /// Create a new year-month.
    ///
    /// # Panics
    ///
    /// Panics if `month` is outside `1..=12`.
    pub fn new(year: i32, month: u32) -> Self {
        assert!(
            (1..=12).contains(&month),
            "month must be in 1..=12, got {}",
            month
        );
        Self { year, month }
    }

    /// Days in this month (365-day calendar).
    #[inline]
    pub fn days(&self) -> u32 {
        DAYS_PER_MONTH[(self.month - 1) as usize]
    }

    /// Seconds in this month (365-day calendar).
    #[inline]
    pub fn seconds(&self) -> f64 {
        f64::from(self.days()) * SECONDS_PER_DAY
    }

    /// The climatological season this month belongs to.
    #[inline]
    pub fn season(&self) -> Season {
        Season::for_month(self.month)
    }

    /// The year this month counts toward when grouping by season.
    ///
    /// December belongs to the following year's DJF, so `2037-12` has
    /// season year 2038.
    #[inline]
    pub fn season_year(&self) -> i32 {
        if self.month == 12 {
            self.year + 1
        } else {
            self.year
        }
    }

    /// The month after this one.
    pub fn next(&self) -> Self {
        if self.month == 12 {
            Self::new(self.year + 1, 1)
        } else {
            Self::new(self.year, self.month + 1)
        }
    }
}

impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

/// Error parsing a `YYYY-MM` string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseYearMonthError(pub String);

impl fmt::Display for ParseYearMonthError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid year-month '{}', expected YYYY-MM", self.0)
    }
}

impl std::error::Error for ParseYearMonthError {}

impl FromStr for YearMonth {
    type Err = ParseYearMonthError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || ParseYearMonthError(s.to_string());
        let (y, m) = s.split_once('-').ok_or_else(err)?;
        let year: i32 = y.parse().map_err(|_| err())?;
        let month: u32 = m.parse().map_err(|_| err())?;
        if !(1..=12).contains(&month) {
            return Err(err());
        }
        Ok(Self { year, month })
    }
}

// =============================================================================
// Season
// =============================================================================

/// Climatological season (3-month grouping).
///
/// December is grouped with the *following* January and February, so a
/// DJF sample for 2038 spans 2037-12, 2038-01 and 2038-02.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Season {
    /// December, January, February.
    Djf,
    /// March, April, May.
    Mam,
    /// June, July, August.
    Jja,
    /// September, October, November.
    Son,
}

impl Season {
    /// All four seasons in annual order starting with winter.
    pub const ALL: [Season; 4] = [Season::Djf, Season::Mam, Season::Jja, Season::Son];

    /// The season a calendar month belongs to.
    ///
    /// # Panics
    ///
    /// Panics if `month` is outside `1..=12`.
    pub fn for_month(month: u32) -> Self {
        match month {
            12 | 1 | 2 => Season::Djf,
            3..=5 => Season::Mam,
            6..=8 => Season::Jja,
            9..=11 => Season::Son,
            _ => panic!("month must be in 1..=12, got {}", month),
        }
    }

    /// The three calendar months of this season.
    pub fn months(&self) -> [u32; 3] {
        match self {
            Season::Djf => [12, 1, 2],
            Season::Mam => [3, 4, 5],
            Season::Jja => [6, 7, 8],
            Season::Son => [9, 10, 11],
        }
    }

    /// Short name, e.g. "DJF".
    pub fn name(&self) -> &'static str {
        match self {
            Season::Djf => "DJF",
            Season::Mam => "MAM",
            Season::Jja => "JJA",
            Season::Son => "SON",
        }
    }

    /// Descriptive name, e.g. "Winter".
    pub fn long_name(&self) -> &'static str {
        match self {
            Season::Djf => "Winter",
            Season::Mam => "Spring",
            Season::Jja => "Summer",
            Season::Son => "Autumn",
        }
    }
}

impl fmt::Display for Season {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// =============================================================================
// Calendar
// =============================================================================

/// Model calendar used to decode a numeric "days since" time axis.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Calendar {
    /// Real-world proleptic Gregorian calendar.
    Standard,
    /// 365-day calendar without leap days (CESM `noleap`).
    NoLeap,
}

impl Calendar {
    /// Map a NetCDF `calendar` attribute to a calendar.
    ///
    /// Unknown values fall back to [`Calendar::Standard`].
    pub fn from_attribute(value: &str) -> Self {
        match value.to_ascii_lowercase().as_str() {
            "noleap" | "365_day" => Self::NoLeap,
            _ => Self::Standard,
        }
    }

    /// Decode a day offset from an origin date into the containing month.
    ///
    /// `origin` is the `(year, month, day)` from a `days since Y-M-D`
    /// units string. Fractional days are truncated; monthly data never
    /// needs sub-day resolution.
    pub fn decode_days(&self, origin: (i32, u32, u32), days: f64) -> YearMonth {
        let whole = days.floor() as i64;
        match self {
            Calendar::Standard => {
                let base = NaiveDate::from_ymd_opt(origin.0, origin.1, origin.2)
                    .unwrap_or_else(|| {
                        panic!("invalid time origin {}-{}-{}", origin.0, origin.1, origin.2)
                    });
                let date = base + Duration::days(whole);
                YearMonth::new(date.year(), date.month())
            }
            Calendar::NoLeap => {
                // Day index from year 0 in a 365-day calendar.
                let origin_doy = cumulative_days_before(origin.1) as i64 + i64::from(origin.2) - 1;
                let total = i64::from(origin.0) * 365 + origin_doy + whole;
                let year = total.div_euclid(365);
                let mut doy = total.rem_euclid(365);
                let mut month = 12;
                for (i, &len) in DAYS_PER_MONTH.iter().enumerate() {
                    if doy < i64::from(len) {
                        month = i as u32 + 1;
                        break;
                    }
                    doy -= i64::from(len);
                }
                YearMonth::new(year as i32, month)
            }
        }
    }
}

/// Days before the first of `month` in a 365-day year.
fn cumulative_days_before(month: u32) -> u32 {
    DAYS_PER_MONTH[..(month - 1) as usize].iter().sum()
}
