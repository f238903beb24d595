//! Date normalization and due-date arithmetic
//!
//! Source systems report dates in several textual shapes. Everything is
//! funnelled through [`normalize_date`], which is total: it never fails and
//! returns [`NormalizedDate::Invalid`] for anything it cannot read.

use std::fmt;

use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, NaiveTime};

use crate::NOT_AVAILABLE;

const SECONDS_PER_DAY: i64 = 86_400;

/// Date-time shapes accepted by the general parser
const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y/%m/%d %H:%M:%S",
];

/// Date-only shapes accepted by the general parser
const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%m/%d/%Y",
    "%d %b %Y",
    "%d %B %Y",
    "%b %d, %Y",
    "%B %d, %Y",
    "%b %d %Y",
];

/// A comparable calendar instant, or the invalid marker
///
/// The derived ordering places every valid instant before `Invalid`, and two
/// `Invalid` values compare equal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum NormalizedDate {
    Valid(NaiveDateTime),
    Invalid,
}

impl NormalizedDate {
    pub fn is_valid(&self) -> bool {
        matches!(self, NormalizedDate::Valid(_))
    }

    /// The instant, if valid
    pub fn instant(&self) -> Option<NaiveDateTime> {
        match self {
            NormalizedDate::Valid(dt) => Some(*dt),
            NormalizedDate::Invalid => None,
        }
    }

    /// Calendar day of the instant, if valid
    pub fn date(&self) -> Option<NaiveDate> {
        self.instant().map(|dt| dt.date())
    }
}

/// Normalize a date-like display string into a comparable instant.
///
/// Recognized shapes:
/// - `D-M-YYYY` / `DD-MM-YYYY` (day first, dash separated): reordered to
///   year-month-day before parsing
/// - ISO `YYYY-MM-DD`, ISO date-times, RFC 3339 and a handful of common
///   textual forms
///
/// Empty input, the `"N/A"` sentinel and anything unparseable yield
/// [`NormalizedDate::Invalid`].
///
/// # Examples
/// ```
/// use chrono::NaiveDate;
/// use jobtrack_common::dates::normalize_date;
///
/// let a = normalize_date("05-03-2024");
/// let b = normalize_date("2024-03-05");
/// assert_eq!(a, b);
/// assert_eq!(a.date(), NaiveDate::from_ymd_opt(2024, 3, 5));
///
/// assert!(!normalize_date("N/A").is_valid());
/// assert!(!normalize_date("soon").is_valid());
/// ```
pub fn normalize_date(raw: &str) -> NormalizedDate {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed == NOT_AVAILABLE {
        return NormalizedDate::Invalid;
    }

    let candidate = match reorder_day_month_year(trimmed) {
        Some(reordered) => reordered,
        None => trimmed.to_string(),
    };

    match parse_general(&candidate) {
        Some(dt) => NormalizedDate::Valid(dt),
        None => {
            tracing::trace!(value = %raw, "Unparseable date treated as invalid");
            NormalizedDate::Invalid
        }
    }
}

/// Rewrite `D-M-YYYY` as `YYYY-M-D`; `None` when the input has another shape.
fn reorder_day_month_year(value: &str) -> Option<String> {
    let mut parts = value.split('-');
    let day = parts.next()?;
    let month = parts.next()?;
    let year = parts.next()?;
    if parts.next().is_some() {
        return None;
    }

    let is_digits = |s: &str, min: usize, max: usize| {
        (min..=max).contains(&s.len()) && s.bytes().all(|b| b.is_ascii_digit())
    };

    if is_digits(day, 1, 2) && is_digits(month, 1, 2) && is_digits(year, 4, 4) {
        Some(format!("{}-{}-{}", year, month, day))
    } else {
        None
    }
}

fn parse_general(value: &str) -> Option<NaiveDateTime> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.naive_utc());
    }

    for format in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(value, format) {
            return Some(dt);
        }
    }

    DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(value, format).ok())
        .map(|date| date.and_time(NaiveTime::MIN))
}

/// Today's calendar date in local time
pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// Whole days from local midnight of `today` until `target`, rounded up.
///
/// Negative when the target lies in the past. `None` for invalid dates.
pub fn days_until(target: NormalizedDate, today: NaiveDate) -> Option<i64> {
    let target = target.instant()?;
    let seconds = (target - today.and_time(NaiveTime::MIN)).num_seconds();
    let whole = seconds.div_euclid(SECONDS_PER_DAY);
    let rounded = if seconds.rem_euclid(SECONDS_PER_DAY) > 0 {
        whole + 1
    } else {
        whole
    };
    Some(rounded)
}

/// Delivery status relative to today
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DueStatus {
    /// Due in this many days (zero means today)
    Due(i64),
    /// Overdue by this many days
    Delayed(i64),
}

impl DueStatus {
    pub fn from_days(days: i64) -> Self {
        if days < 0 {
            DueStatus::Delayed(days.abs())
        } else {
            DueStatus::Due(days)
        }
    }

    /// Status of a delivery date, `None` when the date is invalid
    pub fn for_date(target: NormalizedDate, today: NaiveDate) -> Option<Self> {
        days_until(target, today).map(Self::from_days)
    }
}

impl fmt::Display for DueStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DueStatus::Due(days) => write!(f, "Due: {} day", days),
            DueStatus::Delayed(days) => write!(f, "Delayed: {} day", days),
        }
    }
}
