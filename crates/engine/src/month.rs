use std::{fmt, str::FromStr};

use chrono::{Datelike, NaiveDate};

use crate::EngineError;

/// Calendar month used as aggregation key.
///
/// The canonical key is zero-padded `YYYY-MM`. Parsing also accepts the
/// unpadded `YYYY-M` form and a full `YYYY-MM-DD` date, so keys coming from
/// older records or from date inputs normalize to the same value.
///
/// ```rust
/// use engine::BudgetMonth;
///
/// let a: BudgetMonth = "2025-3".parse().unwrap();
/// let b: BudgetMonth = "2025-03".parse().unwrap();
/// assert_eq!(a, b);
/// assert_eq!(a.to_string(), "2025-03");
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BudgetMonth {
    year: i32,
    month: u32,
}

impl BudgetMonth {
    pub fn new(year: i32, month: u32) -> Result<Self, EngineError> {
        if !(1..=12).contains(&month) {
            return Err(EngineError::InvalidMonth(format!(
                "month must be between 1 and 12, got {month}"
            )));
        }
        if !(1..=9999).contains(&year) {
            return Err(EngineError::InvalidMonth(format!(
                "year out of range: {year}"
            )));
        }
        Ok(Self { year, month })
    }

    /// Month containing `date`.
    #[must_use]
    pub fn from_date(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    /// Month of the local calendar date.
    #[must_use]
    pub fn current() -> Self {
        Self::from_date(chrono::Local::now().date_naive())
    }

    #[must_use]
    pub const fn year(self) -> i32 {
        self.year
    }

    #[must_use]
    pub const fn month(self) -> u32 {
        self.month
    }

    #[must_use]
    pub fn contains(self, date: NaiveDate) -> bool {
        date.year() == self.year && date.month() == self.month
    }

    /// Number of the last day of the month (28..=31).
    #[must_use]
    pub fn last_day(self) -> u32 {
        match self.month {
            4 | 6 | 9 | 11 => 30,
            2 if NaiveDate::from_ymd_opt(self.year, 2, 29).is_some() => 29,
            2 => 28,
            _ => 31,
        }
    }
}

impl fmt::Display for BudgetMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl FromStr for BudgetMonth {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || EngineError::InvalidMonth(s.to_string());
        let trimmed = s.trim();

        let parts: Vec<&str> = trimmed.split('-').collect();
        match parts.as_slice() {
            [year, month] => {
                if year.len() != 4 || month.is_empty() || month.len() > 2 {
                    return Err(invalid());
                }
                if !year.bytes().chain(month.bytes()).all(|b| b.is_ascii_digit()) {
                    return Err(invalid());
                }
                let year = year.parse::<i32>().map_err(|_| invalid())?;
                let month = month.parse::<u32>().map_err(|_| invalid())?;
                Self::new(year, month)
            }
            [_, _, _] => NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
                .map(Self::from_date)
                .map_err(|_| invalid()),
            _ => Err(invalid()),
        }
    }
}
