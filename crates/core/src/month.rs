use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;

/// The month a transaction belongs to, used as the grouping key for the
/// monthly dashboard. Derived from the transaction date, never stored
/// independently of it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Month {
    pub year: i32,
    pub month: u32,
}

impl Month {
    pub fn new(year: i32, month: u32) -> Option<Self> {
        if (1..=12).contains(&month) {
            Some(Month { year, month })
        } else {
            None
        }
    }

    pub fn from_date(date: NaiveDate) -> Self {
        Month {
            year: date.year(),
            month: date.month(),
        }
    }

    pub fn first_day(self) -> NaiveDate {
        NaiveDate::from_ymd_opt(self.year, self.month, 1).unwrap()
    }

    pub fn contains(self, date: NaiveDate) -> bool {
        date.year() == self.year && date.month() == self.month
    }
}

impl fmt::Display for Month {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn new_valid_and_invalid() {
        assert!(Month::new(2024, 1).is_some());
        assert!(Month::new(2024, 12).is_some());
        assert!(Month::new(2024, 0).is_none());
        assert!(Month::new(2024, 13).is_none());
    }

    #[test]
    fn from_date_takes_year_and_month() {
        let m = Month::from_date(date(2024, 3, 17));
        assert_eq!(m, Month::new(2024, 3).unwrap());
    }

    #[test]
    fn display_zero_pads() {
        assert_eq!(Month::new(2024, 1).unwrap().to_string(), "2024-01");
        assert_eq!(Month::new(2024, 11).unwrap().to_string(), "2024-11");
    }

    #[test]
    fn contains_checks_both_fields() {
        let m = Month::new(2024, 2).unwrap();
        assert!(m.contains(date(2024, 2, 29)));
        assert!(!m.contains(date(2024, 3, 1)));
        assert!(!m.contains(date(2023, 2, 1)));
    }

    #[test]
    fn first_day() {
        assert_eq!(Month::new(2024, 6).unwrap().first_day(), date(2024, 6, 1));
    }
}
