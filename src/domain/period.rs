// src/domain/period.rs

use chrono::{Datelike, NaiveDate};

/// The calendar month a report covers: always the month before the run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReportingPeriod {
    pub month: u32, // 1..=12
    pub year: i32,
}

impl ReportingPeriod {
    /// Period preceding `date`. A January run rolls over to December of
    /// the prior year.
    pub fn preceding(date: NaiveDate) -> Self {
        if date.month() == 1 {
            Self {
                month: 12,
                year: date.year() - 1,
            }
        } else {
            Self {
                month: date.month() - 1,
                year: date.year(),
            }
        }
    }

    pub fn month_name(&self) -> &'static str {
        match self.month {
            1 => "January",
            2 => "February",
            3 => "March",
            4 => "April",
            5 => "May",
            6 => "June",
            7 => "July",
            8 => "August",
            9 => "September",
            10 => "October",
            11 => "November",
            12 => "December",
            _ => "Unknown",
        }
    }

    /// "December 2024" — used in titles, subjects, and filenames.
    pub fn label(&self) -> String {
        format!("{} {}", self.month_name(), self.year)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn january_rolls_over_to_previous_december() {
        let p = ReportingPeriod::preceding(NaiveDate::from_ymd_opt(2025, 1, 15).unwrap());
        assert_eq!(p.month, 12);
        assert_eq!(p.year, 2024);
        assert_eq!(p.label(), "December 2024");
    }

    #[test]
    fn mid_year_takes_previous_month() {
        let p = ReportingPeriod::preceding(NaiveDate::from_ymd_opt(2025, 3, 1).unwrap());
        assert_eq!(p.month, 2);
        assert_eq!(p.year, 2025);
        assert_eq!(p.label(), "February 2025");
    }

    #[test]
    fn december_stays_within_year() {
        let p = ReportingPeriod::preceding(NaiveDate::from_ymd_opt(2025, 12, 31).unwrap());
        assert_eq!(p.month, 11);
        assert_eq!(p.year, 2025);
    }
}
