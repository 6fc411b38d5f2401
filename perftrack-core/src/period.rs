//! Report windows: map a report type and an anchor to an inclusive date range.
//!
//! Anchors are validated when they are built, so turning one into a
//! [`DateRange`] never fails.

use anyhow::{Result, bail};
use chrono::{Datelike, Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum ReportType {
    Weekly,
    #[default]
    Monthly,
    Quarterly,
}

impl ReportType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReportType::Weekly => "Weekly",
            ReportType::Monthly => "Monthly",
            ReportType::Quarterly => "Quarterly",
        }
    }
}

impl fmt::Display for ReportType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReportType {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "weekly" | "week" => Ok(ReportType::Weekly),
            "monthly" | "month" => Ok(ReportType::Monthly),
            "quarterly" | "quarter" => Ok(ReportType::Quarterly),
            other => bail!("unknown report type: {other} (expected weekly, monthly or quarterly)"),
        }
    }
}

/// Inclusive `[start, end]` calendar range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self> {
        if start > end {
            bail!("range start {start} is after end {end}");
        }
        Ok(Self { start, end })
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }

    /// Number of calendar days covered, both ends included.
    pub fn days(&self) -> i64 {
        (self.end - self.start).num_days() + 1
    }
}

impl fmt::Display for DateRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} to {}", self.start, self.end)
    }
}

/// A calendar month, e.g. `2026-02`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct YearMonth {
    year: i32,
    month: u32,
    first: NaiveDate,
    last: NaiveDate,
}

impl YearMonth {
    pub fn new(year: i32, month: u32) -> Result<Self> {
        if !(1..=12).contains(&month) {
            bail!("month must be 1-12, got {month}");
        }
        let first = NaiveDate::from_ymd_opt(year, month, 1)
            .ok_or_else(|| anyhow::anyhow!("year out of range: {year}"))?;
        let (ny, nm) = if month == 12 { (year + 1, 1) } else { (year, month + 1) };
        let last = NaiveDate::from_ymd_opt(ny, nm, 1)
            .and_then(|d| d.pred_opt())
            .ok_or_else(|| anyhow::anyhow!("year out of range: {year}"))?;
        Ok(Self { year, month, first, last })
    }

    pub fn of(date: NaiveDate) -> Result<Self> {
        Self::new(date.year(), date.month())
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    pub fn first_day(&self) -> NaiveDate {
        self.first
    }

    pub fn last_day(&self) -> NaiveDate {
        self.last
    }
}

impl FromStr for YearMonth {
    type Err = anyhow::Error;

    /// Parses `YYYY-MM`.
    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        let (y, m) = s
            .split_once('-')
            .ok_or_else(|| anyhow::anyhow!("expected YYYY-MM, got '{s}'"))?;
        let year: i32 = y
            .parse()
            .map_err(|_| anyhow::anyhow!("invalid year in '{s}'"))?;
        let month: u32 = m
            .parse()
            .map_err(|_| anyhow::anyhow!("invalid month in '{s}'"))?;
        Self::new(year, month)
    }
}

impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

/// Quarter `q` (1-4) of a year.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Quarter {
    year: i32,
    quarter: u32,
    first: YearMonth,
    last: YearMonth,
}

impl Quarter {
    pub fn new(year: i32, quarter: u32) -> Result<Self> {
        if !(1..=4).contains(&quarter) {
            bail!("quarter must be 1-4, got {quarter}");
        }
        // 0-indexed months (q-1)*3 ..= (q-1)*3+2
        let start_month0 = (quarter - 1) * 3;
        let first = YearMonth::new(year, start_month0 + 1)?;
        let last = YearMonth::new(year, start_month0 + 3)?;
        Ok(Self { year, quarter, first, last })
    }

    /// Quarter containing `date`: `floor((month0 + 3) / 3)`.
    pub fn of(date: NaiveDate) -> Result<Self> {
        Self::new(date.year(), (date.month0() + 3) / 3)
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn number(&self) -> u32 {
        self.quarter
    }
}

impl fmt::Display for Quarter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} Q{}", self.year, self.quarter)
    }
}

/// The value a user picks to derive a reporting window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Anchor {
    Week(NaiveDate),
    Month(YearMonth),
    Quarter(Quarter),
}

impl Anchor {
    /// The anchor a fresh report form starts with for `today`.
    pub fn for_today(report_type: ReportType, today: NaiveDate) -> Result<Self> {
        Ok(match report_type {
            ReportType::Weekly => Anchor::Week(today),
            ReportType::Monthly => Anchor::Month(YearMonth::of(today)?),
            ReportType::Quarterly => Anchor::Quarter(Quarter::of(today)?),
        })
    }

    pub fn report_type(&self) -> ReportType {
        match self {
            Anchor::Week(_) => ReportType::Weekly,
            Anchor::Month(_) => ReportType::Monthly,
            Anchor::Quarter(_) => ReportType::Quarterly,
        }
    }

    pub fn range(&self) -> DateRange {
        match self {
            Anchor::Week(date) => week_of(*date),
            Anchor::Month(ym) => DateRange {
                start: ym.first_day(),
                end: ym.last_day(),
            },
            Anchor::Quarter(q) => DateRange {
                start: q.first.first_day(),
                end: q.last.last_day(),
            },
        }
    }
}

/// Monday-Sunday week containing `date`.
fn week_of(date: NaiveDate) -> DateRange {
    let weekday = date.weekday().num_days_from_sunday();
    let monday = date - Duration::days(((weekday + 6) % 7) as i64);
    DateRange {
        start: monday,
        end: monday + Duration::days(6),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Weekday;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn is_leap(y: i32) -> bool {
        (y % 4 == 0 && y % 100 != 0) || y % 400 == 0
    }

    #[test]
    fn test_weekly_known_dates() {
        // 2026-10-19 is a Monday; a Sunday belongs to the week before it.
        assert_eq!(Anchor::Week(d(2026, 10, 19)).range(), DateRange { start: d(2026, 10, 19), end: d(2026, 10, 25) });
        assert_eq!(Anchor::Week(d(2026, 10, 25)).range(), DateRange { start: d(2026, 10, 19), end: d(2026, 10, 25) });
        assert_eq!(Anchor::Week(d(2026, 10, 22)).range().to_string(), "2026-10-19 to 2026-10-25");
        // Week spanning a year boundary
        assert_eq!(Anchor::Week(d(2027, 1, 1)).range(), DateRange { start: d(2026, 12, 28), end: d(2027, 1, 3) });
    }

    #[test]
    fn test_weekly_starts_monday_and_spans_seven_days() {
        let mut day = d(2023, 1, 1);
        while day <= d(2029, 12, 31) {
            let r = Anchor::Week(day).range();
            assert_eq!(r.start.weekday(), Weekday::Mon, "anchor {day}");
            assert_eq!(r.end - r.start, Duration::days(6), "anchor {day}");
            assert!(r.contains(day), "anchor {day}");
            day = day.succ_opt().unwrap();
        }
    }

    #[test]
    fn test_monthly_first_and_last_day() {
        for year in 1896..=2104 {
            for month in 1..=12 {
                let r = Anchor::Month(YearMonth::new(year, month).unwrap()).range();
                assert_eq!(r.start, d(year, month, 1));
                let expected_last = match month {
                    2 if is_leap(year) => 29,
                    2 => 28,
                    4 | 6 | 9 | 11 => 30,
                    _ => 31,
                };
                assert_eq!(r.end, d(year, month, expected_last), "{year}-{month}");
            }
        }
    }

    #[test]
    fn test_monthly_leap_february() {
        let r = Anchor::Month("2024-02".parse().unwrap()).range();
        assert_eq!(r.to_string(), "2024-02-01 to 2024-02-29");
        let r = Anchor::Month("2100-02".parse().unwrap()).range();
        assert_eq!(r.end, d(2100, 2, 28));
    }

    #[test]
    fn test_quarters_are_contiguous_three_month_blocks() {
        for year in 2000..=2040 {
            let ranges: Vec<DateRange> = (1..=4)
                .map(|q| Anchor::Quarter(Quarter::new(year, q).unwrap()).range())
                .collect();
            assert_eq!(ranges[0].start, d(year, 1, 1));
            assert_eq!(ranges[3].end, d(year, 12, 31));
            for (i, r) in ranges.iter().enumerate() {
                let first_month = i as u32 * 3 + 1;
                assert_eq!(r.start, d(year, first_month, 1));
                assert_eq!(YearMonth::of(r.end).unwrap().month(), first_month + 2);
                assert_eq!(r.end.succ_opt().unwrap().day(), 1);
            }
            for pair in ranges.windows(2) {
                assert_eq!(pair[0].end.succ_opt().unwrap(), pair[1].start);
            }
            let total: i64 = ranges.iter().map(|r| r.days()).sum();
            assert_eq!(total, if is_leap(year) { 366 } else { 365 });
        }
    }

    #[test]
    fn test_quarter_of_date() {
        assert_eq!(Quarter::of(d(2026, 1, 15)).unwrap().number(), 1);
        assert_eq!(Quarter::of(d(2026, 3, 31)).unwrap().number(), 1);
        assert_eq!(Quarter::of(d(2026, 4, 1)).unwrap().number(), 2);
        assert_eq!(Quarter::of(d(2026, 10, 19)).unwrap().number(), 4);
    }

    #[test]
    fn test_invalid_anchors_rejected() {
        assert!(Quarter::new(2026, 0).is_err());
        assert!(Quarter::new(2026, 5).is_err());
        assert!(YearMonth::new(2026, 13).is_err());
        assert!("2026/02".parse::<YearMonth>().is_err());
        assert!("2026-xx".parse::<YearMonth>().is_err());
    }

    #[test]
    fn test_for_today_is_deterministic() {
        let today = d(2026, 10, 19);
        for rt in [ReportType::Weekly, ReportType::Monthly, ReportType::Quarterly] {
            let a = Anchor::for_today(rt, today).unwrap();
            let b = Anchor::for_today(rt, today).unwrap();
            assert_eq!(a.report_type(), rt);
            assert_eq!(a.range(), b.range());
            assert!(a.range().contains(today));
        }
        assert_eq!(
            Anchor::for_today(ReportType::Quarterly, today).unwrap().range().to_string(),
            "2026-10-01 to 2026-12-31"
        );
    }

    #[test]
    fn test_report_type_parse_and_display() {
        assert_eq!("WEEKLY".parse::<ReportType>().unwrap(), ReportType::Weekly);
        assert_eq!("quarter".parse::<ReportType>().unwrap(), ReportType::Quarterly);
        assert_eq!(ReportType::Monthly.to_string(), "Monthly");
        assert!("yearly".parse::<ReportType>().is_err());
    }

    #[test]
    fn test_range_contains_is_inclusive() {
        let r = DateRange::new(d(2026, 3, 1), d(2026, 3, 31)).unwrap();
        assert!(r.contains(d(2026, 3, 1)));
        assert!(r.contains(d(2026, 3, 31)));
        assert!(!r.contains(d(2026, 2, 28)));
        assert!(!r.contains(d(2026, 4, 1)));
        assert!(DateRange::new(d(2026, 4, 1), d(2026, 3, 1)).is_err());
    }
}
