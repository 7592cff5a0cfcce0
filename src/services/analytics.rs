//! Month calendar and per-subject breakdown over focus sessions.
//!
//! Everything here is a pure transform over already-loaded sessions. Minutes
//! are rounded per session before summing, so a day with two 90 second
//! sessions totals 4 minutes rather than 3.

use chrono::{Datelike, Duration, Months, NaiveDate, Utc};
use serde::Serialize;
use std::collections::HashMap;
use std::fmt;

use crate::models::FocusSession;
use crate::models::timestamp::date_part;

/// Seconds to whole minutes, halves rounding up (30 s -> 1, 89 s -> 1, 90 s -> 2).
#[must_use]
pub const fn rounded_minutes(seconds: i64) -> i64 {
    seconds.saturating_add(30).div_euclid(60)
}

fn sum_minutes<'a>(sessions: impl IntoIterator<Item = &'a FocusSession>) -> i64 {
    sessions
        .into_iter()
        .fold(0, |acc, s| acc.saturating_add(rounded_minutes(s.duration)))
}

/// Years whose bounds stay in the four-digit stored timestamp form.
pub const MIN_YEAR: i32 = 1;
pub const MAX_YEAR: i32 = 9999;

/// A calendar month and the inclusive ledger bounds that cover it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonthRange {
    year: i32,
    month: u32,
}

impl MonthRange {
    #[must_use]
    pub fn new(year: i32, month: u32) -> Option<Self> {
        if !(MIN_YEAR..=MAX_YEAR).contains(&year) {
            return None;
        }
        NaiveDate::from_ymd_opt(year, month, 1).map(|_| Self { year, month })
    }

    #[must_use]
    pub fn containing(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    #[must_use]
    pub fn current() -> Self {
        Self::containing(Utc::now().date_naive())
    }

    /// Parses `YYYY-MM`.
    #[must_use]
    pub fn parse(input: &str) -> Option<Self> {
        let (year, month) = input.trim().split_once('-')?;
        Self::new(year.parse().ok()?, month.parse().ok()?)
    }

    #[must_use]
    pub const fn year(&self) -> i32 {
        self.year
    }

    #[must_use]
    pub const fn month(&self) -> u32 {
        self.month
    }

    #[must_use]
    pub fn first_day(&self) -> NaiveDate {
        NaiveDate::from_ymd_opt(self.year, self.month, 1).unwrap_or(NaiveDate::MIN)
    }

    #[must_use]
    pub fn last_day(&self) -> NaiveDate {
        let first = self.first_day();
        first
            .checked_add_months(Months::new(1))
            .and_then(|next| next.pred_opt())
            .unwrap_or(first)
    }

    #[must_use]
    pub fn days_in_month(&self) -> u32 {
        self.last_day().day()
    }

    #[must_use]
    pub const fn next(&self) -> Self {
        if self.month == 12 {
            Self {
                year: self.year + 1,
                month: 1,
            }
        } else {
            Self {
                year: self.year,
                month: self.month + 1,
            }
        }
    }

    #[must_use]
    pub const fn previous(&self) -> Self {
        if self.month == 1 {
            Self {
                year: self.year - 1,
                month: 12,
            }
        } else {
            Self {
                year: self.year,
                month: self.month - 1,
            }
        }
    }

    /// Lower ledger bound, first instant of the month.
    #[must_use]
    pub fn from_bound(&self) -> String {
        format!("{}T00:00:00.000Z", self.first_day().format("%Y-%m-%d"))
    }

    /// Upper ledger bound, last millisecond of the month.
    #[must_use]
    pub fn to_bound(&self) -> String {
        format!("{}T23:59:59.999Z", self.last_day().format("%Y-%m-%d"))
    }
}

impl fmt::Display for MonthRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DayData {
    pub date: String,
    pub total_minutes: i64,
    pub sessions: Vec<FocusSession>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubjectSlice {
    pub subject_id: i32,
    pub name: String,
    pub color: String,
    pub minutes: i64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthView {
    pub year: i32,
    pub month: u32,
    /// Sunday-first grid: leading `None` cells pad the first week.
    pub days: Vec<Option<DayData>>,
    pub subjects: Vec<SubjectSlice>,
    pub total_minutes: i64,
}

impl MonthView {
    pub fn day(&self, date: &str) -> Option<&DayData> {
        self.days.iter().flatten().find(|d| d.date == date)
    }
}

#[must_use]
pub fn build_month_view(range: MonthRange, sessions: &[FocusSession]) -> MonthView {
    let first = range.first_day();
    let padding = first.weekday().num_days_from_sunday() as usize;

    let mut days: Vec<Option<DayData>> = Vec::with_capacity(padding + 31);
    days.resize_with(padding, || None);

    for offset in 0..range.days_in_month() {
        let date = (first + Duration::days(i64::from(offset)))
            .format("%Y-%m-%d")
            .to_string();
        let day_sessions: Vec<FocusSession> = sessions_on(&date, sessions).cloned().collect();
        let total_minutes = sum_minutes(&day_sessions);

        days.push(Some(DayData {
            date,
            total_minutes,
            sessions: day_sessions,
        }));
    }

    MonthView {
        year: range.year(),
        month: range.month(),
        days,
        subjects: subject_breakdown(sessions),
        total_minutes: total_minutes(sessions),
    }
}

/// Sessions whose start timestamp begins with `date` (`YYYY-MM-DD`).
pub fn sessions_on<'a>(
    date: &'a str,
    sessions: &'a [FocusSession],
) -> impl Iterator<Item = &'a FocusSession> + 'a {
    sessions.iter().filter(move |s| date_part(&s.start_time) == date)
}

/// Minutes per subject in order of first appearance. Subjects without
/// sessions never show up.
#[must_use]
pub fn subject_breakdown(sessions: &[FocusSession]) -> Vec<SubjectSlice> {
    let mut slices: Vec<SubjectSlice> = Vec::new();
    let mut index: HashMap<i32, usize> = HashMap::new();

    for session in sessions {
        let minutes = rounded_minutes(session.duration);
        if let Some(&i) = index.get(&session.subject.id) {
            slices[i].minutes = slices[i].minutes.saturating_add(minutes);
        } else {
            index.insert(session.subject.id, slices.len());
            slices.push(SubjectSlice {
                subject_id: session.subject.id,
                name: session.subject.name.clone(),
                color: session.subject.color.clone(),
                minutes,
            });
        }
    }

    slices
}

#[must_use]
pub fn total_minutes(sessions: &[FocusSession]) -> i64 {
    sum_minutes(sessions)
}
