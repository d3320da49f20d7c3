use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime};

use super::interval::WorkInterval;

/// Total tracked time for one title.
#[derive(Debug, Clone, PartialEq)]
pub struct TitleTotal {
    pub title: String,
    pub category: Option<String>,
    pub tracked: Duration,
    pub intervals: usize,
}

/// Weekly review: per-day totals and per-title totals for an ISO week.
#[derive(Debug, Clone, PartialEq)]
pub struct WeekSummary {
    pub week_start: NaiveDate,
    /// Monday first, always seven entries.
    pub days: Vec<(NaiveDate, Duration)>,
    pub titles: Vec<TitleTotal>,
}

impl WeekSummary {
    pub fn total(&self) -> Duration {
        self.days
            .iter()
            .fold(Duration::zero(), |acc, (_, tracked)| acc + *tracked)
    }
}

pub fn week_start(day: NaiveDate) -> NaiveDate {
    day - Duration::days(day.weekday().num_days_from_monday() as i64)
}

/// Per-title totals, biggest first; ties keep first-seen order.
pub fn title_totals<'a>(
    intervals: impl IntoIterator<Item = &'a WorkInterval>,
    now: NaiveDateTime,
) -> Vec<TitleTotal> {
    let mut totals: Vec<TitleTotal> = Vec::new();
    for interval in intervals {
        let tracked = interval.tracked(now);
        match totals.iter_mut().find(|t| t.title == interval.title) {
            Some(total) => {
                total.tracked = total.tracked + tracked;
                total.intervals += 1;
                if total.category.is_none() {
                    total.category = interval.category.clone();
                }
            }
            None => totals.push(TitleTotal {
                title: interval.title.clone(),
                category: interval.category.clone(),
                tracked,
                intervals: 1,
            }),
        }
    }
    totals.sort_by(|a, b| b.tracked.cmp(&a.tracked));
    totals
}

/// Summarise the ISO week containing `day`. Intervals outside it are ignored.
pub fn week_summary(intervals: &[WorkInterval], day: NaiveDate, now: NaiveDateTime) -> WeekSummary {
    let start = week_start(day);
    let end = start + Duration::days(7);
    let in_week: Vec<&WorkInterval> = intervals
        .iter()
        .filter(|i| i.day() >= start && i.day() < end)
        .collect();

    let days = (0..7)
        .map(|offset| {
            let date = start + Duration::days(offset);
            let tracked = in_week
                .iter()
                .filter(|i| i.day() == date)
                .fold(Duration::zero(), |acc, i| acc + i.tracked(now));
            (date, tracked)
        })
        .collect();

    WeekSummary {
        week_start: start,
        days,
        titles: title_totals(in_week, now),
    }
}

/// `1h 05m` style label used by the summary panel.
pub fn format_duration(duration: Duration) -> String {
    let minutes = duration.num_minutes().max(0);
    format!("{}h {:02}m", minutes / 60, minutes % 60)
}
