use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};

use super::interval::WorkInterval;

/// The visible hour range of the day strip.
///
/// Derived from content and never stored. All percentages are relative to
/// the window, `0.0` is `start_hour` on `day` and `100.0` is `end_hour`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeWindow {
    /// The displayed day.
    pub day: NaiveDate,
    pub start_hour: u32,
    /// Exclusive; may be `24` which is the next day's midnight.
    pub end_hour: u32,
}

impl TimeWindow {
    pub fn new(day: NaiveDate, start_hour: u32, end_hour: u32) -> Self {
        let end_hour = end_hour.clamp(1, 24);
        let start_hour = start_hour.min(end_hour - 1);
        Self {
            day,
            start_hour,
            end_hour,
        }
    }

    /// Fit the window around the day's intervals (and the clock on the live
    /// day), one hour of margin on each side, clamped to the day.
    pub fn compute(
        day: NaiveDate,
        intervals: &[WorkInterval],
        now: NaiveDateTime,
        default_hours: (u32, u32),
    ) -> Self {
        let mut lo = default_hours.0 as f64;
        let mut hi = default_hours.1 as f64;

        for interval in intervals {
            let span = interval.span(now);
            let start_h = hours_since_midnight(day, span.start);
            let end_h = hours_since_midnight(day, span.end);
            lo = lo.min(start_h.floor() - 1.0);
            hi = hi.max(end_h.ceil() + 1.0);
        }

        if is_live_day(day, now) {
            let now_h = hours_since_midnight(day, now);
            lo = lo.min(now_h.floor() - 1.0);
            hi = hi.max(now_h.ceil() + 1.0);
        }

        let lo = lo.clamp(0.0, 24.0) as u32;
        let hi = hi.clamp(0.0, 24.0) as u32;
        Self::new(day, lo, hi)
    }

    pub fn total_minutes(&self) -> i64 {
        (self.end_hour as i64 - self.start_hour as i64) * 60
    }

    pub fn start(&self) -> NaiveDateTime {
        day_start(self.day) + Duration::hours(self.start_hour as i64)
    }

    pub fn end(&self) -> NaiveDateTime {
        day_start(self.day) + Duration::hours(self.end_hour as i64)
    }

    /// Position of `t` in the window, clamped to `[0, 100]`.
    pub fn to_percent(&self, t: NaiveDateTime) -> f64 {
        let minutes = (t - self.start()).num_seconds() as f64 / 60.0;
        (minutes / self.total_minutes() as f64 * 100.0).clamp(0.0, 100.0)
    }

    /// Inverse of [`Self::to_percent`], rounded to the minute.
    pub fn to_timestamp(&self, percent: f64) -> NaiveDateTime {
        let percent = if percent.is_finite() {
            percent.clamp(0.0, 100.0)
        } else {
            0.0
        };
        let minutes = (percent / 100.0 * self.total_minutes() as f64).round() as i64;
        self.start() + Duration::minutes(minutes)
    }

    /// Width in percent covered by `duration`.
    pub fn duration_to_percent(&self, duration: Duration) -> f64 {
        duration.num_seconds() as f64 / 60.0 / self.total_minutes() as f64 * 100.0
    }

    /// Duration covered by a percent delta, rounded to the minute. Not clamped.
    pub fn percent_to_duration(&self, percent: f64) -> Duration {
        Duration::minutes((percent / 100.0 * self.total_minutes() as f64).round() as i64)
    }

    pub fn contains(&self, t: NaiveDateTime) -> bool {
        self.start() <= t && t <= self.end()
    }

    /// Whole hours shown on the strip, for gridlines and labels.
    pub fn hours(&self) -> impl Iterator<Item = u32> {
        self.start_hour..=self.end_hour
    }
}

pub fn day_start(day: NaiveDate) -> NaiveDateTime {
    day.and_time(NaiveTime::MIN)
}

/// Next day's midnight.
pub fn day_end(day: NaiveDate) -> NaiveDateTime {
    day_start(day) + Duration::days(1)
}

pub fn clamp_to_day(day: NaiveDate, t: NaiveDateTime) -> NaiveDateTime {
    t.clamp(day_start(day), day_end(day))
}

pub fn is_live_day(day: NaiveDate, now: NaiveDateTime) -> bool {
    now.date() == day
}

/// Hours from `day`'s midnight. Instants on the next day read 24 and up, so
/// a span past midnight stays after the evening instead of wrapping.
fn hours_since_midnight(day: NaiveDate, t: NaiveDateTime) -> f64 {
    (t - day_start(day)).num_seconds() as f64 / 3600.0
}
