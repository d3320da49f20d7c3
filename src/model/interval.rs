use anyhow::{bail, Result};
use chrono::{Duration, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable identifier of a tracked interval.
pub type IntervalId = Uuid;

/// Lifecycle state of a tracked interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum IntervalStatus {
    Running,
    Paused,
    Completed,
}

/// A half-open `[start, end)` span of wall-clock time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

impl Span {
    pub fn new(start: NaiveDateTime, end: NaiveDateTime) -> Self {
        Self { start, end }
    }

    pub fn duration(&self) -> Duration {
        self.end - self.start
    }

    pub fn is_valid(&self) -> bool {
        self.start < self.end
    }

    /// Touching endpoints do not count as intersecting.
    pub fn intersects(&self, other: &Span) -> bool {
        self.start < other.end && other.start < self.end
    }

    /// Length of the shared part of both spans, zero when disjoint.
    pub fn intersection(&self, other: &Span) -> Duration {
        let start = self.start.max(other.start);
        let end = self.end.min(other.end);
        (end - start).max(Duration::zero())
    }

    pub fn contains(&self, other: &Span) -> bool {
        self.start <= other.start && other.end <= self.end
    }
}

/// A single tracked span of work.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkInterval {
    pub id: IntervalId,
    pub title: String,
    /// Optional reference code (ticket, order number...).
    #[serde(default)]
    pub reference: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    pub start: NaiveDateTime,
    /// `None` while the interval is still open.
    pub end: Option<NaiveDateTime>,
    pub status: IntervalStatus,
    /// Seconds spent paused, excluding a pause that is still open.
    #[serde(default)]
    pub paused_seconds: i64,
    /// Set only while the interval is paused.
    #[serde(default)]
    pub last_pause_start: Option<NaiveDateTime>,
}

impl WorkInterval {
    /// A finished interval with fixed bounds.
    pub fn completed(title: impl Into<String>, start: NaiveDateTime, end: NaiveDateTime) -> Self {
        Self {
            id: Uuid::new_v4(),
            title: title.into(),
            reference: None,
            category: None,
            start,
            end: Some(end),
            status: IntervalStatus::Completed,
            paused_seconds: 0,
            last_pause_start: None,
        }
    }

    /// A running timer started at `now`.
    pub fn running(title: impl Into<String>, now: NaiveDateTime) -> Self {
        Self {
            id: Uuid::new_v4(),
            title: title.into(),
            reference: None,
            category: None,
            start: now,
            end: None,
            status: IntervalStatus::Running,
            paused_seconds: 0,
            last_pause_start: None,
        }
    }

    pub fn with_tags(mut self, reference: Option<String>, category: Option<String>) -> Self {
        self.reference = reference;
        self.category = category;
        self
    }

    /// Only finished intervals expose resize handles.
    pub fn is_resizable(&self) -> bool {
        self.status == IntervalStatus::Completed
    }

    pub fn is_active(&self) -> bool {
        self.status != IntervalStatus::Completed
    }

    /// The calendar day this interval belongs to.
    pub fn day(&self) -> NaiveDate {
        self.start.date()
    }

    /// Bounds as rendered; an open interval ends at `now`.
    pub fn span(&self, now: NaiveDateTime) -> Span {
        let end = self.end.unwrap_or(now).max(self.start);
        Span::new(self.start, end)
    }

    pub fn pause(&mut self, now: NaiveDateTime) -> Result<()> {
        if self.status != IntervalStatus::Running {
            bail!("'{}' is not running", self.title);
        }
        self.status = IntervalStatus::Paused;
        self.last_pause_start = Some(now);
        Ok(())
    }

    pub fn resume(&mut self, now: NaiveDateTime) -> Result<()> {
        if self.status != IntervalStatus::Paused {
            bail!("'{}' is not paused", self.title);
        }
        self.fold_open_pause(now);
        self.status = IntervalStatus::Running;
        Ok(())
    }

    pub fn stop(&mut self, now: NaiveDateTime) -> Result<()> {
        if self.status == IntervalStatus::Completed {
            bail!("'{}' is already stopped", self.title);
        }
        if now <= self.start {
            bail!("'{}' cannot end before it started", self.title);
        }
        self.fold_open_pause(now);
        self.end = Some(now);
        self.status = IntervalStatus::Completed;
        Ok(())
    }

    /// Wall-clock span minus the time spent paused, including an open pause.
    pub fn tracked(&self, now: NaiveDateTime) -> Duration {
        let open_pause = self
            .last_pause_start
            .map(|p| (now - p).max(Duration::zero()))
            .unwrap_or_else(Duration::zero);
        let paused = Duration::seconds(self.paused_seconds) + open_pause;
        (self.span(now).duration() - paused).max(Duration::zero())
    }

    fn fold_open_pause(&mut self, now: NaiveDateTime) {
        if let Some(paused_at) = self.last_pause_start.take() {
            self.paused_seconds += (now - paused_at).num_seconds().max(0);
        }
    }
}
