use anyhow::{anyhow, bail, Result};
use chrono::{NaiveDate, NaiveDateTime};
use log::{info, warn};
use std::path::{Path, PathBuf};

use super::file::{load_book, save_book, IntervalBook};
use crate::model::{IntervalId, Span, WorkInterval};

/// A finished interval to add, as produced by the creation form.
#[derive(Debug, Clone, PartialEq)]
pub struct NewInterval {
    pub title: String,
    pub reference: Option<String>,
    pub category: Option<String>,
    pub span: Span,
}

/// Partial update of an interval; `None` fields are left alone.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IntervalPatch {
    pub start: Option<NaiveDateTime>,
    pub end: Option<NaiveDateTime>,
}

impl IntervalPatch {
    pub fn bounds(span: Span) -> Self {
        Self {
            start: Some(span.start),
            end: Some(span.end),
            ..Self::default()
        }
    }
}

/// Where intervals live. The editor only ever lists, creates and updates.
pub trait IntervalStore {
    /// Intervals starting on `day`, by start time.
    fn list(&self, day: NaiveDate) -> Vec<WorkInterval>;
    fn create(&mut self, interval: NewInterval) -> Result<IntervalId>;
    fn update(&mut self, id: IntervalId, patch: IntervalPatch) -> Result<()>;
}

/// Interval store kept in memory and mirrored to a JSON file, if one is set.
#[derive(Debug, Clone, Default)]
pub struct JsonStore {
    book: IntervalBook,
    path: Option<PathBuf>,
}

impl JsonStore {
    pub fn in_memory() -> Self {
        Self::default()
    }

    /// Open the book at `path`; a missing file starts an empty book.
    pub fn open(path: &Path) -> Result<Self> {
        let book = if path.exists() {
            load_book(path)?
        } else {
            info!("no interval book at {}, starting empty", path.display());
            IntervalBook::default()
        };
        Ok(Self {
            book,
            path: Some(path.to_path_buf()),
        })
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn all(&self) -> &[WorkInterval] {
        &self.book.intervals
    }

    /// The one interval that is running or paused, if any.
    pub fn active(&self) -> Option<&WorkInterval> {
        self.book.intervals.iter().find(|i| i.is_active())
    }

    pub fn start_timer(
        &mut self,
        title: &str,
        reference: Option<String>,
        category: Option<String>,
        now: NaiveDateTime,
    ) -> Result<IntervalId> {
        if let Some(active) = self.active() {
            bail!("'{}' is still running", active.title);
        }
        let title = title.trim();
        if title.is_empty() {
            bail!("a timer needs a title");
        }
        let interval = WorkInterval::running(title, now).with_tags(reference, category);
        let id = interval.id;
        let mut book = self.book.clone();
        book.intervals.push(interval);
        self.commit(book)?;
        info!("timer started for '{title}'");
        Ok(id)
    }

    pub fn pause_active(&mut self, now: NaiveDateTime) -> Result<()> {
        self.with_active(|active| active.pause(now))
    }

    pub fn resume_active(&mut self, now: NaiveDateTime) -> Result<()> {
        self.with_active(|active| active.resume(now))
    }

    pub fn stop_active(&mut self, now: NaiveDateTime) -> Result<()> {
        self.with_active(|active| {
            active.stop(now)?;
            info!("timer stopped for '{}'", active.title);
            Ok(())
        })
    }

    /// Apply `change` to the active interval in a copy of the book, kept only once saved.
    fn with_active(&mut self, change: impl FnOnce(&mut WorkInterval) -> Result<()>) -> Result<()> {
        let mut book = self.book.clone();
        let active = book
            .intervals
            .iter_mut()
            .find(|i| i.is_active())
            .ok_or_else(|| anyhow!("no timer is running"))?;
        change(active)?;
        self.commit(book)
    }

    /// Save `book` and make it current. On a failed save the old book stays.
    fn commit(&mut self, book: IntervalBook) -> Result<()> {
        if let Some(path) = &self.path {
            if let Err(err) = save_book(&book, path) {
                warn!("change not kept, saving failed: {err:#}");
                return Err(err);
            }
        }
        self.book = book;
        Ok(())
    }
}

impl IntervalStore for JsonStore {
    fn list(&self, day: NaiveDate) -> Vec<WorkInterval> {
        let mut intervals: Vec<WorkInterval> = self
            .book
            .intervals
            .iter()
            .filter(|i| i.day() == day)
            .cloned()
            .collect();
        intervals.sort_by_key(|i| i.start);
        intervals
    }

    fn create(&mut self, new: NewInterval) -> Result<IntervalId> {
        if !new.span.is_valid() {
            bail!("an interval must end after it starts");
        }
        let title = new.title.trim();
        if title.is_empty() {
            bail!("an interval needs a title");
        }
        let interval = WorkInterval::completed(title, new.span.start, new.span.end)
            .with_tags(new.reference, new.category);
        let id = interval.id;
        let mut book = self.book.clone();
        book.intervals.push(interval);
        self.commit(book)?;
        info!("created '{title}' {} - {}", new.span.start, new.span.end);
        Ok(id)
    }

    fn update(&mut self, id: IntervalId, patch: IntervalPatch) -> Result<()> {
        let mut book = self.book.clone();
        let interval = book
            .intervals
            .iter_mut()
            .find(|i| i.id == id)
            .ok_or_else(|| anyhow!("no interval with id {id}"))?;

        let start = patch.start.unwrap_or(interval.start);
        let end = patch.end.or(interval.end);
        if let Some(end) = end {
            if end <= start {
                bail!("'{}' would end before it starts", interval.title);
            }
        }
        if patch.end.is_some() && interval.is_active() {
            bail!("'{}' is still running", interval.title);
        }

        interval.start = start;
        interval.end = end;
        info!("updating '{}' to {} - {:?}", interval.title, start, end);
        self.commit(book)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::interval::tests::at;
    use crate::model::IntervalStatus;

    fn new_interval(title: &str, start: NaiveDateTime, end: NaiveDateTime) -> NewInterval {
        NewInterval {
            title: title.into(),
            reference: None,
            category: Some("Dev".into()),
            span: Span::new(start, end),
        }
    }

    #[test]
    fn list_returns_day_sorted() {
        let mut store = JsonStore::in_memory();
        store.create(new_interval("Build", at(4, 13, 0), at(4, 14, 0))).unwrap();
        store.create(new_interval("Review", at(4, 9, 0), at(4, 10, 0))).unwrap();
        store.create(new_interval("Other day", at(5, 9, 0), at(5, 10, 0))).unwrap();

        let day = store.list(at(4, 0, 0).date());
        let titles: Vec<&str> = day.iter().map(|i| i.title.as_str()).collect();
        assert_eq!(titles, vec!["Review", "Build"]);
        assert_eq!(day[0].category.as_deref(), Some("Dev"));
    }

    #[test]
    fn invalid_creations_are_refused() {
        let mut store = JsonStore::in_memory();
        assert!(store.create(new_interval("Back", at(4, 10, 0), at(4, 9, 0))).is_err());
        assert!(store.create(new_interval("  ", at(4, 9, 0), at(4, 10, 0))).is_err());
        assert!(store.all().is_empty());
    }

    #[test]
    fn update_moves_bounds() {
        let mut store = JsonStore::in_memory();
        let id = store.create(new_interval("Review", at(4, 9, 0), at(4, 10, 0))).unwrap();
        store
            .update(id, IntervalPatch::bounds(Span::new(at(4, 9, 0), at(4, 10, 30))))
            .unwrap();
        assert_eq!(store.all()[0].end, Some(at(4, 10, 30)));

        let backwards = IntervalPatch {
            start: Some(at(4, 11, 0)),
            ..IntervalPatch::default()
        };
        assert!(store.update(id, backwards).is_err());
        assert_eq!(store.all()[0].start, at(4, 9, 0));
        assert!(store.update(uuid::Uuid::new_v4(), IntervalPatch::default()).is_err());
    }

    #[test]
    fn only_one_timer_at_a_time() {
        let mut store = JsonStore::in_memory();
        store.start_timer("Build", None, None, at(4, 9, 0)).unwrap();
        assert!(store.start_timer("Review", None, None, at(4, 9, 5)).is_err());
        store.pause_active(at(4, 9, 10)).unwrap();
        assert_eq!(store.active().map(|i| i.status), Some(IntervalStatus::Paused));
        store.resume_active(at(4, 9, 20)).unwrap();
        store.stop_active(at(4, 10, 0)).unwrap();
        assert!(store.active().is_none());
        assert!(store.stop_active(at(4, 10, 5)).is_err());
        store.start_timer("Review", None, None, at(4, 10, 5)).unwrap();
    }

    #[test]
    fn running_timer_end_cannot_be_set() {
        let mut store = JsonStore::in_memory();
        let id = store.start_timer("Build", None, None, at(4, 9, 0)).unwrap();
        let patch = IntervalPatch {
            end: Some(at(4, 10, 0)),
            ..IntervalPatch::default()
        };
        assert!(store.update(id, patch).is_err());
    }

    #[test]
    fn book_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data").join("intervals.json");
        let mut store = JsonStore::open(&path).unwrap();
        let id = store.create(new_interval("Review", at(4, 9, 0), at(4, 10, 0))).unwrap();
        store.start_timer("Build", Some("B-7".into()), None, at(4, 11, 0)).unwrap();

        let reopened = JsonStore::open(&path).unwrap();
        assert_eq!(reopened.all(), store.all());
        assert_eq!(reopened.all()[0].id, id);
        assert_eq!(reopened.active().and_then(|i| i.reference.clone()).as_deref(), Some("B-7"));
    }

    /// A store whose book path turns into a directory, so every save fails.
    fn unwritable_store(dir: &tempfile::TempDir) -> JsonStore {
        let path = dir.path().join("intervals.json");
        let store = JsonStore::open(&path).unwrap();
        std::fs::create_dir(&path).unwrap();
        store
    }

    #[test]
    fn failed_save_keeps_nothing_in_memory() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = unwritable_store(&dir);
        assert!(store.create(new_interval("Review", at(4, 9, 0), at(4, 10, 0))).is_err());
        assert!(store.create(new_interval("Review", at(4, 9, 0), at(4, 10, 0))).is_err());
        assert!(store.all().is_empty());
        assert!(store.start_timer("Build", None, None, at(4, 11, 0)).is_err());
        assert!(store.active().is_none());
    }

    #[test]
    fn failed_save_restores_previous_bounds() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("intervals.json");
        let mut store = JsonStore::open(&path).unwrap();
        let id = store.create(new_interval("Review", at(4, 9, 0), at(4, 10, 0))).unwrap();
        store.start_timer("Build", None, None, at(4, 11, 0)).unwrap();
        std::fs::remove_file(&path).unwrap();
        std::fs::create_dir(&path).unwrap();

        let moved = IntervalPatch::bounds(Span::new(at(4, 9, 0), at(4, 10, 30)));
        assert!(store.update(id, moved).is_err());
        assert_eq!(store.all()[0].end, Some(at(4, 10, 0)));

        assert!(store.pause_active(at(4, 11, 30)).is_err());
        assert!(store.stop_active(at(4, 12, 0)).is_err());
        assert_eq!(store.active().map(|i| i.status), Some(IntervalStatus::Running));
    }

    #[test]
    fn corrupt_book_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("intervals.json");
        std::fs::write(&path, "{ not json").unwrap();
        assert!(JsonStore::open(&path).is_err());
    }
}
