//! Direct-manipulation editing of the day strip.
//!
//! Pointer positions come in as percentages of the editable strip (the label
//! gutter excluded) and leave as creation or update intents. Nothing in here
//! writes to the interval store; callers apply committed intents themselves.

pub mod config;
pub mod drag_create;
pub mod lanes;
pub mod overlap;
pub mod resize;
pub mod snap;

use chrono::NaiveDateTime;
use log::debug;

use crate::model::{IntervalId, TimeWindow, WorkInterval};

pub use config::EditorConfig;
pub use drag_create::{CreateIntent, DragCreate};
pub use lanes::Projection;
pub use resize::{Resize, ResizeIntent};

/// Which end of an interval a resize handle moves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Edge {
    Start,
    End,
}

/// Why a gesture ended without changing anything.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Discard {
    /// Below the drag threshold; treated as a click.
    TooShortGesture,
    /// The bounds collapsed after clamping, snapping or trimming.
    InvalidBounds,
    /// The resolved bounds equal the original ones.
    Unchanged,
}

/// A question for the user before an overlap is kept.
#[derive(Debug, Clone, PartialEq)]
pub struct ConsentRequest {
    pub message: String,
    pub conflicts: Vec<IntervalId>,
}

/// Result of releasing the pointer or answering a consent request.
#[derive(Debug, Clone, PartialEq)]
pub enum Release<T> {
    /// There was no gesture to finish.
    Ignored,
    Discarded(Discard),
    /// `adjusted` is set when a minor overlap was trimmed away.
    Committed { intent: T, adjusted: bool },
    /// The machine is parked until [`TimelineEditor::answer_consent`].
    NeedsConsent(ConsentRequest),
    /// The user declined to keep the overlap.
    Rejected,
}

impl<T> Release<T> {
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Release<U> {
        match self {
            Release::Ignored => Release::Ignored,
            Release::Discarded(reason) => Release::Discarded(reason),
            Release::Committed { intent, adjusted } => Release::Committed {
                intent: f(intent),
                adjusted,
            },
            Release::NeedsConsent(request) => Release::NeedsConsent(request),
            Release::Rejected => Release::Rejected,
        }
    }
}

/// A committed edit the caller should write to the store.
#[derive(Debug, Clone, PartialEq)]
pub enum Intent {
    Create(CreateIntent),
    Update(ResizeIntent),
}

/// Answers overlap questions. May block, e.g. on a native message box.
pub trait Consent {
    fn confirm(&mut self, message: &str) -> bool;
}

impl<F: FnMut(&str) -> bool> Consent for F {
    fn confirm(&mut self, message: &str) -> bool {
        self(message)
    }
}

/// What the state machines need to look at on release.
pub struct EditContext<'a> {
    pub intervals: &'a [WorkInterval],
    pub projection: &'a Projection,
    pub now: NaiveDateTime,
    pub config: &'a EditorConfig,
}

pub(crate) fn consent_request(intervals: &[WorkInterval], conflicts: &[IntervalId]) -> ConsentRequest {
    let titles: Vec<&str> = intervals
        .iter()
        .filter(|i| conflicts.contains(&i.id))
        .map(|i| i.title.as_str())
        .collect();
    ConsentRequest {
        message: format!(
            "This overlaps {} by more than a few minutes. Keep the overlap?",
            titles.join(", ")
        ),
        conflicts: conflicts.to_vec(),
    }
}

/// Owns the gesture state of one day strip and the shared clock reference.
///
/// At most one gesture runs at a time; while a consent answer or a pending
/// creation is outstanding, new pointer-downs are refused.
#[derive(Debug, Clone)]
pub struct TimelineEditor {
    config: EditorConfig,
    now: NaiveDateTime,
    drag: DragCreate,
    resize: Resize,
    /// Handle grab distance in percent of the strip.
    hot_zone_percent: f64,
}

impl TimelineEditor {
    pub fn new(config: EditorConfig, now: NaiveDateTime) -> Self {
        Self {
            hot_zone_percent: config.handle_hot_zone_percent,
            config,
            now,
            drag: DragCreate::default(),
            resize: Resize::default(),
        }
    }

    pub fn now(&self) -> NaiveDateTime {
        self.now
    }

    /// Advance the clock. Only widens what is displayed, never edits data.
    pub fn tick(&mut self, now: NaiveDateTime) {
        self.now = now;
    }

    pub fn is_busy(&self) -> bool {
        !self.drag.is_idle() || !self.resize.is_idle()
    }

    /// A pointer is down and a drag or resize is being previewed.
    pub fn is_gesturing(&self) -> bool {
        self.drag.session().is_some() || self.resize.session().is_some()
    }

    /// Set the handle grab distance, usually the drawn handle width
    /// converted from pixels. Invalid values restore the configured zone.
    pub fn set_hot_zone(&mut self, percent: f64) {
        self.hot_zone_percent = if percent.is_finite() && percent >= 0.0 {
            percent
        } else {
            self.config.handle_hot_zone_percent
        };
    }

    /// Recompute window and lane layout for `day`'s intervals.
    pub fn view(&self, day: chrono::NaiveDate, intervals: &[WorkInterval]) -> Projection {
        let window = TimeWindow::compute(day, intervals, self.now, self.config.default_hours());
        lanes::project(intervals, window, self.now, self.config.min_render())
    }

    /// The resize handle under the pointer, if any; the nearer edge wins.
    pub fn hit_test(&self, projection: &Projection, percent: f64, lane: Option<usize>) -> Option<(IntervalId, Edge)> {
        let lane = lane?;
        let zone = self.hot_zone_percent;
        projection
            .items
            .iter()
            .filter(|item| item.lane == lane && item.resizable)
            .flat_map(|item| {
                [
                    (item.id, Edge::Start, (percent - item.left).abs()),
                    (item.id, Edge::End, (percent - item.right()).abs()),
                ]
            })
            .filter(|(_, _, distance)| *distance <= zone)
            .min_by(|a, b| a.2.total_cmp(&b.2))
            .map(|(id, edge, _)| (id, edge))
    }

    /// Begin a resize on a handle, otherwise a drag-create. Returns whether
    /// a gesture started.
    pub fn pointer_down(
        &mut self,
        intervals: &[WorkInterval],
        projection: &Projection,
        percent: f64,
        lane: Option<usize>,
    ) -> bool {
        if self.is_busy() {
            return false;
        }
        if !(0.0..=100.0).contains(&percent) {
            debug!("pointer-down outside the strip at {percent:.2}%");
            return false;
        }
        if let Some((id, edge)) = self.hit_test(projection, percent, lane) {
            if let Some(interval) = intervals.iter().find(|i| i.id == id) {
                return self.resize.begin(interval, edge, percent);
            }
        }
        self.drag.begin(percent, lane)
    }

    pub fn pointer_move(&mut self, percent: f64) {
        self.drag.update(percent);
        self.resize.update(percent);
    }

    pub fn pointer_up(&mut self, intervals: &[WorkInterval], projection: &Projection) -> Release<Intent> {
        let ctx = EditContext {
            intervals,
            projection,
            now: self.now,
            config: &self.config,
        };
        if self.resize.session().is_some() {
            return self.resize.release(&ctx).map(Intent::Update);
        }
        self.drag.release(&ctx).map(Intent::Create)
    }

    pub fn answer_consent(&mut self, accepted: bool) -> Release<Intent> {
        if self.resize.is_awaiting_consent() {
            return self.resize.answer_consent(accepted).map(Intent::Update);
        }
        if self.drag.is_awaiting_consent() {
            return self.drag.answer_consent(accepted).map(Intent::Create);
        }
        Release::Ignored
    }

    /// Release and, if an overlap needs it, ask `consent` right away.
    pub fn release_with(
        &mut self,
        intervals: &[WorkInterval],
        projection: &Projection,
        consent: &mut impl Consent,
    ) -> Release<Intent> {
        match self.pointer_up(intervals, projection) {
            Release::NeedsConsent(request) => {
                let accepted = consent.confirm(&request.message);
                self.answer_consent(accepted)
            }
            other => other,
        }
    }

    /// Hand the pending creation to the form; frees the editor for new gestures.
    pub fn take_pending_create(&mut self) -> Option<CreateIntent> {
        self.drag.take_pending()
    }

    pub fn pending_create(&self) -> Option<&CreateIntent> {
        self.drag.pending()
    }

    /// Drop every transient state. Stored intervals are never touched.
    pub fn cancel(&mut self) {
        self.drag.cancel();
        self.resize.cancel();
    }

    pub fn drag_session(&self) -> Option<&drag_create::DragSession> {
        self.drag.session()
    }

    pub fn resize_preview(&self, window: &TimeWindow) -> Option<(IntervalId, f64, f64)> {
        let min_width = window.duration_to_percent(self.config.min_render());
        self.resize.preview(window, min_width)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::interval::tests::at;
    use crate::model::Span;
    use chrono::NaiveDate;

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 4).unwrap()
    }

    fn editor() -> TimelineEditor {
        // the evening before, so the clock does not widen the window
        TimelineEditor::new(EditorConfig::default(), at(3, 22, 0))
    }

    fn apply(intervals: &mut Vec<WorkInterval>, intent: Intent) {
        match intent {
            Intent::Create(create) => intervals.push(WorkInterval::completed(
                create.title.unwrap_or_else(|| "New".into()),
                create.span.start,
                create.span.end,
            )),
            Intent::Update(update) => {
                if let Some(interval) = intervals.iter_mut().find(|i| i.id == update.id) {
                    interval.start = update.span.start;
                    interval.end = Some(update.span.end);
                }
            }
        }
    }

    #[test]
    fn create_next_to_neighbour_snaps_clear() {
        let intervals = vec![WorkInterval::completed("Review", at(4, 9, 0), at(4, 10, 0))];
        let mut editor = editor();
        let view = editor.view(day(), &intervals);
        let w = view.window;
        assert!(editor.pointer_down(&intervals, &view, w.to_percent(at(4, 9, 58)), None));
        editor.pointer_move(w.to_percent(at(4, 11, 0)));
        let release = editor.pointer_up(&intervals, &view);
        let Release::Committed { intent: Intent::Create(create), .. } = release else {
            panic!("expected a creation, got {release:?}");
        };
        assert_eq!(create.span, Span::new(at(4, 10, 0), at(4, 11, 0)));
        // the creation form still has to pick it up
        assert!(editor.is_busy());
        assert!(!editor.pointer_down(&intervals, &view, 50.0, None));
        assert!(editor.take_pending_create().is_some());
        assert!(!editor.is_busy());
    }

    #[test]
    fn declined_resize_keeps_end() {
        let mut intervals = vec![
            WorkInterval::completed("Review", at(4, 9, 0), at(4, 10, 0)),
            WorkInterval::completed("Build", at(4, 10, 30), at(4, 11, 30)),
        ];
        let mut editor = editor();
        let view = editor.view(day(), &intervals);
        let w = view.window;
        let lane = view.lane_for_title("Review");
        assert!(editor.pointer_down(&intervals, &view, w.to_percent(at(4, 10, 0)), lane));
        editor.pointer_move(w.to_percent(at(4, 10, 45)));

        let mut asked = None;
        let release = editor.release_with(&intervals, &view, &mut |message: &str| {
            asked = Some(message.to_string());
            false
        });
        assert_eq!(release, Release::Rejected);
        assert!(asked.is_some_and(|m| m.contains("Build")));
        if let Release::Committed { intent, .. } = release {
            apply(&mut intervals, intent);
        }
        assert_eq!(intervals[0].end, Some(at(4, 10, 0)));
        assert!(!editor.is_busy());
    }

    #[test]
    fn short_drag_creates_nothing() {
        let intervals: Vec<WorkInterval> = Vec::new();
        let mut editor = editor();
        let view = editor.view(day(), &intervals);
        assert_eq!(view.window.total_minutes(), 660);
        assert!(editor.pointer_down(&intervals, &view, 24.9, None));
        editor.pointer_move(25.1);
        assert_eq!(
            editor.pointer_up(&intervals, &view),
            Release::Discarded(Discard::TooShortGesture)
        );
        assert!(editor.pending_create().is_none());
        assert!(!editor.is_busy());
    }

    #[test]
    fn lanes_follow_titles() {
        let intervals = vec![
            WorkInterval::completed("Review", at(4, 9, 0), at(4, 10, 0)),
            WorkInterval::completed("Build", at(4, 11, 0), at(4, 12, 0)),
            WorkInterval::completed("Review", at(4, 14, 0), at(4, 15, 0)),
        ];
        let view = editor().view(day(), &intervals);
        let lane_of = |index: usize| {
            view.items
                .iter()
                .find(|item| item.id == intervals[index].id)
                .map(|item| item.lane)
        };
        assert_eq!(lane_of(0), Some(0));
        assert_eq!(lane_of(2), Some(0));
        assert_eq!(lane_of(1), Some(1));
    }

    #[test]
    fn handle_hit_test_prefers_nearer_edge() {
        let intervals = vec![WorkInterval::completed("Review", at(4, 9, 0), at(4, 10, 0))];
        let editor = editor();
        let view = editor.view(day(), &intervals);
        let w = view.window;
        let id = intervals[0].id;
        assert_eq!(
            editor.hit_test(&view, w.to_percent(at(4, 9, 0)) + 0.3, Some(0)),
            Some((id, Edge::Start))
        );
        assert_eq!(
            editor.hit_test(&view, w.to_percent(at(4, 10, 0)) - 0.3, Some(0)),
            Some((id, Edge::End))
        );
        assert_eq!(editor.hit_test(&view, w.to_percent(at(4, 9, 30)), Some(0)), None);
        assert_eq!(editor.hit_test(&view, w.to_percent(at(4, 9, 0)), Some(1)), None);
        assert_eq!(editor.hit_test(&view, w.to_percent(at(4, 9, 0)), None), None);
    }

    #[test]
    fn hot_zone_follows_the_drawn_handle() {
        let intervals = vec![WorkInterval::completed("Review", at(4, 9, 0), at(4, 10, 0))];
        let mut editor = editor();
        let view = editor.view(day(), &intervals);
        let near_end = view.window.to_percent(at(4, 10, 0)) + 1.5;
        assert_eq!(editor.hit_test(&view, near_end, Some(0)), None);

        // a wide handle on a narrow strip
        editor.set_hot_zone(2.0);
        assert_eq!(editor.hit_test(&view, near_end, Some(0)), Some((intervals[0].id, Edge::End)));

        editor.set_hot_zone(f64::NAN);
        assert_eq!(editor.hit_test(&view, near_end, Some(0)), None);
    }

    #[test]
    fn answering_without_a_question_is_ignored() {
        let mut editor = editor();
        assert_eq!(editor.answer_consent(true), Release::Ignored);
        assert!(!editor.is_busy());
    }

    #[test]
    fn running_interval_has_no_handles() {
        let intervals = vec![WorkInterval::running("Build", at(4, 9, 0))];
        let mut editor = TimelineEditor::new(EditorConfig::default(), at(4, 10, 0));
        let view = editor.view(day(), &intervals);
        let w = view.window;
        assert_eq!(editor.hit_test(&view, w.to_percent(at(4, 10, 0)), Some(0)), None);
        // a drag starting on it is a drag-create instead
        assert!(editor.pointer_down(&intervals, &view, w.to_percent(at(4, 10, 0)), Some(0)));
        assert!(editor.drag_session().is_some());
        editor.cancel();
        assert!(!editor.is_busy());
    }

    #[test]
    fn gestures_are_exclusive() {
        let intervals = vec![WorkInterval::completed("Review", at(4, 9, 0), at(4, 10, 0))];
        let mut editor = editor();
        let view = editor.view(day(), &intervals);
        let w = view.window;
        assert!(editor.pointer_down(&intervals, &view, w.to_percent(at(4, 10, 0)), Some(0)));
        assert!(!editor.pointer_down(&intervals, &view, 80.0, None));
        assert!(editor.resize_preview(&w).is_some());
        assert!(editor.drag_session().is_none());
    }

    #[test]
    fn pointer_outside_strip_is_ignored() {
        let mut editor = editor();
        let view = editor.view(day(), &[]);
        assert!(!editor.pointer_down(&[], &view, -2.0, None));
        assert_eq!(editor.pointer_up(&[], &view), Release::Ignored);
    }

    #[test]
    fn tick_only_moves_the_clock() {
        let intervals = vec![WorkInterval::running("Build", at(4, 9, 0))];
        let mut editor = TimelineEditor::new(EditorConfig::default(), at(4, 18, 0));
        assert_eq!(editor.view(day(), &intervals).window.end_hour, 19);
        editor.tick(at(4, 21, 10));
        assert_eq!(editor.view(day(), &intervals).window.end_hour, 23);
        assert_eq!(intervals[0].end, None);
    }

    #[test]
    fn accepted_changes_never_overlap_silently() {
        let mut intervals = vec![
            WorkInterval::completed("Review", at(4, 9, 0), at(4, 10, 0)),
            WorkInterval::completed("Build", at(4, 11, 0), at(4, 12, 0)),
        ];
        let mut editor = editor();
        // decline every consent request
        let mut decline = |_: &str| false;
        let gestures = [
            (at(4, 8, 30), at(4, 9, 3)),
            (at(4, 9, 58), at(4, 10, 40)),
            (at(4, 10, 10), at(4, 11, 50)),
            (at(4, 12, 2), at(4, 13, 0)),
            (at(4, 13, 0), at(4, 14, 0)),
        ];
        for (from, to) in gestures {
            let view = editor.view(day(), &intervals);
            let w = view.window;
            assert!(editor.pointer_down(&intervals, &view, w.to_percent(from), None));
            editor.pointer_move(w.to_percent(to));
            if let Release::Committed { intent, .. } = editor.release_with(&intervals, &view, &mut decline) {
                apply(&mut intervals, intent);
            }
            editor.take_pending_create();
        }
        for (i, a) in intervals.iter().enumerate() {
            for b in intervals.iter().skip(i + 1) {
                let (sa, sb) = (a.span(editor.now()), b.span(editor.now()));
                assert!(!sa.intersects(&sb), "{sa:?} overlaps {sb:?}");
            }
        }
        assert!(intervals.len() > 2);
    }
}
