use chrono::NaiveDateTime;
use log::debug;

use super::overlap::{self, Resolution};
use super::snap::nearest_boundary;
use super::{consent_request, Discard, EditContext, Edge, Release};
use crate::model::window::clamp_to_day;
use crate::model::{IntervalId, Span, TimeWindow, WorkInterval};

/// Pointer state while dragging one edge of an interval.
#[derive(Debug, Clone, PartialEq)]
pub struct ResizeSession {
    pub id: IntervalId,
    pub edge: Edge,
    pub original: Span,
    pub start_percent: f64,
    pub current: f64,
}

/// New bounds for an existing interval.
#[derive(Debug, Clone, PartialEq)]
pub struct ResizeIntent {
    pub id: IntervalId,
    pub edge: Edge,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
enum State {
    Idle,
    Resizing(ResizeSession),
    AwaitingConsent(ResizeIntent),
}

/// Drag an edge of a finished interval to move its start or end.
#[derive(Debug, Clone)]
pub struct Resize {
    state: State,
}

impl Default for Resize {
    fn default() -> Self {
        Self { state: State::Idle }
    }
}

impl Resize {
    pub fn is_idle(&self) -> bool {
        self.state == State::Idle
    }

    pub fn session(&self) -> Option<&ResizeSession> {
        match &self.state {
            State::Resizing(session) => Some(session),
            _ => None,
        }
    }

    pub fn is_awaiting_consent(&self) -> bool {
        matches!(self.state, State::AwaitingConsent(_))
    }

    /// Grab `edge` of `interval`. Only finished intervals can be resized.
    pub fn begin(&mut self, interval: &WorkInterval, edge: Edge, percent: f64) -> bool {
        let Some(end) = interval.end else {
            return false;
        };
        if !self.is_idle() || !interval.is_resizable() {
            return false;
        }
        debug!("resize of '{}' {edge:?} edge started at {percent:.2}%", interval.title);
        self.state = State::Resizing(ResizeSession {
            id: interval.id,
            edge,
            original: Span::new(interval.start, end),
            start_percent: percent,
            current: percent,
        });
        true
    }

    /// Preview only; the stored interval is untouched until release.
    pub fn update(&mut self, percent: f64) {
        if let State::Resizing(session) = &mut self.state {
            session.current = percent.clamp(0.0, 100.0);
        }
    }

    /// `(id, left, width)` of the live preview, never narrower than `min_width`.
    pub fn preview(&self, window: &TimeWindow, min_width: f64) -> Option<(IntervalId, f64, f64)> {
        let session = self.session()?;
        let delta = session.current - session.start_percent;
        let left = window.to_percent(session.original.start);
        let right = window.to_percent(session.original.end);
        let (left, right) = match session.edge {
            Edge::Start => ((left + delta).clamp(0.0, (right - min_width).max(0.0)), right),
            Edge::End => (left, (right + delta).clamp((left + min_width).min(100.0), 100.0)),
        };
        Some((session.id, left, right - left))
    }

    pub fn release(&mut self, ctx: &EditContext<'_>) -> Release<ResizeIntent> {
        let session = match std::mem::replace(&mut self.state, State::Idle) {
            State::Resizing(session) => session,
            other => {
                self.state = other;
                return Release::Ignored;
            }
        };

        let window = ctx.projection.window;
        let min_duration = ctx.config.min_duration();
        let original = session.original;
        let delta = window.percent_to_duration(session.current - session.start_percent);

        let moved = match session.edge {
            Edge::Start => clamp_to_day(window.day, original.start + delta).min(original.end - min_duration),
            Edge::End => clamp_to_day(window.day, original.end + delta).max(original.start + min_duration),
        };
        let snapped = nearest_boundary(
            ctx.intervals,
            moved,
            Some(session.id),
            ctx.config.snap_threshold(),
        );
        let with_edge = |t: NaiveDateTime| match session.edge {
            Edge::Start => Span::new(t, original.end),
            Edge::End => Span::new(original.start, t),
        };
        // a snap may not undercut the minimum either
        let proposal = if with_edge(snapped).duration() >= min_duration {
            with_edge(snapped)
        } else {
            with_edge(moved)
        };

        if proposal.duration() < min_duration {
            debug!("resize would leave {proposal:?}, reverting");
            return Release::Discarded(Discard::InvalidBounds);
        }
        if proposal == original {
            return Release::Discarded(Discard::Unchanged);
        }

        let resolution = match overlap::resolve(
            ctx.intervals,
            proposal,
            Some(session.id),
            ctx.now,
            ctx.config.minor_overlap(),
        ) {
            // only the grabbed edge may move; trimming the other one needs consent
            Resolution::Adjusted { span, neighbour } if !keeps_fixed_edge(session.edge, &original, &span) => {
                debug!("minor overlap with {neighbour} sits on the fixed edge");
                Resolution::NeedsConfirmation {
                    span: proposal,
                    conflicts: vec![neighbour],
                }
            }
            other => other,
        };
        let adjusted = resolution.is_adjusted();
        let intent = ResizeIntent {
            id: session.id,
            edge: session.edge,
            span: resolution.span(),
        };

        match resolution {
            Resolution::NeedsConfirmation { conflicts, .. } => {
                debug!("resize overlaps {} interval(s), asking", conflicts.len());
                self.state = State::AwaitingConsent(intent);
                Release::NeedsConsent(consent_request(ctx.intervals, &conflicts))
            }
            Resolution::Adjusted { .. } | Resolution::Clear(_) => {
                if intent.span.duration() < min_duration {
                    debug!("adjusted resize too short: {:?}", intent.span);
                    return Release::Discarded(Discard::InvalidBounds);
                }
                if intent.span == original {
                    return Release::Discarded(Discard::Unchanged);
                }
                debug!("resize committed {:?} (adjusted: {adjusted})", intent.span);
                Release::Committed { intent, adjusted }
            }
        }
    }

    pub fn answer_consent(&mut self, accepted: bool) -> Release<ResizeIntent> {
        match std::mem::replace(&mut self.state, State::Idle) {
            State::AwaitingConsent(intent) if accepted => {
                debug!("overlap accepted for resize to {:?}", intent.span);
                Release::Committed {
                    intent,
                    adjusted: false,
                }
            }
            State::AwaitingConsent(_) => Release::Rejected,
            other => {
                self.state = other;
                Release::Ignored
            }
        }
    }

    /// Drop all transient state; safe from any state.
    pub fn cancel(&mut self) {
        if !self.is_idle() {
            debug!("resize cancelled");
        }
        self.state = State::Idle;
    }
}

fn keeps_fixed_edge(edge: Edge, original: &Span, span: &Span) -> bool {
    match edge {
        Edge::Start => span.end == original.end,
        Edge::End => span.start == original.start,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::editor::lanes::project;
    use crate::editor::EditorConfig;
    use crate::model::interval::tests::at;
    use chrono::{Duration, NaiveDate};

    fn window() -> TimeWindow {
        TimeWindow::new(NaiveDate::from_ymd_opt(2024, 3, 4).unwrap(), 8, 19)
    }

    fn pct(t: NaiveDateTime) -> f64 {
        window().to_percent(t)
    }

    fn resize(
        intervals: &[WorkInterval],
        edge: Edge,
        from: NaiveDateTime,
        to: NaiveDateTime,
    ) -> (Resize, Release<ResizeIntent>) {
        resize_with(&EditorConfig::default(), intervals, edge, from, to)
    }

    /// Resize `intervals[0]` by dragging `edge` from `from` to `to`.
    fn resize_with(
        config: &EditorConfig,
        intervals: &[WorkInterval],
        edge: Edge,
        from: NaiveDateTime,
        to: NaiveDateTime,
    ) -> (Resize, Release<ResizeIntent>) {
        let projection = project(intervals, window(), at(4, 23, 0), Duration::minutes(5));
        let ctx = EditContext {
            intervals,
            projection: &projection,
            now: at(4, 23, 0),
            config,
        };
        let mut machine = Resize::default();
        assert!(machine.begin(&intervals[0], edge, pct(from)));
        machine.update(pct(to));
        let release = machine.release(&ctx);
        (machine, release)
    }

    #[test]
    fn end_edge_moves_end() {
        let intervals = vec![WorkInterval::completed("Review", at(4, 9, 0), at(4, 10, 0))];
        let (machine, release) = resize(&intervals, Edge::End, at(4, 10, 0), at(4, 11, 30));
        assert_eq!(
            release,
            Release::Committed {
                intent: ResizeIntent {
                    id: intervals[0].id,
                    edge: Edge::End,
                    span: Span::new(at(4, 9, 0), at(4, 11, 30)),
                },
                adjusted: false,
            }
        );
        assert!(machine.is_idle());
    }

    #[test]
    fn start_edge_cannot_cross_end() {
        let intervals = vec![WorkInterval::completed("Review", at(4, 9, 0), at(4, 10, 0))];
        let (_, release) = resize(&intervals, Edge::Start, at(4, 9, 0), at(4, 12, 0));
        let Release::Committed { intent, .. } = release else {
            panic!("expected a commit");
        };
        assert_eq!(intent.span, Span::new(at(4, 9, 55), at(4, 10, 0)));
    }

    #[test]
    fn no_resize_goes_below_minimum() {
        let intervals = vec![
            WorkInterval::completed("Review", at(4, 9, 0), at(4, 10, 0)),
            WorkInterval::completed("Build", at(4, 10, 30), at(4, 11, 0)),
        ];
        for minutes in (0..180).step_by(7) {
            let target = at(4, 8, 0) + Duration::minutes(minutes);
            for edge in [Edge::Start, Edge::End] {
                let from = if edge == Edge::Start { at(4, 9, 0) } else { at(4, 10, 0) };
                let (_, release) = resize(&intervals, edge, from, target);
                if let Release::Committed { intent, .. } = release {
                    assert!(intent.span.duration() >= Duration::minutes(5), "{intent:?}");
                }
            }
        }
    }

    #[test]
    fn large_overlap_rejected_keeps_bounds() {
        let intervals = vec![
            WorkInterval::completed("Review", at(4, 9, 0), at(4, 10, 0)),
            WorkInterval::completed("Build", at(4, 10, 30), at(4, 11, 30)),
        ];
        let (mut machine, release) = resize(&intervals, Edge::End, at(4, 10, 0), at(4, 10, 45));
        assert!(matches!(release, Release::NeedsConsent(_)));
        assert!(machine.is_awaiting_consent());
        assert_eq!(machine.answer_consent(false), Release::Rejected);
        assert!(machine.is_idle());
        assert_eq!(intervals[0].end, Some(at(4, 10, 0)));
    }

    #[test]
    fn accepted_overlap_is_committed() {
        let intervals = vec![
            WorkInterval::completed("Review", at(4, 9, 0), at(4, 10, 0)),
            WorkInterval::completed("Build", at(4, 10, 30), at(4, 11, 30)),
        ];
        let (mut machine, _) = resize(&intervals, Edge::End, at(4, 10, 0), at(4, 10, 45));
        let Release::Committed { intent, adjusted } = machine.answer_consent(true) else {
            panic!("expected a commit");
        };
        assert!(!adjusted);
        assert_eq!(intent.span.end, at(4, 10, 45));
    }

    #[test]
    fn release_snaps_to_other_intervals_only() {
        let intervals = vec![
            WorkInterval::completed("Review", at(4, 9, 0), at(4, 10, 0)),
            WorkInterval::completed("Build", at(4, 10, 30), at(4, 11, 30)),
        ];
        let (_, release) = resize(&intervals, Edge::End, at(4, 10, 0), at(4, 10, 24));
        let Release::Committed { intent, .. } = release else {
            panic!("expected a commit");
        };
        assert_eq!(intent.span.end, at(4, 10, 30));
    }

    #[test]
    fn unchanged_bounds_emit_nothing() {
        let intervals = vec![WorkInterval::completed("Review", at(4, 9, 0), at(4, 10, 0))];
        let (_, release) = resize(&intervals, Edge::End, at(4, 10, 0), at(4, 10, 0));
        assert_eq!(release, Release::Discarded(Discard::Unchanged));
    }

    fn unsnapped() -> EditorConfig {
        EditorConfig {
            snap_threshold_minutes: 0,
            ..EditorConfig::default()
        }
    }

    #[test]
    fn minor_overlap_trims_the_dragged_end() {
        let intervals = vec![
            WorkInterval::completed("Review", at(4, 9, 0), at(4, 10, 0)),
            WorkInterval::completed("Build", at(4, 10, 30), at(4, 11, 30)),
        ];
        let (machine, release) = resize_with(&unsnapped(), &intervals, Edge::End, at(4, 10, 0), at(4, 10, 33));
        assert_eq!(
            release,
            Release::Committed {
                intent: ResizeIntent {
                    id: intervals[0].id,
                    edge: Edge::End,
                    span: Span::new(at(4, 9, 0), at(4, 10, 30)),
                },
                adjusted: true,
            }
        );
        assert!(machine.is_idle());
    }

    #[test]
    fn trimmed_start_below_minimum_is_discarded() {
        // an earlier accepted overlap leaves little room after trimming
        let intervals = vec![
            WorkInterval::completed("Review", at(4, 10, 5), at(4, 10, 10)),
            WorkInterval::completed("Build", at(4, 9, 0), at(4, 10, 7)),
        ];
        let (machine, release) = resize_with(&unsnapped(), &intervals, Edge::Start, at(4, 10, 5), at(4, 10, 3));
        assert_eq!(release, Release::Discarded(Discard::InvalidBounds));
        assert!(machine.is_idle());
    }

    #[test]
    fn overlap_on_the_fixed_edge_asks_instead_of_moving_it() {
        let intervals = vec![
            WorkInterval::completed("Build", at(4, 9, 57), at(4, 11, 0)),
            WorkInterval::completed("Review", at(4, 9, 0), at(4, 10, 0)),
        ];
        let (mut machine, release) = resize(&intervals, Edge::End, at(4, 11, 0), at(4, 12, 0));
        let Release::NeedsConsent(request) = release else {
            panic!("expected a consent request, got {release:?}");
        };
        assert_eq!(request.conflicts, vec![intervals[1].id]);

        let Release::Committed { intent, adjusted } = machine.answer_consent(true) else {
            panic!("expected a commit");
        };
        assert!(!adjusted);
        assert_eq!(intent.span, Span::new(at(4, 9, 57), at(4, 12, 0)));
    }

    #[test]
    fn open_intervals_have_no_handles() {
        let mut machine = Resize::default();
        let running = WorkInterval::running("Build", at(4, 9, 0));
        assert!(!machine.begin(&running, Edge::End, 20.0));
        let mut paused = WorkInterval::running("Build", at(4, 9, 0));
        paused.pause(at(4, 9, 10)).unwrap();
        assert!(!machine.begin(&paused, Edge::Start, 20.0));
        assert!(machine.is_idle());
    }

    #[test]
    fn preview_keeps_fixed_edge() {
        let interval = WorkInterval::completed("Review", at(4, 9, 0), at(4, 10, 0));
        let mut machine = Resize::default();
        assert!(machine.begin(&interval, Edge::Start, pct(at(4, 9, 0))));
        machine.update(pct(at(4, 11, 0)));
        let min_width = window().duration_to_percent(Duration::minutes(5));
        let (_, left, width) = machine.preview(&window(), min_width).unwrap();
        assert!((left + width - pct(at(4, 10, 0))).abs() < 1e-9);
        assert!((width - min_width).abs() < 1e-9);

        machine.cancel();
        assert!(machine.preview(&window(), min_width).is_none());
    }
}
