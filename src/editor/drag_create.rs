use log::debug;

use super::overlap::{self, Resolution};
use super::snap::nearest_boundary;
use super::{consent_request, Discard, EditContext, Release};
use crate::model::window::clamp_to_day;
use crate::model::Span;

/// Pointer state while sweeping out a new interval.
#[derive(Debug, Clone, PartialEq)]
pub struct DragSession {
    pub start: f64,
    pub current: f64,
    /// Lane under the pointer when the drag began.
    pub lane: Option<usize>,
}

impl DragSession {
    /// `(left, width)` of the live feedback rectangle.
    pub fn extent(&self) -> (f64, f64) {
        let left = self.start.min(self.current);
        (left, (self.start - self.current).abs())
    }
}

/// Resolved bounds for a new interval, to be finished by the creation form.
#[derive(Debug, Clone, PartialEq)]
pub struct CreateIntent {
    pub span: Span,
    pub title: Option<String>,
    pub reference: Option<String>,
    pub category: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
enum State {
    Idle,
    Dragging(DragSession),
    AwaitingConsent(CreateIntent),
    PendingCreate(CreateIntent),
}

/// Drag on empty strip space to create an interval.
#[derive(Debug, Clone)]
pub struct DragCreate {
    state: State,
}

impl Default for DragCreate {
    fn default() -> Self {
        Self { state: State::Idle }
    }
}

impl DragCreate {
    pub fn is_idle(&self) -> bool {
        self.state == State::Idle
    }

    pub fn session(&self) -> Option<&DragSession> {
        match &self.state {
            State::Dragging(session) => Some(session),
            _ => None,
        }
    }

    /// The accepted creation waiting for the form.
    pub fn pending(&self) -> Option<&CreateIntent> {
        match &self.state {
            State::PendingCreate(intent) => Some(intent),
            _ => None,
        }
    }

    pub fn is_awaiting_consent(&self) -> bool {
        matches!(self.state, State::AwaitingConsent(_))
    }

    /// Start dragging at `percent`. Refused unless idle and on the strip.
    pub fn begin(&mut self, percent: f64, lane: Option<usize>) -> bool {
        if !self.is_idle() || !(0.0..=100.0).contains(&percent) {
            return false;
        }
        debug!("drag-create started at {percent:.2}% on lane {lane:?}");
        self.state = State::Dragging(DragSession {
            start: percent,
            current: percent,
            lane,
        });
        true
    }

    /// Live feedback only, no snapping or overlap checks.
    pub fn update(&mut self, percent: f64) {
        if let State::Dragging(session) = &mut self.state {
            session.current = percent.clamp(0.0, 100.0);
        }
    }

    pub fn release(&mut self, ctx: &EditContext<'_>) -> Release<CreateIntent> {
        let session = match std::mem::replace(&mut self.state, State::Idle) {
            State::Dragging(session) => session,
            other => {
                self.state = other;
                return Release::Ignored;
            }
        };

        if (session.start - session.current).abs() < ctx.config.min_drag_percent {
            debug!("drag-create discarded as a click");
            return Release::Discarded(Discard::TooShortGesture);
        }

        let window = ctx.projection.window;
        let (left, width) = session.extent();
        let snap = |percent: f64| {
            let t = clamp_to_day(window.day, window.to_timestamp(percent));
            nearest_boundary(ctx.intervals, t, None, ctx.config.snap_threshold())
        };
        let proposal = Span::new(snap(left), snap(left + width));
        if !proposal.is_valid() {
            debug!("drag-create collapsed to {proposal:?}");
            return Release::Discarded(Discard::InvalidBounds);
        }

        let resolution = overlap::resolve(
            ctx.intervals,
            proposal,
            None,
            ctx.now,
            ctx.config.minor_overlap(),
        );
        let adjusted = resolution.is_adjusted();
        let lane = session.lane.and_then(|index| ctx.projection.lanes.get(index));
        let intent = CreateIntent {
            span: resolution.span(),
            title: lane.map(|l| l.title.clone()),
            reference: lane.and_then(|l| l.reference.clone()),
            category: lane.and_then(|l| l.category.clone()),
        };

        match resolution {
            Resolution::NeedsConfirmation { conflicts, .. } => {
                debug!("drag-create overlaps {} interval(s), asking", conflicts.len());
                self.state = State::AwaitingConsent(intent);
                Release::NeedsConsent(consent_request(ctx.intervals, &conflicts))
            }
            Resolution::Adjusted { .. } | Resolution::Clear(_) => {
                if !intent.span.is_valid() {
                    return Release::Discarded(Discard::InvalidBounds);
                }
                debug!("drag-create pending {:?} (adjusted: {adjusted})", intent.span);
                self.state = State::PendingCreate(intent.clone());
                Release::Committed { intent, adjusted }
            }
        }
    }

    pub fn answer_consent(&mut self, accepted: bool) -> Release<CreateIntent> {
        match std::mem::replace(&mut self.state, State::Idle) {
            State::AwaitingConsent(intent) if accepted => {
                debug!("overlap accepted for new interval {:?}", intent.span);
                self.state = State::PendingCreate(intent.clone());
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

    /// Hand the pending creation to the form and go back to idle.
    pub fn take_pending(&mut self) -> Option<CreateIntent> {
        match std::mem::replace(&mut self.state, State::Idle) {
            State::PendingCreate(intent) => Some(intent),
            other => {
                self.state = other;
                None
            }
        }
    }

    /// Drop all transient state; safe from any state.
    pub fn cancel(&mut self) {
        if !self.is_idle() {
            debug!("drag-create cancelled");
        }
        self.state = State::Idle;
    }
}
