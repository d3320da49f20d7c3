use chrono::{Duration, NaiveDateTime};

use crate::model::{IntervalId, Span, WorkInterval};

/// How a proposed span relates to the intervals already on the day.
#[derive(Debug, Clone, PartialEq)]
pub enum Resolution {
    /// Nothing intersects; the proposal stands as is.
    Clear(Span),
    /// A single minor overlap was trimmed so the proposal meets `neighbour`.
    Adjusted { span: Span, neighbour: IntervalId },
    /// The overlap is too large to fix silently; keeping `span` needs consent.
    NeedsConfirmation {
        span: Span,
        conflicts: Vec<IntervalId>,
    },
}

impl Resolution {
    /// The span the caller should apply if it goes ahead.
    pub fn span(&self) -> Span {
        match self {
            Resolution::Clear(span)
            | Resolution::Adjusted { span, .. }
            | Resolution::NeedsConfirmation { span, .. } => *span,
        }
    }

    pub fn is_adjusted(&self) -> bool {
        matches!(self, Resolution::Adjusted { .. })
    }
}

/// Classify `proposal` against `intervals`, ignoring `exclude`.
///
/// Open intervals extend to `now`. A lone intersection no longer than
/// `minor` where neither span contains the other is trimmed away by moving
/// the intruding proposal edge onto the neighbour's edge. Everything else
/// (several intersections, containment, a long overlap) is left to the user.
pub fn resolve(
    intervals: &[WorkInterval],
    proposal: Span,
    exclude: Option<IntervalId>,
    now: NaiveDateTime,
    minor: Duration,
) -> Resolution {
    let conflicts: Vec<(IntervalId, Span)> = intervals
        .iter()
        .filter(|i| Some(i.id) != exclude)
        .map(|i| (i.id, i.span(now)))
        .filter(|(_, span)| span.intersects(&proposal))
        .collect();

    match conflicts.as_slice() {
        [] => Resolution::Clear(proposal),
        [(neighbour, other)] if is_minor(&proposal, other, minor) => {
            let mut span = proposal;
            if proposal.start > other.start && proposal.start < other.end {
                span.start = other.end;
            } else {
                span.end = other.start;
            }
            Resolution::Adjusted {
                span,
                neighbour: *neighbour,
            }
        }
        _ => Resolution::NeedsConfirmation {
            span: proposal,
            conflicts: conflicts.iter().map(|(id, _)| *id).collect(),
        },
    }
}

fn is_minor(proposal: &Span, other: &Span, minor: Duration) -> bool {
    proposal.intersection(other) <= minor && !proposal.contains(other) && !other.contains(proposal)
}
