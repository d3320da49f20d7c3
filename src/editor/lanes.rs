use chrono::{Duration, NaiveDateTime};

use crate::model::{IntervalId, IntervalStatus, TimeWindow, WorkInterval};

/// A horizontal row of the strip; every interval with this title lives here.
#[derive(Debug, Clone, PartialEq)]
pub struct Lane {
    pub title: String,
    pub reference: Option<String>,
    pub category: Option<String>,
}

/// Where one interval is drawn.
#[derive(Debug, Clone, PartialEq)]
pub struct LaneItem {
    pub id: IntervalId,
    pub lane: usize,
    pub left: f64,
    pub width: f64,
    pub status: IntervalStatus,
    pub resizable: bool,
}

impl LaneItem {
    pub fn right(&self) -> f64 {
        self.left + self.width
    }
}

/// Everything the display layer needs for one frame.
#[derive(Debug, Clone, PartialEq)]
pub struct Projection {
    pub window: TimeWindow,
    pub lanes: Vec<Lane>,
    pub items: Vec<LaneItem>,
}

impl Projection {
    pub fn lane_for_title(&self, title: &str) -> Option<usize> {
        self.lanes.iter().position(|l| l.title == title)
    }
}

/// One lane per distinct title, numbered in order of first appearance by
/// start time.
pub fn assign_lanes(intervals: &[WorkInterval]) -> Vec<Lane> {
    let mut lanes: Vec<Lane> = Vec::new();
    for interval in by_start(intervals) {
        if !lanes.iter().any(|l| l.title == interval.title) {
            lanes.push(Lane {
                title: interval.title.clone(),
                reference: interval.reference.clone(),
                category: interval.category.clone(),
            });
        }
    }
    lanes
}

/// Map intervals onto lanes and strip percentages. Items are never narrower
/// than `min_render` so a timer that just started can still be clicked.
pub fn project(
    intervals: &[WorkInterval],
    window: TimeWindow,
    now: NaiveDateTime,
    min_render: Duration,
) -> Projection {
    let lanes = assign_lanes(intervals);
    let min_width = window.duration_to_percent(min_render);

    let items = by_start(intervals)
        .into_iter()
        .map(|interval| {
            let span = interval.span(now);
            let mut left = window.to_percent(span.start);
            let width = (window.to_percent(span.end) - left).max(min_width);
            if left + width > 100.0 {
                left = (100.0 - width).max(0.0);
            }
            LaneItem {
                id: interval.id,
                lane: lanes
                    .iter()
                    .position(|l| l.title == interval.title)
                    .unwrap_or_default(),
                left,
                width,
                status: interval.status,
                resizable: interval.is_resizable(),
            }
        })
        .collect();

    Projection {
        window,
        lanes,
        items,
    }
}

fn by_start(intervals: &[WorkInterval]) -> Vec<&WorkInterval> {
    let mut sorted: Vec<&WorkInterval> = intervals.iter().collect();
    sorted.sort_by_key(|i| i.start);
    sorted
}
