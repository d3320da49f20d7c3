use chrono::{Duration, NaiveDateTime};

use crate::model::{IntervalId, WorkInterval};

/// Closest start or end boundary of `intervals` to `candidate`, if it lies
/// strictly closer than `threshold`; otherwise `candidate` itself.
///
/// Open intervals only contribute their start. On equal distance the first
/// boundary found wins, walking each interval's start then end in slice order.
pub fn nearest_boundary(
    intervals: &[WorkInterval],
    candidate: NaiveDateTime,
    exclude: Option<IntervalId>,
    threshold: Duration,
) -> NaiveDateTime {
    let mut best: Option<(Duration, NaiveDateTime)> = None;

    let boundaries = intervals
        .iter()
        .filter(|i| Some(i.id) != exclude)
        .flat_map(|i| std::iter::once(i.start).chain(i.end));

    for boundary in boundaries {
        let distance = (boundary - candidate).abs();
        if distance >= threshold {
            continue;
        }
        match best {
            Some((best_distance, _)) if best_distance <= distance => {}
            _ => best = Some((distance, boundary)),
        }
    }

    best.map(|(_, boundary)| boundary).unwrap_or(candidate)
}
