use chrono::Duration;
use serde::{Deserialize, Serialize};

/// Tunables of the timeline editor. Persisted as part of the app settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Releases snap to an existing boundary closer than this.
    pub snap_threshold_minutes: i64,
    /// Overlaps up to this long are resolved without asking.
    pub minor_overlap_minutes: i64,
    /// Shortest interval a resize may leave behind.
    pub min_duration_minutes: i64,
    /// Drags shorter than this (in percent of the strip) count as clicks.
    pub min_drag_percent: f64,
    /// Items are drawn at least this wide so running timers stay clickable.
    pub min_render_minutes: i64,
    /// Distance from an edge (in percent of the strip) that grabs a resize handle.
    pub handle_hot_zone_percent: f64,
    pub default_start_hour: u32,
    pub default_end_hour: u32,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            snap_threshold_minutes: 15,
            minor_overlap_minutes: 5,
            min_duration_minutes: 5,
            min_drag_percent: 1.0,
            min_render_minutes: 5,
            handle_hot_zone_percent: 0.8,
            default_start_hour: 8,
            default_end_hour: 19,
        }
    }
}

impl EditorConfig {
    pub fn snap_threshold(&self) -> Duration {
        Duration::minutes(self.snap_threshold_minutes)
    }

    pub fn minor_overlap(&self) -> Duration {
        Duration::minutes(self.minor_overlap_minutes)
    }

    pub fn min_duration(&self) -> Duration {
        Duration::minutes(self.min_duration_minutes)
    }

    pub fn min_render(&self) -> Duration {
        Duration::minutes(self.min_render_minutes)
    }

    pub fn default_hours(&self) -> (u32, u32) {
        (self.default_start_hour, self.default_end_hour)
    }

    /// Replace out-of-range values with defaults. Returns the names of the
    /// fields that were reset.
    pub fn sanitize(&mut self) -> Vec<&'static str> {
        let defaults = Self::default();
        let mut reset = Vec::new();

        let minutes = [
            ("snap_threshold_minutes", &mut self.snap_threshold_minutes, defaults.snap_threshold_minutes),
            ("minor_overlap_minutes", &mut self.minor_overlap_minutes, defaults.minor_overlap_minutes),
            ("min_duration_minutes", &mut self.min_duration_minutes, defaults.min_duration_minutes),
            ("min_render_minutes", &mut self.min_render_minutes, defaults.min_render_minutes),
        ];
        for (name, value, default) in minutes {
            if *value < 0 {
                *value = default;
                reset.push(name);
            }
        }

        let percents = [
            ("min_drag_percent", &mut self.min_drag_percent, defaults.min_drag_percent),
            ("handle_hot_zone_percent", &mut self.handle_hot_zone_percent, defaults.handle_hot_zone_percent),
        ];
        for (name, value, default) in percents {
            if !value.is_finite() || !(0.0..=100.0).contains(&*value) {
                *value = default;
                reset.push(name);
            }
        }

        if self.default_start_hour >= self.default_end_hour || self.default_end_hour > 24 {
            self.default_start_hour = defaults.default_start_hour;
            self.default_end_hour = defaults.default_end_hour;
            reset.push("default_start_hour");
            reset.push("default_end_hour");
        }
        reset
    }
}
