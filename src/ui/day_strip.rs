use crate::editor::{Consent, Intent, Projection, Release, TimelineEditor};
use crate::model::summary::format_duration;
use crate::model::window::is_live_day;
use crate::model::{IntervalId, IntervalStatus, TimeWindow, WorkInterval};
use crate::ui::theme;
use egui::{Color32, Pos2, Rect, Rounding, Sense, Stroke, Ui, Vec2};

const ROW_HEIGHT: f32 = theme::ROW_HEIGHT;
const ROW_GAP: f32 = theme::ROW_GAP;
const HEADER_HEIGHT: f32 = theme::HEADER_HEIGHT;
const GUTTER_WIDTH: f32 = theme::GUTTER_WIDTH;
const HANDLE_WIDTH: f32 = theme::HANDLE_WIDTH;

/// Result details from interactions in the day strip.
#[derive(Debug, Clone, Default)]
pub struct StripInteraction {
    /// Set on the frame a gesture was released.
    pub release: Option<Release<Intent>>,
}

/// Screen geometry of the editable part of the strip.
#[derive(Debug, Clone, Copy)]
struct StripGeometry {
    strip: Rect,
    lanes: usize,
}

impl StripGeometry {
    fn percent_at(&self, x: f32) -> f64 {
        ((x - self.strip.left()) / self.strip.width() * 100.0) as f64
    }

    fn width_to_percent(&self, width: f32) -> f64 {
        (width / self.strip.width().max(1.0) * 100.0) as f64
    }

    fn x_at(&self, percent: f64) -> f32 {
        self.strip.left() + self.strip.width() * (percent as f32 / 100.0)
    }

    fn lane_at(&self, y: f32) -> Option<usize> {
        let row = ((y - self.strip.top()) / (ROW_HEIGHT + ROW_GAP)).floor();
        (row >= 0.0 && (row as usize) < self.lanes).then_some(row as usize)
    }

    fn lane_top(&self, lane: usize) -> f32 {
        self.strip.top() + lane as f32 * (ROW_HEIGHT + ROW_GAP)
    }
}

/// Render the day strip and feed pointer gestures to `editor`.
pub fn show_day_strip(
    intervals: &[WorkInterval],
    projection: &Projection,
    editor: &mut TimelineEditor,
    consent: &mut impl Consent,
    selected: &mut Option<IntervalId>,
    ui: &mut Ui,
) -> StripInteraction {
    let mut interaction = StripInteraction::default();
    let available = ui.available_size();
    // one spare row below the lanes for new titles
    let rows = projection.lanes.len() + 1;
    let height = (HEADER_HEIGHT + rows as f32 * (ROW_HEIGHT + ROW_GAP) + 20.0).max(available.y);

    let (response, painter) = ui.allocate_painter(Vec2::new(available.x, height), Sense::click_and_drag());
    let rect = response.rect;
    let geometry = StripGeometry {
        strip: Rect::from_min_max(
            Pos2::new(rect.left() + GUTTER_WIDTH, rect.top() + HEADER_HEIGHT),
            rect.max,
        ),
        lanes: projection.lanes.len(),
    };

    // ── Gestures ────────────────────────────────────────────────────────────

    // grab zone matches the drawn handle at the current strip width
    editor.set_hot_zone(geometry.width_to_percent(HANDLE_WIDTH));

    if response.drag_started() {
        let origin = ui.input(|i| i.pointer.press_origin());
        if let Some(pos) = origin.filter(|p| p.y >= geometry.strip.top()) {
            editor.pointer_down(
                intervals,
                projection,
                geometry.percent_at(pos.x),
                geometry.lane_at(pos.y),
            );
        }
    }

    if response.dragged() && editor.is_gesturing() {
        if let Some(pos) = response.interact_pointer_pos() {
            if rect.contains(pos) {
                ui.ctx().set_cursor_icon(egui::CursorIcon::ResizeHorizontal);
                editor.pointer_move(geometry.percent_at(pos.x));
            } else {
                // leaving the strip abandons the gesture
                editor.cancel();
            }
        }
    }

    if response.drag_stopped() && editor.is_gesturing() {
        interaction.release = Some(editor.release_with(intervals, projection, consent));
    }

    if editor.is_gesturing() && ui.input(|i| i.key_pressed(egui::Key::Escape)) {
        editor.cancel();
    }

    if response.clicked() {
        *selected = response
            .interact_pointer_pos()
            .and_then(|pos| item_at(projection, &geometry, pos));
    }

    // ── Drawing ─────────────────────────────────────────────────────────────

    painter.rect_filled(rect, 0.0, theme::BG_DARK);
    draw_hour_header(&painter, rect, &geometry, &projection.window);
    draw_lanes(&painter, rect, &geometry, projection, rows);

    let resize_preview = editor.resize_preview(&projection.window);
    for item in &projection.items {
        let Some(interval) = intervals.iter().find(|i| i.id == item.id) else {
            continue;
        };
        let (left, width) = match resize_preview {
            Some((id, left, width)) if id == item.id => (left, width),
            _ => (item.left, item.width),
        };
        let top = geometry.lane_top(item.lane) + theme::BAR_INSET;
        let bar = Rect::from_min_max(
            Pos2::new(geometry.x_at(left), top),
            Pos2::new(geometry.x_at(left + width), top + ROW_HEIGHT - theme::BAR_INSET * 2.0),
        );
        let is_selected = *selected == Some(item.id);
        draw_bar(&painter, bar, interval, item.lane, is_selected);

        let hovered = response.hover_pos().is_some_and(|p| bar.expand(HANDLE_WIDTH).contains(p));
        if item.resizable && (hovered || is_selected) {
            draw_handles(&painter, bar);
        }
        if hovered && !editor.is_gesturing() {
            show_bar_tooltip(ui, interval, editor.now());
        }
    }

    if let Some(session) = editor.drag_session() {
        let (left, width) = session.extent();
        let preview = Rect::from_min_max(
            Pos2::new(geometry.x_at(left), geometry.strip.top()),
            Pos2::new(geometry.x_at(left + width), geometry.strip.bottom()),
        );
        painter.rect_filled(preview, Rounding::same(3.0), theme::DRAG_PREVIEW);
    }

    if is_live_day(projection.window.day, editor.now()) && projection.window.contains(editor.now()) {
        draw_now_line(&painter, &geometry, &projection.window, editor.now());
    }

    interaction
}

fn item_at(projection: &Projection, geometry: &StripGeometry, pos: Pos2) -> Option<IntervalId> {
    let lane = geometry.lane_at(pos.y)?;
    let percent = geometry.percent_at(pos.x);
    projection
        .items
        .iter()
        .find(|item| item.lane == lane && item.left <= percent && percent <= item.right())
        .map(|item| item.id)
}

fn draw_hour_header(painter: &egui::Painter, rect: Rect, geometry: &StripGeometry, window: &TimeWindow) {
    painter.rect_filled(
        Rect::from_min_size(rect.min, Vec2::new(rect.width(), HEADER_HEIGHT)),
        0.0,
        theme::BG_HEADER,
    );
    painter.line_segment(
        [
            Pos2::new(rect.left(), rect.top() + HEADER_HEIGHT),
            Pos2::new(rect.right(), rect.top() + HEADER_HEIGHT),
        ],
        Stroke::new(1.0, theme::BORDER_SUBTLE),
    );

    let hours = (window.end_hour - window.start_hour).max(1) as f64;
    for hour in window.hours() {
        let percent = (hour - window.start_hour) as f64 / hours * 100.0;
        let x = geometry.x_at(percent);
        painter.line_segment(
            [Pos2::new(x, geometry.strip.top()), Pos2::new(x, rect.bottom())],
            Stroke::new(0.5, theme::GRID_LINE),
        );
        if hour < window.end_hour {
            painter.text(
                Pos2::new(x + 3.0, rect.top() + HEADER_HEIGHT / 2.0),
                egui::Align2::LEFT_CENTER,
                format!("{hour:02}:00"),
                theme::font_sub(),
                theme::TEXT_SECONDARY,
            );
        }
    }
}

fn draw_lanes(painter: &egui::Painter, rect: Rect, geometry: &StripGeometry, projection: &Projection, rows: usize) {
    painter.rect_filled(
        Rect::from_min_max(
            Pos2::new(rect.left(), geometry.strip.top()),
            Pos2::new(geometry.strip.left(), rect.bottom()),
        ),
        0.0,
        theme::BG_GUTTER,
    );

    for row in 0..rows {
        let y = geometry.lane_top(row);
        if row % 2 == 0 {
            painter.rect_filled(
                Rect::from_min_size(Pos2::new(rect.left(), y), Vec2::new(rect.width(), ROW_HEIGHT + ROW_GAP)),
                0.0,
                theme::BG_ROW_EVEN,
            );
        }
        painter.line_segment(
            [
                Pos2::new(rect.left(), y + ROW_HEIGHT + ROW_GAP),
                Pos2::new(rect.right(), y + ROW_HEIGHT + ROW_GAP),
            ],
            Stroke::new(0.5, theme::BORDER_SUBTLE),
        );

        let (label, color) = match projection.lanes.get(row) {
            Some(lane) => (lane.title.as_str(), theme::TEXT_PRIMARY),
            None => ("drag to add…", theme::TEXT_DIM),
        };
        let clipped = painter.with_clip_rect(Rect::from_min_size(
            Pos2::new(rect.left(), y),
            Vec2::new(GUTTER_WIDTH - 6.0, ROW_HEIGHT),
        ));
        clipped.text(
            Pos2::new(rect.left() + 10.0, y + ROW_HEIGHT / 2.0),
            egui::Align2::LEFT_CENTER,
            label,
            theme::font_bar(),
            color,
        );
    }
}

fn draw_bar(painter: &egui::Painter, bar: Rect, interval: &WorkInterval, lane: usize, is_selected: bool) {
    let rounding = Rounding::same(theme::BAR_ROUNDING);

    // Soft shadow
    painter.rect_filled(bar.translate(Vec2::new(1.0, 2.0)), rounding, Color32::from_black_alpha(35));
    painter.rect_filled(bar, rounding, theme::bar_color(lane, interval.status));

    // Open intervals get a darker right cap to show they are still growing
    if interval.status != IntervalStatus::Completed {
        let cap = Rect::from_min_max(Pos2::new(bar.right() - 4.0, bar.top()), bar.max);
        painter.rect_filled(cap, rounding, theme::RUNNING_OVERLAY);
    }

    if is_selected {
        painter.rect_stroke(
            bar.expand(1.5),
            Rounding::same(theme::BAR_ROUNDING + 1.5),
            Stroke::new(2.0, theme::BORDER_ACCENT),
        );
    }

    if bar.width() > 30.0 {
        let galley = painter.layout_no_wrap(interval.title.clone(), theme::font_bar(), theme::TEXT_ON_BAR);
        let text_y = bar.top() + (bar.height() - galley.size().y) / 2.0;
        painter
            .with_clip_rect(bar)
            .galley(Pos2::new(bar.left() + 6.0, text_y), galley, Color32::TRANSPARENT);
    }
}

fn draw_handles(painter: &egui::Painter, bar: Rect) {
    let handle_h = bar.height() * 0.55;
    let handle_y = bar.center().y - handle_h / 2.0;
    for x in [bar.left() - 1.5, bar.right() - 2.5] {
        painter.rect_filled(
            Rect::from_min_size(Pos2::new(x, handle_y), Vec2::new(4.0, handle_h)),
            Rounding::same(2.0),
            theme::HANDLE_COLOR,
        );
    }
}

fn draw_now_line(painter: &egui::Painter, geometry: &StripGeometry, window: &TimeWindow, now: chrono::NaiveDateTime) {
    let x = geometry.x_at(window.to_percent(now));
    painter.line_segment(
        [Pos2::new(x, geometry.strip.top()), Pos2::new(x, geometry.strip.bottom())],
        Stroke::new(1.5, theme::NOW_LINE),
    );
    painter.circle_filled(Pos2::new(x, geometry.strip.top()), 3.0, theme::NOW_LINE);
}

fn show_bar_tooltip(ui: &Ui, interval: &WorkInterval, now: chrono::NaiveDateTime) {
    egui::show_tooltip_at_pointer(
        ui.ctx(),
        ui.layer_id(),
        egui::Id::new(("interval-tip", interval.id)),
        |ui| {
            ui.strong(&interval.title);
            let end = interval
                .end
                .map(|e| e.format("%H:%M").to_string())
                .unwrap_or_else(|| "now".to_string());
            ui.label(format!("{} → {}", interval.start.format("%H:%M"), end));
            ui.label(format!("Tracked: {}", format_duration(interval.tracked(now))));
            if let Some(reference) = &interval.reference {
                ui.label(format!("Ref: {reference}"));
            }
            if let Some(category) = &interval.category {
                ui.label(format!("Category: {category}"));
            }
        },
    );
}
