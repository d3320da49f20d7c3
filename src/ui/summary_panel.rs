use crate::model::summary::{format_duration, title_totals, week_summary, TitleTotal};
use crate::model::WorkInterval;
use crate::ui::theme;
use chrono::{NaiveDate, NaiveDateTime};
use egui::{RichText, Ui};

/// Totals for the displayed day and its week.
pub fn show_summary_panel(all: &[WorkInterval], day: NaiveDate, now: NaiveDateTime, ui: &mut Ui) {
    ui.label(RichText::new(day.format("%A %d %B").to_string()).strong());
    ui.add_space(4.0);

    let today = title_totals(all.iter().filter(|i| i.day() == day), now);
    if today.is_empty() {
        ui.label(RichText::new("Nothing logged").color(theme::TEXT_DIM));
    }
    egui::Grid::new("day_totals")
        .num_columns(2)
        .spacing([12.0, 4.0])
        .show(ui, |ui| {
            for total in &today {
                ui.label(&total.title).on_hover_text(total_details(total));
                ui.label(RichText::new(format_duration(total.tracked)).color(theme::TEXT_SECONDARY));
                ui.end_row();
            }
        });

    ui.add_space(10.0);
    ui.separator();

    let week = week_summary(all, day, now);
    ui.label(
        RichText::new(format!(
            "Week of {}  ·  {}",
            week.week_start.format("%d %b"),
            format_duration(week.total())
        ))
        .strong(),
    );
    ui.add_space(4.0);
    egui::Grid::new("week_days")
        .num_columns(2)
        .spacing([12.0, 2.0])
        .show(ui, |ui| {
            for (date, duration) in &week.days {
                let label = RichText::new(date.format("%a %d").to_string());
                ui.label(if *date == day { label.strong() } else { label });
                ui.label(RichText::new(format_duration(*duration)).font(theme::font_small()));
                ui.end_row();
            }
        });

    ui.add_space(8.0);
    egui::Grid::new("week_titles")
        .num_columns(2)
        .spacing([12.0, 2.0])
        .show(ui, |ui| {
            for total in &week.titles {
                ui.label(&total.title).on_hover_text(total_details(total));
                ui.label(RichText::new(format_duration(total.tracked)).color(theme::TEXT_SECONDARY));
                ui.end_row();
            }
        });
}

fn total_details(total: &TitleTotal) -> String {
    let entries = if total.intervals == 1 { "entry" } else { "entries" };
    match &total.category {
        Some(category) => format!("{category} · {} {entries}", total.intervals),
        None => format!("{} {entries}", total.intervals),
    }
}
