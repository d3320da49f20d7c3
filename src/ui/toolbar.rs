use crate::app::TrackerApp;
use crate::model::IntervalStatus;
use crate::ui::theme;
use egui::{menu, RichText, Ui};
use egui_phosphor::regular as ph;

/// Render the top toolbar: day navigation, the timer and the help menu.
pub fn show_toolbar(app: &mut TrackerApp, ui: &mut Ui) {
    menu::bar(ui, |ui| {
        ui.menu_button(RichText::new("  Help  ").font(theme::font_header()), |ui| {
            if ui.button("About").clicked() {
                app.show_about = true;
                ui.close_menu();
            }
        });
        ui.separator();

        // ── Day navigation ──────────────────────────────────────────────
        if ui.button(ph::CARET_LEFT).on_hover_text("Previous day").clicked() {
            app.shift_day(-1);
        }
        if ui.button("Today").clicked() {
            app.go_to_today();
        }
        if ui.button(ph::CARET_RIGHT).on_hover_text("Next day").clicked() {
            app.shift_day(1);
        }
        let mut picked = app.day;
        ui.add(egui_extras::DatePickerButton::new(&mut picked).id_salt("day_picker"));
        if picked != app.day {
            app.set_day(picked);
        }
        ui.separator();

        // ── Timer ───────────────────────────────────────────────────────
        match app.store.active().map(|i| (i.title.clone(), i.status)) {
            None => {
                ui.add_sized(
                    [180.0, 20.0],
                    egui::TextEdit::singleline(&mut app.timer_title).hint_text("Timer title..."),
                );
                let start = ui.add_enabled(
                    !app.timer_title.trim().is_empty(),
                    egui::Button::new(format!("{}  Start", ph::PLAY)),
                );
                if start.clicked() {
                    app.start_timer();
                }
            }
            Some((title, status)) => {
                ui.label(RichText::new(title).strong());
                if status == IntervalStatus::Paused {
                    if ui.button(format!("{}  Resume", ph::PLAY)).clicked() {
                        app.resume_timer();
                    }
                } else if ui.button(format!("{}  Pause", ph::PAUSE)).clicked() {
                    app.pause_timer();
                }
                if ui.button(format!("{}  Stop", ph::STOP)).clicked() {
                    app.stop_timer();
                }
            }
        }

        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
            ui.label(
                RichText::new(format!("{} {}", ph::CLOCK, app.editor.now().format("%H:%M")))
                    .size(11.0)
                    .weak(),
            );
        });
    });
}
