use crate::app::TrackerApp;
use crate::editor::{Consent, CreateIntent};
use crate::model::summary::format_duration;
use crate::model::Span;
use crate::ui::theme;
use egui::{Color32, Context, RichText, Window};
use log::debug;

/// Asks overlap questions with a blocking native message box.
pub struct NativeConsent;

impl Consent for NativeConsent {
    fn confirm(&mut self, message: &str) -> bool {
        let answer = rfd::MessageDialog::new()
            .set_title("Overlapping entries")
            .set_description(message)
            .set_buttons(rfd::MessageButtons::YesNo)
            .show();
        debug!("overlap consent answered {answer:?}");
        answer == rfd::MessageDialogResult::Yes
    }
}

/// Fields of the creation form, seeded from a pending drag-create.
#[derive(Debug, Clone, PartialEq)]
pub struct CreateForm {
    pub span: Span,
    pub title: String,
    pub reference: String,
    pub category: String,
}

impl CreateForm {
    pub fn from_intent(intent: &CreateIntent) -> Self {
        Self {
            span: intent.span,
            title: intent.title.clone().unwrap_or_default(),
            reference: intent.reference.clone().unwrap_or_default(),
            category: intent.category.clone().unwrap_or_default(),
        }
    }
}

/// Render the "New entry" form for a pending creation.
pub fn show_create_form(app: &mut TrackerApp, ctx: &Context) {
    let Some(form) = app.create_form.as_mut() else {
        return;
    };
    let mut submit = false;
    let mut dismiss = false;

    Window::new(RichText::new("New entry").strong().size(14.0))
        .resizable(false)
        .collapsible(false)
        .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
        .fixed_size([theme::DIALOG_WIDTH, 0.0])
        .show(ctx, |ui| {
            ui.add_space(4.0);
            ui.label(
                RichText::new(format!(
                    "{} → {}  ({})",
                    form.span.start.format("%H:%M"),
                    form.span.end.format("%H:%M"),
                    format_duration(form.span.duration())
                ))
                .color(theme::TEXT_SECONDARY),
            );
            ui.add_space(6.0);

            egui::Grid::new("create_form_grid")
                .num_columns(2)
                .striped(false)
                .spacing([12.0, 8.0])
                .show(ui, |ui| {
                    ui.label(RichText::new("Title").color(theme::TEXT_SECONDARY));
                    let title = ui.add_sized(
                        [220.0, 24.0],
                        egui::TextEdit::singleline(&mut form.title).hint_text("What did you work on?"),
                    );
                    if title.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter)) {
                        submit = true;
                    }
                    ui.end_row();

                    ui.label(RichText::new("Reference").color(theme::TEXT_SECONDARY));
                    ui.add_sized(
                        [220.0, 24.0],
                        egui::TextEdit::singleline(&mut form.reference).hint_text("Ticket, issue..."),
                    );
                    ui.end_row();

                    ui.label(RichText::new("Category").color(theme::TEXT_SECONDARY));
                    ui.add_sized([220.0, 24.0], egui::TextEdit::singleline(&mut form.category));
                    ui.end_row();
                });

            ui.add_space(6.0);
            ui.separator();
            ui.add_space(4.0);

            ui.horizontal(|ui| {
                let can_create = !form.title.trim().is_empty();
                let create_btn = egui::Button::new(RichText::new("Create").color(Color32::WHITE))
                    .fill(theme::ACCENT)
                    .rounding(egui::Rounding::same(4.0));
                if ui.add_enabled(can_create, create_btn).clicked() {
                    submit = true;
                }
                if ui.add_sized([80.0, 28.0], egui::Button::new("Cancel")).clicked() {
                    dismiss = true;
                }
            });
            ui.add_space(2.0);
        });

    if ctx.input(|i| i.key_pressed(egui::Key::Escape)) {
        dismiss = true;
    }

    if submit {
        app.submit_create_form();
    } else if dismiss {
        app.dismiss_create_form();
    }
}

/// Render the "About" dialog.
pub fn show_about_dialog(app: &mut TrackerApp, ctx: &Context) {
    let mut should_close = false;
    Window::new("About")
        .resizable(false)
        .collapsible(false)
        .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
        .fixed_size([280.0, 190.0])
        .show(ctx, |ui| {
            ui.vertical_centered(|ui| {
                ui.add_space(12.0);
                ui.heading(RichText::new("Rust Timetrack").strong());
                ui.add_space(2.0);
                ui.label(
                    RichText::new(format!("Version {}", env!("CARGO_PKG_VERSION"))).color(theme::TEXT_SECONDARY),
                );
                ui.add_space(10.0);
                ui.label("Drag on the strip to log time,");
                ui.label("drag a bar's edge to adjust it.");
                if let Some(path) = app.store.path() {
                    ui.add_space(6.0);
                    ui.label(RichText::new(path.display().to_string()).font(theme::font_small()).weak());
                }
                ui.add_space(14.0);
                if ui.add_sized([100.0, 28.0], egui::Button::new("Close")).clicked() {
                    should_close = true;
                }
            });
        });
    if should_close || ctx.input(|i| i.key_pressed(egui::Key::Escape)) {
        app.show_about = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::interval::tests::at;

    #[test]
    fn form_takes_prefilled_fields() {
        let intent = CreateIntent {
            span: Span::new(at(4, 10, 0), at(4, 11, 0)),
            title: Some("Review".into()),
            reference: None,
            category: Some("Dev".into()),
        };
        let form = CreateForm::from_intent(&intent);
        assert_eq!(form.title, "Review");
        assert_eq!(form.reference, "");
        assert_eq!(form.category, "Dev");
        assert_eq!(form.span, intent.span);
    }
}
