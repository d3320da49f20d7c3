use chrono::{Duration, Local, NaiveDate, NaiveDateTime};
use log::{info, warn};

use crate::editor::{Discard, Intent, Release, TimelineEditor};
use crate::io::{IntervalPatch, IntervalStore, JsonStore, NewInterval};
use crate::model::IntervalId;
use crate::settings::{AppPaths, AppSettings};
use crate::ui;
use crate::ui::dialogs::{CreateForm, NativeConsent};

fn local_now() -> NaiveDateTime {
    Local::now().naive_local()
}

fn non_empty(text: &str) -> Option<String> {
    let text = text.trim();
    (!text.is_empty()).then(|| text.to_string())
}

/// Main application state.
pub struct TrackerApp {
    pub store: JsonStore,
    pub settings: AppSettings,
    paths: AppPaths,
    pub editor: TimelineEditor,
    pub day: NaiveDate,
    pub selected: Option<IntervalId>,

    // Dialog state
    pub create_form: Option<CreateForm>,
    pub show_about: bool,
    pub timer_title: String,

    // Status message
    pub status_message: String,
}

impl TrackerApp {
    pub fn new(cc: &eframe::CreationContext<'_>, paths: AppPaths) -> Self {
        // Register Phosphor icon font as a fallback so icons render inline with text
        let mut fonts = egui::FontDefinitions::default();
        egui_phosphor::add_to_fonts(&mut fonts, egui_phosphor::Variant::Regular);
        cc.egui_ctx.set_fonts(fonts);
        ui::theme::apply_theme(&cc.egui_ctx);

        let settings = AppSettings::load(&paths.settings_path);
        let book_path = settings.book_path(&paths);
        let (store, status_message) = match JsonStore::open(&book_path) {
            Ok(store) => {
                info!("loaded {} entries from {}", store.all().len(), book_path.display());
                (store, "Ready".to_string())
            }
            Err(e) => {
                warn!("could not open {}: {e:#}", book_path.display());
                (
                    JsonStore::in_memory(),
                    format!("Could not open {}; changes will not be saved", book_path.display()),
                )
            }
        };

        let now = local_now();
        Self {
            store,
            editor: TimelineEditor::new(settings.editor.clone(), now),
            timer_title: settings.last_timer_title.clone(),
            settings,
            paths,
            day: now.date(),
            selected: None,
            create_form: None,
            show_about: false,
            status_message,
        }
    }

    // --- Day navigation ---

    pub fn set_day(&mut self, day: NaiveDate) {
        if day == self.day {
            return;
        }
        self.editor.cancel();
        self.create_form = None;
        self.selected = None;
        self.day = day;
        self.status_message = day.format("%A %d %B %Y").to_string();
    }

    pub fn shift_day(&mut self, days: i64) {
        self.set_day(self.day + Duration::days(days));
    }

    pub fn go_to_today(&mut self) {
        self.set_day(self.editor.now().date());
    }

    // --- Timer ---

    pub fn start_timer(&mut self) {
        let title = self.timer_title.trim().to_string();
        // reuse the tags of a lane with the same title on the shown day
        let intervals = self.store.list(self.day);
        let view = self.editor.view(self.day, &intervals);
        let (reference, category) = view
            .lane_for_title(&title)
            .and_then(|lane| view.lanes.get(lane))
            .map(|lane| (lane.reference.clone(), lane.category.clone()))
            .unwrap_or_default();
        match self.store.start_timer(&title, reference, category, self.editor.now()) {
            Ok(id) => {
                self.selected = Some(id);
                self.status_message = format!("Tracking '{title}'");
                if self.settings.last_timer_title != title {
                    self.settings.last_timer_title = title;
                    self.save_settings();
                }
            }
            Err(e) => self.status_message = format!("Could not start: {e:#}"),
        }
    }

    pub fn pause_timer(&mut self) {
        let result = self.store.pause_active(self.editor.now());
        self.report(result, "Timer paused");
    }

    pub fn resume_timer(&mut self) {
        let result = self.store.resume_active(self.editor.now());
        self.report(result, "Timer resumed");
    }

    pub fn stop_timer(&mut self) {
        let result = self.store.stop_active(self.editor.now());
        self.report(result, "Timer stopped");
    }

    // --- Creation form ---

    pub fn submit_create_form(&mut self) {
        let Some(form) = self.create_form.take() else {
            return;
        };
        let new = NewInterval {
            title: form.title.trim().to_string(),
            reference: non_empty(&form.reference),
            category: non_empty(&form.category),
            span: form.span,
        };
        match self.store.create(new) {
            Ok(id) => {
                self.editor.take_pending_create();
                self.selected = Some(id);
                self.status_message = format!("Added '{}'", form.title.trim());
            }
            Err(e) => {
                self.status_message = format!("Could not add entry: {e:#}");
                self.create_form = Some(form);
            }
        }
    }

    pub fn dismiss_create_form(&mut self) {
        self.create_form = None;
        self.editor.cancel();
        self.status_message = "New entry discarded".to_string();
    }

    // --- Editor outcomes ---

    fn apply_release(&mut self, release: Release<Intent>) {
        match release {
            Release::Ignored | Release::Discarded(Discard::TooShortGesture) => {}
            Release::Discarded(Discard::Unchanged) => {
                self.status_message = "No change".to_string();
            }
            Release::Discarded(Discard::InvalidBounds) => {
                self.status_message = "Too short to keep".to_string();
            }
            Release::Committed {
                intent: Intent::Create(intent),
                adjusted,
            } => {
                self.create_form = Some(CreateForm::from_intent(&intent));
                if adjusted {
                    self.status_message = "Trimmed to avoid a small overlap".to_string();
                }
            }
            Release::Committed {
                intent: Intent::Update(intent),
                adjusted,
            } => {
                let result = self.store.update(intent.id, IntervalPatch::bounds(intent.span));
                let message = if adjusted {
                    "Updated, trimmed to avoid a small overlap"
                } else {
                    "Updated"
                };
                self.report(result, message);
            }
            Release::NeedsConsent(request) => {
                self.selected = request.conflicts.first().copied();
                self.status_message = request.message;
            }
            Release::Rejected => {
                self.status_message = "Overlap declined, nothing changed".to_string();
            }
        }
    }

    fn report(&mut self, result: anyhow::Result<()>, success: &str) {
        self.status_message = match result {
            Ok(()) => success.to_string(),
            Err(e) => {
                warn!("{e:#}");
                format!("Error: {e:#}")
            }
        };
    }

    fn save_settings(&self) {
        if let Err(e) = self.settings.save(&self.paths.settings_path) {
            warn!("could not save settings: {e:#}");
        }
    }
}

impl eframe::App for TrackerApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.editor.tick(local_now());
        ctx.request_repaint_after(std::time::Duration::from_secs(1));

        // A creation released through a late consent answer still gets its form
        if self.create_form.is_none() {
            if let Some(intent) = self.editor.pending_create() {
                self.create_form = Some(CreateForm::from_intent(intent));
            }
        }

        // Top panel: toolbar
        egui::TopBottomPanel::top("toolbar").show(ctx, |ui| {
            ui::toolbar::show_toolbar(self, ui);
        });

        let intervals = self.store.list(self.day);
        let projection = self.editor.view(self.day, &intervals);

        // Bottom panel: status bar
        egui::TopBottomPanel::bottom("status_bar")
            .exact_height(ui::theme::STATUS_BAR_HEIGHT)
            .frame(
                egui::Frame::default()
                    .fill(ui::theme::STATUS_BAR_BG)
                    .inner_margin(egui::Margin::symmetric(10.0, 0.0)),
            )
            .show(ctx, |ui| {
                ui.horizontal_centered(|ui| {
                    ui.label(
                        egui::RichText::new(&self.status_message)
                            .font(ui::theme::font_status())
                            .color(ui::theme::TEXT_SECONDARY),
                    );
                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        ui.label(
                            egui::RichText::new(format!(
                                "{:02}:00 – {:02}:00",
                                projection.window.start_hour, projection.window.end_hour
                            ))
                            .size(10.5)
                            .color(ui::theme::TEXT_DIM),
                        );
                        ui.label(egui::RichText::new(" · ").size(10.5).color(ui::theme::TEXT_DIM));
                        ui.label(
                            egui::RichText::new(format!("Entries: {}", intervals.len()))
                                .size(10.5)
                                .color(ui::theme::TEXT_DIM),
                        );
                    });
                });
            });

        // Right panel: summaries
        egui::SidePanel::right("summary_panel")
            .default_width(ui::theme::SIDE_PANEL_WIDTH)
            .resizable(true)
            .frame(
                egui::Frame::default()
                    .fill(ui::theme::BG_PANEL)
                    .inner_margin(egui::Margin::same(8.0))
                    .stroke(egui::Stroke::new(1.0, ui::theme::BORDER_SUBTLE)),
            )
            .show(ctx, |ui| {
                egui::ScrollArea::vertical().show(ui, |ui| {
                    ui::summary_panel::show_summary_panel(self.store.all(), self.day, self.editor.now(), ui);
                });
            });

        // Central panel: day strip
        let strip_frame = egui::Frame::default()
            .fill(ui::theme::BG_DARK)
            .inner_margin(egui::Margin::ZERO);
        let interaction = egui::CentralPanel::default()
            .frame(strip_frame)
            .show(ctx, |ui| {
                ui::day_strip::show_day_strip(
                    &intervals,
                    &projection,
                    &mut self.editor,
                    &mut NativeConsent,
                    &mut self.selected,
                    ui,
                )
            })
            .inner;
        if let Some(release) = interaction.release {
            self.apply_release(release);
        }

        // Dialogs
        if self.create_form.is_some() {
            ui::dialogs::show_create_form(self, ctx);
        }
        if self.show_about {
            ui::dialogs::show_about_dialog(self, ctx);
        }
    }
}
