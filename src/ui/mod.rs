pub mod day_strip;
pub mod dialogs;
pub mod summary_panel;
pub mod theme;
pub mod toolbar;
