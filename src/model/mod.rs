pub mod interval;
pub mod summary;
pub mod window;

pub use interval::{IntervalId, IntervalStatus, Span, WorkInterval};
pub use window::TimeWindow;
