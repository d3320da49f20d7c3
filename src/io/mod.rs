pub mod file;
pub mod store;

pub use store::{IntervalPatch, IntervalStore, JsonStore, NewInterval};
