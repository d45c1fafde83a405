pub mod actions;
pub mod humanize;
pub mod input;

pub use actions::{ActionExecutor, ActionIntent, CoordSpace, Humanization};
pub use humanize::Humanizer;
pub use input::{EnigoDriver, InputDriver, KeyCode, MouseButton};
