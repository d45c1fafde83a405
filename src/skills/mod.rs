pub mod grid;
pub mod library;
pub mod types;

pub use grid::SlotGrid;
pub use library::SkillLibrary;
pub use types::{SkillOutcome, TaskSkills};
