pub mod client;
pub mod parse;
pub mod prompts;
pub mod provider;
pub mod providers;
pub mod registry;
pub mod types;

pub use client::PerceptionClient;
pub use provider::VisionProvider;
pub use types::{InventoryItem, ResourceCount, SlotIndex};
