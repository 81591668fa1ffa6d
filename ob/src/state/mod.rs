//! Kitchen board actor
//!
//! KitchenManager owns the KitchenBoard and processes messages via channels,
//! one mutation per message, and schedules the highlight auto-clear.

mod manager;
mod messages;

pub use manager::KitchenManager;
pub use messages::{BoardEvent, KitchenCommand};
