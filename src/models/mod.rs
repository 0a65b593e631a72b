// Models module for Remindo key-value storage
// All fields use camelCase for consistency with the stored JSON

pub mod common;
pub mod config;
pub mod task;

pub use common::{Priority, TaskFilter, Theme};
pub use config::Settings;
pub use task::{Task, TrashedTask};
