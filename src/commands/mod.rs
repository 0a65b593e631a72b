// Commands module - exports all command handlers
// Every handler takes the shared AppState explicitly

pub mod common;
pub mod settings;
pub mod task;
pub mod trash;
