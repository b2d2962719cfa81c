/// State management module
///
/// This module handles all application state, including:
/// - The capture/upload state machine (machine.rs)
/// - Shared data structures (data.rs)
/// - The persistent upload history (history.rs)

pub mod data;
pub mod history;
pub mod machine;
