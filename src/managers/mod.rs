// Opacity state managers
// Managers handle stateful collections: tabs, windows, drag sessions, history and bookmarks.

pub mod bookmark_manager;
pub mod drag_coordinator;
pub mod history_manager;
pub mod tab_manager;
pub mod window_manager;
