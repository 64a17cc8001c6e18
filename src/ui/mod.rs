//! egui overlay UI: menu bar and controls help

pub mod help_panel;
pub mod menu_bar;

pub use help_panel::show_help_overlay;
pub use menu_bar::{FileAction, MenuBar};
