//! Menu bar for the viewer
//!
//! Provides the File and View menus plus the FPS readout.

use std::time::Instant;

use crate::settings::ViewerSettings;

/// How long status messages stay visible
const STATUS_MESSAGE_SECS: f32 = 4.0;

/// File-related actions handled by the event loop
#[derive(Debug, Clone, Copy)]
pub enum FileAction {
    /// Open a model file via the native dialog
    OpenModel,
}

/// UI state for the menu bar
pub struct MenuBar {
    /// Pending file dialog action
    pub pending_action: Option<FileAction>,

    /// Status message to display
    status_message: Option<(String, Instant)>,
}

impl Default for MenuBar {
    fn default() -> Self {
        Self {
            pending_action: None,
            status_message: None,
        }
    }
}

impl MenuBar {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a status message that will display for a few seconds
    pub fn set_status(&mut self, message: impl Into<String>) {
        self.status_message = Some((message.into(), Instant::now()));
    }

    /// Take a pending file action, if any
    pub fn take_pending_action(&mut self) -> Option<FileAction> {
        self.pending_action.take()
    }

    /// Render the menu bar.
    ///
    /// Returns true if settings were modified.
    pub fn render(
        &mut self,
        ctx: &egui::Context,
        settings: &mut ViewerSettings,
        model_label: &str,
        fps: f64,
        frame_time_ms: f64,
    ) -> bool {
        let mut settings_changed = false;

        egui::TopBottomPanel::top("menu_bar").show(ctx, |ui| {
            egui::menu::bar(ui, |ui| {
                // File menu
                ui.menu_button("File", |ui| {
                    if ui.button("Open Model...").clicked() {
                        self.pending_action = Some(FileAction::OpenModel);
                        ui.close_menu();
                    }

                    ui.separator();
                    ui.label(format!("Current: {}", model_label));
                });

                // View menu
                ui.menu_button("View", |ui| {
                    if ui.checkbox(&mut settings.show_help, "Controls Overlay").changed() {
                        settings_changed = true;
                    }
                    if ui.checkbox(&mut settings.show_grid, "Reference Grid").changed() {
                        settings_changed = true;
                    }
                    if ui.checkbox(&mut settings.show_fps, "FPS Readout").changed() {
                        settings_changed = true;
                    }

                    ui.separator();

                    if ui
                        .checkbox(&mut settings.vsync_enabled, "VSync")
                        .on_hover_text("Sync the render loop to the display refresh rate")
                        .changed()
                    {
                        settings_changed = true;
                    }
                    let slider = ui.add_enabled(
                        !settings.vsync_enabled,
                        egui::Slider::new(&mut settings.target_fps, 24..=240).text("Target FPS"),
                    );
                    if slider.changed() {
                        settings_changed = true;
                    }
                });

                // Right side: FPS readout and transient status
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    if settings.show_fps {
                        ui.label(format!("{:.0} fps ({:.1} ms)", fps, frame_time_ms));
                    }

                    let expired = self
                        .status_message
                        .as_ref()
                        .is_some_and(|(_, shown_at)| {
                            shown_at.elapsed().as_secs_f32() >= STATUS_MESSAGE_SECS
                        });
                    if expired {
                        self.status_message = None;
                    }
                    if let Some((message, _)) = &self.status_message {
                        ui.label(egui::RichText::new(message).weak());
                    }
                });
            });
        });

        settings_changed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_take_pending_action() {
        let mut menu_bar = MenuBar::new();
        assert!(menu_bar.take_pending_action().is_none());

        menu_bar.pending_action = Some(FileAction::OpenModel);
        assert!(matches!(
            menu_bar.take_pending_action(),
            Some(FileAction::OpenModel)
        ));
        assert!(menu_bar.take_pending_action().is_none());
    }

    #[test]
    fn test_status_message_stored() {
        let mut menu_bar = MenuBar::new();
        menu_bar.set_status("Loaded model");
        assert!(menu_bar.status_message.is_some());
    }
}
