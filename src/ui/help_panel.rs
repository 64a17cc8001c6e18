//! Controls help overlay
//!
//! A small fixed card in the top-left corner listing the camera bindings.

/// Render the controls help overlay
pub fn show_help_overlay(ctx: &egui::Context) {
    egui::Window::new("3D Model Viewer")
        .anchor(egui::Align2::LEFT_TOP, [16.0, 40.0])
        .collapsible(false)
        .resizable(false)
        .show(ctx, |ui| {
            ui.spacing_mut().item_spacing.y = 4.0;
            binding(ui, "Left Click + Drag", "Rotate around model");
            binding(ui, "Right Click + Drag", "Pan camera");
            binding(ui, "Mouse Wheel", "Zoom in/out");
            ui.separator();
            binding(ui, "Home / 0", "Reset view");
            binding(ui, "F11", "Toggle fullscreen");
            binding(ui, "Esc", "Quit");
        });
}

fn binding(ui: &mut egui::Ui, keys: &str, action: &str) {
    ui.horizontal(|ui| {
        ui.label(egui::RichText::new(keys).strong());
        ui.label(action);
    });
}
