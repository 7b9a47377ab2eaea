use bevy::prelude::*;
use bevy_egui::{EguiContexts, egui};

use crate::config::{EditSettingRequest, EditorConfig};
use crate::editor::{CurrentTool, EditorTool, GraticuleSettings};

/// Main toolbar: tools, graticule toggle and input settings
pub fn toolbar_ui(
    mut contexts: EguiContexts,
    mut current_tool: ResMut<CurrentTool>,
    mut graticule: ResMut<GraticuleSettings>,
    config: Res<EditorConfig>,
    mut settings: MessageWriter<EditSettingRequest>,
) -> Result {
    egui::TopBottomPanel::top("main_toolbar")
        .frame(
            egui::Frame::side_top_panel(&contexts.ctx_mut()?.style())
                .inner_margin(egui::Margin::symmetric(12, 8)),
        )
        .show(contexts.ctx_mut()?, |ui| {
            ui.horizontal(|ui| {
                ui.spacing_mut().item_spacing.x = 4.0;

                for tool in EditorTool::all() {
                    let selected = current_tool.tool == *tool;
                    let button = egui::Button::new(
                        egui::RichText::new(tool_button_label(tool)).size(14.0).strong(),
                    )
                    .min_size(egui::vec2(0.0, 28.0))
                    .selected(selected);

                    let response = ui.add(button);
                    if response.clicked() {
                        current_tool.tool = *tool;
                    }
                    response.on_hover_text(tool_hint(tool));
                }

                ui.add_space(8.0);
                ui.separator();
                ui.add_space(8.0);

                ui.checkbox(&mut graticule.visible, "Graticule");

                let mut touch = config.data.touch;
                if ui.checkbox(&mut touch, "Touch handles").changed() {
                    settings.write(EditSettingRequest::Touch(touch));
                }

                let mut middle_markers = !config.data.skip_middle_markers;
                if ui.checkbox(&mut middle_markers, "Middle markers").changed() {
                    settings.write(EditSettingRequest::SkipMiddleMarkers(!middle_markers));
                }
            });
        });
    Ok(())
}

/// Get the button label for a tool (with keyboard shortcut)
fn tool_button_label(tool: &EditorTool) -> &'static str {
    match tool {
        EditorTool::Select => "Select [V]",
        EditorTool::Marker => "Marker [M]",
        EditorTool::Polyline => "Line [L]",
        EditorTool::Polygon => "Polygon [P]",
        EditorTool::Hole => "Hole [H]",
        EditorTool::Circle => "Circle [C]",
    }
}

fn tool_hint(tool: &EditorTool) -> &'static str {
    match tool {
        EditorTool::Select => {
            "Click a shape to edit it. Ctrl+click a line end to extend it, Alt+click a vertex to split"
        }
        EditorTool::Marker => "Click to place a marker",
        EditorTool::Polyline => "Click to add points, click the last point or press Enter to finish",
        EditorTool::Polygon => "Click to add points, click the first point or press Enter to finish",
        EditorTool::Hole => "Click inside a polygon to draw a hole in it",
        EditorTool::Circle => "Press and drag to size a circle",
    }
}
