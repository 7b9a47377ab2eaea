use bevy::prelude::*;
use bevy::window::PrimaryWindow;
use bevy_egui::{EguiContexts, egui};

use crate::editable::{DrawingState, EditableMap};
use crate::theme;
use crate::viewport::{MercatorViewport, Viewport};

fn drawing_label(state: DrawingState) -> &'static str {
    match state {
        DrawingState::Idle => "Idle",
        DrawingState::DrawingForward => "Drawing",
        DrawingState::DrawingBackward => "Drawing (backward)",
        DrawingState::HoleDrawing => "Drawing hole",
    }
}

/// Bottom bar: drawing state, feature count, zoom and cursor position
pub fn status_bar_ui(
    mut contexts: EguiContexts,
    map: Res<EditableMap>,
    viewport: Res<MercatorViewport>,
    window_query: Query<&Window, With<PrimaryWindow>>,
) -> Result {
    let state = map
        .drawing_editor()
        .map(|id| map.drawing_state(id))
        .unwrap_or_default();
    let drawn = map
        .drawing_editor()
        .and_then(|id| map.feature(id))
        .map(|f| f.kind().display_name());
    let cursor = window_query
        .single()
        .ok()
        .and_then(Window::cursor_position)
        .map(|p| viewport.unproject(p));

    egui::TopBottomPanel::bottom("status_bar")
        .frame(
            egui::Frame::side_top_panel(&contexts.ctx_mut()?.style())
                .inner_margin(egui::Margin::symmetric(12, 4)),
        )
        .show(contexts.ctx_mut()?, |ui| {
            ui.horizontal(|ui| {
                let color = if state == DrawingState::Idle {
                    theme::STATUS_IDLE
                } else {
                    theme::STATUS_DRAWING
                };
                let label = match drawn {
                    Some(kind) => format!("{}: {}", drawing_label(state), kind),
                    None => drawing_label(state).to_string(),
                };
                ui.colored_label(color, label);
                ui.separator();
                ui.label(format!("{} features", map.feature_count()));
                ui.separator();
                ui.label(format!("Zoom {:.1}", viewport.zoom));

                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    if let Some(latlng) = cursor {
                        ui.monospace(format!("{:.6}, {:.6}", latlng.lat, latlng.lng));
                    }
                });
            });
        });
    Ok(())
}
