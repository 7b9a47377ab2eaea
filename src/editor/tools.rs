use bevy::prelude::*;
use bevy::window::{CursorIcon, PrimaryWindow, SystemCursorIcon};
use bevy_egui::EguiContexts;

use crate::editable::EditableMap;
use crate::viewport::MercatorViewport;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EditorTool {
    /// Click a feature to toggle editing
    #[default]
    Select,
    Marker,
    Polyline,
    Polygon,
    /// Draw a hole in the clicked (or active) polygon
    Hole,
    Circle,
}

impl EditorTool {
    pub fn display_name(&self) -> &'static str {
        match self {
            EditorTool::Select => "Select (V)",
            EditorTool::Marker => "Marker (M)",
            EditorTool::Polyline => "Polyline (L)",
            EditorTool::Polygon => "Polygon (P)",
            EditorTool::Hole => "Hole (H)",
            EditorTool::Circle => "Circle (C)",
        }
    }

    pub fn shortcut(&self) -> KeyCode {
        match self {
            EditorTool::Select => KeyCode::KeyV,
            EditorTool::Marker => KeyCode::KeyM,
            EditorTool::Polyline => KeyCode::KeyL,
            EditorTool::Polygon => KeyCode::KeyP,
            EditorTool::Hole => KeyCode::KeyH,
            EditorTool::Circle => KeyCode::KeyC,
        }
    }

    pub fn cursor_icon(&self) -> CursorIcon {
        match self {
            EditorTool::Select => CursorIcon::System(SystemCursorIcon::Default),
            _ => CursorIcon::System(SystemCursorIcon::Crosshair),
        }
    }

    pub fn all() -> &'static [EditorTool] {
        &[
            EditorTool::Select,
            EditorTool::Marker,
            EditorTool::Polyline,
            EditorTool::Polygon,
            EditorTool::Hole,
            EditorTool::Circle,
        ]
    }

    /// Tools that start a new drawing on a map press
    pub fn is_drawing_tool(&self) -> bool {
        !matches!(self, EditorTool::Select)
    }
}

#[derive(Resource, Default)]
pub struct CurrentTool {
    pub tool: EditorTool,
}

pub fn handle_tool_shortcuts(
    keyboard: Res<ButtonInput<KeyCode>>,
    mut current_tool: ResMut<CurrentTool>,
    mut contexts: EguiContexts,
) {
    // Don't change tools if typing in a text field
    if let Ok(ctx) = contexts.ctx_mut()
        && ctx.wants_keyboard_input()
    {
        return;
    }

    let new_tool = EditorTool::all()
        .iter()
        .find(|tool| keyboard.just_pressed(tool.shortcut()));

    if let Some(tool) = new_tool
        && *tool != current_tool.tool
    {
        current_tool.tool = *tool;
    }
}

/// Escape cancels the active drawing, Enter commits it.
pub fn handle_drawing_shortcuts(
    keyboard: Res<ButtonInput<KeyCode>>,
    viewport: Res<MercatorViewport>,
    mut map: ResMut<EditableMap>,
    mut contexts: EguiContexts,
) {
    if let Ok(ctx) = contexts.ctx_mut()
        && ctx.wants_keyboard_input()
    {
        return;
    }
    if !map.drawing() {
        return;
    }

    if keyboard.just_pressed(KeyCode::Escape) {
        map.stop_drawing(&*viewport);
    } else if keyboard.just_pressed(KeyCode::Enter) || keyboard.just_pressed(KeyCode::NumpadEnter) {
        map.commit_drawing(&*viewport);
    }
}

/// Switching tools abandons a drawing in progress
pub fn cancel_drawing_on_tool_change(
    current_tool: Res<CurrentTool>,
    mut previous: Local<EditorTool>,
    viewport: Res<MercatorViewport>,
    mut map: ResMut<EditableMap>,
) {
    if current_tool.tool == *previous {
        return;
    }
    *previous = current_tool.tool;
    if map.drawing() {
        debug!("Tool changed to {:?}, cancelling drawing", current_tool.tool);
        map.stop_drawing(&*viewport);
    }
}

pub fn update_cursor_icon(
    current_tool: Res<CurrentTool>,
    viewport: Res<MercatorViewport>,
    map: Res<EditableMap>,
    window_query: Query<(Entity, &Window), With<PrimaryWindow>>,
    mut commands: Commands,
    mut contexts: EguiContexts,
) {
    let Ok((entity, window)) = window_query.single() else {
        return;
    };

    // Use default cursor over UI, tool cursor in editor space
    if let Ok(ctx) = contexts.ctx_mut()
        && ctx.is_pointer_over_area()
    {
        commands
            .entity(entity)
            .insert(CursorIcon::System(SystemCursorIcon::Default));
        return;
    }

    let over_handle = window
        .cursor_position()
        .is_some_and(|cursor| map.handle_at(&*viewport, cursor).is_some());
    let icon = if map.press().is_some_and(|press| press.dragging) {
        CursorIcon::System(SystemCursorIcon::Grabbing)
    } else if over_handle {
        CursorIcon::System(SystemCursorIcon::Move)
    } else {
        current_tool.tool.cursor_icon()
    };
    commands.entity(entity).insert(icon);
}
