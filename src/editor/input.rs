//! Mouse input into the edit layer.
//!
//! Presses on empty map with a drawing tool start a new shape first, then
//! every press, move and release is forwarded to [`EditableMap::handle_pointer`].

use bevy::prelude::*;
use bevy_egui::EguiContexts;

use crate::editable::{EditableMap, FeatureId, PointerButton, PointerEvent, PointerPhase, ShapeKind};
use crate::viewport::Viewport;

use super::events::ActiveFeature;
use super::params::{PointerParams, is_cursor_over_ui};
use super::tools::{CurrentTool, EditorTool};

/// Press position of a Select-tool click on empty map
#[derive(Default)]
pub struct SelectPress(Option<Vec2>);

#[allow(clippy::too_many_arguments)]
pub fn handle_pointer_input(
    pointer: PointerParams,
    mut cursor_moved: MessageReader<CursorMoved>,
    current_tool: Res<CurrentTool>,
    mut map: ResMut<EditableMap>,
    mut active: ResMut<ActiveFeature>,
    mut select_press: Local<SelectPress>,
    mut contexts: EguiContexts,
) {
    let moved = cursor_moved.read().count() > 0;
    let viewport = &*pointer.viewport;
    let over_ui = is_cursor_over_ui(&mut contexts);

    if moved && let Some(event) = pointer.event(PointerPhase::Move, PointerButton::Primary) {
        map.handle_pointer(viewport, event);
    }

    if !over_ui
        && pointer.mouse.just_pressed(MouseButton::Left)
        && let Some(event) = pointer.event(PointerPhase::Down, PointerButton::Primary)
    {
        select_press.0 = begin_tool_gesture(current_tool.tool, &mut map, viewport, &mut active, event);
        map.handle_pointer(viewport, event);
    }

    if !over_ui
        && pointer.mouse.just_pressed(MouseButton::Right)
        && let Some(event) = pointer.event(PointerPhase::Down, PointerButton::Secondary)
    {
        map.handle_pointer(viewport, event);
    }

    // Releases always reach the map so drags ending over the UI finish
    if pointer.mouse.just_released(MouseButton::Left)
        && let Some(event) = pointer.event(PointerPhase::Up, PointerButton::Primary)
    {
        map.handle_pointer(viewport, event);
        if let Some(origin) = select_press.0.take()
            && origin.distance(event.screen) < map.tools().options().click_tolerance
        {
            select_feature(&mut map, viewport, &mut active, event.screen);
        }
    }
}

/// Start whatever the current tool does on a press over empty map. Returns the
/// press origin when the Select tool should pick a feature on release.
fn begin_tool_gesture(
    tool: EditorTool,
    map: &mut EditableMap,
    viewport: &dyn Viewport,
    active: &mut ActiveFeature,
    event: PointerEvent,
) -> Option<Vec2> {
    if map.drawing() || map.handle_at(viewport, event.screen).is_some() {
        return None;
    }

    let started = match tool {
        EditorTool::Select => return Some(event.screen),
        EditorTool::Marker => map.start_marker(viewport, Some(event.latlng)),
        EditorTool::Polyline => map.start_polyline(viewport, None),
        EditorTool::Polygon => map.start_polygon(viewport, None),
        EditorTool::Circle => map.start_circle(viewport, Some(event.latlng)),
        EditorTool::Hole => {
            let Some(polygon) = hole_target(map, viewport, event.screen) else {
                debug!("Hole tool: no polygon under the pointer");
                return None;
            };
            if !map.edit_enabled(polygon) {
                map.enable_edit(viewport, polygon);
            }
            if !map.start_hole(viewport, polygon, None) {
                return None;
            }
            polygon
        }
    };
    active.set(started);
    None
}

/// Polygon under the pointer. A hole started anywhere else could never take
/// its first point.
fn hole_target(map: &EditableMap, viewport: &dyn Viewport, point: Vec2) -> Option<FeatureId> {
    map.feature_at(viewport, point)
        .filter(|id| map.feature(*id).is_some_and(|f| f.kind() == ShapeKind::Polygon))
}

fn select_feature(
    map: &mut EditableMap,
    viewport: &dyn Viewport,
    active: &mut ActiveFeature,
    point: Vec2,
) {
    match map.feature_at(viewport, point) {
        Some(id) => {
            map.toggle_edit(viewport, id);
            if map.edit_enabled(id) {
                active.set(id);
            } else {
                active.clear_if(id);
            }
        }
        None => active.clear(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::editable::EditToolsOptions;
    use crate::geo::LatLng;
    use crate::viewport::MercatorViewport;

    fn viewport() -> MercatorViewport {
        MercatorViewport::new(LatLng::new(45.0, 5.0), 14.0, Vec2::new(800.0, 600.0))
    }

    fn press(vp: &MercatorViewport, screen: Vec2) -> PointerEvent {
        PointerEvent::new(PointerPhase::Down, screen, vp.unproject(screen))
    }

    fn square(vp: &MercatorViewport) -> Vec<LatLng> {
        [(300.0, 200.0), (500.0, 200.0), (500.0, 400.0), (300.0, 400.0)]
            .into_iter()
            .map(|(x, y)| vp.unproject(Vec2::new(x, y)))
            .collect()
    }

    #[test]
    fn test_polyline_tool_starts_drawing() {
        let vp = viewport();
        let mut map = EditableMap::new(EditToolsOptions::default());
        let mut active = ActiveFeature::default();

        let origin = begin_tool_gesture(
            EditorTool::Polyline,
            &mut map,
            &vp,
            &mut active,
            press(&vp, Vec2::new(100.0, 100.0)),
        );

        assert!(origin.is_none());
        assert!(map.drawing());
        assert_eq!(map.drawing_editor(), active.get());
    }

    #[test]
    fn test_no_new_shape_while_drawing() {
        let vp = viewport();
        let mut map = EditableMap::new(EditToolsOptions::default());
        let mut active = ActiveFeature::default();
        let first = map.start_polygon(&vp, None);

        begin_tool_gesture(
            EditorTool::Marker,
            &mut map,
            &vp,
            &mut active,
            press(&vp, Vec2::new(100.0, 100.0)),
        );

        assert_eq!(map.feature_count(), 1);
        assert_eq!(map.drawing_editor(), Some(first));
    }

    #[test]
    fn test_select_click_toggles_edit() {
        let vp = viewport();
        let mut map = EditableMap::new(EditToolsOptions::default());
        let mut active = ActiveFeature::default();
        let id = map.create_polygon(square(&vp), Vec::new());
        map.connect(id);

        let origin = begin_tool_gesture(
            EditorTool::Select,
            &mut map,
            &vp,
            &mut active,
            press(&vp, Vec2::new(400.0, 300.0)),
        );
        assert_eq!(origin, Some(Vec2::new(400.0, 300.0)));

        select_feature(&mut map, &vp, &mut active, Vec2::new(400.0, 300.0));
        assert!(map.edit_enabled(id));
        assert_eq!(active.get(), Some(id));

        select_feature(&mut map, &vp, &mut active, Vec2::new(400.0, 300.0));
        assert!(!map.edit_enabled(id));
        assert_eq!(active.get(), None);
    }

    #[test]
    fn test_hole_tool_targets_polygon_under_pointer() {
        let vp = viewport();
        let mut map = EditableMap::new(EditToolsOptions::default());
        let mut active = ActiveFeature::default();
        let id = map.create_polygon(square(&vp), Vec::new());
        map.connect(id);

        begin_tool_gesture(
            EditorTool::Hole,
            &mut map,
            &vp,
            &mut active,
            press(&vp, Vec2::new(400.0, 300.0)),
        );

        assert!(map.edit_enabled(id));
        assert_eq!(map.drawing_editor(), Some(id));
        assert_eq!(active.get(), Some(id));
    }

    #[test]
    fn test_hole_tool_outside_polygons_does_nothing() {
        let vp = viewport();
        let mut map = EditableMap::new(EditToolsOptions::default());
        let mut active = ActiveFeature::default();
        let id = map.create_polygon(square(&vp), Vec::new());
        map.connect(id);

        begin_tool_gesture(
            EditorTool::Hole,
            &mut map,
            &vp,
            &mut active,
            press(&vp, Vec2::new(50.0, 50.0)),
        );

        assert!(!map.drawing());
        assert!(!map.edit_enabled(id));
    }

    #[test]
    fn test_hole_tool_ignores_active_polygon_away_from_pointer() {
        let vp = viewport();
        let mut map = EditableMap::new(EditToolsOptions::default());
        let mut active = ActiveFeature::default();
        let id = map.create_polygon(square(&vp), Vec::new());
        map.connect(id);
        map.enable_edit(&vp, id);
        active.set(id);

        begin_tool_gesture(
            EditorTool::Hole,
            &mut map,
            &vp,
            &mut active,
            press(&vp, Vec2::new(50.0, 50.0)),
        );

        assert!(!map.drawing());
        assert!(map.feature(id).unwrap().shape.holes().is_empty());
    }
}
