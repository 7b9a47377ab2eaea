use bevy::prelude::*;

use super::*;
use super::input::PointerButton;
use crate::geo::{CoordId, LatLng};
use crate::viewport::Viewport;

const SCALE: f32 = 10.0;

/// 1 degree = 10px, north up, origin at 0,0.
struct Flat;

impl Viewport for Flat {
    fn project(&self, latlng: LatLng) -> Vec2 {
        Vec2::new(latlng.lng as f32 * SCALE, -(latlng.lat as f32) * SCALE)
    }

    fn unproject(&self, point: Vec2) -> LatLng {
        LatLng::new(-(point.y / SCALE) as f64, (point.x / SCALE) as f64)
    }

    fn center(&self) -> LatLng {
        LatLng::default()
    }
}

fn ll(lat: f64, lng: f64) -> LatLng {
    LatLng::new(lat, lng)
}

struct Harness {
    map: EditableMap,
    vp: Flat,
}

impl Harness {
    fn new() -> Self {
        Self {
            map: EditableMap::new(EditToolsOptions::default()),
            vp: Flat,
        }
    }

    fn pointer(&mut self, phase: PointerPhase, at: LatLng, modifiers: Modifiers) {
        let event = PointerEvent::new(phase, self.vp.project(at), at).with_modifiers(modifiers);
        self.map.handle_pointer(&self.vp, event);
    }

    fn click(&mut self, at: LatLng) {
        self.click_with(at, Modifiers::NONE);
    }

    fn click_with(&mut self, at: LatLng, modifiers: Modifiers) {
        self.pointer(PointerPhase::Down, at, modifiers);
        self.pointer(PointerPhase::Up, at, modifiers);
    }

    fn drag(&mut self, from: LatLng, to: LatLng) {
        self.pointer(PointerPhase::Down, from, Modifiers::NONE);
        self.pointer(PointerPhase::Move, to, Modifiers::NONE);
        self.pointer(PointerPhase::Up, to, Modifiers::NONE);
    }

    fn kinds(&mut self) -> Vec<EditEventKind> {
        self.map.drain_events().into_iter().map(|e| e.kind).collect()
    }

    fn edited_polyline(&mut self, latlngs: &[LatLng]) -> FeatureId {
        let id = self.map.create_polyline(latlngs.iter().copied());
        self.map.connect(id);
        assert!(self.map.enable_edit(&self.vp, id));
        self.map.drain_events();
        id
    }

    fn edited_polygon(&mut self, outer: &[LatLng], holes: Vec<Vec<LatLng>>) -> FeatureId {
        let id = self.map.create_polygon(outer.iter().copied(), holes);
        self.map.connect(id);
        assert!(self.map.enable_edit(&self.vp, id));
        self.map.drain_events();
        id
    }

    fn shape(&self, id: FeatureId) -> &Shape {
        &self.map.feature(id).unwrap().shape
    }

    fn primary_ids(&self, id: FeatureId) -> Vec<CoordId> {
        self.shape(id).primary().unwrap().ids()
    }

    fn primary_latlngs(&self, id: FeatureId) -> Vec<LatLng> {
        self.shape(id).primary().unwrap().latlngs()
    }

    fn editor(&self, id: FeatureId) -> &Editor {
        self.map.feature(id).unwrap().editor().unwrap()
    }
}

fn square() -> Vec<LatLng> {
    vec![ll(0.0, 0.0), ll(0.0, 10.0), ll(10.0, 10.0), ll(10.0, 0.0)]
}

#[test]
fn test_enable_creates_one_vertex_per_coordinate() {
    let mut h = Harness::new();
    let id = h.edited_polygon(&square(), vec![vec![ll(2.0, 2.0), ll(2.0, 4.0), ll(4.0, 4.0)]]);
    assert_eq!(h.editor(id).vertex_count(), 7);
    // Closed rings: one middle marker per vertex
    assert_eq!(h.editor(id).middle_markers().count(), 7);
}

#[test]
fn test_open_path_has_one_middle_marker_per_segment() {
    let mut h = Harness::new();
    let id = h.edited_polyline(&[ll(0.0, 0.0), ll(0.0, 10.0), ll(0.0, 20.0)]);
    assert_eq!(h.editor(id).middle_markers().count(), 2);
    let first = h.primary_ids(id)[0];
    assert!(h.editor(id).vertex(first).unwrap().middle_marker().is_none());
}

#[test]
fn test_interior_delete_preserves_order() {
    let mut h = Harness::new();
    let (a, b, c, d) = (ll(0.0, 0.0), ll(0.0, 10.0), ll(0.0, 20.0), ll(0.0, 30.0));
    let id = h.edited_polyline(&[a, b, c, d]);
    let ids = h.primary_ids(id);

    assert!(h.map.delete_vertex(&h.vp, id, ids[1]));
    assert_eq!(h.primary_latlngs(id), vec![a, c, d]);

    // C is now linked to A
    let marker = h.editor(id).vertex(ids[2]).unwrap().middle_marker().unwrap();
    assert_eq!(marker.left(), ids[0]);
    assert_eq!(h.map.vertex_index(id, ids[2]), Some(1));
    assert!(h.kinds().contains(&EditEventKind::VertexDeleted));
}

#[test]
fn test_delete_at_min_vertex_is_rejected() {
    let mut h = Harness::new();
    let id = h.edited_polygon(&[ll(0.0, 0.0), ll(0.0, 10.0), ll(10.0, 10.0)], Vec::new());
    let ids = h.primary_ids(id);

    assert!(!h.map.delete_vertex(&h.vp, id, ids[0]));
    h.click(ll(0.0, 10.0));
    assert_eq!(h.primary_ids(id).len(), 3);
    assert!(!h.kinds().contains(&EditEventKind::VertexDeleted));
}

#[test]
fn test_click_deletes_above_min_vertex() {
    let mut h = Harness::new();
    let id = h.edited_polygon(&square(), Vec::new());
    h.click(ll(10.0, 10.0));
    assert_eq!(h.primary_latlngs(id), vec![ll(0.0, 0.0), ll(0.0, 10.0), ll(10.0, 0.0)]);
}

#[test]
fn test_emptied_hole_is_removed() {
    let mut h = Harness::new();
    let hole = vec![ll(2.0, 2.0), ll(2.0, 6.0), ll(6.0, 6.0)];
    let id = h.edited_polygon(&square(), vec![hole]);
    let hole_ids = h.shape(id).holes()[0].ids();

    for coord in hole_ids {
        assert!(h.map.delete_vertex(&h.vp, id, coord));
    }
    assert!(h.shape(id).holes().is_empty());
    assert_eq!(h.primary_ids(id).len(), 4);
    assert_eq!(h.editor(id).vertex_count(), 4);
}

#[test]
fn test_emptied_shape_is_deleted() {
    let mut h = Harness::new();
    let id = h.edited_polyline(&[ll(0.0, 0.0), ll(0.0, 10.0)]);
    for coord in h.primary_ids(id) {
        assert!(h.map.remove_vertex(&h.vp, id, coord));
    }
    assert!(h.map.feature(id).is_none());
    assert!(h.kinds().contains(&EditEventKind::ShapeDeleted));
}

#[test]
fn test_closed_ring_neighbours_wrap() {
    let mut h = Harness::new();
    let id = h.edited_polygon(&[ll(0.0, 0.0), ll(0.0, 10.0), ll(10.0, 10.0)], Vec::new());
    let ids = h.primary_ids(id);
    assert_eq!(h.map.next_vertex(id, ids[2]), Some(ids[0]));
    assert_eq!(h.map.previous_vertex(id, ids[0]), Some(ids[2]));
}

#[test]
fn test_middle_marker_hidden_when_vertices_close() {
    let mut h = Harness::new();
    let near = h.edited_polyline(&[ll(0.0, 0.0), ll(0.0, 0.1)]);
    let far = h.edited_polyline(&[ll(20.0, 0.0), ll(20.0, 10.0)]);

    let opacity = |h: &Harness, id| h.editor(id).middle_markers().next().unwrap().opacity();
    assert_eq!(opacity(&h, near), 0.0);
    assert_eq!(opacity(&h, far), 0.5);
}

#[test]
fn test_middle_marker_press_inserts_vertex() {
    let mut h = Harness::new();
    let id = h.edited_polyline(&[ll(0.0, 0.0), ll(0.0, 10.0)]);
    let ids = h.primary_ids(id);

    h.click(ll(0.0, 5.0));
    let path = h.primary_ids(id);
    assert_eq!(path.len(), 3);
    assert_eq!(path[0], ids[0]);
    assert_eq!(path[2], ids[1]);
    assert_eq!(h.primary_latlngs(id)[1], ll(0.0, 5.0));
    // Released without a vertex click, so nothing got deleted
    let kinds = h.kinds();
    assert!(kinds.contains(&EditEventKind::MiddleMarkerMouseDown));
    assert!(!kinds.contains(&EditEventKind::VertexClick));
    assert_eq!(h.editor(id).middle_markers().count(), 2);
}

#[test]
fn test_vertex_drag_keeps_identity() {
    let mut h = Harness::new();
    let id = h.edited_polyline(&[ll(0.0, 0.0), ll(0.0, 10.0), ll(0.0, 20.0)]);
    let ids = h.primary_ids(id);
    let before = h.map.feature(id).unwrap().revision();

    h.drag(ll(0.0, 10.0), ll(5.0, 10.0));
    assert_eq!(h.primary_ids(id), ids);
    assert_eq!(h.primary_latlngs(id)[1], ll(5.0, 10.0));
    assert!(h.map.feature(id).unwrap().revision() > before);

    let kinds = h.kinds();
    let start = kinds.iter().position(|k| *k == EditEventKind::VertexDragStart).unwrap();
    let drag = kinds.iter().position(|k| *k == EditEventKind::VertexDrag).unwrap();
    let end = kinds.iter().position(|k| *k == EditEventKind::VertexDragEnd).unwrap();
    assert!(start < drag && drag < end);
    assert!(!kinds.contains(&EditEventKind::VertexClick));
}

#[test]
fn test_cancelled_vertex_click_does_nothing() {
    let mut h = Harness::new();
    let id = h.edited_polygon(&square(), Vec::new());
    h.map.on(id, |event| {
        if event.kind == EditEventKind::VertexClick {
            event.cancel();
        }
    });
    h.click(ll(0.0, 10.0));
    assert_eq!(h.primary_ids(id).len(), 4);
}

#[test]
fn test_modifier_clicks_are_routed() {
    let mut h = Harness::new();
    let id = h.edited_polygon(&square(), Vec::new());
    h.click_with(ll(0.0, 10.0), Modifiers::ctrl());
    h.click_with(ll(0.0, 10.0), Modifiers::alt());
    h.click_with(ll(0.0, 10.0), Modifiers::shift());
    assert_eq!(h.primary_ids(id).len(), 4);
    let kinds = h.kinds();
    assert!(kinds.contains(&EditEventKind::VertexCtrlClick));
    assert!(kinds.contains(&EditEventKind::VertexAltClick));
    assert!(kinds.contains(&EditEventKind::VertexShiftClick));
}

#[test]
fn test_context_menu_on_vertex() {
    let mut h = Harness::new();
    h.edited_polyline(&[ll(0.0, 0.0), ll(0.0, 10.0)]);
    let at = ll(0.0, 10.0);
    let event = PointerEvent::new(PointerPhase::Down, h.vp.project(at), at)
        .with_button(PointerButton::Secondary);
    h.map.handle_pointer(&h.vp, event);
    assert_eq!(h.kinds(), vec![EditEventKind::VertexContextMenu]);
}

#[test]
fn test_draw_polyline_and_commit_on_last_vertex() {
    let mut h = Harness::new();
    let id = h.map.start_polyline(&h.vp, None);
    assert_eq!(h.map.drawing_state(id), DrawingState::DrawingForward);
    assert!(!h.map.feature(id).unwrap().is_connected());

    h.click(ll(0.0, 0.0));
    assert!(h.map.feature(id).unwrap().is_connected());
    h.click(ll(0.0, 10.0));
    h.click(ll(10.0, 10.0));
    assert_eq!(
        h.map.tools().forward_guide().anchor(),
        Some(ll(10.0, 10.0))
    );
    h.click(ll(10.0, 10.0));

    assert_eq!(h.primary_ids(id).len(), 3);
    assert!(!h.map.drawing());
    assert_eq!(h.map.drawing_state(id), DrawingState::Idle);
    assert!(!h.map.tools().forward_guide().is_attached());
    let kinds = h.kinds();
    let commit = kinds.iter().position(|k| *k == EditEventKind::DrawingCommit).unwrap();
    let end = kinds.iter().position(|k| *k == EditEventKind::DrawingEnd).unwrap();
    assert!(commit < end);
}

#[test]
fn test_polygon_commits_on_first_vertex() {
    let mut h = Harness::new();
    let id = h.map.start_polygon(&h.vp, None);
    for at in [ll(0.0, 0.0), ll(0.0, 10.0), ll(10.0, 10.0)] {
        h.click(at);
    }
    h.click(ll(0.0, 0.0));
    assert!(!h.map.drawing());
    assert_eq!(h.primary_ids(id).len(), 3);
}

#[test]
fn test_click_on_interior_drawn_vertex_deletes_it() {
    let mut h = Harness::new();
    let id = h.map.start_polyline(&h.vp, None);
    h.click(ll(0.0, 0.0));
    h.click(ll(0.0, 10.0));
    h.click(ll(10.0, 10.0));
    h.click(ll(0.0, 10.0));
    assert!(h.map.drawing());
    assert_eq!(h.primary_latlngs(id), vec![ll(0.0, 0.0), ll(10.0, 10.0)]);
}

#[test]
fn test_click_below_min_vertex_neither_commits_nor_deletes() {
    let mut h = Harness::new();
    let id = h.map.start_polygon(&h.vp, None);
    h.click(ll(0.0, 0.0));
    h.click(ll(0.0, 10.0));
    h.click(ll(0.0, 10.0));
    assert!(h.map.drawing());
    assert_eq!(h.primary_ids(id).len(), 2);
}

#[test]
fn test_cancelled_drawing_click_adds_nothing() {
    let mut h = Harness::new();
    h.map.tools_mut().on(|event| {
        if event.kind == EditEventKind::DrawingClick {
            event.cancel();
        }
    });
    let id = h.map.start_polyline(&h.vp, None);
    h.click(ll(0.0, 0.0));
    assert!(h.primary_ids(id).is_empty());
    assert!(!h.map.feature(id).unwrap().is_connected());
}

#[test]
fn test_drag_on_map_is_not_a_drawing_click() {
    let mut h = Harness::new();
    let id = h.map.start_polyline(&h.vp, None);
    h.drag(ll(0.0, 0.0), ll(0.0, 5.0));
    assert!(h.primary_ids(id).is_empty());
    assert!(h.kinds().contains(&EditEventKind::DrawingMouseUp));
}

#[test]
fn test_guides_follow_pointer() {
    let mut h = Harness::new();
    h.map.start_polygon(&h.vp, None);
    h.click(ll(0.0, 0.0));
    h.pointer(PointerPhase::Move, ll(3.0, 3.0), Modifiers::NONE);
    let tools = h.map.tools();
    assert_eq!(
        tools.forward_guide().segment(),
        Some((ll(0.0, 0.0), ll(3.0, 3.0)))
    );
    assert_eq!(
        tools.backward_guide().segment(),
        Some((ll(0.0, 0.0), ll(3.0, 3.0)))
    );
}

#[test]
fn test_new_drawing_cancels_previous() {
    let mut h = Harness::new();
    let a = h.map.start_polyline(&h.vp, None);
    h.map.drain_events();
    let b = h.map.start_polygon(&h.vp, None);

    assert_eq!(h.map.drawing_editor(), Some(b));
    assert_eq!(h.map.drawing_state(a), DrawingState::Idle);
    let events = h.map.drain_events();
    let cancel = events
        .iter()
        .position(|e| e.kind == EditEventKind::DrawingCancel && e.feature == a)
        .unwrap();
    let start = events
        .iter()
        .position(|e| e.kind == EditEventKind::DrawingStart && e.feature == b)
        .unwrap();
    assert!(cancel < start);
    // `a` never got a point, so it never reached the map
    assert!(h.map.feature(a).is_none());
}

#[test]
fn test_commit_and_cancel_are_noops_when_idle() {
    let mut h = Harness::new();
    h.edited_polyline(&[ll(0.0, 0.0), ll(0.0, 10.0)]);
    h.map.commit_drawing(&h.vp);
    h.map.stop_drawing(&h.vp);
    assert!(h.kinds().is_empty());
}

#[test]
fn test_disable_cancels_drawing() {
    let mut h = Harness::new();
    let id = h.map.start_polyline(&h.vp, None);
    h.click(ll(0.0, 0.0));
    h.map.disable_edit(&h.vp, id);
    assert!(!h.map.drawing());
    assert!(!h.map.edit_enabled(id));
    assert!(h.kinds().contains(&EditEventKind::DrawingCancel));
}

#[test]
fn test_hole_points_must_be_inside() {
    let mut h = Harness::new();
    let id = h.edited_polygon(&square(), Vec::new());
    assert!(h.map.start_hole(&h.vp, id, None));
    assert_eq!(h.map.drawing_state(id), DrawingState::HoleDrawing);

    h.click(ll(5.0, 5.0));
    h.click(ll(30.0, 30.0));
    assert_eq!(h.shape(id).holes()[0].latlngs(), vec![ll(5.0, 5.0)]);
}

#[test]
fn test_hole_seed_skips_containment() {
    let mut h = Harness::new();
    let id = h.edited_polygon(&square(), Vec::new());
    assert!(h.map.start_hole(&h.vp, id, Some(ll(30.0, 30.0))));
    assert_eq!(h.shape(id).holes()[0].len(), 1);
}

#[test]
fn test_deleting_drawn_hole_cancels_drawing() {
    let mut h = Harness::new();
    let id = h.edited_polygon(&square(), Vec::new());
    h.map.start_hole(&h.vp, id, Some(ll(5.0, 5.0)));
    let coord = h.shape(id).holes()[0].ids()[0];
    h.map.drain_events();

    h.click(ll(5.0, 5.0));
    assert!(h.shape(id).holes().is_empty());
    assert!(!h.map.drawing());
    let kinds = h.kinds();
    assert!(kinds.contains(&EditEventKind::DrawingCancel));
    assert!(h.editor(id).vertex(coord).is_none());
}

#[test]
fn test_split_polyline() {
    let mut h = Harness::new();
    let points = [ll(0.0, 0.0), ll(0.0, 10.0), ll(0.0, 20.0), ll(0.0, 30.0)];
    let id = h.edited_polyline(&points);
    let ids = h.primary_ids(id);

    assert!(h.map.split_at_vertex(&h.vp, id, ids[0]).is_none());
    let other = h.map.split_at_vertex(&h.vp, id, ids[1]).unwrap();

    assert_eq!(h.primary_latlngs(id), points[..2].to_vec());
    assert_eq!(h.primary_latlngs(other), points[1..].to_vec());
    assert!(h.map.edit_enabled(other));
    assert!(h.map.feature(other).unwrap().is_connected());
    let split = h
        .map
        .drain_events()
        .into_iter()
        .find(|e| e.kind == EditEventKind::Split)
        .unwrap();
    assert_eq!(split.feature, id);
    assert_eq!(split.related, Some(other));
}

#[test]
fn test_continue_backward_and_commit_on_first() {
    let mut h = Harness::new();
    let id = h.edited_polyline(&[ll(0.0, 0.0), ll(0.0, 10.0)]);
    let first = h.primary_ids(id)[0];
    let last = h.primary_ids(id)[1];

    assert!(h.map.continue_from_vertex(&h.vp, id, first));
    assert_eq!(h.map.drawing_state(id), DrawingState::DrawingBackward);
    assert_eq!(h.map.tools().backward_guide().anchor(), Some(ll(0.0, 0.0)));

    h.click(ll(0.0, -10.0));
    assert_eq!(h.primary_latlngs(id)[0], ll(0.0, -10.0));
    h.click(ll(0.0, -10.0));
    assert!(!h.map.drawing());
    assert_eq!(h.primary_ids(id).len(), 3);

    assert!(h.map.continue_from_vertex(&h.vp, id, last));
    assert_eq!(h.map.drawing_state(id), DrawingState::DrawingForward);
}

#[test]
fn test_continue_ignores_interior_vertex() {
    let mut h = Harness::new();
    let id = h.edited_polyline(&[ll(0.0, 0.0), ll(0.0, 10.0), ll(0.0, 20.0)]);
    let middle = h.primary_ids(id)[1];
    assert!(!h.map.continue_from_vertex(&h.vp, id, middle));
    assert!(!h.map.drawing());
}

#[test]
fn test_draw_marker() {
    let mut h = Harness::new();
    let id = h.map.start_marker(&h.vp, None);
    h.pointer(PointerPhase::Move, ll(4.0, 4.0), Modifiers::NONE);
    assert_eq!(h.shape(id).anchor(), Some(ll(4.0, 4.0)));

    h.click(ll(5.0, 5.0));
    assert_eq!(h.shape(id).anchor(), Some(ll(5.0, 5.0)));
    assert!(!h.map.drawing());
    assert!(h.map.feature(id).unwrap().is_connected());
}

#[test]
fn test_drag_edited_marker() {
    let mut h = Harness::new();
    let id = h.map.create_marker(ll(0.0, 0.0));
    h.map.connect(id);
    h.map.enable_edit(&h.vp, id);
    h.map.drain_events();

    h.drag(ll(0.0, 0.0), ll(2.0, 2.0));
    assert_eq!(h.shape(id).anchor(), Some(ll(2.0, 2.0)));
    let kinds = h.kinds();
    assert_eq!(kinds[0], EditEventKind::DragStart);
    assert_eq!(kinds[1], EditEventKind::Editing);
    assert!(kinds.contains(&EditEventKind::Drag));
    assert_eq!(kinds.last(), Some(&EditEventKind::DragEnd));
}

#[test]
fn test_draw_circle_by_dragging() {
    let mut h = Harness::new();
    let id = h.map.start_circle(&h.vp, None);
    h.pointer(PointerPhase::Move, ll(1.0, 1.0), Modifiers::NONE);
    assert_eq!(h.shape(id).anchor(), Some(ll(1.0, 1.0)));

    h.drag(ll(0.0, 0.0), ll(0.0, 10.0));
    assert!(!h.map.drawing());
    assert!(h.map.feature(id).unwrap().is_connected());
    let Shape::Circle { center, radius } = h.shape(id) else {
        panic!("expected a circle");
    };
    assert_eq!(center.latlng(), ll(0.0, 0.0));
    let expected = ll(0.0, 0.0).distance_to(ll(0.0, 10.0));
    assert!((radius - expected).abs() < 1.0);
}

#[test]
fn test_circle_center_drag_moves_resize_handle() {
    let mut h = Harness::new();
    let id = h.map.create_circle(ll(0.0, 0.0), 500_000.0);
    h.map.connect(id);
    h.map.enable_edit(&h.vp, id);
    let controls = h.editor(id).circle_controls().unwrap();
    let resize = controls.resize().unwrap();
    let before = controls.sequence().coord(resize).unwrap().latlng();

    h.drag(ll(0.0, 0.0), ll(0.0, 20.0));
    let Shape::Circle { center, radius } = h.shape(id) else {
        panic!("expected a circle");
    };
    assert_eq!(center.latlng(), ll(0.0, 20.0));
    assert_eq!(*radius, 500_000.0);
    let after = h.editor(id).vertex_latlng(h.shape(id), resize).unwrap();
    assert!((after.lng - before.lng - 20.0).abs() < 1e-3);
}

#[test]
fn test_feature_picking() {
    let mut h = Harness::new();
    let polygon = h.map.add_feature(
        Shape::Polygon {
            outer: crate::geo::CoordinateSequence::from_latlngs(square()),
            holes: Vec::new(),
        },
        PathStyle::default(),
    );
    let line = h.map.create_polyline([ll(20.0, 0.0), ll(20.0, 10.0)]);
    h.map.connect(line);

    assert_eq!(h.map.feature_at(&h.vp, h.vp.project(ll(5.0, 5.0))), Some(polygon));
    assert_eq!(h.map.feature_at(&h.vp, h.vp.project(ll(20.0, 5.0))), Some(line));
    assert_eq!(h.map.feature_at(&h.vp, h.vp.project(ll(50.0, 50.0))), None);
}

#[test]
fn test_feature_listeners_run_before_controller() {
    let mut h = Harness::new();
    let id = h.edited_polyline(&[ll(0.0, 0.0), ll(0.0, 10.0), ll(0.0, 20.0)]);
    h.map.on(id, |event| {
        if event.kind == EditEventKind::VertexClick {
            event.cancel();
        }
    });
    let seen = std::sync::Arc::new(std::sync::Mutex::new(Vec::new()));
    let sink = seen.clone();
    h.map.tools_mut().on(move |event| {
        sink.lock().unwrap().push((event.kind, event.is_cancelled()));
    });

    h.click(ll(0.0, 10.0));
    assert!(seen
        .lock()
        .unwrap()
        .contains(&(EditEventKind::VertexClick, true)));
}

#[test]
fn test_zoom_refresh_updates_middle_markers() {
    struct Zoomed;
    impl Viewport for Zoomed {
        fn project(&self, latlng: LatLng) -> Vec2 {
            Vec2::new(latlng.lng as f32, -(latlng.lat as f32))
        }
        fn unproject(&self, point: Vec2) -> LatLng {
            LatLng::new(-point.y as f64, point.x as f64)
        }
        fn center(&self) -> LatLng {
            LatLng::default()
        }
    }

    let mut h = Harness::new();
    let id = h.edited_polyline(&[ll(0.0, 0.0), ll(0.0, 10.0)]);
    let visible = |h: &Harness| h.editor(id).middle_markers().next().unwrap().is_visible();
    assert!(visible(&h));

    // 10px apart after zooming out: below 3 icon widths
    h.map.refresh_middle_markers(&Zoomed);
    assert!(!visible(&h));
}

#[test]
fn test_set_options_rebuilds_handles() {
    let mut h = Harness::new();
    let id = h.edited_polyline(&[ll(0.0, 0.0), ll(0.0, 10.0), ll(0.0, 20.0)]);
    let ids = h.primary_ids(id);
    let revision = h.map.feature(id).unwrap().revision();

    let options = EditToolsOptions {
        skip_middle_markers: true,
        ..default()
    };
    h.map.set_options(&h.vp, options);

    assert_eq!(h.editor(id).middle_markers().count(), 0);
    assert_eq!(h.editor(id).vertex_count(), 3);
    assert_eq!(h.primary_ids(id), ids);
    assert!(h.map.feature(id).unwrap().revision() > revision);
}

fn position_of(kinds: &[EditEventKind], kind: EditEventKind) -> usize {
    kinds.iter().position(|k| *k == kind).unwrap()
}

#[test]
fn test_continue_from_drawn_start_restarts_session() {
    let mut h = Harness::new();
    let id = h.map.start_polyline(&h.vp, None);
    h.click(ll(0.0, 0.0));
    h.click(ll(0.0, 10.0));
    let first = h.primary_ids(id)[0];
    h.map.drain_events();

    assert!(h.map.continue_from_vertex(&h.vp, id, first));
    assert_eq!(h.map.drawing_state(id), DrawingState::DrawingBackward);
    assert!(!h.map.tools().forward_guide().is_attached());
    let kinds = h.kinds();
    assert!(
        position_of(&kinds, EditEventKind::DrawingCancel)
            < position_of(&kinds, EditEventKind::DrawingStart)
    );

    h.pointer(PointerPhase::Move, ll(5.0, 5.0), Modifiers::NONE);
    assert_eq!(h.map.tools().forward_guide().segment(), None);
    assert_eq!(
        h.map.tools().backward_guide().segment(),
        Some((ll(0.0, 0.0), ll(5.0, 5.0)))
    );
}

#[test]
fn test_hole_start_cancels_outer_drawing() {
    let mut h = Harness::new();
    let id = h.map.start_polygon(&h.vp, None);
    for at in [ll(0.0, 0.0), ll(0.0, 10.0), ll(10.0, 10.0)] {
        h.click(at);
    }
    h.map.drain_events();

    assert!(h.map.start_hole(&h.vp, id, None));
    assert_eq!(h.map.drawing_state(id), DrawingState::HoleDrawing);
    assert_eq!(h.primary_ids(id).len(), 3);
    let kinds = h.kinds();
    assert!(
        position_of(&kinds, EditEventKind::DrawingCancel)
            < position_of(&kinds, EditEventKind::DrawingStart)
    );
}

#[test]
fn test_commit_waits_for_min_vertex() {
    let mut h = Harness::new();
    let id = h.map.start_polygon(&h.vp, None);
    h.click(ll(0.0, 0.0));
    h.click(ll(0.0, 10.0));
    h.map.drain_events();

    h.map.commit_drawing(&h.vp);
    assert!(h.map.drawing());
    assert!(!h.kinds().contains(&EditEventKind::DrawingCommit));

    h.click(ll(10.0, 10.0));
    h.map.commit_drawing(&h.vp);
    assert!(!h.map.drawing());
    assert_eq!(h.primary_ids(id).len(), 3);
    assert!(h.kinds().contains(&EditEventKind::DrawingCommit));
}

#[test]
fn test_commit_places_drawn_marker() {
    let mut h = Harness::new();
    let id = h.map.start_marker(&h.vp, Some(ll(1.0, 1.0)));
    h.map.commit_drawing(&h.vp);
    assert!(!h.map.drawing());
    assert!(h.map.feature(id).unwrap().is_connected());
}

#[test]
fn test_cancelled_start_leaves_no_feature() {
    let mut h = Harness::new();
    for _ in 0..3 {
        h.map.start_polyline(&h.vp, None);
        h.map.stop_drawing(&h.vp);
    }
    h.map.start_marker(&h.vp, Some(ll(1.0, 1.0)));
    h.map.stop_drawing(&h.vp);
    assert_eq!(h.map.feature_count(), 0);

    // Shapes that got a point stay on the map
    let id = h.map.start_polyline(&h.vp, None);
    h.click(ll(0.0, 0.0));
    h.map.stop_drawing(&h.vp);
    assert_eq!(h.map.feature_count(), 1);
    assert!(h.map.feature(id).unwrap().is_connected());
}

#[test]
fn test_cancelled_empty_hole_is_dropped() {
    let mut h = Harness::new();
    let id = h.edited_polygon(&square(), Vec::new());
    assert!(h.map.start_hole(&h.vp, id, None));
    assert_eq!(h.shape(id).holes().len(), 1);

    h.map.stop_drawing(&h.vp);
    assert!(h.shape(id).holes().is_empty());
    assert_eq!(h.primary_ids(id).len(), 4);
}
