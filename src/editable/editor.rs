//! The per-feature editor: vertex handles, drawing sessions and the click
//! rules that tie them together.
//!
//! An editor never owns its feature. Every operation borrows the feature's
//! [`Shape`] and an [`EditContext`] holding the feature's listeners, the
//! shared [`EditTools`] and the viewport.

use std::collections::HashMap;

use bevy::prelude::*;

use crate::geo::predicates::{hit_tolerance, point_in_polygon};
use crate::geo::{CoordId, CoordinateSequence, LatLng, SequenceId};
use crate::viewport::Viewport;

use super::circle::CircleControls;
use super::drawing::{DrawDirection, DrawingSession, DrawingState};
use super::events::{EditEvent, EditEventKind, Listeners};
use super::feature::{FeatureId, Shape, ShapeKind};
use super::input::PointerEvent;
use super::tools::{EditTools, EditToolsOptions};
use super::vertex::{VertexMarker, VertexRemoval};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditorKind {
    Marker,
    Polyline,
    Polygon,
    Circle,
}

impl EditorKind {
    pub fn for_shape(kind: ShapeKind) -> Self {
        match kind {
            ShapeKind::Marker => EditorKind::Marker,
            ShapeKind::Polyline => EditorKind::Polyline,
            ShapeKind::Polygon => EditorKind::Polygon,
            ShapeKind::Circle => EditorKind::Circle,
        }
    }

    /// Rings wrap: the last vertex is adjacent to the first
    pub fn closed(&self) -> bool {
        matches!(self, EditorKind::Polygon)
    }

    pub fn min_vertex(&self) -> usize {
        match self {
            EditorKind::Marker => 1,
            EditorKind::Polyline | EditorKind::Circle => 2,
            EditorKind::Polygon => 3,
        }
    }

    pub fn skips_middle_markers(&self) -> bool {
        matches!(self, EditorKind::Marker | EditorKind::Circle)
    }

    /// Split and continue only make sense on open paths
    pub fn can_split(&self) -> bool {
        matches!(self, EditorKind::Polyline)
    }

    pub fn draws_points(&self) -> bool {
        matches!(self, EditorKind::Polyline | EditorKind::Polygon)
    }
}

/// Per-feature overrides of the controller options
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EditorOptions {
    pub skip_middle_markers: Option<bool>,
    pub min_vertex: Option<usize>,
}

/// Borrowed surroundings of one editor operation.
pub struct EditContext<'a> {
    pub feature: FeatureId,
    pub listeners: &'a mut Listeners,
    pub tools: &'a mut EditTools,
    pub viewport: &'a dyn Viewport,
    /// Stroke weight of the feature, for hit tolerances
    pub weight: f32,
    redraw: bool,
}

impl<'a> EditContext<'a> {
    pub fn new(
        feature: FeatureId,
        listeners: &'a mut Listeners,
        tools: &'a mut EditTools,
        viewport: &'a dyn Viewport,
        weight: f32,
    ) -> Self {
        Self {
            feature,
            listeners,
            tools,
            viewport,
            weight,
            redraw: false,
        }
    }

    pub fn event(&self, kind: EditEventKind) -> EditEvent {
        EditEvent::new(kind, self.feature)
    }

    /// Dispatch to the feature's listeners, then to the controller's.
    pub fn fire(&mut self, mut event: EditEvent) -> EditEvent {
        self.listeners.dispatch(&mut event);
        self.tools.fire(&mut event);
        event
    }

    pub fn options(&self) -> &EditToolsOptions {
        self.tools.options()
    }

    pub(crate) fn request_redraw(&mut self) {
        self.redraw = true;
    }

    pub fn redraw_requested(&self) -> bool {
        self.redraw
    }
}

#[derive(Debug)]
pub struct Editor {
    pub(crate) kind: EditorKind,
    pub(crate) options: EditorOptions,
    enabled: bool,
    pub(crate) vertices: HashMap<CoordId, VertexMarker>,
    pub(crate) drawing: Option<DrawingSession>,
    pub(crate) circle: Option<CircleControls>,
}

impl Editor {
    pub fn new(kind: EditorKind, options: EditorOptions) -> Self {
        Self {
            kind,
            options,
            enabled: false,
            vertices: HashMap::new(),
            drawing: None,
            circle: None,
        }
    }

    pub fn for_shape(shape: &Shape, options: EditorOptions) -> Self {
        Self::new(EditorKind::for_shape(shape.kind()), options)
    }

    pub fn kind(&self) -> EditorKind {
        self.kind
    }

    pub fn enabled(&self) -> bool {
        self.enabled
    }

    pub fn min_vertex(&self) -> usize {
        self.options.min_vertex.unwrap_or(self.kind.min_vertex())
    }

    pub(crate) fn has_middle_markers(&self, cx: &EditContext<'_>) -> bool {
        let skip = self
            .options
            .skip_middle_markers
            .unwrap_or(self.kind.skips_middle_markers());
        !skip && !cx.options().skip_middle_markers
    }

    pub fn drawing_state(&self) -> DrawingState {
        self.drawing.map(|s| s.state()).unwrap_or_default()
    }

    pub fn drawing(&self) -> bool {
        self.drawing.is_some()
    }

    pub fn session(&self) -> Option<DrawingSession> {
        self.drawing
    }

    pub fn circle_controls(&self) -> Option<&CircleControls> {
        self.circle.as_ref()
    }

    pub fn vertices(&self) -> impl Iterator<Item = &VertexMarker> {
        self.vertices.values()
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Resolve a sequence id against the shape or the circle controls.
    pub fn seq<'s>(&'s self, shape: &'s Shape, id: SequenceId) -> Option<&'s CoordinateSequence> {
        match self.circle.as_ref() {
            Some(controls) if controls.sequence().id() == id => Some(controls.sequence()),
            _ => shape.sequence(id),
        }
    }

    pub(crate) fn seq_mut<'s>(
        &'s mut self,
        shape: &'s mut Shape,
        id: SequenceId,
    ) -> Option<&'s mut CoordinateSequence> {
        match self.circle.as_mut() {
            Some(controls) if controls.sequence().id() == id => Some(controls.sequence_mut()),
            _ => shape.sequence_mut(id),
        }
    }

    /// Sequences that get vertex handles
    fn handle_groups(&self, shape: &Shape) -> Vec<SequenceId> {
        match self.circle.as_ref() {
            Some(controls) => vec![controls.sequence().id()],
            None => shape.sequences().iter().map(|s| s.id()).collect(),
        }
    }

    pub fn enable(&mut self, shape: &Shape, cx: &mut EditContext<'_>) {
        if self.enabled {
            return;
        }
        if let Shape::Circle { center, radius } = shape {
            self.circle = Some(CircleControls::new(*center, *radius, cx.viewport));
        }
        self.enabled = true;
        self.init_vertex_markers(shape, cx);
        cx.fire(cx.event(EditEventKind::Enable));
        debug!("Editing enabled on {:?}", cx.feature);
    }

    pub fn disable(&mut self, cx: &mut EditContext<'_>) {
        if !self.enabled {
            return;
        }
        self.vertices.clear();
        cx.fire(cx.event(EditEventKind::Disable));
        self.enabled = false;
        if self.drawing.is_some() {
            self.cancel_drawing(cx);
        }
        debug!("Editing disabled on {:?}", cx.feature);
    }

    /// Rebuild every handle from the current geometry.
    pub fn reset(&mut self, shape: &Shape, cx: &mut EditContext<'_>) {
        self.vertices.clear();
        self.init_vertex_markers(shape, cx);
    }

    fn init_vertex_markers(&mut self, shape: &Shape, cx: &mut EditContext<'_>) {
        for group in self.handle_groups(shape) {
            let ids = self.seq(shape, group).map(|s| s.ids()).unwrap_or_default();
            for coord in ids {
                self.add_vertex_marker(shape, cx, group, coord);
            }
        }
    }

    /// Ask for a redraw and tell listeners the geometry changed.
    pub(crate) fn refresh(&self, cx: &mut EditContext<'_>) {
        cx.request_redraw();
        cx.fire(cx.event(EditEventKind::Editing));
    }

    /// Outcome of a click on one of this editor's vertices.
    pub fn on_vertex_click(
        &mut self,
        shape: &mut Shape,
        cx: &mut EditContext<'_>,
        coord: CoordId,
        pointer: PointerEvent,
    ) -> Option<VertexRemoval> {
        let latlng = self.vertex_latlng(shape, coord)?;
        let click = cx.fire(
            cx.event(EditEventKind::VertexClick)
                .with_vertex(coord, latlng)
                .with_pointer(pointer),
        );
        if click.is_cancelled() {
            return None;
        }

        let routed = if pointer.modifiers.ctrl {
            Some(EditEventKind::VertexCtrlClick)
        } else if pointer.modifiers.alt {
            Some(EditEventKind::VertexAltClick)
        } else if pointer.modifiers.shift {
            Some(EditEventKind::VertexShiftClick)
        } else {
            None
        };
        if let Some(kind) = routed {
            cx.fire(cx.event(kind).with_vertex(coord, latlng).with_pointer(pointer));
            return None;
        }

        if self.click_commits(shape, coord) {
            self.commit_drawing(cx, Some(pointer));
            return None;
        }
        if self.vertex_can_be_deleted(shape, coord) {
            return self.delete_vertex(shape, cx, coord);
        }
        None
    }

    /// A click on the terminal vertex of the sequence being drawn finishes it.
    fn click_commits(&self, shape: &Shape, coord: CoordId) -> bool {
        let Some(session) = self.drawing else {
            return false;
        };
        let Some(vertex) = self.vertices.get(&coord) else {
            return false;
        };
        if session.sequence != Some(vertex.sequence()) {
            return false;
        }
        let Some(seq) = self.seq(shape, vertex.sequence()) else {
            return false;
        };
        let Some(index) = vertex.index(seq) else {
            return false;
        };
        if seq.len() < self.min_vertex() {
            return false;
        }
        match session.direction {
            DrawDirection::Forward => {
                index == VertexMarker::last_index(seq) || (index == 0 && self.kind.closed())
            }
            DrawDirection::Backward => index == 0,
        }
    }

    pub fn start_drawing(&mut self, shape: &Shape, cx: &mut EditContext<'_>, direction: DrawDirection) {
        let session = match self.drawing {
            Some(mut session) => {
                session.direction = direction;
                session
            }
            None => {
                let sequence = match self.circle.as_ref() {
                    Some(controls) => Some(controls.sequence().id()),
                    None => shape.primary().map(|s| s.id()),
                };
                DrawingSession::new(direction, sequence)
            }
        };
        self.drawing = Some(session);
        cx.tools.register_for_drawing(cx.feature);
        cx.fire(cx.event(EditEventKind::DrawingStart));
        debug!("Drawing {:?} on {:?}", session.state(), cx.feature);
    }

    pub fn start_drawing_forward(&mut self, shape: &Shape, cx: &mut EditContext<'_>) {
        self.start_drawing(shape, cx, DrawDirection::Forward);
        if !self.kind.draws_points() {
            return;
        }
        cx.tools.guide_mut(DrawDirection::Forward).attach();
        if self.kind.closed() {
            cx.tools.guide_mut(DrawDirection::Backward).attach();
        }
    }

    pub fn start_drawing_backward(&mut self, shape: &Shape, cx: &mut EditContext<'_>) {
        self.start_drawing(shape, cx, DrawDirection::Backward);
        cx.tools.guide_mut(DrawDirection::Backward).attach();
    }

    pub fn continue_forward(&mut self, shape: &Shape, cx: &mut EditContext<'_>) {
        if let Some(last) = shape.primary().and_then(|s| s.last()) {
            cx.tools
                .guide_mut(DrawDirection::Forward)
                .anchor_at(last.latlng());
        }
        self.start_drawing_forward(shape, cx);
    }

    pub fn continue_backward(&mut self, shape: &Shape, cx: &mut EditContext<'_>) {
        if let Some(first) = shape.primary().and_then(|s| s.first()) {
            cx.tools
                .guide_mut(DrawDirection::Backward)
                .anchor_at(first.latlng());
        }
        self.start_drawing_backward(shape, cx);
    }

    /// Which way a continue request on `coord` would extend the path, if any.
    pub fn continue_direction(&self, shape: &Shape, coord: CoordId) -> Option<DrawDirection> {
        if !self.kind.can_split() {
            return None;
        }
        let seq = shape.primary()?;
        match seq.index_of(coord)? {
            0 => Some(DrawDirection::Backward),
            i if i == VertexMarker::last_index(seq) => Some(DrawDirection::Forward),
            _ => None,
        }
    }

    /// Begin drawing an empty (or seeded) shape.
    pub fn new_shape(&mut self, shape: &mut Shape, cx: &mut EditContext<'_>, latlng: Option<LatLng>) {
        self.start_drawing_forward(shape, cx);
        if let Some(latlng) = latlng {
            self.new_point_forward(shape, cx, latlng);
        }
    }

    /// Start a hole in a polygon. A seed point skips the containment check.
    pub fn new_hole(
        &mut self,
        shape: &mut Shape,
        cx: &mut EditContext<'_>,
        latlng: Option<LatLng>,
    ) -> bool {
        if self.kind != EditorKind::Polygon {
            return false;
        }
        let Some(hole) = shape.add_hole() else {
            return false;
        };
        self.drawing = Some(DrawingSession::hole(hole));
        self.start_drawing_forward(shape, cx);
        if let Some(latlng) = latlng {
            self.new_point_forward(shape, cx, latlng);
        }
        true
    }

    /// Append or prepend a point to the sequence being drawn.
    pub fn add_lat_lng(
        &mut self,
        shape: &mut Shape,
        cx: &mut EditContext<'_>,
        latlng: LatLng,
    ) -> Option<CoordId> {
        let session = self.drawing?;
        let sequence = session.sequence?;
        let coord = crate::geo::Coordinate::new(latlng);
        let id = coord.id();
        let seq = self.seq_mut(shape, sequence)?;
        match session.direction {
            DrawDirection::Forward => seq.push(coord),
            DrawDirection::Backward => seq.push_front(coord),
        }
        self.refresh(cx);
        self.add_vertex_marker(shape, cx, sequence, id);
        Some(id)
    }

    pub fn new_point_forward(
        &mut self,
        shape: &mut Shape,
        cx: &mut EditContext<'_>,
        latlng: LatLng,
    ) -> Option<CoordId> {
        let id = self.add_lat_lng(shape, cx, latlng)?;
        cx.tools.guide_mut(DrawDirection::Forward).anchor_at(latlng);
        let backward = cx.tools.guide_mut(DrawDirection::Backward);
        if backward.anchor().is_none() {
            backward.anchor_at(latlng);
        }
        Some(id)
    }

    pub fn new_point_backward(
        &mut self,
        shape: &mut Shape,
        cx: &mut EditContext<'_>,
        latlng: LatLng,
    ) -> Option<CoordId> {
        let id = self.add_lat_lng(shape, cx, latlng)?;
        cx.tools.guide_mut(DrawDirection::Backward).anchor_at(latlng);
        Some(id)
    }

    /// Points of a hole must land inside the outer ring.
    pub fn is_new_click_valid(&self, shape: &Shape, cx: &EditContext<'_>, latlng: LatLng) -> bool {
        if !self.drawing.is_some_and(|s| s.hole) {
            return true;
        }
        let Shape::Polygon { outer, .. } = shape else {
            return true;
        };
        let ring: Vec<Vec2> = outer.iter().map(|c| cx.viewport.project(c.latlng())).collect();
        let options = cx.options();
        let tolerance = hit_tolerance(cx.weight, options.touch, options.touch_tolerance);
        point_in_polygon(cx.viewport.project(latlng), &[ring], tolerance)
    }

    /// Fire the vetoable click notification. True when nobody cancelled it.
    pub fn fire_drawing_click(&mut self, cx: &mut EditContext<'_>, pointer: PointerEvent) -> bool {
        if self.drawing.is_none() {
            return false;
        }
        let click = cx.fire(cx.event(EditEventKind::DrawingClick).with_pointer(pointer));
        !click.is_cancelled()
    }

    /// Default action of an accepted drawing click.
    pub fn process_drawing_click(
        &mut self,
        shape: &mut Shape,
        cx: &mut EditContext<'_>,
        pointer: PointerEvent,
    ) {
        let Some(session) = self.drawing else {
            return;
        };
        match self.kind {
            EditorKind::Marker => {
                if let Shape::Marker { position } = shape {
                    position.update(pointer.latlng);
                }
                self.refresh(cx);
                self.commit_drawing(cx, Some(pointer));
            }
            // Circles are placed on press, not on click
            EditorKind::Circle => {}
            EditorKind::Polyline | EditorKind::Polygon => {
                if !self.is_new_click_valid(shape, cx, pointer.latlng) {
                    debug!("Drawing click outside the outer ring ignored");
                    return;
                }
                match session.direction {
                    DrawDirection::Forward => self.new_point_forward(shape, cx, pointer.latlng),
                    DrawDirection::Backward => self.new_point_backward(shape, cx, pointer.latlng),
                };
            }
        }
    }

    /// Press on the map while drawing. A circle is placed here, and the
    /// returned resize handle takes over the press.
    pub fn on_drawing_mouse_down(
        &mut self,
        shape: &mut Shape,
        cx: &mut EditContext<'_>,
        pointer: PointerEvent,
    ) -> Option<CoordId> {
        if self.drawing.is_none() {
            return None;
        }
        cx.fire(cx.event(EditEventKind::DrawingMouseDown).with_pointer(pointer));
        if self.kind != EditorKind::Circle {
            return None;
        }
        let resize = self.reset_circle_at(shape, pointer.latlng)?;
        self.refresh(cx);
        self.commit_drawing(cx, Some(pointer));
        Some(resize)
    }

    pub fn on_drawing_mouse_up(&mut self, cx: &mut EditContext<'_>, pointer: PointerEvent) {
        if self.drawing.is_some() {
            cx.fire(cx.event(EditEventKind::DrawingMouseUp).with_pointer(pointer));
        }
    }

    pub fn on_drawing_mouse_move(
        &mut self,
        shape: &mut Shape,
        cx: &mut EditContext<'_>,
        pointer: PointerEvent,
    ) {
        if self.drawing.is_none() {
            return;
        }
        cx.fire(cx.event(EditEventKind::DrawingMove).with_pointer(pointer));
        match self.kind {
            EditorKind::Marker => {
                if let Shape::Marker { position } = shape {
                    position.update(pointer.latlng);
                }
                cx.request_redraw();
            }
            EditorKind::Circle => {
                self.move_circle_center(shape, cx, pointer.latlng);
                cx.request_redraw();
            }
            EditorKind::Polyline | EditorKind::Polygon => cx.tools.move_guides(pointer.latlng),
        }
    }

    /// Leave drawing mode without notifying commit or cancel.
    pub fn end_drawing(&mut self, cx: &mut EditContext<'_>) {
        self.drawing = None;
        cx.tools.unregister_for_drawing(cx.feature);
        cx.tools.detach_guides();
        cx.fire(cx.event(EditEventKind::DrawingEnd));
    }

    pub fn commit_drawing(&mut self, cx: &mut EditContext<'_>, pointer: Option<PointerEvent>) {
        if self.drawing.is_none() {
            return;
        }
        let mut event = cx.event(EditEventKind::DrawingCommit);
        if let Some(pointer) = pointer {
            event = event.with_pointer(pointer);
        }
        cx.fire(event);
        self.end_drawing(cx);
        info!("Drawing committed on {:?}", cx.feature);
    }

    pub fn cancel_drawing(&mut self, cx: &mut EditContext<'_>) {
        if self.drawing.is_none() {
            return;
        }
        cx.fire(cx.event(EditEventKind::DrawingCancel));
        self.end_drawing(cx);
        info!("Drawing cancelled on {:?}", cx.feature);
    }

    /// Cancel, and drop the hole being drawn if it never got a point.
    pub fn abort_drawing(&mut self, shape: &mut Shape, cx: &mut EditContext<'_>) {
        let Some(session) = self.drawing else {
            return;
        };
        self.cancel_drawing(cx);
        let Some(hole) = session.sequence.filter(|_| session.hole) else {
            return;
        };
        if shape.sequence(hole).is_some_and(CoordinateSequence::is_empty) && shape.remove_hole(hole) {
            debug!("Empty hole dropped from {:?}", cx.feature);
            cx.request_redraw();
        }
    }

    /// Whether the open sequence has enough points to be committed.
    /// Markers and circles can always commit.
    pub fn can_commit(&self, shape: &Shape) -> bool {
        let Some(session) = self.drawing else {
            return false;
        };
        if !self.kind.draws_points() {
            return true;
        }
        session
            .sequence
            .and_then(|id| self.seq(shape, id))
            .is_some_and(|seq| seq.len() >= self.min_vertex())
    }

    /// Cut a polyline at an interior vertex. The vertex stays on this
    /// feature; a copy of it starts the returned tail.
    pub fn split_shape(
        &mut self,
        shape: &mut Shape,
        cx: &mut EditContext<'_>,
        coord: CoordId,
    ) -> Option<Vec<crate::geo::Coordinate>> {
        if !self.kind.can_split() {
            return None;
        }
        let Shape::Polyline { path } = shape else {
            return None;
        };
        let index = path.index_of(coord)?;
        if index == 0 || index >= VertexMarker::last_index(path) {
            return None;
        }
        let tail = path.split_at_vertex(index);
        self.reset(shape, cx);
        self.refresh(cx);
        Some(tail)
    }

    /// Marker features move as a whole while being edited.
    pub fn marker_drag_start(&mut self, cx: &mut EditContext<'_>) {
        cx.fire(cx.event(EditEventKind::DragStart));
        cx.fire(cx.event(EditEventKind::Editing));
    }

    pub fn drag_marker(
        &mut self,
        shape: &mut Shape,
        cx: &mut EditContext<'_>,
        latlng: LatLng,
        pointer: PointerEvent,
    ) {
        let Shape::Marker { position } = shape else {
            return;
        };
        position.update(latlng);
        cx.request_redraw();
        cx.fire(
            cx.event(EditEventKind::Drag)
                .with_latlng(latlng)
                .with_pointer(pointer),
        );
    }

    pub fn marker_drag_end(&mut self, cx: &mut EditContext<'_>, pointer: PointerEvent) {
        cx.fire(cx.event(EditEventKind::DragEnd).with_pointer(pointer));
    }

    /// Topmost vertex whose icon box contains `point`.
    pub fn vertex_at(&self, shape: &Shape, viewport: &dyn Viewport, half: f32, point: Vec2) -> Option<(i32, CoordId)> {
        self.vertices
            .values()
            .filter(|vertex| {
                self.vertex_latlng(shape, vertex.coord())
                    .is_some_and(|ll| in_icon(viewport.project(ll), point, half))
            })
            .max_by_key(|vertex| vertex.z_index())
            .map(|vertex| (vertex.z_index(), vertex.coord()))
    }

    /// Topmost visible middle marker under `point`, keyed by its right vertex.
    pub fn middle_marker_at(&self, viewport: &dyn Viewport, half: f32, point: Vec2) -> Option<(i32, CoordId)> {
        self.middle_markers()
            .filter(|m| m.is_visible() && in_icon(viewport.project(m.latlng()), point, half))
            .max_by_key(|m| m.z_index())
            .map(|m| (m.z_index(), m.right()))
    }
}

fn in_icon(center: Vec2, point: Vec2, half: f32) -> bool {
    (center.x - point.x).abs() <= half && (center.y - point.y).abs() <= half
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_capabilities() {
        assert!(EditorKind::Polygon.closed());
        assert!(!EditorKind::Polyline.closed());
        assert_eq!(EditorKind::Polygon.min_vertex(), 3);
        assert_eq!(EditorKind::Polyline.min_vertex(), 2);
        assert!(EditorKind::Circle.skips_middle_markers());
        assert!(EditorKind::Polyline.can_split());
        assert!(!EditorKind::Polygon.can_split());
    }

    #[test]
    fn test_min_vertex_override() {
        let editor = Editor::new(
            EditorKind::Polygon,
            EditorOptions {
                min_vertex: Some(4),
                ..default()
            },
        );
        assert_eq!(editor.min_vertex(), 4);
        assert_eq!(editor.drawing_state(), DrawingState::Idle);
    }

    #[test]
    fn test_icon_box() {
        assert!(in_icon(Vec2::new(10.0, 10.0), Vec2::new(13.0, 7.0), 4.0));
        assert!(!in_icon(Vec2::new(10.0, 10.0), Vec2::new(15.0, 10.0), 4.0));
    }
}
