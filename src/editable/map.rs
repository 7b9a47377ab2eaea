//! The feature store and the entry points hosts call: shape creation,
//! edit toggles, drawing starts and raw pointer input.

use std::collections::BTreeMap;

use bevy::prelude::*;

use crate::geo::predicates::hit_tolerance;
use crate::geo::{CoordId, Coordinate, CoordinateSequence, LatLng};
use crate::viewport::Viewport;

use super::drawing::{DrawDirection, DrawingState};
use super::editor::{EditContext, Editor, EditorKind, EditorOptions};
use super::events::{EditEvent, EditEventKind};
use super::feature::{Feature, FeatureId, PathStyle, Shape};
use super::input::{
    HandleHit, PointerButton, PointerEvent, PointerPhase, PressState, PressTarget,
};
use super::tools::{EditTools, EditToolsOptions};
use super::vertex::VertexRemoval;

#[derive(Resource, Debug, Default)]
pub struct EditableMap {
    tools: EditTools,
    features: BTreeMap<FeatureId, Feature>,
    next_feature_id: u64,
    press: Option<PressState>,
}

impl EditableMap {
    pub fn new(options: EditToolsOptions) -> Self {
        Self {
            tools: EditTools::new(options),
            ..default()
        }
    }

    pub fn tools(&self) -> &EditTools {
        &self.tools
    }

    pub fn tools_mut(&mut self) -> &mut EditTools {
        &mut self.tools
    }

    pub fn feature(&self, id: FeatureId) -> Option<&Feature> {
        self.features.get(&id)
    }

    pub fn feature_mut(&mut self, id: FeatureId) -> Option<&mut Feature> {
        self.features.get_mut(&id)
    }

    pub fn features(&self) -> impl Iterator<Item = &Feature> {
        self.features.values()
    }

    pub fn feature_count(&self) -> usize {
        self.features.len()
    }

    /// Register a listener on one feature. Runs before controller listeners.
    pub fn on(
        &mut self,
        id: FeatureId,
        listener: impl FnMut(&mut EditEvent) + Send + Sync + 'static,
    ) -> bool {
        match self.features.get_mut(&id) {
            Some(feature) => {
                feature.listeners.add(listener);
                true
            }
            None => false,
        }
    }

    pub fn drain_events(&mut self) -> Vec<EditEvent> {
        self.tools.drain_events()
    }

    pub fn press(&self) -> Option<PressState> {
        self.press
    }

    fn fire(&mut self, event: EditEvent) -> EditEvent {
        let mut event = event;
        if let Some(feature) = self.features.get_mut(&event.feature) {
            feature.listeners.dispatch(&mut event);
        }
        self.tools.fire(&mut event);
        event
    }

    /// Run `f` against a feature's enabled editor with split borrows.
    fn with_editor<R>(
        &mut self,
        viewport: &dyn Viewport,
        id: FeatureId,
        f: impl FnOnce(&mut Editor, &mut Shape, &mut EditContext<'_>) -> R,
    ) -> Option<R> {
        let feature = self.features.get_mut(&id)?;
        let weight = feature.style.weight;
        let Feature {
            shape,
            editor,
            listeners,
            revision,
            ..
        } = feature;
        let editor = editor.as_mut()?;
        let mut cx = EditContext::new(id, listeners, &mut self.tools, viewport, weight);
        let result = f(editor, shape, &mut cx);
        if cx.redraw_requested() {
            *revision += 1;
        }
        Some(result)
    }

    // Creation

    pub fn create_feature(&mut self, shape: Shape, style: PathStyle) -> FeatureId {
        self.next_feature_id += 1;
        let id = FeatureId::new(self.next_feature_id);
        debug!("Created {} {:?}", shape.kind().display_name(), id);
        self.features.insert(id, Feature::new(id, shape, style));
        self.fire(EditEvent::new(EditEventKind::Created, id));
        id
    }

    pub fn create_polyline(&mut self, latlngs: impl IntoIterator<Item = LatLng>) -> FeatureId {
        let path = CoordinateSequence::from_latlngs(latlngs);
        self.create_feature(Shape::Polyline { path }, PathStyle::default())
    }

    pub fn create_polygon(
        &mut self,
        outer: impl IntoIterator<Item = LatLng>,
        holes: Vec<Vec<LatLng>>,
    ) -> FeatureId {
        let shape = Shape::Polygon {
            outer: CoordinateSequence::from_latlngs(outer),
            holes: holes
                .into_iter()
                .map(CoordinateSequence::from_latlngs)
                .collect(),
        };
        self.create_feature(shape, PathStyle::default())
    }

    pub fn create_marker(&mut self, latlng: LatLng) -> FeatureId {
        let position = Coordinate::new(latlng);
        self.create_feature(Shape::Marker { position }, PathStyle::default())
    }

    /// `radius` in meters
    pub fn create_circle(&mut self, center: LatLng, radius: f64) -> FeatureId {
        let center = Coordinate::new(center);
        self.create_feature(Shape::Circle { center, radius }, PathStyle::default())
    }

    /// Create a shape and put it on the map right away.
    pub fn add_feature(&mut self, shape: Shape, style: PathStyle) -> FeatureId {
        let id = self.create_feature(shape, style);
        self.connect(id);
        id
    }

    /// Put a feature on the map. Drawn shapes connect on their first
    /// accepted click.
    pub fn connect(&mut self, id: FeatureId) {
        if let Some(feature) = self.features.get_mut(&id)
            && !feature.connected
        {
            feature.connected = true;
            feature.redraw();
        }
    }

    pub fn remove_feature(&mut self, viewport: &dyn Viewport, id: FeatureId) -> Option<Feature> {
        self.disable_edit(viewport, id);
        self.features.remove(&id)
    }

    /// A shape lost its last coordinate: notify and drop it.
    fn delete_shape(&mut self, viewport: &dyn Viewport, id: FeatureId) {
        info!("Shape {:?} emptied, deleting", id);
        self.fire(EditEvent::new(EditEventKind::ShapeDeleted, id));
        self.remove_feature(viewport, id);
    }

    // Edit toggles

    pub fn enable_edit(&mut self, viewport: &dyn Viewport, id: FeatureId) -> bool {
        self.enable_edit_with(viewport, id, EditorOptions::default())
    }

    /// Enable editing with per-feature overrides. The options only apply
    /// when the feature has no editor yet.
    pub fn enable_edit_with(
        &mut self,
        viewport: &dyn Viewport,
        id: FeatureId,
        options: EditorOptions,
    ) -> bool {
        let Some(feature) = self.features.get_mut(&id) else {
            warn!("Cannot enable editing: unknown feature {:?}", id);
            return false;
        };
        if feature.editor.is_none() {
            feature.editor = Some(Editor::for_shape(&feature.shape, options));
        }
        self.with_editor(viewport, id, |editor, shape, cx| editor.enable(shape, cx))
            .is_some()
    }

    pub fn disable_edit(&mut self, viewport: &dyn Viewport, id: FeatureId) {
        self.with_editor(viewport, id, |editor, _, cx| editor.disable(cx));
        if let Some(feature) = self.features.get_mut(&id) {
            feature.editor = None;
        }
    }

    pub fn toggle_edit(&mut self, viewport: &dyn Viewport, id: FeatureId) {
        if self.edit_enabled(id) {
            self.disable_edit(viewport, id);
        } else {
            self.enable_edit(viewport, id);
        }
    }

    pub fn edit_enabled(&self, id: FeatureId) -> bool {
        self.features.get(&id).is_some_and(Feature::edit_enabled)
    }

    // Drawing

    pub fn drawing(&self) -> bool {
        self.tools.drawing()
    }

    pub fn drawing_editor(&self) -> Option<FeatureId> {
        self.tools.drawing_editor()
    }

    pub fn drawing_state(&self, id: FeatureId) -> DrawingState {
        self.features
            .get(&id)
            .and_then(Feature::editor)
            .map(Editor::drawing_state)
            .unwrap_or_default()
    }

    /// Cancel whoever is drawing, `id` included, so every session starts
    /// from a clean state.
    fn claim_drawing(&mut self, viewport: &dyn Viewport, id: FeatureId) {
        if let Some(previous) = self.tools.drawing_editor() {
            if previous != id {
                debug!("Drawing moves from {:?} to {:?}", previous, id);
            }
            self.cancel_drawing_of(viewport, previous);
        }
    }

    fn cancel_drawing_of(&mut self, viewport: &dyn Viewport, id: FeatureId) {
        self.with_editor(viewport, id, |editor, shape, cx| editor.abort_drawing(shape, cx));
        self.tools.unregister_for_drawing(id);
        self.discard_if_unplaced(viewport, id);
    }

    /// A started shape cancelled before it reached the map is dropped.
    fn discard_if_unplaced(&mut self, viewport: &dyn Viewport, id: FeatureId) {
        let unplaced = self.features.get(&id).is_some_and(|f| {
            !f.connected
                && (!EditorKind::for_shape(f.kind()).draws_points()
                    || f.shape.sequences().iter().all(|s| s.is_empty()))
        });
        if unplaced {
            debug!("Discarding unplaced {:?}", id);
            self.remove_feature(viewport, id);
        }
    }

    fn start_shape(
        &mut self,
        viewport: &dyn Viewport,
        id: FeatureId,
        latlng: Option<LatLng>,
    ) -> FeatureId {
        self.enable_edit(viewport, id);
        self.claim_drawing(viewport, id);
        self.with_editor(viewport, id, |editor, shape, cx| {
            editor.new_shape(shape, cx, latlng)
        });
        id
    }

    pub fn start_polyline(&mut self, viewport: &dyn Viewport, latlng: Option<LatLng>) -> FeatureId {
        let id = self.create_polyline(Vec::<LatLng>::new());
        self.start_shape(viewport, id, latlng)
    }

    pub fn start_polygon(&mut self, viewport: &dyn Viewport, latlng: Option<LatLng>) -> FeatureId {
        let id = self.create_polygon(Vec::<LatLng>::new(), Vec::new());
        self.start_shape(viewport, id, latlng)
    }

    /// The marker follows the pointer until the next click places it.
    pub fn start_marker(&mut self, viewport: &dyn Viewport, latlng: Option<LatLng>) -> FeatureId {
        let id = self.create_marker(latlng.unwrap_or_else(|| viewport.center()));
        self.start_shape(viewport, id, None)
    }

    /// The circle follows the pointer until a press places and sizes it.
    pub fn start_circle(&mut self, viewport: &dyn Viewport, latlng: Option<LatLng>) -> FeatureId {
        let radius = self.tools.options().default_circle_radius;
        let id = self.create_circle(latlng.unwrap_or_else(|| viewport.center()), radius);
        self.start_shape(viewport, id, None)
    }

    pub fn start_hole(
        &mut self,
        viewport: &dyn Viewport,
        id: FeatureId,
        latlng: Option<LatLng>,
    ) -> bool {
        if !self.edit_enabled(id) {
            warn!("Cannot start a hole: {:?} is not being edited", id);
            return false;
        }
        self.claim_drawing(viewport, id);
        self.with_editor(viewport, id, |editor, shape, cx| {
            editor.new_hole(shape, cx, latlng)
        })
        .unwrap_or(false)
    }

    /// Finish the current drawing. Ignored while the open sequence is short
    /// of the editor's minimum vertex count.
    pub fn commit_drawing(&mut self, viewport: &dyn Viewport) {
        let Some(id) = self.tools.drawing_editor() else {
            return;
        };
        let committed = self
            .with_editor(viewport, id, |editor, shape, cx| {
                if !editor.can_commit(shape) {
                    debug!("Commit on {:?} ignored: too few points", cx.feature);
                    return false;
                }
                editor.commit_drawing(cx, None);
                true
            })
            .unwrap_or(false);
        if committed {
            self.connect(id);
        }
    }

    /// Cancel the current drawing, if any.
    pub fn stop_drawing(&mut self, viewport: &dyn Viewport) {
        if let Some(id) = self.tools.drawing_editor() {
            self.cancel_drawing_of(viewport, id);
        }
    }

    // Vertices

    pub fn vertex_index(&self, id: FeatureId, coord: CoordId) -> Option<usize> {
        let feature = self.features.get(&id)?;
        feature.editor()?.vertex_index(&feature.shape, coord)
    }

    pub fn previous_vertex(&self, id: FeatureId, coord: CoordId) -> Option<CoordId> {
        let feature = self.features.get(&id)?;
        feature.editor()?.previous_vertex(&feature.shape, coord)
    }

    pub fn next_vertex(&self, id: FeatureId, coord: CoordId) -> Option<CoordId> {
        let feature = self.features.get(&id)?;
        feature.editor()?.next_vertex(&feature.shape, coord)
    }

    pub fn drag_vertex(
        &mut self,
        viewport: &dyn Viewport,
        id: FeatureId,
        coord: CoordId,
        latlng: LatLng,
    ) {
        self.with_editor(viewport, id, |editor, shape, cx| {
            editor.drag_vertex(shape, cx, coord, latlng, None)
        });
    }

    /// Delete request: honoured only when the vertex may go.
    pub fn delete_vertex(&mut self, viewport: &dyn Viewport, id: FeatureId, coord: CoordId) -> bool {
        let allowed = self
            .features
            .get(&id)
            .and_then(|f| f.editor().map(|e| e.vertex_can_be_deleted(&f.shape, coord)))
            .unwrap_or(false);
        if !allowed {
            debug!("Delete of {:?} on {:?} refused", coord, id);
            return false;
        }
        self.remove_vertex(viewport, id, coord)
    }

    /// Remove a vertex regardless of the minimum vertex count.
    pub fn remove_vertex(&mut self, viewport: &dyn Viewport, id: FeatureId, coord: CoordId) -> bool {
        let removal = self
            .with_editor(viewport, id, |editor, shape, cx| editor.delete_vertex(shape, cx, coord))
            .flatten();
        self.apply_removal(viewport, id, removal);
        removal.is_some()
    }

    fn apply_removal(&mut self, viewport: &dyn Viewport, id: FeatureId, removal: Option<VertexRemoval>) {
        if removal == Some(VertexRemoval::ShapeEmptied) {
            self.delete_shape(viewport, id);
        }
    }

    /// Simulate a click on a vertex, as if released without dragging.
    pub fn click_vertex(&mut self, viewport: &dyn Viewport, id: FeatureId, coord: CoordId, pointer: PointerEvent) {
        let removal = self
            .with_editor(viewport, id, |editor, shape, cx| {
                editor.on_vertex_click(shape, cx, coord, pointer)
            })
            .flatten();
        self.apply_removal(viewport, id, removal);
    }

    /// Split a polyline at an interior vertex. The tail becomes a new,
    /// editable polyline.
    pub fn split_at_vertex(
        &mut self,
        viewport: &dyn Viewport,
        id: FeatureId,
        coord: CoordId,
    ) -> Option<FeatureId> {
        let tail = self
            .with_editor(viewport, id, |editor, shape, cx| editor.split_shape(shape, cx, coord))
            .flatten()?;
        let (style, connected) = self
            .features
            .get(&id)
            .map(|f| (f.style, f.connected))
            .unwrap_or_default();
        let path = CoordinateSequence::from_coords(tail);
        let other = self.create_feature(Shape::Polyline { path }, style);
        if connected {
            self.connect(other);
        }
        self.enable_edit(viewport, other);
        self.fire(EditEvent::new(EditEventKind::Split, id).with_related(other));
        info!("Split {:?} into {:?}", id, other);
        Some(other)
    }

    /// Resume drawing from an endpoint of a polyline.
    pub fn continue_from_vertex(&mut self, viewport: &dyn Viewport, id: FeatureId, coord: CoordId) -> bool {
        let Some(direction) = self
            .features
            .get(&id)
            .and_then(|f| f.editor().and_then(|e| e.continue_direction(&f.shape, coord)))
        else {
            return false;
        };
        self.claim_drawing(viewport, id);
        self.with_editor(viewport, id, |editor, shape, cx| match direction {
            DrawDirection::Forward => editor.continue_forward(shape, cx),
            DrawDirection::Backward => editor.continue_backward(shape, cx),
        })
        .is_some()
    }

    /// Swap the controller options and rebuild the handles of every enabled
    /// editor so icon sizes and middle-marker suppression take effect.
    pub fn set_options(&mut self, viewport: &dyn Viewport, options: EditToolsOptions) {
        self.tools.set_options(options);
        let enabled: Vec<FeatureId> = self
            .features
            .values()
            .filter(|f| f.edit_enabled())
            .map(Feature::id)
            .collect();
        for id in enabled {
            self.with_editor(viewport, id, |editor, shape, cx| {
                editor.reset(shape, cx);
                cx.request_redraw();
            });
        }
    }

    /// Reposition every middle marker after the projection changed.
    pub fn refresh_middle_markers(&mut self, viewport: &dyn Viewport) {
        let enabled: Vec<FeatureId> = self
            .features
            .values()
            .filter(|f| f.edit_enabled())
            .map(Feature::id)
            .collect();
        for id in enabled {
            self.with_editor(viewport, id, |editor, shape, cx| {
                editor.refresh_middle_markers(shape, cx)
            });
        }
    }

    // Picking

    /// Handle under `point`: vertices first, then middle markers, then
    /// marker icons. While drawing only the drawn feature's handles count.
    pub fn handle_at(&self, viewport: &dyn Viewport, point: Vec2) -> Option<HandleHit> {
        let drawing = self.tools.drawing_editor();
        // Markers and circles being drawn follow the pointer
        if let Some(id) = drawing
            && self
                .features
                .get(&id)
                .and_then(Feature::editor)
                .is_some_and(|e| !e.kind().draws_points())
        {
            return None;
        }
        let half = self.tools.options().icon_size() / 2.0;
        let candidates: Vec<&Feature> = self
            .features
            .values()
            .filter(|f| f.edit_enabled() && drawing.is_none_or(|d| d == f.id()))
            .collect();

        let vertex = candidates
            .iter()
            .filter_map(|f| {
                let editor = f.editor()?;
                let (z, coord) = editor.vertex_at(&f.shape, viewport, half, point)?;
                Some((z, HandleHit::Vertex { feature: f.id(), coord }))
            })
            .max_by_key(|(z, _)| *z);
        if let Some((_, hit)) = vertex {
            return Some(hit);
        }

        let middle = candidates
            .iter()
            .filter_map(|f| {
                let (z, right) = f.editor()?.middle_marker_at(viewport, half, point)?;
                Some((z, HandleHit::MiddleMarker { feature: f.id(), right }))
            })
            .max_by_key(|(z, _)| *z);
        if let Some((_, hit)) = middle {
            return Some(hit);
        }

        candidates
            .iter()
            .rev()
            .find(|f| {
                matches!(f.shape, Shape::Marker { .. })
                    && !f.editor().is_some_and(Editor::drawing)
                    && f.contains_point(viewport, point, 0.0)
            })
            .map(|f| HandleHit::Marker { feature: f.id() })
    }

    /// Topmost connected feature under `point`.
    pub fn feature_at(&self, viewport: &dyn Viewport, point: Vec2) -> Option<FeatureId> {
        let options = self.tools.options();
        self.features
            .values()
            .rev()
            .filter(|f| f.connected)
            .find(|f| {
                let tolerance = hit_tolerance(f.style.weight, options.touch, options.touch_tolerance);
                f.contains_point(viewport, point, tolerance)
            })
            .map(Feature::id)
    }

    // Pointer input

    pub fn handle_pointer(&mut self, viewport: &dyn Viewport, event: PointerEvent) {
        match (event.phase, event.button) {
            (PointerPhase::Down, PointerButton::Primary) => self.pointer_down(viewport, event),
            (PointerPhase::Down, PointerButton::Secondary) => self.context_menu(viewport, event),
            (PointerPhase::Move, _) => self.pointer_move(viewport, event),
            (PointerPhase::Up, PointerButton::Primary) => self.pointer_up(viewport, event),
            (PointerPhase::Up, PointerButton::Secondary) => {}
        }
    }

    fn context_menu(&mut self, viewport: &dyn Viewport, event: PointerEvent) {
        if let Some(HandleHit::Vertex { feature, coord }) = self.handle_at(viewport, event.screen) {
            self.with_editor(viewport, feature, |editor, shape, cx| {
                let latlng = editor.vertex_latlng(shape, coord).unwrap_or(event.latlng);
                cx.fire(
                    cx.event(EditEventKind::VertexContextMenu)
                        .with_vertex(coord, latlng)
                        .with_pointer(event),
                );
            });
        }
    }

    fn pointer_down(&mut self, viewport: &dyn Viewport, event: PointerEvent) {
        let press = match self.handle_at(viewport, event.screen) {
            Some(HandleHit::Vertex { feature, coord }) => {
                let handle = self.with_editor(viewport, feature, |editor, shape, cx| {
                    let latlng = editor.vertex_latlng(shape, coord)?;
                    cx.fire(
                        cx.event(EditEventKind::VertexMouseDown)
                            .with_vertex(coord, latlng)
                            .with_pointer(event),
                    );
                    Some(cx.viewport.project(latlng))
                });
                let target = PressTarget::Vertex {
                    feature,
                    coord,
                    clickable: true,
                };
                PressState::new(event.screen, target)
                    .with_handle(handle.flatten().unwrap_or(event.screen))
            }
            Some(HandleHit::MiddleMarker { feature, right }) => {
                let promoted = self
                    .with_editor(viewport, feature, |editor, shape, cx| {
                        editor.promote_middle_marker(shape, cx, right, event)
                    })
                    .flatten();
                let target = match promoted {
                    Some(coord) => PressTarget::Vertex {
                        feature,
                        coord,
                        clickable: false,
                    },
                    None => PressTarget::Map,
                };
                PressState::new(event.screen, target)
            }
            Some(HandleHit::Marker { feature }) => {
                let handle = self
                    .features
                    .get(&feature)
                    .and_then(|f| f.shape.anchor())
                    .map(|ll| viewport.project(ll))
                    .unwrap_or(event.screen);
                PressState::new(event.screen, PressTarget::Marker { feature }).with_handle(handle)
            }
            None => self.map_press(viewport, event),
        };
        self.press = Some(press);
    }

    fn map_press(&mut self, viewport: &dyn Viewport, event: PointerEvent) -> PressState {
        let Some(drawing) = self.tools.drawing_editor() else {
            return PressState::new(event.screen, PressTarget::Map);
        };
        let transfer = self
            .with_editor(viewport, drawing, |editor, shape, cx| {
                editor.on_drawing_mouse_down(shape, cx, event)
            })
            .flatten();
        match transfer {
            Some(coord) => {
                self.connect(drawing);
                let target = PressTarget::Vertex {
                    feature: drawing,
                    coord,
                    clickable: false,
                };
                PressState::new(event.screen, target)
            }
            None => PressState::new(event.screen, PressTarget::Map),
        }
    }

    fn pointer_move(&mut self, viewport: &dyn Viewport, event: PointerEvent) {
        if let Some(mut press) = self.press {
            let threshold = self.tools.options().drag_threshold;
            let starts = !press.dragging && press.exceeds(event.screen, threshold);
            let latlng = viewport.unproject(press.drag_position(event.screen));
            match press.target {
                PressTarget::Vertex { feature, coord, .. } => {
                    if starts {
                        press.dragging = true;
                        self.with_editor(viewport, feature, |editor, shape, cx| {
                            let at = editor.vertex_latlng(shape, coord).unwrap_or(latlng);
                            cx.fire(
                                cx.event(EditEventKind::VertexDragStart)
                                    .with_vertex(coord, at)
                                    .with_pointer(event),
                            );
                        });
                    }
                    if press.dragging {
                        self.with_editor(viewport, feature, |editor, shape, cx| {
                            editor.drag_vertex(shape, cx, coord, latlng, Some(event))
                        });
                    }
                }
                PressTarget::Marker { feature } => {
                    if starts {
                        press.dragging = true;
                        self.with_editor(viewport, feature, |editor, _, cx| {
                            editor.marker_drag_start(cx)
                        });
                    }
                    if press.dragging {
                        self.with_editor(viewport, feature, |editor, shape, cx| {
                            editor.drag_marker(shape, cx, latlng, event)
                        });
                    }
                }
                PressTarget::Map => {}
            }
            self.press = Some(press);
        }

        if let Some(drawing) = self.tools.drawing_editor() {
            self.with_editor(viewport, drawing, |editor, shape, cx| {
                editor.on_drawing_mouse_move(shape, cx, event)
            });
        }
    }

    fn pointer_up(&mut self, viewport: &dyn Viewport, event: PointerEvent) {
        let Some(press) = self.press.take() else {
            return;
        };
        match press.target {
            PressTarget::Vertex {
                feature,
                coord,
                clickable,
            } => {
                if press.dragging {
                    self.with_editor(viewport, feature, |editor, shape, cx| {
                        let latlng = editor.vertex_latlng(shape, coord).unwrap_or(event.latlng);
                        cx.fire(
                            cx.event(EditEventKind::VertexDragEnd)
                                .with_vertex(coord, latlng)
                                .with_pointer(event),
                        );
                    });
                } else if clickable {
                    self.click_vertex(viewport, feature, coord, event);
                }
            }
            PressTarget::Marker { feature } => {
                if press.dragging {
                    self.with_editor(viewport, feature, |editor, _, cx| {
                        editor.marker_drag_end(cx, event)
                    });
                }
            }
            PressTarget::Map => {
                let Some(drawing) = self.tools.drawing_editor() else {
                    return;
                };
                let tolerance = self.tools.options().click_tolerance;
                if press.origin.distance(event.screen) < tolerance {
                    self.drawing_click(viewport, drawing, event);
                } else {
                    self.with_editor(viewport, drawing, |editor, _, cx| {
                        editor.on_drawing_mouse_up(cx, event)
                    });
                }
            }
        }
    }

    fn drawing_click(&mut self, viewport: &dyn Viewport, id: FeatureId, event: PointerEvent) {
        let accepted = self
            .with_editor(viewport, id, |editor, _, cx| editor.fire_drawing_click(cx, event))
            .unwrap_or(false);
        if !accepted {
            debug!("Drawing click on {:?} cancelled by a listener", id);
            return;
        }
        self.connect(id);
        self.with_editor(viewport, id, |editor, shape, cx| {
            editor.process_drawing_click(shape, cx, event)
        });
    }
}
