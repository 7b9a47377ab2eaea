//! Vertex handles: one per coordinate of an enabled editor.
//!
//! A handle never caches its index. Every lookup searches the owning
//! sequence for the coordinate's id, so inserts and deletes elsewhere in the
//! sequence cannot leave it pointing at the wrong slot.

use bevy::prelude::*;

use crate::geo::{CoordId, CoordinateSequence, LatLng, SequenceId};

use super::editor::{EditContext, Editor};
use super::events::EditEventKind;
use super::feature::Shape;
use super::input::PointerEvent;
use super::middle_marker::MiddleMarker;

#[derive(Debug, Clone, PartialEq)]
pub struct VertexMarker {
    coord: CoordId,
    sequence: SequenceId,
    z_index: i32,
    pub(crate) middle_marker: Option<MiddleMarker>,
}

impl VertexMarker {
    pub(crate) fn new(coord: CoordId, sequence: SequenceId, z_index: i32) -> Self {
        Self {
            coord,
            sequence,
            z_index,
            middle_marker: None,
        }
    }

    pub fn coord(&self) -> CoordId {
        self.coord
    }

    pub fn sequence(&self) -> SequenceId {
        self.sequence
    }

    pub fn z_index(&self) -> i32 {
        self.z_index
    }

    /// Link to the previous vertex, if any
    pub fn middle_marker(&self) -> Option<&MiddleMarker> {
        self.middle_marker.as_ref()
    }

    pub fn index(&self, seq: &CoordinateSequence) -> Option<usize> {
        seq.index_of(self.coord)
    }

    pub fn last_index(seq: &CoordinateSequence) -> usize {
        seq.len().saturating_sub(1)
    }

    /// Coordinate before this one; wraps on closed rings.
    pub fn previous(&self, seq: &CoordinateSequence, closed: bool) -> Option<CoordId> {
        if seq.len() < 2 {
            return None;
        }
        let index = self.index(seq)?;
        let previous = match index {
            0 if closed => Self::last_index(seq),
            0 => return None,
            i => i - 1,
        };
        seq.get(previous).map(|c| c.id())
    }

    /// Coordinate after this one; wraps on closed rings.
    pub fn next(&self, seq: &CoordinateSequence, closed: bool) -> Option<CoordId> {
        if seq.len() < 2 {
            return None;
        }
        let index = self.index(seq)?;
        let next = if index == Self::last_index(seq) {
            if !closed {
                return None;
            }
            0
        } else {
            index + 1
        };
        seq.get(next).map(|c| c.id())
    }
}

/// What a vertex removal did to the geometry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VertexRemoval {
    Removed,
    /// The vertex was the last one of a hole; the hole is gone
    HoleRemoved,
    /// The vertex was the last one of the path or outer ring; the caller
    /// deletes the feature
    ShapeEmptied,
}

impl Editor {
    pub fn vertex(&self, coord: CoordId) -> Option<&VertexMarker> {
        self.vertices.get(&coord)
    }

    pub fn vertex_index(&self, shape: &Shape, coord: CoordId) -> Option<usize> {
        let vertex = self.vertices.get(&coord)?;
        vertex.index(self.seq(shape, vertex.sequence)?)
    }

    pub fn vertex_latlng(&self, shape: &Shape, coord: CoordId) -> Option<LatLng> {
        let vertex = self.vertices.get(&coord)?;
        self.seq(shape, vertex.sequence)?
            .coord(coord)
            .map(|c| c.latlng())
    }

    /// Previous vertex handle, if that neighbour has one
    pub fn previous_vertex(&self, shape: &Shape, coord: CoordId) -> Option<CoordId> {
        let vertex = self.vertices.get(&coord)?;
        let seq = self.seq(shape, vertex.sequence)?;
        vertex
            .previous(seq, self.kind.closed())
            .filter(|id| self.vertices.contains_key(id))
    }

    /// Next vertex handle, if that neighbour has one
    pub fn next_vertex(&self, shape: &Shape, coord: CoordId) -> Option<CoordId> {
        let vertex = self.vertices.get(&coord)?;
        let seq = self.seq(shape, vertex.sequence)?;
        vertex
            .next(seq, self.kind.closed())
            .filter(|id| self.vertices.contains_key(id))
    }

    pub(crate) fn add_vertex_marker(
        &mut self,
        shape: &Shape,
        cx: &mut EditContext<'_>,
        sequence: SequenceId,
        coord: CoordId,
    ) {
        let z_index = cx.tools.allocate_z_index();
        self.vertices
            .insert(coord, VertexMarker::new(coord, sequence, z_index));
        self.add_middle_markers(shape, cx, coord);
    }

    /// Link a vertex to its previous neighbour. Does nothing when middle
    /// markers are disabled or the link already exists.
    pub(crate) fn add_middle_marker(
        &mut self,
        shape: &Shape,
        cx: &mut EditContext<'_>,
        coord: CoordId,
        previous: Option<CoordId>,
    ) {
        if !self.has_middle_markers(cx) {
            return;
        }
        let Some(previous) = previous.or_else(|| self.previous_vertex(shape, coord)) else {
            return;
        };
        let Some(vertex) = self.vertices.get(&coord) else {
            return;
        };
        if vertex.middle_marker.is_some() {
            return;
        }
        let sequence = vertex.sequence;
        let (Some(left), Some(right)) = (
            self.vertex_latlng(shape, previous),
            self.vertex_latlng(shape, coord),
        ) else {
            return;
        };
        let z_index = cx.tools.allocate_z_index();
        let marker = MiddleMarker::new(
            previous,
            coord,
            sequence,
            (left, right),
            cx.viewport,
            cx.tools.options(),
            z_index,
        );
        if let Some(vertex) = self.vertices.get_mut(&coord) {
            vertex.middle_marker = Some(marker);
        }
    }

    /// Called when a vertex appears: link it backwards, and relink the next
    /// vertex whose previous neighbour just changed.
    pub(crate) fn add_middle_markers(
        &mut self,
        shape: &Shape,
        cx: &mut EditContext<'_>,
        coord: CoordId,
    ) {
        if !self.has_middle_markers(cx) {
            return;
        }
        if let Some(previous) = self.previous_vertex(shape, coord) {
            self.add_middle_marker(shape, cx, coord, Some(previous));
        }
        if let Some(next) = self.next_vertex(shape, coord) {
            self.reset_middle_marker(shape, cx, next);
        }
    }

    pub(crate) fn reset_middle_marker(
        &mut self,
        shape: &Shape,
        cx: &mut EditContext<'_>,
        coord: CoordId,
    ) {
        if let Some(vertex) = self.vertices.get_mut(&coord) {
            vertex.middle_marker = None;
        }
        self.add_middle_marker(shape, cx, coord, None);
    }

    /// Reposition a vertex's middle marker after one of its parents moved.
    pub(crate) fn update_middle_marker(
        &mut self,
        shape: &Shape,
        cx: &EditContext<'_>,
        coord: CoordId,
    ) {
        let Some(left) = self
            .vertices
            .get(&coord)
            .and_then(|v| v.middle_marker.as_ref())
            .map(MiddleMarker::left)
        else {
            return;
        };
        let (Some(left), Some(right)) = (
            self.vertex_latlng(shape, left),
            self.vertex_latlng(shape, coord),
        ) else {
            return;
        };
        if let Some(marker) = self
            .vertices
            .get_mut(&coord)
            .and_then(|v| v.middle_marker.as_mut())
        {
            marker.update((left, right), cx.viewport, cx.tools.options());
        }
    }

    /// Move a vertex to `latlng`, keeping its coordinate's identity.
    pub fn drag_vertex(
        &mut self,
        shape: &mut Shape,
        cx: &mut EditContext<'_>,
        coord: CoordId,
        latlng: LatLng,
        pointer: Option<PointerEvent>,
    ) {
        let Some(sequence) = self.vertices.get(&coord).map(VertexMarker::sequence) else {
            return;
        };
        let Some(target) = self
            .seq_mut(shape, sequence)
            .and_then(|seq| seq.coord_mut(coord))
        else {
            return;
        };
        target.update(latlng);

        if self.circle.is_some() {
            self.circle_vertex_dragged(shape, cx, coord, latlng);
        }
        self.refresh(cx);

        self.update_middle_marker(shape, cx, coord);
        if let Some(next) = self.next_vertex(shape, coord) {
            self.update_middle_marker(shape, cx, next);
        }

        let mut event = cx.event(EditEventKind::VertexDrag).with_vertex(coord, latlng);
        if let Some(pointer) = pointer {
            event = event.with_pointer(pointer);
        }
        cx.fire(event);
    }

    /// Whether a delete request on this vertex is honoured: holes may be
    /// emptied, everything else keeps at least `min_vertex` coordinates.
    pub fn vertex_can_be_deleted(&self, shape: &Shape, coord: CoordId) -> bool {
        let Some(vertex) = self.vertices.get(&coord) else {
            return false;
        };
        if shape.is_hole(vertex.sequence) {
            return true;
        }
        self.seq(shape, vertex.sequence)
            .is_some_and(|seq| seq.len() > self.min_vertex())
    }

    /// Remove a vertex and its coordinate unconditionally.
    pub fn delete_vertex(
        &mut self,
        shape: &mut Shape,
        cx: &mut EditContext<'_>,
        coord: CoordId,
    ) -> Option<VertexRemoval> {
        let sequence = self.vertices.get(&coord)?.sequence;
        // Computed before the sequence changes
        let next = self.next_vertex(shape, coord);

        let (_, removed) = self.seq_mut(shape, sequence)?.remove(coord)?;
        self.vertices.remove(&coord);
        cx.fire(
            cx.event(EditEventKind::VertexDeleted)
                .with_vertex(coord, removed.latlng()),
        );

        let emptied = self.seq(shape, sequence).is_some_and(|s| s.is_empty());
        let mut outcome = VertexRemoval::Removed;
        if emptied {
            if shape.is_hole(sequence) {
                shape.remove_hole(sequence);
                debug!("Hole {:?} emptied and removed", sequence);
                outcome = VertexRemoval::HoleRemoved;
                if self.drawing.is_some_and(|s| s.sequence == Some(sequence)) {
                    self.cancel_drawing(cx);
                }
            } else {
                outcome = VertexRemoval::ShapeEmptied;
            }
        }

        if let Some(next) = next {
            self.reset_middle_marker(shape, cx, next);
        }
        self.refresh(cx);
        Some(outcome)
    }
}
