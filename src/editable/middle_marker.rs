//! Midpoint handles between adjacent vertices. Pressing one inserts a real
//! vertex at that spot and hands the press over to it.

use bevy::prelude::*;

use crate::geo::{CoordId, Coordinate, CoordinateSequence, LatLng, SequenceId};
use crate::viewport::Viewport;

use super::editor::{EditContext, Editor};
use super::events::EditEventKind;
use super::feature::Shape;
use super::input::PointerEvent;
use super::tools::EditToolsOptions;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MiddleMarker {
    left: CoordId,
    right: CoordId,
    sequence: SequenceId,
    latlng: LatLng,
    opacity: f32,
    visible: bool,
    z_index: i32,
}

impl MiddleMarker {
    pub(crate) fn new(
        left: CoordId,
        right: CoordId,
        sequence: SequenceId,
        parents: (LatLng, LatLng),
        viewport: &dyn Viewport,
        options: &EditToolsOptions,
        z_index: i32,
    ) -> Self {
        let mut marker = Self {
            left,
            right,
            sequence,
            latlng: parents.0,
            opacity: options.middle_marker_opacity,
            visible: true,
            z_index,
        };
        marker.update(parents, viewport, options);
        marker
    }

    /// Screen-space midpoint of the two parents, back in geographic space.
    pub fn compute_latlng(left: LatLng, right: LatLng, viewport: &dyn Viewport) -> LatLng {
        let a = viewport.project(left);
        let b = viewport.project(right);
        viewport.unproject((a + b) / 2.0)
    }

    pub(crate) fn update(
        &mut self,
        parents: (LatLng, LatLng),
        viewport: &dyn Viewport,
        options: &EditToolsOptions,
    ) {
        self.latlng = Self::compute_latlng(parents.0, parents.1, viewport);
        self.visible = middle_marker_fits(
            viewport.project(parents.0),
            viewport.project(parents.1),
            options.icon_size(),
            options.middle_marker_hide_factor,
        );
    }

    pub fn left(&self) -> CoordId {
        self.left
    }

    pub fn right(&self) -> CoordId {
        self.right
    }

    pub fn sequence(&self) -> SequenceId {
        self.sequence
    }

    pub fn latlng(&self) -> LatLng {
        self.latlng
    }

    pub fn z_index(&self) -> i32 {
        self.z_index
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    /// 0 while the parents sit too close on screen
    pub fn opacity(&self) -> f32 {
        if self.visible { self.opacity } else { 0.0 }
    }

    /// Index a new vertex takes when this marker is promoted
    pub fn index(&self, seq: &CoordinateSequence) -> Option<usize> {
        seq.index_of(self.right)
    }
}

/// Parents must be at least `hide_factor` icon widths apart on screen.
pub fn middle_marker_fits(left: Vec2, right: Vec2, icon_size: f32, hide_factor: f32) -> bool {
    left.distance(right) >= icon_size * hide_factor
}

impl Editor {
    /// Turn the middle marker left of `right` into a vertex at the pointer.
    /// Returns the new coordinate, which takes over the press.
    pub fn promote_middle_marker(
        &mut self,
        shape: &mut Shape,
        cx: &mut EditContext<'_>,
        right: CoordId,
        pointer: PointerEvent,
    ) -> Option<CoordId> {
        let marker = self.vertices.get(&right)?.middle_marker?;
        cx.fire(
            cx.event(EditEventKind::MiddleMarkerMouseDown)
                .with_pointer(pointer),
        );

        let sequence = marker.sequence();
        let seq = self.seq_mut(shape, sequence)?;
        let index = marker.index(seq)?;
        let coord = Coordinate::new(pointer.latlng);
        let id = coord.id();
        seq.insert(index, coord);
        self.refresh(cx);

        // The right vertex gets relinked to the new one, which drops `marker`.
        self.add_vertex_marker(shape, cx, sequence, id);
        debug!("Middle marker promoted to vertex at index {}", index);
        Some(id)
    }

    /// Reposition every middle marker, e.g. after a zoom change.
    pub fn refresh_middle_markers(&mut self, shape: &Shape, cx: &EditContext<'_>) {
        let linked: Vec<CoordId> = self
            .vertices
            .values()
            .filter(|v| v.middle_marker.is_some())
            .map(|v| v.coord())
            .collect();
        for coord in linked {
            self.update_middle_marker(shape, cx, coord);
        }
    }

    pub fn middle_markers(&self) -> impl Iterator<Item = &MiddleMarker> {
        self.vertices.values().filter_map(|v| v.middle_marker.as_ref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hidden_when_parents_close() {
        // 8px icons, factor 3: parents need 24px
        assert!(!middle_marker_fits(Vec2::ZERO, Vec2::new(20.0, 0.0), 8.0, 3.0));
        assert!(middle_marker_fits(Vec2::ZERO, Vec2::new(30.0, 0.0), 8.0, 3.0));
    }
}
