//! Circle editing: a center handle and a resize handle on the north-east
//! diagonal of the drawn circle.

use std::f32::consts::FRAC_PI_4;

use bevy::prelude::*;

use crate::constants::EARTH_CIRCUMFERENCE_METERS;
use crate::geo::{CoordId, Coordinate, CoordinateSequence, LatLng};
use crate::viewport::Viewport;

use super::editor::{EditContext, Editor};
use super::feature::Shape;

/// Radius of a circle in screen pixels at the current projection.
pub fn pixel_radius(viewport: &dyn Viewport, center: LatLng, radius: f64) -> f32 {
    let lat_rad = center.lat.to_radians();
    let lng_radius = radius / EARTH_CIRCUMFERENCE_METERS * 360.0 / lat_rad.cos().max(1e-9);
    let edge = LatLng::new(center.lat, center.lng - lng_radius);
    viewport.project(center).distance(viewport.project(edge))
}

/// Resize handle position: on the circle, 45 degrees up and right of center.
pub fn compute_resize_latlng(viewport: &dyn Viewport, center: LatLng, radius: f64) -> LatLng {
    let point = viewport.project(center);
    let delta = pixel_radius(viewport, center, radius) * FRAC_PI_4.cos();
    viewport.unproject(Vec2::new(point.x + delta, point.y - delta))
}

/// The editor-side handle sequence: `[center, resize]`. The center entry
/// shares its id with the shape's center coordinate.
#[derive(Debug, Clone, PartialEq)]
pub struct CircleControls {
    controls: CoordinateSequence,
}

impl CircleControls {
    pub(crate) fn new(center: Coordinate, radius: f64, viewport: &dyn Viewport) -> Self {
        let resize = Coordinate::new(compute_resize_latlng(viewport, center.latlng(), radius));
        Self {
            controls: CoordinateSequence::from_coords(vec![center, resize]),
        }
    }

    pub fn sequence(&self) -> &CoordinateSequence {
        &self.controls
    }

    pub(crate) fn sequence_mut(&mut self) -> &mut CoordinateSequence {
        &mut self.controls
    }

    pub fn center(&self) -> Option<CoordId> {
        self.controls.get(0).map(Coordinate::id)
    }

    pub fn resize(&self) -> Option<CoordId> {
        self.controls.get(1).map(Coordinate::id)
    }

    fn set(&mut self, index: usize, latlng: LatLng) {
        let id = self.controls.get(index).map(Coordinate::id);
        if let Some(coord) = id.and_then(|id| self.controls.coord_mut(id)) {
            coord.update(latlng);
        }
    }
}

impl Editor {
    /// Keep the shape in step with a control handle that just moved.
    pub(crate) fn circle_vertex_dragged(
        &mut self,
        shape: &mut Shape,
        cx: &EditContext<'_>,
        coord: CoordId,
        latlng: LatLng,
    ) {
        let Shape::Circle { center, radius } = shape else {
            return;
        };
        let Some(controls) = self.circle.as_mut() else {
            return;
        };
        if controls.center() == Some(coord) {
            center.update(latlng);
            controls.set(1, compute_resize_latlng(cx.viewport, latlng, *radius));
        } else if controls.resize() == Some(coord) {
            *radius = cx.viewport.distance(center.latlng(), latlng);
        }
    }

    /// Move the center, dragging the resize handle along at the same radius.
    pub(crate) fn move_circle_center(
        &mut self,
        shape: &mut Shape,
        cx: &EditContext<'_>,
        latlng: LatLng,
    ) {
        let Shape::Circle { center, radius } = shape else {
            return;
        };
        center.update(latlng);
        if let Some(controls) = self.circle.as_mut() {
            controls.set(0, latlng);
            controls.set(1, compute_resize_latlng(cx.viewport, latlng, *radius));
        }
    }

    /// Start a new circle at `latlng` with zero radius. Returns the resize
    /// handle, which takes over the press so the pointer sizes the circle.
    pub(crate) fn reset_circle_at(&mut self, shape: &mut Shape, latlng: LatLng) -> Option<CoordId> {
        let Shape::Circle { center, radius } = shape else {
            return None;
        };
        center.update(latlng);
        *radius = 0.0;
        let controls = self.circle.as_mut()?;
        controls.set(0, latlng);
        controls.set(1, latlng);
        debug!("Circle reset at {:?}", latlng);
        controls.resize()
    }
}
