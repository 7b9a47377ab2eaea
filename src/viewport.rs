//! Coordinate transforms between geographic and screen space.
//!
//! The editing core only talks to the [`Viewport`] trait. [`MercatorViewport`]
//! is the spherical web mercator implementation the Bevy host feeds from its
//! camera every frame.

use bevy::prelude::*;

use crate::constants::{
    BASE_ZOOM, DEFAULT_WINDOW_HEIGHT, DEFAULT_WINDOW_WIDTH, MAX_MERCATOR_LATITUDE, TILE_SIZE,
};
use crate::geo::LatLng;

/// Projection services provided by the host map.
///
/// Screen points are container pixels with the origin at the top-left corner
/// and y growing downwards.
pub trait Viewport {
    fn project(&self, latlng: LatLng) -> Vec2;
    fn unproject(&self, point: Vec2) -> LatLng;

    /// Geodesic distance in meters
    fn distance(&self, a: LatLng, b: LatLng) -> f64 {
        a.distance_to(b)
    }

    /// Geographic position at the middle of the viewport
    fn center(&self) -> LatLng;
}

/// Spherical mercator at an arbitrary (fractional) zoom level.
#[derive(Resource, Debug, Clone, Copy, PartialEq)]
pub struct MercatorViewport {
    pub center: LatLng,
    pub zoom: f64,
    pub size: Vec2,
}

impl Default for MercatorViewport {
    fn default() -> Self {
        Self {
            center: LatLng::default(),
            zoom: BASE_ZOOM,
            size: Vec2::new(DEFAULT_WINDOW_WIDTH, DEFAULT_WINDOW_HEIGHT),
        }
    }
}

/// Map pixel coordinates of `latlng` at `zoom` (origin at the north-west corner
/// of the world).
pub fn mercator_pixel(latlng: LatLng, zoom: f64) -> (f64, f64) {
    let scale = TILE_SIZE * 2f64.powf(zoom);
    let lat = latlng
        .lat
        .clamp(-MAX_MERCATOR_LATITUDE, MAX_MERCATOR_LATITUDE)
        .to_radians();
    let x = (latlng.lng + 180.0) / 360.0;
    let y = (1.0 - (lat.tan() + 1.0 / lat.cos()).ln() / std::f64::consts::PI) / 2.0;
    (x * scale, y * scale)
}

/// Inverse of [`mercator_pixel`]
pub fn mercator_latlng(x: f64, y: f64, zoom: f64) -> LatLng {
    let scale = TILE_SIZE * 2f64.powf(zoom);
    let lng = x / scale * 360.0 - 180.0;
    let n = std::f64::consts::PI * (1.0 - 2.0 * y / scale);
    let lat = n.sinh().atan().to_degrees();
    LatLng::new(lat, lng)
}

/// Position of `latlng` in the Bevy scene (mercator pixels at [`BASE_ZOOM`],
/// y flipped so north is up).
pub fn world_position(latlng: LatLng) -> Vec2 {
    let (x, y) = mercator_pixel(latlng, BASE_ZOOM);
    Vec2::new(x as f32, -(y as f32))
}

/// Inverse of [`world_position`]
pub fn world_to_latlng(world: Vec2) -> LatLng {
    mercator_latlng(world.x as f64, -(world.y as f64), BASE_ZOOM)
}

impl MercatorViewport {
    pub fn new(center: LatLng, zoom: f64, size: Vec2) -> Self {
        Self { center, zoom, size }
    }

    /// Build the viewport an orthographic camera currently shows.
    ///
    /// `scale` is the projection scale (world units per screen pixel).
    pub fn from_camera(translation: Vec2, scale: f32, size: Vec2) -> Self {
        let zoom = BASE_ZOOM - (scale.max(f32::EPSILON) as f64).log2();
        Self {
            center: world_to_latlng(translation),
            zoom,
            size,
        }
    }

    /// Orthographic scale that shows this viewport's zoom
    pub fn camera_scale(&self) -> f32 {
        2f64.powf(BASE_ZOOM - self.zoom) as f32
    }
}

impl Viewport for MercatorViewport {
    fn project(&self, latlng: LatLng) -> Vec2 {
        let (x, y) = mercator_pixel(latlng, self.zoom);
        let (cx, cy) = mercator_pixel(self.center, self.zoom);
        Vec2::new(
            (x - cx) as f32 + self.size.x / 2.0,
            (y - cy) as f32 + self.size.y / 2.0,
        )
    }

    fn unproject(&self, point: Vec2) -> LatLng {
        let (cx, cy) = mercator_pixel(self.center, self.zoom);
        let x = cx + (point.x - self.size.x / 2.0) as f64;
        let y = cy + (point.y - self.size.y / 2.0) as f64;
        mercator_latlng(x, y, self.zoom)
    }

    fn center(&self) -> LatLng {
        self.center
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: LatLng, b: LatLng) -> bool {
        (a.lat - b.lat).abs() < 1e-6 && (a.lng - b.lng).abs() < 1e-6
    }

    #[test]
    fn test_center_projects_to_middle() {
        let vp = MercatorViewport::new(LatLng::new(48.85, 2.35), 13.0, Vec2::new(800.0, 600.0));
        let p = vp.project(vp.center);
        assert!((p - Vec2::new(400.0, 300.0)).length() < 1e-3);
    }

    #[test]
    fn test_project_unproject_inverse() {
        let vp = MercatorViewport::new(LatLng::new(45.8, 15.97), 14.0, Vec2::new(800.0, 600.0));
        let ll = LatLng::new(45.801, 15.975);
        assert!(approx(vp.unproject(vp.project(ll)), ll));
    }

    #[test]
    fn test_north_is_up_on_screen() {
        let vp = MercatorViewport::new(LatLng::new(10.0, 10.0), 10.0, Vec2::new(800.0, 600.0));
        let north = vp.project(LatLng::new(10.1, 10.0));
        let south = vp.project(LatLng::new(9.9, 10.0));
        assert!(north.y < south.y);
    }

    #[test]
    fn test_world_position_roundtrip() {
        // f32 world coordinates lose a little precision far from the origin
        let ll = LatLng::new(-33.86, 151.2);
        let back = world_to_latlng(world_position(ll));
        assert!((back.lat - ll.lat).abs() < 1e-4 && (back.lng - ll.lng).abs() < 1e-4);
    }

    #[test]
    fn test_from_camera_zoom() {
        let vp = MercatorViewport::from_camera(Vec2::ZERO, 2.0, Vec2::new(800.0, 600.0));
        assert!((vp.zoom - (BASE_ZOOM - 1.0)).abs() < 1e-9);
        assert!((vp.camera_scale() - 2.0).abs() < 1e-6);
    }
}
