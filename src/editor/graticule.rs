use bevy::prelude::*;

use crate::constants::{MAX_MERCATOR_LATITUDE, TILE_SIZE};
use crate::geo::LatLng;
use crate::theme;
use crate::viewport::{MercatorViewport, Viewport, world_position};

/// Minimum on-screen spacing between graticule lines, in pixels
const MIN_LINE_SPACING: f64 = 80.0;

/// Candidate spacings in degrees, finest first
const STEPS: [f64; 14] = [
    0.0005, 0.001, 0.002, 0.005, 0.01, 0.02, 0.05, 0.1, 0.2, 0.5, 1.0, 2.0, 5.0, 10.0,
];

#[derive(Resource)]
pub struct GraticuleSettings {
    pub visible: bool,
}

impl Default for GraticuleSettings {
    fn default() -> Self {
        Self { visible: true }
    }
}

/// Finest spacing (degrees) that keeps meridians at least
/// [`MIN_LINE_SPACING`] pixels apart at `zoom`
pub fn graticule_step(zoom: f64) -> f64 {
    let pixels_per_degree = TILE_SIZE * 2f64.powf(zoom) / 360.0;
    STEPS
        .iter()
        .copied()
        .find(|step| step * pixels_per_degree >= MIN_LINE_SPACING)
        .unwrap_or(STEPS[STEPS.len() - 1])
}

/// Multiples of `step` covering `[min, max]`
fn lines_between(min: f64, max: f64, step: f64) -> impl Iterator<Item = f64> {
    let first = (min / step).floor() as i64;
    let last = (max / step).ceil() as i64;
    (first..=last).map(move |i| i as f64 * step)
}

pub fn draw_graticule(
    mut gizmos: Gizmos,
    settings: Res<GraticuleSettings>,
    viewport: Res<MercatorViewport>,
) {
    if !settings.visible {
        return;
    }

    let step = graticule_step(viewport.zoom);
    let north_west = viewport.unproject(Vec2::ZERO);
    let south_east = viewport.unproject(viewport.size);
    let lat_min = south_east.lat.max(-MAX_MERCATOR_LATITUDE);
    let lat_max = north_west.lat.min(MAX_MERCATOR_LATITUDE);
    let lng_min = north_west.lng.max(-180.0);
    let lng_max = south_east.lng.min(180.0);

    let color = |value: f64| {
        if value.abs() < step / 2.0 {
            theme::GRATICULE_AXIS_COLOR
        } else {
            theme::GRATICULE_COLOR
        }
    };

    // Meridians and parallels are straight lines in mercator
    for lng in lines_between(lng_min, lng_max, step) {
        gizmos.line_2d(
            world_position(LatLng::new(lat_min, lng)),
            world_position(LatLng::new(lat_max, lng)),
            color(lng),
        );
    }

    for lat in lines_between(lat_min, lat_max, step) {
        gizmos.line_2d(
            world_position(LatLng::new(lat, lng_min)),
            world_position(LatLng::new(lat, lng_max)),
            color(lat),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_graticule_settings_default() {
        assert!(GraticuleSettings::default().visible);
    }

    #[test]
    fn test_step_shrinks_when_zooming_in() {
        assert!(graticule_step(16.0) < graticule_step(10.0));
        assert_eq!(graticule_step(0.0), 10.0);
    }

    #[test]
    fn test_step_keeps_minimum_spacing() {
        for zoom in [4.0, 8.0, 12.0, 15.5, 18.0] {
            let step = graticule_step(zoom);
            let pixels = step * TILE_SIZE * 2f64.powf(zoom) / 360.0;
            assert!(pixels >= MIN_LINE_SPACING, "zoom {} step {}", zoom, step);
        }
    }

    #[test]
    fn test_lines_cover_range() {
        let lines: Vec<f64> = lines_between(0.15, 0.42, 0.1).collect();
        assert_eq!(lines.len(), 5);
        assert!((lines[0] - 0.1).abs() < 1e-12);
        assert!((lines[4] - 0.5).abs() < 1e-12);
    }
}
