//! Orthographic camera over the web-mercator world plane.
//!
//! One world unit is one map pixel at [`BASE_ZOOM`]; the projection scale
//! doubles per zoom level out. [`sync_viewport`] derives the
//! [`MercatorViewport`] the editing core works with from the camera.

use bevy::camera::visibility::RenderLayers;
use bevy::input::mouse::{MouseMotion, MouseScrollUnit, MouseWheel};
use bevy::prelude::*;
use bevy::window::PrimaryWindow;

use crate::config::EditorConfig;
use crate::constants::{BASE_ZOOM, MAX_ZOOM, MIN_ZOOM};
use crate::editable::EditableMap;
use crate::viewport::{MercatorViewport, world_position};

#[derive(Component)]
pub struct EditorCamera;

/// Orthographic scale: world units per screen pixel
#[derive(Component)]
pub struct CameraZoom {
    pub scale: f32,
}

impl Default for CameraZoom {
    fn default() -> Self {
        Self { scale: 1.0 }
    }
}

impl CameraZoom {
    pub fn from_zoom(zoom: f64) -> Self {
        Self {
            scale: scale_for_zoom(zoom),
        }
    }

    /// Zoom in by `levels` (negative zooms out), clamped to the allowed range.
    pub fn zoom_by(&mut self, levels: f32) {
        let min = scale_for_zoom(MAX_ZOOM);
        let max = scale_for_zoom(MIN_ZOOM);
        self.scale = (self.scale * 2f32.powf(-levels)).clamp(min, max);
    }
}

fn scale_for_zoom(zoom: f64) -> f32 {
    2f64.powf(BASE_ZOOM - zoom) as f32
}

pub fn spawn_camera(mut commands: Commands, config: Res<EditorConfig>) {
    let center = world_position(config.data.initial_center);
    let zoom = config.data.initial_zoom.clamp(MIN_ZOOM, MAX_ZOOM);
    info!(
        "Map view at {:?}, zoom {:.1}",
        config.data.initial_center, zoom
    );
    commands.spawn((
        Camera2d,
        EditorCamera,
        CameraZoom::from_zoom(zoom),
        Transform::from_translation(center.extend(1000.0)),
        // Layer 0 = map backdrop, Layer 1 = edit overlay
        RenderLayers::from_layers(&[0, 1]),
    ));
}

pub fn camera_pan(
    mouse_button: Res<ButtonInput<MouseButton>>,
    mut mouse_motion: MessageReader<MouseMotion>,
    mut camera_query: Query<(&mut Transform, &CameraZoom), With<EditorCamera>>,
) {
    if !mouse_button.pressed(MouseButton::Middle) {
        mouse_motion.clear();
        return;
    }

    let Ok((mut transform, zoom)) = camera_query.single_mut() else {
        return;
    };

    for event in mouse_motion.read() {
        let delta = event.delta * zoom.scale;
        transform.translation.x -= delta.x;
        transform.translation.y += delta.y;
    }
}

pub fn camera_zoom(
    mut scroll_events: MessageReader<MouseWheel>,
    mut camera_query: Query<&mut CameraZoom, With<EditorCamera>>,
) {
    let Ok(mut zoom) = camera_query.single_mut() else {
        return;
    };

    for event in scroll_events.read() {
        let levels = match event.unit {
            MouseScrollUnit::Line => event.y * 0.25,
            MouseScrollUnit::Pixel => event.y * 0.005,
        };
        zoom.zoom_by(levels);
    }
}

pub fn apply_camera_zoom(
    mut camera_query: Query<(&CameraZoom, &mut Projection), (With<EditorCamera>, Changed<CameraZoom>)>,
) {
    for (zoom, mut projection) in camera_query.iter_mut() {
        if let Projection::Orthographic(ref mut ortho) = *projection {
            ortho.scale = zoom.scale;
        }
    }
}

/// Rebuild the viewport from the camera; a zoom change repositions middle
/// markers since their screen midpoints moved.
pub fn sync_viewport(
    camera_query: Query<(&Transform, &CameraZoom), With<EditorCamera>>,
    window_query: Query<&Window, With<PrimaryWindow>>,
    mut viewport: ResMut<MercatorViewport>,
    mut map: ResMut<EditableMap>,
) {
    let Ok((transform, zoom)) = camera_query.single() else {
        return;
    };
    let Ok(window) = window_query.single() else {
        return;
    };

    let next = MercatorViewport::from_camera(
        transform.translation.truncate(),
        zoom.scale,
        window.size(),
    );
    if next == *viewport {
        return;
    }

    let zoom_changed = (next.zoom - viewport.zoom).abs() > f64::EPSILON;
    *viewport = next;
    if zoom_changed {
        map.refresh_middle_markers(&next);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zoom_roundtrips_through_scale() {
        let zoom = CameraZoom::from_zoom(14.0);
        assert!((zoom.scale - 0.25).abs() < 1e-6);
        let vp = MercatorViewport::from_camera(Vec2::ZERO, zoom.scale, Vec2::new(800.0, 600.0));
        assert!((vp.zoom - 14.0).abs() < 1e-6);
    }

    #[test]
    fn test_zoom_by_doubles_per_level() {
        let mut zoom = CameraZoom::default();
        zoom.zoom_by(1.0);
        assert!((zoom.scale - 0.5).abs() < 1e-6);
        zoom.zoom_by(-2.0);
        assert!((zoom.scale - 2.0).abs() < 1e-6);
    }

    #[test]
    fn test_zoom_is_clamped() {
        let mut zoom = CameraZoom::default();
        zoom.zoom_by(100.0);
        assert!((zoom.scale - scale_for_zoom(MAX_ZOOM)).abs() < 1e-9);
        zoom.zoom_by(-100.0);
        assert!((zoom.scale - scale_for_zoom(MIN_ZOOM)).abs() < 1e-3);
    }
}
