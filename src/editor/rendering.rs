//! Gizmo rendering of features, edit handles and preview guides.
//!
//! Features draw with the default gizmo group on the map layer; handles and
//! guides use their own groups on the edit overlay layer.

use bevy::camera::visibility::RenderLayers;
use bevy::gizmos::config::{GizmoConfigGroup, GizmoConfigStore};
use bevy::prelude::*;

use crate::config::EditorConfig;
use crate::constants::MARKER_HIT_RADIUS;
use crate::editable::circle::pixel_radius;
use crate::editable::{EditableMap, Editor, Feature, Shape, VertexMarker};
use crate::geo::LatLng;
use crate::theme;
use crate::viewport::{MercatorViewport, world_position};

use super::events::ActiveFeature;

/// Vertex and middle marker handles
#[derive(Default, Reflect, GizmoConfigGroup)]
pub struct HandleGizmoGroup;

/// Dashed preview guides; line width follows the configured guide weight
#[derive(Default, Reflect, GizmoConfigGroup)]
pub struct GuideGizmoGroup;

pub fn configure_edit_gizmos(mut config_store: ResMut<GizmoConfigStore>) {
    let (config, _) = config_store.config_mut::<HandleGizmoGroup>();
    config.render_layers = RenderLayers::layer(1);
    config.line.width = 1.5;

    let (config, _) = config_store.config_mut::<GuideGizmoGroup>();
    config.render_layers = RenderLayers::layer(1);
}

pub fn sync_guide_gizmos(config: Res<EditorConfig>, mut config_store: ResMut<GizmoConfigStore>) {
    let (gizmo_config, _) = config_store.config_mut::<GuideGizmoGroup>();
    gizmo_config.line.width = config.data.line_guide_weight.max(0.5);
}

/// Split `a..b` into dashes of `dash` length separated by `gap`.
pub fn dash_segments(a: Vec2, b: Vec2, dash: f32, gap: f32) -> Vec<(Vec2, Vec2)> {
    let length = a.distance(b);
    if length <= f32::EPSILON || dash <= 0.0 {
        return Vec::new();
    }
    let direction = (b - a) / length;
    let period = dash + gap.max(0.0);

    let mut segments = Vec::new();
    let mut start = 0.0;
    while start < length {
        let end = (start + dash).min(length);
        segments.push((a + direction * start, a + direction * end));
        start += period;
    }
    segments
}

fn ring(latlngs: Vec<LatLng>, closed: bool) -> Vec<Vec2> {
    let mut points: Vec<Vec2> = latlngs.into_iter().map(world_position).collect();
    if closed && points.len() > 2 {
        points.push(points[0]);
    }
    points
}

fn draw_shape(gizmos: &mut Gizmos, feature: &Feature, viewport: &MercatorViewport, color: Color) {
    let scale = viewport.camera_scale();
    match &feature.shape {
        Shape::Marker { position } => {
            let center = world_position(position.latlng());
            let radius = MARKER_HIT_RADIUS * scale;
            gizmos.circle_2d(Isometry2d::from_translation(center), radius, color);
            gizmos.line_2d(center, center - Vec2::Y * radius * 2.0, color);
        }
        Shape::Polyline { path } => {
            gizmos.linestrip_2d(ring(path.latlngs(), false), color);
        }
        Shape::Polygon { outer, holes } => {
            for sequence in std::iter::once(outer).chain(holes) {
                gizmos.linestrip_2d(ring(sequence.latlngs(), true), color);
            }
        }
        Shape::Circle { center, radius } => {
            let world_radius = pixel_radius(viewport, center.latlng(), *radius) * scale;
            gizmos
                .circle_2d(
                    Isometry2d::from_translation(world_position(center.latlng())),
                    world_radius,
                    color,
                )
                .resolution(64);
        }
    }
}

pub fn draw_features(
    mut gizmos: Gizmos,
    map: Res<EditableMap>,
    viewport: Res<MercatorViewport>,
    active: Res<ActiveFeature>,
) {
    let drawing = map.drawing_editor();
    for feature in map.features() {
        // Shapes being drawn are shown before their first click connects them
        if !feature.is_connected() && drawing != Some(feature.id()) {
            continue;
        }
        let color = if active.get() == Some(feature.id()) {
            theme::ACTIVE_FEATURE_COLOR
        } else {
            feature.style.color
        };
        draw_shape(&mut gizmos, feature, &viewport, color);
    }
}

/// The drawn sequence's open ends
fn is_terminal(editor: &Editor, shape: &Shape, vertex: &VertexMarker) -> bool {
    let Some(session) = editor.session() else {
        return false;
    };
    if session.sequence != Some(vertex.sequence()) {
        return false;
    }
    let Some(sequence) = editor.seq(shape, vertex.sequence()) else {
        return false;
    };
    vertex
        .index(sequence)
        .is_some_and(|i| i == 0 || i == VertexMarker::last_index(sequence))
}

pub fn draw_handles(
    mut gizmos: Gizmos<HandleGizmoGroup>,
    map: Res<EditableMap>,
    viewport: Res<MercatorViewport>,
) {
    let size = Vec2::splat(map.tools().options().icon_size() * viewport.camera_scale());

    for feature in map.features().filter(|f| f.edit_enabled()) {
        let Some(editor) = feature.editor() else {
            continue;
        };

        for vertex in editor.vertices() {
            let Some(latlng) = editor.vertex_latlng(&feature.shape, vertex.coord()) else {
                continue;
            };
            let color = if is_terminal(editor, &feature.shape, vertex) {
                theme::TERMINAL_VERTEX_COLOR
            } else {
                theme::VERTEX_COLOR
            };
            gizmos.rect_2d(
                Isometry2d::from_translation(world_position(latlng)),
                size,
                color,
            );
        }

        for middle in editor.middle_markers().filter(|m| m.is_visible()) {
            gizmos.rect_2d(
                Isometry2d::from_translation(world_position(middle.latlng())),
                size * 0.75,
                theme::MIDDLE_MARKER_COLOR.with_alpha(middle.opacity()),
            );
        }
    }
}

pub fn draw_guides(
    mut gizmos: Gizmos<GuideGizmoGroup>,
    map: Res<EditableMap>,
    viewport: Res<MercatorViewport>,
) {
    let tools = map.tools();
    let style = tools.options().line_guide;
    let scale = viewport.camera_scale();

    for guide in [tools.forward_guide(), tools.backward_guide()] {
        let Some((anchor, tip)) = guide.segment() else {
            continue;
        };
        let segments = dash_segments(
            world_position(anchor),
            world_position(tip),
            style.dash * scale,
            style.gap * scale,
        );
        for (start, end) in segments {
            gizmos.line_2d(start, end, style.color);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dash_segments_cover_line() {
        let segments = dash_segments(Vec2::ZERO, Vec2::new(20.0, 0.0), 5.0, 5.0);
        assert_eq!(
            segments,
            vec![
                (Vec2::ZERO, Vec2::new(5.0, 0.0)),
                (Vec2::new(10.0, 0.0), Vec2::new(15.0, 0.0)),
            ]
        );
    }

    #[test]
    fn test_last_dash_is_clipped() {
        let segments = dash_segments(Vec2::ZERO, Vec2::new(0.0, 12.0), 5.0, 5.0);
        assert_eq!(segments.len(), 2);
        assert_eq!(segments[1].1, Vec2::new(0.0, 12.0));
    }

    #[test]
    fn test_degenerate_guide_has_no_dashes() {
        assert!(dash_segments(Vec2::ONE, Vec2::ONE, 5.0, 5.0).is_empty());
        assert!(dash_segments(Vec2::ZERO, Vec2::X, 0.0, 5.0).is_empty());
    }

    #[test]
    fn test_closed_ring_repeats_first_point() {
        let latlngs = vec![LatLng::new(0.0, 0.0), LatLng::new(0.0, 1.0), LatLng::new(1.0, 1.0)];
        let points = ring(latlngs.clone(), true);
        assert_eq!(points.len(), 4);
        assert_eq!(points[0], points[3]);
        assert_eq!(ring(latlngs, false).len(), 3);
    }
}
