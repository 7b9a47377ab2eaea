//! Features: the geometries being edited.

use bevy::prelude::*;

use crate::constants::{DEFAULT_STROKE_WEIGHT, MARKER_HIT_RADIUS};
use crate::geo::predicates::{point_in_circle, point_in_polygon, point_near_polyline};
use crate::geo::{Coordinate, CoordinateSequence, LatLng, SequenceId};
use crate::viewport::Viewport;

use super::circle::pixel_radius;
use super::editor::Editor;
use super::events::Listeners;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FeatureId(u64);

impl FeatureId {
    pub(crate) fn new(raw: u64) -> Self {
        Self(raw)
    }

    pub fn raw(&self) -> u64 {
        self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShapeKind {
    Marker,
    Polyline,
    Polygon,
    Circle,
}

impl ShapeKind {
    pub fn display_name(&self) -> &'static str {
        match self {
            ShapeKind::Marker => "Marker",
            ShapeKind::Polyline => "Polyline",
            ShapeKind::Polygon => "Polygon",
            ShapeKind::Circle => "Circle",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Shape {
    Marker {
        position: Coordinate,
    },
    Polyline {
        path: CoordinateSequence,
    },
    Polygon {
        outer: CoordinateSequence,
        holes: Vec<CoordinateSequence>,
    },
    /// `radius` in meters
    Circle { center: Coordinate, radius: f64 },
}

impl Shape {
    pub fn kind(&self) -> ShapeKind {
        match self {
            Shape::Marker { .. } => ShapeKind::Marker,
            Shape::Polyline { .. } => ShapeKind::Polyline,
            Shape::Polygon { .. } => ShapeKind::Polygon,
            Shape::Circle { .. } => ShapeKind::Circle,
        }
    }

    /// The path, or the outer ring of a polygon
    pub fn primary(&self) -> Option<&CoordinateSequence> {
        match self {
            Shape::Polyline { path } => Some(path),
            Shape::Polygon { outer, .. } => Some(outer),
            _ => None,
        }
    }

    /// All coordinate groups: the path or outer ring first, then holes.
    pub fn sequences(&self) -> Vec<&CoordinateSequence> {
        match self {
            Shape::Polyline { path } => vec![path],
            Shape::Polygon { outer, holes } => {
                let mut groups = Vec::with_capacity(holes.len() + 1);
                groups.push(outer);
                groups.extend(holes.iter());
                groups
            }
            _ => Vec::new(),
        }
    }

    pub fn sequence(&self, id: SequenceId) -> Option<&CoordinateSequence> {
        match self {
            Shape::Polyline { path } if path.id() == id => Some(path),
            Shape::Polygon { outer, holes } => {
                if outer.id() == id {
                    Some(outer)
                } else {
                    holes.iter().find(|h| h.id() == id)
                }
            }
            _ => None,
        }
    }

    pub fn sequence_mut(&mut self, id: SequenceId) -> Option<&mut CoordinateSequence> {
        match self {
            Shape::Polyline { path } if path.id() == id => Some(path),
            Shape::Polygon { outer, holes } => {
                if outer.id() == id {
                    Some(outer)
                } else {
                    holes.iter_mut().find(|h| h.id() == id)
                }
            }
            _ => None,
        }
    }

    pub fn is_hole(&self, id: SequenceId) -> bool {
        match self {
            Shape::Polygon { holes, .. } => holes.iter().any(|h| h.id() == id),
            _ => false,
        }
    }

    pub fn holes(&self) -> &[CoordinateSequence] {
        match self {
            Shape::Polygon { holes, .. } => holes,
            _ => &[],
        }
    }

    /// Append an empty hole to a polygon and return its id.
    pub fn add_hole(&mut self) -> Option<SequenceId> {
        match self {
            Shape::Polygon { holes, .. } => {
                let hole = CoordinateSequence::new();
                let id = hole.id();
                holes.push(hole);
                Some(id)
            }
            _ => None,
        }
    }

    pub fn remove_hole(&mut self, id: SequenceId) -> bool {
        match self {
            Shape::Polygon { holes, .. } => {
                let before = holes.len();
                holes.retain(|h| h.id() != id);
                holes.len() != before
            }
            _ => false,
        }
    }

    /// Representative position: marker position, circle center or first vertex
    pub fn anchor(&self) -> Option<LatLng> {
        match self {
            Shape::Marker { position } => Some(position.latlng()),
            Shape::Circle { center, .. } => Some(center.latlng()),
            _ => self.primary().and_then(|s| s.first()).map(Coordinate::latlng),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PathStyle {
    pub color: Color,
    pub weight: f32,
}

impl Default for PathStyle {
    fn default() -> Self {
        Self {
            color: Color::srgb(0.2, 0.5, 1.0),
            weight: DEFAULT_STROKE_WEIGHT,
        }
    }
}

#[derive(Debug)]
pub struct Feature {
    id: FeatureId,
    pub shape: Shape,
    pub style: PathStyle,
    pub(crate) editor: Option<Editor>,
    pub(crate) listeners: Listeners,
    pub(crate) connected: bool,
    pub(crate) revision: u64,
}

impl Feature {
    pub(crate) fn new(id: FeatureId, shape: Shape, style: PathStyle) -> Self {
        Self {
            id,
            shape,
            style,
            editor: None,
            listeners: Listeners::default(),
            connected: false,
            revision: 0,
        }
    }

    pub fn id(&self) -> FeatureId {
        self.id
    }

    pub fn kind(&self) -> ShapeKind {
        self.shape.kind()
    }

    pub fn editor(&self) -> Option<&Editor> {
        self.editor.as_ref()
    }

    pub fn edit_enabled(&self) -> bool {
        self.editor.as_ref().is_some_and(Editor::enabled)
    }

    /// Whether the feature has been added to the map (new shapes connect on
    /// their first accepted click)
    pub fn is_connected(&self) -> bool {
        self.connected
    }

    /// Incremented every time the feature asks to be redrawn
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub(crate) fn redraw(&mut self) {
        self.revision += 1;
    }

    /// Screen-space pick test. `tolerance` widens strokes and borders.
    pub fn contains_point(&self, viewport: &dyn Viewport, point: Vec2, tolerance: f32) -> bool {
        let project = |seq: &CoordinateSequence| -> Vec<Vec2> {
            seq.iter().map(|c| viewport.project(c.latlng())).collect()
        };
        match &self.shape {
            Shape::Marker { position } => {
                viewport.project(position.latlng()).distance(point) <= MARKER_HIT_RADIUS
            }
            Shape::Polyline { path } => {
                point_near_polyline(point, &[project(path)], tolerance, false)
            }
            Shape::Polygon { .. } => {
                let rings: Vec<Vec<Vec2>> = self.shape.sequences().into_iter().map(project).collect();
                point_in_polygon(point, &rings, tolerance)
            }
            Shape::Circle { center, radius } => point_in_circle(
                point,
                viewport.project(center.latlng()),
                pixel_radius(viewport, center.latlng(), *radius),
                tolerance,
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn polygon() -> Shape {
        Shape::Polygon {
            outer: CoordinateSequence::from_latlngs([
                LatLng::new(0.0, 0.0),
                LatLng::new(0.0, 1.0),
                LatLng::new(1.0, 1.0),
            ]),
            holes: Vec::new(),
        }
    }

    #[test]
    fn test_sequences_outer_first() {
        let mut shape = polygon();
        let hole = shape.add_hole().unwrap();
        let groups = shape.sequences();
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].len(), 3);
        assert_eq!(groups[1].id(), hole);
        assert!(shape.is_hole(hole));
        assert!(!shape.is_hole(groups[0].id()));
    }

    #[test]
    fn test_remove_hole() {
        let mut shape = polygon();
        let hole = shape.add_hole().unwrap();
        assert!(shape.remove_hole(hole));
        assert!(shape.holes().is_empty());
        assert!(!shape.remove_hole(hole));
    }

    #[test]
    fn test_polyline_has_no_holes() {
        let mut shape = Shape::Polyline {
            path: CoordinateSequence::new(),
        };
        assert!(shape.add_hole().is_none());
        assert_eq!(shape.kind(), ShapeKind::Polyline);
    }
}
