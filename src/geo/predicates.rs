//! Screen-space hit tests for paths and polygons.
//!
//! All inputs are container points (pixels, y down) so tolerances are in
//! pixels regardless of zoom. A "part" is one ring or path.

use bevy::prelude::*;

/// Distance from `point` to the segment `seg_start..seg_end`
pub fn point_to_segment_distance(point: Vec2, seg_start: Vec2, seg_end: Vec2) -> f32 {
    let line_vec = seg_end - seg_start;
    let line_len_sq = line_vec.length_squared();

    if line_len_sq < 0.0001 {
        // Segment is essentially a point
        return point.distance(seg_start);
    }

    // Project point onto line, clamped to segment
    let t = ((point - seg_start).dot(line_vec) / line_len_sq).clamp(0.0, 1.0);
    let projection = seg_start + line_vec * t;

    point.distance(projection)
}

/// Half the stroke weight, inflated on touch input.
pub fn hit_tolerance(weight: f32, touch: bool, touch_tolerance: f32) -> f32 {
    let half = weight / 2.0;
    if touch { half + touch_tolerance } else { half }
}

/// Check if a point is within `tolerance` of any segment of any part.
///
/// Open paths skip the closing segment (last -> first); closed rings include it.
pub fn point_near_polyline<P: AsRef<[Vec2]>>(
    point: Vec2,
    parts: &[P],
    tolerance: f32,
    closed: bool,
) -> bool {
    for part in parts {
        let part = part.as_ref();
        let len = part.len();
        if len == 0 {
            continue;
        }
        let mut k = len - 1;
        for j in 0..len {
            if closed || j != 0 {
                let dist = point_to_segment_distance(point, part[k], part[j]);
                if dist <= tolerance {
                    return true;
                }
            }
            k = j;
        }
    }
    false
}

/// Check if a point is inside a polygon given by its rings.
///
/// A hit on the border counts as inside. Otherwise ray casting parity is
/// computed over every ring passed in; callers wanting "inside the outer
/// ring" pass only that ring.
pub fn point_in_polygon<P: AsRef<[Vec2]>>(point: Vec2, parts: &[P], tolerance: f32) -> bool {
    if point_near_polyline(point, parts, tolerance, true) {
        return true;
    }

    let mut inside = false;
    for part in parts {
        let part = part.as_ref();
        let len = part.len();
        if len == 0 {
            continue;
        }
        let mut k = len - 1;
        for j in 0..len {
            let p1 = part[j];
            let p2 = part[k];
            if (p1.y > point.y) != (p2.y > point.y)
                && point.x < (p2.x - p1.x) * (point.y - p1.y) / (p2.y - p1.y) + p1.x
            {
                inside = !inside;
            }
            k = j;
        }
    }
    inside
}

/// Check if a point falls on a circle's disc (or its stroke).
pub fn point_in_circle(point: Vec2, center: Vec2, radius: f32, tolerance: f32) -> bool {
    point.distance(center) <= radius + tolerance
}
