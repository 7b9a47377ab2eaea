//! Centralized constants used across the application.
//!
//! Values that users may want to tune live in [`crate::config`] and
//! [`crate::editable::EditToolsOptions`]; the numbers here are their defaults
//! or genuinely fixed quantities.

/// Default window width in pixels
pub const DEFAULT_WINDOW_WIDTH: f32 = 1600.0;

/// Default window height in pixels
pub const DEFAULT_WINDOW_HEIGHT: f32 = 900.0;

/// Mean earth radius used for geodesic distances
pub const EARTH_RADIUS_METERS: f64 = 6_371_000.0;

/// Equatorial circumference used to turn a metric radius into a longitude span
pub const EARTH_CIRCUMFERENCE_METERS: f64 = 40_075_017.0;

/// Latitude limit of the spherical mercator projection
pub const MAX_MERCATOR_LATITUDE: f64 = 85.051_128_779_8;

/// Tile size in pixels at zoom 0
pub const TILE_SIZE: f64 = 256.0;

/// Zoom level at which one world unit of the Bevy scene equals one map pixel
pub const BASE_ZOOM: f64 = 12.0;

/// Zoom range allowed for the editor camera
pub const MIN_ZOOM: f64 = 2.0;
pub const MAX_ZOOM: f64 = 19.0;

/// Base z-index for edit handles; each new handle gets the next value
pub const DEFAULT_Z_INDEX: i32 = 1000;

/// Events kept for hosts that drain the journal; older ones are dropped
pub const MAX_JOURNAL_SIZE: usize = 4096;

/// Vertex handle icon size in pixels (mouse input)
pub const VERTEX_ICON_SIZE: f32 = 8.0;

/// Vertex handle icon size in pixels (touch input)
pub const TOUCH_VERTEX_ICON_SIZE: f32 = 20.0;

/// Default opacity of a visible middle marker
pub const MIDDLE_MARKER_OPACITY: f32 = 0.5;

/// A middle marker hides when its parents are closer than this many icon widths
pub const MIDDLE_MARKER_HIDE_FACTOR: f32 = 3.0;

/// Extra hit tolerance for strokes on touch input, in pixels
pub const TOUCH_HIT_TOLERANCE: f32 = 10.0;

/// A press released within this distance (pixels) counts as a click
pub const CLICK_TOLERANCE: f32 = 9.0;

/// Pointer travel (pixels) before a press on a handle becomes a drag
pub const DRAG_THRESHOLD: f32 = 3.0;

/// Hit radius of a marker feature's icon, in pixels
pub const MARKER_HIT_RADIUS: f32 = 12.0;

/// Default stroke weight of features, in pixels
pub const DEFAULT_STROKE_WEIGHT: f32 = 3.0;

/// Default radius of a circle created without one, in meters
pub const DEFAULT_CIRCLE_RADIUS: f64 = 10.0;
