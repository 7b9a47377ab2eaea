//! Colors used by the map rendering and the egui panels.

use bevy::prelude::Color;
use bevy_egui::egui;

// ============================================================================
// Map Colors
// ============================================================================

/// Background behind the graticule
pub const MAP_BACKGROUND: Color = Color::srgb(0.93, 0.92, 0.89);

/// Lat/lng graticule lines
pub const GRATICULE_COLOR: Color = Color::srgba(0.45, 0.45, 0.5, 0.35);

/// Equator and prime meridian
pub const GRATICULE_AXIS_COLOR: Color = Color::srgba(0.3, 0.3, 0.4, 0.7);

// ============================================================================
// Feature Colors
// ============================================================================

/// Outline of the feature being worked on
pub const ACTIVE_FEATURE_COLOR: Color = Color::srgb(1.0, 0.55, 0.1);

// ============================================================================
// Handle Colors
// ============================================================================

pub const VERTEX_COLOR: Color = Color::srgb(0.1, 0.1, 0.1);

/// Vertex that commits the drawing when clicked
pub const TERMINAL_VERTEX_COLOR: Color = Color::srgb(0.85, 0.15, 0.15);

/// Alpha is the middle marker's opacity
pub const MIDDLE_MARKER_COLOR: Color = Color::srgb(0.1, 0.1, 0.1);

// ============================================================================
// UI Colors
// ============================================================================

/// Status bar label while a drawing is in progress
pub const STATUS_DRAWING: egui::Color32 = egui::Color32::from_rgb(255, 160, 60);

/// Status bar label when idle
pub const STATUS_IDLE: egui::Color32 = egui::Color32::GRAY;
