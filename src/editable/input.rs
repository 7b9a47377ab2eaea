//! Pointer input as the editing core sees it, plus press/drag tracking.

use bevy::prelude::*;

use crate::geo::{CoordId, LatLng};

use super::feature::FeatureId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PointerPhase {
    #[default]
    Down,
    Move,
    Up,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PointerButton {
    #[default]
    Primary,
    Secondary,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Modifiers {
    pub ctrl: bool,
    pub alt: bool,
    pub shift: bool,
}

impl Modifiers {
    pub const NONE: Modifiers = Modifiers {
        ctrl: false,
        alt: false,
        shift: false,
    };

    pub fn ctrl() -> Self {
        Self {
            ctrl: true,
            ..Self::NONE
        }
    }

    pub fn alt() -> Self {
        Self {
            alt: true,
            ..Self::NONE
        }
    }

    pub fn shift() -> Self {
        Self {
            shift: true,
            ..Self::NONE
        }
    }
}

/// One pointer event, already resolved to a geographic position by the host.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PointerEvent {
    pub phase: PointerPhase,
    pub button: PointerButton,
    /// Container point (pixels, y down)
    pub screen: Vec2,
    pub latlng: LatLng,
    pub modifiers: Modifiers,
}

impl PointerEvent {
    pub fn new(phase: PointerPhase, screen: Vec2, latlng: LatLng) -> Self {
        Self {
            phase,
            screen,
            latlng,
            ..default()
        }
    }

    pub fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers = modifiers;
        self
    }

    pub fn with_button(mut self, button: PointerButton) -> Self {
        self.button = button;
        self
    }
}

/// What a primary press landed on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PressTarget {
    /// A vertex handle. `clickable` is false when the press was handed over
    /// from a middle marker or a circle being drawn.
    Vertex {
        feature: FeatureId,
        coord: CoordId,
        clickable: bool,
    },
    /// The icon of a marker feature being edited
    Marker { feature: FeatureId },
    /// Empty map
    Map,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PressState {
    pub origin: Vec2,
    /// Screen position of the pressed handle; equals `origin` for the map
    pub handle: Vec2,
    pub target: PressTarget,
    pub dragging: bool,
}

impl PressState {
    pub fn new(origin: Vec2, target: PressTarget) -> Self {
        Self {
            origin,
            handle: origin,
            target,
            dragging: false,
        }
    }

    pub fn with_handle(mut self, handle: Vec2) -> Self {
        self.handle = handle;
        self
    }

    /// Where the dragged handle goes, keeping its offset from the pointer.
    pub fn drag_position(&self, pointer: Vec2) -> Vec2 {
        self.handle + (pointer - self.origin)
    }

    /// Whether the pointer travelled far enough from the press to start a drag.
    pub fn exceeds(&self, position: Vec2, threshold: f32) -> bool {
        self.origin.distance(position) >= threshold
    }
}

/// Handle found under the pointer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandleHit {
    Vertex { feature: FeatureId, coord: CoordId },
    /// Middle marker, identified by its right-hand vertex
    MiddleMarker { feature: FeatureId, right: CoordId },
    Marker { feature: FeatureId },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_press_threshold() {
        let press = PressState::new(Vec2::new(10.0, 10.0), PressTarget::Map);
        assert!(!press.exceeds(Vec2::new(11.0, 11.0), 3.0));
        assert!(press.exceeds(Vec2::new(13.0, 10.0), 3.0));
    }

    #[test]
    fn test_drag_keeps_handle_offset() {
        let press = PressState::new(Vec2::new(10.0, 10.0), PressTarget::Map)
            .with_handle(Vec2::new(12.0, 9.0));
        assert_eq!(press.drag_position(Vec2::new(20.0, 10.0)), Vec2::new(22.0, 9.0));
    }

    #[test]
    fn test_modifier_helpers() {
        assert!(Modifiers::ctrl().ctrl);
        assert!(!Modifiers::ctrl().alt);
        assert_eq!(Modifiers::default(), Modifiers::NONE);
    }
}
