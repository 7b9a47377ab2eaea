//! Drawing session state and the rubber-band preview guides.

use crate::geo::{LatLng, SequenceId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DrawDirection {
    /// Points are appended after the last vertex
    #[default]
    Forward,
    /// Points are prepended before the first vertex
    Backward,
}

/// Externally visible state of an editor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DrawingState {
    #[default]
    Idle,
    DrawingForward,
    DrawingBackward,
    HoleDrawing,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DrawingSession {
    pub direction: DrawDirection,
    /// Sequence receiving new points. `None` for markers and circles.
    pub sequence: Option<SequenceId>,
    pub hole: bool,
}

impl DrawingSession {
    pub fn new(direction: DrawDirection, sequence: Option<SequenceId>) -> Self {
        Self {
            direction,
            sequence,
            hole: false,
        }
    }

    pub fn hole(sequence: SequenceId) -> Self {
        Self {
            direction: DrawDirection::Forward,
            sequence: Some(sequence),
            hole: true,
        }
    }

    pub fn state(&self) -> DrawingState {
        match (self.hole, self.direction) {
            (true, _) => DrawingState::HoleDrawing,
            (false, DrawDirection::Forward) => DrawingState::DrawingForward,
            (false, DrawDirection::Backward) => DrawingState::DrawingBackward,
        }
    }
}

/// Preview segment from the last placed point to the pointer.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct LineGuide {
    anchor: Option<LatLng>,
    tip: Option<LatLng>,
    attached: bool,
}

impl LineGuide {
    pub fn attach(&mut self) {
        self.attached = true;
    }

    /// Remove from the edit layer and forget both ends.
    pub fn detach(&mut self) {
        self.attached = false;
        self.anchor = None;
        self.tip = None;
    }

    pub fn anchor_at(&mut self, latlng: LatLng) {
        self.anchor = Some(latlng);
    }

    /// Move the free end. Ignored until the guide has an anchor.
    pub fn move_to(&mut self, latlng: LatLng) {
        if self.anchor.is_some() {
            self.tip = Some(latlng);
        }
    }

    pub fn is_attached(&self) -> bool {
        self.attached
    }

    pub fn anchor(&self) -> Option<LatLng> {
        self.anchor
    }

    pub fn tip(&self) -> Option<LatLng> {
        self.tip
    }

    /// Both ends, when the guide is attached and has something to show
    pub fn segment(&self) -> Option<(LatLng, LatLng)> {
        if !self.attached {
            return None;
        }
        Some((self.anchor?, self.tip?))
    }
}
