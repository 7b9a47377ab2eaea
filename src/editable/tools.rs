//! Per-viewport edit controller: preview guides, handle z-order, drawing
//! exclusivity and controller-level notifications.

use bevy::prelude::*;

use crate::constants::{
    CLICK_TOLERANCE, DEFAULT_CIRCLE_RADIUS, DEFAULT_Z_INDEX, DRAG_THRESHOLD, MAX_JOURNAL_SIZE,
    MIDDLE_MARKER_HIDE_FACTOR, MIDDLE_MARKER_OPACITY, TOUCH_HIT_TOLERANCE,
    TOUCH_VERTEX_ICON_SIZE, VERTEX_ICON_SIZE,
};

use super::drawing::{DrawDirection, LineGuide};
use super::events::{EditEvent, Listeners};
use super::feature::FeatureId;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GuideStyle {
    pub color: Color,
    pub weight: f32,
    pub dash: f32,
    pub gap: f32,
}

impl Default for GuideStyle {
    fn default() -> Self {
        Self {
            color: Color::srgba(0.2, 0.5, 1.0, 0.8),
            weight: 1.0,
            dash: 5.0,
            gap: 10.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct EditToolsOptions {
    pub z_index: i32,
    /// Touch-capable input: bigger vertex icons and stroke tolerance
    pub touch: bool,
    pub vertex_icon_size: f32,
    pub touch_vertex_icon_size: f32,
    pub skip_middle_markers: bool,
    pub middle_marker_opacity: f32,
    pub middle_marker_hide_factor: f32,
    pub touch_tolerance: f32,
    pub click_tolerance: f32,
    pub drag_threshold: f32,
    pub default_circle_radius: f64,
    pub line_guide: GuideStyle,
}

impl Default for EditToolsOptions {
    fn default() -> Self {
        Self {
            z_index: DEFAULT_Z_INDEX,
            touch: false,
            vertex_icon_size: VERTEX_ICON_SIZE,
            touch_vertex_icon_size: TOUCH_VERTEX_ICON_SIZE,
            skip_middle_markers: false,
            middle_marker_opacity: MIDDLE_MARKER_OPACITY,
            middle_marker_hide_factor: MIDDLE_MARKER_HIDE_FACTOR,
            touch_tolerance: TOUCH_HIT_TOLERANCE,
            click_tolerance: CLICK_TOLERANCE,
            drag_threshold: DRAG_THRESHOLD,
            default_circle_radius: DEFAULT_CIRCLE_RADIUS,
            line_guide: GuideStyle::default(),
        }
    }
}

impl EditToolsOptions {
    /// Icon width of vertex and middle marker handles for the input mode
    pub fn icon_size(&self) -> f32 {
        if self.touch {
            self.touch_vertex_icon_size
        } else {
            self.vertex_icon_size
        }
    }
}

#[derive(Debug, Default)]
pub struct EditTools {
    options: EditToolsOptions,
    forward_guide: LineGuide,
    backward_guide: LineGuide,
    drawing_editor: Option<FeatureId>,
    last_z_index: i32,
    listeners: Listeners,
    journal: Vec<EditEvent>,
}

impl EditTools {
    pub fn new(options: EditToolsOptions) -> Self {
        let last_z_index = options.z_index;
        Self {
            options,
            last_z_index,
            ..default()
        }
    }

    pub fn options(&self) -> &EditToolsOptions {
        &self.options
    }

    /// Replace the options. Handles already on screen keep their z-index.
    pub fn set_options(&mut self, options: EditToolsOptions) {
        self.last_z_index = self.last_z_index.max(options.z_index);
        self.options = options;
    }

    /// Z-index for a newly created handle: above everything created before it
    pub fn allocate_z_index(&mut self) -> i32 {
        self.last_z_index += 1;
        self.last_z_index
    }

    pub fn forward_guide(&self) -> &LineGuide {
        &self.forward_guide
    }

    pub fn backward_guide(&self) -> &LineGuide {
        &self.backward_guide
    }

    pub(crate) fn guide_mut(&mut self, direction: DrawDirection) -> &mut LineGuide {
        match direction {
            DrawDirection::Forward => &mut self.forward_guide,
            DrawDirection::Backward => &mut self.backward_guide,
        }
    }

    pub(crate) fn move_guides(&mut self, latlng: crate::geo::LatLng) {
        self.forward_guide.move_to(latlng);
        self.backward_guide.move_to(latlng);
    }

    pub(crate) fn detach_guides(&mut self) {
        self.forward_guide.detach();
        self.backward_guide.detach();
    }

    /// Feature currently holding drawing exclusivity
    pub fn drawing_editor(&self) -> Option<FeatureId> {
        self.drawing_editor
    }

    pub fn drawing(&self) -> bool {
        self.drawing_editor.is_some()
    }

    /// Take exclusivity. Callers cancel the previous holder before this.
    pub(crate) fn register_for_drawing(&mut self, feature: FeatureId) {
        debug!("Feature {:?} registered for drawing", feature);
        self.drawing_editor = Some(feature);
    }

    /// Release exclusivity. Ignored when `feature` is not the holder.
    pub(crate) fn unregister_for_drawing(&mut self, feature: FeatureId) {
        if self.drawing_editor == Some(feature) {
            debug!("Feature {:?} released drawing", feature);
            self.drawing_editor = None;
        }
    }

    /// Register a controller-level listener; runs after feature listeners.
    pub fn on(&mut self, listener: impl FnMut(&mut EditEvent) + Send + Sync + 'static) {
        self.listeners.add(listener);
    }

    pub(crate) fn fire(&mut self, event: &mut EditEvent) {
        self.listeners.dispatch(event);
        self.journal.push(event.clone());
        if self.journal.len() > MAX_JOURNAL_SIZE {
            let excess = self.journal.len() - MAX_JOURNAL_SIZE;
            self.journal.drain(..excess);
        }
    }

    /// Every event fired since the last call, in firing order. Hosts that
    /// only use listeners may ignore it: the journal keeps the newest
    /// [`MAX_JOURNAL_SIZE`] events.
    pub fn drain_events(&mut self) -> Vec<EditEvent> {
        std::mem::take(&mut self.journal)
    }

    pub fn pending_events(&self) -> &[EditEvent] {
        &self.journal
    }
}
