//! Relay of edit notifications into Bevy messages.

use bevy::prelude::*;

use crate::editable::{EditEvent, EditEventKind, EditableMap, FeatureId};
use crate::viewport::MercatorViewport;

/// One notification from the edit layer, in firing order
#[derive(Message, Debug, Clone)]
pub struct EditMessage(pub EditEvent);

/// Feature the user is working on: highlighted, and the default target of
/// the Hole tool.
#[derive(Resource, Debug, Default)]
pub struct ActiveFeature(Option<FeatureId>);

impl ActiveFeature {
    pub fn get(&self) -> Option<FeatureId> {
        self.0
    }

    pub fn set(&mut self, id: FeatureId) {
        self.0 = Some(id);
    }

    pub fn clear(&mut self) {
        self.0 = None;
    }

    pub fn clear_if(&mut self, id: FeatureId) {
        if self.0 == Some(id) {
            self.0 = None;
        }
    }

    fn observe(&mut self, event: &EditEvent) {
        match event.kind {
            EditEventKind::DrawingStart | EditEventKind::Enable => self.set(event.feature),
            EditEventKind::Disable | EditEventKind::ShapeDeleted => self.clear_if(event.feature),
            _ => {}
        }
    }
}

/// Drain the controller journal into [`EditMessage`]s.
pub fn relay_edit_events(mut map: ResMut<EditableMap>, mut messages: MessageWriter<EditMessage>) {
    if map.tools().pending_events().is_empty() {
        return;
    }
    for event in map.drain_events() {
        match (event.vertex, event.latlng) {
            (Some(vertex), Some(latlng)) => debug!(
                "{} {:?} vertex {:?} at ({:.6}, {:.6})",
                event.kind.name(),
                event.feature,
                vertex,
                latlng.lat,
                latlng.lng
            ),
            _ => debug!("{} {:?}", event.kind.name(), event.feature),
        }
        messages.write(EditMessage(event));
    }
}

pub fn track_active_feature(
    mut messages: MessageReader<EditMessage>,
    mut active: ResMut<ActiveFeature>,
) {
    for EditMessage(event) in messages.read() {
        active.observe(event);
    }
}

/// Ctrl-click on a polyline endpoint continues it; Alt-click splits it.
pub fn apply_vertex_shortcuts(
    mut messages: MessageReader<EditMessage>,
    viewport: Res<MercatorViewport>,
    mut map: ResMut<EditableMap>,
) {
    for EditMessage(event) in messages.read() {
        let Some(coord) = event.vertex else {
            continue;
        };
        match event.kind {
            EditEventKind::VertexCtrlClick => {
                if map.continue_from_vertex(&*viewport, event.feature, coord) {
                    debug!("Continuing {:?} from {:?}", event.feature, coord);
                }
            }
            EditEventKind::VertexAltClick => {
                map.split_at_vertex(&*viewport, event.feature, coord);
            }
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::editable::EditToolsOptions;
    use crate::geo::LatLng;

    #[test]
    fn test_active_feature_follows_events() {
        let mut map = EditableMap::new(EditToolsOptions::default());
        let a = map.create_marker(LatLng::new(1.0, 1.0));
        let b = map.create_marker(LatLng::new(2.0, 2.0));
        let mut active = ActiveFeature::default();

        active.observe(&EditEvent::new(EditEventKind::Enable, a));
        assert_eq!(active.get(), Some(a));

        active.observe(&EditEvent::new(EditEventKind::DrawingStart, b));
        assert_eq!(active.get(), Some(b));

        // Another feature going away leaves the active one alone
        active.observe(&EditEvent::new(EditEventKind::Disable, a));
        assert_eq!(active.get(), Some(b));

        active.observe(&EditEvent::new(EditEventKind::ShapeDeleted, b));
        assert_eq!(active.get(), None);
    }
}
