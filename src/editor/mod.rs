//! Bevy host for the edit layer: camera, input, notifications and rendering.

mod camera;
mod conditions;
pub mod events;
pub mod graticule;
mod input;
pub mod params;
mod rendering;
pub mod tools;

pub use camera::EditorCamera;
pub use events::{ActiveFeature, EditMessage};
pub use graticule::GraticuleSettings;
pub use tools::{CurrentTool, EditorTool};

use bevy::prelude::*;

use crate::config::{ConfigLoaded, EditorConfig};
use crate::editable::EditableMap;
use crate::theme;
use crate::viewport::MercatorViewport;

/// Build the edit layer from the loaded settings
fn init_edit_map(config: Res<EditorConfig>, mut map: ResMut<EditableMap>) {
    *map = EditableMap::new(config.data.edit_tools_options());
}

/// Push settings changes into the edit layer
fn sync_edit_options(
    config: Res<EditorConfig>,
    viewport: Res<MercatorViewport>,
    mut map: ResMut<EditableMap>,
) {
    let options = config.data.edit_tools_options();
    if *map.tools().options() != options {
        debug!("Applying edit options: {:?}", options);
        map.set_options(&*viewport, options);
    }
}

pub struct EditorPlugin;

impl Plugin for EditorPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<tools::CurrentTool>()
            .init_resource::<GraticuleSettings>()
            .init_resource::<ActiveFeature>()
            .init_resource::<MercatorViewport>()
            .init_resource::<EditableMap>()
            .insert_resource(ClearColor(theme::MAP_BACKGROUND))
            .add_message::<EditMessage>()
            // Edit overlay gizmo groups render on the editor layer only
            .init_gizmo_group::<rendering::HandleGizmoGroup>()
            .init_gizmo_group::<rendering::GuideGizmoGroup>()
            .add_systems(
                Startup,
                (
                    (camera::spawn_camera, init_edit_map).after(ConfigLoaded),
                    rendering::configure_edit_gizmos,
                ),
            )
            .add_systems(
                Update,
                (
                    camera::camera_pan,
                    camera::camera_zoom,
                    camera::apply_camera_zoom,
                    camera::sync_viewport,
                    sync_edit_options.run_if(resource_changed::<EditorConfig>),
                    tools::handle_tool_shortcuts,
                    tools::cancel_drawing_on_tool_change,
                    tools::handle_drawing_shortcuts,
                    input::handle_pointer_input.run_if(conditions::no_dialog_open),
                    events::relay_edit_events,
                    (events::track_active_feature, events::apply_vertex_shortcuts),
                )
                    .chain(),
            )
            .add_systems(
                Update,
                (
                    rendering::sync_guide_gizmos.run_if(resource_changed::<EditorConfig>),
                    tools::update_cursor_icon,
                    graticule::draw_graticule,
                    rendering::draw_features,
                    rendering::draw_handles,
                    rendering::draw_guides,
                )
                    .after(events::relay_edit_events),
            );
    }
}
