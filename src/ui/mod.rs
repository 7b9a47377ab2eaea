mod dialogs;
mod status_bar;
mod toolbar;

use bevy::prelude::*;
use bevy_egui::EguiPrimaryContextPass;

use crate::config::ConfigResetNotification;

/// Resource that tracks whether any modal dialog is currently open.
/// Editor input handlers should check this to avoid processing input
/// when the user is interacting with a dialog.
#[derive(Resource, Default)]
pub struct DialogState {
    /// True when any modal dialog is open that should block editor input
    pub any_modal_open: bool,
}

/// Aggregate dialog open states. Runs in First, before input handlers.
fn update_dialog_state(
    config_reset: Res<ConfigResetNotification>,
    mut dialog_state: ResMut<DialogState>,
) {
    dialog_state.any_modal_open = config_reset.show;
}

pub struct UiPlugin;

impl Plugin for UiPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<DialogState>()
            .add_systems(
                EguiPrimaryContextPass,
                (
                    // Panels first so dialogs draw on top
                    toolbar::toolbar_ui,
                    status_bar::status_bar_ui,
                    dialogs::config_reset_notification_ui,
                )
                    .chain(),
            )
            .add_systems(First, update_dialog_state);
    }
}
