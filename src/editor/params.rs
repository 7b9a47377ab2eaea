//! SystemParam bundles shared by the editor input systems.
//!
//! - [`PointerParams`]: cursor, buttons, modifiers and the map viewport, for
//!   turning window input into [`PointerEvent`]s
//! - [`is_cursor_over_ui`]: check if cursor is over egui UI (for input gating)

use bevy::ecs::system::SystemParam;
use bevy::prelude::*;
use bevy::window::PrimaryWindow;
use bevy_egui::EguiContexts;

use crate::editable::{Modifiers, PointerButton, PointerEvent, PointerPhase};
use crate::viewport::{MercatorViewport, Viewport};

#[derive(SystemParam)]
pub struct PointerParams<'w, 's> {
    pub window: Query<'w, 's, &'static Window, With<PrimaryWindow>>,
    pub mouse: Res<'w, ButtonInput<MouseButton>>,
    pub keyboard: Res<'w, ButtonInput<KeyCode>>,
    pub viewport: Res<'w, MercatorViewport>,
}

impl PointerParams<'_, '_> {
    /// Cursor position in container pixels (origin top-left), if inside the window
    pub fn cursor(&self) -> Option<Vec2> {
        self.window.single().ok()?.cursor_position()
    }

    pub fn modifiers(&self) -> Modifiers {
        let held = |a, b| self.keyboard.pressed(a) || self.keyboard.pressed(b);
        Modifiers {
            ctrl: held(KeyCode::ControlLeft, KeyCode::ControlRight)
                || held(KeyCode::SuperLeft, KeyCode::SuperRight),
            alt: held(KeyCode::AltLeft, KeyCode::AltRight),
            shift: held(KeyCode::ShiftLeft, KeyCode::ShiftRight),
        }
    }

    /// Pointer event at the current cursor position
    pub fn event(&self, phase: PointerPhase, button: PointerButton) -> Option<PointerEvent> {
        let screen = self.cursor()?;
        let latlng = self.viewport.unproject(screen);
        Some(
            PointerEvent::new(phase, screen, latlng)
                .with_button(button)
                .with_modifiers(self.modifiers()),
        )
    }
}

/// Check if the cursor is over egui UI
pub fn is_cursor_over_ui(contexts: &mut EguiContexts) -> bool {
    contexts
        .ctx_mut()
        .map(|ctx| ctx.is_pointer_over_area())
        .unwrap_or(false)
}
