//! Interactive geometry editing.
//!
//! ## Structure
//!
//! - [`EditableMap`]: feature store and host entry point (a Bevy resource)
//! - [`EditTools`]: per-viewport controller (guides, exclusivity, z-order)
//! - [`Editor`]: per-feature handles and drawing session
//! - [`VertexMarker`] / [`MiddleMarker`]: the draggable handles
//! - [`EditEvent`]: notifications, fired to feature listeners first and then
//!   to controller listeners
//!
//! Hosts feed [`PointerEvent`]s through [`EditableMap::handle_pointer`] and
//! render from the feature store, the guides and the handles.

pub mod circle;
pub mod drawing;
pub mod editor;
pub mod events;
pub mod feature;
pub mod input;
pub mod map;
pub mod middle_marker;
pub mod tools;
pub mod vertex;

#[cfg(test)]
mod tests;

pub use drawing::{DrawDirection, DrawingSession, DrawingState, LineGuide};
pub use editor::{EditContext, Editor, EditorKind, EditorOptions};
pub use events::{EditEvent, EditEventKind, Listeners};
pub use feature::{Feature, FeatureId, PathStyle, Shape, ShapeKind};
pub use input::{HandleHit, Modifiers, PointerButton, PointerEvent, PointerPhase, PressTarget};
pub use map::EditableMap;
pub use middle_marker::MiddleMarker;
pub use tools::{EditTools, EditToolsOptions, GuideStyle};
pub use vertex::{VertexMarker, VertexRemoval};
