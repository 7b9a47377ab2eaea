//! Interactive drawing and editing of map geometries.
//!
//! [`editable`] is the host-agnostic editing core; [`editor`] and [`ui`] host
//! it in a Bevy app with an egui toolbar.

pub mod config;
pub mod constants;
pub mod editable;
pub mod editor;
pub mod geo;
pub mod paths;
pub mod theme;
pub mod ui;
pub mod viewport;
