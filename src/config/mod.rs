use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::constants::{
    BASE_ZOOM, CLICK_TOLERANCE, DEFAULT_CIRCLE_RADIUS, MIDDLE_MARKER_HIDE_FACTOR,
    MIDDLE_MARKER_OPACITY, TOUCH_HIT_TOLERANCE,
};
use crate::editable::{EditToolsOptions, GuideStyle};
use crate::geo::LatLng;

/// System set for config loading (other plugins can run after this)
#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub struct ConfigLoaded;

/// Editor settings persisted to disk
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfigData {
    /// Touch input: bigger handles and a wider stroke hit area
    pub touch: bool,

    /// Never show middle markers
    pub skip_middle_markers: bool,

    pub middle_marker_opacity: f32,

    /// Middle markers hide when their vertices are closer than this many icon widths
    pub middle_marker_hide_factor: f32,

    /// Extra stroke hit tolerance in touch mode (pixels)
    pub touch_tolerance: f32,

    /// A press released within this distance (pixels) is a click
    pub click_tolerance: f32,

    /// Preview guide color as linear RGBA
    pub line_guide_color: [f32; 4],
    pub line_guide_weight: f32,
    pub line_guide_dash: f32,
    pub line_guide_gap: f32,

    /// Map position shown on startup
    pub initial_center: LatLng,
    pub initial_zoom: f64,

    /// Radius in meters of circles started without one
    pub default_circle_radius: f64,
}

impl Default for EditorConfigData {
    fn default() -> Self {
        let guide = GuideStyle::default();
        Self {
            touch: false,
            skip_middle_markers: false,
            middle_marker_opacity: MIDDLE_MARKER_OPACITY,
            middle_marker_hide_factor: MIDDLE_MARKER_HIDE_FACTOR,
            touch_tolerance: TOUCH_HIT_TOLERANCE,
            click_tolerance: CLICK_TOLERANCE,
            line_guide_color: guide.color.to_linear().to_f32_array(),
            line_guide_weight: guide.weight,
            line_guide_dash: guide.dash,
            line_guide_gap: guide.gap,
            initial_center: LatLng::new(48.8566, 2.3522),
            initial_zoom: BASE_ZOOM + 2.0,
            default_circle_radius: DEFAULT_CIRCLE_RADIUS,
        }
    }
}

impl EditorConfigData {
    /// Controller options for the edit layer
    pub fn edit_tools_options(&self) -> EditToolsOptions {
        EditToolsOptions {
            touch: self.touch,
            skip_middle_markers: self.skip_middle_markers,
            middle_marker_opacity: self.middle_marker_opacity.clamp(0.0, 1.0),
            middle_marker_hide_factor: self.middle_marker_hide_factor.max(0.0),
            touch_tolerance: self.touch_tolerance.max(0.0),
            click_tolerance: self.click_tolerance.max(0.0),
            default_circle_radius: self.default_circle_radius.max(0.0),
            line_guide: GuideStyle {
                color: Color::LinearRgba(LinearRgba::from_f32_array(self.line_guide_color)),
                weight: self.line_guide_weight,
                dash: self.line_guide_dash.max(1.0),
                gap: self.line_guide_gap.max(0.0),
            },
            ..default()
        }
    }
}

/// Runtime configuration resource
#[derive(Resource)]
pub struct EditorConfig {
    /// The persisted configuration data
    pub data: EditorConfigData,
    /// Path to the config file
    pub config_path: PathBuf,
    /// Whether config needs to be saved
    pub dirty: bool,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            data: EditorConfigData::default(),
            config_path: crate::paths::config_file(),
            dirty: false,
        }
    }
}

/// Resource to notify user when config was reset to defaults
#[derive(Resource, Default)]
pub struct ConfigResetNotification {
    /// Whether to show the notification dialog
    pub show: bool,
    /// The reason for the reset (parse error, read error, etc.)
    pub reason: Option<String>,
}

/// Message to trigger config save
#[derive(Message)]
pub struct SaveConfigRequest;

/// Message to change one edit setting from the UI
#[derive(Message, Debug, Clone, Copy)]
pub enum EditSettingRequest {
    Touch(bool),
    SkipMiddleMarkers(bool),
}

/// Result of loading config from disk
struct LoadConfigResult {
    data: EditorConfigData,
    /// Error message if config was reset to defaults due to an error
    reset_reason: Option<String>,
}

fn parse_config(json: &str) -> LoadConfigResult {
    match serde_json::from_str(json) {
        Ok(data) => LoadConfigResult {
            data,
            reset_reason: None,
        },
        Err(e) => {
            warn!("Failed to parse config file: {}", e);
            LoadConfigResult {
                data: EditorConfigData::default(),
                reset_reason: Some(format!("Configuration file was corrupted: {}", e)),
            }
        }
    }
}

/// Load configuration from disk
fn load_config(config_path: &std::path::Path) -> LoadConfigResult {
    if !config_path.exists() {
        info!("No config file found, using defaults");
        return LoadConfigResult {
            data: EditorConfigData::default(),
            reset_reason: None,
        };
    }

    match std::fs::read_to_string(config_path) {
        Ok(json) => {
            let result = parse_config(&json);
            if result.reset_reason.is_none() {
                info!("Loaded config from {:?}", config_path);
            }
            result
        }
        Err(e) => {
            warn!("Failed to read config file: {}", e);
            LoadConfigResult {
                data: EditorConfigData::default(),
                reset_reason: Some(format!("Could not read configuration file: {}", e)),
            }
        }
    }
}

/// Save configuration to disk
fn save_config(config: &EditorConfig) {
    match serde_json::to_string_pretty(&config.data) {
        Ok(json) => {
            if let Err(e) = std::fs::write(&config.config_path, json) {
                error!("Failed to save config: {}", e);
            } else {
                info!("Config saved to {:?}", config.config_path);
            }
        }
        Err(e) => {
            error!("Failed to serialize config: {}", e);
        }
    }
}

/// Startup system to load config from disk into the existing resource
fn load_config_system(
    mut config: ResMut<EditorConfig>,
    mut reset_notification: ResMut<ConfigResetNotification>,
) {
    let result = load_config(&config.config_path);
    config.data = result.data;
    config.dirty = false;

    if let Some(reason) = result.reset_reason {
        reset_notification.show = true;
        reset_notification.reason = Some(reason);
    }
}

/// System to save config when requested
fn save_config_system(
    mut events: MessageReader<SaveConfigRequest>,
    mut config: ResMut<EditorConfig>,
) {
    for _ in events.read() {
        if config.dirty {
            save_config(&config);
            config.dirty = false;
        }
    }
}

fn apply_setting(data: &mut EditorConfigData, request: EditSettingRequest) -> bool {
    let (slot, value) = match request {
        EditSettingRequest::Touch(value) => (&mut data.touch, value),
        EditSettingRequest::SkipMiddleMarkers(value) => (&mut data.skip_middle_markers, value),
    };
    let changed = *slot != value;
    *slot = value;
    changed
}

/// System to apply setting changes from the UI
fn edit_setting_system(
    mut events: MessageReader<EditSettingRequest>,
    mut config: ResMut<EditorConfig>,
    mut save_events: MessageWriter<SaveConfigRequest>,
) {
    for request in events.read() {
        if apply_setting(&mut config.data, *request) {
            info!("Edit setting changed: {:?}", request);
            config.dirty = true;
            save_events.write(SaveConfigRequest);
        }
    }
}

pub struct ConfigPlugin;

impl Plugin for ConfigPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<EditorConfig>()
            .init_resource::<ConfigResetNotification>()
            .add_message::<SaveConfigRequest>()
            .add_message::<EditSettingRequest>()
            .add_systems(Startup, load_config_system.in_set(ConfigLoaded))
            .add_systems(
                Update,
                (
                    edit_setting_system.run_if(on_message::<EditSettingRequest>),
                    save_config_system.run_if(on_message::<SaveConfigRequest>),
                )
                    .chain(),
            );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_matches_edit_tools_defaults() {
        let options = EditorConfigData::default().edit_tools_options();
        let defaults = EditToolsOptions::default();
        assert_eq!(options.touch, defaults.touch);
        assert_eq!(options.middle_marker_opacity, defaults.middle_marker_opacity);
        assert_eq!(options.middle_marker_hide_factor, defaults.middle_marker_hide_factor);
        assert_eq!(options.touch_tolerance, defaults.touch_tolerance);
        assert_eq!(options.click_tolerance, defaults.click_tolerance);
        assert_eq!(options.z_index, defaults.z_index);
    }

    #[test]
    fn test_config_data_serialization() {
        let data = EditorConfigData {
            touch: true,
            initial_center: LatLng::new(45.81, 15.98),
            initial_zoom: 16.0,
            ..default()
        };

        let json = serde_json::to_string(&data).unwrap();
        let parsed: EditorConfigData = serde_json::from_str(&json).unwrap();

        assert_eq!(parsed, data);
    }

    #[test]
    fn test_missing_fields_use_defaults() {
        let result = parse_config(r#"{ "touch": true }"#);
        assert!(result.reset_reason.is_none());
        assert!(result.data.touch);
        assert_eq!(result.data.middle_marker_hide_factor, MIDDLE_MARKER_HIDE_FACTOR);
    }

    #[test]
    fn test_corrupt_config_resets_with_reason() {
        let result = parse_config("{ not json");
        assert_eq!(result.data, EditorConfigData::default());
        assert!(result.reset_reason.unwrap().contains("corrupted"));
    }

    #[test]
    fn test_missing_file_is_not_a_reset() {
        let result = load_config(std::path::Path::new("does/not/exist/config.json"));
        assert!(result.reset_reason.is_none());
    }

    #[test]
    fn test_apply_setting_reports_change() {
        let mut data = EditorConfigData::default();
        assert!(apply_setting(&mut data, EditSettingRequest::Touch(true)));
        assert!(!apply_setting(&mut data, EditSettingRequest::Touch(true)));
        assert!(apply_setting(&mut data, EditSettingRequest::SkipMiddleMarkers(true)));
        let options = data.edit_tools_options();
        assert!(options.touch && options.skip_middle_markers);
    }
}
