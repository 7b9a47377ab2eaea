//! Where settings and logs live.
//!
//! Debug builds and `cargo run` keep everything next to the working
//! directory. Installed builds use the platform's per-user directories under a
//! `geoeditable` folder.

use std::path::PathBuf;

const APP_DIR: &str = "geoeditable";
const DEV_ROOT: &str = ".";

pub fn is_dev_mode() -> bool {
    cfg!(debug_assertions) || std::env::var_os("CARGO").is_some()
}

fn app_root(base: Option<PathBuf>) -> Option<PathBuf> {
    if is_dev_mode() {
        Some(PathBuf::from(DEV_ROOT))
    } else {
        base.map(|dir| dir.join(APP_DIR))
    }
}

/// Settings directory. Only Linux separates settings from data.
pub fn config_dir() -> Option<PathBuf> {
    if cfg!(target_os = "linux") {
        app_root(dirs::config_dir())
    } else {
        data_dir()
    }
}

pub fn data_dir() -> Option<PathBuf> {
    app_root(dirs::data_dir())
}

/// The editor settings file, `config.json`.
pub fn config_file() -> PathBuf {
    let name = "config.json";
    match config_dir() {
        Some(dir) => dir.join(name),
        None => PathBuf::from(name),
    }
}

/// Log output directory, `logs/` under the data directory.
pub fn logs_dir() -> PathBuf {
    data_dir().unwrap_or_default().join("logs")
}

/// Create the settings and log directories. Nothing to do in dev mode.
pub fn ensure_directories() -> std::io::Result<()> {
    if is_dev_mode() {
        return Ok(());
    }
    for dir in config_dir().into_iter().chain([logs_dir()]) {
        std::fs::create_dir_all(dir)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_settings_file_is_json() {
        assert_eq!(config_file().extension().and_then(|e| e.to_str()), Some("json"));
    }

    #[test]
    fn test_dev_mode_stays_in_working_directory() {
        // Test builds carry debug assertions
        assert!(is_dev_mode());
        assert_eq!(config_dir(), Some(PathBuf::from(DEV_ROOT)));
        assert_eq!(data_dir(), Some(PathBuf::from(DEV_ROOT)));
        assert_eq!(logs_dir(), PathBuf::from("./logs"));
    }

    #[test]
    fn test_ensure_directories_skips_dev_mode() {
        assert!(ensure_directories().is_ok());
    }
}
