//! Server configuration.
//!
//! Settings are resolved in three layers, each overriding the one before:
//!
//! ```text
//! stock defaults  ←  daily-image.toml  ←  CLI flags / environment variables
//! ```
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! image_dir = "images"      # Directory containing the image pool
//! asset_dir = "assets"      # Directory the published image is served from
//! # log_file = "daily.log"  # Also append logs to this file
//! port = 8080               # HTTP port
//! timezone = "CET"          # IANA timezone for the midnight rotation
//! ```
//!
//! The matching environment variables are `IMAGE_DIR`, `ASSET_DIR`,
//! `LOG_FILE`, `PORT` and `TIMEZONE`; they are read by the CLI layer.
//!
//! Unknown keys are rejected to catch typos early.

use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// File looked up in the working directory when `--config` is not given.
pub const CONFIG_FILE: &str = "daily-image.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Fully resolved server configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServerConfig {
    /// Directory scanned for `.jpg` / `.jpeg` images.
    pub image_dir: PathBuf,
    /// Directory the published image is copied into and served from.
    pub asset_dir: PathBuf,
    /// Optional log file; logs always go to stdout as well.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_file: Option<PathBuf>,
    /// HTTP port.
    pub port: u16,
    /// IANA timezone name deciding when "midnight" is.
    pub timezone: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            image_dir: PathBuf::from("images"),
            asset_dir: PathBuf::from("assets"),
            log_file: None,
            port: 8080,
            timezone: "CET".to_string(),
        }
    }
}

impl ServerConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.port == 0 {
            return Err(ConfigError::Validation("port must be non-zero".into()));
        }
        if self.image_dir.as_os_str().is_empty() {
            return Err(ConfigError::Validation("image_dir must not be empty".into()));
        }
        if self.asset_dir.as_os_str().is_empty() {
            return Err(ConfigError::Validation("asset_dir must not be empty".into()));
        }
        self.tz()?;
        Ok(())
    }

    /// The configured timezone.
    pub fn tz(&self) -> Result<Tz, ConfigError> {
        self.timezone.parse::<Tz>().map_err(|e| {
            ConfigError::Validation(format!("unknown timezone '{}': {e}", self.timezone))
        })
    }
}

/// Values supplied on the command line or through the environment.
///
/// `None` means "not given", so the lower layers decide.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ConfigOverrides {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_dir: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub asset_dir: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_file: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timezone: Option<String>,
}

/// Returns the stock default config as a `toml::Value::Table`.
pub fn stock_defaults_value() -> Result<toml::Value, ConfigError> {
    toml::Value::try_from(ServerConfig::default())
        .map_err(|e| ConfigError::Validation(format!("default config must serialize: {e}")))
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay replace base values entirely.
/// - Keys in base that are not in overlay are preserved.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Load a config file as a raw TOML value.
///
/// Returns `Ok(None)` if the file does not exist.
/// Returns `Err` if the file exists but contains invalid TOML.
pub fn load_raw_config(path: &Path) -> Result<Option<toml::Value>, ConfigError> {
    if !path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(path)?;
    let value: toml::Value = toml::from_str(&content)?;
    Ok(Some(value))
}

/// Merge the layers onto the stock defaults, then deserialize and validate.
pub fn resolve_config(
    file: Option<toml::Value>,
    overrides: &ConfigOverrides,
) -> Result<ServerConfig, ConfigError> {
    let mut merged = stock_defaults_value()?;
    if let Some(file) = file {
        merged = merge_toml(merged, file);
    }
    let cli = toml::Value::try_from(overrides)
        .map_err(|e| ConfigError::Validation(format!("invalid override: {e}")))?;
    merged = merge_toml(merged, cli);

    let config: ServerConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load the configuration.
///
/// An explicitly given `config_path` must exist; without one,
/// [`CONFIG_FILE`] in the working directory is used if present.
pub fn load_config(
    config_path: Option<&Path>,
    overrides: &ConfigOverrides,
) -> Result<ServerConfig, ConfigError> {
    let file = match config_path {
        Some(path) => Some(load_raw_config(path)?.ok_or_else(|| {
            ConfigError::Validation(format!("config file not found: {}", path.display()))
        })?),
        None => load_raw_config(Path::new(CONFIG_FILE))?,
    };
    resolve_config(file, overrides)
}

/// Returns a fully-commented stock config file.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# daily-image configuration
# =========================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults.
#
# Every key can also be set on the command line (--imagedir, --assetdir,
# --logfile, --port, --timezone) or through the environment (IMAGE_DIR,
# ASSET_DIR, LOG_FILE, PORT, TIMEZONE). Those take precedence over this file.
#
# Unknown keys will cause an error.

# Directory containing the image pool. Only files ending in .jpg or .jpeg
# (lowercase) are considered; subdirectories are included.
image_dir = "images"

# Directory the image of the day is copied into and served from under
# /assets/. Created on startup if missing.
asset_dir = "assets"

# Append log output to this file in addition to stdout.
# log_file = "daily-image.log"

# HTTP port.
port = 8080

# IANA timezone deciding when a new day starts, e.g. "Europe/Berlin".
timezone = "CET"
"##
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn default_config_values() {
        let config = ServerConfig::default();
        assert_eq!(config.image_dir, PathBuf::from("images"));
        assert_eq!(config.asset_dir, PathBuf::from("assets"));
        assert_eq!(config.log_file, None);
        assert_eq!(config.port, 8080);
        assert_eq!(config.timezone, "CET");
    }

    #[test]
    fn default_config_is_valid() {
        ServerConfig::default().validate().unwrap();
    }

    #[test]
    fn stock_config_matches_defaults() {
        let parsed: ServerConfig = toml::from_str(stock_config_toml()).unwrap();
        assert_eq!(parsed, ServerConfig::default());
    }

    #[test]
    fn parse_partial_config() {
        let config: ServerConfig = toml::from_str("port = 9000").unwrap();
        assert_eq!(config.port, 9000);
        assert_eq!(config.timezone, "CET");
    }

    #[test]
    fn unknown_keys_rejected() {
        let result: Result<ServerConfig, _> = toml::from_str("prot = 9000");
        assert!(result.is_err());
    }

    #[test]
    fn zero_port_rejected() {
        let config = ServerConfig {
            port: 0,
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::Validation(_))));
    }

    #[test]
    fn unknown_timezone_rejected() {
        let config = ServerConfig {
            timezone: "Mars/Olympus_Mons".to_string(),
            ..Default::default()
        };
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("Mars/Olympus_Mons"));
    }

    #[test]
    fn iana_timezone_parses() {
        let config = ServerConfig {
            timezone: "Europe/Berlin".to_string(),
            ..Default::default()
        };
        assert_eq!(config.tz().unwrap(), chrono_tz::Europe::Berlin);
    }

    #[test]
    fn merge_overlay_wins() {
        let base: toml::Value = toml::from_str("port = 1\ntimezone = \"UTC\"").unwrap();
        let overlay: toml::Value = toml::from_str("port = 2").unwrap();
        let merged = merge_toml(base, overlay);
        assert_eq!(merged["port"].as_integer(), Some(2));
        assert_eq!(merged["timezone"].as_str(), Some("UTC"));
    }

    // =========================================================================
    // load_config tests
    // =========================================================================

    #[test]
    fn load_config_returns_default_when_no_file() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("missing.toml");
        let file = load_raw_config(&path).unwrap();
        assert!(file.is_none());

        let config = resolve_config(file, &ConfigOverrides::default()).unwrap();
        assert_eq!(config, ServerConfig::default());
    }

    #[test]
    fn load_config_reads_file() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("daily-image.toml");
        fs::write(
            &path,
            r#"
image_dir = "/srv/photos"
timezone = "Europe/Berlin"
log_file = "/var/log/daily.log"
"#,
        )
        .unwrap();

        let config = load_config(Some(&path), &ConfigOverrides::default()).unwrap();
        assert_eq!(config.image_dir, PathBuf::from("/srv/photos"));
        assert_eq!(config.timezone, "Europe/Berlin");
        assert_eq!(config.log_file, Some(PathBuf::from("/var/log/daily.log")));
        // Unspecified values should be defaults
        assert_eq!(config.port, 8080);
    }

    #[test]
    fn overrides_beat_file() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("daily-image.toml");
        fs::write(&path, "port = 9000\ntimezone = \"Europe/Berlin\"\n").unwrap();

        let overrides = ConfigOverrides {
            port: Some(9100),
            ..Default::default()
        };
        let config = load_config(Some(&path), &overrides).unwrap();
        assert_eq!(config.port, 9100);
        assert_eq!(config.timezone, "Europe/Berlin");
    }

    #[test]
    fn explicit_missing_file_is_an_error() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("nope.toml");
        let err = load_config(Some(&path), &ConfigOverrides::default()).unwrap_err();
        assert!(matches!(err, ConfigError::Validation(_)));
    }

    #[test]
    fn invalid_toml_is_reported() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("daily-image.toml");
        fs::write(&path, "port = = 1").unwrap();
        assert!(matches!(
            load_config(Some(&path), &ConfigOverrides::default()),
            Err(ConfigError::Toml(_))
        ));
    }

    #[test]
    fn invalid_override_timezone_fails_validation() {
        let overrides = ConfigOverrides {
            timezone: Some("Nowhere/Special".to_string()),
            ..Default::default()
        };
        assert!(matches!(
            resolve_config(None, &overrides),
            Err(ConfigError::Validation(_))
        ));
    }
}
