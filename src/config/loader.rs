// src/config/loader.rs

use crate::config::{AppConfig, ConfigValidator};
use crate::error::{AppError, Result};
use std::path::Path;
use tracing::{debug, info, warn};

/// Load configuration from an optional YAML file, then apply environment
/// overrides and validate the result.
pub fn load_config(config_path: &Path) -> Result<AppConfig> {
    let mut config = if config_path.exists() {
        info!("Loading configuration from file: {}", config_path.display());
        load_from_file(config_path)?
    } else {
        info!("Configuration file not found, using defaults");
        AppConfig::default()
    };

    override_with_env(&mut config);

    ConfigValidator::validate(&config)?;

    debug!("Configuration loaded and validated successfully");
    Ok(config)
}

fn load_from_file(config_path: &Path) -> Result<AppConfig> {
    let content = std::fs::read_to_string(config_path).map_err(|e| {
        AppError::config(format!(
            "Failed to read config file {}: {e}",
            config_path.display()
        ))
    })?;

    serde_yaml::from_str(&content)
        .map_err(|e| AppError::config(format!("Failed to parse config file: {e}")))
}

fn override_with_env(config: &mut AppConfig) {
    // A MongoDB URI in the environment switches the backing store.
    if let Ok(uri) = std::env::var("MONGODB_URI") {
        if !uri.trim().is_empty() {
            info!("Overriding MongoDB URI from environment variable");
            config.mongodb_uri = Some(uri);
        }
    }

    if let Ok(port_str) = std::env::var("PORT") {
        if let Ok(port) = port_str.parse::<u16>() {
            info!("Overriding server port from environment variable: {}", port);
            config.server.port = port;
        } else {
            warn!("Invalid PORT environment variable: {}", port_str);
        }
    }

    if let Ok(path) = std::env::var("DATA_FILE") {
        if !path.trim().is_empty() {
            info!("Overriding data file path from environment variable: {}", path);
            config.data_file = path.into();
        }
    }
}
