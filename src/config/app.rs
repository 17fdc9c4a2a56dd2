// src/config/app.rs

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Deserialize, Clone, PartialEq, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq, Serialize)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    /// Presence of a connection string selects the MongoDB-backed store.
    #[serde(default)]
    pub mongodb_uri: Option<String>,
    #[serde(default = "default_database")]
    pub mongodb_database: String,
    /// Backing file for the JSON store, used when no MongoDB URI is set.
    #[serde(default = "default_data_file")]
    pub data_file: PathBuf,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            mongodb_uri: None,
            mongodb_database: default_database(),
            data_file: default_data_file(),
        }
    }
}

// Default value functions
fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    5000
}

fn default_database() -> String {
    "visitors_analytics".to_string()
}

fn default_data_file() -> PathBuf {
    PathBuf::from("data/visitors_data.json")
}
