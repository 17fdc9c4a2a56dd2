// src/config/validation.rs

use crate::config::AppConfig;
use crate::error::{AppError, Result};
use tracing::debug;
use url::Url;

pub struct ConfigValidator;

impl ConfigValidator {
    pub fn validate(config: &AppConfig) -> Result<()> {
        debug!("Starting configuration validation");

        Self::validate_server_config(config)?;
        Self::validate_mongodb_config(config)?;
        Self::validate_file_config(config)?;

        debug!("Configuration validation completed successfully");
        Ok(())
    }

    fn validate_server_config(config: &AppConfig) -> Result<()> {
        if config.server.port == 0 {
            return Err(AppError::config("Server port cannot be 0"));
        }
        if config.server.host.trim().is_empty() {
            return Err(AppError::config("Server host cannot be empty"));
        }
        Ok(())
    }

    fn validate_mongodb_config(config: &AppConfig) -> Result<()> {
        if let Some(uri) = &config.mongodb_uri {
            let url = Url::parse(uri)
                .map_err(|e| AppError::config(format!("Invalid MongoDB URI: {e}")))?;
            match url.scheme() {
                "mongodb" | "mongodb+srv" => {}
                scheme => {
                    return Err(AppError::config(format!(
                        "Unsupported MongoDB URI scheme '{scheme}'. Supported: mongodb, mongodb+srv"
                    )));
                }
            }
        }
        if config.mongodb_database.trim().is_empty() {
            return Err(AppError::config("MongoDB database name cannot be empty"));
        }
        Ok(())
    }

    fn validate_file_config(config: &AppConfig) -> Result<()> {
        if config.data_file.as_os_str().is_empty() {
            return Err(AppError::config("Data file path cannot be empty"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert!(ConfigValidator::validate(&AppConfig::default()).is_ok());
    }

    #[test]
    fn rejects_port_zero() {
        let mut config = AppConfig::default();
        config.server.port = 0;
        assert!(ConfigValidator::validate(&config).is_err());
    }

    #[test]
    fn rejects_malformed_mongodb_uri() {
        let mut config = AppConfig::default();
        config.mongodb_uri = Some("::not a uri::".to_string());
        assert!(ConfigValidator::validate(&config).is_err());
    }

    #[test]
    fn rejects_non_mongodb_scheme() {
        let mut config = AppConfig::default();
        config.mongodb_uri = Some("postgres://localhost:5432".to_string());
        assert!(ConfigValidator::validate(&config).is_err());
    }

    #[test]
    fn accepts_mongodb_and_srv_schemes() {
        for uri in ["mongodb://localhost:27017", "mongodb+srv://cluster.example.com"] {
            let mut config = AppConfig::default();
            config.mongodb_uri = Some(uri.to_string());
            assert!(ConfigValidator::validate(&config).is_ok(), "rejected {uri}");
        }
    }

    #[test]
    fn rejects_empty_data_file() {
        let mut config = AppConfig::default();
        config.data_file = std::path::PathBuf::new();
        assert!(ConfigValidator::validate(&config).is_err());
    }
}
