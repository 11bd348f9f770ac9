//! Settings loading for Stevedore
//!
//! The embedding pipeline tool decides where settings live; this module only
//! knows how to read a TOML file and apply environment overrides for
//! credentials that should not be written to disk.

pub mod schema;

pub use schema::Settings;

use crate::error::{StevedoreError, StevedoreResult};
use std::path::Path;
use tokio::fs;
use tracing::debug;

/// Environment variable overriding the Docker Hub username secret
pub const DOCKER_HUB_USERNAME_VAR: &str = "DOCKER_HUB_USERNAME";
/// Environment variable overriding the Docker Hub password secret
pub const DOCKER_HUB_PASSWORD_VAR: &str = "DOCKER_HUB_PASSWORD";

impl Settings {
    /// Load settings from a TOML file, falling back to defaults if absent
    pub async fn load(path: &Path) -> StevedoreResult<Self> {
        if !path.exists() {
            debug!("Settings file not found, using defaults");
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)
            .await
            .map_err(|e| StevedoreError::io(format!("reading settings from {}", path.display()), e))?;

        toml::from_str(&content).map_err(|e| StevedoreError::ConfigInvalid {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
    }

    /// Apply credential overrides from the process environment
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(user) = std::env::var(DOCKER_HUB_USERNAME_VAR) {
            self.secrets.docker_hub_username = Some(user);
        }
        if let Ok(password) = std::env::var(DOCKER_HUB_PASSWORD_VAR) {
            self.secrets.docker_hub_password = Some(password);
        }
        self
    }
}
