//! Settings schema for environment composition
//!
//! Every value has a working default; a TOML file only needs to override
//! what differs for a given pipeline deployment.

use serde::{Deserialize, Serialize};

/// Root settings structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Pinned base image references
    pub images: ImageSettings,

    /// Docker daemon bootstrap settings
    pub docker: DockerSettings,

    /// Gradle build environment settings
    pub gradle: GradleSettings,

    /// Python environment settings
    pub python: PythonSettings,

    /// Optional registry credentials
    pub secrets: SecretSettings,
}

/// Pinned base image references
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ImageSettings {
    /// Default Python runtime image
    pub python: String,

    /// Docker-in-docker daemon image
    pub dind: String,

    /// Docker CLI client image
    pub docker_cli: String,

    /// JDK image for Gradle builds
    pub jdk: String,

    /// Crane image-manipulation tool (debug variant, ships a shell)
    pub crane: String,
}

impl Default for ImageSettings {
    fn default() -> Self {
        Self {
            python: "python:3.9-slim".to_string(),
            dind: "docker:24.0.2-dind".to_string(),
            docker_cli: "docker:24.0.2-cli".to_string(),
            jdk: "openjdk:17.0.1-jdk-slim".to_string(),
            crane: "gcr.io/go-containerregistry/crane/debug:v0.15.1".to_string(),
        }
    }
}

/// Docker daemon bootstrap settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DockerSettings {
    /// Docker engine version installed by the get.docker.com bootstrap
    pub version: String,
}

impl Default for DockerSettings {
    fn default() -> Self {
        Self {
            version: "24.0.2".to_string(),
        }
    }
}

/// Gradle build environment settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GradleSettings {
    /// GRADLE_HOME inside the build container
    pub home: String,

    /// Mount path for the read-write build cache
    pub build_cache_path: String,

    /// Mount path for the read-only dependency cache
    pub ro_dependency_cache_path: String,

    /// Workspace mount path for the repository snapshot
    pub workspace: String,

    /// Allow-list of build-configuration paths mounted into the workspace
    pub sources: Vec<String>,
}

impl Default for GradleSettings {
    fn default() -> Self {
        Self {
            home: "/root/.gradle".to_string(),
            build_cache_path: "/root/.gradle".to_string(),
            ro_dependency_cache_path: "/root/gradle_dependency_cache".to_string(),
            workspace: "/workspace".to_string(),
            sources: vec![
                ".env".to_string(),
                "build.gradle".to_string(),
                "deps.toml".to_string(),
                "gradle.properties".to_string(),
                "gradle".to_string(),
                "gradlew".to_string(),
                "settings.gradle".to_string(),
                "buildSrc".to_string(),
                "tools/gradle".to_string(),
                "tools/bin/build_image.sh".to_string(),
                "tools/lib/lib.sh".to_string(),
            ],
        }
    }
}

/// Python environment settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PythonSettings {
    /// Paths always excluded when mounting package sources
    pub default_exclude: Vec<String>,
}

impl Default for PythonSettings {
    fn default() -> Self {
        Self {
            default_exclude: vec![
                ".venv".to_string(),
                "build".to_string(),
                "dist".to_string(),
                "__pycache__".to_string(),
                "*.egg-info".to_string(),
                ".pytest_cache".to_string(),
                ".mypy_cache".to_string(),
                ".tox".to_string(),
            ],
        }
    }
}

/// Optional registry credentials, injected only as named secrets
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SecretSettings {
    /// Docker Hub username
    pub docker_hub_username: Option<String>,

    /// Docker Hub password or token
    pub docker_hub_password: Option<String>,
}
