//! Python package environments
//!
//! Builds Python bases with a warm pip cache and installs connector packages
//! from source, including editable-local sibling dependencies referenced by
//! their requirements manifest.

use crate::cache::{volume_scoped, SharingMode};
use crate::config::Settings;
use crate::engine::{ContainerEngine, ContainerSpec};
use crate::error::{StevedoreError, StevedoreResult};
use crate::snapshot::RepoSnapshot;
use tracing::debug;

/// Required image family for Python bases
const PYTHON_IMAGE_PREFIX: &str = "python:3";

/// Manifest file read from a mounted package directory
const REQUIREMENTS_FILE: &str = "requirements.txt";

/// Marker for a requirements line referencing a sibling source package
const EDITABLE_LOCAL_PREFIX: &str = "-e .";

/// Build a Python base environment with a warm pip cache.
///
/// Fails with [`StevedoreError::InvalidBaseImage`] unless `image` is tagged
/// as a Python 3 runtime. The pip cache volume is mounted before the pip
/// self-upgrade so repeated builds reuse downloaded wheels.
pub fn with_python_base(image: &str) -> StevedoreResult<ContainerSpec> {
    if !image.starts_with(PYTHON_IMAGE_PREFIX) {
        return Err(StevedoreError::InvalidBaseImage {
            image: image.to_string(),
            expected: PYTHON_IMAGE_PREFIX.to_string(),
        });
    }

    let pip_cache = volume_scoped("package-cache", "pip").with_sharing(SharingMode::Shared);

    Ok(ContainerSpec::from_image(image)
        .with_mounted_cache("/root/.cache/pip", pip_cache)
        .with_exec(["pip", "install", "--upgrade", "pip"]))
}

/// Install packages with apt-get on a Debian-based spec
pub fn with_debian_packages(base: &ContainerSpec, packages: &[&str]) -> ContainerSpec {
    let mut install = vec!["apt-get", "install", "-y"];
    install.extend_from_slice(packages);
    base.with_exec(["apt-get", "update"]).with_exec(install)
}

/// Install packages with apk on an Alpine-based spec
pub fn with_alpine_packages(base: &ContainerSpec, packages: &[&str]) -> ContainerSpec {
    let mut install = vec!["apk", "add"];
    install.extend_from_slice(packages);
    base.with_exec(install)
}

/// Install packages with pip on a spec that has Python available
pub fn with_pip_packages(base: &ContainerSpec, packages: &[&str]) -> ContainerSpec {
    let mut install = vec!["pip", "install"];
    install.extend_from_slice(packages);
    base.with_exec(install)
}

/// Build a Python environment with poetry installed and a warm poetry cache
pub fn with_poetry(settings: &Settings) -> StevedoreResult<ContainerSpec> {
    let base = with_python_base(&settings.images.python)?;
    let with_git = with_debian_packages(&base, &["git"]);
    let poetry_env = with_pip_packages(&with_git, &["poetry"]);

    let poetry_cache = volume_scoped("package-cache", "poetry").with_sharing(SharingMode::Shared);
    Ok(poetry_env.with_mounted_cache("/root/.cache/pypoetry", poetry_cache))
}

/// Set up a poetry module: mount sources, install dependencies.
///
/// The cache-busting variable forces dependency resolution to re-run on every
/// pipeline invocation instead of replaying a stale execution layer.
pub fn with_poetry_module(
    poetry_env: &ContainerSpec,
    parent: RepoSnapshot,
    module_path: &str,
) -> ContainerSpec {
    poetry_env
        .with_mounted_directory("/src", parent)
        .with_workdir(format!("/src/{}", module_path))
        .with_exec(["poetry", "install"])
        .with_env_variable("CACHEBUSTER", uuid::Uuid::new_v4().to_string())
}

/// Parsed requirements manifest.
///
/// Only the editable-local marker is interpreted; every other line is opaque
/// input for the installer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageManifest {
    lines: Vec<String>,
}

impl PackageManifest {
    /// Parse manifest text into ordered lines
    pub fn parse(content: &str) -> Self {
        Self {
            lines: content.lines().map(str::to_string).collect(),
        }
    }

    /// Whether the manifest has no lines at all
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Relative paths of editable-local references, in manifest order
    pub fn editable_local_paths(&self) -> impl Iterator<Item = &str> {
        self.lines.iter().filter_map(|line| {
            if line.starts_with(EDITABLE_LOCAL_PREFIX) {
                // "-e ./sibling" keeps "./sibling"
                line.strip_prefix("-e ").map(str::trim)
            } else {
                None
            }
        })
    }
}

/// Mount a package's filtered source tree and make it the working directory.
///
/// Caller exclusions are unioned with the fixed default exclusion set (build
/// artifacts, virtual environments, caches).
pub fn with_python_package(
    settings: &Settings,
    python_env: &ContainerSpec,
    source_path: &str,
    exclude: &[String],
) -> ContainerSpec {
    let mut all_exclude = settings.python.default_exclude.clone();
    all_exclude.extend(exclude.iter().cloned());

    let source = RepoSnapshot::subtree(source_path).with_exclude(all_exclude);
    let mount_path = format!("/{}", source_path);

    python_env
        .with_mounted_directory(&mount_path, source)
        .with_workdir(mount_path)
}

/// Install a package from source into a Python environment.
///
/// Editable-local manifest references are mounted, in manifest order, before
/// the single install-from-manifest step; the package itself is installed
/// unconditionally afterwards, then re-installed with extras when
/// `extra_groups` is non-empty. A missing manifest means no local
/// dependencies, not an error. A missing local dependency path surfaces as
/// the install command's non-zero exit, propagated unchanged.
pub async fn with_installed_python_package(
    engine: &dyn ContainerEngine,
    settings: &Settings,
    python_env: &ContainerSpec,
    source_path: &str,
    extra_groups: &[String],
    exclude: &[String],
) -> StevedoreResult<ContainerSpec> {
    let mut container = with_python_package(settings, python_env, source_path, exclude);

    match engine.file_contents(&container, REQUIREMENTS_FILE).await? {
        Some(content) if !content.is_empty() => {
            let manifest = PackageManifest::parse(&content);
            for relative in manifest.editable_local_paths() {
                let dep_path = join_subpath(source_path, relative);
                debug!(path = %dep_path, "mounting editable local dependency");
                let dep_source = RepoSnapshot::subtree(&dep_path)
                    .with_exclude(settings.python.default_exclude.clone());
                container = container.with_mounted_directory(format!("/{}", dep_path), dep_source);
            }
            container = container.with_exec([
                "python",
                "-m",
                "pip",
                "install",
                "-r",
                REQUIREMENTS_FILE,
            ]);
        }
        _ => {
            debug!(path = %source_path, "no requirements manifest, skipping local dependencies");
        }
    }

    container = container.with_exec(["python", "-m", "pip", "install", "."]);

    if !extra_groups.is_empty() {
        let extras = format!(".[{}]", extra_groups.join(","));
        container = container.with_exec(vec![
            "python".to_string(),
            "-m".to_string(),
            "pip".to_string(),
            "install".to_string(),
            extras,
        ]);
    }

    Ok(container)
}

/// Join a manifest-relative reference onto the package source path
fn join_subpath(source_path: &str, relative: &str) -> String {
    let relative = relative.strip_prefix("./").unwrap_or(relative);
    format!("{}/{}", source_path, relative)
}
