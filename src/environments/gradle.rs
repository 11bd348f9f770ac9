//! JVM build environment
//!
//! An OpenJDK container with the docker CLI bootstrapped, the repository's
//! Gradle build configuration mounted from an explicit allow-list, and two
//! persistent caches: a locked read-write build cache and a shared read-only
//! dependency cache. Gradle builds produce connector images, so the
//! environment is usually bound to its own docker host.

use crate::cache::{volume, SharingMode};
use crate::config::Settings;
use crate::engine::ContainerSpec;
use crate::environments::docker::{with_bound_docker_host, SharedVolume};
use crate::snapshot::RepoSnapshot;
use tracing::debug;

/// Build a Gradle environment, optionally bound to a dedicated docker host.
///
/// Only the build-tool configuration named by the allow-list (plus
/// `extra_sources`) is mounted; connector sources are mounted later by the
/// steps that need them.
pub fn with_gradle(
    settings: &Settings,
    extra_sources: &[String],
    bind_to_docker_host: bool,
    service_name: Option<&str>,
) -> ContainerSpec {
    let mut include = settings.gradle.sources.clone();
    include.extend(extra_sources.iter().cloned());
    debug!(paths = include.len(), "mounting gradle build configuration");

    let build_cache = volume("gradle-build-cache").with_sharing(SharingMode::Locked);
    let dependency_cache = volume("gradle-dependency-cache").with_sharing(SharingMode::Shared);

    let workspace = settings.gradle.workspace.as_str();
    let ro_cache_path = settings.gradle.ro_dependency_cache_path.as_str();

    let jdk = ContainerSpec::from_image(&settings.images.jdk)
        .with_exec(["apt-get", "update"])
        .with_exec(["apt-get", "install", "-y", "curl", "jq", "rsync"])
        .with_env_variable("VERSION", settings.docker.version.as_str())
        .with_exec(["sh", "-c", "curl -fsSL https://get.docker.com | sh"])
        .with_env_variable("GRADLE_HOME", settings.gradle.home.as_str())
        .with_exec(["mkdir", "-p", workspace])
        .with_workdir(workspace)
        .with_mounted_directory(workspace, RepoSnapshot::subtree(".").with_include(include))
        .with_exec(["mkdir", "-p", ro_cache_path])
        .with_mounted_cache(settings.gradle.build_cache_path.as_str(), build_cache)
        .with_mounted_cache(ro_cache_path, dependency_cache)
        .with_env_variable("GRADLE_RO_DEP_CACHE", ro_cache_path);

    if bind_to_docker_host {
        let shared_tmp = SharedVolume::new(
            "/tmp",
            volume("share-tmp-gradle").with_sharing(SharingMode::Shared),
        );
        with_bound_docker_host(settings, &jdk, Some(&shared_tmp), service_name)
    } else {
        jdk
    }
}
