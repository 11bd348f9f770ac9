//! Docker-in-docker service bindings and image delivery
//!
//! A daemon spec and the client bound to it are linked by one naming
//! contract: the daemon's storage volume name doubles as its network
//! hostname. Both sides derive the name through [`docker_host_name`], so two
//! clients requesting the same shared volume and service name converge on a
//! single logical daemon, while differing service names stay fully isolated.

use crate::cache::{slugify, volume, CacheVolumeRef, SharingMode};
use crate::config::Settings;
use crate::engine::{ContainerEngine, ContainerSpec, ExecOpts, FileRef};
use crate::error::{StevedoreError, StevedoreResult};
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Control port the daemon listens on, plaintext
pub const DOCKER_HOST_PORT: u16 = 2375;

/// Daemon image storage path
const DOCKER_LIB_PATH: &str = "/var/lib/docker";

/// A cache volume mounted at the same path on both daemon and client
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SharedVolume {
    /// Mount path, identical on both sides
    pub path: String,
    /// The shared cache volume
    pub volume: CacheVolumeRef,
}

impl SharedVolume {
    /// Share `volume` at `path` between a daemon and its clients
    pub fn new(path: impl Into<String>, volume: CacheVolumeRef) -> Self {
        Self {
            path: path.into(),
            volume,
        }
    }
}

/// Derive the daemon hostname, which is also its storage volume name.
///
/// `{shared volume name}-docker-lib` (or plain `docker-lib`), suffixed with
/// the slugified service name when one is given. Deterministic, so
/// independently built client specs agree on the daemon they target.
pub fn docker_host_name(shared: Option<&SharedVolume>, service_name: Option<&str>) -> String {
    let mut name = match shared {
        Some(shared) => format!("{}-docker-lib", shared.volume.name),
        None => "docker-lib".to_string(),
    };
    if let Some(service) = service_name {
        name = format!("{}-{}", name, slugify(service));
    }
    name
}

/// Build a container running dockerd, usable as a docker host for
/// docker-in-docker pipeline steps.
///
/// The storage volume is always Shared: multiple clients may bind to the
/// same logical daemon.
pub fn with_dockerd_service(
    settings: &Settings,
    shared: Option<&SharedVolume>,
    service_name: Option<&str>,
) -> ContainerSpec {
    let storage =
        volume(&docker_host_name(shared, service_name)).with_sharing(SharingMode::Shared);

    let mut dind = ContainerSpec::from_image(&settings.images.dind)
        .with_mounted_cache(DOCKER_LIB_PATH, storage);

    if let Some(shared) = shared {
        dind = dind.with_mounted_cache(&shared.path, shared.volume.clone());
    }

    dind.with_exposed_port(DOCKER_HOST_PORT).with_exec_opts(
        [
            "dockerd".to_string(),
            "--log-level=error".to_string(),
            format!("--host=tcp://0.0.0.0:{}", DOCKER_HOST_PORT),
            "--tls=false".to_string(),
        ],
        ExecOpts {
            insecure_root_capabilities: true,
            skip_entrypoint: false,
        },
    )
}

/// Bind a client spec to a docker host running as a service container.
///
/// Sets `DOCKER_HOST` on the client and registers a network alias mapping
/// the computed hostname to the daemon spec; the client never learns the
/// daemon's real network identity. A shared volume, when given, is mounted
/// on both sides so they observe the same path.
pub fn with_bound_docker_host(
    settings: &Settings,
    client: &ContainerSpec,
    shared: Option<&SharedVolume>,
    service_name: Option<&str>,
) -> ContainerSpec {
    let daemon = with_dockerd_service(settings, shared, service_name);
    let hostname = docker_host_name(shared, service_name);
    debug!(%hostname, "binding client to docker host");

    let mut bound = client
        .with_env_variable(
            "DOCKER_HOST",
            format!("tcp://{}:{}", hostname, DOCKER_HOST_PORT),
        )
        .with_service_binding(hostname, daemon);

    if let Some(shared) = shared {
        bound = bound.with_mounted_cache(&shared.path, shared.volume.clone());
    }

    bound
}

/// Build a docker CLI container bound to a persistent docker host
pub fn with_docker_cli(
    settings: &Settings,
    shared: Option<&SharedVolume>,
    service_name: Option<&str>,
) -> ContainerSpec {
    let cli = ContainerSpec::from_image(&settings.images.docker_cli);
    with_bound_docker_host(settings, &cli, shared, service_name)
}

/// A built image tar archive plus the tag it should carry once loaded.
///
/// Consumed exactly once by [`load_image`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DockerImageArtifact {
    /// The image tar archive
    pub tar: FileRef,
    /// Tag to assign on the daemon
    pub tag: String,
}

impl DockerImageArtifact {
    /// An artifact from a tar file handle and a target tag
    pub fn new(tar: FileRef, tag: impl Into<String>) -> Self {
        Self {
            tar,
            tag: tag.into(),
        }
    }
}

/// What the daemon reported after a load
#[derive(Debug, Clone, PartialEq, Eq)]
enum LoadedImage {
    /// The archive carried its tag; no further tagging needed
    Tagged(String),
    /// The archive was untagged; the daemon reports only a content hash
    Untagged(String),
}

const LOADED_IMAGE_ID_PREFIX: &str = "Loaded image ID: sha256:";
const LOADED_IMAGE_PREFIX: &str = "Loaded image: ";

/// Parse the textual output of `docker load`.
///
/// This is the one fragile boundary with the daemon's reporting format;
/// anything unrecognized is surfaced rather than silently skipped.
fn parse_load_output(output: &str) -> StevedoreResult<LoadedImage> {
    for line in output.lines() {
        let line = line.trim();
        if let Some(id) = line.strip_prefix(LOADED_IMAGE_ID_PREFIX) {
            return Ok(LoadedImage::Untagged(id.trim().to_string()));
        }
        if let Some(tag) = line.strip_prefix(LOADED_IMAGE_PREFIX) {
            return Ok(LoadedImage::Tagged(tag.trim().to_string()));
        }
    }
    Err(StevedoreError::UnparseableLoadOutput {
        output: output.to_string(),
    })
}

/// Load an image tar archive into the daemon a client spec is bound to.
///
/// The tar is mounted under a fresh random name so concurrent loads against
/// the same daemon never collide. Any prior image under the artifact's tag
/// is removed best-effort first; removal failure is expected when no prior
/// image exists and is never propagated. A failing load is fatal.
pub async fn load_image(
    engine: &dyn ContainerEngine,
    client: &ContainerSpec,
    artifact: DockerImageArtifact,
) -> StevedoreResult<()> {
    let tar_name = format!("{}.tar", Uuid::new_v4());
    let docker_cli = client.with_mounted_file(&tar_name, artifact.tar);

    // The cache-busting variable keeps the removal from replaying a stale
    // execution layer on engines that memoize identical exec chains.
    let removal = docker_cli
        .with_env_variable("CACHEBUSTER", tar_name.as_str())
        .with_exec(["docker", "image", "rm", artifact.tag.as_str()]);
    match engine.exit_code(&removal).await {
        Ok(0) => info!(tag = %artifact.tag, "removed existing image"),
        Ok(code) => debug!(tag = %artifact.tag, code, "no existing image to remove"),
        Err(e) => debug!(tag = %artifact.tag, error = %e, "image removal not applicable"),
    }

    let load = docker_cli.with_exec(["docker", "load", "--input", tar_name.as_str()]);
    let output = engine.stdout(&load).await?;
    info!(output = %output.trim_end(), "docker load");

    match parse_load_output(&output)? {
        LoadedImage::Tagged(tag) => {
            if tag != artifact.tag {
                warn!(loaded = %tag, expected = %artifact.tag, "archive carried a different tag");
            }
        }
        LoadedImage::Untagged(id) => {
            let tag_cmd =
                docker_cli.with_exec(["docker", "tag", id.as_str(), artifact.tag.as_str()]);
            let tag_output = engine.stdout(&tag_cmd).await?;
            debug!(id = %id, tag = %artifact.tag, output = %tag_output.trim_end(), "tagged loaded image");
        }
    }

    Ok(())
}

/// Build a bound docker CLI client and load an image artifact through it
pub async fn load_image_to_docker_host(
    engine: &dyn ContainerEngine,
    settings: &Settings,
    artifact: DockerImageArtifact,
    service_name: Option<&str>,
) -> StevedoreResult<()> {
    let docker_cli = with_docker_cli(settings, None, service_name);
    load_image(engine, &docker_cli, artifact).await
}
