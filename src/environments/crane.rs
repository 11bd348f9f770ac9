//! Crane image-manipulation tool
//!
//! Crane inspects and manipulates images directly against registries:
//! manifests, layer lists, existing tags. The debug image variant ships a
//! shell, which the registry login needs to expand its credential variables.

use crate::config::Settings;
use crate::engine::{ContainerSpec, ExecOpts, SecretRef};
use tracing::debug;

/// Build a crane container, logged into Docker Hub when credentials are
/// configured.
///
/// Credentials travel as named secrets only; their values are resolved by
/// the engine and never appear in the spec.
pub fn with_crane(settings: &Settings) -> ContainerSpec {
    let base = ContainerSpec::from_image(&settings.images.crane);

    let has_credentials = settings.secrets.docker_hub_username.is_some()
        && settings.secrets.docker_hub_password.is_some();
    if !has_credentials {
        debug!("no registry credentials configured, skipping crane login");
        return base;
    }

    base.with_secret_variable("DOCKER_HUB_USERNAME", SecretRef::new("docker_hub_username"))
        .with_secret_variable("DOCKER_HUB_PASSWORD", SecretRef::new("docker_hub_password"))
        .with_exec_opts(
            [
                "sh",
                "-c",
                "crane auth login index.docker.io -u $DOCKER_HUB_USERNAME -p $DOCKER_HUB_PASSWORD",
            ],
            ExecOpts {
                insecure_root_capabilities: false,
                // The crane entrypoint cannot expand environment variables
                skip_entrypoint: true,
            },
        )
}
