//! Reusable containerized build/test environments
//!
//! Free functions that compose [`ContainerSpec`](crate::engine::ContainerSpec)
//! values for the pipeline steps: language bases with warm package caches,
//! a Gradle build environment, docker-in-docker service bindings, and image
//! delivery into a bound daemon. Each function is purely additive; nothing
//! runs until the resulting spec is handed to an engine.

pub mod crane;
pub mod docker;
pub mod gradle;
pub mod python;

pub use crane::with_crane;
pub use docker::{
    load_image, load_image_to_docker_host, with_bound_docker_host, with_docker_cli,
    with_dockerd_service, DockerImageArtifact, SharedVolume,
};
pub use gradle::with_gradle;
pub use python::{
    with_alpine_packages, with_debian_packages, with_installed_python_package, with_pip_packages,
    with_poetry, with_poetry_module, with_python_base, with_python_package, PackageManifest,
};
