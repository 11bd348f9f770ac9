//! Stevedore - Containerized build/test environments for connector CI
//!
//! Composes reusable, cacheable container environments as immutable
//! [`ContainerSpec`](engine::ContainerSpec) values: language bases with warm
//! package caches, JVM build environments, docker-in-docker service
//! bindings, and image delivery into a bound daemon. Specs are handed to an
//! abstract [`ContainerEngine`](engine::ContainerEngine) backend for
//! execution.

pub mod cache;
pub mod config;
pub mod engine;
pub mod environments;
pub mod error;
pub mod snapshot;

pub use error::{StevedoreError, StevedoreResult};
