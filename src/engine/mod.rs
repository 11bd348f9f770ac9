//! Container engine abstraction
//!
//! Provides the immutable [`ContainerSpec`] value type and the
//! [`ContainerEngine`] trait implemented by remote execution backends.
//!
//! Spec construction is purely declarative: layering operations (mounts,
//! env variables, ports, service bindings, execs) are recorded in order and
//! only interpreted by the engine when a result is read back. The trait
//! therefore exposes exactly the three read-back operations that can suspend
//! a pipeline's control flow.

pub mod spec;

#[cfg(test)]
pub(crate) mod stub;

pub use spec::{ContainerSpec, ExecOpts, FileRef, Op, SecretRef};

use crate::error::StevedoreResult;
use async_trait::async_trait;

/// Abstract remote execution backend for container specs
///
/// Implementations instantiate the spec's base image, apply its pending
/// operations in order, and report the requested result. Independent spec
/// chains may execute concurrently on the backend; each chain's own steps
/// are strictly ordered by construction.
#[async_trait]
pub trait ContainerEngine: Send + Sync {
    /// Read a file from within the constructed environment.
    ///
    /// Returns `Ok(None)` when the file does not exist; absence is an
    /// expected case, not an error.
    async fn file_contents(
        &self,
        spec: &ContainerSpec,
        path: &str,
    ) -> StevedoreResult<Option<String>>;

    /// Execute the spec and capture the standard output of its final exec.
    ///
    /// A non-zero exit surfaces as [`crate::StevedoreError::CommandFailed`].
    async fn stdout(&self, spec: &ContainerSpec) -> StevedoreResult<String>;

    /// Execute the spec and report the exit status of its final exec.
    async fn exit_code(&self, spec: &ContainerSpec) -> StevedoreResult<i32>;
}
