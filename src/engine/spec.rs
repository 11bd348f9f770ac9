//! Container specification values
//!
//! A [`ContainerSpec`] is a base image reference plus an ordered list of
//! pending layering operations. Specs are persistent values: every `with_*`
//! method leaves the receiver untouched and returns a new spec, so a
//! partially built chain can be branched, replayed, or discarded without
//! aliasing hazards. Nothing executes until an engine is asked for a result.

use crate::cache::CacheVolumeRef;
use crate::snapshot::RepoSnapshot;
use serde::{Deserialize, Serialize};

/// Opaque handle to a file provided by the engine (e.g. a build artifact)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileRef {
    /// Engine-side identifier for the file
    pub id: String,
}

impl FileRef {
    /// Reference a file by its engine-side identifier
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }
}

/// Opaque handle to a named secret.
///
/// Only the name travels with the spec; the secret value is resolved by the
/// engine and never appears in ops or logs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecretRef {
    /// Name under which the secrets provider knows this credential
    pub name: String,
}

impl SecretRef {
    /// Reference a secret by name
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

/// Options for an exec operation
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecOpts {
    /// Run with root capabilities inside the engine sandbox (dockerd needs this)
    pub insecure_root_capabilities: bool,
    /// Run the argv directly, bypassing the image's declared entrypoint
    pub skip_entrypoint: bool,
}

/// A single pending layering operation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Op {
    /// Mount a filtered repository snapshot at a path
    MountDirectory { path: String, source: RepoSnapshot },
    /// Mount a persistent cache volume at a path
    MountCache { path: String, volume: CacheVolumeRef },
    /// Mount a single file at a path
    MountFile { path: String, file: FileRef },
    /// Set an environment variable
    Env { name: String, value: String },
    /// Inject a secret as an environment variable
    SecretEnv { name: String, secret: SecretRef },
    /// Set the working directory
    Workdir { path: String },
    /// Expose a network port
    ExposePort { port: u16 },
    /// Make another spec reachable under a hostname alias
    ServiceBinding {
        hostname: String,
        service: ContainerSpec,
    },
    /// Execute a command
    Exec { args: Vec<String>, opts: ExecOpts },
}

/// An immutable container image description plus pending operations
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContainerSpec {
    image: String,
    ops: Vec<Op>,
}

impl ContainerSpec {
    /// Start a spec from a tagged base image reference
    pub fn from_image(image: impl Into<String>) -> Self {
        Self {
            image: image.into(),
            ops: Vec::new(),
        }
    }

    /// The base image this spec builds on
    pub fn image(&self) -> &str {
        &self.image
    }

    /// The pending operations, in application order
    pub fn ops(&self) -> &[Op] {
        &self.ops
    }

    fn push(&self, op: Op) -> Self {
        let mut next = self.clone();
        next.ops.push(op);
        next
    }

    /// Mount a filtered repository snapshot at `path`
    pub fn with_mounted_directory(&self, path: impl Into<String>, source: RepoSnapshot) -> Self {
        self.push(Op::MountDirectory {
            path: path.into(),
            source,
        })
    }

    /// Mount a persistent cache volume at `path`
    pub fn with_mounted_cache(&self, path: impl Into<String>, volume: CacheVolumeRef) -> Self {
        self.push(Op::MountCache {
            path: path.into(),
            volume,
        })
    }

    /// Mount a single file at `path`
    pub fn with_mounted_file(&self, path: impl Into<String>, file: FileRef) -> Self {
        self.push(Op::MountFile {
            path: path.into(),
            file,
        })
    }

    /// Set an environment variable
    pub fn with_env_variable(&self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.push(Op::Env {
            name: name.into(),
            value: value.into(),
        })
    }

    /// Inject a secret as an environment variable
    pub fn with_secret_variable(&self, name: impl Into<String>, secret: SecretRef) -> Self {
        self.push(Op::SecretEnv {
            name: name.into(),
            secret,
        })
    }

    /// Set the working directory
    pub fn with_workdir(&self, path: impl Into<String>) -> Self {
        self.push(Op::Workdir { path: path.into() })
    }

    /// Expose a network port
    pub fn with_exposed_port(&self, port: u16) -> Self {
        self.push(Op::ExposePort { port })
    }

    /// Make `service` reachable from this spec under `hostname`
    pub fn with_service_binding(
        &self,
        hostname: impl Into<String>,
        service: ContainerSpec,
    ) -> Self {
        self.push(Op::ServiceBinding {
            hostname: hostname.into(),
            service,
        })
    }

    /// Execute a command with default options
    pub fn with_exec<I, S>(&self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.with_exec_opts(args, ExecOpts::default())
    }

    /// Execute a command with explicit options
    pub fn with_exec_opts<I, S>(&self, args: I, opts: ExecOpts) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.push(Op::Exec {
            args: args.into_iter().map(Into::into).collect(),
            opts,
        })
    }

    /// Directory mount paths, in application order
    pub fn directory_mounts(&self) -> impl Iterator<Item = &str> {
        self.ops.iter().filter_map(|op| match op {
            Op::MountDirectory { path, .. } => Some(path.as_str()),
            _ => None,
        })
    }

    /// Cache mounts as (path, volume), in application order
    pub fn cache_mounts(&self) -> impl Iterator<Item = (&str, &CacheVolumeRef)> {
        self.ops.iter().filter_map(|op| match op {
            Op::MountCache { path, volume } => Some((path.as_str(), volume)),
            _ => None,
        })
    }

    /// Executed argv lists, in application order
    pub fn execs(&self) -> impl Iterator<Item = &[String]> {
        self.ops.iter().filter_map(|op| match op {
            Op::Exec { args, .. } => Some(args.as_slice()),
            _ => None,
        })
    }

    /// The value an environment variable would hold, if set (last write wins)
    pub fn env_var(&self, name: &str) -> Option<&str> {
        self.ops.iter().rev().find_map(|op| match op {
            Op::Env { name: n, value } if n == name => Some(value.as_str()),
            _ => None,
        })
    }

    /// Service bindings as (hostname, daemon spec), in application order
    pub fn service_bindings(&self) -> impl Iterator<Item = (&str, &ContainerSpec)> {
        self.ops.iter().filter_map(|op| match op {
            Op::ServiceBinding { hostname, service } => Some((hostname.as_str(), service)),
            _ => None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::volume;

    #[test]
    fn transformations_do_not_mutate_the_receiver() {
        let base = ContainerSpec::from_image("python:3.10-slim");
        let derived = base
            .with_env_variable("A", "1")
            .with_exec(["pip", "install", "--upgrade", "pip"]);

        assert!(base.ops().is_empty());
        assert_eq!(derived.ops().len(), 2);
        assert_eq!(derived.image(), "python:3.10-slim");
    }

    #[test]
    fn branching_a_chain_keeps_both_branches_independent() {
        let cli = ContainerSpec::from_image("docker:24-cli");
        let rm = cli.with_exec(["docker", "image", "rm", "x:latest"]);
        let load = cli.with_exec(["docker", "load", "--input", "x.tar"]);

        assert_eq!(rm.execs().count(), 1);
        assert_eq!(load.execs().count(), 1);
        assert_eq!(cli.execs().count(), 0);
    }

    #[test]
    fn ops_preserve_application_order() {
        let spec = ContainerSpec::from_image("base")
            .with_mounted_cache("/cache", volume("pip-cache"))
            .with_workdir("/src")
            .with_exec(["true"]);

        let kinds: Vec<_> = spec
            .ops()
            .iter()
            .map(|op| match op {
                Op::MountCache { .. } => "cache",
                Op::Workdir { .. } => "workdir",
                Op::Exec { .. } => "exec",
                _ => "other",
            })
            .collect();
        assert_eq!(kinds, vec!["cache", "workdir", "exec"]);
    }

    #[test]
    fn env_var_last_write_wins() {
        let spec = ContainerSpec::from_image("base")
            .with_env_variable("CACHEBUSTER", "a")
            .with_env_variable("CACHEBUSTER", "b");
        assert_eq!(spec.env_var("CACHEBUSTER"), Some("b"));
        assert_eq!(spec.env_var("MISSING"), None);
    }

    #[test]
    fn secret_env_records_only_the_name() {
        let spec = ContainerSpec::from_image("base")
            .with_secret_variable("TOKEN", SecretRef::new("registry_token"));

        let rendered = format!("{:?}", spec);
        assert!(rendered.contains("registry_token"));
        // A SecretRef has no value field at all, so none can leak into logs.
        assert_eq!(
            spec.ops()[0],
            Op::SecretEnv {
                name: "TOKEN".to_string(),
                secret: SecretRef::new("registry_token"),
            }
        );
    }

    #[test]
    fn service_binding_nests_the_daemon_spec() {
        let daemon = ContainerSpec::from_image("docker:24-dind").with_exposed_port(2375);
        let client = ContainerSpec::from_image("docker:24-cli")
            .with_service_binding("docker-lib-gradle", daemon.clone());

        let (hostname, bound) = client.service_bindings().next().unwrap();
        assert_eq!(hostname, "docker-lib-gradle");
        assert_eq!(bound, &daemon);
    }
}
