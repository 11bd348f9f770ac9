//! End-to-end composition scenarios against a scripted engine

use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use stevedore::config::Settings;
use stevedore::engine::{ContainerEngine, ContainerSpec, FileRef, Op};
use stevedore::environments::{
    load_image, with_docker_cli, with_gradle, with_installed_python_package, with_python_base,
    DockerImageArtifact,
};
use stevedore::StevedoreResult;

/// Opt-in log output via RUST_LOG when debugging these scenarios
fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();
}

/// Engine double that replays canned results and records every spec it saw
#[derive(Default)]
struct ScriptedEngine {
    files: HashMap<String, String>,
    stdout_script: Mutex<VecDeque<String>>,
    exit_script: Mutex<VecDeque<i32>>,
    stdout_requests: Mutex<Vec<ContainerSpec>>,
}

impl ScriptedEngine {
    fn with_file(mut self, path: &str, contents: &str) -> Self {
        self.files.insert(path.to_string(), contents.to_string());
        self
    }

    fn stdout_then(self, out: &str) -> Self {
        self.stdout_script
            .lock()
            .unwrap()
            .push_back(out.to_string());
        self
    }

    fn exit_then(self, code: i32) -> Self {
        self.exit_script.lock().unwrap().push_back(code);
        self
    }
}

#[async_trait]
impl ContainerEngine for ScriptedEngine {
    async fn file_contents(
        &self,
        _spec: &ContainerSpec,
        path: &str,
    ) -> StevedoreResult<Option<String>> {
        Ok(self.files.get(path).cloned())
    }

    async fn stdout(&self, spec: &ContainerSpec) -> StevedoreResult<String> {
        self.stdout_requests.lock().unwrap().push(spec.clone());
        Ok(self
            .stdout_script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_default())
    }

    async fn exit_code(&self, _spec: &ContainerSpec) -> StevedoreResult<i32> {
        Ok(self.exit_script.lock().unwrap().pop_front().unwrap_or(0))
    }
}

#[tokio::test]
async fn python_package_with_editable_sibling_builds_and_imports() {
    init_tracing();
    let settings = Settings::default();
    let engine = ScriptedEngine::default()
        .with_file("requirements.txt", "-e ./sibling\nrequests==2.31\n")
        .exit_then(0);

    let base = with_python_base(&settings.images.python).unwrap();
    let env = with_installed_python_package(
        &engine,
        &settings,
        &base,
        "connectors/source-faker",
        &[],
        &[],
    )
    .await
    .unwrap();

    // Package source and its editable sibling are both mounted, in order
    let mounts: Vec<_> = env.directory_mounts().collect();
    assert_eq!(
        mounts,
        vec![
            "/connectors/source-faker",
            "/connectors/source-faker/sibling"
        ]
    );

    // The manifest install ran once, then the package install
    let execs: Vec<_> = env.execs().collect();
    assert_eq!(
        execs
            .iter()
            .filter(|args| args.contains(&"-r".to_string()))
            .count(),
        1
    );
    assert!(execs
        .iter()
        .any(|args| *args == ["python", "-m", "pip", "install", "."]));

    // The installed package is importable in the resulting environment
    let import_check = env.with_exec(["python", "-c", "import source_faker"]);
    assert_eq!(engine.exit_code(&import_check).await.unwrap(), 0);
}

#[tokio::test]
async fn gradle_environment_delivers_its_image_to_a_bound_daemon() {
    init_tracing();
    let settings = Settings::default();

    // A gradle build environment with its own docker host
    let gradle = with_gradle(&settings, &[], true, Some("gradle"));
    let (hostname, daemon) = gradle.service_bindings().next().unwrap();
    assert_eq!(
        gradle.env_var("DOCKER_HOST"),
        Some(format!("tcp://{}:2375", hostname).as_str())
    );
    // Daemon storage identity is the hostname
    let storage = daemon
        .cache_mounts()
        .find(|(path, _)| *path == "/var/lib/docker")
        .map(|(_, vol)| vol.name.clone())
        .unwrap();
    assert_eq!(storage, hostname);

    // Deliver a built connector image into the daemon for downstream tests
    let engine = ScriptedEngine::default()
        .exit_then(1)
        .stdout_then("Loaded image ID: sha256:deadbeef\n")
        .stdout_then("");

    let client = with_docker_cli(&settings, None, Some("gradle"));
    let artifact = DockerImageArtifact::new(FileRef::new("connector-build-1"), "source-faker:dev");
    load_image(&engine, &client, artifact).await.unwrap();

    // Removal failed (no prior image) yet the load went through and the
    // untagged image was tagged explicitly.
    let requests = engine.stdout_requests.lock().unwrap();
    assert_eq!(requests.len(), 2);
    let tag_args: Vec<_> = requests[1].execs().collect();
    assert_eq!(
        *tag_args.last().unwrap(),
        ["docker", "tag", "deadbeef", "source-faker:dev"]
    );

    // The tar travelled under a generated name, not the artifact id
    let tar_mount = requests[0]
        .ops()
        .iter()
        .find_map(|op| match op {
            Op::MountFile { path, .. } => Some(path.clone()),
            _ => None,
        })
        .unwrap();
    assert!(tar_mount.ends_with(".tar"));
    assert_ne!(tar_mount, "connector-build-1");
}
