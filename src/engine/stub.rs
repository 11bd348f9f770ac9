//! Scripted engine stub for unit tests
//!
//! Records every spec handed to a read-back operation and replays canned
//! responses in order, so tests can assert both the shape of the specs a
//! component builds and how it reacts to engine results.

use crate::engine::{ContainerEngine, ContainerSpec};
use crate::error::{StevedoreError, StevedoreResult};
use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

#[derive(Default)]
pub struct StubEngine {
    files: HashMap<String, String>,
    stdout_script: Mutex<VecDeque<StevedoreResult<String>>>,
    exit_script: Mutex<VecDeque<i32>>,
    pub stdout_requests: Mutex<Vec<ContainerSpec>>,
    pub exit_requests: Mutex<Vec<ContainerSpec>>,
}

impl StubEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make a file visible to `file_contents`
    pub fn with_file(mut self, path: impl Into<String>, contents: impl Into<String>) -> Self {
        self.files.insert(path.into(), contents.into());
        self
    }

    /// Queue the next `stdout` response
    pub fn push_stdout(self, out: impl Into<String>) -> Self {
        self.stdout_script
            .lock()
            .unwrap()
            .push_back(Ok(out.into()));
        self
    }

    /// Queue a `stdout` failure
    pub fn push_stdout_err(self, err: StevedoreError) -> Self {
        self.stdout_script.lock().unwrap().push_back(Err(err));
        self
    }

    /// Queue the next `exit_code` response
    pub fn push_exit(self, code: i32) -> Self {
        self.exit_script.lock().unwrap().push_back(code);
        self
    }
}

#[async_trait]
impl ContainerEngine for StubEngine {
    async fn file_contents(
        &self,
        _spec: &ContainerSpec,
        path: &str,
    ) -> StevedoreResult<Option<String>> {
        Ok(self.files.get(path).cloned())
    }

    async fn stdout(&self, spec: &ContainerSpec) -> StevedoreResult<String> {
        self.stdout_requests.lock().unwrap().push(spec.clone());
        self.stdout_script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(StevedoreError::engine("stub", "unscripted stdout request")))
    }

    async fn exit_code(&self, spec: &ContainerSpec) -> StevedoreResult<i32> {
        self.exit_requests.lock().unwrap().push(spec.clone());
        self.exit_script
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| StevedoreError::engine("stub", "unscripted exit_code request"))
    }
}
