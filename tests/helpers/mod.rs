#![allow(dead_code)] // Test helpers appear unused when compiled independently

use azcli_wrap::{AzCommand, CommandRunner, ExecutionResult, Result};
use std::collections::VecDeque;
use std::sync::Mutex;

/// Command runner that replays canned results and records what it was asked
/// to run
#[derive(Default)]
pub struct MockRunner {
    responses: Mutex<VecDeque<ExecutionResult>>,
    calls: Mutex<Vec<AzCommand>>,
}

impl MockRunner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_response(self, output: &str, returncode: i32) -> Self {
        self.responses
            .lock()
            .unwrap()
            .push_back(ExecutionResult::new(output, returncode));
        self
    }

    pub fn with_failure(self, returncode: i32, stderr: &str) -> Self {
        self.responses
            .lock()
            .unwrap()
            .push_back(ExecutionResult::new("", returncode).with_stderr(stderr));
        self
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub fn calls(&self) -> Vec<AzCommand> {
        self.calls.lock().unwrap().clone()
    }
}

impl CommandRunner for MockRunner {
    fn run(&self, command: &AzCommand) -> Result<ExecutionResult> {
        self.calls.lock().unwrap().push(command.clone());
        Ok(self
            .responses
            .lock()
            .unwrap()
            .pop_front()
            .expect("MockRunner ran out of responses"))
    }
}
