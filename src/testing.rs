//! Canned host for command tests.

use hvkit::{CommandOutput, Executor};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

/// Answers each script with the next canned output.
pub struct Canned {
    outputs: Mutex<VecDeque<CommandOutput>>,
    scripts: Mutex<Vec<String>>,
}

impl Canned {
    pub fn new(outputs: impl IntoIterator<Item = CommandOutput>) -> Arc<Self> {
        Arc::new(Self {
            outputs: Mutex::new(outputs.into_iter().collect()),
            scripts: Mutex::new(Vec::new()),
        })
    }

    pub fn scripts(&self) -> Vec<String> {
        self.scripts.lock().unwrap().clone()
    }
}

impl Executor for Canned {
    fn execute(&self, script: &str) -> hvkit::Result<CommandOutput> {
        self.scripts.lock().unwrap().push(script.to_string());
        Ok(self
            .outputs
            .lock()
            .unwrap()
            .pop_front()
            .expect("host asked for more scripts than canned"))
    }

    fn describe(&self) -> String {
        "canned".to_string()
    }
}

pub fn success(stdout: &str) -> CommandOutput {
    CommandOutput {
        stdout: stdout.to_string(),
        exit_code: Some(0),
        ..Default::default()
    }
}

pub fn failure(stderr: &str) -> CommandOutput {
    CommandOutput {
        stderr: stderr.to_string(),
        exit_code: Some(1),
        ..Default::default()
    }
}
