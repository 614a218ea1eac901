//! Scripted executor double for gateway tests.

use crate::error::Result;
use crate::executor::{CommandOutput, Executor};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

/// Replays canned outputs in order and records every script it was given.
pub struct ScriptedExecutor {
    outputs: Mutex<VecDeque<CommandOutput>>,
    scripts: Mutex<Vec<String>>,
}

impl ScriptedExecutor {
    pub fn new(outputs: impl IntoIterator<Item = CommandOutput>) -> Arc<Self> {
        Arc::new(Self {
            outputs: Mutex::new(outputs.into_iter().collect()),
            scripts: Mutex::new(Vec::new()),
        })
    }

    /// Rendered scripts, oldest first.
    pub fn scripts(&self) -> Vec<String> {
        self.scripts.lock().unwrap().clone()
    }
}

impl Executor for ScriptedExecutor {
    fn execute(&self, script: &str) -> Result<CommandOutput> {
        self.scripts.lock().unwrap().push(script.to_string());
        Ok(self
            .outputs
            .lock()
            .unwrap()
            .pop_front()
            .expect("no scripted output left"))
    }

    fn describe(&self) -> String {
        "scripted".to_string()
    }
}

pub fn success(stdout: &str) -> CommandOutput {
    CommandOutput {
        stdout: stdout.to_string(),
        stderr: String::new(),
        exit_code: Some(0),
    }
}

pub fn failure(stderr: &str) -> CommandOutput {
    CommandOutput {
        stdout: String::new(),
        stderr: stderr.to_string(),
        exit_code: Some(1),
    }
}
