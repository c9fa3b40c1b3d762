use super::plan::Step;
use std::io;
use std::process::Command;
use tracing::debug;

/// Executes one provisioning step and reports its exit status.
pub trait CommandRunner {
    fn run(&mut self, step: &Step) -> io::Result<i32>;
}

/// Runs steps as child processes, inheriting stdio, and waits for each.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemRunner;

impl CommandRunner for SystemRunner {
    fn run(&mut self, step: &Step) -> io::Result<i32> {
        debug!("Spawning: {}", step);
        let status = Command::new(&step.program).args(&step.args).status()?;
        // Killed by a signal: report the conventional shell failure code.
        Ok(status.code().unwrap_or(1))
    }
}

/// Records every step and answers with scripted exit codes.
#[cfg(test)]
#[derive(Debug, Default)]
pub(crate) struct RecordingRunner {
    pub invoked: Vec<String>,
    pub failures: std::collections::HashMap<String, i32>,
}

#[cfg(test)]
impl CommandRunner for RecordingRunner {
    fn run(&mut self, step: &Step) -> io::Result<i32> {
        let command = step.to_string();
        self.invoked.push(command.clone());
        Ok(self.failures.get(&command).copied().unwrap_or(0))
    }
}
