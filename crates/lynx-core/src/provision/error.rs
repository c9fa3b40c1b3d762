use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProvisionError {
    #[error("Failed to start '{command}': {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("'{command}' exited with status {code}")]
    CommandFailed { command: String, code: i32 },
}

impl ProvisionError {
    /// Exit status to propagate to the calling shell.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Spawn { .. } => 127,
            Self::CommandFailed { code, .. } => *code,
        }
    }
}
