//! The host-observable error kinds this front end can report. The CPU core
//! itself never returns an error: every opcode byte has a defined behavior.

use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("failed to load {path}: {reason}")]
    LoadFailure { path: PathBuf, reason: String },

    #[error("terminal setup failed: {0}")]
    TerminalSetupFailure(String),

    #[error("terminated by user")]
    UserTermination,
}
