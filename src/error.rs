// src/error.rs
//! Error types shared by both command-line tools.
//!
//! Every fatal condition ends up as one of these variants; the binaries print
//! the message and exit with status 1. A route table that simply is not there
//! is not an error (the locator returns `None`).

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// Bad project/app name, unsafe target directory, wrong project layout.
    #[error("{0}")]
    Validation(String),

    /// The route file is not valid TypeScript.
    #[error("Could not parse {}: {message}", .path.display())]
    Parse { path: PathBuf, message: String },

    /// No template directory with that name under the template root.
    #[error("Could not locate supplied template: {}", .dir.display())]
    TemplateNotFound { name: String, dir: PathBuf },

    /// The mutated tree could not be regenerated.
    #[error("Route injection failed: {0}")]
    Injection(String),

    /// A child process (npm, yarn, node, tar) exited unsuccessfully.
    #[error("`{command}` has failed.")]
    Process { command: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Download failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Prompt failed: {0}")]
    Prompt(#[from] dialoguer::Error),
}

impl Error {
    pub fn validation(msg: impl Into<String>) -> Self {
        Error::Validation(msg.into())
    }

    /// Whether the failure happened in an external process; the scaffolding
    /// tool rolls back generated files for these.
    pub fn is_process(&self) -> bool {
        matches!(self, Error::Process { .. })
    }
}

pub type Result<T> = std::result::Result<T, Error>;
