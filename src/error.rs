use std::path::PathBuf;
use thiserror::Error;

/// Raised while building a tool; only that tool is dropped from the registry.
#[derive(Debug, Error)]
#[error("failed to initialize tool '{tool}': {details}")]
pub struct ToolInitError {
    pub tool: String,
    pub details: String,
}

impl ToolInitError {
    pub fn new(tool: impl Into<String>, details: impl Into<String>) -> Self {
        Self {
            tool: tool.into(),
            details: details.into(),
        }
    }
}

/// Recognized handler failures. Anything else reaching dispatch is reported
/// with its full diagnostic chain.
#[derive(Debug, Error)]
pub enum ToolError {
    #[error("missing argument, usage: {usage}")]
    MissingArgument { usage: String },
    #[error("invalid value \"{value}\" for {field}: {reason}")]
    InvalidArgument {
        field: String,
        value: String,
        reason: String,
    },
    #[error("{what} \"{name}\" doesn't exist in {}", .location.display())]
    NotFound {
        what: &'static str,
        name: String,
        location: PathBuf,
    },
    #[error("`{program}` is not available on this system ({hint})")]
    MissingProgram { program: String, hint: String },
    #[error("`{command}` exited with status {code}")]
    ExternalCommand { command: String, code: i32 },
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("reading config {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("parsing config {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("saving config {}: {reason}", .path.display())]
    Save { path: PathBuf, reason: String },
    #[error("unsupported encoding \"{0}\" (accepted: ascii, utf-8, utf-16, utf-32)")]
    InvalidEncoding(String),
    #[error("invalid value \"{value}\" for {property}")]
    InvalidValue { property: &'static str, value: String },
    #[error("unknown property \"{0}\"")]
    UnknownProperty(String),
}
