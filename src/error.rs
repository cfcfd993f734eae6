use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Dispatch(#[from] DispatchError),
    #[error(transparent)]
    Sender(#[from] SenderError),
    #[error("telemetry initialization failed: {0}")]
    Telemetry(String),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to parse configuration: {0}")]
    Parse(String),
    #[error("invalid configuration for {field}: {message}")]
    InvalidField {
        field: &'static str,
        message: String,
    },
    #[error("configuration error: {0}")]
    Other(String),
}

/// Failure reported by an execution-module collaborator.
///
/// The reconciler never lets one of these escape: it is folded into the
/// `comment` of a `result: false` state record.
#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("{function} failed: {message}")]
    Call {
        function: &'static str,
        message: String,
    },
    #[error("no natural key known for object type {object}")]
    UnknownObjectType { object: String },
    #[error("malformed response from {function}: {message}")]
    Malformed {
        function: &'static str,
        message: String,
    },
}

#[derive(Debug, Error)]
pub enum SenderError {
    #[error("no zabbix_sender installation found")]
    Unavailable,
    #[error("{role} path does not exist: {path}")]
    MissingPath { role: &'static str, path: PathBuf },
}
