use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("database is not connected ({path})")]
    NotConnected { path: PathBuf },
    #[error(transparent)]
    Sqlite(#[from] rusqlite::Error),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to encode settings: {0}")]
    Encode(#[from] serde_json::Error),
}

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("error loading '{path}': {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("error loading '{path}': {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Presence-only form checks. The message is shown to the user as is.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Please fill in all fields before {action}.")]
    Incomplete { action: &'static str },
    #[error("Please select a supervisor to {action}.")]
    NoSelection { action: &'static str },
    #[error("Please complete all fields.")]
    MissingConstraintFields,
    #[error("{field} must be a date in YYYY-MM-DD format.")]
    BadDate { field: &'static str },
}

#[derive(Debug, Error)]
pub enum SupervisorError {
    #[error(transparent)]
    Invalid(#[from] ValidationError),
    #[error(transparent)]
    Gateway(#[from] GatewayError),
    #[error("no supervisor matched rfid '{0}'")]
    NoMatch(String),
    #[error("unexpected supervisor row: {0}")]
    Decode(#[from] serde_json::Error),
}

#[derive(Debug, Error)]
pub enum ScreenError {
    #[error("no screen is mounted")]
    NoActiveScreen,
    #[error("unknown action '{0}'")]
    UnknownAction(String),
    #[error("{0}")]
    Panicked(String),
}
