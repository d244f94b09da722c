//! Error types for DishaNav

use thiserror::Error;

/// DishaNav error type
///
/// Expected "nothing detected" outcomes in the vision pipeline are `Option`,
/// never errors. Errors here stop the vehicle: actuation faults are not
/// retried because an open-loop motion command cannot be safely replayed.
#[derive(Error, Debug)]
pub enum DishaError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Actuation fault: {0}")]
    Actuation(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<toml::de::Error> for DishaError {
    fn from(e: toml::de::Error) -> Self {
        DishaError::Config(e.to_string())
    }
}

impl From<toml::ser::Error> for DishaError {
    fn from(e: toml::ser::Error) -> Self {
        DishaError::Config(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, DishaError>;
