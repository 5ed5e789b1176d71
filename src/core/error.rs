use rusqlite;
use std::io;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum WardenError {
    #[error("SQLite error: {0}")]
    Persistence(#[from] rusqlite::Error),
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("Configuration missing: {0}")]
    ConfigurationMissing(String),
    #[error("Validation error: {0}")]
    ValidationError(String),
    #[error("Not found: {0}")]
    NotFound(String),
}
