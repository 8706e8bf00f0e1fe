use std::fmt;
use std::io;
use std::num::ParseIntError;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum BackupError {
    #[error("{0}")]
    Config(#[from] ConfigError),
    #[error("sync failed: {0}")]
    Sync(CommandFailure),
    #[error("compression failed: {0}")]
    Compression(CommandFailure),
    #[error("{0}")]
    Io(#[from] io::Error),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} is not set")]
    Missing(&'static str),
    #[error("SMTP_PORT {value:?} is not a valid port: {source}")]
    InvalidPort {
        value: String,
        #[source]
        source: ParseIntError,
    },
}

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("invalid address {0}")]
    Address(#[from] lettre::address::AddressError),
    #[error("build message: {0}")]
    Message(#[from] lettre::error::Error),
    #[error("smtp: {0}")]
    Transport(#[from] lettre::transport::smtp::Error),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandFailure {
    pub program: String,
    pub status: Option<i32>,
    pub detail: String,
}

impl CommandFailure {
    pub fn spawn(program: impl Into<String>, err: &io::Error) -> Self {
        CommandFailure {
            program: program.into(),
            status: None,
            detail: err.to_string(),
        }
    }
}

impl fmt::Display for CommandFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.status {
            Some(code) => write!(f, "{} exited with status {}", self.program, code)?,
            None => write!(f, "{} did not complete", self.program)?,
        }
        let detail = self.detail.trim();
        if !detail.is_empty() {
            write!(f, ": {}", detail)?;
        }
        Ok(())
    }
}

pub type Result<T> = std::result::Result<T, BackupError>;
