use crate::application::TransportError;
use crate::config::SettingsError;
use crate::domain::LoadError;
use thiserror::Error;

/// Fatal errors that stop the server from starting or running
#[derive(Error, Debug)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(#[from] SettingsError),

    #[error(transparent)]
    Load(#[from] LoadError),

    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
