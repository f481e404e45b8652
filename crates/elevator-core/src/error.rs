use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("URL parsing error: {0}")]
    UrlParse(#[from] url::ParseError),

    #[error("Audio error: {0}")]
    Audio(String),

    #[error("Sound source not found: {0}")]
    SoundNotFound(String),
}

pub type Result<T> = std::result::Result<T, Error>;
