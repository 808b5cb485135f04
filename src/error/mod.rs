pub mod handler_error;
pub mod parse_error;

use std::io;

use thiserror::Error as ThisError;

pub use handler_error::HandlerError;
pub use parse_error::ParseError;

#[derive(ThisError, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("serde_json error: {0}")]
    SerdeJsonError(#[from] serde_json::Error),

    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("plan error: {0}")]
    Parse(#[from] ParseError),

    #[error("handler error: {0}")]
    Handler(#[from] HandlerError),

    #[error("llm error: {0}")]
    Llm(String),

    #[error("config error: {0}")]
    Config(String),
}

pub type Result<T> = core::result::Result<T, Error>;
