use thiserror::Error;

use crate::dom::DomError;

#[derive(Error, Debug)]
pub enum FormError {
    #[error("document error: {0}")]
    Dom(#[from] DomError),

    #[error("config error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("form runtime is no longer running")]
    RuntimeClosed,
}

pub type Result<T> = std::result::Result<T, FormError>;
