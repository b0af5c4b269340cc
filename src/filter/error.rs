use thiserror::Error;

/// Errors raised by filter entities and the registry
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FilterError {
    /// Malformed filter schema; fatal while building the registry
    #[error("Configuration error: {0}")]
    Configuration(String),
    /// Bad user-supplied value; the filter keeps its previous committed state
    #[error("Invalid value: {0}")]
    Validation(String),
    #[error("Unknown filter: {0}")]
    UnknownFilter(String),
}

impl FilterError {
    pub fn validation(msg: impl Into<String>) -> Self {
        FilterError::Validation(msg.into())
    }

    pub fn configuration(msg: impl Into<String>) -> Self {
        FilterError::Configuration(msg.into())
    }
}
