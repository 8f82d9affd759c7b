/// Convenience result type used across kaleido.
pub type KaleidoResult<T> = Result<T, KaleidoError>;

/// Top-level error taxonomy used by engine and scheduler APIs.
#[derive(thiserror::Error, Debug)]
pub enum KaleidoError {
    /// Mode tag outside the known set. Never defaulted.
    #[error("invalid mode: {0}")]
    InvalidMode(String),

    /// Caller-provided value outside its documented range.
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// Numeric fault while transforming (e.g. non-finite sampling coordinates).
    #[error("compute error: {0}")]
    Compute(String),

    /// Errors when serializing or deserializing parameter data.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl KaleidoError {
    /// Build a [`KaleidoError::InvalidMode`] value.
    pub fn invalid_mode(msg: impl Into<String>) -> Self {
        Self::InvalidMode(msg.into())
    }

    /// Build a [`KaleidoError::InvalidParameter`] value.
    pub fn invalid_parameter(msg: impl Into<String>) -> Self {
        Self::InvalidParameter(msg.into())
    }

    /// Build a [`KaleidoError::Compute`] value.
    pub fn compute(msg: impl Into<String>) -> Self {
        Self::Compute(msg.into())
    }

    /// Build a [`KaleidoError::Serde`] value.
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }
}

impl From<serde_json::Error> for KaleidoError {
    fn from(e: serde_json::Error) -> Self {
        Self::serde(e.to_string())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
