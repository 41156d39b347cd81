use thiserror::Error;

#[derive(Debug, Error)]
pub enum SeamError {
    #[error("{tool}: {reason}")]
    InvalidArgument { tool: &'static str, reason: String },

    #[error("invalid subject id '{0}': must be filesystem-safe (letters, digits, '.', '_', '-')")]
    InvalidSubjectId(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),
}

impl SeamError {
    pub(crate) fn invalid(tool: &'static str, reason: impl Into<String>) -> Self {
        SeamError::InvalidArgument {
            tool,
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, SeamError>;
