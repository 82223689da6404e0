use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AppError {
    #[error("validation_error - {0}")]
    Validation(String),
    #[error("not_found - {0}")]
    NotFound(String),
    #[error("invalid_transition - {0}")]
    InvalidTransition(String),
    #[error("incomplete_data - {0}")]
    IncompleteData(String),
    #[error("invalid_data - {0}")]
    InvalidData(String),
    #[error("io_error - {0}")]
    Io(String),
}

impl AppError {
    pub fn validation<M: Into<String>>(message: M) -> Self {
        Self::Validation(message.into())
    }

    pub fn not_found<M: Into<String>>(message: M) -> Self {
        Self::NotFound(message.into())
    }

    pub fn invalid_transition<M: Into<String>>(message: M) -> Self {
        Self::InvalidTransition(message.into())
    }

    pub fn incomplete_data<M: Into<String>>(message: M) -> Self {
        Self::IncompleteData(message.into())
    }

    pub fn invalid_data<M: Into<String>>(message: M) -> Self {
        Self::InvalidData(message.into())
    }

    pub fn io<M: Into<String>>(message: M) -> Self {
        Self::Io(message.into())
    }

    pub fn code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "validation_error",
            Self::NotFound(_) => "not_found",
            Self::InvalidTransition(_) => "invalid_transition",
            Self::IncompleteData(_) => "incomplete_data",
            Self::InvalidData(_) => "invalid_data",
            Self::Io(_) => "io_error",
        }
    }

    pub fn message(&self) -> &str {
        match self {
            Self::Validation(message)
            | Self::NotFound(message)
            | Self::InvalidTransition(message)
            | Self::IncompleteData(message)
            | Self::InvalidData(message)
            | Self::Io(message) => message,
        }
    }

    /// Errors a caller can fix by changing its request, as opposed to a broken store.
    pub fn is_caller_error(&self) -> bool {
        !matches!(self, Self::InvalidData(_) | Self::Io(_))
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::AppError;

    #[test]
    fn display_renders_code_and_message() {
        let err = AppError::not_found("task not found");
        assert_eq!(err.to_string(), "not_found - task not found");
        assert_eq!(err.message(), "task not found");
    }

    #[test]
    fn caller_errors_exclude_storage_failures() {
        assert!(AppError::validation("title is required").is_caller_error());
        assert!(AppError::incomplete_data("start date is required").is_caller_error());
        assert!(!AppError::invalid_data("schema_version mismatch").is_caller_error());
        assert!(!AppError::io("disk full").is_caller_error());
    }
}
