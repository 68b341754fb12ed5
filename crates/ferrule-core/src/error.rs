//! Error types for the Ferrule framework.

use thiserror::Error;

/// Errors a plugin (or the adapter on its behalf) can raise while handling a
/// host command.
///
/// None of these ever reach the host directly. The adapter logs them and
/// answers the host with the failure value of the command being handled.
#[derive(Debug, Error)]
pub enum PluginError {
    /// The plugin does not implement the requested operation.
    #[error("Unsupported operation: {0}")]
    Unsupported(&'static str),
    /// A host argument could not be converted into a domain value.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
    /// Plugin creation or state handling failed.
    #[error("State error: {0}")]
    State(String),
    /// Audio processing error.
    #[error("Processing error: {0}")]
    Processing(String),
    /// Editor/GUI error.
    #[error("Editor error: {0}")]
    Editor(String),
    /// Platform-specific error.
    #[error("Platform error: {0}")]
    Platform(String),
    /// The plugin panicked while handling a command.
    #[error("Plugin panicked: {0}")]
    Panic(String),
}

/// Result type for Ferrule operations.
pub type PluginResult<T> = Result<T, PluginError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = PluginError::Unsupported("double precision processing");
        assert_eq!(
            err.to_string(),
            "Unsupported operation: double precision processing"
        );

        let err = PluginError::InvalidArgument("null pointer".to_string());
        assert_eq!(err.to_string(), "Invalid argument: null pointer");

        let err = PluginError::Panic("boom".to_string());
        assert_eq!(err.to_string(), "Plugin panicked: boom");
    }
}
