//! Error types for the hubkit event runtime
//!
//! Errors are grouped by the API surface that reports them: registration
//! outcomes, shared-state operation failures, and runtime-level failures.
//! They are always delivered to the nearest caller or callback and never
//! stored as latent state.

use thiserror::Error;

// ----------------------------------------------------------------------------
// Registration Errors
// ----------------------------------------------------------------------------

/// Outcome of a failed extension registration or unregistration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum RegistrationError {
    #[error("extension declared an empty or blank name")]
    InvalidExtensionName,
    #[error("an extension with the same name is already registered")]
    DuplicateExtensionName,
    #[error("extension failed to initialize")]
    ExtensionInitializationFailure,
    #[error("no extension is registered under the given name")]
    ExtensionNotRegistered,
    #[error("registration failed for an unknown reason")]
    Unknown,
}

// ----------------------------------------------------------------------------
// Extension Errors
// ----------------------------------------------------------------------------

/// Failure reported by shared-state operations and extension hooks.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExtensionError {
    #[error("extension name is missing, blank, or unknown")]
    BadName,
    #[error("unexpected extension error: {0}")]
    UnexpectedError(String),
}

// ----------------------------------------------------------------------------
// Hub Errors
// ----------------------------------------------------------------------------

/// Runtime-level failure surfaced to hub callers and response listeners.
#[derive(Debug, Error)]
pub enum HubError {
    /// A response listener's deadline elapsed before a matching response.
    #[error("response listener timed out")]
    CallbackTimeout,
    /// The hub has shut down and no longer accepts work.
    #[error("the event hub has shut down")]
    ShutDown,
    #[error(transparent)]
    Registration(#[from] RegistrationError),
    #[error(transparent)]
    Extension(#[from] ExtensionError),
}

pub type HubResult<T> = Result<T, HubError>;

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registration_error_display() {
        assert_eq!(
            RegistrationError::DuplicateExtensionName.to_string(),
            "an extension with the same name is already registered"
        );
    }

    #[test]
    fn test_hub_error_wraps_extension_error() {
        let err: HubError = ExtensionError::BadName.into();
        assert_eq!(err.to_string(), ExtensionError::BadName.to_string());
    }
}
