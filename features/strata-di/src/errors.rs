use std::sync::Arc;

use thiserror::Error;

use crate::types::DynError;

/// Errors when registering an injectable
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegisterError {
    /// The name is already visible on the active scope stack
    #[error("Injectable '{name}' already exists in scope '{scope}'")]
    NameConflict { name: String, scope: String },
    /// Some factory parameters are not injected
    #[error("Injectables must be fully injected - '{name}' does not inject {missing:?}")]
    IncompleteInjectable { name: String, missing: Vec<String> },
}

/// Errors when trying to require a certain name
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RequireError {
    /// No visible scope provides the name
    #[error("The injectable named '{0}' was not found")]
    InjectionMissing(String),
    /// Resolution was attempted in test mode without test injections
    #[error("Test injections have not been set up")]
    TestScopeNotConfigured,
    /// A parameter was read which was never filled in by the resolver
    #[error("'{0}' was never injected - it did not go through the container")]
    InjectionNotPerformed(String),
    /// A parameter was read in test mode which was neither supplied nor overridden
    #[error("Injection of '{0}' was expected in test mode")]
    TestInjectionsNotSetup(String),
    /// The caller explicitly supplied no value
    #[error("'{0}' was supplied without a value")]
    EmptyValue(String),
    /// A plain parameter without default was not supplied
    #[error("Argument '{0}' is required but was not supplied")]
    ArgumentMissing(String),
    #[error("Failed to downcast '{name}', required: '{required_type}' actual: '{actual_type}'")]
    DowncastFailed {
        name: String,
        required_type: &'static str,
        actual_type: &'static str,
    },
    /// The name is already being resolved further up in the same context
    #[error("'{name}' is required while it is being resolved through {chain:?}")]
    ReentrantResolution { name: String, chain: Vec<String> },
    /// The scope is not on the stack of the resolving context
    #[error("Scope '{0}' is not active in this context")]
    ScopeNotActive(String),
}

#[derive(Error, Debug, Clone)]
pub enum InjectError {
    /// Could not require a name
    #[error(transparent)]
    RequireError(#[from] RequireError),
    /// A factory failed to build
    #[error("Factory for '{name}' failed - error: {error}")]
    FactoryFailed { name: String, error: Arc<DynError> },
}

impl InjectError {
    /// Wraps an error returned by the factory of `name`
    ///
    /// Injection errors raised inside a factory are passed through unchanged.
    pub(crate) fn from_factory(name: &str, error: DynError) -> Self {
        let error = match error.downcast::<InjectError>() {
            Ok(inject) => return *inject,
            Err(error) => error,
        };
        match error.downcast::<RequireError>() {
            Ok(require) => InjectError::RequireError(*require),
            Err(error) => InjectError::FactoryFailed {
                name: name.to_string(),
                error: Arc::new(error),
            },
        }
    }

    /// The underlying [RequireError], if this is one
    pub fn as_require(&self) -> Option<&RequireError> {
        match self {
            InjectError::RequireError(e) => Some(e),
            InjectError::FactoryFailed { .. } => None,
        }
    }

    /// True if this is an [RequireError::InjectionMissing] for any name
    pub fn is_missing(&self) -> bool {
        matches!(self.as_require(), Some(RequireError::InjectionMissing(_)))
    }
}
