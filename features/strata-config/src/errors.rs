use strata_di::RegisterError;

/// Errors when registering or reading a config
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// A config with the same name is already registered
    #[error("A config named '{0}' is already registered")]
    AlreadyRegistered(String),
    /// The config exists but holds another type
    #[error("Config '{name}' is a '{actual_type}', not a '{required_type}'")]
    DowncastFailed {
        name: String,
        required_type: &'static str,
        actual_type: &'static str,
    },
    /// Installing a config as injectable failed
    #[error(transparent)]
    Register(#[from] RegisterError),
}
