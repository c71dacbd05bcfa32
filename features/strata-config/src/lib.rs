//! Strata Config provides a registry of named configs that can be injected in the rest of the
//! application.
//!
//! Strata Config is split into two major parts:
//! 1. ConfigProvider: Used to create the registry of all configs and install it into a scope
//! 2. Config<T>: A wrapper type to read configs back from injected arguments
//!
//! # Examples
//!
//! ```rust
//! use strata_config::ConfigProvider;
//!
//! #[derive(Clone)]
//! struct AppConfig {
//!     host: String,
//!     port: u16,
//! }
//!
//! let mut config_provider = ConfigProvider::default();
//! config_provider
//!     .add_config("app", AppConfig { host: "localhost".to_string(), port: 8080 })
//!     .unwrap();
//!
//! let retrieved = config_provider.get_config::<AppConfig>("app").unwrap().unwrap();
//! assert_eq!(retrieved.host, "localhost");
//! assert_eq!(retrieved.port, 8080);
//! ```

pub mod config;
pub mod errors;
pub mod provider;

pub use config::Config;
pub use errors::ConfigError;
pub use provider::ConfigProvider;
