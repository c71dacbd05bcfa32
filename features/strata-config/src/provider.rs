use std::{any::type_name, sync::Arc};

use indexmap::IndexMap;
use strata_di::{Context, Injectable, Instance, RegisterError, Registration};

use crate::errors::ConfigError;

/// A registry of named configs
///
/// Configs can be registered and retrieved by name, and installed into a scope
/// where every config becomes a value injectable of the same name.
#[derive(Default, Clone, Debug)]
pub struct ConfigProvider {
    configs: IndexMap<String, Instance>,
}

impl ConfigProvider {
    /// Initializes an empty Config Provider
    pub fn new() -> Self {
        Self::default()
    }

    /// Retrieve the config named `name`
    ///
    /// Returns `Ok(None)` if no such config exists, and a [`ConfigError`] if it is not a `T`
    pub fn get_config<T: Injectable>(&self, name: &str) -> Result<Option<Arc<T>>, ConfigError> {
        self.configs
            .get(name)
            .map(|instance| instance.downcast::<T>())
            .transpose()
            .map_err(|actual_type| ConfigError::DowncastFailed {
                name: name.to_string(),
                required_type: type_name::<T>(),
                actual_type,
            })
    }

    /// Add a config to the registry.
    ///
    /// If the name is already taken, it will return a [`ConfigError`] runtime error
    pub fn add_config<T: Injectable>(
        &mut self,
        name: impl Into<String>,
        config: T,
    ) -> Result<&mut Self, ConfigError> {
        let name = name.into();
        if self.configs.contains_key(&name) {
            return Err(ConfigError::AlreadyRegistered(name));
        }

        self.configs.insert(name, Instance::new(config));
        Ok(self)
    }

    /// Can optionally add a config to the registry.
    ///
    /// If the config provided is `Some(T)`, it will be the same as calling [`ConfigProvider::add_config`]
    /// If the config provided is `None`, then the function just returns `Ok(self)` for chaining
    pub fn maybe_add_config<T: Injectable>(
        &mut self,
        name: impl Into<String>,
        config: Option<T>,
    ) -> Result<&mut Self, ConfigError> {
        match config {
            Some(c) => self.add_config(name, c),
            None => Ok(self),
        }
    }

    /// Names of all configs, in registration order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.configs.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.configs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.configs.is_empty()
    }

    /// Registers every config in the innermost scope of `ctx`
    ///
    /// Nothing is installed if any name is already visible from `ctx`.
    pub fn install(&self, ctx: &Context) -> Result<(), ConfigError> {
        let stack = ctx.stack();
        for name in self.configs.keys() {
            if let Some(scope) = stack.iter().find(|scope| scope.contains(name)) {
                return Err(RegisterError::NameConflict {
                    name: name.clone(),
                    scope: scope.name().to_string(),
                }
                .into());
            }
        }

        for (name, config) in &self.configs {
            ctx.register(Registration::instance(name.clone(), config.clone()))?;
        }
        tracing::debug!(
            "Installed {} configs into scope '{}'",
            self.configs.len(),
            ctx.current_scope().name()
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use strata_di::Container;

    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    struct AppConfig {
        host: String,
        port: u16,
    }

    fn app_config() -> AppConfig {
        AppConfig {
            host: "localhost".to_string(),
            port: 8080,
        }
    }

    #[test]
    fn it_retrieves_added_configs() {
        let mut provider = ConfigProvider::new();
        provider.add_config("app", app_config()).unwrap();

        let config = provider.get_config::<AppConfig>("app").unwrap().unwrap();

        assert_eq!(*config, app_config());
        assert!(provider.get_config::<AppConfig>("other").unwrap().is_none());
    }

    #[test]
    fn it_rejects_duplicate_names() {
        let mut provider = ConfigProvider::new();
        provider.add_config("app", app_config()).unwrap();

        let err = provider.add_config("app", app_config()).unwrap_err();

        assert_eq!(err, ConfigError::AlreadyRegistered("app".into()));
    }

    #[test]
    fn it_skips_missing_optional_configs() {
        let mut provider = ConfigProvider::new();
        provider
            .maybe_add_config("app", Some(app_config()))
            .unwrap()
            .maybe_add_config::<u16>("port", None)
            .unwrap();

        assert_eq!(provider.names().collect::<Vec<_>>(), ["app"]);
    }

    #[test]
    fn it_reports_wrong_types() {
        let mut provider = ConfigProvider::new();
        provider.add_config("port", 8080_u16).unwrap();

        let err = provider.get_config::<String>("port").unwrap_err();

        assert!(matches!(err, ConfigError::DowncastFailed { actual_type: "u16", .. }));
    }

    #[test]
    fn it_installs_configs_as_injectables() {
        let mut provider = ConfigProvider::new();
        provider.add_config("app", app_config()).unwrap();
        let container = Container::new();
        let ctx = container.context();

        provider.install(&ctx).unwrap();

        assert_eq!(ctx.get::<AppConfig>("app").unwrap().port, 8080);
        assert!(matches!(
            provider.install(&ctx),
            Err(ConfigError::Register(RegisterError::NameConflict { .. }))
        ));
    }

    #[test]
    fn it_installs_nothing_when_a_name_conflicts() {
        let mut provider = ConfigProvider::new();
        provider
            .add_config("app", app_config())
            .unwrap()
            .add_config("port", 8080_u16)
            .unwrap();
        let container = Container::new();
        let ctx = container.context();
        ctx.register(Registration::value("port", 9090_u16)).unwrap();

        let err = provider.install(&ctx).unwrap_err();

        assert_eq!(
            err,
            ConfigError::Register(RegisterError::NameConflict {
                name: "port".into(),
                scope: "Root".into(),
            })
        );
        assert!(!container.root().contains("app"));
    }
}
