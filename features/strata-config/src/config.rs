use std::{ops::Deref, sync::Arc};

use strata_di::{Args, Extract, Injectable, RequireError};

/// A wrapper type to allow for config injections
///
/// Configs installed by a [ConfigProvider](crate::provider::ConfigProvider) are plain value
/// injectables, `Config<T>` reads them back from filled in arguments.
///
/// # Example
/// ```rust
/// use strata_config::{Config, ConfigProvider};
/// use strata_di::{Args, Container, Inject, RequireError, Signature};
///
/// #[derive(Clone)]
/// pub struct ServerConfig {
///     port: u16,
/// }
///
/// let mut provider = ConfigProvider::new();
/// provider.add_config("server", ServerConfig { port: 8080 }).unwrap();
///
/// let container = Container::new();
/// let ctx = container.context();
/// provider.install(&ctx).unwrap();
///
/// let address = Inject::new(Signature::injected(["server"]), |args: &Args| {
///     let config: Config<ServerConfig> = args.extract("server")?;
///     Ok::<_, RequireError>(format!("0.0.0.0:{}", config.port))
/// });
///
/// assert_eq!(address.call(&ctx, Args::new()).unwrap().unwrap(), "0.0.0.0:8080");
/// ```
pub struct Config<T> {
    inner: Arc<T>,
}
impl<T> Deref for Config<T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}
impl<T> Config<T> {
    pub fn inner(&self) -> Arc<T> {
        self.inner.clone()
    }

    pub fn into_inner(self) -> Arc<T> {
        self.inner
    }
}

impl<T: Injectable> Extract for Config<T> {
    fn extract(args: &Args, name: &str) -> Result<Self, RequireError> {
        let inner = Arc::<T>::extract(args, name)?;
        Ok(Config { inner })
    }
}
