use std::sync::Arc;

use crate::{
    args::Args,
    factories::{DynFactory, FnFactory, InstanceFactory, ValueFactory},
    types::{DynError, Injectable, Instance, Signature},
};

/// Describes an injectable before it is added to a scope
///
/// ```
/// use strata_di::{Args, Container, Registration, RequireError, Signature};
///
/// let container = Container::new();
/// let ctx = container.context();
///
/// ctx.register(Registration::value("port", 8000_u16)).unwrap();
/// ctx.register(
///     Registration::from_fn("address", Signature::injected(["port"]), |args: &Args| {
///         Ok::<_, RequireError>(format!("localhost:{}", args.get::<u16>("port")?))
///     })
///     .singleton(),
/// )
/// .unwrap();
///
/// let address = ctx.get::<String>("address").unwrap();
/// assert_eq!(address.as_str(), "localhost:8000");
/// ```
#[derive(Clone)]
pub struct Registration {
    pub(crate) name: String,
    pub(crate) factory: Arc<dyn DynFactory>,
    pub(crate) singleton: bool,
    pub(crate) eager: bool,
}
impl std::fmt::Debug for Registration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registration")
            .field("name", &self.name)
            .field("supplies", &self.factory.supplies())
            .field("singleton", &self.singleton)
            .field("eager", &self.eager)
            .finish()
    }
}

impl Registration {
    /// Registers `factory` under `name`
    pub fn factory<Factory: InstanceFactory + 'static>(name: impl Into<String>, factory: Factory) -> Self {
        Self::dyn_factory(name, Arc::new(factory))
    }

    pub fn dyn_factory(name: impl Into<String>, factory: Arc<dyn DynFactory>) -> Self {
        Registration {
            name: name.into(),
            factory,
            singleton: false,
            eager: false,
        }
    }

    /// Registers a closure, receiving the injected parameters of `signature`
    pub fn from_fn<F, T, E>(name: impl Into<String>, signature: Signature, f: F) -> Self
    where
        F: Fn(&Args) -> Result<T, E> + Send + Sync + 'static,
        T: Injectable,
        E: Into<DynError> + 'static,
    {
        Self::factory(name, FnFactory::new(signature, f))
    }

    /// Registers a constant value
    pub fn value<T: Injectable>(name: impl Into<String>, value: T) -> Self {
        Self::instance(name, Instance::new(value))
    }

    pub fn instance(name: impl Into<String>, instance: Instance) -> Self {
        Self::dyn_factory(name, Arc::new(ValueFactory(instance)))
    }

    /// Caches the produced value for the lifetime of its owning scope
    pub fn singleton(mut self) -> Self {
        self.singleton = true;
        self
    }

    /// A singleton which is produced during warmup instead of on first use
    pub fn eager(mut self) -> Self {
        self.eager = true;
        self.singleton()
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::convert::Infallible;

    #[test]
    fn it_registers_plain_factories() {
        let registration = Registration::from_fn("user", Signature::new(), |_: &Args| {
            Ok::<_, Infallible>(String::from("Anonymous"))
        });

        assert_eq!(registration.name(), "user");
        assert!(!registration.singleton);
        assert!(!registration.eager);
    }

    #[test]
    fn it_marks_eager_as_singleton() {
        let registration = Registration::value("port", 8000_u16).eager();

        assert!(registration.singleton);
        assert!(registration.eager);
    }
}
