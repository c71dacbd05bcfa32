use std::{fmt::Debug, sync::Arc};

use crate::{
    args::Args,
    builder::Registration,
    errors::{InjectError, RegisterError},
    factories::{DynFactory, ValueFactory},
    types::{Instance, Signature},
};

/// A registered injectable
///
/// Immutable once created - a singleton's value is cached by the scope owning it, not here.
pub struct ProducerEntry {
    name: String,
    factory: Arc<dyn DynFactory>,
    dependencies: Vec<String>,
    singleton: bool,
    eager: bool,
}
impl Debug for ProducerEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProducerEntry")
            .field("name", &self.name)
            .field("supplies", &self.factory.supplies())
            .field("dependencies", &self.dependencies)
            .field("singleton", &self.singleton)
            .field("eager", &self.eager)
            .finish()
    }
}

impl ProducerEntry {
    /// Validates a registration - every factory parameter has to be injected
    pub(crate) fn new(registration: Registration) -> Result<Self, RegisterError> {
        let Registration {
            name,
            factory,
            singleton,
            eager,
        } = registration;

        let signature = factory.signature();
        let missing: Vec<String> = signature.not_injected().map(str::to_string).collect();
        if !missing.is_empty() {
            return Err(RegisterError::IncompleteInjectable { name, missing });
        }

        Ok(ProducerEntry {
            dependencies: collect_dependencies(&signature),
            name,
            factory,
            singleton,
            eager,
        })
    }

    /// A constant value - nothing to validate
    pub(crate) fn value(name: impl Into<String>, instance: Instance) -> Self {
        ProducerEntry {
            name: name.into(),
            factory: Arc::new(ValueFactory(instance)),
            dependencies: Vec::new(),
            singleton: false,
            eager: false,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn dependencies(&self) -> &[String] {
        &self.dependencies
    }

    pub fn is_singleton(&self) -> bool {
        self.singleton
    }

    pub fn is_eager(&self) -> bool {
        self.eager
    }

    pub fn supplies(&self) -> &'static str {
        self.factory.supplies()
    }

    /// Runs the factory with already filled in arguments
    pub(crate) fn produce(&self, args: &Args) -> Result<Instance, InjectError> {
        self.factory
            .construct(args)
            .map_err(|error| InjectError::from_factory(&self.name, error))
    }
}

fn collect_dependencies(signature: &Signature) -> Vec<String> {
    signature.dependencies().map(str::to_string).collect()
}
