use std::{
    fmt::Debug,
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc, PoisonError, RwLock,
    },
};

use crate::{
    builder::Registration,
    context::Context,
    entry::ProducerEntry,
    errors::RegisterError,
    scope::Scope,
    stack::ScopeStack,
    types::Instance,
};

/// Settings of a [Container]
#[derive(Debug, Clone)]
pub struct ContainerConfig {
    /// Name of the root scope
    pub root_name: String,
    /// Whether the container starts out in test mode
    pub test_mode: bool,
}
impl Default for ContainerConfig {
    fn default() -> Self {
        ContainerConfig {
            root_name: "Root".to_string(),
            test_mode: false,
        }
    }
}
impl ContainerConfig {
    pub fn with_root_name(mut self, root_name: impl Into<String>) -> Self {
        self.root_name = root_name.into();
        self
    }

    pub fn with_test_mode(mut self, test_mode: bool) -> Self {
        self.test_mode = test_mode;
        self
    }
}

/// Owns the root scope and the test setup shared by every [Context]
///
/// Cheap to clone, clones share the same state.
#[derive(Clone)]
pub struct Container(Arc<ContainerInner>);
struct ContainerInner {
    root: Arc<Scope>,
    test_mode: AtomicBool,
    /// Only consulted in test mode
    test_scope: RwLock<Option<Arc<Scope>>>,
}
impl Debug for Container {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Container")
            .field("root", &self.0.root)
            .field("test_mode", &self.is_test_mode())
            .field("test_scope", &self.test_scope())
            .finish()
    }
}
impl Default for Container {
    fn default() -> Self {
        Self::new()
    }
}

impl Container {
    pub fn new() -> Self {
        Self::with_config(ContainerConfig::default())
    }

    pub fn with_config(config: ContainerConfig) -> Self {
        tracing::debug!("Creating container with root scope '{}'", config.root_name);
        Container(Arc::new(ContainerInner {
            root: Scope::root(config.root_name),
            test_mode: AtomicBool::new(config.test_mode),
            test_scope: RwLock::new(None),
        }))
    }

    pub fn root(&self) -> &Arc<Scope> {
        &self.0.root
    }

    /// A new execution context, seeing only the root scope
    pub fn context(&self) -> Context {
        Context::new(self.clone(), ScopeStack::new(self.0.root.clone()))
    }

    /// Adds an injectable to the root scope
    pub fn register(&self, registration: Registration) -> Result<(), RegisterError> {
        self.context().register(registration)
    }

    /// In test mode every resolution is served exclusively from the test overrides
    pub fn set_test_mode(&self, test_mode: bool) {
        tracing::debug!("Test mode: {test_mode}");
        self.0.test_mode.store(test_mode, Ordering::SeqCst);
    }

    pub fn is_test_mode(&self) -> bool {
        self.0.test_mode.load(Ordering::SeqCst)
    }

    /// Adds values served in test mode
    ///
    /// Repeated calls accumulate, a name given again replaces its earlier value.
    pub fn set_test_overrides<S: Into<String>>(
        &self,
        overrides: impl IntoIterator<Item = (S, Instance)>,
    ) {
        let scope = {
            let mut test_scope = self.0.test_scope.write().unwrap_or_else(PoisonError::into_inner);
            test_scope.get_or_insert_with(|| Scope::root("Test")).clone()
        };

        for (name, instance) in overrides {
            scope.upsert(ProducerEntry::value(name, instance));
        }
        tracing::debug!("Test overrides: {:?}", scope.names());
    }

    /// Drops every test override - resolving in test mode fails until new ones are set
    pub fn clear_test_overrides(&self) {
        *self.0.test_scope.write().unwrap_or_else(PoisonError::into_inner) = None;
    }

    pub(crate) fn test_scope(&self) -> Option<Arc<Scope>> {
        self.0
            .test_scope
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}
