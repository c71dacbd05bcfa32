use std::{
    collections::HashMap,
    fmt::{Debug, Display},
    sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard, Weak},
};

use indexmap::IndexMap;

use crate::{
    entry::ProducerEntry,
    errors::RegisterError,
    types::Instance,
};

/// Cache slot of a single singleton - `None` until it has been produced
pub(crate) type SingletonSlot = Mutex<Option<Instance>>;

/// One layer of injectables
///
/// A scope may be visible to several contexts at once (the root scope always is),
/// so entries and cached singletons are behind locks.
pub struct Scope {
    name: String,
    /// Only used for diagnostics, resolution walks the context's stack
    parent: Option<Weak<Scope>>,
    registry: RwLock<Registry>,
    singletons: Mutex<HashMap<String, Arc<SingletonSlot>>>,
}

#[derive(Default)]
struct Registry {
    entries: IndexMap<String, Arc<ProducerEntry>>,
    eagers: Vec<Arc<ProducerEntry>>,
}

impl Scope {
    pub(crate) fn root(name: impl Into<String>) -> Arc<Self> {
        Arc::new(Self::new(name, None))
    }

    pub(crate) fn nested(name: impl Into<String>, parent: &Arc<Scope>) -> Arc<Self> {
        Arc::new(Self::new(name, Some(Arc::downgrade(parent))))
    }

    fn new(name: impl Into<String>, parent: Option<Weak<Scope>>) -> Self {
        Scope {
            name: name.into(),
            parent,
            registry: RwLock::default(),
            singletons: Mutex::default(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn parent(&self) -> Option<Arc<Scope>> {
        self.parent.as_ref().and_then(Weak::upgrade)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.read().entries.contains_key(name)
    }

    pub fn lookup(&self, name: &str) -> Option<Arc<ProducerEntry>> {
        self.read().entries.get(name).cloned()
    }

    /// Registered names, in registration order
    pub fn names(&self) -> Vec<String> {
        self.read().entries.keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.read().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().entries.is_empty()
    }

    /// Returns true if this scope holds a produced value for the singleton `name`
    pub fn is_realized(&self, name: &str) -> bool {
        self.cached(name).is_some()
    }

    pub(crate) fn entries(&self) -> Vec<Arc<ProducerEntry>> {
        self.read().entries.values().cloned().collect()
    }

    /// Eager entries, in registration order
    pub(crate) fn eager_entries(&self) -> Vec<Arc<ProducerEntry>> {
        self.read().eagers.clone()
    }

    /// Adds an entry, failing if the name is already taken in this scope
    pub(crate) fn insert(&self, entry: ProducerEntry) -> Result<Arc<ProducerEntry>, RegisterError> {
        let mut registry = self.write();
        if registry.entries.contains_key(entry.name()) {
            return Err(RegisterError::NameConflict {
                name: entry.name().to_string(),
                scope: self.name.clone(),
            });
        }

        let entry = Arc::new(entry);
        if entry.is_eager() {
            registry.eagers.push(entry.clone());
        }
        registry
            .entries
            .insert(entry.name().to_string(), entry.clone());
        Ok(entry)
    }

    /// Adds or replaces an entry
    pub(crate) fn upsert(&self, entry: ProducerEntry) {
        let name = entry.name().to_string();
        let entry = Arc::new(entry);
        {
            let mut registry = self.write();
            registry.eagers.retain(|eager| eager.name() != name);
            if entry.is_eager() {
                registry.eagers.push(entry.clone());
            }
            registry.entries.insert(name.clone(), entry);
        }
        // The replaced entry's value must not be handed out anymore
        self.lock_singletons().remove(&name);
    }

    /// Returns the produced value of singleton `name`
    ///
    /// Blocks while another context is producing it.
    pub(crate) fn cached(&self, name: &str) -> Option<Instance> {
        let slot = self.lock_singletons().get(name).cloned()?;
        let value = slot.lock().unwrap_or_else(PoisonError::into_inner);
        value.clone()
    }

    /// Returns the cache slot for singleton `name`, creating an empty one if needed
    pub(crate) fn slot(&self, name: &str) -> Arc<SingletonSlot> {
        self.lock_singletons()
            .entry(name.to_string())
            .or_default()
            .clone()
    }

    fn read(&self) -> RwLockReadGuard<'_, Registry> {
        self.registry.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Registry> {
        self.registry.write().unwrap_or_else(PoisonError::into_inner)
    }

    fn lock_singletons(&self) -> MutexGuard<'_, HashMap<String, Arc<SingletonSlot>>> {
        self.singletons.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Debug for Scope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Scope")
            .field("name", &self.name)
            .field("parent", &self.parent().map(|parent| parent.name.clone()))
            .field("entries", &self.names())
            .finish()
    }
}

impl Display for Scope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Scope '{}':", self.name)?;
        let names = self.names();
        if names.is_empty() {
            return write!(f, "\n  None");
        }
        for name in names {
            write!(f, "\n  {name}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::Registration;

    fn entry(registration: Registration) -> ProducerEntry {
        ProducerEntry::new(registration).unwrap()
    }

    #[test]
    fn it_contains_registered_names() {
        let scope = Scope::root("Root");

        scope.insert(entry(Registration::value("val", 42))).unwrap();

        assert!(scope.contains("val"));
        assert!(!scope.contains("other"));
        assert_eq!(scope.lookup("val").unwrap().name(), "val");
    }

    #[test]
    fn it_rejects_duplicates_in_the_same_scope() {
        let scope = Scope::root("Root");
        scope.insert(entry(Registration::value("val", 42))).unwrap();

        let err = scope.insert(entry(Registration::value("val", 32))).unwrap_err();

        assert_eq!(
            err,
            RegisterError::NameConflict {
                name: "val".into(),
                scope: "Root".into()
            }
        );
    }

    #[test]
    fn it_keeps_registration_order() {
        let scope = Scope::root("Root");
        for name in ["c", "a", "b"] {
            scope.insert(entry(Registration::value(name, 0).eager())).unwrap();
        }

        let eagers: Vec<_> = scope
            .eager_entries()
            .iter()
            .map(|entry| entry.name().to_string())
            .collect();

        assert_eq!(scope.names(), ["c", "a", "b"]);
        assert_eq!(eagers, ["c", "a", "b"]);
    }

    #[test]
    fn it_caches_singletons_in_slots() {
        let scope = Scope::root("Root");
        assert!(!scope.is_realized("server"));

        *scope.slot("server").lock().unwrap() = Some(Instance::new(8000_u16));

        assert!(scope.is_realized("server"));
        assert!(scope.slot("server").lock().unwrap().is_some());
    }

    #[test]
    fn it_replaces_entries_on_upsert() {
        let scope = Scope::root("Test");
        scope.upsert(entry(Registration::value("val", 1)));
        scope.upsert(entry(Registration::value("val", 2)));

        assert_eq!(scope.len(), 1);
    }

    #[test]
    fn it_displays_its_names() {
        let root = Scope::root("Root");
        let nested = Scope::nested("handler", &root);
        root.insert(entry(Registration::value("app_name", "Hello"))).unwrap();
        root.insert(entry(Registration::value("port", 8000))).unwrap();

        assert_eq!(root.to_string(), "Scope 'Root':\n  app_name\n  port");
        assert_eq!(nested.to_string(), "Scope 'handler':\n  None");
        assert_eq!(nested.parent().unwrap().name(), "Root");
    }
}
