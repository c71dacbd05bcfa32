use std::{any::type_name, fmt::Debug, sync::Arc};

use indexmap::IndexMap;

use crate::{
    errors::RequireError,
    resolver::Extract,
    types::{Injectable, Instance},
};

/// Named arguments for a callable
///
/// Callers fill in the values they want to supply themselves, the resolver fills in the rest.
/// A value that is present but empty was deliberately supplied as "nothing" and is never resolved.
#[derive(Clone, Default)]
pub struct Args {
    values: IndexMap<String, Option<Instance>>,
    test_mode: bool,
}
impl Debug for Args {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut map = f.debug_map();
        for (name, value) in &self.values {
            map.entry(name, &value.as_ref().map(|instance| instance.type_name));
        }
        map.finish()
    }
}

impl Args {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with<T: Injectable>(self, name: impl Into<String>, value: T) -> Self {
        self.with_instance(name, Instance::new(value))
    }

    pub fn with_instance(mut self, name: impl Into<String>, instance: Instance) -> Self {
        self.insert(name, Some(instance));
        self
    }

    /// Supplies `name` explicitly without a value
    pub fn with_empty(mut self, name: impl Into<String>) -> Self {
        self.insert(name, None);
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, value: Option<Instance>) {
        self.values.insert(name.into(), value);
    }

    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    /// Raw access to a filled in argument
    ///
    /// Fails if `name` was never filled in, so a missed injection never looks like an empty value.
    pub fn instance(&self, name: &str) -> Result<Option<&Instance>, RequireError> {
        match self.values.get(name) {
            Some(value) => Ok(value.as_ref()),
            None if self.test_mode => Err(RequireError::TestInjectionsNotSetup(name.to_string())),
            None => Err(RequireError::InjectionNotPerformed(name.to_string())),
        }
    }

    pub fn get<T: Injectable>(&self, name: &str) -> Result<Arc<T>, RequireError> {
        self.extract(name)
    }

    /// Like [Args::get], but an explicitly empty value is `None`
    pub fn get_opt<T: Injectable>(&self, name: &str) -> Result<Option<Arc<T>>, RequireError> {
        self.instance(name)?
            .map(|instance| downcast(name, instance))
            .transpose()
    }

    pub fn extract<E: Extract>(&self, name: &str) -> Result<E, RequireError> {
        E::extract(self, name)
    }

    pub(crate) fn set_test_mode(&mut self, test_mode: bool) {
        self.test_mode = test_mode;
    }
}

pub(crate) fn downcast<T: Injectable>(name: &str, instance: &Instance) -> Result<Arc<T>, RequireError> {
    instance
        .downcast()
        .map_err(|actual_type| RequireError::DowncastFailed {
            name: name.to_string(),
            required_type: type_name::<T>(),
            actual_type,
        })
}
