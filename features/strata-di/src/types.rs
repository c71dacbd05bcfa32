use std::{any::Any, fmt::Debug, sync::Arc};

/// Errors returned by factories
pub type DynError = Box<dyn std::error::Error + Send + Sync>;

/// Values are shared between execution contexts
/// So anything injectable needs to be Send + Sync + 'static
pub trait Injectable: Send + Sync + 'static {}
impl<T: Send + Sync + 'static> Injectable for T {}

/// A type-erased, shared value produced by an injectable
#[derive(Clone)]
pub struct Instance {
    pub type_name: &'static str,
    pub instance: Arc<dyn Any + Send + Sync + 'static>,
}
impl Debug for Instance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("Instance").field(&self.type_name).finish()
    }
}

impl Instance {
    pub fn new<T: Injectable>(instance: T) -> Self {
        Self::from_arc(Arc::new(instance))
    }

    pub fn from_arc<T: Injectable>(instance: Arc<T>) -> Self {
        Instance {
            type_name: std::any::type_name::<T>(),
            instance,
        }
    }

    /// Returns the shared value, or the stored type name if it is not a `T`
    pub fn downcast<T: Injectable>(&self) -> Result<Arc<T>, &'static str> {
        match Arc::downcast::<T>(self.instance.clone()) {
            Ok(downcasted) => Ok(downcasted),
            Err(_) => Err(self.type_name),
        }
    }

    /// True if both point to the same value
    pub fn ptr_eq(&self, other: &Instance) -> bool {
        Arc::ptr_eq(&self.instance, &other.instance)
    }
}

/// Marks a parameter as "to be injected"
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Injected;

/// Shorthand for [Injected]
pub const IN: Injected = Injected;

/// What a parameter falls back to when the caller does not supply it
#[derive(Debug, Clone)]
pub enum ParamDefault {
    /// The caller must supply it
    NoDefault,
    /// Resolved from the scope stack
    Injected,
    /// A plain default value
    Value(Instance),
}
impl From<Injected> for ParamDefault {
    fn from(_: Injected) -> Self {
        ParamDefault::Injected
    }
}
impl ParamDefault {
    pub fn is_injected(&self) -> bool {
        matches!(self, ParamDefault::Injected)
    }
}

/// A single declared parameter of a callable
#[derive(Debug, Clone)]
pub struct Param {
    pub name: String,
    pub default: ParamDefault,
}

/// The declared parameters of a callable, in declaration order
///
/// This is what a reflection layer hands over for every factory or injected callable.
#[derive(Debug, Clone, Default)]
pub struct Signature {
    params: Vec<Param>,
}

impl Signature {
    pub fn new() -> Self {
        Self::default()
    }

    /// A signature where every parameter is injected
    pub fn injected<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        names
            .into_iter()
            .fold(Self::new(), |signature, name| signature.inject(name))
    }

    pub fn param(mut self, name: impl Into<String>, default: impl Into<ParamDefault>) -> Self {
        self.params.push(Param {
            name: name.into(),
            default: default.into(),
        });
        self
    }

    pub fn inject(self, name: impl Into<String>) -> Self {
        self.param(name, IN)
    }

    pub fn required(self, name: impl Into<String>) -> Self {
        self.param(name, ParamDefault::NoDefault)
    }

    pub fn with_default<T: Injectable>(self, name: impl Into<String>, value: T) -> Self {
        self.param(name, ParamDefault::Value(Instance::new(value)))
    }

    pub fn params(&self) -> &[Param] {
        &self.params
    }

    /// Names of all injected parameters, in declaration order
    pub fn dependencies(&self) -> impl Iterator<Item = &str> {
        self.params
            .iter()
            .filter(|param| param.default.is_injected())
            .map(|param| param.name.as_str())
    }

    /// Parameters which would have to be supplied by someone other than the container
    pub fn not_injected(&self) -> impl Iterator<Item = &str> {
        self.params
            .iter()
            .filter(|param| !param.default.is_injected())
            .map(|param| param.name.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn it_lists_injected_params_in_order() {
        let signature = Signature::new()
            .inject("greet")
            .required("request")
            .inject("user")
            .with_default("suffix", "!");

        let deps: Vec<_> = signature.dependencies().collect();
        let others: Vec<_> = signature.not_injected().collect();

        assert_eq!(deps, ["greet", "user"]);
        assert_eq!(others, ["request", "suffix"]);
    }

    #[test]
    fn it_downcasts_instances() {
        let instance = Instance::new(42_u32);

        assert_eq!(*instance.downcast::<u32>().unwrap(), 42);
        assert_eq!(instance.downcast::<String>().unwrap_err(), "u32");
    }

    #[test]
    fn it_compares_instances_by_identity() {
        let a = Instance::new(String::from("a"));
        let b = a.clone();
        let c = Instance::new(String::from("a"));

        assert!(a.ptr_eq(&b));
        assert!(!a.ptr_eq(&c));
    }
}
