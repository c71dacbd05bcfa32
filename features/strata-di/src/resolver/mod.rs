use std::{cell::RefCell, sync::PoisonError};

use crate::{
    args::Args,
    context::Context,
    dependency_graph::attachment_depth,
    errors::{InjectError, RequireError},
    stack::Located,
    types::Instance,
};

pub mod arc;

/// Typed access to a filled in argument
pub trait Extract: Sized {
    fn extract(args: &Args, name: &str) -> Result<Self, RequireError>;
}

impl Context {
    /// Fills in every name of `names` not already present in `supplied`
    ///
    /// Supplied values always win, even explicitly empty ones.
    /// Either every name is filled in or the first failure is returned.
    pub fn resolve<S: AsRef<str>>(
        &self,
        names: impl IntoIterator<Item = S>,
        supplied: Args,
    ) -> Result<Args, InjectError> {
        let test_mode = self.container.is_test_mode();
        let mut args = supplied;
        args.set_test_mode(test_mode);

        for name in names {
            let name = name.as_ref();
            if args.contains(name) {
                continue;
            }

            let instance = match test_mode {
                true => self.require_test_override(name)?,
                false => self.require(name)?,
            };
            args.insert(name, Some(instance));
        }

        Ok(args)
    }

    /// Resolves a single name from the scope stack
    pub(crate) fn require(&self, name: &str) -> Result<Instance, InjectError> {
        let located = self
            .locate(name)
            .ok_or_else(|| RequireError::InjectionMissing(name.to_string()))?;

        self.realize(&located)
    }

    /// In test mode only the test overrides are visible
    fn require_test_override(&self, name: &str) -> Result<Instance, InjectError> {
        let scope = self
            .container
            .test_scope()
            .ok_or(RequireError::TestScopeNotConfigured)?;
        let entry = scope
            .lookup(name)
            .ok_or_else(|| RequireError::InjectionMissing(name.to_string()))?;

        let mut args = Args::new();
        args.set_test_mode(true);
        entry.produce(&args)
    }

    pub(crate) fn locate(&self, name: &str) -> Option<Located> {
        let stack = self.stack.borrow();
        self.cache.borrow_mut().lookup(&stack, name)
    }

    /// Produces the value of an already located entry
    pub(crate) fn realize(&self, located: &Located) -> Result<Instance, InjectError> {
        let _resolving = ResolvingGuard::enter(&self.resolving, located.entry.name())?;

        match located.entry.is_singleton() {
            true => self.realize_singleton(located),
            false => self.invoke(located),
        }
    }

    fn invoke(&self, located: &Located) -> Result<Instance, InjectError> {
        let args = self.resolve(located.entry.dependencies(), Args::new())?;
        located.entry.produce(&args)
    }

    fn realize_singleton(&self, located: &Located) -> Result<Instance, InjectError> {
        let name = located.entry.name();

        if let Some(instance) = self.cached(located) {
            return Ok(instance);
        }

        let depth = attachment_depth(located, |dependency| self.locate(dependency))?;
        let owner = self
            .stack
            .borrow()
            .get(depth)
            .cloned()
            .ok_or_else(|| RequireError::InjectionMissing(name.to_string()))?;

        // Held while producing, so concurrent contexts wait for this value instead of creating their own
        let slot = owner.slot(name);
        let mut value = slot.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(instance) = value.as_ref() {
            return Ok(instance.clone());
        }

        let instance = self.invoke(located)?;
        tracing::debug!(
            "Attaching singleton '{name}' to scope '{}' at depth {depth}",
            owner.name()
        );
        *value = Some(instance.clone());

        Ok(instance)
    }

    /// Looks for an already produced value, from the defining scope inward
    ///
    /// Scopes further out can only hold values of other entries sharing the name.
    fn cached(&self, located: &Located) -> Option<Instance> {
        let scopes: Vec<_> = self
            .stack
            .borrow()
            .iter()
            .skip(located.depth)
            .cloned()
            .collect();

        scopes
            .iter()
            .find_map(|scope| scope.cached(located.entry.name()))
    }
}

/// Tracks the names currently being resolved by one context
struct ResolvingGuard<'a> {
    resolving: &'a RefCell<Vec<String>>,
}
impl<'a> ResolvingGuard<'a> {
    fn enter(resolving: &'a RefCell<Vec<String>>, name: &str) -> Result<Self, RequireError> {
        let mut chain = resolving.borrow_mut();
        if chain.iter().any(|resolving| resolving == name) {
            return Err(RequireError::ReentrantResolution {
                name: name.to_string(),
                chain: chain.clone(),
            });
        }

        chain.push(name.to_string());
        Ok(ResolvingGuard { resolving })
    }
}
impl Drop for ResolvingGuard<'_> {
    fn drop(&mut self) {
        self.resolving.borrow_mut().pop();
    }
}

#[cfg(test)]
mod tests {
    use std::{
        convert::Infallible,
        sync::{
            atomic::{AtomicUsize, Ordering},
            Arc,
        },
    };

    use crate::{
        args::Args, builder::Registration, container::Container, errors::RequireError,
        types::Signature,
    };

    fn counting(counter: &Arc<AtomicUsize>) -> impl Fn(&Args) -> Result<usize, Infallible> {
        let counter = counter.clone();
        move |_: &Args| Ok(counter.fetch_add(1, Ordering::SeqCst))
    }

    #[test]
    fn it_resolves_dependencies_recursively() {
        let container = Container::new();
        let ctx = container.context();
        ctx.register(Registration::value("greet", String::from("Hello")))
            .unwrap();
        ctx.register(Registration::value("user", String::from("Anonymous")))
            .unwrap();
        ctx.register(Registration::from_fn(
            "hello",
            Signature::injected(["greet", "user"]),
            |args: &Args| {
                Ok::<_, RequireError>(format!(
                    "{} {}",
                    args.get::<String>("greet")?,
                    args.get::<String>("user")?
                ))
            },
        ))
        .unwrap();

        let args = ctx.resolve(["hello"], Args::new()).unwrap();

        assert_eq!(args.get::<String>("hello").unwrap().as_str(), "Hello Anonymous");
    }

    #[test]
    fn it_skips_supplied_names() {
        let container = Container::new();
        let ctx = container.context();
        ctx.register(Registration::value("user", String::from("Anonymous")))
            .unwrap();

        let args = ctx
            .resolve(["user"], Args::new().with("user", String::from("Admin")))
            .unwrap();

        assert_eq!(args.get::<String>("user").unwrap().as_str(), "Admin");
    }

    #[test]
    fn it_does_not_resolve_explicitly_empty_names() {
        let container = Container::new();
        let ctx = container.context();

        let args = ctx.resolve(["user"], Args::new().with_empty("user")).unwrap();

        assert!(args.get_opt::<String>("user").unwrap().is_none());
    }

    #[test]
    fn it_creates_fresh_values_for_plain_factories() {
        let counter = Arc::new(AtomicUsize::new(0));
        let container = Container::new();
        let ctx = container.context();
        ctx.register(Registration::from_fn("id", Signature::new(), counting(&counter)))
            .unwrap();

        let first = ctx.get::<usize>("id").unwrap();
        let second = ctx.get::<usize>("id").unwrap();

        assert_eq!((*first, *second), (0, 1));
    }

    #[test]
    fn it_creates_singletons_once() {
        let counter = Arc::new(AtomicUsize::new(0));
        let container = Container::new();
        let ctx = container.context();
        ctx.register(Registration::from_fn("id", Signature::new(), counting(&counter)).singleton())
            .unwrap();

        let first = ctx.get::<usize>("id").unwrap();
        let second = ctx.get::<usize>("id").unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn it_fails_on_the_first_missing_name() {
        let container = Container::new();
        let ctx = container.context();
        ctx.register(Registration::value("greet", String::from("Hello")))
            .unwrap();

        let err = ctx.resolve(["greet", "user"], Args::new()).unwrap_err();

        assert!(err.is_missing());
    }

    #[test]
    fn it_rejects_reentrant_resolution() {
        let container = Container::new();
        let ctx = container.context();
        ctx.register(
            Registration::from_fn("a", Signature::injected(["b"]), |_: &Args| {
                Ok::<_, Infallible>(())
            })
            .singleton(),
        )
        .unwrap();
        ctx.register(Registration::from_fn(
            "b",
            Signature::injected(["a"]),
            |_: &Args| Ok::<_, Infallible>(()),
        ))
        .unwrap();

        let err = ctx.get::<()>("a").unwrap_err();

        assert_eq!(
            err.as_require(),
            Some(&RequireError::ReentrantResolution {
                name: "a".into(),
                chain: vec!["a".into(), "b".into()],
            })
        );
        // The chain is unwound again after the failure
        assert!(ctx.resolving.borrow().is_empty());
    }

    #[test]
    fn it_passes_factory_errors_through() {
        let container = Container::new();
        let ctx = container.context();
        ctx.register(Registration::from_fn(
            "db",
            Signature::new(),
            |_: &Args| Err::<(), _>(std::io::Error::other("connection refused")),
        ))
        .unwrap();

        let err = ctx.get::<()>("db").unwrap_err();

        assert!(err.to_string().contains("connection refused"));
    }
}
