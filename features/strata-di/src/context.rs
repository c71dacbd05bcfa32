use std::{cell::RefCell, fmt::Display, ops::Deref, sync::Arc};

use crate::{
    args::Args,
    builder::Registration,
    container::Container,
    dependency_graph::DependencyGraph,
    entry::ProducerEntry,
    errors::{InjectError, RegisterError},
    scope::Scope,
    stack::{ResolutionCache, ScopeStack},
    types::Injectable,
};

/// Handle of one execution context onto a [Container]
///
/// Each context has its own scope stack - only the root scope is shared.
/// A context can be moved to another thread but not shared, use [Context::fork] to hand out a copy.
pub struct Context {
    pub(crate) container: Container,
    pub(crate) stack: RefCell<ScopeStack>,
    pub(crate) cache: RefCell<ResolutionCache>,
    /// Names currently being resolved, outermost first
    pub(crate) resolving: RefCell<Vec<String>>,
}

impl Context {
    pub(crate) fn new(container: Container, stack: ScopeStack) -> Self {
        Context {
            container,
            stack: RefCell::new(stack),
            cache: RefCell::default(),
            resolving: RefCell::default(),
        }
    }

    pub fn container(&self) -> &Container {
        &self.container
    }

    /// Adds an injectable to the innermost scope
    ///
    /// Fails if the name is visible anywhere on this context's stack.
    pub fn register(&self, registration: Registration) -> Result<(), RegisterError> {
        let entry = ProducerEntry::new(registration)?;

        {
            let stack = self.stack.borrow();
            if let Some(scope) = stack.iter().find(|scope| scope.contains(entry.name())) {
                return Err(RegisterError::NameConflict {
                    name: entry.name().to_string(),
                    scope: scope.name().to_string(),
                });
            }

            let scope = stack.current();
            let entry = scope.insert(entry)?;
            tracing::debug!(
                "Added injectable '{}' ({}) to scope '{}'",
                entry.name(),
                entry.supplies(),
                scope.name()
            );
        }

        self.cache.borrow_mut().invalidate();
        Ok(())
    }

    /// Pushes a new, empty scope until the returned guard is dropped
    pub fn enter_scope(&self, name: impl Into<String>) -> ScopeGuard<'_> {
        let scope = {
            let mut stack = self.stack.borrow_mut();
            let scope = Scope::nested(name, stack.current());
            stack.push(scope.clone());
            scope
        };
        self.cache.borrow_mut().invalidate();

        let depth = self.depth();
        tracing::debug!("Entered scope '{}' at depth {depth}", scope.name());

        ScopeGuard {
            context: self,
            scope,
            depth,
        }
    }

    /// Runs `f` inside a new scope, which is popped again however `f` exits
    pub fn scoped<R>(&self, name: impl Into<String>, f: impl FnOnce(&Context) -> R) -> R {
        let _guard = self.enter_scope(name);
        f(self)
    }

    /// Pops `scope` and everything entered after it
    ///
    /// Does nothing if `scope` is no longer at `depth`, it was already popped with an outer scope.
    fn exit_scope(&self, scope: &Arc<Scope>, depth: usize) -> bool {
        {
            let mut stack = self.stack.borrow_mut();
            match stack.get(depth) {
                Some(current) if Arc::ptr_eq(current, scope) => stack.truncate(depth),
                _ => return false,
            }
        }
        self.cache.borrow_mut().invalidate();
        true
    }

    /// Resolves `name` and downcasts it
    pub fn get<T: Injectable>(&self, name: &str) -> Result<Arc<T>, InjectError> {
        let args = self.resolve([name], Args::new())?;
        Ok(args.get::<T>(name)?)
    }

    /// A new context starting with a copy of this context's stack
    ///
    /// Scopes entered or exited afterwards on either side are not seen by the other.
    pub fn fork(&self) -> Context {
        Context::new(self.container.clone(), self.stack())
    }

    /// Depth of the innermost scope, 0 being the root
    pub fn depth(&self) -> usize {
        self.stack.borrow().len() - 1
    }

    pub fn current_scope(&self) -> Arc<Scope> {
        self.stack.borrow().current().clone()
    }

    /// Snapshot of the current stack
    pub fn stack(&self) -> ScopeStack {
        self.stack.borrow().clone()
    }

    /// Snapshot of everything visible from this context
    pub fn graph(&self) -> DependencyGraph {
        DependencyGraph::new(self.stack.borrow().visible())
    }

    /// Human readable listing of every scope's names, root first
    pub fn dump(&self) -> String {
        let dump = self.to_string();
        tracing::debug!("Injection stack:\n{dump}");
        dump
    }
}

impl Display for Context {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let stack = self.stack.borrow();
        let mut scopes = stack.iter();
        if let Some(root) = scopes.next() {
            write!(f, "{root}")?;
        }
        for scope in scopes {
            write!(f, "\n{scope}")?;
        }
        Ok(())
    }
}

impl std::fmt::Debug for Context {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let stack = self.stack.borrow();
        f.debug_struct("Context")
            .field("scopes", &stack.iter().map(|scope| scope.name()).collect::<Vec<_>>())
            .finish()
    }
}

/// Keeps a scope on the stack of its context
///
/// Dropping the guard pops the scope and every scope entered after it.
pub struct ScopeGuard<'a> {
    context: &'a Context,
    scope: Arc<Scope>,
    depth: usize,
}

impl ScopeGuard<'_> {
    pub fn scope(&self) -> &Arc<Scope> {
        &self.scope
    }

    pub fn depth(&self) -> usize {
        self.depth
    }
}

impl Deref for ScopeGuard<'_> {
    type Target = Context;

    fn deref(&self) -> &Self::Target {
        self.context
    }
}

impl Drop for ScopeGuard<'_> {
    fn drop(&mut self) {
        if self.context.exit_scope(&self.scope, self.depth) {
            tracing::debug!("Exited scope '{}'", self.scope.name());
        }
    }
}
