use crate::{
    context::Context,
    errors::{InjectError, RequireError},
    scope::Scope,
    stack::Located,
};

impl Scope {
    /// Produces every eager singleton of this scope, in registration order
    ///
    /// The scope has to be on `ctx`'s stack. Already produced singletons are left as they are.
    pub fn warmup(&self, ctx: &Context) -> Result<(), InjectError> {
        let stack = ctx.stack();
        let (depth, scope) = stack
            .depth_of(self)
            .and_then(|depth| Some((depth, stack.get(depth)?.clone())))
            .ok_or_else(|| RequireError::ScopeNotActive(self.name().to_string()))?;

        let eagers = self.eager_entries();
        tracing::debug!(
            "Warming up scope '{}' - {} eager injectables",
            self.name(),
            eagers.len()
        );

        for entry in eagers {
            tracing::trace!("Warming up '{}'", entry.name());
            let located = Located {
                depth,
                scope: scope.clone(),
                entry,
            };
            ctx.realize(&located)?;
        }

        tracing::debug!("Scope '{}' is hot", self.name());
        Ok(())
    }
}

impl Context {
    /// Warms up every scope on the stack, root first
    ///
    /// Stops at the first failing factory.
    pub fn warmup_all(&self) -> Result<(), InjectError> {
        let stack = self.stack();
        tracing::debug!("Warming up {} scopes", stack.len());

        for scope in stack.iter() {
            scope.warmup(self)?;
        }

        tracing::debug!("Warmup complete");
        Ok(())
    }
}
