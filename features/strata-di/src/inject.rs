use crate::{
    args::Args,
    context::Context,
    errors::{InjectError, RequireError},
    types::{ParamDefault, Signature},
};

/// A plain callable whose injected parameters are filled in on every call
///
/// Unlike registered injectables, parameters may also be plain ones the caller has to supply.
pub struct Inject<F> {
    signature: Signature,
    f: F,
}

impl<F, R> Inject<F>
where
    F: Fn(&Args) -> R,
{
    pub fn new(signature: Signature, f: F) -> Self {
        Inject { signature, f }
    }

    pub fn signature(&self) -> &Signature {
        &self.signature
    }

    /// Calls the wrapped callable with `supplied` plus everything missing resolved through `ctx`
    pub fn call(&self, ctx: &Context, supplied: Args) -> Result<R, InjectError> {
        if let Some(param) = self.signature.params().iter().find(|param| {
            matches!(param.default, ParamDefault::NoDefault) && !supplied.contains(&param.name)
        }) {
            return Err(RequireError::ArgumentMissing(param.name.clone()).into());
        }

        tracing::debug!(
            "Injecting {:?} into callable",
            self.signature.dependencies().collect::<Vec<_>>()
        );
        let mut args = ctx.resolve(self.signature.dependencies(), supplied)?;

        for param in self.signature.params() {
            if let ParamDefault::Value(default) = &param.default {
                if !args.contains(&param.name) {
                    args.insert(param.name.clone(), Some(default.clone()));
                }
            }
        }

        Ok((self.f)(&args))
    }
}
