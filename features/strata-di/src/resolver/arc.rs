use std::sync::Arc;

use crate::{
    args::{downcast, Args},
    errors::RequireError,
    resolver::Extract,
    types::Injectable,
};

impl<T: Injectable> Extract for Arc<T> {
    fn extract(args: &Args, name: &str) -> Result<Self, RequireError> {
        match args.instance(name)? {
            Some(instance) => downcast(name, instance),
            None => Err(RequireError::EmptyValue(name.to_string())),
        }
    }
}

impl<Extractable: Extract> Extract for Option<Extractable> {
    fn extract(args: &Args, name: &str) -> Result<Self, RequireError> {
        match Extractable::extract(args, name) {
            Ok(extracted) => Ok(Some(extracted)),
            // Only a deliberately empty value is optional, a missed injection still fails
            Err(RequireError::EmptyValue(_)) => Ok(None),
            Err(e) => Err(e),
        }
    }
}
