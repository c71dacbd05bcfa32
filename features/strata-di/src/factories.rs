use std::marker::PhantomData;

use crate::{
    args::Args,
    types::{DynError, Injectable, Instance, Signature},
};

/// A Factory providing values of a given type
pub trait InstanceFactory: Send + Sync {
    type Provides: Injectable;

    /// Returns the parameters the factory expects to be filled in
    fn signature(&self) -> Signature;

    /// Constructs a new value of the factory's provided type
    ///
    /// `args` holds every injected parameter of [InstanceFactory::signature]
    fn construct(&self, args: &Args) -> Result<Self::Provides, impl Into<DynError>>;
}

/// Wrapper Trait for factories, providing instances of Any
pub trait DynFactory: Send + Sync {
    /// Name of the type the factory produces
    fn supplies(&self) -> &'static str;

    fn signature(&self) -> Signature;

    fn construct(&self, args: &Args) -> Result<Instance, DynError>;
}
// Impl DynFactory for any InstanceFactory
impl<T: Injectable, SpecificFactory: InstanceFactory<Provides = T>> DynFactory for SpecificFactory {
    fn supplies(&self) -> &'static str {
        std::any::type_name::<T>()
    }

    fn signature(&self) -> Signature {
        InstanceFactory::signature(self)
    }

    fn construct(&self, args: &Args) -> Result<Instance, DynError> {
        // Forward the call to the specific implementation
        InstanceFactory::construct(self, args)
            .map(Instance::new)
            .map_err(|e| e.into())
    }
}

/// Factory from a plain closure
pub struct FnFactory<F, T, E> {
    signature: Signature,
    f: F,
    _provides: PhantomData<fn() -> (T, E)>,
}
impl<F, T, E> FnFactory<F, T, E>
where
    F: Fn(&Args) -> Result<T, E> + Send + Sync,
    T: Injectable,
    E: Into<DynError>,
{
    pub fn new(signature: Signature, f: F) -> Self {
        Self {
            signature,
            f,
            _provides: PhantomData,
        }
    }
}
impl<F, T, E> InstanceFactory for FnFactory<F, T, E>
where
    F: Fn(&Args) -> Result<T, E> + Send + Sync,
    T: Injectable,
    E: Into<DynError>,
{
    type Provides = T;

    fn signature(&self) -> Signature {
        self.signature.clone()
    }

    #[allow(refining_impl_trait)]
    fn construct(&self, args: &Args) -> Result<T, E> {
        (self.f)(args)
    }
}

/// Always hands out the same, already existing value
pub struct ValueFactory(pub(crate) Instance);
impl DynFactory for ValueFactory {
    fn supplies(&self) -> &'static str {
        self.0.type_name
    }

    fn signature(&self) -> Signature {
        Signature::new()
    }

    fn construct(&self, _: &Args) -> Result<Instance, DynError> {
        Ok(self.0.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Greeting {
        text: String,
    }

    struct GreetingFactory;
    impl InstanceFactory for GreetingFactory {
        type Provides = Greeting;

        fn signature(&self) -> Signature {
            Signature::injected(["greet", "user"])
        }

        #[allow(refining_impl_trait)]
        fn construct(&self, args: &Args) -> Result<Greeting, crate::RequireError> {
            let greet = args.get::<String>("greet")?;
            let user = args.get::<String>("user")?;
            Ok(Greeting {
                text: format!("{greet} {user}"),
            })
        }
    }

    #[test]
    fn it_constructs_through_dyn_factory() {
        let factory: Box<dyn DynFactory> = Box::new(GreetingFactory);
        let args = Args::new()
            .with("greet", String::from("Hello"))
            .with("user", String::from("Anonymous"));

        let instance = factory.construct(&args).unwrap();

        assert!(factory.supplies().ends_with("Greeting"));
        assert_eq!(instance.downcast::<Greeting>().unwrap().text, "Hello Anonymous");
    }

    #[test]
    fn it_surfaces_factory_errors() {
        let factory: Box<dyn DynFactory> = Box::new(GreetingFactory);

        let err = factory.construct(&Args::new()).unwrap_err();

        assert!(err.to_string().contains("greet"));
    }

    #[test]
    fn it_constructs_from_closures() {
        let factory = FnFactory::new(Signature::injected(["port"]), |args: &Args| {
            args.get::<u16>("port").map(|port| *port + 1)
        });

        let instance = DynFactory::construct(&factory, &Args::new().with("port", 8000_u16)).unwrap();

        assert_eq!(*instance.downcast::<u16>().unwrap(), 8001);
    }

    #[test]
    fn it_hands_out_the_same_value() {
        let factory = ValueFactory(Instance::new(String::from("Hello world")));

        let a = factory.construct(&Args::new()).unwrap();
        let b = factory.construct(&Args::new()).unwrap();

        assert!(a.ptr_eq(&b));
    }
}
