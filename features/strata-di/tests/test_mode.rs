use strata_di::{Args, Container, Inject, Instance, Registration, RequireError, Signature};

fn container_with_production_val() -> Container {
    let container = Container::new();
    container.register(Registration::value("val", 1_u32)).unwrap();
    container
}

#[test]
fn it_requires_test_setup_in_test_mode() {
    let container = container_with_production_val();
    container.set_test_mode(true);

    let err = container.context().get::<u32>("val").unwrap_err();

    assert_eq!(err.as_require(), Some(&RequireError::TestScopeNotConfigured));
}

#[test]
fn it_serves_test_overrides_exclusively() {
    let container = container_with_production_val();
    container.register(Registration::value("other", 2_u32)).unwrap();
    container.set_test_mode(true);
    container.set_test_overrides([("val", Instance::new(42_u32))]);
    let ctx = container.context();

    assert_eq!(*ctx.get::<u32>("val").unwrap(), 42);
    let err = ctx.get::<u32>("other").unwrap_err();
    assert_eq!(err.as_require(), Some(&RequireError::InjectionMissing("other".into())));
}

#[test]
fn it_returns_to_production_values() {
    let container = container_with_production_val();
    container.set_test_mode(true);
    container.set_test_overrides([("val", Instance::new(42_u32))]);

    container.set_test_mode(false);

    assert_eq!(*container.context().get::<u32>("val").unwrap(), 1);
}

#[test]
fn it_still_prefers_supplied_values_in_test_mode() {
    let container = container_with_production_val();
    container.set_test_mode(true);
    let injected = Inject::new(Signature::injected(["val"]), |args: &Args| {
        args.get::<u32>("val").map(|val| *val)
    });

    let val = injected
        .call(&container.context(), Args::new().with("val", 7_u32))
        .unwrap();

    assert_eq!(val, Ok(7));
}

#[test]
fn it_flags_reads_of_never_injected_params() {
    let container = container_with_production_val();
    let unannounced = Inject::new(Signature::new(), |args: &Args| {
        args.get::<u32>("val").map(|val| *val)
    });

    let production = unannounced.call(&container.context(), Args::new()).unwrap();
    container.set_test_mode(true);
    let test = unannounced.call(&container.context(), Args::new()).unwrap();

    assert_eq!(production, Err(RequireError::InjectionNotPerformed("val".into())));
    assert_eq!(test, Err(RequireError::TestInjectionsNotSetup("val".into())));
}
