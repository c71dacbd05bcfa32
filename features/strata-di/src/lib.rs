//! Strata DI resolves named injectables through a stack of nested scopes.
//!
//! Every execution context owns its own [ScopeStack], all of them share the root scope of the
//! [Container]. Resolving a name searches the stack innermost first, so a nested scope can
//! shadow what its ancestors provide. Singletons are cached in the deepest scope any of their
//! transitive dependencies comes from, and disappear together with that scope.
//!
//! # Example
//!
//! ```rust
//! use strata_di::{Args, Container, Registration, RequireError, Signature};
//!
//! let container = Container::new();
//! container.register(Registration::value("greet", String::from("Hello"))).unwrap();
//!
//! let ctx = container.context();
//! ctx.scoped("handler", |ctx| {
//!     ctx.register(Registration::value("user", String::from("Anonymous"))).unwrap();
//!     ctx.register(
//!         Registration::from_fn("hello", Signature::injected(["greet", "user"]), |args: &Args| {
//!             Ok::<_, RequireError>(format!(
//!                 "{} {}",
//!                 args.get::<String>("greet")?,
//!                 args.get::<String>("user")?
//!             ))
//!         })
//!         .singleton(),
//!     )
//!     .unwrap();
//!
//!     assert_eq!(ctx.get::<String>("hello").unwrap().as_str(), "Hello Anonymous");
//! });
//!
//! // The handler scope, and the singleton cached in it, are gone
//! assert!(ctx.get::<String>("hello").unwrap_err().is_missing());
//! ```

pub mod args;
pub mod builder;
pub mod container;
pub mod context;
pub mod dependency_graph;
pub mod entry;
pub mod errors;
pub mod factories;
pub mod inject;
pub mod resolver;
pub mod scope;
pub mod stack;
pub mod types;
mod warmup;

pub use args::Args;
pub use builder::Registration;
pub use container::{Container, ContainerConfig};
pub use context::{Context, ScopeGuard};
pub use dependency_graph::{DependencyGraph, DependencyGraphError, DependencyGraphErrors};
pub use entry::ProducerEntry;
pub use errors::{InjectError, RegisterError, RequireError};
pub use factories::{DynFactory, FnFactory, InstanceFactory};
pub use inject::Inject;
pub use resolver::Extract;
pub use scope::Scope;
pub use stack::{Located, ScopeStack};
pub use types::{DynError, Injectable, Injected, Instance, Param, ParamDefault, Signature, IN};
