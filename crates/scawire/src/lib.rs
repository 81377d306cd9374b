//! Logical wiring engine for component assemblies.
//!
//! Given a [`scawire_model::LogicalAssembly`], the engine resolves every
//! reference to the services that satisfy it: explicit composite wires
//! first, then declared reference targets, then contract-based autowire
//! for whatever remains. The result is a set of logical wires on the
//! assembly plus a list of accumulated wiring errors.
//!
//! Entry point: [`resolve_wires`].

pub mod autowire;
pub mod context;
pub mod error;
pub mod matcher;
pub mod resolver;
pub mod wires;

pub use autowire::AutowireInstantiator;
pub use context::InstantiationContext;
pub use error::WiringError;
pub use matcher::{ContractMatcher, DefaultContractMatcher, MatchResult};
pub use resolver::resolve_wires;
pub use wires::WireInstantiator;
