//! Logical assembly model for the scawire wiring engine.
//!
//! This crate is the data layer: hierarchical URIs, deployable names,
//! contracts, the static definition types a descriptor deserializes into,
//! and the logical component tree those definitions instantiate to. The
//! resolution algorithms that connect references to services live in the
//! `scawire` crate; everything here is inert state and tree plumbing.

pub mod assembly;
pub mod contract;
pub mod definition;
pub mod logical;
pub mod qname;
pub mod uri;

pub use assembly::{AssemblyError, LogicalAssembly};
pub use contract::Contract;
pub use definition::{
    Autowire, BindingDefinition, ComponentDefinition, ComponentTypeDefinition,
    CompositeDefinition, Implementation, Multiplicity, PromotedReferenceDefinition,
    ReferenceDefinition, ReferenceOverride, ServiceDefinition, TargetDefinition, WireDefinition,
    SCA_BINDING,
};
pub use logical::{
    ComponentBody, CompositeState, LogicalComponent, LogicalReference, LogicalService,
    LogicalWire, WireState,
};
pub use qname::QName;
pub use uri::Uri;
