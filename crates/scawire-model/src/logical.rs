//! The logical component tree produced by instantiation.
//!
//! Logical nodes mirror the static definitions but carry resolution state:
//! wire tables on composites, resolved/concrete-bound flags on references,
//! lifecycle state on wires. The tree is mutated in place by the wiring
//! engine during a single-threaded resolution pass.

use std::collections::{BTreeSet, HashMap};

use serde::Serialize;

use crate::definition::{
    Autowire, BindingDefinition, Multiplicity, TargetDefinition, WireDefinition,
};
use crate::contract::Contract;
use crate::qname::QName;
use crate::uri::Uri;

/// Lifecycle state of a wire.
///
/// New wires are created in `New`; the downstream physical generator moves
/// them to `Provisioned` once attached. Re-resolution flags surviving
/// provisioned wires back to `New` when a multi-valued reference's wire set
/// changes shape, so the runtime knows to reinject.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WireState {
    New,
    Provisioned,
}

/// An edge from a reference to a service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LogicalWire {
    /// Leaf reference URI.
    pub source: Uri,
    /// Service URI.
    pub target: Uri,
    /// Deployable of the *target* component. Governs teardown: the wire goes
    /// away when the target's deployment unit does, regardless of who
    /// created the source.
    pub target_deployable: Option<QName>,
    /// Set from a composite wire declaration that overrides target wiring.
    pub replaces: bool,
    pub state: WireState,
    pub source_binding: Option<BindingDefinition>,
    pub target_binding: Option<BindingDefinition>,
}

impl LogicalWire {
    pub fn new(source: Uri, target: Uri, target_deployable: Option<QName>) -> Self {
        Self {
            source,
            target,
            target_deployable,
            replaces: false,
            state: WireState::New,
            source_binding: None,
            target_binding: None,
        }
    }
}

/// A service on a logical component.
#[derive(Debug, Clone)]
pub struct LogicalService {
    pub uri: Uri,
    pub contract: Contract,
    pub intents: BTreeSet<String>,
    pub bindings: Vec<BindingDefinition>,
    pub management: bool,
}

impl LogicalService {
    pub fn name(&self) -> &str {
        self.uri.fragment_name().unwrap_or_default()
    }
}

/// A reference on a logical component.
#[derive(Debug, Clone)]
pub struct LogicalReference {
    pub uri: Uri,
    pub contract: Contract,
    pub multiplicity: Multiplicity,
    pub required: bool,
    pub keyed: bool,
    pub intents: BTreeSet<String>,
    pub bindings: Vec<BindingDefinition>,
    /// Targets from the reference definition.
    pub declared_targets: Vec<TargetDefinition>,
    /// Component-level target override; wins over declared targets.
    pub target_override: Option<Vec<TargetDefinition>>,
    /// Composite to scan first during autowire, before the enclosing one.
    pub autowire_scope: Option<Uri>,
    pub resolved: bool,
    /// Targeted through an SCA binding with an explicit target; never
    /// touched by autowire.
    pub concrete_bound: bool,
    /// The atomic reference at the bottom of the promotion chain. Only leaf
    /// references own wires; for non-promoted references this is `uri`.
    pub leaf: Uri,
}

impl LogicalReference {
    pub fn name(&self) -> &str {
        self.uri.fragment_name().unwrap_or_default()
    }

    /// The targets explicit wiring should use: the component-level override,
    /// else declared targets, else concrete SCA binding targets.
    pub fn configured_targets(&self) -> Vec<TargetDefinition> {
        if let Some(targets) = &self.target_override {
            return targets.clone();
        }
        if !self.declared_targets.is_empty() {
            return self.declared_targets.clone();
        }
        self.bindings
            .iter()
            .filter(|binding| binding.is_concrete_sca())
            .filter_map(|binding| binding.target.clone())
            .map(TargetDefinition::new)
            .collect()
    }
}

/// Composite-only state: children, the wire table, and pending wire
/// declarations awaiting instantiation.
#[derive(Debug, Clone, Default)]
pub struct CompositeState {
    /// Child component URIs in declaration order. Autowire iterates this
    /// order, so it must stay stable across passes.
    pub children: Vec<Uri>,
    /// Wires keyed by source leaf reference URI.
    pub wires: HashMap<Uri, Vec<LogicalWire>>,
    /// Composite-scope wire declarations, consumed by the wire instantiator.
    pub wire_definitions: Vec<WireDefinition>,
    /// Default autowire for contained components that inherit.
    pub default_autowire: Option<bool>,
}

/// Atomic vs. composite, as a tagged variant rather than a class hierarchy.
#[derive(Debug, Clone)]
pub enum ComponentBody {
    Atomic,
    Composite(CompositeState),
}

/// A node in the logical assembly tree.
#[derive(Debug, Clone)]
pub struct LogicalComponent {
    pub uri: Uri,
    pub parent: Option<Uri>,
    /// Deployment unit this instance belongs to.
    pub deployable: Option<QName>,
    pub autowire: Autowire,
    /// Key from the component definition or its component type; required on
    /// targets of keyed references.
    pub key: Option<String>,
    pub services: Vec<LogicalService>,
    pub references: Vec<LogicalReference>,
    pub body: ComponentBody,
}

impl LogicalComponent {
    pub fn is_composite(&self) -> bool {
        matches!(self.body, ComponentBody::Composite(_))
    }

    pub fn composite(&self) -> Option<&CompositeState> {
        match &self.body {
            ComponentBody::Composite(state) => Some(state),
            ComponentBody::Atomic => None,
        }
    }

    pub fn composite_mut(&mut self) -> Option<&mut CompositeState> {
        match &mut self.body {
            ComponentBody::Composite(state) => Some(state),
            ComponentBody::Atomic => None,
        }
    }

    pub fn reference(&self, name: &str) -> Option<&LogicalReference> {
        self.references.iter().find(|r| r.name() == name)
    }

    pub fn reference_mut(&mut self, name: &str) -> Option<&mut LogicalReference> {
        self.references.iter_mut().find(|r| r.name() == name)
    }

    pub fn service(&self, name: &str) -> Option<&LogicalService> {
        self.services.iter().find(|s| s.name() == name)
    }
}
