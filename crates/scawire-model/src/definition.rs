//! Static assembly definitions.
//!
//! These are the declarative inputs to instantiation: what a descriptor says
//! about components, references, services, bindings and wires before any
//! resolution has happened. The CLI deserializes them straight from JSON;
//! tests build them programmatically.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::contract::Contract;
use crate::uri::Uri;

/// Binding type reserved for direct component-to-component wiring. A binding
/// of this type with an explicit target makes the owning reference
/// *concrete bound*: it is wired to that target and excluded from autowire.
pub const SCA_BINDING: &str = "sca";

/// Cardinality constraint on a reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Multiplicity {
    #[default]
    OneOne,
    ZeroOne,
    ZeroN,
    OneN,
}

impl Multiplicity {
    /// Whether the reference may hold more than one wire.
    pub fn is_multi(self) -> bool {
        matches!(self, Multiplicity::ZeroN | Multiplicity::OneN)
    }
}

/// Autowire policy carried by a component.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Autowire {
    On,
    Off,
    #[default]
    Inherited,
}

/// A binding declared on a reference or service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BindingDefinition {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(rename = "type")]
    pub binding_type: String,
    /// Explicit target URI, only meaningful on reference-side bindings.
    #[serde(default)]
    pub target: Option<Uri>,
}

impl BindingDefinition {
    pub fn new(binding_type: impl Into<String>) -> Self {
        Self {
            name: None,
            binding_type: binding_type.into(),
            target: None,
        }
    }

    /// An SCA binding with an explicit target.
    pub fn is_concrete_sca(&self) -> bool {
        self.binding_type == SCA_BINDING && self.target.is_some()
    }
}

/// A declared wiring target on a reference, with optional binding pairing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "TargetRepr")]
pub struct TargetDefinition {
    /// `component` or `component#service`, relative to the enclosing composite.
    pub uri: Uri,
    /// Name of the binding to select on the target service.
    pub binding: Option<String>,
    /// Name of the binding to select on the source reference.
    pub source_binding: Option<String>,
}

impl TargetDefinition {
    pub fn new(uri: impl Into<Uri>) -> Self {
        Self {
            uri: uri.into(),
            binding: None,
            source_binding: None,
        }
    }
}

/// Accepts either a plain URI string or the full target form.
#[derive(Deserialize)]
#[serde(untagged)]
enum TargetRepr {
    Plain(Uri),
    Full {
        uri: Uri,
        #[serde(default)]
        binding: Option<String>,
        #[serde(default)]
        source_binding: Option<String>,
    },
}

impl From<TargetRepr> for TargetDefinition {
    fn from(repr: TargetRepr) -> Self {
        match repr {
            TargetRepr::Plain(uri) => TargetDefinition::new(uri),
            TargetRepr::Full {
                uri,
                binding,
                source_binding,
            } => TargetDefinition {
                uri,
                binding,
                source_binding,
            },
        }
    }
}

/// A reference declared in a component type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReferenceDefinition {
    pub name: String,
    pub contract: Contract,
    #[serde(default)]
    pub multiplicity: Multiplicity,
    #[serde(default = "default_true")]
    pub required: bool,
    #[serde(default)]
    pub keyed: bool,
    #[serde(default)]
    pub intents: BTreeSet<String>,
    #[serde(default)]
    pub targets: Vec<TargetDefinition>,
    #[serde(default)]
    pub bindings: Vec<BindingDefinition>,
}

impl ReferenceDefinition {
    pub fn new(name: impl Into<String>, contract: Contract) -> Self {
        Self {
            name: name.into(),
            contract,
            multiplicity: Multiplicity::OneOne,
            required: true,
            keyed: false,
            intents: BTreeSet::new(),
            targets: Vec::new(),
            bindings: Vec::new(),
        }
    }
}

/// A service declared in a component type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceDefinition {
    pub name: String,
    pub contract: Contract,
    #[serde(default)]
    pub intents: BTreeSet<String>,
    #[serde(default)]
    pub bindings: Vec<BindingDefinition>,
    /// Management services are skipped when defaulting an unnamed wire target.
    #[serde(default)]
    pub management: bool,
}

impl ServiceDefinition {
    pub fn new(name: impl Into<String>, contract: Contract) -> Self {
        Self {
            name: name.into(),
            contract,
            intents: BTreeSet::new(),
            bindings: Vec::new(),
            management: false,
        }
    }
}

/// Static metadata shared by all instances of an atomic implementation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComponentTypeDefinition {
    #[serde(default)]
    pub key: Option<String>,
    #[serde(default)]
    pub services: Vec<ServiceDefinition>,
    #[serde(default)]
    pub references: Vec<ReferenceDefinition>,
}

/// Component-level configuration of a declared reference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReferenceOverride {
    pub name: String,
    /// Targets that replace the reference definition's declared targets.
    #[serde(default)]
    pub targets: Vec<TargetDefinition>,
    /// Composite URI to scan first during autowire, before the enclosing
    /// composite.
    #[serde(default)]
    pub scope: Option<Uri>,
}

/// What a component is implemented by.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Implementation {
    Atomic(ComponentTypeDefinition),
    Composite(CompositeDefinition),
}

/// A component declared inside a composite.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComponentDefinition {
    pub name: String,
    #[serde(default)]
    pub key: Option<String>,
    #[serde(default)]
    pub autowire: Autowire,
    pub implementation: Implementation,
    #[serde(default)]
    pub references: Vec<ReferenceOverride>,
}

impl ComponentDefinition {
    pub fn atomic(name: impl Into<String>, component_type: ComponentTypeDefinition) -> Self {
        Self {
            name: name.into(),
            key: None,
            autowire: Autowire::Inherited,
            implementation: Implementation::Atomic(component_type),
            references: Vec::new(),
        }
    }

    pub fn composite(name: impl Into<String>, composite: CompositeDefinition) -> Self {
        Self {
            name: name.into(),
            key: None,
            autowire: Autowire::Inherited,
            implementation: Implementation::Composite(composite),
            references: Vec::new(),
        }
    }
}

/// A reference promoted from a child component up to the composite.
///
/// Only the leaf of a promotion chain owns wires; the composite reference is
/// an alias resolved to that leaf during instantiation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromotedReferenceDefinition {
    pub name: String,
    /// `child` or `child#reference`, relative to this composite.
    pub promote: Uri,
}

/// An explicit composite-scope wire declaration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WireDefinition {
    /// `component` or `component#reference`, relative to this composite.
    pub source: Uri,
    /// `component` or `component#service`, relative to this composite.
    pub target: Uri,
    /// Whether this wire overrides any target-declared wiring of the source.
    #[serde(default)]
    pub replaces: bool,
}

/// A composite: a container of components, promoted references and wires.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompositeDefinition {
    pub name: String,
    /// Default autowire policy for contained components that inherit.
    #[serde(default)]
    pub autowire: Option<bool>,
    #[serde(default)]
    pub components: Vec<ComponentDefinition>,
    #[serde(default)]
    pub references: Vec<PromotedReferenceDefinition>,
    #[serde(default)]
    pub wires: Vec<WireDefinition>,
}

fn default_true() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_multiplicity_classification() {
        assert!(!Multiplicity::OneOne.is_multi());
        assert!(!Multiplicity::ZeroOne.is_multi());
        assert!(Multiplicity::ZeroN.is_multi());
        assert!(Multiplicity::OneN.is_multi());
    }

    #[test]
    fn test_concrete_sca_binding_detection() {
        let mut binding = BindingDefinition::new(SCA_BINDING);
        assert!(!binding.is_concrete_sca());
        binding.target = Some(Uri::new("domain/q#s"));
        assert!(binding.is_concrete_sca());

        let mut other = BindingDefinition::new("jms");
        other.target = Some(Uri::new("queue:orders"));
        assert!(!other.is_concrete_sca());
    }

    #[test]
    fn test_target_accepts_plain_uri_string() {
        let target: TargetDefinition = serde_json::from_str("\"q#s\"").unwrap();
        assert_eq!(target.uri.as_str(), "q#s");
        assert_eq!(target.binding, None);

        let full: TargetDefinition =
            serde_json::from_str(r#"{"uri": "q", "binding": "ws"}"#).unwrap();
        assert_eq!(full.uri.as_str(), "q");
        assert_eq!(full.binding.as_deref(), Some("ws"));
    }

    #[test]
    fn test_reference_defaults() {
        let json = r#"{"name": "r", "contract": {"interface": "X"}}"#;
        let reference: ReferenceDefinition = serde_json::from_str(json).unwrap();
        assert!(reference.required);
        assert!(!reference.keyed);
        assert_eq!(reference.multiplicity, Multiplicity::OneOne);
        assert!(reference.targets.is_empty());
    }
}
