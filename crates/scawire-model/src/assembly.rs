//! The logical assembly: URI-indexed component tree plus instantiation.
//!
//! `LogicalAssembly` is the component manager the wiring engine runs
//! against. `instantiate` turns a composite definition into the logical
//! tree: URIs are assigned, autowire settings recorded for inheritance,
//! keys pulled from the component or its type, concrete-bound references
//! detected, and promotion chains resolved down to their leaf references.

use std::collections::{HashMap, HashSet};

use thiserror::Error;

use crate::definition::{
    Autowire, ComponentDefinition, ComponentTypeDefinition, CompositeDefinition, Implementation,
    ReferenceOverride,
};
use crate::logical::{
    ComponentBody, CompositeState, LogicalComponent, LogicalReference, LogicalService,
    LogicalWire, WireState,
};
use crate::qname::QName;
use crate::uri::Uri;

/// Structural problems in a definition that prevent instantiation.
///
/// Unlike wiring failures these abort the build: without a coherent tree
/// there is nothing for resolution to run against.
#[derive(Debug, Error)]
pub enum AssemblyError {
    #[error("duplicate component uri '{0}'")]
    DuplicateComponent(Uri),
    #[error("promoted reference '{reference}' on '{composite}': promotion target '{promote}' not found")]
    PromotionTargetNotFound {
        composite: Uri,
        reference: String,
        promote: Uri,
    },
    #[error("promoted reference '{reference}' on '{composite}': component '{promote}' has no sole reference to promote")]
    PromotionAmbiguous {
        composite: Uri,
        reference: String,
        promote: Uri,
    },
    #[error("reference override '{name}' does not match a declared reference on '{component}'")]
    UnknownReferenceOverride { component: Uri, name: String },
}

/// The instantiated component tree, indexed by URI.
#[derive(Debug, Clone)]
pub struct LogicalAssembly {
    components: HashMap<Uri, LogicalComponent>,
    root: Uri,
}

impl LogicalAssembly {
    /// Instantiate a domain-level composite into a logical tree.
    ///
    /// Every component created by this call is tagged with `deployable`,
    /// the deployment unit the composite came from.
    pub fn instantiate(
        domain: &str,
        composite: &CompositeDefinition,
        deployable: Option<QName>,
    ) -> Result<Self, AssemblyError> {
        let root = Uri::new(domain);
        let mut assembly = Self {
            components: HashMap::new(),
            root: root.clone(),
        };
        assembly.instantiate_composite(
            root,
            None,
            composite,
            Autowire::Inherited,
            None,
            &[],
            &deployable,
        )?;
        Ok(assembly)
    }

    pub fn root_uri(&self) -> &Uri {
        &self.root
    }

    pub fn component(&self, uri: &Uri) -> Option<&LogicalComponent> {
        self.components.get(uri)
    }

    pub fn component_mut(&mut self, uri: &Uri) -> Option<&mut LogicalComponent> {
        self.components.get_mut(uri)
    }

    /// Child URIs of a composite in declaration order; empty for atomics.
    pub fn children(&self, uri: &Uri) -> &[Uri] {
        self.components
            .get(uri)
            .and_then(|c| c.composite())
            .map(|s| s.children.as_slice())
            .unwrap_or(&[])
    }

    /// Look up a reference by its fragment URI.
    pub fn reference(&self, uri: &Uri) -> Option<&LogicalReference> {
        let component = self.components.get(&uri.resource())?;
        component.reference(uri.fragment_name()?)
    }

    pub fn reference_mut(&mut self, uri: &Uri) -> Option<&mut LogicalReference> {
        let name = uri.fragment_name()?.to_string();
        let component = self.components.get_mut(&uri.resource())?;
        component.reference_mut(&name)
    }

    /// Look up a service by its fragment URI.
    pub fn service(&self, uri: &Uri) -> Option<&LogicalService> {
        let component = self.components.get(&uri.resource())?;
        component.service(uri.fragment_name()?)
    }

    /// Wires registered for a leaf reference, in creation order.
    ///
    /// The wire table lives on the parent composite of the reference's
    /// owning component.
    pub fn wires(&self, reference: &Uri) -> &[LogicalWire] {
        self.owning_composite(reference)
            .and_then(|composite| {
                self.components
                    .get(&composite)
                    .and_then(|c| c.composite())
                    .and_then(|state| state.wires.get(reference))
            })
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn wires_mut(&mut self, reference: &Uri) -> Option<&mut Vec<LogicalWire>> {
        let composite = self.owning_composite(reference)?;
        self.components
            .get_mut(&composite)?
            .composite_mut()?
            .wires
            .get_mut(reference)
    }

    /// Register a wire against the parent composite of its source reference.
    pub fn add_wire(&mut self, wire: LogicalWire) {
        if let Some(composite) = self.owning_composite(&wire.source) {
            if let Some(state) = self
                .components
                .get_mut(&composite)
                .and_then(|c| c.composite_mut())
            {
                state.wires.entry(wire.source.clone()).or_default().push(wire);
            }
        }
    }

    /// Move every wire to `Provisioned`. Called by the downstream physical
    /// generator after a pass has been attached.
    pub fn mark_provisioned(&mut self) {
        for component in self.components.values_mut() {
            if let Some(state) = component.composite_mut() {
                for wires in state.wires.values_mut() {
                    for wire in wires {
                        wire.state = WireState::Provisioned;
                    }
                }
            }
        }
    }

    /// All wires in the assembly, ordered by source then target.
    pub fn all_wires(&self) -> Vec<&LogicalWire> {
        let mut wires: Vec<&LogicalWire> = self
            .components
            .values()
            .filter_map(|c| c.composite())
            .flat_map(|state| state.wires.values().flatten())
            .collect();
        wires.sort_by(|a, b| (&a.source, &a.target).cmp(&(&b.source, &b.target)));
        wires
    }

    /// Effective autowire policy for a component: its own setting, else the
    /// enclosing composite's default, inheriting upwards. The domain root
    /// defaults to enabled.
    pub fn effective_autowire(&self, uri: &Uri) -> bool {
        let mut current = self.components.get(uri);
        while let Some(component) = current {
            match component.autowire {
                Autowire::On => return true,
                Autowire::Off => return false,
                Autowire::Inherited => {
                    let parent = component
                        .parent
                        .as_ref()
                        .and_then(|p| self.components.get(p));
                    if let Some(default) = parent
                        .and_then(|p| p.composite())
                        .and_then(|state| state.default_autowire)
                    {
                        return default;
                    }
                    current = parent;
                }
            }
        }
        true
    }

    /// Leaf references promoted by an enclosing composite.
    ///
    /// A promoted reference is satisfied at the promoting composite's scope;
    /// the leaf underneath must not be wired independently.
    pub fn promoted_leaves(&self) -> HashSet<Uri> {
        self.components
            .values()
            .flat_map(|component| &component.references)
            .filter(|reference| reference.leaf != reference.uri)
            .map(|reference| reference.leaf.clone())
            .collect()
    }

    fn owning_composite(&self, reference: &Uri) -> Option<Uri> {
        reference.resource().parent()
    }

    #[allow(clippy::too_many_arguments)]
    fn instantiate_composite(
        &mut self,
        uri: Uri,
        parent: Option<Uri>,
        definition: &CompositeDefinition,
        autowire: Autowire,
        key: Option<String>,
        overrides: &[ReferenceOverride],
        deployable: &Option<QName>,
    ) -> Result<(), AssemblyError> {
        if self.components.contains_key(&uri) {
            return Err(AssemblyError::DuplicateComponent(uri));
        }

        let mut children = Vec::with_capacity(definition.components.len());
        self.components.insert(
            uri.clone(),
            LogicalComponent {
                uri: uri.clone(),
                parent,
                deployable: deployable.clone(),
                autowire,
                key,
                services: Vec::new(),
                references: Vec::new(),
                body: ComponentBody::Composite(CompositeState {
                    children: Vec::new(),
                    wires: HashMap::new(),
                    wire_definitions: definition.wires.clone(),
                    default_autowire: definition.autowire,
                }),
            },
        );

        for component in &definition.components {
            let child_uri = uri.child(&component.name);
            match &component.implementation {
                Implementation::Atomic(component_type) => {
                    self.instantiate_atomic(
                        child_uri.clone(),
                        uri.clone(),
                        component,
                        component_type,
                        deployable,
                    )?;
                }
                Implementation::Composite(nested) => {
                    self.instantiate_composite(
                        child_uri.clone(),
                        Some(uri.clone()),
                        nested,
                        component.autowire,
                        component.key.clone(),
                        &component.references,
                        deployable,
                    )?;
                }
            }
            children.push(child_uri);
        }

        // Promotion chains resolve against fully built children, so the
        // composite's own references come last.
        let mut references = Vec::with_capacity(definition.references.len());
        for promoted in &definition.references {
            references.push(self.promote_reference(&uri, promoted)?);
        }

        let composite = self
            .components
            .get_mut(&uri)
            .expect("composite inserted above");
        composite.references = references;
        if let Some(state) = composite.composite_mut() {
            state.children = children;
        }
        self.apply_overrides(&uri, overrides)?;
        Ok(())
    }

    fn instantiate_atomic(
        &mut self,
        uri: Uri,
        parent: Uri,
        component: &ComponentDefinition,
        component_type: &ComponentTypeDefinition,
        deployable: &Option<QName>,
    ) -> Result<(), AssemblyError> {
        if self.components.contains_key(&uri) {
            return Err(AssemblyError::DuplicateComponent(uri));
        }

        let services = component_type
            .services
            .iter()
            .map(|service| LogicalService {
                uri: uri.fragment(&service.name),
                contract: service.contract.clone(),
                intents: service.intents.clone(),
                bindings: service.bindings.clone(),
                management: service.management,
            })
            .collect();

        let references = component_type
            .references
            .iter()
            .map(|reference| {
                let reference_uri = uri.fragment(&reference.name);
                LogicalReference {
                    leaf: reference_uri.clone(),
                    uri: reference_uri,
                    contract: reference.contract.clone(),
                    multiplicity: reference.multiplicity,
                    required: reference.required,
                    keyed: reference.keyed,
                    intents: reference.intents.clone(),
                    concrete_bound: reference.bindings.iter().any(|b| b.is_concrete_sca()),
                    bindings: reference.bindings.clone(),
                    declared_targets: reference.targets.clone(),
                    target_override: None,
                    autowire_scope: None,
                    resolved: false,
                }
            })
            .collect();

        self.components.insert(
            uri.clone(),
            LogicalComponent {
                uri: uri.clone(),
                parent: Some(parent),
                deployable: deployable.clone(),
                autowire: component.autowire,
                key: component.key.clone().or_else(|| component_type.key.clone()),
                services,
                references,
                body: ComponentBody::Atomic,
            },
        );
        self.apply_overrides(&uri, &component.references)
    }

    fn apply_overrides(
        &mut self,
        uri: &Uri,
        overrides: &[ReferenceOverride],
    ) -> Result<(), AssemblyError> {
        for entry in overrides {
            let component = self
                .components
                .get_mut(uri)
                .expect("component inserted before overrides");
            let Some(reference) = component.reference_mut(&entry.name) else {
                return Err(AssemblyError::UnknownReferenceOverride {
                    component: uri.clone(),
                    name: entry.name.clone(),
                });
            };
            if !entry.targets.is_empty() {
                reference.target_override = Some(entry.targets.clone());
            }
            if entry.scope.is_some() {
                reference.autowire_scope = entry.scope.clone();
            }
        }
        Ok(())
    }

    fn promote_reference(
        &self,
        composite: &Uri,
        promoted: &crate::definition::PromotedReferenceDefinition,
    ) -> Result<LogicalReference, AssemblyError> {
        let child_uri = composite.child(promoted.promote.resource().as_str());
        let Some(child) = self.components.get(&child_uri) else {
            return Err(AssemblyError::PromotionTargetNotFound {
                composite: composite.clone(),
                reference: promoted.name.clone(),
                promote: promoted.promote.clone(),
            });
        };

        let target = match promoted.promote.fragment_name() {
            Some(name) => child.reference(name),
            None if child.references.len() == 1 => child.references.first(),
            None => {
                return Err(AssemblyError::PromotionAmbiguous {
                    composite: composite.clone(),
                    reference: promoted.name.clone(),
                    promote: promoted.promote.clone(),
                })
            }
        };
        let Some(target) = target else {
            return Err(AssemblyError::PromotionTargetNotFound {
                composite: composite.clone(),
                reference: promoted.name.clone(),
                promote: promoted.promote.clone(),
            });
        };

        let mut reference = target.clone();
        reference.uri = composite.fragment(&promoted.name);
        // leaf stays pointed at the bottom of the chain. The leaf's own
        // targets are relative to its enclosing composite and stay with
        // the leaf; the promoted alias is wired at this composite's scope.
        reference.declared_targets = Vec::new();
        reference.target_override = None;
        reference.bindings.retain(|b| !b.is_concrete_sca());
        Ok(reference)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contract::Contract;
    use crate::definition::{
        BindingDefinition, ComponentDefinition, PromotedReferenceDefinition, ReferenceDefinition,
        ServiceDefinition, TargetDefinition, SCA_BINDING,
    };

    fn service_component(name: &str, interface: &str) -> ComponentDefinition {
        ComponentDefinition::atomic(
            name,
            ComponentTypeDefinition {
                key: None,
                services: vec![ServiceDefinition::new("svc", Contract::new(interface))],
                references: vec![],
            },
        )
    }

    fn client_component(name: &str, interface: &str) -> ComponentDefinition {
        ComponentDefinition::atomic(
            name,
            ComponentTypeDefinition {
                key: None,
                services: vec![],
                references: vec![ReferenceDefinition::new("r", Contract::new(interface))],
            },
        )
    }

    #[test]
    fn test_instantiate_assigns_uris_and_order() {
        let composite = CompositeDefinition {
            name: "app".into(),
            components: vec![
                client_component("p", "X"),
                service_component("q", "X"),
            ],
            ..Default::default()
        };
        let assembly = LogicalAssembly::instantiate("domain", &composite, None).unwrap();
        assert_eq!(
            assembly.children(assembly.root_uri()),
            &[Uri::new("domain/p"), Uri::new("domain/q")]
        );
        assert!(assembly.reference(&Uri::new("domain/p#r")).is_some());
        assert!(assembly.service(&Uri::new("domain/q#svc")).is_some());
    }

    #[test]
    fn test_key_falls_back_to_component_type() {
        let mut component = service_component("q", "X");
        if let Implementation::Atomic(ct) = &mut component.implementation {
            ct.key = Some("type-key".into());
        }
        let composite = CompositeDefinition {
            name: "app".into(),
            components: vec![component],
            ..Default::default()
        };
        let assembly = LogicalAssembly::instantiate("domain", &composite, None).unwrap();
        let q = assembly.component(&Uri::new("domain/q")).unwrap();
        assert_eq!(q.key.as_deref(), Some("type-key"));
    }

    #[test]
    fn test_concrete_bound_detection() {
        let mut component = client_component("p", "X");
        if let Implementation::Atomic(ct) = &mut component.implementation {
            let mut binding = BindingDefinition::new(SCA_BINDING);
            binding.target = Some(Uri::new("q#svc"));
            ct.references[0].bindings.push(binding);
        }
        let composite = CompositeDefinition {
            name: "app".into(),
            components: vec![component],
            ..Default::default()
        };
        let assembly = LogicalAssembly::instantiate("domain", &composite, None).unwrap();
        let reference = assembly.reference(&Uri::new("domain/p#r")).unwrap();
        assert!(reference.concrete_bound);
    }

    #[test]
    fn test_promotion_resolves_leaf() {
        let inner = CompositeDefinition {
            name: "inner".into(),
            components: vec![client_component("p", "X")],
            references: vec![PromotedReferenceDefinition {
                name: "outer_r".into(),
                promote: Uri::new("p#r"),
            }],
            ..Default::default()
        };
        let composite = CompositeDefinition {
            name: "app".into(),
            components: vec![ComponentDefinition::composite("sub", inner)],
            ..Default::default()
        };
        let assembly = LogicalAssembly::instantiate("domain", &composite, None).unwrap();
        let promoted = assembly.reference(&Uri::new("domain/sub#outer_r")).unwrap();
        assert_eq!(promoted.leaf, Uri::new("domain/sub/p#r"));
    }

    #[test]
    fn test_promotion_leaves_targets_with_the_leaf() {
        let mut component = client_component("p", "X");
        if let Implementation::Atomic(ct) = &mut component.implementation {
            ct.references[0].targets = vec![TargetDefinition::new("inner#svc")];
            let mut binding = BindingDefinition::new(SCA_BINDING);
            binding.target = Some(Uri::new("inner#svc"));
            ct.references[0].bindings.push(binding);
        }
        let inner = CompositeDefinition {
            name: "inner".into(),
            components: vec![component, service_component("inner", "X")],
            references: vec![PromotedReferenceDefinition {
                name: "outer_r".into(),
                promote: Uri::new("p#r"),
            }],
            ..Default::default()
        };
        let composite = CompositeDefinition {
            name: "app".into(),
            components: vec![ComponentDefinition::composite("sub", inner)],
            ..Default::default()
        };
        let assembly = LogicalAssembly::instantiate("domain", &composite, None).unwrap();

        // inner-scope targets stay with the leaf; the alias has none
        let promoted = assembly.reference(&Uri::new("domain/sub#outer_r")).unwrap();
        assert!(promoted.declared_targets.is_empty());
        assert!(promoted.bindings.iter().all(|b| !b.is_concrete_sca()));

        let leaf = assembly.reference(&Uri::new("domain/sub/p#r")).unwrap();
        assert_eq!(leaf.declared_targets.len(), 1);
        assert!(leaf.concrete_bound);
    }

    #[test]
    fn test_promotion_target_missing_is_error() {
        let inner = CompositeDefinition {
            name: "inner".into(),
            components: vec![],
            references: vec![PromotedReferenceDefinition {
                name: "outer_r".into(),
                promote: Uri::new("ghost#r"),
            }],
            ..Default::default()
        };
        let composite = CompositeDefinition {
            name: "app".into(),
            components: vec![ComponentDefinition::composite("sub", inner)],
            ..Default::default()
        };
        let err = LogicalAssembly::instantiate("domain", &composite, None).unwrap_err();
        assert!(matches!(
            err,
            AssemblyError::PromotionTargetNotFound { .. }
        ));
    }

    #[test]
    fn test_effective_autowire_inheritance() {
        let inner = CompositeDefinition {
            name: "inner".into(),
            autowire: Some(false),
            components: vec![client_component("p", "X")],
            ..Default::default()
        };
        let composite = CompositeDefinition {
            name: "app".into(),
            components: vec![
                ComponentDefinition::composite("sub", inner),
                client_component("top", "X"),
            ],
            ..Default::default()
        };
        let assembly = LogicalAssembly::instantiate("domain", &composite, None).unwrap();
        // inherits the inner composite's default
        assert!(!assembly.effective_autowire(&Uri::new("domain/sub/p")));
        // no default anywhere: domain-level autowire is on
        assert!(assembly.effective_autowire(&Uri::new("domain/top")));
    }

    #[test]
    fn test_wire_table_lives_on_parent_composite() {
        let composite = CompositeDefinition {
            name: "app".into(),
            components: vec![client_component("p", "X"), service_component("q", "X")],
            ..Default::default()
        };
        let mut assembly = LogicalAssembly::instantiate("domain", &composite, None).unwrap();
        let source = Uri::new("domain/p#r");
        let target = Uri::new("domain/q#svc");
        assembly.add_wire(LogicalWire::new(source.clone(), target.clone(), None));

        assert_eq!(assembly.wires(&source).len(), 1);
        let root = assembly.component(&Uri::new("domain")).unwrap();
        assert!(root.composite().unwrap().wires.contains_key(&source));
    }

    #[test]
    fn test_mark_provisioned() {
        let composite = CompositeDefinition {
            name: "app".into(),
            components: vec![client_component("p", "X"), service_component("q", "X")],
            ..Default::default()
        };
        let mut assembly = LogicalAssembly::instantiate("domain", &composite, None).unwrap();
        let source = Uri::new("domain/p#r");
        assembly.add_wire(LogicalWire::new(source.clone(), Uri::new("domain/q#svc"), None));
        assembly.mark_provisioned();
        assert_eq!(assembly.wires(&source)[0].state, WireState::Provisioned);
    }
}
