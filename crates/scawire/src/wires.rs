//! Explicit wire instantiation.
//!
//! Turns declared wiring information (composite-scope `wire` declarations,
//! component-level reference targets, concrete SCA binding targets) into
//! logical wires, enforcing contract and binding compatibility along the
//! way. Each failing wire is recorded and skipped so one pass collates
//! every configuration error in a composite.

use scawire_model::{
    BindingDefinition, Contract, LogicalAssembly, LogicalWire, QName, TargetDefinition, Uri,
};
use tracing::debug;

use crate::context::InstantiationContext;
use crate::error::WiringError;
use crate::matcher::ContractMatcher;

/// Instantiates explicitly declared wires.
pub struct WireInstantiator<'m> {
    matcher: &'m dyn ContractMatcher,
}

/// Immutable view of a reference taken before the assembly is mutated.
struct ReferenceView {
    uri: Uri,
    leaf: Uri,
    contract: Contract,
    keyed: bool,
    bindings: Vec<BindingDefinition>,
    targets: Vec<TargetDefinition>,
}

/// A target service that passed validation.
struct ResolvedService {
    uri: Uri,
    bindings: Vec<BindingDefinition>,
    deployable: Option<QName>,
}

impl<'m> WireInstantiator<'m> {
    pub fn new(matcher: &'m dyn ContractMatcher) -> Self {
        Self { matcher }
    }

    /// Instantiate the composite-scope wire declarations of `composite`.
    ///
    /// Each declaration resolves independently; an error in one wire never
    /// stops the others.
    pub fn instantiate_composite_wires(
        &self,
        assembly: &mut LogicalAssembly,
        composite: &Uri,
        ctx: &mut InstantiationContext,
    ) {
        let definitions = assembly
            .component(composite)
            .and_then(|c| c.composite())
            .map(|state| state.wire_definitions.clone())
            .unwrap_or_default();

        for definition in definitions {
            let Some(source) = self.resolve_source(assembly, composite, &definition.source, ctx)
            else {
                continue;
            };
            let Some(service) =
                self.resolve_service(assembly, composite, &definition.target, &source, ctx)
            else {
                continue;
            };

            let mut wire = LogicalWire::new(source.leaf.clone(), service.uri, service.deployable);
            wire.replaces = definition.replaces;
            debug!(
                source = %wire.source,
                target = %wire.target,
                replaces = wire.replaces,
                "instantiated composite wire"
            );
            assembly.add_wire(wire);
        }
    }

    /// Instantiate wires for the configured targets of every reference on
    /// `component`.
    pub fn instantiate_reference_wires(
        &self,
        assembly: &mut LogicalAssembly,
        component: &Uri,
        ctx: &mut InstantiationContext,
    ) {
        let Some(owner) = assembly.component(component) else {
            return;
        };
        let Some(scope) = owner.parent.clone() else {
            return;
        };
        let references: Vec<ReferenceView> = owner
            .references
            .iter()
            .map(|reference| ReferenceView {
                uri: reference.uri.clone(),
                leaf: reference.leaf.clone(),
                contract: reference.contract.clone(),
                keyed: reference.keyed,
                bindings: reference.bindings.clone(),
                targets: reference.configured_targets(),
            })
            .collect();

        for reference in references {
            // A composite wire with replaces=true overrides any
            // target-declared wiring for this reference.
            if assembly.wires(&reference.leaf).iter().any(|w| w.replaces) {
                debug!(reference = %reference.uri, "composite wire override in effect");
                self.mark_resolved(assembly, &reference.uri);
                continue;
            }
            if reference.targets.is_empty() {
                continue;
            }

            let mut wired = false;
            for target in &reference.targets {
                let Some(service) =
                    self.resolve_service(assembly, &scope, &target.uri, &reference, ctx)
                else {
                    continue;
                };
                let Some((source_binding, target_binding)) =
                    self.resolve_bindings(&reference, &service, target, ctx)
                else {
                    continue;
                };

                let mut wire =
                    LogicalWire::new(reference.leaf.clone(), service.uri, service.deployable);
                wire.source_binding = source_binding;
                wire.target_binding = target_binding;
                debug!(source = %wire.source, target = %wire.target, "instantiated reference wire");
                assembly.add_wire(wire);
                wired = true;
            }
            if wired {
                self.mark_resolved(assembly, &reference.uri);
            }
        }
    }

    fn mark_resolved(&self, assembly: &mut LogicalAssembly, reference: &Uri) {
        if let Some(reference) = assembly.reference_mut(reference) {
            reference.resolved = true;
        }
    }

    /// Resolve a wire's source reference, defaulting to the component's sole
    /// reference when the declaration names none.
    fn resolve_source(
        &self,
        assembly: &LogicalAssembly,
        composite: &Uri,
        source: &Uri,
        ctx: &mut InstantiationContext,
    ) -> Option<ReferenceView> {
        let component_uri = composite.child(source.resource().as_str());
        let Some(component) = assembly.component(&component_uri) else {
            ctx.add_error(WiringError::SourceComponentNotFound {
                composite: composite.clone(),
                uri: component_uri,
            });
            return None;
        };

        let reference = match source.fragment_name() {
            Some(name) => match component.reference(name) {
                Some(reference) => reference,
                None => {
                    ctx.add_error(WiringError::ReferenceNotFound {
                        component: component_uri,
                        name: name.to_string(),
                    });
                    return None;
                }
            },
            None => match component.references.as_slice() {
                [] => {
                    ctx.add_error(WiringError::SourceNoReference {
                        component: component_uri,
                    });
                    return None;
                }
                [only] => only,
                _ => {
                    ctx.add_error(WiringError::AmbiguousReference {
                        component: component_uri,
                    });
                    return None;
                }
            },
        };

        Some(ReferenceView {
            uri: reference.uri.clone(),
            leaf: reference.leaf.clone(),
            contract: reference.contract.clone(),
            keyed: reference.keyed,
            bindings: reference.bindings.clone(),
            targets: Vec::new(),
        })
    }

    /// Resolve and validate a target service: named fragment or the sole
    /// non-management service, then the keyed-reference check and a strict
    /// contract match.
    fn resolve_service(
        &self,
        assembly: &LogicalAssembly,
        composite: &Uri,
        target: &Uri,
        source: &ReferenceView,
        ctx: &mut InstantiationContext,
    ) -> Option<ResolvedService> {
        let component_uri = composite.child(target.resource().as_str());
        let Some(component) = assembly.component(&component_uri) else {
            ctx.add_error(WiringError::TargetComponentNotFound {
                composite: composite.clone(),
                uri: component_uri,
            });
            return None;
        };

        let service = match target.fragment_name() {
            Some(name) => match component.service(name) {
                Some(service) => service,
                None => {
                    ctx.add_error(WiringError::ServiceNotFound {
                        component: component_uri,
                        name: name.to_string(),
                    });
                    return None;
                }
            },
            None => {
                let mut candidates = component.services.iter().filter(|s| !s.management);
                match (candidates.next(), candidates.next()) {
                    (Some(only), None) => only,
                    (None, _) => {
                        ctx.add_error(WiringError::TargetNoService {
                            component: component_uri,
                        });
                        return None;
                    }
                    (Some(_), Some(_)) => {
                        ctx.add_error(WiringError::AmbiguousService {
                            component: component_uri,
                        });
                        return None;
                    }
                }
            }
        };

        if source.keyed && component.key.is_none() {
            ctx.add_error(WiringError::KeyNotFound {
                reference: source.uri.clone(),
                target: component_uri,
            });
            return None;
        }

        // Explicit wiring is strict, unlike autowire.
        let result = self
            .matcher
            .is_assignable(&source.contract, &service.contract, true);
        if !result.assignable {
            ctx.add_error(WiringError::IncompatibleContracts {
                reference: source.uri.clone(),
                target: service.uri.clone(),
                reason: result.reason.unwrap_or_default(),
            });
            return None;
        }

        Some(ResolvedService {
            uri: service.uri.clone(),
            bindings: service.bindings.clone(),
            deployable: component.deployable.clone(),
        })
    }

    /// Resolve the declared binding pairing of a target, if any.
    ///
    /// A target-side binding name selects a service binding; a source-side
    /// name selects a reference binding. When only the target names one, a
    /// reference binding of the same type is selected if present. A type
    /// mismatch between the two resolved bindings fails the wire.
    fn resolve_bindings(
        &self,
        source: &ReferenceView,
        service: &ResolvedService,
        target: &TargetDefinition,
        ctx: &mut InstantiationContext,
    ) -> Option<(Option<BindingDefinition>, Option<BindingDefinition>)> {
        let target_binding = match &target.binding {
            Some(name) => match find_binding(&service.bindings, name) {
                Some(binding) => Some(binding.clone()),
                None => {
                    ctx.add_error(WiringError::BindingNotFound {
                        bindable: service.uri.clone(),
                        name: name.clone(),
                    });
                    return None;
                }
            },
            None => None,
        };

        let source_binding = match &target.source_binding {
            Some(name) => match find_binding(&source.bindings, name) {
                Some(binding) => Some(binding.clone()),
                None => {
                    ctx.add_error(WiringError::BindingNotFound {
                        bindable: source.uri.clone(),
                        name: name.clone(),
                    });
                    return None;
                }
            },
            None => target_binding.as_ref().and_then(|tb| {
                source
                    .bindings
                    .iter()
                    .find(|b| b.binding_type == tb.binding_type)
                    .cloned()
            }),
        };

        if let (Some(sb), Some(tb)) = (&source_binding, &target_binding) {
            if sb.binding_type != tb.binding_type {
                ctx.add_error(WiringError::IncompatibleBindings {
                    reference: source.uri.clone(),
                    target: service.uri.clone(),
                    source_type: sb.binding_type.clone(),
                    target_type: tb.binding_type.clone(),
                });
                return None;
            }
        }

        Some((source_binding, target_binding))
    }
}

fn find_binding<'a>(bindings: &'a [BindingDefinition], name: &str) -> Option<&'a BindingDefinition> {
    bindings
        .iter()
        .find(|binding| binding.name.as_deref() == Some(name))
}
