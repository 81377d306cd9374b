//! Autowire resolution.
//!
//! Wires unresolved references to sibling services by contract, without any
//! declared target. Candidates are scanned in child declaration order and
//! the first loose match wins for single-valued references; multi-valued
//! references collect every match in the scope. Matching here is loose and
//! best-effort: a sibling that does not match is simply skipped, never an
//! error. The only autowire error is a required reference left with no
//! target at the end of the pass.

use std::collections::{BTreeSet, HashSet};

use scawire_model::{Contract, LogicalAssembly, LogicalWire, QName, Uri, WireState};
use tracing::debug;

use crate::context::InstantiationContext;
use crate::error::WiringError;
use crate::matcher::ContractMatcher;

/// Resolves untargeted references against sibling services.
pub struct AutowireInstantiator<'m> {
    matcher: &'m dyn ContractMatcher,
}

/// Immutable view of a reference taken before the assembly is mutated.
struct ReferenceView {
    uri: Uri,
    leaf: Uri,
    contract: Contract,
    intents: BTreeSet<String>,
    keyed: bool,
    multi: bool,
    required: bool,
    scope_override: Option<Uri>,
}

/// A sibling service selected as an autowire target.
struct Candidate {
    service: Uri,
    deployable: Option<QName>,
}

impl<'m> AutowireInstantiator<'m> {
    pub fn new(matcher: &'m dyn ContractMatcher) -> Self {
        Self { matcher }
    }

    /// Autowire the references of `component`, then verify that every
    /// required reference ended up with at least one wire.
    ///
    /// The required-target check runs even when autowire is disabled for the
    /// component, so a disabled scope still reports dangling references.
    pub fn autowire_component(
        &self,
        assembly: &mut LogicalAssembly,
        component: &Uri,
        ctx: &mut InstantiationContext,
    ) {
        let Some(owner) = assembly.component(component) else {
            return;
        };
        let Some(parent) = owner.parent.clone() else {
            return;
        };
        let enabled = assembly.effective_autowire(component);
        let promoted = assembly.promoted_leaves();

        let views: Vec<ReferenceView> = assembly
            .component(component)
            .map(|owner| {
                owner
                    .references
                    .iter()
                    .filter(|r| !r.concrete_bound)
                    .filter(|r| r.configured_targets().is_empty())
                    // A promoted leaf is wired at the promoting composite's
                    // scope, never here.
                    .filter(|r| r.uri != r.leaf || !promoted.contains(&r.leaf))
                    // A promoted alias whose leaf declares its own targets
                    // is wired by the leaf's explicit phase instead.
                    .filter(|r| {
                        r.uri == r.leaf
                            || assembly
                                .reference(&r.leaf)
                                .is_none_or(|leaf| leaf.configured_targets().is_empty())
                    })
                    .map(|r| ReferenceView {
                        uri: r.uri.clone(),
                        leaf: r.leaf.clone(),
                        contract: r.contract.clone(),
                        intents: r.intents.clone(),
                        keyed: r.keyed,
                        multi: r.multiplicity.is_multi(),
                        required: r.required,
                        scope_override: r.autowire_scope.clone(),
                    })
                    .collect()
            })
            .unwrap_or_default();

        for view in views {
            if enabled {
                self.resolve_reference(assembly, component, &parent, &view);
            }
            let wired = !assembly.wires(&view.leaf).is_empty();
            if wired {
                if let Some(reference) = assembly.reference_mut(&view.uri) {
                    reference.resolved = true;
                }
            } else if view.required {
                ctx.add_error(WiringError::TargetNotFound {
                    reference: view.uri.clone(),
                });
            }
        }
    }

    /// Scan the reference's scopes for candidates and wire the new ones.
    fn resolve_reference(
        &self,
        assembly: &mut LogicalAssembly,
        owner: &Uri,
        parent: &Uri,
        view: &ReferenceView,
    ) {
        let mut seen: HashSet<Uri> = assembly
            .wires(&view.leaf)
            .iter()
            .map(|wire| wire.target.clone())
            .collect();
        // A single-valued reference never grows past one wire.
        if !view.multi && !seen.is_empty() {
            return;
        }

        let mut added = false;
        'scopes: for scope in self.scopes(assembly, parent, view) {
            let candidates = self.collect_candidates(assembly, &scope, owner, view);
            let yielded = !candidates.is_empty();
            for candidate in candidates {
                if !seen.insert(candidate.service.clone()) {
                    continue;
                }
                debug!(
                    reference = %view.leaf,
                    target = %candidate.service,
                    "autowired reference"
                );
                assembly.add_wire(LogicalWire::new(
                    view.leaf.clone(),
                    candidate.service,
                    candidate.deployable,
                ));
                added = true;
                if !view.multi {
                    break 'scopes;
                }
            }
            // A scope that yields candidates shadows the enclosing one,
            // even when every candidate is already wired.
            if yielded {
                break;
            }
        }

        // The wire set changed shape: surviving provisioned wires must be
        // reinjected alongside the new ones.
        if added {
            if let Some(wires) = assembly.wires_mut(&view.leaf) {
                for wire in wires {
                    wire.state = WireState::New;
                }
            }
        }
    }

    /// Scopes to scan, in priority order: the configured scope override if
    /// set, then the enclosing composite.
    fn scopes(
        &self,
        assembly: &LogicalAssembly,
        parent: &Uri,
        view: &ReferenceView,
    ) -> Vec<Uri> {
        let mut scopes = Vec::with_capacity(2);
        if let Some(scope) = &view.scope_override {
            // Absolute URI first, else a name relative to the enclosing
            // composite.
            if assembly.component(scope).is_some() {
                scopes.push(scope.clone());
            } else {
                let relative = parent.child(scope.as_str());
                if assembly.component(&relative).is_some() {
                    scopes.push(relative);
                }
            }
        }
        scopes.push(parent.clone());
        scopes
    }

    /// Matching sibling services in child declaration order. At most one
    /// service per sibling; the owning component is never a candidate.
    fn collect_candidates(
        &self,
        assembly: &LogicalAssembly,
        scope: &Uri,
        owner: &Uri,
        view: &ReferenceView,
    ) -> Vec<Candidate> {
        let mut candidates = Vec::new();
        for child_uri in assembly.children(scope) {
            if child_uri == owner {
                continue;
            }
            let Some(child) = assembly.component(child_uri) else {
                continue;
            };
            if view.keyed && child.key.is_none() {
                continue;
            }
            let matched = child.services.iter().find(|service| {
                !service.management
                    && view.intents.is_subset(&service.intents)
                    && self
                        .matcher
                        .is_assignable(&view.contract, &service.contract, false)
                        .assignable
            });
            if let Some(service) = matched {
                candidates.push(Candidate {
                    service: service.uri.clone(),
                    deployable: child.deployable.clone(),
                });
                if !view.multi {
                    break;
                }
            }
        }
        candidates
    }
}
