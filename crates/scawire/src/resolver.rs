//! Top-level resolution pass over a logical assembly.
//!
//! Walks the composite tree from the domain root. At each composite the
//! explicit phases run before autowire: composite-scope wire declarations,
//! then reference targets on each child, then autowire for whatever is
//! still unresolved. Outer scopes run before inner ones so a promoting
//! composite claims its leaf wires before the nested pass sees them.

use scawire_model::{LogicalAssembly, Uri};
use tracing::{debug, info};

use crate::autowire::AutowireInstantiator;
use crate::context::InstantiationContext;
use crate::error::WiringError;
use crate::matcher::ContractMatcher;
use crate::wires::WireInstantiator;

/// Run a full wiring pass over the assembly.
///
/// Errors are accumulated, never short-circuited: the returned list holds
/// every wiring problem found in the tree, in discovery order. An empty
/// list means the assembly is fully wired.
pub fn resolve_wires(
    assembly: &mut LogicalAssembly,
    matcher: &dyn ContractMatcher,
) -> Vec<WiringError> {
    let mut ctx = InstantiationContext::new();
    let root = assembly.root_uri().clone();
    info!(root = %root, "resolving wires");
    resolve_composite(assembly, matcher, &root, &mut ctx);
    if ctx.has_errors() {
        debug!(errors = ctx.errors().len(), "wiring pass finished with errors");
    }
    ctx.into_errors()
}

fn resolve_composite(
    assembly: &mut LogicalAssembly,
    matcher: &dyn ContractMatcher,
    composite: &Uri,
    ctx: &mut InstantiationContext,
) {
    let wires = WireInstantiator::new(matcher);
    let autowire = AutowireInstantiator::new(matcher);
    let children: Vec<Uri> = assembly.children(composite).to_vec();

    wires.instantiate_composite_wires(assembly, composite, ctx);
    for child in &children {
        wires.instantiate_reference_wires(assembly, child, ctx);
    }
    for child in &children {
        autowire.autowire_component(assembly, child, ctx);
    }
    for child in &children {
        let is_composite = assembly.component(child).is_some_and(|c| c.is_composite());
        if is_composite {
            resolve_composite(assembly, matcher, child, ctx);
        }
    }
}
