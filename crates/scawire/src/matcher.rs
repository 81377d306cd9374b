//! Contract compatibility checking.
//!
//! The engine never interprets contracts itself; it asks a `ContractMatcher`
//! whether a reference contract can be satisfied by a service contract.
//! Explicit wiring uses strict mode; autowire uses loose mode, which is
//! best-effort by design.

use scawire_model::Contract;

/// Outcome of an assignability check.
#[derive(Debug, Clone)]
pub struct MatchResult {
    pub assignable: bool,
    /// Diagnostic for the failure case, surfaced in wiring errors.
    pub reason: Option<String>,
}

impl MatchResult {
    pub fn assignable() -> Self {
        Self {
            assignable: true,
            reason: None,
        }
    }

    pub fn rejected(reason: impl Into<String>) -> Self {
        Self {
            assignable: false,
            reason: Some(reason.into()),
        }
    }
}

/// Decides whether a service contract can satisfy a reference contract.
pub trait ContractMatcher {
    fn is_assignable(&self, source: &Contract, target: &Contract, strict: bool) -> MatchResult;
}

/// Name-based matcher used when no richer type system is plugged in.
///
/// Loose mode compares interface names only. Strict mode additionally
/// requires the target to declare every operation the source declares.
#[derive(Debug, Default)]
pub struct DefaultContractMatcher;

impl ContractMatcher for DefaultContractMatcher {
    fn is_assignable(&self, source: &Contract, target: &Contract, strict: bool) -> MatchResult {
        if source.interface != target.interface {
            return MatchResult::rejected(format!(
                "interface '{}' is not assignable from '{}'",
                source.interface, target.interface
            ));
        }
        if strict {
            let missing: Vec<&str> = source
                .operations
                .difference(&target.operations)
                .map(String::as_str)
                .collect();
            if !missing.is_empty() {
                return MatchResult::rejected(format!(
                    "target does not implement operation(s): {}",
                    missing.join(", ")
                ));
            }
        }
        MatchResult::assignable()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_interface_name_mismatch_rejected_in_both_modes() {
        let matcher = DefaultContractMatcher;
        let source = Contract::new("X");
        let target = Contract::new("Y");
        assert!(!matcher.is_assignable(&source, &target, true).assignable);
        assert!(!matcher.is_assignable(&source, &target, false).assignable);
    }

    #[test]
    fn test_strict_requires_operation_coverage() {
        let matcher = DefaultContractMatcher;
        let source = Contract::with_operations("X", ["get", "put"]);
        let target = Contract::with_operations("X", ["get"]);

        let strict = matcher.is_assignable(&source, &target, true);
        assert!(!strict.assignable);
        assert!(strict.reason.unwrap().contains("put"));

        // loose mode ignores operations
        assert!(matcher.is_assignable(&source, &target, false).assignable);
    }

    #[test]
    fn test_superset_target_accepted_strictly() {
        let matcher = DefaultContractMatcher;
        let source = Contract::with_operations("X", ["get"]);
        let target = Contract::with_operations("X", ["get", "put"]);
        assert!(matcher.is_assignable(&source, &target, true).assignable);
    }
}
