//! Service contracts.
//!
//! A contract is the typed surface a service exposes and a reference expects.
//! The model treats it as data; only a `ContractMatcher` implementation in the
//! engine decides assignability between two contracts.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// The contract advertised by a service or required by a reference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contract {
    /// Interface name, e.g. `org.example/Catalog`.
    pub interface: String,
    /// Declared operations. May be empty when the descriptor only names the
    /// interface; matchers decide how much weight to give this.
    #[serde(default)]
    pub operations: BTreeSet<String>,
}

impl Contract {
    pub fn new(interface: impl Into<String>) -> Self {
        Self {
            interface: interface.into(),
            operations: BTreeSet::new(),
        }
    }

    pub fn with_operations<I, S>(interface: impl Into<String>, operations: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            interface: interface.into(),
            operations: operations.into_iter().map(Into::into).collect(),
        }
    }
}
