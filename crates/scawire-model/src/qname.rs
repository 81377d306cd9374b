//! Qualified names for deployable identifiers.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A namespaced name identifying the deployment unit a component belongs to.
///
/// Rendered as `namespace#local`. The deployable governs teardown grouping:
/// a wire carries the deployable of its *target* so it is removed when the
/// target's deployment unit goes away.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct QName {
    namespace: String,
    local: String,
}

#[derive(Debug, Error)]
#[error("invalid qualified name '{0}', expected 'namespace#local'")]
pub struct QNameParseError(String);

impl QName {
    pub fn new(namespace: impl Into<String>, local: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            local: local.into(),
        }
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn local(&self) -> &str {
        &self.local
    }
}

impl FromStr for QName {
    type Err = QNameParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.split_once('#') {
            Some((ns, local)) if !ns.is_empty() && !local.is_empty() => {
                Ok(QName::new(ns, local))
            }
            _ => Err(QNameParseError(s.to_string())),
        }
    }
}

impl TryFrom<String> for QName {
    type Error = QNameParseError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<QName> for String {
    fn from(qname: QName) -> String {
        qname.to_string()
    }
}

impl fmt::Display for QName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.namespace, self.local)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_round_trip() {
        let qname: QName = "urn:example#app".parse().unwrap();
        assert_eq!(qname.namespace(), "urn:example");
        assert_eq!(qname.local(), "app");
        assert_eq!(qname.to_string(), "urn:example#app");
    }

    #[test]
    fn test_parse_rejects_missing_separator() {
        assert!("no-separator".parse::<QName>().is_err());
        assert!("#local".parse::<QName>().is_err());
        assert!("ns#".parse::<QName>().is_err());
    }
}
