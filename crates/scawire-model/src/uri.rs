//! Hierarchical URIs for addressing components, references and services.
//!
//! Component URIs are slash-delimited paths rooted at the domain composite,
//! e.g. `domain/store/inventory`. A fragment names a reference or service on
//! that component: `domain/store/inventory#catalog`.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Address of a component, or of a reference/service when a fragment is set.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Uri(String);

impl Uri {
    pub fn new(uri: impl Into<String>) -> Self {
        Self(uri.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Append a child segment to a component URI.
    ///
    /// The fragment, if any, is dropped: children hang off components, not
    /// off their references or services.
    pub fn child(&self, name: &str) -> Uri {
        Uri(format!("{}/{}", self.resource_str(), name))
    }

    /// The same URI with a fragment naming a reference or service.
    pub fn fragment(&self, name: &str) -> Uri {
        Uri(format!("{}#{}", self.resource_str(), name))
    }

    /// The component part of the URI, with any fragment stripped.
    pub fn resource(&self) -> Uri {
        Uri(self.resource_str().to_string())
    }

    /// The fragment name, if one is set.
    pub fn fragment_name(&self) -> Option<&str> {
        self.0.rsplit_once('#').map(|(_, frag)| frag)
    }

    /// Parent component URI, or `None` at the domain root.
    pub fn parent(&self) -> Option<Uri> {
        self.resource_str()
            .rsplit_once('/')
            .map(|(parent, _)| Uri(parent.to_string()))
    }

    /// Last path segment of the component part.
    pub fn name(&self) -> &str {
        let resource = self.resource_str();
        resource.rsplit_once('/').map_or(resource, |(_, name)| name)
    }

    fn resource_str(&self) -> &str {
        self.0.split_once('#').map_or(self.0.as_str(), |(res, _)| res)
    }
}

impl fmt::Display for Uri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Uri {
    fn from(uri: &str) -> Self {
        Uri::new(uri)
    }
}
