//! Structured wiring failures.
//!
//! Every variant carries the URIs needed to produce a standalone diagnostic.
//! These are data problems, not programming errors: the resolution pass
//! records them in the instantiation context and keeps going.

use scawire_model::Uri;
use thiserror::Error;

#[derive(Debug, Clone, Error)]
pub enum WiringError {
    #[error("wire source component '{uri}' not found in composite '{composite}'")]
    SourceComponentNotFound { composite: Uri, uri: Uri },

    #[error("wire source component '{component}' declares no references")]
    SourceNoReference { component: Uri },

    #[error("wire source component '{component}' has more than one reference; the wire must name one")]
    AmbiguousReference { component: Uri },

    #[error("reference '{name}' not found on component '{component}'")]
    ReferenceNotFound { component: Uri, name: String },

    #[error("wire target component '{uri}' not found in composite '{composite}'")]
    TargetComponentNotFound { composite: Uri, uri: Uri },

    #[error("wire target component '{component}' declares no services")]
    TargetNoService { component: Uri },

    #[error("wire target component '{component}' has more than one service; the wire must name one")]
    AmbiguousService { component: Uri },

    #[error("service '{name}' not found on component '{component}'")]
    ServiceNotFound { component: Uri, name: String },

    #[error("binding '{name}' not found on '{bindable}'")]
    BindingNotFound { bindable: Uri, name: String },

    #[error("incompatible bindings between '{reference}' (type '{source_type}') and '{target}' (type '{target_type}')")]
    IncompatibleBindings {
        reference: Uri,
        target: Uri,
        source_type: String,
        target_type: String,
    },

    #[error("contract of reference '{reference}' is incompatible with service '{target}': {reason}")]
    IncompatibleContracts {
        reference: Uri,
        target: Uri,
        reason: String,
    },

    #[error("keyed reference '{reference}' targets component '{target}', which declares no key")]
    KeyNotFound { reference: Uri, target: Uri },

    #[error("no target found for required reference '{reference}'")]
    TargetNotFound { reference: Uri },
}
