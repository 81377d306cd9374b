//! Error accumulation for a resolution pass.

use crate::error::WiringError;

/// Collects wiring failures without aborting the pass, so one deployment
/// attempt surfaces every configuration problem at once. The caller checks
/// `has_errors` after the full tree walk and decides whether to proceed to
/// physical generation.
#[derive(Debug, Default)]
pub struct InstantiationContext {
    errors: Vec<WiringError>,
}

impl InstantiationContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_error(&mut self, error: WiringError) {
        self.errors.push(error);
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    pub fn errors(&self) -> &[WiringError] {
        &self.errors
    }

    pub fn into_errors(self) -> Vec<WiringError> {
        self.errors
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scawire_model::Uri;

    #[test]
    fn test_errors_accumulate_in_order() {
        let mut ctx = InstantiationContext::new();
        assert!(!ctx.has_errors());

        ctx.add_error(WiringError::TargetNotFound {
            reference: Uri::new("domain/a#r"),
        });
        ctx.add_error(WiringError::SourceNoReference {
            component: Uri::new("domain/b"),
        });

        assert!(ctx.has_errors());
        assert_eq!(ctx.errors().len(), 2);
        assert!(matches!(ctx.errors()[0], WiringError::TargetNotFound { .. }));
    }
}
