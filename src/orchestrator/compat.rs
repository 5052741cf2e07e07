//! Module compatibility checking
//!
//! Pairwise incompatibility is a symmetric relation: the pair is blocked
//! whichever side declares it, so both modules' declarations are consulted.
//! The check runs before every activation, not only at install time, because
//! activation is when conflicting runtime behavior actually manifests.

use tracing::debug;

use crate::catalog::ModuleCatalog;
use crate::lifecycle::ProvisionError;

/// Pairwise compatibility checker over an injected catalog
pub struct CompatibilityChecker<'a> {
    catalog: &'a ModuleCatalog,
}

impl<'a> CompatibilityChecker<'a> {
    /// Create a checker over the given catalog
    pub fn new(catalog: &'a ModuleCatalog) -> Self {
        Self { catalog }
    }

    /// Check a candidate against the currently active module set
    ///
    /// Returns `IncompatibleModules` naming the candidate and the first
    /// conflicting active module.
    pub fn check<S: AsRef<str>>(
        &self,
        candidate: &str,
        active: &[S],
    ) -> Result<(), ProvisionError> {
        let candidate_descriptor = self.catalog.get(candidate);

        for active_id in active {
            let active_id = active_id.as_ref();
            if active_id == candidate {
                continue;
            }

            let declared_by_candidate = candidate_descriptor
                .map(|d| d.declares_incompatible(active_id))
                .unwrap_or(false);
            let declared_by_active = self
                .catalog
                .get(active_id)
                .map(|d| d.declares_incompatible(candidate))
                .unwrap_or(false);

            if declared_by_candidate || declared_by_active {
                debug!(
                    "Incompatible pair: {} and {} (declared by {})",
                    candidate,
                    active_id,
                    if declared_by_candidate { candidate } else { active_id },
                );
                return Err(ProvisionError::IncompatibleModules(
                    candidate.to_string(),
                    active_id.to_string(),
                ));
            }
        }
        Ok(())
    }
}
