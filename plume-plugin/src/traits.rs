//! Plugin traits

use std::sync::Arc;

/// Behaviour shared by every constructed plugin object.
///
/// A family's object type is usually a trait object whose trait extends
/// `Plugin`, e.g. `dyn DataPlugin`.
pub trait Plugin: Send + Sync {
    /// Inactive plugins are skipped by `Family::iter_active` but can still
    /// be created by alias.
    fn is_active(&self) -> bool {
        true
    }
}

/// Builds a plugin object from the family's construction arguments
pub type Constructor<P, A> = Arc<dyn Fn(&A) -> Box<P> + Send + Sync>;
