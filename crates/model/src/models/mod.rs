//! Built-in record models.

pub mod tobject;
pub mod tstring;

use crate::ModelRegistry;

/// Installs every built-in model into `registry`.
pub fn register_builtin_models(registry: &mut ModelRegistry) {
    tobject::register(registry);
    tstring::register(registry);
}
