//! Built-in subject-matter domains: static bundles of questions, export
//! formats, and conflict rules implementing the `Domain` contract from
//! `elicit-core`.

pub mod business;
pub mod programming;

pub use business::BusinessDomain;
pub use programming::ProgrammingDomain;

use elicit_core::{DomainRegistry, Result};
use std::sync::Arc;

/// Register every built-in domain. The programming domain is registered
/// eagerly; the business domain goes in as a factory, so it is only built
/// if something asks for it.
pub fn register_builtins(registry: &mut DomainRegistry) -> Result<()> {
    registry.register(Arc::new(ProgrammingDomain))?;
    registry.register_factory("business", || Arc::new(BusinessDomain))?;
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
