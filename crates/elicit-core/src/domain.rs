use crate::error::{ElicitError, Result};
use crate::export::ExportFormat;
use crate::question::Question;
use crate::rule::ConflictRule;
use serde_json::{json, Value};

// ---------------------------------------------------------------------------
// Domain
// ---------------------------------------------------------------------------

/// The capability set a pluggable subject-matter package must satisfy:
/// metadata accessors, the four typed collections, and serialization.
///
/// A domain is a static bundle — the engines never construct questions or
/// rules, they only load what a domain hands them. The trait keeps concrete
/// domains polymorphic so several (programming, business, architecture, ...)
/// can coexist in one registry under distinct ids.
pub trait Domain: Send + Sync {
    fn id(&self) -> &str;
    fn name(&self) -> &str;
    fn version(&self) -> &str;

    fn description(&self) -> &str {
        ""
    }

    fn categories(&self) -> Vec<String>;
    fn questions(&self) -> Vec<Question>;
    fn export_formats(&self) -> Vec<ExportFormat>;
    fn conflict_rules(&self) -> Vec<ConflictRule>;

    /// The full bundle as a JSON object, for hand-off to a persistence or
    /// transport layer owned elsewhere.
    fn to_value(&self) -> Result<Value> {
        Ok(json!({
            "id": self.id(),
            "name": self.name(),
            "version": self.version(),
            "description": self.description(),
            "categories": self.categories(),
            "questions": serde_json::to_value(self.questions())?,
            "export_formats": serde_json::to_value(self.export_formats())?,
            "conflict_rules": serde_json::to_value(self.conflict_rules())?,
        }))
    }
}

impl std::fmt::Debug for dyn Domain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Domain")
            .field("id", &self.id())
            .field("name", &self.name())
            .field("version", &self.version())
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Contract verification
// ---------------------------------------------------------------------------

/// Content-level contract check, run at registration (and on every lazily
/// built instance). The trait itself guarantees the accessors exist; this
/// rejects bundles whose content cannot serve the engines.
pub fn verify_domain(domain: &dyn Domain) -> Result<()> {
    let fail = |reason: String| {
        Err(ElicitError::InvalidDomain {
            id: domain.id().to_string(),
            reason,
        })
    };

    if domain.id().trim().is_empty() {
        return fail("empty id".to_string());
    }
    if domain.name().trim().is_empty() {
        return fail("empty name".to_string());
    }
    if domain.version().trim().is_empty() {
        return fail("empty version".to_string());
    }

    let categories = domain.categories();
    if categories.is_empty() {
        return fail("no categories declared".to_string());
    }

    let questions = domain.questions();
    for category in &categories {
        if !questions.iter().any(|q| &q.category == category) {
            return fail(format!("declared category '{category}' has no questions"));
        }
    }

    for format in domain.export_formats() {
        if format.template.trim().is_empty() {
            return fail(format!(
                "export format '{}' has no template reference",
                format.language
            ));
        }
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
