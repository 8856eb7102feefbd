use crate::domain::{verify_domain, Domain};
use crate::error::{ElicitError, Result};
use serde_json::{Map, Value};
use std::sync::{Arc, Mutex, OnceLock, PoisonError};
use tracing::{debug, info};

// ---------------------------------------------------------------------------
// DomainEntry
// ---------------------------------------------------------------------------

type DomainFactory = Box<dyn Fn() -> Arc<dyn Domain> + Send>;

/// A registered domain: either a ready instance, or a factory that builds
/// one on first `get` and is replaced by the cached result.
enum DomainEntry {
    Ready(Arc<dyn Domain>),
    Pending(DomainFactory),
}

// ---------------------------------------------------------------------------
// DomainRegistry
// ---------------------------------------------------------------------------

/// Single source of truth mapping domain id to a (lazily instantiated)
/// `Domain`. Registration order is preserved; lookups are linear scans over
/// a handful of entries.
///
/// The process-wide instance lives behind `get_domain_registry()`; the type
/// stays independently constructible so tests can build isolated registries
/// instead of mutating global state.
#[derive(Default)]
pub struct DomainRegistry {
    entries: Vec<(String, DomainEntry)>,
}

impl DomainRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn position(&self, id: &str) -> Option<usize> {
        self.entries.iter().position(|(entry_id, _)| entry_id == id)
    }

    /// Register a ready domain instance. The instance is verified against
    /// the content contract before it is accepted.
    pub fn register(&mut self, domain: Arc<dyn Domain>) -> Result<()> {
        verify_domain(domain.as_ref())?;
        let id = domain.id().to_string();
        if self.position(&id).is_some() {
            return Err(ElicitError::DomainExists(id));
        }
        info!(domain = %id, "registered domain");
        self.entries.push((id, DomainEntry::Ready(domain)));
        Ok(())
    }

    /// Register a zero-argument factory under `id`, deferring construction
    /// (and content verification) to the first `get`. Expensive domains are
    /// built only when actually requested.
    pub fn register_factory<F>(&mut self, id: impl Into<String>, factory: F) -> Result<()>
    where
        F: Fn() -> Arc<dyn Domain> + Send + 'static,
    {
        let id = id.into();
        if id.trim().is_empty() {
            return Err(ElicitError::InvalidDomain {
                id,
                reason: "empty id".to_string(),
            });
        }
        if self.position(&id).is_some() {
            return Err(ElicitError::DomainExists(id));
        }
        info!(domain = %id, "registered domain factory");
        self.entries.push((id, DomainEntry::Pending(Box::new(factory))));
        Ok(())
    }

    /// Presence check. Never instantiates a pending factory.
    pub fn has(&self, id: &str) -> bool {
        self.position(id).is_some()
    }

    pub fn count(&self) -> usize {
        self.entries.len()
    }

    /// Fetch a domain, building and caching it on first access. A factory
    /// whose product fails verification, or reports an id other than the
    /// one it was registered under, fails with `InvalidDomain` and stays
    /// pending.
    pub fn get(&mut self, id: &str) -> Result<Arc<dyn Domain>> {
        let pos = self
            .position(id)
            .ok_or_else(|| ElicitError::DomainNotFound(id.to_string()))?;
        let (registered_id, entry) = &mut self.entries[pos];
        match entry {
            DomainEntry::Ready(domain) => Ok(domain.clone()),
            DomainEntry::Pending(factory) => {
                debug!(domain = %registered_id, "instantiating domain from factory");
                let domain = factory();
                verify_domain(domain.as_ref())?;
                if domain.id() != registered_id.as_str() {
                    return Err(ElicitError::InvalidDomain {
                        id: registered_id.clone(),
                        reason: format!("factory produced domain with id '{}'", domain.id()),
                    });
                }
                *entry = DomainEntry::Ready(domain.clone());
                Ok(domain)
            }
        }
    }

    /// Registered ids in registration order.
    pub fn list_ids(&self) -> Vec<String> {
        self.entries.iter().map(|(id, _)| id.clone()).collect()
    }

    /// Every registered domain, fully instantiated, in registration order.
    pub fn list_domains(&mut self) -> Result<Vec<Arc<dyn Domain>>> {
        let ids = self.list_ids();
        ids.iter().map(|id| self.get(id)).collect()
    }

    /// Remove a domain and its cached instance.
    pub fn unregister(&mut self, id: &str) -> Result<()> {
        let pos = self
            .position(id)
            .ok_or_else(|| ElicitError::DomainNotFound(id.to_string()))?;
        self.entries.remove(pos);
        info!(domain = %id, "unregistered domain");
        Ok(())
    }

    /// Drop every domain. Used for test isolation and process shutdown.
    pub fn clear(&mut self) {
        debug!(count = self.entries.len(), "clearing domain registry");
        self.entries.clear();
    }

    /// Registry state as JSON: the id list plus each domain's full bundle.
    /// Instantiates any pending factories.
    pub fn to_value(&mut self) -> Result<Value> {
        let ids = self.list_ids();
        let mut domains = Map::new();
        for id in &ids {
            let domain = self.get(id)?;
            domains.insert(id.clone(), domain.to_value()?);
        }
        Ok(serde_json::json!({
            "ids": ids,
            "domains": Value::Object(domains),
        }))
    }
}

// ---------------------------------------------------------------------------
// Process-wide instance
// ---------------------------------------------------------------------------

static REGISTRY: OnceLock<Mutex<DomainRegistry>> = OnceLock::new();

/// The process-wide registry, created on first access. All access goes
/// through the mutex; `register`/`unregister`/`clear` are exclusive
/// operations for callers that own multiple threads.
pub fn get_domain_registry() -> &'static Mutex<DomainRegistry> {
    REGISTRY.get_or_init(|| Mutex::new(DomainRegistry::new()))
}

/// Register a domain against the process-wide registry.
pub fn register_domain(domain: Arc<dyn Domain>) -> Result<()> {
    get_domain_registry()
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .register(domain)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::export::ExportFormat;
    use crate::question::Question;
    use crate::rule::ConflictRule;
    use crate::types::Severity;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct Stub {
        id: String,
    }

    impl Stub {
        fn new(id: &str) -> Arc<dyn Domain> {
            Arc::new(Self { id: id.to_string() })
        }
    }

    impl Domain for Stub {
        fn id(&self) -> &str {
            &self.id
        }
        fn name(&self) -> &str {
            "Stub"
        }
        fn version(&self) -> &str {
            "0.1.0"
        }
        fn categories(&self) -> Vec<String> {
            vec!["general".to_string()]
        }
        fn questions(&self) -> Vec<Question> {
            vec![Question::new("q1", "Why?", "general")]
        }
        fn export_formats(&self) -> Vec<ExportFormat> {
            vec![ExportFormat::new("rust", ".rs", "text/x-rust", "t.tmpl")]
        }
        fn conflict_rules(&self) -> Vec<ConflictRule> {
            vec![ConflictRule::new("r1", "n", "general", Severity::Warning)]
        }
    }

    #[test]
    fn register_then_get() {
        let mut reg = DomainRegistry::new();
        reg.register(Stub::new("programming")).unwrap();
        assert!(reg.has("programming"));
        assert_eq!(reg.get("programming").unwrap().id(), "programming");
    }

    #[test]
    fn duplicate_registration_fails() {
        let mut reg = DomainRegistry::new();
        reg.register(Stub::new("programming")).unwrap();
        let err = reg.register(Stub::new("programming")).unwrap_err();
        assert!(matches!(err, ElicitError::DomainExists(id) if id == "programming"));
        // Factory under the same id is rejected too.
        let err = reg
            .register_factory("programming", || Stub::new("programming"))
            .unwrap_err();
        assert!(matches!(err, ElicitError::DomainExists(_)));
    }

    #[test]
    fn get_unregistered_fails() {
        let mut reg = DomainRegistry::new();
        let err = reg.get("ghost").unwrap_err();
        assert!(matches!(err, ElicitError::DomainNotFound(id) if id == "ghost"));
    }

    #[test]
    fn unregister_then_get_fails() {
        let mut reg = DomainRegistry::new();
        reg.register(Stub::new("biz")).unwrap();
        reg.unregister("biz").unwrap();
        assert!(!reg.has("biz"));
        assert!(matches!(
            reg.get("biz"),
            Err(ElicitError::DomainNotFound(_))
        ));
        assert!(matches!(
            reg.unregister("biz"),
            Err(ElicitError::DomainNotFound(_))
        ));
    }

    #[test]
    fn invalid_domain_rejected_at_registration() {
        let mut reg = DomainRegistry::new();
        let err = reg.register(Stub::new("")).unwrap_err();
        assert!(matches!(err, ElicitError::InvalidDomain { .. }));
        assert_eq!(reg.count(), 0);
    }

    #[test]
    fn factory_instantiates_lazily_and_caches() {
        static BUILDS: AtomicUsize = AtomicUsize::new(0);
        let mut reg = DomainRegistry::new();
        reg.register_factory("lazy", || {
            BUILDS.fetch_add(1, Ordering::SeqCst);
            Stub::new("lazy")
        })
        .unwrap();

        // has() must not instantiate.
        assert!(reg.has("lazy"));
        assert_eq!(BUILDS.load(Ordering::SeqCst), 0);

        reg.get("lazy").unwrap();
        reg.get("lazy").unwrap();
        assert_eq!(BUILDS.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn factory_id_mismatch_is_invalid() {
        let mut reg = DomainRegistry::new();
        reg.register_factory("expected", || Stub::new("actual")).unwrap();
        let err = reg.get("expected").unwrap_err();
        assert!(matches!(err, ElicitError::InvalidDomain { .. }));
    }

    #[test]
    fn listing_preserves_registration_order() {
        let mut reg = DomainRegistry::new();
        reg.register(Stub::new("c")).unwrap();
        reg.register_factory("a", || Stub::new("a")).unwrap();
        reg.register(Stub::new("b")).unwrap();
        assert_eq!(reg.list_ids(), vec!["c", "a", "b"]);
        let domains = reg.list_domains().unwrap();
        let ids: Vec<_> = domains.iter().map(|d| d.id().to_string()).collect();
        assert_eq!(ids, vec!["c", "a", "b"]);
        assert_eq!(reg.count(), 3);
    }

    #[test]
    fn clear_empties_the_registry() {
        let mut reg = DomainRegistry::new();
        reg.register(Stub::new("one")).unwrap();
        reg.register(Stub::new("two")).unwrap();
        reg.clear();
        assert_eq!(reg.count(), 0);
        assert!(!reg.has("one"));
    }

    #[test]
    fn to_value_serializes_ids_and_bundles() {
        let mut reg = DomainRegistry::new();
        reg.register(Stub::new("programming")).unwrap();
        reg.register_factory("business", || Stub::new("business")).unwrap();
        let value = reg.to_value().unwrap();
        assert_eq!(
            value["ids"],
            serde_json::json!(["programming", "business"])
        );
        assert_eq!(value["domains"]["business"]["version"], "0.1.0");
    }

    #[test]
    fn global_accessor_round_trips() {
        {
            let mut reg = get_domain_registry().lock().unwrap();
            reg.clear();
        }
        register_domain(Stub::new("global")).unwrap();
        let mut reg = get_domain_registry().lock().unwrap();
        assert!(reg.has("global"));
        assert_eq!(reg.get("global").unwrap().name(), "Stub");
        reg.clear();
    }
}
