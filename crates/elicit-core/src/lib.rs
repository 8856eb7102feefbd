//! Domain plugins, question templates, and conflict rules.
//!
//! A pure, synchronous library: engines load plain records, validate them
//! structurally (missing fields, duplicate ids, dependency cycles), and
//! answer filtering/recommendation queries. Persistence beyond the explicit
//! JSON file helpers, transport, and text generation all live elsewhere.

pub mod domain;
pub mod error;
pub mod export;
pub mod io;
pub mod question;
pub mod question_engine;
pub mod registry;
pub mod report;
pub mod rule;
pub mod rule_engine;
pub mod types;

pub use domain::{verify_domain, Domain};
pub use error::{ElicitError, Result};
pub use export::ExportFormat;
pub use question::Question;
pub use question_engine::{get_question_engine, QuestionEngine, QuestionFilter};
pub use registry::{get_domain_registry, register_domain, DomainRegistry};
pub use report::{ValidationProblem, ValidationReport};
pub use rule::ConflictRule;
pub use rule_engine::{get_rule_engine, RuleEngine, RuleFilter};
pub use types::{Difficulty, Severity};
