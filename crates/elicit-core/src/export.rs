use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// ExportFormat
// ---------------------------------------------------------------------------

/// Describes one code-generation target. Opaque to the engines; code
/// generation itself lives outside this crate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportFormat {
    pub language: String,
    pub extension: String,
    pub mime_type: String,
    /// Reference to the template a generator would render, e.g. a path
    /// relative to the consuming tool's template root.
    pub template: String,
}

impl ExportFormat {
    pub fn new(
        language: impl Into<String>,
        extension: impl Into<String>,
        mime_type: impl Into<String>,
        template: impl Into<String>,
    ) -> Self {
        Self {
            language: language.into(),
            extension: extension.into(),
            mime_type: mime_type.into(),
            template: template.into(),
        }
    }
}
