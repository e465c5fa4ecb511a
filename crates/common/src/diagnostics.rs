//! Non-fatal findings accumulated while building the connector IR

use serde::{Deserialize, Serialize};
use std::fmt;

/// How serious a diagnostic is
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Warning,
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Info => write!(f, "info"),
            Severity::Warning => write!(f, "warning"),
            Severity::Error => write!(f, "error"),
        }
    }
}

/// Category of a diagnostic
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DiagnosticKind {
    /// A reference or path expression could not be followed; the type degraded
    ResolutionGap,
    /// An object class failed an integrity check and was excluded
    MappingIntegrity,
    /// An object class has no declared primary key
    MissingPrimaryKey,
    /// Input uses a construct outside the supported subset
    Unsupported,
    /// An identifier was derived because the source omitted one
    SynthesizedIdentifier,
    /// Path template and declared parameters disagree
    ParameterMismatch,
    /// A security scheme is referenced but unusable
    Auth,
    /// A mapping override was rejected
    InvalidOverride,
}

/// One recorded finding
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub severity: Severity,
    pub kind: DiagnosticKind,
    /// Slash-joined location inside the input documents
    pub location: String,
    pub message: String,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}: {}", self.severity, self.location, self.message)
    }
}

/// Collector returned alongside the IR
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Diagnostics {
    entries: Vec<Diagnostic>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a diagnostic and emit it as a tracing event
    pub fn push(
        &mut self,
        severity: Severity,
        kind: DiagnosticKind,
        location: impl Into<String>,
        message: impl Into<String>,
    ) {
        let diagnostic = Diagnostic {
            severity,
            kind,
            location: location.into(),
            message: message.into(),
        };

        match severity {
            Severity::Info => tracing::info!(kind = ?kind, location = %diagnostic.location, "{}", diagnostic.message),
            Severity::Warning | Severity::Error => {
                tracing::warn!(kind = ?kind, location = %diagnostic.location, "{}", diagnostic.message)
            }
        }

        self.entries.push(diagnostic);
    }

    pub fn info(&mut self, kind: DiagnosticKind, location: impl Into<String>, message: impl Into<String>) {
        self.push(Severity::Info, kind, location, message);
    }

    pub fn warning(&mut self, kind: DiagnosticKind, location: impl Into<String>, message: impl Into<String>) {
        self.push(Severity::Warning, kind, location, message);
    }

    pub fn error(&mut self, kind: DiagnosticKind, location: impl Into<String>, message: impl Into<String>) {
        self.push(Severity::Error, kind, location, message);
    }

    /// Append everything from another collector, keeping order
    pub fn extend(&mut self, other: Diagnostics) {
        self.entries.extend(other.entries);
    }

    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.entries.iter()
    }

    pub fn of_kind(&self, kind: DiagnosticKind) -> impl Iterator<Item = &Diagnostic> {
        self.entries.iter().filter(move |d| d.kind == kind)
    }

    pub fn has_kind(&self, kind: DiagnosticKind) -> bool {
        self.entries.iter().any(|d| d.kind == kind)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn into_vec(self) -> Vec<Diagnostic> {
        self.entries
    }
}

impl<'a> IntoIterator for &'a Diagnostics {
    type Item = &'a Diagnostic;
    type IntoIter = std::slice::Iter<'a, Diagnostic>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collector_keeps_order() {
        let mut diags = Diagnostics::new();
        diags.warning(DiagnosticKind::ResolutionGap, "components/schemas/A", "first");
        diags.info(DiagnosticKind::SynthesizedIdentifier, "paths/~1items/get", "second");

        let messages: Vec<_> = diags.iter().map(|d| d.message.as_str()).collect();
        assert_eq!(messages, vec!["first", "second"]);
        assert!(diags.has_kind(DiagnosticKind::ResolutionGap));
        assert!(!diags.has_kind(DiagnosticKind::MappingIntegrity));
    }

    #[test]
    fn test_extend_appends() {
        let mut a = Diagnostics::new();
        a.warning(DiagnosticKind::Auth, "security/0", "a");
        let mut b = Diagnostics::new();
        b.error(DiagnosticKind::MappingIntegrity, "objectClasses/person", "b");
        a.extend(b);
        assert_eq!(a.len(), 2);
        assert_eq!(a.of_kind(DiagnosticKind::MappingIntegrity).count(), 1);
    }

    #[test]
    fn test_display() {
        let d = Diagnostic {
            severity: Severity::Warning,
            kind: DiagnosticKind::ResolutionGap,
            location: "objectClasses/person/attributes/0".to_string(),
            message: "property 'contact' not found".to_string(),
        };
        assert_eq!(
            d.to_string(),
            "[warning] objectClasses/person/attributes/0: property 'contact' not found"
        );
    }
}
