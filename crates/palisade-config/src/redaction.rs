use serde::Deserialize;

/// Pattern names with built-in regexes; any other configured entry is
/// compiled as a custom regex.
pub const BUILTIN_PATTERNS: &[&str] = &["ssn", "phone", "email", "credit_card"];

/// PII redaction configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RedactionConfig {
    /// When false, redaction is the identity function
    #[serde(default = "crate::default_true")]
    pub enabled: bool,
    /// Patterns applied in order: built-in names or custom regexes
    #[serde(default = "default_patterns")]
    pub patterns: Vec<String>,
    /// Replacement for every match
    #[serde(default = "default_replace_with")]
    pub replace_with: String,
}

impl Default for RedactionConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            patterns: default_patterns(),
            replace_with: default_replace_with(),
        }
    }
}

fn default_patterns() -> Vec<String> {
    BUILTIN_PATTERNS.iter().map(|&p| p.to_owned()).collect()
}

fn default_replace_with() -> String {
    "[REDACTED]".to_owned()
}
