//! PII redaction applied to outbound content
//!
//! Every prompt and message passes through here before leaving the process.
//! Matches are replaced, never logged; the redactor must not leak what it
//! redacted.

use std::sync::OnceLock;

use palisade_config::RedactionConfig;
use regex::Regex;
use thiserror::Error;

use crate::types::Message;

/// A configured redaction pattern did not compile
#[derive(Debug, Error)]
#[error("invalid redaction pattern `{pattern}`: {source}")]
pub struct InvalidPattern {
    pattern: String,
    source: regex::Error,
}

/// Replaces configured PII patterns before content leaves the process
pub struct Redactor {
    enabled: bool,
    /// Compiled patterns in configuration order
    patterns: Vec<Regex>,
    placeholder: String,
}

impl Redactor {
    /// Compile the configured patterns
    ///
    /// Built-in names (`ssn`, `phone`, `email`, `credit_card`) resolve to
    /// fixed regexes; any other entry is compiled as a custom regex.
    ///
    /// # Errors
    ///
    /// Returns an error if a custom pattern does not compile
    pub fn new(config: &RedactionConfig) -> Result<Self, InvalidPattern> {
        let patterns = config
            .patterns
            .iter()
            .map(|entry| match entry.as_str() {
                "ssn" => Ok(ssn_regex().clone()),
                "phone" => Ok(phone_regex().clone()),
                "email" => Ok(email_regex().clone()),
                "credit_card" => Ok(credit_card_regex().clone()),
                custom => Regex::new(custom).map_err(|source| InvalidPattern {
                    pattern: custom.to_owned(),
                    source,
                }),
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            enabled: config.enabled,
            patterns,
            placeholder: config.replace_with.clone(),
        })
    }

    /// Replace every match of every configured pattern
    ///
    /// Patterns apply in configuration order, so output is deterministic.
    /// When redaction is disabled this is the identity function; callers
    /// must not rely on redaction having occurred.
    pub fn redact(&self, text: &str) -> String {
        if !self.enabled {
            return text.to_owned();
        }

        let mut redacted = text.to_owned();
        for pattern in &self.patterns {
            if pattern.is_match(&redacted) {
                redacted = pattern
                    .replace_all(&redacted, regex::NoExpand(&self.placeholder))
                    .into_owned();
            }
        }
        redacted
    }

    /// Redact the content of every message, preserving roles and order
    pub fn redact_messages(&self, messages: &[Message]) -> Vec<Message> {
        messages
            .iter()
            .map(|m| Message {
                role: m.role,
                content: self.redact(&m.content),
            })
            .collect()
    }
}

fn ssn_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\b\d{3}-\d{2}-\d{4}\b").expect("valid SSN regex"))
}

fn phone_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"\b(?:\+?1[-.\s]?)?\(?[2-9]\d{2}\)?[-.\s]?\d{3}[-.\s]?\d{4}\b")
            .expect("valid phone regex")
    })
}

fn email_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"\b[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Z|a-z]{2,}\b").expect("valid email regex")
    })
}

fn credit_card_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\b(?:\d[ -]*?){13,19}\b").expect("valid credit card regex"))
}
