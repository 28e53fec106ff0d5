use std::path::Path;

use crate::{BUILTIN_PATTERNS, RouterConfig};

impl RouterConfig {
    /// Load configuration from a TOML file
    ///
    /// Reads the file, expands `${VAR}` placeholders, then deserializes and
    /// validates the result.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, environment variable
    /// expansion fails, TOML parsing fails, or validation fails
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("failed to read config file {}: {e}", path.display()))?;

        let expanded = crate::env::expand_env(&raw)
            .map_err(|e| anyhow::anyhow!("config variable expansion failed: {e}"))?;

        let config: Self =
            toml::from_str(&expanded).map_err(|e| anyhow::anyhow!("failed to parse config: {e}"))?;

        config.validate()?;

        Ok(config)
    }

    /// Validate that the configuration is internally consistent
    ///
    /// # Errors
    ///
    /// Returns an error if no provider is usable, a provider entry is
    /// malformed, thresholds are zero, or a custom redaction pattern does
    /// not compile
    pub fn validate(&self) -> anyhow::Result<()> {
        self.validate_providers()?;
        self.validate_circuit_breaker()?;
        self.validate_redaction()?;
        Ok(())
    }

    fn validate_providers(&self) -> anyhow::Result<()> {
        if self.enabled && !self.providers.values().any(|p| p.enabled) {
            anyhow::bail!("router is enabled but no provider is enabled");
        }

        for (name, provider) in &self.providers {
            if provider.models.is_empty() {
                anyhow::bail!("provider '{name}' must list at least one model");
            }
            if provider.request_timeout_ms == 0 {
                anyhow::bail!("provider '{name}' must have a non-zero request_timeout_ms");
            }
        }

        Ok(())
    }

    fn validate_circuit_breaker(&self) -> anyhow::Result<()> {
        if self.circuit_breaker.failure_threshold == 0 {
            anyhow::bail!("circuit_breaker.failure_threshold must be at least 1");
        }
        if self.circuit_breaker.reset_timeout_ms == 0 {
            anyhow::bail!("circuit_breaker.reset_timeout_ms must be non-zero");
        }
        Ok(())
    }

    fn validate_redaction(&self) -> anyhow::Result<()> {
        for pattern in &self.pii_redaction.patterns {
            if BUILTIN_PATTERNS.contains(&pattern.as_str()) {
                continue;
            }
            regex::Regex::new(pattern)
                .map_err(|e| anyhow::anyhow!("invalid custom redaction pattern '{pattern}': {e}"))?;
        }
        Ok(())
    }
}
