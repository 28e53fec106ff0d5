//! Eligible-provider selection
//!
//! Holds the immutable provider configuration and produces the ordered
//! candidate list for a request. Ordering is deterministic: ascending
//! priority, with configuration insertion order breaking ties.

use indexmap::IndexMap;
use palisade_config::ProviderConfig;

use crate::types::GenerationRequest;

/// Immutable registry of configured providers
pub struct ProviderRegistry {
    /// Providers in configuration insertion order
    providers: Vec<(String, ProviderConfig)>,
}

impl ProviderRegistry {
    /// Build a registry from the configured provider map
    pub fn new(providers: &IndexMap<String, ProviderConfig>) -> Self {
        Self {
            providers: providers
                .iter()
                .map(|(name, config)| (name.clone(), config.clone()))
                .collect(),
        }
    }

    /// Ordered candidates for a request
    ///
    /// Filters to enabled providers that support the pinned model (every
    /// enabled provider when no model is pinned), then stable-sorts by
    /// priority so ties keep insertion order. An empty result is a value,
    /// not an error; the router turns it into a no-eligible-provider
    /// failure.
    pub fn candidates_for(&self, request: &GenerationRequest) -> Vec<(&str, &ProviderConfig)> {
        let mut candidates: Vec<_> = self
            .providers
            .iter()
            .filter(|(_, config)| config.enabled)
            .filter(|(_, config)| {
                request
                    .model
                    .as_deref()
                    .is_none_or(|model| config.models.iter().any(|m| m == model))
            })
            .map(|(name, config)| (name.as_str(), config))
            .collect();

        candidates.sort_by_key(|(_, config)| config.priority);
        candidates
    }

    /// Look up a provider by name
    pub fn get(&self, name: &str) -> Option<&ProviderConfig> {
        self.providers
            .iter()
            .find(|(provider, _)| provider == name)
            .map(|(_, config)| config)
    }

    /// All configured providers in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &ProviderConfig)> {
        self.providers
            .iter()
            .map(|(name, config)| (name.as_str(), config))
    }
}
