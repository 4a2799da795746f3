//! Provider registry for resolving provider ids.
//!
//! The registry is built once at startup and passed to every component
//! that needs to resolve a provider. Tests can register their own providers.

use thiserror::Error;

use super::{BitbucketProvider, GitHubProvider, Provider};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProviderError {
    #[error("provider {name:?} is not supported (available: {})", .known.join(", "))]
    Unsupported { name: String, known: Vec<String> },
}

/// Registry of available providers.
#[derive(Debug)]
pub struct ProviderRegistry {
    providers: Vec<Box<dyn Provider>>,
}

impl Default for ProviderRegistry {
    fn default() -> Self {
        Self::with_default_providers()
    }
}

impl ProviderRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            providers: Vec::new(),
        }
    }

    /// Create a registry with the built-in providers.
    pub fn with_default_providers() -> Self {
        let providers: Vec<Box<dyn Provider>> = vec![
            Box::new(GitHubProvider::new()),
            Box::new(BitbucketProvider::new()),
        ];
        Self { providers }
    }

    /// Register a provider. A provider with the same name is replaced.
    pub fn register(&mut self, provider: Box<dyn Provider>) {
        self.providers.retain(|p| p.name() != provider.name());
        self.providers.push(provider);
    }

    /// Resolve a provider by name.
    pub fn get(&self, name: &str) -> Result<&dyn Provider, ProviderError> {
        self.providers
            .iter()
            .find(|p| p.name() == name)
            .map(|p| p.as_ref())
            .ok_or_else(|| ProviderError::Unsupported {
                name: name.to_string(),
                known: self.names().into_iter().map(str::to_string).collect(),
            })
    }

    /// Names of all registered providers, in registration order.
    pub fn names(&self) -> Vec<&str> {
        self.providers.iter().map(|p| p.name()).collect()
    }
}
