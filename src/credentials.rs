//! Credential resolution for service endpoints and keys
//!
//! Credentials are read once at startup. A missing credential is a fatal
//! configuration error, never a per-call failure.

use crate::config::ServiceConfig;
use crate::error::{RedactError, Result};
use std::collections::HashMap;

/// Source of named secrets
pub trait CredentialProvider: Send + Sync {
    /// Look up a credential by name, `None` when absent
    fn get(&self, name: &str) -> Option<String>;
}

/// Environment-backed provider
///
/// Loads a `.env` file from the working directory when one exists. Names
/// are tried verbatim first, then with dashes replaced by underscores, so
/// `LANGUAGE-KEY` also resolves `LANGUAGE_KEY`.
#[derive(Debug, Default)]
pub struct EnvCredentialProvider;

impl EnvCredentialProvider {
    pub fn new() -> Self {
        match dotenvy::dotenv() {
            Ok(path) => tracing::debug!(path = %path.display(), "Loaded .env"),
            Err(e) if e.not_found() => {}
            Err(e) => tracing::warn!(error = %e, "Failed to load .env, using process environment"),
        }
        Self
    }
}

impl CredentialProvider for EnvCredentialProvider {
    fn get(&self, name: &str) -> Option<String> {
        let lookup = |key: &str| std::env::var(key).ok().filter(|v| !v.trim().is_empty());
        lookup(name).or_else(|| lookup(&name.replace('-', "_")))
    }
}

/// Map-backed provider, mostly for tests and embedding
#[derive(Debug, Default, Clone)]
pub struct StaticCredentialProvider {
    values: HashMap<String, String>,
}

impl StaticCredentialProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.values.insert(name.into(), value.into());
        self
    }
}

impl CredentialProvider for StaticCredentialProvider {
    fn get(&self, name: &str) -> Option<String> {
        self.values.get(name).cloned()
    }
}

/// Endpoint and key for the language service
#[derive(Clone)]
pub struct ServiceCredentials {
    pub endpoint: String,
    pub key: String,
}

impl ServiceCredentials {
    /// Resolve both credentials named by `config`
    pub fn load(provider: &dyn CredentialProvider, config: &ServiceConfig) -> Result<Self> {
        let endpoint = provider
            .get(&config.endpoint_credential)
            .ok_or_else(|| RedactError::MissingCredential(config.endpoint_credential.clone()))?;
        let key = provider
            .get(&config.key_credential)
            .ok_or_else(|| RedactError::MissingCredential(config.key_credential.clone()))?;

        tracing::info!(endpoint = %endpoint, "Resolved language service credentials");

        Ok(Self {
            endpoint: endpoint.trim_end_matches('/').to_string(),
            key,
        })
    }
}

// Keep the key out of debug output and logs
impl std::fmt::Debug for ServiceCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceCredentials")
            .field("endpoint", &self.endpoint)
            .field("key", &"<redacted>")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_credentials() {
        let provider = StaticCredentialProvider::new()
            .with("LANGUAGE-ENDPOINT", "https://lang.example.com/")
            .with("LANGUAGE-KEY", "secret");
        let creds = ServiceCredentials::load(&provider, &ServiceConfig::default()).unwrap();
        assert_eq!(creds.endpoint, "https://lang.example.com");
        assert_eq!(creds.key, "secret");
    }

    #[test]
    fn test_missing_key_is_fatal() {
        let provider =
            StaticCredentialProvider::new().with("LANGUAGE-ENDPOINT", "https://lang.example.com");
        let err = ServiceCredentials::load(&provider, &ServiceConfig::default()).unwrap_err();
        match err {
            RedactError::MissingCredential(name) => assert_eq!(name, "LANGUAGE-KEY"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_missing_endpoint_is_fatal() {
        let provider = StaticCredentialProvider::new().with("LANGUAGE-KEY", "secret");
        let err = ServiceCredentials::load(&provider, &ServiceConfig::default()).unwrap_err();
        assert!(matches!(err, RedactError::MissingCredential(n) if n == "LANGUAGE-ENDPOINT"));
    }

    #[test]
    fn test_env_provider_normalizes_dashes() {
        std::env::set_var("A3S_REDACT_TEST_SECRET", "from-env");
        let provider = EnvCredentialProvider;
        assert_eq!(
            provider.get("A3S-REDACT-TEST-SECRET"),
            Some("from-env".to_string())
        );
        assert_eq!(provider.get("A3S-REDACT-TEST-ABSENT"), None);
    }

    #[test]
    fn test_debug_hides_key() {
        let creds = ServiceCredentials {
            endpoint: "https://lang.example.com".into(),
            key: "secret".into(),
        };
        let debug = format!("{:?}", creds);
        assert!(!debug.contains("secret"));
    }
}
