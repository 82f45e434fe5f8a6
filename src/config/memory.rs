//! In-memory configuration provider, for tests and code-defined settings.

use std::collections::HashMap;

use super::ConfigResult;
use super::provider::ConfigProvider;

#[derive(Debug, Clone)]
pub struct MemoryConfigProvider {
    data: HashMap<String, String>,
    name: String,
}

impl MemoryConfigProvider {
    pub fn new() -> Self {
        Self::named("memory")
    }

    pub fn named(name: impl Into<String>) -> Self {
        Self {
            data: HashMap::new(),
            name: name.into(),
        }
    }

    pub fn from_data(data: HashMap<String, String>) -> Self {
        Self {
            data,
            name: "memory".to_string(),
        }
    }

    /// Add a value (builder pattern)
    pub fn value(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.data.insert(key.into(), value.into());
        self
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

impl Default for MemoryConfigProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl ConfigProvider for MemoryConfigProvider {
    fn name(&self) -> &str {
        &self.name
    }

    async fn get_raw(&self, key: &str) -> ConfigResult<Option<String>> {
        Ok(self.data.get(key).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_memory_provider_basic() {
        let provider = MemoryConfigProvider::new().value("stripe.base_url", "http://localhost");
        assert_eq!(
            provider.get_raw("stripe.base_url").await.unwrap(),
            Some("http://localhost".to_string())
        );
        assert_eq!(provider.get_raw("nonexistent").await.unwrap(), None);
    }

    #[test]
    fn test_from_data() {
        let mut data = HashMap::new();
        data.insert("billing.currency".to_string(), "usd".to_string());
        let provider = MemoryConfigProvider::from_data(data);
        assert_eq!(provider.len(), 1);
        assert!(!provider.is_empty());
    }
}
