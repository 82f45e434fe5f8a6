//! Layered configuration: the first layer holding a key supplies it.

use tracing::debug;

use super::ConfigResult;
use super::provider::ConfigProvider;

pub struct CompositeConfigProvider {
    layers: Vec<Box<dyn ConfigProvider>>,
}

impl CompositeConfigProvider {
    pub fn new(layers: Vec<Box<dyn ConfigProvider>>) -> Self {
        Self { layers }
    }

    pub fn layer_names(&self) -> Vec<&str> {
        self.layers.iter().map(|p| p.name()).collect()
    }

    /// Name of the layer that would answer `key`.
    pub async fn source_of(&self, key: &str) -> ConfigResult<Option<&str>> {
        for layer in &self.layers {
            if layer.get_raw(key).await?.is_some() {
                return Ok(Some(layer.name()));
            }
        }
        Ok(None)
    }
}

#[async_trait::async_trait]
impl ConfigProvider for CompositeConfigProvider {
    fn name(&self) -> &str {
        "composite"
    }

    async fn get_raw(&self, key: &str) -> ConfigResult<Option<String>> {
        for layer in &self.layers {
            if let Some(value) = layer.get_raw(key).await? {
                debug!(key, source = layer.name(), "configuration key resolved");
                return Ok(Some(value));
            }
        }
        Ok(None)
    }
}

impl std::fmt::Debug for CompositeConfigProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompositeConfigProvider")
            .field("layers", &self.layer_names())
            .finish()
    }
}
