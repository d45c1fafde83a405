use std::collections::HashMap;
use std::sync::Arc;

use crate::config::{PerceptionConfig, ProviderEntry};
use crate::vision::provider::VisionProvider;
use crate::vision::providers::anthropic::AnthropicProvider;
use crate::vision::providers::openai_compatible::OpenAiCompatibleProvider;
use crate::vision::types::CallConfig;

/// Registry of perception providers that had a credential at startup,
/// keyed by their config identifier.
pub struct ProviderRegistry {
    providers: HashMap<String, Arc<dyn VisionProvider>>,
    active: String,
}

impl ProviderRegistry {
    pub fn new(active: String) -> Self {
        Self {
            providers: HashMap::new(),
            active,
        }
    }

    pub fn register(&mut self, provider: Arc<dyn VisionProvider>) {
        self.providers.insert(provider.name().to_string(), provider);
    }

    /// `None` when the active provider had no credential.
    pub fn active(&self) -> Option<Arc<dyn VisionProvider>> {
        self.providers.get(&self.active).cloned()
    }

    pub fn active_name(&self) -> &str {
        &self.active
    }

    pub fn list_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.providers.keys().cloned().collect();
        names.sort();
        names
    }

    /// Build from config. Keys are read once, here, in this order:
    /// `TINDERBOX_<ID>_API_KEY`, the entry's `api_key_env` (or the adapter's
    /// conventional variable), then the inline `api_key`.
    pub fn from_config(config: &PerceptionConfig) -> Self {
        Self::from_config_with(config, |name| std::env::var(name).ok())
    }

    pub fn from_config_with(config: &PerceptionConfig, env: impl Fn(&str) -> Option<String>) -> Self {
        let mut registry = Self::new(config.active_provider.clone());
        for (id, entry) in &config.providers {
            let Some(api_key) = resolve_api_key(id, entry, &env) else {
                tracing::debug!(provider = %id, "no credential, provider not registered");
                continue;
            };
            let call = CallConfig {
                model: entry.model.clone(),
                temperature: entry.temperature,
                max_tokens: entry.max_tokens,
            };
            let provider: Arc<dyn VisionProvider> = if entry.is_anthropic() {
                Arc::new(AnthropicProvider::new(id.clone(), entry.api_base.clone(), api_key, call))
            } else {
                Arc::new(OpenAiCompatibleProvider::new(id.clone(), entry.api_base.clone(), api_key, call))
            };
            registry.register(provider);
        }
        tracing::info!(
            active = %registry.active,
            registered = ?registry.list_names(),
            "perception providers configured"
        );
        registry
    }
}

fn resolve_api_key(id: &str, entry: &ProviderEntry, env: &impl Fn(&str) -> Option<String>) -> Option<String> {
    let conventional = if entry.is_anthropic() {
        "ANTHROPIC_API_KEY"
    } else {
        "OPENAI_API_KEY"
    };
    let extra_var = entry.api_key_env.as_deref().unwrap_or(conventional);

    env(&format!("TINDERBOX_{}_API_KEY", id.to_uppercase()))
        .or_else(|| env(extra_var))
        .or_else(|| entry.api_key.clone())
        .filter(|k| !k.trim().is_empty())
}
