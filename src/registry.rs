//! Provider registry: configuration-keyed, lazily-populated adapter cache.
//!
//! One adapter is constructed per provider id on first access and shared by
//! every caller from then on. The cache lock is held across
//! lookup-and-construct (construction is cheap and synchronous), so
//! concurrent first access for the same id yields exactly one adapter.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, OnceLock};

use crate::adapter::ProviderAdapter;
use crate::codec::{OpenAiCompatibleCodec, ProviderCodec};
use crate::config::ProviderConfig;
use crate::error::CallError;
use crate::telemetry::{TelemetrySink, TracingSink};
use crate::transport::{HttpTransport, ReqwestTransport};

/// Produces the codec for a provider id at adapter-construction time.
///
/// Invoked exactly once per constructed adapter, so providers speaking
/// different wire formats can share one registry.
pub type CodecFactory = Arc<dyn Fn(&str) -> Arc<dyn ProviderCodec> + Send + Sync>;

/// Registry of configured providers.
pub struct ProviderRegistry {
    configs: HashMap<String, ProviderConfig>,
    adapters: Mutex<HashMap<String, Arc<ProviderAdapter>>>,
    transport: Arc<dyn HttpTransport>,
    codec_factory: CodecFactory,
    telemetry: Arc<dyn TelemetrySink>,
}

impl ProviderRegistry {
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::new()
    }

    /// Fetch the adapter for `provider_id`, constructing and caching it on
    /// first use.
    pub fn get(&self, provider_id: &str) -> Result<Arc<ProviderAdapter>, CallError> {
        let config = self
            .configs
            .get(provider_id)
            .ok_or_else(|| CallError::UnknownProvider(provider_id.to_string()))?;

        let mut adapters = self
            .adapters
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        let adapter = adapters
            .entry(provider_id.to_string())
            .or_insert_with(|| {
                tracing::debug!(provider_id, "constructing provider adapter");
                Arc::new(ProviderAdapter::new(
                    provider_id,
                    config.clone(),
                    self.transport.clone(),
                    (self.codec_factory)(provider_id),
                    self.telemetry.clone(),
                ))
            })
            .clone();

        Ok(adapter)
    }

    /// Registered provider ids, in no particular order.
    pub fn provider_ids(&self) -> Vec<&str> {
        self.configs.keys().map(String::as_str).collect()
    }
}

/// Builder wiring configurations and shared collaborators into a registry.
pub struct RegistryBuilder {
    configs: HashMap<String, ProviderConfig>,
    transport: Option<Arc<dyn HttpTransport>>,
    codec_factory: Option<CodecFactory>,
    telemetry: Option<Arc<dyn TelemetrySink>>,
}

impl RegistryBuilder {
    pub fn new() -> Self {
        Self {
            configs: HashMap::new(),
            transport: None,
            codec_factory: None,
            telemetry: None,
        }
    }

    /// Register a provider configuration under `id`.
    pub fn register(mut self, id: impl Into<String>, config: ProviderConfig) -> Self {
        self.configs.insert(id.into(), config);
        self
    }

    /// Register a provider from the environment when its required variables
    /// are present; silently skips it otherwise.
    pub fn register_from_env(mut self, id: &str) -> Self {
        if let Some(config) = ProviderConfig::from_env(id) {
            self.configs.insert(id.to_string(), config);
        }
        self
    }

    pub fn with_transport(mut self, transport: Arc<dyn HttpTransport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Use one codec for every provider.
    pub fn with_codec(mut self, codec: Arc<dyn ProviderCodec>) -> Self {
        self.codec_factory = Some(Arc::new(move |_| codec.clone()));
        self
    }

    /// Choose the codec per provider id at adapter-construction time.
    pub fn with_codec_factory(mut self, factory: CodecFactory) -> Self {
        self.codec_factory = Some(factory);
        self
    }

    pub fn with_telemetry(mut self, telemetry: Arc<dyn TelemetrySink>) -> Self {
        self.telemetry = Some(telemetry);
        self
    }

    pub fn build(self) -> ProviderRegistry {
        ProviderRegistry {
            configs: self.configs,
            adapters: Mutex::new(HashMap::new()),
            transport: self
                .transport
                .unwrap_or_else(|| Arc::new(ReqwestTransport::default())),
            codec_factory: self.codec_factory.unwrap_or_else(|| {
                Arc::new(|_| Arc::new(OpenAiCompatibleCodec) as Arc<dyn ProviderCodec>)
            }),
            telemetry: self.telemetry.unwrap_or_else(|| Arc::new(TracingSink)),
        }
    }
}

impl Default for RegistryBuilder {
    fn default() -> Self {
        Self::new()
    }
}

// Process-wide registry instance.
static GLOBAL_REGISTRY: OnceLock<ProviderRegistry> = OnceLock::new();

/// Process-wide registry, lazily built from the environment on first use.
///
/// Provider ids come from the comma-separated `CALLGUARD_PROVIDERS`
/// variable; each listed id is loaded via [`ProviderConfig::from_env`].
pub fn global_registry() -> &'static ProviderRegistry {
    GLOBAL_REGISTRY.get_or_init(|| {
        let mut builder = ProviderRegistry::builder();
        if let Ok(ids) = std::env::var("CALLGUARD_PROVIDERS") {
            for id in ids.split(',').map(str::trim).filter(|id| !id.is_empty()) {
                builder = builder.register_from_env(id);
            }
        }
        builder.build()
    })
}
