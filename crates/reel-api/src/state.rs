//! Application state.

use std::sync::Arc;

use reel_providers::ProviderConfig;
use reel_store::{InMemoryJobStore, JobStore};
use reel_worker::{JobExecutor, ReelPipeline, WorkerConfig};

use crate::config::ApiConfig;

/// Which provider credentials are present.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProviderStatus {
    pub openai: bool,
    pub elevenlabs: bool,
    pub pexels: bool,
}

impl From<&ProviderConfig> for ProviderStatus {
    fn from(config: &ProviderConfig) -> Self {
        Self {
            openai: config.has_openai(),
            elevenlabs: config.has_elevenlabs(),
            pexels: config.has_pexels(),
        }
    }
}

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub config: ApiConfig,
    pub store: Arc<dyn JobStore>,
    pub executor: JobExecutor,
    pub providers: ProviderStatus,
}

impl AppState {
    /// Create new application state with the in-memory store and real providers.
    pub async fn new(
        config: ApiConfig,
        worker_config: WorkerConfig,
        provider_config: ProviderConfig,
    ) -> anyhow::Result<Self> {
        worker_config.ensure_dirs().await?;

        let store: Arc<dyn JobStore> = Arc::new(InMemoryJobStore::new());
        let pipeline = ReelPipeline::with_defaults(worker_config, &provider_config, Arc::clone(&store))?;
        let executor = JobExecutor::new(Arc::clone(&store), Arc::new(pipeline));

        Ok(Self::from_parts(
            config,
            executor,
            ProviderStatus::from(&provider_config),
        ))
    }

    /// Assemble state around an existing executor.
    pub fn from_parts(config: ApiConfig, executor: JobExecutor, providers: ProviderStatus) -> Self {
        Self {
            config,
            store: Arc::clone(executor.store()),
            executor,
            providers,
        }
    }
}
