//! Application state wiring the orchestrator to its concrete adapters.
//!
//! The orchestrator is generic over its provider/executor/relay ports;
//! AppState pins those generics to the infra implementations and shares the
//! relay with the HTTP handlers through `Arc`.

use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::Mutex;

use logsage_core::context::store::ContextStore;
use logsage_core::orchestrator::TurnOrchestrator;
use logsage_infra::config::AppConfig;
use logsage_infra::llm::openai::AzureOpenAiProvider;
use logsage_infra::loganalytics::executor::LogAnalyticsExecutor;
use logsage_infra::loganalytics::token::CachedTokenCredential;
use logsage_infra::relay::memory::InMemoryChatRelay;
use logsage_types::chat::ThreadId;

/// Orchestrator generics pinned to the concrete infra adapters.
pub type ConcreteOrchestrator = TurnOrchestrator<
    Arc<AzureOpenAiProvider>,
    Arc<LogAnalyticsExecutor>,
    Arc<InMemoryChatRelay>,
>;

/// Shared application state for the REST API handlers.
#[derive(Clone)]
pub struct AppState {
    pub orchestrator: Arc<ConcreteOrchestrator>,
    pub relay: Arc<InMemoryChatRelay>,
    /// Per-thread turn locks. Turns within a thread run one at a time;
    /// turns on different threads run freely in parallel.
    turn_locks: Arc<DashMap<ThreadId, Arc<Mutex<()>>>>,
}

impl AppState {
    /// Wire the adapters from resolved configuration.
    pub fn init(config: AppConfig) -> Self {
        let provider = Arc::new(AzureOpenAiProvider::new(&config.llm, config.llm_api_key));

        let credential = CachedTokenCredential::new(
            &config.workspace.tenant_id,
            &config.workspace.client_id,
            config.client_secret,
        );
        let executor = Arc::new(LogAnalyticsExecutor::new(
            credential,
            &config.workspace.workspace_id,
        ));

        let relay = Arc::new(InMemoryChatRelay::new());

        let orchestrator = TurnOrchestrator::new(
            provider,
            executor,
            Arc::clone(&relay),
            ContextStore::new(),
            config.llm.deployment.clone(),
            &config.workspace.resource_id,
            config.tuning,
        );

        Self {
            orchestrator: Arc::new(orchestrator),
            relay,
            turn_locks: Arc::new(DashMap::new()),
        }
    }

    /// Lock guarding turn execution for one thread.
    pub fn turn_lock(&self, thread: ThreadId) -> Arc<Mutex<()>> {
        self.turn_locks
            .entry(thread)
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }
}
