use explorer_types::LlmProviderKind;

/// Immutable, process-wide configuration passed into session construction.
/// Built once at startup from environment/CLI and never read from inside
/// the engine itself.
#[derive(Clone, Debug)]
pub struct EngineConfig {
    pub llm_provider: LlmProviderKind,
    pub llm_model: String,
    pub llm_api_key: String,
    pub llm_temperature: f32,

    pub graph_store_uri: String,
    pub graph_store_user: String,
    pub graph_store_password: String,

    pub headless: bool,
    pub recursion_limit: u32,

    /// Quiet period that counts as "network idle".
    pub network_idle_quiet_ms: u64,
    /// Hard cap on waiting for network idle.
    pub network_idle_max_ms: u64,
    /// Pause between actions within one batch.
    pub intra_batch_delay_ms: u64,
    /// Pause after a batch completes, before the next observation.
    pub post_batch_delay_ms: u64,
    /// Consecutive duplicate-skip executions before forcing `FLOW_END`.
    pub max_consecutive_duplicates: u32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            llm_provider: LlmProviderKind::OpenAi,
            llm_model: "gpt-4o-mini".to_string(),
            llm_api_key: String::new(),
            llm_temperature: 0.1,
            graph_store_uri: String::new(),
            graph_store_user: String::new(),
            graph_store_password: String::new(),
            headless: true,
            recursion_limit: 200,
            network_idle_quiet_ms: 500,
            network_idle_max_ms: 30_000,
            intra_batch_delay_ms: 500,
            post_batch_delay_ms: 1_200,
            max_consecutive_duplicates: 5,
        }
    }
}
