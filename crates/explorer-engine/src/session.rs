use std::collections::HashSet;
use std::sync::Arc;

use explorer_perceiver::LoginSelectors;
use explorer_types::{Credentials, NormalizedUrl, SessionId};
use parking_lot::Mutex;

use crate::config::EngineConfig;
use crate::frontier::Frontier;
use crate::traits::{BrowserDriver, GraphStore, LlmClient};
use crate::transition::TransitionCache;

/// Shared mutable bookkeeping a session's stages all see: one plain value
/// owned by the run loop and passed by reference to each stage, rather than
/// threaded through cyclic mutable wrappers.
pub struct StageContext {
    pub session_id: SessionId,
    pub config: EngineConfig,
    pub browser: Arc<dyn BrowserDriver>,
    pub llm: Arc<dyn LlmClient>,
    pub graph: Arc<dyn GraphStore>,

    pub frontier: Frontier,
    pub transition_cache: TransitionCache,

    pub credentials: Mutex<Option<Credentials>>,
    pub login_attempted: Mutex<HashSet<NormalizedUrl>>,
    pub login_successful: Mutex<bool>,

    /// Set by Decide when it picks a backtrack target; consumed by Observe
    /// at the start of the next iteration to perform the one permitted
    /// programmatic navigation.
    pub pending_navigation: Mutex<Option<NormalizedUrl>>,
    pub modal_present: Mutex<bool>,
    /// Login selectors resolved by the most recent Observe, if any.
    pub login_form: Mutex<Option<LoginSelectors>>,

    /// Running input/output token totals, forwarded from every LLM call.
    pub token_usage: Mutex<(u64, u64)>,
}

impl StageContext {
    pub fn new(
        session_id: SessionId,
        config: EngineConfig,
        browser: Arc<dyn BrowserDriver>,
        llm: Arc<dyn LlmClient>,
        graph: Arc<dyn GraphStore>,
        credentials: Option<Credentials>,
    ) -> Self {
        Self {
            session_id,
            config,
            browser,
            llm,
            graph,
            frontier: Frontier::new(),
            transition_cache: TransitionCache::new(),
            credentials: Mutex::new(credentials),
            login_attempted: Mutex::new(HashSet::new()),
            login_successful: Mutex::new(false),
            pending_navigation: Mutex::new(None),
            modal_present: Mutex::new(false),
            login_form: Mutex::new(None),
            token_usage: Mutex::new((0, 0)),
        }
    }

    pub fn record_tokens(&self, input: u32, output: u32) {
        let mut totals = self.token_usage.lock();
        totals.0 += input as u64;
        totals.1 += output as u64;
    }
}
