use async_trait::async_trait;

use explorer_perceiver::SimplifiedElement;

use crate::error::Result;

/// The headless-browser capability the engine drives. Specified only at
/// its interface — the concrete driver (CDP, WebDriver, …) is out of scope.
#[async_trait]
pub trait BrowserDriver: Send + Sync {
    async fn navigate(&self, url: &str) -> Result<()>;
    async fn click(&self, selector: &str) -> Result<()>;
    async fn type_text(&self, selector: &str, text: &str) -> Result<()>;
    async fn select_option(&self, selector: &str, value: &str) -> Result<()>;
    async fn current_url(&self) -> Result<String>;
    async fn wait_for_network_idle(&self, max_ms: u64) -> Result<()>;
    async fn snapshot_dom(&self) -> Result<Vec<SimplifiedElement>>;
}

/// One LLM completion call. Token counts are best-effort — providers that
/// cannot report them return zeros rather than erroring.
#[derive(Clone, Debug)]
pub struct LlmCompletion {
    pub text: String,
    pub input_tokens: u32,
    pub output_tokens: u32,
}

#[async_trait]
pub trait LlmClient: Send + Sync {
    async fn complete(&self, system: &str, user: &str, temperature: f32) -> Result<LlmCompletion>;
}

/// The property-graph capability the engine writes exploration results to.
#[async_trait]
pub trait GraphStore: Send + Sync {
    async fn transition_exists(
        &self,
        from_url: &str,
        to_url: &str,
        action: &str,
        session_id: &str,
        selector: Option<&str>,
    ) -> Result<bool>;

    async fn write_batch(&self, writes: Vec<crate::graph_plan::GraphWrite>) -> Result<()>;
}

#[cfg(any(test, feature = "test-support"))]
pub mod mocks {
    use super::*;
    use parking_lot::Mutex;
    use std::collections::HashMap;

    /// Deterministic browser double keyed by URL → page script. Each page
    /// script is a vector of elements and an optional next-URL mapping per
    /// selector, so tests can script multi-step navigations without a real
    /// browser.
    #[derive(Default)]
    pub struct MockBrowser {
        pub pages: HashMap<String, Vec<SimplifiedElement>>,
        pub transitions: HashMap<(String, String), String>,
        current: Mutex<String>,
    }

    impl MockBrowser {
        pub fn new(start_url: &str) -> Self {
            Self {
                current: Mutex::new(start_url.to_string()),
                ..Default::default()
            }
        }
    }

    #[async_trait]
    impl BrowserDriver for MockBrowser {
        async fn navigate(&self, url: &str) -> Result<()> {
            *self.current.lock() = url.to_string();
            Ok(())
        }

        async fn click(&self, selector: &str) -> Result<()> {
            let current = self.current.lock().clone();
            if let Some(target) = self.transitions.get(&(current, selector.to_string())) {
                *self.current.lock() = target.clone();
            }
            Ok(())
        }

        async fn type_text(&self, _selector: &str, _text: &str) -> Result<()> {
            Ok(())
        }

        async fn select_option(&self, _selector: &str, _value: &str) -> Result<()> {
            Ok(())
        }

        async fn current_url(&self) -> Result<String> {
            Ok(self.current.lock().clone())
        }

        async fn wait_for_network_idle(&self, _max_ms: u64) -> Result<()> {
            Ok(())
        }

        async fn snapshot_dom(&self) -> Result<Vec<SimplifiedElement>> {
            let current = self.current.lock().clone();
            Ok(self.pages.get(&current).cloned().unwrap_or_default())
        }
    }

    /// LLM double that always proposes `FLOW_END`; tests override with a
    /// scripted sequence by wrapping or replacing this where needed.
    pub struct MockLlmClient {
        pub responses: Mutex<Vec<String>>,
    }

    impl MockLlmClient {
        pub fn new(responses: Vec<String>) -> Self {
            Self {
                responses: Mutex::new(responses),
            }
        }

        pub fn flow_end() -> Self {
            Self::new(vec!["{\"status\":\"FLOW_END\"}".to_string()])
        }
    }

    #[async_trait]
    impl LlmClient for MockLlmClient {
        async fn complete(&self, _system: &str, _user: &str, _temperature: f32) -> Result<LlmCompletion> {
            let mut responses = self.responses.lock();
            let text = if responses.is_empty() {
                "{\"status\":\"FLOW_END\"}".to_string()
            } else {
                responses.remove(0)
            };
            Ok(LlmCompletion {
                text,
                input_tokens: 10,
                output_tokens: 5,
            })
        }
    }

    /// In-memory graph store double; records writes for assertions.
    #[derive(Default)]
    pub struct MockGraphStore {
        pub written: Mutex<Vec<crate::graph_plan::GraphWrite>>,
        pub fail_writes: bool,
    }

    #[async_trait]
    impl GraphStore for MockGraphStore {
        async fn transition_exists(
            &self,
            _from_url: &str,
            _to_url: &str,
            _action: &str,
            _session_id: &str,
            _selector: Option<&str>,
        ) -> Result<bool> {
            Ok(false)
        }

        async fn write_batch(&self, writes: Vec<crate::graph_plan::GraphWrite>) -> Result<()> {
            if self.fail_writes {
                return Err(crate::error::ExplorerError::GraphWrite("mock failure".into()));
            }
            self.written.lock().extend(writes);
            Ok(())
        }
    }
}
