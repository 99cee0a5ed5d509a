//! Shared primitives for the explorer-agent workspace.
//!
//! Mirrors the role of a `core-types` crate in a layered agent codebase:
//! small, dependency-light newtypes that every other crate in the
//! workspace can depend on without pulling in engine logic.

mod action;
mod credentials;
mod ids;
mod normalized_url;

pub use action::{ActionId, PendingAction};
pub use credentials::Credentials;
pub use ids::SessionId;
pub use normalized_url::NormalizedUrl;

/// Terminal/continuation status threaded through `RunState` and returned
/// by every stage.
#[derive(Clone, Copy, Debug, Eq, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ExplorationStatus {
    Continue,
    Backtrack,
    FlowEnd,
    Failure,
}

impl ExplorationStatus {
    /// A status is terminal once the run loop must stop routing back to Observe.
    pub fn is_terminal(self) -> bool {
        matches!(self, ExplorationStatus::FlowEnd | ExplorationStatus::Failure)
    }
}

/// Which hosted LLM vendor backs a session's `LlmClient`.
#[derive(Clone, Copy, Debug, Eq, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LlmProviderKind {
    OpenAi,
    Anthropic,
    Gemini,
}
