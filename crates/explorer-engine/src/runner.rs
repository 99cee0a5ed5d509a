use explorer_types::{ExplorationStatus, NormalizedUrl};

use crate::run_state::{apply_delta, RunState};
use crate::session::StageContext;
use crate::stages::{decide, execute, observe, persist};

/// Drives Observe → Decide → Execute → Persist in fixed order, routing on
/// `explorationStatus` and bounded by a hard recursion limit counted across
/// all four stages.
pub async fn run(ctx: &StageContext, starting_url: NormalizedUrl) -> RunState {
    let mut state = RunState::initial(starting_url);
    let mut steps: u32 = 0;
    let limit = ctx.config.recursion_limit;
    let mut limit_reached = false;

    'session: loop {
        macro_rules! invoke {
            ($stage:expr) => {{
                if steps >= limit {
                    limit_reached = true;
                    break 'session;
                }
                let delta = $stage.await;
                apply_delta(&mut state, delta);
                steps += 1;
                if state.exploration_status.is_terminal() {
                    break 'session;
                }
            }};
        }

        invoke!(observe::run(ctx, &state));
        invoke!(decide::run(ctx, &state));
        invoke!(execute::run(ctx, &state));
        invoke!(persist::run(ctx, &state));
    }

    if limit_reached && !state.exploration_status.is_terminal() {
        state.exploration_status = ExplorationStatus::Failure;
    }

    state
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EngineConfig;
    use crate::traits::mocks::{MockBrowser, MockGraphStore, MockLlmClient};
    use explorer_perceiver::SimplifiedElement;
    use explorer_types::SessionId;
    use std::collections::HashMap;
    use std::sync::Arc;

    fn element(tag: &str, id: &str, text: &str) -> SimplifiedElement {
        let mut attrs = HashMap::new();
        attrs.insert("id".to_string(), id.to_string());
        SimplifiedElement::new(tag, &attrs, Some(text), false)
    }

    #[tokio::test]
    async fn flow_end_on_first_page_with_no_actions() {
        let browser = MockBrowser::new("https://example.com/");
        let llm = MockLlmClient::flow_end();
        let graph = MockGraphStore::default();

        let config = EngineConfig::default();
        let ctx = StageContext::new(
            SessionId::new(),
            config,
            Arc::new(browser),
            Arc::new(llm),
            Arc::new(graph),
            None,
        );

        let final_state = run(&ctx, NormalizedUrl::normalize("https://example.com/")).await;
        assert_eq!(final_state.exploration_status, ExplorationStatus::FlowEnd);
    }

    #[tokio::test]
    async fn exhaustion_without_backtrack_target_ends_flow() {
        let mut browser = MockBrowser::new("https://example.com/a");
        browser
            .pages
            .insert("https://example.com/a".to_string(), vec![element("button", "a1", "Go")]);
        browser
            .transitions
            .insert(("https://example.com/a".to_string(), "#a1".to_string()), "https://example.com/a".to_string());

        let llm = MockLlmClient::flow_end();
        let graph = MockGraphStore::default();
        let config = EngineConfig {
            recursion_limit: 20,
            intra_batch_delay_ms: 0,
            post_batch_delay_ms: 0,
            ..Default::default()
        };
        let ctx = StageContext::new(
            SessionId::new(),
            config,
            Arc::new(browser),
            Arc::new(llm),
            Arc::new(graph),
            None,
        );

        let final_state = run(&ctx, NormalizedUrl::normalize("https://example.com/a")).await;
        assert_eq!(final_state.exploration_status, ExplorationStatus::FlowEnd);
    }

    #[tokio::test]
    async fn recursion_limit_without_flow_end_is_failure() {
        let mut browser = MockBrowser::new("https://example.com/a");
        browser.pages.insert(
            "https://example.com/a".to_string(),
            vec![element("button", "a1", "Go")],
        );
        browser.transitions.insert(
            ("https://example.com/a".to_string(), "#a1".to_string()),
            "https://example.com/b".to_string(),
        );
        browser
            .pages
            .insert("https://example.com/b".to_string(), vec![element("button", "b1", "Back")]);
        browser.transitions.insert(
            ("https://example.com/b".to_string(), "#b1".to_string()),
            "https://example.com/a".to_string(),
        );

        let llm = MockLlmClient::new(vec![
            "{\"tool\":\"click\",\"selector\":\"#a1\",\"visibleText\":\"Go\"}".to_string(),
        ]);
        let graph = MockGraphStore::default();
        let config = EngineConfig {
            recursion_limit: 2,
            intra_batch_delay_ms: 0,
            post_batch_delay_ms: 0,
            ..Default::default()
        };
        let ctx = StageContext::new(
            SessionId::new(),
            config,
            Arc::new(browser),
            Arc::new(llm),
            Arc::new(graph),
            None,
        );

        let final_state = run(&ctx, NormalizedUrl::normalize("https://example.com/a")).await;
        assert_eq!(final_state.exploration_status, ExplorationStatus::Failure);
    }
}
