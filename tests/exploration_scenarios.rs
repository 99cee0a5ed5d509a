use std::collections::HashMap;
use std::sync::Arc;

use explorer_engine::runner;
use explorer_engine::session::StageContext;
use explorer_engine::traits::mocks::{MockBrowser, MockGraphStore, MockLlmClient};
use explorer_engine::EngineConfig;
use explorer_perceiver::SimplifiedElement;
use explorer_types::{Credentials, ExplorationStatus, NormalizedUrl, SessionId};

fn input(id: &str, input_type: &str) -> SimplifiedElement {
    let mut attrs = HashMap::new();
    attrs.insert("id".to_string(), id.to_string());
    attrs.insert("type".to_string(), input_type.to_string());
    SimplifiedElement::new("input", &attrs, None, false)
}

fn button(id: &str, text: &str) -> SimplifiedElement {
    let mut attrs = HashMap::new();
    attrs.insert("id".to_string(), id.to_string());
    SimplifiedElement::new("button", &attrs, Some(text), false)
}

fn fast_config() -> EngineConfig {
    EngineConfig {
        recursion_limit: 50,
        intra_batch_delay_ms: 0,
        post_batch_delay_ms: 0,
        ..Default::default()
    }
}

// Scenario 1: login + single click
#[tokio::test]
async fn login_then_click_produces_expected_graph_writes() {
    let mut browser = MockBrowser::new("https://x/login");
    browser.pages.insert(
        "https://x/login".to_string(),
        vec![input("user", "text"), input("pass", "password"), button("go", "Log in")],
    );
    browser.pages.insert(
        "https://x/home".to_string(),
        vec![button("settings", "Settings")],
    );
    browser.transitions.insert(
        ("https://x/login".to_string(), "#go".to_string()),
        "https://x/home".to_string(),
    );

    let llm = MockLlmClient::flow_end();
    let graph = Arc::new(MockGraphStore::default());

    let ctx = StageContext::new(
        SessionId::new(),
        fast_config(),
        Arc::new(browser),
        Arc::new(llm),
        graph.clone(),
        Some(Credentials::new("admin", "admin123")),
    );

    let final_state = runner::run(&ctx, NormalizedUrl::normalize("https://x/login")).await;

    assert_eq!(final_state.exploration_status, ExplorationStatus::FlowEnd);
    assert!(*ctx.login_successful.lock());
    assert!(ctx.credentials.lock().is_none());

    let written = graph.written.lock();
    let transitions = written
        .iter()
        .filter(|w| matches!(w, explorer_engine::graph_plan::GraphWrite::MergeTransition { .. }))
        .count();
    assert_eq!(transitions, 1);
}

// Scenario 2: exhaustion triggers backtrack, eventually FLOW_END
#[tokio::test]
async fn exhaustion_triggers_backtrack_then_flow_end() {
    let mut browser = MockBrowser::new("https://x/a");
    browser.pages.insert(
        "https://x/a".to_string(),
        vec![button("a1", "One"), button("a2", "Two")],
    );
    browser.pages.insert("https://x/a-prime".to_string(), vec![]);
    browser.transitions.insert(("https://x/a".to_string(), "#a1".to_string()), "https://x/a-prime".to_string());
    browser.transitions.insert(("https://x/a".to_string(), "#a2".to_string()), "https://x/a-prime".to_string());

    let llm = MockLlmClient::new(vec![
        "{\"tool\":\"click\",\"selector\":\"#a1\",\"visibleText\":\"One\"}".to_string(),
        "{\"tool\":\"click\",\"selector\":\"#a2\",\"visibleText\":\"Two\"}".to_string(),
    ]);
    let graph = Arc::new(MockGraphStore::default());

    let ctx = StageContext::new(
        SessionId::new(),
        fast_config(),
        Arc::new(browser),
        Arc::new(llm),
        graph,
        None,
    );

    let final_state = runner::run(&ctx, NormalizedUrl::normalize("https://x/a")).await;
    assert_eq!(final_state.exploration_status, ExplorationStatus::FlowEnd);
}

// Scenario 3 & 4: duplicate-transition skip and the 5-in-a-row loop guard
#[tokio::test]
async fn repeated_duplicate_transitions_force_flow_end_on_fifth() {
    let mut browser = MockBrowser::new("https://x/a");
    browser.pages.insert("https://x/a".to_string(), vec![button("a1", "One")]);
    browser.transitions.insert(("https://x/a".to_string(), "#a1".to_string()), "https://x/a".to_string());

    // First proposal actually executes (caches the transition); every
    // subsequent identical proposal is a duplicate skip.
    let llm = MockLlmClient::new(vec![
        "{\"tool\":\"click\",\"selector\":\"#a1\",\"visibleText\":\"One\"}".to_string(),
        "{\"tool\":\"click\",\"selector\":\"#a1\",\"visibleText\":\"One\"}".to_string(),
        "{\"tool\":\"click\",\"selector\":\"#a1\",\"visibleText\":\"One\"}".to_string(),
        "{\"tool\":\"click\",\"selector\":\"#a1\",\"visibleText\":\"One\"}".to_string(),
        "{\"tool\":\"click\",\"selector\":\"#a1\",\"visibleText\":\"One\"}".to_string(),
        "{\"tool\":\"click\",\"selector\":\"#a1\",\"visibleText\":\"One\"}".to_string(),
    ]);
    let graph = Arc::new(MockGraphStore::default());

    let ctx = StageContext::new(
        SessionId::new(),
        fast_config(),
        Arc::new(browser),
        Arc::new(llm),
        graph,
        None,
    );

    let final_state = runner::run(&ctx, NormalizedUrl::normalize("https://x/a")).await;
    assert_eq!(final_state.exploration_status, ExplorationStatus::FlowEnd);
    assert_eq!(final_state.consecutive_duplicates, 5);
}

// Scenario 5: LLM proposes navigate-by-URL; Execute rejects it
#[tokio::test]
async fn navigate_action_is_rejected_and_becomes_backtrack() {
    let mut browser = MockBrowser::new("https://x/a");
    browser.pages.insert("https://x/a".to_string(), vec![button("a1", "One")]);

    let llm = MockLlmClient::new(vec![
        "{\"tool\":\"navigate\",\"url\":\"https://x/b\"}".to_string(),
    ]);
    let graph = Arc::new(MockGraphStore::default());

    let ctx = StageContext::new(
        SessionId::new(),
        fast_config(),
        Arc::new(browser),
        Arc::new(llm),
        graph,
        None,
    );

    let final_state = runner::run(&ctx, NormalizedUrl::normalize("https://x/a")).await;
    // No unexplored targets remain after the rejected action is marked
    // explored, so the run proceeds straight to FLOW_END.
    assert_eq!(final_state.exploration_status, ExplorationStatus::FlowEnd);
    assert!(final_state
        .action_history
        .iter()
        .any(|h| h.summary.contains("Navigation by URL is disabled")));
}

// Scenario 6: graph-store write failures never abort exploration
#[tokio::test]
async fn graph_write_failure_does_not_abort_exploration() {
    let mut browser = MockBrowser::new("https://x/a");
    browser.pages.insert("https://x/a".to_string(), vec![button("a1", "One")]);
    browser.pages.insert("https://x/b".to_string(), vec![]);
    browser.transitions.insert(("https://x/a".to_string(), "#a1".to_string()), "https://x/b".to_string());

    let llm = MockLlmClient::new(vec![
        "{\"tool\":\"click\",\"selector\":\"#a1\",\"visibleText\":\"One\"}".to_string(),
    ]);
    let graph = Arc::new(MockGraphStore { fail_writes: true, ..Default::default() });

    let ctx = StageContext::new(
        SessionId::new(),
        fast_config(),
        Arc::new(browser),
        Arc::new(llm),
        graph.clone(),
        None,
    );

    let final_state = runner::run(&ctx, NormalizedUrl::normalize("https://x/a")).await;
    assert_eq!(final_state.exploration_status, ExplorationStatus::FlowEnd);
    assert!(graph.written.lock().is_empty());
    assert!(final_state.pending_queries.is_empty());
}
