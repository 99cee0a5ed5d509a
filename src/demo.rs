//! A fully self-contained demo scenario (scripted browser, LLM, and graph
//! store) that exercises login auto-fill, LLM-driven clicking, and
//! exhaustion-triggered termination without any external services. Useful
//! for proving the loop wiring end-to-end without a real browser or LLM
//! account.

use std::collections::HashMap;
use std::sync::Arc;

use explorer_engine::traits::mocks::{MockBrowser, MockGraphStore, MockLlmClient};
use explorer_engine::traits::{BrowserDriver, GraphStore, LlmClient};
use explorer_perceiver::SimplifiedElement;

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

pub const DEMO_START_URL: &str = "https://demo.local/login";

pub fn build_collaborators() -> (Arc<dyn BrowserDriver>, Arc<dyn LlmClient>, Arc<dyn GraphStore>) {
    let mut browser = MockBrowser::new(DEMO_START_URL);
    browser.pages.insert(
        DEMO_START_URL.to_string(),
        vec![input("user", "text"), input("pass", "password"), button("submit", "Log in")],
    );
    browser.pages.insert(
        "https://demo.local/dashboard".to_string(),
        vec![button("b1", "First widget"), button("b2", "Second widget")],
    );
    browser.transitions.insert(
        (DEMO_START_URL.to_string(), "#submit".to_string()),
        "https://demo.local/dashboard".to_string(),
    );
    browser.transitions.insert(
        ("https://demo.local/dashboard".to_string(), "#b1".to_string()),
        "https://demo.local/dashboard".to_string(),
    );
    browser.transitions.insert(
        ("https://demo.local/dashboard".to_string(), "#b2".to_string()),
        "https://demo.local/dashboard".to_string(),
    );

    let llm = MockLlmClient::new(vec![
        "{\"tool\":\"click\",\"selector\":\"#b1\",\"visibleText\":\"First widget\"}".to_string(),
        "{\"tool\":\"click\",\"selector\":\"#b2\",\"visibleText\":\"Second widget\"}".to_string(),
    ]);

    (Arc::new(browser), Arc::new(llm), Arc::new(MockGraphStore::default()))
}
