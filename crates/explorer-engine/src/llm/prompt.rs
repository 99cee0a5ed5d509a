use explorer_types::PendingAction;
use serde::Deserialize;

use crate::run_state::HistoryEntry;

const SYSTEM_PROMPT: &str = "You are exploring a web application to discover its reachable states. \
You may only act through the UI elements listed below: clicking, typing into fields, and selecting \
options. You do not have a navigate-by-URL tool. Respond with a single JSON object: either \
{\"status\":\"FLOW_END\"} if nothing productive remains, a single action object, or \
{\"actions\":[...]} for a batch. Prefer elements marked PRIORITY. Keep batches short.";

pub fn system_prompt() -> &'static str {
    SYSTEM_PROMPT
}

/// Assembles the user turn: filtered DOM (unexplored actions only, modal
/// section first and tagged PRIORITY), last 5 history entries, and optional
/// credential/modal hints.
pub fn build_user_prompt(
    dom_text: &str,
    history: &[HistoryEntry],
    credentials_hint: Option<&str>,
    modal_hint: bool,
) -> String {
    let mut sections = Vec::new();

    sections.push(format!("Current page elements:\n{dom_text}"));

    if modal_hint {
        sections.push("A modal is currently open; elements inside it are marked PRIORITY.".to_string());
    }

    if let Some(hint) = credentials_hint {
        sections.push(format!("Login credentials are available: {hint}"));
    }

    if !history.is_empty() {
        let recent = history
            .iter()
            .rev()
            .take(5)
            .rev()
            .map(|h| format!("- [{}] {}", h.stage, h.summary))
            .collect::<Vec<_>>()
            .join("\n");
        sections.push(format!("Recent history:\n{recent}"));
    }

    sections.join("\n\n")
}

/// One element of the `{"actions":[...]}` array or a bare single-action
/// object. `Navigate` is accepted by the parser but rejected at Execute
/// time.
#[derive(Deserialize, Debug, Clone)]
#[serde(tag = "tool", rename_all = "lowercase")]
enum RawAction {
    Click {
        selector: String,
        #[serde(default)]
        #[serde(rename = "visibleText")]
        visible_text: String,
    },
    Type {
        selector: String,
        text: String,
        #[serde(default)]
        #[serde(rename = "visibleText")]
        visible_text: String,
    },
    Select {
        selector: String,
        value: String,
        #[serde(default)]
        #[serde(rename = "visibleText")]
        visible_text: String,
    },
    Navigate {
        url: String,
    },
}

impl From<RawAction> for PendingAction {
    fn from(raw: RawAction) -> Self {
        match raw {
            RawAction::Click { selector, visible_text } => {
                PendingAction::Click { selector, visible_text }
            }
            RawAction::Type { selector, text, visible_text } => {
                PendingAction::Type { selector, visible_text, text }
            }
            RawAction::Select { selector, value, visible_text } => {
                PendingAction::Select { selector, visible_text, value }
            }
            RawAction::Navigate { url } => PendingAction::Navigate { url },
        }
    }
}

#[derive(Deserialize)]
struct StatusOnly {
    status: String,
}

#[derive(Deserialize)]
struct ActionBatch {
    actions: Vec<RawAction>,
}

/// Outcome of parsing one LLM response body.
#[derive(Debug)]
pub enum LlmDecision {
    FlowEnd,
    Batch(Vec<PendingAction>),
    /// The response was not recognizable JSON in any of the three accepted
    /// shapes; Decide treats this the same as `FlowEnd` ("agent gave up")
    /// but callers may want to log the raw text.
    Unparseable,
}

pub fn parse_llm_response(text: &str) -> LlmDecision {
    let trimmed = text.trim();

    if let Ok(status) = serde_json::from_str::<StatusOnly>(trimmed) {
        if status.status.eq_ignore_ascii_case("FLOW_END") {
            return LlmDecision::FlowEnd;
        }
    }

    if let Ok(batch) = serde_json::from_str::<ActionBatch>(trimmed) {
        return LlmDecision::Batch(batch.actions.into_iter().map(Into::into).collect());
    }

    if let Ok(single) = serde_json::from_str::<RawAction>(trimmed) {
        return LlmDecision::Batch(vec![single.into()]);
    }

    LlmDecision::Unparseable
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_flow_end() {
        assert!(matches!(
            parse_llm_response("{\"status\":\"FLOW_END\"}"),
            LlmDecision::FlowEnd
        ));
    }

    #[test]
    fn parses_single_action_as_batch_of_one() {
        let decision = parse_llm_response("{\"tool\":\"click\",\"selector\":\"#go\",\"visibleText\":\"Go\"}");
        match decision {
            LlmDecision::Batch(actions) => assert_eq!(actions.len(), 1),
            _ => panic!("expected batch"),
        }
    }

    #[test]
    fn parses_multi_action_batch() {
        let decision = parse_llm_response(
            "{\"actions\":[{\"tool\":\"type\",\"selector\":\"#u\",\"text\":\"a\"},{\"tool\":\"click\",\"selector\":\"#go\"}]}",
        );
        match decision {
            LlmDecision::Batch(actions) => assert_eq!(actions.len(), 2),
            _ => panic!("expected batch"),
        }
    }

    #[test]
    fn garbage_is_unparseable() {
        assert!(matches!(parse_llm_response("not json at all"), LlmDecision::Unparseable));
    }

    #[test]
    fn navigate_parses_but_is_left_for_execute_to_reject() {
        let decision = parse_llm_response("{\"tool\":\"navigate\",\"url\":\"https://example.com\"}");
        match decision {
            LlmDecision::Batch(actions) => {
                assert!(matches!(actions[0], PendingAction::Navigate { .. }));
            }
            _ => panic!("expected batch"),
        }
    }
}
