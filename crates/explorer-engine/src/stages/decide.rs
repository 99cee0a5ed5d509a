use explorer_perceiver::format_dom_for_prompt;
use explorer_types::{ExplorationStatus, PendingAction};

use crate::llm::prompt::{build_user_prompt, parse_llm_response, system_prompt, LlmDecision};
use crate::run_state::{HistoryEntry, RunState, RunStateDelta};
use crate::session::StageContext;

/// Produces the next action batch, or a terminal/backtrack status.
pub async fn run(ctx: &StageContext, state: &RunState) -> RunStateDelta {
    if state.exploration_status.is_terminal() {
        return RunStateDelta::default();
    }

    // 2. Exhaustion -> backtrack.
    if state.is_exhausted {
        return match ctx.frontier.select_backtrack_target() {
            Some(target) => {
                *ctx.pending_navigation.lock() = Some(target.url.clone());
                RunStateDelta {
                    exploration_status: Some(ExplorationStatus::Backtrack),
                    pending_actions: Some(Vec::new()),
                    append_history: vec![HistoryEntry {
                        stage: "decide",
                        summary: format!(
                            "backtracking to {} ({} unexplored)",
                            target.url, target.unexplored_count
                        ),
                    }],
                    ..Default::default()
                }
            }
            None => RunStateDelta {
                exploration_status: Some(ExplorationStatus::FlowEnd),
                pending_actions: Some(Vec::new()),
                append_history: vec![HistoryEntry {
                    stage: "decide",
                    summary: "no backtrack target left, ending exploration".to_string(),
                }],
                ..Default::default()
            },
        };
    }

    // 3. Login auto-fill.
    let Some(current_url) = state.current_url.clone() else {
        return RunStateDelta::terminal(ExplorationStatus::Failure);
    };

    if let Some(login) = ctx.login_form.lock().clone() {
        let already_attempted = ctx.login_attempted.lock().contains(&current_url);
        let login_successful = *ctx.login_successful.lock();
        let credentials = ctx.credentials.lock().clone();

        if !already_attempted && !login_successful {
            if let Some(creds) = credentials {
                ctx.login_attempted.lock().insert(current_url.clone());
                let batch = vec![
                    PendingAction::Type {
                        selector: login.username,
                        visible_text: String::new(),
                        text: creds.username,
                    },
                    PendingAction::Type {
                        selector: login.password,
                        visible_text: String::new(),
                        text: creds.password,
                    },
                    PendingAction::Click {
                        selector: login.submit,
                        visible_text: String::new(),
                    },
                ];
                return RunStateDelta {
                    exploration_status: Some(ExplorationStatus::Continue),
                    pending_actions: Some(batch),
                    append_history: vec![HistoryEntry {
                        stage: "decide",
                        summary: format!("auto-filling login form at {current_url}"),
                    }],
                    ..Default::default()
                };
            }
        }
    }

    // 4. LLM decision.
    let credentials_hint = ctx
        .credentials
        .lock()
        .as_ref()
        .map(|c| format!("username \"{}\" available", c.username));
    let modal_hint = *ctx.modal_present.lock();

    let unexplored: std::collections::HashSet<String> =
        state.unexplored_actions.iter().cloned().collect();
    let prompt_dom = format_dom_for_prompt(&state.dom_elements, &unexplored);

    let user_prompt = build_user_prompt(
        &prompt_dom,
        &state.action_history,
        credentials_hint.as_deref(),
        modal_hint,
    );

    let completion = match ctx
        .llm
        .complete(system_prompt(), &user_prompt, ctx.config.llm_temperature)
        .await
    {
        Ok(completion) => completion,
        Err(e) => {
            return RunStateDelta {
                exploration_status: Some(ExplorationStatus::Failure),
                append_history: vec![HistoryEntry {
                    stage: "decide",
                    summary: format!("LLM call failed: {e}"),
                }],
                ..Default::default()
            };
        }
    };

    // 5. Token accounting.
    ctx.record_tokens(completion.input_tokens, completion.output_tokens);

    match parse_llm_response(&completion.text) {
        LlmDecision::FlowEnd => RunStateDelta {
            exploration_status: Some(ExplorationStatus::FlowEnd),
            pending_actions: Some(Vec::new()),
            append_history: vec![HistoryEntry {
                stage: "decide",
                summary: "LLM signalled FLOW_END".to_string(),
            }],
            ..Default::default()
        },
        LlmDecision::Unparseable => RunStateDelta {
            exploration_status: Some(ExplorationStatus::FlowEnd),
            pending_actions: Some(Vec::new()),
            append_history: vec![HistoryEntry {
                stage: "decide",
                summary: "LLM response was unparseable, treating as FLOW_END".to_string(),
            }],
            ..Default::default()
        },
        LlmDecision::Batch(actions) => RunStateDelta {
            exploration_status: Some(ExplorationStatus::Continue),
            pending_actions: Some(actions),
            append_history: vec![HistoryEntry {
                stage: "decide",
                summary: "LLM proposed an action batch".to_string(),
            }],
            ..Default::default()
        },
    }
}
