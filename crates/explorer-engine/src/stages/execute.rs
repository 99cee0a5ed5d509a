use chrono::Utc;
use explorer_perceiver::{format_dom, PageFingerprint};
use explorer_types::{ActionId, ExplorationStatus, PendingAction};

use crate::graph_plan::plan_batch_writes;
use crate::run_state::{HistoryEntry, RunState, RunStateDelta};
use crate::session::StageContext;
use crate::transition::TransitionKey;

use super::is_ignored;

/// Resolves an action's identity for frontier bookkeeping. `Navigate` has
/// no real selector, so it gets a synthetic one — it must still be marked
/// explored so it is never re-proposed.
fn action_identity(action: &PendingAction) -> (String, String, ActionId) {
    match action.action_id() {
        Some(id) => (
            action.selector().unwrap_or_default().to_string(),
            id.visible_text().to_string(),
            id,
        ),
        None => {
            let selector = match action {
                PendingAction::Navigate { url } => format!("navigate://{url}"),
                _ => unreachable!("non-navigate actions always have an ActionId"),
            };
            let id = ActionId::new(&selector, "");
            (selector, String::new(), id)
        }
    }
}

/// Runs the chosen action batch, updates the frontier and backtrack stack,
/// and builds the pending graph writes.
pub async fn run(ctx: &StageContext, state: &RunState) -> RunStateDelta {
    if state.exploration_status.is_terminal() {
        return RunStateDelta::default();
    }
    if state.pending_actions.is_empty() {
        // Decide already set the routing status (e.g. BACKTRACK); nothing
        // to execute this iteration.
        return RunStateDelta::default();
    }

    let Some(from_url) = state.current_url.clone() else {
        return RunStateDelta::terminal(ExplorationStatus::Failure);
    };

    let batch = &state.pending_actions;
    let (first_selector, first_visible_text, _) = action_identity(&batch[0]);
    let key = TransitionKey::new(from_url.clone(), first_selector.clone(), first_visible_text);

    if ctx.transition_cache.contains(&key) {
        let explored_ids = batch.iter().map(|a| action_identity(a).2);
        ctx.frontier.mark_explored(&from_url, explored_ids);
        ctx.frontier.push_backtrack(&from_url);

        let duplicates = state.consecutive_duplicates + 1;
        let status = if duplicates >= ctx.config.max_consecutive_duplicates {
            ExplorationStatus::FlowEnd
        } else {
            ExplorationStatus::Continue
        };

        return RunStateDelta {
            exploration_status: Some(status),
            pending_actions: Some(Vec::new()),
            consecutive_duplicates: Some(duplicates),
            append_history: vec![HistoryEntry {
                stage: "execute",
                summary: format!("duplicate transition at {from_url}, skipped ({duplicates} in a row)"),
            }],
            ..Default::default()
        };
    }

    let mut executed_ids = Vec::with_capacity(batch.len());
    let mut failure: Option<(ActionId, String)> = None;

    for (idx, action) in batch.iter().enumerate() {
        let (_, _, action_id) = action_identity(action);
        let outcome = dispatch(ctx, action).await;
        match outcome {
            Ok(()) => {
                executed_ids.push(action_id);
            }
            Err(e) => {
                failure = Some((action_id, e));
                break;
            }
        }
        if idx + 1 < batch.len() {
            tokio::time::sleep(std::time::Duration::from_millis(ctx.config.intra_batch_delay_ms)).await;
        }
    }

    if let Some((failed_id, message)) = failure {
        ctx.frontier.mark_explored(&from_url, [failed_id]);
        ctx.frontier.push_backtrack(&from_url);
        return RunStateDelta {
            exploration_status: Some(ExplorationStatus::Backtrack),
            pending_actions: Some(Vec::new()),
            append_history: vec![HistoryEntry {
                stage: "execute",
                summary: format!("action failed at {from_url}: {message}"),
            }],
            ..Default::default()
        };
    }

    if let Err(e) = ctx
        .browser
        .wait_for_network_idle(ctx.config.network_idle_max_ms)
        .await
    {
        tracing::warn!(url = %from_url, error = %e, "network-idle wait failed after batch, proceeding best-effort");
    }

    tokio::time::sleep(std::time::Duration::from_millis(ctx.config.post_batch_delay_ms)).await;

    let final_url_raw = match ctx.browser.current_url().await {
        Ok(url) => url,
        Err(e) => {
            return RunStateDelta {
                exploration_status: Some(ExplorationStatus::Failure),
                append_history: vec![HistoryEntry {
                    stage: "execute",
                    summary: format!("failed to read landing URL: {e}"),
                }],
                ..Default::default()
            };
        }
    };
    let final_url = explorer_types::NormalizedUrl::normalize(&final_url_raw);

    let landing_elements = ctx.browser.snapshot_dom().await.unwrap_or_default();
    let landing_filtered: Vec<_> = landing_elements
        .into_iter()
        .filter(|e| !is_ignored(&e.css_selector))
        .collect();
    let landing_formatted = format_dom(&landing_filtered);
    let landing_fingerprint = PageFingerprint::compute(&landing_formatted.indexed);

    let from_fingerprint = state
        .current_fingerprint
        .clone()
        .unwrap_or_else(|| landing_fingerprint.clone());

    ctx.frontier.mark_explored(&from_url, executed_ids);
    ctx.frontier.push_backtrack(&from_url);

    let batch_description = format!(
        "Batch: {}",
        batch
            .iter()
            .map(PendingAction::describe)
            .collect::<Vec<_>>()
            .join(" \u{2192} ")
    );

    let exists = ctx
        .graph
        .transition_exists(
            from_url.as_str(),
            final_url.as_str(),
            &batch_description,
            ctx.session_id.0.as_str(),
            Some(&first_selector),
        )
        .await
        .unwrap_or(false);
    tracing::debug!(exists, "checked transition existence before planning writes");

    let writes = plan_batch_writes(
        &ctx.session_id,
        &from_url,
        &final_url,
        from_fingerprint,
        landing_fingerprint.clone(),
        batch_description.clone(),
        first_selector,
        Utc::now(),
    );

    ctx.transition_cache.insert(key);

    RunStateDelta {
        current_url: Some(final_url.clone()),
        exploration_status: Some(ExplorationStatus::Continue),
        pending_actions: Some(Vec::new()),
        consecutive_duplicates: Some(0),
        append_queries: writes,
        append_history: vec![HistoryEntry {
            stage: "execute",
            summary: format!("{batch_description} -> {final_url}"),
        }],
        ..Default::default()
    }
}

async fn dispatch(ctx: &StageContext, action: &PendingAction) -> Result<(), String> {
    match action {
        PendingAction::Click { selector, .. } => {
            ctx.browser.click(selector).await.map_err(|e| e.to_string())
        }
        PendingAction::Type { selector, text, .. } => ctx
            .browser
            .type_text(selector, text)
            .await
            .map_err(|e| e.to_string()),
        PendingAction::Select { selector, value, .. } => ctx
            .browser
            .select_option(selector, value)
            .await
            .map_err(|e| e.to_string()),
        PendingAction::Navigate { url } => Err(format!(
            "Navigation by URL is disabled; rejected navigate({url})"
        )),
    }
}
