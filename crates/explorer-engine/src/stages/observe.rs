use explorer_perceiver::{detect_login_form, detect_modal, format_dom, PageFingerprint};
use explorer_types::{ExplorationStatus, NormalizedUrl};

use crate::run_state::{HistoryEntry, RunState, RunStateDelta};
use crate::session::StageContext;

use super::is_ignored;

/// Snapshots the current page, simplifies it, fingerprints it, and
/// registers it in the frontier.
pub async fn run(ctx: &StageContext, state: &RunState) -> RunStateDelta {
    if state.exploration_status.is_terminal() {
        return RunStateDelta::default();
    }

    let target = ctx
        .pending_navigation
        .lock()
        .take()
        .or_else(|| state.current_url.clone());

    let Some(target) = target else {
        return RunStateDelta::terminal(ExplorationStatus::Failure);
    };

    let browser_url = ctx.browser.current_url().await.ok();
    let needs_navigation = browser_url
        .as_deref()
        .map(|u| NormalizedUrl::normalize(u) != target)
        .unwrap_or(true);

    if needs_navigation {
        if let Err(e) = ctx.browser.navigate(target.as_str()).await {
            return RunStateDelta {
                exploration_status: Some(ExplorationStatus::Failure),
                append_history: vec![HistoryEntry {
                    stage: "observe",
                    summary: format!("navigation to {target} failed: {e}"),
                }],
                ..Default::default()
            };
        }
    }

    if let Err(e) = ctx
        .browser
        .wait_for_network_idle(ctx.config.network_idle_max_ms)
        .await
    {
        tracing::warn!(url = %target, error = %e, "network-idle wait failed, proceeding best-effort");
    }

    let elements = match ctx.browser.snapshot_dom().await {
        Ok(elements) => elements,
        Err(e) => {
            return RunStateDelta {
                exploration_status: Some(ExplorationStatus::Failure),
                append_history: vec![HistoryEntry {
                    stage: "observe",
                    summary: format!("snapshot failed at {target}: {e}"),
                }],
                ..Default::default()
            };
        }
    };

    let filtered: Vec<_> = elements
        .into_iter()
        .filter(|e| !is_ignored(&e.css_selector))
        .collect();

    let formatted = format_dom(&filtered);
    let fingerprint = PageFingerprint::compute(&formatted.indexed);

    // Captured before this observation is registered, so a page's own
    // first sighting never counts as "already visited".
    let fingerprint_already_known = ctx.frontier.has_visited_fingerprint(&fingerprint);

    let action_ids = formatted.indexed.iter().map(|e| e.action_id());
    let modal_ids = formatted
        .indexed
        .iter()
        .filter(|e| e.in_modal)
        .map(|e| e.action_id());

    ctx.frontier
        .observe_with_modal(&target, fingerprint.clone(), action_ids, modal_ids, None);

    *ctx.modal_present.lock() = detect_modal(&filtered);

    let login_form = detect_login_form(&filtered);
    let is_login_page = login_form.is_some();
    *ctx.login_form.lock() = login_form;
    if !is_login_page {
        let already_attempted = !ctx.login_attempted.lock().is_empty();
        let mut successful = ctx.login_successful.lock();
        if already_attempted && !*successful {
            *successful = true;
            ctx.credentials.lock().take();
            tracing::info!(url = %target, "login succeeded, credentials cleared");
        }
    }

    let unexplored = ctx.frontier.unexplored_actions(&target);
    let unexplored_strings: Vec<String> = unexplored.iter().map(|a| a.as_str().to_string()).collect();
    let is_exhausted = ctx.frontier.page_exhausted(&target, fingerprint_already_known);

    RunStateDelta {
        current_url: Some(target.clone()),
        current_fingerprint: Some(fingerprint.clone()),
        dom_state: Some(formatted.text),
        dom_elements: Some(formatted.indexed.clone()),
        append_history: vec![HistoryEntry {
            stage: "observe",
            summary: format!("observed {target} ({} actionable elements)", filtered.len()),
        }],
        union_visited_fingerprints: [fingerprint].into_iter().collect(),
        unexplored_actions: Some(unexplored_strings),
        is_exhausted: Some(is_exhausted),
        ..Default::default()
    }
}
