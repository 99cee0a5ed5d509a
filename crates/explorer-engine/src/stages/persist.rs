use crate::run_state::{HistoryEntry, RunState, RunStateDelta};
use crate::session::StageContext;

/// Flushes pending graph writes. Failures are logged but never change
/// `explorationStatus` — persistence is a byproduct, not the source of
/// truth for control flow.
pub async fn run(ctx: &StageContext, state: &RunState) -> RunStateDelta {
    if state.exploration_status.is_terminal() {
        return RunStateDelta::default();
    }
    if state.pending_queries.is_empty() {
        return RunStateDelta::default();
    }

    let writes = state.pending_queries.clone();
    let count = writes.len();

    match ctx.graph.write_batch(writes).await {
        Ok(()) => RunStateDelta {
            clear_queries: true,
            append_history: vec![HistoryEntry {
                stage: "persist",
                summary: format!("flushed {count} graph writes"),
            }],
            ..Default::default()
        },
        Err(e) => {
            tracing::error!(error = %e, "graph store write failed, discarding pending writes");
            RunStateDelta {
                clear_queries: true,
                append_history: vec![HistoryEntry {
                    stage: "persist",
                    summary: format!("graph write failed, discarded {count} writes: {e}"),
                }],
                ..Default::default()
            }
        }
    }
}
