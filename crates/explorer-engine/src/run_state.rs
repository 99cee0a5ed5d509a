use std::collections::HashSet;

use explorer_perceiver::{PageFingerprint, SimplifiedElement};
use explorer_types::{ExplorationStatus, NormalizedUrl, PendingAction};

use crate::graph_plan::GraphWrite;

/// One line of the append-only audit log threaded through a run. Mirrors
/// the shape of an agent-loop history entry, but keyed to stage names
/// instead of LLM "thinking"/"goal" fields.
#[derive(Clone, Debug)]
pub struct HistoryEntry {
    pub stage: &'static str,
    pub summary: String,
}

/// The run-state record threaded through the loop. Updates arrive as
/// `RunStateDelta`s and are merged in by `apply_delta`, field by field.
#[derive(Clone, Debug)]
pub struct RunState {
    pub current_url: Option<NormalizedUrl>,
    pub current_fingerprint: Option<PageFingerprint>,
    pub dom_state: String,
    pub dom_elements: Vec<SimplifiedElement>,
    pub action_history: Vec<HistoryEntry>,
    pub pending_queries: Vec<GraphWrite>,
    pub exploration_status: ExplorationStatus,
    pub pending_actions: Vec<PendingAction>,
    pub visited_fingerprints: HashSet<PageFingerprint>,
    pub unexplored_actions: Vec<String>,
    pub consecutive_duplicates: u32,
    pub is_exhausted: bool,
}

impl RunState {
    pub fn initial(starting_url: NormalizedUrl) -> Self {
        Self {
            current_url: Some(starting_url),
            current_fingerprint: None,
            dom_state: String::new(),
            dom_elements: Vec::new(),
            action_history: Vec::new(),
            pending_queries: Vec::new(),
            exploration_status: ExplorationStatus::Continue,
            pending_actions: Vec::new(),
            visited_fingerprints: HashSet::new(),
            unexplored_actions: Vec::new(),
            consecutive_duplicates: 0,
            is_exhausted: false,
        }
    }
}

/// A stage's proposed changes. `None` means "field untouched"; every
/// present field follows the monoid described in :
/// scalars take the newer value, lists append, sets union, and
/// `pending_actions`/`pending_queries_replace` are explicit replaces.
#[derive(Default, Debug)]
pub struct RunStateDelta {
    pub current_url: Option<NormalizedUrl>,
    pub current_fingerprint: Option<PageFingerprint>,
    pub dom_state: Option<String>,
    pub dom_elements: Option<Vec<SimplifiedElement>>,
    pub append_history: Vec<HistoryEntry>,
    pub append_queries: Vec<GraphWrite>,
    pub clear_queries: bool,
    pub exploration_status: Option<ExplorationStatus>,
    pub pending_actions: Option<Vec<PendingAction>>,
    pub union_visited_fingerprints: HashSet<PageFingerprint>,
    pub unexplored_actions: Option<Vec<String>>,
    pub consecutive_duplicates: Option<u32>,
    pub is_exhausted: Option<bool>,
}

impl RunStateDelta {
    pub fn terminal(status: ExplorationStatus) -> Self {
        Self {
            exploration_status: Some(status),
            ..Default::default()
        }
    }
}

/// Apply one stage's delta to the owning `RunState` in place, following the
/// field-wise merge semantics stages must not implement themselves.
pub fn apply_delta(state: &mut RunState, delta: RunStateDelta) {
    if let Some(url) = delta.current_url {
        state.current_url = Some(url);
    }
    if let Some(fp) = delta.current_fingerprint {
        state.current_fingerprint = Some(fp);
    }
    if let Some(dom) = delta.dom_state {
        state.dom_state = dom;
    }
    if let Some(elements) = delta.dom_elements {
        state.dom_elements = elements;
    }
    state.action_history.extend(delta.append_history);
    if delta.clear_queries {
        state.pending_queries.clear();
    }
    state.pending_queries.extend(delta.append_queries);
    if let Some(status) = delta.exploration_status {
        state.exploration_status = status;
    }
    if let Some(actions) = delta.pending_actions {
        state.pending_actions = actions;
    }
    state
        .visited_fingerprints
        .extend(delta.union_visited_fingerprints);
    if let Some(unexplored) = delta.unexplored_actions {
        state.unexplored_actions = unexplored;
    }
    if let Some(count) = delta.consecutive_duplicates {
        state.consecutive_duplicates = count;
    }
    if let Some(exhausted) = delta.is_exhausted {
        state.is_exhausted = exhausted;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scalar_fields_take_the_newer_value() {
        let mut state = RunState::initial(NormalizedUrl::normalize("https://example.com/"));
        let delta = RunStateDelta {
            dom_state: Some("updated".into()),
            ..Default::default()
        };
        apply_delta(&mut state, delta);
        assert_eq!(state.dom_state, "updated");
    }

    #[test]
    fn history_appends_rather_than_replaces() {
        let mut state = RunState::initial(NormalizedUrl::normalize("https://example.com/"));
        apply_delta(
            &mut state,
            RunStateDelta {
                append_history: vec![HistoryEntry { stage: "observe", summary: "a".into() }],
                ..Default::default()
            },
        );
        apply_delta(
            &mut state,
            RunStateDelta {
                append_history: vec![HistoryEntry { stage: "decide", summary: "b".into() }],
                ..Default::default()
            },
        );
        assert_eq!(state.action_history.len(), 2);
    }

    #[test]
    fn pending_actions_is_an_explicit_replace_including_clear() {
        let mut state = RunState::initial(NormalizedUrl::normalize("https://example.com/"));
        apply_delta(
            &mut state,
            RunStateDelta {
                pending_actions: Some(vec![]),
                ..Default::default()
            },
        );
        assert!(state.pending_actions.is_empty());
    }

    #[test]
    fn visited_fingerprints_union_dedupes() {
        let mut state = RunState::initial(NormalizedUrl::normalize("https://example.com/"));
        let fp = PageFingerprint::compute(&[]);
        apply_delta(
            &mut state,
            RunStateDelta {
                union_visited_fingerprints: [fp.clone()].into_iter().collect(),
                ..Default::default()
            },
        );
        apply_delta(
            &mut state,
            RunStateDelta {
                union_visited_fingerprints: [fp].into_iter().collect(),
                ..Default::default()
            },
        );
        assert_eq!(state.visited_fingerprints.len(), 1);
    }
}
