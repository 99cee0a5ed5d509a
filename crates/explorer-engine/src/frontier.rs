use std::collections::HashSet;

use dashmap::DashMap;
use explorer_perceiver::PageFingerprint;
use explorer_types::{ActionId, NormalizedUrl};
use parking_lot::Mutex;

/// Per-URL bookkeeping. `exploredActions` only ever grows and is always a
/// subset of `availableActions`.
#[derive(Clone, Debug)]
pub struct ExplorationState {
    pub url: NormalizedUrl,
    pub latest_fingerprint: Option<PageFingerprint>,
    pub available_actions: HashSet<ActionId>,
    pub explored_actions: HashSet<ActionId>,
    pub modal_actions: HashSet<ActionId>,
    pub parent_url: Option<NormalizedUrl>,
}

impl ExplorationState {
    fn new(url: NormalizedUrl, parent_url: Option<NormalizedUrl>) -> Self {
        Self {
            url,
            latest_fingerprint: None,
            available_actions: HashSet::new(),
            explored_actions: HashSet::new(),
            modal_actions: HashSet::new(),
            parent_url,
        }
    }

    pub fn unexplored(&self) -> HashSet<ActionId> {
        self.available_actions
            .difference(&self.explored_actions)
            .cloned()
            .collect()
    }

    pub fn is_exhausted(&self) -> bool {
        self.unexplored().is_empty()
    }
}

/// `{url, unexploredCount}`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BacktrackTarget {
    pub url: NormalizedUrl,
    pub unexplored_count: usize,
}

/// `NormalizedUrl → ExplorationState`, shared across all stages of one
/// session. Single-threaded per session, but `DashMap` avoids
/// needing `&mut` references to thread through every stage signature.
#[derive(Default)]
pub struct Frontier {
    states: DashMap<NormalizedUrl, ExplorationState>,
    backtrack_stack: Mutex<Vec<NormalizedUrl>>,
}

impl Frontier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register or update a URL's state. On first registration, seeds
    /// `availableActions` from the snapshot; on revisit, unions in newly
    /// discovered actions without touching `exploredActions`.
    pub fn observe(
        &self,
        url: &NormalizedUrl,
        fingerprint: PageFingerprint,
        discovered: impl IntoIterator<Item = ActionId>,
        parent_url: Option<NormalizedUrl>,
    ) {
        self.observe_with_modal(url, fingerprint, discovered, std::iter::empty(), parent_url)
    }

    /// Like `observe`, but also records which of the discovered actions sit
    /// inside a modal, so the backtrack selector can prefer modal-bearing
    /// targets.
    pub fn observe_with_modal(
        &self,
        url: &NormalizedUrl,
        fingerprint: PageFingerprint,
        discovered: impl IntoIterator<Item = ActionId>,
        modal: impl IntoIterator<Item = ActionId>,
        parent_url: Option<NormalizedUrl>,
    ) {
        let mut entry = self
            .states
            .entry(url.clone())
            .or_insert_with(|| ExplorationState::new(url.clone(), parent_url));
        entry.latest_fingerprint = Some(fingerprint);
        entry.available_actions.extend(discovered);
        entry.modal_actions.extend(modal);
    }

    pub fn get(&self, url: &NormalizedUrl) -> Option<ExplorationState> {
        self.states.get(url).map(|e| e.clone())
    }

    pub fn unexplored_actions(&self, url: &NormalizedUrl) -> HashSet<ActionId> {
        self.states
            .get(url)
            .map(|e| e.unexplored())
            .unwrap_or_default()
    }

    /// Mark a batch of actions explored at `url`'s frontier entry — always
    /// the from-URL, never the landing URL.
    pub fn mark_explored(&self, url: &NormalizedUrl, actions: impl IntoIterator<Item = ActionId>) {
        if let Some(mut entry) = self.states.get_mut(url) {
            entry.explored_actions.extend(actions);
        }
    }

    pub fn has_visited_fingerprint(&self, fingerprint: &PageFingerprint) -> bool {
        self.states
            .iter()
            .any(|e| e.latest_fingerprint.as_ref() == Some(fingerprint))
    }

    /// A page is exhausted once it has nothing left to explore and its
    /// content is not novel. `fingerprint_already_known` must be computed by
    /// the caller with `has_visited_fingerprint` *before* this visit's
    /// fingerprint is registered via `observe`/`observe_with_modal` — a
    /// page's first sighting must never count as a repeat of itself.
    pub fn page_exhausted(&self, url: &NormalizedUrl, fingerprint_already_known: bool) -> bool {
        let unexplored_empty = self
            .states
            .get(url)
            .map(|e| e.is_exhausted())
            .unwrap_or(true);
        unexplored_empty && fingerprint_already_known
    }

    /// Push `url` onto the backtrack stack iff it still has unexplored
    /// actions, deduping any existing entry for the same URL first.
    pub fn push_backtrack(&self, url: &NormalizedUrl) {
        if self.unexplored_actions(url).is_empty() {
            return;
        }
        let mut stack = self.backtrack_stack.lock();
        stack.retain(|u| u != url);
        stack.push(url.clone());
    }

    /// The breadth-first/modal-aware backtrack selector: prefers the
    /// candidate whose section pattern is least represented in the
    /// frontier, breaking ties toward modal-bearing targets.
    pub fn select_backtrack_target(&self) -> Option<BacktrackTarget> {
        let mut stack = self.backtrack_stack.lock();

        // Drop entries that became exhausted since they were pushed; the
        // stack only ever holds URLs with pending work.
        stack.retain(|url| !self.unexplored_actions(url).is_empty());

        let candidates: Vec<NormalizedUrl> = stack.iter().rev().cloned().collect();

        if candidates.is_empty() {
            return None;
        }

        // Section patterns already represented more than once in the
        // frontier are "crowded"; prefer candidates whose section pattern
        // is the least represented, promoting breadth across distinct
        // first-path-segments.
        let mut section_counts: std::collections::HashMap<String, usize> =
            std::collections::HashMap::new();
        for entry in self.states.iter() {
            *section_counts
                .entry(entry.url.section_pattern())
                .or_insert(0) += 1;
        }

        let least_crowded = candidates.iter().min_by_key(|url| {
            section_counts
                .get(&url.section_pattern())
                .copied()
                .unwrap_or(0)
        });

        // Among ties at the minimum crowding, prefer one whose unexplored
        // set contains a modal-bearing action.
        let min_count = least_crowded.map(|url| {
            section_counts
                .get(&url.section_pattern())
                .copied()
                .unwrap_or(0)
        });

        let breadth_tier: Vec<&NormalizedUrl> = candidates
            .iter()
            .filter(|url| {
                section_counts.get(&url.section_pattern()).copied().unwrap_or(0) == min_count.unwrap_or(0)
            })
            .collect();

        let chosen = breadth_tier
            .iter()
            .find(|url| self.has_modal_action(url))
            .copied()
            .or_else(|| breadth_tier.first().copied())
            .unwrap_or(&candidates[0]);
        let chosen = chosen.clone();

        // Selected target is consumed; `Execute` re-pushes it via
        // `push_backtrack` if it still has unexplored actions afterward.
        stack.retain(|u| u != &chosen);

        Some(BacktrackTarget {
            unexplored_count: self.unexplored_actions(&chosen).len(),
            url: chosen,
        })
    }

    fn has_modal_action(&self, url: &NormalizedUrl) -> bool {
        self.states
            .get(url)
            .map(|e| !e.modal_actions.is_disjoint(&e.unexplored()))
            .unwrap_or(false)
    }
}
