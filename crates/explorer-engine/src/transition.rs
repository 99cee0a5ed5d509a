use dashmap::DashSet;
use explorer_types::NormalizedUrl;

/// Session-scope dedupe key for a batch's first action: `(fromUrl,
/// firstSelector, firstVisibleText)`.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct TransitionKey {
    pub from_url: NormalizedUrl,
    pub first_selector: String,
    pub first_visible_text: String,
}

impl TransitionKey {
    pub fn new(from_url: NormalizedUrl, first_selector: String, first_visible_text: String) -> Self {
        Self {
            from_url,
            first_selector,
            first_visible_text,
        }
    }
}

/// Executed-transition cache: tracks batches already run so identical
/// proposals skip the browser entirely.
#[derive(Default)]
pub struct TransitionCache {
    seen: DashSet<TransitionKey>,
}

impl TransitionCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, key: &TransitionKey) -> bool {
        self.seen.contains(key)
    }

    pub fn insert(&self, key: TransitionKey) {
        self.seen.insert(key);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn records_and_recognizes_a_transition() {
        let cache = TransitionCache::new();
        let url = NormalizedUrl::normalize("https://example.com/a");
        let key = TransitionKey::new(url, "#go".into(), "Go".into());
        assert!(!cache.contains(&key));
        cache.insert(key.clone());
        assert!(cache.contains(&key));
    }
}
