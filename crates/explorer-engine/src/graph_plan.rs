use chrono::{DateTime, Utc};
use explorer_perceiver::PageFingerprint;
use explorer_types::{NormalizedUrl, SessionId};

/// One planned write produced by Execute and flushed by Persist. Both
/// variants are idempotent upserts: merging the same state or transition
/// twice leaves the graph unchanged.
#[derive(Clone, Debug)]
pub enum GraphWrite {
    MergeState {
        url: NormalizedUrl,
        session_id: SessionId,
        fingerprint: PageFingerprint,
        timestamp: DateTime<Utc>,
    },
    MergeTransition {
        from_url: NormalizedUrl,
        to_url: NormalizedUrl,
        session_id: SessionId,
        action: String,
        selector: String,
        timestamp: DateTime<Utc>,
    },
}

/// Builds the three writes Execute always plans for a completed batch: the
/// from-state merge, the to-state merge, and the transition edge merge.
pub fn plan_batch_writes(
    session_id: &SessionId,
    from_url: &NormalizedUrl,
    to_url: &NormalizedUrl,
    from_fingerprint: PageFingerprint,
    to_fingerprint: PageFingerprint,
    batch_description: String,
    first_selector: String,
    timestamp: DateTime<Utc>,
) -> Vec<GraphWrite> {
    vec![
        GraphWrite::MergeState {
            url: from_url.clone(),
            session_id: session_id.clone(),
            fingerprint: from_fingerprint,
            timestamp,
        },
        GraphWrite::MergeState {
            url: to_url.clone(),
            session_id: session_id.clone(),
            fingerprint: to_fingerprint,
            timestamp,
        },
        GraphWrite::MergeTransition {
            from_url: from_url.clone(),
            to_url: to_url.clone(),
            session_id: session_id.clone(),
            action: batch_description,
            selector: first_selector,
            timestamp,
        },
    ]
}
