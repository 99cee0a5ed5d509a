use sha2::{Digest, Sha256};

use crate::element::SimplifiedElement;

/// Deterministic short hash over the canonical serialization of a simplified
/// actionable-element list. Stable across runs and platforms for the same
/// underlying page.
#[derive(Clone, Debug, Eq, PartialEq, Hash, serde::Serialize, serde::Deserialize)]
pub struct PageFingerprint(String);

impl PageFingerprint {
    /// Hashes the same canonical text `format_dom` produces, so the
    /// fingerprint and the text the LLM reads are always in lockstep.
    pub fn compute(elements: &[SimplifiedElement]) -> Self {
        let canonical = canonical_serialization(elements);
        let digest = Sha256::digest(canonical.as_bytes());
        let hex = format!("{digest:x}");
        Self(hex[..16].to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for PageFingerprint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

fn canonical_serialization(elements: &[SimplifiedElement]) -> String {
    elements
        .iter()
        .map(|e| {
            format!(
                "{}|{}|{}|{}|{}|{}|{}",
                e.tag,
                e.visible_text,
                e.css_selector,
                e.input_type.as_deref().unwrap_or(""),
                e.role.as_deref().unwrap_or(""),
                e.disabled,
                e.in_modal,
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}
