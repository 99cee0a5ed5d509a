use url::Url;

/// The frontier key: origin + path, trailing slash stripped, query string and
/// fragment discarded. Idempotent: `normalize(normalize(u)) == normalize(u)`.
///
/// Transient query parameters or fragment-only navigation must not fork the
/// exploration state, so they are dropped rather than preserved.
#[derive(Clone, Debug, Eq, PartialEq, Hash, serde::Serialize, serde::Deserialize)]
pub struct NormalizedUrl(String);

impl NormalizedUrl {
    /// Normalize an arbitrary URL string. Falls back to trimming the raw
    /// string when it cannot be parsed as a URL (e.g. a relative fragment
    /// surfaced by a malformed `currentUrl()` response) so callers never
    /// have to special-case parse failures.
    pub fn normalize(raw: &str) -> Self {
        match Url::parse(raw) {
            Ok(url) => {
                let origin = url.origin().ascii_serialization();
                let path = url.path().trim_end_matches('/');
                if path.is_empty() {
                    Self(origin)
                } else {
                    Self(format!("{origin}{path}"))
                }
            }
            Err(_) => Self(raw.trim().trim_end_matches('/').to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Coarse equivalence class over URLs used for breadth-first backtrack
    /// prioritization: `/firstPathSegment/*`. and GLOSSARY
    /// "Section pattern".
    pub fn section_pattern(&self) -> String {
        let without_origin = self
            .0
            .split_once("://")
            .and_then(|(_, rest)| rest.split_once('/'))
            .map(|(_, path)| path)
            .unwrap_or("");
        let first_segment = without_origin.split('/').find(|s| !s.is_empty());
        match first_segment {
            Some(segment) => format!("/{segment}/*"),
            None => "/*".to_string(),
        }
    }
}

impl std::fmt::Display for NormalizedUrl {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_trailing_slash_query_and_fragment() {
        let a = NormalizedUrl::normalize("https://example.com/foo/?x=1#frag");
        let b = NormalizedUrl::normalize("https://example.com/foo");
        assert_eq!(a, b);
    }

    #[test]
    fn is_idempotent() {
        let once = NormalizedUrl::normalize("https://example.com/a/b/?q=1");
        let twice = NormalizedUrl::normalize(once.as_str());
        assert_eq!(once, twice);
    }

    #[test]
    fn root_path_normalizes_to_origin() {
        let root = NormalizedUrl::normalize("https://example.com/");
        assert_eq!(root.as_str(), "https://example.com");
    }

    #[test]
    fn section_pattern_uses_first_segment() {
        let url = NormalizedUrl::normalize("https://example.com/accounts/42/edit");
        assert_eq!(url.section_pattern(), "/accounts/*");
    }

    #[test]
    fn section_pattern_handles_root() {
        let url = NormalizedUrl::normalize("https://example.com/");
        assert_eq!(url.section_pattern(), "/*");
    }
}
