pub mod decide;
pub mod execute;
pub mod observe;
pub mod persist;

/// Statically configured generic selectors for cookie banners, analytics
/// overlays and similar chrome that should never be offered to the LLM.
pub const IGNORED_SELECTOR_SUBSTRINGS: &[&str] = &[
    "cookie", "consent", "gdpr", "onetrust", "analytics", "banner-close",
];

pub fn is_ignored(selector: &str) -> bool {
    let lower = selector.to_ascii_lowercase();
    IGNORED_SELECTOR_SUBSTRINGS
        .iter()
        .any(|needle| lower.contains(needle))
}
