use std::collections::HashMap;

use explorer_types::ActionId;

const MAX_VISIBLE_TEXT_CHARS: usize = 30;

/// Raw element kind as reported by `snapshotDom`, before selector resolution.
/// Mirrors the interactive-tag/role tables a DOM-snapshot indexer keys off
/// of, trimmed to the handful of tags the exploration engine actually acts on.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ElementKind {
    Link,
    Button,
    Input,
    Select,
    TextArea,
    Other,
}

impl ElementKind {
    pub fn from_tag(tag: &str) -> Self {
        match tag.to_ascii_lowercase().as_str() {
            "a" => ElementKind::Link,
            "button" => ElementKind::Button,
            "input" => ElementKind::Input,
            "select" => ElementKind::Select,
            "textarea" => ElementKind::TextArea,
            _ => ElementKind::Other,
        }
    }

    pub fn tag(&self) -> &'static str {
        match self {
            ElementKind::Link => "a",
            ElementKind::Button => "button",
            ElementKind::Input => "input",
            ElementKind::Select => "select",
            ElementKind::TextArea => "textarea",
            ElementKind::Other => "div",
        }
    }
}

/// A single actionable element after simplification.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct SimplifiedElement {
    pub tag: String,
    pub visible_text: String,
    pub css_selector: String,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub input_type: Option<String>,
    pub role: Option<String>,
    pub disabled: bool,
    pub in_modal: bool,
}

impl SimplifiedElement {
    /// Build a simplified element from raw tag/attributes/text, resolving
    /// the CSS selector with the `#id` → `[name]` → `tag.class` → fallback
    /// priority order and truncating `visibleText` to 30 chars.
    pub fn new(
        tag: &str,
        attrs: &HashMap<String, String>,
        raw_text: Option<&str>,
        in_modal: bool,
    ) -> Self {
        let visible_text = resolve_visible_text(attrs, raw_text);
        let css_selector = resolve_selector(tag, attrs);
        let disabled = attrs
            .get("disabled")
            .map(|v| v != "false")
            .unwrap_or(false);
        let kind = ElementKind::from_tag(tag);
        let role = attrs
            .get("role")
            .cloned()
            .or_else(|| default_role(kind, attrs.get("type").map(String::as_str)));
        Self {
            tag: tag.to_ascii_lowercase(),
            visible_text,
            css_selector,
            input_type: attrs.get("type").cloned(),
            role,
            disabled,
            in_modal,
        }
    }

    pub fn action_id(&self) -> ActionId {
        ActionId::new(&self.css_selector, &self.visible_text)
    }
}

/// Implicit ARIA role by tag kind, used when the element carries no
/// explicit `role` attribute. Mirrors the handful of roles the exploration
/// engine actually distinguishes on; anything else is left unset rather
/// than guessed.
fn default_role(kind: ElementKind, input_type: Option<&str>) -> Option<String> {
    match kind {
        ElementKind::Link => Some("link".to_string()),
        ElementKind::Button => Some("button".to_string()),
        ElementKind::Select => Some("combobox".to_string()),
        ElementKind::TextArea => Some("textbox".to_string()),
        ElementKind::Input => match input_type.unwrap_or("text") {
            "checkbox" => Some("checkbox".to_string()),
            "radio" => Some("radio".to_string()),
            "submit" | "button" => Some(ElementKind::Button.tag().to_string()),
            _ => Some("textbox".to_string()),
        },
        ElementKind::Other => None,
    }
}

/// `textContent` (trimmed, capped) → `aria-label` → `placeholder` → `title`
/// → `"(no text)"`.
fn resolve_visible_text(attrs: &HashMap<String, String>, raw_text: Option<&str>) -> String {
    let candidate = raw_text
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .or_else(|| attrs.get("aria-label").map(String::as_str))
        .or_else(|| attrs.get("placeholder").map(String::as_str))
        .or_else(|| attrs.get("title").map(String::as_str));

    match candidate {
        Some(text) if !text.trim().is_empty() => truncate(text.trim()),
        _ => "(no text)".to_string(),
    }
}

fn truncate(text: &str) -> String {
    let char_count = text.chars().count();
    if char_count <= MAX_VISIBLE_TEXT_CHARS {
        text.to_string()
    } else {
        let truncated: String = text
            .chars()
            .take(MAX_VISIBLE_TEXT_CHARS.saturating_sub(3))
            .collect();
        format!("{truncated}...")
    }
}

fn resolve_selector(tag: &str, attrs: &HashMap<String, String>) -> String {
    if let Some(id) = attrs.get("id") {
        if !id.is_empty() && !id.contains(' ') {
            return format!("#{id}");
        }
    }

    let mut parts = vec![tag.to_ascii_lowercase()];
    if let Some(name) = attrs.get("name").filter(|n| !n.is_empty()) {
        parts.push(format!("[name=\"{name}\"]"));
    } else if let Some(class) = attrs.get("class") {
        if let Some(first) = class.split_whitespace().next() {
            parts.push(format!(".{first}"));
        }
    }
    if let Some(input_type) = attrs.get("type") {
        parts.push(format!("[type=\"{input_type}\"]"));
    }
    parts.concat()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn attrs(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn prefers_id_selector() {
        let a = attrs(&[("id", "submit"), ("class", "btn primary")]);
        let el = SimplifiedElement::new("button", &a, Some("Go"), false);
        assert_eq!(el.css_selector, "#submit");
    }

    #[test]
    fn falls_back_to_name_then_class() {
        let named = attrs(&[("name", "q")]);
        let el = SimplifiedElement::new("input", &named, None, false);
        assert_eq!(el.css_selector, "input[name=\"q\"]");

        let classed = attrs(&[("class", "search-box extra")]);
        let el = SimplifiedElement::new("input", &classed, None, false);
        assert_eq!(el.css_selector, "input.search-box");
    }

    #[test]
    fn truncates_long_visible_text() {
        let a = attrs(&[]);
        let long_text = "a".repeat(50);
        let el = SimplifiedElement::new("a", &a, Some(&long_text), false);
        assert_eq!(el.visible_text.chars().count(), 30);
        assert!(el.visible_text.ends_with("..."));
    }

    #[test]
    fn missing_text_becomes_placeholder() {
        let a = attrs(&[]);
        let el = SimplifiedElement::new("div", &a, None, false);
        assert_eq!(el.visible_text, "(no text)");
    }

    #[test]
    fn implicit_role_is_inferred_from_tag_when_absent() {
        let link = SimplifiedElement::new("a", &attrs(&[]), Some("Home"), false);
        assert_eq!(link.role.as_deref(), Some("link"));

        let checkbox = SimplifiedElement::new("input", &attrs(&[("type", "checkbox")]), None, false);
        assert_eq!(checkbox.role.as_deref(), Some("checkbox"));

        let plain_div = SimplifiedElement::new("div", &attrs(&[]), None, false);
        assert_eq!(plain_div.role, None);
    }

    #[test]
    fn explicit_role_attribute_wins_over_the_inferred_one() {
        let el = SimplifiedElement::new("div", &attrs(&[("role", "tab")]), None, false);
        assert_eq!(el.role.as_deref(), Some("tab"));
    }

    #[test]
    fn element_kind_round_trips_through_its_canonical_tag() {
        for kind in [
            ElementKind::Link,
            ElementKind::Button,
            ElementKind::Input,
            ElementKind::Select,
            ElementKind::TextArea,
        ] {
            assert_eq!(ElementKind::from_tag(kind.tag()), kind);
        }
        assert_eq!(ElementKind::from_tag("span"), ElementKind::Other);
    }
}
