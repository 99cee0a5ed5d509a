use std::collections::HashSet;

use crate::element::SimplifiedElement;

/// Canonical text rendering of a page's actionable elements plus the index
/// → element mapping Decide and Execute resolve selectors against.
///
/// The exact line format is fingerprint-significant: it must not change
/// between runs for the same underlying snapshot.
#[derive(Clone, Debug)]
pub struct FormattedDom {
    pub text: String,
    pub indexed: Vec<SimplifiedElement>,
}

/// Render elements into `Actionable Elements (N):` header followed by
/// `[idx] TAG | Text: "…" | Type: … | Role: … | Selector: …` lines, with
/// modal elements pulled into a leading banner section.
pub fn format_dom(elements: &[SimplifiedElement]) -> FormattedDom {
    let (modal, rest): (Vec<_>, Vec<_>) = elements.iter().cloned().partition(|e| e.in_modal);

    let mut indexed = Vec::with_capacity(elements.len());
    let mut lines = vec![format!("Actionable Elements ({}):", elements.len())];

    if !modal.is_empty() {
        lines.push("=== MODAL SECTION ===".to_string());
        for el in modal {
            lines.push(render_line(indexed.len(), &el));
            indexed.push(el);
        }
        lines.push("=== END MODAL SECTION ===".to_string());
    }

    for el in rest {
        lines.push(render_line(indexed.len(), &el));
        indexed.push(el);
    }

    FormattedDom {
        text: lines.join("\n"),
        indexed,
    }
}

/// Like `format_dom`, but restricted to the page's unexplored actions
/// (identified by `ActionId::as_str()`) and with the modal section tagged
/// `PRIORITY` rather than `MODAL`. Used for the LLM user prompt, where
/// already-explored elements would just waste context and the model needs
/// an unambiguous signal for what to act on first.
pub fn format_dom_for_prompt(elements: &[SimplifiedElement], unexplored: &HashSet<String>) -> String {
    let filtered: Vec<SimplifiedElement> = elements
        .iter()
        .filter(|e| unexplored.contains(e.action_id().as_str()))
        .cloned()
        .collect();

    let (modal, rest): (Vec<_>, Vec<_>) = filtered.into_iter().partition(|e| e.in_modal);

    let mut lines = vec![format!("Actionable Elements ({}):", modal.len() + rest.len())];
    let mut idx = 0;

    if !modal.is_empty() {
        lines.push("=== PRIORITY SECTION (MODAL) ===".to_string());
        for el in &modal {
            lines.push(render_line(idx, el));
            idx += 1;
        }
        lines.push("=== END PRIORITY SECTION ===".to_string());
    }

    for el in &rest {
        lines.push(render_line(idx, el));
        idx += 1;
    }

    lines.join("\n")
}

fn render_line(idx: usize, el: &SimplifiedElement) -> String {
    format!(
        "[{idx}] {} | Text: \"{}\" | Type: {} | Role: {} | Selector: {}{}",
        el.tag.to_ascii_uppercase(),
        el.visible_text,
        el.input_type.as_deref().unwrap_or("-"),
        el.role.as_deref().unwrap_or("-"),
        el.css_selector,
        if el.disabled { " | Disabled" } else { "" },
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn modal_elements_precede_plain_elements() {
        let plain = SimplifiedElement::new("button", &HashMap::new(), Some("Go"), false);
        let modal = SimplifiedElement::new("button", &HashMap::new(), Some("Close"), true);
        let formatted = format_dom(&[plain, modal]);
        assert!(formatted.text.contains("=== MODAL SECTION ==="));
        let modal_pos = formatted.text.find("Close").unwrap();
        let plain_pos = formatted.text.find("Go").unwrap();
        assert!(modal_pos < plain_pos);
    }

    #[test]
    fn header_reports_total_count() {
        let els = vec![
            SimplifiedElement::new("a", &HashMap::new(), Some("One"), false),
            SimplifiedElement::new("a", &HashMap::new(), Some("Two"), false),
        ];
        let formatted = format_dom(&els);
        assert!(formatted.text.starts_with("Actionable Elements (2):"));
    }

    #[test]
    fn no_modal_section_when_nothing_is_modal() {
        let els = vec![SimplifiedElement::new("a", &HashMap::new(), Some("One"), false)];
        let formatted = format_dom(&els);
        assert!(!formatted.text.contains("MODAL"));
    }

    #[test]
    fn prompt_view_drops_explored_elements_and_tags_modal_priority() {
        let explored = SimplifiedElement::new("a", &HashMap::new(), Some("Explored"), false);
        let unexplored = SimplifiedElement::new("button", &HashMap::new(), Some("Go"), false);
        let modal = SimplifiedElement::new("button", &HashMap::new(), Some("Close"), true);

        let still_open: HashSet<String> = [unexplored.action_id().as_str().to_string(), modal.action_id().as_str().to_string()]
            .into_iter()
            .collect();

        let text = format_dom_for_prompt(&[explored, unexplored, modal], &still_open);
        assert!(!text.contains("Explored"));
        assert!(text.contains("Go"));
        assert!(text.contains("=== PRIORITY SECTION"));
        assert!(!text.contains("MODAL SECTION"));
    }
}
