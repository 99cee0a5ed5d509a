/// Composite identity of an action on a page: `selector ||| visibleText`.
/// Selectors alone are insufficient because the same selector may match
/// several distinct elements in a list.
#[derive(Clone, Debug, Eq, PartialEq, Hash, Ord, PartialOrd, serde::Serialize, serde::Deserialize)]
pub struct ActionId(String);

const SEPARATOR: &str = " ||| ";

impl ActionId {
    pub fn new(selector: &str, visible_text: &str) -> Self {
        Self(format!("{selector}{SEPARATOR}{visible_text}"))
    }

    pub fn selector(&self) -> &str {
        self.0.split(SEPARATOR).next().unwrap_or("")
    }

    pub fn visible_text(&self) -> &str {
        self.0.splitn(2, SEPARATOR).nth(1).unwrap_or("")
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ActionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// A single step in an action batch. `Navigate` exists only as a rejected
/// command path: the LLM may propose it, but Execute always refuses it.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub enum PendingAction {
    Click { selector: String, visible_text: String },
    Type { selector: String, visible_text: String, text: String },
    Select { selector: String, visible_text: String, value: String },
    Navigate { url: String },
}

impl PendingAction {
    pub fn action_id(&self) -> Option<ActionId> {
        match self {
            PendingAction::Click { selector, visible_text }
            | PendingAction::Type { selector, visible_text, .. }
            | PendingAction::Select { selector, visible_text, .. } => {
                Some(ActionId::new(selector, visible_text))
            }
            PendingAction::Navigate { .. } => None,
        }
    }

    pub fn selector(&self) -> Option<&str> {
        match self {
            PendingAction::Click { selector, .. }
            | PendingAction::Type { selector, .. }
            | PendingAction::Select { selector, .. } => Some(selector),
            PendingAction::Navigate { .. } => None,
        }
    }

    pub fn describe(&self) -> String {
        match self {
            PendingAction::Click { selector, .. } => format!("clickElement on {selector}"),
            PendingAction::Type { selector, text, .. } => {
                format!("typeText on {selector} with text \"{text}\"")
            }
            PendingAction::Select { selector, value, .. } => {
                format!("selectOption on {selector} with value \"{value}\"")
            }
            PendingAction::Navigate { url } => format!("navigate to {url}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn action_id_round_trips_components() {
        let id = ActionId::new("#submit", "Log in");
        assert_eq!(id.selector(), "#submit");
        assert_eq!(id.visible_text(), "Log in");
    }

    #[test]
    fn describe_matches_batch_description_shape() {
        let action = PendingAction::Type {
            selector: "#username".into(),
            visible_text: String::new(),
            text: "admin".into(),
        };
        assert_eq!(action.describe(), "typeText on #username with text \"admin\"");
    }
}
