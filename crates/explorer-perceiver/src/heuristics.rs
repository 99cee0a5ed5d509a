use crate::element::SimplifiedElement;

/// Selectors for a detected login form, parsed from the simplified element
/// list rather than raw HTML since that's all Decide has to work with.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LoginSelectors {
    pub username: String,
    pub password: String,
    pub submit: String,
}

/// Login heuristic: at least two of {password input, a username-ish input,
/// `autocomplete="username"`} must be present.
///
/// Returns `Some` only when username/password/submit selectors can all be
/// resolved; otherwise Decide falls through to the LLM.
pub fn detect_login_form(elements: &[SimplifiedElement]) -> Option<LoginSelectors> {
    let password = elements
        .iter()
        .find(|e| e.input_type.as_deref() == Some("password"));

    let username = elements.iter().find(|e| {
        e.input_type.as_deref() == Some("text") || e.input_type.as_deref() == Some("email")
    }).or_else(|| {
        elements.iter().find(|e| {
            looks_like_username(&e.css_selector) || looks_like_username(&e.visible_text)
        })
    });

    let mut signals = 0;
    if password.is_some() {
        signals += 1;
    }
    if username.is_some() {
        signals += 1;
    }
    if elements
        .iter()
        .any(|e| looks_like_username(&e.css_selector))
    {
        signals += 1;
    }
    if signals < 2 {
        return None;
    }

    let submit = elements.iter().find(|e| {
        e.tag == "button"
            || e.input_type.as_deref() == Some("submit")
            || looks_like_submit(&e.visible_text)
    });

    match (username, password, submit) {
        (Some(u), Some(p), Some(s)) => Some(LoginSelectors {
            username: u.css_selector.clone(),
            password: p.css_selector.clone(),
            submit: s.css_selector.clone(),
        }),
        _ => None,
    }
}

fn looks_like_username(text: &str) -> bool {
    let lower = text.to_ascii_lowercase();
    lower.contains("user") || lower.contains("email") || lower.contains("login")
}

fn looks_like_submit(text: &str) -> bool {
    let lower = text.to_ascii_lowercase();
    lower.contains("log in") || lower.contains("login") || lower.contains("sign in")
}

/// A modal is present when any simplified element carries the `inModal` flag.
pub fn detect_modal(elements: &[SimplifiedElement]) -> bool {
    elements.iter().any(|e| e.in_modal)
}
