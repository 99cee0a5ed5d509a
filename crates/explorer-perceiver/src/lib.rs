//! DOM simplification and page fingerprinting.
//!
//! Turns a raw snapshot of actionable elements into the canonical text the
//! LLM and the fingerprint both consume, mirroring the role of an
//! element-tree builder in a layered agent codebase but specialized to the
//! exploration engine's action-identity and modal/login concerns.

mod element;
mod fingerprint;
mod formatter;
mod heuristics;

pub use element::{ElementKind, SimplifiedElement};
pub use fingerprint::PageFingerprint;
pub use formatter::{format_dom, format_dom_for_prompt, FormattedDom};
pub use heuristics::{detect_login_form, detect_modal, LoginSelectors};
