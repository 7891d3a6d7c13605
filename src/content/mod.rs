//! Semantic classification of decoded text and the follow-up action offered
//! for each category.

pub mod action;
pub mod classify;
pub mod wifi;

pub use action::{suggested_action, ActionHost, ActionKind, SuggestedAction};
pub use classify::{classify, truncate_for_display, Category};
pub use wifi::WifiCredential;
