use serde::Serialize;

use super::Category;

/// Host-side effects a suggested action may trigger. Implemented by the
/// presentation layer.
pub trait ActionHost {
    /// Open `target` (a URL, `mailto:` or `tel:` URI). `new_context` asks for
    /// a new tab/window rather than replacing the current view.
    fn open(&self, target: &str, new_context: bool);
    fn copy_to_clipboard(&self, text: &str) -> bool;
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum ActionKind {
    OpenInNewContext,
    ComposeEmail,
    InitiateCall,
    ShowNetworkInfo,
    CopyToClipboard,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SuggestedAction {
    pub label: &'static str,
    pub kind: ActionKind,
    /// What the action operates on: a URI for open-style actions, the raw
    /// text for clipboard copies, nothing for info-only actions.
    pub target: Option<String>,
}

impl SuggestedAction {
    /// Run the action against `host`. Returns whether the host reported
    /// success; info-only actions always succeed.
    pub fn perform(&self, host: &dyn ActionHost) -> bool {
        match (self.kind, self.target.as_deref()) {
            (ActionKind::OpenInNewContext, Some(target)) => {
                host.open(target, true);
                true
            }
            (ActionKind::ComposeEmail | ActionKind::InitiateCall, Some(target)) => {
                host.open(target, false);
                true
            }
            (ActionKind::CopyToClipboard, Some(text)) => host.copy_to_clipboard(text),
            // Joining a network needs native support; nothing to do here
            (ActionKind::ShowNetworkInfo, _) => true,
            (_, None) => false,
        }
    }
}

pub fn suggested_action(category: Category, text: &str) -> SuggestedAction {
    match category {
        Category::Link => SuggestedAction {
            label: "Open Link",
            kind: ActionKind::OpenInNewContext,
            target: Some(text.to_owned()),
        },
        Category::Email => SuggestedAction {
            label: "Send Email",
            kind: ActionKind::ComposeEmail,
            target: Some(prefixed("mailto:", text)),
        },
        Category::Phone => SuggestedAction {
            label: "Call",
            kind: ActionKind::InitiateCall,
            target: Some(prefixed("tel:", text)),
        },
        Category::NetworkCredential => SuggestedAction {
            label: "WiFi Info",
            kind: ActionKind::ShowNetworkInfo,
            target: None,
        },
        Category::PlainText => SuggestedAction {
            label: "Copy",
            kind: ActionKind::CopyToClipboard,
            target: Some(text.to_owned()),
        },
    }
}

fn prefixed(scheme: &str, text: &str) -> String {
    if text.starts_with(scheme) {
        text.to_owned()
    } else {
        format!("{scheme}{text}")
    }
}
