use serde::Deserialize;

use crate::dom::NodeId;

/// A semantic DOM event handed to the recorder. Targets reference nodes of
/// the recorder's DOM mirror.
#[derive(Debug, Clone, PartialEq)]
pub enum PageEvent {
    /// `input` on a text-like field or a select.
    Input { target: NodeId, value: String },
    /// `change`; `checked` carries the resulting state for checkables.
    Change {
        target: NodeId,
        value: String,
        checked: Option<bool>,
    },
    Click { target: NodeId },
    /// `submit` fired on a form element.
    Submit { target: NodeId },
    KeyDown { key: String },
    /// The page is navigating away; `url` is the destination.
    PageUnload { url: String },
    HashChange { url: String },
    PopState { url: String },
}

/// Wire shape of an event payload pushed from the page bridge, mirroring the
/// JSON the injected listeners emit.
#[derive(Debug, Clone, Deserialize)]
pub struct RawEvent {
    #[serde(rename = "type")]
    pub event_type: String,
    #[serde(default)]
    pub target: Option<NodeId>,
    #[serde(default)]
    pub value: Option<String>,
    #[serde(default)]
    pub checked: Option<bool>,
    #[serde(default)]
    pub key: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
}

impl RawEvent {
    /// Convert to a typed event. Unknown event types and payloads missing
    /// their required fields yield `None` and are skipped by the recorder.
    pub fn into_event(self) -> Option<PageEvent> {
        match self.event_type.as_str() {
            "input" => Some(PageEvent::Input {
                target: self.target?,
                value: self.value.unwrap_or_default(),
            }),
            "change" => Some(PageEvent::Change {
                target: self.target?,
                value: self.value.unwrap_or_default(),
                checked: self.checked,
            }),
            "click" => Some(PageEvent::Click { target: self.target? }),
            "submit" => Some(PageEvent::Submit { target: self.target? }),
            "keydown" => Some(PageEvent::KeyDown { key: self.key? }),
            "unload" | "beforeunload" => Some(PageEvent::PageUnload { url: self.url? }),
            "hashchange" => Some(PageEvent::HashChange { url: self.url? }),
            "popstate" => Some(PageEvent::PopState { url: self.url? }),
            _ => None,
        }
    }
}
