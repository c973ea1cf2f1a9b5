//! Subtree-change watching.
//!
//! Two debounced triggers turn DOM mutations into implicit waits: a new
//! visible form field becoming attached, and a loading indicator being
//! removed. Rapid mutations within the window collapse into one step.

use regex::Regex;

use crate::dom::{NodeId, PageDom};
use crate::label::LabelResolver;
use crate::models::RecordedStep;
use crate::selector::SelectorResolver;

const LOADING_CLASS_PATTERN: &str = r"(?i)loading|spinner|loader|progress";

#[derive(Debug, Clone)]
struct PendingWait {
    selector: String,
    label: String,
    deadline: i64,
}

pub struct MutationWatcher {
    debounce_ms: i64,
    wait_timeout_ms: i64,
    loading_pattern: Regex,
    pending_field: Option<PendingWait>,
    pending_loading: Option<PendingWait>,
}

impl MutationWatcher {
    pub fn new(debounce_ms: i64, wait_timeout_ms: i64) -> Self {
        Self {
            debounce_ms,
            wait_timeout_ms,
            loading_pattern: Regex::new(LOADING_CLASS_PATTERN).expect("valid loading pattern"),
            pending_field: None,
            pending_loading: None,
        }
    }

    /// A node was attached. Schedules a `wait-for-element` when it is a
    /// visible form field; re-arming within the window replaces the pending
    /// entry.
    pub fn node_attached(
        &mut self,
        dom: &PageDom,
        id: NodeId,
        selectors: &SelectorResolver,
        labels: &LabelResolver,
        now_ms: i64,
    ) {
        let Some(node) = dom.node(id) else { return };
        if !node.is_form_field() || !dom.is_visible(id) {
            return;
        }
        let selector = selectors.resolve(dom, id);
        let label = match labels.resolve(dom, id) {
            Some(text) => format!("Wait for field \"{}\"", text),
            None => format!("Wait for field {}", selector),
        };
        tracing::debug!(%selector, "field attached, scheduling wait-for-element");
        self.pending_field = Some(PendingWait {
            selector,
            label,
            deadline: now_ms + self.debounce_ms,
        });
    }

    /// A node is about to be detached. Schedules a `wait-for-hidden` when its
    /// class list matches the loading-indicator pattern.
    pub fn node_detached(&mut self, dom: &PageDom, id: NodeId, now_ms: i64) {
        let Some(node) = dom.node(id) else { return };
        let Some(class) = node
            .classes()
            .into_iter()
            .find(|c| self.loading_pattern.is_match(c))
        else {
            return;
        };
        let selector = format!(".{}", class);
        tracing::debug!(%selector, "loading indicator removed, scheduling wait-for-hidden");
        self.pending_loading = Some(PendingWait {
            selector,
            label: "Wait for loading indicator to disappear".to_string(),
            deadline: now_ms + self.debounce_ms,
        });
    }

    /// Expired pending waits as steps, deadline order.
    pub fn take_expired(&mut self, now_ms: i64) -> Vec<RecordedStep> {
        let mut expired: Vec<(i64, RecordedStep)> = Vec::new();
        if self
            .pending_field
            .as_ref()
            .map(|p| p.deadline <= now_ms)
            .unwrap_or(false)
        {
            if let Some(pending) = self.pending_field.take() {
                expired.push((
                    pending.deadline,
                    RecordedStep::wait_for_element(
                        &pending.selector,
                        Some(pending.label),
                        self.wait_timeout_ms,
                        now_ms,
                    ),
                ));
            }
        }
        if self
            .pending_loading
            .as_ref()
            .map(|p| p.deadline <= now_ms)
            .unwrap_or(false)
        {
            if let Some(pending) = self.pending_loading.take() {
                expired.push((
                    pending.deadline,
                    RecordedStep::wait_for_hidden(
                        &pending.selector,
                        Some(pending.label),
                        self.wait_timeout_ms,
                        now_ms,
                    ),
                ));
            }
        }
        expired.sort_by_key(|(deadline, _)| *deadline);
        expired.into_iter().map(|(_, step)| step).collect()
    }

    pub fn reset(&mut self) {
        self.pending_field = None;
        self.pending_loading = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::DomNode;
    use crate::models::StepType;

    fn fixtures() -> (PageDom, SelectorResolver, LabelResolver) {
        (PageDom::new("https://example.com"), SelectorResolver::new(), LabelResolver::new())
    }

    #[test]
    fn attached_field_becomes_wait_for_element_after_debounce() {
        let (mut dom, selectors, labels) = fixtures();
        let mut watcher = MutationWatcher::new(500, 5_000);
        let input = dom.attach(dom.root(), DomNode::new("input").attr("id", "otp"));
        watcher.node_attached(&dom, input, &selectors, &labels, 1_000);
        assert!(watcher.take_expired(1_200).is_empty());
        let steps = watcher.take_expired(1_600);
        assert_eq!(steps.len(), 1);
        assert_eq!(steps[0].step_type, StepType::WaitForElement);
        assert_eq!(steps[0].selector.as_deref(), Some("#otp"));
        assert!(steps[0].label.as_deref().unwrap_or("").contains("field"));
    }

    #[test]
    fn rapid_attaches_collapse_to_one_step() {
        let (mut dom, selectors, labels) = fixtures();
        let mut watcher = MutationWatcher::new(500, 5_000);
        let first = dom.attach(dom.root(), DomNode::new("input").attr("id", "a"));
        let second = dom.attach(dom.root(), DomNode::new("input").attr("id", "b"));
        watcher.node_attached(&dom, first, &selectors, &labels, 1_000);
        watcher.node_attached(&dom, second, &selectors, &labels, 1_100);
        let steps = watcher.take_expired(2_000);
        assert_eq!(steps.len(), 1);
        assert_eq!(steps[0].selector.as_deref(), Some("#b"));
    }

    #[test]
    fn removed_spinner_becomes_wait_for_hidden() {
        let (mut dom, _, _) = fixtures();
        let mut watcher = MutationWatcher::new(500, 5_000);
        let spinner = dom.attach(dom.root(), DomNode::new("div").attr("class", "spinner-overlay"));
        watcher.node_detached(&dom, spinner, 1_000);
        let steps = watcher.take_expired(1_600);
        assert_eq!(steps.len(), 1);
        assert_eq!(steps[0].step_type, StepType::WaitForHidden);
        assert_eq!(steps[0].selector.as_deref(), Some(".spinner-overlay"));
        assert!(steps[0].label.as_deref().unwrap_or("").contains("loading"));
    }

    #[test]
    fn non_field_attach_is_ignored() {
        let (mut dom, selectors, labels) = fixtures();
        let mut watcher = MutationWatcher::new(500, 5_000);
        let div = dom.attach(dom.root(), DomNode::new("div"));
        watcher.node_attached(&dom, div, &selectors, &labels, 0);
        assert!(watcher.take_expired(10_000).is_empty());
    }

    #[test]
    fn hidden_field_attach_is_ignored() {
        let (mut dom, selectors, labels) = fixtures();
        let mut watcher = MutationWatcher::new(500, 5_000);
        let input = dom.attach(dom.root(), DomNode::new("input").hidden());
        watcher.node_attached(&dom, input, &selectors, &labels, 0);
        assert!(watcher.take_expired(10_000).is_empty());
    }
}
