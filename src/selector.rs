//! Locator resolution.
//!
//! `resolve` produces the single selector stored on a step; `smart_selectors`
//! produces the ranked alternates generators may prefer. Preference order is
//! stability first: test id, then id, then name, then structure.

use crate::dom::{NodeId, PageDom};
use crate::models::{SelectorStrategy, SmartSelector};

const TEST_ATTRIBUTES: [&str; 3] = ["data-testid", "data-test", "data-cy"];

#[derive(Debug, Default)]
pub struct SelectorResolver;

impl SelectorResolver {
    pub fn new() -> Self {
        Self
    }

    /// Always returns a usable selector string.
    pub fn resolve(&self, dom: &PageDom, id: NodeId) -> String {
        let Some(node) = dom.node(id) else {
            tracing::debug!(node = id, "selector requested for unknown node");
            return "*".to_string();
        };
        if let Some(dom_id) = node.dom_id() {
            return format!("#{}", dom_id);
        }
        for attr in TEST_ATTRIBUTES {
            if let Some(value) = node.get_attr(attr).filter(|v| !v.is_empty()) {
                return format!("[{}=\"{}\"]", attr, value);
            }
        }
        if let Some(name) = node.name_attr() {
            return format!("{}[name=\"{}\"]", node.tag, name);
        }
        self.structural(dom, id)
    }

    /// Last-resort structural selector: tag plus up to two classes, with an
    /// `:nth-of-type` disambiguator when same-tag siblings exist.
    fn structural(&self, dom: &PageDom, id: NodeId) -> String {
        let Some(node) = dom.node(id) else {
            return "*".to_string();
        };
        let mut selector = node.tag.clone();
        let classes: Vec<&str> = node
            .classes()
            .into_iter()
            .filter(|c| !c.contains(':'))
            .take(2)
            .collect();
        if !classes.is_empty() {
            selector.push('.');
            selector.push_str(&classes.join("."));
        }
        let (position, count) = dom.nth_of_type(id);
        if count > 1 {
            selector.push_str(&format!(":nth-of-type({})", position));
        }
        selector
    }

    /// Ranked alternates for the same element, most specific first.
    pub fn smart_selectors(&self, dom: &PageDom, id: NodeId) -> Vec<SmartSelector> {
        let Some(node) = dom.node(id) else {
            return Vec::new();
        };
        let mut out = Vec::new();
        for attr in TEST_ATTRIBUTES {
            if let Some(value) = node.get_attr(attr).filter(|v| !v.is_empty()) {
                out.push(SmartSelector {
                    strategy: SelectorStrategy::TestId,
                    value: format!("[{}=\"{}\"]", attr, value),
                    description: format!("{} attribute", attr),
                });
                break;
            }
        }
        if let Some(dom_id) = node.dom_id() {
            out.push(SmartSelector {
                strategy: SelectorStrategy::Id,
                value: format!("#{}", dom_id),
                description: format!("element id {}", dom_id),
            });
        }
        if let Some(aria) = node.get_attr("aria-label").filter(|v| !v.is_empty()) {
            out.push(SmartSelector {
                strategy: SelectorStrategy::AriaLabel,
                value: format!("[aria-label=\"{}\"]", aria),
                description: format!("aria-label {}", aria),
            });
        }
        if let Some(name) = node.name_attr() {
            out.push(SmartSelector {
                strategy: SelectorStrategy::Name,
                value: format!("{}[name=\"{}\"]", node.tag, name),
                description: format!("name attribute {}", name),
            });
        }
        out.push(SmartSelector {
            strategy: SelectorStrategy::Css,
            value: self.structural(dom, id),
            description: "structural css path".to_string(),
        });
        out
    }
}
