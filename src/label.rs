//! Human-readable labels for form elements.
//!
//! An ordered chain of strategies, each one a small `find` over the DOM
//! mirror; resolution is the first non-empty result. The chain is stateless
//! and reusable outside a recording session.

use regex::Regex;

use crate::dom::{NodeId, PageDom};

/// Siblings of these tags qualify for the preceding-short-text strategy.
const LABEL_LIKE_TAGS: [&str; 5] = ["span", "div", "p", "strong", "em"];
const MAX_SIBLING_TEXT_LEN: usize = 80;

pub trait LabelStrategy {
    fn name(&self) -> &'static str;
    fn find(&self, dom: &PageDom, target: NodeId) -> Option<String>;
}

/// A label text together with the strategy that produced it.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedLabel {
    pub text: String,
    pub strategy: &'static str,
}

fn clean(text: String) -> Option<String> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

fn attr_label(dom: &PageDom, target: NodeId, attr: &str) -> Option<String> {
    dom.node(target)
        .and_then(|n| n.get_attr(attr))
        .and_then(|v| clean(v.to_string()))
}

/// 1. `<label for="...">` matching the element's id.
struct ExplicitFor;

impl LabelStrategy for ExplicitFor {
    fn name(&self) -> &'static str {
        "label-for"
    }

    fn find(&self, dom: &PageDom, target: NodeId) -> Option<String> {
        let dom_id = dom.node(target)?.dom_id()?.to_string();
        let label = dom.find(|n| n.tag == "label" && n.get_attr("for") == Some(dom_id.as_str()))?;
        clean(dom.text_content(label))
    }
}

/// 2. Element wrapped inside a `<label>`.
struct WrappingLabel;

impl LabelStrategy for WrappingLabel {
    fn name(&self) -> &'static str {
        "wrapping-label"
    }

    fn find(&self, dom: &PageDom, target: NodeId) -> Option<String> {
        let label = dom
            .ancestors(target)
            .into_iter()
            .find(|&a| dom.node(a).map(|n| n.tag == "label").unwrap_or(false))?;
        clean(dom.text_content(label))
    }
}

/// 3. `aria-label`.
struct AriaLabel;

impl LabelStrategy for AriaLabel {
    fn name(&self) -> &'static str {
        "aria-label"
    }

    fn find(&self, dom: &PageDom, target: NodeId) -> Option<String> {
        attr_label(dom, target, "aria-label")
    }
}

/// 4. `aria-labelledby`, resolving each referenced element's text.
struct AriaLabelledBy;

impl LabelStrategy for AriaLabelledBy {
    fn name(&self) -> &'static str {
        "aria-labelledby"
    }

    fn find(&self, dom: &PageDom, target: NodeId) -> Option<String> {
        let refs = dom.node(target)?.get_attr("aria-labelledby")?.to_string();
        let texts: Vec<String> = refs
            .split_whitespace()
            .filter_map(|id| dom.element_by_dom_id(id))
            .map(|node| dom.text_content(node))
            .filter(|t| !t.trim().is_empty())
            .collect();
        clean(texts.join(" "))
    }
}

/// 5. Immediately preceding `<label>` sibling.
struct PrecedingLabel;

impl LabelStrategy for PrecedingLabel {
    fn name(&self) -> &'static str {
        "preceding-label"
    }

    fn find(&self, dom: &PageDom, target: NodeId) -> Option<String> {
        let previous = dom.preceding_siblings(target).into_iter().next()?;
        if dom.node(previous)?.tag != "label" {
            return None;
        }
        clean(dom.text_content(previous))
    }
}

/// 6. `title` attribute.
struct TitleAttribute;

impl LabelStrategy for TitleAttribute {
    fn name(&self) -> &'static str {
        "title"
    }

    fn find(&self, dom: &PageDom, target: NodeId) -> Option<String> {
        attr_label(dom, target, "title")
    }
}

/// 7. Nearest ancestor `<fieldset>`'s `<legend>`.
struct FieldsetLegend;

impl LabelStrategy for FieldsetLegend {
    fn name(&self) -> &'static str {
        "fieldset-legend"
    }

    fn find(&self, dom: &PageDom, target: NodeId) -> Option<String> {
        let fieldset = dom
            .ancestors(target)
            .into_iter()
            .find(|&a| dom.node(a).map(|n| n.tag == "fieldset").unwrap_or(false))?;
        let legend = dom
            .children(fieldset)
            .iter()
            .copied()
            .find(|&c| dom.node(c).map(|n| n.tag == "legend").unwrap_or(false))?;
        clean(dom.text_content(legend))
    }
}

/// 8. Nearest ancestor matching a form-group container class; its first
/// label-like child provides the text.
struct FormGroup {
    pattern: Regex,
}

impl FormGroup {
    fn new() -> Self {
        Self {
            pattern: Regex::new(r"(?i)form[-_]?(group|item|row|field)|input[-_]?group|field[-_]?wrapper")
                .expect("valid form-group pattern"),
        }
    }
}

impl LabelStrategy for FormGroup {
    fn name(&self) -> &'static str {
        "form-group"
    }

    fn find(&self, dom: &PageDom, target: NodeId) -> Option<String> {
        let group = dom.ancestors(target).into_iter().find(|&a| {
            dom.node(a)
                .map(|n| n.classes().iter().any(|c| self.pattern.is_match(c)))
                .unwrap_or(false)
        })?;
        let candidate = dom.descendants(group).into_iter().find(|&d| {
            d != target
                && dom
                    .node(d)
                    .map(|n| n.tag == "label" || n.classes().iter().any(|c| c.contains("label")))
                    .unwrap_or(false)
        })?;
        clean(dom.text_content(candidate))
    }
}

/// 9. Nearest preceding sibling with a short, label-like text, walking
/// backward past siblings that do not qualify.
struct PrecedingShortText;

impl LabelStrategy for PrecedingShortText {
    fn name(&self) -> &'static str {
        "preceding-text"
    }

    fn find(&self, dom: &PageDom, target: NodeId) -> Option<String> {
        for sibling in dom.preceding_siblings(target) {
            let Some(node) = dom.node(sibling) else { continue };
            if !LABEL_LIKE_TAGS.contains(&node.tag.as_str()) {
                continue;
            }
            let text = dom.text_content(sibling);
            let trimmed = text.trim();
            if !trimmed.is_empty() && trimmed.chars().count() < MAX_SIBLING_TEXT_LEN {
                return Some(trimmed.to_string());
            }
        }
        None
    }
}

/// 10. `placeholder` attribute.
struct Placeholder;

impl LabelStrategy for Placeholder {
    fn name(&self) -> &'static str {
        "placeholder"
    }

    fn find(&self, dom: &PageDom, target: NodeId) -> Option<String> {
        attr_label(dom, target, "placeholder")
    }
}

pub struct LabelResolver {
    strategies: Vec<Box<dyn LabelStrategy + Send + Sync>>,
}

impl LabelResolver {
    /// The canonical chain, most specific strategy first.
    pub fn new() -> Self {
        Self {
            strategies: vec![
                Box::new(ExplicitFor),
                Box::new(WrappingLabel),
                Box::new(AriaLabel),
                Box::new(AriaLabelledBy),
                Box::new(PrecedingLabel),
                Box::new(TitleAttribute),
                Box::new(FieldsetLegend),
                Box::new(FormGroup::new()),
                Box::new(PrecedingShortText),
                Box::new(Placeholder),
            ],
        }
    }

    pub fn resolve(&self, dom: &PageDom, target: NodeId) -> Option<String> {
        self.resolve_detailed(dom, target).map(|r| r.text)
    }

    /// First non-empty strategy result along with the strategy's name.
    pub fn resolve_detailed(&self, dom: &PageDom, target: NodeId) -> Option<ResolvedLabel> {
        for strategy in &self.strategies {
            if let Some(text) = strategy.find(dom, target) {
                return Some(ResolvedLabel { text, strategy: strategy.name() });
            }
        }
        None
    }
}

impl Default for LabelResolver {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::DomNode;

    fn resolve(dom: &PageDom, target: NodeId) -> Option<ResolvedLabel> {
        LabelResolver::new().resolve_detailed(dom, target)
    }

    #[test]
    fn explicit_for_wins_over_placeholder() {
        let mut dom = PageDom::new("https://example.com");
        let form = dom.attach(dom.root(), DomNode::new("form"));
        dom.attach(form, DomNode::new("label").attr("for", "email").text("Email address"));
        let input = dom.attach(
            form,
            DomNode::new("input").attr("id", "email").attr("placeholder", "you@example.com"),
        );
        let label = resolve(&dom, input).unwrap();
        assert_eq!(label.text, "Email address");
        assert_eq!(label.strategy, "label-for");
    }

    #[test]
    fn wrapping_label_resolves() {
        let mut dom = PageDom::new("https://example.com");
        let label = dom.attach(dom.root(), DomNode::new("label").text("Remember me"));
        let input = dom.attach(label, DomNode::new("input").attr("type", "checkbox"));
        assert_eq!(resolve(&dom, input).unwrap().text, "Remember me");
    }

    #[test]
    fn aria_labelledby_joins_references() {
        let mut dom = PageDom::new("https://example.com");
        dom.attach(dom.root(), DomNode::new("span").attr("id", "a").text("Billing"));
        dom.attach(dom.root(), DomNode::new("span").attr("id", "b").text("address"));
        let input = dom.attach(dom.root(), DomNode::new("input").attr("aria-labelledby", "a b"));
        assert_eq!(resolve(&dom, input).unwrap().text, "Billing address");
    }

    #[test]
    fn whitespace_only_text_is_absent() {
        let mut dom = PageDom::new("https://example.com");
        let form = dom.attach(dom.root(), DomNode::new("form"));
        dom.attach(form, DomNode::new("label").attr("for", "x").text("   "));
        let input = dom.attach(form, DomNode::new("input").attr("id", "x").attr("title", "City"));
        let label = resolve(&dom, input).unwrap();
        assert_eq!(label.strategy, "title");
        assert_eq!(label.text, "City");
    }

    #[test]
    fn fieldset_legend_resolves() {
        let mut dom = PageDom::new("https://example.com");
        let fieldset = dom.attach(dom.root(), DomNode::new("fieldset"));
        dom.attach(fieldset, DomNode::new("legend").text("Shipping"));
        let input = dom.attach(fieldset, DomNode::new("input").attr("type", "radio"));
        assert_eq!(resolve(&dom, input).unwrap().text, "Shipping");
    }

    #[test]
    fn form_group_label_child_resolves() {
        let mut dom = PageDom::new("https://example.com");
        let group = dom.attach(dom.root(), DomNode::new("div").attr("class", "form-group"));
        dom.attach(group, DomNode::new("span").attr("class", "field-label").text("Phone"));
        let wrapper = dom.attach(group, DomNode::new("div"));
        let input = dom.attach(wrapper, DomNode::new("input"));
        let label = resolve(&dom, input).unwrap();
        assert_eq!(label.text, "Phone");
        assert_eq!(label.strategy, "form-group");
    }

    #[test]
    fn preceding_short_text_skips_long_siblings() {
        let mut dom = PageDom::new("https://example.com");
        let form = dom.attach(dom.root(), DomNode::new("form"));
        dom.attach(form, DomNode::new("span").text("Age"));
        let long = "x".repeat(120);
        dom.attach(form, DomNode::new("div").text(&long));
        let input = dom.attach(form, DomNode::new("input"));
        let label = resolve(&dom, input).unwrap();
        assert_eq!(label.text, "Age");
        assert_eq!(label.strategy, "preceding-text");
    }

    #[test]
    fn placeholder_is_last_resort() {
        let mut dom = PageDom::new("https://example.com");
        let input = dom.attach(dom.root(), DomNode::new("input").attr("placeholder", "Search"));
        let label = resolve(&dom, input).unwrap();
        assert_eq!(label.text, "Search");
        assert_eq!(label.strategy, "placeholder");
    }

    #[test]
    fn no_strategy_matches_is_none() {
        let mut dom = PageDom::new("https://example.com");
        let input = dom.attach(dom.root(), DomNode::new("input"));
        assert_eq!(resolve(&dom, input), None);
    }
}
