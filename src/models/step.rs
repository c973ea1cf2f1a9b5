use serde::{Deserialize, Serialize};

/// Ranking strategy of a smart-selector alternate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectorStrategy {
    TestId,
    Id,
    AriaLabel,
    Name,
    Css,
}

/// A ranked alternate locator for the same element. Generators prefer the
/// first entry over the raw selector when smart selectors are enabled.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SmartSelector {
    pub strategy: SelectorStrategy,
    pub value: String,
    pub description: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScrollPosition {
    pub x: i32,
    pub y: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AssertionKind {
    UrlChanged,
    UrlContains,
    VisibleText,
    ElementVisible,
    ElementHidden,
    ToastMessage,
    FieldValue,
    FieldError,
    Redirect,
}

impl AssertionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::UrlChanged => "url-changed",
            Self::UrlContains => "url-contains",
            Self::VisibleText => "visible-text",
            Self::ElementVisible => "element-visible",
            Self::ElementHidden => "element-hidden",
            Self::ToastMessage => "toast-message",
            Self::FieldValue => "field-value",
            Self::FieldError => "field-error",
            Self::Redirect => "redirect",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Assertion {
    pub kind: AssertionKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selector: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StepType {
    Navigate,
    Fill,
    Select,
    Check,
    Uncheck,
    Click,
    Submit,
    PressKey,
    Hover,
    Clear,
    Scroll,
    Assert,
    WaitForElement,
    WaitForHidden,
    WaitForUrl,
    WaitForNetworkIdle,
}

/// One recorded or synthesized unit of page interaction or wait condition.
///
/// Only `type` and `timestamp` are always present; the optional fields are
/// populated consistently with the variant by the constructors below.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordedStep {
    #[serde(rename = "type")]
    pub step_type: StepType,
    /// Wall-clock milliseconds at detection time.
    pub timestamp: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selector: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wait_timeout: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scroll_position: Option<ScrollPosition>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assertion: Option<Assertion>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub smart_selectors: Vec<SmartSelector>,
}

impl RecordedStep {
    fn base(step_type: StepType, timestamp: i64) -> Self {
        Self {
            step_type,
            timestamp,
            selector: None,
            value: None,
            label: None,
            url: None,
            key: None,
            wait_timeout: None,
            scroll_position: None,
            assertion: None,
            smart_selectors: Vec::new(),
        }
    }

    pub fn navigate(url: &str, timestamp: i64) -> Self {
        let mut step = Self::base(StepType::Navigate, timestamp);
        step.url = Some(url.to_string());
        step
    }

    pub fn fill(
        selector: &str,
        value: &str,
        label: Option<String>,
        smart_selectors: Vec<SmartSelector>,
        timestamp: i64,
    ) -> Self {
        let mut step = Self::base(StepType::Fill, timestamp);
        step.selector = Some(selector.to_string());
        step.value = Some(value.to_string());
        step.label = label;
        step.smart_selectors = smart_selectors;
        step
    }

    pub fn select(
        selector: &str,
        value: &str,
        label: Option<String>,
        smart_selectors: Vec<SmartSelector>,
        timestamp: i64,
    ) -> Self {
        let mut step = Self::base(StepType::Select, timestamp);
        step.selector = Some(selector.to_string());
        step.value = Some(value.to_string());
        step.label = label;
        step.smart_selectors = smart_selectors;
        step
    }

    /// Checkbox tick, or radio pick when `value` carries the radio's value.
    pub fn check(selector: &str, value: Option<String>, label: Option<String>, timestamp: i64) -> Self {
        let mut step = Self::base(StepType::Check, timestamp);
        step.selector = Some(selector.to_string());
        step.value = value;
        step.label = label;
        step
    }

    pub fn uncheck(selector: &str, label: Option<String>, timestamp: i64) -> Self {
        let mut step = Self::base(StepType::Uncheck, timestamp);
        step.selector = Some(selector.to_string());
        step.label = label;
        step
    }

    pub fn click(
        selector: &str,
        label: Option<String>,
        smart_selectors: Vec<SmartSelector>,
        timestamp: i64,
    ) -> Self {
        let mut step = Self::base(StepType::Click, timestamp);
        step.selector = Some(selector.to_string());
        step.label = label;
        step.smart_selectors = smart_selectors;
        step
    }

    pub fn submit(
        selector: Option<String>,
        url: Option<String>,
        label: Option<String>,
        timestamp: i64,
    ) -> Self {
        let mut step = Self::base(StepType::Submit, timestamp);
        step.selector = selector;
        step.url = url;
        step.label = label;
        step
    }

    pub fn press_key(key: &str, timestamp: i64) -> Self {
        let mut step = Self::base(StepType::PressKey, timestamp);
        step.key = Some(key.to_string());
        step
    }

    pub fn hover(selector: &str, timestamp: i64) -> Self {
        let mut step = Self::base(StepType::Hover, timestamp);
        step.selector = Some(selector.to_string());
        step
    }

    pub fn clear(selector: &str, timestamp: i64) -> Self {
        let mut step = Self::base(StepType::Clear, timestamp);
        step.selector = Some(selector.to_string());
        step
    }

    pub fn scroll(position: Option<ScrollPosition>, timestamp: i64) -> Self {
        let mut step = Self::base(StepType::Scroll, timestamp);
        step.scroll_position = position;
        step
    }

    pub fn assert(assertion: Option<Assertion>, timestamp: i64) -> Self {
        let mut step = Self::base(StepType::Assert, timestamp);
        step.assertion = assertion;
        step
    }

    pub fn wait_for_element(
        selector: &str,
        label: Option<String>,
        wait_timeout: i64,
        timestamp: i64,
    ) -> Self {
        let mut step = Self::base(StepType::WaitForElement, timestamp);
        step.selector = Some(selector.to_string());
        step.label = label;
        step.wait_timeout = Some(wait_timeout);
        step
    }

    pub fn wait_for_hidden(
        selector: &str,
        label: Option<String>,
        wait_timeout: i64,
        timestamp: i64,
    ) -> Self {
        let mut step = Self::base(StepType::WaitForHidden, timestamp);
        step.selector = Some(selector.to_string());
        step.label = label;
        step.wait_timeout = Some(wait_timeout);
        step
    }

    pub fn wait_for_url(url: &str, wait_timeout: i64, timestamp: i64) -> Self {
        let mut step = Self::base(StepType::WaitForUrl, timestamp);
        step.url = Some(url.to_string());
        step.wait_timeout = Some(wait_timeout);
        step
    }

    pub fn wait_for_network_idle(wait_timeout: i64, timestamp: i64) -> Self {
        let mut step = Self::base(StepType::WaitForNetworkIdle, timestamp);
        step.wait_timeout = Some(wait_timeout);
        step
    }

    /// User-originated interaction, as opposed to a synthesized wait.
    pub fn is_user_action(&self) -> bool {
        !matches!(
            self.step_type,
            StepType::WaitForElement
                | StepType::WaitForHidden
                | StepType::WaitForUrl
                | StepType::WaitForNetworkIdle
                | StepType::Assert
        )
    }
}
