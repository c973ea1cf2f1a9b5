//! Step-to-script code generation.
//!
//! One generator per target framework, each a pure mapping from the shared
//! step/action vocabulary to that framework's statement forms. Identical
//! inputs always produce byte-identical output.

pub mod cypress;
pub mod options;
pub mod playwright;
pub mod selenium;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::RecorderError;
use crate::models::{CapturedAction, CapturedActionType, RecordedStep, SmartSelector, StepType};

pub use cypress::CypressGenerator;
pub use options::{GenerateOptions, DEFAULT_MIN_WAIT_THRESHOLD_MS};
pub use playwright::PlaywrightGenerator;
pub use selenium::SeleniumGenerator;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TargetFramework {
    Playwright,
    Cypress,
    Selenium,
}

impl FromStr for TargetFramework {
    type Err = RecorderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "playwright" => Ok(Self::Playwright),
            "cypress" => Ok(Self::Cypress),
            "selenium" | "selenium-python" => Ok(Self::Selenium),
            other => Err(RecorderError::UnknownFramework(other.to_string())),
        }
    }
}

impl fmt::Display for TargetFramework {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Playwright => write!(f, "playwright"),
            Self::Cypress => write!(f, "cypress"),
            Self::Selenium => write!(f, "selenium"),
        }
    }
}

pub trait ScriptGenerator {
    fn framework(&self) -> TargetFramework;

    /// Build a complete test source from pre-resolved actions.
    fn generate(&self, actions: &[CapturedAction], options: &GenerateOptions) -> String;

    /// Build a complete test source from a recorded step log.
    fn generate_from_recording(&self, steps: &[RecordedStep], options: &GenerateOptions) -> String;
}

pub fn generator_for(framework: TargetFramework) -> Box<dyn ScriptGenerator + Send + Sync> {
    match framework {
        TargetFramework::Playwright => Box::new(PlaywrightGenerator),
        TargetFramework::Cypress => Box::new(CypressGenerator),
        TargetFramework::Selenium => Box::new(SeleniumGenerator),
    }
}

// ----------------------------------------------------------------------
// Shared plumbing
// ----------------------------------------------------------------------

/// Escape a string for embedding inside a single-quoted source literal.
pub(crate) fn escape_literal(s: &str) -> String {
    s.replace('\\', "\\\\").replace('\'', "\\'")
}

/// The locator a statement should use: the highest-ranked smart selector when
/// enabled and available, otherwise the raw selector.
pub(crate) fn effective_selector<'a>(
    selector: &'a str,
    smart_selectors: &'a [SmartSelector],
    options: &GenerateOptions,
) -> &'a str {
    if options.use_smart_selectors {
        if let Some(first) = smart_selectors.iter().find(|s| !s.value.is_empty()) {
            return &first.value;
        }
    }
    selector
}

pub(crate) fn action_selector<'a>(action: &'a CapturedAction, options: &GenerateOptions) -> &'a str {
    effective_selector(&action.selector, &action.smart_selectors, options)
}

pub(crate) fn step_selector<'a>(step: &'a RecordedStep, options: &GenerateOptions) -> Option<&'a str> {
    step.selector
        .as_deref()
        .map(|selector| effective_selector(selector, &step.smart_selectors, options))
}

pub(crate) fn is_submission_action(action_type: CapturedActionType) -> bool {
    matches!(action_type, CapturedActionType::Click | CapturedActionType::Submit)
}

pub(crate) fn is_submission_step(step_type: StepType) -> bool {
    matches!(step_type, StepType::Click | StepType::Submit)
}

/// The selector of the control used to submit: the first submit action, then
/// the first click, then a generic submit-button locator.
pub(crate) fn submit_control_selector(
    actions: &[CapturedAction],
    options: &GenerateOptions,
) -> String {
    actions
        .iter()
        .find(|a| a.action_type == CapturedActionType::Submit)
        .or_else(|| actions.iter().find(|a| a.action_type == CapturedActionType::Click))
        .map(|a| action_selector(a, options).to_string())
        .unwrap_or_else(|| "button[type=\"submit\"]".to_string())
}

pub(crate) fn push_line(out: &mut String, indent: &str, text: &str) {
    out.push_str(indent);
    out.push_str(text);
    out.push('\n');
}

/// Seconds rendering for Python-style timeouts: 5000 -> "5", 500 -> "0.5".
pub(crate) fn ms_to_seconds(ms: i64) -> String {
    let seconds = ms as f64 / 1000.0;
    if (seconds - seconds.trunc()).abs() < f64::EPSILON {
        format!("{}", seconds as i64)
    } else {
        format!("{}", seconds)
    }
}

/// A named page-object entry derived from a labeled action.
pub(crate) struct PomEntry {
    pub name: String,
    pub selector: String,
    pub value: String,
    pub action_type: CapturedActionType,
}

pub(crate) fn pom_entries_from_actions(
    actions: &[CapturedAction],
    options: &GenerateOptions,
) -> Vec<PomEntry> {
    let mut used: Vec<String> = Vec::new();
    actions
        .iter()
        .filter_map(|action| {
            let label = action.label.as_deref()?;
            Some(PomEntry {
                name: unique_identifier(label, &mut used),
                selector: action_selector(action, options).to_string(),
                value: action.value.clone(),
                action_type: action.action_type,
            })
        })
        .collect()
}

pub(crate) fn pom_entries_from_steps(
    steps: &[RecordedStep],
    options: &GenerateOptions,
) -> Vec<PomEntry> {
    let mut used: Vec<String> = Vec::new();
    steps
        .iter()
        .filter_map(|step| {
            let label = step.label.as_deref()?;
            let selector = step_selector(step, options)?;
            let action_type = match step.step_type {
                StepType::Fill => CapturedActionType::Fill,
                StepType::Select => CapturedActionType::Select,
                StepType::Check => CapturedActionType::Check,
                StepType::Uncheck => CapturedActionType::Uncheck,
                _ => return None,
            };
            Some(PomEntry {
                name: unique_identifier(label, &mut used),
                selector: selector.to_string(),
                value: step.value.clone().unwrap_or_default(),
                action_type,
            })
        })
        .collect()
}

/// Turn a human label into a camelCase identifier, unique within `used`.
fn unique_identifier(label: &str, used: &mut Vec<String>) -> String {
    let mut name = String::new();
    for (i, word) in label
        .split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|w| !w.is_empty())
        .enumerate()
    {
        let lower = word.to_lowercase();
        if i == 0 {
            name.push_str(&lower);
        } else {
            let mut chars = lower.chars();
            if let Some(first) = chars.next() {
                name.push(first.to_ascii_uppercase());
                name.push_str(chars.as_str());
            }
        }
    }
    if name.is_empty() {
        name = "field".to_string();
    }
    if name.starts_with(|c: char| c.is_ascii_digit()) {
        name.insert(0, '_');
    }
    let mut candidate = name.clone();
    let mut counter = 2;
    while used.contains(&candidate) {
        candidate = format!("{}{}", name, counter);
        counter += 1;
    }
    used.push(candidate.clone());
    candidate
}
