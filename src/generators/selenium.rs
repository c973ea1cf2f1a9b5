//! Selenium (Python) generator: `driver.find_element` calls with explicit
//! `WebDriverWait` waits.

use crate::models::{
    Assertion, AssertionKind, CapturedAction, CapturedActionType, RecordedStep, ScrollPosition,
    StepType,
};

use super::{
    action_selector, escape_literal, is_submission_action, is_submission_step, ms_to_seconds,
    push_line, step_selector, submit_control_selector, GenerateOptions, ScriptGenerator,
    TargetFramework,
};

const IND: &str = "    ";
const IND2: &str = "        ";

const PREAMBLE: &str = "\
from selenium import webdriver
from selenium.webdriver.common.by import By
from selenium.webdriver.common.keys import Keys
from selenium.webdriver.common.action_chains import ActionChains
from selenium.webdriver.support.ui import Select, WebDriverWait
from selenium.webdriver.support import expected_conditions as EC
import time
";

pub struct SeleniumGenerator;

impl ScriptGenerator for SeleniumGenerator {
    fn framework(&self) -> TargetFramework {
        TargetFramework::Selenium
    }

    fn generate(&self, actions: &[CapturedAction], options: &GenerateOptions) -> String {
        let mut out = String::new();
        self.open_test(&mut out, &options.test_name, options);
        let mut saw_fill = false;
        for action in actions {
            if is_submission_action(action.action_type) && saw_fill {
                push_line(&mut out, IND2, "# Submit");
            }
            self.emit_action(&mut out, action, options);
            if action.action_type == CapturedActionType::Fill {
                saw_fill = true;
            }
        }
        self.emit_assertions(&mut out, options);
        self.close_test(&mut out);
        if options.include_negative_test {
            self.emit_negative_test(&mut out, actions, options);
        }
        out
    }

    fn generate_from_recording(&self, steps: &[RecordedStep], options: &GenerateOptions) -> String {
        let mut out = String::new();
        self.open_test(&mut out, &options.test_name, options);
        let mut saw_fill = false;
        let mut previous_ts: Option<i64> = None;
        for step in steps {
            if let Some(previous) = previous_ts {
                let gap = step.timestamp - previous;
                if gap >= options.min_wait_threshold {
                    push_line(
                        &mut out,
                        IND2,
                        &format!("time.sleep({})  # User paused", ms_to_seconds(gap)),
                    );
                }
            }
            previous_ts = Some(step.timestamp);
            if is_submission_step(step.step_type) && saw_fill {
                push_line(&mut out, IND2, "# Submit");
            }
            self.emit_step(&mut out, step, options);
            if step.step_type == StepType::Fill {
                saw_fill = true;
            }
        }
        self.emit_assertions(&mut out, options);
        self.close_test(&mut out);
        out
    }
}

impl SeleniumGenerator {
    fn open_test(&self, out: &mut String, test_name: &str, options: &GenerateOptions) {
        out.push_str(PREAMBLE);
        out.push('\n');
        out.push('\n');
        out.push_str(&format!("def {}():\n", python_identifier(test_name)));
        push_line(out, IND, "driver = webdriver.Chrome()");
        push_line(out, IND, "try:");
        if let Some(url) = &options.page_url {
            push_line(out, IND2, &format!("driver.get('{}')", escape_literal(url)));
        }
    }

    fn close_test(&self, out: &mut String) {
        push_line(out, IND, "finally:");
        push_line(out, IND2, "driver.quit()");
    }

    fn find(&self, selector: &str) -> String {
        format!("driver.find_element(By.CSS_SELECTOR, '{}')", escape_literal(selector))
    }

    fn emit_action(&self, out: &mut String, action: &CapturedAction, options: &GenerateOptions) {
        let selector = action_selector(action, options);
        match action.action_type {
            CapturedActionType::Fill => {
                push_line(out, IND2, &format!("field = {}", self.find(selector)));
                push_line(out, IND2, "field.clear()");
                push_line(
                    out,
                    IND2,
                    &format!("field.send_keys('{}')", escape_literal(&action.value)),
                );
            }
            CapturedActionType::Select => push_line(
                out,
                IND2,
                &format!(
                    "Select({}).select_by_value('{}')",
                    self.find(selector),
                    escape_literal(&action.value)
                ),
            ),
            CapturedActionType::Check => {
                push_line(out, IND2, &format!("box = {}", self.find(selector)));
                push_line(out, IND2, "if not box.is_selected():");
                push_line(out, &format!("{}    ", IND2), "box.click()");
            }
            CapturedActionType::Uncheck => {
                push_line(out, IND2, &format!("box = {}", self.find(selector)));
                push_line(out, IND2, "if box.is_selected():");
                push_line(out, &format!("{}    ", IND2), "box.click()");
            }
            CapturedActionType::Radio => {
                let target = format!("{}[value=\"{}\"]", selector, action.value);
                push_line(out, IND2, &format!("{}.click()", self.find(&target)));
            }
            CapturedActionType::Click | CapturedActionType::Submit => {
                push_line(out, IND2, &format!("{}.click()", self.find(selector)));
            }
            CapturedActionType::Clear => {
                push_line(out, IND2, &format!("{}.clear()", self.find(selector)));
            }
        }
    }

    fn emit_step(&self, out: &mut String, step: &RecordedStep, options: &GenerateOptions) {
        let selector = step_selector(step, options).unwrap_or_default();
        let timeout = ms_to_seconds(step.wait_timeout.unwrap_or(5_000));
        match step.step_type {
            StepType::Navigate => {
                if let Some(url) = &step.url {
                    push_line(out, IND2, &format!("driver.get('{}')", escape_literal(url)));
                }
            }
            StepType::Fill => {
                push_line(out, IND2, &format!("field = {}", self.find(selector)));
                push_line(out, IND2, "field.clear()");
                push_line(
                    out,
                    IND2,
                    &format!("field.send_keys('{}')", escape_literal(step.value.as_deref().unwrap_or(""))),
                );
            }
            StepType::Select => push_line(
                out,
                IND2,
                &format!(
                    "Select({}).select_by_value('{}')",
                    self.find(selector),
                    escape_literal(step.value.as_deref().unwrap_or(""))
                ),
            ),
            StepType::Check => {
                let target = match &step.value {
                    Some(value) => format!("{}[value=\"{}\"]", selector, value),
                    None => selector.to_string(),
                };
                push_line(out, IND2, &format!("box = {}", self.find(&target)));
                push_line(out, IND2, "if not box.is_selected():");
                push_line(out, &format!("{}    ", IND2), "box.click()");
            }
            StepType::Uncheck => {
                push_line(out, IND2, &format!("box = {}", self.find(selector)));
                push_line(out, IND2, "if box.is_selected():");
                push_line(out, &format!("{}    ", IND2), "box.click()");
            }
            StepType::Click => push_line(out, IND2, &format!("{}.click()", self.find(selector))),
            StepType::Submit => {
                let target = if selector.is_empty() { "button[type=\"submit\"]" } else { selector };
                push_line(out, IND2, &format!("{}.click()", self.find(target)));
            }
            StepType::PressKey => {
                if let Some(key) = &step.key {
                    let keys = match key.as_str() {
                        "Enter" => "Keys.ENTER".to_string(),
                        "Tab" => "Keys.TAB".to_string(),
                        "Escape" => "Keys.ESCAPE".to_string(),
                        other => format!("'{}'", escape_literal(other)),
                    };
                    push_line(
                        out,
                        IND2,
                        &format!("driver.switch_to.active_element.send_keys({})", keys),
                    );
                }
            }
            StepType::Hover => {
                if options.include_hover_steps {
                    push_line(
                        out,
                        IND2,
                        &format!(
                            "ActionChains(driver).move_to_element({}).perform()",
                            self.find(selector)
                        ),
                    );
                }
            }
            StepType::Clear => push_line(out, IND2, &format!("{}.clear()", self.find(selector))),
            StepType::Scroll => {
                if options.include_scroll_steps {
                    let position = step.scroll_position.unwrap_or(ScrollPosition { x: 0, y: 0 });
                    push_line(
                        out,
                        IND2,
                        &format!("driver.execute_script('window.scrollTo({}, {})')", position.x, position.y),
                    );
                }
            }
            StepType::Assert => match &step.assertion {
                Some(assertion) => self.emit_assertion(out, assertion),
                None => push_line(out, IND2, "# Assertion recorded without details"),
            },
            StepType::WaitForElement => push_line(
                out,
                IND2,
                &format!(
                    "WebDriverWait(driver, {}).until(EC.visibility_of_element_located((By.CSS_SELECTOR, '{}')))",
                    timeout,
                    escape_literal(selector)
                ),
            ),
            StepType::WaitForHidden => push_line(
                out,
                IND2,
                &format!(
                    "WebDriverWait(driver, {}).until(EC.invisibility_of_element_located((By.CSS_SELECTOR, '{}')))",
                    timeout,
                    escape_literal(selector)
                ),
            ),
            StepType::WaitForUrl => {
                if let Some(url) = &step.url {
                    push_line(
                        out,
                        IND2,
                        &format!(
                            "WebDriverWait(driver, {}).until(EC.url_contains('{}'))",
                            timeout,
                            escape_literal(url)
                        ),
                    );
                }
            }
            StepType::WaitForNetworkIdle => {
                push_line(out, IND2, "time.sleep(0.5)  # network idle");
            }
        }
    }

    fn emit_assertions(&self, out: &mut String, options: &GenerateOptions) {
        if !options.include_assertions || options.assertions.is_empty() {
            return;
        }
        out.push('\n');
        for assertion in &options.assertions {
            self.emit_assertion(out, assertion);
        }
    }

    fn emit_assertion(&self, out: &mut String, assertion: &Assertion) {
        let statement = match assertion.kind {
            AssertionKind::UrlChanged => assertion
                .value
                .as_ref()
                .map(|v| format!("assert driver.current_url != '{}'", escape_literal(v))),
            AssertionKind::UrlContains | AssertionKind::Redirect => assertion
                .value
                .as_ref()
                .map(|v| format!("assert '{}' in driver.current_url", escape_literal(v))),
            AssertionKind::VisibleText => assertion
                .value
                .as_ref()
                .map(|v| format!("assert '{}' in driver.page_source", escape_literal(v))),
            AssertionKind::ElementVisible
            | AssertionKind::ToastMessage
            | AssertionKind::FieldError => assertion
                .selector
                .as_ref()
                .map(|s| format!("assert {}.is_displayed()", self.find(s))),
            AssertionKind::ElementHidden => assertion
                .selector
                .as_ref()
                .map(|s| format!("assert not {}.is_displayed()", self.find(s))),
            AssertionKind::FieldValue => match (&assertion.selector, &assertion.value) {
                (Some(s), Some(v)) => Some(format!(
                    "assert {}.get_attribute('value') == '{}'",
                    self.find(s),
                    escape_literal(v)
                )),
                _ => None,
            },
        };
        match statement {
            Some(statement) => push_line(out, IND2, &statement),
            None => push_line(
                out,
                IND2,
                &format!("# Incomplete assertion: {}", assertion.kind.as_str()),
            ),
        }
    }

    fn emit_negative_test(
        &self,
        out: &mut String,
        actions: &[CapturedAction],
        options: &GenerateOptions,
    ) {
        let required: Vec<&CapturedAction> = actions.iter().filter(|a| a.required).collect();
        if required.is_empty() {
            return;
        }
        out.push('\n');
        out.push('\n');
        out.push_str("def test_required_field_validation():\n");
        push_line(out, IND, "driver = webdriver.Chrome()");
        push_line(out, IND, "try:");
        if let Some(url) = &options.page_url {
            push_line(out, IND2, &format!("driver.get('{}')", escape_literal(url)));
        }
        push_line(
            out,
            IND2,
            &format!("{}.click()", self.find(&submit_control_selector(actions, options))),
        );
        for action in required {
            push_line(
                out,
                IND2,
                &format!(
                    "assert {}.get_attribute('required') is not None",
                    self.find(action_selector(action, options))
                ),
            );
        }
        for assertion in options
            .assertions
            .iter()
            .filter(|a| a.kind == AssertionKind::FieldError)
        {
            self.emit_assertion(out, assertion);
        }
        self.close_test(out);
    }
}

/// "fill form" -> "test_fill_form".
fn python_identifier(test_name: &str) -> String {
    let mut name: String = test_name
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c.to_ascii_lowercase() } else { '_' })
        .collect();
    while name.contains("__") {
        name = name.replace("__", "_");
    }
    let trimmed = name.trim_matches('_');
    if trimmed.is_empty() {
        "test_generated".to_string()
    } else {
        format!("test_{}", trimmed)
    }
}
