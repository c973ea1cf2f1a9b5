//! Playwright (TypeScript) generator: `page.*` interaction calls plus
//! `expect` assertions. The only target that can also emit a page-object
//! class.

use crate::models::{
    Assertion, AssertionKind, CapturedAction, CapturedActionType, RecordedStep, ScrollPosition,
    StepType,
};

use super::{
    action_selector, escape_literal, is_submission_action, is_submission_step,
    pom_entries_from_actions, pom_entries_from_steps, push_line, step_selector,
    submit_control_selector, GenerateOptions, PomEntry, ScriptGenerator, TargetFramework,
};

const IND: &str = "  ";

pub struct PlaywrightGenerator;

impl ScriptGenerator for PlaywrightGenerator {
    fn framework(&self) -> TargetFramework {
        TargetFramework::Playwright
    }

    fn generate(&self, actions: &[CapturedAction], options: &GenerateOptions) -> String {
        let mut out = String::new();
        out.push_str("import { test, expect } from '@playwright/test';\n\n");
        out.push_str(&format!(
            "test('{}', async ({{ page }}) => {{\n",
            escape_literal(&options.test_name)
        ));
        if let Some(url) = &options.page_url {
            push_line(&mut out, IND, &format!("await page.goto('{}');", escape_literal(url)));
        }
        let mut saw_fill = false;
        for action in actions {
            if is_submission_action(action.action_type) && saw_fill {
                push_line(&mut out, IND, "// Submit");
            }
            self.emit_action(&mut out, action, options);
            if action.action_type == CapturedActionType::Fill {
                saw_fill = true;
            }
        }
        self.emit_assertions(&mut out, options);
        out.push_str("});\n");
        if options.include_negative_test {
            self.emit_negative_test(&mut out, actions, options);
        }
        if options.include_pom {
            let entries = pom_entries_from_actions(actions, options);
            self.emit_pom(&mut out, &entries, &submit_control_selector(actions, options));
        }
        out
    }

    fn generate_from_recording(&self, steps: &[RecordedStep], options: &GenerateOptions) -> String {
        let mut out = String::new();
        out.push_str("import { test, expect } from '@playwright/test';\n\n");
        out.push_str(&format!(
            "test('{}', async ({{ page }}) => {{\n",
            escape_literal(&options.test_name)
        ));
        if let Some(url) = &options.page_url {
            push_line(&mut out, IND, &format!("await page.goto('{}');", escape_literal(url)));
        }
        let mut saw_fill = false;
        let mut previous_ts: Option<i64> = None;
        for step in steps {
            if let Some(previous) = previous_ts {
                let gap = step.timestamp - previous;
                if gap >= options.min_wait_threshold {
                    push_line(
                        &mut out,
                        IND,
                        &format!("await page.waitForTimeout({}); // User paused", gap),
                    );
                }
            }
            previous_ts = Some(step.timestamp);
            if is_submission_step(step.step_type) && saw_fill {
                push_line(&mut out, IND, "// Submit");
            }
            self.emit_step(&mut out, step, options);
            if step.step_type == StepType::Fill {
                saw_fill = true;
            }
        }
        self.emit_assertions(&mut out, options);
        out.push_str("});\n");
        if options.include_pom {
            let entries = pom_entries_from_steps(steps, options);
            self.emit_pom(&mut out, &entries, "button[type=\"submit\"]");
        }
        out
    }
}

impl PlaywrightGenerator {
    fn emit_action(&self, out: &mut String, action: &CapturedAction, options: &GenerateOptions) {
        let selector = action_selector(action, options);
        let statement = match action.action_type {
            CapturedActionType::Fill => format!(
                "await page.fill('{}', '{}');",
                escape_literal(selector),
                escape_literal(&action.value)
            ),
            CapturedActionType::Select => format!(
                "await page.selectOption('{}', '{}');",
                escape_literal(selector),
                escape_literal(&action.value)
            ),
            CapturedActionType::Check => format!("await page.check('{}');", escape_literal(selector)),
            CapturedActionType::Uncheck => {
                format!("await page.uncheck('{}');", escape_literal(selector))
            }
            CapturedActionType::Radio => format!(
                "await page.check('{}');",
                escape_literal(&format!("{}[value=\"{}\"]", selector, action.value))
            ),
            CapturedActionType::Click | CapturedActionType::Submit => {
                format!("await page.click('{}');", escape_literal(selector))
            }
            CapturedActionType::Clear => {
                format!("await page.fill('{}', '');", escape_literal(selector))
            }
        };
        push_line(out, IND, &statement);
    }

    fn emit_step(&self, out: &mut String, step: &RecordedStep, options: &GenerateOptions) {
        let selector = step_selector(step, options).unwrap_or_default();
        match step.step_type {
            StepType::Navigate => {
                if let Some(url) = &step.url {
                    push_line(out, IND, &format!("await page.goto('{}');", escape_literal(url)));
                }
            }
            StepType::Fill => push_line(
                out,
                IND,
                &format!(
                    "await page.fill('{}', '{}');",
                    escape_literal(selector),
                    escape_literal(step.value.as_deref().unwrap_or(""))
                ),
            ),
            StepType::Select => push_line(
                out,
                IND,
                &format!(
                    "await page.selectOption('{}', '{}');",
                    escape_literal(selector),
                    escape_literal(step.value.as_deref().unwrap_or(""))
                ),
            ),
            StepType::Check => {
                let target = match &step.value {
                    Some(value) => format!("{}[value=\"{}\"]", selector, value),
                    None => selector.to_string(),
                };
                push_line(out, IND, &format!("await page.check('{}');", escape_literal(&target)));
            }
            StepType::Uncheck => {
                push_line(out, IND, &format!("await page.uncheck('{}');", escape_literal(selector)))
            }
            StepType::Click => {
                push_line(out, IND, &format!("await page.click('{}');", escape_literal(selector)))
            }
            StepType::Submit => {
                let target = if selector.is_empty() { "button[type=\"submit\"]" } else { selector };
                push_line(out, IND, &format!("await page.click('{}');", escape_literal(target)));
            }
            StepType::PressKey => {
                if let Some(key) = &step.key {
                    push_line(
                        out,
                        IND,
                        &format!("await page.keyboard.press('{}');", escape_literal(key)),
                    );
                }
            }
            StepType::Hover => {
                if options.include_hover_steps {
                    push_line(out, IND, &format!("await page.hover('{}');", escape_literal(selector)));
                }
            }
            StepType::Clear => {
                push_line(out, IND, &format!("await page.fill('{}', '');", escape_literal(selector)))
            }
            StepType::Scroll => {
                if options.include_scroll_steps {
                    let position = step.scroll_position.unwrap_or(ScrollPosition { x: 0, y: 0 });
                    push_line(
                        out,
                        IND,
                        &format!(
                            "await page.evaluate(() => window.scrollTo({}, {}));",
                            position.x, position.y
                        ),
                    );
                }
            }
            StepType::Assert => match &step.assertion {
                Some(assertion) => self.emit_assertion(out, assertion),
                None => push_line(out, IND, "// Assertion recorded without details"),
            },
            StepType::WaitForElement => push_line(
                out,
                IND,
                &format!(
                    "await page.waitForSelector('{}', {{ timeout: {} }});",
                    escape_literal(selector),
                    step.wait_timeout.unwrap_or(5_000)
                ),
            ),
            StepType::WaitForHidden => push_line(
                out,
                IND,
                &format!(
                    "await page.waitForSelector('{}', {{ state: 'hidden', timeout: {} }});",
                    escape_literal(selector),
                    step.wait_timeout.unwrap_or(5_000)
                ),
            ),
            StepType::WaitForUrl => {
                if let Some(url) = &step.url {
                    push_line(
                        out,
                        IND,
                        &format!(
                            "await page.waitForURL('{}', {{ timeout: {} }});",
                            escape_literal(url),
                            step.wait_timeout.unwrap_or(5_000)
                        ),
                    );
                }
            }
            StepType::WaitForNetworkIdle => push_line(
                out,
                IND,
                &format!(
                    "await page.waitForLoadState('networkidle', {{ timeout: {} }});",
                    step.wait_timeout.unwrap_or(5_000)
                ),
            ),
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
                .map(|v| format!("await expect(page).not.toHaveURL('{}');", escape_literal(v))),
            AssertionKind::UrlContains | AssertionKind::Redirect => assertion
                .value
                .as_ref()
                .map(|v| format!("expect(page.url()).toContain('{}');", escape_literal(v))),
            AssertionKind::VisibleText => assertion.value.as_ref().map(|v| {
                format!("await expect(page.getByText('{}')).toBeVisible();", escape_literal(v))
            }),
            AssertionKind::ElementVisible
            | AssertionKind::ToastMessage
            | AssertionKind::FieldError => assertion.selector.as_ref().map(|s| {
                format!("await expect(page.locator('{}')).toBeVisible();", escape_literal(s))
            }),
            AssertionKind::ElementHidden => assertion.selector.as_ref().map(|s| {
                format!("await expect(page.locator('{}')).toBeHidden();", escape_literal(s))
            }),
            AssertionKind::FieldValue => match (&assertion.selector, &assertion.value) {
                (Some(s), Some(v)) => Some(format!(
                    "await expect(page.locator('{}')).toHaveValue('{}');",
                    escape_literal(s),
                    escape_literal(v)
                )),
                _ => None,
            },
        };
        match statement {
            Some(statement) => push_line(out, IND, &statement),
            None => push_line(
                out,
                IND,
                &format!("// Incomplete assertion: {}", assertion.kind.as_str()),
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
        out.push_str("test('required field validation', async ({ page }) => {\n");
        if let Some(url) = &options.page_url {
            push_line(out, IND, &format!("await page.goto('{}');", escape_literal(url)));
        }
        push_line(
            out,
            IND,
            &format!(
                "await page.click('{}');",
                escape_literal(&submit_control_selector(actions, options))
            ),
        );
        for action in required {
            push_line(
                out,
                IND,
                &format!(
                    "await expect(page.locator('{}')).toHaveJSProperty('required', true);",
                    escape_literal(action_selector(action, options))
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
        out.push_str("});\n");
    }

    fn emit_pom(&self, out: &mut String, entries: &[PomEntry], submit_selector: &str) {
        out.push('\n');
        out.push_str("export class FormPage {\n");
        push_line(out, IND, "constructor(page) {");
        push_line(out, &format!("{}{}", IND, IND), "this.page = page;");
        push_line(out, IND, "}");
        for entry in entries {
            out.push('\n');
            push_line(
                out,
                IND,
                &format!(
                    "get {}() {{ return this.page.locator('{}'); }}",
                    entry.name,
                    escape_literal(&entry.selector)
                ),
            );
        }
        out.push('\n');
        push_line(out, IND, "async fillAll() {");
        for entry in entries {
            let inner = format!("{}{}", IND, IND);
            match entry.action_type {
                CapturedActionType::Fill => push_line(
                    out,
                    &inner,
                    &format!(
                        "await this.page.fill('{}', '{}');",
                        escape_literal(&entry.selector),
                        escape_literal(&entry.value)
                    ),
                ),
                CapturedActionType::Select => push_line(
                    out,
                    &inner,
                    &format!(
                        "await this.page.selectOption('{}', '{}');",
                        escape_literal(&entry.selector),
                        escape_literal(&entry.value)
                    ),
                ),
                CapturedActionType::Check => push_line(
                    out,
                    &inner,
                    &format!("await this.page.check('{}');", escape_literal(&entry.selector)),
                ),
                CapturedActionType::Uncheck => push_line(
                    out,
                    &inner,
                    &format!("await this.page.uncheck('{}');", escape_literal(&entry.selector)),
                ),
                CapturedActionType::Radio => push_line(
                    out,
                    &inner,
                    &format!(
                        "await this.page.check('{}');",
                        escape_literal(&format!("{}[value=\"{}\"]", entry.selector, entry.value))
                    ),
                ),
                CapturedActionType::Clear => push_line(
                    out,
                    &inner,
                    &format!("await this.page.fill('{}', '');", escape_literal(&entry.selector)),
                ),
                CapturedActionType::Click | CapturedActionType::Submit => {}
            }
        }
        push_line(out, IND, "}");
        out.push('\n');
        push_line(out, IND, "async submit() {");
        push_line(
            out,
            &format!("{}{}", IND, IND),
            &format!("await this.page.click('{}');", escape_literal(submit_selector)),
        );
        push_line(out, IND, "}");
        out.push_str("}\n");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{SelectorStrategy, SmartSelector};

    fn fill(selector: &str, value: &str) -> CapturedAction {
        CapturedAction {
            selector: selector.to_string(),
            value: value.to_string(),
            action_type: CapturedActionType::Fill,
            label: None,
            field_type: None,
            required: false,
            smart_selectors: Vec::new(),
        }
    }

    #[test]
    fn navigation_precedes_fill() {
        let options = GenerateOptions {
            page_url: Some("https://example.com".into()),
            ..Default::default()
        };
        let script = PlaywrightGenerator.generate(&[fill("#name", "John")], &options);
        let goto = script.find("await page.goto('https://example.com');").unwrap();
        let fill = script.find("await page.fill('#name', 'John');").unwrap();
        assert!(goto < fill);
    }

    #[test]
    fn quotes_are_escaped() {
        let script =
            PlaywrightGenerator.generate(&[fill("#name", "O'Brien")], &GenerateOptions::default());
        assert!(script.contains(r"await page.fill('#name', 'O\'Brien');"));
    }

    #[test]
    fn smart_selector_used_when_available() {
        let mut action = fill("#name", "John");
        action.smart_selectors = vec![SmartSelector {
            strategy: SelectorStrategy::TestId,
            value: "[data-testid=\"name\"]".into(),
            description: "data-testid attribute".into(),
        }];
        let script = PlaywrightGenerator.generate(&[action], &GenerateOptions::default());
        assert!(script.contains("await page.fill('[data-testid=\"name\"]', 'John');"));
    }

    #[test]
    fn submit_comment_separates_phases() {
        let mut submit = fill("#go", "");
        submit.action_type = CapturedActionType::Submit;
        let script = PlaywrightGenerator
            .generate(&[fill("#name", "John"), submit], &GenerateOptions::default());
        assert!(script.contains("  // Submit\n  await page.click('#go');"));
    }

    #[test]
    fn pom_class_emitted_when_requested() {
        let mut action = fill("#name", "John");
        action.label = Some("Full Name".into());
        let options = GenerateOptions { include_pom: true, ..Default::default() };
        let script = PlaywrightGenerator.generate(&[action], &options);
        assert!(script.contains("export class FormPage {"));
        assert!(script.contains("get fullName() { return this.page.locator('#name'); }"));
        assert!(script.contains("async fillAll() {"));
        assert!(script.contains("async submit() {"));
    }
}
