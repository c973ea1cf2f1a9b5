//! Cypress (JavaScript) generator: fluent `cy.get(...)` command chains.

use crate::models::{
    Assertion, AssertionKind, CapturedAction, CapturedActionType, RecordedStep, ScrollPosition,
    StepType,
};

use super::{
    action_selector, escape_literal, is_submission_action, is_submission_step, push_line,
    step_selector, submit_control_selector, GenerateOptions, ScriptGenerator, TargetFramework,
};

const IND: &str = "  ";
const IND2: &str = "    ";

pub struct CypressGenerator;

impl ScriptGenerator for CypressGenerator {
    fn framework(&self) -> TargetFramework {
        TargetFramework::Cypress
    }

    fn generate(&self, actions: &[CapturedAction], options: &GenerateOptions) -> String {
        let mut out = String::new();
        out.push_str(&format!("describe('{}', () => {{\n", escape_literal(&options.test_name)));
        out.push_str(&format!("{}it('{}', () => {{\n", IND, escape_literal(&options.test_name)));
        if let Some(url) = &options.page_url {
            push_line(&mut out, IND2, &format!("cy.visit('{}');", escape_literal(url)));
        }
        let mut saw_fill = false;
        for action in actions {
            if is_submission_action(action.action_type) && saw_fill {
                push_line(&mut out, IND2, "// Submit");
            }
            self.emit_action(&mut out, action, options);
            if action.action_type == CapturedActionType::Fill {
                saw_fill = true;
            }
        }
        self.emit_assertions(&mut out, options);
        out.push_str(&format!("{}}});\n", IND));
        if options.include_negative_test {
            self.emit_negative_test(&mut out, actions, options);
        }
        out.push_str("});\n");
        out
    }

    fn generate_from_recording(&self, steps: &[RecordedStep], options: &GenerateOptions) -> String {
        let mut out = String::new();
        out.push_str(&format!("describe('{}', () => {{\n", escape_literal(&options.test_name)));
        out.push_str(&format!("{}it('{}', () => {{\n", IND, escape_literal(&options.test_name)));
        if let Some(url) = &options.page_url {
            push_line(&mut out, IND2, &format!("cy.visit('{}');", escape_literal(url)));
        }
        let mut saw_fill = false;
        let mut previous_ts: Option<i64> = None;
        for step in steps {
            if let Some(previous) = previous_ts {
                let gap = step.timestamp - previous;
                if gap >= options.min_wait_threshold {
                    push_line(&mut out, IND2, &format!("cy.wait({}); // User paused", gap));
                }
            }
            previous_ts = Some(step.timestamp);
            if is_submission_step(step.step_type) && saw_fill {
                push_line(&mut out, IND2, "// Submit");
            }
            self.emit_step(&mut out, step, options);
            if step.step_type == StepType::Fill {
                saw_fill = true;
            }
        }
        self.emit_assertions(&mut out, options);
        out.push_str(&format!("{}}});\n", IND));
        out.push_str("});\n");
        out
    }
}

impl CypressGenerator {
    fn emit_action(&self, out: &mut String, action: &CapturedAction, options: &GenerateOptions) {
        let selector = escape_literal(action_selector(action, options));
        let statement = match action.action_type {
            CapturedActionType::Fill => {
                if action.value.is_empty() {
                    format!("cy.get('{}').clear();", selector)
                } else {
                    format!(
                        "cy.get('{}').clear().type('{}');",
                        selector,
                        escape_literal(&action.value)
                    )
                }
            }
            CapturedActionType::Select => {
                format!("cy.get('{}').select('{}');", selector, escape_literal(&action.value))
            }
            CapturedActionType::Check => format!("cy.get('{}').check();", selector),
            CapturedActionType::Uncheck => format!("cy.get('{}').uncheck();", selector),
            CapturedActionType::Radio => {
                format!("cy.get('{}').check('{}');", selector, escape_literal(&action.value))
            }
            CapturedActionType::Click | CapturedActionType::Submit => {
                format!("cy.get('{}').click();", selector)
            }
            CapturedActionType::Clear => format!("cy.get('{}').clear();", selector),
        };
        push_line(out, IND2, &statement);
    }

    fn emit_step(&self, out: &mut String, step: &RecordedStep, options: &GenerateOptions) {
        let selector = escape_literal(step_selector(step, options).unwrap_or_default());
        match step.step_type {
            StepType::Navigate => {
                if let Some(url) = &step.url {
                    push_line(out, IND2, &format!("cy.visit('{}');", escape_literal(url)));
                }
            }
            StepType::Fill => {
                let value = step.value.as_deref().unwrap_or("");
                let statement = if value.is_empty() {
                    format!("cy.get('{}').clear();", selector)
                } else {
                    format!("cy.get('{}').clear().type('{}');", selector, escape_literal(value))
                };
                push_line(out, IND2, &statement);
            }
            StepType::Select => push_line(
                out,
                IND2,
                &format!(
                    "cy.get('{}').select('{}');",
                    selector,
                    escape_literal(step.value.as_deref().unwrap_or(""))
                ),
            ),
            StepType::Check => match &step.value {
                Some(value) => push_line(
                    out,
                    IND2,
                    &format!("cy.get('{}').check('{}');", selector, escape_literal(value)),
                ),
                None => push_line(out, IND2, &format!("cy.get('{}').check();", selector)),
            },
            StepType::Uncheck => push_line(out, IND2, &format!("cy.get('{}').uncheck();", selector)),
            StepType::Click => push_line(out, IND2, &format!("cy.get('{}').click();", selector)),
            StepType::Submit => {
                let target = if selector.is_empty() {
                    escape_literal("button[type=\"submit\"]")
                } else {
                    selector
                };
                push_line(out, IND2, &format!("cy.get('{}').click();", target));
            }
            StepType::PressKey => {
                if let Some(key) = &step.key {
                    let statement = match key.as_str() {
                        "Enter" => "cy.focused().type('{enter}');".to_string(),
                        "Escape" => "cy.focused().type('{esc}');".to_string(),
                        other => format!(
                            "cy.focused().trigger('keydown', {{ key: '{}' }});",
                            escape_literal(other)
                        ),
                    };
                    push_line(out, IND2, &statement);
                }
            }
            StepType::Hover => {
                if options.include_hover_steps {
                    push_line(out, IND2, &format!("cy.get('{}').trigger('mouseover');", selector));
                }
            }
            StepType::Clear => push_line(out, IND2, &format!("cy.get('{}').clear();", selector)),
            StepType::Scroll => {
                if options.include_scroll_steps {
                    let position = step.scroll_position.unwrap_or(ScrollPosition { x: 0, y: 0 });
                    push_line(out, IND2, &format!("cy.scrollTo({}, {});", position.x, position.y));
                }
            }
            StepType::Assert => match &step.assertion {
                Some(assertion) => self.emit_assertion(out, assertion),
                None => push_line(out, IND2, "// Assertion recorded without details"),
            },
            StepType::WaitForElement => push_line(
                out,
                IND2,
                &format!(
                    "cy.get('{}', {{ timeout: {} }}).should('be.visible');",
                    selector,
                    step.wait_timeout.unwrap_or(5_000)
                ),
            ),
            StepType::WaitForHidden => push_line(
                out,
                IND2,
                &format!(
                    "cy.get('{}', {{ timeout: {} }}).should('not.be.visible');",
                    selector,
                    step.wait_timeout.unwrap_or(5_000)
                ),
            ),
            StepType::WaitForUrl => {
                if let Some(url) = &step.url {
                    push_line(
                        out,
                        IND2,
                        &format!(
                            "cy.url({{ timeout: {} }}).should('include', '{}');",
                            step.wait_timeout.unwrap_or(5_000),
                            escape_literal(url)
                        ),
                    );
                }
            }
            StepType::WaitForNetworkIdle => {
                push_line(out, IND2, "cy.wait(500); // network idle");
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
                .map(|v| format!("cy.url().should('not.eq', '{}');", escape_literal(v))),
            AssertionKind::UrlContains | AssertionKind::Redirect => assertion
                .value
                .as_ref()
                .map(|v| format!("cy.url().should('include', '{}');", escape_literal(v))),
            AssertionKind::VisibleText => assertion
                .value
                .as_ref()
                .map(|v| format!("cy.contains('{}').should('be.visible');", escape_literal(v))),
            AssertionKind::ElementVisible
            | AssertionKind::ToastMessage
            | AssertionKind::FieldError => assertion
                .selector
                .as_ref()
                .map(|s| format!("cy.get('{}').should('be.visible');", escape_literal(s))),
            AssertionKind::ElementHidden => assertion
                .selector
                .as_ref()
                .map(|s| format!("cy.get('{}').should('not.be.visible');", escape_literal(s))),
            AssertionKind::FieldValue => match (&assertion.selector, &assertion.value) {
                (Some(s), Some(v)) => Some(format!(
                    "cy.get('{}').should('have.value', '{}');",
                    escape_literal(s),
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
        out.push_str(&format!("{}it('required field validation', () => {{\n", IND));
        if let Some(url) = &options.page_url {
            push_line(out, IND2, &format!("cy.visit('{}');", escape_literal(url)));
        }
        push_line(
            out,
            IND2,
            &format!(
                "cy.get('{}').click();",
                escape_literal(&submit_control_selector(actions, options))
            ),
        );
        for action in required {
            push_line(
                out,
                IND2,
                &format!(
                    "cy.get('{}').should('have.attr', 'required');",
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
        out.push_str(&format!("{}}});\n", IND));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

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
    fn visit_and_type_emitted() {
        let options = GenerateOptions {
            page_url: Some("https://example.com".into()),
            ..Default::default()
        };
        let script = CypressGenerator.generate(&[fill("#name", "John")], &options);
        assert!(script.contains("cy.visit('https://example.com');"));
        assert!(script.contains("cy.get('#name').clear().type('John');"));
    }

    #[test]
    fn negative_test_requires_required_flag() {
        let mut required = fill("#email", "a@b.c");
        required.required = true;
        let options = GenerateOptions { include_negative_test: true, ..Default::default() };
        let with = CypressGenerator.generate(&[required], &options);
        assert!(with.contains("it('required field validation'"));
        assert!(with.contains("cy.get('#email').should('have.attr', 'required');"));
        let without = CypressGenerator.generate(&[fill("#email", "a@b.c")], &options);
        assert!(!without.contains("required field validation"));
    }

    #[test]
    fn radio_checks_by_value() {
        let mut radio = fill("input[name=\"size\"]", "m");
        radio.action_type = CapturedActionType::Radio;
        let script = CypressGenerator.generate(&[radio], &GenerateOptions::default());
        assert!(script.contains("cy.get('input[name=\"size\"]').check('m');"));
    }
}
