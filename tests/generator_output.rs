//! Integration tests for the script generators.
//!
//! Every generator is driven against the same fixed action/step vocabulary;
//! behaviors are identical across frameworks modulo syntax.

use pagescribe::generators::{
    generator_for, GenerateOptions, ScriptGenerator, TargetFramework,
};
use pagescribe::models::{
    captured_actions_from_fields, Assertion, AssertionKind, CapturedAction, CapturedActionType,
    FormField, RecordedStep, ResolvedValue, SelectorStrategy, SmartSelector,
};

const FRAMEWORKS: [TargetFramework; 3] = [
    TargetFramework::Playwright,
    TargetFramework::Cypress,
    TargetFramework::Selenium,
];

fn action(selector: &str, value: &str, action_type: CapturedActionType) -> CapturedAction {
    CapturedAction {
        selector: selector.to_string(),
        value: value.to_string(),
        action_type,
        label: None,
        field_type: None,
        required: false,
        smart_selectors: Vec::new(),
    }
}

fn form_actions() -> Vec<CapturedAction> {
    vec![
        action("#name", "John", CapturedActionType::Fill),
        action("#color", "red", CapturedActionType::Select),
        action("#agree", "true", CapturedActionType::Check),
        action("#go", "", CapturedActionType::Submit),
    ]
}

// ============================================================================
// Shared contract across frameworks
// ============================================================================

#[test]
fn generation_is_deterministic() {
    let actions = form_actions();
    let options = GenerateOptions {
        page_url: Some("https://example.com".into()),
        ..Default::default()
    };
    for framework in FRAMEWORKS {
        let generator = generator_for(framework);
        let first = generator.generate(&actions, &options);
        let second = generator.generate(&actions, &options);
        assert_eq!(first, second, "{} output must be byte-identical", framework);
    }
}

#[test]
fn navigation_precedes_fill_in_every_framework() {
    let actions = vec![action("#name", "John", CapturedActionType::Fill)];
    let options = GenerateOptions {
        page_url: Some("https://example.com".into()),
        ..Default::default()
    };
    for framework in FRAMEWORKS {
        let script = generator_for(framework).generate(&actions, &options);
        assert!(
            script.contains("https://example.com"),
            "{} must navigate to the page url",
            framework
        );
        assert!(script.contains("#name"), "{} must target the field", framework);
        assert!(script.contains("John"), "{} must fill the value", framework);
        assert!(
            script.find("https://example.com").unwrap() < script.find("#name").unwrap(),
            "{} must navigate before filling",
            framework
        );
    }
}

#[test]
fn submit_comment_follows_fill_phase() {
    let actions = form_actions();
    for framework in FRAMEWORKS {
        let script = generator_for(framework).generate(&actions, &GenerateOptions::default());
        let marker = match framework {
            TargetFramework::Selenium => "# Submit",
            _ => "// Submit",
        };
        assert!(script.contains(marker), "{} missing submit separator", framework);
    }
}

#[test]
fn single_quotes_and_backslashes_are_escaped() {
    let actions = vec![action("#name", r"O'Brien \ sons", CapturedActionType::Fill)];
    for framework in FRAMEWORKS {
        let script = generator_for(framework).generate(&actions, &GenerateOptions::default());
        assert!(
            script.contains(r"O\'Brien \\ sons"),
            "{} must escape quote and backslash, got:\n{}",
            framework,
            script
        );
    }
}

#[test]
fn negative_test_emitted_only_with_required_fields() {
    let mut required = action("#email", "a@b.c", CapturedActionType::Fill);
    required.required = true;
    let options = GenerateOptions { include_negative_test: true, ..Default::default() };
    for framework in FRAMEWORKS {
        let generator = generator_for(framework);
        let with = generator.generate(&[required.clone()], &options);
        assert!(
            with.contains("required"),
            "{} negative test must reference the required state",
            framework
        );
        let without = generator.generate(&[action("#email", "a@b.c", CapturedActionType::Fill)], &options);
        assert!(
            !without.contains("required field validation") && !without.contains("required_field_validation"),
            "{} must omit the negative test without required fields",
            framework
        );
    }
}

#[test]
fn smart_selectors_take_priority_when_enabled() {
    let mut smart = action("#name", "John", CapturedActionType::Fill);
    smart.smart_selectors = vec![SmartSelector {
        strategy: SelectorStrategy::TestId,
        value: "[data-testid=\"name\"]".into(),
        description: "data-testid attribute".into(),
    }];
    for framework in FRAMEWORKS {
        let generator = generator_for(framework);
        let preferred = generator.generate(std::slice::from_ref(&smart), &GenerateOptions::default());
        assert!(preferred.contains("[data-testid="), "{} must prefer smart selector", framework);
        let disabled = GenerateOptions { use_smart_selectors: false, ..Default::default() };
        let raw = generator.generate(std::slice::from_ref(&smart), &disabled);
        assert!(raw.contains("#name"), "{} must fall back to raw selector", framework);
    }
}

#[test]
fn assertions_cover_all_kinds() {
    let assertions = vec![
        Assertion { kind: AssertionKind::UrlChanged, selector: None, value: Some("https://example.com".into()) },
        Assertion { kind: AssertionKind::UrlContains, selector: None, value: Some("/done".into()) },
        Assertion { kind: AssertionKind::VisibleText, selector: None, value: Some("Thanks".into()) },
        Assertion { kind: AssertionKind::ElementVisible, selector: Some("#ok".into()), value: None },
        Assertion { kind: AssertionKind::ElementHidden, selector: Some("#spinner".into()), value: None },
        Assertion { kind: AssertionKind::ToastMessage, selector: Some(".toast".into()), value: None },
        Assertion { kind: AssertionKind::FieldValue, selector: Some("#name".into()), value: Some("John".into()) },
        Assertion { kind: AssertionKind::FieldError, selector: Some(".error".into()), value: None },
        Assertion { kind: AssertionKind::Redirect, selector: None, value: Some("/welcome".into()) },
    ];
    let options = GenerateOptions {
        include_assertions: true,
        assertions,
        ..Default::default()
    };
    for framework in FRAMEWORKS {
        let script = generator_for(framework).generate(&form_actions(), &options);
        for needle in ["/done", "Thanks", "#ok", "#spinner", ".toast", ".error", "/welcome"] {
            assert!(script.contains(needle), "{} missing assertion for {}", framework, needle);
        }
    }
}

#[test]
fn incomplete_assertion_degrades_to_comment() {
    let options = GenerateOptions {
        include_assertions: true,
        assertions: vec![Assertion { kind: AssertionKind::ElementVisible, selector: None, value: None }],
        ..Default::default()
    };
    for framework in FRAMEWORKS {
        let script = generator_for(framework).generate(&form_actions(), &options);
        assert!(
            script.contains("Incomplete assertion: element-visible"),
            "{} must fall back to a comment",
            framework
        );
    }
}

// ============================================================================
// Recording mode
// ============================================================================

fn recorded_steps() -> Vec<RecordedStep> {
    vec![
        RecordedStep::navigate("https://example.com/form", 1_000),
        RecordedStep::fill("#name", "John", Some("Full name".into()), Vec::new(), 1_400),
        RecordedStep::fill("#email", "j@d.io", None, Vec::new(), 3_000),
        RecordedStep::submit(Some("#go".into()), None, None, 3_100),
    ]
}

#[test]
fn long_gaps_become_pause_statements() {
    for framework in FRAMEWORKS {
        let script = generator_for(framework)
            .generate_from_recording(&recorded_steps(), &GenerateOptions::default());
        assert!(script.contains("User paused"), "{} missing pause comment", framework);
    }
}

#[test]
fn short_gaps_emit_nothing() {
    let steps = vec![
        RecordedStep::navigate("https://example.com/form", 1_000),
        RecordedStep::fill("#name", "John", None, Vec::new(), 1_100),
    ];
    for framework in FRAMEWORKS {
        let script =
            generator_for(framework).generate_from_recording(&steps, &GenerateOptions::default());
        assert!(!script.contains("User paused"), "{} must skip short gaps", framework);
    }
}

#[test]
fn scroll_and_hover_are_gated_by_options() {
    let steps = vec![
        RecordedStep::scroll(None, 1_000),
        RecordedStep::hover("#menu", 1_050),
    ];
    for framework in FRAMEWORKS {
        let generator = generator_for(framework);
        let off = generator.generate_from_recording(&steps, &GenerateOptions::default());
        assert!(!off.contains("scrollTo"), "{} must omit scroll by default", framework);
        let on = GenerateOptions {
            include_scroll_steps: true,
            include_hover_steps: true,
            ..Default::default()
        };
        let with = generator.generate_from_recording(&steps, &on);
        // A scroll with no recorded position defaults to the origin.
        assert!(with.contains("scrollTo(0, 0)"), "{} must default scroll to (0,0)", framework);
        assert!(with.contains("#menu"), "{} must emit the hover target", framework);
    }
}

#[test]
fn wait_steps_map_to_framework_waits() {
    let steps = vec![
        RecordedStep::wait_for_element("#otp", None, 5_000, 1_000),
        RecordedStep::wait_for_hidden(".spinner", None, 5_000, 1_100),
        RecordedStep::wait_for_url("/done", 5_000, 1_200),
        RecordedStep::wait_for_network_idle(5_000, 1_300),
    ];
    let playwright = generator_for(TargetFramework::Playwright)
        .generate_from_recording(&steps, &GenerateOptions::default());
    assert!(playwright.contains("await page.waitForSelector('#otp', { timeout: 5000 });"));
    assert!(playwright.contains("state: 'hidden'"));
    assert!(playwright.contains("await page.waitForURL('/done', { timeout: 5000 });"));
    assert!(playwright.contains("waitForLoadState('networkidle'"));

    let cypress = generator_for(TargetFramework::Cypress)
        .generate_from_recording(&steps, &GenerateOptions::default());
    assert!(cypress.contains("cy.get('#otp', { timeout: 5000 }).should('be.visible');"));
    assert!(cypress.contains("should('not.be.visible')"));
    assert!(cypress.contains("cy.url({ timeout: 5000 }).should('include', '/done');"));

    let selenium = generator_for(TargetFramework::Selenium)
        .generate_from_recording(&steps, &GenerateOptions::default());
    assert!(selenium.contains("EC.visibility_of_element_located((By.CSS_SELECTOR, '#otp'))"));
    assert!(selenium.contains("EC.invisibility_of_element_located"));
    assert!(selenium.contains("EC.url_contains('/done')"));
}

// ============================================================================
// Field/value reconciliation into actions
// ============================================================================

#[test]
fn fields_and_values_zip_into_generatable_actions() {
    let fields = vec![
        FormField {
            selector: "#name".into(),
            label: Some("Full name".into()),
            field_type: Some("text".into()),
            required: true,
            smart_selectors: Vec::new(),
        },
        FormField {
            selector: "#color".into(),
            label: Some("Color".into()),
            field_type: Some("select-one".into()),
            required: false,
            smart_selectors: Vec::new(),
        },
    ];
    let values = vec![
        ResolvedValue { selector: "#name".into(), value: "John".into(), source: Some("rule".into()) },
        ResolvedValue { selector: "#color".into(), value: "red".into(), source: None },
        ResolvedValue { selector: "#missing".into(), value: "dropped".into(), source: None },
    ];
    let actions = captured_actions_from_fields(&fields, &values);
    assert_eq!(actions.len(), 2);
    assert!(actions[0].required);

    let script = generator_for(TargetFramework::Playwright)
        .generate(&actions, &GenerateOptions::default());
    assert!(script.contains("await page.fill('#name', 'John');"));
    assert!(script.contains("await page.selectOption('#color', 'red');"));
    assert!(!script.contains("dropped"));
}

// ============================================================================
// Playwright page object
// ============================================================================

#[test]
fn pom_is_playwright_only_and_opt_in() {
    let mut labeled = action("#name", "John", CapturedActionType::Fill);
    labeled.label = Some("Full Name".into());
    let actions = vec![labeled, action("#go", "", CapturedActionType::Submit)];
    let options = GenerateOptions { include_pom: true, ..Default::default() };

    let playwright = generator_for(TargetFramework::Playwright).generate(&actions, &options);
    assert!(playwright.contains("export class FormPage {"));
    assert!(playwright.contains("get fullName()"));
    assert!(playwright.contains("async fillAll()"));
    assert!(playwright.contains("async submit()"));
    assert!(playwright.contains("await this.page.click('#go');"));

    for framework in [TargetFramework::Cypress, TargetFramework::Selenium] {
        let script = generator_for(framework).generate(&actions, &options);
        assert!(!script.contains("class FormPage"), "{} must not emit a POM", framework);
    }

    let without = generator_for(TargetFramework::Playwright)
        .generate(&actions, &GenerateOptions::default());
    assert!(!without.contains("class FormPage"));
}

// ============================================================================
// Spec scenario: one fill action against a page url
// ============================================================================

#[test]
fn single_fill_scenario_matches_contract() {
    let actions = vec![action("#name", "John", CapturedActionType::Fill)];
    let options = GenerateOptions {
        page_url: Some("https://example.com".into()),
        ..Default::default()
    };
    let script = generator_for(TargetFramework::Playwright).generate(&actions, &options);
    assert!(script.contains("import { test, expect } from '@playwright/test';"));
    assert!(script.contains("test('fill form', async ({ page }) => {"));
    assert!(script.contains("await page.goto('https://example.com');"));
    assert!(script.contains("await page.fill('#name', 'John');"));
    assert!(script.trim_end().ends_with("});"));
}
