use serde::{Deserialize, Serialize};

use crate::models::Assertion;

/// Default minimum inter-step gap that becomes an explicit pause statement
/// when generating from a recording.
pub const DEFAULT_MIN_WAIT_THRESHOLD_MS: i64 = 300;

/// Options shared by both generation modes. Unknown fields in incoming JSON
/// are ignored; missing fields take the defaults below.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerateOptions {
    /// Emit a navigate-to-URL instruction at the top of the test.
    pub page_url: Option<String>,
    pub test_name: String,
    /// Prefer the highest-ranked smart selector over the raw selector.
    pub use_smart_selectors: bool,
    pub include_assertions: bool,
    pub assertions: Vec<Assertion>,
    /// Emit a second test exercising required-field validation.
    pub include_negative_test: bool,
    /// Playwright only: emit a page-object class.
    pub include_pom: bool,
    /// Recording mode only: minimum inter-step gap (ms) that becomes an
    /// explicit pause in the script.
    pub min_wait_threshold: i64,
    pub include_scroll_steps: bool,
    pub include_hover_steps: bool,
}

impl Default for GenerateOptions {
    fn default() -> Self {
        Self {
            page_url: None,
            test_name: "fill form".to_string(),
            use_smart_selectors: true,
            include_assertions: false,
            assertions: Vec::new(),
            include_negative_test: false,
            include_pom: false,
            min_wait_threshold: DEFAULT_MIN_WAIT_THRESHOLD_MS,
            include_scroll_steps: false,
            include_hover_steps: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_contract() {
        let options = GenerateOptions::default();
        assert_eq!(options.test_name, "fill form");
        assert!(options.use_smart_selectors);
        assert_eq!(options.min_wait_threshold, DEFAULT_MIN_WAIT_THRESHOLD_MS);
        assert!(!options.include_pom);
    }

    #[test]
    fn empty_json_deserializes_to_defaults() {
        let options: GenerateOptions = serde_json::from_str("{}").unwrap();
        assert_eq!(options.test_name, "fill form");
        assert!(options.use_smart_selectors);
    }
}
