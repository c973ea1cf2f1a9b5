use serde::{Deserialize, Serialize};

use super::step::SmartSelector;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CapturedActionType {
    Fill,
    Select,
    Check,
    Uncheck,
    Radio,
    Click,
    Submit,
    Clear,
}

/// A pre-resolved (selector, value, action) triple used when generating a
/// script directly from detected fields, bypassing live recording.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CapturedAction {
    pub selector: String,
    pub value: String,
    pub action_type: CapturedActionType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field_type: Option<String>,
    #[serde(default)]
    pub required: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub smart_selectors: Vec<SmartSelector>,
}

/// A detected form field, as handed over by the field-detection collaborator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormField {
    pub selector: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field_type: Option<String>,
    #[serde(default)]
    pub required: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub smart_selectors: Vec<SmartSelector>,
}

/// A fill value produced by the value-resolution collaborator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedValue {
    pub selector: String,
    pub value: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
}

/// Zip resolved values with their fields, 1:1 by selector. The two lists are
/// gathered independently; values without a matching field are dropped.
pub fn captured_actions_from_fields(
    fields: &[FormField],
    values: &[ResolvedValue],
) -> Vec<CapturedAction> {
    values
        .iter()
        .filter_map(|value| {
            let Some(field) = fields.iter().find(|f| f.selector == value.selector) else {
                tracing::debug!(selector = %value.selector, "no field for resolved value, dropping");
                return None;
            };
            Some(CapturedAction {
                selector: field.selector.clone(),
                value: value.value.clone(),
                action_type: action_type_for(field, &value.value),
                label: field.label.clone(),
                field_type: field.field_type.clone(),
                required: field.required,
                smart_selectors: field.smart_selectors.clone(),
            })
        })
        .collect()
}

fn action_type_for(field: &FormField, value: &str) -> CapturedActionType {
    match field.field_type.as_deref() {
        Some("checkbox") => {
            if value.eq_ignore_ascii_case("false") || value.is_empty() {
                CapturedActionType::Uncheck
            } else {
                CapturedActionType::Check
            }
        }
        Some("radio") => CapturedActionType::Radio,
        Some("select") | Some("select-one") | Some("select-multiple") => CapturedActionType::Select,
        _ => CapturedActionType::Fill,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn field(selector: &str, field_type: Option<&str>) -> FormField {
        FormField {
            selector: selector.to_string(),
            label: None,
            field_type: field_type.map(|t| t.to_string()),
            required: false,
            smart_selectors: Vec::new(),
        }
    }

    fn value(selector: &str, value: &str) -> ResolvedValue {
        ResolvedValue {
            selector: selector.to_string(),
            value: value.to_string(),
            source: None,
        }
    }

    #[test]
    fn values_without_field_are_dropped() {
        let fields = vec![field("#name", None)];
        let values = vec![value("#name", "John"), value("#ghost", "nope")];
        let actions = captured_actions_from_fields(&fields, &values);
        assert_eq!(actions.len(), 1);
        assert_eq!(actions[0].selector, "#name");
        assert_eq!(actions[0].action_type, CapturedActionType::Fill);
    }

    #[test]
    fn field_type_drives_action_type() {
        let fields = vec![
            field("#agree", Some("checkbox")),
            field("#news", Some("checkbox")),
            field("#size", Some("radio")),
            field("#color", Some("select-one")),
        ];
        let values = vec![
            value("#agree", "true"),
            value("#news", "false"),
            value("#size", "m"),
            value("#color", "red"),
        ];
        let actions = captured_actions_from_fields(&fields, &values);
        let types: Vec<CapturedActionType> = actions.iter().map(|a| a.action_type).collect();
        assert_eq!(
            types,
            vec![
                CapturedActionType::Check,
                CapturedActionType::Uncheck,
                CapturedActionType::Radio,
                CapturedActionType::Select,
            ]
        );
    }
}
