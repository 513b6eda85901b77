use super::model::Scenario;
use std::collections::{HashMap, HashSet};
#[derive(Debug, Clone)]
pub struct ValidationResult {
    pub is_valid: bool,
    pub errors: Vec<ValidationError>,
    pub warnings: Vec<ValidationWarning>,
}
#[derive(Debug, Clone)]
pub struct ValidationError {
    pub field: String,
    pub message: String,
    pub suggestion: Option<String>,
}
#[derive(Debug, Clone)]
pub struct ValidationWarning {
    pub field: String,
    pub message: String,
    pub suggestion: Option<String>,
}
pub struct ScenarioValidator;
impl ScenarioValidator {
    pub fn new() -> Self {
        Self
    }
    pub fn validate(&self, scenario: &Scenario) -> ValidationResult {
        let mut errors = Vec::new();
        let mut warnings = Vec::new();
        let names = self.validate_errors(scenario, &mut errors);
        self.validate_hooks(scenario, &names, &mut errors, &mut warnings);
        self.validate_retry(scenario, &names, &mut errors);
        self.validate_usage(scenario, &mut warnings);
        ValidationResult {
            is_valid: errors.is_empty(),
            errors,
            warnings,
        }
    }
    fn validate_errors(
        &self,
        scenario: &Scenario,
        errors: &mut Vec<ValidationError>,
    ) -> HashSet<String> {
        let mut names = HashSet::new();
        for (index, spec) in scenario.errors.iter().enumerate() {
            if spec.name.trim().is_empty() {
                errors
                    .push(ValidationError {
                        field: format!("errors[{}].name", index),
                        message: "Error name cannot be empty".to_string(),
                        suggestion: Some("Give every error a unique name".to_string()),
                    });
            } else if !names.insert(spec.name.clone()) {
                errors
                    .push(ValidationError {
                        field: format!("errors[{}].name", index),
                        message: format!("Duplicate error name: {}", spec.name),
                        suggestion: Some(
                            "Each name identifies exactly one error value".to_string(),
                        ),
                    });
            }
        }
        let wraps: HashMap<&str, &str> = scenario
            .errors
            .iter()
            .filter_map(|spec| spec.wraps.as_deref().map(|w| (spec.name.as_str(), w)))
            .collect();
        for (index, spec) in scenario.errors.iter().enumerate() {
            let Some(cause) = spec.wraps.as_deref() else {
                continue;
            };
            if !names.contains(cause) {
                errors
                    .push(ValidationError {
                        field: format!("errors[{}].wraps", index),
                        message: format!("Unknown wrapped error: {}", cause),
                        suggestion: Some(format!("Declare '{}' in errors", cause)),
                    });
                continue;
            }
            let mut chain = vec![cause];
            let mut current = cause;
            while let Some(next) = wraps.get(current) {
                if *next == spec.name {
                    errors
                        .push(ValidationError {
                            field: format!("errors[{}].wraps", index),
                            message: format!("Error '{}' wraps itself", spec.name),
                            suggestion: Some("Break the cause cycle".to_string()),
                        });
                    break;
                }
                if let Some(start) = chain.iter().position(|seen| seen == next) {
                    errors
                        .push(ValidationError {
                            field: format!("errors[{}].wraps", index),
                            message: format!(
                                "Error '{}' reaches a wrap cycle: {}", spec.name, chain[start..]
                                .join(" -> ")
                            ),
                            suggestion: Some("Break the cause cycle".to_string()),
                        });
                    break;
                }
                chain.push(*next);
                current = *next;
            }
        }
        if !names.contains(&scenario.initial) {
            errors
                .push(ValidationError {
                    field: "initial".to_string(),
                    message: format!("Unknown initial error: {}", scenario.initial),
                    suggestion: Some("Set initial to a declared error name".to_string()),
                });
        }
        names
    }
    fn validate_hooks(
        &self,
        scenario: &Scenario,
        names: &HashSet<String>,
        errors: &mut Vec<ValidationError>,
        warnings: &mut Vec<ValidationWarning>,
    ) {
        if scenario.hooks.is_empty() {
            warnings
                .push(ValidationWarning {
                    field: "hooks".to_string(),
                    message: "No hooks registered; nothing can be fixed".to_string(),
                    suggestion: None,
                });
        }
        for (index, hook) in scenario.hooks.iter().enumerate() {
            if !names.contains(&hook.error) {
                errors
                    .push(ValidationError {
                        field: format!("hooks[{}].error", index),
                        message: format!("Hook on unknown error: {}", hook.error),
                        suggestion: Some(format!("Declare '{}' in errors", hook.error)),
                    });
            }
            if !hook.fixes {
                warnings
                    .push(ValidationWarning {
                        field: format!("hooks[{}].fixes", index),
                        message: "Hook never reports a fix, so it never triggers a retry"
                            .to_string(),
                        suggestion: Some("Set fixes to true to exercise the retry".to_string()),
                    });
            }
        }
    }
    fn validate_retry(
        &self,
        scenario: &Scenario,
        names: &HashSet<String>,
        errors: &mut Vec<ValidationError>,
    ) {
        if scenario.retry.is_empty() {
            errors
                .push(ValidationError {
                    field: "retry".to_string(),
                    message: "Retry script cannot be empty".to_string(),
                    suggestion: Some("Use [null] for a retry that always succeeds".to_string()),
                });
        }
        for (index, step) in scenario.retry.iter().enumerate() {
            if let Some(name) = step {
                if !names.contains(name) {
                    errors
                        .push(ValidationError {
                            field: format!("retry[{}]", index),
                            message: format!("Retry returns unknown error: {}", name),
                            suggestion: Some(format!("Declare '{}' in errors", name)),
                        });
                }
            }
        }
    }
    fn validate_usage(&self, scenario: &Scenario, warnings: &mut Vec<ValidationWarning>) {
        let mut used: HashSet<&str> = HashSet::new();
        used.insert(scenario.initial.as_str());
        used.extend(scenario.hooks.iter().map(|hook| hook.error.as_str()));
        used.extend(scenario.retry.iter().filter_map(|step| step.as_deref()));
        used.extend(scenario.errors.iter().filter_map(|spec| spec.wraps.as_deref()));
        for (index, spec) in scenario.errors.iter().enumerate() {
            if !used.contains(spec.name.as_str()) {
                warnings
                    .push(ValidationWarning {
                        field: format!("errors[{}]", index),
                        message: format!("Error '{}' is never used", spec.name),
                        suggestion: Some("Remove it or reference it from a hook".to_string()),
                    });
            }
        }
    }
}
impl Default for ScenarioValidator {
    fn default() -> Self {
        Self::new()
    }
}
#[cfg(test)]
mod tests {
    use super::*;
    fn scenario(json: &str) -> Scenario {
        serde_json::from_str(json).unwrap()
    }
    #[test]
    fn test_valid_scenario() {
        let s = scenario(
            r#"{"name":"ok","errors":[{"name":"a"}],"hooks":[{"error":"a","fixes":true}],
                "retry":[null],"initial":"a"}"#,
        );
        let result = ScenarioValidator::new().validate(&s);
        assert!(result.is_valid);
        assert!(result.warnings.is_empty());
    }
    #[test]
    fn test_scenario_validation() {
        let s = scenario(
            r#"{"name":"bad","errors":[{"name":"a"},{"name":"a"},{"name":"b","wraps":"ghost"}],
                "hooks":[{"error":"nope","fixes":false}],"retry":[],"initial":"missing"}"#,
        );
        let result = ScenarioValidator::new().validate(&s);
        assert!(!result.is_valid);
        let fields: Vec<&str> = result.errors.iter().map(|e| e.field.as_str()).collect();
        assert!(fields.contains(&"errors[1].name"));
        assert!(fields.contains(&"errors[2].wraps"));
        assert!(fields.contains(&"initial"));
        assert!(fields.contains(&"hooks[0].error"));
        assert!(fields.contains(&"retry"));
        assert!(result.warnings.iter().any(|w| w.field == "hooks[0].fixes"));
    }
    #[test]
    fn test_wrap_cycle_detected() {
        let s = scenario(
            r#"{"name":"loop","errors":[{"name":"a","wraps":"b"},{"name":"b","wraps":"a"}],
                "retry":[null],"initial":"a"}"#,
        );
        let result = ScenarioValidator::new().validate(&s);
        assert!(!result.is_valid);
        assert!(result.errors.iter().all(|e| e.message.contains("wraps itself")));
        assert!(s.build_errors().is_err());
    }
    #[test]
    fn test_unused_error_warns() {
        let s = scenario(
            r#"{"name":"w","errors":[{"name":"a"},{"name":"spare"}],
                "hooks":[{"error":"a","fixes":true}],"retry":[null],"initial":"a"}"#,
        );
        let result = ScenarioValidator::new().validate(&s);
        assert!(result.is_valid);
        assert_eq!(result.warnings.len(), 1);
        assert_eq!(result.warnings[0].field, "errors[1]");
    }
    #[test]
    fn test_cycle_reached_from_outside_names_members() {
        let s = scenario(
            r#"{"name":"tail","errors":[{"name":"top","wraps":"a"},
                {"name":"a","wraps":"b"},{"name":"b","wraps":"a"}],
                "retry":[null],"initial":"top"}"#,
        );
        let result = ScenarioValidator::new().validate(&s);
        assert!(!result.is_valid);
        let top = result.errors.iter().find(|e| e.field == "errors[0].wraps").unwrap();
        assert_eq!(top.message, "Error 'top' reaches a wrap cycle: a -> b");
        assert!(result.errors.iter().filter(|e| e.message.contains("wraps itself")).count() == 2);
    }
}
