use super::model::{ErrorSpec, HookSpec, Scenario, Strategy};
use crate::registry::MatchMode;
use anyhow::Result;
use std::collections::HashMap;
use std::path::PathBuf;
/// Built-in and user-saved scenarios, addressable by name.
pub struct TemplateManager {
    templates: HashMap<String, Scenario>,
    custom_templates_path: PathBuf,
}
#[derive(Debug, Clone, Default)]
pub struct ScenarioOverrides {
    pub strategy: Option<Strategy>,
    pub initial: Option<String>,
}
fn error(name: &str, message: &str) -> ErrorSpec {
    ErrorSpec {
        name: name.to_string(),
        message: message.to_string(),
        wraps: None,
    }
}
fn hook(error: &str, mode: MatchMode, fixes: bool) -> HookSpec {
    HookSpec {
        error: error.to_string(),
        mode,
        fixes,
    }
}
impl TemplateManager {
    pub fn new() -> Self {
        Self::with_path(PathBuf::from(".errfix/scenarios"))
    }
    pub fn with_path(custom_templates_path: PathBuf) -> Self {
        Self {
            templates: HashMap::new(),
            custom_templates_path,
        }
    }
    pub fn load_builtin_templates(&mut self) -> Result<()> {
        let cleared = Scenario {
            name: "cleared".to_string(),
            description: "A single fix followed by a clean retry".to_string(),
            errors: vec![error("offline", "network unreachable")],
            hooks: vec![hook("offline", MatchMode::Exact, true)],
            retry: vec![None],
            initial: "offline".to_string(),
            strategy: Strategy::Try,
        };
        let recursion = Scenario {
            name: "recursion".to_string(),
            description: "The retry keeps failing with the same error".to_string(),
            errors: vec![error("locked", "resource is locked")],
            hooks: vec![hook("locked", MatchMode::Exact, true)],
            retry: vec![Some("locked".to_string())],
            initial: "locked".to_string(),
            strategy: Strategy::Try,
        };
        let unregistered = Scenario {
            name: "unregistered".to_string(),
            description: "No fix is hooked on the failing error".to_string(),
            errors: vec![
                error("stale_cache", "cache entry is stale"),
                error("corrupt", "checksum mismatch"),
            ],
            hooks: vec![hook("stale_cache", MatchMode::Exact, true)],
            retry: vec![None],
            initial: "corrupt".to_string(),
            strategy: Strategy::Try,
        };
        let wrapped = Scenario {
            name: "wrapped".to_string(),
            description: "An any-mode fix catches an error by its cause".to_string(),
            errors: vec![
                error("not_mounted", "volume is not mounted"),
                ErrorSpec {
                    wraps: Some("not_mounted".to_string()),
                    ..error("read_failed", "cannot read backup index")
                },
            ],
            hooks: vec![hook("not_mounted", MatchMode::Any, true)],
            retry: vec![None],
            initial: "read_failed".to_string(),
            strategy: Strategy::Try,
        };
        let chain = Scenario {
            name: "chain".to_string(),
            description: "Fixing one error uncovers another".to_string(),
            errors: vec![
                error("expired_token", "token has expired"),
                error("rate_limited", "too many requests"),
            ],
            hooks: vec![
                hook("expired_token", MatchMode::Exact, true),
                hook("rate_limited", MatchMode::Exact, true),
            ],
            retry: vec![Some("rate_limited".to_string()), None],
            initial: "expired_token".to_string(),
            strategy: Strategy::Try,
        };
        for template in [cleared, recursion, unregistered, wrapped, chain] {
            self.templates.insert(template.name.clone(), template);
        }
        Ok(())
    }
    pub fn get_template(&self, name: &str) -> Option<&Scenario> {
        self.templates.get(name)
    }
    /// Templates sorted by name.
    pub fn list_templates(&self) -> Vec<&Scenario> {
        let mut templates: Vec<&Scenario> = self.templates.values().collect();
        templates.sort_by(|a, b| a.name.cmp(&b.name));
        templates
    }
    pub fn create_from_template(
        &self,
        template_name: &str,
        overrides: &ScenarioOverrides,
    ) -> Result<Scenario> {
        let template = self
            .get_template(template_name)
            .ok_or_else(|| anyhow::anyhow!("Template '{}' not found", template_name))?;
        let mut scenario = template.clone();
        if let Some(strategy) = overrides.strategy {
            scenario.strategy = strategy;
        }
        if let Some(initial) = &overrides.initial {
            scenario.initial = initial.clone();
        }
        Ok(scenario)
    }
    pub fn save_custom_template(&self, scenario: &Scenario) -> Result<PathBuf> {
        let path = self.custom_templates_path.join(format!("{}.json", scenario.name));
        scenario.save(&path)?;
        Ok(path)
    }
    pub fn load_custom_templates(&mut self) -> Result<()> {
        use std::fs;
        if !self.custom_templates_path.exists() {
            return Ok(());
        }
        for entry in fs::read_dir(&self.custom_templates_path)? {
            let entry = entry?;
            let path = entry.path();
            if path.extension().and_then(|s| s.to_str()) == Some("json") {
                let scenario = Scenario::load(&path)?;
                self.templates.insert(scenario.name.clone(), scenario);
            }
        }
        Ok(())
    }
}
impl Default for TemplateManager {
    fn default() -> Self {
        Self::new()
    }
}
#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolver::Outcome;
    use crate::scenario::ScenarioValidator;
    use tempfile::tempdir;
    fn builtin() -> TemplateManager {
        let mut manager = TemplateManager::new();
        manager.load_builtin_templates().unwrap();
        manager
    }
    #[test]
    fn test_builtin_templates_are_valid() {
        let manager = builtin();
        let names: Vec<&str> = manager
            .list_templates()
            .iter()
            .map(|t| t.name.as_str())
            .collect();
        assert_eq!(names, vec!["chain", "cleared", "recursion", "unregistered", "wrapped"]);
        let validator = ScenarioValidator::new();
        for template in manager.list_templates() {
            assert!(validator.validate(template).is_valid, "{}", template.name);
        }
    }
    #[test]
    fn test_builtin_outcomes() {
        let manager = builtin();
        let run = |name: &str| manager.get_template(name).unwrap().run().unwrap();
        assert_eq!(run("cleared").resolution.outcome, Outcome::Cleared);
        let recursion = run("recursion");
        assert_eq!(recursion.resolution.outcome, Outcome::Recurred);
        assert_eq!(recursion.final_error.as_deref(), Some("locked"));
        let unregistered = run("unregistered");
        assert_eq!(unregistered.final_error.as_deref(), Some("corrupt"));
        assert_eq!(unregistered.resolution.retries, 0);
        assert_eq!(run("wrapped").final_error, None);
        assert_eq!(run("chain").resolution.passes, 2);
    }
    #[test]
    fn test_overrides_switch_strategy() {
        let manager = builtin();
        let overrides = ScenarioOverrides {
            strategy: Some(Strategy::TryOnce),
            initial: None,
        };
        let scenario = manager.create_from_template("chain", &overrides).unwrap();
        let report = scenario.run().unwrap();
        assert_eq!(report.resolution.outcome, Outcome::Replaced);
        assert_eq!(report.final_error.as_deref(), Some("rate_limited"));
        assert!(manager.create_from_template("missing", &overrides).is_err());
    }
    #[test]
    fn test_custom_templates_round_trip_on_disk() {
        let dir = tempdir().unwrap();
        let manager = builtin();
        let mut custom = manager.get_template("cleared").unwrap().clone();
        custom.name = "mine".to_string();
        let saved = TemplateManager::with_path(dir.path().to_path_buf())
            .save_custom_template(&custom)
            .unwrap();
        assert!(saved.ends_with("mine.json"));
        let mut reloaded = TemplateManager::with_path(dir.path().to_path_buf());
        reloaded.load_custom_templates().unwrap();
        assert!(reloaded.get_template("mine").is_some());
        assert!(reloaded.get_template("cleared").is_none());
    }
    #[test]
    fn test_overrides_change_initial_error() {
        let manager = builtin();
        let overrides = ScenarioOverrides {
            strategy: None,
            initial: Some("not_mounted".to_string()),
        };
        let scenario = manager.create_from_template("wrapped", &overrides).unwrap();
        assert_eq!(scenario.initial, "not_mounted");
        let report = scenario.run().unwrap();
        assert!(report.resolution.is_cleared());
        assert_eq!(report.resolution.passes, 1);
        assert_eq!(report.hook_calls, vec![1]);
        let ghost = ScenarioOverrides {
            strategy: None,
            initial: Some("ghost".to_string()),
        };
        let invalid = manager.create_from_template("wrapped", &ghost).unwrap();
        assert!(invalid.run().is_err());
    }
}
