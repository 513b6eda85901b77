use crate::errors::{ErrorIdentity, FixError, SharedError};
use crate::registry::{MatchMode, Registry};
use crate::resolver::Resolution;
use anyhow::{bail, Context, Result};
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
/// A scripted resolution run, loaded from JSON.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Scenario {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub errors: Vec<ErrorSpec>,
    #[serde(default)]
    pub hooks: Vec<HookSpec>,
    /// Outcomes returned by successive retries; `null` means success. The last
    /// entry repeats once the script runs out.
    pub retry: Vec<Option<String>>,
    pub initial: String,
    #[serde(default)]
    pub strategy: Strategy,
}
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorSpec {
    pub name: String,
    #[serde(default)]
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wraps: Option<String>,
}
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HookSpec {
    pub error: String,
    #[serde(default = "default_mode")]
    pub mode: MatchMode,
    pub fixes: bool,
}
fn default_mode() -> MatchMode {
    MatchMode::Exact
}
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    #[default]
    Try,
    TryOnce,
}
#[derive(Debug, Clone, Serialize)]
pub struct ScenarioReport {
    pub scenario: String,
    pub strategy: Strategy,
    pub initial: String,
    pub final_error: Option<String>,
    pub resolution: Resolution,
    /// Invocation count per hook, in declaration order.
    pub hook_calls: Vec<u32>,
}
impl Scenario {
    pub fn load(path: &Path) -> Result<Self> {
        let data = fs::read_to_string(path)
            .with_context(|| format!("cannot read scenario file {:?}", path))?;
        let scenario: Scenario = serde_json::from_str(&data)
            .with_context(|| format!("cannot parse scenario file {:?}", path))?;
        Ok(scenario)
    }
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("cannot create directory {:?}", parent))?;
        }
        let data = serde_json::to_string_pretty(self)?;
        fs::write(path, data).with_context(|| format!("cannot write {:?}", path))?;
        Ok(())
    }
    /// Creates one shared error per declared name, causes first.
    pub fn build_errors(&self) -> Result<HashMap<String, SharedError>> {
        let specs: HashMap<&str, &ErrorSpec> = self
            .errors
            .iter()
            .map(|spec| (spec.name.as_str(), spec))
            .collect();
        let mut built = HashMap::new();
        for spec in &self.errors {
            let mut visiting = Vec::new();
            build_one(&spec.name, &specs, &mut built, &mut visiting)?;
        }
        Ok(built)
    }
    /// Validates, then runs the scenario against a fresh registry.
    pub fn run(&self) -> Result<ScenarioReport> {
        let validation = super::ScenarioValidator::new().validate(self);
        if !validation.is_valid {
            let first = validation
                .errors
                .first()
                .map(|e| format!("{}: {}", e.field, e.message))
                .unwrap_or_default();
            bail!(
                "scenario '{}' is invalid ({} error(s)); first: {}", self.name,
                validation.errors.len(), first
            );
        }
        let errors = self.build_errors()?;
        let lookup = |name: &str| -> Result<SharedError> {
            errors
                .get(name)
                .cloned()
                .ok_or_else(|| anyhow::anyhow!("unknown error '{}'", name))
        };
        let registry: Registry<SharedError> = Registry::new();
        let calls: Arc<Vec<AtomicU32>> = Arc::new(
            self.hooks.iter().map(|_| AtomicU32::new(0)).collect(),
        );
        for (index, hook) in self.hooks.iter().enumerate() {
            let key = lookup(&hook.error)?;
            let counter = Arc::clone(&calls);
            let fixes = hook.fixes;
            registry
                .register(
                    key,
                    move |_| {
                        counter[index].fetch_add(1, Ordering::SeqCst);
                        fixes
                    },
                    hook.mode,
                );
        }
        let script = self
            .retry
            .iter()
            .map(|step| step.as_deref().map(&lookup).transpose())
            .collect::<Result<Vec<Option<SharedError>>>>()?;
        let mut step = 0;
        let retry = |_: &SharedError| {
            let outcome = script.get(step).or_else(|| script.last()).cloned().flatten();
            step += 1;
            outcome
        };
        let mut slot = Some(lookup(&self.initial)?);
        info!("running scenario '{}' ({:?})", self.name, self.strategy);
        let resolution = match self.strategy {
            Strategy::Try => registry.try_fix(&mut slot, retry),
            Strategy::TryOnce => registry.try_fix_once(&mut slot, retry),
        };
        let final_error = slot
            .as_ref()
            .map(|current| name_of(&errors, current))
            .transpose()?;
        debug!("scenario '{}' finished: {:?}", self.name, resolution.outcome);
        Ok(ScenarioReport {
            scenario: self.name.clone(),
            strategy: self.strategy,
            initial: self.initial.clone(),
            final_error,
            resolution,
            hook_calls: calls.iter().map(|c| c.load(Ordering::SeqCst)).collect(),
        })
    }
}
fn build_one(
    name: &str,
    specs: &HashMap<&str, &ErrorSpec>,
    built: &mut HashMap<String, SharedError>,
    visiting: &mut Vec<String>,
) -> Result<SharedError> {
    if let Some(existing) = built.get(name) {
        return Ok(existing.clone());
    }
    if visiting.iter().any(|seen| seen == name) {
        bail!("error '{}' wraps itself through {:?}", name, visiting);
    }
    let spec = specs
        .get(name)
        .ok_or_else(|| anyhow::anyhow!("unknown error '{}'", name))?;
    visiting.push(name.to_string());
    let mut error = FixError::new(&spec.name, &spec.message);
    if let Some(cause) = &spec.wraps {
        error = error.with_cause(build_one(cause, specs, built, visiting)?);
    }
    visiting.pop();
    let shared = error.shared();
    built.insert(name.to_string(), shared.clone());
    Ok(shared)
}
fn name_of(errors: &HashMap<String, SharedError>, current: &SharedError) -> Result<String> {
    errors
        .iter()
        .find(|(_, err)| current.same(err))
        .map(|(name, _)| name.clone())
        .ok_or_else(|| anyhow::anyhow!("retry produced an undeclared error: {}", current))
}
#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolver::Outcome;
    fn scenario(json: &str) -> Scenario {
        serde_json::from_str(json).unwrap()
    }
    #[test]
    fn test_defaults_when_parsing() {
        let s = scenario(
            r#"{"name":"s","errors":[{"name":"a"}],"hooks":[{"error":"a","fixes":true}],
                "retry":[null],"initial":"a"}"#,
        );
        assert_eq!(s.strategy, Strategy::Try);
        assert_eq!(s.hooks[0].mode, MatchMode::Exact);
        assert!(s.errors[0].wraps.is_none());
    }
    #[test]
    fn test_build_errors_links_causes() {
        let s = scenario(
            r#"{"name":"s","errors":[{"name":"top","wraps":"root"},{"name":"root"}],
                "retry":[null],"initial":"top"}"#,
        );
        let errors = s.build_errors().unwrap();
        assert!(errors["top"].is_a(&errors["root"]));
        assert!(!errors["root"].is_a(&errors["top"]));
    }
    #[test]
    fn test_run_cycles_through_retry_script() {
        let s = scenario(
            r#"{"name":"s","errors":[{"name":"a"},{"name":"b"}],
                "hooks":[{"error":"a","fixes":true},{"error":"b","fixes":true}],
                "retry":["b",null],"initial":"a"}"#,
        );
        let report = s.run().unwrap();
        assert_eq!(report.final_error, None);
        assert_eq!(report.resolution.outcome, Outcome::Cleared);
        assert_eq!(report.hook_calls, vec![1, 1]);
    }
    #[test]
    fn test_last_retry_step_repeats() {
        let s = scenario(
            r#"{"name":"s","errors":[{"name":"a"}],
                "hooks":[{"error":"a","fixes":true},{"error":"a","fixes":true}],
                "retry":["a"],"initial":"a"}"#,
        );
        let report = s.run().unwrap();
        assert_eq!(report.final_error.as_deref(), Some("a"));
        assert_eq!(report.resolution.retries, 2);
        assert_eq!(report.resolution.outcome, Outcome::Recurred);
    }
    #[test]
    fn test_invalid_scenario_is_refused() {
        let s = scenario(r#"{"name":"s","errors":[],"retry":[null],"initial":"ghost"}"#);
        let err = s.run().unwrap_err();
        assert!(err.to_string().contains("invalid"));
    }
}
