pub mod model;
pub mod templates;
pub mod validation;
pub use model::{ErrorSpec, HookSpec, Scenario, ScenarioReport, Strategy};
pub use templates::{ScenarioOverrides, TemplateManager};
pub use validation::{ScenarioValidator, ValidationError, ValidationResult, ValidationWarning};
