//! Core domain types for declarative Rinku pipelines.

use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::error::{Result, RinkuError};

/// Name given to the seed entry when the caller does not choose one.
pub const DEFAULT_SEED_NAME: &str = "seed";

// ---------------------------------------------------------------------------
// RunId
// ---------------------------------------------------------------------------

/// A UUID v7 wrapper identifying one pipeline run (time-sortable).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RunId(pub Uuid);

impl RunId {
    /// Generate a new time-sortable run identifier.
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }
}

impl Default for RunId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for RunId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for RunId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

// ---------------------------------------------------------------------------
// PipelineDef
// ---------------------------------------------------------------------------

/// A declarative chain: a seed plus a list of dispatch steps.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineDef {
    /// Human-readable pipeline name.
    pub name: String,
    /// Optional free-form description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Initial value threaded into the first step.
    #[serde(default)]
    pub seed: Value,
    /// Name under which the seed is recorded (defaults to `seed`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed_name: Option<String>,
    /// Steps in execution order.
    #[serde(default)]
    pub steps: Vec<StepDef>,
}

/// One `[[steps]]` entry: a `(target, operation, args)` dispatch triple.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StepDef {
    /// Optional step name for later lookup.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Registry target (e.g. `math`).
    pub target: String,
    /// Operation on the target (e.g. `add`).
    pub operation: String,
    /// Extra arguments appended after the threaded input.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub args: Vec<Value>,
}

impl PipelineDef {
    /// Parse a pipeline from TOML text.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| RinkuError::parse(e.to_string()))
    }

    /// Parse a pipeline from JSON text.
    pub fn from_json_str(content: &str) -> Result<Self> {
        serde_json::from_str(content).map_err(|e| RinkuError::parse(e.to_string()))
    }

    /// Load a pipeline file, choosing the format from its extension.
    ///
    /// `.json` files are parsed as JSON; everything else as TOML.
    pub fn load(path: &Path) -> Result<Self> {
        let content =
            std::fs::read_to_string(path).map_err(|e| RinkuError::io(path, e))?;

        let is_json = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));

        let parsed = if is_json {
            Self::from_json_str(&content)
        } else {
            Self::from_toml_str(&content)
        };

        parsed.map_err(|e| match e {
            RinkuError::Parse { message } => {
                RinkuError::parse(format!("failed to parse {}: {message}", path.display()))
            }
            other => other,
        })
    }

    /// Seed name, falling back to [`DEFAULT_SEED_NAME`].
    pub fn seed_name(&self) -> &str {
        self.seed_name.as_deref().unwrap_or(DEFAULT_SEED_NAME)
    }

    /// Check the definition before building a chain from it.
    ///
    /// Chains built in code tolerate duplicate names; declarative pipelines
    /// don't, so every name is guaranteed a single lookup hit.
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(RinkuError::validation("pipeline name must not be empty"));
        }

        let mut seen: HashSet<&str> = HashSet::new();
        seen.insert(self.seed_name());

        for (i, step) in self.steps.iter().enumerate() {
            let position = i + 1;
            if step.target.trim().is_empty() {
                return Err(RinkuError::validation(format!(
                    "step {position}: target must not be empty"
                )));
            }
            if step.operation.trim().is_empty() {
                return Err(RinkuError::validation(format!(
                    "step {position}: operation must not be empty"
                )));
            }
            if let Some(name) = step.name.as_deref() {
                if !seen.insert(name) {
                    return Err(RinkuError::validation(format!(
                        "step {position}: duplicate step name '{name}'"
                    )));
                }
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn step(name: Option<&str>, target: &str, operation: &str) -> StepDef {
        StepDef {
            name: name.map(String::from),
            target: target.into(),
            operation: operation.into(),
            args: vec![],
        }
    }

    #[test]
    fn run_id_roundtrip() {
        let id = RunId::new();
        let s = id.to_string();
        let parsed: RunId = s.parse().expect("parse RunId");
        assert_eq!(id, parsed);
    }

    #[test]
    fn parse_minimal_toml() {
        let def = PipelineDef::from_toml_str(
            r#"
name = "inc"
seed = 1

[[steps]]
target = "math"
operation = "add"
args = [1]
"#,
        )
        .expect("parse");

        assert_eq!(def.name, "inc");
        assert_eq!(def.seed, json!(1));
        assert_eq!(def.seed_name(), DEFAULT_SEED_NAME);
        assert_eq!(def.steps.len(), 1);
        assert_eq!(def.steps[0].args, vec![json!(1)]);
        assert!(def.steps[0].name.is_none());
    }

    #[test]
    fn missing_seed_defaults_to_null() {
        let def = PipelineDef::from_toml_str("name = \"empty\"").expect("parse");
        assert_eq!(def.seed, Value::Null);
        assert!(def.steps.is_empty());
    }

    #[test]
    fn malformed_toml_is_parse_error() {
        let err = PipelineDef::from_toml_str("name = ").unwrap_err();
        assert!(matches!(err, RinkuError::Parse { .. }));
    }

    #[test]
    fn validate_rejects_duplicate_names() {
        let def = PipelineDef {
            name: "dup".into(),
            description: None,
            seed: json!(0),
            seed_name: None,
            steps: vec![
                step(Some("a"), "math", "add"),
                step(Some("a"), "math", "add"),
            ],
        };
        let err = def.validate().unwrap_err();
        assert!(err.to_string().contains("duplicate step name 'a'"));
    }

    #[test]
    fn validate_rejects_step_shadowing_seed() {
        let def = PipelineDef {
            name: "shadow".into(),
            description: None,
            seed: json!(0),
            seed_name: Some("input".into()),
            steps: vec![step(Some("input"), "value", "identity")],
        };
        assert!(def.validate().is_err());
    }

    #[test]
    fn validate_rejects_blank_target_and_name() {
        let mut def = PipelineDef {
            name: "ok".into(),
            description: None,
            seed: json!(0),
            seed_name: None,
            steps: vec![step(None, " ", "add")],
        };
        assert!(def.validate().unwrap_err().to_string().contains("step 1: target"));

        def.steps.clear();
        def.name = String::new();
        assert!(def.validate().is_err());
    }

    #[test]
    fn anonymous_steps_never_collide() {
        let def = PipelineDef {
            name: "anon".into(),
            description: None,
            seed: json!(0),
            seed_name: None,
            steps: vec![step(None, "math", "add"), step(None, "math", "add")],
        };
        assert!(def.validate().is_ok());
    }

    #[test]
    fn pricing_fixture_validates() {
        let path = Path::new("../../../fixtures/pipelines/pricing.toml");
        let def = PipelineDef::load(path).expect("load fixture pipeline");
        def.validate().expect("fixture is valid");
        assert_eq!(def.name, "pricing");
        assert_eq!(def.seed_name(), "base_price");
        assert_eq!(def.steps.len(), 3);
    }

    #[test]
    fn json_fixture_validates() {
        let path = Path::new("../../../fixtures/pipelines/shopping.json");
        let def = PipelineDef::load(path).expect("load fixture pipeline");
        def.validate().expect("fixture is valid");
        assert_eq!(def.seed, json!([]));
        assert_eq!(def.steps[0].target, "list");
    }
}
