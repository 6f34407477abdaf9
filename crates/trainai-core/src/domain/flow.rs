//! Flow domain model
//!
//! A flow is an ordered list of UI steps that accomplishes a task in a target
//! application. Flows are created once and never updated.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashSet;
use std::fmt;
use uuid::Uuid;

use crate::CoreError;

/// Unique identifier of a stored flow
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FlowId(pub String);

impl FlowId {
    /// Generate a fresh random identifier
    pub fn generate() -> Self {
        FlowId(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for FlowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for FlowId {
    fn from(value: &str) -> Self {
        FlowId(value.to_string())
    }
}

/// UI action performed by a step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StepAction {
    Click,
    Type,
    Select,
}

impl StepAction {
    /// Whether the action needs a `value` to be meaningful
    pub fn requires_value(&self) -> bool {
        matches!(self, StepAction::Type | StepAction::Select)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            StepAction::Click => "click",
            StepAction::Type => "type",
            StepAction::Select => "select",
        }
    }
}

/// One UI interaction within a flow
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlowStep {
    pub selector: String,
    pub action: StepAction,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    /// Post-condition description
    #[serde(
        rename = "assert",
        alias = "assert_",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub assertion: Option<String>,
}

/// Flow payload as submitted by a client, without an identifier
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlowInput {
    pub app: String,
    pub task: String,
    pub confidence: f64,
    pub sources: Vec<Map<String, Value>>,
    pub steps: Vec<FlowStep>,
    pub fallbacks: Map<String, Value>,
    pub role: Vec<String>,
    pub prerequisites: Vec<String>,
}

impl FlowInput {
    /// Check the payload beyond what deserialization already enforces
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.app.trim().is_empty() {
            return Err(CoreError::ValidationError("app must not be empty".to_string()));
        }

        if self.task.trim().is_empty() {
            return Err(CoreError::ValidationError("task must not be empty".to_string()));
        }

        if !self.confidence.is_finite() || !(0.0..=1.0).contains(&self.confidence) {
            return Err(CoreError::ValidationError(format!(
                "confidence must be between 0 and 1, got {}",
                self.confidence
            )));
        }

        for (index, step) in self.steps.iter().enumerate() {
            if step.selector.trim().is_empty() {
                return Err(CoreError::ValidationError(format!(
                    "steps[{}].selector must not be empty",
                    index
                )));
            }

            if step.action.requires_value() && step.value.is_none() {
                return Err(CoreError::ValidationError(format!(
                    "steps[{}] with action '{}' requires a value",
                    index,
                    step.action.as_str()
                )));
            }
        }

        if let Some(field) = self.field_with_nul() {
            return Err(CoreError::ValidationError(format!(
                "{} must not contain NUL characters",
                field
            )));
        }

        Ok(())
    }

    /// Drop repeated roles, keeping the first occurrence of each
    pub fn dedup_roles(&mut self) {
        let mut seen = HashSet::new();
        self.role.retain(|role| seen.insert(role.clone()));
    }

    /// Name of the first field holding a U+0000, which text and JSONB columns refuse
    fn field_with_nul(&self) -> Option<String> {
        if has_nul(&self.app) {
            return Some("app".to_string());
        }
        if has_nul(&self.task) {
            return Some("task".to_string());
        }
        if let Some(index) = self.sources.iter().position(|source| map_has_nul(source)) {
            return Some(format!("sources[{}]", index));
        }
        for (index, step) in self.steps.iter().enumerate() {
            let strings = [Some(&step.selector), step.value.as_ref(), step.assertion.as_ref()];
            if strings.into_iter().flatten().any(|s| has_nul(s)) {
                return Some(format!("steps[{}]", index));
            }
        }
        if map_has_nul(&self.fallbacks) {
            return Some("fallbacks".to_string());
        }
        if self.role.iter().any(|r| has_nul(r)) {
            return Some("role".to_string());
        }
        if self.prerequisites.iter().any(|p| has_nul(p)) {
            return Some("prerequisites".to_string());
        }
        None
    }
}

fn has_nul(text: &str) -> bool {
    text.contains('\0')
}

fn map_has_nul(map: &Map<String, Value>) -> bool {
    map.iter().any(|(key, value)| has_nul(key) || value_has_nul(value))
}

fn value_has_nul(value: &Value) -> bool {
    match value {
        Value::String(text) => has_nul(text),
        Value::Array(items) => items.iter().any(value_has_nul),
        Value::Object(map) => map_has_nul(map),
        _ => false,
    }
}

/// A stored flow as returned to clients
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Flow {
    pub id: FlowId,
    #[serde(flatten)]
    pub body: FlowInput,
}

impl Flow {
    pub fn new(id: FlowId, body: FlowInput) -> Self {
        Self { id, body }
    }

    pub fn summary(&self) -> FlowSummary {
        FlowSummary {
            id: self.id.clone(),
            app: self.body.app.clone(),
            task: self.body.task.clone(),
            confidence: self.body.confidence,
        }
    }
}

/// Listing entry for a stored flow
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlowSummary {
    pub id: FlowId,
    pub app: String,
    pub task: String,
    pub confidence: f64,
}

/// A flow together with the creation time recorded by the store
#[derive(Debug, Clone, PartialEq)]
pub struct StoredFlow {
    pub flow: Flow,
    pub created_at: DateTime<Utc>,
}
