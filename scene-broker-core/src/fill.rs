//! Slot Filling
//!
//! Turns a classified prompt into a candidate parameter map. The model is
//! asked for a flat JSON object and nothing else; the schema module decides
//! whether the result is acceptable.

use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;

use crate::classifier::Action;
use crate::error::FillError;
use crate::llm::LlmClient;
use crate::schema::ParameterMap;

#[async_trait]
pub trait SlotFiller: Send + Sync {
    async fn fill(&self, action: Action, prompt: &str) -> Result<ParameterMap, FillError>;
}

/// Slot filler backed by a chat model.
pub struct LlmSlotFiller {
    llm: Arc<dyn LlmClient>,
}

impl LlmSlotFiller {
    pub fn new(llm: Arc<dyn LlmClient>) -> Self {
        Self { llm }
    }

    pub fn model_name(&self) -> &str {
        self.llm.model_name()
    }
}

#[async_trait]
impl SlotFiller for LlmSlotFiller {
    async fn fill(&self, action: Action, prompt: &str) -> Result<ParameterMap, FillError> {
        let system_prompt = build_fill_prompt(action);
        let user_prompt = format!("Sentence:\n{}\n\nRespond with JSON only.", prompt);

        tracing::debug!(
            %action,
            provider = self.llm.provider_name(),
            model = self.llm.model_name(),
            "Requesting slot fill"
        );

        let content = self
            .llm
            .chat_json(&system_prompt, &user_prompt)
            .await
            .map_err(|e| FillError::Upstream(e.to_string()))?;

        parse_parameters(&content)
    }
}

/// System prompt describing the parameters for one action.
pub fn build_fill_prompt(action: Action) -> String {
    let (parameters, sentence, output) = match action {
        Action::Spawn => (
            r#"- prefab: the object to be inserted, placed or spawned
- reference_object: the object the new one is placed relative to; "default" when none is named
- direction: one of top, bottom, left, right, front, back; "default" when none is given
- value: whole-number displacement from the reference object; "1" when none is given"#,
            "Spawn a turbine_blade next to the engine_stand.",
            r#"{"prefab": "turbine_blade", "reference_object": "engine_stand", "direction": "right", "value": "1"}"#,
        ),
        Action::Move => (
            r#"- prefab: the object to be moved
- direction: one of top, bottom, left, right, front, back
- value: how many whole units to move; "1" when none is given"#,
            "Move the workbench to the right.",
            r#"{"prefab": "workbench", "direction": "right", "value": "1"}"#,
        ),
        Action::Replace => (
            r#"- prefab: the new object to put in place
- object_to_replace: the object already in the scene that gets replaced"#,
            "Replace the workbench with wrench",
            r#"{"prefab": "wrench", "object_to_replace": "workbench"}"#,
        ),
        Action::Rotate => (
            r#"- prefab: the object to be rotated
- axis: one of x, y, z, or reset to reset every axis
- value: rotation in degrees"#,
            "Rotate the screwdriver 45 degrees in x axis.",
            r#"{"prefab": "screwdriver", "axis": "x", "value": "45"}"#,
        ),
        Action::Remove => (
            "- prefab: the object to be deleted",
            "Remove screwdriver in the scene.",
            r#"{"prefab": "screwdriver"}"#,
        ),
    };

    format!(
        r#"Extract the parameters of a {action} command from the given sentence.

PARAMETERS:
{parameters}

RULES:
1. Output a single flat JSON object with exactly these keys, every value a string
2. Join multi-word object names with underscores and keep any numbers in them
3. No markdown, no explanation outside the JSON

EXAMPLE SENTENCE:
{sentence}

EXAMPLE OUTPUT:
{output}
"#,
        action = action.label().to_lowercase(),
    )
}

/// Parse model output into a flat string map.
///
/// Tolerates code fences and prose around the object. Numbers and booleans
/// are stringified; nulls are dropped; nested values are rejected.
pub fn parse_parameters(content: &str) -> Result<ParameterMap, FillError> {
    let json_str = content
        .trim()
        .trim_start_matches("```json")
        .trim_start_matches("```")
        .trim_end_matches("```")
        .trim();

    let value: Value = match serde_json::from_str(json_str) {
        Ok(v) => v,
        Err(e) => {
            let extracted = json_str
                .find('{')
                .zip(json_str.rfind('}'))
                .filter(|(start, end)| start < end)
                .map(|(start, end)| &json_str[start..=end])
                .ok_or_else(|| FillError::Unparsable(format!("no JSON object found: {}", e)))?;
            serde_json::from_str(extracted).map_err(|e| FillError::Unparsable(e.to_string()))?
        }
    };

    let Value::Object(object) = value else {
        return Err(FillError::Unparsable("expected a JSON object".to_string()));
    };

    let mut parameters = ParameterMap::new();
    for (key, value) in object {
        let text = match value {
            Value::String(s) => s,
            Value::Number(n) => n.to_string(),
            Value::Bool(b) => b.to_string(),
            Value::Null => continue,
            Value::Array(_) | Value::Object(_) => {
                return Err(FillError::Unparsable(format!(
                    "parameter '{}' is not a scalar",
                    key
                )))
            }
        };
        parameters.insert(key, text);
    }
    Ok(parameters)
}
