use anyhow::Result;
use async_trait::async_trait;
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::fmt::Debug;

use crate::errors::{AgentError, AgentResult};
use crate::providers::types::tool::Tool;
use crate::providers::utils::is_valid_function_name;

/// The callable side of a tool. Receives the argument mapping sent by the model.
#[async_trait]
pub trait ToolFunction: Send + Sync {
    async fn call(&self, arguments: &Map<String, Value>) -> Result<Value>;
}

/// Adapts a plain closure into a [`ToolFunction`].
pub struct FnTool<F>(pub F);

#[async_trait]
impl<F> ToolFunction for FnTool<F>
where
    F: Fn(&Map<String, Value>) -> Result<Value> + Send + Sync,
{
    async fn call(&self, arguments: &Map<String, Value>) -> Result<Value> {
        (self.0)(arguments)
    }
}

/// Advertised tool definitions paired with the functions that serve them.
#[derive(Default)]
pub struct ToolRegistry {
    definitions: Vec<Tool>,
    functions: HashMap<String, Box<dyn ToolFunction>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(
        &mut self,
        definition: Tool,
        function: impl ToolFunction + 'static,
    ) -> AgentResult<()> {
        if self.functions.contains_key(&definition.name) {
            return Err(AgentError::InvalidRegistry(format!(
                "duplicate tool name: {}",
                definition.name
            )));
        }
        self.functions
            .insert(definition.name.clone(), Box::new(function));
        self.definitions.push(definition);
        Ok(())
    }

    pub fn register_fn<F>(&mut self, definition: Tool, function: F) -> AgentResult<()>
    where
        F: Fn(&Map<String, Value>) -> Result<Value> + Send + Sync + 'static,
    {
        self.register(definition, FnTool(function))
    }

    /// The static catalog advertised to the model every round.
    pub fn definitions(&self) -> &[Tool] {
        &self.definitions
    }

    pub fn definition(&self, name: &str) -> Option<&Tool> {
        self.definitions.iter().find(|tool| tool.name == name)
    }

    pub fn get(&self, name: &str) -> Option<&dyn ToolFunction> {
        self.functions.get(name).map(|f| &**f)
    }

    /// Checks that every advertised name is well formed and resolves to a function.
    pub fn validate(&self) -> AgentResult<()> {
        self.validate_catalog(&self.definitions)
    }

    /// Checks an externally advertised catalog against the registered functions.
    pub fn validate_catalog(&self, catalog: &[Tool]) -> AgentResult<()> {
        let mut seen = std::collections::HashSet::new();
        for tool in catalog {
            if !is_valid_function_name(&tool.name) {
                return Err(AgentError::InvalidRegistry(format!(
                    "tool name '{}' must match [a-zA-Z0-9_-]+",
                    tool.name
                )));
            }
            if !seen.insert(tool.name.as_str()) {
                return Err(AgentError::InvalidRegistry(format!(
                    "duplicate tool name: {}",
                    tool.name
                )));
            }
            if !self.functions.contains_key(&tool.name) {
                return Err(AgentError::InvalidRegistry(format!(
                    "advertised tool {} has no registered function",
                    tool.name
                )));
            }
        }
        Ok(())
    }

    /// Resolves `name`, checks its required arguments and invokes it.
    pub async fn dispatch(&self, name: &str, arguments: &Map<String, Value>) -> AgentResult<Value> {
        let function = self
            .get(name)
            .ok_or_else(|| AgentError::ToolNotFound(name.to_string()))?;

        if let Some(definition) = self.definition(name) {
            if let Some(missing) = definition
                .required_parameters()
                .into_iter()
                .find(|param| !arguments.contains_key(*param))
            {
                return Err(AgentError::tool_invocation(
                    name,
                    format!("missing required argument '{}'", missing),
                ));
            }
        }

        function
            .call(arguments)
            .await
            .map_err(|e| AgentError::tool_invocation(name, format!("{:#}", e)))
    }
}

impl Debug for ToolRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToolRegistry")
            .field("definitions", &self.definitions)
            .field("functions", &"<functions>")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;
    use serde_json::json;

    fn weather_definition() -> Tool {
        Tool::new(
            "getCurrentWeather",
            "Get the current weather",
            json!({
                "type": "object",
                "properties": {
                    "latitude": { "type": "string" },
                    "longitude": { "type": "string" }
                },
                "required": ["longitude", "latitude"]
            }),
        )
    }

    fn args(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap()
    }

    #[tokio::test]
    async fn test_dispatch_passes_arguments() -> AgentResult<()> {
        let mut registry = ToolRegistry::new();
        registry.register_fn(weather_definition(), |params| {
            Ok(json!({ "lat": params["latitude"], "lon": params["longitude"] }))
        })?;

        let result = registry
            .dispatch("getCurrentWeather", &args(json!({"latitude": "1", "longitude": "2"})))
            .await?;
        assert_eq!(result, json!({"lat": "1", "lon": "2"}));
        Ok(())
    }

    #[tokio::test]
    async fn test_dispatch_unknown_tool() {
        let registry = ToolRegistry::new();
        let err = registry.dispatch("getTime", &Map::new()).await.unwrap_err();
        assert_eq!(err, AgentError::ToolNotFound("getTime".to_string()));
    }

    #[tokio::test]
    async fn test_dispatch_missing_required_argument() {
        let mut registry = ToolRegistry::new();
        registry
            .register_fn(weather_definition(), |_| Ok(json!({})))
            .unwrap();

        let err = registry
            .dispatch("getCurrentWeather", &args(json!({"latitude": "1"})))
            .await
            .unwrap_err();
        assert_eq!(
            err,
            AgentError::tool_invocation("getCurrentWeather", "missing required argument 'longitude'")
        );
    }

    #[tokio::test]
    async fn test_dispatch_wraps_tool_failure() {
        let mut registry = ToolRegistry::new();
        registry
            .register_fn(Tool::new("getLocation", "where am I", json!({})), |_| {
                Err(anyhow!("connection refused"))
            })
            .unwrap();

        let err = registry.dispatch("getLocation", &Map::new()).await.unwrap_err();
        assert!(matches!(err, AgentError::ToolInvocation { ref tool_name, .. } if tool_name == "getLocation"));
        assert!(err.to_string().contains("connection refused"));
    }

    #[test]
    fn test_register_duplicate() {
        let mut registry = ToolRegistry::new();
        registry.register_fn(weather_definition(), |_| Ok(json!({}))).unwrap();
        let err = registry
            .register_fn(weather_definition(), |_| Ok(json!({})))
            .unwrap_err();
        assert!(matches!(err, AgentError::InvalidRegistry(_)));
    }

    #[test]
    fn test_validate_catalog_detects_drift() {
        let mut registry = ToolRegistry::new();
        registry.register_fn(weather_definition(), |_| Ok(json!({}))).unwrap();
        assert!(registry.validate().is_ok());

        let catalog = vec![
            weather_definition(),
            Tool::new("getLocation", "where am I", json!({})),
        ];
        let err = registry.validate_catalog(&catalog).unwrap_err();
        assert!(err.to_string().contains("getLocation"));
    }

    #[test]
    fn test_validate_rejects_bad_names() {
        let mut registry = ToolRegistry::new();
        registry
            .register_fn(Tool::new("get location", "where am I", json!({})), |_| Ok(json!({})))
            .unwrap();
        assert!(matches!(registry.validate(), Err(AgentError::InvalidRegistry(_))));
    }

    #[test]
    fn test_debug_output() {
        let mut registry = ToolRegistry::new();
        registry.register_fn(weather_definition(), |_| Ok(json!({}))).unwrap();
        let debug_output = format!("{:?}", registry);
        assert!(debug_output.contains("getCurrentWeather"));
        assert!(debug_output.contains("<functions>"));
    }
}
