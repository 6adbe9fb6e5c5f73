//! Execute an ad hoc GraphQL operation from an MCP tool

use rmcp::model::{CallToolResult, Content, ErrorCode, Tool};
use rmcp::schemars::JsonSchema;
use rmcp::serde_json::Value;
use rmcp::{schemars, serde_json};
use serde::Deserialize;

use crate::errors::McpError;
use crate::graphql::GraphQLClient;
use crate::schema_from_type;

/// The name of the tool to execute an ad hoc GraphQL operation
pub const QUERY_TOOL_NAME: &str = "query";

#[derive(Clone)]
pub struct Query {
    pub tool: Tool,
}

/// Input for the query tool.
#[derive(JsonSchema, Deserialize)]
pub struct Input {
    /// The GraphQL operation
    query: String,

    /// The variable values represented as JSON
    #[schemars(schema_with = "String::json_schema", default)]
    variables: Option<Value>,
}

impl Query {
    pub fn new() -> Self {
        Self {
            tool: Tool::new(
                QUERY_TOOL_NAME,
                "Execute a GraphQL operation against the graph database. \
                 Read the schema://database resource to learn the available types and fields, \
                 and the per-graph schema resources to learn node properties and relationship \
                 types, before composing operations.",
                schema_from_type!(Input),
            ),
        }
    }

    pub async fn execute(
        &self,
        client: &GraphQLClient,
        input: Value,
    ) -> Result<CallToolResult, McpError> {
        let input = serde_json::from_value::<Input>(input).map_err(|_| {
            McpError::new(ErrorCode::INVALID_PARAMS, "Invalid input".to_string(), None)
        })?;
        let variables = parse_variables(input.variables)?;

        let json = client.execute(&input.query, variables).await?;

        // Flag GraphQL-level failures so the client model can react, while
        // still returning the raw response document.
        let is_error = json
            .get("errors")
            .filter(|value| !matches!(value, Value::Null))
            .is_some()
            && json
                .get("data")
                .filter(|value| !matches!(value, Value::Null))
                .is_none();

        Ok(CallToolResult {
            content: vec![Content::json(&json).unwrap_or(Content::text(json.to_string()))],
            is_error: Some(is_error),
        })
    }
}

impl Default for Query {
    fn default() -> Self {
        Self::new()
    }
}

/// Variables may arrive as a JSON object or as a JSON-encoded string.
fn parse_variables(variables: Option<Value>) -> Result<Value, McpError> {
    match variables {
        None | Some(Value::Null) => Ok(Value::Object(serde_json::Map::new())),
        Some(Value::String(s)) => serde_json::from_str(&s).map_err(|_| {
            McpError::new(ErrorCode::INVALID_PARAMS, "Invalid input".to_string(), None)
        }),
        Some(obj) if obj.is_object() => Ok(obj),
        _ => Err(McpError::new(
            ErrorCode::INVALID_PARAMS,
            "Invalid input".to_string(),
            None,
        )),
    }
}
