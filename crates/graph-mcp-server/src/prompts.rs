//! The prompt steering a model toward schema-first query writing

use rmcp::model::{Prompt, PromptArgument, PromptMessage, PromptMessageRole};

pub const GRAPH_QUERY_PROMPT_NAME: &str = "graph_query";

pub fn prompt() -> Prompt {
    Prompt::new(
        GRAPH_QUERY_PROMPT_NAME,
        Some("Guide the model to answer a question with a GraphQL query against the graph database"),
        Some(vec![PromptArgument {
            name: "message".to_string(),
            description: Some("The user's question about the graph data".to_string()),
            required: Some(true),
        }]),
    )
}

pub fn messages(message: &str) -> Vec<PromptMessage> {
    vec![PromptMessage::new_text(
        PromptMessageRole::User,
        format!(
            r#"You are an expert at writing GraphQL queries. You have access to a graph database through the query tool.

Before writing any queries, examine the schema://database resource to understand the available types, fields and arguments.

When a user asks a question, you should:
1. Check whether you need specific graph schema details by reading the schema://{{graph_name}}/{{include_variants}} resource to understand:
   - Available node properties and their types (including property variants if needed)
   - The relationship types connecting nodes
2. Analyze the overall database schema using schema://database to identify other relevant types and fields
3. Construct an appropriate GraphQL query using proper syntax
4. Use the query tool to execute the query
5. Format and explain the results in a helpful way

The user's request is: {message}

Please write a valid GraphQL query to answer their question."#
        ),
    )]
}
