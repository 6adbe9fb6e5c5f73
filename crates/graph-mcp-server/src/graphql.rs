//! Execute GraphQL operations against the graph server

use std::time::Duration;

use reqwest::header::HeaderMap;
use serde_json::{Value, json};
use tracing::debug;
use url::Url;

use crate::errors::{GraphQLError, ServerError};

/// Per-request timeout. No retries; a timed-out call surfaces as a transport
/// failure and the caller decides what to do.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// A persistent client for one GraphQL endpoint.
///
/// The underlying `reqwest::Client` pools connections and negotiates HTTP/2,
/// and is cheap to clone; one instance is created at startup and shared by
/// every operation for the lifetime of the process.
#[derive(Clone)]
pub struct GraphQLClient {
    client: reqwest::Client,
    endpoint: Url,
}

impl GraphQLClient {
    pub fn new(endpoint: Url, default_headers: HeaderMap) -> Result<Self, ServerError> {
        let client = reqwest::Client::builder()
            .default_headers(default_headers)
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        Ok(Self { client, endpoint })
    }

    /// POST a query/variables payload and return the parsed JSON response.
    ///
    /// GraphQL-level `errors` in the body are not interpreted here; callers
    /// that care inspect the returned document.
    pub async fn execute(&self, query: &str, variables: Value) -> Result<Value, GraphQLError> {
        debug!(endpoint = %self.endpoint, "executing GraphQL operation");
        let response = self
            .client
            .post(self.endpoint.clone())
            .json(&json!({ "query": query, "variables": variables }))
            .send()
            .await
            .map_err(GraphQLError::Transport)?;

        let status = response.status();
        if !status.is_success() {
            return Err(GraphQLError::ErrorStatus(status));
        }

        response.json().await.map_err(GraphQLError::Json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn client(endpoint: &str) -> GraphQLClient {
        GraphQLClient::new(
            Url::parse(endpoint).expect("valid test endpoint"),
            HeaderMap::new(),
        )
        .expect("client should build")
    }

    #[tokio::test]
    async fn execute_returns_parsed_body() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"data":{"ok":true}}"#)
            .create_async()
            .await;

        let result = client(&server.url())
            .execute("{ ok }", json!({}))
            .await
            .expect("request should succeed");

        assert_eq!(result, json!({"data": {"ok": true}}));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn execute_sends_query_and_variables() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/")
            .match_header("content-type", "application/json")
            .match_body(mockito::Matcher::Json(json!({
                "query": "query G($path: String!) { graph(path: $path) { name } }",
                "variables": { "path": "my-graph" },
            })))
            .with_status(200)
            .with_body(r#"{"data":null}"#)
            .create_async()
            .await;

        client(&server.url())
            .execute(
                "query G($path: String!) { graph(path: $path) { name } }",
                json!({ "path": "my-graph" }),
            )
            .await
            .expect("request should succeed");

        mock.assert_async().await;
    }

    #[tokio::test]
    async fn non_success_status_is_a_protocol_error() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/")
            .with_status(502)
            .with_body("bad gateway")
            .create_async()
            .await;

        let error = client(&server.url())
            .execute("{ ok }", json!({}))
            .await
            .expect_err("should fail");

        assert!(matches!(
            error,
            GraphQLError::ErrorStatus(status) if status.as_u16() == 502
        ));
    }

    #[tokio::test]
    async fn non_json_body_is_a_protocol_error() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/")
            .with_status(200)
            .with_body("<html>not json</html>")
            .create_async()
            .await;

        let error = client(&server.url())
            .execute("{ ok }", json!({}))
            .await
            .expect_err("should fail");

        assert!(matches!(error, GraphQLError::Json(_)));
    }

    #[tokio::test]
    async fn unreachable_endpoint_is_a_transport_error() {
        // Nothing listens on the discard port.
        let error = client("http://127.0.0.1:9/")
            .execute("{ ok }", json!({}))
            .await
            .expect_err("should fail");

        assert!(matches!(error, GraphQLError::Transport(_)));
    }
}
