use reqwest::StatusCode;
use reqwest::header::{InvalidHeaderName, InvalidHeaderValue};
use rmcp::model::ErrorCode;
use tokio::task::JoinError;

/// An error executing an operation against the graph server's GraphQL endpoint
#[derive(Debug, thiserror::Error)]
pub enum GraphQLError {
    /// Connection, DNS resolution, or timeout failure
    #[error("Could not reach GraphQL endpoint: {0}")]
    Transport(#[source] reqwest::Error),

    /// The endpoint answered with a non-2xx status
    #[error("GraphQL endpoint returned HTTP {0}")]
    ErrorStatus(StatusCode),

    /// The endpoint answered with a body that is not valid JSON
    #[error("Could not read GraphQL response body: {0}")]
    Json(#[source] reqwest::Error),

    /// The response was valid JSON but did not match the expected shape
    #[error("Unexpected GraphQL response shape: {0}")]
    Shape(#[from] serde_json::Error),
}

/// An error in server initialization
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("invalid header value: {0}")]
    HeaderValue(#[from] InvalidHeaderValue),

    #[error("invalid header name: {0}")]
    HeaderName(#[from] InvalidHeaderName),

    #[error("invalid header: {0}")]
    Header(String),

    #[error("Could not construct HTTP client: {0}")]
    Client(#[from] reqwest::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Failed to start server")]
    StartupError(#[from] JoinError),

    #[error("Failed to initialize service: {0}")]
    ServiceInit(#[from] rmcp::service::ServerInitializeError<std::io::Error>),
}

/// An MCP error
pub type McpError = rmcp::model::ErrorData;

impl From<GraphQLError> for McpError {
    fn from(error: GraphQLError) -> Self {
        McpError::new(ErrorCode::INTERNAL_ERROR, error.to_string(), None)
    }
}
