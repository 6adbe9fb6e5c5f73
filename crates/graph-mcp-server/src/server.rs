//! The MCP server hosting the schema resources

use std::net::{IpAddr, SocketAddr};

use bon::bon;
use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderValue};
use rmcp::model::{
    CallToolRequestParam, CallToolResult, ErrorCode, GetPromptRequestParam, GetPromptResult,
    Implementation, ListPromptsResult, ListResourceTemplatesResult, ListResourcesResult,
    ListToolsResult, PaginatedRequestParam, ReadResourceRequestParam, ReadResourceResult,
    ResourceContents, ServerCapabilities, ServerInfo,
};
use rmcp::serde_json::Value;
use rmcp::service::RequestContext;
use rmcp::transport::sse_server::SseServerConfig;
use rmcp::transport::streamable_http_server::session::local::LocalSessionManager;
use rmcp::transport::{SseServer, StreamableHttpServerConfig, StreamableHttpService, stdio};
use rmcp::{RoleServer, ServerHandler, ServiceExt};
use tokio_util::sync::CancellationToken;
use tracing::{error, info};
use url::Url;

use crate::errors::{McpError, ServerError};
use crate::graphql::GraphQLClient;
use crate::prompts;
use crate::prompts::GRAPH_QUERY_PROMPT_NAME;
use crate::resolver::SchemaResolver;
use crate::resources;
use crate::resources::{JSON_MIME_TYPE, SchemaResource};
use crate::tools::query::{QUERY_TOOL_NAME, Query};

/// A Graph MCP Server
pub struct Server {
    transport: Transport,
    endpoint: Url,
    headers: HeaderMap,
}

#[derive(Clone)]
pub enum Transport {
    Stdio,
    SSE { address: IpAddr, port: u16 },
    StreamableHttp { address: IpAddr, port: u16 },
}

#[bon]
impl Server {
    #[builder]
    pub fn new(transport: Transport, endpoint: Url, headers: HeaderMap) -> Self {
        let headers = {
            let mut headers = headers.clone();
            headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
            headers
        };
        Self {
            transport,
            endpoint,
            headers,
        }
    }

    pub async fn start(self) -> Result<(), ServerError> {
        let client = GraphQLClient::new(self.endpoint, self.headers)?;
        let running = Running {
            resolver: SchemaResolver::new(client.clone()),
            client,
            query_tool: Query::new(),
        };

        match self.transport {
            Transport::StreamableHttp { address, port } => {
                info!(port = ?port, address = ?address, "Starting MCP server in Streamable HTTP mode");
                let listen_address = SocketAddr::new(address, port);
                let service = StreamableHttpService::new(
                    move || Ok(running.clone()),
                    LocalSessionManager::default().into(),
                    StreamableHttpServerConfig {
                        sse_keep_alive: None,
                        stateful_mode: true,
                    },
                );
                let router = axum::Router::new().nest_service("/mcp", service);
                let tcp_listener = tokio::net::TcpListener::bind(listen_address).await?;
                axum::serve(tcp_listener, router)
                    .with_graceful_shutdown(shutdown_signal())
                    .await?;
            }
            Transport::SSE { address, port } => {
                info!(port = ?port, address = ?address, "Starting MCP server in SSE mode");
                let listen_address = SocketAddr::new(address, port);
                let cancellation_token = SseServer::serve_with_config(SseServerConfig {
                    bind: listen_address,
                    sse_path: "/sse".to_string(),
                    post_path: "/message".to_string(),
                    ct: CancellationToken::new(),
                    sse_keep_alive: None,
                })
                .await?
                .with_service(move || running.clone());
                shutdown_signal().await;
                cancellation_token.cancel();
            }
            Transport::Stdio => {
                info!("Starting MCP server in stdio mode");
                let service = running.serve(stdio()).await.inspect_err(|e| {
                    error!("serving error: {:?}", e);
                })?;
                service.waiting().await.map_err(ServerError::StartupError)?;
            }
        }

        Ok(())
    }
}

#[derive(Clone)]
struct Running {
    client: GraphQLClient,
    resolver: SchemaResolver,
    query_tool: Query,
}

impl ServerHandler for Running {
    async fn call_tool(
        &self,
        request: CallToolRequestParam,
        _context: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, McpError> {
        match request.name.as_ref() {
            QUERY_TOOL_NAME => {
                self.query_tool
                    .execute(&self.client, Value::from(request.arguments))
                    .await
            }
            _ => Err(McpError::new(
                ErrorCode::METHOD_NOT_FOUND,
                format!("Tool {} not found", request.name),
                None,
            )),
        }
    }

    async fn list_tools(
        &self,
        _request: Option<PaginatedRequestParam>,
        _context: RequestContext<RoleServer>,
    ) -> Result<ListToolsResult, McpError> {
        Ok(ListToolsResult {
            next_cursor: None,
            tools: vec![self.query_tool.tool.clone()],
        })
    }

    async fn list_resources(
        &self,
        _request: Option<PaginatedRequestParam>,
        _context: RequestContext<RoleServer>,
    ) -> Result<ListResourcesResult, McpError> {
        Ok(ListResourcesResult {
            next_cursor: None,
            resources: resources::resources(),
        })
    }

    async fn list_resource_templates(
        &self,
        _request: Option<PaginatedRequestParam>,
        _context: RequestContext<RoleServer>,
    ) -> Result<ListResourceTemplatesResult, McpError> {
        Ok(ListResourceTemplatesResult {
            next_cursor: None,
            resource_templates: resources::templates(),
        })
    }

    async fn read_resource(
        &self,
        request: ReadResourceRequestParam,
        _context: RequestContext<RoleServer>,
    ) -> Result<ReadResourceResult, McpError> {
        let resource = SchemaResource::parse(&request.uri).ok_or_else(|| {
            McpError::new(
                ErrorCode::RESOURCE_NOT_FOUND,
                format!("Resource {} not found", request.uri),
                None,
            )
        })?;

        let text = match resource {
            SchemaResource::Database => self.resolver.database_schema().await?.to_string(),
            SchemaResource::GraphExists { graph_name } => self
                .resolver
                .graph_exists(&graph_name)
                .await?
                .to_string(),
            SchemaResource::GraphSchema {
                graph_name,
                include_variants,
            } => {
                let schema = self
                    .resolver
                    .graph_schema(&graph_name, include_variants)
                    .await?;
                rmcp::serde_json::to_string(&schema).map_err(|e| {
                    McpError::new(
                        ErrorCode::INTERNAL_ERROR,
                        format!("Failed to serialize graph schema: {e}"),
                        None,
                    )
                })?
            }
        };

        Ok(ReadResourceResult {
            contents: vec![ResourceContents::TextResourceContents {
                uri: request.uri,
                mime_type: Some(JSON_MIME_TYPE.to_string()),
                text,
            }],
        })
    }

    async fn list_prompts(
        &self,
        _request: Option<PaginatedRequestParam>,
        _context: RequestContext<RoleServer>,
    ) -> Result<ListPromptsResult, McpError> {
        Ok(ListPromptsResult {
            next_cursor: None,
            prompts: vec![prompts::prompt()],
        })
    }

    async fn get_prompt(
        &self,
        request: GetPromptRequestParam,
        _context: RequestContext<RoleServer>,
    ) -> Result<GetPromptResult, McpError> {
        if request.name != GRAPH_QUERY_PROMPT_NAME {
            return Err(McpError::new(
                ErrorCode::INVALID_PARAMS,
                format!("Prompt {} not found", request.name),
                None,
            ));
        }
        let message = request
            .arguments
            .as_ref()
            .and_then(|arguments| arguments.get("message"))
            .and_then(Value::as_str)
            .ok_or_else(|| {
                McpError::new(
                    ErrorCode::INVALID_PARAMS,
                    "Missing required argument: message".to_string(),
                    None,
                )
            })?;
        Ok(GetPromptResult {
            description: None,
            messages: prompts::messages(message),
        })
    }

    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            server_info: Implementation {
                name: "Graph MCP Server".to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
            },
            capabilities: ServerCapabilities::builder()
                .enable_prompts()
                .enable_resources()
                .enable_tools()
                .build(),
            instructions: Some(
                "Read the schema://database resource for the database's GraphQL schema, \
                 schema://graph_exists/{graph_name} to check a graph, and \
                 schema://{graph_name}/{include_variants} for a graph's node properties and \
                 relationship types. Use the query tool to execute GraphQL operations."
                    .to_string(),
            ),
            ..Default::default()
        }
    }
}

#[allow(clippy::expect_used)]
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install CTRL+C signal handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
