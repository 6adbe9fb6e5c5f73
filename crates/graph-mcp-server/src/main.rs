use clap::Parser;
use clap::builder::Styles;
use clap::builder::styling::{AnsiColor, Effects};
use graph_mcp_server::errors::ServerError;
use graph_mcp_server::server::Server;
use graph_mcp_server::server::Transport;
use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderName, HeaderValue};
use std::net::{IpAddr, Ipv4Addr};
use std::str::FromStr;
use tracing::{Level, info};
use tracing_subscriber::EnvFilter;
use url::Url;

/// Clap styling
const STYLES: Styles = Styles::styled()
    .header(AnsiColor::Green.on_default().effects(Effects::BOLD))
    .usage(AnsiColor::Green.on_default().effects(Effects::BOLD))
    .literal(AnsiColor::Cyan.on_default().effects(Effects::BOLD))
    .placeholder(AnsiColor::Cyan.on_default());

/// Arguments to the MCP server
#[derive(Debug, clap::Parser)]
#[command(
    styles = STYLES,
    about = "Graph MCP Server - expose graph database schema to an AI agent",
)]
struct Args {
    /// The GraphQL endpoint of the graph database server
    #[arg(
        long,
        short = 'e',
        env = "GRAPH_ENDPOINT",
        default_value = "http://localhost:1736/"
    )]
    endpoint: Url,

    /// Bearer token sent to the endpoint in an Authorization header
    #[arg(long, env = "GRAPH_AUTH_TOKEN")]
    auth_token: Option<String>,

    /// Headers to send to the endpoint
    #[arg(long = "header", action = clap::ArgAction::Append)]
    headers: Vec<String>,

    /// The IP address to bind the SSE server to
    ///
    /// [default: 127.0.0.1]
    #[arg(long)]
    sse_address: Option<IpAddr>,

    /// Start the server using the SSE transport on the given port
    ///
    /// [default: 5000]
    #[arg(long)]
    sse_port: Option<u16>,

    /// The IP address to bind the Streamable HTTP server to
    ///
    /// [default: 127.0.0.1]
    #[arg(long, conflicts_with_all(["sse_port", "sse_address"]))]
    http_address: Option<IpAddr>,

    /// Start the server using the Streamable HTTP transport on the given port
    ///
    /// [default: 5000]
    #[arg(long, conflicts_with_all(["sse_port", "sse_address"]))]
    http_port: Option<u16>,

    /// The log level for the MCP Server
    #[arg(long = "log", short = 'l', global = true, default_value_t = Level::INFO)]
    log_level: Level,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let transport = if args.http_port.is_some() || args.http_address.is_some() {
        Transport::StreamableHttp {
            address: args.http_address.unwrap_or(IpAddr::V4(Ipv4Addr::LOCALHOST)),
            port: args.http_port.unwrap_or(5000),
        }
    } else if args.sse_port.is_some() || args.sse_address.is_some() {
        Transport::SSE {
            address: args.sse_address.unwrap_or(IpAddr::V4(Ipv4Addr::LOCALHOST)),
            port: args.sse_port.unwrap_or(5000),
        }
    } else {
        Transport::Stdio
    };

    // When using the Stdio transport, send output to stderr since stdout is used for MCP messages
    match transport {
        Transport::SSE { .. } | Transport::StreamableHttp { .. } => tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::from_default_env().add_directive(args.log_level.into()))
            .with_ansi(true)
            .with_target(false)
            .init(),
        Transport::Stdio => tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::from_default_env().add_directive(args.log_level.into()))
            .with_writer(std::io::stderr)
            .with_ansi(true)
            .with_target(false)
            .init(),
    };

    info!(
        "Graph MCP Server v{} // endpoint {}",
        std::env!("CARGO_PKG_VERSION"),
        args.endpoint
    );

    let default_headers = parse_headers(args.headers, args.auth_token)?;

    Ok(Server::builder()
        .transport(transport)
        .endpoint(args.endpoint)
        .headers(default_headers)
        .build()
        .start()
        .await?)
}

fn parse_headers(
    headers: Vec<String>,
    auth_token: Option<String>,
) -> Result<HeaderMap, ServerError> {
    let mut default_headers = HeaderMap::new();
    for header in headers {
        let parts: Vec<&str> = header.splitn(2, ':').map(|s| s.trim()).collect();
        match (parts.first(), parts.get(1)) {
            (Some(key), Some(value)) => {
                default_headers.append(HeaderName::from_str(key)?, HeaderValue::from_str(value)?);
            }
            _ => return Err(ServerError::Header(header)),
        }
    }
    if let Some(token) = auth_token {
        let mut value = HeaderValue::from_str(&format!("Bearer {token}"))?;
        value.set_sensitive(true);
        default_headers.insert(AUTHORIZATION, value);
    }
    Ok(default_headers)
}
