//! MCP tools exposed alongside the schema resources

pub mod query;
