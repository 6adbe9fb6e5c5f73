//! Addressable schema resources
//!
//! The host framework reads schema information through three `schema://`
//! addresses: the database-wide schema document, a per-graph existence check,
//! and a per-graph schema. The last two are parameterized and advertised as
//! resource templates.

use rmcp::model::{AnnotateAble, RawResource, RawResourceTemplate, Resource, ResourceTemplate};

pub const DATABASE_SCHEMA_URI: &str = "schema://database";
pub const GRAPH_EXISTS_TEMPLATE: &str = "schema://graph_exists/{graph_name}";
pub const GRAPH_SCHEMA_TEMPLATE: &str = "schema://{graph_name}/{include_variants}";

const SCHEME_PREFIX: &str = "schema://";
const DATABASE_SEGMENT: &str = "database";
const GRAPH_EXISTS_PREFIX: &str = "graph_exists/";

pub const JSON_MIME_TYPE: &str = "application/json";

/// A parsed `schema://` resource address.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum SchemaResource {
    /// `schema://database`
    Database,
    /// `schema://graph_exists/{graph_name}`
    GraphExists { graph_name: String },
    /// `schema://{graph_name}/{include_variants}`
    GraphSchema {
        graph_name: String,
        include_variants: bool,
    },
}

impl SchemaResource {
    /// Parse a resource URI. Graph names may contain `/`; the
    /// `include_variants` flag is always the final path segment and must be
    /// the literal `true` or `false`.
    pub fn parse(uri: &str) -> Option<Self> {
        let rest = uri.strip_prefix(SCHEME_PREFIX)?;
        if rest == DATABASE_SEGMENT {
            return Some(Self::Database);
        }
        if let Some(graph_name) = rest.strip_prefix(GRAPH_EXISTS_PREFIX) {
            if graph_name.is_empty() {
                return None;
            }
            return Some(Self::GraphExists {
                graph_name: graph_name.to_string(),
            });
        }
        let (graph_name, flag) = rest.rsplit_once('/')?;
        if graph_name.is_empty() {
            return None;
        }
        let include_variants = match flag {
            "true" => true,
            "false" => false,
            _ => return None,
        };
        Some(Self::GraphSchema {
            graph_name: graph_name.to_string(),
            include_variants,
        })
    }
}

/// The fixed resources advertised through `resources/list`.
pub fn resources() -> Vec<Resource> {
    let mut database = RawResource::new(DATABASE_SCHEMA_URI, "database-schema");
    database.description = Some("The GraphQL schema of the graph database".to_string());
    database.mime_type = Some(JSON_MIME_TYPE.to_string());
    vec![database.no_annotation()]
}

/// The parameterized resources advertised through `resources/templates/list`.
pub fn templates() -> Vec<ResourceTemplate> {
    vec![
        RawResourceTemplate {
            uri_template: GRAPH_EXISTS_TEMPLATE.to_string(),
            name: "graph-exists".to_string(),
            description: Some("Whether the named graph contains at least one node".to_string()),
            mime_type: Some(JSON_MIME_TYPE.to_string()),
        }
        .no_annotation(),
        RawResourceTemplate {
            uri_template: GRAPH_SCHEMA_TEMPLATE.to_string(),
            name: "graph-schema".to_string(),
            description: Some(
                "Node properties and relationship types of the named graph; \
                 set include_variants to true to list the distinct values seen per property"
                    .to_string(),
            ),
            mime_type: Some(JSON_MIME_TYPE.to_string()),
        }
        .no_annotation(),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("schema://database", Some(SchemaResource::Database))]
    #[case(
        "schema://graph_exists/my-graph",
        Some(SchemaResource::GraphExists { graph_name: "my-graph".to_string() })
    )]
    #[case(
        "schema://graph_exists/team/prod/graph",
        Some(SchemaResource::GraphExists { graph_name: "team/prod/graph".to_string() })
    )]
    #[case(
        "schema://my-graph/true",
        Some(SchemaResource::GraphSchema {
            graph_name: "my-graph".to_string(),
            include_variants: true,
        })
    )]
    #[case(
        "schema://my-graph/false",
        Some(SchemaResource::GraphSchema {
            graph_name: "my-graph".to_string(),
            include_variants: false,
        })
    )]
    #[case(
        "schema://team/prod/graph/true",
        Some(SchemaResource::GraphSchema {
            graph_name: "team/prod/graph".to_string(),
            include_variants: true,
        })
    )]
    fn parses_valid_addresses(#[case] uri: &str, #[case] expected: Option<SchemaResource>) {
        assert_eq!(SchemaResource::parse(uri), expected);
    }

    #[rstest]
    #[case("schema://")]
    #[case("schema://graph_exists/")]
    #[case("schema://my-graph")]
    #[case("schema://my-graph/TRUE")]
    #[case("schema://my-graph/1")]
    #[case("schema:///true")]
    #[case("other://database")]
    #[case("database")]
    fn rejects_malformed_addresses(#[case] uri: &str) {
        assert_eq!(SchemaResource::parse(uri), None);
    }
}
