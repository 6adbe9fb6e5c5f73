//! Resolve schema information from the graph server
//!
//! Three operations, each one GraphQL round trip over the shared client: the
//! database-wide schema document, a per-graph existence check, and a per-graph
//! schema of node properties and relationship types. Nothing is cached;
//! every call issues its own request.

use std::collections::BTreeSet;

use serde::de::IgnoredAny;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use crate::errors::GraphQLError;
use crate::graphql::GraphQLClient;

/// Property key conventionally carrying an edge's relationship type
const EDGE_TYPE_PROPERTY: &str = "type";

const DATABASE_SCHEMA_QUERY: &str = r#"{
  __schema {
    types {
      name
      fields(includeDeprecated: false) {
        name
        description
        args {
          name
          defaultValue
        }
      }
    }
  }
}"#;

const GRAPH_NODES_QUERY: &str = r#"query GraphNodes($path: String!) {
  graph(path: $path) {
    nodes {
      list {
        name
      }
    }
  }
}"#;

const GRAPH_SCHEMA_QUERY: &str = r#"query GraphSchema($path: String!, $withVariants: Boolean!) {
  graph(path: $path) {
    schema {
      nodes {
        properties {
          key
          propertyType
          variants @include(if: $withVariants)
        }
      }
    }
    edges {
      list {
        properties {
          keys
          values {
            value
          }
        }
      }
    }
  }
}"#;

/// One node property reported by the graph server, passed through verbatim.
/// `variants` is only present when the caller asked for it.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct PropertyDescriptor {
    pub key: String,
    #[serde(rename = "propertyType")]
    pub property_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variants: Option<Vec<String>>,
}

/// The synthesized schema of one graph. Relationship types are de-duplicated
/// here, not by the database; the set serializes in sorted order.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize)]
pub struct GraphSchema {
    pub properties: Vec<PropertyDescriptor>,
    pub relationships: BTreeSet<String>,
}

impl From<GraphPayload> for GraphSchema {
    fn from(graph: GraphPayload) -> Self {
        let properties = graph
            .schema
            .nodes
            .into_iter()
            .flat_map(|node| node.properties)
            .collect();
        let relationships = graph
            .edges
            .list
            .into_iter()
            .filter_map(|edge| edge.properties.relationship_type())
            .collect();
        Self {
            properties,
            relationships,
        }
    }
}

/// Resolves schema resources by querying the graph server.
///
/// Stateless and re-entrant; concurrent calls each issue their own request
/// over the shared client.
#[derive(Clone)]
pub struct SchemaResolver {
    client: GraphQLClient,
}

impl SchemaResolver {
    pub fn new(client: GraphQLClient) -> Self {
        Self { client }
    }

    /// The database's schema introspection document, returned unmodified.
    pub async fn database_schema(&self) -> Result<Value, GraphQLError> {
        self.client.execute(DATABASE_SCHEMA_QUERY, json!({})).await
    }

    /// Whether the named graph has at least one node.
    ///
    /// An absent graph is a normal `false`, not an error; errors are reserved
    /// for transport and protocol failures.
    pub async fn graph_exists(&self, graph_name: &str) -> Result<bool, GraphQLError> {
        let response = self
            .client
            .execute(GRAPH_NODES_QUERY, json!({ "path": graph_name }))
            .await?;
        let response: NodesResponse = serde_json::from_value(response)?;
        Ok(response
            .data
            .and_then(|data| data.graph)
            .is_some_and(|graph| !graph.nodes.list.is_empty()))
    }

    /// Node properties and distinct relationship types of the named graph.
    ///
    /// A graph with no nodes and no edges, or no graph at all, yields an
    /// empty schema rather than an error.
    pub async fn graph_schema(
        &self,
        graph_name: &str,
        include_variants: bool,
    ) -> Result<GraphSchema, GraphQLError> {
        let response = self
            .client
            .execute(
                GRAPH_SCHEMA_QUERY,
                json!({ "path": graph_name, "withVariants": include_variants }),
            )
            .await?;
        let response: SchemaResponse = serde_json::from_value(response)?;
        Ok(response
            .data
            .and_then(|data| data.graph)
            .map(GraphSchema::from)
            .unwrap_or_default())
    }
}

// Wire shapes for the node-list query. Sections the server omits (or nulls
// out for a missing graph) deserialize as empty.

#[derive(Deserialize)]
struct NodesResponse {
    #[serde(default)]
    data: Option<NodesData>,
}

#[derive(Deserialize)]
struct NodesData {
    #[serde(default)]
    graph: Option<NodesPayload>,
}

#[derive(Deserialize)]
struct NodesPayload {
    #[serde(default)]
    nodes: NodeList,
}

#[derive(Default, Deserialize)]
struct NodeList {
    #[serde(default)]
    list: Vec<IgnoredAny>,
}

// Wire shapes for the graph-schema query.

#[derive(Deserialize)]
struct SchemaResponse {
    #[serde(default)]
    data: Option<SchemaData>,
}

#[derive(Deserialize)]
struct SchemaData {
    #[serde(default)]
    graph: Option<GraphPayload>,
}

#[derive(Default, Deserialize)]
struct GraphPayload {
    #[serde(default)]
    schema: NodeSchemas,
    #[serde(default)]
    edges: EdgeList,
}

#[derive(Default, Deserialize)]
struct NodeSchemas {
    #[serde(default)]
    nodes: Vec<NodeSchema>,
}

#[derive(Deserialize)]
struct NodeSchema {
    #[serde(default)]
    properties: Vec<PropertyDescriptor>,
}

#[derive(Default, Deserialize)]
struct EdgeList {
    #[serde(default)]
    list: Vec<Edge>,
}

#[derive(Deserialize)]
struct Edge {
    #[serde(default)]
    properties: EdgeProperties,
}

#[derive(Default, Deserialize)]
struct EdgeProperties {
    #[serde(default)]
    keys: Vec<String>,
    #[serde(default)]
    values: Vec<PropertyValue>,
}

#[derive(Deserialize)]
struct PropertyValue {
    #[serde(default)]
    value: Value,
}

impl EdgeProperties {
    /// The value of the property keyed as the edge's type, if any.
    fn relationship_type(self) -> Option<String> {
        let index = self.keys.iter().position(|key| key == EDGE_TYPE_PROPERTY)?;
        match self.values.into_iter().nth(index)?.value {
            Value::String(value) => Some(value),
            _ => None,
        }
    }
}
