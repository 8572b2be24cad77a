//! Node records returned by the knowledge store

use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

/// A saved knowledge item
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Node {
    pub id: String,
    pub title: Option<String>,
    pub description: Option<String>,
    pub content: Option<String>,
    pub url: Option<String>,
}

/// Node as it comes off the wire; the backend may use `id` or `_id`
#[derive(Debug, Deserialize)]
pub(crate) struct WireNode {
    #[serde(default)]
    id: Option<Value>,
    #[serde(default, rename = "_id")]
    mongo_id: Option<Value>,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    content: Option<String>,
    #[serde(default)]
    url: Option<String>,
}

impl WireNode {
    /// Convert, generating a UUID when the backend sent no usable id
    pub(crate) fn into_node(self) -> Node {
        let id = self
            .id
            .and_then(id_string)
            .or_else(|| self.mongo_id.and_then(id_string))
            .unwrap_or_else(generate_local_id);

        Node {
            id,
            title: self.title,
            description: self.description,
            content: self.content,
            url: self.url,
        }
    }
}

fn id_string(value: Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s),
        Value::Number(n) => Some(n.to_string()),
        // Extended JSON: {"$oid": "..."}
        Value::Object(map) => map
            .get("$oid")
            .and_then(|v| v.as_str())
            .filter(|s| !s.is_empty())
            .map(str::to_string),
        _ => None,
    }
}

pub fn generate_local_id() -> String {
    Uuid::new_v4().to_string()
}

impl Node {
    /// Title, falling back to the URL
    pub fn display_title(&self) -> &str {
        non_empty(&self.title)
            .or_else(|| non_empty(&self.url))
            .unwrap_or("Untitled Node")
    }

    pub fn summary(&self) -> &str {
        non_empty(&self.description)
            .or_else(|| non_empty(&self.content))
            .unwrap_or("No description available")
    }

    /// Case-insensitive substring match on title, description and content
    ///
    /// `needle` must already be lowercase.
    pub fn matches_keyword(&self, needle: &str) -> bool {
        [&self.title, &self.description, &self.content]
            .into_iter()
            .flatten()
            .any(|field| field.to_lowercase().contains(needle))
    }
}

fn non_empty(field: &Option<String>) -> Option<&str> {
    field.as_deref().filter(|s| !s.is_empty())
}
