use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A single search or similarity hit returned by the provider.
///
/// Serialized with camelCase field names so the proxy endpoints emit the
/// wire shape downstream consumers expect.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResult {
    /// Stable identifier; for web results this is typically the source URL.
    pub id: String,
    pub title: String,
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub published_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    /// Provider-supplied relevance score, used only to scale edge thickness.
    pub score: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub favicon: Option<String>,
}

impl SearchResult {
    pub fn new(id: impl Into<String>, title: impl Into<String>, score: f64) -> Self {
        let id = id.into();
        Self {
            url: id.clone(),
            id,
            title: title.into(),
            published_date: None,
            author: None,
            score,
            text: None,
            image: None,
            favicon: None,
        }
    }

    /// Synthesize a record for a graph node the host has not hydrated yet,
    /// so a click on an unknown node can still kick off a similarity lookup.
    pub fn placeholder(node_id: &str) -> Self {
        Self {
            id: node_id.to_string(),
            title: "Loading content...".to_string(),
            url: node_id.to_string(),
            published_date: None,
            author: None,
            score: 0.8,
            text: Some("Loading content...".to_string()),
            image: None,
            favicon: None,
        }
    }
}

/// Merged lookup table over the current search and similarity lists, keyed
/// by result id. Rebuilt wholesale whenever either list changes.
///
/// Search results take precedence on id collision, matching the
/// search-list-first resolution order of node clicks.
#[derive(Debug, Default)]
pub struct NodeIndex {
    by_id: HashMap<String, SearchResult>,
}

impl NodeIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn rebuild(&mut self, search_results: &[SearchResult], similar_results: &[SearchResult]) {
        self.by_id.clear();
        for result in similar_results {
            self.by_id.insert(result.id.clone(), result.clone());
        }
        // Inserted last so search results win collisions.
        for result in search_results {
            self.by_id.insert(result.id.clone(), result.clone());
        }
    }

    pub fn get(&self, node_id: &str) -> Option<&SearchResult> {
        self.by_id.get(node_id)
    }

    /// Resolve a node id to a known result, or synthesize a placeholder.
    pub fn resolve(&self, node_id: &str) -> SearchResult {
        self.by_id
            .get(node_id)
            .cloned()
            .unwrap_or_else(|| SearchResult::placeholder(node_id))
    }

    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }
}
