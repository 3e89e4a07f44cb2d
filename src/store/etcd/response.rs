//! etcd v2 keys API response types.

use serde::{Deserialize, Serialize};

/// A node in the store's hierarchical namespace.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Node {
    /// Full key path.
    #[serde(default)]
    pub key: String,
    /// Leaf value; absent for directories.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    /// Directory flag.
    #[serde(default)]
    pub dir: bool,
    /// Direct children (present on recursive or directory fetches).
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub nodes: Vec<Node>,
    /// Index of the last modification of this node.
    #[serde(default)]
    pub modified_index: u64,
    /// Index at which this node was created.
    #[serde(default)]
    pub created_index: u64,
}

impl Node {
    /// Create a leaf node.
    pub fn leaf(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: Some(value.into()),
            ..Default::default()
        }
    }

    /// Create a directory node with the given children.
    pub fn dir(key: impl Into<String>, nodes: Vec<Node>) -> Self {
        Self {
            key: key.into(),
            dir: true,
            nodes,
            ..Default::default()
        }
    }

    /// Set the modified index.
    pub fn with_modified_index(mut self, index: u64) -> Self {
        self.modified_index = index;
        self
    }

    /// The value, or the empty string for directories.
    pub fn value_str(&self) -> &str {
        self.value.as_deref().unwrap_or("")
    }
}

/// Response to a keys request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreResponse {
    /// Action that produced the node ("get", "set", "delete", ...).
    #[serde(default)]
    pub action: String,
    /// The node the request addressed.
    #[serde(default)]
    pub node: Option<Node>,
    /// Previous state of the node for mutating events.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prev_node: Option<Node>,
    /// Store index from the `X-Etcd-Index` header.
    #[serde(skip)]
    pub etcd_index: u64,
}

impl StoreResponse {
    /// Create a "get" response for the given node.
    pub fn get(node: Node) -> Self {
        Self {
            action: "get".to_string(),
            node: Some(node),
            ..Default::default()
        }
    }

    /// Create a response for a watch event at the given index.
    pub fn event(action: impl Into<String>, node: Node, etcd_index: u64) -> Self {
        Self {
            action: action.into(),
            node: Some(node),
            prev_node: None,
            etcd_index,
        }
    }

    /// Set the store index.
    pub fn with_etcd_index(mut self, etcd_index: u64) -> Self {
        self.etcd_index = etcd_index;
        self
    }

    /// The change-sequence number this response reports.
    ///
    /// Uses the `X-Etcd-Index` header value, falling back to the node's
    /// modified index when the header was missing.
    ///
    /// On a watch that resumes from history, etcd sets the header to the
    /// index current when the watch was registered, which can be lower than
    /// the event's `modifiedIndex`. The cursor then stays at or below that
    /// event and the next poll returns it again: one extra wake-up per
    /// change, never a missed one.
    pub fn change_index(&self) -> u64 {
        if self.etcd_index > 0 {
            return self.etcd_index;
        }
        self.node.as_ref().map(|n| n.modified_index).unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decode_recursive_get() {
        let body = r#"{
            "action": "get",
            "node": {
                "key": "/services/web",
                "dir": true,
                "nodes": [
                    {"key": "/services/web/a", "value": "10.0.0.1:80", "modifiedIndex": 7, "createdIndex": 7},
                    {"key": "/services/web/b", "value": "10.0.0.2:80", "modifiedIndex": 9, "createdIndex": 9}
                ],
                "modifiedIndex": 3,
                "createdIndex": 3
            }
        }"#;
        let resp: StoreResponse = serde_json::from_str(body).unwrap();
        let node = resp.node.unwrap();
        assert!(node.dir);
        assert_eq!(node.nodes.len(), 2);
        assert_eq!(node.nodes[1].value_str(), "10.0.0.2:80");
        assert_eq!(resp.etcd_index, 0);
    }

    #[test]
    fn change_index_prefers_header() {
        let node = Node::leaf("/a", "x").with_modified_index(10);
        let resp = StoreResponse::event("set", node.clone(), 12);
        assert_eq!(resp.change_index(), 12);

        let resp = StoreResponse::event("set", node, 0);
        assert_eq!(resp.change_index(), 10);
    }

    #[test]
    fn lagging_header_still_wins() {
        let node = Node::leaf("/a", "x").with_modified_index(10);
        let resp = StoreResponse::event("set", node, 7);
        assert_eq!(resp.change_index(), 7);
    }

    #[test]
    fn directory_has_empty_value() {
        assert_eq!(Node::dir("/d", vec![]).value_str(), "");
    }
}
