//! JSON wire format.
//!
//! Input is the four collections as plain rows (see [`Dataset`]). Output is a
//! flat renderer-facing document: nodes carry `x`/`y` and label metadata,
//! edges carry kind and primary flag, diagnostics are display strings.

use serde::Serialize;

use crate::entity::Dataset;
use crate::graph::{Edge, EdgeKind, Node, NodeKind, NodePayload};
use crate::layout::Layout;
use crate::normalize::Role;

#[derive(Serialize, Debug)]
pub struct WireGraph {
    pub nodes: Vec<WireNode>,
    pub edges: Vec<WireEdge>,
    pub diagnostics: Vec<String>,
}

#[derive(Serialize, Debug)]
pub struct WireNode {
    pub id: String,
    pub kind: NodeKind,
    pub x: f64,
    pub y: f64,
    pub label: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
    /// Role tags, empty for talks.
    pub roles: Vec<String>,
    /// The tag a renderer styles a person by.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,
    pub speakers: Vec<String>,
    pub talks: Vec<String>,
    pub placeholder: bool,
}

#[derive(Serialize, Debug)]
pub struct WireEdge {
    pub id: String,
    pub source: String,
    pub target: String,
    pub kind: EdgeKind,
    pub primary: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

impl WireNode {
    fn from_node(node: &Node) -> Self {
        let (roles, role, avatar_url, placeholder) = match &node.payload {
            NodePayload::Person { record, .. } => (
                record.roles.iter().map(str::to_string).collect::<Vec<_>>(),
                Some(record.roles.primary_role()),
                record.avatar_url.clone(),
                false,
            ),
            NodePayload::Talk { record, .. } => (Vec::new(), None, None, record.placeholder),
        };
        Self {
            id: node.id.to_string(),
            kind: node.kind(),
            x: node.position.x,
            y: node.position.y,
            label: node.label().to_string(),
            avatar_url,
            roles,
            role,
            speakers: node.speakers().to_vec(),
            talks: node.talks().to_vec(),
            placeholder,
        }
    }
}

impl WireEdge {
    fn from_edge(edge: &Edge) -> Self {
        Self {
            id: edge.id.clone(),
            source: edge.source.to_string(),
            target: edge.target.to_string(),
            kind: edge.kind,
            primary: edge.primary,
            label: edge.label.clone(),
        }
    }
}

impl WireGraph {
    pub fn from_layout(layout: &Layout, edges: &[Edge]) -> Self {
        Self {
            nodes: layout.nodes.iter().map(WireNode::from_node).collect(),
            edges: edges.iter().map(WireEdge::from_edge).collect(),
            diagnostics: layout.diagnostics.iter().map(|d| d.to_string()).collect(),
        }
    }
}

/// Parse the four input collections from JSON.
pub fn import_dataset(json: &str) -> Result<Dataset, serde_json::Error> {
    serde_json::from_str(json)
}

/// Serialize a positioned graph for a renderer.
pub fn export_layout(layout: &Layout, edges: &[Edge]) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(&WireGraph::from_layout(layout, edges))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::build;
    use crate::grouped::layout_grouped;
    use crate::normalize::NormalizedEntities;

    const SAMPLE: &str = r#"{
        "people": [
            {"id": "s", "full_name": "Sam", "avatar_url": "https://a/s.png", "labels": "speaker"},
            {"id": "v", "full_name": null, "labels": ["viewer", "rl attendee"]},
            {"id": "u"}
        ],
        "talks": [{"id": "t", "title": "Ownership"}],
        "talk_speakers": [{"talk_id": "t", "speaker_person_id": "s"}],
        "connections": [
            {"id": "c1", "title": "Great talk", "author_person_id": "v", "linked_talk_id": "t"},
            {"id": "c2", "author_person_id": "v", "linked_talk_id": "t", "linked_target_person_id": "s"}
        ]
    }"#;

    #[test]
    fn test_import_sample() {
        let ds = import_dataset(SAMPLE).unwrap();
        assert_eq!(ds.people.len(), 3);
        assert_eq!(ds.connections.len(), 2);
    }

    #[test]
    fn test_import_rejects_garbage() {
        assert!(import_dataset("not json").is_err());
        assert!(import_dataset(r#"{"people": 3}"#).is_err());
    }

    #[test]
    fn test_export_shape() {
        let ds = import_dataset(SAMPLE).unwrap();
        let graph = build(&NormalizedEntities::from_dataset(&ds));
        let mut layout = layout_grouped(&graph.nodes, &graph.edges);
        layout.diagnostics = graph.skipped.clone();

        let json = export_layout(&layout, &graph.edges).unwrap();
        let v: serde_json::Value = serde_json::from_str(&json).unwrap();

        let nodes = v["nodes"].as_array().unwrap();
        assert_eq!(nodes.len(), 4);
        assert_eq!(nodes[0]["id"], "person-s");
        assert_eq!(nodes[0]["role"], "speaker");
        assert_eq!(nodes[0]["talks"][0], "t");
        assert_eq!(nodes[1]["label"], "N/A");
        assert_eq!(nodes[1]["role"], "rl_attendee");
        assert_eq!(nodes[2]["role"], "unlabeled");
        assert!(nodes[2].get("avatar_url").is_none());
        assert_eq!(nodes[3]["kind"], "talk");
        assert_eq!(nodes[3]["speakers"][0], "s");
        assert!(nodes[3].get("role").is_none());

        let edges = v["edges"].as_array().unwrap();
        assert_eq!(edges.len(), 2);
        assert_eq!(edges[0]["kind"], "speaker_of");
        assert_eq!(edges[1]["kind"], "connection_to_talk");
        assert_eq!(edges[1]["label"], "Great talk");
        assert_eq!(edges[1]["source"], "person-v");

        let diagnostics = v["diagnostics"].as_array().unwrap();
        assert_eq!(diagnostics.len(), 1);
        assert!(diagnostics[0].as_str().unwrap().contains("c2"));
    }
}
