//! Graph builder: turn normalized entities into a deduplicated node/edge set.
//!
//! Node order is people (input order), then talks (input order), then any
//! placeholder talks in order of first reference. Edge order is speaker
//! links (input order) followed by connections (input order).

use std::collections::{HashMap, HashSet};
use std::fmt;

use serde::{Deserialize, Serialize, Serializer};

use crate::diagnostic::{ConnectionDefect, Diagnostic, DiagnosticKind};
use crate::entity::TalkSpeakerLink;
use crate::layout::Position;
use crate::normalize::{
    ConnectionRecord, ConnectionTarget, NormalizedEntities, PersonRecord, RL_ATTENDEE_TAG,
    TalkRecord,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
    Person,
    Talk,
}

impl NodeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Person => "person",
            Self::Talk => "talk",
        }
    }
}

/// Composite node id: entity kind plus entity id. Displays as
/// `person-<id>` / `talk-<id>`, so a person and a talk sharing a raw id
/// never collide.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId {
    kind: NodeKind,
    entity: String,
}

impl NodeId {
    pub fn person(id: &str) -> Self {
        Self {
            kind: NodeKind::Person,
            entity: id.to_string(),
        }
    }

    pub fn talk(id: &str) -> Self {
        Self {
            kind: NodeKind::Talk,
            entity: id.to_string(),
        }
    }

    pub fn kind(&self) -> NodeKind {
        self.kind
    }

    /// The raw id of the underlying person or talk.
    pub fn entity(&self) -> &str {
        &self.entity
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.kind.as_str(), self.entity)
    }
}

impl Serialize for NodeId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// The source entity plus associations derived from the link table.
#[derive(Clone, Debug, PartialEq)]
pub enum NodePayload {
    Person {
        record: PersonRecord,
        /// Talk ids this person speaks at, in link order.
        talks: Vec<String>,
    },
    Talk {
        record: TalkRecord,
        /// Speaker person ids, in link order. Only people present in the graph.
        speakers: Vec<String>,
    },
}

#[derive(Clone, Debug, PartialEq)]
pub struct Node {
    pub id: NodeId,
    pub position: Position,
    pub payload: NodePayload,
}

impl Node {
    fn person(record: PersonRecord) -> Self {
        Self {
            id: NodeId::person(&record.id),
            position: Position::default(),
            payload: NodePayload::Person {
                record,
                talks: Vec::new(),
            },
        }
    }

    fn talk(record: TalkRecord) -> Self {
        Self {
            id: NodeId::talk(&record.id),
            position: Position::default(),
            payload: NodePayload::Talk {
                record,
                speakers: Vec::new(),
            },
        }
    }

    pub fn kind(&self) -> NodeKind {
        self.id.kind()
    }

    pub fn label(&self) -> &str {
        match &self.payload {
            NodePayload::Person { record, .. } => record.display_name(),
            NodePayload::Talk { record, .. } => &record.title,
        }
    }

    pub fn person_record(&self) -> Option<&PersonRecord> {
        match &self.payload {
            NodePayload::Person { record, .. } => Some(record),
            NodePayload::Talk { .. } => None,
        }
    }

    pub fn talk_record(&self) -> Option<&TalkRecord> {
        match &self.payload {
            NodePayload::Talk { record, .. } => Some(record),
            NodePayload::Person { .. } => None,
        }
    }

    pub fn is_speaker(&self) -> bool {
        self.person_record().is_some_and(|p| p.roles.is_speaker())
    }

    /// Talk ids for a person node; empty for talks.
    pub fn talks(&self) -> &[String] {
        match &self.payload {
            NodePayload::Person { talks, .. } => talks,
            NodePayload::Talk { .. } => &[],
        }
    }

    /// Speaker ids for a talk node; empty for people.
    pub fn speakers(&self) -> &[String] {
        match &self.payload {
            NodePayload::Talk { speakers, .. } => speakers,
            NodePayload::Person { .. } => &[],
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EdgeKind {
    SpeakerOf,
    ConnectionToTalk,
    ConnectionToPerson,
}

impl EdgeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SpeakerOf => "speaker_of",
            Self::ConnectionToTalk => "connection_to_talk",
            Self::ConnectionToPerson => "connection_to_person",
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Edge {
    pub id: String,
    pub source: NodeId,
    pub target: NodeId,
    pub kind: EdgeKind,
    /// False only for repeat speaker links of an already-linked pair.
    pub primary: bool,
    /// Connection title, when the edge came from one.
    pub label: Option<String>,
}

/// Policy for talk ids referenced without a talk row.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BuildPolicy {
    /// Materialize a placeholder talk node (`true`) or drop the referring
    /// edge with a [`DiagnosticKind::DanglingReference`] (`false`).
    pub synthesize_missing_talks: bool,
}

impl Default for BuildPolicy {
    fn default() -> Self {
        Self {
            synthesize_missing_talks: true,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Graph {
    pub nodes: Vec<Node>,
    pub edges: Vec<Edge>,
    pub skipped: Vec<Diagnostic>,
}

/// Counts for a built graph.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct GraphStats {
    pub people: usize,
    pub speakers: usize,
    pub talks: usize,
    pub placeholder_talks: usize,
    pub primary_speaker_edges: usize,
    pub secondary_speaker_edges: usize,
    pub talk_connections: usize,
    pub person_connections: usize,
    pub diagnostics: usize,
}

impl Graph {
    pub fn node(&self, id: &NodeId) -> Option<&Node> {
        self.nodes.iter().find(|n| &n.id == id)
    }

    pub fn speakers(&self) -> impl Iterator<Item = &Node> {
        self.nodes.iter().filter(|n| n.is_speaker())
    }

    pub fn attendees(&self) -> impl Iterator<Item = &Node> {
        self.nodes
            .iter()
            .filter(|n| n.person_record().is_some_and(|p| p.roles.contains(RL_ATTENDEE_TAG)))
    }

    pub fn talks(&self) -> impl Iterator<Item = &Node> {
        self.nodes.iter().filter(|n| n.kind() == NodeKind::Talk)
    }

    pub fn stats(&self) -> GraphStats {
        let mut stats = GraphStats {
            diagnostics: self.skipped.len(),
            ..GraphStats::default()
        };
        for node in &self.nodes {
            match &node.payload {
                NodePayload::Person { record, .. } => {
                    stats.people += 1;
                    if record.roles.is_speaker() {
                        stats.speakers += 1;
                    }
                }
                NodePayload::Talk { record, .. } => {
                    stats.talks += 1;
                    if record.placeholder {
                        stats.placeholder_talks += 1;
                    }
                }
            }
        }
        for edge in &self.edges {
            match (edge.kind, edge.primary) {
                (EdgeKind::SpeakerOf, true) => stats.primary_speaker_edges += 1,
                (EdgeKind::SpeakerOf, false) => stats.secondary_speaker_edges += 1,
                (EdgeKind::ConnectionToTalk, _) => stats.talk_connections += 1,
                (EdgeKind::ConnectionToPerson, _) => stats.person_connections += 1,
            }
        }
        stats
    }
}

/// Build with the default [`BuildPolicy`].
pub fn build(entities: &NormalizedEntities) -> Graph {
    build_with(entities, BuildPolicy::default())
}

pub fn build_with(entities: &NormalizedEntities, policy: BuildPolicy) -> Graph {
    let mut builder = GraphBuilder::default();

    for person in &entities.people {
        builder.add_node(Node::person(person.clone()));
    }
    for talk in &entities.talks {
        builder.add_node(Node::talk(talk.clone()));
    }

    let mut links: Vec<&TalkSpeakerLink> = Vec::with_capacity(entities.links.len());
    for link in &entities.links {
        if link.talk_id.is_empty() || link.speaker_person_id.is_empty() {
            builder.skipped.push(Diagnostic::new(
                DiagnosticKind::MalformedLink,
                None,
                format!(
                    "blank id in link (talk {:?}, speaker {:?}); link skipped",
                    link.talk_id, link.speaker_person_id
                ),
            ));
        } else {
            links.push(link);
        }
    }

    if policy.synthesize_missing_talks {
        let referenced = links
            .iter()
            .map(|link| link.talk_id.as_str())
            .chain(entities.connections.iter().filter_map(|c| {
                match validate_connection(c) {
                    Ok(ConnectionTarget::Talk(talk_id)) => Some(talk_id),
                    _ => None,
                }
            }));
        for talk_id in referenced {
            if !builder.contains(&NodeId::talk(talk_id)) {
                builder.add_node(Node::talk(TalkRecord::placeholder(talk_id)));
            }
        }
    }

    let mut pair_counts: HashMap<(String, String), usize> = HashMap::new();
    for link in links {
        let speaker = NodeId::person(&link.speaker_person_id);
        let talk = NodeId::talk(&link.talk_id);
        let Some((speaker_idx, talk_idx)) = builder.endpoints(&speaker, &talk, "speaker link")
        else {
            continue;
        };

        let count = pair_counts
            .entry((link.speaker_person_id.clone(), link.talk_id.clone()))
            .or_insert(0);
        *count += 1;
        let primary = *count == 1;

        let base = if primary {
            format!("edge-{speaker}-to-{talk}")
        } else {
            format!("edge-{speaker}-to-{talk}-secondary")
        };
        builder.push_edge(base, speaker, talk, EdgeKind::SpeakerOf, primary, None);

        if primary {
            builder.associate(speaker_idx, talk_idx);
        }
    }

    for connection in &entities.connections {
        let target = match validate_connection(connection) {
            Ok(target) => target,
            Err(diagnostic) => {
                builder.skipped.push(diagnostic);
                continue;
            }
        };
        let Some(author) = connection.author_person_id.as_deref() else {
            continue;
        };
        let source = NodeId::person(author);
        let (target, kind) = match target {
            ConnectionTarget::Talk(id) => (NodeId::talk(id), EdgeKind::ConnectionToTalk),
            ConnectionTarget::Person(id) => (NodeId::person(id), EdgeKind::ConnectionToPerson),
        };
        let what = format!("connection {}", connection.id);
        if builder.endpoints(&source, &target, &what).is_none() {
            continue;
        }
        builder.push_edge(
            format!("edge-connection-{}", connection.id),
            source,
            target,
            kind,
            true,
            connection.title.clone(),
        );
    }

    let graph = builder.finish();
    tracing::debug!(
        "built graph: {} nodes, {} edges, {} skipped",
        graph.nodes.len(),
        graph.edges.len(),
        graph.skipped.len()
    );
    graph
}

/// Check the author and the exactly-one-target rule, and reject
/// self-connections.
fn validate_connection(c: &ConnectionRecord) -> Result<ConnectionTarget<'_>, Diagnostic> {
    let malformed = |defect: ConnectionDefect| {
        Diagnostic::new(
            DiagnosticKind::MalformedConnection(defect),
            Some(c.id.as_str()),
            "connection skipped",
        )
    };

    let Some(author) = c.author_person_id.as_deref() else {
        return Err(malformed(ConnectionDefect::MissingAuthor));
    };
    match (&c.linked_talk_id, &c.linked_target_person_id) {
        (Some(_), Some(_)) => return Err(malformed(ConnectionDefect::BothTargets)),
        (None, None) => return Err(malformed(ConnectionDefect::NoTarget)),
        _ => {}
    }
    match c.target() {
        Some(ConnectionTarget::Person(target)) if target == author => Err(Diagnostic::new(
            DiagnosticKind::SelfConnection,
            Some(c.id.as_str()),
            format!("person {author} connected to themselves; connection skipped"),
        )),
        Some(target) => Ok(target),
        None => Err(malformed(ConnectionDefect::NoTarget)),
    }
}

#[derive(Default)]
struct GraphBuilder {
    nodes: Vec<Node>,
    index: HashMap<NodeId, usize>,
    edges: Vec<Edge>,
    edge_ids: HashSet<String>,
    skipped: Vec<Diagnostic>,
}

impl GraphBuilder {
    fn contains(&self, id: &NodeId) -> bool {
        self.index.contains_key(id)
    }

    fn add_node(&mut self, node: Node) {
        self.index.insert(node.id.clone(), self.nodes.len());
        self.nodes.push(node);
    }

    /// Resolve both endpoints, recording a dangling-reference diagnostic for
    /// each one that is missing.
    fn endpoints(
        &mut self,
        source: &NodeId,
        target: &NodeId,
        what: &str,
    ) -> Option<(usize, usize)> {
        let s = self.index.get(source).copied();
        let t = self.index.get(target).copied();
        for (id, idx) in [(source, s), (target, t)] {
            if idx.is_none() {
                self.skipped.push(Diagnostic::new(
                    DiagnosticKind::DanglingReference,
                    Some(id.to_string().as_str()),
                    format!("{what} references unknown {}; edge dropped", id.kind().as_str()),
                ));
            }
        }
        Some((s?, t?))
    }

    fn push_edge(
        &mut self,
        base: String,
        source: NodeId,
        target: NodeId,
        kind: EdgeKind,
        primary: bool,
        label: Option<String>,
    ) {
        let mut id = base.clone();
        let mut n = 1;
        while self.edge_ids.contains(&id) {
            n += 1;
            id = format!("{base}-{n}");
        }
        self.edge_ids.insert(id.clone());
        self.edges.push(Edge {
            id,
            source,
            target,
            kind,
            primary,
            label,
        });
    }

    /// Record a distinct (speaker, talk) pair on both nodes.
    fn associate(&mut self, speaker_idx: usize, talk_idx: usize) {
        let talk_id = self.nodes[talk_idx].id.entity().to_string();
        let speaker_id = self.nodes[speaker_idx].id.entity().to_string();
        if let NodePayload::Person { talks, .. } = &mut self.nodes[speaker_idx].payload {
            talks.push(talk_id);
        }
        if let NodePayload::Talk { speakers, .. } = &mut self.nodes[talk_idx].payload {
            speakers.push(speaker_id);
        }
    }

    fn finish(self) -> Graph {
        Graph {
            nodes: self.nodes,
            edges: self.edges,
            skipped: self.skipped,
        }
    }
}
