//! Raw input records as supplied by the data-access layer.
//!
//! Field names follow the `people`, `talks`, `talk_speakers` and
//! `connections` tables. Nothing here is validated; see [`crate::normalize`].

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

/// The role-tag column, which arrives as a bare string, a list, `null`, or
/// whatever else a client wrote into it.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LabelField {
    #[default]
    Absent,
    One(String),
    Many(Vec<String>),
    Unrecognized(serde_json::Value),
}

impl LabelField {
    pub fn one(tag: &str) -> Self {
        Self::One(tag.to_string())
    }

    pub fn many(tags: &[&str]) -> Self {
        Self::Many(tags.iter().map(|t| t.to_string()).collect())
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Person {
    pub id: String,
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub avatar_url: Option<String>,
    #[serde(default)]
    pub labels: LabelField,
}

impl Person {
    pub fn new(id: &str, full_name: &str, labels: LabelField) -> Self {
        Self {
            id: id.to_string(),
            full_name: Some(full_name.to_string()),
            avatar_url: None,
            labels,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Talk {
    pub id: String,
    #[serde(default)]
    pub title: Option<String>,
}

impl Talk {
    pub fn new(id: &str, title: &str) -> Self {
        Self {
            id: id.to_string(),
            title: Some(title.to_string()),
        }
    }
}

/// One row of the talk/speaker join table.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TalkSpeakerLink {
    pub talk_id: String,
    pub speaker_person_id: String,
}

impl TalkSpeakerLink {
    pub fn new(talk_id: &str, speaker_person_id: &str) -> Self {
        Self {
            talk_id: talk_id.to_string(),
            speaker_person_id: speaker_person_id.to_string(),
        }
    }
}

/// A user-authored link from a person to either a talk or another person.
///
/// Exactly one of `linked_talk_id` / `linked_target_person_id` should be set.
/// Rows violating that are kept here and rejected by the graph builder.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Connection {
    pub id: String,
    #[serde(default)]
    pub author_person_id: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub linked_talk_id: Option<String>,
    #[serde(default)]
    pub linked_target_person_id: Option<String>,
}

impl Connection {
    pub fn to_talk(id: &str, author: &str, talk_id: &str) -> Self {
        Self {
            id: id.to_string(),
            author_person_id: Some(author.to_string()),
            linked_talk_id: Some(talk_id.to_string()),
            ..Self::default()
        }
    }

    pub fn to_person(id: &str, author: &str, target: &str) -> Self {
        Self {
            id: id.to_string(),
            author_person_id: Some(author.to_string()),
            linked_target_person_id: Some(target.to_string()),
            ..Self::default()
        }
    }
}

/// The four ordered input collections.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Dataset {
    #[serde(default)]
    pub people: Vec<Person>,
    #[serde(default)]
    pub talks: Vec<Talk>,
    #[serde(default, alias = "talkSpeakers")]
    pub talk_speakers: Vec<TalkSpeakerLink>,
    #[serde(default, alias = "ideas")]
    pub connections: Vec<Connection>,
}

impl Dataset {
    /// The slice of the dataset a single author's personal map shows:
    /// their connections, the people and talks those connections touch,
    /// and the speakers of the touched talks.
    ///
    /// Input order is preserved in every collection.
    pub fn authored_by(&self, person_id: &str) -> Dataset {
        let connections: Vec<Connection> = self
            .connections
            .iter()
            .filter(|c| c.author_person_id.as_deref() == Some(person_id))
            .cloned()
            .collect();

        let talk_ids: HashSet<&str> = connections
            .iter()
            .filter_map(|c| c.linked_talk_id.as_deref())
            .collect();

        let talk_speakers: Vec<TalkSpeakerLink> = self
            .talk_speakers
            .iter()
            .filter(|ts| talk_ids.contains(ts.talk_id.as_str()))
            .cloned()
            .collect();

        let mut person_ids: HashSet<&str> = HashSet::new();
        person_ids.insert(person_id);
        person_ids.extend(
            connections
                .iter()
                .filter_map(|c| c.linked_target_person_id.as_deref()),
        );
        person_ids.extend(talk_speakers.iter().map(|ts| ts.speaker_person_id.as_str()));

        Dataset {
            people: self
                .people
                .iter()
                .filter(|p| person_ids.contains(p.id.as_str()))
                .cloned()
                .collect(),
            talks: self
                .talks
                .iter()
                .filter(|t| talk_ids.contains(t.id.as_str()))
                .cloned()
                .collect(),
            talk_speakers,
            connections,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_label_field_shapes() {
        let one: LabelField = serde_json::from_str(r#""speaker""#).unwrap();
        assert_eq!(one, LabelField::one("speaker"));

        let many: LabelField = serde_json::from_str(r#"["speaker", "viewer"]"#).unwrap();
        assert_eq!(many, LabelField::many(&["speaker", "viewer"]));

        let null: LabelField = serde_json::from_str("null").unwrap();
        assert_eq!(null, LabelField::Absent);

        let odd: LabelField = serde_json::from_str("42").unwrap();
        assert!(matches!(odd, LabelField::Unrecognized(_)));
    }

    #[test]
    fn test_person_missing_labels_defaults_absent() {
        let p: Person = serde_json::from_str(r#"{"id": "p1"}"#).unwrap();
        assert_eq!(p.labels, LabelField::Absent);
        assert!(p.full_name.is_none());
    }

    #[test]
    fn test_dataset_aliases() {
        let json = r#"{
            "people": [{"id": "a"}],
            "talkSpeakers": [{"talk_id": "t", "speaker_person_id": "a"}],
            "ideas": [{"id": "c", "author_person_id": "a", "linked_talk_id": "t"}]
        }"#;
        let ds: Dataset = serde_json::from_str(json).unwrap();
        assert_eq!(ds.talk_speakers.len(), 1);
        assert_eq!(ds.connections.len(), 1);
        assert!(ds.talks.is_empty());
    }

    #[test]
    fn test_authored_by_keeps_only_touched_rows() {
        let ds = Dataset {
            people: vec![
                Person::new("me", "Me", LabelField::Absent),
                Person::new("friend", "Friend", LabelField::Absent),
                Person::new("spk", "Speaker", LabelField::one("speaker")),
                Person::new("stranger", "Stranger", LabelField::Absent),
            ],
            talks: vec![Talk::new("t1", "Rust"), Talk::new("t2", "Go")],
            talk_speakers: vec![
                TalkSpeakerLink::new("t1", "spk"),
                TalkSpeakerLink::new("t2", "stranger"),
            ],
            connections: vec![
                Connection::to_talk("c1", "me", "t1"),
                Connection::to_person("c2", "me", "friend"),
                Connection::to_person("c3", "stranger", "me"),
            ],
        };

        let mine = ds.authored_by("me");
        let ids: Vec<&str> = mine.people.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["me", "friend", "spk"]);
        assert_eq!(mine.talks, vec![Talk::new("t1", "Rust")]);
        assert_eq!(mine.talk_speakers, vec![TalkSpeakerLink::new("t1", "spk")]);
        assert_eq!(mine.connections.len(), 2);
    }
}
