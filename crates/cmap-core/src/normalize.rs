//! Entity normalization: coerce raw rows into typed, deduplicated sets.
//!
//! Best effort throughout. Nothing here fails and nothing here drops a
//! connection; the graph builder decides what is malformed and says why.

use std::collections::{BTreeSet, HashMap};

use serde::{Deserialize, Serialize};

use crate::constants::{PLACEHOLDER_TITLE, UNNAMED_PERSON};
use crate::entity::{Connection, Dataset, LabelField, Person, Talk, TalkSpeakerLink};

pub const SPEAKER_TAG: &str = "speaker";
pub const RL_ATTENDEE_TAG: &str = "rl attendee";
pub const VIEWER_TAG: &str = "viewer";

/// The tag a renderer keys label and colour decisions on.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Speaker,
    RlAttendee,
    Viewer,
    /// No recognised tag. Rendered with the default tag and colour.
    #[default]
    Unlabeled,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Speaker => SPEAKER_TAG,
            Self::RlAttendee => RL_ATTENDEE_TAG,
            Self::Viewer => VIEWER_TAG,
            Self::Unlabeled => "unlabeled",
        }
    }
}

/// Canonical role-tag set. Trimmed, lower-cased, never contains `""`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleTags(BTreeSet<String>);

impl RoleTags {
    pub fn from_field(field: &LabelField) -> Self {
        match field {
            LabelField::One(tag) => Self::from_iter([tag.as_str()]),
            LabelField::Many(tags) => Self::from_iter(tags.iter().map(String::as_str)),
            // A mixed list keeps its string items.
            LabelField::Unrecognized(serde_json::Value::Array(items)) => {
                Self::from_iter(items.iter().filter_map(serde_json::Value::as_str))
            }
            LabelField::Absent | LabelField::Unrecognized(_) => Self::default(),
        }
    }

    pub fn contains(&self, tag: &str) -> bool {
        self.0.contains(tag)
    }

    pub fn is_speaker(&self) -> bool {
        self.contains(SPEAKER_TAG)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    /// Highest-priority recognised role: speaker, then rl attendee, then viewer.
    pub fn primary_role(&self) -> Role {
        if self.contains(SPEAKER_TAG) {
            Role::Speaker
        } else if self.contains(RL_ATTENDEE_TAG) {
            Role::RlAttendee
        } else if self.contains(VIEWER_TAG) {
            Role::Viewer
        } else {
            Role::Unlabeled
        }
    }
}

impl<'a> FromIterator<&'a str> for RoleTags {
    fn from_iter<I: IntoIterator<Item = &'a str>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|t| t.trim().to_lowercase())
                .filter(|t| !t.is_empty())
                .collect(),
        )
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PersonRecord {
    pub id: String,
    pub full_name: Option<String>,
    pub avatar_url: Option<String>,
    pub roles: RoleTags,
}

impl PersonRecord {
    pub fn display_name(&self) -> &str {
        self.full_name.as_deref().unwrap_or(UNNAMED_PERSON)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TalkRecord {
    pub id: String,
    pub title: String,
    /// True when no talk row was supplied and the title is the placeholder.
    pub placeholder: bool,
}

impl TalkRecord {
    pub fn placeholder(id: &str) -> Self {
        Self {
            id: id.to_string(),
            title: PLACEHOLDER_TITLE.to_string(),
            placeholder: true,
        }
    }
}

/// Which side of a connection is set. Built by the graph builder once the
/// row has passed validation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ConnectionTarget<'a> {
    Talk(&'a str),
    Person(&'a str),
}

/// A connection with blank strings folded into `None`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ConnectionRecord {
    pub id: String,
    pub author_person_id: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub linked_talk_id: Option<String>,
    pub linked_target_person_id: Option<String>,
}

impl ConnectionRecord {
    /// The single target, or `None` when neither or both link fields are set.
    pub fn target(&self) -> Option<ConnectionTarget<'_>> {
        match (&self.linked_talk_id, &self.linked_target_person_id) {
            (Some(talk), None) => Some(ConnectionTarget::Talk(talk)),
            (None, Some(person)) => Some(ConnectionTarget::Person(person)),
            _ => None,
        }
    }
}

/// Output of [`normalize`]: people and talks unique by id in first-seen
/// order, links and connections in input order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct NormalizedEntities {
    pub people: Vec<PersonRecord>,
    pub talks: Vec<TalkRecord>,
    pub links: Vec<TalkSpeakerLink>,
    pub connections: Vec<ConnectionRecord>,
}

impl NormalizedEntities {
    pub fn from_dataset(dataset: &Dataset) -> Self {
        normalize(
            &dataset.people,
            &dataset.talks,
            &dataset.talk_speakers,
            &dataset.connections,
        )
    }

    /// First connection by `author` pointing at `target`.
    pub fn find_connection(
        &self,
        author: &str,
        target: &ConnectionTarget<'_>,
    ) -> Option<&ConnectionRecord> {
        self.connections.iter().find(|c| {
            c.author_person_id.as_deref() == Some(author) && c.target().as_ref() == Some(target)
        })
    }
}

pub fn normalize(
    people: &[Person],
    talks: &[Talk],
    links: &[TalkSpeakerLink],
    connections: &[Connection],
) -> NormalizedEntities {
    let people = dedup_last_wins(
        people.iter().map(|p| PersonRecord {
            id: p.id.clone(),
            full_name: non_blank(&p.full_name),
            avatar_url: non_blank(&p.avatar_url),
            roles: RoleTags::from_field(&p.labels),
        }),
        |p| p.id.clone(),
    );

    let talks = dedup_last_wins(
        talks.iter().map(|t| match non_blank(&t.title) {
            Some(title) => TalkRecord {
                id: t.id.clone(),
                title,
                placeholder: false,
            },
            None => TalkRecord::placeholder(&t.id),
        }),
        |t| t.id.clone(),
    );

    // Blank ids are kept as "" so the builder can report the row.
    let links = links
        .iter()
        .map(|l| TalkSpeakerLink {
            talk_id: l.talk_id.trim().to_string(),
            speaker_person_id: l.speaker_person_id.trim().to_string(),
        })
        .collect();

    let connections = connections
        .iter()
        .map(|c| ConnectionRecord {
            id: c.id.clone(),
            author_person_id: non_blank(&c.author_person_id),
            title: c.title.clone(),
            description: c.description.clone(),
            linked_talk_id: non_blank(&c.linked_talk_id),
            linked_target_person_id: non_blank(&c.linked_target_person_id),
        })
        .collect();

    NormalizedEntities {
        people,
        talks,
        links,
        connections,
    }
}

/// Keep one record per key: the position of the first occurrence, the
/// contents of the last.
fn dedup_last_wins<T>(rows: impl Iterator<Item = T>, key: impl Fn(&T) -> String) -> Vec<T> {
    let mut out: Vec<T> = Vec::new();
    let mut slots: HashMap<String, usize> = HashMap::new();
    for row in rows {
        match slots.get(&key(&row)) {
            Some(&slot) => out[slot] = row,
            None => {
                slots.insert(key(&row), out.len());
                out.push(row);
            }
        }
    }
    out
}

fn non_blank(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}
