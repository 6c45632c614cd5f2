//
//  types.rs
//  MovieGraph
//
//  Created by hak (tharun)
//

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// A cataloged individual from `name.basics.tsv`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Person {
    pub id: String,
    pub primary_name: String,
    pub birth_year: Option<i32>,
    pub death_year: Option<i32>,
    #[serde(default)]
    pub professions: Vec<String>,
    #[serde(default)]
    pub known_for: Vec<String>,
}

/// A cataloged creative work from `title.basics.tsv`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Title {
    pub id: String,
    pub title_type: String,
    pub title: String,
    #[serde(default)]
    pub original_title: String,
    #[serde(default)]
    pub is_adult: bool,
    pub start_year: Option<i32>,
    pub end_year: Option<i32>,
    #[serde(default)]
    pub runtime_minutes: Option<i32>,
    #[serde(default)]
    pub genres: Vec<String>,
}

/// Payload carried by a vertex.
///
/// Serialized as JSON with a `"kind"` discriminant. Payloads whose
/// discriminant is missing or unrecognised decode to `Unknown` and are
/// written back verbatim.
#[derive(Debug, Clone, PartialEq)]
pub enum NodeValue {
    Person(Person),
    Title(Title),
    Unknown(serde_json::Value),
}

impl NodeValue {
    /// Discriminant name as written to snapshots.
    pub fn kind(&self) -> &'static str {
        match self {
            NodeValue::Person(_) => "Person",
            NodeValue::Title(_) => "Title",
            NodeValue::Unknown(_) => "Unknown",
        }
    }

    /// Human-readable label: a person's name or a title's name.
    pub fn label(&self) -> Option<&str> {
        match self {
            NodeValue::Person(p) => Some(&p.primary_name),
            NodeValue::Title(t) => Some(&t.title),
            NodeValue::Unknown(_) => None,
        }
    }
}

#[derive(Serialize)]
#[serde(tag = "kind")]
enum TaggedRef<'a> {
    Person(&'a Person),
    Title(&'a Title),
}

impl Serialize for NodeValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            NodeValue::Person(p) => TaggedRef::Person(p).serialize(serializer),
            NodeValue::Title(t) => TaggedRef::Title(t).serialize(serializer),
            NodeValue::Unknown(raw) => {
                // Would decode back as a typed payload, not as itself.
                if let Some(kind @ ("Person" | "Title")) = raw.get("kind").and_then(|k| k.as_str())
                {
                    return Err(serde::ser::Error::custom(format!(
                        "untyped payload claims reserved kind {:?}",
                        kind
                    )));
                }
                raw.serialize(serializer)
            }
        }
    }
}

impl<'de> Deserialize<'de> for NodeValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        use serde::de::Error;

        let raw = serde_json::Value::deserialize(deserializer)?;
        let kind = raw.get("kind").and_then(|k| k.as_str()).map(str::to_owned);

        match kind.as_deref() {
            Some("Person") => serde_json::from_value(raw)
                .map(NodeValue::Person)
                .map_err(D::Error::custom),
            Some("Title") => serde_json::from_value(raw)
                .map(NodeValue::Title)
                .map_err(D::Error::custom),
            _ => Ok(NodeValue::Unknown(raw)),
        }
    }
}

/// A vertex: unique ID plus payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub id: String,
    pub value: NodeValue,
}

impl Node {
    pub fn new(id: impl Into<String>, value: NodeValue) -> Self {
        Self {
            id: id.into(),
            value,
        }
    }

    pub fn person(person: Person) -> Self {
        Self {
            id: person.id.clone(),
            value: NodeValue::Person(person),
        }
    }

    pub fn title(title: Title) -> Self {
        Self {
            id: title.id.clone(),
            value: NodeValue::Title(title),
        }
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.value.label() {
            Some(label) => write!(f, "{} ({})", self.id, label),
            None => write!(f, "{}", self.id),
        }
    }
}

/// Graph statistics.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphStats {
    pub total_vertices: usize,
    pub persons: usize,
    pub titles: usize,
    pub unknown: usize,
    /// Directed adjacency entries; an undirected link counts twice.
    pub total_edges: usize,
}
