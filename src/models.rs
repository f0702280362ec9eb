// Core data structures for tripdesk

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;

/// Numeric identifier of a WordPress content item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContentId(pub u64);

impl fmt::Display for ContentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for ContentId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse::<u64>().map(Self)
    }
}

/// Which side of a relation the caller considers newly introduced
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RelationContext {
    /// Adding new children to a parent
    Child,
    /// Attaching an existing child to a parent
    Parent,
}

impl RelationContext {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Child => "child",
            Self::Parent => "parent",
        }
    }
}

impl fmt::Display for RelationContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A parent/child link
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Relation {
    pub parent_id: ContentId,
    pub child_id: ContentId,
    pub context: RelationContext,
}

impl Relation {
    pub fn new(parent_id: ContentId, child_id: ContentId, context: RelationContext) -> Self {
        Self {
            parent_id,
            child_id,
            context,
        }
    }

    /// JSON body for the relation endpoint
    pub fn payload(&self) -> RelationPayload {
        RelationPayload {
            parent_id: self.parent_id,
            child_id: self.child_id,
            context: self.context,
            store_items_type: "update",
        }
    }
}

/// Wire format of a relation creation request
#[derive(Debug, Clone, Serialize)]
pub struct RelationPayload {
    pub parent_id: ContentId,
    pub child_id: ContentId,
    pub context: RelationContext,
    pub store_items_type: &'static str,
}

/// One entry returned by `children/{parent_id}`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChildRecord {
    /// Integer or numeric string depending on plugin version
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub child_object_id: Option<Value>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ChildRecord {
    /// Child identifier, if present and numeric
    pub fn child_id(&self) -> Option<ContentId> {
        match self.child_object_id.as_ref()? {
            Value::Number(n) => n.as_u64().map(ContentId),
            Value::String(s) => s.parse().ok(),
            _ => None,
        }
    }
}

/// Harvested search result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    pub keyword: String,
    pub title: String,
    pub link: String,
    /// 1-based position on the results page
    pub rank: usize,
    pub scraped_at: DateTime<Utc>,
}

impl SearchResult {
    pub fn new(keyword: &str, title: &str, link: &str, rank: usize) -> Self {
        Self {
            keyword: keyword.to_string(),
            title: title.to_string(),
            link: link.to_string(),
            rank,
            scraped_at: Utc::now(),
        }
    }
}

impl From<&SearchResult> for SearchResult {
    fn from(result: &SearchResult) -> Self {
        result.clone()
    }
}

/// Minimal sink row: when a URL was seen
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UrlRow {
    pub timestamp: DateTime<Utc>,
    pub url: String,
}

impl From<&SearchResult> for UrlRow {
    fn from(result: &SearchResult) -> Self {
        Self {
            timestamp: result.scraped_at,
            url: result.link.clone(),
        }
    }
}

/// WordPress title field: `{"rendered": ".."}` on reads, plain on some plugins
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Title {
    Rendered { rendered: String },
    Plain(String),
}

impl Title {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Rendered { rendered } => rendered,
            Self::Plain(s) => s,
        }
    }
}

/// A WordPress REST content item
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentRecord {
    pub id: ContentId,

    #[serde(default)]
    pub status: Option<String>,

    #[serde(default)]
    pub link: Option<String>,

    #[serde(default)]
    pub title: Option<Title>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ContentRecord {
    pub fn title_text(&self) -> &str {
        self.title.as_ref().map(Title::as_str).unwrap_or_default()
    }
}

/// Body of a content creation request
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewContent {
    pub title: String,
    pub status: String,

    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl NewContent {
    pub fn new(title: impl Into<String>, status: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            status: status.into(),
            fields: Map::new(),
        }
    }

    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(key.into(), value.into());
        self
    }
}

/// Outcome of one relation call inside a batch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelationOutcome {
    pub child_id: ContentId,
    /// `Err` holds the message shown to the operator
    pub result: Result<(), String>,
}

impl RelationOutcome {
    pub fn is_ok(&self) -> bool {
        self.result.is_ok()
    }
}

/// Per-item results of a bulk relation action
///
/// Calls that succeeded before a failure are not rolled back; the report
/// keeps both sides so the operator can see what actually persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchReport {
    pub parent_id: ContentId,
    pub outcomes: Vec<RelationOutcome>,
}

impl BatchReport {
    pub fn new(parent_id: ContentId) -> Self {
        Self {
            parent_id,
            outcomes: Vec::new(),
        }
    }

    pub fn push(&mut self, child_id: ContentId, result: Result<(), String>) {
        self.outcomes.push(RelationOutcome { child_id, result });
    }

    /// Logical AND of every call; an empty batch counts as success
    pub fn all_succeeded(&self) -> bool {
        self.outcomes.iter().all(RelationOutcome::is_ok)
    }

    pub fn succeeded(&self) -> Vec<ContentId> {
        self.outcomes
            .iter()
            .filter(|o| o.is_ok())
            .map(|o| o.child_id)
            .collect()
    }

    pub fn failed(&self) -> Vec<(ContentId, &str)> {
        self.outcomes
            .iter()
            .filter_map(|o| match &o.result {
                Ok(()) => None,
                Err(msg) => Some((o.child_id, msg.as_str())),
            })
            .collect()
    }

    /// One-line summary, e.g. `added 886, 887 to 671`
    pub fn summary(&self) -> String {
        if self.all_succeeded() {
            return format!(
                "added {} to {}",
                join_ids(&self.succeeded()),
                self.parent_id
            );
        }

        let failed: Vec<ContentId> = self.failed().into_iter().map(|(id, _)| id).collect();
        let succeeded = self.succeeded();
        if succeeded.is_empty() {
            format!("failed to add {} to {}", join_ids(&failed), self.parent_id)
        } else {
            format!(
                "failed to add {} to {} (already added: {})",
                join_ids(&failed),
                self.parent_id,
                join_ids(&succeeded)
            )
        }
    }
}

fn join_ids(ids: &[ContentId]) -> String {
    ids.iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}
