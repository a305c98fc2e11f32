use serde::{Deserialize, Serialize};
use std::fmt;

/// Unique identifier of a knowledge fragment in the external index
///
/// Fragment ids participate in deterministic tie-breaking, so they are a
/// real type rather than a bare string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FragmentId(String);

impl FragmentId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for FragmentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for FragmentId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for FragmentId {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

/// Metadata tags attached to a fragment by the ingestion pipeline
///
/// The vocabulary mirrors what the knowledge index stores per chunk.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FragmentTags {
    pub strategy_type: Option<String>,
    pub timeframe: Option<String>,
    #[serde(default)]
    pub market_conditions: Vec<String>,
    #[serde(default)]
    pub asset_class: Vec<String>,
    #[serde(default)]
    pub key_concepts: Vec<String>,
    pub document_type: Option<String>,
    pub author: Option<String>,
}

/// A chunk of trading-knowledge text owned by the external index
///
/// The core only reads and ranks references to fragments, never mutates
/// them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KnowledgeFragment {
    pub id: FragmentId,
    pub text: String,
    pub source_title: String,
    pub chapter: Option<String>,
    pub page: Option<u32>,
    #[serde(default)]
    pub tags: FragmentTags,
}

/// A fragment together with its fused retrieval score
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedFragment {
    pub fragment: KnowledgeFragment,
    pub score: f64,
}

/// Ordered retrieval output: deduplicated by fragment id, fused score
/// non-increasing along the sequence
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RetrievalResult {
    pub hits: Vec<RankedFragment>,
}

impl RetrievalResult {
    pub fn empty() -> Self {
        Self { hits: Vec::new() }
    }

    pub fn is_empty(&self) -> bool {
        self.hits.is_empty()
    }

    pub fn len(&self) -> usize {
        self.hits.len()
    }

    /// Iterate over the fragments in fused-rank order
    pub fn fragments(&self) -> impl Iterator<Item = &KnowledgeFragment> {
        self.hits.iter().map(|hit| &hit.fragment)
    }

    /// Look up a retrieved fragment by id
    pub fn get(&self, id: &FragmentId) -> Option<&KnowledgeFragment> {
        self.fragments().find(|fragment| &fragment.id == id)
    }
}
