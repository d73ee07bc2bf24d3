//! Shared types used across both pipeline stages.
//!
//! These types are what the collector writes to the data file and what the
//! renderer reads back, so they must serialize losslessly. Fields the remote
//! API sends that we don't model are kept in `extra` maps and written back
//! out untouched.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One gallery entry and, once the forest is built, its comment tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GalleryItem {
    /// Item identifier; also names the per-item page and the media URLs.
    pub hash: String,
    #[serde(default)]
    pub title: String,
    /// Top-level comments (parent id `0`), in build order.
    #[serde(default)]
    pub children: Vec<CommentNode>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl GalleryItem {
    pub fn new(hash: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            hash: hash.into(),
            title: title.into(),
            children: Vec::new(),
            extra: Map::new(),
        }
    }

    /// Number of comments reachable from this item.
    pub fn comment_count(&self) -> usize {
        self.children.iter().map(CommentNode::subtree_len).sum()
    }
}

/// Comment timestamp. Only ever used for ordering.
///
/// The API has sent both epoch seconds and `YYYY-MM-DD HH:MM:SS` strings over
/// time; both sort correctly within their own kind. Numbers order before text.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Datetime {
    Epoch(i64),
    Text(String),
}

impl Default for Datetime {
    fn default() -> Self {
        Datetime::Epoch(0)
    }
}

impl From<i64> for Datetime {
    fn from(secs: i64) -> Self {
        Datetime::Epoch(secs)
    }
}

/// A flat comment as returned by the per-item endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommentRecord {
    pub id: u64,
    /// `0` attaches the comment to the item itself.
    #[serde(default)]
    pub parent_id: u64,
    #[serde(default)]
    pub datetime: Datetime,
    #[serde(default)]
    pub ups: i64,
    /// Downvote magnitude (already positive; subtracted for points).
    #[serde(default)]
    pub downs: i64,
    #[serde(default)]
    pub caption: String,
    #[serde(default)]
    pub author: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl CommentRecord {
    /// Net points shown next to a comment.
    pub fn points(&self) -> i64 {
        self.ups.saturating_sub(self.downs)
    }
}

/// A scored comment placed in its item's tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommentNode {
    #[serde(flatten)]
    pub record: CommentRecord,
    /// Wilson lower bound, assigned once while building the forest.
    pub score: f64,
    /// Replies in build (chronological) order, not render order.
    #[serde(default)]
    pub children: Vec<CommentNode>,
}

impl CommentNode {
    pub fn id(&self) -> u64 {
        self.record.id
    }

    /// Number of nodes in this subtree, counting `self`.
    pub fn subtree_len(&self) -> usize {
        let mut count = 0;
        let mut stack = vec![self];
        while let Some(node) = stack.pop() {
            count += 1;
            stack.extend(node.children.iter());
        }
        count
    }
}
