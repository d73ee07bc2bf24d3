//! Shared test utilities for the caption-tree test suite.
//!
//! Provides a terse builder for comment records and assertions over built
//! forests.
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let forest = build_forest(vec![
//!     record(1, 0).votes(10, 0).at(1).build(),
//!     record(2, 1).votes(1, 1).at(2).build(),
//! ]);
//! assert_eq!(ids(&forest.roots), vec![1]);
//! assert_parent_links(&forest.roots);
//! ```

use serde_json::Map;

use crate::forest::build_forest;
use crate::types::{CommentNode, CommentRecord, Datetime, GalleryItem};

// =========================================================================
// Record builder
// =========================================================================

pub struct RecordBuilder {
    record: CommentRecord,
}

/// Start a record with the given id and parent id. Defaults: no votes,
/// timestamp 0, author `user<id>`, caption `comment <id>`.
pub fn record(id: u64, parent_id: u64) -> RecordBuilder {
    RecordBuilder {
        record: CommentRecord {
            id,
            parent_id,
            datetime: Datetime::Epoch(0),
            ups: 0,
            downs: 0,
            caption: format!("comment {id}"),
            author: format!("user{id}"),
            extra: Map::new(),
        },
    }
}

impl RecordBuilder {
    pub fn votes(mut self, ups: i64, downs: i64) -> Self {
        self.record.ups = ups;
        self.record.downs = downs;
        self
    }

    pub fn at(mut self, epoch: i64) -> Self {
        self.record.datetime = Datetime::Epoch(epoch);
        self
    }

    pub fn at_text(mut self, timestamp: &str) -> Self {
        self.record.datetime = Datetime::Text(timestamp.to_string());
        self
    }

    pub fn caption(mut self, caption: &str) -> Self {
        self.record.caption = caption.to_string();
        self
    }

    pub fn author(mut self, author: &str) -> Self {
        self.record.author = author.to_string();
        self
    }

    pub fn build(self) -> CommentRecord {
        self.record
    }
}

// =========================================================================
// Item builders
// =========================================================================

/// An item whose forest is built from `records`.
pub fn item_with(hash: &str, title: &str, records: Vec<CommentRecord>) -> GalleryItem {
    let mut item = GalleryItem::new(hash, title);
    item.children = build_forest(records).roots;
    item
}

// =========================================================================
// Forest assertions
// =========================================================================

/// Ids of `nodes` in order.
pub fn ids(nodes: &[CommentNode]) -> Vec<u64> {
    nodes.iter().map(CommentNode::id).collect()
}

/// Find a node anywhere under `nodes`. Panics if not found.
pub fn find_node(nodes: &[CommentNode], id: u64) -> &CommentNode {
    let mut stack: Vec<&CommentNode> = nodes.iter().collect();
    while let Some(node) = stack.pop() {
        if node.id() == id {
            return node;
        }
        stack.extend(node.children.iter());
    }
    panic!("comment {id} not found in forest")
}

/// Assert that top-level nodes have parent id `0` and every other node's
/// parent id names the node it actually hangs off.
pub fn assert_parent_links(roots: &[CommentNode]) {
    let mut stack: Vec<(u64, &CommentNode)> = roots.iter().map(|n| (0, n)).collect();
    while let Some((expected_parent, node)) = stack.pop() {
        assert_eq!(
            node.record.parent_id,
            expected_parent,
            "comment {} hangs under {expected_parent} but names parent {}",
            node.id(),
            node.record.parent_id
        );
        stack.extend(node.children.iter().map(|c| (node.id(), c)));
    }
}
