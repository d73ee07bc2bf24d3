//! Comment forest reconstruction.
//!
//! The per-item endpoint returns comments as a flat list where each record
//! names its parent by id (`0` for the item itself). This module turns that
//! list into a nested tree in a single pass.
//!
//! ## Ordering
//!
//! Records are linked in ascending `datetime` order (stable, so equal
//! timestamps keep their input order). A reply can't be written before the
//! comment it answers, so in that order every parent is already known when
//! its children arrive. Nothing else guarantees it.
//!
//! ## Arena
//!
//! Nodes live in one `Vec` in processing order and refer to their children by
//! index. The id lookup maps to [`Slot`]s, never to live nodes, so the pass
//! needs no shared mutable references. Once linking is done the arena is
//! folded into owned [`CommentNode`] trees back to front: a child is always
//! processed after its parent, so its index is larger and its subtree is
//! already complete when the parent collects it.
//!
//! ## Orphans
//!
//! A record whose parent id isn't registered yet is an orphan. It is reported,
//! left unattached, and still registered under its own id. Later replies to
//! it attach normally, but since the orphan itself hangs off nothing, its
//! whole subtree is dropped from the item. Each orphan yields one
//! [`Orphan`] report, which counts the descendants lost with it.

use crate::score::score;
use crate::types::{CommentNode, CommentRecord, GalleryItem};
use std::collections::HashMap;

/// Where an id in the lookup table points.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Slot {
    Root,
    Node(usize),
}

/// A comment dropped because its parent was unknown when it was processed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Orphan {
    pub id: u64,
    pub parent_id: u64,
    /// Replies (at any depth) that were attached beneath the orphan and are
    /// dropped along with it.
    pub lost_descendants: usize,
}

/// Result of linking one item's comments.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Forest {
    /// Top-level comments in build order.
    pub roots: Vec<CommentNode>,
    /// Orphans in processing order.
    pub orphans: Vec<Orphan>,
}

impl Forest {
    /// Total nodes reachable from the roots.
    pub fn len(&self) -> usize {
        self.roots.iter().map(CommentNode::subtree_len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }
}

/// Score and link a flat comment list into a forest.
pub fn build_forest(mut records: Vec<CommentRecord>) -> Forest {
    // sort_by is stable: equal timestamps keep input order
    records.sort_by(|a, b| a.datetime.cmp(&b.datetime));

    let mut arena: Vec<(CommentNode, Vec<usize>)> = Vec::with_capacity(records.len());
    let mut lookup: HashMap<u64, Slot> = HashMap::with_capacity(records.len() + 1);
    lookup.insert(0, Slot::Root);
    let mut root_children = Vec::new();
    let mut orphan_indices = Vec::new();

    for record in records {
        let index = arena.len();
        let id = record.id;
        let parent_id = record.parent_id;
        let node = CommentNode {
            score: score(record.ups, record.downs),
            record,
            children: Vec::new(),
        };
        arena.push((node, Vec::new()));

        match lookup.get(&parent_id) {
            Some(Slot::Root) => root_children.push(index),
            Some(Slot::Node(parent)) => arena[*parent].1.push(index),
            None => orphan_indices.push(index),
        }
        lookup.insert(id, Slot::Node(index));
    }

    let mut built = materialize(arena);

    let orphans = orphan_indices
        .into_iter()
        .filter_map(|index| built[index].take())
        .map(|node| Orphan {
            id: node.record.id,
            parent_id: node.record.parent_id,
            lost_descendants: node.subtree_len() - 1,
        })
        .collect();

    let roots = root_children
        .into_iter()
        .filter_map(|index| built[index].take())
        .collect();

    Forest { roots, orphans }
}

/// Fold the arena into owned subtrees, children first.
///
/// Returns one slot per arena index; a slot is `Some` only if its node was
/// never claimed as somebody's child, i.e. it is a root or an orphan.
fn materialize(arena: Vec<(CommentNode, Vec<usize>)>) -> Vec<Option<CommentNode>> {
    let mut built: Vec<Option<CommentNode>> = Vec::with_capacity(arena.len());
    let mut pending: Vec<Vec<usize>> = Vec::with_capacity(arena.len());
    for (node, children) in arena {
        built.push(Some(node));
        pending.push(children);
    }

    for index in (0..built.len()).rev() {
        let children: Vec<CommentNode> = pending[index]
            .iter()
            .filter_map(|&child| built[child].take())
            .collect();
        if let Some(node) = built[index].as_mut() {
            node.children = children;
        }
    }
    built
}

/// Build `item`'s forest from its raw comments, replacing any existing
/// children. Returns the orphans for the caller to report.
pub fn attach_comments(item: &mut GalleryItem, records: Vec<CommentRecord>) -> Vec<Orphan> {
    let forest = build_forest(records);
    item.children = forest.roots;
    forest.orphans
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::*;

    #[test]
    fn empty_input_builds_empty_forest() {
        let forest = build_forest(Vec::new());
        assert!(forest.is_empty());
        assert!(forest.orphans.is_empty());
    }

    #[test]
    fn end_to_end_example() {
        let forest = build_forest(vec![
            record(1, 0).votes(10, 0).at(1).build(),
            record(2, 1).votes(1, 1).at(2).build(),
            record(3, 0).votes(2, 0).at(3).build(),
        ]);

        assert_eq!(ids(&forest.roots), vec![1, 3]);
        assert_eq!(ids(&forest.roots[0].children), vec![2]);
        assert!(forest.roots[1].children.is_empty());
        assert!(forest.roots[0].score > forest.roots[1].score);
        assert!(forest.orphans.is_empty());
    }

    #[test]
    fn every_record_is_scored() {
        let forest = build_forest(vec![
            record(1, 0).votes(10, 2).at(1).build(),
            record(2, 1).votes(0, 0).at(2).build(),
        ]);
        assert_eq!(forest.roots[0].score, score(10, 2));
        assert_eq!(forest.roots[0].children[0].score, 0.0);
    }

    #[test]
    fn input_order_does_not_matter_when_timestamps_do() {
        // Reply listed before its parent, but authored after it.
        let forest = build_forest(vec![
            record(2, 1).at(20).build(),
            record(1, 0).at(10).build(),
        ]);
        assert_eq!(ids(&forest.roots), vec![1]);
        assert_eq!(ids(&forest.roots[0].children), vec![2]);
    }

    #[test]
    fn equal_timestamps_keep_input_order() {
        let forest = build_forest(vec![
            record(5, 0).at(1).build(),
            record(3, 0).at(1).build(),
            record(4, 0).at(1).build(),
        ]);
        assert_eq!(ids(&forest.roots), vec![5, 3, 4]);
    }

    #[test]
    fn well_ordered_input_keeps_every_node() {
        let records = vec![
            record(1, 0).at(1).build(),
            record(2, 1).at(2).build(),
            record(3, 2).at(3).build(),
            record(4, 1).at(4).build(),
            record(5, 0).at(5).build(),
            record(6, 5).at(6).build(),
            record(7, 3).at(7).build(),
        ];
        let count = records.len();
        let forest = build_forest(records);

        assert_eq!(forest.len(), count);
        assert!(forest.orphans.is_empty());
        assert_parent_links(&forest.roots);
        assert_eq!(ids(&find_node(&forest.roots, 1).children), vec![2, 4]);
        assert_eq!(ids(&find_node(&forest.roots, 3).children), vec![7]);
    }

    #[test]
    fn text_timestamps_sort_chronologically() {
        let forest = build_forest(vec![
            record(2, 1).at_text("2012-10-11 08:00:00").build(),
            record(1, 0).at_text("2012-10-10 23:59:59").build(),
        ]);
        assert_eq!(ids(&forest.roots), vec![1]);
        assert_eq!(ids(&forest.roots[0].children), vec![2]);
    }

    #[test]
    fn orphan_subtree_is_dropped_with_one_report() {
        let forest = build_forest(vec![
            record(1, 0).at(1).build(),
            record(10, 999).at(2).build(),
            record(11, 10).at(3).build(),
        ]);

        assert_eq!(ids(&forest.roots), vec![1]);
        assert_eq!(forest.len(), 1);
        assert_eq!(
            forest.orphans,
            vec![Orphan {
                id: 10,
                parent_id: 999,
                lost_descendants: 1,
            }]
        );
    }

    #[test]
    fn orphan_report_counts_deep_descendants() {
        let forest = build_forest(vec![
            record(10, 42).at(1).build(),
            record(11, 10).at(2).build(),
            record(12, 11).at(3).build(),
            record(13, 10).at(4).build(),
        ]);
        assert!(forest.roots.is_empty());
        assert_eq!(forest.orphans.len(), 1);
        assert_eq!(forest.orphans[0].lost_descendants, 3);
    }

    #[test]
    fn reply_older_than_parent_is_orphaned() {
        let forest = build_forest(vec![
            record(1, 0).at(10).build(),
            record(2, 1).at(5).build(),
        ]);
        assert_eq!(ids(&forest.roots), vec![1]);
        assert!(forest.roots[0].children.is_empty());
        assert_eq!(forest.orphans.len(), 1);
        assert_eq!(forest.orphans[0].id, 2);
        assert_eq!(forest.orphans[0].lost_descendants, 0);
    }

    #[test]
    fn top_level_only_holds_parent_zero() {
        let forest = build_forest(vec![
            record(1, 0).at(1).build(),
            record(2, 1).at(2).build(),
            record(3, 0).at(3).build(),
            record(4, 3).at(4).build(),
        ]);
        assert!(forest.roots.iter().all(|n| n.record.parent_id == 0));
    }

    #[test]
    fn attach_comments_replaces_children() {
        let mut item = GalleryItem::new("abc", "Title");
        item.children = build_forest(vec![record(9, 0).at(1).build()]).roots;

        let orphans = attach_comments(
            &mut item,
            vec![record(1, 0).at(1).build(), record(2, 7).at(2).build()],
        );

        assert_eq!(ids(&item.children), vec![1]);
        assert_eq!(orphans.len(), 1);
        assert_eq!(item.comment_count(), 1);
    }

    #[test]
    fn deep_chain_does_not_recurse() {
        let depth = 50_000;
        let records = (1..=depth)
            .map(|id| record(id, id - 1).at(id as i64).build())
            .collect();
        let forest = build_forest(records);

        assert_eq!(forest.roots.len(), 1);
        assert_eq!(forest.len(), depth as usize);

        // Unwind iteratively so dropping the chain doesn't overflow either.
        let mut next = forest.roots;
        while let Some(mut node) = next.pop() {
            next = std::mem::take(&mut node.children);
        }
    }
}
