//! # caption-tree
//!
//! Collects the newest items of an image gallery together with their comment
//! threads, ranks every comment, and renders each thread as a nested static
//! HTML page sorted best-first.
//!
//! # Architecture: Two-Stage Pipeline
//!
//! ```text
//! 1. Collect   gallery API  →  items.json   (fetch, rank, rebuild threads)
//! 2. Render    items.json   →  out/         (static HTML)
//! ```
//!
//! The stages only share the JSON data file. It holds the full comment trees
//! with scores already computed, so rendering never touches the network and
//! can be rerun (with different templates or config) as often as needed.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`score`] | Wilson lower-bound ranking score |
//! | [`forest`] | Flat parent-referencing comment list → nested tree |
//! | [`collect`] | Stage 1: pages through the gallery, builds each item's forest |
//! | [`source`] | The gallery API seam and its blocking HTTP implementation |
//! | [`render`] | Stage 2: item pages, listing and about page using Maud |
//! | [`config`] | `config.toml` loading, merging and validation |
//! | [`types`] | Items and comments as stored in the data file |
//! | [`output`] | CLI output formatting for both stages |
//!
//! # Design Decisions
//!
//! ## Wilson Lower Bound Over Net Points
//!
//! Sorting by `ups - downs` buries new comments under old ones, and sorting by
//! `ups / (ups + downs)` lets a single upvote beat a thousand. The lower bound
//! of the Wilson interval rewards ratios only as far as the sample supports
//! them. See [`score`].
//!
//! ## Arena Reconstruction
//!
//! Comments arrive flat with a parent id. [`forest`] links them in timestamp
//! order through an id → arena-index table, then folds the arena into owned
//! trees. Comments whose parent is unknown are reported and dropped with
//! their replies rather than failing the item.
//!
//! ## Failures Decided By Where They Happen
//!
//! A gallery page that can't be fetched aborts the run; an item whose
//! comments can't be fetched is skipped; a comment with a missing parent is
//! dropped with a warning. There are no retries.

pub mod collect;
pub mod config;
pub mod forest;
pub mod output;
pub mod render;
pub mod score;
pub mod source;
pub mod types;

#[cfg(test)]
pub(crate) mod test_helpers;
