//! Comment collection.
//!
//! Stage 1 of the pipeline. Walks the gallery listing page by page (newest
//! first) until `count` items have been collected, fetches each item's
//! comments, and builds the item's comment forest.
//!
//! ## Failure handling
//!
//! Decided purely by where a failure happens:
//!
//! | Failure | Effect |
//! |---------|--------|
//! | gallery page fetch | run aborts with [`CollectError::Gallery`] |
//! | item comments fetch | item skipped, [`CollectEvent::ItemSkipped`] |
//! | comment with unknown parent | subtree dropped, [`CollectEvent::OrphanDropped`] |
//!
//! Nothing is retried.
//!
//! ## Progress
//!
//! Progress and diagnostics are reported as [`CollectEvent`]s through a
//! caller-supplied sink, so the CLI can print them to stderr while the data
//! file goes to stdout.

use crate::forest::attach_comments;
use crate::source::{GallerySource, SourceError};
use crate::types::GalleryItem;
use std::io::Write;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CollectError {
    #[error("error opening gallery page {page}: {source}")]
    Gallery { page: u32, source: SourceError },
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Progress and diagnostics emitted while collecting.
#[derive(Debug, Clone, PartialEq)]
pub enum CollectEvent {
    PageFetched {
        page: u32,
        entries: usize,
    },
    /// About to fetch comments; `remaining` counts this item.
    ItemStarted {
        remaining: usize,
        hash: String,
    },
    ItemSkipped {
        hash: String,
        error: String,
    },
    OrphanDropped {
        hash: String,
        id: u64,
        parent_id: u64,
        lost_descendants: usize,
    },
    ItemBuilt {
        hash: String,
        title: String,
        comments: usize,
    },
    /// The gallery ran out of entries before `count` was reached.
    GalleryExhausted {
        page: u32,
        collected: usize,
    },
}

/// Collect up to `count` items with their comment forests.
///
/// Items come back in gallery order. Fewer than `count` are returned when
/// some items fail or the gallery runs dry.
pub fn collect(
    source: &impl GallerySource,
    count: usize,
    mut on_event: impl FnMut(CollectEvent),
) -> Result<Vec<GalleryItem>, CollectError> {
    let mut items = Vec::new();
    let mut remaining = count;
    let mut page = 0;

    while remaining > 0 {
        let entries = source
            .gallery_page(page)
            .map_err(|source| CollectError::Gallery { page, source })?;
        on_event(CollectEvent::PageFetched {
            page,
            entries: entries.len(),
        });
        if entries.is_empty() {
            on_event(CollectEvent::GalleryExhausted {
                page,
                collected: items.len(),
            });
            break;
        }
        page += 1;

        for mut item in entries {
            if remaining == 0 {
                break;
            }

            on_event(CollectEvent::ItemStarted {
                remaining,
                hash: item.hash.clone(),
            });
            let records = match source.captions(&item.hash) {
                Ok(records) => records,
                Err(e) => {
                    on_event(CollectEvent::ItemSkipped {
                        hash: item.hash.clone(),
                        error: e.to_string(),
                    });
                    continue;
                }
            };

            for orphan in attach_comments(&mut item, records) {
                on_event(CollectEvent::OrphanDropped {
                    hash: item.hash.clone(),
                    id: orphan.id,
                    parent_id: orphan.parent_id,
                    lost_descendants: orphan.lost_descendants,
                });
            }
            on_event(CollectEvent::ItemBuilt {
                hash: item.hash.clone(),
                title: item.title.clone(),
                comments: item.comment_count(),
            });

            items.push(item);
            remaining -= 1;
        }
    }

    Ok(items)
}

/// Serialize collected items as the pretty-printed JSON data file.
pub fn write_items(items: &[GalleryItem], mut writer: impl Write) -> Result<(), CollectError> {
    serde_json::to_writer_pretty(&mut writer, items)?;
    writeln!(writer)?;
    writer.flush()?;
    Ok(())
}
