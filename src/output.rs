//! CLI output formatting for both pipeline stages.
//!
//! # Output Format
//!
//! ## Collect (stderr)
//!
//! ```text
//! Page 0: 60 items
//! [100] Downloading aB3dE
//!     A cat in a box (213 comments)
//! [99] Downloading zz9
//!     Error opening item zz9: HTTP error: ...
//! [98] Downloading Qx7
//!     No parent for comment 5512 (parent 5400), dropped with 2 replies
//!     Another cat (40 comments)
//!
//! Collected 99 items, 253 comments
//! ```
//!
//! ## Render (stdout)
//!
//! ```text
//! 001 A cat in a box (213 comments) → gallery/aB3dE.html
//! 002 Another cat (40 comments) → gallery/Qx7.html
//! Gallery (2 items) → gallery/index.html
//! About → index.html
//!
//! Generated 2 item pages, 1 listing, 1 about page
//! ```
//!
//! # Architecture
//!
//! Each stage has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that does the writing. Format functions
//! are pure: no I/O, no side effects. Collector output goes to stderr because
//! stdout may be carrying the data file.

use crate::collect::CollectEvent;
use crate::render::RenderSummary;
use crate::types::GalleryItem;

/// Longest title shown before truncation.
const TITLE_WIDTH: usize = 60;

// ============================================================================
// Shared display helpers
// ============================================================================

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

/// Truncate text to `max` characters, appending `...` if truncated.
fn truncate_title(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        text.to_string()
    } else {
        let cut: String = text.chars().take(max).collect();
        format!("{}...", cut)
    }
}

fn plural(n: usize, one: &str, many: &str) -> String {
    if n == 1 {
        format!("{} {}", n, one)
    } else {
        format!("{} {}", n, many)
    }
}

/// `Title (N comments)`, with an untitled fallback.
fn item_line(title: &str, comments: usize) -> String {
    let title = if title.trim().is_empty() {
        "(untitled)".to_string()
    } else {
        truncate_title(title, TITLE_WIDTH)
    };
    format!("{} ({})", title, plural(comments, "comment", "comments"))
}

// ============================================================================
// Stage 1: Collect output
// ============================================================================

/// Format a single collector event as display lines.
pub fn format_collect_event(event: &CollectEvent) -> Vec<String> {
    match event {
        CollectEvent::PageFetched { page, entries } => {
            vec![format!("Page {}: {}", page, plural(*entries, "item", "items"))]
        }
        CollectEvent::ItemStarted { remaining, hash } => {
            vec![format!("[{}] Downloading {}", remaining, hash)]
        }
        CollectEvent::ItemSkipped { hash, error } => {
            vec![format!("    Error opening item {}: {}", hash, error)]
        }
        CollectEvent::OrphanDropped {
            id,
            parent_id,
            lost_descendants,
            ..
        } => {
            let mut line = format!("    No parent for comment {} (parent {})", id, parent_id);
            if *lost_descendants > 0 {
                line.push_str(&format!(
                    ", dropped with {}",
                    plural(*lost_descendants, "reply", "replies")
                ));
            }
            vec![line]
        }
        CollectEvent::ItemBuilt {
            title, comments, ..
        } => vec![format!("    {}", item_line(title, *comments))],
        CollectEvent::GalleryExhausted { page, collected } => vec![format!(
            "Gallery ended at page {} after {}",
            page,
            plural(*collected, "item", "items")
        )],
    }
}

/// Print a collector event to stderr.
pub fn print_collect_event(event: &CollectEvent) {
    for line in format_collect_event(event) {
        eprintln!("{}", line);
    }
}

/// Format the closing summary of a collect run.
pub fn format_collect_summary(items: &[GalleryItem]) -> Vec<String> {
    let comments: usize = items.iter().map(GalleryItem::comment_count).sum();
    vec![
        String::new(),
        format!(
            "Collected {}, {}",
            plural(items.len(), "item", "items"),
            plural(comments, "comment", "comments")
        ),
    ]
}

/// Print the collect summary to stderr.
pub fn print_collect_summary(items: &[GalleryItem]) {
    for line in format_collect_summary(items) {
        eprintln!("{}", line);
    }
}

// ============================================================================
// Stage 2: Render output
// ============================================================================

/// Format render stage output showing generated documents.
pub fn format_render_output(summary: &RenderSummary) -> Vec<String> {
    let mut lines = Vec::new();

    for (idx, page) in summary.item_pages.iter().enumerate() {
        lines.push(format!(
            "{} {} \u{2192} {}",
            format_index(idx + 1),
            item_line(&page.title, page.comments),
            page.path
        ));
    }

    for hash in &summary.skipped {
        lines.push(format!("Skipped item {:?}: not usable as a file name", hash));
    }

    if let Some(listing) = &summary.listing {
        lines.push(format!(
            "Gallery ({}) \u{2192} {}",
            plural(summary.listed, "item", "items"),
            listing
        ));
    }

    match (&summary.about, &summary.missing_about_fragment) {
        (Some(about), _) => lines.push(format!("About \u{2192} {}", about)),
        (None, Some(fragment)) => lines.push(format!(
            "About page skipped: {} not found",
            fragment.display()
        )),
        (None, None) => {}
    }

    for asset in &summary.assets_written {
        lines.push(format!("Asset \u{2192} {}", asset));
    }

    lines.push(String::new());
    lines.push(format!(
        "Generated {}, {}, {}",
        plural(summary.item_pages.len(), "item page", "item pages"),
        plural(usize::from(summary.listing.is_some()), "listing", "listings"),
        plural(usize::from(summary.about.is_some()), "about page", "about pages"),
    ));

    lines
}

/// Print render output to stdout.
pub fn print_render_output(summary: &RenderSummary) {
    for line in format_render_output(summary) {
        println!("{}", line);
    }
}

// ============================================================================
// Tests
// ============================================================================
