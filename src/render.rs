//! HTML rendering.
//!
//! Stage 2 of the pipeline. Reads the data file written by the collector and
//! renders the static site.
//!
//! ## Generated Pages
//!
//! - **Item pages** (`gallery/<hash>.html`): the image, prev/next links and the
//!   full comment tree, every sibling list sorted by score.
//! - **Listing** (`gallery/index.html`): one thumbnail per item, in data-file
//!   order.
//! - **About page** (`index.html`): the site's about fragment in the page frame.
//!
//! ## Output Structure
//!
//! ```text
//! out/
//! ├── index.html          # About page
//! ├── style.css           # Written only if missing
//! ├── script.js           # Written only if missing
//! └── gallery/
//!     ├── index.html      # Listing
//!     ├── aB3dE.html      # One page per item
//!     └── ...
//! ```
//!
//! ## Comment Markup
//!
//! ```text
//! div.cap-wrapper
//! ├── div.cap-body #cap_<id> [data-points, data-score]
//! │   ├── div.cap-head    [+]? author points (ups downs) score link
//! │   └── div.cap-text    caption, embedded as-is
//! └── div.cap-children    always present, possibly empty
//! ```
//!
//! Captions are already HTML as delivered by the API and are embedded without
//! escaping. Everything else goes through maud's escaping.

use crate::config::{LinksConfig, SiteConfig};
use crate::types::{CommentNode, GalleryItem};
use maud::{DOCTYPE, Markup, PreEscaped, html};
use pulldown_cmark::{Parser, html as md_html};
use serde::Deserialize;
use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RenderError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("error loading the data file: {0}")]
    Data(#[from] serde_json::Error),
}

const STYLE_CSS: &str = include_str!("../static/style.css");
const SCRIPT_JS: &str = include_str!("../static/script.js");

/// Folder holding item pages and the listing, relative to the output root.
pub const GALLERY_DIR: &str = "gallery";

/// Which documents to produce. The about page is always written.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderOptions {
    pub item_pages: bool,
    pub listing: bool,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            item_pages: true,
            listing: true,
        }
    }
}

impl RenderOptions {
    /// Whether the data file is needed at all.
    pub fn needs_items(&self) -> bool {
        self.item_pages || self.listing
    }
}

/// What [`render`] wrote, for CLI output.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RenderSummary {
    pub item_pages: Vec<RenderedItem>,
    /// Listing path relative to the output root, if written.
    pub listing: Option<String>,
    /// Number of items linked from the listing.
    pub listed: usize,
    /// About page path, or `None` when the fragment was missing.
    pub about: Option<String>,
    pub missing_about_fragment: Option<PathBuf>,
    /// Items whose hash can't be used as a file name.
    pub skipped: Vec<String>,
    /// Static assets written because they were absent.
    pub assets_written: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RenderedItem {
    pub path: String,
    pub title: String,
    pub comments: usize,
}

/// Shared page frame: config plus the optional suffix fragment.
pub struct Site<'a> {
    pub config: &'a SiteConfig,
    pub page_suffix: String,
}

impl<'a> Site<'a> {
    /// Site without a page suffix.
    pub fn new(config: &'a SiteConfig) -> Self {
        Self {
            config,
            page_suffix: String::new(),
        }
    }

    /// Site whose page suffix is read from `site_dir`. A missing suffix file
    /// means no suffix.
    pub fn load(config: &'a SiteConfig, site_dir: &Path) -> Result<Self, RenderError> {
        let suffix_path = site_dir.join(&config.assets.page_suffix);
        let page_suffix = if suffix_path.is_file() {
            fs::read_to_string(suffix_path)?
        } else {
            String::new()
        };
        Ok(Self {
            config,
            page_suffix,
        })
    }
}

/// Parse the data file.
///
/// Every reply level nests two JSON values deeper, so serde_json's default
/// depth limit is lifted and the stack grows on demand instead.
pub fn read_items(mut reader: impl Read) -> Result<Vec<GalleryItem>, RenderError> {
    let mut content = String::new();
    reader.read_to_string(&mut content)?;

    let mut json = serde_json::Deserializer::from_str(&content);
    json.disable_recursion_limit();
    let items = Vec::<GalleryItem>::deserialize(serde_stacker::Deserializer::new(&mut json))?;
    json.end()?;
    Ok(items)
}

/// Write every requested document for `items` under `output_dir`.
pub fn render(
    items: &[GalleryItem],
    config: &SiteConfig,
    site_dir: &Path,
    output_dir: &Path,
    options: RenderOptions,
) -> Result<RenderSummary, RenderError> {
    let site = Site::load(config, site_dir)?;
    let mut summary = RenderSummary::default();

    let gallery_dir = output_dir.join(GALLERY_DIR);
    fs::create_dir_all(&gallery_dir)?;

    summary.assets_written = write_missing_assets(config, output_dir)?;

    let (pageable, skipped): (Vec<&GalleryItem>, Vec<&GalleryItem>) =
        items.iter().partition(|item| is_safe_file_stem(&item.hash));
    summary.skipped = skipped.into_iter().map(|i| i.hash.clone()).collect();

    if options.item_pages {
        for (idx, item) in pageable.iter().enumerate() {
            let prev = idx
                .checked_sub(1)
                .and_then(|p| pageable.get(p))
                .map(|i| i.hash.as_str());
            let next = pageable.get(idx + 1).map(|i| i.hash.as_str());

            let page = render_item_page(&site, item, prev, next);
            let file_name = item_file_name(&item.hash);
            fs::write(gallery_dir.join(&file_name), page.into_string())?;
            summary.item_pages.push(RenderedItem {
                path: format!("{GALLERY_DIR}/{file_name}"),
                title: item.title.clone(),
                comments: item.comment_count(),
            });
        }
    }

    if options.listing {
        let page = render_listing_page(&site, &pageable);
        fs::write(gallery_dir.join("index.html"), page.into_string())?;
        summary.listing = Some(format!("{GALLERY_DIR}/index.html"));
        summary.listed = pageable.len();
    }

    let fragment_path = site_dir.join(&config.assets.about_fragment);
    match load_fragment(&fragment_path)? {
        Some(body) => {
            let page = render_about_page(&site, &body);
            fs::write(output_dir.join("index.html"), page.into_string())?;
            summary.about = Some("index.html".to_string());
        }
        None => summary.missing_about_fragment = Some(fragment_path),
    }

    Ok(summary)
}

/// `<hash>.html`
pub fn item_file_name(hash: &str) -> String {
    format!("{hash}.html")
}

/// Whether `hash` can be used as a file name as-is: non-empty and only
/// ASCII alphanumerics, `-` and `_`.
pub fn is_safe_file_stem(hash: &str) -> bool {
    !hash.is_empty()
        && hash
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

/// Read an HTML or Markdown fragment as HTML. `Ok(None)` if it doesn't exist.
pub fn load_fragment(path: &Path) -> Result<Option<String>, RenderError> {
    if !path.is_file() {
        return Ok(None);
    }
    let content = fs::read_to_string(path)?;
    let is_markdown = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("md"));
    if !is_markdown {
        return Ok(Some(content));
    }
    let mut body = String::new();
    md_html::push_html(&mut body, Parser::new(&content));
    Ok(Some(body))
}

fn write_missing_assets(config: &SiteConfig, output_dir: &Path) -> std::io::Result<Vec<String>> {
    let mut written = Vec::new();
    for (name, content) in [
        (&config.assets.stylesheet, STYLE_CSS),
        (&config.assets.script, SCRIPT_JS),
    ] {
        let path = output_dir.join(name);
        if !path.exists() {
            fs::write(&path, content)?;
            written.push(name.clone());
        }
    }
    Ok(written)
}

// ============================================================================
// HTML Components
// ============================================================================

/// Renders the shared document frame.
///
/// Pages inside the gallery folder reach the root assets through `../`.
fn base_document(site: &Site, title: &str, in_folder: bool, content: Markup) -> Markup {
    let prefix = if in_folder { "../" } else { "" };
    let assets = &site.config.assets;

    html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="UTF-8";
                meta name="viewport" content="width=device-width, initial-scale=1.0";
                title { (title) " - " (site.config.site_name) }
                link rel="stylesheet" href={ (prefix) (assets.stylesheet) };
                @for src in &assets.external_scripts {
                    script type="text/javascript" src=(src) {}
                }
                script type="text/javascript" src={ (prefix) (assets.script) } {}
            }
            body {
                div #wrapper {
                    div #header {
                        div #gallery-link {
                            a href={ (prefix) (GALLERY_DIR) "/index.html" } { "Gallery" }
                        }
                        div #about-link {
                            a href={ (prefix) "index.html" } { "About" }
                        }
                    }
                    (content)
                }
                (PreEscaped(&site.page_suffix))
            }
        }
    }
}

/// `cap_<id>`, the anchor every comment can be deep-linked by.
pub fn comment_anchor(id: u64) -> String {
    format!("cap_{id}")
}

/// Sort siblings by score, highest first. Stable, so equal scores keep their
/// build (chronological) order.
pub fn by_score(nodes: &[CommentNode]) -> Vec<&CommentNode> {
    let mut sorted: Vec<&CommentNode> = nodes.iter().collect();
    sorted.sort_by(|a, b| b.score.total_cmp(&a.score));
    sorted
}

/// Renders the header block of one comment.
fn comment_body(node: &CommentNode, links: &LinksConfig) -> Markup {
    let record = &node.record;
    let anchor = comment_anchor(record.id);

    html! {
        div.cap-body id=(anchor) data-points=(record.points()) data-score=(node.score) {
            div.cap-head {
                @if !node.children.is_empty() {
                    span.cap-expander { "[+]" }
                }
                span.cap-author {
                    a href=(links.author(&record.author)) { (record.author) }
                }
                span.cap-points title="Points" {
                    (record.points())
                    span.cap-points-breakdown {
                        span.cap-points-ups title="Upvotes" { (record.ups) }
                        span.cap-points-downs title="Downvotes" { (record.downs.saturating_neg()) }
                    }
                }
                span.cap-score title="Score" { (format!("{:.3}", node.score)) }
                span.cap-link {
                    a href={ "#" (anchor) } { "link" }
                }
            }
            div.cap-text {
                (PreEscaped(&record.caption))
            }
        }
    }
}

/// Renders a comment followed by its replies.
pub fn render_comment(node: &CommentNode, links: &LinksConfig) -> Markup {
    html! {
        div.cap-wrapper {
            (comment_body(node, links))
            div.cap-children {
                (render_comment_list(&node.children, links))
            }
        }
    }
}

/// Renders sibling comments in score order.
pub fn render_comment_list(nodes: &[CommentNode], links: &LinksConfig) -> Markup {
    html! {
        @for node in by_score(nodes) {
            (render_comment(node, links))
        }
    }
}

/// Renders the image block with optional prev/next arrows.
fn image_block(item: &GalleryItem, links: &LinksConfig, prev: Option<&str>, next: Option<&str>) -> Markup {
    html! {
        div #image-wrapper {
            @if let Some(prev) = prev {
                a #image-prev.image-arrow href=(item_file_name(prev)) { "\u{2190} Back" }
            }
            @if let Some(next) = next {
                a #image-next.image-arrow href=(item_file_name(next)) { "Next \u{2192}" }
            }
            img #image src=(links.image(&item.hash)) alt=(item.title);
            div #image-info {
                a href=(links.original(&item.hash)) { "View original image on imgur" }
            }
        }
    }
}

// ============================================================================
// Page Renderers
// ============================================================================

/// Renders one item page: title, image, navigation and the comment tree.
///
/// `prev` and `next` are the hashes of the neighbouring items, if any.
pub fn render_item_page(
    site: &Site,
    item: &GalleryItem,
    prev: Option<&str>,
    next: Option<&str>,
) -> Markup {
    let links = &site.config.links;
    let content = html! {
        h1 #image-title { (item.title) }
        (image_block(item, links, prev, next))
        div #captions {
            (render_comment_list(&item.children, links))
        }
    };

    base_document(site, &item.title, true, content)
}

/// Renders the listing: one thumbnail link per item, in the given order.
pub fn render_listing_page(site: &Site, items: &[&GalleryItem]) -> Markup {
    let links = &site.config.links;
    let content = html! {
        h1 #gallery-title { "Gallery" }
        div #gallery-list {
            @for item in items {
                a href=(item_file_name(&item.hash)) {
                    img.gallery-image src=(links.thumbnail(&item.hash)) alt=(item.title) loading="lazy";
                }
            }
        }
    };

    base_document(site, "Gallery", true, content)
}

/// Renders the about page around an already-HTML body.
pub fn render_about_page(site: &Site, body_html: &str) -> Markup {
    let content = html! {
        div #about {
            (PreEscaped(body_html))
        }
    };

    base_document(site, "About", false, content)
}

// ============================================================================
// Tests
// ============================================================================
