//! Site configuration module.
//!
//! Handles loading, validating, and merging the `config.toml` that lives in the
//! site directory (next to the about fragment and page suffix). Stock defaults
//! are overridden key by key by whatever the user file specifies.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! site_name = "Imgur comment sorting"
//!
//! [source]
//! gallery_url = "http://imgur.com/gallery/page/{page}.json"
//! item_url = "http://imgur.com/gallery/{hash}.json"
//! timeout_secs = 30
//! user_agent = "caption-tree/0.1"
//!
//! [links]
//! image_url = "http://i.imgur.com/{hash}.jpg"
//! thumbnail_url = "http://i.imgur.com/{hash}b.jpg"
//! original_url = "http://imgur.com/gallery/{hash}"
//! author_url = "http://imgur.com/user/{author}"
//!
//! [assets]
//! stylesheet = "style.css"
//! script = "script.js"
//! external_scripts = ["https://ajax.googleapis.com/ajax/libs/jquery/1.8.2/jquery.min.js"]
//! about_fragment = "_index.html"
//! page_suffix = "_page_suffix.html"
//! ```
//!
//! ## Partial Configuration
//!
//! Config files are sparse. Override just the values you want:
//!
//! ```toml
//! [source]
//! timeout_secs = 5
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Site configuration loaded from `config.toml`.
///
/// All fields have defaults. User config files need only specify the values
/// they want to override. Unknown keys are rejected.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SiteConfig {
    /// Appended to every page title: `"<title> - <site_name>"`.
    pub site_name: String,
    /// Remote gallery API.
    pub source: SourceConfig,
    /// Link and media URL templates used in rendered pages.
    pub links: LinksConfig,
    /// Static assets and local fragments.
    pub assets: AssetsConfig,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            site_name: "Imgur comment sorting".to_string(),
            source: SourceConfig::default(),
            links: LinksConfig::default(),
            assets: AssetsConfig::default(),
        }
    }
}

impl SiteConfig {
    /// Validate that templates carry their placeholders and limits are sane.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let templates = [
            ("source.gallery_url", &self.source.gallery_url, "{page}"),
            ("source.item_url", &self.source.item_url, "{hash}"),
            ("links.image_url", &self.links.image_url, "{hash}"),
            ("links.thumbnail_url", &self.links.thumbnail_url, "{hash}"),
            ("links.original_url", &self.links.original_url, "{hash}"),
            ("links.author_url", &self.links.author_url, "{author}"),
        ];
        for (key, template, placeholder) in templates {
            if !template.contains(placeholder) {
                return Err(ConfigError::Validation(format!(
                    "{key} must contain {placeholder}"
                )));
            }
        }
        if self.source.timeout_secs == 0 {
            return Err(ConfigError::Validation(
                "source.timeout_secs must be non-zero".into(),
            ));
        }
        if self.assets.stylesheet.is_empty() || self.assets.script.is_empty() {
            return Err(ConfigError::Validation(
                "assets.stylesheet and assets.script must not be empty".into(),
            ));
        }
        Ok(())
    }
}

/// Remote gallery API settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SourceConfig {
    /// Gallery page URL; `{page}` is the zero-based page number.
    pub gallery_url: String,
    /// Per-item URL; `{hash}` is the item identifier.
    pub item_url: String,
    /// Per-request timeout in seconds.
    pub timeout_secs: u64,
    pub user_agent: String,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            gallery_url: "http://imgur.com/gallery/page/{page}.json".to_string(),
            item_url: "http://imgur.com/gallery/{hash}.json".to_string(),
            timeout_secs: 30,
            user_agent: concat!("caption-tree/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

impl SourceConfig {
    pub fn gallery_page_url(&self, page: u32) -> String {
        self.gallery_url.replace("{page}", &page.to_string())
    }

    pub fn item_url(&self, hash: &str) -> String {
        self.item_url.replace("{hash}", hash)
    }
}

/// URL templates for links in rendered pages.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LinksConfig {
    /// Full-size image shown on the item page.
    pub image_url: String,
    /// Thumbnail shown in the listing.
    pub thumbnail_url: String,
    /// "View original" link on the item page.
    pub original_url: String,
    /// Comment author profile; `{author}` is the author name.
    pub author_url: String,
}

impl Default for LinksConfig {
    fn default() -> Self {
        Self {
            image_url: "http://i.imgur.com/{hash}.jpg".to_string(),
            thumbnail_url: "http://i.imgur.com/{hash}b.jpg".to_string(),
            original_url: "http://imgur.com/gallery/{hash}".to_string(),
            author_url: "http://imgur.com/user/{author}".to_string(),
        }
    }
}

impl LinksConfig {
    pub fn image(&self, hash: &str) -> String {
        self.image_url.replace("{hash}", hash)
    }

    pub fn thumbnail(&self, hash: &str) -> String {
        self.thumbnail_url.replace("{hash}", hash)
    }

    pub fn original(&self, hash: &str) -> String {
        self.original_url.replace("{hash}", hash)
    }

    pub fn author(&self, author: &str) -> String {
        self.author_url.replace("{author}", author)
    }
}

/// Static assets referenced by pages and local fragments read at render time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AssetsConfig {
    /// Stylesheet filename, relative to the output root.
    pub stylesheet: String,
    /// Script filename, relative to the output root.
    pub script: String,
    /// Absolute script URLs loaded before `script`.
    pub external_scripts: Vec<String>,
    /// Fragment for the about page, relative to the site directory.
    /// `.md` files are converted from Markdown; anything else is used as HTML.
    pub about_fragment: String,
    /// Optional HTML appended to every page body, relative to the site directory.
    pub page_suffix: String,
}

impl Default for AssetsConfig {
    fn default() -> Self {
        Self {
            stylesheet: "style.css".to_string(),
            script: "script.js".to_string(),
            external_scripts: vec![
                "https://ajax.googleapis.com/ajax/libs/jquery/1.8.2/jquery.min.js".to_string(),
            ],
            about_fragment: "_index.html".to_string(),
            page_suffix: "_page_suffix.html".to_string(),
        }
    }
}

// =============================================================================
// Loading
// =============================================================================
//
// A site has exactly one config file. Loading is: stock defaults as a TOML
// table, the user's table laid over it section by section, then one typed
// deserialize (which rejects unknown keys) and `validate()`.

/// File name looked up in the site directory.
pub const CONFIG_FILE: &str = "config.toml";

/// Stock defaults as a TOML table, the layer user files are laid over.
pub fn defaults_table() -> Result<toml::Table, ConfigError> {
    let text = toml::to_string(&SiteConfig::default())?;
    Ok(toml::from_str(&text)?)
}

/// Lay `user` over `base` in place.
///
/// A section present in both is merged key by key; any other value the user
/// sets (including arrays such as `external_scripts`) replaces the default.
pub fn overlay(base: &mut toml::Table, user: toml::Table) {
    for (key, value) in user {
        match value {
            toml::Value::Table(user_section) => {
                if let Some(toml::Value::Table(section)) = base.get_mut(&key) {
                    overlay(section, user_section);
                } else {
                    base.insert(key, toml::Value::Table(user_section));
                }
            }
            value => {
                base.insert(key, value);
            }
        }
    }
}

/// The site's `config.toml` as an untyped table, or `None` when the site
/// has none. Syntax errors surface here; unknown keys only at
/// [`config_from_table`].
pub fn read_user_table(site_dir: &Path) -> Result<Option<toml::Table>, ConfigError> {
    let path = site_dir.join(CONFIG_FILE);
    if !path.is_file() {
        return Ok(None);
    }
    let text = fs::read_to_string(&path)?;
    Ok(Some(toml::from_str(&text)?))
}

/// Turn a fully merged table into a checked [`SiteConfig`].
pub fn config_from_table(table: toml::Table) -> Result<SiteConfig, ConfigError> {
    let config: SiteConfig = toml::Value::Table(table).try_into()?;
    config.validate()?;
    Ok(config)
}

/// Config for the site in `site_dir`: defaults, overridden by whatever its
/// `config.toml` sets.
pub fn load_config(site_dir: &Path) -> Result<SiteConfig, ConfigError> {
    let mut table = defaults_table()?;
    if let Some(user) = read_user_table(site_dir)? {
        overlay(&mut table, user);
    }
    config_from_table(table)
}

/// Returns a fully-commented stock `config.toml`.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# caption-tree configuration
# ==========================
# Place this file as config.toml in the site directory (--site, default ".").
# All settings are optional. Values shown below are the defaults.
# Unknown keys will cause an error.

# Appended to every page title: "<title> - <site_name>"
site_name = "Imgur comment sorting"

# ---------------------------------------------------------------------------
# Remote gallery API
# ---------------------------------------------------------------------------
[source]
# Gallery listing, newest first. {page} is the zero-based page number.
gallery_url = "http://imgur.com/gallery/page/{page}.json"

# Per-item comments. {hash} is the item identifier.
item_url = "http://imgur.com/gallery/{hash}.json"

# Per-request timeout. There are no retries.
timeout_secs = 30

# user_agent defaults to "caption-tree/<version>".
# user_agent = "caption-tree"

# ---------------------------------------------------------------------------
# Links in rendered pages
# ---------------------------------------------------------------------------
[links]
image_url = "http://i.imgur.com/{hash}.jpg"
thumbnail_url = "http://i.imgur.com/{hash}b.jpg"
original_url = "http://imgur.com/gallery/{hash}"
author_url = "http://imgur.com/user/{author}"

# ---------------------------------------------------------------------------
# Assets and fragments
# ---------------------------------------------------------------------------
[assets]
# Written to the output root if missing; referenced relative to each page.
stylesheet = "style.css"
script = "script.js"

# Loaded before the local script on every page.
external_scripts = ["https://ajax.googleapis.com/ajax/libs/jquery/1.8.2/jquery.min.js"]

# About page content, relative to the site directory.
# A .md file is converted from Markdown; anything else is embedded as HTML.
about_fragment = "_index.html"

# HTML appended to the end of every page body. Skipped when the file is absent.
page_suffix = "_page_suffix.html"
"##
}
