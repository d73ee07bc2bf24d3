//! Remote gallery data source.
//!
//! The collector only needs two reads: one page of the gallery listing and
//! the comments of one item. [`GallerySource`] is that seam; [`HttpSource`]
//! implements it against the JSON API with a blocking client, and tests plug
//! in an in-memory source instead.
//!
//! ## Wire format
//!
//! ```text
//! GET gallery_url(page)  → { "data": [ { "hash": "...", "title": "...", ... }, ... ] }
//! GET item_url(hash)     → { "data": { "captions": [ { "id": 1, "parent_id": 0,
//!                            "datetime": ..., "ups": 3, "downs": 1,
//!                            "caption": "...", "author": "..." }, ... ] } }
//! ```

use crate::config::SourceConfig;
use crate::types::{CommentRecord, GalleryItem};
use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SourceError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("{0}")]
    Unavailable(String),
}

/// Read access to the gallery API.
pub trait GallerySource {
    /// Entries on zero-based gallery page `page`, newest first. Entries come
    /// back without comments.
    fn gallery_page(&self, page: u32) -> Result<Vec<GalleryItem>, SourceError>;

    /// Flat comment list of one item.
    fn captions(&self, hash: &str) -> Result<Vec<CommentRecord>, SourceError>;
}

#[derive(Debug, Deserialize)]
pub struct GalleryResponse {
    pub data: Vec<GalleryItem>,
}

#[derive(Debug, Deserialize)]
pub struct ItemResponse {
    pub data: ItemData,
}

#[derive(Debug, Deserialize)]
pub struct ItemData {
    #[serde(default)]
    pub captions: Vec<CommentRecord>,
}

/// [`GallerySource`] over HTTP.
pub struct HttpSource {
    client: reqwest::blocking::Client,
    config: SourceConfig,
}

impl HttpSource {
    pub fn new(config: &SourceConfig) -> Result<Self, SourceError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(config.user_agent.as_str())
            .build()?;
        Ok(Self {
            client,
            config: config.clone(),
        })
    }

    fn get_json<T: serde::de::DeserializeOwned>(&self, url: &str) -> Result<T, SourceError> {
        let body = self.client.get(url).send()?.error_for_status()?.text()?;
        Ok(serde_json::from_str(&body)?)
    }
}

impl GallerySource for HttpSource {
    fn gallery_page(&self, page: u32) -> Result<Vec<GalleryItem>, SourceError> {
        let url = self.config.gallery_page_url(page);
        let response: GalleryResponse = self.get_json(&url)?;
        Ok(response.data)
    }

    fn captions(&self, hash: &str) -> Result<Vec<CommentRecord>, SourceError> {
        let url = self.config.item_url(hash);
        let response: ItemResponse = self.get_json(&url)?;
        Ok(response.data.captions)
    }
}
