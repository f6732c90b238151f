//! RSS feed source implementation.
//!
//! This module shows how to implement the [`DataSource`] trait for a concrete
//! feed format.  Use it as a template when adding support for Atom, JSON Feed,
//! or any other format.
//!
//! The network half ([`DataSource::fetch`]) is kept as thin as possible; all
//! of the conversion logic lives in [`RssSource::parse_channel`], which does no
//! I/O and is what the tests exercise.

use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tracing::debug;

use super::{DataSource, FeedItem};

/// An RSS feed data source.
///
/// Fetches an RSS 2.0 document with an async [`reqwest::Client`] and parses it
/// with the [`rss`] crate.
pub struct RssSource {
    /// The feed URL to poll.
    pub url: String,
    /// A human-readable label shown in the UI next to each item.
    pub label: String,
    /// Upper bound on one request, if any.  Without it a hung server keeps the
    /// cycle in the fetching state indefinitely.
    pub timeout: Option<Duration>,
    client: reqwest::Client,
}

impl RssSource {
    /// Create a new RSS source.
    ///
    /// # Arguments
    ///
    /// * `url` — full URL of the RSS feed (e.g.
    ///   `https://feeds.bbci.co.uk/news/rss.xml`).
    /// * `label` — short name displayed in the TUI for items from this feed.
    pub fn new(url: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            label: label.into(),
            timeout: None,
            client: reqwest::Client::new(),
        }
    }

    /// Bound every request to `timeout`.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Parse an already-fetched [`rss::Channel`] into [`FeedItem`]s.
    ///
    /// This is a pure function (no I/O) so that tests can exercise the
    /// parsing logic without hitting the network.
    pub fn parse_channel(channel: &rss::Channel, label: &str) -> Vec<FeedItem> {
        channel
            .items()
            .iter()
            .map(|item| {
                // Prefer <guid>, fall back to <link>, then empty string.
                let id = item
                    .guid()
                    .map(|g| g.value().to_string())
                    .or_else(|| item.link().map(String::from))
                    .unwrap_or_default();

                // Parse RFC-2822 date; gracefully degrade to None on failure.
                let published = item
                    .pub_date()
                    .and_then(|d| DateTime::parse_from_rfc2822(d).ok())
                    .map(|dt| dt.with_timezone(&Utc));

                FeedItem {
                    id,
                    title: item.title().unwrap_or("(untitled)").to_string(),
                    description: item.description().map(String::from),
                    link: item.link().map(String::from),
                    published,
                    source_name: label.to_string(),
                }
            })
            .collect()
    }
}

#[async_trait]
impl DataSource for RssSource {
    fn name(&self) -> &str {
        &self.label
    }

    async fn fetch(&self) -> Result<Vec<FeedItem>> {
        let mut request = self.client.get(&self.url);
        if let Some(timeout) = self.timeout {
            request = request.timeout(timeout);
        }
        let body = request
            .send()
            .await
            .and_then(reqwest::Response::error_for_status)
            .with_context(|| format!("{}: request to {} failed", self.label, self.url))?
            .bytes()
            .await
            .with_context(|| format!("{}: reading response body failed", self.label))?;
        let channel = rss::Channel::read_from(body.as_ref())
            .with_context(|| format!("{}: response is not a valid RSS document", self.label))?;

        let items = Self::parse_channel(&channel, &self.label);
        debug!(source = %self.label, items = items.len(), "fetched feed");
        Ok(items)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
