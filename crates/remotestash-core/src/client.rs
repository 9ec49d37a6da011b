//! Talking to a remote stash over HTTP(S) with libcurl.
//!
//! LAN stashes serve self-signed certificates, so peer and host
//! verification are turned off. Calls block; use `spawn_blocking` from
//! async code.

use anyhow::{Context, Result};
use std::str;
use std::time::Duration;
use url::Url;

use crate::item::{Item, ItemInfo};
use crate::mime;
use crate::server::{inline_filename, parse_filename};
use crate::stash::StashStatus;

/// A response read back from a stash server.
#[derive(Debug, Clone)]
pub struct RemoteResponse {
    pub status: u32,
    pub content_type: Option<String>,
    pub content_disposition: Option<String>,
    pub body: Vec<u8>,
}

impl RemoteResponse {
    /// Body as an item, or None when the stash had nothing to give.
    pub fn into_item(self) -> Option<Item> {
        if self.body.is_empty() {
            return None;
        }
        let mut info = ItemInfo::new(
            self.content_type
                .unwrap_or_else(|| mime::APPLICATION_OCTET_STREAM.to_string()),
        );
        info.filename = self.content_disposition.as_deref().and_then(parse_filename);
        Some(Item::from_bytes(info, self.body))
    }
}

pub struct RemoteClient {
    base: Url,
    timeout: Option<Duration>,
}

impl RemoteClient {
    /// `timeout` bounds a whole request; None lets it run as long as it takes.
    pub fn new(base_url: &str, timeout: Option<Duration>) -> Result<Self> {
        let base = Url::parse(base_url).with_context(|| format!("invalid stash URL {}", base_url))?;
        Ok(Self { base, timeout })
    }

    pub fn base_url(&self) -> &str {
        self.base.as_str()
    }

    pub fn get(&self, path: &str) -> Result<RemoteResponse> {
        self.perform(path, None)
    }

    pub fn post(
        &self,
        path: &str,
        body: &[u8],
        content_type: &str,
        filename: Option<&str>,
    ) -> Result<RemoteResponse> {
        self.perform(path, Some((body, content_type, filename)))
    }

    /// Send `item` to the remote stash; returns the server's reply text.
    pub fn push(&self, item: &Item) -> Result<String> {
        let response = self.post(
            "push",
            item.as_bytes().unwrap_or_default(),
            &item.info.content_type,
            item.info.filename.as_deref(),
        )?;
        Ok(String::from_utf8_lossy(&response.body).into_owned())
    }

    pub fn pull(&self) -> Result<Option<Item>> {
        Ok(self.get("pull")?.into_item())
    }

    pub fn last(&self) -> Result<Option<Item>> {
        Ok(self.get("last")?.into_item())
    }

    pub fn status(&self) -> Result<StashStatus> {
        let response = self.get("status")?;
        serde_json::from_slice(&response.body).context("invalid status reply")
    }

    fn perform(&self, path: &str, post: Option<(&[u8], &str, Option<&str>)>) -> Result<RemoteResponse> {
        let url = self.base.join(path).context("invalid request path")?;
        let method = if post.is_some() { "POST" } else { "GET" };
        let mut headers: Vec<String> = Vec::new();
        let mut body = Vec::new();

        let mut easy = curl::easy::Easy::new();
        easy.url(url.as_str()).context("invalid URL")?;
        easy.ssl_verify_peer(false)?;
        easy.ssl_verify_host(false)?;
        easy.connect_timeout(Duration::from_secs(15))?;
        if let Some(timeout) = self.timeout {
            easy.timeout(timeout)?;
        }

        let mut list = curl::easy::List::new();
        // The server answers 100-continue, but skipping the wait saves a round trip.
        list.append("Expect:")?;
        if let Some((data, content_type, filename)) = post {
            easy.post(true)?;
            easy.post_fields_copy(data)?;
            list.append(&format!("Content-Type: {}", content_type))?;
            if let Some(name) = filename {
                list.append(&format!("Content-Disposition: {}", inline_filename(name)))?;
            }
        }
        easy.http_headers(list)?;

        {
            let mut transfer = easy.transfer();
            transfer.header_function(|data| {
                if let Ok(s) = str::from_utf8(data) {
                    let line = s.trim_end();
                    // A new status line (after 100 Continue) starts a fresh header block.
                    if line.starts_with("HTTP/") {
                        headers.clear();
                    }
                    headers.push(line.to_string());
                }
                true
            })?;
            transfer.write_function(|data| {
                body.extend_from_slice(data);
                Ok(data.len())
            })?;
            transfer
                .perform()
                .with_context(|| format!("{} {} failed", method, url))?;
        }

        let status = easy.response_code().context("no response code")?;
        tracing::debug!(%url, status, bytes = body.len(), "{} done", method);
        if !(200..300).contains(&status) {
            anyhow::bail!("{} {} returned HTTP {}", method, url, status);
        }

        Ok(RemoteResponse {
            status,
            content_type: header_value(&headers, "content-type"),
            content_disposition: header_value(&headers, "content-disposition"),
            body,
        })
    }
}

/// Value of the first header line named `name` (case-insensitive).
fn header_value(lines: &[String], name: &str) -> Option<String> {
    lines.iter().find_map(|line| {
        let (k, v) = line.split_once(':')?;
        k.trim()
            .eq_ignore_ascii_case(name)
            .then(|| v.trim().to_string())
    })
}
