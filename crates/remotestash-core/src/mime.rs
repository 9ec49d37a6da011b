//! Content-Type parsing and charset resolution for stashed items.

use std::path::Path;

pub const TEXT_PLAIN: &str = "text/plain";
pub const TEXT_HTML: &str = "text/html";
pub const TEXT_URI_LIST: &str = "text/uri-list";
pub const IMAGE_PNG: &str = "image/png";
pub const IMAGE_JPEG: &str = "image/jpeg";
pub const APPLICATION_JSON: &str = "application/json";
pub const APPLICATION_OCTET_STREAM: &str = "application/octet-stream";

/// Content type used when nothing better is known about pushed input.
pub const DEFAULT_CONTENT_TYPE: &str = "text/plain; charset=utf-8";

/// A parsed `Content-Type` header value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentType {
    essence: String,
    params: Vec<(String, String)>,
}

impl ContentType {
    /// Parse `type/subtype; key=value; ...`. Parameter names are lowercased,
    /// quoted values unquoted. Also accepts `charset: x` as written by some clients.
    pub fn parse(header: &str) -> Self {
        let mut parts = header.split(';');
        let essence = parts
            .next()
            .unwrap_or_default()
            .trim()
            .to_ascii_lowercase();
        let params = parts
            .filter_map(|p| {
                let p = p.trim();
                let (k, v) = p.split_once('=').or_else(|| p.split_once(':'))?;
                let k = k.trim().to_ascii_lowercase();
                let v = v.trim().trim_matches('"').to_string();
                if k.is_empty() {
                    None
                } else {
                    Some((k, v))
                }
            })
            .collect();
        Self { essence, params }
    }

    /// The `type/subtype` part, lowercased.
    pub fn essence(&self) -> &str {
        &self.essence
    }

    pub fn param(&self, name: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
            .filter(|v| !v.is_empty())
    }

    pub fn is_text(&self) -> bool {
        self.essence.starts_with("text/")
    }

    pub fn is_image(&self) -> bool {
        self.essence.starts_with("image/")
    }

    /// Charset used to turn content into text.
    ///
    /// An explicit `charset` wins; `text/*` defaults to utf-8. Unless `strict`,
    /// `*xml` and `*json` types default to utf-8 too.
    pub fn encoding(&self, strict: bool) -> Option<String> {
        if let Some(cs) = self.param("charset") {
            return Some(cs.to_ascii_lowercase());
        }
        if self.is_text() {
            return Some("utf-8".to_string());
        }
        if !strict && (self.essence.ends_with("xml") || self.essence.ends_with("json")) {
            return Some("utf-8".to_string());
        }
        None
    }

    /// Render `essence; charset=<charset>`.
    pub fn with_charset(&self, charset: &str) -> String {
        format!("{}; charset={}", self.essence, charset)
    }
}

/// Guess a content type from a file's extension.
pub fn guess_for_path(path: &Path) -> Option<String> {
    mime_guess::from_path(path)
        .first()
        .map(|m| m.essence_str().to_string())
}

/// Decode `data` using an IANA charset name. Only a few charsets are supported;
/// anything else (or invalid input) yields None.
pub fn decode(data: &[u8], charset: &str) -> Option<String> {
    match charset.to_ascii_lowercase().as_str() {
        "utf-8" | "utf8" => String::from_utf8(data.to_vec()).ok(),
        "us-ascii" | "ascii" => {
            if data.is_ascii() {
                String::from_utf8(data.to_vec()).ok()
            } else {
                None
            }
        }
        "iso-8859-1" | "latin1" | "latin-1" => Some(data.iter().map(|&b| b as char).collect()),
        _ => None,
    }
}

/// Encode `text` using an IANA charset name; see [`decode`] for supported names.
pub fn encode(text: &str, charset: &str) -> Option<Vec<u8>> {
    match charset.to_ascii_lowercase().as_str() {
        "utf-8" | "utf8" => Some(text.as_bytes().to_vec()),
        "us-ascii" | "ascii" => text.is_ascii().then(|| text.as_bytes().to_vec()),
        "iso-8859-1" | "latin1" | "latin-1" => text
            .chars()
            .map(|c| u8::try_from(u32::from(c)).ok())
            .collect(),
        _ => None,
    }
}
