//! A single stashed content item: its index entry plus the content bytes.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;
use std::fs;
use std::io::{Read, Write};
use std::path::Path;

use crate::mime::{self, ContentType};

/// Index entry for an item, stored in `contents.json`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemInfo {
    #[serde(rename = "Content-type")]
    pub content_type: String,
    /// Name of the content file inside the stash directory.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
    /// Original file name when the content was pushed from a file.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,
}

impl ItemInfo {
    pub fn new(content_type: impl Into<String>) -> Self {
        Self {
            content_type: content_type.into(),
            file: None,
            filename: None,
        }
    }
}

/// Summary of an item as reported by `/status`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemStatus {
    pub size: usize,
    #[serde(rename = "contentType")]
    pub content_type: String,
    pub filename: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Item {
    pub info: ItemInfo,
    content: Option<Vec<u8>>,
}

impl Item {
    /// An item with no content (e.g. its content file went missing).
    pub fn empty(info: ItemInfo) -> Self {
        Self {
            info,
            content: None,
        }
    }

    pub fn from_bytes(info: ItemInfo, data: Vec<u8>) -> Self {
        Self {
            info,
            content: Some(data),
        }
    }

    /// Build an item from text, encoded with the item's charset (utf-8 if none or unsupported).
    pub fn from_string(info: ItemInfo, text: &str) -> Self {
        let data = ContentType::parse(&info.content_type)
            .encoding(false)
            .and_then(|cs| mime::encode(text, &cs))
            .unwrap_or_else(|| text.as_bytes().to_vec());
        Self::from_bytes(info, data)
    }

    pub fn from_reader<R: Read>(info: ItemInfo, mut reader: R) -> Result<Self> {
        let mut data = Vec::new();
        reader
            .read_to_end(&mut data)
            .context("failed to read item content")?;
        Ok(Self::from_bytes(info, data))
    }

    /// Load an item's content from `dir`. A missing content file yields an empty item.
    pub fn load(info: ItemInfo, dir: &Path) -> Result<Self> {
        let Some(file) = info.file.as_deref() else {
            return Ok(Self::empty(info));
        };
        let path = dir.join(file);
        if !path.is_file() {
            tracing::debug!(path = %path.display(), "content file missing");
            return Ok(Self::empty(info));
        }
        let data = fs::read(&path).with_context(|| format!("read {}", path.display()))?;
        Ok(Self::from_bytes(info, data))
    }

    pub fn content_type(&self) -> ContentType {
        ContentType::parse(&self.info.content_type)
    }

    pub fn encoding(&self, strict: bool) -> Option<String> {
        self.content_type().encoding(strict)
    }

    pub fn has_content(&self) -> bool {
        self.content.as_ref().is_some_and(|c| !c.is_empty())
    }

    pub fn as_bytes(&self) -> Option<&[u8]> {
        self.content.as_deref()
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.content.unwrap_or_default()
    }

    /// Content decoded as text, if the content type resolves to a supported charset.
    pub fn as_str(&self) -> Option<String> {
        let data = self.content.as_deref()?;
        let charset = self.encoding(false)?;
        mime::decode(data, &charset)
    }

    pub fn size(&self) -> usize {
        self.content.as_ref().map_or(0, Vec::len)
    }

    /// Name the content file after the SHA-256 of the content, unless already named.
    pub fn ensure_filename(&mut self) -> &str {
        let info = &mut self.info;
        let content = &self.content;
        info.file.get_or_insert_with(|| {
            let digest = Sha256::digest(content.as_deref().unwrap_or_default());
            hex::encode(digest)
        })
    }

    /// Write the content file into `dir`. Empty content writes nothing.
    pub fn save_to(&mut self, dir: &Path) -> Result<()> {
        let name = self.ensure_filename().to_string();
        match self.content.as_deref() {
            Some(data) if !data.is_empty() => {
                let path = dir.join(&name);
                fs::write(&path, data).with_context(|| format!("write {}", path.display()))?;
            }
            _ => {}
        }
        Ok(())
    }

    /// Remove the content file from `dir` if present.
    pub fn clear_file(&self, dir: &Path) -> Result<()> {
        if let Some(file) = self.info.file.as_deref() {
            let path = dir.join(file);
            match fs::remove_file(&path) {
                Ok(()) => tracing::debug!(path = %path.display(), "removed content file"),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => {
                    return Err(e).with_context(|| format!("remove {}", path.display()));
                }
            }
        }
        Ok(())
    }

    pub fn status(&self) -> ItemStatus {
        ItemStatus {
            size: self.size(),
            content_type: self.info.content_type.clone(),
            filename: self.info.filename.clone(),
        }
    }

    /// Write the raw content to `out`. Does nothing for an empty item.
    pub fn output<W: Write>(&self, out: &mut W) -> Result<()> {
        if let Some(data) = self.content.as_deref() {
            if !data.is_empty() {
                out.write_all(data).context("failed to write item content")?;
                out.flush()?;
            }
        }
        Ok(())
    }
}

impl fmt::Display for Item {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Item({}, {} bytes", self.info.content_type, self.size())?;
        if let Some(file) = &self.info.file {
            write!(f, ", file={}", file)?;
        }
        write!(f, ")")
    }
}
