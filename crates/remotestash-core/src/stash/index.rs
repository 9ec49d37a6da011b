//! The `contents.json` index: an ordered list of item entries.
//!
//! Rewritten wholesale on every mutation via a temp file and rename.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::item::ItemInfo;

pub const INDEX_FILE: &str = "contents.json";

/// Temporary file suffix used before atomic rename.
const TEMP_SUFFIX: &str = ".part";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StashIndex {
    #[serde(default)]
    pub items: Vec<ItemInfo>,
}

impl StashIndex {
    /// Read the index at `path`; a missing file is an empty index.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.is_file() {
            return Ok(Self::default());
        }
        let data = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
        serde_json::from_str(&data).with_context(|| format!("parse {}", path.display()))
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_vec(self)?;
        let tmp = temp_path(path);
        fs::write(&tmp, json).with_context(|| format!("write {}", tmp.display()))?;
        fs::rename(&tmp, path).with_context(|| {
            format!("failed to rename {} to {}", tmp.display(), path.display())
        })?;
        Ok(())
    }

    /// True if any entry still names `file`.
    pub fn references(&self, file: &str) -> bool {
        self.items.iter().any(|i| i.file.as_deref() == Some(file))
    }
}

/// Path for the temp file: appends `.part` to the final path.
fn temp_path(final_path: &Path) -> PathBuf {
    let mut o = final_path.as_os_str().to_owned();
    o.push(TEMP_SUFFIX);
    PathBuf::from(o)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn temp_path_appends_part() {
        let p = temp_path(Path::new("/tmp/contents.json"));
        assert_eq!(p.to_string_lossy(), "/tmp/contents.json.part");
    }

    #[test]
    fn missing_index_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let idx = StashIndex::load(&dir.path().join(INDEX_FILE)).unwrap();
        assert!(idx.items.is_empty());
    }

    #[test]
    fn save_replaces_file_without_leftovers() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(INDEX_FILE);
        let mut idx = StashIndex::default();
        idx.items.push(ItemInfo::new("text/plain"));
        idx.save(&path).unwrap();
        idx.items.push(ItemInfo::new("image/png"));
        idx.save(&path).unwrap();

        assert!(!temp_path(&path).exists());
        let loaded = StashIndex::load(&path).unwrap();
        assert_eq!(loaded, idx);
    }

    #[test]
    fn reads_index_written_by_other_clients() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(INDEX_FILE);
        fs::write(
            &path,
            r#"{"items": [{"Content-type": "text/plain; charset=utf-8", "file": "aaf4c61d"}]}"#,
        )
        .unwrap();
        let idx = StashIndex::load(&path).unwrap();
        assert_eq!(idx.items.len(), 1);
        assert_eq!(idx.items[0].file.as_deref(), Some("aaf4c61d"));
        assert!(idx.references("aaf4c61d"));
        assert!(!idx.references("other"));
    }

    #[test]
    fn corrupt_index_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(INDEX_FILE);
        fs::write(&path, "{not json").unwrap();
        assert!(StashIndex::load(&path).is_err());
    }
}
