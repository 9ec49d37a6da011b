//! Local stash: a LIFO list of items backed by `contents.json` plus
//! content files named by hash, all inside one directory.

mod index;

pub use index::{StashIndex, INDEX_FILE};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::item::{Item, ItemInfo, ItemStatus};

/// Summary served by `/status` and printed by `remotestash status`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StashStatus {
    pub items_count: usize,
    pub last: Option<ItemStatus>,
}

/// Handle to a stash directory. The index is loaded on open and written back
/// after every mutation; there is no locking between processes.
#[derive(Debug)]
pub struct Stash {
    location: PathBuf,
    index_path: PathBuf,
    index: StashIndex,
}

impl Stash {
    /// Open (or create) the stash at `location`.
    pub fn open(location: impl AsRef<Path>) -> Result<Self> {
        let location = location.as_ref().to_path_buf();
        if !location.is_dir() {
            tracing::info!("creating stash directory {}", location.display());
            fs::create_dir_all(&location)
                .with_context(|| format!("create {}", location.display()))?;
        }
        let index_path = location.join(INDEX_FILE);
        let index = StashIndex::load(&index_path)?;
        tracing::debug!(
            location = %location.display(),
            items = index.items.len(),
            "opened local stash"
        );
        Ok(Self {
            location,
            index_path,
            index,
        })
    }

    pub fn location(&self) -> &Path {
        &self.location
    }

    pub fn len(&self) -> usize {
        self.index.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.items.is_empty()
    }

    /// Entries in push order (oldest first).
    pub fn list(&self) -> &[ItemInfo] {
        &self.index.items
    }

    /// Store `item` on top of the stash.
    pub fn push(&mut self, mut item: Item) -> Result<()> {
        item.save_to(&self.location)?;
        self.index.items.push(item.info.clone());
        self.save_content()?;
        tracing::info!("stash pushed {} [{} items]", item, self.len());
        Ok(())
    }

    /// Remove and return the most recently pushed item.
    pub fn pull(&mut self) -> Result<Option<Item>> {
        let Some(info) = self.index.items.pop() else {
            tracing::debug!("stash empty, no item to pull");
            return Ok(None);
        };
        let item = Item::load(info, &self.location)?;
        // Identical content shares one file; keep it while other entries name it.
        let shared = item
            .info
            .file
            .as_deref()
            .is_some_and(|f| self.index.references(f));
        if !shared {
            item.clear_file(&self.location)?;
        }
        self.save_content()?;
        tracing::info!("stash pulled {} [{} items]", item, self.len());
        Ok(Some(item))
    }

    /// Return the most recently pushed item without removing it.
    pub fn last(&self) -> Result<Option<Item>> {
        match self.index.items.last() {
            Some(info) => Ok(Some(Item::load(info.clone(), &self.location)?)),
            None => Ok(None),
        }
    }

    pub fn status(&self) -> Result<StashStatus> {
        Ok(StashStatus {
            items_count: self.len(),
            last: self.last()?.map(|item| item.status()),
        })
    }

    fn save_content(&self) -> Result<()> {
        self.index.save(&self.index_path)
    }
}
