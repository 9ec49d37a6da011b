//! Reading pushed content and writing pulled content.

use anyhow::{Context, Result};
use remotestash_core::item::{Item, ItemInfo};
use remotestash_core::mime;
use std::fs::File;
use std::io;
use std::path::Path;

/// Build an item from `file` (or stdin). The content type is `content_type`,
/// else guessed from the file name, else utf-8 text.
pub fn read_item(content_type: Option<&str>, file: Option<&Path>) -> Result<Item> {
    let content_type = content_type
        .map(str::to_owned)
        .or_else(|| file.and_then(mime::guess_for_path))
        .unwrap_or_else(|| mime::DEFAULT_CONTENT_TYPE.to_string());
    let mut info = ItemInfo::new(content_type);

    match file {
        Some(path) => {
            info.filename = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned());
            let f = File::open(path).with_context(|| format!("open {}", path.display()))?;
            Item::from_reader(info, f)
        }
        None => Item::from_reader(info, io::stdin().lock()),
    }
}

/// Write the item's exact bytes to `output`, or stdout when None.
pub fn write_item(item: &Item, output: Option<&Path>) -> Result<()> {
    match output {
        Some(path) => {
            let mut f = File::create(path).with_context(|| format!("create {}", path.display()))?;
            item.output(&mut f)?;
            tracing::info!("wrote {} to {}", item, path.display());
        }
        None => item.output(&mut io::stdout().lock())?,
    }
    Ok(())
}
