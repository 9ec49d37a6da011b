//! `remotestash list` – show the local stash, oldest item first.

use anyhow::Result;
use remotestash_core::item::Item;
use remotestash_core::stash::Stash;

use super::Context;

const PREVIEW_CHARS: usize = 40;

pub fn run_list(ctx: &Context) -> Result<()> {
    let stash = ctx.open_local()?;
    for line in listing(&stash)? {
        println!("{}", line);
    }
    Ok(())
}

fn listing(stash: &Stash) -> Result<Vec<String>> {
    if stash.is_empty() {
        return Ok(vec![format!("Stash at {} is empty.", stash.location().display())]);
    }
    let mut lines = vec![format!(
        "{:<4} {:<32} {:>10} {:<12} {}",
        "#", "TYPE", "SIZE", "FILE", "PREVIEW"
    )];
    for (i, info) in stash.list().iter().enumerate() {
        let item = Item::load(info.clone(), stash.location())?;
        let file = info
            .file
            .as_deref()
            .map(|f| f.chars().take(12).collect::<String>())
            .unwrap_or_else(|| "-".to_string());
        lines.push(format!(
            "{:<4} {:<32} {:>10} {:<12} {}",
            i,
            info.content_type,
            item.size(),
            file,
            preview(&item)
        ));
    }
    Ok(lines)
}

/// First line of text content, or the original file name.
fn preview(item: &Item) -> String {
    if let Some(text) = item.as_str() {
        let first = text.lines().next().unwrap_or("");
        let mut short: String = first.chars().take(PREVIEW_CHARS).collect();
        if first.chars().count() > PREVIEW_CHARS || text.lines().nth(1).is_some() {
            short.push_str("...");
        }
        return short;
    }
    item.info.filename.clone().unwrap_or_else(|| "-".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use remotestash_core::item::ItemInfo;
    use remotestash_core::mime;

    #[test]
    fn empty_stash_listing() {
        let dir = tempfile::tempdir().unwrap();
        let stash = Stash::open(dir.path()).unwrap();
        let lines = listing(&stash).unwrap();
        assert_eq!(lines.len(), 1);
        assert!(lines[0].ends_with("is empty."));
    }

    #[test]
    fn listing_shows_type_size_and_preview() {
        let dir = tempfile::tempdir().unwrap();
        let mut stash = Stash::open(dir.path()).unwrap();
        stash
            .push(Item::from_string(
                ItemInfo::new(mime::DEFAULT_CONTENT_TYPE),
                "line one\nline two",
            ))
            .unwrap();
        let mut info = ItemInfo::new(mime::IMAGE_PNG);
        info.filename = Some("cat.png".to_string());
        stash.push(Item::from_bytes(info, vec![0x89, 0x50])).unwrap();

        let lines = listing(&stash).unwrap();
        assert_eq!(lines.len(), 3);
        assert!(lines[1].contains("text/plain; charset=utf-8"));
        assert!(lines[1].ends_with("line one..."));
        assert!(lines[2].contains("image/png"));
        assert!(lines[2].ends_with("cat.png"));
    }

    #[test]
    fn long_text_preview_is_cut() {
        let item = Item::from_string(ItemInfo::new(mime::TEXT_PLAIN), &"x".repeat(100));
        let p = preview(&item);
        assert_eq!(p.len(), PREVIEW_CHARS + 3);
    }
}
