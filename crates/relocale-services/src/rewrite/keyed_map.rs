use relocale_config::KeyedMapSpec;
use relocale_core::Diff;
use relocale_textedit::{Anchor, Document, Entry};

use crate::Result;

/// Maps keyed by locale in the site settings (`localeMap`,
/// `languageSwitcherMap`, ...). Added locales get a template-derived entry
/// right after the opening brace, removed locales lose their line wherever
/// it appears, and a default rename rekeys every occurrence.
pub fn rewrite_keyed_maps(doc: &mut Document, diff: &Diff, maps: &[KeyedMapSpec]) -> Result<()> {
    if !diff.to_add().is_empty() {
        for map in maps {
            if !doc.has_object(&map.name) {
                tracing::warn!(event = "keyed_map_missing", map = %map.name);
                continue;
            }
            let added = doc.edit_object(&map.name, |obj| {
                let lead = obj.member_indent();
                let mut prev: Option<String> = None;
                let mut added = 0usize;
                for loc in diff.to_add() {
                    let anchor = match prev.as_deref() {
                        Some(key) => Anchor::After(key),
                        None => Anchor::Start,
                    };
                    let entry = Entry::new(
                        loc.as_str(),
                        format!(" {}", map.render(loc.as_str())),
                        lead.clone(),
                    );
                    if obj.insert(entry, anchor) {
                        added += 1;
                        prev = Some(loc.as_str().to_string());
                    }
                }
                added
            })?;
            tracing::debug!(event = "keyed_map_added", map = %map.name, added);
        }
    }

    for loc in diff.to_remove() {
        let n = doc.remove_keyed_block(loc.as_str());
        tracing::debug!(event = "keyed_block_removed", locale = %loc, removed = n);
    }

    if diff.rename_default() {
        let n = doc.rename_keyed_block(diff.old_default().as_str(), diff.new_default().as_str());
        tracing::debug!(event = "keyed_block_renamed", from = %diff.old_default(), to = %diff.new_default(), renamed = n);
    }
    Ok(())
}
