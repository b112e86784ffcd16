use color_eyre::eyre::WrapErr;
use once_cell::sync::Lazy;
use regex::Regex;
use relocale_core::{Diff, LocaleCode};
use relocale_textedit::{lexer, Anchor, Document, ObjectLiteral};

use crate::Result;

/// A data file bound in the data object: `siteData: siteDataEn`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataItem {
    pub name: String,
    pub ident: String,
}

impl DataItem {
    fn ident_for(&self, loc: &LocaleCode) -> String {
        format!("{}{}", self.name, loc.ident_suffix())
    }
}

/// Data items of `locale`'s block in `object`, in declaration order.
pub fn data_items(doc: &Document, object: &str, locale: &LocaleCode) -> Result<Vec<DataItem>> {
    let Some(obj) = doc.object(object)? else {
        return Ok(Vec::new());
    };
    let Some(entry) = obj.get(locale.as_str()) else {
        return Ok(Vec::new());
    };
    let body = entry.body.as_str();
    let tokens = lexer::tokenize(body);
    let Some(open) = lexer::next_sig(&tokens, 0).filter(|&i| tokens[i].is_punct('{')) else {
        return Ok(Vec::new());
    };
    let inner = ObjectLiteral::parse(body, &tokens, open)?;
    Ok(inner
        .entries
        .iter()
        .filter_map(|e| {
            let name = e.key.clone()?;
            Some(DataItem {
                name,
                ident: e.body.trim().to_string(),
            })
        })
        .collect())
}

static DEFAULT_IMPORT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*import\s+([A-Za-z_$][\w$]*)\s+from\b").unwrap());

/// Whether `line` is a default import binding `ident`.
fn binds(line: &str, ident: &str) -> bool {
    DEFAULT_IMPORT
        .captures(line)
        .is_some_and(|c| &c[1] == ident)
}

fn import_for(doc: &Document, item: &DataItem, source: &LocaleCode, loc: &LocaleCode) -> String {
    let ident = item.ident_for(loc);
    match doc.find_import_line(|l| binds(l, &item.ident)) {
        Some(line) => {
            let mut clone = Document::new(line);
            clone.rename_word(&item.ident, &ident);
            clone.replace_in_strings(&format!("/{source}/"), &format!("/{loc}/"));
            clone.into_string()
        }
        None => format!("import {ident} from \"./{loc}/{}.json\";", item.name),
    }
}

/// The translation artifact: per-locale data imports plus one block per
/// locale in each exported object (data, text, routes).
///
/// Added locales clone the current default's blocks and imports, removed
/// locales lose theirs, and a default rename rekeys blocks, rewrites import
/// paths and renames the compound identifiers.
pub fn rewrite_translations(doc: &mut Document, diff: &Diff, objects: &[String]) -> Result<()> {
    let source = diff.clone_source();
    let data_object = objects.first().map(String::as_str);
    let items = match data_object {
        Some(o) => data_items(doc, o, source)?,
        None => Vec::new(),
    };
    let present: Vec<&String> = objects
        .iter()
        .filter(|o| {
            let found = doc.has_object(o);
            if !found {
                tracing::warn!(event = "translation_object_missing", object = %o);
            }
            found
        })
        .collect();

    let mut prev: Option<&LocaleCode> = None;
    for loc in diff.to_add() {
        for item in items.iter().rev() {
            let ident = item.ident_for(loc);
            if doc.find_import_line(|l| binds(l, &ident)).is_some() {
                continue;
            }
            let stmt = import_for(doc, item, source, loc);
            doc.prepend_import(&stmt);
        }
        for obj in &present {
            let is_data = Some(obj.as_str()) == data_object;
            let inserted = doc
                .edit_object(obj, |o| {
                    let anchor = match prev {
                        Some(p) if o.position(p.as_str()).is_some() => Anchor::After(p.as_str()),
                        _ => Anchor::Start,
                    };
                    let inserted = o.duplicate_as(source.as_str(), loc.as_str(), anchor)?;
                    if inserted && is_data {
                        if let Some(entry) = o.get_mut(loc.as_str()) {
                            let mut body = Document::new(entry.body.clone());
                            for item in &items {
                                body.rename_word(&item.ident, &item.ident_for(loc));
                            }
                            entry.body = body.into_string();
                        }
                    }
                    Ok::<_, relocale_textedit::EditError>(inserted)
                })?
                .wrap_err_with(|| format!("cannot clone `{source}` in `{obj}`"))?;
            tracing::debug!(event = "translation_block_cloned", object = %obj, locale = %loc, inserted);
        }
        prev = Some(loc);
    }

    for loc in diff.to_remove() {
        for obj in &present {
            let n = doc.edit_object(obj, |o| o.remove(loc.as_str()))?;
            tracing::debug!(event = "translation_block_removed", object = %obj, locale = %loc, removed = n);
        }
        let segment = format!("/{loc}/");
        doc.remove_import_lines(|l| l.contains(&segment));
    }

    if diff.rename_default() {
        let (old, new) = (diff.old_default(), diff.new_default());
        for obj in &present {
            doc.edit_object(obj, |o| o.rename(old.as_str(), new.as_str()))?;
        }
        for item in &items {
            doc.rename_word(&item.ident, &item.ident_for(new));
        }
        doc.replace_in_strings(&format!("/{old}/"), &format!("/{new}/"));
        tracing::debug!(event = "translation_default_renamed", from = %old, to = %new);
    }
    Ok(())
}
