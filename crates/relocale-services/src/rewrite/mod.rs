//! One rewrite routine per artifact kind. Each routine mutates a
//! [`Document`] in memory; [`render_file`] reads the artifact once and
//! [`Rewritten::persist`] writes it back once.

use std::fs;
use std::path::{Path, PathBuf};

use color_eyre::eyre::WrapErr;
use relocale_textedit::Document;

use crate::Result;

mod cms;
mod keyed_map;
mod locale_list;
mod translations;

pub use cms::rewrite_cms;
pub use keyed_map::rewrite_keyed_maps;
pub use locale_list::{read_locale_config, rewrite_locale_list};
pub use translations::{data_items, rewrite_translations, DataItem};

#[derive(Debug, Clone)]
pub struct Rewritten {
    pub path: PathBuf,
    pub before: String,
    pub after: String,
}

impl Rewritten {
    pub fn changed(&self) -> bool {
        self.before != self.after
    }

    /// Write the new text back; unchanged artifacts are left alone.
    pub fn persist(&self) -> Result<()> {
        if !self.changed() {
            return Ok(());
        }
        fs::write(&self.path, &self.after)
            .wrap_err_with(|| format!("failed to write {}", self.path.display()))
    }
}

/// Read `path`, run `edit` over it and return both versions.
pub fn render_file(
    path: &Path,
    edit: impl FnOnce(&mut Document) -> Result<()>,
) -> Result<Rewritten> {
    let before = fs::read_to_string(path)
        .wrap_err_with(|| format!("failed to read {}", path.display()))?;
    let mut doc = Document::new(before.clone());
    edit(&mut doc).wrap_err_with(|| format!("failed to rewrite {}", path.display()))?;
    Ok(Rewritten {
        path: path.to_path_buf(),
        before,
        after: doc.into_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn persist_skips_unchanged_files() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a.ts");
        fs::write(&path, "export const locales = [\"en\"];\n").unwrap();
        let same = render_file(&path, |_| Ok(())).unwrap();
        assert!(!same.changed());
        let changed = render_file(&path, |doc| {
            doc.replace_array("locales", &["fr"]);
            Ok(())
        })
        .unwrap();
        assert!(changed.changed());
        changed.persist().unwrap();
        assert_eq!(
            fs::read_to_string(&path).unwrap(),
            "export const locales = [\"fr\"];\n"
        );
    }

    #[test]
    fn missing_file_names_the_path() {
        let err = render_file(Path::new("/nonexistent/astro.config.mjs"), |_| Ok(())).unwrap_err();
        assert!(format!("{err:#}").contains("astro.config.mjs"));
    }
}
