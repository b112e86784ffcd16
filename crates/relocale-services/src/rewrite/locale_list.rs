use std::path::Path;

use relocale_core::{Diff, LocaleCode, LocaleSet, RelocaleError};
use relocale_textedit::Document;

use crate::Result;

const DEFAULT_KEY: &str = "defaultLocale";
const LOCALES_KEY: &str = "locales";

/// Current default and locale list. Both must be present and well formed.
pub fn read_locale_config(doc: &Document, path: &Path) -> Result<(LocaleCode, LocaleSet)> {
    let default = doc
        .read_scalar(DEFAULT_KEY)
        .ok_or_else(|| RelocaleError::absent(path, format!("`{DEFAULT_KEY}` assignment")))?;
    let locales = doc
        .read_array(LOCALES_KEY)
        .ok_or_else(|| RelocaleError::absent(path, format!("`{LOCALES_KEY}` array")))?;
    let default = LocaleCode::parse(&default)?;
    let locales = LocaleSet::parse_all(&locales)?;
    Ok((default, locales))
}

/// Point `defaultLocale` at the new default and rewrite `locales` with the
/// desired set in insertion order.
pub fn rewrite_locale_list(doc: &mut Document, diff: &Diff) -> Result<()> {
    let (old, new) = (diff.old_default(), diff.new_default());
    if old != new {
        let n = doc.replace_scalar(DEFAULT_KEY, old.as_str(), new.as_str());
        tracing::debug!(event = "default_scalar", from = %old, to = %new, replaced = n);
    }
    let values: Vec<&str> = diff.new_locales().iter().map(LocaleCode::as_str).collect();
    let n = doc.replace_array(LOCALES_KEY, &values);
    if n == 0 {
        tracing::warn!(event = "locale_array_missing", key = LOCALES_KEY);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use relocale_core::resolve;

    const ASTRO: &str = r#"import { defineConfig } from "astro/config";

export default defineConfig({
  site: "https://example.com",
  i18n: {
    defaultLocale: "en",
    locales: ["en", "fr"],
    routing: {
      prefixDefaultLocale: false,
    },
  },
});
"#;

    fn set(items: &[&str]) -> LocaleSet {
        LocaleSet::parse_all(items).unwrap()
    }

    fn code(s: &str) -> LocaleCode {
        LocaleCode::parse(s).unwrap()
    }

    #[test]
    fn reads_default_and_locales() {
        let doc = Document::new(ASTRO);
        let (d, l) = read_locale_config(&doc, Path::new("astro.config.mjs")).unwrap();
        assert_eq!(d, code("en"));
        assert_eq!(l, set(&["en", "fr"]));
    }

    #[test]
    fn missing_default_is_structural_absence() {
        let doc = Document::new("export default { locales: [\"en\"] };");
        let err = read_locale_config(&doc, Path::new("astro.config.mjs")).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<RelocaleError>(),
            Some(RelocaleError::StructuralAbsence { .. })
        ));
    }

    #[test]
    fn malformed_existing_locale_is_rejected() {
        let doc = Document::new("defaultLocale: \"en\", locales: [\"en\", \"english\"]");
        assert!(read_locale_config(&doc, Path::new("x")).is_err());
    }

    #[test]
    fn rename_rewrites_scalar_and_array() {
        let diff = resolve(&set(&["en"]), &code("en"), &set(&["fr"]), &code("fr"));
        let mut doc = Document::new(ASTRO);
        rewrite_locale_list(&mut doc, &diff).unwrap();
        let out = doc.as_str();
        assert!(out.contains("defaultLocale: \"fr\","));
        assert!(out.contains("locales: [\"fr\"],"));
        assert!(out.contains("prefixDefaultLocale: false"));
    }

    #[test]
    fn default_switch_without_rename() {
        let diff = resolve(
            &set(&["en", "fr"]),
            &code("en"),
            &set(&["en", "de", "fr"]),
            &code("fr"),
        );
        let mut doc = Document::new(ASTRO);
        rewrite_locale_list(&mut doc, &diff).unwrap();
        assert!(doc.as_str().contains("defaultLocale: \"fr\","));
        assert!(doc.as_str().contains("locales: [\"en\", \"de\", \"fr\"],"));
    }
}
