use std::path::{Path, PathBuf};

use serde::Deserialize;

pub const CONFIG_FILE: &str = "relocale.toml";

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RelocaleConfig {
    pub site_config: Option<String>,
    pub site_settings: Option<String>,
    pub translations: Option<String>,
    pub cms_schema: Option<String>,
    pub content_roots: Option<Vec<String>>,
    pub routes_root: Option<String>,
    pub reference_files: Option<Vec<String>>,
    pub translation_objects: Option<Vec<String>>,
    pub keyed_maps: Option<Vec<KeyedMapSpec>>,
    pub log_dir: Option<String>,
}

/// A `name = { <locale>: <value>, .. }` map in the site settings whose
/// entries are generated from `template` for added locales.
///
/// `{locale}` expands to the code as written, `{LOCALE}` to its uppercase form.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct KeyedMapSpec {
    pub name: String,
    pub template: String,
}

impl KeyedMapSpec {
    pub fn new(name: &str, template: &str) -> Self {
        Self {
            name: name.to_string(),
            template: template.to_string(),
        }
    }

    pub fn render(&self, locale: &str) -> String {
        self.template
            .replace("{locale}", locale)
            .replace("{LOCALE}", &locale.to_uppercase())
    }
}

#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("failed to parse {path}: {message}")]
    Parse { path: PathBuf, message: String },
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Search order: `<root>/relocale.toml`, `$CONFIG/relocale/relocale.toml`.
/// The first file that sets a field wins.
pub fn load_config(root: &Path) -> Result<RelocaleConfig, ConfigError> {
    let mut candidates = vec![root.join(CONFIG_FILE)];
    if let Some(base) = dirs::config_dir() {
        candidates.push(base.join("relocale").join(CONFIG_FILE));
    }
    let mut merged = RelocaleConfig::default();
    for path in candidates {
        let s = match std::fs::read_to_string(&path) {
            Ok(s) => s,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => continue,
            Err(source) => return Err(ConfigError::Read { path, source }),
        };
        let cfg = toml::from_str::<RelocaleConfig>(&s).map_err(|e| ConfigError::Parse {
            path: path.clone(),
            message: e.to_string(),
        })?;
        merged = merge(merged, cfg);
    }
    Ok(merged)
}

fn merge(mut a: RelocaleConfig, b: RelocaleConfig) -> RelocaleConfig {
    if a.site_config.is_none() {
        a.site_config = b.site_config;
    }
    if a.site_settings.is_none() {
        a.site_settings = b.site_settings;
    }
    if a.translations.is_none() {
        a.translations = b.translations;
    }
    if a.cms_schema.is_none() {
        a.cms_schema = b.cms_schema;
    }
    if a.content_roots.is_none() {
        a.content_roots = b.content_roots;
    }
    if a.routes_root.is_none() {
        a.routes_root = b.routes_root;
    }
    if a.reference_files.is_none() {
        a.reference_files = b.reference_files;
    }
    if a.translation_objects.is_none() {
        a.translation_objects = b.translation_objects;
    }
    if a.keyed_maps.is_none() {
        a.keyed_maps = b.keyed_maps;
    }
    if a.log_dir.is_none() {
        a.log_dir = b.log_dir;
    }
    a
}

/// Where every artifact and directory role lives, resolved against the
/// project root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectLayout {
    pub root: PathBuf,
    /// Canonical source of the current default and locale list.
    pub site_config: PathBuf,
    pub site_settings: PathBuf,
    pub translations: PathBuf,
    pub cms_schema: Option<PathBuf>,
    pub content_roots: Vec<PathBuf>,
    pub routes_root: PathBuf,
    /// Paths with a `{locale}` placeholder, expanded with the new default.
    pub reference_files: Vec<String>,
    /// Exported objects in the translations artifact, data object first.
    pub translation_objects: Vec<String>,
    pub keyed_maps: Vec<KeyedMapSpec>,
}

impl ProjectLayout {
    pub fn with_defaults(root: impl Into<PathBuf>) -> Self {
        Self::from_config(root, &RelocaleConfig::default())
    }

    pub fn from_config(root: impl Into<PathBuf>, cfg: &RelocaleConfig) -> Self {
        let root = root.into();
        let at = |p: &Option<String>, default: &str| root.join(p.as_deref().unwrap_or(default));
        let content_roots = match &cfg.content_roots {
            Some(v) => v.iter().map(|p| root.join(p)).collect(),
            None => vec![root.join("src/content"), root.join("src/config")],
        };
        // an explicit empty string switches the CMS pass off
        let cms_schema = match cfg.cms_schema.as_deref() {
            Some("") => None,
            Some(p) => Some(root.join(p)),
            None => Some(root.join("keystatic.config.tsx")),
        };
        Self {
            site_config: at(&cfg.site_config, "astro.config.mjs"),
            site_settings: at(&cfg.site_settings, "src/config/siteSettings.json.ts"),
            translations: at(&cfg.translations, "src/config/translationData.json.ts"),
            cms_schema,
            content_roots,
            routes_root: at(&cfg.routes_root, "src/pages"),
            reference_files: cfg
                .reference_files
                .clone()
                .unwrap_or_else(|| vec!["src/config/{locale}/navData.json.ts".to_string()]),
            translation_objects: cfg.translation_objects.clone().unwrap_or_else(|| {
                ["dataTranslations", "textTranslations", "routeTranslations"]
                    .map(String::from)
                    .to_vec()
            }),
            keyed_maps: cfg.keyed_maps.clone().unwrap_or_else(|| {
                vec![
                    KeyedMapSpec::new("localeMap", "\"{locale}\""),
                    KeyedMapSpec::new("languageSwitcherMap", "\"{LOCALE}\""),
                ]
            }),
            root,
        }
    }

    /// Reference files for `locale`, placeholder expanded.
    pub fn reference_files_for(&self, locale: &str) -> Vec<PathBuf> {
        self.reference_files
            .iter()
            .map(|p| self.root.join(p.replace("{locale}", locale)))
            .collect()
    }

    /// Path relative to the root for display.
    pub fn display<'a>(&self, path: &'a Path) -> std::borrow::Cow<'a, str> {
        path.strip_prefix(&self.root)
            .unwrap_or(path)
            .to_string_lossy()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unreadable_config_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join(CONFIG_FILE)).unwrap();
        let err = load_config(dir.path()).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }), "{err}");
    }

    #[test]
    fn defaults_reproduce_the_fixed_layout() {
        let l = ProjectLayout::with_defaults("/site");
        assert_eq!(l.site_config, PathBuf::from("/site/astro.config.mjs"));
        assert_eq!(
            l.translations,
            PathBuf::from("/site/src/config/translationData.json.ts")
        );
        assert_eq!(
            l.content_roots,
            vec![
                PathBuf::from("/site/src/content"),
                PathBuf::from("/site/src/config")
            ]
        );
        assert_eq!(
            l.reference_files_for("fr"),
            vec![PathBuf::from("/site/src/config/fr/navData.json.ts")]
        );
        assert_eq!(l.keyed_maps[1].render("de"), "\"DE\"");
        assert_eq!(l.display(&l.site_config), "astro.config.mjs");
    }

    #[test]
    fn project_file_overrides_defaults() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join(CONFIG_FILE),
            r#"
site_config = "astro.config.ts"
cms_schema = ""
content_roots = ["content"]

[[keyed_maps]]
name = "flags"
template = "\"/flags/{locale}.svg\""
"#,
        )
        .unwrap();
        let cfg = load_config(dir.path()).unwrap();
        let l = ProjectLayout::from_config(dir.path(), &cfg);
        assert_eq!(l.site_config, dir.path().join("astro.config.ts"));
        assert_eq!(l.cms_schema, None);
        assert_eq!(l.content_roots, vec![dir.path().join("content")]);
        assert_eq!(l.keyed_maps, vec![KeyedMapSpec::new("flags", "\"/flags/{locale}.svg\"")]);
        assert_eq!(l.keyed_maps[0].render("fr"), "\"/flags/fr.svg\"");
        // untouched keys keep their defaults
        assert_eq!(l.routes_root, dir.path().join("src/pages"));
    }

    #[test]
    fn malformed_file_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(CONFIG_FILE), "site_config = [").unwrap();
        assert!(matches!(
            load_config(dir.path()),
            Err(ConfigError::Parse { .. })
        ));
    }

    #[test]
    fn merge_keeps_first_value() {
        let a = RelocaleConfig {
            routes_root: Some("pages".into()),
            ..Default::default()
        };
        let b = RelocaleConfig {
            routes_root: Some("other".into()),
            log_dir: Some("logs".into()),
            ..Default::default()
        };
        let m = merge(a, b);
        assert_eq!(m.routes_root.as_deref(), Some("pages"));
        assert_eq!(m.log_dir.as_deref(), Some("logs"));
    }
}
