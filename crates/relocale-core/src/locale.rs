use std::fmt;
use std::str::FromStr;

use once_cell::sync::OnceCell;
use regex::Regex;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LocaleError {
    #[error("invalid locale format `{0}`; use a form like 'en' or 'en-US'")]
    InvalidFormat(String),
}

fn locale_re() -> &'static Regex {
    static LOCALE_RE: OnceCell<Regex> = OnceCell::new();
    LOCALE_RE.get_or_init(|| Regex::new(r"^[a-z]{2}(-[A-Z]{2})?$").unwrap())
}

/// A validated `language[-REGION]` code such as `en` or `en-US`.
///
/// Used both as an object key inside configuration files and as a directory
/// name, so it never contains whitespace or path separators.
#[derive(
    Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, JsonSchema,
)]
#[serde(transparent)]
pub struct LocaleCode(String);

impl LocaleCode {
    /// Validate `raw` exactly as given.
    pub fn parse(raw: &str) -> Result<Self, LocaleError> {
        if locale_re().is_match(raw) {
            Ok(Self(raw.to_string()))
        } else {
            Err(LocaleError::InvalidFormat(raw.to_string()))
        }
    }

    /// Normalize operator input and validate it: whitespace is dropped, the
    /// language part is lowercased and the region part uppercased.
    pub fn sanitize(raw: &str) -> Result<Self, LocaleError> {
        let compact: String = raw.chars().filter(|c| !c.is_whitespace()).collect();
        let normalized = match compact.split_once('-') {
            Some((lang, region)) => {
                format!("{}-{}", lang.to_lowercase(), region.to_uppercase())
            }
            None => compact.to_lowercase(),
        };
        Self::parse(&normalized)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn language(&self) -> &str {
        self.0.split('-').next().unwrap_or(&self.0)
    }

    pub fn region(&self) -> Option<&str> {
        self.0.split_once('-').map(|(_, r)| r)
    }

    /// Suffix used in compound identifiers: `en` -> `En`, `en-US` -> `EnUS`.
    pub fn ident_suffix(&self) -> String {
        let lang = self.language();
        let mut out = String::with_capacity(self.0.len());
        let mut chars = lang.chars();
        if let Some(first) = chars.next() {
            out.extend(first.to_uppercase());
            out.push_str(chars.as_str());
        }
        if let Some(region) = self.region() {
            out.push_str(region);
        }
        out
    }

    /// Uppercase identifier form: `en` -> `EN`, `en-US` -> `ENUS`.
    pub fn upper_ident(&self) -> String {
        self.0.replace('-', "").to_uppercase()
    }

    /// True when the code can stand as a bare object key (no `-`).
    pub fn is_bare_key(&self) -> bool {
        !self.0.contains('-')
    }
}

impl fmt::Display for LocaleCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for LocaleCode {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl FromStr for LocaleCode {
    type Err = LocaleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// Unique locale codes in insertion order.
///
/// Membership ignores order; rendering (array literals, logs) follows the
/// order codes were inserted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(transparent)]
pub struct LocaleSet(Vec<LocaleCode>);

impl LocaleSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Desired set as entered by the operator: the additional codes first,
    /// then the default, first occurrence wins.
    pub fn desired(default: &LocaleCode, additional: &[LocaleCode]) -> Self {
        let mut set: LocaleSet = additional.iter().cloned().collect();
        set.insert(default.clone());
        set
    }

    /// Parse every entry strictly; the first invalid code is reported.
    pub fn parse_all<S: AsRef<str>>(items: &[S]) -> Result<Self, LocaleError> {
        let mut set = Self::new();
        for item in items {
            set.insert(LocaleCode::parse(item.as_ref())?);
        }
        Ok(set)
    }

    /// Returns false when the code was already present.
    pub fn insert(&mut self, code: LocaleCode) -> bool {
        if self.contains(&code) {
            return false;
        }
        self.0.push(code);
        true
    }

    pub fn contains(&self, code: &LocaleCode) -> bool {
        self.0.iter().any(|c| c == code)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, LocaleCode> {
        self.0.iter()
    }

    pub fn as_slice(&self) -> &[LocaleCode] {
        &self.0
    }

    /// Codes of `self` missing from `other`, in `self`'s order.
    pub fn difference(&self, other: &LocaleSet) -> LocaleSet {
        self.0
            .iter()
            .filter(|c| !other.contains(c))
            .cloned()
            .collect()
    }

    pub fn without(&self, code: &LocaleCode) -> LocaleSet {
        self.0.iter().filter(|c| *c != code).cloned().collect()
    }

    /// `"en", "fr"` as used inside an array literal.
    pub fn render_quoted(&self) -> String {
        self.0
            .iter()
            .map(|c| format!("\"{c}\""))
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl FromIterator<LocaleCode> for LocaleSet {
    fn from_iter<I: IntoIterator<Item = LocaleCode>>(iter: I) -> Self {
        let mut set = LocaleSet::new();
        for code in iter {
            set.insert(code);
        }
        set
    }
}

impl<'a> IntoIterator for &'a LocaleSet {
    type Item = &'a LocaleCode;
    type IntoIter = std::slice::Iter<'a, LocaleCode>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl fmt::Display for LocaleSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}]", self.render_quoted())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn code(s: &str) -> LocaleCode {
        LocaleCode::parse(s).unwrap()
    }

    #[test]
    fn parse_accepts_language_and_region() {
        assert!(LocaleCode::parse("en").is_ok());
        assert!(LocaleCode::parse("en-US").is_ok());
        assert!(LocaleCode::parse("EN").is_err());
        assert!(LocaleCode::parse("en-us").is_err());
        assert!(LocaleCode::parse("eng").is_err());
        assert!(LocaleCode::parse("").is_err());
        assert!(LocaleCode::parse("en/US").is_err());
    }

    #[test]
    fn sanitize_normalizes_case_and_whitespace() {
        assert_eq!(LocaleCode::sanitize(" E N ").unwrap().as_str(), "en");
        assert_eq!(LocaleCode::sanitize("en-us").unwrap().as_str(), "en-US");
        assert_eq!(
            LocaleCode::sanitize("fr_FR"),
            Err(LocaleError::InvalidFormat("fr_fr".into()))
        );
    }

    #[test]
    fn identifier_forms() {
        assert_eq!(code("en").ident_suffix(), "En");
        assert_eq!(code("pt-BR").ident_suffix(), "PtBR");
        assert_eq!(code("fr").upper_ident(), "FR");
        assert_eq!(code("pt-BR").upper_ident(), "PTBR");
        assert!(code("de").is_bare_key());
        assert!(!code("de-AT").is_bare_key());
    }

    #[test]
    fn desired_appends_default_last_and_dedupes() {
        let set = LocaleSet::desired(&code("en"), &[code("fr"), code("en"), code("fr")]);
        assert_eq!(set.render_quoted(), r#""fr", "en""#);

        let single = LocaleSet::desired(&code("de"), &[]);
        assert_eq!(single.as_slice(), &[code("de")]);
    }

    #[test]
    fn difference_keeps_left_order() {
        let a: LocaleSet = [code("de"), code("en"), code("es")].into_iter().collect();
        let b: LocaleSet = [code("en")].into_iter().collect();
        assert_eq!(a.difference(&b).to_string(), r#"["de", "es"]"#);
    }
}
