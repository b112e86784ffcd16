use std::ops::Range;

use crate::lexer::{matching_close, next_sig, prev_sig, tokenize, Token, TokenKind};
use crate::object::{render_key, Anchor, ObjectLiteral};
use crate::EditError;

type Edit = (Range<usize>, String);

/// A configuration module held as text. Every primitive re-tokenizes, edits
/// only the spans it owns and leaves the rest untouched.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Document {
    text: String,
}

impl Document {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn into_string(self) -> String {
        self.text
    }

    fn tokens(&self) -> Vec<Token> {
        tokenize(&self.text)
    }

    fn apply(&mut self, mut edits: Vec<Edit>) -> usize {
        edits.sort_by(|a, b| b.0.start.cmp(&a.0.start));
        let mut applied = 0;
        let mut floor = usize::MAX;
        for (range, replacement) in edits {
            // overlapping spans: the later-starting (inner) edit wins
            if range.end > floor {
                continue;
            }
            floor = range.start;
            self.text.replace_range(range, &replacement);
            applied += 1;
        }
        applied
    }

    /// Token index of the value assigned to the word at `idx`
    /// (`key = value` or `key: value`).
    fn assigned_value(&self, tokens: &[Token], idx: usize) -> Option<usize> {
        let op = next_sig(tokens, idx + 1)?;
        let is_assign = tokens[op].is_punct('=')
            && !tokens
                .get(op + 1)
                .is_some_and(|t| t.is_punct('=') || t.is_punct('>'));
        if !(is_assign || tokens[op].is_punct(':')) {
            return None;
        }
        next_sig(tokens, op + 1)
    }

    fn words<'t>(&'t self, tokens: &'t [Token], key: &'t str) -> impl Iterator<Item = usize> + 't {
        tokens.iter().enumerate().filter_map(move |(i, t)| {
            (t.kind == TokenKind::Word && t.text(&self.text) == key).then_some(i)
        })
    }

    /// First string assigned to `key`.
    pub fn read_scalar(&self, key: &str) -> Option<String> {
        let tokens = self.tokens();
        let found = self
            .words(&tokens, key)
            .filter_map(|i| self.assigned_value(&tokens, i))
            .find_map(|v| tokens[v].str_value(&self.text).map(str::to_string));
        found
    }

    /// Replace every `key = "old"` / `key: "old"` with the new value, keeping
    /// the quote style. Returns the number of replacements; zero is not an error.
    pub fn replace_scalar(&mut self, key: &str, old: &str, new: &str) -> usize {
        let tokens = self.tokens();
        let edits: Vec<Edit> = self
            .words(&tokens, key)
            .filter_map(|i| self.assigned_value(&tokens, i))
            .filter(|&v| tokens[v].str_value(&self.text) == Some(old))
            .map(|v| {
                let tok = tokens[v];
                let q = &self.text[tok.start..tok.start + 1];
                (tok.start..tok.end, format!("{q}{new}{q}"))
            })
            .collect();
        self.apply(edits)
    }

    /// String elements of an array literal: `(open, close, values)`.
    fn string_array(&self, tokens: &[Token], open: usize) -> Option<(usize, usize, Vec<String>)> {
        if !tokens[open].is_punct('[') {
            return None;
        }
        let close = matching_close(tokens, open)?;
        let mut values = Vec::new();
        for tok in &tokens[open + 1..close] {
            if tok.is_trivia() || tok.is_punct(',') {
                continue;
            }
            values.push(tok.str_value(&self.text)?.to_string());
        }
        Some((open, close, values))
    }

    /// First array of strings assigned to `key`.
    pub fn read_array(&self, key: &str) -> Option<Vec<String>> {
        let tokens = self.tokens();
        let found = self
            .words(&tokens, key)
            .filter_map(|i| self.assigned_value(&tokens, i))
            .find_map(|v| self.string_array(&tokens, v))
            .map(|(_, _, values)| values);
        found
    }

    /// Rewrite every string array assigned to `key` as `"a", "b"`.
    pub fn replace_array<S: AsRef<str>>(&mut self, key: &str, values: &[S]) -> usize {
        let rendered = values
            .iter()
            .map(|v| format!("\"{}\"", v.as_ref()))
            .collect::<Vec<_>>()
            .join(", ");
        let tokens = self.tokens();
        let edits: Vec<Edit> = self
            .words(&tokens, key)
            .filter_map(|i| self.assigned_value(&tokens, i))
            .filter_map(|v| self.string_array(&tokens, v))
            .map(|(open, close, _)| (tokens[open].end..tokens[close].start, rendered.clone()))
            .collect();
        self.apply(edits)
    }

    /// Token index of the `{` of the object bound to `name`, accepting
    /// `name = {`, `name: {` and `name: Type = {`.
    fn find_object(&self, tokens: &[Token], name: &str) -> Option<usize> {
        self.words(tokens, name).find_map(|i| {
            let op = next_sig(tokens, i + 1)?;
            if tokens[op].is_punct('=') {
                let v = next_sig(tokens, op + 1)?;
                return tokens[v].is_punct('{').then_some(v);
            }
            if !tokens[op].is_punct(':') {
                return None;
            }
            let v = next_sig(tokens, op + 1)?;
            if tokens[v].is_punct('{') {
                // `{ .. } = {` is an inline type followed by the value
                let after = matching_close(tokens, v).and_then(|c| next_sig(tokens, c + 1));
                match after {
                    Some(a) if tokens[a].is_punct('=') => {
                        let value = next_sig(tokens, a + 1)?;
                        return tokens[value].is_punct('{').then_some(value);
                    }
                    _ => return Some(v),
                }
            }
            // type annotation: skip to the `=` at depth 0
            let mut depth = 0usize;
            let mut j = v;
            while let Some(tok) = tokens.get(j) {
                match tok.kind {
                    TokenKind::Punct('(' | '[' | '{' | '<') => depth += 1,
                    TokenKind::Punct(')' | ']' | '}' | '>') => depth = depth.saturating_sub(1),
                    TokenKind::Punct(';') if depth == 0 => return None,
                    TokenKind::Punct('=') if depth == 0 => {
                        let value = next_sig(tokens, j + 1)?;
                        return tokens[value].is_punct('{').then_some(value);
                    }
                    _ => {}
                }
                j += 1;
            }
            None
        })
    }

    pub fn object(&self, name: &str) -> Result<Option<ObjectLiteral>, EditError> {
        let tokens = self.tokens();
        match self.find_object(&tokens, name) {
            Some(open) => ObjectLiteral::parse(&self.text, &tokens, open).map(Some),
            None => Ok(None),
        }
    }

    pub fn has_object(&self, name: &str) -> bool {
        let tokens = self.tokens();
        self.find_object(&tokens, name).is_some()
    }

    /// Parse the object bound to `name`, let `f` mutate it, render it back.
    pub fn edit_object<T>(
        &mut self,
        name: &str,
        f: impl FnOnce(&mut ObjectLiteral) -> T,
    ) -> Result<T, EditError> {
        let mut obj = self
            .object(name)?
            .ok_or_else(|| EditError::MissingObject(name.to_string()))?;
        let out = f(&mut obj);
        let rendered = obj.render();
        if self.text[obj.open..obj.end] != rendered {
            self.text.replace_range(obj.open..obj.end, &rendered);
        }
        Ok(out)
    }

    /// Token indices where `key` (bare or quoted) is used as an object key.
    fn key_positions(&self, tokens: &[Token], key: &str) -> Vec<usize> {
        tokens
            .iter()
            .enumerate()
            .filter(|(_, t)| match t.kind {
                TokenKind::Word => t.text(&self.text) == key,
                TokenKind::Str => t.str_value(&self.text) == Some(key),
                _ => false,
            })
            .filter(|(i, _)| {
                let colon = next_sig(tokens, i + 1).is_some_and(|n| tokens[n].is_punct(':'));
                let opens = prev_sig(tokens, *i)
                    .is_some_and(|p| tokens[p].is_punct('{') || tokens[p].is_punct(','));
                colon && opens
            })
            .map(|(i, _)| i)
            .collect()
    }

    /// Delete every `key: <value>,` member wherever it occurs, together with
    /// the line it starts on.
    pub fn remove_keyed_block(&mut self, key: &str) -> usize {
        let tokens = self.tokens();
        let mut edits = Vec::new();
        for k in self.key_positions(&tokens, key) {
            let Some(prev) = prev_sig(&tokens, k) else {
                continue;
            };
            let gap_start = tokens[prev].end;
            let start = match self.text[gap_start..tokens[k].start].rfind('\n') {
                Some(nl) => gap_start + nl,
                None => tokens[k].start,
            };
            let Some(colon) = next_sig(&tokens, k + 1) else {
                continue;
            };
            let mut depth = 0usize;
            let mut end = tokens[colon].end;
            for tok in &tokens[colon + 1..] {
                match tok.kind {
                    TokenKind::Punct('{' | '[' | '(') => depth += 1,
                    TokenKind::Punct('}' | ']' | ')') if depth > 0 => depth -= 1,
                    TokenKind::Punct('}' | ']' | ')') => break,
                    TokenKind::Punct(',') if depth == 0 => {
                        end = tok.end;
                        break;
                    }
                    _ => {}
                }
                if !tok.is_trivia() {
                    end = tok.end;
                }
            }
            edits.push((start..end, String::new()));
        }
        self.apply(edits)
    }

    /// Rewrite every `old:` key to `new:`; quoted keys keep their quotes.
    pub fn rename_keyed_block(&mut self, old: &str, new: &str) -> usize {
        let tokens = self.tokens();
        let edits: Vec<Edit> = self
            .key_positions(&tokens, old)
            .into_iter()
            .map(|k| {
                let tok = tokens[k];
                let replacement = if tok.kind == TokenKind::Str {
                    let q = &self.text[tok.start..tok.start + 1];
                    format!("{q}{new}{q}")
                } else {
                    render_key(new)
                };
                (tok.start..tok.end, replacement)
            })
            .collect();
        self.apply(edits)
    }

    /// Clone `source`'s member of `object` under `new_key` and insert it at
    /// `anchor`. Returns false when `new_key` is already present.
    pub fn duplicate_keyed_block_as(
        &mut self,
        object: &str,
        source: &str,
        new_key: &str,
        anchor: Anchor<'_>,
    ) -> Result<bool, EditError> {
        self.edit_object(object, |obj| obj.duplicate_as(source, new_key, anchor))?
    }

    /// Insert `statement` on its own line before the first import line
    /// (or at the top when there is none).
    pub fn prepend_import(&mut self, statement: &str) {
        let tokens = self.tokens();
        let at = tokens
            .iter()
            .filter(|t| t.kind == TokenKind::Word && t.text(&self.text) == "import")
            .map(|t| self.text[..t.start].rfind('\n').map_or(0, |nl| nl + 1))
            .find(|&line_start| {
                self.text[line_start..]
                    .trim_start_matches([' ', '\t'])
                    .starts_with("import")
            })
            .unwrap_or(0);
        let line = format!("{}\n", statement.trim_end());
        self.text.insert_str(at, &line);
    }

    /// Drop every import line for which `pred` holds.
    pub fn remove_import_lines(&mut self, pred: impl Fn(&str) -> bool) -> usize {
        self.remove_lines(|line| line.trim_start().starts_with("import ") && pred(line))
    }

    /// Drop every line for which `pred` holds.
    pub fn remove_lines(&mut self, pred: impl Fn(&str) -> bool) -> usize {
        let mut removed = 0;
        let mut out = String::with_capacity(self.text.len());
        for line in self.text.split_inclusive('\n') {
            if pred(line.trim_end_matches(['\n', '\r'])) {
                removed += 1;
            } else {
                out.push_str(line);
            }
        }
        self.text = out;
        removed
    }

    /// First import line for which `pred` holds.
    pub fn find_import_line(&self, pred: impl Fn(&str) -> bool) -> Option<String> {
        self.text
            .lines()
            .find(|l| l.trim_start().starts_with("import ") && pred(l))
            .map(str::to_string)
    }

    /// Rename a whole identifier (never a substring of a longer one, never
    /// inside strings or comments).
    pub fn rename_word(&mut self, old: &str, new: &str) -> usize {
        let tokens = self.tokens();
        let edits: Vec<Edit> = self
            .words(&tokens, old)
            .map(|i| (tokens[i].start..tokens[i].end, new.to_string()))
            .collect();
        self.apply(edits)
    }

    /// Rewrite every string literal whose whole value is `old`.
    pub fn replace_string_literal(&mut self, old: &str, new: &str) -> usize {
        let tokens = self.tokens();
        let edits: Vec<Edit> = tokens
            .iter()
            .filter(|t| t.str_value(&self.text) == Some(old))
            .map(|t| {
                let q = &self.text[t.start..t.start + 1];
                (t.start..t.end, format!("{q}{new}{q}"))
            })
            .collect();
        self.apply(edits)
    }

    /// Substring replacement restricted to string literals.
    pub fn replace_in_strings(&mut self, from: &str, to: &str) -> usize {
        let tokens = self.tokens();
        let edits: Vec<Edit> = tokens
            .iter()
            .filter(|t| t.kind == TokenKind::Str && t.text(&self.text).contains(from))
            .map(|t| (t.start..t.end, t.text(&self.text).replace(from, to)))
            .collect();
        self.apply(edits)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SETTINGS: &str = r#"// site settings
export const defaultLocale = "en" as const;
export const locales = ["en", "fr"] as const;

export const localeMap = {
  en: "en-US",
  fr: "fr-FR",
} as const;

export const languageSwitcherMap: Record<string, string> = {
  en: "EN",
  fr: "FR",
};
"#;

    #[test]
    fn scalar_read_and_replace() {
        let mut doc = Document::new("i18n: {\n  defaultLocale: 'en',\n},\nconst x = \"en\";");
        assert_eq!(doc.read_scalar("defaultLocale").as_deref(), Some("en"));
        assert_eq!(doc.replace_scalar("defaultLocale", "en", "fr"), 1);
        assert!(doc.as_str().contains("defaultLocale: 'fr'"));
        assert!(doc.as_str().contains("const x = \"en\""));
        // absent old value is a no-op
        assert_eq!(doc.replace_scalar("defaultLocale", "de", "es"), 0);
    }

    #[test]
    fn reads_return_owned_values() {
        let doc = Document::new(SETTINGS);
        let default = doc.read_scalar("defaultLocale");
        let locales = doc.read_array("locales");
        drop(doc);
        assert_eq!(default.as_deref(), Some("en"));
        assert_eq!(locales, Some(vec!["en".to_string(), "fr".to_string()]));
    }

    #[test]
    fn overlapping_edits_keep_the_inner_one() {
        let mut doc = Document::new("abcdef");
        let applied = doc.apply(vec![(0..6, "X".to_string()), (2..4, "y".to_string())]);
        assert_eq!(applied, 1);
        assert_eq!(doc.as_str(), "abyef");
    }

    #[test]
    fn array_read_and_replace() {
        let mut doc = Document::new(SETTINGS);
        assert_eq!(
            doc.read_array("locales"),
            Some(vec!["en".to_string(), "fr".to_string()])
        );
        assert_eq!(doc.replace_array("locales", &["fr", "de"]), 1);
        assert!(doc
            .as_str()
            .contains(r#"export const locales = ["fr", "de"] as const;"#));
    }

    #[test]
    fn objects_found_with_and_without_type_annotation() {
        let doc = Document::new(SETTINGS);
        assert_eq!(doc.object("localeMap").unwrap().unwrap().keys(), vec!["en", "fr"]);
        assert_eq!(
            doc.object("languageSwitcherMap").unwrap().unwrap().keys(),
            vec!["en", "fr"]
        );
        assert!(doc.object("missing").unwrap().is_none());
    }

    #[test]
    fn remove_keyed_block_everywhere() {
        let mut doc = Document::new(SETTINGS);
        assert_eq!(doc.remove_keyed_block("fr"), 2);
        let text = doc.as_str();
        assert!(!text.contains("fr:"));
        assert!(text.contains("  en: \"en-US\",\n} as const;"));
        assert!(text.contains("  en: \"EN\",\n};"));
        // the array literal is untouched
        assert!(text.contains(r#"["en", "fr"]"#));
    }

    #[test]
    fn remove_nested_block_whole() {
        let mut doc = Document::new("const t = {\n  en: {\n    a: { b: 1 },\n  },\n  fr: {\n    a: { b: 2 },\n  },\n};\n");
        assert_eq!(doc.remove_keyed_block("en"), 1);
        assert_eq!(doc.as_str(), "const t = {\n  fr: {\n    a: { b: 2 },\n  },\n};\n");
    }

    #[test]
    fn rename_keyed_block_only_touches_keys() {
        let mut doc = Document::new("const m = {\n  en: \"en\",\n  \"en\": 1,\n};\nconst en = 2;\n");
        assert_eq!(doc.rename_keyed_block("en", "de"), 2);
        assert_eq!(
            doc.as_str(),
            "const m = {\n  de: \"en\",\n  \"de\": 1,\n};\nconst en = 2;\n"
        );
    }

    #[test]
    fn duplicate_block_into_named_object() {
        let mut doc = Document::new(SETTINGS);
        let inserted = doc
            .duplicate_keyed_block_as("localeMap", "en", "de", Anchor::Start)
            .unwrap();
        assert!(inserted);
        assert!(doc
            .as_str()
            .contains("export const localeMap = {\n  de: \"en-US\",\n  en: \"en-US\","));
        let again = doc
            .duplicate_keyed_block_as("localeMap", "en", "de", Anchor::Start)
            .unwrap();
        assert!(!again);
        assert!(matches!(
            doc.duplicate_keyed_block_as("nope", "en", "de", Anchor::Start),
            Err(EditError::MissingObject(_))
        ));
    }

    #[test]
    fn prepend_import_goes_before_first_import() {
        let mut doc = Document::new("/** header */\n\nimport a from \"./en/a.json\";\nimport b from \"./en/b.json\";\n");
        doc.prepend_import("import c from \"./fr/a.json\";");
        assert_eq!(
            doc.as_str(),
            "/** header */\n\nimport c from \"./fr/a.json\";\nimport a from \"./en/a.json\";\nimport b from \"./en/b.json\";\n"
        );
    }

    #[test]
    fn import_lines_removed_by_predicate() {
        let mut doc = Document::new("import a from \"./en/a.json\";\nimport b from \"./fr/a.json\";\nconst p = \"/fr/\";\n");
        assert_eq!(doc.remove_import_lines(|l| l.contains("/fr/")), 1);
        assert_eq!(doc.as_str(), "import a from \"./en/a.json\";\nconst p = \"/fr/\";\n");
    }

    #[test]
    fn rename_word_and_strings() {
        let mut doc = Document::new("import siteDataEn from \"./en/siteData.json\";\nconst x = siteDataEnglish;\n");
        assert_eq!(doc.rename_word("siteDataEn", "siteDataFr"), 1);
        assert_eq!(doc.replace_in_strings("/en/", "/fr/"), 1);
        assert_eq!(
            doc.as_str(),
            "import siteDataFr from \"./fr/siteData.json\";\nconst x = siteDataEnglish;\n"
        );
    }

    #[test]
    fn string_literal_must_match_whole() {
        let mut doc = Document::new("const a = { locale: \"en\", path: \"/en/blog\", b: 'en' };");
        assert_eq!(doc.replace_string_literal("en", "fr"), 2);
        assert_eq!(
            doc.as_str(),
            "const a = { locale: \"fr\", path: \"/en/blog\", b: 'fr' };"
        );
    }
}
