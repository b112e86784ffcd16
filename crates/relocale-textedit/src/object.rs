//! A shallow model of one object literal: its top-level entries are parsed,
//! their values are kept as raw text. Nested braces inside a value are
//! matched exactly, so a value may itself be an object of any depth.

use crate::lexer::{next_sig, Token, TokenKind};
use crate::EditError;

/// One `key: value,` member of an object literal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    /// Whitespace and comments between the previous comma (or `{`) and the key.
    pub lead: String,
    /// Unquoted key; `None` for spreads and shorthand members.
    pub key: Option<String>,
    /// Quote character when the key was written quoted.
    pub quote: Option<char>,
    /// Raw text after the `:` (the whole member when `key` is `None`).
    pub body: String,
    pub comma: bool,
}

impl Entry {
    pub fn new(key: &str, body: impl Into<String>, lead: impl Into<String>) -> Self {
        Self {
            lead: lead.into(),
            key: Some(key.to_string()),
            quote: None,
            body: body.into(),
            comma: true,
        }
    }

    pub fn has_key(&self, key: &str) -> bool {
        self.key.as_deref() == Some(key)
    }

    /// The lead reduced to its final line break and indentation.
    pub fn indent(&self) -> String {
        match self.lead.rfind('\n') {
            Some(i) => self.lead[i..].to_string(),
            None => self.lead.clone(),
        }
    }

    fn render_into(&self, out: &mut String) {
        out.push_str(&self.lead);
        match &self.key {
            Some(key) => {
                match self.quote {
                    Some(q) => {
                        out.push(q);
                        out.push_str(key);
                        out.push(q);
                    }
                    None => out.push_str(&render_key(key)),
                }
                out.push(':');
            }
            None => {}
        }
        out.push_str(&self.body);
        if self.comma {
            out.push(',');
        }
    }
}

/// Bare identifiers stay bare, anything else (e.g. `en-US`) is quoted.
pub fn render_key(key: &str) -> String {
    let bare = !key.is_empty()
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$');
    if bare {
        key.to_string()
    } else {
        format!("\"{key}\"")
    }
}

/// Where a new entry goes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Anchor<'a> {
    /// Right after the opening brace.
    Start,
    /// Right after the entry with this key (falls back to the end).
    After(&'a str),
    End,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectLiteral {
    /// Byte offset of `{`.
    pub open: usize,
    /// Byte offset one past `}`.
    pub end: usize,
    pub entries: Vec<Entry>,
    /// Text after the last entry, up to `}`.
    pub tail: String,
}

impl ObjectLiteral {
    /// Parse the object whose `{` is `tokens[open]`.
    pub fn parse(src: &str, tokens: &[Token], open: usize) -> Result<Self, EditError> {
        let open_tok = tokens[open];
        let unbalanced = || EditError::Unbalanced {
            offset: open_tok.start,
        };
        let mut entries = Vec::new();
        let mut seg_start = open_tok.end;
        let mut i = open + 1;

        loop {
            let first = next_sig(tokens, i).ok_or_else(unbalanced)?;
            if tokens[first].is_punct('}') {
                return Ok(Self {
                    open: open_tok.start,
                    end: tokens[first].end,
                    entries,
                    tail: src[seg_start..tokens[first].start].to_string(),
                });
            }

            let lead = src[seg_start..tokens[first].start].to_string();
            let mut key = None;
            let mut quote = None;
            let mut body_start = tokens[first].start;
            let mut scan = first;
            if matches!(tokens[first].kind, TokenKind::Word | TokenKind::Str) {
                if let Some(colon) = next_sig(tokens, first + 1) {
                    if tokens[colon].is_punct(':') {
                        let tok = tokens[first];
                        match tok.str_value(src) {
                            Some(v) => {
                                key = Some(v.to_string());
                                quote = src[tok.start..].chars().next();
                            }
                            None => key = Some(tok.text(src).to_string()),
                        }
                        body_start = tokens[colon].end;
                        scan = colon + 1;
                    }
                }
            }

            // Walk the value to the comma or brace that ends it at depth 0.
            let mut depth = 0usize;
            let mut last_sig_end = body_start;
            let mut j = scan;
            let terminator = loop {
                let tok = *tokens.get(j).ok_or_else(unbalanced)?;
                match tok.kind {
                    TokenKind::Punct('{' | '[' | '(') => depth += 1,
                    TokenKind::Punct('}' | ']' | ')') if depth > 0 => depth -= 1,
                    TokenKind::Punct('}') => break j,
                    TokenKind::Punct(']' | ')') => return Err(unbalanced()),
                    TokenKind::Punct(',') if depth == 0 => break j,
                    _ => {}
                }
                if !tok.is_trivia() {
                    last_sig_end = tok.end;
                }
                j += 1;
            };

            let comma = tokens[terminator].is_punct(',');
            let body = if comma {
                src[body_start..tokens[terminator].start]
                    .trim_end()
                    .to_string()
            } else {
                src[body_start..last_sig_end].to_string()
            };
            entries.push(Entry {
                lead,
                key,
                quote,
                body,
                comma,
            });

            if comma {
                seg_start = tokens[terminator].end;
                i = terminator + 1;
            } else {
                seg_start = last_sig_end;
                i = terminator;
            }
        }
    }

    pub fn keys(&self) -> Vec<&str> {
        self.entries.iter().filter_map(|e| e.key.as_deref()).collect()
    }

    pub fn position(&self, key: &str) -> Option<usize> {
        self.entries.iter().position(|e| e.has_key(key))
    }

    pub fn get(&self, key: &str) -> Option<&Entry> {
        self.entries.iter().find(|e| e.has_key(key))
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut Entry> {
        self.entries.iter_mut().find(|e| e.has_key(key))
    }

    /// Indentation for a new member: copied from an existing one.
    pub fn member_indent(&self) -> String {
        self.entries
            .iter()
            .find(|e| e.lead.contains('\n'))
            .map(Entry::indent)
            .unwrap_or_else(|| "\n  ".to_string())
    }

    /// Insert `entry` at `anchor`. Returns false (and inserts nothing) when
    /// an entry with the same key already exists.
    pub fn insert(&mut self, mut entry: Entry, anchor: Anchor<'_>) -> bool {
        if let Some(key) = entry.key.as_deref() {
            if self.position(key).is_some() {
                return false;
            }
        }
        let idx = match anchor {
            Anchor::Start => 0,
            Anchor::After(key) => self
                .position(key)
                .map(|p| p + 1)
                .unwrap_or(self.entries.len()),
            Anchor::End => self.entries.len(),
        };
        if idx > 0 {
            self.entries[idx - 1].comma = true;
        }
        entry.comma = true;
        self.entries.insert(idx, entry);
        true
    }

    /// Remove every entry with `key`; returns how many were removed.
    pub fn remove(&mut self, key: &str) -> usize {
        let before = self.entries.len();
        self.entries.retain(|e| !e.has_key(key));
        before - self.entries.len()
    }

    /// Copy the entry `source` verbatim under `new_key`, indentation included.
    pub fn duplicate_as(
        &mut self,
        source: &str,
        new_key: &str,
        anchor: Anchor<'_>,
    ) -> Result<bool, EditError> {
        let src = self.get(source).ok_or_else(|| EditError::MissingKey {
            key: source.to_string(),
        })?;
        let mut copy = src.clone();
        copy.lead = src.indent();
        copy.key = Some(new_key.to_string());
        copy.quote = None;
        Ok(self.insert(copy, anchor))
    }

    /// Rename the key of every matching entry; quoting follows the new key.
    pub fn rename(&mut self, old: &str, new: &str) -> usize {
        let mut n = 0;
        for e in self.entries.iter_mut().filter(|e| e.has_key(old)) {
            e.key = Some(new.to_string());
            e.quote = None;
            n += 1;
        }
        n
    }

    pub fn render(&self) -> String {
        let mut out = String::from("{");
        for e in &self.entries {
            e.render_into(&mut out);
        }
        out.push_str(&self.tail);
        out.push('}');
        out
    }
}
