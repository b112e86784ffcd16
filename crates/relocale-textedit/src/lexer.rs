//! A forgiving tokenizer for JS/TS configuration modules.
//!
//! It only distinguishes what block editing needs: words, string literals,
//! comments, whitespace and single punctuation characters. It never fails:
//! unterminated quotes end at the line break, unterminated comments and
//! templates run to the end of input.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    /// `[A-Za-z0-9_$]+`
    Word,
    /// `'..'` or `".."`
    Str,
    /// `` `..` `` including any `${..}` interpolation
    Template,
    LineComment,
    BlockComment,
    Whitespace,
    Punct(char),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub start: usize,
    pub end: usize,
}

impl Token {
    pub fn text<'a>(&self, src: &'a str) -> &'a str {
        &src[self.start..self.end]
    }

    pub fn is_trivia(&self) -> bool {
        matches!(
            self.kind,
            TokenKind::Whitespace | TokenKind::LineComment | TokenKind::BlockComment
        )
    }

    pub fn is_punct(&self, c: char) -> bool {
        self.kind == TokenKind::Punct(c)
    }

    /// Content of a string literal without its quotes; `None` for other kinds.
    pub fn str_value<'a>(&self, src: &'a str) -> Option<&'a str> {
        if self.kind != TokenKind::Str {
            return None;
        }
        let raw = self.text(src);
        let inner = &raw[1..];
        Some(inner.strip_suffix(&raw[..1]).unwrap_or(inner))
    }
}

fn is_word_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == '$'
}

struct Lexer<'a> {
    src: &'a str,
    pos: usize,
}

impl<'a> Lexer<'a> {
    fn peek(&self) -> Option<char> {
        self.src[self.pos..].chars().next()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    fn eat_while(&mut self, pred: impl Fn(char) -> bool) {
        while let Some(c) = self.peek() {
            if !pred(c) {
                break;
            }
            self.pos += c.len_utf8();
        }
    }

    fn quoted(&mut self, quote: char) {
        while let Some(c) = self.peek() {
            match c {
                '\\' => {
                    self.bump();
                    self.bump();
                }
                '\n' => return,
                _ if c == quote => {
                    self.bump();
                    return;
                }
                _ => {
                    self.bump();
                }
            }
        }
    }

    fn template(&mut self) {
        while let Some(c) = self.bump() {
            match c {
                '\\' => {
                    self.bump();
                }
                '`' => return,
                '$' if self.peek() == Some('{') => {
                    self.bump();
                    self.interpolation();
                }
                _ => {}
            }
        }
    }

    /// Consume tokens up to the `}` closing a `${`.
    fn interpolation(&mut self) {
        let mut depth = 0usize;
        while let Some(tok) = self.next_token() {
            match tok.kind {
                TokenKind::Punct('{') => depth += 1,
                TokenKind::Punct('}') if depth == 0 => return,
                TokenKind::Punct('}') => depth -= 1,
                _ => {}
            }
        }
    }

    fn next_token(&mut self) -> Option<Token> {
        let start = self.pos;
        let c = self.bump()?;
        let kind = match c {
            c if c.is_whitespace() => {
                self.eat_while(char::is_whitespace);
                TokenKind::Whitespace
            }
            c if is_word_char(c) => {
                self.eat_while(is_word_char);
                TokenKind::Word
            }
            '"' | '\'' => {
                self.quoted(c);
                TokenKind::Str
            }
            '`' => {
                self.template();
                TokenKind::Template
            }
            '/' if self.peek() == Some('/') => {
                self.eat_while(|c| c != '\n');
                TokenKind::LineComment
            }
            '/' if self.peek() == Some('*') => {
                self.bump();
                loop {
                    match self.bump() {
                        None => break,
                        Some('*') if self.peek() == Some('/') => {
                            self.bump();
                            break;
                        }
                        Some(_) => {}
                    }
                }
                TokenKind::BlockComment
            }
            other => TokenKind::Punct(other),
        };
        Some(Token {
            kind,
            start,
            end: self.pos,
        })
    }
}

pub fn tokenize(src: &str) -> Vec<Token> {
    let mut lx = Lexer { src, pos: 0 };
    let mut out = Vec::new();
    while let Some(tok) = lx.next_token() {
        out.push(tok);
    }
    out
}

/// Index of the next non-trivia token at or after `from`.
pub fn next_sig(tokens: &[Token], from: usize) -> Option<usize> {
    (from..tokens.len()).find(|&i| !tokens[i].is_trivia())
}

/// Index of the previous non-trivia token strictly before `before`.
pub fn prev_sig(tokens: &[Token], before: usize) -> Option<usize> {
    (0..before).rev().find(|&i| !tokens[i].is_trivia())
}

/// Index of the bracket closing the one at `open`, tracking `{}`, `[]` and `()`.
pub fn matching_close(tokens: &[Token], open: usize) -> Option<usize> {
    let mut depth = 0usize;
    for (i, tok) in tokens.iter().enumerate().skip(open) {
        match tok.kind {
            TokenKind::Punct('{' | '[' | '(') => depth += 1,
            TokenKind::Punct('}' | ']' | ')') => {
                depth = depth.checked_sub(1)?;
                if depth == 0 {
                    return Some(i);
                }
            }
            _ => {}
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(src: &str) -> Vec<TokenKind> {
        tokenize(src)
            .into_iter()
            .filter(|t| !t.is_trivia())
            .map(|t| t.kind)
            .collect()
    }

    #[test]
    fn braces_inside_strings_and_comments_are_not_punctuation() {
        let src = r#"a: "{", // }
  b: '}' /* { */"#;
        assert_eq!(
            kinds(src),
            vec![
                TokenKind::Word,
                TokenKind::Punct(':'),
                TokenKind::Str,
                TokenKind::Punct(','),
                TokenKind::Word,
                TokenKind::Punct(':'),
                TokenKind::Str,
            ]
        );
    }

    #[test]
    fn template_with_interpolation_is_one_token() {
        let src = "x = `a ${ {b: `}`}.b } c`;";
        let ks = kinds(src);
        assert_eq!(
            ks,
            vec![
                TokenKind::Word,
                TokenKind::Punct('='),
                TokenKind::Template,
                TokenKind::Punct(';'),
            ]
        );
    }

    #[test]
    fn unterminated_quote_stops_at_newline() {
        let toks = tokenize("a = \"oops\nb = 1");
        let b = toks.iter().find(|t| t.text("a = \"oops\nb = 1") == "b");
        assert!(b.is_some());
    }

    #[test]
    fn str_value_strips_quotes() {
        let src = r#""en-US""#;
        let toks = tokenize(src);
        assert_eq!(toks[0].str_value(src), Some("en-US"));
    }

    #[test]
    fn matching_close_handles_nesting() {
        let src = "{ a: { b: [1, (2)] }, c: 3 } tail";
        let toks = tokenize(src);
        let close = matching_close(&toks, 0).unwrap();
        assert_eq!(toks[close].start, src.rfind('}').unwrap());
    }
}
