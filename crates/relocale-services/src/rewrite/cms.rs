use relocale_core::Diff;
use relocale_textedit::Document;

use crate::Result;

/// Best-effort edit of the CMS schema: lines that register a collection for
/// the source locale (`blogEN: Collections.Blog("en"),`) are cloned per added
/// locale, lines mentioning a removed locale are dropped, and a default
/// rename rewrites the quoted code and the uppercase key suffix.
pub fn rewrite_cms(doc: &mut Document, diff: &Diff) -> Result<()> {
    let source = diff.clone_source();
    let call = format!("(\"{source}\")");
    let key = format!("{}:", source.upper_ident());

    if !diff.to_add().is_empty() {
        let text = doc.as_str();
        let mut out = String::with_capacity(text.len());
        let mut cloned = 0usize;
        for line in text.split_inclusive('\n') {
            out.push_str(line);
            let body = line.trim_end_matches(['\n', '\r']);
            if !body.contains(&call) {
                continue;
            }
            for loc in diff.to_add() {
                let copy = body
                    .replacen(&key, &format!("{}:", loc.upper_ident()), 1)
                    .replace(&call, &format!("(\"{loc}\")"));
                if text.lines().any(|l| l == copy) {
                    continue;
                }
                if !out.ends_with('\n') {
                    out.push('\n');
                }
                out.push_str(&copy);
                if line.ends_with('\n') {
                    out.push('\n');
                }
                cloned += 1;
            }
        }
        tracing::debug!(event = "cms_lines_cloned", cloned);
        *doc = Document::new(out);
    }

    for loc in diff.to_remove() {
        let quoted = format!("\"{loc}\"");
        let n = doc.remove_lines(|l| l.contains(&quoted));
        tracing::debug!(event = "cms_lines_removed", locale = %loc, removed = n);
    }

    if diff.rename_default() {
        let (old, new) = (diff.old_default(), diff.new_default());
        let call = format!("(\"{old}\")");
        let (old_key, new_key) = (
            format!("{}:", old.upper_ident()),
            format!("{}:", new.upper_ident()),
        );
        // key suffixes only change on the lines that register the old code
        let renamed: String = doc
            .as_str()
            .split_inclusive('\n')
            .map(|line| {
                if line.contains(&call) {
                    line.replacen(&old_key, &new_key, 1)
                } else {
                    line.to_string()
                }
            })
            .collect();
        *doc = Document::new(renamed);
        doc.replace_string_literal(old.as_str(), new.as_str());
    }
    Ok(())
}
