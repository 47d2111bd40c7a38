use std::path::Path;

use super::SyntaxTree;
use crate::error::GosqlfmtError;

/// Serialize the tree back to source text.
///
/// Bytes outside modified literals are copied verbatim from the original;
/// each modified literal's span is replaced by its current value.
pub fn print(tree: &SyntaxTree) -> Result<String, GosqlfmtError> {
    let source = tree.source();
    let mut out = String::with_capacity(source.len());
    let mut cursor = 0;

    for (_, literal) in tree.literals().filter(|(_, l)| l.is_modified()) {
        let span = &literal.span;
        if span.start < cursor || span.end > source.len() || span.start > span.end {
            return Err(GosqlfmtError::PrintFailed {
                path: tree.path().to_path_buf(),
                reason: format!(
                    "literal at {} has span {}..{} outside the printable range {cursor}..{}",
                    literal.start,
                    span.start,
                    span.end,
                    source.len()
                ),
            });
        }
        let Some(between) = source.get(cursor..span.start) else {
            return Err(GosqlfmtError::PrintFailed {
                path: tree.path().to_path_buf(),
                reason: format!("literal at {} splits a character", literal.start),
            });
        };
        out.push_str(between);
        out.push_str(literal.value());
        cursor = span.end;
    }

    match source.get(cursor..) {
        Some(rest) => out.push_str(rest),
        None => {
            return Err(GosqlfmtError::PrintFailed {
                path: tree.path().to_path_buf(),
                reason: "trailing text splits a character".into(),
            });
        }
    }

    Ok(out)
}

/// Check that printed output is still a syntactically valid Go file.
pub fn canonicalize(path: &Path, printed: &str) -> Result<(), GosqlfmtError> {
    let Some(tree) = super::parse::parse_ts(printed) else {
        return Err(GosqlfmtError::CanonicalizeFailed {
            path: path.to_path_buf(),
            position: None,
            reason: "parser produced no tree".into(),
        });
    };
    let root = tree.root_node();
    if root.has_error() {
        let (position, reason) = super::parse::describe_first_error(root, printed);
        return Err(GosqlfmtError::CanonicalizeFailed {
            path: path.to_path_buf(),
            position,
            reason,
        });
    }
    Ok(())
}
