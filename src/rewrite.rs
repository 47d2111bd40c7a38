use crate::syntax::Literal;
use crate::types::Delimiter;

/// One indentation unit, as gofmt writes it.
pub const INDENT_UNIT: &str = "\t";

/// Build a literal's new text from formatted query lines.
///
/// Every line gets `depth + 1` indentation units, so the query sits one
/// level inside the call. The opening delimiter is followed by a newline and
/// the trailing empty line of the formatter's output is indented too, which
/// puts the closing delimiter on its own row.
#[must_use]
pub fn render(delimiter: char, formatted: &str, depth: usize) -> String {
    let indent = INDENT_UNIT.repeat(depth + 1);
    let mut out = String::with_capacity(formatted.len() + 2 + indent.len() * 8);
    out.push(delimiter);
    out.push('\n');
    for (i, line) in formatted.split('\n').enumerate() {
        if i > 0 {
            out.push('\n');
        }
        out.push_str(&indent);
        out.push_str(line);
    }
    out.push(delimiter);
    out
}

/// Store the rendered form of `formatted` into `literal`. Returns whether
/// the value changed. Non-raw literals are never touched.
pub fn rewrite(literal: &mut Literal, formatted: &str, depth: usize) -> bool {
    if literal.delimiter != Delimiter::Backtick {
        return false;
    }
    let rendered = render('`', formatted, depth);
    if rendered == literal.value() {
        return false;
    }
    literal.set_value(rendered);
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Position;

    fn literal(text: &str) -> Literal {
        Literal::new(0..text.len(), Position { line: 1, column: 1 }, text)
    }

    #[test]
    fn renders_one_level_deeper_than_the_call() {
        let formatted = "SELECT\n\ta,\n\tb\nFROM\n\tt\nWHERE\n\tx = 1\n";
        assert_eq!(
            render('`', formatted, 1),
            "`\n\t\tSELECT\n\t\t\ta,\n\t\t\tb\n\t\tFROM\n\t\t\tt\n\t\tWHERE\n\t\t\tx = 1\n\t\t`"
        );
    }

    #[test]
    fn output_without_trailing_newline_closes_on_last_line() {
        assert_eq!(render('`', "select 1", 0), "`\n\tselect 1`");
    }

    #[test]
    fn every_body_line_carries_depth_plus_one_units() {
        let rendered = render('`', "a\nb\nc\n", 3);
        let body = rendered.trim_start_matches('`').trim_end_matches('`');
        for line in body.lines().skip(1) {
            assert!(line.starts_with("\t\t\t\t"), "{line:?}");
            assert!(!line[4..].starts_with('\t'), "{line:?}");
        }
    }

    #[test]
    fn rewrite_sets_value_and_reports_change() {
        let mut lit = literal("`select a,b from t`");
        assert!(rewrite(&mut lit, "select\n\ta,\n\tb\nfrom\n\tt\n", 0));
        assert_eq!(lit.value(), "`\n\tselect\n\t\ta,\n\t\tb\n\tfrom\n\t\tt\n\t`");
        assert!(lit.is_modified());

        // Same input again is a no-op.
        assert!(!rewrite(&mut lit, "select\n\ta,\n\tb\nfrom\n\tt\n", 0));
    }

    #[test]
    fn interpreted_strings_are_left_alone() {
        let mut lit = literal("\"select 1\"");
        assert!(!rewrite(&mut lit, "SELECT 1\n", 1));
        assert_eq!(lit.value(), "\"select 1\"");
    }
}
