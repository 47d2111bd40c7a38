use std::path::Path;

use crate::error::{GosqlfmtError, LiteralError};
use crate::formatter::QueryFormatter;
use crate::indent::LineTable;
use crate::rewrite;
use crate::scan::{FunctionSet, scan};
use crate::syntax::{self, SyntaxTree};
use crate::types::{LiteralOutcome, LiteralStatus};

/// Result of running the engine over one file's source.
#[derive(Debug)]
pub struct Formatted {
    pub output: String,
    pub literals: Vec<LiteralOutcome>,
}

impl Formatted {
    #[must_use]
    pub fn changed(&self, original: &[u8]) -> bool {
        self.output.as_bytes() != original
    }
}

/// Parse, rewrite, print and validate one source file in memory.
pub fn format_source(
    path: &Path,
    source: Vec<u8>,
    functions: &FunctionSet,
    formatter: &dyn QueryFormatter,
) -> Result<Formatted, GosqlfmtError> {
    let mut tree = syntax::parse::parse_bytes(path, source)?;
    let literals = rewrite_tree(&mut tree, functions, formatter);

    // Nothing modified: the printer would copy the source verbatim.
    if !tree.literals().any(|(_, l)| l.is_modified()) {
        return Ok(Formatted {
            output: tree.source().to_string(),
            literals,
        });
    }

    let output = syntax::print(&tree)?;
    syntax::canonicalize(path, &output)?;
    Ok(Formatted { output, literals })
}

/// Rewrite every eligible literal of every recognized call in `tree`.
///
/// Failures are confined to their literal: it keeps its original value and
/// the returned outcome records why. Nothing is logged here.
pub fn rewrite_tree(
    tree: &mut SyntaxTree,
    functions: &FunctionSet,
    formatter: &dyn QueryFormatter,
) -> Vec<LiteralOutcome> {
    let sites = scan(tree, functions);
    let (source, mut literals) = tree.split_mut();
    let lines = LineTable::new(source);

    let mut outcomes = Vec::with_capacity(sites.len());
    for site in sites {
        let literal = literals.get(site.literal);
        let position = literal.start;

        let status = match literal.body() {
            Some(body) if literal.delimiter.is_raw() => {
                match format_one(&lines, site.callee.line, body, formatter) {
                    Ok((formatted, depth)) => {
                        if rewrite::rewrite(literals.get_mut(site.literal), &formatted, depth) {
                            LiteralStatus::Rewritten
                        } else {
                            LiteralStatus::Unchanged
                        }
                    }
                    Err(e) => LiteralStatus::Skipped(e),
                }
            }
            _ => LiteralStatus::NotRaw,
        };

        outcomes.push(LiteralOutcome {
            position,
            function: site.function,
            arg_index: site.arg_index,
            status,
        });
    }
    outcomes
}

/// Indentation is resolved before the formatter runs, so a bad position
/// never costs a subprocess.
fn format_one(
    lines: &LineTable<'_>,
    callee_line: usize,
    body: &str,
    formatter: &dyn QueryFormatter,
) -> Result<(String, usize), LiteralError> {
    let depth = lines.indentation(callee_line)?;
    let formatted = formatter.format_query(body)?;
    if formatted.contains('`') {
        return Err(LiteralError::DelimiterInOutput);
    }
    Ok((formatted, depth))
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use super::*;
    use crate::error::FormatError;

    /// Deterministic stand-in for pg_format: collapses whitespace, then puts
    /// each comma-separated item on its own line. Idempotent on its own
    /// rendered output.
    fn comma_break(q: &str) -> Result<String, FormatError> {
        let flat = q.split_whitespace().collect::<Vec<_>>().join(" ");
        Ok(format!("{}\n", flat.replace(", ", ",").replace(',', ",\n")))
    }

    fn run(src: &str, formatter: &dyn QueryFormatter) -> Formatted {
        format_source(
            Path::new("q.go"),
            src.as_bytes().to_vec(),
            &FunctionSet::sqlx(),
            formatter,
        )
        .unwrap()
    }

    #[test]
    fn rewrites_query_literal_at_call_indentation() {
        let src = "package p\n\nfunc f() {\n\tdb.Query(`select a,b from t where x=1`)\n}\n";
        let out = run(src, &comma_break);
        assert_eq!(
            out.output,
            "package p\n\nfunc f() {\n\tdb.Query(`\n\t\tselect a,\n\t\tb from t where x=1\n\t\t`)\n}\n"
        );
        assert!(matches!(out.literals[0].status, LiteralStatus::Rewritten));
    }

    #[test]
    fn second_run_is_a_no_op() {
        let src = "package p\n\nfunc f() {\n\tif true {\n\t\trows, _ := db.QueryContext(ctx, `select a, b,c from t`)\n\t\t_ = rows\n\t}\n}\n";
        let first = run(src, &comma_break);
        assert!(first.changed(src.as_bytes()));

        let second = run(&first.output, &comma_break);
        assert_eq!(second.output, first.output);
        assert!(!second.changed(first.output.as_bytes()));
        assert!(matches!(second.literals[0].status, LiteralStatus::Unchanged));
    }

    #[test]
    fn non_target_calls_and_interpreted_strings_are_untouched() {
        let src = "package p\n\nfunc f() {\n\tlog.Print(`select a,b`)\n\tdb.Exec(\"select a,b\")\n}\n";
        let out = run(src, &comma_break);
        assert_eq!(out.output, src);
        assert_eq!(out.literals.len(), 1);
        assert!(matches!(out.literals[0].status, LiteralStatus::NotRaw));
    }

    #[test]
    fn one_failing_literal_does_not_stop_the_others() {
        let picky = |q: &str| -> Result<String, FormatError> {
            if q.contains("broken") {
                Err(FormatError::Other("syntax error at broken".into()))
            } else {
                comma_break(q)
            }
        };
        let src = "package p\n\nfunc f() {\n\tdb.Exec(`broken,query`)\n\tdb.Exec(`update t set a=1,b=2`)\n}\n";
        let out = run(src, &picky);

        assert!(out.output.contains("db.Exec(`broken,query`)"));
        assert!(out.output.contains("db.Exec(`\n\t\tupdate t set a=1,\n\t\tb=2\n\t\t`)"));
        assert!(out.literals[0].status.is_skipped());
        assert!(matches!(out.literals[1].status, LiteralStatus::Rewritten));
        assert!(out.changed(src.as_bytes()));
    }

    #[test]
    fn all_failures_leave_source_identical() {
        let fail = |_: &str| -> Result<String, FormatError> { Err(FormatError::NotUtf8) };
        let src = "package p\n\nvar _ = db.Get(&v, `select 1`)\n";
        let out = run(src, &fail);
        assert_eq!(out.output, src);
        assert!(!out.changed(src.as_bytes()));
    }

    #[test]
    fn formatter_sees_text_between_backticks() {
        let seen = RefCell::new(Vec::new());
        let record = |q: &str| -> Result<String, FormatError> {
            seen.borrow_mut().push(q.to_string());
            Ok(q.to_string())
        };
        let src = "package p\n\nvar _ = db.Select(&v, `select *\n  from t`, 1)\n";
        run(src, &record);
        assert_eq!(seen.into_inner(), vec!["select *\n  from t".to_string()]);
    }

    #[test]
    fn outcomes_carry_literal_positions() {
        let src = "package p\n\nfunc f() {\n    db.Prepare(`select 1`)\n}\n";
        let out = run(src, &comma_break);
        let outcome = &out.literals[0];
        assert_eq!(outcome.function, "Prepare");
        assert_eq!(outcome.position.line, 4);
        assert_eq!(outcome.position.column, 16);
        // Four spaces count as four units.
        assert!(out.output.contains("db.Prepare(`\n\t\t\t\t\tselect 1\n\t\t\t\t\t`)"));
    }

    #[test]
    fn formatter_output_with_backtick_is_skipped() {
        let quoting = |q: &str| -> Result<String, FormatError> { Ok(format!("`{q}`")) };
        let src = "package p\n\nvar _ = db.Exec(`drop table t`)\n";
        let out = run(src, &quoting);
        assert_eq!(out.output, src);
        assert!(matches!(
            out.literals[0].status,
            LiteralStatus::Skipped(LiteralError::DelimiterInOutput)
        ));
    }

    #[test]
    fn syntax_errors_abort_the_file() {
        let err = format_source(
            Path::new("bad.go"),
            b"package p\n\nfunc {\n".to_vec(),
            &FunctionSet::sqlx(),
            &comma_break,
        )
        .unwrap_err();
        assert!(matches!(err, GosqlfmtError::ParseFailed { .. }));
    }
}
