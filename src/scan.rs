use std::collections::HashSet;

use crate::syntax::visit::{Visit, visit_tree, walk_call};
use crate::syntax::{Call, LiteralId, Node, SyntaxTree};
use crate::types::Position;

/// sqlx / database/sql methods whose arguments carry SQL text.
pub const SQLX_FUNCTIONS: &[&str] = &[
    "Get",
    "Select",
    "Exec",
    "NamedExec",
    "NamedQuery",
    "Query",
    "Prepare",
    "GetContext",
    "SelectContext",
    "ExecContext",
    "NamedExecContext",
    "QueryContext",
    "PrepareContext",
    "PrepareNamedContext",
];

/// Immutable set of callee names that mark a call as a data-access call.
/// Matching is exact and case-sensitive.
#[derive(Debug, Clone)]
pub struct FunctionSet {
    names: HashSet<String>,
}

impl FunctionSet {
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            names: names.into_iter().map(Into::into).collect(),
        }
    }

    #[must_use]
    pub fn sqlx() -> Self {
        Self::new(SQLX_FUNCTIONS.iter().copied())
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.names.contains(name)
    }

    /// The recognized name this call goes through, if any. Only member-style
    /// callees (`x.Name(...)`) qualify.
    #[must_use]
    pub fn match_call<'c>(&self, call: &'c Call) -> Option<&'c str> {
        let selector = call.selector.as_ref()?;
        self.contains(&selector.name).then_some(selector.name.as_str())
    }
}

impl Default for FunctionSet {
    fn default() -> Self {
        Self::sqlx()
    }
}

/// One literal argument of a recognized call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallSite {
    pub function: String,
    /// Where the callee expression starts; its line sets the indentation.
    pub callee: Position,
    pub arg_index: usize,
    pub literal: LiteralId,
}

/// Find every literal argument of every recognized call, in source order.
#[must_use]
pub fn scan(tree: &SyntaxTree, functions: &FunctionSet) -> Vec<CallSite> {
    let mut scanner = Scanner {
        functions,
        sites: Vec::new(),
    };
    visit_tree(&mut scanner, tree);
    scanner.sites
}

struct Scanner<'f> {
    functions: &'f FunctionSet,
    sites: Vec<CallSite>,
}

impl<'t> Visit<'t> for Scanner<'_> {
    fn visit_call(&mut self, tree: &'t SyntaxTree, call: &'t Call) {
        if let (Some(name), Some(selector)) = (self.functions.match_call(call), &call.selector) {
            for (arg_index, arg) in call.args.iter().enumerate() {
                if let Node::Literal(id) = arg {
                    self.sites.push(CallSite {
                        function: name.to_string(),
                        callee: selector.start,
                        arg_index,
                        literal: *id,
                    });
                }
            }
        }
        walk_call(self, tree, call);
    }
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use super::*;
    use crate::syntax::parse;

    fn sites(src: &str) -> (SyntaxTree, Vec<CallSite>) {
        let tree = parse(Path::new("s.go"), src.to_string()).unwrap();
        let sites = scan(&tree, &FunctionSet::sqlx());
        (tree, sites)
    }

    #[test]
    fn finds_literal_args_of_recognized_calls() {
        let src = "package p\n\nfunc f() {\n\tdb.QueryContext(ctx, `select 1`, 5)\n}\n";
        let (tree, found) = sites(src);

        let summary: Vec<_> = found
            .iter()
            .map(|s| (s.function.as_str(), s.arg_index, tree.literal(s.literal).value()))
            .collect();
        assert_eq!(
            summary,
            vec![("QueryContext", 1, "`select 1`"), ("QueryContext", 2, "5")]
        );
        assert_eq!(found[0].callee, Position { line: 4, column: 2 });
    }

    #[test]
    fn ignores_unrecognized_and_bare_calls() {
        let src = "package p\n\nfunc f() {\n\tdb.Queryx(`a`)\n\tdb.query(`b`)\n\tQuery(`c`)\n\tfmt.Println(`d`)\n}\n";
        let (_, found) = sites(src);
        assert!(found.is_empty(), "unexpected sites: {found:?}");
    }

    #[test]
    fn nested_calls_are_found_in_preorder() {
        let src = "package p\n\nfunc f() {\n\ttx.Exec(`outer`, x.Get(`inner`))\n\tdb.Select(&v, `last`)\n}\n";
        let (tree, found) = sites(src);
        let values: Vec<_> = found.iter().map(|s| tree.literal(s.literal).value()).collect();
        assert_eq!(values, vec!["`outer`", "`inner`", "`last`"]);
    }

    #[test]
    fn callee_position_is_start_of_selector_chain() {
        let src = "package p\n\nfunc f() {\n\terr := s.db.\n\t\tGet(&v, `select 1`)\n}\n";
        let (_, found) = sites(src);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].callee.line, 4);
    }

    #[test]
    fn custom_function_set_is_respected() {
        let tree = parse(
            Path::new("s.go"),
            "package p\n\nvar _ = r.Raw(`x`)\nvar _ = r.Query(`y`)\n".to_string(),
        )
        .unwrap();
        let found = scan(&tree, &FunctionSet::new(["Raw"]));
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].function, "Raw");
    }
}
