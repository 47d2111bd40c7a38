use std::path::Path;

use super::{Call, Literal, Node, Other, Selector, SyntaxTree};
use crate::error::GosqlfmtError;
use crate::types::Position;

/// Go basic-literal node kinds. Each becomes a `Node::Literal` leaf.
pub(crate) const LITERAL_KINDS: &[&str] = &[
    "raw_string_literal",
    "interpreted_string_literal",
    "rune_literal",
    "int_literal",
    "float_literal",
    "imaginary_literal",
];

/// Parse raw file bytes. Go source must be UTF-8; anything else is a parse
/// failure rather than a lossy conversion.
pub fn parse_bytes(path: &Path, bytes: Vec<u8>) -> Result<SyntaxTree, GosqlfmtError> {
    let source = String::from_utf8(bytes).map_err(|e| GosqlfmtError::ParseFailed {
        path: path.to_path_buf(),
        position: None,
        reason: format!("source is not valid UTF-8: {e}"),
    })?;
    parse(path, source)
}

/// Parse Go source into an owned syntax tree.
///
/// tree-sitter always returns a tree, recovering from bad input with
/// `ERROR` and missing nodes. Any such node makes the whole file a
/// `ParseFailed`: a file we cannot read cleanly is never rewritten.
pub fn parse(path: &Path, source: String) -> Result<SyntaxTree, GosqlfmtError> {
    let ts_tree = parse_ts(&source).ok_or_else(|| GosqlfmtError::ParseFailed {
        path: path.to_path_buf(),
        position: None,
        reason: "parser produced no tree".into(),
    })?;

    let root = ts_tree.root_node();
    if root.has_error() {
        let (position, reason) = describe_first_error(root, &source);
        return Err(GosqlfmtError::ParseFailed {
            path: path.to_path_buf(),
            position,
            reason,
        });
    }

    let mut lowering = Lowering {
        source: &source,
        literals: Vec::new(),
    };
    let root = lowering.lower(root);
    let literals = lowering.literals;

    Ok(SyntaxTree {
        path: path.to_path_buf(),
        source,
        root,
        literals,
    })
}

/// Raw tree-sitter parse with the Go grammar.
pub(crate) fn parse_ts(source: &str) -> Option<tree_sitter::Tree> {
    let language: tree_sitter::Language = tree_sitter_go::LANGUAGE.into();
    let mut parser = tree_sitter::Parser::new();
    parser.set_language(&language).ok()?;
    parser.parse(source, None)
}

/// Locate the first `ERROR` or missing node in document order.
pub(crate) fn describe_first_error(
    root: tree_sitter::Node,
    source: &str,
) -> (Option<Position>, String) {
    let Some(node) = first_error(root) else {
        return (None, "syntax error".into());
    };
    let position = Some(Position::from_point(node.start_position()));
    if node.is_missing() {
        return (position, format!("missing {}", node.kind()));
    }
    let snippet: String = source
        .get(node.byte_range())
        .unwrap_or("")
        .lines()
        .next()
        .unwrap_or("")
        .chars()
        .take(40)
        .collect();
    if snippet.trim().is_empty() {
        (position, "unexpected input".into())
    } else {
        (position, format!("unexpected `{}`", snippet.trim()))
    }
}

fn first_error(node: tree_sitter::Node) -> Option<tree_sitter::Node> {
    if node.is_error() || node.is_missing() {
        return Some(node);
    }
    if !node.has_error() {
        return None;
    }
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        if let Some(found) = first_error(child) {
            return Some(found);
        }
    }
    None
}

struct Lowering<'a> {
    source: &'a str,
    literals: Vec<Literal>,
}

impl Lowering<'_> {
    fn lower(&mut self, node: tree_sitter::Node) -> Node {
        let kind = node.kind();
        if kind == "call_expression" {
            if let Some(call) = self.lower_call(node) {
                return Node::Call(call);
            }
        } else if LITERAL_KINDS.contains(&kind) {
            let id = super::LiteralId(self.literals.len());
            self.literals.push(Literal::new(
                node.byte_range(),
                Position::from_point(node.start_position()),
                &self.source[node.byte_range()],
            ));
            return Node::Literal(id);
        }

        let mut children = Vec::new();
        let mut cursor = node.walk();
        for child in node.named_children(&mut cursor) {
            children.push(self.lower(child));
        }
        Node::Other(Other {
            kind,
            span: node.byte_range(),
            children,
        })
    }

    fn lower_call(&mut self, node: tree_sitter::Node) -> Option<Call> {
        let function_node = node.child_by_field_name("function")?;
        let arguments_node = node.child_by_field_name("arguments")?;

        let selector = if function_node.kind() == "selector_expression" {
            function_node
                .child_by_field_name("field")
                .map(|field| Selector {
                    name: self.source[field.byte_range()].to_string(),
                    start: Position::from_point(function_node.start_position()),
                })
        } else {
            None
        };

        let function = Box::new(self.lower(function_node));
        let type_arguments = node
            .child_by_field_name("type_arguments")
            .map(|t| Box::new(self.lower(t)));

        let mut args = Vec::new();
        let mut cursor = arguments_node.walk();
        for arg in arguments_node.named_children(&mut cursor) {
            if arg.kind() == "comment" {
                continue;
            }
            args.push(self.lower(arg));
        }

        Some(Call {
            span: node.byte_range(),
            function,
            selector,
            type_arguments,
            args,
        })
    }
}
