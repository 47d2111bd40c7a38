//! Owned Go syntax tree, lowered from tree-sitter into a closed set of node
//! shapes: calls, literals, and everything else.

pub mod parse;
pub mod print;
pub mod visit;

use std::path::{Path, PathBuf};

use crate::types::{Delimiter, Position, Span};

pub use parse::parse;
pub use print::{canonicalize, print};

/// Index of a literal in its tree's arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LiteralId(pub(crate) usize);

/// One parsed source file. Owns its text and every node derived from it.
/// Literals live in an arena so they can be rewritten after a read-only scan.
#[derive(Debug)]
pub struct SyntaxTree {
    path: PathBuf,
    source: String,
    root: Node,
    literals: Vec<Literal>,
}

impl SyntaxTree {
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    #[must_use]
    pub fn source(&self) -> &str {
        &self.source
    }

    #[must_use]
    pub fn root(&self) -> &Node {
        &self.root
    }

    #[must_use]
    pub fn literal(&self, id: LiteralId) -> &Literal {
        &self.literals[id.0]
    }

    pub fn literal_mut(&mut self, id: LiteralId) -> &mut Literal {
        &mut self.literals[id.0]
    }

    /// Literals in source order.
    pub fn literals(&self) -> impl Iterator<Item = (LiteralId, &Literal)> {
        self.literals
            .iter()
            .enumerate()
            .map(|(i, lit)| (LiteralId(i), lit))
    }

    /// Borrow the original text and the literal arena separately, so
    /// literals can be rewritten while the source is still being read.
    pub fn split_mut(&mut self) -> (&str, LiteralsMut<'_>) {
        (&self.source, LiteralsMut(&mut self.literals))
    }
}

/// Mutable view over a tree's literal arena.
pub struct LiteralsMut<'t>(&'t mut [Literal]);

impl LiteralsMut<'_> {
    #[must_use]
    pub fn get(&self, id: LiteralId) -> &Literal {
        &self.0[id.0]
    }

    pub fn get_mut(&mut self, id: LiteralId) -> &mut Literal {
        &mut self.0[id.0]
    }
}

#[derive(Debug)]
pub enum Node {
    Call(Call),
    Literal(LiteralId),
    Other(Other),
}

/// A function or method invocation.
#[derive(Debug)]
pub struct Call {
    pub span: Span,
    pub function: Box<Node>,
    /// Set when the callee is a member reference like `db.Query`.
    pub selector: Option<Selector>,
    pub type_arguments: Option<Box<Node>>,
    pub args: Vec<Node>,
}

/// Final identifier of a member-style callee.
#[derive(Debug)]
pub struct Selector {
    pub name: String,
    /// Where the whole selector expression starts (the `db` of `db.Query`).
    pub start: Position,
}

/// Any node that is neither a call nor a literal.
#[derive(Debug)]
pub struct Other {
    pub kind: &'static str,
    pub span: Span,
    pub children: Vec<Node>,
}

/// A basic literal: string, rune, or number. Holds its exact source text,
/// delimiters included.
#[derive(Debug, Clone)]
pub struct Literal {
    pub span: Span,
    pub start: Position,
    pub delimiter: Delimiter,
    original: String,
    value: String,
}

impl Literal {
    pub(crate) fn new(span: Span, start: Position, text: &str) -> Self {
        Self {
            span,
            start,
            delimiter: Delimiter::of(text),
            original: text.to_string(),
            value: text.to_string(),
        }
    }

    /// Current text, delimiters included.
    #[must_use]
    pub fn value(&self) -> &str {
        &self.value
    }

    #[must_use]
    pub fn original(&self) -> &str {
        &self.original
    }

    pub fn set_value(&mut self, value: String) {
        self.value = value;
    }

    #[must_use]
    pub fn is_modified(&self) -> bool {
        self.value != self.original
    }

    /// Text between the delimiters. `None` for numeric literals.
    #[must_use]
    pub fn body(&self) -> Option<&str> {
        let delim = self.delimiter.as_char()?;
        let inner = self.value.strip_prefix(delim)?;
        Some(inner.strip_suffix(delim).unwrap_or(inner))
    }
}
