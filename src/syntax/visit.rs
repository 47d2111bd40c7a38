//! Read-only traversal over a `SyntaxTree`.
//!
//! Override the `visit_*` hooks you care about; call the matching `walk_*`
//! function from an override to keep descending. Order is pre-order,
//! left to right, so any visitor sees nodes in source order.

use super::{Call, Literal, LiteralId, Node, Other, SyntaxTree};

pub trait Visit<'t> {
    fn visit_node(&mut self, tree: &'t SyntaxTree, node: &'t Node) {
        walk_node(self, tree, node);
    }

    fn visit_call(&mut self, tree: &'t SyntaxTree, call: &'t Call) {
        walk_call(self, tree, call);
    }

    fn visit_literal(&mut self, _id: LiteralId, _literal: &'t Literal) {}

    fn visit_other(&mut self, tree: &'t SyntaxTree, other: &'t Other) {
        walk_other(self, tree, other);
    }
}

/// Visit every node of `tree`, starting at the root.
pub fn visit_tree<'t, V: Visit<'t> + ?Sized>(visitor: &mut V, tree: &'t SyntaxTree) {
    visitor.visit_node(tree, tree.root());
}

pub fn walk_node<'t, V: Visit<'t> + ?Sized>(visitor: &mut V, tree: &'t SyntaxTree, node: &'t Node) {
    match node {
        Node::Call(call) => visitor.visit_call(tree, call),
        Node::Literal(id) => visitor.visit_literal(*id, tree.literal(*id)),
        Node::Other(other) => visitor.visit_other(tree, other),
    }
}

pub fn walk_call<'t, V: Visit<'t> + ?Sized>(visitor: &mut V, tree: &'t SyntaxTree, call: &'t Call) {
    visitor.visit_node(tree, &call.function);
    if let Some(type_arguments) = &call.type_arguments {
        visitor.visit_node(tree, type_arguments);
    }
    for arg in &call.args {
        visitor.visit_node(tree, arg);
    }
}

pub fn walk_other<'t, V: Visit<'t> + ?Sized>(
    visitor: &mut V,
    tree: &'t SyntaxTree,
    other: &'t Other,
) {
    for child in &other.children {
        visitor.visit_node(tree, child);
    }
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use super::*;
    use crate::syntax::parse;

    #[derive(Default)]
    struct Counter {
        calls: Vec<String>,
        literals: Vec<String>,
    }

    impl<'t> Visit<'t> for Counter {
        fn visit_call(&mut self, tree: &'t SyntaxTree, call: &'t Call) {
            let name = call
                .selector
                .as_ref()
                .map_or_else(|| "<fn>".to_string(), |s| s.name.clone());
            self.calls.push(name);
            walk_call(self, tree, call);
        }

        fn visit_literal(&mut self, _id: LiteralId, literal: &'t Literal) {
            self.literals.push(literal.value().to_string());
        }
    }

    #[test]
    fn visits_in_source_order_including_nested_calls() {
        let src = "package p\n\nfunc f() {\n\ta.Outer(b.Inner(`1`), `2`)\n\tc.Last(`3`)\n}\n";
        let tree = parse(Path::new("v.go"), src.to_string()).unwrap();
        let mut counter = Counter::default();
        visit_tree(&mut counter, &tree);

        assert_eq!(counter.calls, vec!["Outer", "Inner", "Last"]);
        assert_eq!(counter.literals, vec!["`1`", "`2`", "`3`"]);
    }

    #[test]
    fn literals_outside_calls_are_reached() {
        let src = "package p\n\nconst n = 7\n\nvar s = \"x\"\n";
        let tree = parse(Path::new("v.go"), src.to_string()).unwrap();
        let mut counter = Counter::default();
        visit_tree(&mut counter, &tree);

        assert!(counter.calls.is_empty());
        assert_eq!(counter.literals, vec!["7", "\"x\""]);
    }
}
