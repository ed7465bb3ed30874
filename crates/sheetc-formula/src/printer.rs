//! Canonical formula printer
//!
//! Prints an AST back to formula text. Operator expressions are fully
//! parenthesized, so the output re-parses to the same tree regardless of
//! the precedence the source relied on; literals and references come back
//! verbatim. Used by the round-trip tests and by diagnostics.

use crate::ast::{AstNode, OpSymbol, ARRAY_CALL, ARRAY_ROW_CALL};

/// Print an AST as a formula string, including the leading `=`
pub fn to_formula(ast: &AstNode) -> String {
    format!("={}", print_node(ast))
}

fn print_node(node: &AstNode) -> String {
    match node {
        AstNode::Literal(text) => text.clone(),
        AstNode::Ref(text) => text.clone(),
        AstNode::Op(op, children) => match children.as_slice() {
            [operand] => match op {
                OpSymbol::Percent => format!("({}%)", print_node(operand)),
                _ => format!("({}{})", op, print_node(operand)),
            },
            [left, right] => {
                format!("({}{}{})", print_node(left), op, print_node(right))
            }
            _ => {
                // Not constructible by the parser; print children blindly
                let inner: Vec<String> = children.iter().map(print_node).collect();
                format!("({})", inner.join(op.as_str()))
            }
        },
        AstNode::Call(name, args) if name == ARRAY_CALL => {
            let rows: Vec<String> = args
                .iter()
                .map(|row| match row {
                    AstNode::Call(n, items) if n == ARRAY_ROW_CALL => {
                        let cells: Vec<String> = items.iter().map(print_node).collect();
                        cells.join(",")
                    }
                    other => print_node(other),
                })
                .collect();
            format!("{{{}}}", rows.join(";"))
        }
        AstNode::Call(name, args) => {
            let parts: Vec<String> = args.iter().map(print_node).collect();
            format!("{}({})", name, parts.join(","))
        }
    }
}
