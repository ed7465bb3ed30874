//! Formula Abstract Syntax Tree types

use std::fmt;

/// Formula expression AST
///
/// Four node kinds, mirroring the open `{type, value, children}` shape of
/// the formula grammar:
///
/// - `Literal` keeps the source text of the literal: numbers verbatim,
///   booleans canonicalized to `TRUE`/`FALSE`, strings *with* their
///   surrounding double quotes so the three classes stay decidable from the
///   payload alone.
/// - `Ref` keeps the raw reference text as written (`$B$2`, `'My Sheet'!A1`,
///   `D:D`); canonicalization happens in the normalizer, not the parser.
/// - `Op` covers unary and binary operators; arity is the child count.
/// - `Call` covers function calls. Array literals parse to
///   `Call("ARRAY", rows)` with each row a `Call("ARRAYROW", items)`.
#[derive(Debug, Clone, PartialEq)]
pub enum AstNode {
    /// Literal value (number, string, or boolean source text)
    Literal(String),
    /// Cell or range reference, raw text
    Ref(String),
    /// Unary or binary operator
    Op(OpSymbol, Vec<AstNode>),
    /// Function call
    Call(String, Vec<AstNode>),
}

/// Reserved call name for array literals
pub const ARRAY_CALL: &str = "ARRAY";
/// Reserved call name for one row of an array literal
pub const ARRAY_ROW_CALL: &str = "ARRAYROW";

impl AstNode {
    /// Visit every `Ref` payload in the tree, depth-first, left to right
    pub fn for_each_ref<F: FnMut(&str)>(&self, f: &mut F) {
        match self {
            AstNode::Literal(_) => {}
            AstNode::Ref(r) => f(r),
            AstNode::Op(_, children) | AstNode::Call(_, children) => {
                for child in children {
                    child.for_each_ref(f);
                }
            }
        }
    }

    /// Collect every `Ref` payload in the tree
    pub fn references(&self) -> Vec<&str> {
        let mut out = Vec::new();
        self.collect_refs(&mut out);
        out
    }

    fn collect_refs<'a>(&'a self, out: &mut Vec<&'a str>) {
        match self {
            AstNode::Literal(_) => {}
            AstNode::Ref(r) => out.push(r),
            AstNode::Op(_, children) | AstNode::Call(_, children) => {
                for child in children {
                    child.collect_refs(out);
                }
            }
        }
    }
}

/// Operator symbols
///
/// `Subtract` doubles as unary negation and `Percent` is always unary; the
/// consumer distinguishes by child count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OpSymbol {
    Add,
    Subtract,
    Multiply,
    Divide,
    Power,
    Percent,
    Concat,
    Equal,
    NotEqual,
    Less,
    LessEq,
    Greater,
    GreaterEq,
}

impl OpSymbol {
    /// The operator's source spelling
    pub fn as_str(&self) -> &'static str {
        match self {
            OpSymbol::Add => "+",
            OpSymbol::Subtract => "-",
            OpSymbol::Multiply => "*",
            OpSymbol::Divide => "/",
            OpSymbol::Power => "^",
            OpSymbol::Percent => "%",
            OpSymbol::Concat => "&",
            OpSymbol::Equal => "=",
            OpSymbol::NotEqual => "<>",
            OpSymbol::Less => "<",
            OpSymbol::LessEq => "<=",
            OpSymbol::Greater => ">",
            OpSymbol::GreaterEq => ">=",
        }
    }
}

impl fmt::Display for OpSymbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_references() {
        let ast = AstNode::Op(
            OpSymbol::Add,
            vec![
                AstNode::Ref("A1".into()),
                AstNode::Call(
                    "SUM".into(),
                    vec![AstNode::Ref("B1:B10".into()), AstNode::Literal("1".into())],
                ),
            ],
        );
        assert_eq!(ast.references(), vec!["A1", "B1:B10"]);
    }

    #[test]
    fn test_op_symbol_display() {
        assert_eq!(OpSymbol::NotEqual.to_string(), "<>");
        assert_eq!(OpSymbol::Power.to_string(), "^");
    }
}
