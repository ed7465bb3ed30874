//! Formula lowering
//!
//! Turns an AST into a target-language expression through an [`Emitter`].
//! The safe-wrapper decision lives here, shared by both backends: a binary
//! `+`, `*`, `<`, `>`, `<=`, `>=` is routed through its error-propagating
//! helper when either operand's *emitted text* contains a marker that can
//! carry an error (a cell read, a lookup-family call, or a `#` literal).
//! The scan is over source text on purpose, not over the AST; operands
//! that merely look error-free still get wrapped, and downstream behavior
//! depends on exactly which wrappers appear.

use sheetc_core::CellAddress;
use sheetc_formula::ast::{AstNode, OpSymbol, ARRAY_CALL, ARRAY_ROW_CALL};
use sheetc_formula::{is_range_reference, normalize_reference, split_reference};

use crate::emitter::Emitter;
use crate::error::{CodegenError, CodegenResult};
use crate::functions::{lookup, SpecialForm};

/// Markers whose presence in an operand's emitted text forces the safe
/// wrapper. Matched case-insensitively so `rangeLookup(` and
/// `range_lookup(` both count as lookups.
const ERROR_MARKERS: &[&str] = &["cells.get", "lookup(", "index(", "match(", "#"];

/// Where a formula is being lowered: its sheet (qualifies bare references)
/// and its cell id (answers a bare `ROW()`)
#[derive(Debug, Clone, Copy)]
pub struct LowerContext<'a> {
    pub sheet: &'a str,
    pub cell_id: &'a str,
}

/// Lower an AST to a target-language expression
pub fn lower_expr(
    emitter: &dyn Emitter,
    ast: &AstNode,
    ctx: &LowerContext<'_>,
) -> CodegenResult<String> {
    match ast {
        AstNode::Literal(text) => Ok(lower_literal(emitter, text)),
        AstNode::Ref(raw) => Ok(lower_reference(emitter, raw, ctx)),
        AstNode::Op(op, children) => lower_op(emitter, *op, children, ctx),
        AstNode::Call(name, args) => lower_call(emitter, name, args, ctx),
    }
}

fn lower_literal(emitter: &dyn Emitter, text: &str) -> String {
    if text == "TRUE" || text == "FALSE" {
        return emitter.bool_literal(text == "TRUE").to_string();
    }
    if let Some(quoted) = text.strip_prefix('"') {
        let content = quoted.strip_suffix('"').unwrap_or(quoted);
        return emitter.string_literal(&unescape(content));
    }
    if text.parse::<f64>().is_ok() {
        // Numbers are emitted verbatim
        return text.to_string();
    }
    emitter.string_literal(text)
}

/// Undo the lexer's backslash escapes inside a string literal body
fn unescape(content: &str) -> String {
    let mut out = String::with_capacity(content.len());
    let mut chars = content.chars();
    while let Some(c) = chars.next() {
        if c == '\\' {
            if let Some(next) = chars.next() {
                out.push(next);
            }
        } else {
            out.push(c);
        }
    }
    out
}

fn lower_reference(emitter: &dyn Emitter, raw: &str, ctx: &LowerContext<'_>) -> String {
    let id = normalize_reference(raw, ctx.sheet);
    if is_range_reference(&id) {
        emitter.range_read(&id)
    } else {
        emitter.cell_read(&id)
    }
}

fn lower_op(
    emitter: &dyn Emitter,
    op: OpSymbol,
    children: &[AstNode],
    ctx: &LowerContext<'_>,
) -> CodegenResult<String> {
    match children {
        [operand] => {
            let lowered = lower_expr(emitter, operand, ctx)?;
            match op {
                OpSymbol::Subtract => Ok(emitter.unary_minus(&lowered)),
                OpSymbol::Percent => Ok(emitter.percent(&lowered)),
                _ => Err(CodegenError::OperatorArity {
                    symbol: op.as_str().to_string(),
                    arity: 1,
                }),
            }
        }
        [left, right] => {
            let lhs = lower_expr(emitter, left, ctx)?;
            let rhs = lower_expr(emitter, right, ctx)?;
            match op {
                // Division always goes through the runtime
                OpSymbol::Divide => {
                    Ok(emitter.call(&emitter.helper_name("safe_divide"), &[lhs, rhs]))
                }
                OpSymbol::Add
                | OpSymbol::Multiply
                | OpSymbol::Less
                | OpSymbol::LessEq
                | OpSymbol::Greater
                | OpSymbol::GreaterEq => {
                    if needs_wrapper(&lhs) || needs_wrapper(&rhs) {
                        let stem = safe_stem(op);
                        Ok(emitter.call(&emitter.helper_name(stem), &[lhs, rhs]))
                    } else {
                        Ok(emitter.binary_op(op, &lhs, &rhs))
                    }
                }
                // Subtraction, power, concatenation, and equality never wrap
                OpSymbol::Subtract
                | OpSymbol::Power
                | OpSymbol::Concat
                | OpSymbol::Equal
                | OpSymbol::NotEqual => Ok(emitter.binary_op(op, &lhs, &rhs)),
                OpSymbol::Percent => Err(CodegenError::OperatorArity {
                    symbol: op.as_str().to_string(),
                    arity: 2,
                }),
            }
        }
        other => Err(CodegenError::OperatorArity {
            symbol: op.as_str().to_string(),
            arity: other.len(),
        }),
    }
}

fn safe_stem(op: OpSymbol) -> &'static str {
    match op {
        OpSymbol::Add => "safe_add",
        OpSymbol::Multiply => "safe_multiply",
        OpSymbol::Less => "safe_less",
        OpSymbol::LessEq => "safe_less_eq",
        OpSymbol::Greater => "safe_greater",
        OpSymbol::GreaterEq => "safe_greater_eq",
        _ => "safe_add",
    }
}

fn needs_wrapper(operand: &str) -> bool {
    let lowered = operand.to_ascii_lowercase();
    ERROR_MARKERS.iter().any(|m| lowered.contains(m))
}

fn lower_call(
    emitter: &dyn Emitter,
    name: &str,
    args: &[AstNode],
    ctx: &LowerContext<'_>,
) -> CodegenResult<String> {
    // Array literals were parsed into the reserved ARRAY/ARRAYROW calls
    if name == ARRAY_CALL {
        return lower_array(emitter, args, ctx);
    }

    let Some(spec) = lookup(name) else {
        // Unknown function: pass-through call with the name unchanged
        let lowered = lower_args(emitter, args, ctx)?;
        return Ok(emitter.call(name, &lowered));
    };

    match spec.form {
        SpecialForm::Standard => {
            let lowered = lower_args(emitter, args, ctx)?;
            Ok(emitter.call(&emitter.helper_name(spec.stem), &lowered))
        }

        SpecialForm::If => {
            let cond = args
                .first()
                .ok_or_else(|| CodegenError::MissingArgument("IF".into()))?;
            let cond = lower_expr(emitter, cond, ctx)?;
            let then = match args.get(1) {
                Some(node) => lower_expr(emitter, node, ctx)?,
                None => emitter.bool_literal(false).to_string(),
            };
            let otherwise = match args.get(2) {
                Some(node) => lower_expr(emitter, node, ctx)?,
                None => emitter.bool_literal(false).to_string(),
            };
            Ok(emitter.conditional(&cond, &then, &otherwise))
        }

        SpecialForm::Npv => {
            let rate = args
                .first()
                .ok_or_else(|| CodegenError::MissingArgument("NPV".into()))?;
            let mut lowered = vec![lower_expr(emitter, rate, ctx)?];
            for arg in &args[1..] {
                match arg {
                    AstNode::Ref(raw) => {
                        let id = normalize_reference(raw, ctx.sheet);
                        if is_range_reference(&id) {
                            // Every range after the rate is unpacked
                            lowered.push(emitter.spread(&emitter.range_read(&id)));
                        } else {
                            lowered.push(emitter.cell_read(&id));
                        }
                    }
                    other => lowered.push(lower_expr(emitter, other, ctx)?),
                }
            }
            Ok(emitter.call(&emitter.helper_name("npv"), &lowered))
        }

        SpecialForm::Row => match args.first() {
            None => Ok(current_row(ctx)),
            Some(AstNode::Ref(raw)) => {
                let id = normalize_reference(raw, ctx.sheet);
                Ok(emitter.call(
                    &emitter.helper_name("row"),
                    &[emitter.string_literal(&id)],
                ))
            }
            Some(other) => {
                let lowered = lower_expr(emitter, other, ctx)?;
                Ok(emitter.call(&emitter.helper_name("row"), &[lowered]))
            }
        },

        SpecialForm::Indirect => {
            let mut lowered = lower_args(emitter, args, ctx)?;
            lowered.push(emitter.cells_map().to_string());
            lowered.push(emitter.string_literal(ctx.sheet));
            Ok(emitter.call(&emitter.helper_name("indirect"), &lowered))
        }
    }
}

/// The current cell's 1-based row, for a bare `ROW()`
fn current_row(ctx: &LowerContext<'_>) -> String {
    let a1 = split_reference(ctx.cell_id)
        .map(|(_, a1)| a1)
        .unwrap_or(ctx.cell_id);
    match CellAddress::parse(a1) {
        Ok(addr) => (addr.row + 1).to_string(),
        Err(_) => "0".to_string(),
    }
}

fn lower_args(
    emitter: &dyn Emitter,
    args: &[AstNode],
    ctx: &LowerContext<'_>,
) -> CodegenResult<Vec<String>> {
    args.iter()
        .map(|arg| lower_expr(emitter, arg, ctx))
        .collect()
}

fn lower_array(
    emitter: &dyn Emitter,
    rows: &[AstNode],
    ctx: &LowerContext<'_>,
) -> CodegenResult<String> {
    let mut lowered_rows = Vec::with_capacity(rows.len());
    for row in rows {
        match row {
            AstNode::Call(name, items) if name == ARRAY_ROW_CALL => {
                lowered_rows.push(lower_args(emitter, items, ctx)?);
            }
            other => lowered_rows.push(vec![lower_expr(emitter, other, ctx)?]),
        }
    }

    // A single row collapses to a flat list, like a single-column range
    if lowered_rows.len() == 1 {
        let row = lowered_rows.pop().unwrap_or_default();
        return Ok(emitter.list(&row));
    }
    let rows: Vec<String> = lowered_rows.iter().map(|r| emitter.list(r)).collect();
    Ok(emitter.list(&rows))
}
