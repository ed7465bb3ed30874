//! TypeScript backend
//!
//! Target A: statically typed. The generated file defines `CalculateInput`
//! and `CalculateOutput` interfaces with per-tab fields typed
//! `number | string`, keeps cell state in a `Map`, and reads cells with
//! `cells.get(...) ?? ""` (the empty string is the absent sentinel).

use sheetc_formula::OpSymbol;

use crate::emitter::Emitter;
use crate::{GenerateOptions, Target};

/// The TypeScript emitter
pub struct TypeScriptBackend;

/// snake_case helper stem -> camelCase surface name
fn camel_case(stem: &str) -> String {
    let mut out = String::with_capacity(stem.len());
    let mut upper_next = false;
    for c in stem.chars() {
        if c == '_' {
            upper_next = true;
        } else if upper_next {
            out.push(c.to_ascii_uppercase());
            upper_next = false;
        } else {
            out.push(c);
        }
    }
    out
}

impl Emitter for TypeScriptBackend {
    fn target(&self) -> Target {
        Target::TypeScript
    }

    fn file_extension(&self) -> &'static str {
        "ts"
    }

    fn indent(&self) -> &'static str {
        "  "
    }

    fn comment(&self, text: &str) -> String {
        format!("// {}", text)
    }

    fn preamble(&self, options: &GenerateOptions) -> String {
        let mut out = String::new();

        out.push_str("export interface CalculateInput {\n");
        for tab in &options.input_tabs {
            out.push_str(&format!(
                "  {}?: {{ [cell: string]: number | string }};\n",
                self.string_literal(tab)
            ));
        }
        out.push_str("}\n\n");

        out.push_str("export interface CalculateOutput {\n");
        for tab in &options.output_tabs {
            out.push_str(&format!(
                "  {}: {{ [cell: string]: number | string }};\n",
                self.string_literal(tab)
            ));
        }
        out.push_str("}\n");

        out
    }

    fn runtime(&self) -> &'static str {
        include_str!("runtime/runtime.ts")
    }

    fn open_calculate(&self) -> String {
        "export function calculate(input: CalculateInput): CalculateOutput {\n  \
         const cells = new Map<string, any>();"
            .to_string()
    }

    fn close_calculate(&self) -> String {
        "}".to_string()
    }

    fn input_default(&self, tab: &str, cell: &str, literal: &str) -> String {
        format!(
            "cells.set({}, input[{}]?.[{}] ?? {});",
            self.string_literal(&format!("{}!{}", tab, cell)),
            self.string_literal(tab),
            self.string_literal(cell),
            literal
        )
    }

    fn assign_cell(&self, id: &str, expr: &str) -> String {
        format!("cells.set({}, {});", self.string_literal(id), expr)
    }

    fn cell_read(&self, id: &str) -> String {
        format!("(cells.get({}) ?? \"\")", self.string_literal(id))
    }

    fn range_read(&self, id: &str) -> String {
        format!(
            "{}({}, cells)",
            self.helper_name("range_lookup"),
            self.string_literal(id)
        )
    }

    fn cells_map(&self) -> &'static str {
        "cells"
    }

    fn helper_name(&self, stem: &str) -> String {
        camel_case(stem)
    }

    fn bool_literal(&self, value: bool) -> &'static str {
        if value {
            "true"
        } else {
            "false"
        }
    }

    fn binary_op(&self, op: OpSymbol, lhs: &str, rhs: &str) -> String {
        match op {
            OpSymbol::Power => format!("Math.pow({}, {})", lhs, rhs),
            OpSymbol::Concat => format!("(String({}) + String({}))", lhs, rhs),
            OpSymbol::Equal => format!("({} === {})", lhs, rhs),
            OpSymbol::NotEqual => format!("({} !== {})", lhs, rhs),
            other => format!("({} {} {})", lhs, other.as_str(), rhs),
        }
    }

    fn conditional(&self, cond: &str, then: &str, otherwise: &str) -> String {
        format!("({} ? {} : {})", cond, then, otherwise)
    }

    fn spread(&self, expr: &str) -> String {
        format!("...{}", expr)
    }

    fn open_output(&self, tabs: &[String]) -> String {
        let mut out = String::from("const output: CalculateOutput = {\n");
        for tab in tabs {
            out.push_str(&format!("  {}: {{}},\n", self.string_literal(tab)));
        }
        out.push_str("};");
        out
    }

    fn output_entry(&self, tab: &str, cell: &str) -> String {
        let id = format!("{}!{}", tab, cell);
        format!(
            "output[{}][{}] = {}({});",
            self.string_literal(tab),
            self.string_literal(cell),
            self.helper_name("output_value"),
            self.cell_read(&id)
        )
    }

    fn return_output(&self) -> String {
        "return output;".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_camel_case() {
        assert_eq!(camel_case("safe_add"), "safeAdd");
        assert_eq!(camel_case("safe_less_eq"), "safeLessEq");
        assert_eq!(camel_case("range_lookup"), "rangeLookup");
        assert_eq!(camel_case("sum"), "sum");
    }

    #[test]
    fn test_cell_read_keeps_the_lookup_marker() {
        let read = TypeScriptBackend.cell_read("Main!A1");
        assert!(read.contains("cells.get"));
    }

    #[test]
    fn test_binary_op_surface() {
        let em = TypeScriptBackend;
        assert_eq!(em.binary_op(OpSymbol::Add, "1", "2"), "(1 + 2)");
        assert_eq!(em.binary_op(OpSymbol::Power, "2", "3"), "Math.pow(2, 3)");
        assert_eq!(em.binary_op(OpSymbol::Equal, "a", "b"), "(a === b)");
    }
}
