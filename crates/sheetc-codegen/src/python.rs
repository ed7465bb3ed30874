//! Python backend
//!
//! Target B. Cell state is a plain dict read with `cells.get(id, "")`;
//! helper names are snake_case, with a trailing underscore where the stem
//! would shadow a Python builtin or keyword (`sum_`, `and_`, ...).

use sheetc_formula::OpSymbol;

use crate::emitter::Emitter;
use crate::{GenerateOptions, Target};

/// The Python emitter
pub struct PythonBackend;

/// Stems that collide with Python builtins or keywords
const SHADOWED: &[&str] = &["sum", "min", "max", "abs", "round", "len", "and", "or"];

impl Emitter for PythonBackend {
    fn target(&self) -> Target {
        Target::Python
    }

    fn file_extension(&self) -> &'static str {
        "py"
    }

    fn indent(&self) -> &'static str {
        "    "
    }

    fn comment(&self, text: &str) -> String {
        format!("# {}", text)
    }

    fn preamble(&self, _options: &GenerateOptions) -> String {
        "import math\nfrom datetime import datetime, timezone\n".to_string()
    }

    fn runtime(&self) -> &'static str {
        include_str!("runtime/runtime.py")
    }

    fn open_calculate(&self) -> String {
        "def calculate(input):\n    cells = {}".to_string()
    }

    fn close_calculate(&self) -> String {
        String::new()
    }

    fn input_default(&self, tab: &str, cell: &str, literal: &str) -> String {
        format!(
            "cells[{}] = input.get({}, {{}}).get({}, {})",
            self.string_literal(&format!("{}!{}", tab, cell)),
            self.string_literal(tab),
            self.string_literal(cell),
            literal
        )
    }

    fn assign_cell(&self, id: &str, expr: &str) -> String {
        format!("cells[{}] = {}", self.string_literal(id), expr)
    }

    fn cell_read(&self, id: &str) -> String {
        format!("cells.get({}, \"\")", self.string_literal(id))
    }

    fn range_read(&self, id: &str) -> String {
        format!("range_lookup({}, cells)", self.string_literal(id))
    }

    fn cells_map(&self) -> &'static str {
        "cells"
    }

    fn helper_name(&self, stem: &str) -> String {
        if SHADOWED.contains(&stem) {
            format!("{}_", stem)
        } else {
            stem.to_string()
        }
    }

    fn bool_literal(&self, value: bool) -> &'static str {
        if value {
            "True"
        } else {
            "False"
        }
    }

    fn binary_op(&self, op: OpSymbol, lhs: &str, rhs: &str) -> String {
        match op {
            OpSymbol::Power => format!("({} ** {})", lhs, rhs),
            OpSymbol::Concat => format!("(str({}) + str({}))", lhs, rhs),
            OpSymbol::Equal => format!("({} == {})", lhs, rhs),
            OpSymbol::NotEqual => format!("({} != {})", lhs, rhs),
            other => format!("({} {} {})", lhs, other.as_str(), rhs),
        }
    }

    fn conditional(&self, cond: &str, then: &str, otherwise: &str) -> String {
        format!("({} if {} else {})", then, cond, otherwise)
    }

    fn spread(&self, expr: &str) -> String {
        format!("*{}", expr)
    }

    fn open_output(&self, tabs: &[String]) -> String {
        let entries: Vec<String> = tabs
            .iter()
            .map(|tab| format!("{}: {{}}", self.string_literal(tab)))
            .collect();
        format!("output = {{{}}}", entries.join(", "))
    }

    fn output_entry(&self, tab: &str, cell: &str) -> String {
        let id = format!("{}!{}", tab, cell);
        format!(
            "output[{}][{}] = output_value({})",
            self.string_literal(tab),
            self.string_literal(cell),
            self.cell_read(&id)
        )
    }

    fn return_output(&self) -> String {
        "return output".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shadowed_helper_names() {
        let em = PythonBackend;
        assert_eq!(em.helper_name("sum"), "sum_");
        assert_eq!(em.helper_name("and"), "and_");
        assert_eq!(em.helper_name("safe_add"), "safe_add");
        assert_eq!(em.helper_name("vlookup"), "vlookup");
    }

    #[test]
    fn test_cell_read_keeps_the_lookup_marker() {
        let read = PythonBackend.cell_read("Main!A1");
        assert!(read.contains("cells.get"));
    }

    #[test]
    fn test_conditional_shape() {
        assert_eq!(
            PythonBackend.conditional("c", "t", "f"),
            "(t if c else f)"
        );
    }
}
