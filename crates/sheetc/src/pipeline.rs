//! The compile pipeline
//!
//! Strictly ordered: expand named ranges → parse every formula cell →
//! build the dependency graph (cycle detection, evaluation order) →
//! generate code. Each call builds fresh analyzer state; nothing is shared
//! between compilations.
//!
//! Failure policy: a lexing failure aborts the compilation; a parse
//! failure only demotes its cell to a literal (with a warning), and the
//! pipeline continues.

use thiserror::Error;

use sheetc_codegen::{generate, CodegenError, GenerateOptions};
use sheetc_core::Workbook;
use sheetc_formula::{
    expand_named_ranges, parse_tokens, tokenize, DependencyGraph, FormulaSet, LexError,
};

/// Errors that abort a compilation
#[derive(Debug, Error)]
pub enum CompileError {
    /// A formula could not be tokenized; carries the cell and the offset
    #[error("cannot tokenize formula in {cell}: {source}")]
    Lex {
        cell: String,
        #[source]
        source: LexError,
    },

    /// Code generation failed
    #[error(transparent)]
    Codegen(#[from] CodegenError),
}

/// Counters reported by a compilation
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompileStats {
    /// Cells carrying a formula string
    pub formula_count: usize,
    /// Formula cells demoted to literals because their parse failed
    pub parse_failures: usize,
    /// Cells caught in reference cycles
    pub cycle_members: usize,
    /// Cells in the emitted evaluation order
    pub ordered_cells: usize,
}

/// A finished compilation: the generated source plus its counters
#[derive(Debug, Clone)]
pub struct CompileOutput {
    pub source: String,
    pub stats: CompileStats,
}

/// Compile a workbook into a source file for the configured target
pub fn compile(
    workbook: &Workbook,
    options: &GenerateOptions,
) -> Result<CompileOutput, CompileError> {
    let mut stats = CompileStats::default();
    let formulas = parse_workbook(workbook, &mut stats)?;

    let graph = DependencyGraph::build(&formulas);
    stats.cycle_members = graph.cycle_members().len();
    stats.ordered_cells = graph.evaluation_order().len();

    if stats.cycle_members > 0 {
        tracing::warn!(
            cycle_members = stats.cycle_members,
            "circular references detected; affected cells compile to \"#REF!\""
        );
    }

    let source = generate(workbook, &graph, options)?;
    Ok(CompileOutput { source, stats })
}

/// Parse every formula cell, attaching ASTs by canonical id
///
/// Named ranges are substituted into the formula text first, so the parser
/// only ever sees plain references.
pub fn parse_workbook(
    workbook: &Workbook,
    stats: &mut CompileStats,
) -> Result<FormulaSet, CompileError> {
    let mut formulas = FormulaSet::new();

    for sheet in workbook.sheets() {
        for cell in sheet.formula_cells() {
            let Some(raw) = cell.formula.as_deref() else {
                continue;
            };
            let id = format!("{}!{}", sheet.name(), cell.address().to_canonical());
            stats.formula_count += 1;

            let expanded = expand_named_ranges(raw, workbook.named_ranges());
            let trimmed = expanded.trim();
            if !trimmed.starts_with('=') {
                // No '=' means the source reported literal text; keep it so
                stats.parse_failures += 1;
                tracing::warn!(cell = %id, "formula does not start with '='; keeping cell as a literal");
                continue;
            }

            let tokens = match tokenize(trimmed) {
                Ok(tokens) => tokens,
                Err(source) => return Err(CompileError::Lex { cell: id, source }),
            };

            match parse_tokens(&tokens, trimmed.len()) {
                Ok(ast) => {
                    formulas.insert(id, ast);
                }
                Err(e) => {
                    // The cell degrades to its literal value
                    stats.parse_failures += 1;
                    tracing::warn!(cell = %id, formula = %raw, error = %e, "formula parse failed; keeping cell as a literal");
                }
            }
        }
    }

    Ok(formulas)
}

#[cfg(test)]
mod tests {
    use super::*;
    use sheetc_codegen::Target;
    use sheetc_core::{Cell, ScalarValue, Sheet};

    fn options() -> GenerateOptions {
        GenerateOptions {
            target: Target::TypeScript,
            input_tabs: vec!["Input".into()],
            output_tabs: vec!["Calc".into()],
            banner: None,
        }
    }

    fn workbook(calc_formulas: &[(&str, &str)]) -> Workbook {
        let mut input = Sheet::new("Input");
        input.insert(Cell::literal(0, 0, ScalarValue::Number(100.0)));

        let mut calc = Sheet::new("Calc");
        for (a1, formula) in calc_formulas {
            let cell = Cell::with_formula(0, 0, ScalarValue::Number(0.0), *formula);
            calc.insert_at(a1, cell).unwrap();
        }

        let mut wb = Workbook::new();
        wb.add_sheet(input).unwrap();
        wb.add_sheet(calc).unwrap();
        wb
    }

    #[test]
    fn test_compile_counts() {
        let wb = workbook(&[("A1", "=Input!A1*2"), ("B1", "=A1+1")]);
        let output = compile(&wb, &options()).unwrap();

        assert_eq!(output.stats.formula_count, 2);
        assert_eq!(output.stats.parse_failures, 0);
        assert_eq!(output.stats.cycle_members, 0);
        assert_eq!(output.stats.ordered_cells, 2);
        assert!(output.source.contains("export function calculate"));
    }

    #[test]
    fn test_parse_failure_degrades_cell() {
        let wb = workbook(&[("A1", "=1+"), ("B1", "=2*3")]);
        let output = compile(&wb, &options()).unwrap();

        assert_eq!(output.stats.formula_count, 2);
        assert_eq!(output.stats.parse_failures, 1);
        assert_eq!(output.stats.ordered_cells, 1);
        // The broken cell gets no assignment
        assert!(!output.source.contains("cells.set(\"Calc!A1\""));
        assert!(output.source.contains("cells.set(\"Calc!B1\", (2 * 3));"));
    }

    #[test]
    fn test_lex_failure_aborts() {
        let wb = workbook(&[("A1", "=1+@2")]);
        let err = compile(&wb, &options()).unwrap_err();
        match err {
            CompileError::Lex { cell, source } => {
                assert_eq!(cell, "Calc!A1");
                assert_eq!(source.offset, 3);
            }
            other => panic!("expected lex error, got {:?}", other),
        }
    }

    #[test]
    fn test_named_range_expansion_before_parse() {
        let mut wb = workbook(&[("A1", "=Input!A1*TaxRate")]);
        wb.define_name("TaxRate", "Input!B1");
        let output = compile(&wb, &options()).unwrap();

        assert!(output
            .source
            .contains("safeMultiply((cells.get(\"Input!A1\") ?? \"\"), (cells.get(\"Input!B1\") ?? \"\"))"));
    }

    #[test]
    fn test_cycles_counted_and_emitted() {
        let wb = workbook(&[("A1", "=B1+1"), ("B1", "=A1+1")]);
        let output = compile(&wb, &options()).unwrap();

        assert_eq!(output.stats.cycle_members, 2);
        assert_eq!(output.stats.ordered_cells, 0);
        assert!(output
            .source
            .contains("// Circular references detected: Calc!A1, Calc!B1"));
        assert!(output.source.contains("cells.set(\"Calc!A1\", \"#REF!\");"));
    }
}
