//! Whole-file generation
//!
//! Assembles the generated source in a fixed order: banner, preamble,
//! runtime helper block, then `calculate` containing the data-entry block,
//! the cycle sentinels, the ordered assignments, and the output record.

use sheetc_core::Workbook;
use sheetc_formula::DependencyGraph;

use crate::emitter::{scalar_literal, Emitter};
use crate::error::{CodegenError, CodegenResult};
use crate::lower::{lower_expr, LowerContext};
use crate::GenerateOptions;

/// Generate the complete source file for a compiled workbook
pub fn generate(
    workbook: &Workbook,
    graph: &DependencyGraph<'_>,
    options: &GenerateOptions,
) -> CodegenResult<String> {
    for tab in options.input_tabs.iter().chain(&options.output_tabs) {
        if workbook.sheet_index(tab).is_none() {
            return Err(CodegenError::UnknownTab(tab.clone()));
        }
    }

    let backend = options.target.backend();
    let em = backend.as_ref();

    let mut out = String::new();

    if let Some(banner) = &options.banner {
        out.push_str(&em.comment(banner));
        out.push_str("\n\n");
    }

    out.push_str(em.preamble(options).trim_end());
    out.push_str("\n\n");
    out.push_str(em.runtime().trim_end());
    out.push_str("\n\n");

    out.push_str(&em.open_calculate());
    out.push('\n');

    // Data entry: literal cells of the input tabs fall back to the values
    // baked in at generation time
    if !options.input_tabs.is_empty() {
        push_blank(&mut out);
        push_block(&mut out, em, &em.comment("Input values"));
        for tab in &options.input_tabs {
            if let Some(sheet) = workbook.sheet_by_name(tab) {
                for cell in sheet.cells().filter(|c| !c.has_formula()) {
                    let a1 = cell.address().to_canonical();
                    let literal = scalar_literal(em, &cell.value);
                    push_block(&mut out, em, &em.input_default(tab, &a1, &literal));
                }
            }
        }
    }

    // Cycle members never make the ordered list; they come out as error
    // sentinels instead
    let cycles = graph.cycle_members();
    if !cycles.is_empty() {
        push_blank(&mut out);
        push_block(
            &mut out,
            em,
            &em.comment(&format!(
                "Circular references detected: {}",
                cycles.join(", ")
            )),
        );
        for id in &cycles {
            push_block(
                &mut out,
                em,
                &em.assign_cell(id, &em.string_literal("#REF!")),
            );
        }
    }

    if !graph.evaluation_order().is_empty() {
        push_blank(&mut out);
        push_block(&mut out, em, &em.comment("Formula cells in dependency order"));
        for id in graph.evaluation_order() {
            let Some(node) = graph.node(id) else {
                continue;
            };
            let ctx = LowerContext {
                sheet: &node.sheet,
                cell_id: &node.id,
            };
            let expr = lower_expr(em, node.ast, &ctx)?;
            push_block(&mut out, em, &em.assign_cell(id, &expr));
        }
    }

    push_blank(&mut out);
    push_block(&mut out, em, &em.comment("Output record"));
    push_block(&mut out, em, &em.open_output(&options.output_tabs));
    for tab in &options.output_tabs {
        if let Some(sheet) = workbook.sheet_by_name(tab) {
            for cell in sheet.cells() {
                let a1 = cell.address().to_canonical();
                push_block(&mut out, em, &em.output_entry(tab, &a1));
            }
        }
    }
    push_block(&mut out, em, &em.return_output());

    let close = em.close_calculate();
    if !close.is_empty() {
        out.push_str(&close);
        out.push('\n');
    }

    Ok(out)
}

fn push_blank(out: &mut String) {
    out.push('\n');
}

/// Push a possibly multi-line statement, indenting each line into the
/// `calculate` body
fn push_block(out: &mut String, em: &dyn Emitter, text: &str) {
    for line in text.lines() {
        if line.is_empty() {
            out.push('\n');
        } else {
            out.push_str(em.indent());
            out.push_str(line);
            out.push('\n');
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Target;
    use sheetc_core::{Cell, ScalarValue, Sheet};
    use sheetc_formula::{parse_formula, FormulaSet};

    fn sample_workbook() -> Workbook {
        let mut input = Sheet::new("Input");
        input.insert(Cell::literal(0, 0, ScalarValue::Number(100.0)));
        input.insert(Cell::literal(1, 0, ScalarValue::text("widgets")));

        let mut calc = Sheet::new("Calc");
        calc.insert(Cell::with_formula(
            0,
            0,
            ScalarValue::Number(10.0),
            "=Input!A1*0.1",
        ));
        calc.insert(Cell::with_formula(
            0,
            1,
            ScalarValue::Number(15.0),
            "=Calc!A1+5",
        ));

        let mut wb = Workbook::new();
        wb.add_sheet(input).unwrap();
        wb.add_sheet(calc).unwrap();
        wb
    }

    fn sample_formulas(wb: &Workbook) -> FormulaSet {
        let mut set = FormulaSet::new();
        for sheet in wb.sheets() {
            for cell in sheet.formula_cells() {
                if let Some(formula) = &cell.formula {
                    let id = format!("{}!{}", sheet.name(), cell.address().to_canonical());
                    set.insert(id, parse_formula(formula).unwrap());
                }
            }
        }
        set
    }

    fn options(target: Target) -> GenerateOptions {
        GenerateOptions {
            target,
            input_tabs: vec!["Input".into()],
            output_tabs: vec!["Calc".into()],
            banner: None,
        }
    }

    #[test]
    fn test_typescript_output_shape() {
        let wb = sample_workbook();
        let formulas = sample_formulas(&wb);
        let graph = DependencyGraph::build(&formulas);
        let source = generate(&wb, &graph, &options(Target::TypeScript)).unwrap();

        assert!(source.contains("export interface CalculateInput"));
        assert!(source.contains("\"Input\"?: { [cell: string]: number | string };"));
        assert!(source.contains("export interface CalculateOutput"));
        assert!(source.contains(
            "export function calculate(input: CalculateInput): CalculateOutput {"
        ));
        assert!(source
            .contains("cells.set(\"Input!A1\", input[\"Input\"]?.[\"A1\"] ?? 100);"));
        assert!(source.contains("cells.set(\"Input!A2\", input[\"Input\"]?.[\"A2\"] ?? \"widgets\");"));
        assert!(source.contains(
            "cells.set(\"Calc!A1\", safeMultiply((cells.get(\"Input!A1\") ?? \"\"), 0.1));"
        ));
        assert!(source.contains(
            "cells.set(\"Calc!B1\", safeAdd((cells.get(\"Calc!A1\") ?? \"\"), 5));"
        ));
        assert!(source.contains("output[\"Calc\"][\"A1\"] = outputValue"));
        assert!(source.contains("return output;"));
        // The runtime block is embedded
        assert!(source.contains("function safeDivide("));
        assert!(source.contains("function rangeLookup("));
    }

    #[test]
    fn test_dependency_order_in_emitted_text() {
        let wb = sample_workbook();
        let formulas = sample_formulas(&wb);
        let graph = DependencyGraph::build(&formulas);
        let source = generate(&wb, &graph, &options(Target::TypeScript)).unwrap();

        let a1 = source.find("cells.set(\"Calc!A1\"").unwrap();
        let b1 = source.find("cells.set(\"Calc!B1\"").unwrap();
        assert!(a1 < b1, "Calc!A1 must be assigned before Calc!B1");
    }

    #[test]
    fn test_python_output_shape() {
        let wb = sample_workbook();
        let formulas = sample_formulas(&wb);
        let graph = DependencyGraph::build(&formulas);
        let source = generate(&wb, &graph, &options(Target::Python)).unwrap();

        assert!(source.contains("def calculate(input):"));
        assert!(source.contains("import math"));
        assert!(source
            .contains("cells[\"Input!A1\"] = input.get(\"Input\", {}).get(\"A1\", 100)"));
        assert!(source.contains(
            "cells[\"Calc!A1\"] = safe_multiply(cells.get(\"Input!A1\", \"\"), 0.1)"
        ));
        assert!(source.contains("output = {\"Calc\": {}}"));
        assert!(source.contains("output[\"Calc\"][\"A1\"] = output_value(cells.get(\"Calc!A1\", \"\"))"));
        assert!(source.contains("return output"));
        assert!(source.contains("def safe_divide("));
        assert!(source.contains("def range_lookup("));
    }

    #[test]
    fn test_cycle_members_emit_sentinels() {
        let mut sheet = Sheet::new("S");
        sheet.insert(Cell::with_formula(0, 0, ScalarValue::Number(0.0), "=B1+1"));
        sheet.insert(Cell::with_formula(0, 1, ScalarValue::Number(0.0), "=A1+1"));
        let mut wb = Workbook::new();
        wb.add_sheet(sheet).unwrap();

        let formulas = sample_formulas(&wb);
        let graph = DependencyGraph::build(&formulas);
        let opts = GenerateOptions {
            target: Target::TypeScript,
            input_tabs: vec![],
            output_tabs: vec!["S".into()],
            banner: None,
        };
        let source = generate(&wb, &graph, &opts).unwrap();

        assert!(source.contains("// Circular references detected: S!A1, S!B1"));
        assert!(source.contains("cells.set(\"S!A1\", \"#REF!\");"));
        assert!(source.contains("cells.set(\"S!B1\", \"#REF!\");"));
        // Neither cell gets an ordered assignment
        assert!(!source.contains("cells.set(\"S!A1\", safeAdd"));
        assert!(!source.contains("cells.set(\"S!B1\", safeAdd"));
    }

    #[test]
    fn test_unknown_tab_is_fatal() {
        let wb = sample_workbook();
        let formulas = sample_formulas(&wb);
        let graph = DependencyGraph::build(&formulas);
        let mut opts = options(Target::TypeScript);
        opts.output_tabs = vec!["Missing".into()];

        assert!(matches!(
            generate(&wb, &graph, &opts),
            Err(CodegenError::UnknownTab(_))
        ));
    }

    #[test]
    fn test_banner_comment() {
        let wb = sample_workbook();
        let formulas = sample_formulas(&wb);
        let graph = DependencyGraph::build(&formulas);
        let mut opts = options(Target::Python);
        opts.banner = Some("Generated by sheetc".into());

        let source = generate(&wb, &graph, &opts).unwrap();
        assert!(source.starts_with("# Generated by sheetc\n"));
    }
}
