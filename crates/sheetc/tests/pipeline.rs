//! End-to-end pipeline tests: workbook in, analysis and generated source out

use pretty_assertions::assert_eq;
use sheetc::prelude::*;
use sheetc::{parse_workbook, DependencyGraph};

fn options(target: Target, input_tabs: &[&str], output_tabs: &[&str]) -> GenerateOptions {
    GenerateOptions {
        target,
        input_tabs: input_tabs.iter().map(|s| s.to_string()).collect(),
        output_tabs: output_tabs.iter().map(|s| s.to_string()).collect(),
        banner: None,
    }
}

fn cross_sheet_workbook() -> Workbook {
    let mut input = Sheet::new("Input");
    input.insert(Cell::literal(0, 0, ScalarValue::Number(100.0)));

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

#[test]
fn cross_sheet_dependency_order() {
    let wb = cross_sheet_workbook();
    let output = compile(&wb, &options(Target::TypeScript, &["Input"], &["Calc"])).unwrap();

    // Calc!A1 is assigned before Calc!B1; Input!A1 is initialized in the
    // data-entry block, not the ordered block
    let source = &output.source;
    let input_entry = source
        .find("cells.set(\"Input!A1\", input[\"Input\"]?.[\"A1\"] ?? 100);")
        .expect("input entry missing");
    let a1 = source.find("cells.set(\"Calc!A1\",").expect("Calc!A1 missing");
    let b1 = source.find("cells.set(\"Calc!B1\",").expect("Calc!B1 missing");
    assert!(input_entry < a1);
    assert!(a1 < b1);

    assert_eq!(output.stats.ordered_cells, 2);
    assert_eq!(output.stats.cycle_members, 0);
}

#[test]
fn cycle_emission() {
    let mut sheet = Sheet::new("S");
    sheet.insert(Cell::with_formula(0, 0, ScalarValue::Number(0.0), "=B1+1"));
    sheet.insert(Cell::with_formula(0, 1, ScalarValue::Number(0.0), "=A1+1"));
    let mut wb = Workbook::new();
    wb.add_sheet(sheet).unwrap();

    let mut stats = CompileStats::default();
    let formulas = parse_workbook(&wb, &mut stats).unwrap();
    let graph = DependencyGraph::build(&formulas);
    assert_eq!(graph.cycle_members(), vec!["S!A1", "S!B1"]);
    assert!(graph.evaluation_order().is_empty());

    let output = compile(&wb, &options(Target::TypeScript, &[], &["S"])).unwrap();
    assert!(output
        .source
        .contains("// Circular references detected: S!A1, S!B1"));
    assert!(output.source.contains("cells.set(\"S!A1\", \"#REF!\");"));
    assert!(output.source.contains("cells.set(\"S!B1\", \"#REF!\");"));
}

#[test]
fn quoted_sheet_normalization() {
    let mut data = Sheet::new("John's Data");
    data.insert(Cell::literal(1, 1, ScalarValue::Number(7.0)));

    let mut main = Sheet::new("Main");
    main.insert(Cell::with_formula(
        0,
        0,
        ScalarValue::Number(8.0),
        "='John''s Data'!B2 + 1",
    ));

    let mut wb = Workbook::new();
    wb.add_sheet(data).unwrap();
    wb.add_sheet(main).unwrap();

    let mut stats = CompileStats::default();
    let formulas = parse_workbook(&wb, &mut stats).unwrap();
    let graph = DependencyGraph::build(&formulas);
    let node = graph.node("Main!A1").unwrap();
    assert!(node.dependencies.contains("John's Data!B2"));
}

#[test]
fn error_propagation_statements() {
    // Input cells A1 = 0, A2 = 10; B1 = A2/A1, C1 = B1+5, D1 = B1<10.
    // The generated statements must route division through safeDivide and
    // the downstream uses through safeAdd/safeLess so "#DIV/0!" propagates
    // and the comparison yields false.
    let mut sheet = Sheet::new("S");
    sheet.insert(Cell::literal(0, 0, ScalarValue::Number(0.0)));
    sheet.insert(Cell::literal(1, 0, ScalarValue::Number(10.0)));
    sheet.insert(Cell::with_formula(0, 1, ScalarValue::Number(0.0), "=A2/A1"));
    sheet.insert(Cell::with_formula(0, 2, ScalarValue::Number(0.0), "=B1+5"));
    sheet.insert(Cell::with_formula(0, 3, ScalarValue::Bool(false), "=B1<10"));
    let mut wb = Workbook::new();
    wb.add_sheet(sheet).unwrap();

    let output = compile(&wb, &options(Target::TypeScript, &["S"], &["S"])).unwrap();
    let source = &output.source;

    assert!(source.contains(
        "cells.set(\"S!B1\", safeDivide((cells.get(\"S!A2\") ?? \"\"), (cells.get(\"S!A1\") ?? \"\")));"
    ));
    assert!(source.contains("cells.set(\"S!C1\", safeAdd((cells.get(\"S!B1\") ?? \"\"), 5));"));
    assert!(source.contains("cells.set(\"S!D1\", safeLess((cells.get(\"S!B1\") ?? \"\"), 10));"));
}

#[test]
fn named_ranges_expand_before_parsing() {
    let mut rates = Sheet::new("Rates");
    rates.insert(Cell::literal(0, 1, ScalarValue::Number(0.07)));

    let mut calc = Sheet::new("Calc");
    calc.insert(Cell::with_formula(
        0,
        0,
        ScalarValue::Number(0.0),
        "=SUM(Sales)*TaxRate",
    ));

    let mut wb = Workbook::new();
    wb.add_sheet(rates).unwrap();
    wb.add_sheet(calc).unwrap();
    wb.define_name("TaxRate", "Rates!B1");
    wb.define_name("Sales", "Calc!A2:A9");

    let mut stats = CompileStats::default();
    let formulas = parse_workbook(&wb, &mut stats).unwrap();
    let node_deps = &DependencyGraph::build(&formulas);
    let deps = &node_deps.node("Calc!A1").unwrap().dependencies;
    assert!(deps.contains("Rates!B1"));
    assert!(deps.contains("Calc!A2:A9"));
}

#[test]
fn missing_sheet_discovery() {
    let mut main = Sheet::new("Main");
    main.insert(Cell::with_formula(
        0,
        0,
        ScalarValue::Number(0.0),
        "='Q1 Data'!A1+Rates!B1+Main!A2",
    ));
    let mut wb = Workbook::new();
    wb.add_sheet(main).unwrap();

    let missing: Vec<String> = missing_sheets(&wb).into_iter().collect();
    assert_eq!(missing, vec!["Q1 Data".to_string(), "Rates".to_string()]);
}

#[test]
fn python_target_end_to_end() {
    let wb = cross_sheet_workbook();
    let output = compile(&wb, &options(Target::Python, &["Input"], &["Calc"])).unwrap();
    let source = &output.source;

    assert!(source.contains("def calculate(input):"));
    assert!(source.contains("cells[\"Input!A1\"] = input.get(\"Input\", {}).get(\"A1\", 100)"));
    assert!(source.contains(
        "cells[\"Calc!A1\"] = safe_multiply(cells.get(\"Input!A1\", \"\"), 0.1)"
    ));
    assert!(source.contains("cells[\"Calc!B1\"] = safe_add(cells.get(\"Calc!A1\", \"\"), 5)"));
    assert!(source.contains("output[\"Calc\"][\"B1\"] = output_value(cells.get(\"Calc!B1\", \"\"))"));
}

#[test]
fn json_contract_to_source() {
    let wb = load_workbook_json(
        r#"{
            "sheets": {
                "Input": { "A1": 100 },
                "Calc": {
                    "A1": { "value": 10, "formula": "=Input!A1*0.1" },
                    "B1": { "value": 15, "formula": "=Calc!A1+5" }
                }
            }
        }"#,
    )
    .unwrap();
    let options = load_config_json(
        r#"{ "target": "typescript", "inputTabs": ["Input"], "outputTabs": ["Calc"] }"#,
    )
    .unwrap();

    let output = compile(&wb, &options).unwrap();
    assert_eq!(output.stats.formula_count, 2);
    assert!(output.source.contains("export function calculate"));
}

#[test]
fn order_cycle_partition_over_a_larger_workbook() {
    let mut sheet = Sheet::new("S");
    sheet.insert(Cell::with_formula(0, 0, ScalarValue::Number(0.0), "=B1"));
    sheet.insert(Cell::with_formula(0, 1, ScalarValue::Number(0.0), "=A1"));
    sheet.insert(Cell::with_formula(1, 0, ScalarValue::Number(0.0), "=1+1"));
    sheet.insert(Cell::with_formula(1, 1, ScalarValue::Number(0.0), "=A2*2"));
    sheet.insert(Cell::with_formula(2, 0, ScalarValue::Number(0.0), "=B2-A2"));
    let mut wb = Workbook::new();
    wb.add_sheet(sheet).unwrap();

    let mut stats = CompileStats::default();
    let formulas = parse_workbook(&wb, &mut stats).unwrap();
    let graph = DependencyGraph::build(&formulas);

    let mut all: Vec<&str> = graph
        .evaluation_order()
        .iter()
        .map(|s| s.as_str())
        .chain(graph.cycle_members())
        .collect();
    all.sort();
    let mut expected: Vec<&str> = formulas.keys().map(|s| s.as_str()).collect();
    expected.sort();
    assert_eq!(all, expected);
}
