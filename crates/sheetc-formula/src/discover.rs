//! Referenced-sheet discovery
//!
//! Scans raw formula text for sheet-qualified references so the driver can
//! find tabs it has not loaded yet. Two patterns: a quoted name
//! (`'My Sheet'!`, apostrophes doubled inside) and a bare identifier
//! (`Sheet1!`). Quoted matches are masked out before the identifier scan,
//! otherwise `'My Sheet'!A1` would also surface `Sheet`.

use std::collections::BTreeSet;

use lazy_regex::regex;
use sheetc_core::Workbook;

/// Sheet names referenced by one formula, unquoted and unescaped
pub fn referenced_sheets(formula: &str) -> BTreeSet<String> {
    let quoted = regex!(r"'((?:[^']|'')+)'!");
    let unquoted = regex!(r"([A-Za-z_][A-Za-z0-9_]*)!");

    let mut sheets = BTreeSet::new();

    // Pass 1: quoted names, masking each match so the identifier scan
    // cannot see inside it
    let mut masked = formula.to_string();
    for caps in quoted.captures_iter(formula) {
        if let (Some(whole), Some(name)) = (caps.get(0), caps.get(1)) {
            sheets.insert(name.as_str().replace("''", "'"));
            masked.replace_range(whole.range(), &" ".repeat(whole.as_str().len()));
        }
    }

    // Pass 2: bare identifiers on the masked text
    for caps in unquoted.captures_iter(&masked) {
        if let Some(name) = caps.get(1) {
            sheets.insert(name.as_str().to_string());
        }
    }

    sheets
}

/// Sheet names referenced anywhere in the workbook's formulas but not
/// present as tabs
pub fn missing_sheets(workbook: &Workbook) -> BTreeSet<String> {
    let mut missing = BTreeSet::new();

    for sheet in workbook.sheets() {
        for cell in sheet.formula_cells() {
            if let Some(formula) = &cell.formula {
                for name in referenced_sheets(formula) {
                    if workbook.sheet_index(&name).is_none() {
                        missing.insert(name);
                    }
                }
            }
        }
    }

    missing
}
