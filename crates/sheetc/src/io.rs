//! Workbook and configuration loading
//!
//! The driver feeds the compiler two JSON documents. The workbook contract:
//!
//! ```json
//! {
//!   "sheets": {
//!     "Input": {
//!       "A1": { "value": 100, "formula": null, "formatted": "100" },
//!       "A2": 5
//!     },
//!     "Calc": { "B1": { "value": 10, "formula": "=Input!A1*0.1" } }
//!   },
//!   "namedRanges": { "TaxRate": "Rates!B1" }
//! }
//! ```
//!
//! A bare scalar is shorthand for `{ "value": ... }`. The configuration
//! contract:
//!
//! ```json
//! { "target": "typescript", "inputTabs": ["Input"], "outputTabs": ["Calc"] }
//! ```

use std::collections::BTreeMap;

use serde::Deserialize;
use thiserror::Error;

use sheetc_codegen::GenerateOptions;
use sheetc_core::{Cell, CellAddress, ScalarValue, Sheet, Workbook};

/// Errors while loading the input contracts
#[derive(Debug, Error)]
pub enum InputError {
    /// Malformed JSON
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// A cell key or sheet entry the data model rejects
    #[error(transparent)]
    Workbook(#[from] sheetc_core::Error),

    /// Unrecognized target identifier
    #[error("{0}")]
    Target(String),
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WorkbookFile {
    sheets: BTreeMap<String, BTreeMap<String, CellFile>>,
    #[serde(default)]
    named_ranges: BTreeMap<String, String>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum CellFile {
    Scalar(ScalarValue),
    Full {
        #[serde(default)]
        value: Option<ScalarValue>,
        #[serde(default)]
        formula: Option<String>,
        #[serde(default)]
        formatted: Option<String>,
    },
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ConfigFile {
    target: String,
    #[serde(default)]
    input_tabs: Vec<String>,
    #[serde(default)]
    output_tabs: Vec<String>,
}

/// Load a workbook from its JSON contract
///
/// Tabs load in sorted name order; the generation config, not JSON layout,
/// decides which tabs are inputs and outputs.
pub fn load_workbook_json(json: &str) -> Result<Workbook, InputError> {
    let file: WorkbookFile = serde_json::from_str(json)?;

    let mut workbook = Workbook::new();
    for (name, cells) in file.sheets {
        let mut sheet = Sheet::new(&name);
        for (a1, cell) in cells {
            let addr = CellAddress::parse(&a1)?;
            let (value, formula, formatted) = match cell {
                CellFile::Scalar(value) => (value, None, None),
                CellFile::Full {
                    value,
                    formula,
                    formatted,
                } => (value.unwrap_or_default(), formula, formatted),
            };
            sheet.insert(Cell {
                row: addr.row,
                col: addr.col,
                value,
                formula,
                formatted,
            });
        }
        workbook.add_sheet(sheet)?;
    }

    for (name, refers_to) in file.named_ranges {
        workbook.define_name(name, refers_to);
    }

    Ok(workbook)
}

/// Load generation options from their JSON contract
pub fn load_config_json(json: &str) -> Result<GenerateOptions, InputError> {
    let file: ConfigFile = serde_json::from_str(json)?;
    let target = file.target.parse().map_err(InputError::Target)?;
    Ok(GenerateOptions {
        target,
        input_tabs: file.input_tabs,
        output_tabs: file.output_tabs,
        banner: None,
    })
}
