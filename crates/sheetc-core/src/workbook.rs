//! Workbook type

use std::collections::{BTreeMap, HashMap};

use crate::error::{Error, Result};
use crate::sheet::Sheet;

/// A workbook: an ordered set of sheets plus the named-range table
///
/// Sheets keep their load order (the order tabs appear in the source
/// document). Named ranges map a name to a sheet-qualified reference string
/// such as `Rates!B1` or `Data!A1:A10`; they are substituted into formula
/// text before parsing.
#[derive(Debug, Clone, Default)]
pub struct Workbook {
    sheets: Vec<Sheet>,
    index: HashMap<String, usize>,
    named_ranges: BTreeMap<String, String>,
}

impl Workbook {
    /// Create a new empty workbook
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a sheet, keeping load order
    pub fn add_sheet(&mut self, sheet: Sheet) -> Result<usize> {
        let name = sheet.name().to_string();
        if name.is_empty() {
            return Err(Error::InvalidSheetName("empty name".into()));
        }
        if self.index.contains_key(&name) {
            return Err(Error::DuplicateSheetName(name));
        }
        let idx = self.sheets.len();
        self.sheets.push(sheet);
        self.index.insert(name, idx);
        Ok(idx)
    }

    /// Get a sheet by index
    pub fn sheet(&self, idx: usize) -> Option<&Sheet> {
        self.sheets.get(idx)
    }

    /// Get a sheet by name
    pub fn sheet_by_name(&self, name: &str) -> Option<&Sheet> {
        self.index.get(name).map(|&i| &self.sheets[i])
    }

    /// Get the index of a sheet by name
    pub fn sheet_index(&self, name: &str) -> Option<usize> {
        self.index.get(name).copied()
    }

    /// Iterate sheets in load order
    pub fn sheets(&self) -> impl Iterator<Item = &Sheet> {
        self.sheets.iter()
    }

    /// Number of sheets
    pub fn sheet_count(&self) -> usize {
        self.sheets.len()
    }

    /// Define a named range (name -> `Sheet!A1[:A1]` reference string)
    pub fn define_name(&mut self, name: impl Into<String>, refers_to: impl Into<String>) {
        self.named_ranges.insert(name.into(), refers_to.into());
    }

    /// Look up a named range
    pub fn named_range(&self, name: &str) -> Option<&str> {
        self.named_ranges.get(name).map(|s| s.as_str())
    }

    /// The full named-range table, sorted by name
    pub fn named_ranges(&self) -> &BTreeMap<String, String> {
        &self.named_ranges
    }

    /// Total number of formula cells across all sheets
    pub fn formula_count(&self) -> usize {
        self.sheets.iter().map(|s| s.formula_cells().count()).sum()
    }
}
