//! Cell type

use crate::address::CellAddress;
use crate::value::ScalarValue;

/// A single cell of a sheet
///
/// Carries the raw value reported by the source plus, when the cell is
/// computed, its formula text (including the leading `=`) and optionally the
/// source's formatted rendering. The parsed AST is *not* stored here; the
/// pipeline keeps ASTs in a side table keyed by canonical id so the workbook
/// stays immutable after loading.
#[derive(Debug, Clone, PartialEq)]
pub struct Cell {
    /// Row index (0-based)
    pub row: u32,
    /// Column index (0-based)
    pub col: u32,
    /// Raw value
    pub value: ScalarValue,
    /// Formula text, if the cell is computed (e.g. "=SUM(A1:A10)")
    pub formula: Option<String>,
    /// Formatted value as rendered by the source, if reported
    pub formatted: Option<String>,
}

impl Cell {
    /// Create a literal (non-formula) cell
    pub fn literal(row: u32, col: u32, value: ScalarValue) -> Self {
        Self {
            row,
            col,
            value,
            formula: None,
            formatted: None,
        }
    }

    /// Create a formula cell
    pub fn with_formula(
        row: u32,
        col: u32,
        value: ScalarValue,
        formula: impl Into<String>,
    ) -> Self {
        Self {
            row,
            col,
            value,
            formula: Some(formula.into()),
            formatted: None,
        }
    }

    /// The cell's address
    pub fn address(&self) -> CellAddress {
        CellAddress::new(self.row, self.col)
    }

    /// Whether the cell carries a formula
    pub fn has_formula(&self) -> bool {
        self.formula.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cell_basics() {
        let cell = Cell::literal(0, 0, ScalarValue::Number(1.0));
        assert!(!cell.has_formula());
        assert_eq!(cell.address().to_string(), "A1");

        let cell = Cell::with_formula(1, 2, ScalarValue::Number(3.0), "=A1+A2");
        assert!(cell.has_formula());
        assert_eq!(cell.address().to_string(), "C2");
    }
}
