//! Function dispatch table
//!
//! Maps upper-cased spreadsheet function names to runtime helper stems.
//! Stems are snake_case; each backend converts them to its surface naming
//! (camelCase for TypeScript, snake_case with builtin-collision underscores
//! for Python). Names missing from the table lower to a pass-through call.

use once_cell::sync::Lazy;
use std::collections::HashMap;

/// How a function call is lowered
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpecialForm {
    /// Plain helper call with lowered arguments
    Standard,
    /// Target-native conditional; missing false branch defaults to false
    If,
    /// Range arguments after the rate are unpacked into the call
    Npv,
    /// A reference argument is passed as text; no argument means the
    /// current cell's row
    Row,
    /// The cells map and current sheet are appended to the arguments
    Indirect,
}

/// One dispatch table entry
#[derive(Debug, Clone, Copy)]
pub struct FunctionSpec {
    pub stem: &'static str,
    pub form: SpecialForm,
}

/// The dispatch table, keyed by upper-cased spreadsheet name
pub static FUNCTIONS: Lazy<HashMap<&'static str, FunctionSpec>> = Lazy::new(|| {
    let mut table = HashMap::new();

    let mut standard = |name: &'static str, stem: &'static str| {
        table.insert(
            name,
            FunctionSpec {
                stem,
                form: SpecialForm::Standard,
            },
        );
    };

    // Aggregates
    standard("SUM", "sum");
    standard("AVERAGE", "average");
    standard("MIN", "min");
    standard("MAX", "max");
    standard("COUNT", "count");
    standard("COUNTA", "counta");
    standard("SUMPRODUCT", "sumproduct");

    // Conditional aggregates
    standard("COUNTIF", "countif");
    standard("SUMIF", "sumif");
    standard("SUMIFS", "sumifs");
    standard("AVERAGEIF", "averageif");

    // Statistics
    standard("STDEV", "stdev");
    standard("VAR", "variance");
    standard("VARIANCE", "variance");
    standard("MEDIAN", "median");
    standard("PERCENTILE", "percentile");
    standard("LARGE", "large");
    standard("SMALL", "small");
    standard("RANK", "rank");

    // Distributions
    standard("NORMSDIST", "normsdist");
    standard("NORM.S.DIST", "normsdist");
    standard("NORMSINV", "normsinv");
    standard("NORM.S.INV", "normsinv");
    standard("CHIINV", "chiinv");
    standard("FINV", "finv");
    standard("TINV", "tinv");
    standard("T.INV", "tinv");

    // Logical
    standard("AND", "and");
    standard("OR", "or");

    // Information
    standard("ISNUMBER", "isnumber");
    standard("ISBLANK", "isblank");
    standard("ISTEXT", "istext");
    standard("ISNA", "isna");
    standard("NA", "na");

    // Lookups
    standard("VLOOKUP", "vlookup");
    standard("MATCH", "match");
    standard("INDEX", "index");

    // Arrays
    standard("SORT", "sort");
    standard("UNIQUE", "unique");

    // Text
    standard("CONCATENATE", "concatenate");
    standard("LEN", "len");
    standard("UPPER", "upper");
    standard("LOWER", "lower");
    standard("TRIM", "trim");

    // Date
    standard("TODAY", "today");
    standard("NOW", "now");

    // Finance
    standard("PMT", "pmt");
    standard("FV", "fv");
    standard("PV", "pv");
    standard("RATE", "rate");
    standard("IRR", "irr");
    standard("NPER", "nper");
    standard("IPMT", "ipmt");
    standard("PPMT", "ppmt");

    // Math
    standard("ABS", "abs");
    standard("SQRT", "safe_sqrt");
    standard("ROUND", "round");
    standard("TRUNC", "trunc");
    standard("EXP", "exp");
    standard("LN", "ln");
    standard("LOG", "log");

    // Special lowerings
    table.insert(
        "IF",
        FunctionSpec {
            stem: "if",
            form: SpecialForm::If,
        },
    );
    table.insert(
        "NPV",
        FunctionSpec {
            stem: "npv",
            form: SpecialForm::Npv,
        },
    );
    table.insert(
        "ROW",
        FunctionSpec {
            stem: "row",
            form: SpecialForm::Row,
        },
    );
    table.insert(
        "INDIRECT",
        FunctionSpec {
            stem: "indirect",
            form: SpecialForm::Indirect,
        },
    );

    table
});

/// Look up a spreadsheet function by (case-insensitive) name
pub fn lookup(name: &str) -> Option<FunctionSpec> {
    FUNCTIONS.get(name.to_ascii_uppercase().as_str()).copied()
}
