//! Prelude module - common imports for sheetc users
//!
//! ```rust
//! use sheetc::prelude::*;
//! ```

pub use crate::{
    // Pipeline
    compile,
    load_config_json,
    load_workbook_json,
    CompileError,
    CompileOutput,
    CompileStats,

    // Data model
    Cell,
    CellAddress,
    ScalarValue,
    Sheet,
    Workbook,

    // Analysis
    missing_sheets,
    DependencyGraph,

    // Generation
    GenerateOptions,
    Target,

    // Errors
    Error,
    Result,
};
