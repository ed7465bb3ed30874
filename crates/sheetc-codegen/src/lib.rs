//! # sheetc-codegen
//!
//! Code emission for the sheetc spreadsheet compiler. Lowers parsed
//! formulas and the analyzer's evaluation order into a self-contained
//! source file in one of two targets:
//!
//! - **TypeScript**: statically typed; the file defines `CalculateInput` /
//!   `CalculateOutput` record types alongside `calculate`.
//! - **Python**: a plain module with the same `calculate(input)` shape.
//!
//! Both targets embed a runtime helper block (error-propagating
//! arithmetic, range materialization, the spreadsheet function library) so
//! the generated file needs nothing beyond the target's standard library.

pub mod emitter;
pub mod error;
pub mod functions;
pub mod generator;
pub mod lower;
pub mod python;
pub mod typescript;

use std::str::FromStr;

pub use emitter::Emitter;
pub use error::{CodegenError, CodegenResult};
pub use generator::generate;
pub use lower::{lower_expr, LowerContext};
pub use python::PythonBackend;
pub use typescript::TypeScriptBackend;

/// The target host language
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    TypeScript,
    Python,
}

impl Target {
    /// The backend for this target
    pub fn backend(&self) -> Box<dyn Emitter> {
        match self {
            Target::TypeScript => Box::new(TypeScriptBackend),
            Target::Python => Box::new(PythonBackend),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Target::TypeScript => "typescript",
            Target::Python => "python",
        }
    }
}

impl FromStr for Target {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "typescript" | "ts" => Ok(Target::TypeScript),
            "python" | "py" => Ok(Target::Python),
            other => Err(format!(
                "unknown target '{other}' (expected 'typescript' or 'python')"
            )),
        }
    }
}

/// What to generate: the target plus the input/output tab lists from the
/// configuration contract
#[derive(Debug, Clone)]
pub struct GenerateOptions {
    pub target: Target,
    /// Tabs whose literal cells are read from the input record
    pub input_tabs: Vec<String>,
    /// Tabs copied into the output record
    pub output_tabs: Vec<String>,
    /// Optional banner comment placed at the top of the file
    pub banner: Option<String>,
}

impl GenerateOptions {
    pub fn new(target: Target) -> Self {
        Self {
            target,
            input_tabs: Vec::new(),
            output_tabs: Vec::new(),
            banner: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_target_from_str() {
        assert_eq!("typescript".parse::<Target>().unwrap(), Target::TypeScript);
        assert_eq!("ts".parse::<Target>().unwrap(), Target::TypeScript);
        assert_eq!("Python".parse::<Target>().unwrap(), Target::Python);
        assert!("ruby".parse::<Target>().is_err());
    }
}
