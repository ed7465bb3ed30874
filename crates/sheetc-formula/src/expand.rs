//! Named-range expansion
//!
//! Substitutes named ranges with their underlying references inside formula
//! text *before* parsing. This is a string-level pass: names can appear in
//! spots a formal token would not capture, so the substitution works on the
//! raw formula, whole words only.

use std::cmp::Reverse;
use std::collections::BTreeMap;

use regex::Regex;

/// Replace every whole-word occurrence of each named range with its
/// reference string
///
/// All matches are located against the original formula first and applied
/// in a single pass; rescanning partially substituted text would let one
/// name's replacement feed another name's pattern.
///
/// # Example
/// ```
/// use std::collections::BTreeMap;
/// use sheetc_formula::expand::expand_named_ranges;
///
/// let mut names = BTreeMap::new();
/// names.insert("TaxRate".to_string(), "Rates!B1".to_string());
/// assert_eq!(
///     expand_named_ranges("=A1*TaxRate", &names),
///     "=A1*Rates!B1"
/// );
/// ```
pub fn expand_named_ranges(formula: &str, names: &BTreeMap<String, String>) -> String {
    let mut spans: Vec<(usize, usize, &str)> = Vec::new();
    for (name, refers_to) in names {
        let pattern = format!(r"\b{}\b", regex::escape(name));
        let Ok(re) = Regex::new(&pattern) else {
            continue; // a name that cannot form a pattern is left alone
        };
        for m in re.find_iter(formula) {
            spans.push((m.start(), m.end(), refers_to.as_str()));
        }
    }

    // Longest match wins at a shared start; later overlaps are dropped
    spans.sort_by_key(|&(start, end, _)| (start, Reverse(end)));
    let mut kept: Vec<(usize, usize, &str)> = Vec::new();
    for (start, end, replacement) in spans {
        if kept.last().map_or(true, |&(_, prev_end, _)| start >= prev_end) {
            kept.push((start, end, replacement));
        }
    }

    // Substitute back-to-front so the remaining offsets stay valid
    let mut out = formula.to_string();
    for &(start, end, replacement) in kept.iter().rev() {
        out.replace_range(start..end, replacement);
    }
    out
}
