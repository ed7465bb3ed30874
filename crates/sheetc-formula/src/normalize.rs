//! Reference normalizer
//!
//! Canonicalizes a textual reference against its enclosing sheet:
//! `Sheet!<A1>[:<A1>]` with the sheet name unquoted (doubled apostrophes
//! collapsed), `$` markers stripped, and column letters uppercased.
//! Bare-column ranges (`D:D`) keep their shape. The transform is
//! idempotent, so canonical ids can be re-normalized freely.

/// Normalize a reference as written in a formula
///
/// # Examples
/// ```
/// use sheetc_formula::normalize::normalize_reference;
///
/// assert_eq!(normalize_reference("$B$2", "Main"), "Main!B2");
/// assert_eq!(normalize_reference("'My Sheet'!A1", "Main"), "My Sheet!A1");
/// assert_eq!(normalize_reference("D:D", "Main"), "Main!D:D");
/// ```
pub fn normalize_reference(raw: &str, current_sheet: &str) -> String {
    let (sheet, rest) = match split_sheet_prefix(raw) {
        Some((sheet, rest)) => (sheet, rest),
        None => (current_sheet.to_string(), raw),
    };

    let body = match rest.split_once(':') {
        Some((start, end)) => format!(
            "{}:{}",
            normalize_endpoint(start),
            normalize_endpoint(end)
        ),
        None => normalize_endpoint(rest),
    };

    format!("{}!{}", sheet, body)
}

/// Split the canonical id `Sheet!A1[:A1]` back into sheet and coordinates
///
/// Splits at the last `!` so sheet names containing `!` survive the trip.
pub fn split_reference(id: &str) -> Option<(&str, &str)> {
    id.rfind('!').map(|pos| (&id[..pos], &id[pos + 1..]))
}

/// Whether a canonical id names a range rather than a single cell
pub fn is_range_reference(id: &str) -> bool {
    match split_reference(id) {
        Some((_, body)) => body.contains(':'),
        None => id.contains(':'),
    }
}

/// Take the sheet prefix off a raw reference, unquoting if needed
fn split_sheet_prefix(raw: &str) -> Option<(String, &str)> {
    if let Some(quoted) = raw.strip_prefix('\'') {
        // Scan for the closing quote; '' stays inside the name
        let bytes = quoted.as_bytes();
        let mut i = 0;
        while i < bytes.len() {
            if bytes[i] == b'\'' {
                if bytes.get(i + 1) == Some(&b'\'') {
                    i += 2;
                    continue;
                }
                // Closing quote must be followed by the terminator
                if bytes.get(i + 1) == Some(&b'!') {
                    let name = quoted[..i].replace("''", "'");
                    return Some((name, &quoted[i + 2..]));
                }
                return None;
            }
            i += 1;
        }
        return None;
    }

    raw.find('!')
        .map(|pos| (raw[..pos].to_string(), &raw[pos + 1..]))
}

/// Strip `$` markers and uppercase the column letters of one endpoint
fn normalize_endpoint(endpoint: &str) -> String {
    endpoint
        .chars()
        .filter(|&c| c != '$')
        .map(|c| c.to_ascii_uppercase())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_unqualified_gets_current_sheet() {
        assert_eq!(normalize_reference("A1", "Main"), "Main!A1");
        assert_eq!(normalize_reference("A1:B10", "Main"), "Main!A1:B10");
    }

    #[test]
    fn test_absolute_markers_do_not_matter() {
        let canonical = normalize_reference("A1", "S");
        for variant in ["A1", "$A1", "A$1", "$A$1"] {
            assert_eq!(normalize_reference(variant, "S"), canonical);
        }
        assert_eq!(
            normalize_reference("$A$1:$B$2", "S"),
            normalize_reference("A1:B2", "S")
        );
    }

    #[test]
    fn test_quoted_sheet_names() {
        assert_eq!(normalize_reference("'My Sheet'!A1", "Main"), "My Sheet!A1");
        assert_eq!(
            normalize_reference("'John''s Data'!B2", "Main"),
            "John's Data!B2"
        );
    }

    #[test]
    fn test_unquoted_sheet_prefix() {
        assert_eq!(normalize_reference("Sheet5!C3", "Main"), "Sheet5!C3");
        assert_eq!(
            normalize_reference("Sheet5!$A$1:$B$2", "Main"),
            "Sheet5!A1:B2"
        );
    }

    #[test]
    fn test_bare_column_ranges_preserved() {
        assert_eq!(normalize_reference("D:D", "Main"), "Main!D:D");
        assert_eq!(normalize_reference("$D:$F", "Main"), "Main!D:F");
        assert_eq!(normalize_reference("Data!d:d", "Main"), "Data!D:D");
    }

    #[test]
    fn test_lowercase_columns_uppercased() {
        assert_eq!(normalize_reference("b2", "Main"), "Main!B2");
    }

    #[test]
    fn test_idempotent_on_corpus() {
        for (raw, sheet) in [
            ("A1", "Main"),
            ("$A$1", "Main"),
            ("'My Sheet'!A1", "Main"),
            ("'John''s Data'!B2", "Main"),
            ("D:D", "Main"),
            ("Sheet5!A1:B2", "Main"),
        ] {
            let once = normalize_reference(raw, sheet);
            let twice = normalize_reference(&once, sheet);
            assert_eq!(once, twice, "raw: {raw}");
        }
    }

    #[test]
    fn test_split_reference() {
        assert_eq!(split_reference("Main!A1"), Some(("Main", "A1")));
        assert_eq!(split_reference("My Sheet!A1:B2"), Some(("My Sheet", "A1:B2")));
        assert_eq!(split_reference("A1"), None);
    }

    #[test]
    fn test_is_range_reference() {
        assert!(is_range_reference("Main!A1:B2"));
        assert!(is_range_reference("Main!D:D"));
        assert!(!is_range_reference("Main!A1"));
    }

    proptest! {
        #[test]
        fn prop_normalize_is_idempotent(
            col in "[A-Za-z]{1,3}",
            row in 1u32..100_000,
            col_abs in any::<bool>(),
            row_abs in any::<bool>(),
            sheet in "[A-Za-z][A-Za-z0-9 ]{0,12}",
        ) {
            let raw = format!(
                "{}{}{}{}",
                if col_abs { "$" } else { "" },
                col,
                if row_abs { "$" } else { "" },
                row
            );
            let once = normalize_reference(&raw, &sheet);
            let twice = normalize_reference(&once, &sheet);
            prop_assert_eq!(once, twice);
        }
    }
}
