//! Formula lexer
//!
//! Turns a formula string (including the leading `=`) into a flat token
//! stream. Scanning is greedy: at each position every alternative is tried
//! and the longest match wins; equal lengths are broken by specificity
//! (boolean, sheet reference, range reference, cell reference, function
//! name, number).

use thiserror::Error;

/// Token kinds produced by [`tokenize`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    // Literals and names
    /// `TRUE` / `FALSE` (case-insensitive)
    Boolean,
    /// Function name: leading letter, then letters/digits/underscores/dots
    Function,
    /// Sheet qualifier including the terminating `!` (`Sheet1!`, `'My Sheet'!`)
    SheetReference,
    /// Range: two A1 endpoints or two bare columns joined by `:`
    RangeReference,
    /// Single cell: `[$]?letters[$]?digits`
    CellReference,
    /// Integer, decimal, or scientific number
    Number,
    /// Double-quoted string with backslash escapes
    String,

    // Comparison operators
    Equals,
    NotEqual,
    LessEq,
    GreaterEq,
    Less,
    Greater,

    // Arithmetic operators
    Plus,
    Minus,
    Multiply,
    Divide,
    Power,
    Percent,

    // Punctuation
    Ampersand,
    Comma,
    Semicolon,
    Colon,
    LeftParen,
    RightParen,
    LeftBracket,
    RightBracket,
    LeftBrace,
    RightBrace,
}

/// A single token with its source text and byte offset
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub text: String,
    pub offset: usize,
}

/// Lexing failure: the first offending offset plus the tokens scanned
/// before it
#[derive(Debug, Clone, Error)]
#[error("unexpected character '{found}' at offset {offset}")]
pub struct LexError {
    pub offset: usize,
    pub found: char,
    pub tokens: Vec<Token>,
}

/// Tokenize a formula string
///
/// # Example
/// ```
/// use sheetc_formula::lexer::{tokenize, TokenKind};
///
/// let tokens = tokenize("=A1+1").unwrap();
/// let kinds: Vec<_> = tokens.iter().map(|t| t.kind).collect();
/// assert_eq!(
///     kinds,
///     vec![TokenKind::Equals, TokenKind::CellReference, TokenKind::Plus, TokenKind::Number]
/// );
/// ```
pub fn tokenize(input: &str) -> Result<Vec<Token>, LexError> {
    let mut tokens = Vec::new();
    let mut pos = 0;

    while pos < input.len() {
        let rest = &input[pos..];
        let c = match rest.chars().next() {
            Some(c) => c,
            None => break,
        };

        if c.is_whitespace() {
            pos += c.len_utf8();
            continue;
        }

        if let Some((kind, len)) = match_word(rest).or_else(|| match_operator(rest)) {
            tokens.push(Token {
                kind,
                text: rest[..len].to_string(),
                offset: pos,
            });
            pos += len;
        } else {
            return Err(LexError {
                offset: pos,
                found: c,
                tokens,
            });
        }
    }

    Ok(tokens)
}

/// Try the word-shaped alternatives; longest match wins, ties break in the
/// order the candidates are listed
fn match_word(rest: &str) -> Option<(TokenKind, usize)> {
    let candidates = [
        (TokenKind::Boolean, match_boolean(rest)),
        (TokenKind::SheetReference, match_sheet_reference(rest)),
        (TokenKind::RangeReference, match_range_reference(rest)),
        (TokenKind::CellReference, match_cell_reference(rest)),
        (TokenKind::Function, match_function(rest)),
        (TokenKind::Number, match_number(rest)),
        (TokenKind::String, match_string(rest)),
    ];

    let mut best: Option<(TokenKind, usize)> = None;
    for (kind, len) in candidates {
        if let Some(len) = len {
            if best.map_or(true, |(_, b)| len > b) {
                best = Some((kind, len));
            }
        }
    }
    best
}

fn match_operator(rest: &str) -> Option<(TokenKind, usize)> {
    for (text, kind) in [
        ("<=", TokenKind::LessEq),
        (">=", TokenKind::GreaterEq),
        ("<>", TokenKind::NotEqual),
    ] {
        if rest.starts_with(text) {
            return Some((kind, 2));
        }
    }

    let kind = match rest.chars().next()? {
        '=' => TokenKind::Equals,
        '<' => TokenKind::Less,
        '>' => TokenKind::Greater,
        '+' => TokenKind::Plus,
        '-' => TokenKind::Minus,
        '*' => TokenKind::Multiply,
        '/' => TokenKind::Divide,
        '^' => TokenKind::Power,
        '%' => TokenKind::Percent,
        '&' => TokenKind::Ampersand,
        ',' => TokenKind::Comma,
        ';' => TokenKind::Semicolon,
        ':' => TokenKind::Colon,
        '(' => TokenKind::LeftParen,
        ')' => TokenKind::RightParen,
        '[' => TokenKind::LeftBracket,
        ']' => TokenKind::RightBracket,
        '{' => TokenKind::LeftBrace,
        '}' => TokenKind::RightBrace,
        _ => return None,
    };
    Some((kind, 1))
}

fn is_ident_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == '.'
}

/// `TRUE`/`FALSE`, case-insensitive, must not continue into an identifier
fn match_boolean(rest: &str) -> Option<usize> {
    for word in ["TRUE", "FALSE"] {
        if rest
            .get(..word.len())
            .is_some_and(|head| head.eq_ignore_ascii_case(word))
        {
            let next = rest[word.len()..].chars().next();
            if next.map_or(true, |c| !is_ident_char(c)) {
                return Some(word.len());
            }
        }
    }
    None
}

/// An identifier or quoted string terminated by `!`, `!` included
fn match_sheet_reference(rest: &str) -> Option<usize> {
    let mut chars = rest.char_indices();
    let (_, first) = chars.next()?;

    if first == '\'' {
        // Quoted: a literal apostrophe inside is doubled ('')
        while let Some((i, c)) = chars.next() {
            if c == '\'' {
                if rest[i + 1..].starts_with('\'') {
                    chars.next(); // escaped quote, keep scanning
                } else {
                    // closing quote; the terminator must follow
                    return rest[i + 1..].starts_with('!').then_some(i + 2);
                }
            }
        }
        return None;
    }

    if !(first.is_ascii_alphabetic() || first == '_') {
        return None;
    }
    let mut end = first.len_utf8();
    for (i, c) in chars {
        if c.is_ascii_alphanumeric() || c == '_' {
            end = i + c.len_utf8();
        } else {
            break;
        }
    }
    rest[end..].starts_with('!').then_some(end + 1)
}

/// One A1 endpoint: `[$]?letters[$]?digits`; returns the matched length
fn match_a1_endpoint(rest: &str) -> Option<usize> {
    let bytes = rest.as_bytes();
    let mut pos = 0;

    if bytes.get(pos) == Some(&b'$') {
        pos += 1;
    }
    let letters_start = pos;
    while bytes.get(pos).is_some_and(|b| b.is_ascii_alphabetic()) {
        pos += 1;
    }
    if pos == letters_start {
        return None;
    }
    if bytes.get(pos) == Some(&b'$') {
        pos += 1;
    }
    let digits_start = pos;
    while bytes.get(pos).is_some_and(|b| b.is_ascii_digit()) {
        pos += 1;
    }
    (pos > digits_start).then_some(pos)
}

/// `[$]?letters` (one endpoint of a bare-column range)
fn match_column_endpoint(rest: &str) -> Option<usize> {
    let bytes = rest.as_bytes();
    let mut pos = 0;

    if bytes.get(pos) == Some(&b'$') {
        pos += 1;
    }
    let letters_start = pos;
    while bytes.get(pos).is_some_and(|b| b.is_ascii_alphabetic()) {
        pos += 1;
    }
    (pos > letters_start).then_some(pos)
}

/// Two A1 endpoints joined by `:`, or two bare columns joined by `:`
fn match_range_reference(rest: &str) -> Option<usize> {
    if let Some(l1) = match_a1_endpoint(rest) {
        if rest[l1..].starts_with(':') {
            if let Some(l2) = match_a1_endpoint(&rest[l1 + 1..]) {
                return Some(l1 + 1 + l2);
            }
        }
    }

    let l1 = match_column_endpoint(rest)?;
    if !rest[l1..].starts_with(':') {
        return None;
    }
    let l2 = match_column_endpoint(&rest[l1 + 1..])?;
    // A digit after the second column means this was not a column range
    let end = l1 + 1 + l2;
    if rest[end..].starts_with(|c: char| c.is_ascii_digit()) {
        return None;
    }
    Some(end)
}

/// `[$]?letters[$]?digits`, not followed by `(` (that would be a call like
/// `LOG10(...)`)
fn match_cell_reference(rest: &str) -> Option<usize> {
    let len = match_a1_endpoint(rest)?;
    (!rest[len..].starts_with('(')).then_some(len)
}

/// Leading letter, then letters/digits/underscores/dots (`T.INV`)
fn match_function(rest: &str) -> Option<usize> {
    let mut chars = rest.char_indices();
    let (_, first) = chars.next()?;
    if !first.is_ascii_alphabetic() {
        return None;
    }
    let mut end = first.len_utf8();
    for (i, c) in chars {
        if is_ident_char(c) {
            end = i + c.len_utf8();
        } else {
            break;
        }
    }
    Some(end)
}

/// Integer, decimal, or scientific number
fn match_number(rest: &str) -> Option<usize> {
    let bytes = rest.as_bytes();
    let mut pos = 0;

    while bytes.get(pos).is_some_and(|b| b.is_ascii_digit()) {
        pos += 1;
    }
    let int_digits = pos;

    if bytes.get(pos) == Some(&b'.') {
        let mut frac = pos + 1;
        while bytes.get(frac).is_some_and(|b| b.is_ascii_digit()) {
            frac += 1;
        }
        // A bare '.' with no digits on either side is not a number
        if frac > pos + 1 || int_digits > 0 {
            pos = frac;
        }
    }

    if pos == 0 {
        return None;
    }

    // Exponent only counts when digits follow it
    if bytes.get(pos).is_some_and(|b| *b == b'e' || *b == b'E') {
        let mut exp = pos + 1;
        if bytes.get(exp).is_some_and(|b| *b == b'+' || *b == b'-') {
            exp += 1;
        }
        let exp_digits = exp;
        while bytes.get(exp).is_some_and(|b| b.is_ascii_digit()) {
            exp += 1;
        }
        if exp > exp_digits {
            pos = exp;
        }
    }

    Some(pos)
}

/// Double-quoted string; backslash escapes the next character
fn match_string(rest: &str) -> Option<usize> {
    let mut chars = rest.char_indices();
    let (_, first) = chars.next()?;
    if first != '"' {
        return None;
    }
    while let Some((i, c)) = chars.next() {
        match c {
            '\\' => {
                chars.next();
            }
            '"' => return Some(i + 1),
            _ => {}
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(input: &str) -> Vec<TokenKind> {
        tokenize(input).unwrap().iter().map(|t| t.kind).collect()
    }

    #[test]
    fn test_composite_formula() {
        // =SUM(A1:A10)+B1*2
        assert_eq!(
            kinds("=SUM(A1:A10)+B1*2"),
            vec![
                TokenKind::Equals,
                TokenKind::Function,
                TokenKind::LeftParen,
                TokenKind::RangeReference,
                TokenKind::RightParen,
                TokenKind::Plus,
                TokenKind::CellReference,
                TokenKind::Multiply,
                TokenKind::Number,
            ]
        );
    }

    #[test]
    fn test_booleans() {
        assert_eq!(kinds("=TRUE"), vec![TokenKind::Equals, TokenKind::Boolean]);
        assert_eq!(kinds("=false"), vec![TokenKind::Equals, TokenKind::Boolean]);

        // Continuing into an identifier makes it a function name
        let tokens = tokenize("=TRUEISH").unwrap();
        assert_eq!(tokens[1].kind, TokenKind::Function);
        assert_eq!(tokens[1].text, "TRUEISH");
    }

    #[test]
    fn test_dotted_function_names() {
        let tokens = tokenize("=T.INV(0.05,10)").unwrap();
        assert_eq!(tokens[1].kind, TokenKind::Function);
        assert_eq!(tokens[1].text, "T.INV");

        let tokens = tokenize("=NORM.S.INV(0.5)").unwrap();
        assert_eq!(tokens[1].text, "NORM.S.INV");
    }

    #[test]
    fn test_sheet_references() {
        let tokens = tokenize("=Sheet1!A1").unwrap();
        assert_eq!(tokens[1].kind, TokenKind::SheetReference);
        assert_eq!(tokens[1].text, "Sheet1!");
        assert_eq!(tokens[2].kind, TokenKind::CellReference);

        let tokens = tokenize("='My Sheet'!A1").unwrap();
        assert_eq!(tokens[1].kind, TokenKind::SheetReference);
        assert_eq!(tokens[1].text, "'My Sheet'!");

        let tokens = tokenize("='John''s Data'!B2").unwrap();
        assert_eq!(tokens[1].text, "'John''s Data'!");
    }

    #[test]
    fn test_cell_and_range_references() {
        let tokens = tokenize("=$A$1").unwrap();
        assert_eq!(tokens[1].kind, TokenKind::CellReference);
        assert_eq!(tokens[1].text, "$A$1");

        let tokens = tokenize("=$A$1:$B$2").unwrap();
        assert_eq!(tokens[1].kind, TokenKind::RangeReference);
        assert_eq!(tokens[1].text, "$A$1:$B$2");

        // Bare column range
        let tokens = tokenize("=SUM(D:D)").unwrap();
        assert_eq!(tokens[3].kind, TokenKind::RangeReference);
        assert_eq!(tokens[3].text, "D:D");
    }

    #[test]
    fn test_call_shaped_cell_reference_is_a_function() {
        let tokens = tokenize("=LOG10(100)").unwrap();
        assert_eq!(tokens[1].kind, TokenKind::Function);
        assert_eq!(tokens[1].text, "LOG10");
    }

    #[test]
    fn test_numbers() {
        for (input, text) in [("=42", "42"), ("=3.14", "3.14"), ("=1e10", "1e10"),
                              ("=2.5E-3", "2.5E-3"), ("=.5", ".5")] {
            let tokens = tokenize(input).unwrap();
            assert_eq!(tokens[1].kind, TokenKind::Number, "input: {input}");
            assert_eq!(tokens[1].text, text);
        }
    }

    #[test]
    fn test_strings() {
        let tokens = tokenize(r#"="hello""#).unwrap();
        assert_eq!(tokens[1].kind, TokenKind::String);
        assert_eq!(tokens[1].text, r#""hello""#);

        let tokens = tokenize(r#"="a \"b\" c""#).unwrap();
        assert_eq!(tokens[1].text, r#""a \"b\" c""#);
    }

    #[test]
    fn test_comparison_operators_prefer_two_chars() {
        assert_eq!(
            kinds("=A1<=B1"),
            vec![
                TokenKind::Equals,
                TokenKind::CellReference,
                TokenKind::LessEq,
                TokenKind::CellReference,
            ]
        );
        assert_eq!(kinds("=1<>2")[2], TokenKind::NotEqual);
        assert_eq!(kinds("=1<2")[2], TokenKind::Less);
        assert_eq!(kinds("=1>=2")[2], TokenKind::GreaterEq);
    }

    #[test]
    fn test_whitespace_skipped() {
        assert_eq!(
            kinds("= A1 + 1"),
            vec![
                TokenKind::Equals,
                TokenKind::CellReference,
                TokenKind::Plus,
                TokenKind::Number,
            ]
        );
    }

    #[test]
    fn test_lex_error_carries_offset_and_tokens() {
        let err = tokenize("=A1+@").unwrap_err();
        assert_eq!(err.offset, 4);
        assert_eq!(err.found, '@');
        assert_eq!(err.tokens.len(), 3); // =, A1, +
    }

    #[test]
    fn test_minus_before_sheet_reference() {
        assert_eq!(
            kinds("=10-Sheet!J1"),
            vec![
                TokenKind::Equals,
                TokenKind::Number,
                TokenKind::Minus,
                TokenKind::SheetReference,
                TokenKind::CellReference,
            ]
        );
    }
}
