//! Formula parser
//!
//! A recursive descent parser with precedence climbing over the token
//! stream from [`crate::lexer`]. Binding, loosest to tightest: comparison,
//! concatenation (`&`), additive, multiplicative, exponent (`^`,
//! right-associative), postfix `%`, prefix `+`/`-`, primary. All other
//! binary levels fold left in source order.

use thiserror::Error;

use crate::ast::{AstNode, OpSymbol, ARRAY_CALL, ARRAY_ROW_CALL};
use crate::error::{FormulaError, FormulaResult};
use crate::lexer::{tokenize, Token, TokenKind};

/// Parse failure: offending byte offset plus a description of what was
/// expected there
#[derive(Debug, Clone, Error)]
#[error("expected {expected} at offset {offset}")]
pub struct ParseError {
    pub offset: usize,
    pub expected: String,
}

/// Parse a formula string into an AST
///
/// The formula must start with `=`. Lexing failures and parse failures are
/// both reported through [`FormulaError`]; callers that need to tell them
/// apart (the pipeline aborts on the former and degrades on the latter)
/// should call [`tokenize`] and [`parse_tokens`] separately.
///
/// # Example
/// ```rust
/// use sheetc_formula::parse_formula;
///
/// let ast = parse_formula("=1+2").unwrap();
/// let ast = parse_formula("=SUM(A1:A10)").unwrap();
/// let ast = parse_formula("=IF(A1>0,\"Yes\",\"No\")").unwrap();
/// ```
pub fn parse_formula(formula: &str) -> FormulaResult<AstNode> {
    let formula = formula.trim();
    let tokens = tokenize(formula)?;
    parse_tokens(&tokens, formula.len()).map_err(FormulaError::from)
}

/// Parse an already-tokenized formula
pub fn parse_tokens(tokens: &[Token], source_len: usize) -> Result<AstNode, ParseError> {
    let mut parser = Parser {
        tokens,
        pos: 0,
        end_offset: source_len,
    };

    parser.expect(TokenKind::Equals, "'=' at the start of the formula")?;
    let expr = parser.parse_expression()?;

    if let Some(token) = parser.peek() {
        return Err(ParseError {
            offset: token.offset,
            expected: "end of formula".into(),
        });
    }

    Ok(expr)
}

struct Parser<'a> {
    tokens: &'a [Token],
    pos: usize,
    end_offset: usize,
}

impl<'a> Parser<'a> {
    fn peek(&self) -> Option<&'a Token> {
        self.tokens.get(self.pos)
    }

    fn peek_kind(&self) -> Option<TokenKind> {
        self.peek().map(|t| t.kind)
    }

    fn advance(&mut self) -> Option<&'a Token> {
        let token = self.tokens.get(self.pos);
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    fn current_offset(&self) -> usize {
        self.peek().map_or(self.end_offset, |t| t.offset)
    }

    fn expect(&mut self, kind: TokenKind, expected: &str) -> Result<&'a Token, ParseError> {
        match self.peek() {
            Some(token) if token.kind == kind => {
                self.pos += 1;
                Ok(token)
            }
            _ => Err(ParseError {
                offset: self.current_offset(),
                expected: expected.into(),
            }),
        }
    }

    fn eat(&mut self, kind: TokenKind) -> bool {
        if self.peek_kind() == Some(kind) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    // === Precedence levels ===

    fn parse_expression(&mut self) -> Result<AstNode, ParseError> {
        self.parse_comparison()
    }

    fn parse_comparison(&mut self) -> Result<AstNode, ParseError> {
        let mut left = self.parse_concatenation()?;

        loop {
            let op = match self.peek_kind() {
                Some(TokenKind::Equals) => OpSymbol::Equal,
                Some(TokenKind::NotEqual) => OpSymbol::NotEqual,
                Some(TokenKind::Less) => OpSymbol::Less,
                Some(TokenKind::LessEq) => OpSymbol::LessEq,
                Some(TokenKind::Greater) => OpSymbol::Greater,
                Some(TokenKind::GreaterEq) => OpSymbol::GreaterEq,
                _ => break,
            };

            self.advance();
            let right = self.parse_concatenation()?;
            left = AstNode::Op(op, vec![left, right]);
        }

        Ok(left)
    }

    fn parse_concatenation(&mut self) -> Result<AstNode, ParseError> {
        let mut left = self.parse_additive()?;

        while self.eat(TokenKind::Ampersand) {
            let right = self.parse_additive()?;
            left = AstNode::Op(OpSymbol::Concat, vec![left, right]);
        }

        Ok(left)
    }

    fn parse_additive(&mut self) -> Result<AstNode, ParseError> {
        let mut left = self.parse_multiplicative()?;

        loop {
            let op = match self.peek_kind() {
                Some(TokenKind::Plus) => OpSymbol::Add,
                Some(TokenKind::Minus) => OpSymbol::Subtract,
                _ => break,
            };

            self.advance();
            let right = self.parse_multiplicative()?;
            left = AstNode::Op(op, vec![left, right]);
        }

        Ok(left)
    }

    fn parse_multiplicative(&mut self) -> Result<AstNode, ParseError> {
        let mut left = self.parse_exponent()?;

        loop {
            let op = match self.peek_kind() {
                Some(TokenKind::Multiply) => OpSymbol::Multiply,
                Some(TokenKind::Divide) => OpSymbol::Divide,
                _ => break,
            };

            self.advance();
            let right = self.parse_exponent()?;
            left = AstNode::Op(op, vec![left, right]);
        }

        Ok(left)
    }

    fn parse_exponent(&mut self) -> Result<AstNode, ParseError> {
        let left = self.parse_percent()?;

        if self.eat(TokenKind::Power) {
            // Right associative
            let right = self.parse_exponent()?;
            return Ok(AstNode::Op(OpSymbol::Power, vec![left, right]));
        }

        Ok(left)
    }

    fn parse_percent(&mut self) -> Result<AstNode, ParseError> {
        let mut expr = self.parse_unary()?;

        while self.eat(TokenKind::Percent) {
            expr = AstNode::Op(OpSymbol::Percent, vec![expr]);
        }

        Ok(expr)
    }

    fn parse_unary(&mut self) -> Result<AstNode, ParseError> {
        if self.eat(TokenKind::Minus) {
            let operand = self.parse_unary()?;
            return Ok(AstNode::Op(OpSymbol::Subtract, vec![operand]));
        }

        // Prefix plus is a no-op
        if self.eat(TokenKind::Plus) {
            return self.parse_unary();
        }

        self.parse_primary()
    }

    fn parse_primary(&mut self) -> Result<AstNode, ParseError> {
        let token = match self.peek() {
            Some(token) => token,
            None => {
                return Err(ParseError {
                    offset: self.end_offset,
                    expected: "a value, reference, or function call".into(),
                })
            }
        };

        match token.kind {
            TokenKind::Number => {
                let text = token.text.clone();
                self.advance();
                Ok(AstNode::Literal(text))
            }

            TokenKind::String => {
                let text = token.text.clone();
                self.advance();
                Ok(AstNode::Literal(text))
            }

            TokenKind::Boolean => {
                let text = token.text.to_ascii_uppercase();
                self.advance();
                Ok(AstNode::Literal(text))
            }

            TokenKind::LeftParen => {
                self.advance();
                let expr = self.parse_expression()?;
                self.expect(TokenKind::RightParen, "')'")?;
                Ok(expr)
            }

            TokenKind::LeftBrace => self.parse_array(),

            TokenKind::SheetReference => {
                let sheet = token.text.clone();
                self.advance();
                match self.peek() {
                    Some(next)
                        if matches!(
                            next.kind,
                            TokenKind::CellReference | TokenKind::RangeReference
                        ) =>
                    {
                        let text = format!("{}{}", sheet, next.text);
                        self.pos += 1;
                        Ok(AstNode::Ref(text))
                    }
                    _ => Err(ParseError {
                        offset: self.current_offset(),
                        expected: "a cell or range reference after the sheet name".into(),
                    }),
                }
            }

            TokenKind::CellReference | TokenKind::RangeReference => {
                let text = token.text.clone();
                self.advance();
                Ok(AstNode::Ref(text))
            }

            TokenKind::Function => {
                let name = token.text.clone();
                self.advance();
                self.expect(TokenKind::LeftParen, "'(' after function name")?;
                let args = self.parse_arguments()?;
                Ok(AstNode::Call(name, args))
            }

            _ => Err(ParseError {
                offset: token.offset,
                expected: "a value, reference, or function call".into(),
            }),
        }
    }

    fn parse_arguments(&mut self) -> Result<Vec<AstNode>, ParseError> {
        let mut args = Vec::new();

        if self.eat(TokenKind::RightParen) {
            return Ok(args);
        }

        args.push(self.parse_expression()?);
        loop {
            if self.eat(TokenKind::Comma) || self.eat(TokenKind::Semicolon) {
                args.push(self.parse_expression()?);
            } else {
                self.expect(TokenKind::RightParen, "',' or ')' in argument list")?;
                return Ok(args);
            }
        }
    }

    /// `{ row ( ; row )* }`, each row `expr ( , expr )*`, lowered to the
    /// reserved ARRAY/ARRAYROW calls
    fn parse_array(&mut self) -> Result<AstNode, ParseError> {
        self.expect(TokenKind::LeftBrace, "'{'")?;

        let mut rows = Vec::new();
        let mut current = Vec::new();

        if !self.eat(TokenKind::RightBrace) {
            current.push(self.parse_expression()?);

            loop {
                if self.eat(TokenKind::Comma) {
                    current.push(self.parse_expression()?);
                } else if self.eat(TokenKind::Semicolon) {
                    rows.push(AstNode::Call(ARRAY_ROW_CALL.into(), current));
                    current = vec![self.parse_expression()?];
                } else {
                    self.expect(TokenKind::RightBrace, "',' ';' or '}' in array")?;
                    break;
                }
            }

            rows.push(AstNode::Call(ARRAY_ROW_CALL.into(), current));
        }

        Ok(AstNode::Call(ARRAY_CALL.into(), rows))
    }
}
