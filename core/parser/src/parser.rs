//! FILENAME: core/parser/src/parser.rs
//! PURPOSE: Recursive descent parser that converts a stream of Tokens into an AST.
//! CONTEXT: This is the second stage of the parsing pipeline. It takes tokens
//! from the Lexer and builds an Expr tree, collecting every referenced cell
//! position along the way (in source order, duplicates included).
//!
//! GRAMMAR:
//!   main   --> expr EOF
//!   expr   --> term ( ("+" | "-") term )*
//!   term   --> factor ( ("*" | "/") factor )*
//!   factor --> ("+" | "-") factor | atom
//!   atom   --> NUMBER | CELL | "(" expr ")"
//!   CELL   --> [A-Z]{1,3}[1-9][0-9]*

use crate::ast::{BinaryOp, Expr, UnaryOp};
use crate::lexer::Lexer;
use crate::position::Position;
use crate::token::Token;

/// Parser errors with descriptive messages.
#[derive(Debug, PartialEq, Clone)]
pub struct ParseError {
    pub message: String,
}

impl ParseError {
    pub fn new(message: impl Into<String>) -> Self {
        ParseError {
            message: message.into(),
        }
    }
}

impl std::fmt::Display for ParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Parse error: {}", self.message)
    }
}

impl std::error::Error for ParseError {}

pub type ParseResult<T> = Result<T, ParseError>;

/// Parses a formula body (without the leading '=') into an AST and the
/// list of referenced positions in source order.
pub fn parse(input: &str) -> ParseResult<(Expr, Vec<Position>)> {
    Parser::new(input).parse()
}

/// The Parser struct holds the lexer and current token state.
pub struct Parser<'a> {
    lexer: Lexer<'a>,
    current_token: Token,
    /// Referenced positions in the order their tokens appear in the source.
    cells: Vec<Position>,
}

impl<'a> Parser<'a> {
    /// Creates a new parser from an input string.
    /// Automatically advances to the first token.
    pub fn new(input: &'a str) -> Self {
        let mut lexer = Lexer::new(input);
        let current_token = lexer.next_token();
        Parser {
            lexer,
            current_token,
            cells: Vec::new(),
        }
    }

    /// Parses the entire input and returns the AST plus referenced positions.
    pub fn parse(mut self) -> ParseResult<(Expr, Vec<Position>)> {
        if self.current_token == Token::EOF {
            return Err(ParseError::new("Empty expression"));
        }

        let expr = self.parse_expr()?;

        // Ensure we consumed all tokens
        if self.current_token != Token::EOF {
            return Err(ParseError::new(format!(
                "Unexpected token after expression: {:?}",
                self.current_token
            )));
        }

        Ok((expr, self.cells))
    }

    /// Advances to the next token.
    fn advance(&mut self) {
        self.current_token = self.lexer.next_token();
    }

    /// Checks if the current token matches the expected token.
    /// If it matches, advances and returns Ok. Otherwise returns an error.
    fn expect(&mut self, expected: Token) -> ParseResult<()> {
        if self.current_token == expected {
            self.advance();
            Ok(())
        } else {
            Err(ParseError::new(format!(
                "Expected {:?}, found {:?}",
                expected, self.current_token
            )))
        }
    }

    /// Parses additive expressions (+ and -).
    fn parse_expr(&mut self) -> ParseResult<Expr> {
        let mut left = self.parse_term()?;

        loop {
            let op = match &self.current_token {
                Token::Plus => BinaryOp::Add,
                Token::Minus => BinaryOp::Subtract,
                _ => break,
            };

            self.advance();
            let right = self.parse_term()?;

            left = Expr::Binary {
                op,
                lhs: Box::new(left),
                rhs: Box::new(right),
            };
        }

        Ok(left)
    }

    /// Parses multiplicative expressions (* and /).
    fn parse_term(&mut self) -> ParseResult<Expr> {
        let mut left = self.parse_factor()?;

        loop {
            let op = match &self.current_token {
                Token::Asterisk => BinaryOp::Multiply,
                Token::Slash => BinaryOp::Divide,
                _ => break,
            };

            self.advance();
            let right = self.parse_factor()?;

            left = Expr::Binary {
                op,
                lhs: Box::new(left),
                rhs: Box::new(right),
            };
        }

        Ok(left)
    }

    /// Parses unary sign prefixes.
    fn parse_factor(&mut self) -> ParseResult<Expr> {
        let op = match &self.current_token {
            Token::Plus => UnaryOp::Plus,
            Token::Minus => UnaryOp::Minus,
            _ => return self.parse_atom(),
        };

        self.advance();
        let operand = self.parse_factor()?;

        Ok(Expr::Unary {
            op,
            operand: Box::new(operand),
        })
    }

    /// Parses atoms: numbers, cell references, and parenthesized expressions.
    fn parse_atom(&mut self) -> ParseResult<Expr> {
        match self.current_token.clone() {
            Token::Number(value) => {
                self.advance();
                Ok(Expr::Number(value))
            }
            Token::CellRef(text) => {
                let pos = Position::from_a1(&text).ok_or_else(|| {
                    ParseError::new(format!("Invalid cell reference: {}", text))
                })?;
                self.cells.push(pos);
                self.advance();
                Ok(Expr::Ref(pos))
            }
            Token::LParen => {
                self.advance();
                let expr = self.parse_expr()?;
                self.expect(Token::RParen)?;
                Ok(expr)
            }
            other => Err(ParseError::new(format!("Unexpected token: {:?}", other))),
        }
    }
}
