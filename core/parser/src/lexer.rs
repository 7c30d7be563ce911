//! FILENAME: core/parser/src/lexer.rs
//! PURPOSE: Scans a raw formula string and produces a stream of Tokens.
//! CONTEXT: This is the first stage of the parsing pipeline. It handles
//! whitespace skipping, number literals (with optional fraction and
//! exponent), cell references, operators, and parentheses.
//!
//! Cell references are uppercase column letters followed by row digits
//! ("A1", "AA100"). The lexer only splits them out of the character stream;
//! bounds checking happens in the parser.

use crate::token::Token;

pub struct Lexer<'a> {
    input: &'a str,
    pos: usize,
}

impl<'a> Lexer<'a> {
    pub fn new(input: &'a str) -> Self {
        Lexer { input, pos: 0 }
    }

    /// Advances the lexer and returns the next token.
    pub fn next_token(&mut self) -> Token {
        self.skip_whitespace();

        match self.bump() {
            Some('+') => Token::Plus,
            Some('-') => Token::Minus,
            Some('*') => Token::Asterisk,
            Some('/') => Token::Slash,
            Some('(') => Token::LParen,
            Some(')') => Token::RParen,

            // Numbers (starts with digit or dot)
            Some(ch) if ch.is_ascii_digit() || ch == '.' => self.read_number(ch),

            // Cell references (starts with an uppercase letter)
            Some(ch) if ch.is_ascii_uppercase() => self.read_cell_ref(ch),

            // End of input
            None => Token::EOF,

            // Unknown character
            Some(ch) => Token::Illegal(ch),
        }
    }

    fn peek(&self) -> Option<char> {
        self.input[self.pos..].chars().next()
    }

    fn bump(&mut self) -> Option<char> {
        let ch = self.peek()?;
        self.pos += ch.len_utf8();
        Some(ch)
    }

    fn skip_whitespace(&mut self) {
        while let Some(ch) = self.peek() {
            if !ch.is_whitespace() {
                break;
            }
            self.bump();
        }
    }

    /// Reads a numeric literal: digits, an optional fraction, and an
    /// optional exponent ("1", "3.5", "1e308", "2.5E-3").
    ///
    /// An 'e' that is not followed by a well-formed exponent is left in the
    /// stream for the next token.
    fn read_number(&mut self, first_char: char) -> Token {
        let start = self.pos - first_char.len_utf8();
        let mut has_dot = first_char == '.';

        while let Some(ch) = self.peek() {
            if ch.is_ascii_digit() {
                self.bump();
            } else if ch == '.' && !has_dot {
                has_dot = true;
                self.bump();
            } else {
                break;
            }
        }

        if matches!(self.peek(), Some('e') | Some('E')) {
            let mark = self.pos;
            self.bump();
            if matches!(self.peek(), Some('+') | Some('-')) {
                self.bump();
            }
            if matches!(self.peek(), Some(ch) if ch.is_ascii_digit()) {
                while matches!(self.peek(), Some(ch) if ch.is_ascii_digit()) {
                    self.bump();
                }
            } else {
                self.pos = mark;
            }
        }

        if let Ok(n) = self.input[start..self.pos].parse::<f64>() {
            Token::Number(n)
        } else {
            // Fallback if parsing fails (e.g. just ".")
            Token::Illegal(first_char)
        }
    }

    /// Reads a cell reference: uppercase letters followed by digits.
    /// Letters without a row part are not a valid token.
    fn read_cell_ref(&mut self, first_char: char) -> Token {
        let mut text = String::from(first_char);

        while let Some(ch) = self.peek() {
            if ch.is_ascii_uppercase() {
                text.push(ch);
                self.bump();
            } else {
                break;
            }
        }

        if !matches!(self.peek(), Some(ch) if ch.is_ascii_digit()) {
            return Token::Illegal(first_char);
        }

        while let Some(ch) = self.peek() {
            if ch.is_ascii_digit() {
                text.push(ch);
                self.bump();
            } else {
                break;
            }
        }

        Token::CellRef(text)
    }
}
