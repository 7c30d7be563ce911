//! FILENAME: core/parser/src/ast.rs
//! PURPOSE: Defines the Abstract Syntax Tree (AST) for formula expressions.
//! CONTEXT: After the Lexer tokenizes a formula string, the Parser converts
//! those tokens into this tree structure. The tree can evaluate itself
//! against a cell-lookup function and print itself back in canonical,
//! minimally parenthesized form.
//!
//! SUPPORTED EXPRESSIONS:
//! - Numeric literals: 1, 3.5, 1e308
//! - Cell references: A1, AA100
//! - Unary operations: +, -
//! - Binary operations: +, -, *, /

use std::fmt;

use crate::error::FormulaError;
use crate::position::Position;

/// Divisor magnitudes below this threshold count as numeric zero.
pub const INACCURACY: f64 = 1e-5;

/// Unary operators.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum UnaryOp {
    Plus,
    Minus,
}

/// Binary operators.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum BinaryOp {
    Add,
    Subtract,
    Multiply,
    Divide,
}

/// Represents a parsed formula expression.
///
/// A node exclusively owns its children, so the tree is acyclic by
/// construction.
#[derive(Debug, PartialEq, Clone)]
pub enum Expr {
    /// A numeric literal.
    Number(f64),

    /// A reference to another cell.
    Ref(Position),

    /// A unary operation: op operand (e.g. -5).
    Unary { op: UnaryOp, operand: Box<Expr> },

    /// A binary operation: lhs op rhs (e.g. 5 + 3, A1 * 2).
    Binary {
        op: BinaryOp,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
    },
}

/// Precedence levels used when re-printing an expression.
/// Parenthesization is decided from the (parent, child) pair, see
/// `needs_parens`.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
enum Precedence {
    Add,
    Sub,
    Mul,
    Div,
    Unary,
    Atom,
}

/// Whether a child expression must be parenthesized under its parent.
///
/// Addition never needs parentheses around its children, subtraction only
/// around additive right children (1-(2-3)), multiplication around additive
/// children on both sides, division additionally around multiplicative
/// right children (1/(2*3)), and unary operators around additive operands
/// (-(1+2)).
fn needs_parens(parent: Precedence, child: Precedence, right_child: bool) -> bool {
    use Precedence::*;
    match (parent, child) {
        (Sub, Add | Sub) => right_child,
        (Mul, Add | Sub) => true,
        (Div, Add | Sub) => true,
        (Div, Mul | Div) => right_child,
        (Unary, Add | Sub) => true,
        _ => false,
    }
}

impl Expr {
    /// Evaluates the expression using `lookup` to resolve cell references.
    ///
    /// Arithmetic follows IEEE-754 doubles with two extra rules: a divisor
    /// whose magnitude is below `INACCURACY` fails with `#DIV/0!`, and any
    /// addition, subtraction, or multiplication whose result magnitude
    /// would exceed `f64::MAX` fails with `#DIV/0!` as well. Errors from
    /// subexpressions and from the lookup propagate unchanged.
    pub fn evaluate<F>(&self, lookup: &F) -> Result<f64, FormulaError>
    where
        F: Fn(Position) -> Result<f64, FormulaError>,
    {
        match self {
            Expr::Number(value) => Ok(*value),
            Expr::Ref(pos) => {
                if !pos.is_valid() {
                    return Err(FormulaError::Ref);
                }
                lookup(*pos)
            }
            Expr::Unary { op, operand } => {
                let value = operand.evaluate(lookup)?;
                Ok(match op {
                    UnaryOp::Plus => value,
                    UnaryOp::Minus => -value,
                })
            }
            Expr::Binary { op, lhs, rhs } => {
                let lhs = lhs.evaluate(lookup)?;
                let rhs = rhs.evaluate(lookup)?;
                apply_binary(*op, lhs, rhs)
            }
        }
    }

    fn precedence(&self) -> Precedence {
        match self {
            Expr::Number(_) | Expr::Ref(_) => Precedence::Atom,
            Expr::Unary { .. } => Precedence::Unary,
            Expr::Binary { op, .. } => match op {
                BinaryOp::Add => Precedence::Add,
                BinaryOp::Subtract => Precedence::Sub,
                BinaryOp::Multiply => Precedence::Mul,
                BinaryOp::Divide => Precedence::Div,
            },
        }
    }

    fn write_formula(
        &self,
        f: &mut fmt::Formatter<'_>,
        parent: Precedence,
        right_child: bool,
    ) -> fmt::Result {
        let precedence = self.precedence();
        let parens = needs_parens(parent, precedence, right_child);
        if parens {
            f.write_str("(")?;
        }
        match self {
            Expr::Number(value) => write!(f, "{}", value)?,
            Expr::Ref(pos) => write!(f, "{}", pos)?,
            Expr::Unary { op, operand } => {
                write!(f, "{}", op)?;
                operand.write_formula(f, precedence, false)?;
            }
            Expr::Binary { op, lhs, rhs } => {
                lhs.write_formula(f, precedence, false)?;
                write!(f, "{}", op)?;
                rhs.write_formula(f, precedence, true)?;
            }
        }
        if parens {
            f.write_str(")")?;
        }
        Ok(())
    }
}

/// Applies a binary operator with the overflow and zero discipline
/// described on `Expr::evaluate`.
fn apply_binary(op: BinaryOp, lhs: f64, rhs: f64) -> Result<f64, FormulaError> {
    match op {
        BinaryOp::Add => {
            if (lhs > 0.0 && rhs > 0.0 && rhs > f64::MAX - lhs)
                || (lhs < 0.0 && rhs < 0.0 && rhs < -f64::MAX - lhs)
            {
                return Err(FormulaError::Div0);
            }
            Ok(lhs + rhs)
        }
        BinaryOp::Subtract => {
            if (lhs > 0.0 && rhs < 0.0 && lhs > f64::MAX + rhs)
                || (lhs < 0.0 && rhs > 0.0 && lhs < -f64::MAX + rhs)
            {
                return Err(FormulaError::Div0);
            }
            Ok(lhs - rhs)
        }
        BinaryOp::Multiply => {
            // |lhs| <= 1 cannot grow |rhs|, so only larger factors can overflow.
            if lhs.abs() > 1.0 && rhs.abs() > f64::MAX / lhs.abs() {
                return Err(FormulaError::Div0);
            }
            Ok(lhs * rhs)
        }
        BinaryOp::Divide => {
            if rhs.abs() < INACCURACY {
                return Err(FormulaError::Div0);
            }
            Ok(lhs / rhs)
        }
    }
}

impl fmt::Display for Expr {
    /// Writes the canonical, minimally parenthesized source form.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.write_formula(f, Precedence::Atom, false)
    }
}

impl fmt::Display for UnaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UnaryOp::Plus => write!(f, "+"),
            UnaryOp::Minus => write!(f, "-"),
        }
    }
}

impl fmt::Display for BinaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BinaryOp::Add => write!(f, "+"),
            BinaryOp::Subtract => write!(f, "-"),
            BinaryOp::Multiply => write!(f, "*"),
            BinaryOp::Divide => write!(f, "/"),
        }
    }
}
