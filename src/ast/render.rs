//! Render trees as JavaScript-like source text

use super::tree::*;
use std::fmt;

const ADDITIVE: u8 = 1;
const MULTIPLICATIVE: u8 = 2;
const PREFIX: u8 = 3;
const POSTFIX: u8 = 4;

fn precedence(t: &Tree) -> u8 {
    match t {
        Tree::BinaryOp(_, BinOp::Add | BinOp::Sub, _, _) => ADDITIVE,
        Tree::BinaryOp(_, BinOp::Mul | BinOp::Div, _, _) => MULTIPLICATIVE,
        Tree::UnaryOp(_, UnOp::Neg, _) => PREFIX,
        Tree::Literal(Lit::Int(x)) if *x < 0 => PREFIX,
        Tree::Literal(Lit::Real(x)) if x.is_sign_negative() => PREFIX,
        _ => POSTFIX,
    }
}

fn write_operand(f: &mut fmt::Formatter<'_>, t: &Tree, min_precedence: u8) -> fmt::Result {
    if precedence(t) < min_precedence {
        write!(f, "({t})")
    } else {
        write!(f, "{t}")
    }
}

fn write_list(f: &mut fmt::Formatter<'_>, items: &[Tree]) -> fmt::Result {
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        write!(f, "{item}")?;
    }
    Ok(())
}

impl fmt::Display for BinOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            BinOp::Add => "+",
            BinOp::Sub => "-",
            BinOp::Mul => "*",
            BinOp::Div => "/",
        })
    }
}

/// Native and abstract operators render the same way. Once a tree has been
/// rewritten for a field, whatever abstract operator is left is meant to be
/// executed as is
impl fmt::Display for Tree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Tree::Literal(Lit::Int(x)) => write!(f, "{x}"),
            Tree::Literal(Lit::Real(x)) if x.is_nan() => f.write_str("NaN"),
            Tree::Literal(Lit::Real(x)) if x.is_infinite() => {
                f.write_str(if *x > 0.0 { "Infinity" } else { "-Infinity" })
            }
            Tree::Literal(Lit::Real(x)) => write!(f, "{x:?}"),
            Tree::Variable(name) => f.write_str(name),
            Tree::Index(base, index) => {
                write_operand(f, base, POSTFIX)?;
                write!(f, "[{index}]")
            }
            Tree::FieldAccess(base, name) => {
                write_operand(f, base, POSTFIX)?;
                write!(f, ".{name}")
            }
            Tree::BinaryOp(_, op, l, r) => {
                let p = precedence(self);
                // Left-associative: only the right operand needs parentheses
                // at equal precedence
                write_operand(f, l, p)?;
                write!(f, " {op} ")?;
                write_operand(f, r, p + 1)
            }
            Tree::UnaryOp(_, UnOp::Neg, e) => {
                f.write_str("-")?;
                write_operand(f, e, PREFIX + 1)
            }
            Tree::UnaryOp(_, UnOp::Sqrt, e) => write!(f, "sqrt({e})"),
            Tree::ArrayLiteral(elems) => {
                f.write_str("[")?;
                write_list(f, elems)?;
                f.write_str("]")
            }
            Tree::Call(callee, args) => {
                write_operand(f, callee, POSTFIX)?;
                f.write_str("(")?;
                write_list(f, args)?;
                f.write_str(")")
            }
            Tree::Reference(target) => f.write_str(&target.name),
        }
    }
}
