//! How to run a generated function on actual numbers. This is a reference
//! interpreter, meant for checking what the generator produces

use crate::{
    ast::{BinOp, Lit, Tree, UnOp},
    table::FunctionSpec,
};
use indexmap::IndexMap;
use std::collections::HashMap;
use thiserror::Error;

/// Runtime values: scalars, arrays (vectors, matrix rows, complex numbers...)
/// and records with named fields
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Num(f64),
    Array(Vec<Value>),
    Record(IndexMap<String, Value>),
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum EvalError {
    #[error("Unbound variable `{0}`")]
    UnboundVariable(String),
    #[error("Expected {expected}, got {got:?}")]
    TypeMismatch { expected: &'static str, got: Value },
    #[error("Index {index} out of range for an array of length {len}")]
    IndexOutOfRange { index: usize, len: usize },
    #[error("`{function}` takes {expected} arguments, {got} given")]
    ArityMismatch {
        function: String,
        expected: usize,
        got: usize,
    },
    #[error("Cannot call `{0}`: only linked functions can be called")]
    UnresolvedCall(String),
}

type Env<'a> = HashMap<&'a str, Value>;

impl Value {
    pub fn vector(xs: impl IntoIterator<Item = f64>) -> Self {
        Value::Array(xs.into_iter().map(Value::Num).collect())
    }

    /// The `D` canonical basis vectors of dimension `D`
    pub fn basis<const D: usize>() -> [Value; D] {
        array_init::array_init(|i| Value::vector((0..D).map(|j| if i == j { 1.0 } else { 0.0 })))
    }

    pub fn to_f64(&self) -> Option<f64> {
        match self {
            Value::Num(x) => Some(*x),
            _ => None,
        }
    }

    /// The components of a flat array of numbers
    pub fn to_f64s(&self) -> Option<Vec<f64>> {
        match self {
            Value::Array(xs) => xs.iter().map(Value::to_f64).collect(),
            _ => None,
        }
    }

    fn num(self) -> Result<f64, EvalError> {
        match self {
            Value::Num(x) => Ok(x),
            got => Err(EvalError::TypeMismatch {
                expected: "a number",
                got,
            }),
        }
    }
}

impl FunctionSpec {
    /// Evaluates the body with the formals bound to `args`. Calls to linked
    /// functions are evaluated by calling them in turn
    pub fn call(&self, args: &[Value]) -> Result<Value, EvalError> {
        if args.len() != self.arity() {
            return Err(EvalError::ArityMismatch {
                function: self.name.clone(),
                expected: self.arity(),
                got: args.len(),
            });
        }
        let env: Env = self
            .formals
            .iter()
            .map(String::as_str)
            .zip(args.iter().cloned())
            .collect();
        eval(&self.body, &env)
    }
}

fn eval(tree: &Tree, env: &Env) -> Result<Value, EvalError> {
    Ok(match tree {
        Tree::Literal(Lit::Int(i)) => Value::Num(*i as f64),
        Tree::Literal(Lit::Real(x)) => Value::Num(*x),
        Tree::Variable(v) => env
            .get(v.as_str())
            .cloned()
            .ok_or_else(|| EvalError::UnboundVariable(v.clone()))?,
        Tree::Index(base, index) => {
            let index = index_of(eval(index, env)?)?;
            match eval(base, env)? {
                Value::Array(mut xs) => {
                    let len = xs.len();
                    if index >= len {
                        return Err(EvalError::IndexOutOfRange { index, len });
                    }
                    xs.swap_remove(index)
                }
                got => {
                    return Err(EvalError::TypeMismatch {
                        expected: "an array",
                        got,
                    })
                }
            }
        }
        Tree::FieldAccess(base, name) => match eval(base, env)? {
            Value::Record(mut fields) => fields
                .swap_remove(name)
                .ok_or_else(|| EvalError::UnboundVariable(format!(".{name}")))?,
            got => {
                return Err(EvalError::TypeMismatch {
                    expected: "a record",
                    got,
                })
            }
        },
        // Operators left abstract evaluate as plain scalar arithmetic
        Tree::BinaryOp(_, op, l, r) => {
            let (l, r) = (eval(l, env)?.num()?, eval(r, env)?.num()?);
            Value::Num(match op {
                BinOp::Add => l + r,
                BinOp::Sub => l - r,
                BinOp::Mul => l * r,
                BinOp::Div => l / r,
            })
        }
        Tree::UnaryOp(_, op, e) => {
            let x = eval(e, env)?.num()?;
            Value::Num(match op {
                UnOp::Neg => -x,
                UnOp::Sqrt => x.sqrt(),
            })
        }
        Tree::ArrayLiteral(elems) => Value::Array(
            elems
                .iter()
                .map(|e| eval(e, env))
                .collect::<Result<_, _>>()?,
        ),
        Tree::Call(callee, args) => match callee.as_ref() {
            Tree::Reference(target) => {
                let args = args
                    .iter()
                    .map(|a| eval(a, env))
                    .collect::<Result<Vec<_>, _>>()?;
                target.call(&args)?
            }
            other => return Err(EvalError::UnresolvedCall(other.to_string())),
        },
        Tree::Reference(target) => return Err(EvalError::UnresolvedCall(target.name.clone())),
    })
}

fn index_of(v: Value) -> Result<usize, EvalError> {
    match v {
        Value::Num(x) if x >= 0.0 && x.fract() == 0.0 => Ok(x as usize),
        got => Err(EvalError::TypeMismatch {
            expected: "a non-negative integer index",
            got,
        }),
    }
}
