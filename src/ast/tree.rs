use crate::{op_set::*, table::FunctionSpec};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// A literal constant
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Lit {
    /// An integer, typically a component index
    Int(i64),
    /// A real number
    Real(f64),
}

/// Binary arithmetic operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
}

/// Unary arithmetic operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UnOp {
    Neg,
    Sqrt,
}

/// Tells whether an operator node stands for the abstract operation of some
/// field, or for plain arithmetic on scalars. Field templates spell out
/// their concrete arithmetic with [`Domain::Native`] operators, which the
/// field rewriter never touches
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Domain {
    Field,
    Native,
}

/// The nodes of a generated expression. Trees are plain immutable values:
/// every transformation (substitution, field rewriting, linking) builds a new
/// tree and leaves its input untouched
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Tree {
    Literal(Lit),
    Variable(String),
    /// `base[index]`
    Index(Box<Tree>, Box<Tree>),
    /// `base.field`
    FieldAccess(Box<Tree>, String),
    BinaryOp(Domain, BinOp, Box<Tree>, Box<Tree>),
    UnaryOp(Domain, UnOp, Box<Tree>),
    ArrayLiteral(Vec<Tree>),
    /// `callee(args...)`. The callee is a [`Tree::Variable`] while a body is
    /// being authored, and a [`Tree::Reference`] once it has been linked
    /// against a function table
    Call(Box<Tree>, Vec<Tree>),
    /// An already generated function, embedded by value. Its body stays
    /// inspectable so later passes can inline through it
    Reference(Arc<FunctionSpec>),
}

impl Tree {
    /// The abstract field operator this node applies, if any. Negation has no
    /// template of its own (fields rewrite it as `zero - x`), and native
    /// operators are never abstract
    pub fn field_op(&self) -> Option<FieldOp> {
        match self {
            Tree::BinaryOp(Domain::Field, op, _, _) => Some(match op {
                BinOp::Add => FieldOp::Plus,
                BinOp::Sub => FieldOp::Minus,
                BinOp::Mul => FieldOp::Times,
                BinOp::Div => FieldOp::Divide,
            }),
            Tree::UnaryOp(Domain::Field, UnOp::Sqrt, _) => Some(FieldOp::Sqrt),
            _ => None,
        }
    }

    /// The direct sub-trees of this node, in evaluation order. References are
    /// opaque and have none
    pub fn children(&self) -> Vec<&Tree> {
        match self {
            Tree::Literal(_) | Tree::Variable(_) | Tree::Reference(_) => vec![],
            Tree::Index(base, index) => vec![&**base, &**index],
            Tree::FieldAccess(base, _) => vec![&**base],
            Tree::BinaryOp(_, _, l, r) => vec![&**l, &**r],
            Tree::UnaryOp(_, _, e) => vec![&**e],
            Tree::ArrayLiteral(elems) => elems.iter().collect(),
            Tree::Call(callee, args) => std::iter::once(&**callee).chain(args).collect(),
        }
    }

    /// Rebuild this node with each direct sub-tree replaced by `f(sub_tree)`
    pub fn try_map_children<E>(
        &self,
        mut f: impl FnMut(&Tree) -> Result<Tree, E>,
    ) -> Result<Tree, E> {
        Ok(match self {
            Tree::Literal(_) | Tree::Variable(_) | Tree::Reference(_) => self.clone(),
            Tree::Index(base, index) => Tree::Index(Box::new(f(&**base)?), Box::new(f(&**index)?)),
            Tree::FieldAccess(base, name) => Tree::FieldAccess(Box::new(f(&**base)?), name.clone()),
            Tree::BinaryOp(d, op, l, r) => {
                Tree::BinaryOp(*d, *op, Box::new(f(&**l)?), Box::new(f(&**r)?))
            }
            Tree::UnaryOp(d, op, e) => Tree::UnaryOp(*d, *op, Box::new(f(&**e)?)),
            Tree::ArrayLiteral(elems) => {
                Tree::ArrayLiteral(elems.iter().map(&mut f).collect::<Result<_, _>>()?)
            }
            Tree::Call(callee, args) => Tree::Call(
                Box::new(f(&**callee)?),
                args.iter().map(&mut f).collect::<Result<_, _>>()?,
            ),
        })
    }

    /// Infallible version of [`Self::try_map_children`]
    pub fn map_children(&self, mut f: impl FnMut(&Tree) -> Tree) -> Tree {
        match self.try_map_children(|t| Ok::<_, std::convert::Infallible>(f(t))) {
            Ok(t) => t,
            Err(never) => match never {},
        }
    }

    /// The abstract operators occurring anywhere in this tree (not looking
    /// inside references)
    pub fn op_set(&self) -> OpSet {
        let here = match self.field_op() {
            Some(op) => OpSet::single(op),
            None => OpSet::empty(),
        };
        self.children()
            .into_iter()
            .fold(here, |acc, child| acc + child.op_set())
    }

    /// Number of nodes, references counting as one
    pub fn size(&self) -> usize {
        1 + self.children().into_iter().map(Tree::size).sum::<usize>()
    }
}
