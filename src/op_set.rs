//! The abstract operators a field can redefine, and sets of them

use bitvec::prelude::*;
use serde::{Deserialize, Serialize};

/// An abstract operator that a [`Field`][crate::field::Field] may substitute
/// with its own template
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FieldOp {
    Plus,
    Minus,
    Times,
    Divide,
    Sqrt,
}

impl FieldOp {
    /// All the operators, in bit order
    pub const ALL: [FieldOp; 5] = [
        FieldOp::Plus,
        FieldOp::Minus,
        FieldOp::Times,
        FieldOp::Divide,
        FieldOp::Sqrt,
    ];

    fn bit(self) -> usize {
        self as usize
    }

    fn from_bit(bit: usize) -> Self {
        Self::ALL[bit]
    }

    /// The symbol used when rendering the operator
    pub fn symbol(self) -> &'static str {
        match self {
            FieldOp::Plus => "+",
            FieldOp::Minus => "-",
            FieldOp::Times => "*",
            FieldOp::Divide => "/",
            FieldOp::Sqrt => "sqrt",
        }
    }
}

impl std::fmt::Display for FieldOp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.symbol())
    }
}

/// A set of [`FieldOp`]s. Used both to describe which operators a field
/// supplies and which abstract operators still occur in a tree. Comparing
/// the two tells whether rewriting a tree with a field has anything left to
/// do
#[derive(Debug, Eq, Clone, Default)]
pub struct OpSet(BitVec);

impl PartialEq for OpSet {
    /// Equal up to trailing zeroes
    fn eq(&self, other: &Self) -> bool {
        let (small, big) = sort_by_len(&self.0, &other.0);
        big[0..small.len()] == small[..] && big[small.len()..].not_any()
    }
}

impl OpSet {
    pub fn empty() -> Self {
        OpSet(BitVec::new())
    }

    pub fn single(op: FieldOp) -> Self {
        let mut v = bitvec![0; op.bit() + 1];
        v.set(op.bit(), true);
        OpSet(v)
    }

    /// The operators every field has to define: `+ - * /`
    pub fn required() -> Self {
        [FieldOp::Plus, FieldOp::Minus, FieldOp::Times, FieldOp::Divide]
            .into_iter()
            .collect()
    }

    /// Iterate over the operators in the set, in [`FieldOp::ALL`] order
    pub fn iter(&self) -> impl Iterator<Item = FieldOp> + '_ {
        self.0.iter_ones().map(FieldOp::from_bit)
    }

    pub fn is_empty(&self) -> bool {
        self.0.not_any()
    }

    pub fn contains(&self, op: FieldOp) -> bool {
        match self.0.get(op.bit()) {
            None => false,
            Some(x) => *x,
        }
    }

    /// Whether every operator of `other` is in `self`
    pub fn includes(&self, other: &Self) -> bool {
        other.iter().all(|op| self.contains(op))
    }

    pub fn add_op(mut self, op: FieldOp) -> Self {
        if op.bit() >= self.0.len() {
            self.0.resize(op.bit() + 1, false);
        }
        self.0.set(op.bit(), true);
        self
    }

    /// The operators of `self` that are not in `other`
    pub fn difference(&self, other: &Self) -> Self {
        self.iter().filter(|op| !other.contains(*op)).collect()
    }
}

fn sort_by_len<T>(v1: T, v2: T) -> (T, T)
where
    T: std::borrow::Borrow<BitVec>,
{
    if v1.borrow().len() <= v2.borrow().len() {
        (v1, v2)
    } else {
        (v2, v1)
    }
}

impl FromIterator<FieldOp> for OpSet {
    fn from_iter<I: IntoIterator<Item = FieldOp>>(iter: I) -> Self {
        iter.into_iter().fold(OpSet::empty(), OpSet::add_op)
    }
}

/// Union
impl std::ops::Add for OpSet {
    type Output = Self;
    fn add(self, rhs: Self) -> Self::Output {
        let (small, big) = sort_by_len(self.0, rhs.0);
        OpSet(big | small)
    }
}

/// Intersection
impl std::ops::BitAnd for OpSet {
    type Output = Self;
    fn bitand(self, rhs: Self) -> Self::Output {
        self.iter().filter(|op| rhs.contains(*op)).collect()
    }
}
