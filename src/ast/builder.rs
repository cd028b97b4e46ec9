//! Build templates directly in Rust. Arithmetic operators on [`Tree`] produce
//! abstract ([`Domain::Field`]) nodes, the `native_*` methods produce plain
//! scalar arithmetic for use inside field templates

use super::tree::*;
use std::sync::Arc;

/// A named variable (or hole, when used inside a [`Pattern`][super::Pattern])
pub fn var(name: impl Into<String>) -> Tree {
    Tree::Variable(name.into())
}

/// An integer literal
pub fn int(x: i64) -> Tree {
    Tree::Literal(Lit::Int(x))
}

/// A real literal
pub fn real(x: f64) -> Tree {
    Tree::Literal(Lit::Real(x))
}

/// `[elems...]`
pub fn array(elems: impl IntoIterator<Item = Tree>) -> Tree {
    Tree::ArrayLiteral(elems.into_iter().collect())
}

/// A call to a function by name, to be linked later
pub fn call(name: impl Into<String>, args: impl IntoIterator<Item = Tree>) -> Tree {
    Tree::Call(Box::new(var(name)), args.into_iter().collect())
}

impl From<f64> for Tree {
    fn from(x: f64) -> Tree {
        real(x)
    }
}
impl From<i64> for Tree {
    #[inline]
    fn from(x: i64) -> Tree {
        int(x)
    }
}
impl From<&str> for Tree {
    fn from(name: &str) -> Tree {
        var(name)
    }
}

macro_rules! tree_binary_ops {
    ($($doc:literal $trait:ident $method:ident $native:ident $op:ident),*) => {
        $(
        #[doc=$doc]
        impl<E: Into<Tree>> std::ops::$trait<E> for Tree {
            type Output = Self;
            #[doc=$doc]
            fn $method(self, rhs: E) -> Self::Output {
                Tree::BinaryOp(Domain::Field, BinOp::$op, Box::new(self), Box::new(rhs.into()))
            }
        }
        )*

        impl Tree {
            $(
            #[doc=$doc]
            #[doc=" on plain scalars, left alone by field rewriting"]
            pub fn $native(self, rhs: impl Into<Tree>) -> Self {
                Tree::BinaryOp(Domain::Native, BinOp::$op, Box::new(self), Box::new(rhs.into()))
            }
            )*
        }
    };
}

tree_binary_ops! {
    "Addition" Add add native_add Add,
    "Subtraction" Sub sub native_sub Sub,
    "Multiplication" Mul mul native_mul Mul,
    "Division" Div div native_div Div
}

macro_rules! scalar_with_tree_binary_ops {
    ($($t:ty),*) => {
        $(
        impl std::ops::Add<Tree> for $t {
            type Output = Tree;
            #[inline]
            fn add(self, rhs: Tree) -> Self::Output {
                Into::<Tree>::into(self) + rhs
            }
        }
        impl std::ops::Mul<Tree> for $t {
            type Output = Tree;
            #[inline]
            fn mul(self, rhs: Tree) -> Self::Output {
                Into::<Tree>::into(self) * rhs
            }
        }
        impl std::ops::Div<Tree> for $t {
            type Output = Tree;
            #[inline]
            fn div(self, rhs: Tree) -> Self::Output {
                Into::<Tree>::into(self) / rhs
            }
        }
        )*
    };
}
scalar_with_tree_binary_ops!(f64, i64);

/// Abstract negation. Under a field it becomes `zero - self`
impl std::ops::Neg for Tree {
    type Output = Self;
    fn neg(self) -> Self {
        Tree::UnaryOp(Domain::Field, UnOp::Neg, Box::new(self))
    }
}

impl Tree {
    /// `self[index]`
    pub fn at(self, index: impl Into<Tree>) -> Self {
        Tree::Index(Box::new(self), Box::new(index.into()))
    }

    /// `self.name`
    pub fn get(self, name: impl Into<String>) -> Self {
        Tree::FieldAccess(Box::new(self), name.into())
    }

    /// Abstract square root, which a field may redefine
    pub fn sqrt(self) -> Self {
        Tree::UnaryOp(Domain::Field, UnOp::Sqrt, Box::new(self))
    }

    /// Square root of a plain scalar
    pub fn native_sqrt(self) -> Self {
        Tree::UnaryOp(Domain::Native, UnOp::Sqrt, Box::new(self))
    }

    /// Negation of a plain scalar
    pub fn native_neg(self) -> Self {
        Tree::UnaryOp(Domain::Native, UnOp::Neg, Box::new(self))
    }

    /// Call `self` with some arguments
    pub fn apply(self, args: impl IntoIterator<Item = Tree>) -> Self {
        Tree::Call(Box::new(self), args.into_iter().collect())
    }
}

impl From<Arc<crate::table::FunctionSpec>> for Tree {
    fn from(target: Arc<crate::table::FunctionSpec>) -> Tree {
        Tree::Reference(target)
    }
}
