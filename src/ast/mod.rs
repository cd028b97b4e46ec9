//! Expression trees, the builder used to author templates, and structural
//! pattern matching over them

pub mod builder;
mod pattern;
mod render;
mod tree;

pub use builder::{array, call, int, real, var};
pub use pattern::{match_tree, substitute, substitute_owned, Bindings, Pattern};
pub use tree::{BinOp, Domain, Lit, Tree, UnOp};
