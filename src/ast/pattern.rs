use super::tree::Tree;
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// What the holes of a [`Pattern`] were matched against
pub type Bindings = HashMap<String, Tree>;

/// A [`Tree`] in which some variable names are designated as holes. Holes
/// match any sub-tree when matching, and are replaced by their bindings when
/// instantiating
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pattern {
    tree: Tree,
    holes: Vec<String>,
}

impl Pattern {
    pub fn new<S: Into<String>>(tree: Tree, holes: impl IntoIterator<Item = S>) -> Self {
        Pattern {
            tree,
            holes: holes.into_iter().map(Into::into).collect(),
        }
    }

    pub fn tree(&self) -> &Tree {
        &self.tree
    }

    pub fn holes(&self) -> &[String] {
        &self.holes
    }

    pub fn is_hole(&self, name: &str) -> bool {
        self.holes.iter().any(|h| h == name)
    }

    /// See [`match_tree`]
    pub fn matches(&self, tree: &Tree) -> Option<Bindings> {
        match_tree(self, tree)
    }

    /// Substitute the holes with their bindings. Fails if a hole of the
    /// pattern has no binding, which means the caller and the template
    /// disagree on the names of the holes
    pub fn instantiate(&self, bindings: &Bindings) -> Result<Tree> {
        self.check_bound(bindings)?;
        Ok(substitute(&self.tree, bindings))
    }

    /// Same as [`Self::instantiate`], but consumes the bindings so that they
    /// are moved into the result instead of copied. The cost is then that of
    /// the template, whatever the size of the bound trees
    pub fn instantiate_owned(&self, bindings: Bindings) -> Result<Tree> {
        self.check_bound(&bindings)?;
        Ok(substitute_owned(&self.tree, bindings))
    }

    fn check_bound(&self, bindings: &Bindings) -> Result<()> {
        match self.holes.iter().find(|h| !bindings.contains_key(*h)) {
            None => Ok(()),
            Some(missing) => Err(Error::PatternMismatch(format!(
                "hole `{missing}` of template `{}` is not bound",
                self.tree
            ))),
        }
    }
}

/// Match `tree` against `pattern`. Succeeds iff both have the same shape at
/// every position that is not a hole, and returns what each hole matched.
/// Comparison is purely structural: `a + b` does not match a pattern for
/// `b + a`, and a native `+` does not match an abstract one.
///
/// A hole occurring several times in the pattern binds at its first
/// occurrence, and the following ones must match an equal sub-tree
pub fn match_tree(pattern: &Pattern, tree: &Tree) -> Option<Bindings> {
    let mut bindings = Bindings::new();
    if rec_match(pattern, &pattern.tree, tree, &mut bindings) {
        Some(bindings)
    } else {
        None
    }
}

fn rec_match(pattern: &Pattern, p: &Tree, t: &Tree, bindings: &mut Bindings) -> bool {
    use Tree as T;
    match (p, t) {
        (T::Variable(name), _) if pattern.is_hole(name) => match bindings.get(name) {
            Some(bound) => bound == t,
            None => {
                bindings.insert(name.clone(), t.clone());
                true
            }
        },
        (T::Literal(a), T::Literal(b)) => a == b,
        (T::Variable(a), T::Variable(b)) => a == b,
        (T::Reference(a), T::Reference(b)) => a == b,
        (T::Index(pb, pi), T::Index(tb, ti)) => {
            rec_match(pattern, pb, tb, bindings) && rec_match(pattern, pi, ti, bindings)
        }
        (T::FieldAccess(pb, pf), T::FieldAccess(tb, tf)) => {
            pf == tf && rec_match(pattern, pb, tb, bindings)
        }
        (T::BinaryOp(pd, pop, pl, pr), T::BinaryOp(td, top, tl, tr)) => {
            pd == td
                && pop == top
                && rec_match(pattern, pl, tl, bindings)
                && rec_match(pattern, pr, tr, bindings)
        }
        (T::UnaryOp(pd, pop, pe), T::UnaryOp(td, top, te)) => {
            pd == td && pop == top && rec_match(pattern, pe, te, bindings)
        }
        (T::ArrayLiteral(ps), T::ArrayLiteral(ts)) => {
            ps.len() == ts.len()
                && ps
                    .iter()
                    .zip(ts)
                    .all(|(p, t)| rec_match(pattern, p, t, bindings))
        }
        (T::Call(pc, pargs), T::Call(tc, targs)) => {
            pargs.len() == targs.len()
                && rec_match(pattern, pc, tc, bindings)
                && pargs
                    .iter()
                    .zip(targs)
                    .all(|(p, t)| rec_match(pattern, p, t, bindings))
        }
        _ => false,
    }
}

/// Replace every variable that has a binding with (a copy of) the bound
/// sub-tree. A binding may thus be duplicated. References are opaque: the
/// bodies they embed are never substituted into
pub fn substitute(tree: &Tree, bindings: &Bindings) -> Tree {
    match tree {
        Tree::Variable(name) => match bindings.get(name) {
            Some(bound) => bound.clone(),
            None => tree.clone(),
        },
        _ => tree.map_children(|child| substitute(child, bindings)),
    }
}

/// [`substitute`] taking ownership of the bindings. Each bound tree is moved
/// into its last occurrence and cloned for the previous ones only
pub fn substitute_owned(tree: &Tree, mut bindings: Bindings) -> Tree {
    let mut uses = HashMap::new();
    count_uses(tree, &bindings, &mut uses);
    substitute_counted(tree, &mut bindings, &mut uses)
}

fn count_uses(tree: &Tree, bindings: &Bindings, uses: &mut HashMap<String, usize>) {
    match tree {
        Tree::Variable(name) if bindings.contains_key(name) => {
            *uses.entry(name.clone()).or_default() += 1
        }
        _ => {
            for child in tree.children() {
                count_uses(child, bindings, uses);
            }
        }
    }
}

fn substitute_counted(
    tree: &Tree,
    bindings: &mut Bindings,
    uses: &mut HashMap<String, usize>,
) -> Tree {
    match tree {
        Tree::Variable(name) => match uses.get_mut(name) {
            None => tree.clone(),
            Some(left) => {
                *left -= 1;
                let bound = if *left == 0 {
                    bindings.remove(name)
                } else {
                    bindings.get(name).cloned()
                };
                bound.unwrap_or_else(|| tree.clone())
            }
        },
        _ => tree.map_children(|child| substitute_counted(child, bindings, uses)),
    }
}

/// Shorthand to build [`Bindings`]
#[macro_export]
macro_rules! bindings {
    ($($hole:expr => $tree:expr),* $(,)?) => {{
        let mut b = $crate::ast::Bindings::new();
        $( b.insert(::std::string::String::from($hole), $crate::ast::Tree::from($tree)); )*
        b
    }};
}
