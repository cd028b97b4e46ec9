use crate::{
    ast::*,
    error::{ConfigurationError, Error, Result},
};
use tracing::trace;

/// Hole of the fold and wrap templates bound to the accumulated result
pub const ACC: &str = "x";
/// Hole of the fold template bound to the next component
pub const NEXT: &str = "y";

/// How the per-component expressions are combined
#[derive(Debug, Clone, PartialEq)]
pub enum Fold {
    /// Keep them side by side (`x, y`), to be wrapped by [`Wrap::Array`]
    List,
    /// Left fold with a template over [`ACC`] and [`NEXT`], e.g. `x + y`
    Template(Pattern),
}

/// What is done with the combined result
#[derive(Debug, Clone, PartialEq)]
pub enum Wrap {
    /// `[x]`: make an array literal
    Array,
    /// A template over [`ACC`], e.g. `sqrt(x)`
    Template(Pattern),
}

impl Fold {
    /// `x + y` (abstract addition)
    pub fn sum() -> Self {
        Fold::Template(Pattern::new(var(ACC) + var(NEXT), [ACC, NEXT]))
    }
}

impl Wrap {
    /// `x`
    pub fn identity() -> Self {
        Wrap::Template(Pattern::new(var(ACC), [ACC]))
    }
}

/// Unroll `component` over the indices `0..n`, combine the results with
/// `fold` from left to right, and `wrap` the outcome. `component` must have
/// exactly one hole: the index, which is bound to integer literals.
///
/// The order of the fold is always the index order, which matters for fields
/// whose operators do not commute. The accumulated tree is moved into each
/// fold step, so unrolling is linear in `n`
pub fn reduce<S: AsRef<str>>(
    n: usize,
    formals: &[S],
    wrap: &Wrap,
    fold: &Fold,
    component: &Pattern,
) -> Result<(Vec<String>, Tree)> {
    if n < 1 {
        return Err(ConfigurationError::InvalidDimension(n).into());
    }
    let [index] = component.holes() else {
        return Err(Error::PatternMismatch(format!(
            "component template `{}` should have a single index hole, has {:?}",
            component.tree(),
            component.holes()
        )));
    };

    let components = (0..n)
        .map(|idx| component.instantiate(&crate::bindings! {index.as_str() => int(idx as i64)}))
        .collect::<Result<Vec<_>>>()?;

    let body = match (fold, wrap) {
        (Fold::List, Wrap::Array) => Tree::ArrayLiteral(components),
        (Fold::List, Wrap::Template(_)) => {
            return Err(Error::PatternMismatch(
                "a list of components can only be wrapped in an array".into(),
            ))
        }
        (Fold::Template(fold), wrap) => {
            let mut components = components.into_iter();
            let first = components
                .next()
                .ok_or_else(|| Error::PatternMismatch("nothing to fold".into()))?;
            let acc = components.try_fold(first, |acc, next| {
                fold.instantiate_owned(crate::bindings! {ACC => acc, NEXT => next})
            })?;
            match wrap {
                Wrap::Array => Tree::ArrayLiteral(vec![acc]),
                Wrap::Template(wrap) => wrap.instantiate_owned(crate::bindings! {ACC => acc})?,
            }
        }
    };
    trace!(n, size = body.size(), "reduction unrolled");

    Ok((formals.iter().map(|f| f.as_ref().to_owned()).collect(), body))
}
