use crate::{
    ast::*,
    error::{Error, Result},
    field::{apply_field, constants, ReadyField},
    table::FunctionSpec,
};
use indexmap::IndexMap;
use std::sync::Arc;
use tracing::trace;

/// Base functions of one generation call, indexed by their unprefixed names
pub type BaseTable = IndexMap<String, Arc<FunctionSpec>>;

/// Build a function whose body calls base functions by their unprefixed
/// name, e.g. `scale(a, one / norm(a))`.
///
/// `zero` and `one` are bound to the field's constants, the body is rewritten
/// for the field, and each call to a base function is then linked: its
/// callee becomes a [`Tree::Reference`] embedding that very function. So
/// the result calls exactly the functions of this generation call, whatever
/// other tables exist with the same names, and later passes can inline
/// through the references
pub fn compose<S: AsRef<str>>(
    base: &BaseTable,
    field: Option<&ReadyField>,
    name: impl Into<String>,
    formals: &[S],
    body: &Tree,
) -> Result<FunctionSpec> {
    let name = name.into();
    let formals: Vec<String> = formals.iter().map(|f| f.as_ref().to_owned()).collect();
    let body = substitute(body, &constants(field));
    let body = apply_field(&body, field)?;
    let (body, linked) = link(&body, base, &formals, Vec::new())?;
    trace!(function = %name, ?linked, "composite linked");
    Ok(FunctionSpec {
        name,
        formals,
        body,
    })
}

/// Replace calls by name with calls by reference. The names of the linked
/// functions are threaded through and returned, in order of first use
fn link(
    tree: &Tree,
    base: &BaseTable,
    formals: &[String],
    linked: Vec<String>,
) -> Result<(Tree, Vec<String>)> {
    match tree {
        Tree::Call(callee, args) => {
            let (callee, mut linked) = match callee.as_ref() {
                Tree::Variable(fname) => match base.get(fname) {
                    Some(target) => {
                        let mut linked = linked;
                        if !linked.contains(fname) {
                            linked.push(fname.clone());
                        }
                        (Tree::Reference(Arc::clone(target)), linked)
                    }
                    None if formals.contains(fname) => (callee.as_ref().clone(), linked),
                    None => {
                        return Err(Error::PatternMismatch(format!(
                            "call to `{fname}`, which is neither a base function nor a parameter"
                        )))
                    }
                },
                other => link(other, base, formals, linked)?,
            };
            let mut new_args = Vec::with_capacity(args.len());
            for arg in args {
                let (arg, l) = link(arg, base, formals, linked)?;
                linked = l;
                new_args.push(arg);
            }
            Ok((Tree::Call(Box::new(callee), new_args), linked))
        }
        _ => {
            let mut linked = Some(linked);
            let tree = tree.try_map_children(|child| {
                let (child, l) = link(child, base, formals, linked.take().unwrap_or_default())?;
                linked = Some(l);
                Ok::<_, Error>(child)
            })?;
            Ok((tree, linked.unwrap_or_default()))
        }
    }
}
