use super::{reduce::*, COLUMN, INDEX};
use crate::{
    ast::*,
    error::{Error, Result},
    field::{apply_field, ReadyField},
    table::{FunctionSpec, FunctionTable},
};
use std::sync::Arc;

/// The matrix functions that are fully defined, in generation order
const COMPONENTWISE: [&str; 4] = ["plus", "minus", "scale", "transpose"];

const UNARY: &[&str] = &["a"];
const BINARY: &[&str] = &["a", "b"];

fn a_ij() -> Tree {
    var("a").at(var(INDEX)).at(var(COLUMN))
}

/// Formals and per-component template of a componentwise matrix function.
/// `None` for functions that are not componentwise
fn componentwise(name: &str) -> Option<(&'static [&'static str], Tree)> {
    let b_ij = || var("b").at(var(INDEX)).at(var(COLUMN));
    Some(match name {
        "plus" => (BINARY, a_ij() + b_ij()),
        "minus" => (BINARY, a_ij() - b_ij()),
        // `b` is a scalar here
        "scale" => (BINARY, a_ij() * var("b")),
        "transpose" => (UNARY, var("a").at(var(COLUMN)).at(var(INDEX))),
        _ => return None,
    })
}

/// Unroll `component` over rows then columns, giving an array of rows. The
/// row template is itself a reduction over the columns, in which the row
/// index is still a hole
fn reduce_rows<S: AsRef<str>>(n: usize, formals: &[S], component: Tree) -> Result<(Vec<String>, Tree)> {
    let (_, row) = reduce(n, formals, &Wrap::Array, &Fold::List, &Pattern::new(component, [COLUMN]))?;
    reduce(n, formals, &Wrap::Array, &Fold::List, &Pattern::new(row, [INDEX]))
}

pub(super) fn matrix_function(
    n: usize,
    prefix: &str,
    field: Option<&ReadyField>,
    name: &str,
) -> Result<FunctionSpec> {
    let Some((formals, component)) = componentwise(name) else {
        // The product needs a contraction over a third index, and the
        // determinant an expansion, neither of which is settled
        return Err(Error::unsupported("matrix", name));
    };
    let (formals, body) = reduce_rows(n, formals, component)?;
    Ok(FunctionSpec {
        name: format!("{prefix}{name}"),
        formals,
        body: apply_field(&body, field)?,
    })
}

pub(super) fn matrix_table(
    n: usize,
    prefix: &str,
    field: Option<&ReadyField>,
) -> Result<FunctionTable> {
    let specs = COMPONENTWISE
        .into_iter()
        .map(|name| matrix_function(n, prefix, field, name).map(Arc::new))
        .collect::<Result<Vec<_>>>()?;
    FunctionTable::from_specs(specs)
}

#[cfg(all(test, feature = "eval"))]
mod tests {
    use crate::{
        error::{ConfigurationError, Error},
        eval::Value,
        field::tests::complex_field,
        generate::*,
        table::FunctionTable,
    };
    use rstest::*;

    #[fixture]
    fn m2() -> FunctionTable {
        generate_matrix(2, "m", None).unwrap()
    }

    fn mat(rows: &[&[f64]]) -> Value {
        Value::Array(rows.iter().map(|r| Value::vector(r.iter().copied())).collect())
    }

    #[rstest]
    fn componentwise_functions(m2: FunctionTable) {
        assert_eq!(
            m2.names().collect::<Vec<_>>(),
            ["mplus", "mminus", "mscale", "mtranspose"]
        );
        let a = mat(&[&[1., 2.], &[3., 4.]]);
        let b = mat(&[&[5., 6.], &[7., 8.]]);
        let plus = m2.get("mplus").unwrap();
        assert_eq!(plus.call(&[a.clone(), b.clone()]).unwrap(), mat(&[&[6., 8.], &[10., 12.]]));
        let minus = m2.get("mminus").unwrap();
        assert_eq!(minus.call(&[b, a.clone()]).unwrap(), mat(&[&[4., 4.], &[4., 4.]]));
        let scale = m2.get("mscale").unwrap();
        assert_eq!(scale.call(&[a.clone(), Value::Num(2.)]).unwrap(), mat(&[&[2., 4.], &[6., 8.]]));
        let transpose = m2.get("mtranspose").unwrap();
        assert_eq!(transpose.call(&[a]).unwrap(), mat(&[&[1., 3.], &[2., 4.]]));
    }

    #[rstest]
    fn bodies_are_arrays_of_rows(m2: FunctionTable) {
        assert_eq!(
            m2.get("mtranspose").unwrap().body.to_string(),
            "[[a[0][0], a[1][0]], [a[0][1], a[1][1]]]"
        );
        assert_eq!(
            m2.get("mplus").unwrap().body.to_string(),
            "[[a[0][0] + b[0][0], a[0][1] + b[0][1]], [a[1][0] + b[1][0], a[1][1] + b[1][1]]]"
        );
    }

    #[test]
    fn transpose_is_an_involution() {
        let m3 = generate_matrix(3, "", None).unwrap();
        let a = mat(&[&[1., 2., 3.], &[4., 5., 6.], &[7., 8., 9.]]);
        let t = m3.get("transpose").unwrap();
        assert_eq!(t.call(&[t.call(&[a.clone()]).unwrap()]).unwrap(), a);
    }

    #[rstest]
    #[case::times("times")]
    #[case::determinant("determinant")]
    #[case::unknown("inverse")]
    fn unsupported_functions(#[case] name: &str) {
        assert_eq!(
            matrix_function(2, "m", None, name).unwrap_err(),
            Error::UnsupportedOperation {
                kind: "matrix",
                operation: name.to_owned()
            }
        );
    }

    #[test]
    fn single_function_matches_table_entry() {
        let plus = matrix_function(2, "m", None, "plus").unwrap();
        assert_eq!(Some(&plus), generate_matrix(2, "m", None).unwrap().get("mplus"));
    }

    #[test]
    fn zero_dimension_is_rejected() {
        assert_eq!(
            generate_matrix(0, "m", None).unwrap_err(),
            Error::Configuration(ConfigurationError::InvalidDimension(0))
        );
    }

    #[test]
    fn complex_entries() {
        let c = |re: f64, im: f64| Value::vector([re, im]);
        let m1 = generate_matrix(1, "", Some(&complex_field())).unwrap();
        let a = Value::Array(vec![Value::Array(vec![c(1., 2.)])]);
        let b = Value::Array(vec![Value::Array(vec![c(3., -1.)])]);
        let got = m1.get("minus").unwrap().call(&[a, b]).unwrap();
        assert_eq!(got, Value::Array(vec![Value::Array(vec![c(-2., 3.)])]));
    }
}
