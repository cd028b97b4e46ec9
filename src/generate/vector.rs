use super::{compose::*, reduce::*, INDEX};
use crate::{
    ast::*,
    error::Result,
    field::{apply_field, supports, ReadyField},
    op_set::FieldOp,
    table::{FunctionSpec, FunctionTable},
};
use std::sync::Arc;
use tracing::debug;

/// A base function: an unrolled reduction over the components
struct BaseDef {
    name: &'static str,
    formals: &'static [&'static str],
    wrap: Wrap,
    fold: Fold,
    component: Tree,
}

/// A function written in terms of base functions
struct CompositeDef {
    name: &'static str,
    formals: &'static [&'static str],
    body: Tree,
}

fn a_i() -> Tree {
    var("a").at(var(INDEX))
}
fn b_i() -> Tree {
    var("b").at(var(INDEX))
}

fn base_defs() -> [BaseDef; 6] {
    let componentwise = |name, component| BaseDef {
        name,
        formals: &["a", "b"],
        wrap: Wrap::Array,
        fold: Fold::List,
        component,
    };
    [
        componentwise("plus", a_i() + b_i()),
        componentwise("minus", a_i() - b_i()),
        componentwise("times", a_i() * b_i()),
        // `b` is a scalar here
        componentwise("scale", a_i() * var("b")),
        BaseDef {
            name: "dot",
            formals: &["a", "b"],
            wrap: Wrap::identity(),
            fold: Fold::sum(),
            component: a_i() * b_i(),
        },
        BaseDef {
            name: "norm",
            formals: &["a"],
            wrap: Wrap::Template(Pattern::new(var(ACC).sqrt(), [ACC])),
            fold: Fold::sum(),
            component: a_i() * a_i(),
        },
    ]
}

fn composite_defs() -> [CompositeDef; 3] {
    let (a, b) = (var("a"), var("b"));
    let coeff = || call("dot", [a.clone(), b.clone()]) / call("dot", [b.clone(), b.clone()]);
    [
        CompositeDef {
            name: "unit",
            formals: &["a"],
            body: call("scale", [a.clone(), var("one") / call("norm", [a.clone()])]),
        },
        CompositeDef {
            name: "proj",
            formals: &["a", "b"],
            body: call("scale", [b.clone(), coeff()]),
        },
        CompositeDef {
            name: "orth",
            formals: &["a", "b"],
            body: call("minus", [a.clone(), call("scale", [b.clone(), coeff()])]),
        },
    ]
}

/// The functions that can't be generated without square roots
fn needs_sqrt(name: &str) -> bool {
    matches!(name, "norm" | "unit")
}

pub(super) fn vector_table(
    n: usize,
    prefix: &str,
    field: Option<&ReadyField>,
) -> Result<FunctionTable> {
    let has_sqrt = supports(field, FieldOp::Sqrt);
    if !has_sqrt {
        debug!(prefix, "field has no sqrt, skipping norm and unit");
    }

    let mut base = BaseTable::new();
    for def in base_defs() {
        if needs_sqrt(def.name) && !has_sqrt {
            continue;
        }
        let component = Pattern::new(def.component, [INDEX]);
        let (formals, body) = reduce(n, def.formals, &def.wrap, &def.fold, &component)?;
        let spec = FunctionSpec {
            name: format!("{prefix}{}", def.name),
            formals,
            body: apply_field(&body, field)?,
        };
        base.insert(def.name.to_owned(), Arc::new(spec));
    }

    let composites = composite_defs()
        .into_iter()
        .filter(|def| has_sqrt || !needs_sqrt(def.name))
        .map(|def| {
            let name = format!("{prefix}{}", def.name);
            compose(&base, field, name, def.formals, &def.body).map(Arc::new)
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(FunctionTable::from_overlay(
        base.into_values().chain(composites),
    ))
}

#[cfg(all(test, feature = "eval"))]
mod tests {
    use crate::{
        ast::*,
        error::{ConfigurationError, Error},
        eval::Value,
        field::tests::complex_field,
        generate::*,
        table::{FunctionSpec, FunctionTable},
    };
    use float_cmp::approx_eq;
    use rstest::*;
    use std::sync::Arc;

    #[fixture]
    fn v3() -> FunctionTable {
        generate_vector(3, "v", None).unwrap()
    }

    fn call(t: &FunctionTable, name: &str, args: &[Value]) -> Value {
        t.get(name).unwrap().call(args).unwrap()
    }

    fn vec(xs: &[f64]) -> Value {
        Value::vector(xs.iter().copied())
    }

    fn assert_vec_approx(v: &Value, expected: &[f64]) {
        let got = v.to_f64s().unwrap();
        assert_eq!(got.len(), expected.len(), "{got:?} vs {expected:?}");
        for (g, e) in got.iter().zip(expected) {
            assert!(approx_eq!(f64, *g, *e, epsilon = 1e-12), "{got:?} vs {expected:?}");
        }
    }

    #[rstest]
    fn names_are_prefixed(v3: FunctionTable) {
        assert_eq!(
            v3.names().collect::<Vec<_>>(),
            ["vplus", "vminus", "vtimes", "vscale", "vdot", "vnorm", "vunit", "vproj", "vorth"]
        );
        assert!(v3.iter().all(|f| v3.get(&f.name) == Some(f)));
    }

    #[rstest]
    fn plus_adds_componentwise(v3: FunctionTable) {
        assert_eq!(call(&v3, "vplus", &[vec(&[1., 2., 3.]), vec(&[4., 5., 6.])]), vec(&[5., 7., 9.]));
    }

    #[rstest]
    fn dot_and_norm(v3: FunctionTable) {
        assert_eq!(call(&v3, "vdot", &[vec(&[1., 0., 0.]), vec(&[0., 1., 0.])]), Value::Num(0.0));
        assert_eq!(call(&v3, "vnorm", &[vec(&[3., 4., 0.])]), Value::Num(5.0));
    }

    #[test]
    fn unit_normalizes() {
        let v2 = generate_vector(2, "v", None).unwrap();
        assert_vec_approx(&call(&v2, "vunit", &[vec(&[3., 4.])]), &[0.6, 0.8]);
    }

    #[rstest]
    fn bodies_are_unrolled(v3: FunctionTable) {
        assert_eq!(
            v3.get("vplus").unwrap().to_string(),
            "function vplus(a, b) { return [a[0] + b[0], a[1] + b[1], a[2] + b[2]]; }"
        );
        assert_eq!(
            v3.get("vscale").unwrap().body.to_string(),
            "[a[0] * b, a[1] * b, a[2] * b]"
        );
        assert_eq!(
            v3.get("vorth").unwrap().body.to_string(),
            "vminus(a, vscale(b, vdot(a, b) / vdot(b, b)))"
        );
    }

    #[rstest]
    fn norm_is_sqrt_of_self_dot(v3: FunctionTable) {
        let dot = &v3.get("vdot").unwrap().body;
        let self_dot = substitute(dot, &crate::bindings! {"b" => var("a")});
        assert_eq!(v3.get("vnorm").unwrap().body, self_dot.sqrt());
    }

    #[rstest]
    #[case(&[1., 2., 3.], &[-4., 0.5, 2.])]
    #[case(&[0., 0., 0.], &[1., 1., 1.])]
    #[case(&[1e3, -7., 0.25], &[3., 3., -3.])]
    fn dot_is_symmetric(v3: FunctionTable, #[case] a: &[f64], #[case] b: &[f64]) {
        assert_eq!(
            call(&v3, "vdot", &[vec(a), vec(b)]),
            call(&v3, "vdot", &[vec(b), vec(a)])
        );
    }

    #[rstest]
    #[case(&[1., 2., 3.], &[0., 0., 2.])]
    #[case(&[5., -1., 0.5], &[1., 1., 1.])]
    #[case(&[0., 0., 0.], &[3., -2., 1.])]
    fn projection_plus_orthogonal_part(v3: FunctionTable, #[case] a: &[f64], #[case] b: &[f64]) {
        let proj = call(&v3, "vproj", &[vec(a), vec(b)]);
        let orth = call(&v3, "vorth", &[vec(a), vec(b)]);
        assert_vec_approx(&call(&v3, "vplus", &[proj, orth.clone()]), a);
        let ortho_dot = call(&v3, "vdot", &[orth, vec(b)]).to_f64().unwrap();
        assert!(approx_eq!(f64, ortho_dot, 0.0, epsilon = 1e-9));
    }

    fn sample(n: usize, step: f64, start: f64) -> Vec<f64> {
        (0..n).map(|i| start + step * i as f64).collect()
    }

    #[rstest]
    #[case(1)]
    #[case(2)]
    #[case(4)]
    #[case(5)]
    fn laws_hold_in_every_dimension(#[case] n: usize) {
        let t = generate_vector(n, "v", None).unwrap();
        let (a, b) = (sample(n, 1.5, -2.25), sample(n, -0.75, 3.5));
        let componentwise = |name: &str, op: fn(f64, f64) -> f64| {
            let expected: Vec<f64> = a.iter().zip(&b).map(|(x, y)| op(*x, *y)).collect();
            assert_eq!(call(&t, name, &[vec(&a), vec(&b)]), vec(&expected), "{name}, n = {n}");
        };
        componentwise("vplus", |x, y| x + y);
        componentwise("vminus", |x, y| x - y);
        componentwise("vtimes", |x, y| x * y);

        let scaled: Vec<f64> = a.iter().map(|x| x * -1.25).collect();
        assert_eq!(call(&t, "vscale", &[vec(&a), Value::Num(-1.25)]), vec(&scaled));

        assert_eq!(
            call(&t, "vdot", &[vec(&a), vec(&b)]),
            call(&t, "vdot", &[vec(&b), vec(&a)])
        );

        let proj = call(&t, "vproj", &[vec(&a), vec(&b)]);
        let orth = call(&t, "vorth", &[vec(&a), vec(&b)]);
        assert_vec_approx(&call(&t, "vplus", &[proj, orth.clone()]), &a);
        let ortho_dot = call(&t, "vdot", &[orth, vec(&b)]).to_f64().unwrap();
        assert!(approx_eq!(f64, ortho_dot, 0.0, epsilon = 1e-9), "n = {n}: {ortho_dot}");
    }

    /// The functions a body calls, in call order
    fn linked(tree: &Tree) -> Vec<Arc<FunctionSpec>> {
        match tree {
            Tree::Reference(target) => vec![Arc::clone(target)],
            _ => tree.children().into_iter().flat_map(linked).collect(),
        }
    }

    #[rstest]
    #[case("vunit", &["vscale", "vnorm"])]
    #[case("vproj", &["vscale", "vdot"])]
    #[case("vorth", &["vminus", "vscale", "vdot"])]
    fn composites_embed_the_bases_of_their_table(
        v3: FunctionTable,
        #[case] name: &str,
        #[case] bases: &[&str],
    ) {
        let targets = linked(&v3.get(name).unwrap().body);
        let mut names: Vec<_> = targets.iter().map(|t| t.name.as_str()).collect();
        names.dedup();
        assert_eq!(names, bases);
        for target in &targets {
            assert!(Arc::ptr_eq(target, v3.get_shared(&target.name).unwrap()), "{}", target.name);
        }
    }

    #[test]
    fn unprefixed_tables_link_to_their_own_bases() {
        let t3 = generate_vector(3, "", None).unwrap();
        let t4 = generate_vector(4, "", None).unwrap();
        for (own, other) in [(&t3, &t4), (&t4, &t3)] {
            for name in ["unit", "proj", "orth"] {
                for target in linked(&own.get(name).unwrap().body) {
                    assert!(Arc::ptr_eq(&target, own.get_shared(&target.name).unwrap()));
                    assert!(!Arc::ptr_eq(&target, other.get_shared(&target.name).unwrap()));
                }
            }
        }
        assert_eq!(
            call(&t4, "proj", &[vec(&[1., 2., 3., 4.]), vec(&[0., 0., 0., 2.])]),
            vec(&[0., 0., 0., 4.])
        );
    }

    #[test]
    fn decomposition_over_basis() {
        let v3 = generate_vector(3, "", None).unwrap();
        let a = vec(&[2., -3., 5.]);
        for (i, e) in Value::basis::<3>().into_iter().enumerate() {
            let proj = call(&v3, "proj", &[a.clone(), e.clone()]);
            let mut expected = [0.; 3];
            expected[i] = [2., -3., 5.][i];
            assert_vec_approx(&proj, &expected);
        }
    }

    #[test]
    fn generation_is_idempotent() {
        assert_eq!(
            generate_vector(3, "v", None).unwrap(),
            generate_vector(3, "v", None).unwrap()
        );
    }

    #[test]
    fn tables_of_different_dimensions_merge() {
        let v3 = generate_vector(3, "v3", None).unwrap();
        let v4 = generate_vector(4, "v4", None).unwrap();
        let merged = v3.merge(&v4).unwrap();
        assert_eq!(merged.len(), 2 * v3.len());
        assert_eq!(
            call(&merged, "v4dot", &[vec(&[1., 1., 1., 1.]), vec(&[1., 2., 3., 4.])]),
            Value::Num(10.0)
        );
    }

    #[test]
    fn same_prefix_collides() {
        let v3 = generate_vector(3, "v", None).unwrap();
        let v4 = generate_vector(4, "v", None).unwrap();
        assert_eq!(
            v3.merge(&v4).unwrap_err(),
            Error::Configuration(ConfigurationError::NameCollision("vplus".into()))
        );
    }

    #[test]
    fn zero_dimension_is_rejected() {
        assert_eq!(
            generate_vector(0, "v", None).unwrap_err(),
            Error::Configuration(ConfigurationError::InvalidDimension(0))
        );
    }

    #[test]
    fn field_without_multiplication_is_rejected() {
        let mut field = complex_field();
        field.times = None;
        let err = generate_vector(1, "", Some(&field)).unwrap_err();
        assert!(err.is_configuration(), "{err}");
    }

    #[test]
    fn one_dimension() {
        let v1 = generate_vector(1, "", None).unwrap();
        assert_eq!(v1.get("dot").unwrap().body.to_string(), "a[0] * b[0]");
        assert_eq!(call(&v1, "unit", &[vec(&[-2.])]), vec(&[-1.]));
    }

    mod complex {
        use super::*;

        fn c(re: f64, im: f64) -> Value {
            vec(&[re, im])
        }

        fn cvec(cs: &[(f64, f64)]) -> Value {
            Value::Array(cs.iter().map(|&(re, im)| c(re, im)).collect())
        }

        #[fixture]
        fn c2() -> FunctionTable {
            generate_vector(2, "c", Some(&complex_field())).unwrap()
        }

        #[rstest]
        fn no_sqrt_means_no_norm(c2: FunctionTable) {
            assert!(!c2.contains("cnorm"));
            assert!(!c2.contains("cunit"));
            assert!(c2.contains("cproj"));
            assert!(c2.iter().all(|f| f.body.op_set().is_empty()));
        }

        #[rstest]
        fn products_follow_the_field(c2: FunctionTable) {
            // (1 + 2i)(3 - i) = 5 + 5i, (i)(i) = -1
            assert_eq!(
                call(&c2, "ctimes", &[cvec(&[(1., 2.), (0., 1.)]), cvec(&[(3., -1.), (0., 1.)])]),
                cvec(&[(5., 5.), (-1., 0.)])
            );
            // Bilinear, no conjugation: i*i + 1*1 = 0
            assert_eq!(
                call(&c2, "cdot", &[cvec(&[(0., 1.), (1., 0.)]), cvec(&[(0., 1.), (1., 0.)])]),
                c(0., 0.)
            );
        }

        #[rstest]
        fn projection_uses_field_division(c2: FunctionTable) {
            let a = cvec(&[(1., 1.), (2., 0.)]);
            let b = cvec(&[(0., 2.), (0., 0.)]);
            // dot(a, b) = 2i - 2, dot(b, b) = -4, ratio = 0.5 - 0.5i
            assert_eq!(
                call(&c2, "cproj", &[a.clone(), b.clone()]),
                cvec(&[(1., 1.), (0., 0.)])
            );
            assert_eq!(
                call(&c2, "cplus", &[call(&c2, "cproj", &[a.clone(), b.clone()]), call(&c2, "corth", &[a.clone(), b])]),
                a
            );
        }
    }
}
