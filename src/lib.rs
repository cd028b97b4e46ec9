/*!
# Unrolled vector and matrix functions

Generate the functions of vector (and some matrix) algebra for a fixed
dimension `n`, with every loop unrolled: `plus` over 3-vectors is not a loop
but the literal `[a[0] + b[0], a[1] + b[1], a[2] + b[2]]`. Function bodies
are expression [`Tree`]s, so they can be inspected, rendered as text,
serialized, or evaluated.

Generation is parametric over the number system the components live in,
via a [`Field`]. A field defines each of its arithmetic operators as a
template over two holes. When no field is given, components are plain
scalars and the operators stay as they are. When one is given, every
abstract operator of a generated body is replaced by the field's template.
For instance complex numbers can be stored as `[re, im]` pairs, and their
product spelled out with plain scalar arithmetic on the two parts.

Generation happens in 3 steps:

- 1: **Field preparation**. The field is checked (it must define `+`, `-`,
  `*` and `/`; `sqrt` is optional), and its templates are rewritten until
  they only contain concrete arithmetic. A template may use the field's
  other operators, but a field whose templates expand forever is rejected
  once a depth limit (see [`GenConfig`]) is reached.
- 2: **Reduction**. Each base function is described by a template for one
  component, with a hole for the component index. That template is
  instantiated for indices `0..n`, and the instances are either collected
  into an array (`plus`, `scale`...) or folded with an operator and then
  wrapped (`dot`, `norm`).
- 3: **Composition**. Higher-level functions (`unit`, `proj`, `orth`) call
  base functions by name. These calls are linked to the base functions of
  the same generation call, which are embedded by reference.

The main entry points are [`generate_vector`], [`generate_matrix`] and
[`matrix_function`], or the [`Generator`] methods to use a custom
configuration. They all return [`FunctionTable`]s (or a single
[`FunctionSpec`]) and never panic on bad inputs: errors are reported as
[`Error`] values.
*/

pub mod ast;
pub mod config;
pub mod error;
pub mod field;
pub mod generate;
pub mod op_set;
pub mod table;

#[cfg(feature = "eval")]
pub mod eval;

pub use ast::{Pattern, Tree};
pub use config::GenConfig;
pub use error::{ConfigurationError, Error, Result};
pub use field::{Field, ReadyField};
pub use generate::{generate_matrix, generate_vector, matrix_function, Generator};
pub use op_set::{FieldOp, OpSet};
pub use table::{FunctionSpec, FunctionTable};


#[cfg(test)]
mod tests {
    use super::*;

    fn is_send_sync<T: Send + Sync>() {}

    #[test]
    fn tables_can_be_shared_across_threads() {
        is_send_sync::<FunctionTable>();
        is_send_sync::<Generator>();
        is_send_sync::<ReadyField>();
    }

    #[test]
    fn concurrent_generation_is_deterministic() {
        let sequential: Vec<_> = (1..=4)
            .map(|n| generate_vector(n, "v", None).unwrap())
            .collect();
        let concurrent: Vec<_> = std::thread::scope(|s| {
            let handles: Vec<_> = (1..=4)
                .map(|n| s.spawn(move || generate_vector(n, "v", None).unwrap()))
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });
        assert_eq!(sequential, concurrent);
    }
}
