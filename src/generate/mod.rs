//! Generate tables of unrolled functions for a given dimension and field

mod compose;
mod matrix;
mod reduce;
mod vector;

pub use compose::{compose, BaseTable};
pub use reduce::{reduce, Fold, Wrap, ACC, NEXT};

use crate::{
    config::GenConfig,
    error::{ConfigurationError, Result},
    field::{Field, ReadyField},
    table::{FunctionSpec, FunctionTable},
};
use tracing::debug;

/// Name of the index hole in per-component templates (row index for
/// matrices)
pub const INDEX: &str = "i";
/// Name of the column index hole in per-component matrix templates
pub const COLUMN: &str = "j";

/// Entry point of generation, holding the configuration every call uses.
/// Generating is pure: the same arguments always give equal tables, and
/// nothing is shared between two calls
#[derive(Debug, Clone, Default)]
pub struct Generator {
    config: GenConfig,
}

impl Generator {
    pub fn new(config: GenConfig) -> Self {
        Generator { config }
    }

    pub fn config(&self) -> &GenConfig {
        &self.config
    }

    /// Validate the inputs shared by every generation call
    fn prepare(&self, n: usize, field: Option<&Field>) -> Result<Option<ReadyField>> {
        if n < 1 {
            return Err(ConfigurationError::InvalidDimension(n).into());
        }
        field
            .map(|f| ReadyField::prepare(f, &self.config))
            .transpose()
    }

    /// The vector functions (`plus`, `minus`, `times`, `scale`, `dot`,
    /// `norm`, `unit`, `proj`, `orth`) for vectors of dimension `n`, every
    /// name starting with `prefix`. Without a field, plain scalar arithmetic
    /// is used.
    ///
    /// `norm` and `unit` need square roots, they are left out when `field`
    /// doesn't define `sqrt`
    pub fn vector(&self, n: usize, prefix: &str, field: Option<&Field>) -> Result<FunctionTable> {
        let field = self.prepare(n, field)?;
        let table = vector::vector_table(n, prefix, field.as_ref())?;
        debug!(n, prefix, functions = table.len(), "vector table generated");
        Ok(table)
    }

    /// The componentwise matrix functions (`plus`, `minus`, `scale`,
    /// `transpose`) for `n`×`n` matrices stored as arrays of rows
    pub fn matrix(&self, n: usize, prefix: &str, field: Option<&Field>) -> Result<FunctionTable> {
        let field = self.prepare(n, field)?;
        let table = matrix::matrix_table(n, prefix, field.as_ref())?;
        debug!(n, prefix, functions = table.len(), "matrix table generated");
        Ok(table)
    }

    /// A single matrix function, by unprefixed name. Matrix product and
    /// determinant are not available yet
    pub fn matrix_function(
        &self,
        n: usize,
        prefix: &str,
        field: Option<&Field>,
        name: &str,
    ) -> Result<FunctionSpec> {
        let field = self.prepare(n, field)?;
        matrix::matrix_function(n, prefix, field.as_ref(), name)
    }
}

/// [`Generator::vector`] with the default configuration
pub fn generate_vector(n: usize, prefix: &str, field: Option<&Field>) -> Result<FunctionTable> {
    Generator::default().vector(n, prefix, field)
}

/// [`Generator::matrix`] with the default configuration
pub fn generate_matrix(n: usize, prefix: &str, field: Option<&Field>) -> Result<FunctionTable> {
    Generator::default().matrix(n, prefix, field)
}

/// [`Generator::matrix_function`] with the default configuration
pub fn matrix_function(
    n: usize,
    prefix: &str,
    field: Option<&Field>,
    name: &str,
) -> Result<FunctionSpec> {
    Generator::default().matrix_function(n, prefix, field, name)
}
