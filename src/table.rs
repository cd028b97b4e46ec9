//! Generated functions, and the tables that group them

use crate::{
    ast::Tree,
    error::{ConfigurationError, Result},
};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::{fmt, sync::Arc};

/// A generated function. The body is kept as a tree (and not compiled away)
/// so that whatever consumes the function can still inspect, inline or
/// render it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionSpec {
    pub name: String,
    pub formals: Vec<String>,
    pub body: Tree,
}

impl FunctionSpec {
    pub fn new<S: Into<String>>(
        name: impl Into<String>,
        formals: impl IntoIterator<Item = S>,
        body: Tree,
    ) -> Self {
        FunctionSpec {
            name: name.into(),
            formals: formals.into_iter().map(Into::into).collect(),
            body,
        }
    }

    pub fn arity(&self) -> usize {
        self.formals.len()
    }
}

impl fmt::Display for FunctionSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "function {}({}) {{ return {}; }}",
            self.name,
            self.formals.join(", "),
            self.body
        )
    }
}

/// Functions indexed by name. A table is built once by a generation call and
/// is never modified afterwards. Iteration follows generation order
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FunctionTable {
    functions: IndexMap<String, Arc<FunctionSpec>>,
}

impl FunctionTable {
    /// Build a table from functions. Names must be unique
    pub(crate) fn from_specs(specs: impl IntoIterator<Item = Arc<FunctionSpec>>) -> Result<Self> {
        let mut functions = IndexMap::new();
        for spec in specs {
            let name = spec.name.clone();
            if functions.insert(name.clone(), spec).is_some() {
                return Err(ConfigurationError::NameCollision(name).into());
            }
        }
        Ok(FunctionTable { functions })
    }

    /// Build a table from functions. When a name is repeated, the last
    /// function with that name wins but keeps the position of the first
    pub(crate) fn from_overlay(specs: impl IntoIterator<Item = Arc<FunctionSpec>>) -> Self {
        let mut functions = IndexMap::new();
        for spec in specs {
            functions.insert(spec.name.clone(), spec);
        }
        FunctionTable { functions }
    }

    pub fn get(&self, name: &str) -> Option<&FunctionSpec> {
        self.functions.get(name).map(Arc::as_ref)
    }

    /// The shared handle to a function, as embedded by references to it
    pub fn get_shared(&self, name: &str) -> Option<&Arc<FunctionSpec>> {
        self.functions.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.functions.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.functions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.functions.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> + '_ {
        self.functions.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = &FunctionSpec> + '_ {
        self.functions.values().map(Arc::as_ref)
    }

    /// Combine two tables into a new one. Fails if they share a name, e.g.
    /// when both were generated with the same prefix
    pub fn merge(&self, other: &FunctionTable) -> Result<FunctionTable> {
        Self::from_specs(
            self.functions
                .values()
                .chain(other.functions.values())
                .cloned(),
        )
    }
}
