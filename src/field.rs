//! Describe the algebraic field generated code computes over
//!
//! A [`Field`] tells how each abstract operator (`+ - * / sqrt`) of a
//! generated expression should be spelled out, and what its `zero` and `one`
//! are. A [`ReadyField`] is a field that has been validated, and whose
//! templates have been rewritten once and for all, so that applying it to a
//! tree is a single bottom-up pass

use crate::{
    ast::*,
    config::GenConfig,
    error::{ConfigurationError, Error, Result},
    op_set::*,
};
use serde::{Deserialize, Serialize};
use tracing::trace;

/// Name of the hole bound to the left operand (or the only operand of
/// `sqrt`) in field templates
pub const LHS: &str = "_x";
/// Name of the hole bound to the right operand in field templates
pub const RHS: &str = "_y";

// # TYPES //

/// A set of templates replacing the abstract operators, plus the field's
/// identities. Binary templates refer to their operands with the holes
/// [`LHS`] and [`RHS`], `sqrt` with [`LHS`] only.
///
/// Templates should do their own arithmetic with native operators
/// ([`Tree::native_add`] etc.). A field has no negation template: an abstract
/// `-x` is rewritten as `zero - x`. A template may use an abstract operator the
/// field defines differently, but one that (directly or not) requires itself
/// never terminates and is rejected by [`ReadyField::prepare`].
///
/// IMPORTANT: operands may be duplicated or reordered by the template and by
/// later optimization passes. Templates must thus be free of side effects
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Field {
    pub plus: Option<Tree>,
    pub minus: Option<Tree>,
    pub times: Option<Tree>,
    pub divide: Option<Tree>,
    /// Only needed by functions that take square roots (`norm`, `unit`)
    pub sqrt: Option<Tree>,
    pub zero: Tree,
    pub one: Tree,
}

/// A rewrite rule: what an abstract operator looks like, and what it becomes
#[derive(Debug, Clone)]
struct Rule {
    lhs: Pattern,
    rhs: Pattern,
}

/// A [`Field`] that has been checked, and whose templates and constants
/// contain no operator the field itself redefines
#[derive(Debug, Clone)]
pub struct ReadyField {
    rules: [Option<Rule>; 5],
    supplied: OpSet,
    zero: Tree,
    one: Tree,
}

// # IMPLEMENTATIONS //

impl Field {
    /// A field with no operator templates yet
    pub fn new(zero: impl Into<Tree>, one: impl Into<Tree>) -> Self {
        Field {
            plus: None,
            minus: None,
            times: None,
            divide: None,
            sqrt: None,
            zero: zero.into(),
            one: one.into(),
        }
    }

    /// Set the template of some operator
    pub fn with(mut self, op: FieldOp, template: Tree) -> Self {
        *self.slot_mut(op) = Some(template);
        self
    }

    /// The template of some operator, if the field defines one
    pub fn template(&self, op: FieldOp) -> Option<&Tree> {
        match op {
            FieldOp::Plus => self.plus.as_ref(),
            FieldOp::Minus => self.minus.as_ref(),
            FieldOp::Times => self.times.as_ref(),
            FieldOp::Divide => self.divide.as_ref(),
            FieldOp::Sqrt => self.sqrt.as_ref(),
        }
    }

    fn slot_mut(&mut self, op: FieldOp) -> &mut Option<Tree> {
        match op {
            FieldOp::Plus => &mut self.plus,
            FieldOp::Minus => &mut self.minus,
            FieldOp::Times => &mut self.times,
            FieldOp::Divide => &mut self.divide,
            FieldOp::Sqrt => &mut self.sqrt,
        }
    }

    /// The operators this field defines
    pub fn op_set(&self) -> OpSet {
        FieldOp::ALL
            .into_iter()
            .filter(|op| self.template(*op).is_some())
            .collect()
    }
}

/// What an abstract operator node looks like, as a pattern over its operands
fn operator_pattern(op: FieldOp) -> Pattern {
    let (x, y) = (var(LHS), var(RHS));
    match op {
        FieldOp::Plus => Pattern::new(x + y, [LHS, RHS]),
        FieldOp::Minus => Pattern::new(x - y, [LHS, RHS]),
        FieldOp::Times => Pattern::new(x * y, [LHS, RHS]),
        FieldOp::Divide => Pattern::new(x / y, [LHS, RHS]),
        FieldOp::Sqrt => Pattern::new(x.sqrt(), [LHS]),
    }
}

impl ReadyField {
    /// Check that `field` defines every mandatory operator, and rewrite its
    /// templates and constants until they contain no operator that the field
    /// redefines. Fails if that does not happen within
    /// [`GenConfig::max_rewrite_depth`] nested rewrites
    pub fn prepare(field: &Field, config: &GenConfig) -> Result<Self> {
        let supplied = field.op_set();
        if let Some(missing) = OpSet::required().difference(&supplied).iter().next() {
            return Err(ConfigurationError::MissingOperator(missing).into());
        }
        if let Some(t) = field.sqrt.as_ref().filter(|t| mentions(t, RHS)) {
            return Err(Error::PatternMismatch(format!(
                "the `sqrt` template `{t}` uses `{RHS}`, but a square root has a single operand"
            )));
        }

        let raw = ReadyField {
            rules: FieldOp::ALL.map(|op| {
                field.template(op).map(|t| Rule {
                    lhs: operator_pattern(op),
                    rhs: Pattern::new(t.clone(), operator_pattern(op).holes().to_vec()),
                })
            }),
            supplied: supplied.clone(),
            zero: field.zero.clone(),
            one: field.one.clone(),
        };

        // Templates may use abstract operators defined by other templates.
        // Resolve them now, so that instantiating a template never creates
        // anything left to rewrite
        let mut rules = raw.rules.clone();
        for (op, rule) in FieldOp::ALL.into_iter().zip(rules.iter_mut()) {
            if let Some(rule) = rule {
                let normalized = raw.rewrite_to_fixed_point(rule.rhs.tree(), 0, config)?;
                trace!(%op, template = %normalized, "field template normalized");
                rule.rhs = Pattern::new(normalized, rule.rhs.holes().to_vec());
            }
        }
        Ok(ReadyField {
            zero: raw.rewrite_to_fixed_point(&raw.zero, 0, config)?,
            one: raw.rewrite_to_fixed_point(&raw.one, 0, config)?,
            rules,
            supplied,
        })
    }

    fn rule(&self, op: FieldOp) -> Option<&Rule> {
        self.rules[op as usize].as_ref()
    }

    /// The operators this field redefines
    pub fn supplied(&self) -> &OpSet {
        &self.supplied
    }

    pub fn zero(&self) -> &Tree {
        &self.zero
    }

    pub fn one(&self) -> &Tree {
        &self.one
    }

    /// Rewrite with rules that may not be normalized yet: every replacement
    /// is rewritten again, one level deeper
    fn rewrite_to_fixed_point(&self, tree: &Tree, depth: usize, config: &GenConfig) -> Result<Tree> {
        let tree = tree.try_map_children(|c| self.rewrite_to_fixed_point(c, depth, config))?;
        match self.instantiate_rule(&tree)? {
            None => Ok(tree),
            Some((op, replaced)) => {
                if depth >= config.max_rewrite_depth {
                    return Err(ConfigurationError::RewriteLimitExceeded {
                        op,
                        limit: config.max_rewrite_depth,
                    }
                    .into());
                }
                self.rewrite_to_fixed_point(&replaced, depth + 1, config)
            }
        }
    }

    /// If `tree` is an operator this field redefines, return its replacement
    fn instantiate_rule(&self, tree: &Tree) -> Result<Option<(FieldOp, Tree)>> {
        if let Tree::UnaryOp(Domain::Field, UnOp::Neg, operand) = tree {
            return self.instantiate_rule(&(self.zero.clone() - operand.as_ref().clone()));
        }
        let Some((op, rule)) = tree.field_op().and_then(|op| Some((op, self.rule(op)?))) else {
            return Ok(None);
        };
        let bindings = rule.lhs.matches(tree).ok_or_else(|| {
            Error::PatternMismatch(format!("`{tree}` does not have the shape of `{op}`"))
        })?;
        Ok(Some((op, rule.rhs.instantiate(&bindings)?)))
    }

    /// Rewrite every abstract operator the field defines, bottom-up. Operands
    /// are rewritten before their operator, and templates are already at a
    /// fixed point, so each replacement is final
    pub fn apply(&self, tree: &Tree) -> Result<Tree> {
        let tree = tree.try_map_children(|c| self.apply(c))?;
        match self.instantiate_rule(&tree)? {
            None => Ok(tree),
            Some((_, replaced)) => {
                debug_assert!(
                    (replaced.op_set() & self.supplied.clone()).is_empty(),
                    "Instantiated template still contains operators to rewrite"
                );
                Ok(replaced)
            }
        }
    }
}

fn mentions(tree: &Tree, name: &str) -> bool {
    matches!(tree, Tree::Variable(v) if v == name)
        || tree.children().into_iter().any(|c| mentions(c, name))
}

/// Rewrite `tree` for `field`. No field means plain scalar arithmetic, for
/// which this is the identity
pub fn apply_field(tree: &Tree, field: Option<&ReadyField>) -> Result<Tree> {
    match field {
        None => Ok(tree.clone()),
        Some(field) => field.apply(tree),
    }
}

/// Bindings for the names `zero` and `one` usable in generated bodies
pub fn constants(field: Option<&ReadyField>) -> Bindings {
    match field {
        None => crate::bindings! {"zero" => real(0.0), "one" => real(1.0)},
        Some(f) => crate::bindings! {"zero" => f.zero().clone(), "one" => f.one().clone()},
    }
}

/// Whether the functions using `op` can be generated for `field`
pub fn supports(field: Option<&ReadyField>, op: FieldOp) -> bool {
    match field {
        None => true,
        Some(f) => f.supplied().contains(op),
    }
}
