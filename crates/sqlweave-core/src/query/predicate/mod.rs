//! Single comparisons and their compilation to SQL fragments.

mod compile;
mod kind;
mod part;

#[cfg(test)]
mod tests;

pub use compile::{CompileContext, PredicateResult};
pub use kind::{Arity, PredicateType};
pub use part::Part;

pub(crate) use compile::qualify;
pub(crate) use part::strip_any_suffix;

use crate::{
    query::field::FieldRef,
    sql::ParamValue,
    value::{FieldValue, Value},
};

///
/// Predicate
///
/// One comparison: `field OP value(s)`, or a raw fragment for
/// [`PredicateType::Custom`].
///

#[derive(Clone, Debug, PartialEq)]
pub struct Predicate {
    pub field: Option<String>,
    pub kind: PredicateType,
    pub values: Vec<ParamValue>,
    pub ignore_case: bool,
    /// Fragment of a custom predicate.
    pub sql: Option<String>,
}

impl Predicate {
    #[must_use]
    pub fn new(field: impl FieldRef, kind: PredicateType, values: Vec<ParamValue>) -> Self {
        Self {
            field: Some(field.path()),
            kind,
            values,
            ignore_case: false,
            sql: None,
        }
    }

    fn unary(field: impl FieldRef, kind: PredicateType, value: impl FieldValue) -> Self {
        Self::new(field, kind, vec![ParamValue::new(value)])
    }

    /// Raw fragment with `?N` / `:name` placeholders.
    #[must_use]
    pub fn custom(sql: &str, values: Vec<ParamValue>) -> Self {
        Self {
            field: None,
            kind: PredicateType::Custom,
            values,
            ignore_case: false,
            sql: Some(sql.to_string()),
        }
    }

    /// Raw fragment scoped to a field; the field names its parameters.
    #[must_use]
    pub fn custom_on(field: impl FieldRef, sql: &str, values: Vec<ParamValue>) -> Self {
        Self {
            field: Some(field.path()),
            ..Self::custom(sql, values)
        }
    }

    #[must_use]
    pub const fn ignore_case(mut self) -> Self {
        self.ignore_case = true;
        self
    }

    #[must_use]
    pub fn eq(field: impl FieldRef, value: impl FieldValue) -> Self {
        Self::unary(field, PredicateType::SimpleProperty, value)
    }

    #[must_use]
    pub fn ne(field: impl FieldRef, value: impl FieldValue) -> Self {
        Self::unary(field, PredicateType::NegatingSimpleProperty, value)
    }

    #[must_use]
    pub fn gt(field: impl FieldRef, value: impl FieldValue) -> Self {
        Self::unary(field, PredicateType::GreaterThan, value)
    }

    #[must_use]
    pub fn gte(field: impl FieldRef, value: impl FieldValue) -> Self {
        Self::unary(field, PredicateType::GreaterThanEqual, value)
    }

    #[must_use]
    pub fn lt(field: impl FieldRef, value: impl FieldValue) -> Self {
        Self::unary(field, PredicateType::LessThan, value)
    }

    #[must_use]
    pub fn lte(field: impl FieldRef, value: impl FieldValue) -> Self {
        Self::unary(field, PredicateType::LessThanEqual, value)
    }

    #[must_use]
    pub fn before(field: impl FieldRef, value: impl FieldValue) -> Self {
        Self::unary(field, PredicateType::Before, value)
    }

    #[must_use]
    pub fn after(field: impl FieldRef, value: impl FieldValue) -> Self {
        Self::unary(field, PredicateType::After, value)
    }

    #[must_use]
    pub fn between(field: impl FieldRef, low: impl FieldValue, high: impl FieldValue) -> Self {
        Self::new(
            field,
            PredicateType::Between,
            vec![ParamValue::new(low), ParamValue::new(high)],
        )
    }

    /// Membership in a collection value (`Vec<T>`, slices).
    #[must_use]
    pub fn in_list(field: impl FieldRef, values: impl FieldValue) -> Self {
        Self::unary(field, PredicateType::In, values)
    }

    #[must_use]
    pub fn not_in(field: impl FieldRef, values: impl FieldValue) -> Self {
        Self::unary(field, PredicateType::NotIn, values)
    }

    #[must_use]
    pub fn like(field: impl FieldRef, pattern: &str) -> Self {
        Self::unary(field, PredicateType::Like, pattern)
    }

    #[must_use]
    pub fn not_like(field: impl FieldRef, pattern: &str) -> Self {
        Self::unary(field, PredicateType::NotLike, pattern)
    }

    #[must_use]
    pub fn starting_with(field: impl FieldRef, value: impl FieldValue) -> Self {
        Self::unary(field, PredicateType::StartingWith, value)
    }

    #[must_use]
    pub fn ending_with(field: impl FieldRef, value: impl FieldValue) -> Self {
        Self::unary(field, PredicateType::EndingWith, value)
    }

    #[must_use]
    pub fn containing(field: impl FieldRef, value: impl FieldValue) -> Self {
        Self::unary(field, PredicateType::Containing, value)
    }

    #[must_use]
    pub fn not_containing(field: impl FieldRef, value: impl FieldValue) -> Self {
        Self::unary(field, PredicateType::NotContaining, value)
    }

    #[must_use]
    pub fn regex(field: impl FieldRef, pattern: &str) -> Self {
        Self::unary(field, PredicateType::Regex, pattern)
    }

    #[must_use]
    pub fn is_null(field: impl FieldRef) -> Self {
        Self::new(field, PredicateType::IsNull, Vec::new())
    }

    #[must_use]
    pub fn is_not_null(field: impl FieldRef) -> Self {
        Self::new(field, PredicateType::IsNotNull, Vec::new())
    }

    #[must_use]
    pub fn is_empty(field: impl FieldRef) -> Self {
        Self::new(field, PredicateType::IsEmpty, Vec::new())
    }

    #[must_use]
    pub fn is_not_empty(field: impl FieldRef) -> Self {
        Self::new(field, PredicateType::IsNotEmpty, Vec::new())
    }

    #[must_use]
    pub fn is_true(field: impl FieldRef) -> Self {
        Self::new(field, PredicateType::True, Vec::new())
    }

    #[must_use]
    pub fn is_false(field: impl FieldRef) -> Self {
        Self::new(field, PredicateType::False, Vec::new())
    }

    /// First bound value, if any.
    #[must_use]
    pub fn value(&self) -> Option<&Value> {
        self.values.first().map(|p| &p.value)
    }
}
