//! AND/OR chains of predicates.
//!
//! A [`Conditions`] builder is an append-only list of `(conjunction, node)`
//! entries. Siblings are rendered left to right with no parentheses added;
//! a nested builder is flattened into the same chain unless it was added
//! through [`Conditions::group`], which wraps it in parentheses.

mod derived;


use crate::{
    error::InternalError,
    query::{
        field::FieldRef,
        join::Connectors,
        predicate::{CompileContext, Predicate, PredicateResult},
    },
    sql::{ParamSink, ParamValue, Segment},
    value::FieldValue,
};
use std::fmt;

///
/// Conjunction
///

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum Conjunction {
    #[default]
    And,
    Or,
}

impl fmt::Display for Conjunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::And => write!(f, "AND"),
            Self::Or => write!(f, "OR"),
        }
    }
}

///
/// Condition
///
/// A head predicate followed by conjunction-linked siblings. The condition's
/// group number and each predicate's position only disambiguate generated
/// parameter names.
///

#[derive(Clone, Debug, PartialEq)]
pub struct Condition {
    head: Predicate,
    tail: Vec<(Conjunction, Predicate)>,
}

impl Condition {
    #[must_use]
    pub const fn new(head: Predicate) -> Self {
        Self {
            head,
            tail: Vec::new(),
        }
    }

    #[must_use]
    pub fn and(mut self, predicate: Predicate) -> Self {
        self.tail.push((Conjunction::And, predicate));
        self
    }

    #[must_use]
    pub fn or(mut self, predicate: Predicate) -> Self {
        self.tail.push((Conjunction::Or, predicate));
        self
    }

    pub fn push(&mut self, conjunction: Conjunction, predicate: Predicate) {
        self.tail.push((conjunction, predicate));
    }

    pub fn predicates(&self) -> impl Iterator<Item = &Predicate> {
        std::iter::once(&self.head).chain(self.tail.iter().map(|(_, p)| p))
    }

    pub fn compile(
        &mut self,
        ctx: &CompileContext<'_>,
        group: usize,
        sink: &mut dyn ParamSink,
    ) -> Result<PredicateResult, InternalError> {
        let head = self.head.compile(ctx, group, 0, sink)?;
        let mut parts = vec![head.segment];
        let mut connectors = head.connectors;

        for (i, (conjunction, predicate)) in self.tail.iter_mut().enumerate() {
            let result = predicate.compile(ctx, group, i + 1, sink)?;
            parts.push(Segment::literal(format!(" {conjunction} ")));
            parts.push(result.segment);
            connectors.extend(result.connectors);
        }

        Ok(PredicateResult {
            segment: Segment::Composite(parts),
            connectors,
        })
    }
}

impl From<Predicate> for Condition {
    fn from(predicate: Predicate) -> Self {
        Self::new(predicate)
    }
}

///
/// Node
///

#[derive(Clone, Debug, PartialEq)]
enum Node {
    Condition(Condition),
    /// Flattened into the parent chain.
    Nested(Conditions),
    /// Wrapped in parentheses.
    Group(Conditions),
}

///
/// Conditions
///
/// Builder for a WHERE clause body.
///
/// ```ignore
/// let where_ = Conditions::new()
///     .eq("lastname", "Doe")
///     .or()
///     .group(|g| g.gt("age", 18).lt("age", 65));
/// ```
///

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Conditions {
    entries: Vec<(Conjunction, Node)>,
    pending: Conjunction,
}

macro_rules! value_ops {
    ($($name:ident),* $(,)?) => {
        $(
            #[must_use]
            pub fn $name(self, field: impl FieldRef, value: impl FieldValue) -> Self {
                self.predicate(Predicate::$name(field, value))
            }
        )*
    };
}

macro_rules! pattern_ops {
    ($($name:ident),* $(,)?) => {
        $(
            #[must_use]
            pub fn $name(self, field: impl FieldRef, pattern: &str) -> Self {
                self.predicate(Predicate::$name(field, pattern))
            }
        )*
    };
}

macro_rules! nullary_ops {
    ($($name:ident),* $(,)?) => {
        $(
            #[must_use]
            pub fn $name(self, field: impl FieldRef) -> Self {
                self.predicate(Predicate::$name(field))
            }
        )*
    };
}

impl Conditions {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a derived name such as `findByLastnameAndAgeGreaterThan`,
    /// consuming `args` in order according to each operator's arity.
    pub fn from_derived(name: &str, args: Vec<ParamValue>) -> Result<Self, InternalError> {
        derived::parse(name, args)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.iter().all(|(_, node)| match node {
            Node::Condition(_) => false,
            Node::Nested(inner) | Node::Group(inner) => inner.is_empty(),
        })
    }

    /// Join the next entry with AND (the default).
    #[must_use]
    pub const fn and(mut self) -> Self {
        self.pending = Conjunction::And;
        self
    }

    /// Join the next entry with OR.
    #[must_use]
    pub const fn or(mut self) -> Self {
        self.pending = Conjunction::Or;
        self
    }

    /// Append to the open condition, opening one if needed.
    #[must_use]
    pub fn predicate(mut self, predicate: Predicate) -> Self {
        let conjunction = self.take_pending();
        match self.entries.last_mut() {
            Some((_, Node::Condition(open))) => open.push(conjunction, predicate),
            _ => self
                .entries
                .push((conjunction, Node::Condition(Condition::new(predicate)))),
        }
        self
    }

    #[must_use]
    pub fn add(mut self, conjunction: Conjunction, predicate: Predicate) -> Self {
        self.pending = conjunction;
        self.predicate(predicate)
    }

    /// Append a whole condition as a new entry.
    #[must_use]
    pub fn condition(mut self, condition: Condition) -> Self {
        let conjunction = self.take_pending();
        self.entries.push((conjunction, Node::Condition(condition)));
        self
    }

    /// Append a sub-builder flattened into this chain, without parentheses.
    #[must_use]
    pub fn nest(mut self, build: impl FnOnce(Self) -> Self) -> Self {
        let conjunction = self.take_pending();
        self.entries
            .push((conjunction, Node::Nested(build(Self::new()))));
        self
    }

    /// Append a parenthesized sub-builder.
    #[must_use]
    pub fn group(mut self, build: impl FnOnce(Self) -> Self) -> Self {
        let conjunction = self.take_pending();
        self.entries
            .push((conjunction, Node::Group(build(Self::new()))));
        self
    }

    #[must_use]
    pub fn custom(self, sql: &str, values: Vec<ParamValue>) -> Self {
        self.predicate(Predicate::custom(sql, values))
    }

    #[must_use]
    pub fn between(
        self,
        field: impl FieldRef,
        low: impl FieldValue,
        high: impl FieldValue,
    ) -> Self {
        self.predicate(Predicate::between(field, low, high))
    }

    value_ops!(
        eq,
        ne,
        gt,
        gte,
        lt,
        lte,
        before,
        after,
        in_list,
        not_in,
        starting_with,
        ending_with,
        containing,
        not_containing,
    );

    pattern_ops!(like, not_like, regex);

    nullary_ops!(is_null, is_not_null, is_true, is_false);

    /// Collection property has no elements.
    #[must_use]
    pub fn is_empty_collection(self, field: impl FieldRef) -> Self {
        self.predicate(Predicate::is_empty(field))
    }

    #[must_use]
    pub fn is_not_empty_collection(self, field: impl FieldRef) -> Self {
        self.predicate(Predicate::is_not_empty(field))
    }

    fn take_pending(&mut self) -> Conjunction {
        std::mem::replace(&mut self.pending, Conjunction::And)
    }

    /// Compile every entry; groups are numbered depth-first from zero.
    pub fn compile(
        &mut self,
        ctx: &CompileContext<'_>,
        sink: &mut dyn ParamSink,
    ) -> Result<PredicateResult, InternalError> {
        let mut group = 0;
        self.compile_from(ctx, &mut group, sink)
    }

    fn compile_from(
        &mut self,
        ctx: &CompileContext<'_>,
        group: &mut usize,
        sink: &mut dyn ParamSink,
    ) -> Result<PredicateResult, InternalError> {
        let mut parts = Vec::new();
        let mut connectors = Connectors::new();

        for (conjunction, node) in &mut self.entries {
            let result = match node {
                Node::Condition(condition) => {
                    let current = *group;
                    *group += 1;
                    condition.compile(ctx, current, sink)?
                }
                Node::Nested(inner) => inner.compile_from(ctx, group, sink)?,
                Node::Group(inner) => {
                    let result = inner.compile_from(ctx, group, sink)?;
                    PredicateResult {
                        segment: Segment::group(result.segment),
                        connectors: result.connectors,
                    }
                }
            };

            if is_blank(&result.segment) {
                continue;
            }
            if !parts.is_empty() {
                parts.push(Segment::literal(format!(" {conjunction} ")));
            }
            parts.push(result.segment);
            connectors.extend(result.connectors);
        }

        Ok(PredicateResult {
            segment: Segment::Composite(parts),
            connectors,
        })
    }
}

// empty chains, including parenthesized empty chains
fn is_blank(segment: &Segment) -> bool {
    match segment {
        Segment::Group(inner) => is_blank(inner),
        other => other.is_empty_literal(),
    }
}
