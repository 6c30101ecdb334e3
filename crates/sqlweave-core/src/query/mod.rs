//! Query construction: predicates and condition chains, statement
//! assemblers and the example/probe matcher.

pub mod condition;
pub mod field;
pub mod join;
pub mod predicate;
pub mod probe;
pub mod statement;

pub use condition::{Condition, Conditions, Conjunction};
pub use field::{Field, FieldRef};
pub use join::Connectors;
pub use predicate::{CompileContext, Predicate, PredicateResult, PredicateType};
pub use probe::{
    ExampleMatcher, NullHandler, Probe, ProbeConditions, ProbeValue, Sample, StringMatcher,
};
pub use statement::{Direction, QueryContext, Statement, StatementKind};
