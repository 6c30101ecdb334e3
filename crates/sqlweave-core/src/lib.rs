//! Core runtime for sqlweave: the segment model, the predicate/condition
//! compiler, statement assemblers, the example/probe matcher and the dialect
//! pagination rewriter.
//!
//! Compilation is pure and synchronous. Every builder lives for one statement
//! build and holds no process-wide state; the only shared input is the
//! read-only [`model::PropertyResolver`].
#![warn(unreachable_pub)]

pub mod dialect;
pub mod error;
pub mod model;
pub mod page;
pub mod query;
pub mod settings;
pub mod sql;
pub mod value;

// test
#[cfg(test)]
pub(crate) mod test_fixtures;

// re-exports
pub use error::InternalError as Error;
pub use sqlweave_config::DialectKind;

///
/// Prelude
///
/// Prelude contains only domain vocabulary.
/// No errors, renderers or rewriters are re-exported here.
///

pub mod prelude {
    pub use crate::{
        model::{EntityModel, PropertyModel, PropertyResolver, Schema},
        query::{
            condition::{Condition, Conditions, Conjunction},
            field::Field,
            predicate::{Predicate, PredicateType},
            probe::{ExampleMatcher, Probe, ProbeValue, Sample},
            statement::{Direction, QueryContext},
        },
        settings::Settings,
        sql::{ParamValue, Segment},
        value::{FieldValue, Value},
    };
}
