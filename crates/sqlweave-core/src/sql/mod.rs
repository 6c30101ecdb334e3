//! Rendering-only SQL fragments and parameter plumbing.

pub mod escape;
pub mod param;
pub mod segment;
pub mod template;


pub use escape::{LikeShape, escape_like};
pub use param::{BoundSql, ParamSet, ParamSink, ParamValue};
pub use segment::{Binding, Segment, Test};
pub use template::{Placeholder, parse};
