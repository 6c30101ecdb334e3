//! Entity metadata consumed by the compiler.
//!
//! The compiler never reflects over user types; it reads this model through
//! the [`PropertyResolver`] seam. [`Schema`] is the in-memory implementation.

pub mod entity;
pub mod property;
pub mod resolver;


pub use entity::{EntityModel, SequenceGenerator};
pub use property::{
    AssociationModel, CollectionModel, GeneratedValue, GenerationType, JoinColumn, JoinTable,
    PropertyKind, PropertyModel,
};
pub use resolver::{JoinHop, PropertyResolver, ResolvedPath, Schema};
