//! ## Crate layout
//! - `config`: TOML configuration model and loader.
//! - `core`: segment model, predicate/condition compiler, statement
//!   assemblers, the example/probe matcher and the pagination rewriter.
//!
//! The `prelude` module carries the vocabulary needed to describe and compile
//! statements; errors and rewriters stay under `core`.

pub use sqlweave_config as config;
pub use sqlweave_core as core;

//
// Consts
//

/// Workspace version re-export for downstream tooling/tests.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub use core::Error;

///
/// Prelude
///

pub mod prelude {
    pub use crate::config::{Config, DialectKind};
    pub use crate::core::{
        page::RowSelection,
        prelude::*,
        query::{Statement, StatementKind, StringMatcher},
    };
}
