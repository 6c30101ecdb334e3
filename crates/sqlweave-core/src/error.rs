use sqlweave_config::ConfigError;
use std::fmt;
use thiserror::Error as ThisError;

///
/// CONSTANTS
///

/// Characters of SQL shown either side of a lexical error position.
const EXCERPT_RADIUS: usize = 20;

///
/// InternalError
///
/// Structured compilation error with a stable classification.
/// Every failure in this crate is a programmer or mapping error; nothing is
/// retried and nothing is transient.
///

#[derive(Debug, ThisError)]
#[error("{message}")]
pub struct InternalError {
    pub class: ErrorClass,
    pub origin: ErrorOrigin,
    pub message: String,

    /// Optional structured error detail.
    pub detail: Option<ErrorDetail>,
}

impl InternalError {
    pub fn new(class: ErrorClass, origin: ErrorOrigin, message: impl Into<String>) -> Self {
        Self {
            class,
            origin,
            message: message.into(),
            detail: None,
        }
    }

    /// Unresolved property paths and operators that make no sense on a mapping.
    pub(crate) fn mapping(origin: ErrorOrigin, message: impl Into<String>) -> Self {
        Self::new(ErrorClass::Mapping, origin, message)
    }

    /// Bound values do not match the operator's declared arity.
    pub(crate) fn arity(origin: ErrorOrigin, message: impl Into<String>) -> Self {
        Self::new(ErrorClass::Arity, origin, message)
    }

    pub(crate) fn unsupported(origin: ErrorOrigin, message: impl Into<String>) -> Self {
        Self::new(ErrorClass::Unsupported, origin, message)
    }

    /// Probe graph references an ancestor again.
    pub(crate) fn cycle(path: impl Into<String>) -> Self {
        let path = path.into();

        Self {
            class: ErrorClass::Cycle,
            origin: ErrorOrigin::Probe,
            message: format!("path '{path}' spans a cyclic property reference"),
            detail: Some(ErrorDetail::Cycle { path }),
        }
    }

    /// Lexical failure at `offset` of `sql`; the message carries the excerpt.
    pub(crate) fn lexical(sql: &str, offset: usize, message: impl Into<String>) -> Self {
        let excerpt = excerpt(sql, offset);

        Self {
            class: ErrorClass::Lexical,
            origin: ErrorOrigin::Page,
            message: format!(
                "{} at offset {offset} near '{excerpt}'",
                message.into()
            ),
            detail: Some(ErrorDetail::Lexical { offset, excerpt }),
        }
    }

    #[must_use]
    pub const fn is_cycle(&self) -> bool {
        matches!(self.class, ErrorClass::Cycle)
    }

    #[must_use]
    pub fn display_with_class(&self) -> String {
        format!("{}:{}: {}", self.origin, self.class, self.message)
    }
}

impl From<ConfigError> for InternalError {
    fn from(err: ConfigError) -> Self {
        Self::new(ErrorClass::Config, ErrorOrigin::Config, err.to_string())
    }
}

///
/// ErrorDetail
///

#[derive(Clone, Debug, Eq, PartialEq)]
#[remain::sorted]
pub enum ErrorDetail {
    Cycle { path: String },
    Lexical { offset: usize, excerpt: String },
}

///
/// ErrorClass
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ErrorClass {
    Mapping,
    Arity,
    Cycle,
    Lexical,
    Unsupported,
    Config,
}

impl fmt::Display for ErrorClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Mapping => "mapping",
            Self::Arity => "arity",
            Self::Cycle => "cycle",
            Self::Lexical => "lexical",
            Self::Unsupported => "unsupported",
            Self::Config => "config",
        };
        write!(f, "{label}")
    }
}

///
/// ErrorOrigin
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[remain::sorted]
pub enum ErrorOrigin {
    Config,
    Model,
    Page,
    Predicate,
    Probe,
    Statement,
    Template,
}

impl fmt::Display for ErrorOrigin {
    #[remain::check]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        #[remain::sorted]
        match self {
            Self::Config => write!(f, "config"),
            Self::Model => write!(f, "model"),
            Self::Page => write!(f, "page"),
            Self::Predicate => write!(f, "predicate"),
            Self::Probe => write!(f, "probe"),
            Self::Statement => write!(f, "statement"),
            Self::Template => write!(f, "template"),
        }
    }
}

// Clamp to char boundaries so multi-byte SQL never panics the slice.
fn excerpt(sql: &str, offset: usize) -> String {
    let mut start = offset.min(sql.len()).saturating_sub(EXCERPT_RADIUS);
    while !sql.is_char_boundary(start) {
        start -= 1;
    }

    let mut end = offset.saturating_add(EXCERPT_RADIUS).min(sql.len());
    while !sql.is_char_boundary(end) {
        end += 1;
    }

    sql[start..end].to_string()
}

///
/// TESTS
///
