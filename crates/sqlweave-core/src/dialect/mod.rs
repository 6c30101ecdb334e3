//! Vendor descriptors: quoting, LIKE escaping, booleans, regex predicates,
//! generated keys and the pagination family.


use crate::{
    error::{ErrorOrigin, InternalError},
    page::LimitHandler,
    sql::Segment,
};
use sqlweave_config::DialectKind;

///
/// CONSTANTS
///

pub const DEFAULT_ESCAPE_CHAR: char = '\\';

///
/// Dialect
///
/// Everything the compiler needs to know about one database vendor.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Dialect {
    pub kind: DialectKind,
    pub quote: (char, char),
    pub escape_char: char,
    pub lower_function: &'static str,
    pub supports_boolean: bool,
    pub regex: RegexStyle,
    pub identity: IdentityStyle,
    pub sequence: SequenceStyle,
    pub limit_handler: LimitHandler,
}

impl Dialect {
    #[must_use]
    pub const fn new(kind: DialectKind) -> Self {
        let base = Self {
            kind,
            quote: ('"', '"'),
            escape_char: DEFAULT_ESCAPE_CHAR,
            lower_function: "LOWER",
            supports_boolean: true,
            regex: RegexStyle::Unsupported,
            identity: IdentityStyle::Unsupported,
            sequence: SequenceStyle::Unsupported,
            limit_handler: LimitHandler::LimitOffset,
        };

        match kind {
            DialectKind::H2 => Self {
                regex: RegexStyle::Function("REGEXP_LIKE"),
                identity: IdentityStyle::Select("SELECT IDENTITY()"),
                sequence: SequenceStyle::NextValueFor,
                ..base
            },
            DialectKind::MySql => Self {
                quote: ('`', '`'),
                regex: RegexStyle::Infix("REGEXP"),
                identity: IdentityStyle::Select("SELECT LAST_INSERT_ID()"),
                limit_handler: LimitHandler::MySqlLimit,
                ..base
            },
            DialectKind::Oracle => Self {
                supports_boolean: false,
                regex: RegexStyle::Function("REGEXP_LIKE"),
                sequence: SequenceStyle::Nextval,
                limit_handler: LimitHandler::Rownum,
                ..base
            },
            DialectKind::Oracle12c => Self {
                supports_boolean: false,
                regex: RegexStyle::Function("REGEXP_LIKE"),
                sequence: SequenceStyle::Nextval,
                limit_handler: LimitHandler::OffsetFetch,
                ..base
            },
            DialectKind::Postgres => Self {
                regex: RegexStyle::Infix("~"),
                identity: IdentityStyle::SerialSequence,
                sequence: SequenceStyle::NextvalFunction,
                ..base
            },
            DialectKind::Sqlite => Self {
                supports_boolean: false,
                regex: RegexStyle::Infix("REGEXP"),
                identity: IdentityStyle::Select("SELECT last_insert_rowid()"),
                ..base
            },
            DialectKind::SqlServer => Self {
                quote: ('[', ']'),
                supports_boolean: false,
                identity: IdentityStyle::Select("SELECT SCOPE_IDENTITY()"),
                limit_handler: LimitHandler::Top,
                ..base
            },
            DialectKind::SqlServer2005 => Self {
                quote: ('[', ']'),
                supports_boolean: false,
                identity: IdentityStyle::Select("SELECT SCOPE_IDENTITY()"),
                limit_handler: LimitHandler::SqlServer2005,
                ..base
            },
            DialectKind::SqlServer2012 => Self {
                quote: ('[', ']'),
                supports_boolean: false,
                identity: IdentityStyle::Select("SELECT SCOPE_IDENTITY()"),
                sequence: SequenceStyle::NextValueFor,
                limit_handler: LimitHandler::SqlServer2012,
                ..base
            },
        }
    }

    #[must_use]
    pub const fn with_escape_char(mut self, escape_char: char) -> Self {
        self.escape_char = escape_char;
        self
    }

    /// Quote one identifier part.
    #[must_use]
    pub fn quote(&self, ident: &str) -> String {
        let (open, close) = self.quote;
        format!("{open}{ident}{close}")
    }

    /// Escape character as a SQL string literal for an `ESCAPE` clause.
    #[must_use]
    pub fn escape_literal(&self) -> String {
        match (self.kind, self.escape_char) {
            // MySQL string literals treat backslash as an escape themselves
            (DialectKind::MySql, '\\') => r"'\\'".to_string(),
            (_, '\'') => "''''".to_string(),
            (_, c) => format!("'{c}'"),
        }
    }

    #[must_use]
    pub const fn boolean_literal(&self, value: bool) -> &'static str {
        match (self.supports_boolean, value) {
            (true, true) => "TRUE",
            (true, false) => "FALSE",
            (false, true) => "1",
            (false, false) => "0",
        }
    }

    #[must_use]
    pub fn lower(&self, segment: Segment) -> Segment {
        Segment::function(self.lower_function, vec![segment])
    }

    /// Regex predicate over `column` and `pattern`.
    pub fn regex(&self, column: Segment, pattern: Segment) -> Result<Segment, InternalError> {
        match self.regex {
            RegexStyle::Infix(op) => Ok(Segment::spaced(vec![
                column,
                Segment::literal(op),
                pattern,
            ])),
            RegexStyle::Function(name) => Ok(Segment::function(name, vec![column, pattern])),
            RegexStyle::Unsupported => Err(InternalError::unsupported(
                ErrorOrigin::Predicate,
                format!("dialect '{}' has no regular expression predicate", self.kind),
            )),
        }
    }

    /// Statement fetching the key generated by the last identity insert.
    pub fn identity_select(&self, table: &str, column: &str) -> Result<String, InternalError> {
        match self.identity {
            IdentityStyle::Select(sql) => Ok(sql.to_string()),
            IdentityStyle::SerialSequence => Ok(format!(
                "SELECT currval(pg_get_serial_sequence('{table}', '{column}'))"
            )),
            IdentityStyle::Unsupported => Err(InternalError::unsupported(
                ErrorOrigin::Statement,
                format!("dialect '{}' cannot select identity keys", self.kind),
            )),
        }
    }

    /// Statement fetching the next value of `sequence`.
    pub fn sequence_select(&self, sequence: &str) -> Result<String, InternalError> {
        match self.sequence {
            SequenceStyle::NextvalFunction => Ok(format!("SELECT nextval('{sequence}')")),
            SequenceStyle::NextValueFor => Ok(format!("SELECT NEXT VALUE FOR {sequence}")),
            SequenceStyle::Nextval => Ok(format!("SELECT {sequence}.NEXTVAL FROM DUAL")),
            SequenceStyle::Unsupported => Err(InternalError::unsupported(
                ErrorOrigin::Statement,
                format!("dialect '{}' has no sequences", self.kind),
            )),
        }
    }
}

impl Default for Dialect {
    fn default() -> Self {
        Self::new(DialectKind::default())
    }
}

///
/// RegexStyle
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum RegexStyle {
    /// `column OP pattern`
    Infix(&'static str),
    /// `NAME(column, pattern)`
    Function(&'static str),
    Unsupported,
}

///
/// IdentityStyle
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum IdentityStyle {
    Select(&'static str),
    /// `currval` of the column's serial sequence.
    SerialSequence,
    Unsupported,
}

///
/// SequenceStyle
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum SequenceStyle {
    /// `nextval('seq')`
    NextvalFunction,
    /// `NEXT VALUE FOR seq`
    NextValueFor,
    /// `seq.NEXTVAL FROM DUAL`
    Nextval,
    Unsupported,
}
