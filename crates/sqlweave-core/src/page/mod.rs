//! Vendor pagination rewriting over already-rendered SQL.
//!
//! Each dialect's syntax is one [`LimitHandler`] variant. Handlers locate
//! statement-level keywords with the shallow [`scan`] primitives and never
//! parse SQL beyond that.

mod cte;
mod limit;
mod oracle;
pub mod scan;
mod sqlserver;

#[cfg(test)]
mod tests;

pub use cte::Cte;
pub use scan::{Scanner, shallow_find, shallow_rfind};

use crate::error::{ErrorOrigin, InternalError};
use std::fmt;
use tracing::trace;

///
/// PageBound
///
/// One paging operand: a literal row count or a placeholder bound at
/// execution time and rendered as `#{name}`.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum PageBound {
    Literal(u64),
    Placeholder(String),
    /// Pre-rendered arithmetic over other bounds.
    Expr(String),
}

impl PageBound {
    #[must_use]
    pub fn placeholder(name: &str) -> Self {
        Self::Placeholder(name.to_string())
    }

    /// Literal zero; an offset equal to zero skips nothing.
    #[must_use]
    pub const fn is_zero(&self) -> bool {
        matches!(self, Self::Literal(0))
    }

    /// `self + n` as SQL text.
    #[must_use]
    pub fn plus(&self, n: u64) -> String {
        match self {
            Self::Literal(v) => v.saturating_add(n).to_string(),
            Self::Placeholder(_) | Self::Expr(_) => format!("{self} + {n}"),
        }
    }

    /// `self + other`, folded when both are literal.
    #[must_use]
    pub fn sum(&self, other: &Self) -> Self {
        match (self, other) {
            (Self::Literal(a), Self::Literal(b)) => Self::Literal(a.saturating_add(*b)),
            _ => Self::Expr(format!("{self} + {other}")),
        }
    }
}

impl fmt::Display for PageBound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Literal(v) => write!(f, "{v}"),
            Self::Placeholder(name) => write!(f, "#{{{name}}}"),
            Self::Expr(expr) => write!(f, "{expr}"),
        }
    }
}

///
/// RowSelection
///
/// Window requested by the caller. Literal selections always satisfy
/// `last_row == first_row + max_rows`.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum RowSelection {
    Literal {
        first_row: u64,
        max_rows: u64,
    },
    Templated {
        first_row: String,
        max_rows: String,
        last_row: String,
    },
}

impl RowSelection {
    pub const DEFAULT_FIRST_ROW: &'static str = "offset";
    pub const DEFAULT_MAX_ROWS: &'static str = "pageSize";
    pub const DEFAULT_LAST_ROW: &'static str = "offsetEnd";

    #[must_use]
    pub const fn literal(first_row: u64, max_rows: u64) -> Self {
        Self::Literal {
            first_row,
            max_rows,
        }
    }

    /// Placeholder window using the conventional parameter names.
    #[must_use]
    pub fn templated() -> Self {
        Self::Templated {
            first_row: Self::DEFAULT_FIRST_ROW.to_string(),
            max_rows: Self::DEFAULT_MAX_ROWS.to_string(),
            last_row: Self::DEFAULT_LAST_ROW.to_string(),
        }
    }

    #[must_use]
    pub fn first_row(&self) -> PageBound {
        match self {
            Self::Literal { first_row, .. } => PageBound::Literal(*first_row),
            Self::Templated { first_row, .. } => PageBound::placeholder(first_row),
        }
    }

    #[must_use]
    pub fn max_rows(&self) -> PageBound {
        match self {
            Self::Literal { max_rows, .. } => PageBound::Literal(*max_rows),
            Self::Templated { max_rows, .. } => PageBound::placeholder(max_rows),
        }
    }

    #[must_use]
    pub fn last_row(&self) -> PageBound {
        match self {
            Self::Literal {
                first_row,
                max_rows,
            } => PageBound::Literal(first_row.saturating_add(*max_rows)),
            Self::Templated { last_row, .. } => PageBound::placeholder(last_row),
        }
    }
}

///
/// LimitHandler
///
/// Pagination syntax family of one dialect.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum LimitHandler {
    /// `LIMIT n OFFSET o` (PostgreSQL, H2, SQLite).
    LimitOffset,
    /// `LIMIT o, n` (MySQL).
    MySqlLimit,
    /// `SELECT TOP n` without offset support (SQL Server 2000).
    Top,
    /// `ROW_NUMBER()` window over a wrapped query.
    SqlServer2005,
    /// Native `OFFSET/FETCH` after a top-level `ORDER BY`, else 2005 style.
    SqlServer2012,
    /// Nested `ROWNUM` wrappers (Oracle before 12c).
    Rownum,
    /// `OFFSET o ROWS FETCH NEXT n ROWS ONLY` (Oracle 12c).
    OffsetFetch,
}

impl LimitHandler {
    /// Rewrite `sql` for the requested window.
    ///
    /// `offset` absent or literal zero means no rows are skipped;
    /// `offset_end` defaults to `offset + fetch`. Without a fetch size the
    /// statement is returned unchanged.
    pub fn process_sql(
        self,
        sql: &str,
        offset: Option<&PageBound>,
        fetch: Option<&PageBound>,
        offset_end: Option<&PageBound>,
    ) -> Result<String, InternalError> {
        let sql = strip_terminator(sql);
        let offset = offset.filter(|o| !o.is_zero());

        let Some(fetch) = fetch else {
            if offset.is_some() {
                return Err(InternalError::unsupported(
                    ErrorOrigin::Page,
                    format!("{self} pagination needs a fetch size when an offset is given"),
                ));
            }
            return Ok(sql.to_string());
        };

        let window = Window {
            offset,
            fetch,
            end: offset_end.cloned().unwrap_or_else(|| match offset {
                Some(o) => o.sum(fetch),
                None => fetch.clone(),
            }),
        };

        let rewritten = match self {
            Self::LimitOffset => limit::limit_offset(sql, &window)?,
            Self::MySqlLimit => limit::mysql(sql, &window)?,
            Self::Top => sqlserver::top(sql, &window)?,
            Self::SqlServer2005 => sqlserver::row_number(sql, &window)?,
            Self::SqlServer2012 => sqlserver::offset_fetch(sql, &window)?,
            Self::Rownum => oracle::rownum(sql, &window)?,
            Self::OffsetFetch => oracle::offset_fetch(sql, &window)?,
        };

        trace!(
            handler = %self,
            input_len = sql.len(),
            output_len = rewritten.len(),
            "pagination rewrite"
        );

        Ok(rewritten)
    }

    /// Rewrite `sql` for a [`RowSelection`].
    pub fn apply(self, sql: &str, selection: &RowSelection) -> Result<String, InternalError> {
        self.process_sql(
            sql,
            Some(&selection.first_row()),
            Some(&selection.max_rows()),
            Some(&selection.last_row()),
        )
    }
}

impl fmt::Display for LimitHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::LimitOffset => "limit-offset",
            Self::MySqlLimit => "mysql-limit",
            Self::Top => "top",
            Self::SqlServer2005 => "sqlserver2005",
            Self::SqlServer2012 => "sqlserver2012",
            Self::Rownum => "rownum",
            Self::OffsetFetch => "offset-fetch",
        };
        write!(f, "{label}")
    }
}

///
/// Window
/// Normalised operands handed to each handler.
///

#[derive(Debug)]
pub(crate) struct Window<'a> {
    pub(crate) offset: Option<&'a PageBound>,
    pub(crate) fetch: &'a PageBound,
    pub(crate) end: PageBound,
}

fn strip_terminator(sql: &str) -> &str {
    sql.trim().trim_end_matches(';').trim_end()
}

/// Split off a trailing top-level `FOR UPDATE ...` locking clause.
pub(crate) fn split_locking(scanner: &Scanner<'_>) -> (String, Option<String>) {
    let sql = scanner.sql();

    match scanner.rfind(&scan::FOR_UPDATE) {
        Some(range) => (
            sql[..range.start].trim_end().to_string(),
            Some(sql[range.start..].trim().to_string()),
        ),
        None => (sql.to_string(), None),
    }
}

/// Re-attach a locking clause split off by [`split_locking`].
pub(crate) fn with_locking(head: String, locking: Option<String>) -> String {
    match locking {
        Some(lock) => format!("{head} {lock}"),
        None => head,
    }
}
