use crate::error::InternalError;
use regex::Regex;
use std::{ops::Range, sync::LazyLock};

///
/// KEYWORDS
///

pub(crate) static SELECT: LazyLock<Regex> =
    LazyLock::new(|| keyword(r"select(?:\s+distinct)?"));
pub(crate) static FROM: LazyLock<Regex> = LazyLock::new(|| keyword("from"));
pub(crate) static ORDER_BY: LazyLock<Regex> = LazyLock::new(|| keyword(r"order\s+by"));
pub(crate) static FOR_UPDATE: LazyLock<Regex> = LazyLock::new(|| keyword(r"for\s+update"));

// Case-insensitive, word-bounded; only called with the literals above.
fn keyword(pattern: &str) -> Regex {
    Regex::new(&format!(r"(?i)\b{pattern}\b")).expect("keyword pattern compiles")
}

///
/// Scanner
///
/// Lexical view of one SQL string: the byte ranges of every top-level
/// parenthesised group and every string literal outside those groups.
/// Matches that start inside either kind of range are invisible to the
/// shallow searches.
///

#[derive(Debug)]
pub struct Scanner<'a> {
    sql: &'a str,
    groups: Vec<Range<usize>>,
    literals: Vec<Range<usize>>,
}

impl<'a> Scanner<'a> {
    /// Linear scan tracking paren depth. Quotes toggle literal state and a
    /// doubled quote closes and reopens a literal. Backslashes are plain text.
    pub fn new(sql: &'a str) -> Result<Self, InternalError> {
        let mut groups = Vec::new();
        let mut literals = Vec::new();
        let mut opens: Vec<usize> = Vec::new();
        let mut literal_start: Option<usize> = None;

        for (i, c) in sql.char_indices() {
            if let Some(start) = literal_start {
                if c == '\'' {
                    if opens.is_empty() {
                        literals.push(start..i + 1);
                    }
                    literal_start = None;
                }
                continue;
            }

            match c {
                '\'' => literal_start = Some(i),
                '(' => opens.push(i),
                ')' => {
                    let open = opens.pop().ok_or_else(|| {
                        InternalError::lexical(sql, i, "unmatched ')'")
                    })?;
                    if opens.is_empty() {
                        groups.push(open..i + 1);
                    }
                }
                _ => {}
            }
        }

        if let Some(start) = literal_start {
            return Err(InternalError::lexical(sql, start, "unterminated string literal"));
        }
        if let Some(&open) = opens.first() {
            return Err(InternalError::lexical(sql, open, "unmatched '('"));
        }

        Ok(Self {
            sql,
            groups,
            literals,
        })
    }

    #[must_use]
    pub const fn sql(&self) -> &'a str {
        self.sql
    }

    /// True when `index` falls inside a top-level group or a literal.
    #[must_use]
    pub fn is_nested(&self, index: usize) -> bool {
        self.groups
            .iter()
            .chain(self.literals.iter())
            .any(|range| range.contains(&index))
    }

    /// Top-level group opened at `open`.
    #[must_use]
    pub fn group_at(&self, open: usize) -> Option<Range<usize>> {
        self.groups.iter().find(|range| range.start == open).cloned()
    }

    /// First shallow match at or after `from`.
    #[must_use]
    pub fn find(&self, pattern: &Regex, from: usize) -> Option<Range<usize>> {
        pattern
            .find_iter(self.sql)
            .map(|m| m.range())
            .find(|range| range.start >= from && !self.is_nested(range.start))
    }

    /// Last shallow match in the whole string.
    #[must_use]
    pub fn rfind(&self, pattern: &Regex) -> Option<Range<usize>> {
        pattern
            .find_iter(self.sql)
            .map(|m| m.range())
            .filter(|range| !self.is_nested(range.start))
            .last()
    }

    /// Split `range` on shallow occurrences of `separator`.
    #[must_use]
    pub fn split(&self, range: Range<usize>, separator: char) -> Vec<Range<usize>> {
        let mut parts = Vec::new();
        let mut start = range.start;

        for (i, c) in self.sql[range.clone()].char_indices() {
            let at = range.start + i;
            if c == separator && !self.is_nested(at) {
                parts.push(start..at);
                start = at + c.len_utf8();
            }
        }
        parts.push(start..range.end);

        parts
    }
}

/// Index of the first match of `pattern` at or after `from` that is not
/// inside a parenthesised group or a string literal.
pub fn shallow_find(sql: &str, pattern: &Regex, from: usize) -> Result<Option<usize>, InternalError> {
    Ok(Scanner::new(sql)?.find(pattern, from).map(|range| range.start))
}

/// Index of the last shallow match of `pattern`.
pub fn shallow_rfind(sql: &str, pattern: &Regex) -> Result<Option<usize>, InternalError> {
    Ok(Scanner::new(sql)?.rfind(pattern).map(|range| range.start))
}
