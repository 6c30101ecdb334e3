use crate::{error::InternalError, page::scan::Scanner};

///
/// Cte
///
/// Split of a statement into its `WITH` prelude and the main query body.
/// `prelude` ends right after the last CTE's closing parenthesis; `body`
/// starts at the first token of the main query.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Cte<'a> {
    pub prelude: Option<&'a str>,
    pub body: &'a str,
    pub body_offset: usize,
}

impl<'a> Cte<'a> {
    pub fn parse(scanner: &Scanner<'a>) -> Result<Self, InternalError> {
        let sql = scanner.sql();
        let mut cursor = Cursor { sql, pos: 0 };

        cursor.skip_ws();
        if !cursor.eat_word("with") {
            let body_offset = cursor.pos;
            return Ok(Self {
                prelude: None,
                body: &sql[body_offset..],
                body_offset,
            });
        }
        cursor.skip_ws();
        if cursor.eat_word("recursive") {
            cursor.skip_ws();
        }

        loop {
            if cursor.ident().is_none() {
                return Err(cursor.error("expected common table expression name"));
            }
            cursor.skip_ws();

            // optional column list
            if cursor.peek() == Some('(') {
                cursor.skip_group(scanner)?;
                cursor.skip_ws();
            }

            if !cursor.eat_word("as") {
                return Err(cursor.error("expected AS"));
            }
            cursor.skip_ws();
            if cursor.eat_word("materialized") {
                cursor.skip_ws();
            } else if cursor.eat_word("not") {
                cursor.skip_ws();
                if !cursor.eat_word("materialized") {
                    return Err(cursor.error("expected MATERIALIZED"));
                }
                cursor.skip_ws();
            }

            if cursor.peek() != Some('(') {
                return Err(cursor.error("expected '(' after AS"));
            }
            cursor.skip_group(scanner)?;
            let prelude_end = cursor.pos;
            cursor.skip_ws();

            if cursor.peek() == Some(',') {
                cursor.pos += 1;
                cursor.skip_ws();
                continue;
            }
            if cursor.at_end() {
                return Err(cursor.error("expected main query after common table expressions"));
            }
            if !cursor.at_word("select") {
                return Err(cursor.error("expected ',' between common table expressions"));
            }

            return Ok(Self {
                prelude: Some(&sql[..prelude_end]),
                body: &sql[cursor.pos..],
                body_offset: cursor.pos,
            });
        }
    }
}

///
/// Cursor
///

struct Cursor<'a> {
    sql: &'a str,
    pos: usize,
}

impl Cursor<'_> {
    fn rest(&self) -> &str {
        &self.sql[self.pos..]
    }

    fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    fn at_end(&self) -> bool {
        self.pos >= self.sql.len()
    }

    fn skip_ws(&mut self) {
        let rest = self.rest();
        self.pos += rest.len() - rest.trim_start().len();
    }

    fn word_len(&self) -> usize {
        self.rest()
            .char_indices()
            .find(|(_, c)| !(c.is_alphanumeric() || *c == '_'))
            .map_or(self.rest().len(), |(i, _)| i)
    }

    fn at_word(&self, word: &str) -> bool {
        let len = self.word_len();
        len == word.len() && self.rest()[..len].eq_ignore_ascii_case(word)
    }

    fn eat_word(&mut self, word: &str) -> bool {
        let matched = self.at_word(word);
        if matched {
            self.pos += word.len();
        }

        matched
    }

    // plain or quoted identifier
    fn ident(&mut self) -> Option<&str> {
        let start = self.pos;
        let close = match self.peek()? {
            '"' => Some('"'),
            '[' => Some(']'),
            '`' => Some('`'),
            _ => None,
        };

        if let Some(close) = close {
            let end = self.rest()[1..].find(close)? + 2;
            self.pos += end;
        } else {
            let len = self.word_len();
            if len == 0 {
                return None;
            }
            self.pos += len;
        }

        Some(&self.sql[start..self.pos])
    }

    fn skip_group(&mut self, scanner: &Scanner<'_>) -> Result<(), InternalError> {
        let group = scanner
            .group_at(self.pos)
            .ok_or_else(|| self.error("expected a balanced parenthesised group"))?;
        self.pos = group.end;

        Ok(())
    }

    fn error(&self, message: &str) -> InternalError {
        InternalError::lexical(self.sql, self.pos, message)
    }
}
