use crate::{
    error::{ErrorOrigin, InternalError},
    page::{
        Window,
        cte::Cte,
        scan::{self, Scanner},
    },
};
use regex::Regex;
use std::{collections::BTreeSet, ops::Range, sync::LazyLock};

static EXPLICIT_ALIAS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?is)^.*\S\s+as\s+([A-Za-z_][A-Za-z0-9_]*|"[^"]+"|\[[^\]]+\])$"#)
        .expect("alias pattern compiles")
});

static IMPLICIT_ALIAS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?is)^.*[A-Za-z0-9_)\]"']\s+([A-Za-z_][A-Za-z0-9_]*|"[^"]+"|\[[^\]]+\])$"#)
        .expect("alias pattern compiles")
});

static COLUMN_REF: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:[A-Za-z_][A-Za-z0-9_]*\.)*([A-Za-z_][A-Za-z0-9_]*)$")
        .expect("column pattern compiles")
});

// Trailing words that end an expression rather than name it.
const NOT_ALIASES: [&str; 4] = ["END", "NULL", "TRUE", "FALSE"];

/// `SELECT TOP n`; cannot skip rows.
pub(crate) fn top(sql: &str, window: &Window<'_>) -> Result<String, InternalError> {
    if let Some(offset) = window.offset {
        return Err(InternalError::unsupported(
            ErrorOrigin::Page,
            format!("TOP pagination cannot skip rows (offset {offset})"),
        ));
    }

    let scanner = Scanner::new(sql)?;
    let select = main_select(&scanner)?;

    Ok(insert_at(sql, select.end, &format!(" TOP {}", window.fetch)))
}

/// `ROW_NUMBER()` paging, threaded after any `WITH` prelude.
pub(crate) fn row_number(sql: &str, window: &Window<'_>) -> Result<String, InternalError> {
    let scanner = Scanner::new(sql)?;
    let select = main_select(&scanner)?;

    let Some(offset) = window.offset else {
        return Ok(insert_at(sql, select.end, &format!(" TOP({})", window.fetch)));
    };

    let cte = Cte::parse(&scanner)?;
    let from = scanner
        .find(&scan::FROM, select.end)
        .ok_or_else(|| InternalError::lexical(sql, select.end, "expected FROM"))?;

    let projection = Projection::analyze(&scanner, select.end..from.start);
    let has_order = scanner.find(&scan::ORDER_BY, from.end).is_some();

    // SQL Server rejects ORDER BY in a derived table without TOP
    let top = if has_order {
        format!(" TOP({})", window.end)
    } else {
        String::new()
    };
    let list = projection
        .rewritten
        .unwrap_or_else(|| sql[select.end..from.start].trim().to_string());
    let body = format!(
        "{}{top} {list} {}",
        &sql[cte.body_offset..select.end],
        &sql[from.start..]
    );

    let prefix = match cte.prelude {
        Some(prelude) => format!("{prelude}, query AS ("),
        None => "WITH query AS (".to_string(),
    };

    Ok(format!(
        "{prefix}SELECT inner_query.*, ROW_NUMBER() OVER (ORDER BY CURRENT_TIMESTAMP) AS __row__ FROM ({body}) inner_query) SELECT {} FROM query WHERE __row__ >= {} AND __row__ < {}",
        projection.outer,
        offset.plus(1),
        window.end.plus(1),
    ))
}

/// Native `OFFSET/FETCH` when a top-level `ORDER BY` exists.
pub(crate) fn offset_fetch(sql: &str, window: &Window<'_>) -> Result<String, InternalError> {
    let scanner = Scanner::new(sql)?;
    if scanner.rfind(&scan::ORDER_BY).is_none() {
        return row_number(sql, window);
    }

    let offset = window
        .offset
        .map_or_else(|| "0".to_string(), ToString::to_string);

    Ok(format!(
        "{sql} OFFSET {offset} ROWS FETCH NEXT {} ROWS ONLY",
        window.fetch
    ))
}

fn main_select(scanner: &Scanner<'_>) -> Result<Range<usize>, InternalError> {
    let cte = Cte::parse(scanner)?;

    scanner
        .find(&scan::SELECT, cte.body_offset)
        .ok_or_else(|| InternalError::lexical(scanner.sql(), cte.body_offset, "expected SELECT"))
}

fn insert_at(sql: &str, at: usize, text: &str) -> String {
    format!("{}{text}{}", &sql[..at], &sql[at..])
}

///
/// Projection
///
/// Select list prepared for wrapping: every expression carries a name the
/// outer query can select by.
///

struct Projection {
    /// Outer select list; `*` when names are unknown or ambiguous.
    outer: String,
    /// Inner list with generated aliases, when any were needed.
    rewritten: Option<String>,
}

impl Projection {
    fn analyze(scanner: &Scanner<'_>, list: Range<usize>) -> Self {
        let sql = scanner.sql();
        let mut names = Vec::new();
        let mut star = false;
        let mut changed = false;
        let mut items = Vec::new();

        for (n, range) in scanner.split(list, ',').into_iter().enumerate() {
            let expr = sql[range].trim();

            match alias_of(expr) {
                Alias::Star => {
                    star = true;
                    items.push(expr.to_string());
                }
                Alias::Named(name) => {
                    names.push(name);
                    items.push(expr.to_string());
                }
                Alias::Missing => {
                    let name = format!("page{n}_");
                    items.push(format!("{expr} AS {name}"));
                    names.push(name);
                    changed = true;
                }
            }
        }

        let mut seen = BTreeSet::new();
        let duplicated = names
            .iter()
            .any(|name| !seen.insert(name.to_ascii_lowercase()));

        Self {
            outer: if star || duplicated {
                "*".to_string()
            } else {
                names.join(", ")
            },
            rewritten: changed.then(|| items.join(", ")),
        }
    }
}

enum Alias {
    Star,
    Named(String),
    Missing,
}

fn alias_of(expr: &str) -> Alias {
    if expr == "*" || expr.ends_with(".*") {
        return Alias::Star;
    }
    if let Some(caps) = EXPLICIT_ALIAS.captures(expr) {
        return Alias::Named(caps[1].to_string());
    }
    if let Some(caps) = IMPLICIT_ALIAS.captures(expr)
        && !NOT_ALIASES.iter().any(|kw| caps[1].eq_ignore_ascii_case(kw))
    {
        return Alias::Named(caps[1].to_string());
    }
    if let Some(caps) = COLUMN_REF.captures(expr) {
        return Alias::Named(caps[1].to_string());
    }

    Alias::Missing
}
