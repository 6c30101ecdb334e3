use crate::{
    error::InternalError,
    page::{Window, scan::Scanner, split_locking, with_locking},
};

/// Nested `ROWNUM` wrappers; a trailing `FOR UPDATE` moves outside them.
pub(crate) fn rownum(sql: &str, window: &Window<'_>) -> Result<String, InternalError> {
    let scanner = Scanner::new(sql)?;
    let (inner, locking) = split_locking(&scanner);

    let paged = match window.offset {
        Some(offset) => format!(
            "SELECT * FROM (SELECT row_.*, ROWNUM rownum_ FROM ({inner}) row_ WHERE ROWNUM <= {}) WHERE rownum_ > {offset}",
            window.end
        ),
        None => format!("SELECT * FROM ({inner}) WHERE ROWNUM <= {}", window.fetch),
    };

    Ok(with_locking(paged, locking))
}

/// Oracle 12c row limiting clause.
pub(crate) fn offset_fetch(sql: &str, window: &Window<'_>) -> Result<String, InternalError> {
    let scanner = Scanner::new(sql)?;
    let (head, locking) = split_locking(&scanner);

    let paged = match window.offset {
        Some(offset) => format!(
            "{head} OFFSET {offset} ROWS FETCH NEXT {} ROWS ONLY",
            window.fetch
        ),
        None => format!("{head} FETCH FIRST {} ROWS ONLY", window.fetch),
    };

    Ok(with_locking(paged, locking))
}
