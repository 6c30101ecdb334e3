use crate::{
    error::InternalError,
    page::{Window, scan::Scanner, split_locking, with_locking},
};

/// `LIMIT n [OFFSET o]`, placed before a trailing locking clause.
pub(crate) fn limit_offset(sql: &str, window: &Window<'_>) -> Result<String, InternalError> {
    let scanner = Scanner::new(sql)?;
    let (head, locking) = split_locking(&scanner);

    let paged = match window.offset {
        Some(offset) => format!("{head} LIMIT {} OFFSET {offset}", window.fetch),
        None => format!("{head} LIMIT {}", window.fetch),
    };

    Ok(with_locking(paged, locking))
}

/// `LIMIT [o, ]n`, placed before a trailing locking clause.
pub(crate) fn mysql(sql: &str, window: &Window<'_>) -> Result<String, InternalError> {
    let scanner = Scanner::new(sql)?;
    let (head, locking) = split_locking(&scanner);

    let paged = match window.offset {
        Some(offset) => format!("{head} LIMIT {offset}, {}", window.fetch),
        None => format!("{head} LIMIT {}", window.fetch),
    };

    Ok(with_locking(paged, locking))
}
