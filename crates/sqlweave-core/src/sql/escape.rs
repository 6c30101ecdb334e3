/// Escape LIKE wildcards (`%`, `_`) and the escape character itself.
#[must_use]
pub fn escape_like(value: &str, escape: char) -> String {
    let mut out = String::with_capacity(value.len() + 4);
    for c in value.chars() {
        if c == escape || c == '%' || c == '_' {
            out.push(escape);
        }
        out.push(c);
    }

    out
}

///
/// LikeShape
/// Where the `%` wildcards go around an escaped value.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum LikeShape {
    Starting,
    Ending,
    Containing,
}

impl LikeShape {
    /// Escape `value` and wrap it with `%` for this shape.
    #[must_use]
    pub fn pattern(self, value: &str, escape: char) -> String {
        let escaped = escape_like(value, escape);
        match self {
            Self::Starting => format!("{escaped}%"),
            Self::Ending => format!("%{escaped}"),
            Self::Containing => format!("%{escaped}%"),
        }
    }
}

///
/// TESTS
///
