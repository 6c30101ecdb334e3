use crate::{
    error::InternalError,
    sql::{
        param::{ParamSink, ParamValue},
        segment::Segment,
    },
    value::Value,
};
use regex::{Captures, Regex};
use std::{ops::Range, sync::LazyLock};

// Positional `?N` or named `:name`, optionally preceded by LIKE/IN context
// and wrapped in `%` wildcards.
static PLACEHOLDER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)(?P<ctx>\b(?P<kw>LIKE|IN)\s*(?P<paren>\(\s*)?)?(?P<pre>%)?(?:\?(?P<pos>\d+)|:(?P<name>[A-Za-z_][A-Za-z0-9_]*))(?P<post>%)?",
    )
    .expect("placeholder pattern compiles")
});

///
/// Placeholder
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Placeholder {
    /// 1-based `?N`.
    Positional(usize),
    Named(String),
}

/// Replace every placeholder in `fragment` with the segment bound for it.
///
/// `value_of` supplies the value behind each placeholder; unnamed values get
/// the placeholder name (`:name`) or `{base}_{N}` (`?N`). `%` wildcards in a
/// LIKE context wrap the value into a derived bind, and list values in an IN
/// context expand to a collection guarded against emptiness. A fragment
/// without placeholders comes back as a single unchanged literal.
pub fn parse<F>(
    fragment: &str,
    base: &str,
    mut value_of: F,
    sink: &mut dyn ParamSink,
) -> Result<Segment, InternalError>
where
    F: FnMut(&Placeholder) -> Result<ParamValue, InternalError>,
{
    let literals = literal_ranges(fragment);
    let mut parts = Vec::new();
    let mut last = 0;

    for caps in PLACEHOLDER.captures_iter(fragment) {
        let Some(whole) = caps.get(0) else { continue };
        let marker = marker_start(&caps);

        if fragment[..marker].ends_with(':')
            || literals.iter().any(|range| range.contains(&marker))
        {
            continue;
        }

        let placeholder = match (caps.name("pos"), caps.name("name")) {
            (Some(pos), _) => Placeholder::Positional(pos.as_str().parse().unwrap_or(0)),
            (None, Some(name)) => Placeholder::Named(name.as_str().to_string()),
            (None, None) => continue,
        };

        let mut param = value_of(&placeholder)?;
        param.name_or_assign(|| match &placeholder {
            Placeholder::Positional(n) => format!("{base}_{n}"),
            Placeholder::Named(name) => name.clone(),
        });

        parts.push(Segment::literal(&fragment[last..whole.start()]));
        if let Some(ctx) = caps.name("ctx") {
            parts.push(Segment::literal(ctx.as_str()));
        }
        parts.push(substitute(&caps, param, sink));
        last = whole.end();
    }

    if parts.is_empty() {
        return Ok(Segment::literal(fragment));
    }
    parts.push(Segment::literal(&fragment[last..]));
    parts.retain(|part| !part.is_empty_literal());

    Ok(Segment::Composite(parts))
}

// Offset of the `?` or `:` sigil.
fn marker_start(caps: &Captures<'_>) -> usize {
    caps.name("pos")
        .or_else(|| caps.name("name"))
        .map_or(0, |m| m.start().saturating_sub(1))
}

fn substitute(caps: &Captures<'_>, param: ParamValue, sink: &mut dyn ParamSink) -> Segment {
    let keyword = caps.name("kw").map(|m| m.as_str().to_ascii_uppercase());
    let prefix = caps.name("pre").is_some();
    let suffix = caps.name("post").is_some();

    match keyword.as_deref() {
        Some("LIKE") if prefix || suffix => {
            let text = param.value.to_text().unwrap_or_default();
            let wrapped = format!(
                "{}{text}{}",
                if prefix { "%" } else { "" },
                if suffix { "%" } else { "" }
            );
            let name = format!("__bind_{}", param.name.as_deref().unwrap_or_default());

            sink.bind(param.derived(name, Value::Text(wrapped)))
        }
        Some("IN") if matches!(param.value, Value::List(_)) => {
            let name = param.name.clone().unwrap_or_default();
            let (open, close, empty) = if caps.name("paren").is_some() {
                ("", "", "NULL")
            } else {
                ("(", ")", "(NULL)")
            };
            sink.bind(param);

            Segment::choose_empty(
                &name,
                Segment::literal(empty),
                Segment::foreach(&name, open, close),
            )
        }
        _ => {
            let mut segment = sink.bind(param);
            if prefix || suffix {
                segment = Segment::Composite(vec![
                    Segment::literal(if prefix { "%" } else { "" }),
                    segment,
                    Segment::literal(if suffix { "%" } else { "" }),
                ]);
                if let Segment::Composite(children) = &mut segment {
                    children.retain(|part| !part.is_empty_literal());
                }
            }

            segment
        }
    }
}

/// Byte ranges of single-quoted literals, doubled quotes included.
fn literal_ranges(sql: &str) -> Vec<Range<usize>> {
    let mut ranges = Vec::new();
    let mut open: Option<usize> = None;

    for (i, c) in sql.char_indices() {
        if c == '\'' {
            match open.take() {
                Some(start) => ranges.push(start..i + 1),
                None => open = Some(i),
            }
        }
    }
    if let Some(start) = open {
        ranges.push(start..sql.len());
    }

    ranges
}
