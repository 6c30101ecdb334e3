use crate::{
    error::{ErrorOrigin, InternalError},
    query::predicate::kind::PredicateType,
};

const IGNORE_CASE: [&str; 2] = ["IgnoreCase", "IgnoringCase"];

///
/// Part
///
/// One `property + keyword` fragment of a derived condition name,
/// e.g. `ageIsGreaterThanEqual` or `Address_CityIgnoreCase`.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Part {
    /// Dotted property path.
    pub property: String,
    pub kind: PredicateType,
    pub ignore_case: bool,
}

impl Part {
    pub fn parse(source: &str) -> Result<Self, InternalError> {
        let (body, ignore_case) = strip_any_suffix(source, &IGNORE_CASE);
        let kind = PredicateType::from_property(body);
        let raw = kind.extract_property(body);

        if raw.is_empty() {
            return Err(InternalError::mapping(
                ErrorOrigin::Predicate,
                format!("derived condition '{source}' names no property"),
            ));
        }

        Ok(Self {
            property: property_path(raw),
            kind,
            ignore_case,
        })
    }
}

/// `source` without the first matching suffix, and whether one matched.
pub(crate) fn strip_any_suffix<'a>(source: &'a str, suffixes: &[&str]) -> (&'a str, bool) {
    suffixes
        .iter()
        .find_map(|suffix| {
            source
                .strip_suffix(suffix)
                .filter(|rest| !rest.is_empty())
        })
        .map_or((source, false), |rest| (rest, true))
}

// `Address_City` -> `address.city`
fn property_path(raw: &str) -> String {
    raw.split('_')
        .filter(|segment| !segment.is_empty())
        .map(uncapitalize)
        .collect::<Vec<_>>()
        .join(".")
}

fn uncapitalize(segment: &str) -> String {
    let mut chars = segment.chars();
    chars.next().map_or_else(String::new, |first| {
        first.to_lowercase().chain(chars).collect()
    })
}
