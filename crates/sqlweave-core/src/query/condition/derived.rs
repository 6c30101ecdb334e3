use crate::{
    error::{ErrorOrigin, InternalError},
    query::{
        condition::{Conditions, Conjunction},
        predicate::{Arity, Part, Predicate, PredicateType, strip_any_suffix},
    },
    sql::ParamValue,
};
use regex::Regex;
use std::{collections::VecDeque, sync::LazyLock};

// `findBy`, `findDistinctUsersBy`, `countBy`, ...
static PREFIX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^(?:find|read|get|query|search|stream|count|exists|delete|remove)(?:\p{Lu}.*?)??By",
    )
    .expect("derived prefix pattern compiles")
});

const ALL_IGNORE_CASE: [&str; 2] = ["AllIgnoreCase", "AllIgnoringCase"];

pub(super) fn parse(name: &str, args: Vec<ParamValue>) -> Result<Conditions, InternalError> {
    let criteria = PREFIX
        .find(name)
        .map_or(name, |prefix| &name[prefix.end()..]);
    let (criteria, fold_all) = strip_any_suffix(criteria, &ALL_IGNORE_CASE);

    if criteria.is_empty() {
        return Err(InternalError::mapping(
            ErrorOrigin::Predicate,
            format!("derived name '{name}' has no criteria"),
        ));
    }

    let total = args.len();
    let mut args: VecDeque<ParamValue> = args.into();
    let mut conditions = Conditions::new();

    for (i, branch) in split_keyword(criteria, "Or").into_iter().enumerate() {
        for (j, source) in split_keyword(branch, "And").into_iter().enumerate() {
            let part = Part::parse(source)?;
            let count = match part.kind.arity() {
                Arity::Exact(n) => n,
                Arity::Variadic => 0,
            };
            if args.len() < count {
                return Err(InternalError::arity(
                    ErrorOrigin::Predicate,
                    format!(
                        "derived name '{name}' is missing argument(s): '{source}' takes {} but {} of {total} remain",
                        part.kind.arity(),
                        args.len()
                    ),
                ));
            }

            let values = args.drain(..count).collect();
            let mut predicate = Predicate::new(part.property.as_str(), part.kind, values);
            predicate.ignore_case = part.ignore_case || (fold_all && folds_case(part.kind));

            let conjunction = if i > 0 && j == 0 {
                Conjunction::Or
            } else {
                Conjunction::And
            };
            conditions = conditions.add(conjunction, predicate);
        }
    }

    if !args.is_empty() {
        return Err(InternalError::arity(
            ErrorOrigin::Predicate,
            format!(
                "derived name '{name}' leaves {} of {total} argument(s) unused",
                args.len()
            ),
        ));
    }

    Ok(conditions)
}

// value-free operators have nothing to fold
const fn folds_case(kind: PredicateType) -> bool {
    !matches!(
        kind,
        PredicateType::IsNull
            | PredicateType::IsNotNull
            | PredicateType::IsEmpty
            | PredicateType::IsNotEmpty
            | PredicateType::True
            | PredicateType::False
    )
}

/// Split on `keyword` where it starts a new capitalized word and both sides
/// are non-empty (`NameOrAge` splits, `Ordinal` and `ColorOrdinal` do not).
pub(super) fn split_keyword<'a>(source: &'a str, keyword: &str) -> Vec<&'a str> {
    let mut parts = Vec::new();
    let mut start = 0;
    let mut from = 0;

    while let Some(found) = source[from..].find(keyword) {
        let at = from + found;
        let after = at + keyword.len();
        let next_is_upper = source[after..]
            .chars()
            .next()
            .is_some_and(char::is_uppercase);

        if at > start && next_is_upper {
            parts.push(&source[start..at]);
            start = after;
        }
        from = after;
    }
    parts.push(&source[start..]);

    parts
}
