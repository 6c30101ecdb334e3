use crate::query::{condition::Conjunction, predicate::PredicateType};
use std::collections::{BTreeMap, BTreeSet};

///
/// StringMatcher
///
/// How a text property of a probe is compared.
///

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
#[remain::sorted]
pub enum StringMatcher {
    Containing,
    Ending,
    #[default]
    Exact,
    Regex,
    Starting,
}

impl StringMatcher {
    #[must_use]
    pub const fn predicate_type(self) -> PredicateType {
        match self {
            Self::Containing => PredicateType::Containing,
            Self::Ending => PredicateType::EndingWith,
            Self::Exact => PredicateType::SimpleProperty,
            Self::Regex => PredicateType::Regex,
            Self::Starting => PredicateType::StartingWith,
        }
    }
}

///
/// NullHandler
///

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum NullHandler {
    /// Absent values produce no condition.
    #[default]
    Ignore,
    /// Absent scalar values produce `IS NULL`.
    Include,
}

///
/// MatchMode
///

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum MatchMode {
    /// Every derived condition must hold.
    #[default]
    All,
    /// Any derived condition may hold.
    Any,
}

impl MatchMode {
    #[must_use]
    pub const fn conjunction(self) -> Conjunction {
        match self {
            Self::All => Conjunction::And,
            Self::Any => Conjunction::Or,
        }
    }
}

///
/// PropertySpecifier
/// Per-path overrides of the matcher defaults.
///

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct PropertySpecifier {
    pub string_matcher: Option<StringMatcher>,
    pub ignore_case: Option<bool>,
}

///
/// ExampleMatcher
///
/// Match specification for probes. Paths are dotted property paths relative
/// to the probe's entity (`department.name`).
///

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct ExampleMatcher {
    pub mode: MatchMode,
    pub null_handler: NullHandler,
    pub string_matcher: StringMatcher,
    pub ignore_case: bool,
    pub ignored: BTreeSet<String>,
    pub specifiers: BTreeMap<String, PropertySpecifier>,
}

impl ExampleMatcher {
    #[must_use]
    pub fn matching_all() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn matching_any() -> Self {
        Self {
            mode: MatchMode::Any,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_ignore_paths<I, S>(mut self, paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.ignored.extend(paths.into_iter().map(Into::into));
        self
    }

    #[must_use]
    pub const fn with_null_handler(mut self, null_handler: NullHandler) -> Self {
        self.null_handler = null_handler;
        self
    }

    #[must_use]
    pub const fn with_include_null_values(self) -> Self {
        self.with_null_handler(NullHandler::Include)
    }

    /// Default matcher for every text property.
    #[must_use]
    pub const fn with_string_matcher(mut self, matcher: StringMatcher) -> Self {
        self.string_matcher = matcher;
        self
    }

    #[must_use]
    pub const fn with_ignore_case(mut self) -> Self {
        self.ignore_case = true;
        self
    }

    #[must_use]
    pub fn with_matcher(mut self, path: &str, matcher: StringMatcher) -> Self {
        self.specifiers
            .entry(path.to_string())
            .or_default()
            .string_matcher = Some(matcher);
        self
    }

    #[must_use]
    pub fn with_ignore_case_for(mut self, path: &str, ignore_case: bool) -> Self {
        self.specifiers
            .entry(path.to_string())
            .or_default()
            .ignore_case = Some(ignore_case);
        self
    }

    #[must_use]
    pub fn is_ignored(&self, path: &str) -> bool {
        self.ignored.contains(path)
    }

    #[must_use]
    pub fn string_matcher_for(&self, path: &str) -> StringMatcher {
        self.specifiers
            .get(path)
            .and_then(|s| s.string_matcher)
            .unwrap_or(self.string_matcher)
    }

    #[must_use]
    pub fn ignore_case_for(&self, path: &str) -> bool {
        self.specifiers
            .get(path)
            .and_then(|s| s.ignore_case)
            .unwrap_or(self.ignore_case)
    }
}
