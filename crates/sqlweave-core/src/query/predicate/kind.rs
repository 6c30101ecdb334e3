use std::fmt;

///
/// PredicateType
///
/// Closed set of comparison operators with their arity and the keywords
/// that name them at the end of a derived condition name.
///

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum PredicateType {
    Between,
    IsNotNull,
    IsNull,
    LessThan,
    LessThanEqual,
    GreaterThan,
    GreaterThanEqual,
    Before,
    After,
    NotLike,
    Like,
    StartingWith,
    EndingWith,
    IsNotEmpty,
    IsEmpty,
    NotContaining,
    Containing,
    NotIn,
    In,
    Regex,
    True,
    False,
    NegatingSimpleProperty,
    SimpleProperty,
    /// Raw fragment with `?N` / `:name` placeholders.
    Custom,
}

impl PredicateType {
    /// Lookup order for derived names. A keyword that is a suffix of another
    /// keyword must come after it (`GreaterThanEqual` before `GreaterThan`).
    pub const ALL: [Self; 24] = [
        Self::IsNotNull,
        Self::IsNull,
        Self::Between,
        Self::LessThanEqual,
        Self::LessThan,
        Self::GreaterThanEqual,
        Self::GreaterThan,
        Self::Before,
        Self::After,
        Self::NotLike,
        Self::Like,
        Self::StartingWith,
        Self::EndingWith,
        Self::IsNotEmpty,
        Self::IsEmpty,
        Self::NotContaining,
        Self::Containing,
        Self::NotIn,
        Self::In,
        Self::Regex,
        Self::True,
        Self::False,
        Self::NegatingSimpleProperty,
        Self::SimpleProperty,
    ];

    #[must_use]
    pub const fn arity(self) -> Arity {
        match self {
            Self::IsNotNull
            | Self::IsNull
            | Self::IsNotEmpty
            | Self::IsEmpty
            | Self::True
            | Self::False => Arity::Exact(0),
            Self::Between => Arity::Exact(2),
            Self::Custom => Arity::Variadic,
            _ => Arity::Exact(1),
        }
    }

    /// Keywords, longest first within each operator.
    #[must_use]
    pub const fn keywords(self) -> &'static [&'static str] {
        match self {
            Self::Between => &["IsBetween", "Between"],
            Self::IsNotNull => &["IsNotNull", "NotNull"],
            Self::IsNull => &["IsNull", "Null"],
            Self::LessThan => &["IsLessThan", "LessThan"],
            Self::LessThanEqual => &["IsLessThanEqual", "LessThanEqual"],
            Self::GreaterThan => &["IsGreaterThan", "GreaterThan"],
            Self::GreaterThanEqual => &["IsGreaterThanEqual", "GreaterThanEqual"],
            Self::Before => &["IsBefore", "Before"],
            Self::After => &["IsAfter", "After"],
            Self::NotLike => &["IsNotLike", "NotLike"],
            Self::Like => &["IsLike", "Like"],
            Self::StartingWith => &["IsStartingWith", "StartingWith", "StartsWith"],
            Self::EndingWith => &["IsEndingWith", "EndingWith", "EndsWith"],
            Self::IsNotEmpty => &["IsNotEmpty", "NotEmpty"],
            Self::IsEmpty => &["IsEmpty", "Empty"],
            Self::NotContaining => &["IsNotContaining", "NotContaining", "NotContains"],
            Self::Containing => &["IsContaining", "Containing", "Contains"],
            Self::NotIn => &["IsNotIn", "NotIn"],
            Self::In => &["IsIn", "In"],
            Self::Regex => &["MatchesRegex", "Matches", "Regex"],
            Self::True => &["IsTrue", "True"],
            Self::False => &["IsFalse", "False"],
            Self::NegatingSimpleProperty => &["IsNot", "Not"],
            Self::SimpleProperty => &["Is", "Equals"],
            Self::Custom => &[],
        }
    }

    /// Classify a derived name by its keyword suffix; first match wins and
    /// anything unmatched is plain equality.
    #[must_use]
    pub fn from_property(source: &str) -> Self {
        Self::ALL
            .into_iter()
            .find(|kind| kind.matching_keyword(source).is_some())
            .unwrap_or(Self::SimpleProperty)
    }

    /// `source` with this operator's keyword suffix removed.
    #[must_use]
    pub fn extract_property(self, source: &str) -> &str {
        self.matching_keyword(source)
            .map_or(source, |keyword| &source[..source.len() - keyword.len()])
    }

    // keyword must leave a non-empty property in front of it
    fn matching_keyword(self, source: &str) -> Option<&'static str> {
        self.keywords()
            .iter()
            .copied()
            .find(|keyword| source.len() > keyword.len() && source.ends_with(keyword))
    }

    /// Operators that compare against a LIKE pattern.
    #[must_use]
    pub const fn is_like(self) -> bool {
        matches!(
            self,
            Self::Like
                | Self::NotLike
                | Self::StartingWith
                | Self::EndingWith
                | Self::Containing
                | Self::NotContaining
        )
    }
}

impl fmt::Display for PredicateType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Between => "BETWEEN",
            Self::IsNotNull => "IS_NOT_NULL",
            Self::IsNull => "IS_NULL",
            Self::LessThan => "LESS_THAN",
            Self::LessThanEqual => "LESS_THAN_EQUAL",
            Self::GreaterThan => "GREATER_THAN",
            Self::GreaterThanEqual => "GREATER_THAN_EQUAL",
            Self::Before => "BEFORE",
            Self::After => "AFTER",
            Self::NotLike => "NOT_LIKE",
            Self::Like => "LIKE",
            Self::StartingWith => "STARTING_WITH",
            Self::EndingWith => "ENDING_WITH",
            Self::IsNotEmpty => "IS_NOT_EMPTY",
            Self::IsEmpty => "IS_EMPTY",
            Self::NotContaining => "NOT_CONTAINING",
            Self::Containing => "CONTAINING",
            Self::NotIn => "NOT_IN",
            Self::In => "IN",
            Self::Regex => "REGEX",
            Self::True => "TRUE",
            Self::False => "FALSE",
            Self::NegatingSimpleProperty => "NEGATING_SIMPLE_PROPERTY",
            Self::SimpleProperty => "SIMPLE_PROPERTY",
            Self::Custom => "CUSTOM",
        };
        write!(f, "{label}")
    }
}

///
/// Arity
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Arity {
    Exact(usize),
    Variadic,
}

impl Arity {
    #[must_use]
    pub const fn accepts(self, count: usize) -> bool {
        match self {
            Self::Exact(n) => n == count,
            Self::Variadic => true,
        }
    }
}

impl fmt::Display for Arity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Exact(1) => write!(f, "1 value"),
            Self::Exact(n) => write!(f, "{n} values"),
            Self::Variadic => write!(f, "any number of values"),
        }
    }
}
