use crate::{
    error::{ErrorOrigin, InternalError},
    sql::param::{BoundSql, ParamSet},
    value::Value,
};
use std::fmt::{self, Write as _};

///
/// Segment
///
/// Immutable SQL fragment. Renders either as a dynamic template
/// (`#{name}` placeholders, `<foreach>`/`<choose>` tags) or, via
/// [`Segment::bind`], as positional SQL with its ordered values.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Segment {
    /// Column, optionally qualified by an already-quoted table alias.
    Column {
        table: Option<String>,
        name: String,
    },

    Parameter(Binding),

    Function {
        name: String,
        args: Vec<Self>,
    },

    Literal(String),

    /// Children rendered back to back.
    Composite(Vec<Self>),

    /// Child wrapped in parentheses.
    Group(Box<Self>),

    /// One placeholder per element of a bound collection, each optionally
    /// wrapped in a function call.
    Foreach {
        collection: String,
        open: String,
        close: String,
        item_function: Option<String>,
    },

    /// Render-time branch on a bound value.
    Choose {
        test: Test,
        then: Box<Self>,
        otherwise: Box<Self>,
    },
}

impl Segment {
    #[must_use]
    pub fn column(table: Option<&str>, name: &str) -> Self {
        Self::Column {
            table: table.map(ToString::to_string),
            name: name.to_string(),
        }
    }

    #[must_use]
    pub fn literal(text: impl Into<String>) -> Self {
        Self::Literal(text.into())
    }

    #[must_use]
    pub fn function(name: &str, args: Vec<Self>) -> Self {
        Self::Function {
            name: name.to_string(),
            args,
        }
    }

    #[must_use]
    pub fn parameter(binding: Binding) -> Self {
        Self::Parameter(binding)
    }

    #[must_use]
    pub fn group(inner: Self) -> Self {
        Self::Group(Box::new(inner))
    }

    #[must_use]
    pub fn foreach(collection: &str, open: &str, close: &str) -> Self {
        Self::Foreach {
            collection: collection.to_string(),
            open: open.to_string(),
            close: close.to_string(),
            item_function: None,
        }
    }

    /// Like [`Segment::foreach`], with every element passed through `function`.
    #[must_use]
    pub fn foreach_applying(collection: &str, open: &str, close: &str, function: &str) -> Self {
        Self::Foreach {
            collection: collection.to_string(),
            open: open.to_string(),
            close: close.to_string(),
            item_function: Some(function.to_string()),
        }
    }

    /// `then` when the named value is null or an empty collection.
    #[must_use]
    pub fn choose_empty(name: &str, then: Self, otherwise: Self) -> Self {
        Self::Choose {
            test: Test::Empty(name.to_string()),
            then: Box::new(then),
            otherwise: Box::new(otherwise),
        }
    }

    /// Children separated by single spaces.
    #[must_use]
    pub fn spaced(children: Vec<Self>) -> Self {
        let mut out = Vec::with_capacity(children.len() * 2);
        for (i, child) in children.into_iter().enumerate() {
            if i > 0 {
                out.push(Self::literal(" "));
            }
            out.push(child);
        }

        Self::Composite(out)
    }

    #[must_use]
    pub const fn is_empty_literal(&self) -> bool {
        match self {
            Self::Literal(text) => text.is_empty(),
            Self::Composite(children) => children.is_empty(),
            _ => false,
        }
    }

    /// Template text.
    #[must_use]
    pub fn render(&self) -> String {
        let mut out = String::new();
        self.render_into(&mut out);

        out
    }

    fn render_into(&self, out: &mut String) {
        match self {
            Self::Column { table, name } => {
                if let Some(table) = table {
                    out.push_str(table);
                    out.push('.');
                }
                out.push_str(name);
            }
            Self::Parameter(binding) => {
                let _ = write!(out, "{binding}");
            }
            Self::Function { name, args } => {
                out.push_str(name);
                out.push('(');
                for (i, arg) in args.iter().enumerate() {
                    if i > 0 {
                        out.push_str(", ");
                    }
                    arg.render_into(out);
                }
                out.push(')');
            }
            Self::Literal(text) => out.push_str(text),
            Self::Composite(children) => {
                for child in children {
                    child.render_into(out);
                }
            }
            Self::Group(inner) => {
                out.push('(');
                inner.render_into(out);
                out.push(')');
            }
            Self::Foreach {
                collection,
                open,
                close,
                item_function,
            } => {
                let item = match item_function {
                    Some(function) => format!("{function}(#{{item}})"),
                    None => "#{item}".to_string(),
                };
                let _ = write!(
                    out,
                    "<foreach collection=\"{collection}\" item=\"item\" open=\"{open}\" separator=\", \" close=\"{close}\">{item}</foreach>"
                );
            }
            Self::Choose {
                test,
                then,
                otherwise,
            } => {
                let _ = write!(out, "<choose><when test=\"{test}\">");
                then.render_into(out);
                out.push_str("</when><otherwise>");
                otherwise.render_into(out);
                out.push_str("</otherwise></choose>");
            }
        }
    }

    /// Resolve conditional parts against `params` and emit positional SQL.
    pub fn bind(&self, params: &ParamSet) -> Result<BoundSql, InternalError> {
        let mut bound = BoundSql::default();
        self.bind_into(params, &mut bound)?;

        Ok(bound)
    }

    fn bind_into(&self, params: &ParamSet, bound: &mut BoundSql) -> Result<(), InternalError> {
        match self {
            Self::Parameter(binding) => {
                bound.sql.push('?');
                bound.values.push(lookup(params, &binding.name)?.clone());
            }
            Self::Function { name, args } => {
                bound.sql.push_str(name);
                bound.sql.push('(');
                for (i, arg) in args.iter().enumerate() {
                    if i > 0 {
                        bound.sql.push_str(", ");
                    }
                    arg.bind_into(params, bound)?;
                }
                bound.sql.push(')');
            }
            Self::Composite(children) => {
                for child in children {
                    child.bind_into(params, bound)?;
                }
            }
            Self::Group(inner) => {
                bound.sql.push('(');
                inner.bind_into(params, bound)?;
                bound.sql.push(')');
            }
            Self::Foreach {
                collection,
                open,
                close,
                item_function,
            } => {
                let items = match lookup(params, collection)? {
                    Value::List(items) => items.clone(),
                    other => vec![other.clone()],
                };
                bound.sql.push_str(open);
                for (i, item) in items.into_iter().enumerate() {
                    if i > 0 {
                        bound.sql.push_str(", ");
                    }
                    match item_function {
                        Some(function) => {
                            let _ = write!(bound.sql, "{function}(?)");
                        }
                        None => bound.sql.push('?'),
                    }
                    bound.values.push(item);
                }
                bound.sql.push_str(close);
            }
            Self::Choose {
                test,
                then,
                otherwise,
            } => {
                if test.holds(params) {
                    then.bind_into(params, bound)?;
                } else {
                    otherwise.bind_into(params, bound)?;
                }
            }
            Self::Column { .. } | Self::Literal(_) => self.render_into(&mut bound.sql),
        }

        Ok(())
    }
}

impl Default for Segment {
    fn default() -> Self {
        Self::Composite(Vec::new())
    }
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.render())
    }
}

fn lookup<'a>(params: &'a ParamSet, name: &str) -> Result<&'a Value, InternalError> {
    params.get(name).map(|p| &p.value).ok_or_else(|| {
        InternalError::arity(
            ErrorOrigin::Template,
            format!("parameter '{name}' has no bound value"),
        )
    })
}

///
/// Binding
/// Named parameter reference with optional type hints.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Binding {
    pub name: String,
    pub value_type: Option<String>,
    pub jdbc_type: Option<String>,
    pub type_handler: Option<String>,
}

impl Binding {
    #[must_use]
    pub fn named(name: &str) -> Self {
        Self {
            name: name.to_string(),
            value_type: None,
            jdbc_type: None,
            type_handler: None,
        }
    }
}

impl fmt::Display for Binding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{{{}", self.name)?;
        if let Some(value_type) = &self.value_type {
            write!(f, ",javaType={value_type}")?;
        }
        if let Some(jdbc_type) = &self.jdbc_type {
            write!(f, ",jdbcType={jdbc_type}")?;
        }
        if let Some(type_handler) = &self.type_handler {
            write!(f, ",typeHandler={type_handler}")?;
        }
        write!(f, "}}")
    }
}

///
/// Test
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Test {
    /// Value is absent, null or an empty collection.
    Empty(String),
}

impl Test {
    fn holds(&self, params: &ParamSet) -> bool {
        match self {
            Self::Empty(name) => params
                .get(name)
                .is_none_or(|p| p.value.is_empty_collection()),
        }
    }
}

impl fmt::Display for Test {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty(name) => write!(f, "{name} == null or {name}.isEmpty()"),
        }
    }
}
