use crate::{
    sql::segment::{Binding, Segment},
    value::{FieldValue, Value},
};
use derive_more::Deref;

///
/// ParamValue
///
/// One bound value plus its type hints. The name is assigned lazily by the
/// compiler the first time the value is bound and never changes afterwards.
///

#[derive(Clone, Debug, Default, PartialEq)]
pub struct ParamValue {
    pub name: Option<String>,
    pub value: Value,
    /// Host type name, used only as a hint for type handlers.
    pub value_type: Option<String>,
    pub jdbc_type: Option<String>,
    pub type_handler: Option<String>,
    /// Read through an optional accessor.
    pub getter_optional: bool,
}

impl ParamValue {
    /// `Option<T>` values are flagged as read through an optional accessor.
    #[must_use]
    pub fn new<T: FieldValue>(value: T) -> Self {
        Self {
            value: value.to_value(),
            getter_optional: T::is_optional(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn named(mut self, name: &str) -> Self {
        self.name = Some(name.to_string());
        self
    }

    #[must_use]
    pub fn value_type(mut self, value_type: &str) -> Self {
        self.value_type = Some(value_type.to_string());
        self
    }

    #[must_use]
    pub fn jdbc_type(mut self, jdbc_type: &str) -> Self {
        self.jdbc_type = Some(jdbc_type.to_string());
        self
    }

    #[must_use]
    pub fn type_handler(mut self, type_handler: &str) -> Self {
        self.type_handler = Some(type_handler.to_string());
        self
    }

    /// Assign `name` unless a name is already present; returns the final name.
    pub fn name_or_assign(&mut self, name: impl FnOnce() -> String) -> &str {
        self.name.get_or_insert_with(name)
    }

    /// Copy carrying a different name and value; type hints are kept.
    #[must_use]
    pub fn derived(&self, name: String, value: Value) -> Self {
        Self {
            name: Some(name),
            value,
            ..self.clone()
        }
    }

    #[must_use]
    pub fn binding(&self) -> Binding {
        Binding {
            name: self.name.clone().unwrap_or_default(),
            value_type: self.value_type.clone(),
            jdbc_type: self.jdbc_type.clone(),
            type_handler: self.type_handler.clone(),
        }
    }
}

impl From<Value> for ParamValue {
    fn from(value: Value) -> Self {
        Self {
            value,
            ..Self::default()
        }
    }
}

///
/// ParamSink
///
/// Callback turning a named value into the segment that references it.
/// Structured predicates and raw templates bind through the same sink so
/// they share one naming scheme.
///

pub trait ParamSink {
    fn bind(&mut self, param: ParamValue) -> Segment;
}

impl<F> ParamSink for F
where
    F: FnMut(ParamValue) -> Segment,
{
    fn bind(&mut self, param: ParamValue) -> Segment {
        self(param)
    }
}

///
/// ParamSet
///
/// Values collected while compiling one statement, in binding order.
/// Binding a name twice replaces the earlier value.
///

#[derive(Clone, Debug, Default, Deref, PartialEq)]
pub struct ParamSet(Vec<ParamValue>);

impl ParamSet {
    #[must_use]
    pub const fn new() -> Self {
        Self(Vec::new())
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&ParamValue> {
        self.0.iter().find(|p| p.name.as_deref() == Some(name))
    }

    pub fn insert(&mut self, param: ParamValue) {
        match self.0.iter_mut().find(|p| p.name == param.name) {
            Some(slot) => *slot = param,
            None => self.0.push(param),
        }
    }

    /// Set a value by name; used for values known only at execution time.
    pub fn set(&mut self, name: &str, value: impl FieldValue) {
        self.insert(ParamValue::new(value).named(name));
    }

    pub fn extend(&mut self, other: Self) {
        for param in other.0 {
            self.insert(param);
        }
    }
}

impl ParamSink for ParamSet {
    fn bind(&mut self, param: ParamValue) -> Segment {
        let segment = Segment::parameter(param.binding());
        self.insert(param);

        segment
    }
}

///
/// BoundSql
/// Positional SQL and its values in marker order.
///

#[derive(Clone, Debug, Default, PartialEq)]
pub struct BoundSql {
    pub sql: String,
    pub values: Vec<Value>,
}
