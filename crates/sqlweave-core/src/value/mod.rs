
use serde::{Deserialize, Serialize};
use std::fmt;

///
/// Value
///
/// Runtime value bound to a statement parameter.
/// Lists appear only for membership operators and `<foreach>` expansion.
///

#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    Int(i64),
    Uint(u64),
    Float(f64),
    Text(String),
    List(Vec<Self>),
}

impl Value {
    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_list(&self) -> Option<&[Self]> {
        match self {
            Self::List(items) => Some(items),
            _ => None,
        }
    }

    /// Null or an empty list; the runtime test behind empty-`IN` short circuits.
    #[must_use]
    pub fn is_empty_collection(&self) -> bool {
        match self {
            Self::Null => true,
            Self::List(items) => items.is_empty(),
            _ => false,
        }
    }

    /// Textual form used when a scalar feeds a LIKE pattern.
    /// Null stays absent; lists have no textual form.
    #[must_use]
    pub fn to_text(&self) -> Option<String> {
        match self {
            Self::Null | Self::List(_) => None,
            Self::Bool(v) => Some(v.to_string()),
            Self::Int(v) => Some(v.to_string()),
            Self::Uint(v) => Some(v.to_string()),
            Self::Float(v) => Some(v.to_string()),
            Self::Text(v) => Some(v.clone()),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => write!(f, "NULL"),
            Self::Bool(v) => write!(f, "{v}"),
            Self::Int(v) => write!(f, "{v}"),
            Self::Uint(v) => write!(f, "{v}"),
            Self::Float(v) => write!(f, "{v}"),
            Self::Text(v) => write!(f, "'{}'", v.replace('\'', "''")),
            Self::List(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{item}")?;
                }
                write!(f, "]")
            }
        }
    }
}

///
/// FieldValue
///
/// Conversion of Rust values into bindable [`Value`]s.
///

pub trait FieldValue {
    fn to_value(&self) -> Value;

    /// True when the value was read through an optional accessor.
    fn is_optional() -> bool
    where
        Self: Sized,
    {
        false
    }
}

impl FieldValue for Value {
    fn to_value(&self) -> Value {
        self.clone()
    }
}

impl FieldValue for () {
    fn to_value(&self) -> Value {
        Value::Null
    }
}

impl FieldValue for bool {
    fn to_value(&self) -> Value {
        Value::Bool(*self)
    }
}

impl FieldValue for &str {
    fn to_value(&self) -> Value {
        Value::Text((*self).to_string())
    }
}

impl FieldValue for String {
    fn to_value(&self) -> Value {
        Value::Text(self.clone())
    }
}

impl FieldValue for f32 {
    fn to_value(&self) -> Value {
        Value::Float(f64::from(*self))
    }
}

impl FieldValue for f64 {
    fn to_value(&self) -> Value {
        Value::Float(*self)
    }
}

impl<T: FieldValue> FieldValue for Option<T> {
    fn to_value(&self) -> Value {
        self.as_ref().map_or(Value::Null, FieldValue::to_value)
    }

    fn is_optional() -> bool {
        true
    }
}

impl<T: FieldValue> FieldValue for Vec<T> {
    fn to_value(&self) -> Value {
        Value::List(self.iter().map(FieldValue::to_value).collect())
    }
}

impl<T: FieldValue> FieldValue for &[T] {
    fn to_value(&self) -> Value {
        Value::List(self.iter().map(FieldValue::to_value).collect())
    }
}

macro_rules! impl_field_value_signed {
    ($($ty:ty),*) => {
        $(
            impl FieldValue for $ty {
                fn to_value(&self) -> Value {
                    Value::Int(i64::from(*self))
                }
            }
        )*
    };
}

macro_rules! impl_field_value_unsigned {
    ($($ty:ty),*) => {
        $(
            impl FieldValue for $ty {
                fn to_value(&self) -> Value {
                    Value::Uint(u64::from(*self))
                }
            }
        )*
    };
}

impl_field_value_signed!(i8, i16, i32, i64);
impl_field_value_unsigned!(u8, u16, u32, u64);
