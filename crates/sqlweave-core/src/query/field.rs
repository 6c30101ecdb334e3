use crate::{query::predicate::Predicate, value::FieldValue};
use std::{fmt, marker::PhantomData};

///
/// FieldRef
///
/// Anything that names a dotted property path.
///

pub trait FieldRef {
    fn path(&self) -> String;
}

impl FieldRef for &str {
    fn path(&self) -> String {
        (*self).to_string()
    }
}

impl FieldRef for String {
    fn path(&self) -> String {
        self.clone()
    }
}

impl FieldRef for &String {
    fn path(&self) -> String {
        (*self).clone()
    }
}

///
/// Field
///
/// Typed property selector. `E` is the entity the path starts from; it only
/// exists so selectors of different entities cannot be mixed up.
///
/// ```ignore
/// const AGE: Field<User> = Field::new("age");
/// ```
///

pub struct Field<E> {
    name: &'static str,
    _entity: PhantomData<fn() -> E>,
}

impl<E> Field<E> {
    #[must_use]
    pub const fn new(name: &'static str) -> Self {
        Self {
            name,
            _entity: PhantomData,
        }
    }

    #[must_use]
    pub const fn name(&self) -> &'static str {
        self.name
    }

    /// Selector for a property of an associated or embedded value.
    #[must_use]
    pub fn then<T>(self, next: Field<T>) -> String {
        format!("{}.{}", self.name, next.name)
    }

    #[must_use]
    pub fn eq(self, value: impl FieldValue) -> Predicate {
        Predicate::eq(self, value)
    }

    #[must_use]
    pub fn ne(self, value: impl FieldValue) -> Predicate {
        Predicate::ne(self, value)
    }

    #[must_use]
    pub fn gt(self, value: impl FieldValue) -> Predicate {
        Predicate::gt(self, value)
    }

    #[must_use]
    pub fn gte(self, value: impl FieldValue) -> Predicate {
        Predicate::gte(self, value)
    }

    #[must_use]
    pub fn lt(self, value: impl FieldValue) -> Predicate {
        Predicate::lt(self, value)
    }

    #[must_use]
    pub fn lte(self, value: impl FieldValue) -> Predicate {
        Predicate::lte(self, value)
    }

    #[must_use]
    pub fn between(self, low: impl FieldValue, high: impl FieldValue) -> Predicate {
        Predicate::between(self, low, high)
    }

    #[must_use]
    pub fn in_list(self, values: impl FieldValue) -> Predicate {
        Predicate::in_list(self, values)
    }

    #[must_use]
    pub fn containing(self, value: impl FieldValue) -> Predicate {
        Predicate::containing(self, value)
    }

    #[must_use]
    pub fn starting_with(self, value: impl FieldValue) -> Predicate {
        Predicate::starting_with(self, value)
    }

    #[must_use]
    pub fn is_null(self) -> Predicate {
        Predicate::is_null(self)
    }

    #[must_use]
    pub fn is_not_null(self) -> Predicate {
        Predicate::is_not_null(self)
    }
}

// manual impls: derives would put bounds on E
impl<E> Clone for Field<E> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<E> Copy for Field<E> {}

impl<E> fmt::Debug for Field<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Field").field(&self.name).finish()
    }
}

impl<E> fmt::Display for Field<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

impl<E> FieldRef for Field<E> {
    fn path(&self) -> String {
        self.name.to_string()
    }
}
