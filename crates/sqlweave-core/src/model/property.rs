use convert_case::{Case, Casing};

///
/// PropertyModel
/// Mapping of one persistent property to its column(s).
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PropertyModel {
    /// Property name as used in predicates and probes.
    pub name: String,
    /// Column on the owning table; empty for associations and collections.
    pub column: String,
    pub kind: PropertyKind,
    pub generated: Option<GeneratedValue>,
    pub jdbc_type: Option<String>,
    pub type_handler: Option<String>,
}

impl PropertyModel {
    fn with_kind(name: impl Into<String>, column: String, kind: PropertyKind) -> Self {
        Self {
            name: name.into(),
            column,
            kind,
            generated: None,
            jdbc_type: None,
            type_handler: None,
        }
    }

    /// Non-text scalar; the column defaults to `snake_case(name)`.
    #[must_use]
    pub fn basic(name: &str) -> Self {
        Self::with_kind(name, name.to_case(Case::Snake), PropertyKind::Basic { text: false })
    }

    /// Text scalar; eligible for string match modes.
    #[must_use]
    pub fn text(name: &str) -> Self {
        Self::with_kind(name, name.to_case(Case::Snake), PropertyKind::Basic { text: true })
    }

    #[must_use]
    pub fn embedded(name: &str, properties: Vec<Self>) -> Self {
        Self::with_kind(name, String::new(), PropertyKind::Embedded { properties })
    }

    #[must_use]
    pub fn collection(name: &str, collection: CollectionModel) -> Self {
        Self::with_kind(name, String::new(), PropertyKind::Collection(collection))
    }

    #[must_use]
    pub fn association(name: &str, association: AssociationModel) -> Self {
        Self::with_kind(name, String::new(), PropertyKind::Association(association))
    }

    #[must_use]
    pub fn column(mut self, column: impl Into<String>) -> Self {
        self.column = column.into();
        self
    }

    #[must_use]
    pub fn generated(mut self, generated: GeneratedValue) -> Self {
        self.generated = Some(generated);
        self
    }

    #[must_use]
    pub fn jdbc_type(mut self, jdbc_type: impl Into<String>) -> Self {
        self.jdbc_type = Some(jdbc_type.into());
        self
    }

    #[must_use]
    pub fn type_handler(mut self, type_handler: impl Into<String>) -> Self {
        self.type_handler = Some(type_handler.into());
        self
    }

    #[must_use]
    pub const fn is_association(&self) -> bool {
        matches!(self.kind, PropertyKind::Association(_))
    }

    #[must_use]
    pub const fn is_collection(&self) -> bool {
        matches!(self.kind, PropertyKind::Collection(_))
    }

    #[must_use]
    pub const fn is_embedded(&self) -> bool {
        matches!(self.kind, PropertyKind::Embedded { .. })
    }

    #[must_use]
    pub const fn is_text(&self) -> bool {
        matches!(self.kind, PropertyKind::Basic { text: true })
    }

    #[must_use]
    pub const fn association_model(&self) -> Option<&AssociationModel> {
        match &self.kind {
            PropertyKind::Association(assoc) => Some(assoc),
            _ => None,
        }
    }

    #[must_use]
    pub const fn collection_model(&self) -> Option<&CollectionModel> {
        match &self.kind {
            PropertyKind::Collection(coll) => Some(coll),
            _ => None,
        }
    }
}

///
/// PropertyKind
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum PropertyKind {
    Basic { text: bool },

    /// Value object flattened into the owning table.
    Embedded { properties: Vec<PropertyModel> },

    /// Element collection stored in its own table.
    Collection(CollectionModel),

    Association(AssociationModel),
}

///
/// CollectionModel
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct CollectionModel {
    pub table: String,
    /// Column of `table` referencing the owner's id.
    pub owner_column: String,
    pub element_column: String,
}

impl CollectionModel {
    #[must_use]
    pub fn new(
        table: impl Into<String>,
        owner_column: impl Into<String>,
        element_column: impl Into<String>,
    ) -> Self {
        Self {
            table: table.into(),
            owner_column: owner_column.into(),
            element_column: element_column.into(),
        }
    }
}

///
/// AssociationModel
///
/// Navigable reference to another entity, joined either through columns
/// (`ON target.foreign = parent.local`) or through a join table.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct AssociationModel {
    pub target: String,
    pub join_columns: Vec<JoinColumn>,
    pub join_table: Option<JoinTable>,
    pub to_many: bool,
}

impl AssociationModel {
    /// Many-to-one / one-to-one owning side: `local` lives on the parent table.
    #[must_use]
    pub fn to_one(target: impl Into<String>, local: &str, foreign: &str) -> Self {
        Self {
            target: target.into(),
            join_columns: vec![JoinColumn::new(local, foreign)],
            join_table: None,
            to_many: false,
        }
    }

    /// One-to-many mapped by a foreign key on the target table.
    #[must_use]
    pub fn to_many(target: impl Into<String>, local: &str, foreign: &str) -> Self {
        Self {
            target: target.into(),
            join_columns: vec![JoinColumn::new(local, foreign)],
            join_table: None,
            to_many: true,
        }
    }

    /// Many-to-many through a join table.
    #[must_use]
    pub fn through(target: impl Into<String>, join_table: JoinTable) -> Self {
        Self {
            target: target.into(),
            join_columns: Vec::new(),
            join_table: Some(join_table),
            to_many: true,
        }
    }

    /// Local FK column when the association is a single-column to-one.
    #[must_use]
    pub fn foreign_key_column(&self) -> Option<&str> {
        match (self.to_many, self.join_columns.as_slice()) {
            (false, [single]) => Some(single.local.as_str()),
            _ => None,
        }
    }
}

///
/// JoinColumn
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct JoinColumn {
    /// Column on the parent side.
    pub local: String,
    /// Column on the target side.
    pub foreign: String,
}

impl JoinColumn {
    #[must_use]
    pub fn new(local: &str, foreign: &str) -> Self {
        Self {
            local: local.to_string(),
            foreign: foreign.to_string(),
        }
    }
}

///
/// JoinTable
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct JoinTable {
    pub table: String,
    /// Join-table column referencing the parent id.
    pub owner_column: String,
    /// Join-table column referencing the target id.
    pub inverse_column: String,
}

impl JoinTable {
    #[must_use]
    pub fn new(table: &str, owner_column: &str, inverse_column: &str) -> Self {
        Self {
            table: table.to_string(),
            owner_column: owner_column.to_string(),
            inverse_column: inverse_column.to_string(),
        }
    }
}

///
/// GeneratedValue
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct GeneratedValue {
    pub strategy: GenerationType,
    /// Generator name resolved against sequence generators.
    pub generator: Option<String>,
}

impl GeneratedValue {
    #[must_use]
    pub const fn identity() -> Self {
        Self {
            strategy: GenerationType::Identity,
            generator: None,
        }
    }

    #[must_use]
    pub fn sequence(generator: Option<&str>) -> Self {
        Self {
            strategy: GenerationType::Sequence,
            generator: generator.map(ToString::to_string),
        }
    }
}

///
/// GenerationType
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum GenerationType {
    Identity,
    Sequence,
}
