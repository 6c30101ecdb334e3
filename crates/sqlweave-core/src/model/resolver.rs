use crate::{
    error::{ErrorOrigin, InternalError},
    model::{
        entity::EntityModel,
        property::{AssociationModel, JoinColumn, PropertyKind, PropertyModel},
    },
};
use std::collections::BTreeMap;

///
/// PropertyResolver
///
/// Read-only access to entity metadata. Implementations must tolerate
/// concurrent readers; the compiler never mutates through this seam.
///

pub trait PropertyResolver {
    fn entity(&self, name: &str) -> Option<&EntityModel>;

    fn require_entity(&self, name: &str) -> Result<&EntityModel, InternalError> {
        self.entity(name).ok_or_else(|| {
            InternalError::mapping(ErrorOrigin::Model, format!("unknown entity '{name}'"))
        })
    }

    /// Resolve a dotted property path against `entity`.
    ///
    /// Embedded properties are traversed in place; associations add a
    /// [`JoinHop`] and switch the current entity to their target. Any other
    /// property in a non-leaf position is a mapping error.
    fn resolve_path(&self, entity: &str, path: &str) -> Result<ResolvedPath, InternalError> {
        let root = self.require_entity(entity)?;
        let segments: Vec<&str> = path.split('.').collect();
        if segments.iter().any(|s| s.is_empty()) {
            return Err(InternalError::mapping(
                ErrorOrigin::Model,
                format!("malformed property path '{path}' on entity '{entity}'"),
            ));
        }

        let mut current = root;
        let mut scope: &[PropertyModel] = &root.properties;
        let mut joins = Vec::new();
        let mut parent_alias: Option<String> = None;

        for (i, segment) in segments.iter().enumerate() {
            let property = scope.iter().find(|p| p.name == *segment).ok_or_else(|| {
                InternalError::mapping(
                    ErrorOrigin::Model,
                    format!(
                        "no property '{segment}' on entity '{}' while resolving path '{path}'",
                        current.name
                    ),
                )
            })?;

            if i + 1 == segments.len() {
                return Ok(ResolvedPath {
                    path: path.to_string(),
                    entity: current.name.clone(),
                    table: current.table.clone(),
                    id_column: current.id_column().to_string(),
                    alias: parent_alias,
                    leaf: property.clone(),
                    joins,
                });
            }

            match &property.kind {
                PropertyKind::Embedded { properties } => scope = properties,
                PropertyKind::Association(assoc) => {
                    let target = self.entity(&assoc.target).ok_or_else(|| {
                        InternalError::mapping(
                            ErrorOrigin::Model,
                            format!(
                                "association '{segment}' of '{}' targets unknown entity '{}'",
                                current.name, assoc.target
                            ),
                        )
                    })?;
                    let alias = segments[..=i].join(".");

                    joins.push(JoinHop {
                        alias: alias.clone(),
                        parent_alias: parent_alias.take(),
                        parent_id_column: current.id_column().to_string(),
                        table: target.table.clone(),
                        target_id_column: target.id_column().to_string(),
                        association: assoc.clone(),
                    });

                    parent_alias = Some(alias);
                    current = target;
                    scope = &target.properties;
                }
                PropertyKind::Basic { .. } | PropertyKind::Collection(_) => {
                    return Err(InternalError::mapping(
                        ErrorOrigin::Model,
                        format!(
                            "property '{segment}' of '{}' is not navigable in path '{path}'",
                            current.name
                        ),
                    ));
                }
            }
        }

        // segments is never empty: split always yields at least one item
        Err(InternalError::mapping(
            ErrorOrigin::Model,
            format!("empty property path on entity '{entity}'"),
        ))
    }
}

///
/// ResolvedPath
/// Result of resolving one dotted path: the leaf mapping plus the joins
/// needed to reach its table.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ResolvedPath {
    pub path: String,
    /// Entity owning the leaf property.
    pub entity: String,
    pub table: String,
    pub id_column: String,
    /// Dot-path of the intermediate associations; `None` on the root table.
    pub alias: Option<String>,
    pub leaf: PropertyModel,
    pub joins: Vec<JoinHop>,
}

impl ResolvedPath {
    #[must_use]
    pub fn leaf_column(&self) -> &str {
        &self.leaf.column
    }

    #[must_use]
    pub const fn leaf_is_association(&self) -> bool {
        self.leaf.is_association()
    }

    #[must_use]
    pub const fn leaf_is_collection(&self) -> bool {
        self.leaf.is_collection()
    }

    #[must_use]
    pub fn association_join_columns(&self) -> &[JoinColumn] {
        self.leaf
            .association_model()
            .map(|assoc| assoc.join_columns.as_slice())
            .unwrap_or_default()
    }

    #[must_use]
    pub fn target_entity(&self) -> Option<&str> {
        self.leaf
            .association_model()
            .map(|assoc| assoc.target.as_str())
    }
}

///
/// JoinHop
/// One association traversed on the way to a leaf.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct JoinHop {
    /// Dot-path alias of the joined table.
    pub alias: String,
    /// Alias of the table joined from; `None` for the root table.
    pub parent_alias: Option<String>,
    pub parent_id_column: String,
    pub table: String,
    pub target_id_column: String,
    pub association: AssociationModel,
}

///
/// Schema
/// In-memory entity registry.
///

#[derive(Clone, Debug, Default)]
pub struct Schema {
    entities: BTreeMap<String, EntityModel>,
}

impl Schema {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with(mut self, entity: EntityModel) -> Self {
        self.register(entity);
        self
    }

    pub fn register(&mut self, entity: EntityModel) {
        self.entities.insert(entity.name.clone(), entity);
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }
}

impl PropertyResolver for Schema {
    fn entity(&self, name: &str) -> Option<&EntityModel> {
        self.entities.get(name)
    }
}
