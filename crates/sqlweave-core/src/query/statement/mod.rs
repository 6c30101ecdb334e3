//! SELECT / INSERT / UPDATE / DELETE assemblers.
//!
//! Each builder combines a column or SET list with a compiled condition chain
//! and the filters the mapping asks for: soft-delete, tenant and optimistic
//! locking. Filters are appended to the caller's conditions, never replace
//! them.

mod delete;
mod insert;
mod key;
mod select;
mod update;

#[cfg(test)]
mod tests;

pub use delete::DeleteBuilder;
pub use insert::InsertBuilder;
pub use key::KeyGeneration;
pub use select::SelectBuilder;
pub use update::UpdateBuilder;

use crate::{
    error::{ErrorOrigin, InternalError},
    model::{EntityModel, PropertyKind, PropertyModel, PropertyResolver, ResolvedPath},
    page::{LimitHandler, RowSelection},
    query::{
        join::Connectors,
        probe::{ExampleMatcher, Probe, ProbeConditions},
    },
    settings::Settings,
    sql::{BoundSql, ParamSet, ParamValue, Segment},
    value::{FieldValue, Value},
};
use derive_more::Display;

/// Parameter carrying the tenant discriminator.
pub const TENANT_PARAM: &str = "__tenant";

/// Parameter carrying the version a record was read with.
pub const VERSION_PARAM: &str = "__version";

/// Prefix of parameters holding record values in INSERT and UPDATE.
pub const RECORD_PREFIX: &str = "record";

///
/// QueryContext
///
/// Entry point for statement builders: the metadata seam plus the resolved
/// settings. Cheap to copy; builders hold their own copy.
///

#[derive(Clone, Copy)]
pub struct QueryContext<'a> {
    pub resolver: &'a dyn PropertyResolver,
    pub settings: &'a Settings,
}

impl<'a> QueryContext<'a> {
    #[must_use]
    pub const fn new(resolver: &'a dyn PropertyResolver, settings: &'a Settings) -> Self {
        Self { resolver, settings }
    }

    #[must_use]
    pub fn select(&self, entity: &str) -> SelectBuilder<'a> {
        SelectBuilder::new(*self, entity)
    }

    #[must_use]
    pub fn insert(&self, entity: &str) -> InsertBuilder<'a> {
        InsertBuilder::new(*self, entity)
    }

    #[must_use]
    pub fn update(&self, entity: &str) -> UpdateBuilder<'a> {
        UpdateBuilder::new(*self, entity)
    }

    #[must_use]
    pub fn delete(&self, entity: &str) -> DeleteBuilder<'a> {
        DeleteBuilder::new(*self, entity)
    }

    /// Conditions matching `probe` under `matcher`.
    pub fn probe(
        &self,
        probe: &dyn Probe,
        matcher: &ExampleMatcher,
    ) -> Result<ProbeConditions, InternalError> {
        matcher.derive(self.resolver, self.settings, probe)
    }

    /// Tenant column of `entity`, falling back to the configured default.
    fn tenant_column<'e>(&'e self, entity: &'e EntityModel) -> Option<&'e str> {
        entity
            .tenant_column
            .as_deref()
            .or(self.settings.tenant_column.as_deref())
    }
}

///
/// StatementKind
///

#[derive(Clone, Copy, Debug, Display, Eq, PartialEq)]
pub enum StatementKind {
    #[display("select")]
    Select,
    #[display("insert")]
    Insert,
    #[display("update")]
    Update,
    #[display("delete")]
    Delete,
    /// DELETE of a soft-deletable entity, issued as an UPDATE of its flag.
    #[display("soft-delete")]
    SoftDelete,
}

///
/// Direction
///

#[derive(Clone, Copy, Debug, Default, Display, Eq, PartialEq)]
pub enum Direction {
    #[default]
    #[display("ASC")]
    Asc,
    #[display("DESC")]
    Desc,
}

///
/// Statement
///
/// One compiled statement: the template segment, the values bound while
/// compiling it, the joins it needed and, for SELECT, the page window.
///

#[derive(Clone, Debug, PartialEq)]
pub struct Statement {
    pub kind: StatementKind,
    pub table: String,
    pub segment: Segment,
    pub connectors: Connectors,
    pub params: ParamSet,
    pub key: Option<KeyGeneration>,
    pub page: Option<RowSelection>,
    pub limit_handler: LimitHandler,
}

impl Statement {
    fn new(
        kind: StatementKind,
        table: &str,
        segment: Segment,
        connectors: Connectors,
        params: ParamSet,
        limit_handler: LimitHandler,
    ) -> Self {
        tracing::debug!(
            kind = %kind,
            table = %table,
            bindings = params.len(),
            connectors = connectors.len(),
            "compiled statement"
        );

        Self {
            kind,
            table: table.to_string(),
            segment,
            connectors,
            params,
            key: None,
            page: None,
            limit_handler,
        }
    }

    /// Bind a value known only at execution time (page bounds, ids, ...).
    pub fn set_param(&mut self, name: &str, value: impl FieldValue) {
        self.params.set(name, value);
    }

    /// Dynamic template text, pagination applied.
    pub fn template(&self) -> Result<String, InternalError> {
        let sql = self.segment.render();

        match &self.page {
            Some(selection) => self.limit_handler.apply(&sql, selection),
            None => Ok(sql),
        }
    }

    /// Positional SQL and values. Templated page bounds are read from the
    /// bound parameters and inlined as literals.
    pub fn bind(&self) -> Result<BoundSql, InternalError> {
        let mut bound = self.segment.bind(&self.params)?;

        if let Some(selection) = &self.page {
            let literal = self.literal_selection(selection)?;
            bound.sql = self.limit_handler.apply(&bound.sql, &literal)?;
        }

        Ok(bound)
    }

    fn literal_selection(&self, selection: &RowSelection) -> Result<RowSelection, InternalError> {
        match selection {
            RowSelection::Literal { .. } => Ok(selection.clone()),
            RowSelection::Templated {
                first_row,
                max_rows,
                ..
            } => Ok(RowSelection::literal(
                self.row_count(first_row)?,
                self.row_count(max_rows)?,
            )),
        }
    }

    fn row_count(&self, name: &str) -> Result<u64, InternalError> {
        let param = self.params.get(name).ok_or_else(|| {
            InternalError::arity(
                ErrorOrigin::Page,
                format!("page parameter '{name}' has no bound value"),
            )
        })?;

        match param.value {
            Value::Uint(n) => Ok(n),
            Value::Int(n) => u64::try_from(n).map_err(|_| {
                InternalError::mapping(
                    ErrorOrigin::Page,
                    format!("page parameter '{name}' is negative"),
                )
            }),
            ref other => Err(InternalError::mapping(
                ErrorOrigin::Page,
                format!("page parameter '{name}' is not a row count: {other}"),
            )),
        }
    }
}

///
/// Shared assembly helpers
///

/// `WHERE` with the caller's conditions first (parenthesized when filters
/// follow) and every filter ANDed after them.
fn where_clause(conditions: Segment, filters: Vec<Segment>) -> Option<Segment> {
    let mut parts = Vec::new();

    if !conditions.is_empty_literal() {
        if filters.is_empty() {
            parts.push(conditions);
        } else {
            parts.push(Segment::group(conditions));
        }
    }
    parts.extend(filters);

    if parts.is_empty() {
        return None;
    }

    let mut out = vec![Segment::literal(" WHERE ")];
    for (i, part) in parts.into_iter().enumerate() {
        if i > 0 {
            out.push(Segment::literal(" AND "));
        }
        out.push(part);
    }

    Some(Segment::Composite(out))
}

/// `column = <not deleted>` for soft-deletable entities.
fn soft_delete_filter(
    ctx: &QueryContext<'_>,
    entity: &EntityModel,
    qualifier: Option<&str>,
) -> Option<Segment> {
    let column = entity.logic_delete_column()?;

    Some(Segment::spaced(vec![
        Segment::column(qualifier, column),
        Segment::literal("="),
        Segment::literal(ctx.settings.logic_delete.not_deleted.as_str()),
    ]))
}

/// `tenant_column = #{__tenant}`, binding the tenant value.
fn tenant_filter(
    ctx: &QueryContext<'_>,
    entity: &EntityModel,
    qualifier: Option<&str>,
    tenant: Option<&ParamValue>,
    params: &mut ParamSet,
) -> Option<Segment> {
    let column = ctx.tenant_column(entity)?;
    let value = tenant?.clone().named(TENANT_PARAM);
    let binding = value.binding();
    params.insert(value);

    Some(Segment::spaced(vec![
        Segment::column(qualifier, column),
        Segment::literal("="),
        Segment::parameter(binding),
    ]))
}

/// Column written for a record property: scalars map to their column,
/// single-column to-one associations to their foreign key.
fn writable_column(path: &ResolvedPath) -> Result<&str, InternalError> {
    match &path.leaf.kind {
        PropertyKind::Basic { .. } => Ok(path.leaf_column()),
        PropertyKind::Association(assoc) => assoc.foreign_key_column().ok_or_else(|| {
            InternalError::mapping(
                ErrorOrigin::Statement,
                format!(
                    "association '{}' has no foreign key column on '{}'",
                    path.path, path.table
                ),
            )
        }),
        PropertyKind::Collection(_) => Err(InternalError::mapping(
            ErrorOrigin::Statement,
            format!("collection '{}' is not stored on '{}'", path.path, path.table),
        )),
        PropertyKind::Embedded { .. } => Err(InternalError::mapping(
            ErrorOrigin::Statement,
            format!(
                "embedded value '{}' must be written property by property",
                path.path
            ),
        )),
    }
}

/// Record values must live on the entity's own table.
fn resolve_record_path(
    ctx: &QueryContext<'_>,
    entity: &EntityModel,
    path: &str,
) -> Result<ResolvedPath, InternalError> {
    let resolved = ctx.resolver.resolve_path(&entity.name, path)?;
    if !resolved.joins.is_empty() {
        return Err(InternalError::mapping(
            ErrorOrigin::Statement,
            format!(
                "'{path}' belongs to another table and cannot be written through '{}'",
                entity.name
            ),
        ));
    }

    Ok(resolved)
}

/// Name a record value `record.<path>` and fill type hints from the mapping.
fn record_param(path: &str, mut value: ParamValue, property: &PropertyModel) -> ParamValue {
    value.name = Some(record_name(path));
    if value.jdbc_type.is_none() {
        value.jdbc_type.clone_from(&property.jdbc_type);
    }
    if value.type_handler.is_none() {
        value.type_handler.clone_from(&property.type_handler);
    }

    value
}

fn record_name(path: &str) -> String {
    format!("{RECORD_PREFIX}.{path}")
}

fn comma_separated(items: Vec<Segment>) -> Segment {
    let mut out = Vec::with_capacity(items.len() * 2);
    for (i, item) in items.into_iter().enumerate() {
        if i > 0 {
            out.push(Segment::literal(", "));
        }
        out.push(item);
    }

    Segment::Composite(out)
}
