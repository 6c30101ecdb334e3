use crate::{
    error::{ErrorOrigin, InternalError},
    query::{
        condition::Conditions,
        predicate::CompileContext,
        statement::{
            QueryContext, Statement, StatementKind, VERSION_PARAM, comma_separated,
            record_param, resolve_record_path, soft_delete_filter, tenant_filter, where_clause,
            writable_column,
        },
    },
    sql::{ParamSet, ParamValue, Segment},
    value::FieldValue,
};

///
/// UpdateBuilder
///
/// UPDATE statements use bare column names: conditions compile without
/// table aliases, so paths crossing an association are rejected.
///

#[must_use]
pub struct UpdateBuilder<'a> {
    ctx: QueryContext<'a>,
    entity: String,
    sets: Vec<(String, ParamValue)>,
    selective: bool,
    conditions: Conditions,
    tenant: Option<ParamValue>,
    version: Option<ParamValue>,
}

impl<'a> UpdateBuilder<'a> {
    pub(super) fn new(ctx: QueryContext<'a>, entity: &str) -> Self {
        Self {
            ctx,
            entity: entity.to_string(),
            sets: Vec::new(),
            selective: false,
            conditions: Conditions::new(),
            tenant: None,
            version: None,
        }
    }

    pub fn set(self, property: &str, value: impl FieldValue) -> Self {
        self.set_param(property, ParamValue::new(value))
    }

    pub fn set_param(mut self, property: &str, value: ParamValue) -> Self {
        self.sets.retain(|(p, _)| p != property);
        self.sets.push((property.to_string(), value));
        self
    }

    /// Skip assignments whose value is NULL.
    pub const fn selective(mut self) -> Self {
        self.selective = true;
        self
    }

    /// AND `conditions` onto any already present.
    pub fn filter(mut self, conditions: Conditions) -> Self {
        self.conditions = if self.conditions.is_empty() {
            conditions
        } else {
            std::mem::take(&mut self.conditions)
                .and()
                .group(|_| conditions)
        };
        self
    }

    pub fn tenant(mut self, value: impl FieldValue) -> Self {
        self.tenant = Some(ParamValue::new(value));
        self
    }

    /// Version the record was read with; enables the optimistic-lock check.
    pub fn expect_version(mut self, value: impl FieldValue) -> Self {
        self.version = Some(ParamValue::new(value));
        self
    }

    pub fn build(mut self) -> Result<Statement, InternalError> {
        let ctx = self.ctx;
        let entity = ctx.resolver.require_entity(&self.entity)?;
        let version = entity.version_property();

        let mut params = ParamSet::new();
        let mut assignments = Vec::new();

        for (path, value) in std::mem::take(&mut self.sets) {
            if entity.is_version(&path) {
                return Err(InternalError::mapping(
                    ErrorOrigin::Statement,
                    format!(
                        "version property '{path}' of '{}' is incremented by the update itself",
                        entity.name
                    ),
                ));
            }

            let resolved = resolve_record_path(&ctx, entity, &path)?;
            let column = writable_column(&resolved)?.to_string();
            if self.selective && value.value.is_null() {
                continue;
            }

            let param = record_param(&path, value, &resolved.leaf);
            assignments.push(Segment::spaced(vec![
                Segment::column(None, &column),
                Segment::literal("="),
                Segment::parameter(param.binding()),
            ]));
            params.insert(param);
        }

        if assignments.is_empty() {
            return Err(InternalError::mapping(
                ErrorOrigin::Statement,
                format!("update of '{}' sets no columns", entity.table),
            ));
        }

        if let Some(version) = version {
            assignments.push(Segment::literal(format!(
                "{0} = {0} + 1",
                version.column
            )));
        }

        let compile_ctx =
            CompileContext::new(ctx.resolver, &entity.name, ctx.settings).alias(false);
        let conditions = self.conditions.compile(&compile_ctx, &mut params)?;

        let mut filters: Vec<Segment> = [
            soft_delete_filter(&ctx, entity, None),
            tenant_filter(&ctx, entity, None, self.tenant.as_ref(), &mut params),
        ]
        .into_iter()
        .flatten()
        .collect();

        if let (Some(version), Some(expected)) = (version, self.version.take()) {
            let param = expected.named(VERSION_PARAM);
            filters.push(Segment::spaced(vec![
                Segment::column(None, &version.column),
                Segment::literal("="),
                Segment::parameter(param.binding()),
            ]));
            params.insert(param);
        }

        let mut parts = vec![
            Segment::literal(format!("UPDATE {} SET ", entity.table)),
            comma_separated(assignments),
        ];
        if let Some(clause) = where_clause(conditions.segment, filters) {
            parts.push(clause);
        }

        Ok(Statement::new(
            StatementKind::Update,
            &entity.table,
            Segment::Composite(parts),
            conditions.connectors,
            params,
            ctx.settings.dialect.limit_handler,
        ))
    }
}
