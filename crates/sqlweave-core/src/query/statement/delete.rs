use crate::{
    error::InternalError,
    query::{
        condition::Conditions,
        predicate::CompileContext,
        statement::{
            QueryContext, Statement, StatementKind, soft_delete_filter, tenant_filter,
            where_clause,
        },
    },
    sql::{ParamSet, ParamValue, Segment},
    value::FieldValue,
};

///
/// DeleteBuilder
///
/// Entities with a soft-delete property are never removed: the statement
/// becomes an UPDATE flagging the matching live rows as deleted.
///

#[must_use]
pub struct DeleteBuilder<'a> {
    ctx: QueryContext<'a>,
    entity: String,
    conditions: Conditions,
    tenant: Option<ParamValue>,
}

impl<'a> DeleteBuilder<'a> {
    pub(super) fn new(ctx: QueryContext<'a>, entity: &str) -> Self {
        Self {
            ctx,
            entity: entity.to_string(),
            conditions: Conditions::new(),
            tenant: None,
        }
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

    pub fn build(mut self) -> Result<Statement, InternalError> {
        let ctx = self.ctx;
        let entity = ctx.resolver.require_entity(&self.entity)?;
        let compile_ctx =
            CompileContext::new(ctx.resolver, &entity.name, ctx.settings).alias(false);

        let mut params = ParamSet::new();
        let conditions = self.conditions.compile(&compile_ctx, &mut params)?;

        let filters = [
            soft_delete_filter(&ctx, entity, None),
            tenant_filter(&ctx, entity, None, self.tenant.as_ref(), &mut params),
        ]
        .into_iter()
        .flatten()
        .collect();

        let (kind, head) = match entity.logic_delete_column() {
            Some(column) => (
                StatementKind::SoftDelete,
                format!(
                    "UPDATE {} SET {column} = {}",
                    entity.table, ctx.settings.logic_delete.deleted
                ),
            ),
            None => (StatementKind::Delete, format!("DELETE FROM {}", entity.table)),
        };

        let mut parts = vec![Segment::literal(head)];
        if let Some(clause) = where_clause(conditions.segment, filters) {
            parts.push(clause);
        }

        Ok(Statement::new(
            kind,
            &entity.table,
            Segment::Composite(parts),
            conditions.connectors,
            params,
            ctx.settings.dialect.limit_handler,
        ))
    }
}
