use crate::{
    error::{ErrorOrigin, InternalError},
    model::{EntityModel, PropertyKind},
    page::RowSelection,
    query::{
        condition::Conditions,
        field::FieldRef,
        join::Connectors,
        predicate::{CompileContext, qualify},
        statement::{
            Direction, QueryContext, Statement, StatementKind, comma_separated, soft_delete_filter,
            tenant_filter, where_clause,
        },
    },
    sql::{ParamSet, ParamValue, Segment},
    value::FieldValue,
};

///
/// SelectBuilder
///
/// Select list layering: typed fields first, then raw column expressions,
/// then a raw select-list fragment. With none of them every scalar column is
/// selected under its property name.
///

#[must_use]
pub struct SelectBuilder<'a> {
    ctx: QueryContext<'a>,
    entity: String,
    fields: Vec<String>,
    columns: Vec<String>,
    raw: Option<String>,
    distinct: bool,
    count: bool,
    conditions: Conditions,
    order: Vec<(String, Direction)>,
    page: Option<RowSelection>,
    tenant: Option<ParamValue>,
}

impl<'a> SelectBuilder<'a> {
    pub(super) fn new(ctx: QueryContext<'a>, entity: &str) -> Self {
        Self {
            ctx,
            entity: entity.to_string(),
            fields: Vec::new(),
            columns: Vec::new(),
            raw: None,
            distinct: false,
            count: false,
            conditions: Conditions::new(),
            order: Vec::new(),
            page: None,
            tenant: None,
        }
    }

    pub fn field(mut self, field: impl FieldRef) -> Self {
        self.fields.push(field.path());
        self
    }

    pub fn fields<F: FieldRef>(mut self, fields: impl IntoIterator<Item = F>) -> Self {
        self.fields.extend(fields.into_iter().map(|f| f.path()));
        self
    }

    /// Raw column expression, emitted verbatim.
    pub fn column(mut self, column: &str) -> Self {
        self.columns.push(column.to_string());
        self
    }

    /// Raw select-list fragment appended after fields and columns.
    pub fn raw(mut self, sql: &str) -> Self {
        self.raw = Some(sql.to_string());
        self
    }

    pub const fn distinct(mut self) -> Self {
        self.distinct = true;
        self
    }

    /// Select `COUNT(*)` (or a distinct id count) instead of columns.
    pub const fn count(mut self) -> Self {
        self.count = true;
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

    pub fn order_by(mut self, field: impl FieldRef, direction: Direction) -> Self {
        self.order.push((field.path(), direction));
        self
    }

    pub fn paginate(mut self, selection: RowSelection) -> Self {
        self.page = Some(selection);
        self
    }

    pub fn tenant(mut self, value: impl FieldValue) -> Self {
        self.tenant = Some(ParamValue::new(value));
        self
    }

    pub fn build(mut self) -> Result<Statement, InternalError> {
        let ctx = self.ctx;
        let entity = ctx.resolver.require_entity(&self.entity)?;
        let alias = ctx.settings.root_alias.as_str();
        let compile_ctx = CompileContext::new(ctx.resolver, &entity.name, ctx.settings);

        let mut params = ParamSet::new();
        let mut connectors = Connectors::new();

        let list = self.select_list(&compile_ctx, entity, &mut connectors)?;

        let conditions = self.conditions.compile(&compile_ctx, &mut params)?;
        connectors.extend(conditions.connectors);

        let mut order = Vec::with_capacity(self.order.len());
        for (field, direction) in &self.order {
            let (column, joins) = self.resolve_column(&compile_ctx, field)?;
            connectors.extend(joins);
            order.push(Segment::literal(format!("{} {direction}", column.render())));
        }

        let filters = [
            soft_delete_filter(&ctx, entity, Some(alias)),
            tenant_filter(&ctx, entity, Some(alias), self.tenant.as_ref(), &mut params),
        ]
        .into_iter()
        .flatten()
        .collect();

        let mut parts = vec![Segment::literal("SELECT ")];
        if self.distinct && !self.count {
            parts.push(Segment::literal("DISTINCT "));
        }
        parts.push(list);
        parts.push(Segment::literal(format!(" FROM {} {alias}", entity.table)));
        for clause in connectors.iter() {
            parts.push(Segment::literal(format!(" {clause}")));
        }
        if let Some(clause) = where_clause(conditions.segment, filters) {
            parts.push(clause);
        }
        if !order.is_empty() {
            parts.push(Segment::literal(" ORDER BY "));
            parts.push(comma_separated(order));
        }

        let mut statement = Statement::new(
            StatementKind::Select,
            &entity.table,
            Segment::Composite(parts),
            connectors,
            params,
            ctx.settings.dialect.limit_handler,
        );
        statement.page = self.page;

        Ok(statement)
    }

    fn select_list(
        &self,
        ctx: &CompileContext<'_>,
        entity: &EntityModel,
        connectors: &mut Connectors,
    ) -> Result<Segment, InternalError> {
        let dialect = &ctx.settings.dialect;
        let alias = ctx.settings.root_alias.as_str();

        if self.count {
            let counted = if self.distinct {
                format!("COUNT(DISTINCT {alias}.{})", entity.id_column())
            } else {
                "COUNT(*)".to_string()
            };
            return Ok(Segment::literal(counted));
        }

        let mut items = Vec::new();
        for field in &self.fields {
            let (column, joins) = self.resolve_column(ctx, field)?;
            connectors.extend(joins);
            items.push(Segment::spaced(vec![
                column,
                Segment::literal("AS"),
                Segment::literal(dialect.quote(field)),
            ]));
        }
        items.extend(self.columns.iter().map(|c| Segment::literal(c.as_str())));
        if let Some(raw) = &self.raw {
            items.push(Segment::literal(raw.as_str()));
        }

        if items.is_empty() {
            items = entity
                .scalar_columns()
                .into_iter()
                .map(|(path, property)| {
                    Segment::spaced(vec![
                        Segment::column(Some(alias), &property.column),
                        Segment::literal("AS"),
                        Segment::literal(dialect.quote(&path)),
                    ])
                })
                .collect();
        }

        Ok(comma_separated(items))
    }

    /// Qualified scalar column for `field` plus the joins reaching it.
    fn resolve_column(
        &self,
        ctx: &CompileContext<'_>,
        field: &str,
    ) -> Result<(Segment, Connectors), InternalError> {
        let resolved = ctx.resolver.resolve_path(&self.entity, field)?;
        if !matches!(resolved.leaf.kind, PropertyKind::Basic { .. }) {
            return Err(InternalError::mapping(
                ErrorOrigin::Statement,
                format!(
                    "'{field}' of '{}' is not a scalar column and cannot be selected or ordered",
                    self.entity
                ),
            ));
        }

        let (qualifier, connectors) = qualify(ctx, &resolved)?;

        Ok((
            Segment::column(qualifier.as_deref(), resolved.leaf_column()),
            connectors,
        ))
    }
}
