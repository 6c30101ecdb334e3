use crate::{
    error::{ErrorOrigin, InternalError},
    model::PropertyKind,
    query::{
        join::Connectors,
        statement::{
            KeyGeneration, QueryContext, Statement, StatementKind, TENANT_PARAM, comma_separated,
            record_param, resolve_record_path, writable_column,
        },
    },
    sql::{ParamSet, ParamValue, Segment},
    value::{FieldValue, Value},
};

///
/// InsertBuilder
///
/// Columns follow declaration order: scalars (embedded values flattened),
/// then single-column to-one foreign keys, then the tenant column.
/// Unsupplied soft-delete and version columns get their initial literals;
/// every other unsupplied column binds NULL unless the insert is selective.
///

#[must_use]
pub struct InsertBuilder<'a> {
    ctx: QueryContext<'a>,
    entity: String,
    values: Vec<(String, ParamValue)>,
    selective: bool,
    tenant: Option<ParamValue>,
}

impl<'a> InsertBuilder<'a> {
    pub(super) fn new(ctx: QueryContext<'a>, entity: &str) -> Self {
        Self {
            ctx,
            entity: entity.to_string(),
            values: Vec::new(),
            selective: false,
            tenant: None,
        }
    }

    pub fn value(self, property: &str, value: impl FieldValue) -> Self {
        self.param(property, ParamValue::new(value))
    }

    /// Value with explicit type hints.
    pub fn param(mut self, property: &str, value: ParamValue) -> Self {
        self.values.retain(|(p, _)| p != property);
        self.values.push((property.to_string(), value));
        self
    }

    /// Skip columns whose value is NULL.
    pub const fn selective(mut self) -> Self {
        self.selective = true;
        self
    }

    pub fn tenant(mut self, value: impl FieldValue) -> Self {
        self.tenant = Some(ParamValue::new(value));
        self
    }

    pub fn build(mut self) -> Result<Statement, InternalError> {
        let ctx = self.ctx;
        let entity = ctx.resolver.require_entity(&self.entity)?;
        let key = KeyGeneration::resolve(entity, ctx.settings)?;

        // every supplied value must map to a column of this table
        for (path, _) in &self.values {
            let resolved = resolve_record_path(&ctx, entity, path)?;
            writable_column(&resolved)?;
        }

        let mut params = ParamSet::new();
        let mut columns = Vec::new();
        let mut values = Vec::new();

        for (path, property) in entity.scalar_columns() {
            let supplied = self.take(&path);
            let is_id = path == entity.id;

            if is_id && supplied.is_none() && key.as_ref().is_some_and(KeyGeneration::is_identity) {
                continue;
            }

            let value = match supplied {
                Some(value) => value,
                None if entity.logic_delete.as_deref() == Some(path.as_str()) => {
                    columns.push(property.column.clone());
                    values.push(Segment::literal(ctx.settings.logic_delete.not_deleted.as_str()));
                    continue;
                }
                None if entity.is_version(&path) => {
                    columns.push(property.column.clone());
                    values.push(Segment::literal("0"));
                    continue;
                }
                None => ParamValue::new(Value::Null),
            };

            // sequence keys are bound by the executor before running the insert
            if self.selective && value.value.is_null() && !is_id {
                continue;
            }

            let param = record_param(&path, value, property);
            columns.push(property.column.clone());
            values.push(Segment::parameter(param.binding()));
            params.insert(param);
        }

        for property in &entity.properties {
            let PropertyKind::Association(assoc) = &property.kind else {
                continue;
            };
            let Some(column) = assoc.foreign_key_column() else {
                continue;
            };

            let value = self
                .take(&property.name)
                .unwrap_or_else(|| ParamValue::new(Value::Null));
            if self.selective && value.value.is_null() {
                continue;
            }

            let param = record_param(&property.name, value, property);
            columns.push(column.to_string());
            values.push(Segment::parameter(param.binding()));
            params.insert(param);
        }

        if let (Some(column), Some(tenant)) = (ctx.tenant_column(entity), self.tenant.take())
            && !columns.iter().any(|c| c == column)
        {
            let param = tenant.named(TENANT_PARAM);
            columns.push(column.to_string());
            values.push(Segment::parameter(param.binding()));
            params.insert(param);
        }

        if columns.is_empty() {
            return Err(InternalError::mapping(
                ErrorOrigin::Statement,
                format!("insert into '{}' writes no columns", entity.table),
            ));
        }

        let segment = Segment::Composite(vec![
            Segment::literal(format!(
                "INSERT INTO {} ({}) VALUES (",
                entity.table,
                columns.join(", ")
            )),
            comma_separated(values),
            Segment::literal(")"),
        ]);

        let mut statement = Statement::new(
            StatementKind::Insert,
            &entity.table,
            segment,
            Connectors::new(),
            params,
            ctx.settings.dialect.limit_handler,
        );
        statement.key = key;

        Ok(statement)
    }

    fn take(&mut self, path: &str) -> Option<ParamValue> {
        let at = self.values.iter().position(|(p, _)| p == path)?;

        Some(self.values.remove(at).1)
    }
}
