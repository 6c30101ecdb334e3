use crate::{
    error::{ErrorOrigin, InternalError},
    model::{PropertyKind, PropertyResolver, ResolvedPath},
    query::{
        join::{Connectors, connectors_for},
        predicate::{Predicate, PredicateType},
    },
    settings::Settings,
    sql::{LikeShape, ParamSink, ParamValue, Placeholder, Segment, template},
    value::Value,
};

///
/// CompileContext
///
/// Everything one predicate needs to resolve and render itself.
/// `alias` qualifies columns (root alias or quoted dot-path alias) and allows
/// joins; without it columns are bare and only root-table paths resolve.
/// `translate` swaps comparison operators for their XML-escaped tokens.
///

#[derive(Clone, Copy)]
pub struct CompileContext<'a> {
    pub resolver: &'a dyn PropertyResolver,
    pub entity: &'a str,
    pub settings: &'a Settings,
    pub translate: bool,
    pub alias: bool,
}

impl<'a> CompileContext<'a> {
    #[must_use]
    pub fn new(resolver: &'a dyn PropertyResolver, entity: &'a str, settings: &'a Settings) -> Self {
        Self {
            resolver,
            entity,
            settings,
            translate: false,
            alias: true,
        }
    }

    #[must_use]
    pub const fn translate(mut self, translate: bool) -> Self {
        self.translate = translate;
        self
    }

    #[must_use]
    pub const fn alias(mut self, alias: bool) -> Self {
        self.alias = alias;
        self
    }

    fn root_alias(&self) -> &str {
        &self.settings.root_alias
    }
}

///
/// PredicateResult
///

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct PredicateResult {
    pub segment: Segment,
    pub connectors: Connectors,
}

impl Predicate {
    /// Compile into a fragment plus the joins it needs.
    ///
    /// Values without a name are named `{field}_{group}_{index}` here (extra
    /// values of the same predicate get a `_{n}` suffix); names persist on
    /// the predicate so compiling twice binds the same names.
    pub fn compile(
        &mut self,
        ctx: &CompileContext<'_>,
        group: usize,
        index: usize,
        sink: &mut dyn ParamSink,
    ) -> Result<PredicateResult, InternalError> {
        let base = format!("{}_{group}_{index}", self.name_base());

        if self.kind == PredicateType::Custom {
            if let Some(field) = &self.field {
                ctx.resolver.resolve_path(ctx.entity, field)?;
            }
            let segment = self.compile_custom(&base, sink)?;
            tracing::trace!(kind = %self.kind, sql = %segment, "compiled custom predicate");

            return Ok(PredicateResult {
                segment,
                connectors: Connectors::new(),
            });
        }

        let field = self.field.clone().ok_or_else(|| {
            InternalError::mapping(
                ErrorOrigin::Predicate,
                format!("operator {} has no field", self.kind),
            )
        })?;

        let arity = self.kind.arity();
        if !arity.accepts(self.values.len()) {
            return Err(InternalError::arity(
                ErrorOrigin::Predicate,
                format!(
                    "operator {} on '{field}' expects {arity}, found {}",
                    self.kind,
                    self.values.len()
                ),
            ));
        }

        let resolved = ctx.resolver.resolve_path(ctx.entity, &field)?;
        for (n, param) in self.values.iter_mut().enumerate() {
            param.name_or_assign(|| match n {
                0 => base.clone(),
                n => format!("{base}_{n}"),
            });
            if param.jdbc_type.is_none() {
                param.jdbc_type.clone_from(&resolved.leaf.jdbc_type);
            }
            if param.type_handler.is_none() {
                param.type_handler.clone_from(&resolved.leaf.type_handler);
            }
        }

        let (qualifier, connectors) = qualify(ctx, &resolved)?;

        let segment = match &resolved.leaf.kind {
            PropertyKind::Basic { .. } => {
                let column = Segment::column(qualifier.as_deref(), resolved.leaf_column());
                self.compile_basic(ctx, &field, column, sink)?
            }
            PropertyKind::Association(_) => {
                self.compile_association(ctx, &resolved, qualifier.as_deref(), sink)?
            }
            PropertyKind::Collection(_) => {
                self.compile_collection(&resolved, qualifier.as_deref(), sink)?
            }
            PropertyKind::Embedded { .. } => {
                return Err(InternalError::mapping(
                    ErrorOrigin::Predicate,
                    format!("embedded property '{field}' cannot be compared as a whole"),
                ));
            }
        };

        tracing::trace!(
            field = %field,
            kind = %self.kind,
            sql = %segment,
            connectors = connectors.len(),
            "compiled predicate"
        );

        Ok(PredicateResult {
            segment,
            connectors,
        })
    }

    fn name_base(&self) -> String {
        self.field
            .as_deref()
            .map_or_else(|| "nofield".to_string(), |field| field.replace('.', "_"))
    }

    fn param(&self, n: usize) -> Result<&ParamValue, InternalError> {
        self.values.get(n).ok_or_else(|| {
            InternalError::arity(
                ErrorOrigin::Predicate,
                format!("operator {} has no value at position {}", self.kind, n + 1),
            )
        })
    }

    fn compile_basic(
        &self,
        ctx: &CompileContext<'_>,
        field: &str,
        column: Segment,
        sink: &mut dyn ParamSink,
    ) -> Result<Segment, InternalError> {
        let dialect = &ctx.settings.dialect;
        let fold = |segment: Segment| {
            if self.ignore_case {
                dialect.lower(segment)
            } else {
                segment
            }
        };
        let op = |plain: &'static str, translated: &'static str| {
            Segment::literal(if ctx.translate { translated } else { plain })
        };
        let escape = || Segment::literal(format!("ESCAPE {}", dialect.escape_literal()));

        let column = fold(column);

        let segment = match self.kind {
            PredicateType::Between => {
                let low = fold(sink.bind(self.param(0)?.clone()));
                let high = fold(sink.bind(self.param(1)?.clone()));

                Segment::spaced(vec![
                    column,
                    Segment::literal("BETWEEN"),
                    low,
                    Segment::literal("AND"),
                    high,
                ])
            }

            PredicateType::LessThan | PredicateType::Before => {
                let value = fold(sink.bind(self.param(0)?.clone()));
                Segment::spaced(vec![column, op("<", "&lt;"), value])
            }
            PredicateType::LessThanEqual => {
                let value = fold(sink.bind(self.param(0)?.clone()));
                Segment::spaced(vec![column, op("<=", "&lt;="), value])
            }
            PredicateType::GreaterThan | PredicateType::After => {
                let value = fold(sink.bind(self.param(0)?.clone()));
                Segment::spaced(vec![column, op(">", "&gt;"), value])
            }
            PredicateType::GreaterThanEqual => {
                let value = fold(sink.bind(self.param(0)?.clone()));
                Segment::spaced(vec![column, op(">=", "&gt;="), value])
            }

            PredicateType::IsNull => Segment::spaced(vec![column, Segment::literal("IS NULL")]),
            PredicateType::IsNotNull => {
                Segment::spaced(vec![column, Segment::literal("IS NOT NULL")])
            }

            PredicateType::In | PredicateType::NotIn => {
                let param = self.param(0)?.clone();
                let name = param.name.clone().unwrap_or_default();
                sink.bind(param);

                let keyword = if self.kind == PredicateType::In {
                    " IN "
                } else {
                    " NOT IN "
                };

                Segment::Composite(vec![
                    column,
                    Segment::literal(keyword),
                    Segment::choose_empty(
                        &name,
                        Segment::literal("(NULL)"),
                        if self.ignore_case {
                            Segment::foreach_applying(&name, "(", ")", dialect.lower_function)
                        } else {
                            Segment::foreach(&name, "(", ")")
                        },
                    ),
                ])
            }

            PredicateType::StartingWith
            | PredicateType::EndingWith
            | PredicateType::Containing
            | PredicateType::NotContaining => {
                let shape = match self.kind {
                    PredicateType::StartingWith => LikeShape::Starting,
                    PredicateType::EndingWith => LikeShape::Ending,
                    _ => LikeShape::Containing,
                };
                let param = self.param(0)?;
                let text = param.value.to_text().ok_or_else(|| {
                    InternalError::mapping(
                        ErrorOrigin::Predicate,
                        format!("operator {} on '{field}' needs a scalar value", self.kind),
                    )
                })?;
                let name = format!("__bind_{}", param.name.as_deref().unwrap_or_default());
                let pattern = shape.pattern(&text, dialect.escape_char);
                let value = fold(sink.bind(param.derived(name, Value::Text(pattern))));
                let keyword = if self.kind == PredicateType::NotContaining {
                    "NOT LIKE"
                } else {
                    "LIKE"
                };

                Segment::spaced(vec![column, Segment::literal(keyword), value, escape()])
            }

            PredicateType::Like | PredicateType::NotLike => {
                let value = fold(sink.bind(self.param(0)?.clone()));
                let keyword = if self.kind == PredicateType::Like {
                    "LIKE"
                } else {
                    "NOT LIKE"
                };

                Segment::spaced(vec![column, Segment::literal(keyword), value, escape()])
            }

            PredicateType::SimpleProperty | PredicateType::NegatingSimpleProperty => {
                let negate = self.kind == PredicateType::NegatingSimpleProperty;
                let param = self.param(0)?;

                if param.value.is_null() {
                    let test = if negate { "IS NOT NULL" } else { "IS NULL" };
                    Segment::spaced(vec![column, Segment::literal(test)])
                } else {
                    let value = fold(sink.bind(param.clone()));
                    let op = if negate { op("<>", "&lt;&gt;") } else { op("=", "=") };
                    Segment::spaced(vec![column, op, value])
                }
            }

            PredicateType::Regex => {
                let pattern = fold(sink.bind(self.param(0)?.clone()));
                dialect.regex(column, pattern)?
            }

            PredicateType::True | PredicateType::False => Segment::spaced(vec![
                column,
                Segment::literal("="),
                Segment::literal(dialect.boolean_literal(self.kind == PredicateType::True)),
            ]),

            PredicateType::IsEmpty | PredicateType::IsNotEmpty => {
                return Err(InternalError::unsupported(
                    ErrorOrigin::Predicate,
                    format!(
                        "operator {} needs a collection property, '{field}' is a scalar",
                        self.kind
                    ),
                ));
            }

            PredicateType::Custom => {
                return Err(InternalError::mapping(
                    ErrorOrigin::Predicate,
                    format!("custom predicate on '{field}' has no fragment"),
                ));
            }
        };

        Ok(segment)
    }

    // owner.local [NOT] IN (SELECT foreign FROM target WHERE target.id = ?)
    fn compile_association(
        &self,
        ctx: &CompileContext<'_>,
        resolved: &ResolvedPath,
        qualifier: Option<&str>,
        sink: &mut dyn ParamSink,
    ) -> Result<Segment, InternalError> {
        let assoc = resolved.leaf.association_model().ok_or_else(|| {
            InternalError::mapping(
                ErrorOrigin::Predicate,
                format!("'{}' is not an association", resolved.path),
            )
        })?;
        let owner = qualifier.unwrap_or(&resolved.table);

        // a to-one reference is null when its foreign key is
        if let Some(test) = match self.kind {
            PredicateType::IsNull => Some("IS NULL"),
            PredicateType::IsNotNull => Some("IS NOT NULL"),
            _ => None,
        } {
            let column = assoc.foreign_key_column().ok_or_else(|| {
                InternalError::unsupported(
                    ErrorOrigin::Predicate,
                    format!(
                        "operator {} on association '{}' needs a single foreign key column",
                        self.kind, resolved.path
                    ),
                )
            })?;

            return Ok(Segment::spaced(vec![
                Segment::column(Some(owner), column),
                Segment::literal(test),
            ]));
        }

        let keyword = self.membership_keyword(resolved)?;
        let value = sink.bind(self.param(0)?.clone());

        let (local, subquery) = if let Some(jt) = &assoc.join_table {
            (
                resolved.id_column.as_str(),
                format!(
                    "SELECT {} FROM {} WHERE {} = ",
                    jt.owner_column, jt.table, jt.inverse_column
                ),
            )
        } else {
            let [jc] = resolved.association_join_columns() else {
                return Err(InternalError::unsupported(
                    ErrorOrigin::Predicate,
                    format!(
                        "association '{}' has {} join columns, membership needs exactly one",
                        resolved.path,
                        assoc.join_columns.len()
                    ),
                ));
            };
            let target = ctx.resolver.require_entity(&assoc.target)?;

            (
                jc.local.as_str(),
                format!(
                    "SELECT {} FROM {} WHERE {} = ",
                    jc.foreign,
                    target.table,
                    target.id_column()
                ),
            )
        };

        Ok(Segment::Composite(vec![
            Segment::column(Some(owner), local),
            Segment::literal(keyword),
            Segment::group(Segment::Composite(vec![Segment::literal(subquery), value])),
        ]))
    }

    fn compile_collection(
        &self,
        resolved: &ResolvedPath,
        qualifier: Option<&str>,
        sink: &mut dyn ParamSink,
    ) -> Result<Segment, InternalError> {
        let coll = resolved.leaf.collection_model().ok_or_else(|| {
            InternalError::mapping(
                ErrorOrigin::Predicate,
                format!("'{}' is not a collection", resolved.path),
            )
        })?;
        let owner = qualifier.unwrap_or(&resolved.table);
        let owner_id = Segment::column(Some(owner), &resolved.id_column);

        match self.kind {
            PredicateType::IsEmpty | PredicateType::IsNotEmpty => {
                let keyword = if self.kind == PredicateType::IsEmpty {
                    "NOT EXISTS "
                } else {
                    "EXISTS "
                };
                let subquery = format!(
                    "SELECT 1 FROM {table} WHERE {table}.{} = ",
                    coll.owner_column,
                    table = coll.table
                );

                Ok(Segment::Composite(vec![
                    Segment::literal(keyword),
                    Segment::group(Segment::Composite(vec![
                        Segment::literal(subquery),
                        owner_id,
                    ])),
                ]))
            }
            _ => {
                let keyword = self.membership_keyword(resolved)?;
                let value = sink.bind(self.param(0)?.clone());
                let subquery = format!(
                    "SELECT {} FROM {} WHERE {} = ",
                    coll.owner_column, coll.table, coll.element_column
                );

                Ok(Segment::Composite(vec![
                    owner_id,
                    Segment::literal(keyword),
                    Segment::group(Segment::Composite(vec![Segment::literal(subquery), value])),
                ]))
            }
        }
    }

    fn membership_keyword(&self, resolved: &ResolvedPath) -> Result<&'static str, InternalError> {
        match self.kind {
            PredicateType::Containing => Ok(" IN "),
            PredicateType::NotContaining => Ok(" NOT IN "),
            kind => Err(InternalError::mapping(
                ErrorOrigin::Predicate,
                format!(
                    "operator {kind} is not supported on {} '{}'; use CONTAINING or NOT_CONTAINING",
                    if resolved.leaf_is_association() {
                        "association"
                    } else {
                        "collection"
                    },
                    resolved.path
                ),
            )),
        }
    }

    fn compile_custom(
        &mut self,
        base: &str,
        sink: &mut dyn ParamSink,
    ) -> Result<Segment, InternalError> {
        let Some(sql) = self.sql.as_deref() else {
            return Err(InternalError::mapping(
                ErrorOrigin::Predicate,
                "custom predicate has no fragment",
            ));
        };
        let values = &mut self.values;

        template::parse(
            sql,
            base,
            |placeholder| match placeholder {
                Placeholder::Positional(n) => {
                    let param = n
                        .checked_sub(1)
                        .and_then(|i| values.get_mut(i))
                        .ok_or_else(|| missing_value(&format!("?{n}")))?;
                    param.name_or_assign(|| format!("{base}_{n}"));

                    Ok(param.clone())
                }
                Placeholder::Named(name) => {
                    if let Some(param) = values
                        .iter()
                        .find(|p| p.name.as_deref() == Some(name.as_str()))
                    {
                        return Ok(param.clone());
                    }
                    let param = values
                        .iter_mut()
                        .find(|p| p.name.is_none())
                        .ok_or_else(|| missing_value(&format!(":{name}")))?;
                    param.name_or_assign(|| name.clone());

                    Ok(param.clone())
                }
            },
            sink,
        )
    }
}

fn missing_value(placeholder: &str) -> InternalError {
    InternalError::arity(
        ErrorOrigin::Predicate,
        format!("placeholder {placeholder} has no supplied value"),
    )
}

// Column qualifier plus the joins that introduce it.
pub(crate) fn qualify(
    ctx: &CompileContext<'_>,
    resolved: &ResolvedPath,
) -> Result<(Option<String>, Connectors), InternalError> {
    let dialect = &ctx.settings.dialect;

    if !ctx.alias {
        if !resolved.joins.is_empty() {
            return Err(InternalError::mapping(
                ErrorOrigin::Predicate,
                format!(
                    "path '{}' crosses an association, which needs table aliases",
                    resolved.path
                ),
            ));
        }

        return Ok((None, Connectors::new()));
    }

    let qualifier = resolved
        .alias
        .as_deref()
        .map_or_else(|| ctx.root_alias().to_string(), |alias| dialect.quote(alias));
    let connectors = connectors_for(dialect, ctx.root_alias(), &resolved.joins);

    Ok((Some(qualifier), connectors))
}
