use super::*;
use crate::{
    DialectKind,
    error::ErrorClass,
    model::{EntityModel, GeneratedValue, GenerationType, PropertyModel, Schema},
    query::condition::Conditions,
    test_fixtures,
};
use sqlweave_config::LogicDeleteConfig;

fn template(statement: &Statement) -> String {
    statement.template().expect("template")
}

// ---------------------------------------------------------------------
// select
// ---------------------------------------------------------------------

#[test]
fn select_defaults_to_every_scalar_column() {
    let schema = test_fixtures::schema();
    let settings = test_fixtures::settings();
    let ctx = QueryContext::new(&schema, &settings);

    let statement = ctx.select("Note").build().expect("select");

    assert_eq!(statement.kind, StatementKind::Select);
    assert_eq!(
        template(&statement),
        r#"SELECT t.id AS "id", t.body AS "body", t.priority AS "priority" FROM notes t"#
    );
}

#[test]
fn embedded_columns_are_selected_under_dotted_names() {
    let schema = test_fixtures::schema();
    let settings = test_fixtures::settings();
    let ctx = QueryContext::new(&schema, &settings);

    let sql = template(&ctx.select("User").build().expect("select"));

    assert!(sql.contains(r#"t.addr_city AS "address.city", t.addr_street AS "address.street""#));
    assert!(sql.contains(r#"t.created_at AS "createdAt""#));
    assert!(sql.ends_with("FROM users t WHERE t.deleted = 0"));
}

#[test]
fn filters_are_appended_after_the_callers_conditions() {
    let schema = test_fixtures::schema();
    let settings = test_fixtures::settings();
    let ctx = QueryContext::new(&schema, &settings);

    let statement = ctx
        .select("User")
        .field("firstname")
        .filter(Conditions::new().eq("firstname", "a").or().eq("lastname", "b"))
        .tenant(7)
        .build()
        .expect("select");

    assert_eq!(
        template(&statement),
        concat!(
            r#"SELECT t.firstname AS "firstname" FROM users t "#,
            "WHERE (t.firstname = #{firstname_0_0} OR t.lastname = #{lastname_0_1}) ",
            "AND t.deleted = 0 AND t.tenant_id = #{__tenant}"
        )
    );

    let bound = statement.bind().expect("bind");
    assert_eq!(
        bound.values,
        vec![Value::Text("a".into()), Value::Text("b".into()), Value::Int(7)]
    );
}

#[test]
fn tenant_filter_needs_a_value_and_a_column() {
    let schema = test_fixtures::schema();
    let settings = test_fixtures::settings();
    let ctx = QueryContext::new(&schema, &settings);

    let without_value = template(&ctx.select("User").count().build().expect("select"));
    assert_eq!(without_value, "SELECT COUNT(*) FROM users t WHERE t.deleted = 0");

    let without_column = ctx.select("Note").count().tenant(7).build().expect("select");
    assert_eq!(template(&without_column), "SELECT COUNT(*) FROM notes t");
    assert!(without_column.params.is_empty());
}

#[test]
fn joined_fields_and_ordering_add_connectors() {
    let schema = test_fixtures::schema();
    let settings = test_fixtures::settings();
    let ctx = QueryContext::new(&schema, &settings);

    let statement = ctx
        .select("User")
        .field("firstname")
        .field("department.name")
        .order_by("department.company.name", Direction::Desc)
        .order_by("age", Direction::Asc)
        .build()
        .expect("select");

    assert_eq!(statement.connectors.len(), 2);
    assert_eq!(
        template(&statement),
        concat!(
            r#"SELECT t.firstname AS "firstname", "department".name AS "department.name" "#,
            "FROM users t ",
            r#"LEFT OUTER JOIN departments "department" ON "department".id = t.department_id "#,
            r#"LEFT OUTER JOIN companies "department.company" ON "department.company".id = "department".company_id "#,
            "WHERE t.deleted = 0 ",
            r#"ORDER BY "department.company".name DESC, t.age ASC"#
        )
    );
}

#[test]
fn select_list_layers_fields_columns_and_raw_sql() {
    let schema = test_fixtures::schema();
    let settings = test_fixtures::settings();
    let ctx = QueryContext::new(&schema, &settings);

    let statement = ctx
        .select("Note")
        .field("body")
        .column("LENGTH(t.body) AS len")
        .raw("1 AS one")
        .build()
        .expect("select");

    assert_eq!(
        template(&statement),
        r#"SELECT t.body AS "body", LENGTH(t.body) AS len, 1 AS one FROM notes t"#
    );
}

#[test]
fn distinct_and_count() {
    let schema = test_fixtures::schema();
    let settings = test_fixtures::settings();
    let ctx = QueryContext::new(&schema, &settings);

    let distinct = ctx.select("Note").distinct().field("body").build().expect("select");
    assert_eq!(
        template(&distinct),
        r#"SELECT DISTINCT t.body AS "body" FROM notes t"#
    );

    let counted = ctx.select("Note").distinct().count().build().expect("select");
    assert_eq!(template(&counted), "SELECT COUNT(DISTINCT t.id) FROM notes t");
}

#[test]
fn repeated_filters_are_grouped() {
    let schema = test_fixtures::schema();
    let settings = test_fixtures::settings();
    let ctx = QueryContext::new(&schema, &settings);

    let statement = ctx
        .select("Note")
        .count()
        .filter(Conditions::new().eq("body", "x"))
        .filter(Conditions::new().eq("priority", 1).or().eq("priority", 2))
        .build()
        .expect("select");

    assert_eq!(
        template(&statement),
        concat!(
            "SELECT COUNT(*) FROM notes t WHERE t.body = #{body_0_0} ",
            "AND (t.priority = #{priority_1_0} OR t.priority = #{priority_1_1})"
        )
    );
}

#[test]
fn root_alias_comes_from_settings() {
    let schema = test_fixtures::schema();
    let settings = test_fixtures::settings().root_alias("n");
    let ctx = QueryContext::new(&schema, &settings);

    let statement = ctx
        .select("Note")
        .field("body")
        .filter(Conditions::new().gt("priority", 2))
        .build()
        .expect("select");

    assert_eq!(
        template(&statement),
        r#"SELECT n.body AS "body" FROM notes n WHERE n.priority > #{priority_0_0}"#
    );
}

#[test]
fn only_scalar_columns_can_be_selected() {
    let schema = test_fixtures::schema();
    let settings = test_fixtures::settings();
    let ctx = QueryContext::new(&schema, &settings);

    let err = ctx.select("User").field("tags").build().expect_err("collection");
    assert_eq!(err.class, ErrorClass::Mapping);

    let err = ctx
        .select("User")
        .order_by("department", Direction::Asc)
        .build()
        .expect_err("association");
    assert_eq!(err.class, ErrorClass::Mapping);

    let err = ctx.select("Ghost").build().expect_err("unknown entity");
    assert_eq!(err.class, ErrorClass::Mapping);
}

// ---------------------------------------------------------------------
// pagination
// ---------------------------------------------------------------------

#[test]
fn literal_pages_rewrite_template_and_bound_sql() {
    let schema = test_fixtures::schema();
    let settings = test_fixtures::settings();
    let ctx = QueryContext::new(&schema, &settings);

    let statement = ctx
        .select("Note")
        .field("body")
        .paginate(RowSelection::literal(20, 10))
        .build()
        .expect("select");

    assert_eq!(
        template(&statement),
        r#"SELECT t.body AS "body" FROM notes t LIMIT 10 OFFSET 20"#
    );
    assert_eq!(
        statement.bind().expect("bind").sql,
        r#"SELECT t.body AS "body" FROM notes t LIMIT 10 OFFSET 20"#
    );
}

#[test]
fn templated_pages_are_bound_from_parameters() {
    let schema = test_fixtures::schema();
    let settings = test_fixtures::settings();
    let ctx = QueryContext::new(&schema, &settings);

    let mut statement = ctx
        .select("Note")
        .field("body")
        .paginate(RowSelection::templated())
        .build()
        .expect("select");

    assert_eq!(
        template(&statement),
        r#"SELECT t.body AS "body" FROM notes t LIMIT #{pageSize} OFFSET #{offset}"#
    );

    let err = statement.bind().expect_err("unbound page");
    assert_eq!(err.class, ErrorClass::Arity);

    statement.set_param(RowSelection::DEFAULT_FIRST_ROW, 0_u64);
    statement.set_param(RowSelection::DEFAULT_MAX_ROWS, 5_u64);
    let bound = statement.bind().expect("bind");
    assert_eq!(bound.sql, r#"SELECT t.body AS "body" FROM notes t LIMIT 5"#);
    assert!(bound.values.is_empty());

    statement.set_param(RowSelection::DEFAULT_FIRST_ROW, -1);
    let err = statement.bind().expect_err("negative offset");
    assert_eq!(err.class, ErrorClass::Mapping);
}

#[test]
fn pages_follow_the_dialect() {
    let schema = test_fixtures::schema();
    let settings = Settings::new(DialectKind::MySql);
    let ctx = QueryContext::new(&schema, &settings);

    let statement = ctx
        .select("Note")
        .field("body")
        .paginate(RowSelection::literal(20, 10))
        .build()
        .expect("select");

    assert_eq!(
        template(&statement),
        "SELECT t.body AS `body` FROM notes t LIMIT 20, 10"
    );
}

// ---------------------------------------------------------------------
// insert
// ---------------------------------------------------------------------

#[test]
fn insert_writes_every_column_in_declaration_order() {
    let schema = test_fixtures::schema();
    let settings = test_fixtures::settings();
    let ctx = QueryContext::new(&schema, &settings);

    let statement = ctx
        .insert("User")
        .value("firstname", "Ann")
        .value("address.city", "Oslo")
        .value("department", 3)
        .tenant(7)
        .build()
        .expect("insert");

    assert_eq!(statement.kind, StatementKind::Insert);
    assert_eq!(
        template(&statement),
        concat!(
            "INSERT INTO users (firstname, lastname, email, age, active, created_at, ",
            "addr_city, addr_street, deleted, version, department_id, tenant_id) VALUES (",
            "#{record.firstname}, #{record.lastname}, #{record.email}, #{record.age}, ",
            "#{record.active}, #{record.createdAt}, #{record.address.city}, ",
            "#{record.address.street}, 0, 0, #{record.department}, #{__tenant})"
        )
    );

    let key = statement.key.as_ref().expect("identity key");
    assert_eq!(key.strategy, GenerationType::Identity);
    assert!(!key.before);
    assert_eq!(
        key.select,
        "SELECT currval(pg_get_serial_sequence('users', 'id'))"
    );
}

#[test]
fn selective_insert_skips_null_values() {
    let schema = test_fixtures::schema();
    let settings = test_fixtures::settings();
    let ctx = QueryContext::new(&schema, &settings);

    let statement = ctx
        .insert("User")
        .value("firstname", "Ann")
        .value("lastname", None::<&str>)
        .value("age", 30)
        .value("address.city", "Oslo")
        .value("department", 3)
        .tenant(7)
        .selective()
        .build()
        .expect("insert");

    assert_eq!(
        template(&statement),
        concat!(
            "INSERT INTO users (firstname, age, addr_city, deleted, version, department_id, tenant_id) ",
            "VALUES (#{record.firstname}, #{record.age}, #{record.address.city}, 0, 0, ",
            "#{record.department}, #{__tenant})"
        )
    );

    let bound = statement.bind().expect("bind");
    assert_eq!(
        bound.values,
        vec![
            Value::Text("Ann".into()),
            Value::Int(30),
            Value::Text("Oslo".into()),
            Value::Int(3),
            Value::Int(7),
        ]
    );
}

#[test]
fn supplied_flags_override_initial_literals() {
    let schema = test_fixtures::schema();
    let settings = test_fixtures::settings();
    let ctx = QueryContext::new(&schema, &settings);

    let statement = ctx
        .insert("User")
        .value("firstname", "Ann")
        .value("version", 4)
        .selective()
        .build()
        .expect("insert");

    assert_eq!(
        template(&statement),
        "INSERT INTO users (firstname, deleted, version) VALUES (#{record.firstname}, 0, #{record.version})"
    );
}

#[test]
fn sequence_keys_are_bound_before_the_insert() {
    let schema = test_fixtures::schema();
    let settings = test_fixtures::settings();
    let ctx = QueryContext::new(&schema, &settings);

    let mut statement = ctx
        .insert("Order")
        .value("total", 10)
        .selective()
        .build()
        .expect("insert");

    assert_eq!(
        template(&statement),
        "INSERT INTO orders (id, total) VALUES (#{record.id}, #{record.total})"
    );

    let key = statement.key.clone().expect("sequence key");
    assert!(key.before);
    assert_eq!(key.select, "SELECT nextval('order_seq')");
    assert_eq!(key.param_name(), "record.id");

    statement.set_param(&key.param_name(), 42);
    assert_eq!(
        statement.bind().expect("bind").values,
        vec![Value::Int(42), Value::Int(10)]
    );
}

#[test]
fn sequence_names_fall_back_to_configuration() {
    let schema = Schema::new()
        .with(
            EntityModel::new("Invoice", "invoices")
                .id(PropertyModel::basic("id").generated(GeneratedValue::sequence(Some("shared"))))
                .property(PropertyModel::basic("amount")),
        )
        .with(test_fixtures::note());
    let mut settings = Settings::new(DialectKind::Oracle);
    settings
        .keys
        .generators
        .insert("shared".to_string(), "shared_seq".to_string());
    let ctx = QueryContext::new(&schema, &settings);

    let configured = ctx.insert("Invoice").build().expect("insert");
    assert_eq!(
        configured.key.expect("key").select,
        "SELECT shared_seq.NEXTVAL FROM DUAL"
    );

    let default = ctx.insert("Note").build().expect("insert");
    assert_eq!(
        default.key.expect("key").select,
        "SELECT sqlweave_sequence.NEXTVAL FROM DUAL"
    );
}

#[test]
fn identity_keys_need_dialect_support() {
    let schema = test_fixtures::schema();
    let settings = Settings::new(DialectKind::Oracle);
    let ctx = QueryContext::new(&schema, &settings);

    let err = ctx.insert("User").build().expect_err("no identity");
    assert_eq!(err.class, ErrorClass::Unsupported);
}

#[test]
fn insert_rejects_values_without_a_column() {
    let schema = test_fixtures::schema();
    let settings = test_fixtures::settings();
    let ctx = QueryContext::new(&schema, &settings);

    for property in ["nickname", "tags", "roles", "address", "department.name"] {
        let err = ctx
            .insert("User")
            .value(property, 1)
            .build()
            .expect_err(property);
        assert_eq!(err.class, ErrorClass::Mapping, "{property}");
    }
}

// ---------------------------------------------------------------------
// update
// ---------------------------------------------------------------------

#[test]
fn update_increments_and_checks_the_version() {
    let schema = test_fixtures::schema();
    let settings = test_fixtures::settings();
    let ctx = QueryContext::new(&schema, &settings);

    let statement = ctx
        .update("User")
        .set("firstname", "Bob")
        .set("lastname", None::<&str>)
        .selective()
        .filter(Conditions::new().eq("id", 5))
        .tenant(7)
        .expect_version(3)
        .build()
        .expect("update");

    assert_eq!(statement.kind, StatementKind::Update);
    assert_eq!(
        template(&statement),
        concat!(
            "UPDATE users SET firstname = #{record.firstname}, version = version + 1 ",
            "WHERE (id = #{id_0_0}) AND deleted = 0 AND tenant_id = #{__tenant} ",
            "AND version = #{__version}"
        )
    );

    let bound = statement.bind().expect("bind");
    assert_eq!(
        bound.values,
        vec![
            Value::Text("Bob".into()),
            Value::Int(5),
            Value::Int(7),
            Value::Int(3),
        ]
    );
}

#[test]
fn update_without_filters_keeps_bare_conditions() {
    let schema = test_fixtures::schema();
    let settings = test_fixtures::settings();
    let ctx = QueryContext::new(&schema, &settings);

    let statement = ctx
        .update("Note")
        .set("body", None::<&str>)
        .filter(Conditions::new().eq("id", 1))
        .build()
        .expect("update");

    assert_eq!(
        template(&statement),
        "UPDATE notes SET body = #{record.body} WHERE id = #{id_0_0}"
    );
    assert_eq!(
        statement.bind().expect("bind").values,
        vec![Value::Null, Value::Int(1)]
    );
}

#[test]
fn update_rejects_empty_and_managed_assignments() {
    let schema = test_fixtures::schema();
    let settings = test_fixtures::settings();
    let ctx = QueryContext::new(&schema, &settings);

    let err = ctx.update("Note").build().expect_err("no sets");
    assert_eq!(err.class, ErrorClass::Mapping);

    let err = ctx
        .update("Note")
        .set("body", None::<&str>)
        .selective()
        .build()
        .expect_err("all skipped");
    assert_eq!(err.class, ErrorClass::Mapping);

    let err = ctx
        .update("User")
        .set("version", 2)
        .build()
        .expect_err("version");
    assert_eq!(err.class, ErrorClass::Mapping);
}

#[test]
fn update_conditions_cannot_cross_associations() {
    let schema = test_fixtures::schema();
    let settings = test_fixtures::settings();
    let ctx = QueryContext::new(&schema, &settings);

    let err = ctx
        .update("User")
        .set("firstname", "x")
        .filter(Conditions::new().eq("department.name", "Sales"))
        .build()
        .expect_err("join");
    assert_eq!(err.class, ErrorClass::Mapping);
}

// ---------------------------------------------------------------------
// delete
// ---------------------------------------------------------------------

#[test]
fn soft_delete_becomes_an_update() {
    let schema = test_fixtures::schema();
    let settings = test_fixtures::settings();
    let ctx = QueryContext::new(&schema, &settings);

    let statement = ctx
        .delete("User")
        .filter(Conditions::new().eq("id", 5))
        .build()
        .expect("delete");

    assert_eq!(statement.kind, StatementKind::SoftDelete);
    assert_eq!(statement.kind.to_string(), "soft-delete");
    assert_eq!(
        template(&statement),
        "UPDATE users SET deleted = 1 WHERE (id = #{id_0_0}) AND deleted = 0"
    );
}

#[test]
fn soft_delete_literals_come_from_settings() {
    let schema = test_fixtures::schema();
    let mut settings = test_fixtures::settings();
    settings.logic_delete = LogicDeleteConfig {
        deleted: "'Y'".to_string(),
        not_deleted: "'N'".to_string(),
    };
    let ctx = QueryContext::new(&schema, &settings);

    let statement = ctx.delete("User").build().expect("delete");
    assert_eq!(
        template(&statement),
        "UPDATE users SET deleted = 'Y' WHERE deleted = 'N'"
    );

    let select = ctx.select("User").count().build().expect("select");
    assert_eq!(
        template(&select),
        "SELECT COUNT(*) FROM users t WHERE t.deleted = 'N'"
    );
}

#[test]
fn hard_delete_without_soft_delete_mapping() {
    let schema = test_fixtures::schema();
    let settings = test_fixtures::settings();
    let ctx = QueryContext::new(&schema, &settings);

    let statement = ctx
        .delete("Note")
        .filter(Conditions::new().eq("id", 1))
        .build()
        .expect("delete");
    assert_eq!(statement.kind, StatementKind::Delete);
    assert_eq!(template(&statement), "DELETE FROM notes WHERE id = #{id_0_0}");

    let everything = ctx.delete("Note").build().expect("delete");
    assert_eq!(template(&everything), "DELETE FROM notes");
}

#[test]
fn configured_tenant_column_applies_to_undeclared_entities() {
    let schema = test_fixtures::schema();
    let settings = test_fixtures::settings().tenant_column("org_id");
    let ctx = QueryContext::new(&schema, &settings);

    let statement = ctx.delete("Note").tenant("acme").build().expect("delete");
    assert_eq!(
        template(&statement),
        "DELETE FROM notes WHERE org_id = #{__tenant}"
    );
    assert_eq!(
        statement.bind().expect("bind").values,
        vec![Value::Text("acme".into())]
    );
}
