
use super::*;
use crate::{
    DialectKind,
    error::ErrorClass,
    model::Schema,
    settings::Settings,
    sql::{ParamSet, ParamValue},
    test_fixtures,
    value::Value,
};

fn compile_with(
    settings: &Settings,
    alias: bool,
    mut predicate: Predicate,
) -> Result<(PredicateResult, ParamSet), crate::error::InternalError> {
    let schema = test_fixtures::schema();
    let ctx = CompileContext::new(&schema, "User", settings).alias(alias);
    let mut params = ParamSet::new();
    let result = predicate.compile(&ctx, 0, 0, &mut params)?;

    Ok((result, params))
}

fn compile(predicate: Predicate) -> (PredicateResult, ParamSet) {
    compile_with(&test_fixtures::settings(), true, predicate).expect("compile")
}

fn render(predicate: Predicate) -> String {
    compile(predicate).0.segment.render()
}

fn value_of<'a>(params: &'a ParamSet, name: &str) -> Option<&'a Value> {
    params.get(name).map(|p| &p.value)
}

// ---------------------------------------------------------------------
// derived names
// ---------------------------------------------------------------------

#[test]
fn longer_keywords_win_over_their_suffixes() {
    assert_eq!(
        PredicateType::from_property("ageIsGreaterThanEqual"),
        PredicateType::GreaterThanEqual
    );
    assert_eq!(
        PredicateType::from_property("firstnameIsNot"),
        PredicateType::NegatingSimpleProperty
    );
    assert_eq!(
        PredicateType::from_property("emailIsNotNull"),
        PredicateType::IsNotNull
    );
    assert_eq!(PredicateType::from_property("age"), PredicateType::SimpleProperty);
}

#[test]
fn keyword_alone_is_a_property_name() {
    assert_eq!(PredicateType::from_property("In"), PredicateType::SimpleProperty);
    assert_eq!(PredicateType::SimpleProperty.extract_property("In"), "In");
}

#[test]
fn parts_strip_case_suffix_and_build_paths() {
    let part = Part::parse("Address_CityIgnoreCase").expect("part");
    assert_eq!(part.property, "address.city");
    assert_eq!(part.kind, PredicateType::SimpleProperty);
    assert!(part.ignore_case);

    let part = Part::parse("ageIsGreaterThanEqual").expect("part");
    assert_eq!(part.property, "age");
    assert_eq!(part.kind, PredicateType::GreaterThanEqual);
    assert!(!part.ignore_case);
}

#[test]
fn part_without_property_is_rejected() {
    let err = Part::parse("IgnoreCase").expect_err("no property");
    assert_eq!(err.class, ErrorClass::Mapping);
}

// ---------------------------------------------------------------------
// scalar operators
// ---------------------------------------------------------------------

#[test]
fn equality_binds_a_generated_name() {
    let (result, params) = compile(Predicate::eq("firstname", "Bob"));

    assert_eq!(result.segment.render(), "t.firstname = #{firstname_0_0}");
    assert!(result.connectors.is_empty());
    assert_eq!(value_of(&params, "firstname_0_0"), Some(&Value::Text("Bob".into())));
}

#[test]
fn translated_comparisons_use_escaped_tokens() {
    let settings = test_fixtures::settings();
    let schema = test_fixtures::schema();
    let ctx = CompileContext::new(&schema, "User", &settings).translate(true);
    let mut params = ParamSet::new();

    let mut gte = Predicate::gte("age", 18);
    let mut ne = Predicate::ne("age", 30);
    let mut before = Predicate::before("createdAt", 5);

    assert_eq!(
        gte.compile(&ctx, 0, 0, &mut params).expect("gte").segment.render(),
        "t.age &gt;= #{age_0_0}"
    );
    assert_eq!(
        ne.compile(&ctx, 0, 1, &mut params).expect("ne").segment.render(),
        "t.age &lt;&gt; #{age_0_1}"
    );
    assert_eq!(
        before.compile(&ctx, 0, 2, &mut params).expect("before").segment.render(),
        "t.created_at &lt; #{createdAt_0_2}"
    );
}

#[test]
fn plain_comparisons() {
    assert_eq!(render(Predicate::lt("age", 1)), "t.age < #{age_0_0}");
    assert_eq!(render(Predicate::lte("age", 1)), "t.age <= #{age_0_0}");
    assert_eq!(render(Predicate::gt("age", 1)), "t.age > #{age_0_0}");
    assert_eq!(render(Predicate::after("age", 1)), "t.age > #{age_0_0}");
    assert_eq!(render(Predicate::ne("age", 1)), "t.age <> #{age_0_0}");
}

#[test]
fn between_binds_two_values() {
    let (result, params) = compile(Predicate::between("age", 18, 65));

    assert_eq!(
        result.segment.render(),
        "t.age BETWEEN #{age_0_0} AND #{age_0_0_1}"
    );
    assert_eq!(value_of(&params, "age_0_0_1"), Some(&Value::Int(65)));
}

#[test]
fn null_checks_bind_nothing() {
    let (result, params) = compile(Predicate::is_null("email"));
    assert_eq!(result.segment.render(), "t.email IS NULL");
    assert!(params.is_empty());

    assert_eq!(render(Predicate::is_not_null("email")), "t.email IS NOT NULL");
}

#[test]
fn equality_with_null_becomes_a_null_check() {
    let (result, params) = compile(Predicate::eq("email", None::<String>));
    assert_eq!(result.segment.render(), "t.email IS NULL");
    assert!(params.is_empty());

    assert_eq!(
        render(Predicate::ne("email", None::<String>)),
        "t.email IS NOT NULL"
    );
}

#[test]
fn empty_in_list_is_never_false_syntax() {
    let (result, mut params) = compile(Predicate::in_list("id", Vec::<i64>::new()));

    assert!(result.segment.render().starts_with("t.id IN <choose>"));
    let bound = result.segment.bind(&params).expect("bind");
    assert_eq!(bound.sql, "t.id IN (NULL)");
    assert!(bound.values.is_empty());

    params.set("id_0_0", vec![1_i64, 2]);
    let bound = result.segment.bind(&params).expect("bind");
    assert_eq!(bound.sql, "t.id IN (?, ?)");
    assert_eq!(bound.values, vec![Value::Int(1), Value::Int(2)]);
}

#[test]
fn not_in_uses_the_same_guard() {
    let (result, params) = compile(Predicate::not_in("id", vec![7_i64]));

    assert_eq!(result.segment.bind(&params).expect("bind").sql, "t.id NOT IN (?)");
}

#[test]
fn in_list_ignoring_case_lowers_column_and_every_element() {
    let (result, params) =
        compile(Predicate::in_list("lastname", vec!["Doe", "Roe"]).ignore_case());

    let sql = result.segment.render();
    assert!(sql.starts_with("LOWER(t.lastname) IN <choose>"));
    assert!(sql.contains(r#"close=")">LOWER(#{item})</foreach>"#));

    let bound = result.segment.bind(&params).expect("bind");
    assert_eq!(bound.sql, "LOWER(t.lastname) IN (LOWER(?), LOWER(?))");
    assert_eq!(
        bound.values,
        vec![Value::Text("Doe".into()), Value::Text("Roe".into())]
    );
}

#[test]
fn empty_in_list_ignoring_case_still_short_circuits() {
    let (result, params) =
        compile(Predicate::not_in("lastname", Vec::<&str>::new()).ignore_case());

    let bound = result.segment.bind(&params).expect("bind");
    assert_eq!(bound.sql, "LOWER(t.lastname) NOT IN (NULL)");
    assert!(bound.values.is_empty());
}

#[test]
fn containing_escapes_wildcards_into_a_derived_bind() {
    let (result, params) = compile(Predicate::containing("firstname", "50%_off"));

    assert_eq!(
        result.segment.render(),
        r"t.firstname LIKE #{__bind_firstname_0_0} ESCAPE '\'"
    );
    assert_eq!(
        value_of(&params, "__bind_firstname_0_0"),
        Some(&Value::Text(r"%50\%\_off%".into()))
    );
}

#[test]
fn like_shapes() {
    let (_, params) = compile(Predicate::starting_with("lastname", "Do"));
    assert_eq!(
        value_of(&params, "__bind_lastname_0_0"),
        Some(&Value::Text("Do%".into()))
    );

    let (_, params) = compile(Predicate::ending_with("lastname", "oe"));
    assert_eq!(
        value_of(&params, "__bind_lastname_0_0"),
        Some(&Value::Text("%oe".into()))
    );

    assert!(
        render(Predicate::not_containing("lastname", "x")).starts_with("t.lastname NOT LIKE ")
    );
}

#[test]
fn like_keeps_the_caller_pattern() {
    let (result, params) = compile(Predicate::like("email", "%@example.com"));

    assert_eq!(
        result.segment.render(),
        r"t.email LIKE #{email_0_0} ESCAPE '\'"
    );
    assert_eq!(
        value_of(&params, "email_0_0"),
        Some(&Value::Text("%@example.com".into()))
    );
    assert!(render(Predicate::not_like("email", "x%")).starts_with("t.email NOT LIKE "));
}

#[test]
fn mysql_escape_literal_is_doubled() {
    let settings = Settings::new(DialectKind::MySql);
    let (result, _) =
        compile_with(&settings, true, Predicate::containing("email", "a")).expect("compile");

    assert!(result.segment.render().ends_with(r"ESCAPE '\\'"));
}

#[test]
fn ignore_case_lowers_both_sides() {
    assert_eq!(
        render(Predicate::eq("lastname", "Doe").ignore_case()),
        "LOWER(t.lastname) = LOWER(#{lastname_0_0})"
    );
    assert_eq!(
        render(Predicate::starting_with("lastname", "D").ignore_case()),
        r"LOWER(t.lastname) LIKE LOWER(#{__bind_lastname_0_0}) ESCAPE '\'"
    );
}

#[test]
fn booleans_follow_the_dialect() {
    assert_eq!(render(Predicate::is_true("active")), "t.active = TRUE");

    let oracle = Settings::new(DialectKind::Oracle);
    let (result, _) =
        compile_with(&oracle, true, Predicate::is_false("active")).expect("compile");
    assert_eq!(result.segment.render(), "t.active = 0");
}

#[test]
fn regex_delegates_to_the_dialect() {
    assert_eq!(render(Predicate::regex("email", "^a")), "t.email ~ #{email_0_0}");

    let oracle = Settings::new(DialectKind::Oracle);
    let (result, _) = compile_with(&oracle, true, Predicate::regex("email", "^a")).expect("compile");
    assert_eq!(result.segment.render(), "REGEXP_LIKE(t.email, #{email_0_0})");

    let server = Settings::new(DialectKind::SqlServer);
    let err = compile_with(&server, true, Predicate::regex("email", "^a")).expect_err("no regex");
    assert_eq!(err.class, ErrorClass::Unsupported);
}

#[test]
fn empty_checks_on_scalars_are_unsupported() {
    let err = compile_with(&test_fixtures::settings(), true, Predicate::is_empty("email"))
        .expect_err("scalar");

    assert_eq!(err.class, ErrorClass::Unsupported);
    assert!(err.message.contains("IS_EMPTY"));
}

#[test]
fn embedded_leaf_resolves_to_its_column() {
    assert_eq!(
        render(Predicate::eq("address.city", "Oslo")),
        "t.addr_city = #{address_city_0_0}"
    );

    let err = compile_with(&test_fixtures::settings(), true, Predicate::eq("address", "x"))
        .expect_err("embedded");
    assert_eq!(err.class, ErrorClass::Mapping);
}

#[test]
fn type_hints_come_from_the_mapping() {
    let schema = Schema::new().with(
        crate::model::EntityModel::new("Doc", "docs").property(
            crate::model::PropertyModel::text("body")
                .jdbc_type("CLOB")
                .type_handler("ClobHandler"),
        ),
    );
    let settings = test_fixtures::settings();
    let ctx = CompileContext::new(&schema, "Doc", &settings);
    let mut params = ParamSet::new();

    let result = Predicate::eq("body", "x")
        .compile(&ctx, 0, 0, &mut params)
        .expect("compile");
    assert_eq!(
        result.segment.render(),
        "t.body = #{body_0_0,jdbcType=CLOB,typeHandler=ClobHandler}"
    );
}

// ---------------------------------------------------------------------
// paths and joins
// ---------------------------------------------------------------------

#[test]
fn association_paths_emit_connectors() {
    let (result, _) = compile(Predicate::eq("department.company.name", "Acme"));

    assert_eq!(
        result.segment.render(),
        r#""department.company".name = #{department_company_name_0_0}"#
    );
    assert_eq!(
        result.connectors.to_vec(),
        vec![
            r#"LEFT OUTER JOIN departments "department" ON "department".id = t.department_id"#
                .to_string(),
            r#"LEFT OUTER JOIN companies "department.company" ON "department.company".id = "department".company_id"#
                .to_string(),
        ]
    );
}

#[test]
fn join_table_paths_go_through_the_link_table() {
    let (result, _) = compile(Predicate::eq("roles.name", "admin"));

    assert_eq!(
        result.connectors.to_vec(),
        vec![
            r#"LEFT OUTER JOIN user_roles "roles__jt" ON "roles__jt".user_id = t.id"#.to_string(),
            r#"LEFT OUTER JOIN roles "roles" ON "roles".id = "roles__jt".role_id"#.to_string(),
        ]
    );
}

#[test]
fn unaliased_compilation_uses_bare_columns() {
    let (result, _) =
        compile_with(&test_fixtures::settings(), false, Predicate::eq("age", 3)).expect("compile");
    assert_eq!(result.segment.render(), "age = #{age_0_0}");

    let err = compile_with(
        &test_fixtures::settings(),
        false,
        Predicate::eq("department.name", "x"),
    )
    .expect_err("joins without aliases");
    assert_eq!(err.class, ErrorClass::Mapping);
    assert!(err.message.contains("department.name"));
}

#[test]
fn unknown_property_names_the_path() {
    let err = compile_with(&test_fixtures::settings(), true, Predicate::eq("department.nope", 1))
        .expect_err("unknown");

    assert_eq!(err.class, ErrorClass::Mapping);
    assert!(err.message.contains("department.nope"));
}

#[test]
fn association_membership_uses_a_subquery() {
    assert_eq!(
        render(Predicate::containing("department", 5)),
        "t.department_id IN (SELECT id FROM departments WHERE id = #{department_0_0})"
    );
    assert_eq!(
        render(Predicate::not_containing("roles", 2)),
        "t.id NOT IN (SELECT user_id FROM user_roles WHERE role_id = #{roles_0_0})"
    );
}

#[test]
fn association_rejects_other_operators() {
    let err = compile_with(&test_fixtures::settings(), true, Predicate::eq("department", 5))
        .expect_err("association equality");

    assert_eq!(err.class, ErrorClass::Mapping);
    assert!(err.message.contains("CONTAINING"));
}

#[test]
fn to_one_nullness_tests_the_foreign_key() {
    assert_eq!(render(Predicate::is_null("department")), "t.department_id IS NULL");
    assert_eq!(
        render(Predicate::is_not_null("department.company")),
        r#""department".company_id IS NOT NULL"#
    );

    let err = compile_with(&test_fixtures::settings(), true, Predicate::is_null("roles"))
        .expect_err("join table has no foreign key");
    assert_eq!(err.class, ErrorClass::Unsupported);
}

#[test]
fn collection_operators() {
    assert_eq!(
        render(Predicate::containing("tags", "vip")),
        "t.id IN (SELECT user_id FROM user_tags WHERE tag = #{tags_0_0})"
    );
    assert_eq!(
        render(Predicate::is_empty("tags")),
        "NOT EXISTS (SELECT 1 FROM user_tags WHERE user_tags.user_id = t.id)"
    );
    assert_eq!(
        render(Predicate::is_not_empty("tags")),
        "EXISTS (SELECT 1 FROM user_tags WHERE user_tags.user_id = t.id)"
    );

    let err = compile_with(&test_fixtures::settings(), true, Predicate::gt("tags", 1))
        .expect_err("collection comparison");
    assert_eq!(err.class, ErrorClass::Mapping);
}

// ---------------------------------------------------------------------
// arity and naming
// ---------------------------------------------------------------------

fn field_for(kind: PredicateType) -> &'static str {
    match kind {
        PredicateType::IsEmpty | PredicateType::IsNotEmpty => "tags",
        _ => "firstname",
    }
}

#[test]
fn every_operator_accepts_exactly_its_arity() {
    for kind in PredicateType::ALL {
        let Arity::Exact(n) = kind.arity() else {
            continue;
        };
        let values: Vec<ParamValue> = (0..n).map(|i| ParamValue::new(i as i64)).collect();

        let ok = compile_with(
            &test_fixtures::settings(),
            true,
            Predicate::new(field_for(kind), kind, values.clone()),
        );
        assert!(ok.is_ok(), "{kind} with {n} value(s): {ok:?}");

        let mut short = values;
        if short.pop().is_some() {
            let err = compile_with(
                &test_fixtures::settings(),
                true,
                Predicate::new(field_for(kind), kind, short),
            )
            .expect_err("too few values");
            assert_eq!(err.class, ErrorClass::Arity, "{kind}");
        }
    }
}

#[test]
fn names_persist_across_compilations() {
    let settings = test_fixtures::settings();
    let schema = test_fixtures::schema();
    let ctx = CompileContext::new(&schema, "User", &settings);
    let mut predicate = Predicate::eq("age", 3);

    let first = predicate
        .compile(&ctx, 4, 2, &mut ParamSet::new())
        .expect("first");
    let second = predicate
        .compile(&ctx, 9, 9, &mut ParamSet::new())
        .expect("second");

    assert_eq!(first, second);
    assert_eq!(predicate.values[0].name.as_deref(), Some("age_4_2"));
}

#[test]
fn preassigned_names_are_kept() {
    let predicate = Predicate::new(
        "age",
        PredicateType::SimpleProperty,
        vec![ParamValue::new(3).named("minAge")],
    );

    assert_eq!(render(predicate), "t.age = #{minAge}");
}

// ---------------------------------------------------------------------
// custom fragments
// ---------------------------------------------------------------------

#[test]
fn custom_fragment_binds_positional_and_named_values() {
    let schema = test_fixtures::schema();
    let settings = test_fixtures::settings();
    let ctx = CompileContext::new(&schema, "User", &settings);
    let mut params = ParamSet::new();
    let mut predicate = Predicate::custom(
        "t.age > ?1 AND t.lastname = :name",
        vec![ParamValue::new(18), ParamValue::new("Doe")],
    );

    let result = predicate
        .compile(&ctx, 1, 0, &mut params)
        .expect("compile");

    assert_eq!(
        result.segment.render(),
        "t.age > #{nofield_1_0_1} AND t.lastname = #{name}"
    );
    assert_eq!(predicate.values[0].name.as_deref(), Some("nofield_1_0_1"));
    assert_eq!(value_of(&params, "name"), Some(&Value::Text("Doe".into())));
}

#[test]
fn custom_fragment_matches_named_values_by_name() {
    let (result, params) = compile(Predicate::custom(
        "a = :b AND c = :a",
        vec![ParamValue::new(1).named("a"), ParamValue::new(2).named("b")],
    ));

    assert_eq!(result.segment.render(), "a = #{b} AND c = #{a}");
    assert_eq!(value_of(&params, "b"), Some(&Value::Int(2)));
}

#[test]
fn custom_fragment_without_placeholders_is_unchanged() {
    assert_eq!(
        render(Predicate::custom("t.deleted = 0", Vec::new())),
        "t.deleted = 0"
    );
}

#[test]
fn custom_fragment_missing_a_value_is_an_arity_error() {
    let err = compile_with(
        &test_fixtures::settings(),
        true,
        Predicate::custom("a = ?2", vec![ParamValue::new(1)]),
    )
    .expect_err("missing ?2");

    assert_eq!(err.class, ErrorClass::Arity);
    assert!(err.message.contains("?2"));
}

#[test]
fn custom_fragment_on_a_field_names_values_after_it() {
    assert_eq!(
        render(Predicate::custom_on(
            "age",
            "t.age > ?1",
            vec![ParamValue::new(18)]
        )),
        "t.age > #{age_0_0_1}"
    );
}

#[test]
fn custom_fragment_on_an_unknown_field_is_rejected() {
    let err = compile_with(
        &test_fixtures::settings(),
        true,
        Predicate::custom_on("noSuchField", "x = ?1", vec![ParamValue::new(1)]),
    )
    .expect_err("unknown field");

    assert_eq!(err.class, ErrorClass::Mapping);
    assert!(err.message.contains("noSuchField"));
}
