mod property;

use super::*;
use crate::error::{ErrorClass, ErrorDetail};

fn lit(n: u64) -> PageBound {
    PageBound::Literal(n)
}

fn page(handler: LimitHandler, sql: &str, offset: Option<u64>, fetch: u64) -> String {
    let offset = offset.map(lit);
    let end = lit(offset.as_ref().map_or(0, |o| match o {
        PageBound::Literal(v) => *v,
        _ => 0,
    }) + fetch);

    handler
        .process_sql(sql, offset.as_ref(), Some(&lit(fetch)), Some(&end))
        .expect("rewrite")
}

// ---------------------------------------------------------------------
// shallow scan
// ---------------------------------------------------------------------

#[test]
fn shallow_find_skips_literals_and_subqueries() {
    let sql = "SELECT * FROM (SELECT 'FROM' AS x) t";

    assert_eq!(shallow_find(sql, &scan::FROM, 0).expect("scan"), Some(9));
    assert_eq!(shallow_find(sql, &scan::FROM, 10).expect("scan"), None);
}

#[test]
fn shallow_rfind_finds_last_top_level_match() {
    let sql = "SELECT a FROM t ORDER BY a, (SELECT b FROM u ORDER BY b)";

    assert_eq!(shallow_rfind(sql, &scan::ORDER_BY).expect("scan"), Some(16));
}

#[test]
fn doubled_quotes_stay_inside_literals() {
    let sql = "SELECT 'it''s FROM' AS a FROM t";
    let from = shallow_find(sql, &scan::FROM, 0).expect("scan");

    assert_eq!(from, sql.rfind("FROM"));
}

#[test]
fn backslash_does_not_escape_a_quote() {
    let sql = r"SELECT a FROM t WHERE a LIKE ? ESCAPE '\' ORDER BY a";
    let rewritten = page(LimitHandler::LimitOffset, sql, Some(20), 10);

    assert_eq!(
        rewritten,
        r"SELECT a FROM t WHERE a LIKE ? ESCAPE '\' ORDER BY a LIMIT 10 OFFSET 20"
    );
}

#[test]
fn unmatched_parens_are_lexical_errors() {
    let err = shallow_find("SELECT (a FROM t", &scan::FROM, 0).expect_err("unmatched");
    assert_eq!(err.class, ErrorClass::Lexical);
    assert!(matches!(err.detail, Some(ErrorDetail::Lexical { offset: 7, .. })));

    let err = shallow_find("SELECT a) FROM t", &scan::FROM, 0).expect_err("unmatched");
    assert!(err.message.contains("unmatched ')'"));
    assert!(err.message.contains("offset 8"));
}

#[test]
fn unterminated_literal_is_a_lexical_error() {
    let err = Scanner::new("SELECT 'abc FROM t").expect_err("unterminated");

    assert_eq!(err.class, ErrorClass::Lexical);
    assert!(err.message.contains("unterminated"));
}

// ---------------------------------------------------------------------
// CTE prelude
// ---------------------------------------------------------------------

#[test]
fn cte_prelude_is_split_from_body() {
    let sql = "WITH a AS (SELECT 1), b (x) AS (SELECT 2) SELECT * FROM a, b";
    let scanner = Scanner::new(sql).expect("scan");
    let cte = Cte::parse(&scanner).expect("cte");

    assert_eq!(
        cte.prelude,
        Some("WITH a AS (SELECT 1), b (x) AS (SELECT 2)")
    );
    assert_eq!(cte.body, "SELECT * FROM a, b");
}

#[test]
fn cte_without_as_is_rejected() {
    let scanner = Scanner::new("WITH x (SELECT 1) SELECT * FROM x").expect("scan");
    let err = Cte::parse(&scanner).expect_err("missing AS");

    assert_eq!(err.class, ErrorClass::Lexical);
    assert!(err.message.contains("expected AS"));
}

#[test]
fn cte_without_comma_is_rejected() {
    let scanner =
        Scanner::new("WITH a AS (SELECT 1) b AS (SELECT 2) SELECT * FROM a").expect("scan");
    let err = Cte::parse(&scanner).expect_err("missing comma");

    assert!(err.message.contains("expected ','"));
    assert!(err.message.contains("near '"));
}

// ---------------------------------------------------------------------
// LIMIT families
// ---------------------------------------------------------------------

#[test]
fn limit_offset_appends_and_strips_terminator() {
    assert_eq!(
        page(LimitHandler::LimitOffset, "SELECT * FROM t;", Some(20), 10),
        "SELECT * FROM t LIMIT 10 OFFSET 20"
    );
    assert_eq!(
        page(LimitHandler::LimitOffset, "SELECT * FROM t", Some(0), 10),
        "SELECT * FROM t LIMIT 10"
    );
}

#[test]
fn mysql_limit_stays_before_locking_clause() {
    assert_eq!(
        page(LimitHandler::MySqlLimit, "SELECT * FROM t FOR UPDATE", Some(20), 10),
        "SELECT * FROM t LIMIT 20, 10 FOR UPDATE"
    );
}

#[test]
fn templated_selection_renders_placeholders() {
    let sql = LimitHandler::LimitOffset
        .apply("SELECT * FROM t", &RowSelection::templated())
        .expect("rewrite");

    assert_eq!(sql, "SELECT * FROM t LIMIT #{pageSize} OFFSET #{offset}");
}

#[test]
fn missing_fetch_leaves_sql_alone_unless_offset_given() {
    let handler = LimitHandler::Rownum;

    assert_eq!(
        handler
            .process_sql("SELECT * FROM t", None, None, None)
            .expect("unchanged"),
        "SELECT * FROM t"
    );
    let err = handler
        .process_sql("SELECT * FROM t", Some(&lit(5)), None, None)
        .expect_err("offset without fetch");
    assert_eq!(err.class, ErrorClass::Unsupported);
}

#[test]
fn literal_selection_keeps_last_row_consistent() {
    let selection = RowSelection::literal(30, 15);

    assert_eq!(selection.last_row(), lit(45));
}

// ---------------------------------------------------------------------
// TOP and SQL Server
// ---------------------------------------------------------------------

#[test]
fn top_inserts_after_select_distinct() {
    assert_eq!(
        page(LimitHandler::Top, "SELECT DISTINCT a FROM t", None, 5),
        "SELECT DISTINCT TOP 5 a FROM t"
    );
}

#[test]
fn top_rejects_offsets() {
    let err = LimitHandler::Top
        .process_sql("SELECT a FROM t", Some(&lit(1)), Some(&lit(5)), None)
        .expect_err("offset");

    assert_eq!(err.class, ErrorClass::Unsupported);
    assert!(err.message.contains("TOP"));
}

#[test]
fn sqlserver2005_without_offset_uses_top() {
    assert_eq!(
        page(LimitHandler::SqlServer2005, "SELECT a FROM t", None, 5),
        "SELECT TOP(5) a FROM t"
    );
}

#[test]
fn sqlserver2005_wraps_with_row_number_and_names_columns() {
    assert_eq!(
        page(
            LimitHandler::SqlServer2005,
            "SELECT a, b AS bee, COUNT(*) FROM t GROUP BY a, b",
            Some(10),
            5
        ),
        "WITH query AS (SELECT inner_query.*, ROW_NUMBER() OVER (ORDER BY CURRENT_TIMESTAMP) AS __row__ \
         FROM (SELECT a, b AS bee, COUNT(*) AS page2_ FROM t GROUP BY a, b) inner_query) \
         SELECT a, bee, page2_ FROM query WHERE __row__ >= 11 AND __row__ < 16"
    );
}

#[test]
fn sqlserver2005_threads_cte_prelude_and_tops_ordered_queries() {
    assert_eq!(
        page(
            LimitHandler::SqlServer2005,
            "WITH x AS (SELECT id FROM a) SELECT id FROM x ORDER BY id",
            Some(10),
            5
        ),
        "WITH x AS (SELECT id FROM a), query AS (SELECT inner_query.*, ROW_NUMBER() OVER (ORDER BY CURRENT_TIMESTAMP) AS __row__ \
         FROM (SELECT TOP(15) id FROM x ORDER BY id) inner_query) \
         SELECT id FROM query WHERE __row__ >= 11 AND __row__ < 16"
    );
}

#[test]
fn sqlserver2005_duplicate_names_select_star() {
    let sql = page(
        LimitHandler::SqlServer2005,
        "SELECT a.id, b.id FROM a JOIN b ON a.x = b.x",
        Some(10),
        5,
    );

    assert!(sql.contains(") inner_query) SELECT * FROM query"));
}

#[test]
fn sqlserver2005_templated_bounds_render_arithmetic() {
    let sql = LimitHandler::SqlServer2005
        .apply("SELECT a FROM t", &RowSelection::templated())
        .expect("rewrite");

    assert!(sql.ends_with("WHERE __row__ >= #{offset} + 1 AND __row__ < #{offsetEnd} + 1"));
}

#[test]
fn sqlserver2005_propagates_cte_errors() {
    let err = LimitHandler::SqlServer2005
        .process_sql(
            "WITH a AS (SELECT 1) b AS (SELECT 2) SELECT * FROM a",
            Some(&lit(10)),
            Some(&lit(5)),
            None,
        )
        .expect_err("bad cte");

    assert_eq!(err.class, ErrorClass::Lexical);
}

#[test]
fn sqlserver2012_appends_offset_fetch_after_order_by() {
    let sql = "SELECT * FROM t ORDER BY id";
    let first = page(LimitHandler::SqlServer2012, sql, Some(10), 5);
    let second = page(LimitHandler::SqlServer2012, sql, Some(10), 5);

    assert_eq!(
        first,
        "SELECT * FROM t ORDER BY id OFFSET 10 ROWS FETCH NEXT 5 ROWS ONLY"
    );
    assert_eq!(first, second);
}

#[test]
fn sqlserver2012_without_order_by_falls_back_to_row_number() {
    let sql = page(LimitHandler::SqlServer2012, "SELECT a FROM t", Some(10), 5);
    assert!(sql.starts_with("WITH query AS ("));

    let nested = page(
        LimitHandler::SqlServer2012,
        "SELECT a FROM (SELECT a FROM t ORDER BY a) s",
        Some(10),
        5,
    );
    assert!(nested.starts_with("WITH query AS ("));
}

// ---------------------------------------------------------------------
// Oracle
// ---------------------------------------------------------------------

#[test]
fn rownum_relocates_only_the_real_for_update() {
    assert_eq!(
        page(
            LimitHandler::Rownum,
            "SELECT * FROM t WHERE x='a FOR UPDATE' FOR UPDATE",
            None,
            10
        ),
        "SELECT * FROM (SELECT * FROM t WHERE x='a FOR UPDATE') WHERE ROWNUM <= 10 FOR UPDATE"
    );
}

#[test]
fn rownum_with_offset_double_wraps() {
    assert_eq!(
        page(LimitHandler::Rownum, "SELECT * FROM t", Some(10), 5),
        "SELECT * FROM (SELECT row_.*, ROWNUM rownum_ FROM (SELECT * FROM t) row_ WHERE ROWNUM <= 15) WHERE rownum_ > 10"
    );
}

#[test]
fn oracle12c_uses_row_limiting_clause() {
    assert_eq!(
        page(LimitHandler::OffsetFetch, "SELECT * FROM t", Some(5), 5),
        "SELECT * FROM t OFFSET 5 ROWS FETCH NEXT 5 ROWS ONLY"
    );
    assert_eq!(
        page(LimitHandler::OffsetFetch, "SELECT * FROM t FOR UPDATE", None, 3),
        "SELECT * FROM t FETCH FIRST 3 ROWS ONLY FOR UPDATE"
    );
}
