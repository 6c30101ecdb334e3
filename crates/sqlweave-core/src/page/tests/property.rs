use crate::page::{LimitHandler, PageBound, RowSelection, scan, shallow_find};
use proptest::prelude::*;

const KEYWORDS: [&str; 8] = ["by", "distinct", "for", "from", "order", "select", "update", "with"];

fn arb_word() -> impl Strategy<Value = String> {
    "[a-z][a-z0-9_]{0,8}".prop_filter("keyword", |w| !KEYWORDS.contains(&w.as_str()))
}

// literal contents may spell any keyword, including FROM
fn arb_literal() -> impl Strategy<Value = String> {
    prop_oneof![
        "[a-zA-Z ()]{0,12}",
        Just("FROM".to_string()),
        Just(" from (".to_string()),
        Just("ORDER BY x".to_string()),
    ]
}

proptest! {
    #[test]
    fn shallow_find_ignores_keywords_in_literals_and_groups(
        column in arb_word(),
        literal in arb_literal(),
    ) {
        let sql = format!("SELECT {column} FROM t WHERE c = '{literal}' AND d IN (SELECT e FROM u)");
        let found = shallow_find(&sql, &scan::FROM, 0).expect("scan");

        prop_assert_eq!(found, Some("SELECT ".len() + column.len() + 1));
        prop_assert_eq!(shallow_find(&sql, &scan::FROM, found.unwrap_or(0) + 1).expect("scan"), None);
    }

    #[test]
    fn literal_windows_are_consistent(first in 0_u64..1_000_000, max in 0_u64..1_000_000) {
        let selection = RowSelection::literal(first, max);

        prop_assert_eq!(selection.last_row(), PageBound::Literal(first + max));
    }

    #[test]
    fn sqlserver2012_is_deterministic_on_ordered_input(
        column in arb_word(),
        offset in 1_u64..10_000,
        fetch in 1_u64..10_000,
    ) {
        let sql = format!("SELECT * FROM t ORDER BY {column}");
        let selection = RowSelection::literal(offset, fetch);

        let first = LimitHandler::SqlServer2012.apply(&sql, &selection).expect("rewrite");
        let second = LimitHandler::SqlServer2012.apply(&sql, &selection).expect("rewrite");

        prop_assert_eq!(&first, &second);
        prop_assert_eq!(
            first,
            format!("{sql} OFFSET {offset} ROWS FETCH NEXT {fetch} ROWS ONLY")
        );
    }

    #[test]
    fn rownum_preserves_the_original_statement(
        column in arb_word(),
        literal in arb_literal(),
        fetch in 1_u64..10_000,
    ) {
        let sql = format!("SELECT {column} FROM t WHERE c = '{literal}'");
        let paged = LimitHandler::Rownum
            .process_sql(&sql, None, Some(&PageBound::Literal(fetch)), None)
            .expect("rewrite");

        prop_assert_eq!(paged, format!("SELECT * FROM ({sql}) WHERE ROWNUM <= {fetch}"));
    }
}
