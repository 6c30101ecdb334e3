use crate::{dialect::Dialect, model::JoinHop};
use derive_more::{Deref, IntoIterator};

///
/// Connectors
///
/// JOIN clauses needed to reach aliased columns. Insertion order is kept so
/// an alias is always introduced before a later clause refers to it;
/// identical clauses are stored once.
///

#[derive(Clone, Debug, Default, Deref, Eq, IntoIterator, PartialEq)]
pub struct Connectors(Vec<String>);

impl Connectors {
    #[must_use]
    pub const fn new() -> Self {
        Self(Vec::new())
    }

    /// Returns false when the clause was already present.
    pub fn insert(&mut self, clause: String) -> bool {
        if self.0.contains(&clause) {
            return false;
        }
        self.0.push(clause);

        true
    }

    pub fn extend(&mut self, other: Self) {
        for clause in other.0 {
            self.insert(clause);
        }
    }

    /// Clauses joined by single spaces.
    #[must_use]
    pub fn render(&self) -> String {
        self.0.join(" ")
    }
}

/// `LEFT OUTER JOIN` clauses for every hop, rooted at `root_alias`.
pub(crate) fn connectors_for(dialect: &Dialect, root_alias: &str, joins: &[JoinHop]) -> Connectors {
    let mut connectors = Connectors::new();
    for hop in joins {
        for clause in render_hop(dialect, root_alias, hop) {
            connectors.insert(clause);
        }
    }

    connectors
}

pub(crate) fn render_hop(dialect: &Dialect, root_alias: &str, hop: &JoinHop) -> Vec<String> {
    let parent = hop
        .parent_alias
        .as_deref()
        .map_or_else(|| root_alias.to_string(), |alias| dialect.quote(alias));
    let alias = dialect.quote(&hop.alias);
    let assoc = &hop.association;

    if let Some(jt) = &assoc.join_table {
        let link = dialect.quote(&format!("{}__jt", hop.alias));

        return vec![
            format!(
                "LEFT OUTER JOIN {} {link} ON {link}.{} = {parent}.{}",
                jt.table, jt.owner_column, hop.parent_id_column
            ),
            format!(
                "LEFT OUTER JOIN {} {alias} ON {alias}.{} = {link}.{}",
                hop.table, hop.target_id_column, jt.inverse_column
            ),
        ];
    }

    let on = if assoc.join_columns.is_empty() {
        format!("{alias}.{} = {parent}.{}", hop.target_id_column, hop.parent_id_column)
    } else {
        assoc
            .join_columns
            .iter()
            .map(|jc| format!("{alias}.{} = {parent}.{}", jc.foreign, jc.local))
            .collect::<Vec<_>>()
            .join(" AND ")
    };

    vec![format!("LEFT OUTER JOIN {} {alias} ON {on}", hop.table)]
}
