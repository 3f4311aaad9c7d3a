//! WHERE-clause assembly.
//!
//! Renders a [`FilterSet`] as `column OP $n [OP $n+1] AND ...` with
//! sequentially numbered placeholders and the matching value list.
//!
//! # Example
//! ```ignore
//! let clause = assemble_where(&filters);
//! let sql = format!("SELECT * FROM jobs{}", clause.where_sql());
//! client.query(&sql, &clause.params_ref()).await?;
//! ```

use crate::filter::{Descriptor, FilterSet};
use crate::value::SqlValue;
use std::fmt::Write;
use tokio_postgres::types::ToSql;

/// SQL fragment text plus its positionally matched values.
///
/// Placeholders in `sql` are `$offset+1 ..= $offset+values.len()`, strictly
/// increasing in text order, with `values[i]` bound to `$offset+i+1`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RenderedClause {
    pub sql: String,
    pub values: Vec<SqlValue>,
}

impl RenderedClause {
    pub fn is_empty(&self) -> bool {
        self.sql.is_empty()
    }

    /// Number of `$n` placeholders rendered into `sql`.
    ///
    /// A `$` inside a double-quoted identifier is part of the name, not a placeholder.
    pub fn placeholder_count(&self) -> usize {
        let mut quoted = false;
        let mut chars = self.sql.chars().peekable();
        let mut count = 0;
        while let Some(c) = chars.next() {
            match c {
                '"' => quoted = !quoted,
                '$' if !quoted && chars.peek().is_some_and(char::is_ascii_digit) => count += 1,
                _ => {}
            }
        }
        count
    }

    /// `" WHERE <clause>"`, or an empty string when there is nothing to filter on.
    pub fn where_sql(&self) -> String {
        if self.is_empty() {
            String::new()
        } else {
            format!(" WHERE {}", self.sql)
        }
    }

    /// Parameter refs compatible with `tokio-postgres`.
    pub fn params_ref(&self) -> Vec<&(dyn ToSql + Sync)> {
        self.values
            .iter()
            .map(|v| v as &(dyn ToSql + Sync))
            .collect()
    }
}

/// Render `filters` with placeholders starting at `$1`.
pub fn assemble_where(filters: &FilterSet) -> RenderedClause {
    assemble_where_from(filters, 0)
}

/// Render `filters` with placeholders starting at `$offset + 1`.
///
/// Columns render in the set's insertion order and are joined with `AND`.
pub fn assemble_where_from(filters: &FilterSet, offset: usize) -> RenderedClause {
    let (fragments, values, _) = filters.iter().fold(
        (Vec::with_capacity(filters.len()), Vec::new(), offset),
        |(mut fragments, mut values, idx), (column, descriptor)| {
            let (fragment, next) = render_column(column, descriptor, idx);
            fragments.push(fragment);
            values.extend(descriptor.values.iter().cloned());
            (fragments, values, next)
        },
    );

    RenderedClause {
        sql: fragments.join(" AND "),
        values,
    }
}

/// Render one column's tokens, returning the fragment and the next free index.
///
/// `["BETWEEN", "AND"]` becomes `col BETWEEN $1 AND $2`; the column name is
/// written once and each token takes the next placeholder.
fn render_column(column: &str, descriptor: &Descriptor, idx: usize) -> (String, usize) {
    let mut out = String::from(column);
    let mut next = idx;
    for token in &descriptor.tokens {
        next += 1;
        let _ = write!(&mut out, " {token} ${next}");
    }
    (out, next)
}
