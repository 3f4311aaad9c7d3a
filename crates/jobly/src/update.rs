//! Partial-update SET clause builder.
//!
//! Given a sparse list of `(field, value)` pairs, renders
//! `"col1"=$1, "col2"=$2, ...` and the values in the same order. Field names
//! can be renamed to their column names through a small lookup table; fields
//! without an entry are used verbatim.
//!
//! The builder does no whitelisting. Callers decide which fields may be
//! updated before handing them over.

use crate::clause::RenderedClause;
use crate::error::{DbResult, JoblyError};
use crate::value::SqlValue;
use std::fmt::Write;

/// Application field name → database column name.
pub type ColumnMap<'a> = &'a [(&'a str, &'a str)];

fn resolve_column<'a>(field: &'a str, column_map: ColumnMap<'a>) -> &'a str {
    column_map
        .iter()
        .find(|(f, _)| *f == field)
        .map_or(field, |&(_, column)| column)
}

fn push_quoted(out: &mut String, column: &str) {
    out.push('"');
    for c in column.chars() {
        if c == '"' {
            out.push('"');
        }
        out.push(c);
    }
    out.push('"');
}

/// Build the SET clause for a partial update.
///
/// Returns [`JoblyError::BadRequest`] when `data` is empty. The `n`-th pair
/// renders as `"column"=$n` and its value lands at `values[n - 1]`.
///
/// ```ignore
/// let set = build_set_clause([("firstName", "Aliya".into()), ("age", 32.into())], &[])?;
/// assert_eq!(set.sql, r#""firstName"=$1, "age"=$2"#);
/// ```
pub fn build_set_clause<I, K>(data: I, column_map: ColumnMap<'_>) -> DbResult<RenderedClause>
where
    I: IntoIterator<Item = (K, SqlValue)>,
    K: AsRef<str>,
{
    let mut sql = String::new();
    let mut values = Vec::new();

    for (field, value) in data {
        values.push(value);
        if values.len() > 1 {
            sql.push_str(", ");
        }
        push_quoted(&mut sql, resolve_column(field.as_ref(), column_map));
        let _ = write!(&mut sql, "=${}", values.len());
    }

    if values.is_empty() {
        return Err(JoblyError::bad_request("No data"));
    }

    Ok(RenderedClause { sql, values })
}

/// Flatten a JSON object body into `(field, value)` pairs in document order.
///
/// Nested arrays and objects are rejected with [`JoblyError::BadRequest`].
pub fn pairs_from_json(
    body: serde_json::Map<String, serde_json::Value>,
) -> DbResult<Vec<(String, SqlValue)>> {
    body.into_iter()
        .map(|(field, value)| match value {
            serde_json::Value::Array(_) | serde_json::Value::Object(_) => Err(
                JoblyError::bad_request(format!("{field} must be a scalar value")),
            ),
            scalar => serde_json::from_value(scalar)
                .map(|v| (field.clone(), v))
                .map_err(|e| JoblyError::bad_request(format!("{field}: {e}"))),
        })
        .collect()
}
