//! Per-entity search filter translation.
//!
//! A translator turns [`NormalizedParams`] into a [`FilterSet`]: for each
//! recognized filter, the column to compare, the operator token(s), and the
//! literal value(s) to bind. Column names and operators come only from the
//! translators' fixed vocabularies; user input only ever reaches the value
//! list.
//!
//! # Example
//! ```ignore
//! use jobly::filter::{FilterTranslator, JobFilters};
//!
//! let filters = JobFilters::from_raw([("hasEquity", "true"), ("minSalary", "50000")])?;
//! let clause = jobly::assemble_where(&filters);
//! assert_eq!(clause.sql, "equity > $1 AND salary >= $2");
//! ```

mod company;
mod job;

pub use company::CompanyFilters;
pub use job::JobFilters;

use crate::error::DbResult;
use crate::params::{NormalizedParams, normalize};
use crate::value::SqlValue;

/// Operator tokens and bound values for one filtered column.
///
/// Simple comparisons pair one token with one value. A range is
/// `["BETWEEN", "AND"]` with two values, each token followed by its own
/// placeholder.
#[derive(Debug, Clone, PartialEq)]
pub struct Descriptor {
    pub tokens: Vec<&'static str>,
    pub values: Vec<SqlValue>,
}

impl Descriptor {
    /// A single `column <op> $n` comparison.
    pub fn compare(op: &'static str, value: impl Into<SqlValue>) -> Self {
        Self {
            tokens: vec![op],
            values: vec![value.into()],
        }
    }

    /// `column BETWEEN $n AND $n+1`.
    pub fn between(low: impl Into<SqlValue>, high: impl Into<SqlValue>) -> Self {
        Self {
            tokens: vec!["BETWEEN", "AND"],
            values: vec![low.into(), high.into()],
        }
    }

    /// Case-insensitive substring match.
    pub fn ilike(needle: &str) -> Self {
        Self::compare("ILIKE", ilike_pattern(needle))
    }
}

/// Wrap `needle` in `%` wildcards.
///
/// `%` and `_` inside `needle` are not escaped and keep their pattern meaning.
pub fn ilike_pattern(needle: &str) -> String {
    format!("%{needle}%")
}

/// Insertion-ordered map from column name to [`Descriptor`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterSet {
    fields: Vec<(&'static str, Descriptor)>,
}

impl FilterSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace the descriptor for `column`.
    ///
    /// Replacing keeps the column's original position.
    pub fn insert(&mut self, column: &'static str, descriptor: Descriptor) {
        match self.fields.iter_mut().find(|(c, _)| *c == column) {
            Some((_, slot)) => *slot = descriptor,
            None => self.fields.push((column, descriptor)),
        }
    }

    pub fn get(&self, column: &str) -> Option<&Descriptor> {
        self.fields
            .iter()
            .find(|(c, _)| *c == column)
            .map(|(_, d)| d)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn columns(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.fields.iter().map(|(c, _)| *c)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &Descriptor)> {
        self.fields.iter().map(|(c, d)| (*c, d))
    }
}

/// A fixed filter vocabulary for one entity.
pub trait FilterTranslator {
    /// Lower-case query keys this entity understands.
    const ALLOWED: &'static [&'static str];

    /// Entity name used in log events.
    const ENTITY: &'static str;

    /// Translate normalized parameters into column descriptors.
    ///
    /// Returns an empty set when no recognized filter is present.
    fn translate(params: &NormalizedParams) -> DbResult<FilterSet>;

    /// Normalize raw parameters against [`Self::ALLOWED`] and translate them.
    fn from_raw<I, K, V>(raw: I) -> DbResult<FilterSet>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let params = normalize(Self::ALLOWED, raw);
        let filters = Self::translate(&params)?;
        tracing::debug!(
            target: "jobly.filter",
            entity = Self::ENTITY,
            columns = ?filters.columns().collect::<Vec<_>>(),
            "translated search filters"
        );
        Ok(filters)
    }
}
