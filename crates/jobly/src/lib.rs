//! # jobly
//!
//! Postgres data access for companies and jobs.
//!
//! Search endpoints hand over untrusted query parameters; jobly turns them
//! into a parameterized WHERE clause in four steps:
//!
//! 1. [`normalize`] lower-cases keys and drops everything not on the entity's
//!    allow-list.
//! 2. A [`FilterTranslator`] ([`CompanyFilters`], [`JobFilters`]) maps each
//!    recognized key to a column, operator token(s), and bound value(s).
//! 3. [`assemble_where`] renders `column OP $n AND ...` with sequential
//!    placeholders and the matching value list.
//! 4. A [`GenericClient`] runs the statement.
//!
//! Partial updates go through [`build_set_clause`] instead.
//!
//! ```ignore
//! use jobly::{Job, TracedClient, DbConfig, create_pool};
//!
//! let config = DbConfig::from_env()?;
//! let pool = create_pool(&config)?;
//! let client = TracedClient::from_config(pool.get().await?, &config);
//!
//! // SELECT ... FROM jobs WHERE equity > $1 AND salary >= $2 ORDER BY title
//! let jobs = Job::find_filtered(&client, [("hasEquity", "true"), ("minSalary", "50000")]).await?;
//! ```

pub mod clause;
pub mod client;
pub mod config;
pub mod error;
pub mod filter;
pub mod models;
pub mod monitor;
pub mod params;
pub mod row;
pub mod update;
pub mod value;

pub use clause::{RenderedClause, assemble_where, assemble_where_from};
pub use client::GenericClient;
pub use config::DbConfig;
pub use error::{DbResult, JoblyError};
pub use filter::{CompanyFilters, Descriptor, FilterSet, FilterTranslator, JobFilters};
pub use models::{
    Company, CompanyDetail, CompanyUpdate, Job, JobDetail, JobSummary, JobUpdate, NewCompany,
    NewJob,
};
pub use monitor::TracedClient;
pub use params::{NormalizedParams, normalize};
pub use row::{FromRow, RowExt};
pub use update::{ColumnMap, build_set_clause, pairs_from_json};
pub use value::SqlValue;

#[cfg(feature = "pool")]
pub mod pool;

#[cfg(feature = "pool")]
pub use pool::create_pool;
