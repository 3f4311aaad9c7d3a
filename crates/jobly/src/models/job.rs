use super::company::Company;
use super::fetch_filtered;
use crate::client::GenericClient;
use crate::error::{DbResult, JoblyError};
use crate::filter::{FilterTranslator, JobFilters};
use crate::row::{FromRow, RowExt};
use crate::update::{ColumnMap, build_set_clause};
use crate::value::SqlValue;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tokio_postgres::Row;
use tokio_postgres::types::ToSql;

const COLUMNS: &str = "id, title, salary, equity, company_handle";

// title, salary and equity are already column names.
const COLUMN_MAP: ColumnMap<'static> = &[];

/// A row of `jobs`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Job {
    pub id: i32,
    pub title: String,
    pub salary: Option<i32>,
    pub equity: Option<Decimal>,
    pub company_handle: String,
}

impl FromRow for Job {
    fn from_row(row: &Row) -> DbResult<Self> {
        Ok(Self {
            id: row.try_get_column("id")?,
            title: row.try_get_column("title")?,
            salary: row.try_get_column("salary")?,
            equity: row.try_get_column("equity")?,
            company_handle: row.try_get_column("company_handle")?,
        })
    }
}

/// A job as listed under its company.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JobSummary {
    pub id: i32,
    pub title: String,
    pub salary: Option<i32>,
    pub equity: Option<Decimal>,
}

impl FromRow for JobSummary {
    fn from_row(row: &Row) -> DbResult<Self> {
        Ok(Self {
            id: row.try_get_column("id")?,
            title: row.try_get_column("title")?,
            salary: row.try_get_column("salary")?,
            equity: row.try_get_column("equity")?,
        })
    }
}

/// A job together with the company offering it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JobDetail {
    pub id: i32,
    pub title: String,
    pub salary: Option<i32>,
    pub equity: Option<Decimal>,
    pub company: Company,
}

impl FromRow for JobDetail {
    fn from_row(row: &Row) -> DbResult<Self> {
        Ok(Self {
            id: row.try_get_column("id")?,
            title: row.try_get_column("title")?,
            salary: row.try_get_column("salary")?,
            equity: row.try_get_column("equity")?,
            company: Company::from_row(row)?,
        })
    }
}

/// Input for [`Job::create`].
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewJob {
    pub title: String,
    pub salary: Option<i32>,
    pub equity: Option<Decimal>,
    pub company_handle: String,
}

/// Sparse input for [`Job::update`]. A job cannot move to another company.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct JobUpdate {
    pub title: Option<String>,
    pub salary: Option<i32>,
    pub equity: Option<Decimal>,
}

impl JobUpdate {
    pub fn into_pairs(self) -> Vec<(&'static str, SqlValue)> {
        let mut pairs = Vec::new();
        if let Some(title) = self.title {
            pairs.push(("title", SqlValue::from(title)));
        }
        if let Some(salary) = self.salary {
            pairs.push(("salary", SqlValue::from(salary)));
        }
        if let Some(equity) = self.equity {
            // Text keeps full precision; bound as NUMERIC.
            pairs.push(("equity", SqlValue::from(equity.to_string())));
        }
        pairs
    }
}

impl Job {
    /// Insert a job.
    ///
    /// Returns [`JoblyError::BadRequest`] if a job with the same title exists.
    pub async fn create(client: &impl GenericClient, data: &NewJob) -> DbResult<Job> {
        let duplicate = client
            .query_opt("SELECT title FROM jobs WHERE title = $1", &[&data.title])
            .await?;
        if duplicate.is_some() {
            return Err(JoblyError::bad_request(format!(
                "Duplicate job: {}",
                data.title
            )));
        }

        let sql = format!(
            "INSERT INTO jobs (title, salary, equity, company_handle) \
             VALUES ($1, $2, $3, $4) RETURNING {COLUMNS}"
        );
        let row = client
            .query_one(
                &sql,
                &[&data.title, &data.salary, &data.equity, &data.company_handle],
            )
            .await?;
        Job::from_row(&row)
    }

    /// All jobs, ordered by title.
    pub async fn find_all(client: &impl GenericClient) -> DbResult<Vec<Job>> {
        let sql = format!("SELECT {COLUMNS} FROM jobs ORDER BY title");
        let rows = client.query(&sql, &[]).await?;
        Job::from_rows(&rows)
    }

    /// Jobs matching the search parameters `title`, `minSalary`, `hasEquity`.
    ///
    /// `hasEquity` filters only when its value is exactly `"true"`. With no
    /// recognized filter this behaves like [`Job::find_all`]; filters that
    /// match nothing yield [`JoblyError::NotFound`].
    pub async fn find_filtered<I, K, V>(client: &impl GenericClient, raw: I) -> DbResult<Vec<Job>>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let filters = JobFilters::from_raw(raw)?;
        let select = format!("SELECT {COLUMNS} FROM jobs");
        fetch_filtered(client, &select, "title", &filters, "job").await
    }

    /// A job by id, with its company.
    pub async fn get(client: &impl GenericClient, id: i32) -> DbResult<JobDetail> {
        let row = client
            .query_opt(
                "SELECT j.id, j.title, j.salary, j.equity, \
                        c.handle, c.name, c.description, c.num_employees, c.logo_url \
                 FROM jobs j JOIN companies c ON j.company_handle = c.handle \
                 WHERE j.id = $1",
                &[&id],
            )
            .await?
            .ok_or_else(|| JoblyError::not_found(format!("No job: {id}")))?;
        JobDetail::from_row(&row)
    }

    /// Apply a partial update. Only the fields set in `data` change.
    pub async fn update(client: &impl GenericClient, id: i32, data: JobUpdate) -> DbResult<Job> {
        let set = build_set_clause(data.into_pairs(), COLUMN_MAP)?;
        let sql = format!(
            "UPDATE jobs SET {} WHERE id = ${} RETURNING {COLUMNS}",
            set.sql,
            set.values.len() + 1
        );
        let mut params = set.params_ref();
        params.push(&id as &(dyn ToSql + Sync));

        let row = client
            .query_opt(&sql, &params)
            .await?
            .ok_or_else(|| JoblyError::not_found(format!("No job: {id}")))?;
        Job::from_row(&row)
    }

    /// Delete a job by id.
    pub async fn remove(client: &impl GenericClient, id: i32) -> DbResult<()> {
        client
            .query_opt("DELETE FROM jobs WHERE id = $1 RETURNING id", &[&id])
            .await?
            .ok_or_else(|| JoblyError::not_found(format!("No job: {id}")))?;
        Ok(())
    }
}
