use super::fetch_filtered;
use super::job::JobSummary;
use crate::client::GenericClient;
use crate::error::{DbResult, JoblyError};
use crate::filter::{CompanyFilters, FilterTranslator};
use crate::row::{FromRow, RowExt};
use crate::update::{ColumnMap, build_set_clause};
use crate::value::SqlValue;
use serde::{Deserialize, Serialize};
use tokio_postgres::Row;
use tokio_postgres::types::ToSql;

const COLUMNS: &str = "handle, name, description, num_employees, logo_url";

const COLUMN_MAP: ColumnMap<'static> = &[
    ("numEmployees", "num_employees"),
    ("logoUrl", "logo_url"),
];

/// A row of `companies`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Company {
    pub handle: String,
    pub name: String,
    pub description: String,
    pub num_employees: Option<i32>,
    pub logo_url: Option<String>,
}

impl FromRow for Company {
    fn from_row(row: &Row) -> DbResult<Self> {
        Ok(Self {
            handle: row.try_get_column("handle")?,
            name: row.try_get_column("name")?,
            description: row.try_get_column("description")?,
            num_employees: row.try_get_column("num_employees")?,
            logo_url: row.try_get_column("logo_url")?,
        })
    }
}

/// A company together with its open jobs.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompanyDetail {
    #[serde(flatten)]
    pub company: Company,
    pub jobs: Vec<JobSummary>,
}

/// Input for [`Company::create`].
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewCompany {
    pub handle: String,
    pub name: String,
    pub description: String,
    pub num_employees: Option<i32>,
    pub logo_url: Option<String>,
}

/// Sparse input for [`Company::update`]. The handle cannot be changed.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CompanyUpdate {
    pub name: Option<String>,
    pub description: Option<String>,
    pub num_employees: Option<i32>,
    pub logo_url: Option<String>,
}

impl CompanyUpdate {
    /// The fields that are set, keyed by their API (camelCase) names.
    pub fn into_pairs(self) -> Vec<(&'static str, SqlValue)> {
        let mut pairs = Vec::new();
        if let Some(name) = self.name {
            pairs.push(("name", SqlValue::from(name)));
        }
        if let Some(description) = self.description {
            pairs.push(("description", SqlValue::from(description)));
        }
        if let Some(n) = self.num_employees {
            pairs.push(("numEmployees", SqlValue::from(n)));
        }
        if let Some(url) = self.logo_url {
            pairs.push(("logoUrl", SqlValue::from(url)));
        }
        pairs
    }
}

impl Company {
    /// Insert a company.
    ///
    /// Returns [`JoblyError::BadRequest`] if the handle is already taken.
    pub async fn create(client: &impl GenericClient, data: &NewCompany) -> DbResult<Company> {
        let duplicate = client
            .query_opt(
                "SELECT handle FROM companies WHERE handle = $1",
                &[&data.handle],
            )
            .await?;
        if duplicate.is_some() {
            return Err(JoblyError::bad_request(format!(
                "Duplicate company: {}",
                data.handle
            )));
        }

        let sql = format!(
            "INSERT INTO companies (handle, name, description, num_employees, logo_url) \
             VALUES ($1, $2, $3, $4, $5) RETURNING {COLUMNS}"
        );
        let row = client
            .query_one(
                &sql,
                &[
                    &data.handle,
                    &data.name,
                    &data.description,
                    &data.num_employees,
                    &data.logo_url,
                ],
            )
            .await?;
        Company::from_row(&row)
    }

    /// All companies, ordered by name.
    pub async fn find_all(client: &impl GenericClient) -> DbResult<Vec<Company>> {
        let sql = format!("SELECT {COLUMNS} FROM companies ORDER BY name");
        let rows = client.query(&sql, &[]).await?;
        Company::from_rows(&rows)
    }

    /// Companies matching the search parameters `name`, `minEmployees`, `maxEmployees`.
    ///
    /// Keys are case-insensitive and unknown keys are ignored. With no
    /// recognized filter this behaves like [`Company::find_all`].
    ///
    /// Errors:
    /// - [`JoblyError::InvalidRange`] if `minEmployees > maxEmployees`
    /// - [`JoblyError::NotFound`] if filters were given and nothing matched
    pub async fn find_filtered<I, K, V>(
        client: &impl GenericClient,
        raw: I,
    ) -> DbResult<Vec<Company>>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let filters = CompanyFilters::from_raw(raw)?;
        let select = format!("SELECT {COLUMNS} FROM companies");
        fetch_filtered(client, &select, "name", &filters, "company").await
    }

    /// A company by handle, with its jobs.
    pub async fn get(client: &impl GenericClient, handle: &str) -> DbResult<CompanyDetail> {
        let sql = format!("SELECT {COLUMNS} FROM companies WHERE handle = $1");
        let row = client
            .query_opt(&sql, &[&handle])
            .await?
            .ok_or_else(|| JoblyError::not_found(format!("No company: {handle}")))?;
        let company = Company::from_row(&row)?;

        let job_rows = client
            .query(
                "SELECT id, title, salary, equity FROM jobs WHERE company_handle = $1 ORDER BY id",
                &[&handle],
            )
            .await?;

        Ok(CompanyDetail {
            company,
            jobs: JobSummary::from_rows(&job_rows)?,
        })
    }

    /// Apply a partial update. Only the fields set in `data` change.
    pub async fn update(
        client: &impl GenericClient,
        handle: &str,
        data: CompanyUpdate,
    ) -> DbResult<Company> {
        let set = build_set_clause(data.into_pairs(), COLUMN_MAP)?;
        let sql = format!(
            "UPDATE companies SET {} WHERE handle = ${} RETURNING {COLUMNS}",
            set.sql,
            set.values.len() + 1
        );
        let mut params = set.params_ref();
        params.push(&handle as &(dyn ToSql + Sync));

        let row = client
            .query_opt(&sql, &params)
            .await?
            .ok_or_else(|| JoblyError::not_found(format!("No company: {handle}")))?;
        Company::from_row(&row)
    }

    /// Delete a company by handle.
    pub async fn remove(client: &impl GenericClient, handle: &str) -> DbResult<()> {
        client
            .query_opt(
                "DELETE FROM companies WHERE handle = $1 RETURNING handle",
                &[&handle],
            )
            .await?
            .ok_or_else(|| JoblyError::not_found(format!("No company: {handle}")))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn update_pairs_use_api_names_in_declaration_order() {
        let update = CompanyUpdate {
            name: Some("Acme".into()),
            logo_url: Some("http://a.png".into()),
            num_employees: Some(40),
            ..Default::default()
        };
        let names: Vec<_> = update.into_pairs().into_iter().map(|(k, _)| k).collect();
        assert_eq!(names, vec!["name", "numEmployees", "logoUrl"]);
    }

    #[test]
    fn update_deserializes_camel_case_and_rejects_handle() {
        let update: CompanyUpdate =
            serde_json::from_str(r#"{"numEmployees": 12, "logoUrl": "x"}"#).unwrap();
        assert_eq!(update.num_employees, Some(12));
        assert!(serde_json::from_str::<CompanyUpdate>(r#"{"handle": "new"}"#).is_err());
    }

    #[test]
    fn set_clause_maps_camel_case_to_columns() {
        let update = CompanyUpdate {
            num_employees: Some(5),
            logo_url: Some("u".into()),
            ..Default::default()
        };
        let set = build_set_clause(update.into_pairs(), COLUMN_MAP).unwrap();
        assert_eq!(set.sql, r#""num_employees"=$1, "logo_url"=$2"#);
    }

    #[test]
    fn company_serializes_camel_case() {
        let company = Company {
            handle: "c1".into(),
            name: "C1".into(),
            description: "Desc1".into(),
            num_employees: Some(1),
            logo_url: None,
        };
        let json = serde_json::to_value(&company).unwrap();
        assert_eq!(json["numEmployees"], 1);
        assert!(json["logoUrl"].is_null());
    }
}
