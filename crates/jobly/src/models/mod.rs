//! Company and job records and their CRUD operations.
//!
//! Every operation takes `&impl GenericClient`, so it can run on a plain
//! connection, a pooled one, or inside a transaction.

mod company;
mod job;

pub use company::{Company, CompanyDetail, CompanyUpdate, NewCompany};
pub use job::{Job, JobDetail, JobSummary, JobUpdate, NewJob};

use crate::clause::assemble_where;
use crate::client::GenericClient;
use crate::error::{DbResult, JoblyError};
use crate::filter::FilterSet;
use crate::row::FromRow;

/// Run `select` with the assembled filter clause spliced in before `order_by`.
///
/// An empty `filters` runs the unfiltered query and may return no rows. A
/// non-empty `filters` that matches nothing is [`JoblyError::NotFound`].
pub(crate) async fn fetch_filtered<T: FromRow>(
    client: &impl GenericClient,
    select: &str,
    order_by: &str,
    filters: &FilterSet,
    entity: &str,
) -> DbResult<Vec<T>> {
    let clause = assemble_where(filters);
    let sql = format!("{select}{} ORDER BY {order_by}", clause.where_sql());
    let rows = client.query(&sql, &clause.params_ref()).await?;

    if rows.is_empty() && !clause.is_empty() {
        return Err(JoblyError::not_found(format!("No {entity} matches search")));
    }

    T::from_rows(&rows)
}
