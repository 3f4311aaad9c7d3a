use super::{Descriptor, FilterSet, FilterTranslator};
use crate::error::{DbResult, JoblyError};
use crate::params::NormalizedParams;

const NAME: &str = "name";
const MIN_EMPLOYEES: &str = "minemployees";
const MAX_EMPLOYEES: &str = "maxemployees";

/// Company search: `name` substring and an employee-count range.
#[derive(Debug, Clone, Copy, Default)]
pub struct CompanyFilters;

fn parse_count(key: &str, raw: &str) -> DbResult<i64> {
    raw.trim().parse::<i64>().map_err(|_| {
        JoblyError::bad_request(format!("{key} must be an integer, got {raw:?}"))
    })
}

impl FilterTranslator for CompanyFilters {
    const ALLOWED: &'static [&'static str] = &[NAME, MIN_EMPLOYEES, MAX_EMPLOYEES];
    const ENTITY: &'static str = "company";

    fn translate(params: &NormalizedParams) -> DbResult<FilterSet> {
        let mut filters = FilterSet::new();

        let min = params
            .get(MIN_EMPLOYEES)
            .map(|v| parse_count(MIN_EMPLOYEES, v))
            .transpose()?;
        let max = params
            .get(MAX_EMPLOYEES)
            .map(|v| parse_count(MAX_EMPLOYEES, v))
            .transpose()?;

        match (min, max) {
            (Some(min), Some(max)) if min > max => {
                return Err(JoblyError::InvalidRange { min, max });
            }
            (Some(min), Some(max)) => {
                filters.insert("num_employees", Descriptor::between(min, max));
            }
            (Some(min), None) => filters.insert("num_employees", Descriptor::compare(">=", min)),
            (None, Some(max)) => filters.insert("num_employees", Descriptor::compare("<=", max)),
            (None, None) => {}
        }

        if let Some(name) = params.get(NAME) {
            filters.insert("name", Descriptor::ilike(name));
        }

        Ok(filters)
    }
}
