use super::{Descriptor, FilterSet, FilterTranslator};
use crate::error::DbResult;
use crate::params::NormalizedParams;
use crate::value::SqlValue;

const TITLE: &str = "title";
const MIN_SALARY: &str = "minsalary";
const HAS_EQUITY: &str = "hasequity";

/// Job search: `title` substring, minimum salary, and a has-equity flag.
#[derive(Debug, Clone, Copy, Default)]
pub struct JobFilters;

impl FilterTranslator for JobFilters {
    const ALLOWED: &'static [&'static str] = &[TITLE, MIN_SALARY, HAS_EQUITY];
    const ENTITY: &'static str = "job";

    fn translate(params: &NormalizedParams) -> DbResult<FilterSet> {
        let mut filters = FilterSet::new();

        // Only the exact string "true" enables the flag; "1", "TRUE", "yes" do not.
        if params.get(HAS_EQUITY) == Some("true") {
            filters.insert("equity", Descriptor::compare(">", 0));
        }

        // Bound as text; coerced to the column type when the statement is bound.
        if let Some(min_salary) = params.get(MIN_SALARY) {
            filters.insert(
                "salary",
                Descriptor::compare(">=", SqlValue::from(min_salary)),
            );
        }

        if let Some(title) = params.get(TITLE) {
            filters.insert("title", Descriptor::ilike(title));
        }

        Ok(filters)
    }
}
