use crate::calendar::ExclusionSet;
use crate::event::{Event, NonWorkingDay};
use chrono::NaiveDate;
use polars::prelude::*;
use serde::{Deserialize, Serialize};

/// Business days remaining for one event. Derived on demand, never stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComputedResult {
    pub name: String,
    pub date: NaiveDate,
    pub business_days: i64,
}

/// A result as handed to a presentation layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultRow {
    #[serde(flatten)]
    pub result: ComputedResult,
    pub at_risk: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultQuery {
    #[serde(default)]
    pub search: String,
    #[serde(default)]
    pub minimum_business_days: i64,
}

impl ResultQuery {
    pub fn new(search: impl Into<String>, minimum_business_days: i64) -> Self {
        Self {
            search: search.into(),
            minimum_business_days,
        }
    }
}

/// Evaluate every event against `today` and the dates of `days`.
///
/// Output order and length match `events`.
pub fn compute_results(
    events: &[Event],
    days: &[NonWorkingDay],
    today: NaiveDate,
) -> Vec<ComputedResult> {
    let exclusions = ExclusionSet::from_days(days);
    events
        .iter()
        .map(|event| ComputedResult {
            name: event.name.clone(),
            date: event.date,
            business_days: exclusions.business_days_between(today, event.date),
        })
        .collect()
}

/// Case-insensitive substring match on the name. An empty query keeps everything.
pub fn filter_by_name(results: &[ComputedResult], query: &str) -> Vec<ComputedResult> {
    if query.is_empty() {
        return results.to_vec();
    }
    let needle = query.to_lowercase();
    results
        .iter()
        .filter(|result| result.name.to_lowercase().contains(&needle))
        .cloned()
        .collect()
}

/// Stable ascending sort; equal counts keep their incoming order.
pub fn sort_by_business_days(results: &[ComputedResult]) -> Vec<ComputedResult> {
    let mut sorted = results.to_vec();
    sorted.sort_by_key(|result| result.business_days);
    sorted
}

pub fn flag_at_risk(results: &[ComputedResult], minimum_business_days: i64) -> Vec<ResultRow> {
    results
        .iter()
        .map(|result| ResultRow {
            result: result.clone(),
            at_risk: result.business_days <= minimum_business_days,
        })
        .collect()
}

/// Filter, sort and flag, in that order.
pub fn query_results(results: &[ComputedResult], query: &ResultQuery) -> Vec<ResultRow> {
    let filtered = filter_by_name(results, &query.search);
    let sorted = sort_by_business_days(&filtered);
    flag_at_risk(&sorted, query.minimum_business_days)
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultSummary {
    pub total: usize,
    pub at_risk: usize,
    pub overdue: usize,
    pub nearest: Option<ComputedResult>,
}

impl ResultSummary {
    pub fn from_rows(rows: &[ResultRow]) -> Self {
        let nearest = rows
            .iter()
            .map(|row| &row.result)
            .filter(|result| result.business_days >= 0)
            .min_by_key(|result| result.business_days)
            .cloned();
        Self {
            total: rows.len(),
            at_risk: rows.iter().filter(|row| row.at_risk).count(),
            overdue: rows
                .iter()
                .filter(|row| row.result.business_days < 0)
                .count(),
            nearest,
        }
    }

    pub fn to_cli_summary(&self) -> String {
        let mut parts = Vec::new();
        parts.push(format!("events={}", self.total));
        if self.at_risk > 0 {
            parts.push(format!("at_risk={}", self.at_risk));
        }
        if self.overdue > 0 {
            parts.push(format!("overdue={}", self.overdue));
        }
        if let Some(nearest) = &self.nearest {
            parts.push(format!(
                "next={} ({} on {})",
                nearest.name, nearest.business_days, nearest.date
            ));
        }
        parts.join(", ")
    }
}

/// Tabular form of `rows` with columns `name`, `date`, `business_days`, `at_risk`.
pub fn rows_to_dataframe(rows: &[ResultRow]) -> PolarsResult<DataFrame> {
    let names: Vec<&str> = rows.iter().map(|row| row.result.name.as_str()).collect();
    let dates: Vec<String> = rows
        .iter()
        .map(|row| row.result.date.format("%Y-%m-%d").to_string())
        .collect();
    let business_days: Vec<i64> = rows.iter().map(|row| row.result.business_days).collect();
    let at_risk: Vec<bool> = rows.iter().map(|row| row.at_risk).collect();

    let columns: Vec<Column> = vec![
        Series::new(PlSmallStr::from_static("name"), names).into_column(),
        Series::new(PlSmallStr::from_static("date"), dates).into_column(),
        Series::new(PlSmallStr::from_static("business_days"), business_days).into_column(),
        Series::new(PlSmallStr::from_static("at_risk"), at_risk).into_column(),
    ];
    DataFrame::new(columns)
}
