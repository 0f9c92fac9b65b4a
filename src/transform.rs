//! Pure reshaping of raw records into chart-ready structures.
//!
//! Both entry points are total functions: absence of data, an unset year, or
//! a selection naming countries not present in the data all degrade to empty
//! output. Nothing in here errors.

use crate::models::{FilterState, Record, SeriesPoint, YearSeries};
use std::collections::{BTreeMap, HashMap, HashSet};

/// Pivot records into one [`SeriesPoint`] per country for the selected year.
///
/// Rows are filtered to `filter.selected_year` (no year selected means no
/// rows), then to `filter.selected_countries` when non-empty. The metric key
/// set of every output row is exactly `metric_keys`, in that order, with
/// missing metrics defaulting to 0. Country order is first-seen order of the
/// surviving rows; a duplicate (year, country) row keeps the first occurrence.
pub fn pivot_year(
    records: &[Record],
    filter: &FilterState,
    metric_keys: &[String],
) -> Vec<SeriesPoint> {
    let Some(year) = filter.selected_year else {
        return Vec::new();
    };

    let mut out: Vec<SeriesPoint> = Vec::new();
    let mut seen: HashSet<String> = HashSet::new();
    for r in records {
        if r.year != year || !filter.admits_country(&r.country) {
            continue;
        }
        if seen.contains(&r.country) {
            continue;
        }
        let mut values = BTreeMap::new();
        for key in metric_keys {
            values.insert(key.clone(), r.metric(key).unwrap_or(0.0));
        }
        seen.insert(r.country.clone());
        out.push(SeriesPoint {
            name: r.country.clone(),
            values,
        });
    }
    out
}

/// Group records into one [`YearSeries`] per country over the full year range
/// of the input, for the stream graph.
///
/// The country universe is `filter.selected_countries` when non-empty,
/// otherwise the first `default_take` countries in first-seen order of the
/// raw feed. Every country gets a value for every year in the global
/// `[min_year, max_year]` range; missing observations contribute 0, which is
/// what keeps the stacking total.
pub fn year_series(
    records: &[Record],
    filter: &FilterState,
    metric: &str,
    default_take: usize,
) -> Vec<YearSeries> {
    if records.is_empty() {
        return Vec::new();
    }

    // First-seen country order of the raw feed drives the default universe.
    let mut universe: Vec<String> = Vec::new();
    for r in records {
        if !universe.contains(&r.country) {
            if filter.selected_countries.is_empty() {
                if universe.len() < default_take {
                    universe.push(r.country.clone());
                }
            } else if filter.selected_countries.contains(&r.country) {
                universe.push(r.country.clone());
            }
        }
    }
    if universe.is_empty() {
        return Vec::new();
    }

    let min_year = records.iter().map(|r| r.year).min().unwrap_or(0);
    let max_year = records.iter().map(|r| r.year).max().unwrap_or(0);

    // (country, year) -> value; first occurrence wins.
    let mut by_key: HashMap<(&str, i32), f64> = HashMap::new();
    for r in records {
        by_key
            .entry((r.country.as_str(), r.year))
            .or_insert_with(|| r.metric(metric).unwrap_or(0.0));
    }

    universe
        .into_iter()
        .map(|country| {
            let points = (min_year..=max_year)
                .map(|y| {
                    (
                        y,
                        by_key.get(&(country.as_str(), y)).copied().unwrap_or(0.0),
                    )
                })
                .collect();
            YearSeries { country, points }
        })
        .collect()
}
