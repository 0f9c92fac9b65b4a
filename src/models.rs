use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// How to specify years in API queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum YearSpec {
    /// Single year like 2021
    Year(i32),
    /// Inclusive range like 2000..=2021
    Range { start: i32, end: i32 },
}

impl YearSpec {
    pub fn to_query_param(&self) -> String {
        match *self {
            YearSpec::Year(y) => y.to_string(),
            YearSpec::Range { start, end } => format!("{}:{}", start, end),
        }
    }

    /// Whether a year falls inside this selection.
    pub fn contains(&self, year: i32) -> bool {
        match *self {
            YearSpec::Year(y) => y == year,
            YearSpec::Range { start, end } => (start..=end).contains(&year),
        }
    }
}

/// One observation: a year, a country, and one or more named metric values
/// (e.g. `Gold`/`Silver`/`Bronze` counts, or a single GDP figure).
///
/// The wide JSON form served by the backend deserializes directly:
/// `{"Year": 2021, "Country": "USA", "Gold": 39.0, "Silver": 41.0, "Bronze": 33.0}`.
/// Records are treated as read-only once fetched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    #[serde(rename = "Year")]
    pub year: i32,
    #[serde(rename = "Country")]
    pub country: String,
    #[serde(flatten)]
    pub metrics: BTreeMap<String, f64>,
}

impl Record {
    pub fn new(year: i32, country: impl Into<String>) -> Self {
        Self {
            year,
            country: country.into(),
            metrics: BTreeMap::new(),
        }
    }

    /// Builder-style helper, mostly for tests and fixtures.
    pub fn with_metric(mut self, key: impl Into<String>, value: f64) -> Self {
        self.metrics.insert(key.into(), value);
        self
    }

    pub fn metric(&self, key: &str) -> Option<f64> {
        self.metrics.get(key).copied()
    }
}

/// The user-committed selection driving which records participate in rendering.
///
/// An empty `selected_countries` set conventionally means "no filter / default
/// selection". Selections not present in the data yield an empty result set
/// downstream, never an error.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterState {
    pub selected_year: Option<i32>,
    pub selected_countries: BTreeSet<String>,
}

impl FilterState {
    pub fn for_year(year: i32) -> Self {
        Self {
            selected_year: Some(year),
            selected_countries: BTreeSet::new(),
        }
    }

    /// True when the country participates under the current selection
    /// (empty selection admits everything).
    pub fn admits_country(&self, country: &str) -> bool {
        self.selected_countries.is_empty() || self.selected_countries.contains(country)
    }
}

/// Normalized row for the multi-axis line chart: one per country within the
/// selected year. Every `SeriesPoint` produced by one pivot carries exactly
/// the same metric key set, which is what keeps the axes aligned.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeriesPoint {
    pub name: String,
    pub values: BTreeMap<String, f64>,
}

impl SeriesPoint {
    pub fn value(&self, metric: &str) -> f64 {
        self.values.get(metric).copied().unwrap_or(0.0)
    }
}

/// Normalized per-country series for the stream graph: one value per year
/// over the full year range of the input (missing years filled with 0).
#[derive(Debug, Clone, PartialEq)]
pub struct YearSeries {
    pub country: String,
    /// Ascending by year, one entry per year in the global range.
    pub points: Vec<(i32, f64)>,
}

impl YearSeries {
    pub fn total(&self) -> f64 {
        self.points.iter().map(|(_, v)| v).sum()
    }
}

/// One stacked band sample of the stream graph, in data coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BandPoint {
    pub year: i32,
    pub lower: f64,
    pub upper: f64,
}

/// A country's band through the stacked stream: for each year the interval
/// `[lower, upper]` abuts its neighbors with no gaps and no overlaps.
#[derive(Debug, Clone, PartialEq)]
pub struct StackedBand {
    pub country: String,
    pub points: Vec<BandPoint>,
}
