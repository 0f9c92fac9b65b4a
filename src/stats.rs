use crate::models::Record;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Summary statistics for one country over one metric.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Summary {
    pub country: String,
    pub count: usize,
    pub missing: usize,
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub mean: Option<f64>,
    pub median: Option<f64>,
}

/// Compute per-country statistics of `metric` across all years.
/// Records lacking the metric count as missing.
pub fn grouped_summary(records: &[Record], metric: &str) -> Vec<Summary> {
    let mut groups: BTreeMap<String, Vec<f64>> = BTreeMap::new();
    let mut missing: BTreeMap<String, usize> = BTreeMap::new();
    for r in records {
        match r.metric(metric) {
            Some(v) => groups.entry(r.country.clone()).or_default().push(v),
            None => *missing.entry(r.country.clone()).or_default() += 1,
        }
    }

    let mut out = Vec::new();
    for (country, mut vals) in groups {
        vals.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
        let count = vals.len();
        let min = vals.first().cloned();
        let max = vals.last().cloned();
        let mean = if count > 0 {
            Some(vals.iter().copied().sum::<f64>() / count as f64)
        } else {
            None
        };
        let median = if count == 0 {
            None
        } else if count % 2 == 1 {
            Some(vals[count / 2])
        } else {
            Some((vals[count / 2 - 1] + vals[count / 2]) / 2.0)
        };
        let miss = missing.remove(&country).unwrap_or(0);
        out.push(Summary {
            country,
            count,
            missing: miss,
            min,
            max,
            mean,
            median,
        });
    }
    // Countries that only ever missed the metric still get a row.
    for (country, miss) in missing {
        out.push(Summary {
            country,
            count: 0,
            missing: miss,
            min: None,
            max: None,
            mean: None,
            median: None,
        });
    }
    out.sort_by(|a, b| a.country.cmp(&b.country));
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn summary_over_years() {
        let recs = vec![
            Record::new(2012, "USA").with_metric("Gold", 46.0),
            Record::new(2016, "USA").with_metric("Gold", 46.0),
            Record::new(2021, "USA").with_metric("Gold", 39.0),
            Record::new(2021, "FOO"),
        ];
        let out = grouped_summary(&recs, "Gold");
        assert_eq!(out.len(), 2);
        let foo = &out[0];
        assert_eq!((foo.count, foo.missing), (0, 1));
        let usa = &out[1];
        assert_eq!(usa.count, 3);
        assert_eq!(usa.min, Some(39.0));
        assert_eq!(usa.median, Some(46.0));
    }
}
