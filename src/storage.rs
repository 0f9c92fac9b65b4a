use crate::models::Record;
use anyhow::{Context, Result, bail};
use csv::{ReaderBuilder, WriterBuilder};
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// Union of metric names across the records, in first-seen order.
/// Decides the CSV column layout.
pub fn metric_columns(records: &[Record]) -> Vec<String> {
    let mut cols: Vec<String> = Vec::new();
    for r in records {
        for key in r.metrics.keys() {
            if !cols.contains(key) {
                cols.push(key.clone());
            }
        }
    }
    cols
}

/// Save records as CSV: `year,country` followed by one column per metric.
/// A metric absent from a record leaves the field empty.
pub fn save_csv<P: AsRef<Path>>(records: &[Record], path: P) -> Result<()> {
    let cols = metric_columns(records);
    let mut wtr = WriterBuilder::new().from_path(path)?;

    let mut header = vec!["year".to_string(), "country".to_string()];
    header.extend(cols.iter().cloned());
    wtr.write_record(&header)?;

    for r in records {
        let mut row = vec![r.year.to_string(), r.country.clone()];
        for col in &cols {
            row.push(r.metric(col).map(|v| v.to_string()).unwrap_or_default());
        }
        wtr.write_record(&row)?;
    }
    wtr.flush()?;
    Ok(())
}

/// Load records from a CSV produced by [`save_csv`] (or shaped like it).
pub fn load_csv<P: AsRef<Path>>(path: P) -> Result<Vec<Record>> {
    let mut rdr = ReaderBuilder::new().from_path(path.as_ref())?;
    let headers = rdr.headers()?.clone();
    if headers.len() < 2 {
        bail!("csv needs at least year and country columns");
    }
    let metric_names: Vec<String> = headers.iter().skip(2).map(|h| h.to_string()).collect();

    let mut out = Vec::new();
    for result in rdr.records() {
        let row = result?;
        let year: i32 = row
            .get(0)
            .unwrap_or_default()
            .trim()
            .parse()
            .with_context(|| format!("invalid year in row {:?}", row))?;
        let country = row.get(1).unwrap_or_default().trim().to_string();
        let mut rec = Record::new(year, country);
        for (i, name) in metric_names.iter().enumerate() {
            let field = row.get(i + 2).unwrap_or_default().trim();
            if field.is_empty() {
                continue;
            }
            let v: f64 = field
                .parse()
                .with_context(|| format!("invalid value for {name} in row {:?}", row))?;
            rec.metrics.insert(name.clone(), v);
        }
        out.push(rec);
    }
    Ok(out)
}

/// Save records as a pretty JSON array of wide objects.
pub fn save_json<P: AsRef<Path>>(records: &[Record], path: P) -> Result<()> {
    let mut f = File::create(path)?;
    let s = serde_json::to_string_pretty(records)?;
    f.write_all(s.as_bytes())?;
    Ok(())
}

/// Load records from a JSON array of wide objects.
pub fn load_json<P: AsRef<Path>>(path: P) -> Result<Vec<Record>> {
    let f = File::open(path.as_ref())
        .with_context(|| format!("open {}", path.as_ref().display()))?;
    let records: Vec<Record> = serde_json::from_reader(f).context("parse record array")?;
    Ok(records)
}
