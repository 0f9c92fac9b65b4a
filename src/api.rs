//! Synchronous client for the pre-aggregated statistics backend.
//!
//! The backend serves datasets (e.g. `medals`, `gdp`) as a JSON array of wide
//! records: `[{"Year":2021,"Country":"USA","Gold":39,...}, ...]`. Error
//! responses carry a top-level `message` object instead of an array; those are
//! surfaced as errors.
//!
//! [`Client::fetch`] is the fallible path for callers that want a `Result`.
//! [`DataSource::query`] is the pipeline-facing path: it folds transport
//! failures into [`QueryResult::is_error`] so the rendering pipeline can show
//! a static error state instead of propagating.

use crate::models::{Record, YearSpec};
use anyhow::{Context, Result, bail};
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC};
use reqwest::blocking::Client as HttpClient;
use reqwest::redirect::Policy;
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;

/// Ways a backend payload can be wrong independent of transport failures.
#[derive(Debug, Error)]
pub enum PayloadError {
    /// The backend answered with its `{"message": ...}` error object.
    #[error("api error: {0}")]
    Api(String),
    #[error("unexpected response shape: not a top-level array")]
    NotAnArray,
}

/// What a [`DataSource`] hands to the pipeline: the rows plus loading/error
/// flags, checked once before any transformation runs.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryResult {
    pub data: Vec<Record>,
    pub is_loading: bool,
    pub is_error: bool,
}

impl QueryResult {
    pub fn loading() -> Self {
        Self {
            is_loading: true,
            ..Self::default()
        }
    }

    pub fn failed() -> Self {
        Self {
            is_error: true,
            ..Self::default()
        }
    }

    pub fn ready(data: Vec<Record>) -> Self {
        Self {
            data,
            is_loading: false,
            is_error: false,
        }
    }
}

/// Abstract provider of raw tabular records. The pipeline only ever reads.
pub trait DataSource {
    fn query(&self) -> QueryResult;
}

/// In-memory source, used for file-loaded data and in tests.
#[derive(Debug, Clone)]
pub struct StaticSource {
    records: Vec<Record>,
}

impl StaticSource {
    pub fn new(records: Vec<Record>) -> Self {
        Self { records }
    }
}

impl DataSource for StaticSource {
    fn query(&self) -> QueryResult {
        QueryResult::ready(self.records.clone())
    }
}

#[derive(Debug, Clone)]
pub struct Client {
    pub base_url: String,
    http: HttpClient,
}

impl Default for Client {
    fn default() -> Self {
        let http = HttpClient::builder()
            .timeout(Duration::from_secs(30)) // total request timeout
            .connect_timeout(Duration::from_secs(10)) // connect timeout
            .redirect(Policy::limited(5)) // cap redirects
            .user_agent(concat!("podium/", env!("CARGO_PKG_VERSION")))
            .build()
            .expect("reqwest client build");
        Self {
            base_url: "https://api.example.org/stats/v1".into(),
            http,
        }
    }
}

// Allow -, _, . unescaped in dataset names
const SAFE: &AsciiSet = &NON_ALPHANUMERIC.remove(b'-').remove(b'_').remove(b'.');

fn enc(part: &str) -> String {
    percent_encoding::utf8_percent_encode(part.trim(), SAFE).to_string()
}

impl Client {
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }

    /// Fetch one dataset as wide records.
    ///
    /// - `dataset`: backend dataset name, e.g. `"medals"` or `"gdp"`.
    /// - `years`: optional single year or inclusive range; `None` fetches
    ///   everything the dataset has.
    ///
    /// ### Errors
    /// - Network/HTTP error (after a small bounded retry on 5xx)
    /// - JSON decoding error
    /// - API-level error payload (surfaced as an error)
    pub fn fetch(&self, dataset: &str, years: Option<YearSpec>) -> Result<Vec<Record>> {
        if dataset.trim().is_empty() {
            bail!("dataset name required");
        }

        let mut url = format!("{}/dataset/{}?format=json", self.base_url, enc(dataset));
        if let Some(y) = years {
            url.push_str(&format!("&years={}", y.to_query_param()));
        }

        // Small retry for transient failures (5xx / network errors)
        let get_json = |u: &str| -> Result<Value> {
            let mut last_err: Option<anyhow::Error> = None;
            for backoff_ms in [100u64, 300, 700] {
                match self.http.get(u).send() {
                    Ok(r) if r.status().is_success() => {
                        return r.json().context("decode json");
                    }
                    Ok(r) if r.status().is_server_error() => {
                        last_err = Some(anyhow::anyhow!(
                            "request failed with HTTP {} after retries",
                            r.status()
                        ));
                    }
                    Ok(r) => bail!("request failed with HTTP {}", r.status()),
                    Err(e) => last_err = Some(anyhow::Error::new(e).context("network error")),
                }
                std::thread::sleep(Duration::from_millis(backoff_ms));
            }
            Err(last_err.unwrap_or_else(|| anyhow::anyhow!("request failed: retries exhausted")))
        };

        let v: Value = get_json(&url).with_context(|| format!("GET {}", url))?;
        parse_payload(v)
    }

    /// The [`DataSource`] view over one dataset query. Fetch failure becomes
    /// `is_error: true` rather than an `Err`; the pipeline renders it as a
    /// static error state.
    pub fn query(&self, dataset: &str, years: Option<YearSpec>) -> QueryResult {
        match self.fetch(dataset, years) {
            Ok(data) => QueryResult::ready(data),
            Err(e) => {
                log::warn!("dataset fetch failed: {e:#}");
                QueryResult::failed()
            }
        }
    }
}

/// Parse a backend payload: a top-level array of wide records, or an object
/// with a `message` field on API-level errors.
pub fn parse_payload(v: Value) -> Result<Vec<Record>> {
    if let Some(msg) = v.get("message") {
        return Err(PayloadError::Api(msg.to_string()).into());
    }
    let arr = v.as_array().ok_or(PayloadError::NotAnArray)?;
    let mut out = Vec::with_capacity(arr.len());
    for item in arr {
        let rec: Record = serde_json::from_value(item.clone()).context("parse record")?;
        out.push(rec);
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn payload_array_parses() {
        let v: Value = serde_json::from_str(
            r#"[{"Year":2021,"Country":"USA","Gold":39.0},
                {"Year":2021,"Country":"CHN","Gold":38.0}]"#,
        )
        .unwrap();
        let recs = parse_payload(v).unwrap();
        assert_eq!(recs.len(), 2);
        assert_eq!(recs[1].country, "CHN");
    }

    #[test]
    fn payload_message_is_error() {
        let v: Value = serde_json::from_str(r#"{"message":"unknown dataset"}"#).unwrap();
        let err = parse_payload(v).unwrap_err();
        assert!(err.to_string().contains("api error"));
    }

    #[test]
    fn persistent_server_error_reports_the_status() {
        use std::io::{Read, Write};
        use std::net::TcpListener;

        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        // Answer every attempt with a 500 so the retry budget runs out.
        let server = std::thread::spawn(move || {
            for stream in listener.incoming().take(3) {
                let mut stream = stream.unwrap();
                let mut buf = [0u8; 1024];
                let _ = stream.read(&mut buf);
                let _ = stream.write_all(
                    b"HTTP/1.1 500 Internal Server Error\r\nconnection: close\r\ncontent-length: 0\r\n\r\n",
                );
            }
        });

        let client = Client::with_base_url(format!("http://{}", addr));
        let err = client.fetch("medals", None).unwrap_err();
        let msg = format!("{:?}", err);
        assert!(msg.contains("HTTP 500"), "got: {msg}");
        assert!(!msg.contains("None"), "got: {msg}");
        server.join().unwrap();
    }

    #[test]
    fn static_source_round_trips() {
        let recs = vec![Record::new(2021, "USA").with_metric("Gold", 39.0)];
        let src = StaticSource::new(recs.clone());
        let q = src.query();
        assert!(!q.is_loading && !q.is_error);
        assert_eq!(q.data, recs);
    }
}
