//! podium
//!
//! A lightweight Rust library for turning pre-aggregated statistics (year,
//! country, metric values — e.g. Olympic medal counts or GDP figures) into
//! interactive-style SVG/PNG charts. Pairs with the `podium` CLI.
//!
//! ### Features
//! - Fetch datasets from a stats backend, or load them from CSV/JSON
//! - Declarative pipeline: filter → transform → layout → render, memoized on
//!   the committed selection and data revision
//! - Multi-axis line chart (one axis per metric, one polyline per country)
//! - Stacked stream graph with inside-out ordering and a wiggle-minimizing
//!   baseline
//! - Two-phase country selection (staged edits, explicit apply)
//!
//! ### Example
//! ```no_run
//! use podium::{Controls, Pipeline, PipelineConfig, ChartKind, QueryResult};
//! use podium::viz::{render_chart, RenderOptions};
//!
//! let client = podium::Client::default();
//! let query = client.query("medals", None);
//! let controls = Controls::new(&query.data);
//!
//! let mut pipeline = Pipeline::new(PipelineConfig::medals(ChartKind::Parallel));
//! let status = pipeline.run(&query, 1, &controls.filter_state());
//! render_chart(&status, "medals.svg", 1000, 600, &RenderOptions::default())?;
//! # Ok::<(), anyhow::Error>(())
//! ```

pub mod api;
pub mod controls;
pub mod layout;
pub mod models;
pub mod pipeline;
pub mod stats;
pub mod storage;
pub mod transform;
pub mod viz;

pub use api::{Client, DataSource, QueryResult, StaticSource};
pub use controls::{Controls, SelectionPhase};
pub use models::{FilterState, Record, YearSpec};
pub use pipeline::{ChartKind, ChartStatus, Pipeline, PipelineConfig};
