use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use podium::viz::{self, LegendMode, RenderOptions};
use podium::{storage, stats};
use podium::{ChartKind, ChartStatus, Client, Controls, Pipeline, PipelineConfig, QueryResult, YearSpec};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "podium",
    version,
    about = "Fetch, store & visualize medal/indicator statistics"
)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render a chart from a dataset (and optionally save the raw data).
    Chart(ChartArgs),
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum KindArg {
    /// Multi-axis line chart for one year.
    Parallel,
    /// Stacked stream graph across all years.
    Stream,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum LegendArg {
    Inside,
    Right,
    Bottom,
}

impl From<LegendArg> for LegendMode {
    fn from(l: LegendArg) -> Self {
        match l {
            LegendArg::Inside => LegendMode::Inside,
            LegendArg::Right => LegendMode::Right,
            LegendArg::Bottom => LegendMode::Bottom,
        }
    }
}

#[derive(Args, Debug)]
struct ChartArgs {
    /// Load records from a local file (.csv or .json).
    #[arg(long, conflicts_with = "fetch")]
    input: Option<PathBuf>,
    /// Fetch a named dataset from the stats backend (e.g. medals, gdp).
    #[arg(long)]
    fetch: Option<String>,
    /// Override the backend base URL.
    #[arg(long)]
    base_url: Option<String>,
    /// Restrict to a year (YYYY) or inclusive range (YYYY:YYYY); applies to
    /// fetches and file loads alike.
    #[arg(long)]
    years: Option<String>,
    /// Chart kind.
    #[arg(long, value_enum, default_value_t = KindArg::Parallel)]
    kind: KindArg,
    /// Year for the parallel chart (defaults to the most recent year present).
    #[arg(short = 'y', long)]
    year: Option<i32>,
    /// Country filter, comma or semicolon separated (empty = default set).
    #[arg(short = 'c', long)]
    countries: Option<String>,
    /// Metric columns for the parallel chart, in axis order.
    #[arg(long, default_value = "Gold,Silver,Bronze")]
    metrics: String,
    /// Metric deciding polyline draw order.
    #[arg(long, default_value = "Gold")]
    primary: String,
    /// Metric the stream graph stacks.
    #[arg(long, default_value = "Gold")]
    stream_metric: String,
    /// Country count when the stream selection is empty.
    #[arg(long, default_value_t = 10)]
    take: usize,
    /// Chart output path (.svg or .png).
    #[arg(short, long, default_value = "chart.svg")]
    out: PathBuf,
    /// Width of the chart (default 1000).
    #[arg(long, default_value_t = 1000)]
    width: u32,
    /// Height of the chart (default 600).
    #[arg(long, default_value_t = 600)]
    height: u32,
    /// Legend placement.
    #[arg(long, value_enum, default_value_t = LegendArg::Bottom)]
    legend: LegendArg,
    /// Locale tag for tick labels (en, de, fr, ...).
    #[arg(long, default_value = "en")]
    locale: String,
    /// Chart title.
    #[arg(long, default_value = "")]
    title: String,
    /// Label each series at its path end, in addition to the legend.
    #[arg(long, default_value_t = false)]
    label_series: bool,
    /// Save the raw records to a file (.csv or .json by extension).
    #[arg(long)]
    save: Option<PathBuf>,
    /// Print per-country statistics of the primary metric to stdout.
    #[arg(long, default_value_t = false)]
    stats: bool,
}

fn parse_list(s: &str) -> Vec<String> {
    s.split([',', ';'])
        .map(|x| x.trim().to_string())
        .filter(|x| !x.is_empty())
        .collect()
}

fn parse_years(s: &str) -> Option<YearSpec> {
    if let Some((a, b)) = s.split_once(':') {
        let start = a.parse::<i32>().ok()?;
        let end = b.parse::<i32>().ok()?;
        Some(YearSpec::Range { start, end })
    } else {
        s.parse::<i32>().ok().map(YearSpec::Year)
    }
}

fn fmt_opt(v: Option<f64>) -> String {
    match v {
        Some(x) if x.is_finite() => {
            let s = format!("{:.4}", x);
            s.trim_end_matches('0').trim_end_matches('.').to_string()
        }
        _ => "NA".to_string(),
    }
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    match cli.cmd {
        Command::Chart(args) => cmd_chart(args),
    }
}

fn load_query(args: &ChartArgs) -> Result<QueryResult> {
    let years = match &args.years {
        Some(s) => Some(
            parse_years(s)
                .ok_or_else(|| anyhow::anyhow!("invalid --years, expected YYYY or YYYY:YYYY"))?,
        ),
        None => None,
    };

    if let Some(path) = &args.input {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("csv")
            .to_ascii_lowercase();
        let mut records = match ext.as_str() {
            "json" => storage::load_json(path)?,
            _ => storage::load_csv(path)?,
        };
        // The backend filters years server-side; for files we do it here.
        if let Some(spec) = years {
            records.retain(|r| spec.contains(r.year));
        }
        log::info!("loaded {} rows from {}", records.len(), path.display());
        return Ok(QueryResult::ready(records));
    }
    if let Some(dataset) = &args.fetch {
        let client = match &args.base_url {
            Some(url) => Client::with_base_url(url.clone()),
            None => Client::default(),
        };
        let q = client.query(dataset, years);
        log::info!("fetched {} rows from dataset {}", q.data.len(), dataset);
        return Ok(q);
    }
    anyhow::bail!("one of --input or --fetch is required")
}

fn cmd_chart(args: ChartArgs) -> Result<()> {
    let query = load_query(&args)?;

    let mut controls = Controls::new(&query.data);
    if let Some(year) = args.year {
        controls.set_year(year);
    }
    if let Some(countries) = &args.countries {
        for c in parse_list(countries) {
            controls.stage_country(c);
        }
        controls.apply();
    }

    let kind = match args.kind {
        KindArg::Parallel => ChartKind::Parallel,
        KindArg::Stream => ChartKind::Stream,
    };
    let config = PipelineConfig {
        kind,
        metric_keys: parse_list(&args.metrics),
        primary_metric: args.primary.clone(),
        stream_metric: args.stream_metric.clone(),
        default_take: args.take,
        layout: viz::layout_for(args.width, args.height, args.legend.into()),
    };

    let mut pipeline = Pipeline::new(config);
    let status = pipeline.run(&query, 1, &controls.filter_state());
    match &status {
        ChartStatus::Loading => log::warn!("data source still loading"),
        ChartStatus::Failed => log::warn!("data source reported failure"),
        ChartStatus::Empty => log::info!("selection yields no rows; rendering empty frame"),
        ChartStatus::Ready(_) => {}
    }

    let opts = RenderOptions {
        title: args.title.clone(),
        legend: args.legend.into(),
        locale: args.locale.clone(),
        label_series: args.label_series,
    };
    viz::render_chart(&status, &args.out, args.width, args.height, &opts)
        .with_context(|| format!("render {}", args.out.display()))?;
    eprintln!("Wrote chart to {}", args.out.display());

    if let Some(path) = &args.save {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("csv")
            .to_ascii_lowercase();
        match ext.as_str() {
            "json" => storage::save_json(&query.data, path)?,
            _ => storage::save_csv(&query.data, path)?,
        }
        eprintln!("Saved {} rows to {}", query.data.len(), path.display());
    }

    if args.stats {
        for s in stats::grouped_summary(&query.data, &args.primary) {
            println!(
                "{}  count={} missing={}  min={} max={} mean={} median={}",
                s.country,
                s.count,
                s.missing,
                fmt_opt(s.min),
                fmt_opt(s.max),
                fmt_opt(s.mean),
                fmt_opt(s.median)
            );
        }
    }

    Ok(())
}
