use podium::layout::{LayoutConfig, parallel_layout, stream_layout};
use podium::models::{FilterState, Record};
use podium::transform::{pivot_year, year_series};

fn keys() -> Vec<String> {
    vec!["Gold".into(), "Silver".into(), "Bronze".into()]
}

fn scenario_records() -> Vec<Record> {
    vec![
        Record::new(2021, "USA")
            .with_metric("Gold", 39.0)
            .with_metric("Silver", 41.0)
            .with_metric("Bronze", 33.0),
        Record::new(2021, "CHN")
            .with_metric("Gold", 38.0)
            .with_metric("Silver", 32.0)
            .with_metric("Bronze", 18.0),
    ]
}

#[test]
fn scenario_three_axes_two_polylines() {
    let series = pivot_year(&scenario_records(), &FilterState::for_year(2021), &keys());
    let geo = parallel_layout(&series, &keys(), "Gold", &LayoutConfig::default());

    assert_eq!(geo.axes.len(), 3);
    assert_eq!(geo.lines.len(), 2);
    assert_eq!(geo.legend.len(), 2);

    // Each metric axis uses its own extent.
    let gold = geo.axes.iter().find(|a| a.key == "Gold").unwrap();
    assert_eq!(gold.scale.domain, (38.0, 39.0));
    let bronze = geo.axes.iter().find(|a| a.key == "Bronze").unwrap();
    assert_eq!(bronze.scale.domain, (18.0, 33.0));

    // Every polyline touches every axis.
    for line in &geo.lines {
        assert_eq!(line.points.len(), 3);
    }
}

#[test]
fn draw_order_ascends_by_primary_metric() {
    let series = pivot_year(&scenario_records(), &FilterState::for_year(2021), &keys());
    let geo = parallel_layout(&series, &keys(), "Gold", &LayoutConfig::default());
    // CHN (38 golds) draws before USA (39).
    assert_eq!(geo.lines[0].name, "CHN");
    assert_eq!(geo.lines[1].name, "USA");
}

#[test]
fn colors_are_stable_across_invocations() {
    let series = pivot_year(&scenario_records(), &FilterState::for_year(2021), &keys());
    let cfg = LayoutConfig::default();
    let a = parallel_layout(&series, &keys(), "Gold", &cfg);
    let b = parallel_layout(&series, &keys(), "Gold", &cfg);
    assert_eq!(a.legend, b.legend);
    for (la, lb) in a.lines.iter().zip(&b.lines) {
        assert_eq!(la.color, lb.color);
    }
}

#[test]
fn colors_follow_first_seen_order_not_draw_order() {
    let series = pivot_year(&scenario_records(), &FilterState::for_year(2021), &keys());
    let geo = parallel_layout(&series, &keys(), "Gold", &LayoutConfig::default());
    // USA is first-seen, so it owns the first palette slot even though it
    // draws last.
    assert_eq!(geo.legend[0].label, "USA");
    let usa_line = geo.lines.iter().find(|l| l.name == "USA").unwrap();
    assert_eq!(usa_line.color, geo.legend[0].color);
}

#[test]
fn legend_cardinality_matches_distinct_categories() {
    let mut records = scenario_records();
    records.push(
        Record::new(2021, "JPN")
            .with_metric("Gold", 27.0)
            .with_metric("Silver", 14.0)
            .with_metric("Bronze", 17.0),
    );
    let series = pivot_year(&records, &FilterState::for_year(2021), &keys());
    let geo = parallel_layout(&series, &keys(), "Gold", &LayoutConfig::default());
    assert_eq!(geo.legend.len(), 3);

    let stream = stream_layout(
        &year_series(&records, &FilterState::default(), "Gold", 10),
        &LayoutConfig::default(),
    );
    assert_eq!(stream.legend.len(), 3);
    assert_eq!(stream.legend.len(), stream.bands.len());
}

#[test]
fn stream_legend_order_is_assignment_order() {
    let records = vec![
        Record::new(2012, "GBR").with_metric("Gold", 29.0),
        Record::new(2012, "USA").with_metric("Gold", 46.0),
        Record::new(2021, "GBR").with_metric("Gold", 22.0),
        Record::new(2021, "USA").with_metric("Gold", 39.0),
    ];
    let geo = stream_layout(
        &year_series(&records, &FilterState::default(), "Gold", 10),
        &LayoutConfig::default(),
    );
    let labels: Vec<&str> = geo.legend.iter().map(|e| e.label.as_str()).collect();
    assert_eq!(labels, ["GBR", "USA"]);
}

#[test]
fn pixel_paths_stay_inside_the_canvas() {
    let cfg = LayoutConfig::with_size(800, 480);
    let series = pivot_year(&scenario_records(), &FilterState::for_year(2021), &keys());
    let geo = parallel_layout(&series, &keys(), "Gold", &cfg);
    for line in &geo.lines {
        for &(x, y) in &line.points {
            assert!(x >= 0.0 && x <= 800.0);
            assert!(y >= 0.0 && y <= 480.0);
        }
    }
}
