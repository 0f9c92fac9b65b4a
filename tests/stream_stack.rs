use podium::layout::{LayoutConfig, stream_layout};
use podium::models::{FilterState, Record, YearSeries};
use podium::transform::year_series;

fn medals_2012_2021() -> Vec<Record> {
    let mut out = Vec::new();
    for (country, golds) in [
        ("USA", [46.0, 46.0, 39.0]),
        ("CHN", [38.0, 26.0, 38.0]),
        ("GBR", [29.0, 27.0, 22.0]),
        ("RUS", [20.0, 19.0, 20.0]),
    ] {
        for (i, year) in [2012, 2016, 2021].into_iter().enumerate() {
            out.push(Record::new(year, country).with_metric("Gold", golds[i]));
        }
    }
    out
}

fn series() -> Vec<YearSeries> {
    year_series(&medals_2012_2021(), &FilterState::default(), "Gold", 10)
}

#[test]
fn bands_partition_the_stack_at_every_year() {
    let geo = stream_layout(&series(), &LayoutConfig::default());
    assert_eq!(geo.bands.len(), 4);

    let n_years = geo.bands[0].points.len();
    for j in 0..n_years {
        // Contiguity: each band's upper edge is the next band's lower edge.
        for w in geo.bands.windows(2) {
            let below = &w[0].points[j];
            let above = &w[1].points[j];
            assert!(
                (below.upper - above.lower).abs() < 1e-9,
                "gap or overlap at year index {j}"
            );
        }
        // Sum of band heights equals total stack height.
        let heights: f64 = geo
            .bands
            .iter()
            .map(|b| b.points[j].upper - b.points[j].lower)
            .sum();
        let total = geo.bands.last().unwrap().points[j].upper
            - geo.bands.first().unwrap().points[j].lower;
        assert!((heights - total).abs() < 1e-9);
    }
}

#[test]
fn band_heights_match_input_values() {
    let s = series();
    let geo = stream_layout(&s, &LayoutConfig::default());
    for band in &geo.bands {
        let input = s.iter().find(|x| x.country == band.country).unwrap();
        for (p, &(year, v)) in band.points.iter().zip(&input.points) {
            assert_eq!(p.year, year);
            assert!((p.upper - p.lower - v).abs() < 1e-9);
        }
    }
}

#[test]
fn y_scale_covers_all_accumulated_bounds() {
    let geo = stream_layout(&series(), &LayoutConfig::default());
    let (dmin, dmax) = geo.y.domain;
    for band in &geo.bands {
        for p in &band.points {
            assert!(p.lower >= dmin - 1e-9 && p.upper <= dmax + 1e-9);
        }
    }
}

#[test]
fn default_universe_is_first_seen_order() {
    let out = year_series(&medals_2012_2021(), &FilterState::default(), "Gold", 2);
    let names: Vec<&str> = out.iter().map(|s| s.country.as_str()).collect();
    assert_eq!(names, ["USA", "CHN"]);
}

#[test]
fn missing_years_contribute_zero_height_bands() {
    let records = vec![
        Record::new(2012, "USA").with_metric("Gold", 46.0),
        Record::new(2021, "USA").with_metric("Gold", 39.0),
        Record::new(2012, "CHN").with_metric("Gold", 38.0),
    ];
    let s = year_series(&records, &FilterState::default(), "Gold", 10);
    let geo = stream_layout(&s, &LayoutConfig::default());
    let chn = geo.bands.iter().find(|b| b.country == "CHN").unwrap();
    let at_2016 = chn.points.iter().find(|p| p.year == 2016).unwrap();
    assert!((at_2016.upper - at_2016.lower).abs() < 1e-9);
}

#[test]
fn empty_input_degrades_to_empty_geometry() {
    let geo = stream_layout(&[], &LayoutConfig::default());
    assert!(geo.bands.is_empty());
    assert!(geo.shapes.is_empty());
    assert!(geo.legend.is_empty());
}
