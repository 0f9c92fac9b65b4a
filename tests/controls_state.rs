use podium::{Controls, Record, SelectionPhase};

fn feed() -> Vec<Record> {
    vec![
        Record::new(2012, "USA").with_metric("Gold", 46.0),
        Record::new(2012, "CHN").with_metric("Gold", 38.0),
        Record::new(2016, "USA").with_metric("Gold", 46.0),
        Record::new(2016, "GBR").with_metric("Gold", 27.0),
        Record::new(2021, "USA").with_metric("Gold", 39.0),
        Record::new(2021, "JPN").with_metric("Gold", 27.0),
    ]
}

#[test]
fn year_dropdown_is_descending_and_starts_recent() {
    let c = Controls::new(&feed());
    assert_eq!(c.year_options(), &[2021, 2016, 2012]);
    assert_eq!(c.selected_year(), Some(2021));
}

#[test]
fn country_options_track_the_selected_year() {
    let mut c = Controls::new(&feed());
    assert_eq!(c.country_options(), &["USA".to_string(), "JPN".to_string()]);
    c.set_year(2016);
    assert_eq!(c.country_options(), &["USA".to_string(), "GBR".to_string()]);
}

#[test]
fn apply_is_the_only_commit_transition() {
    let mut c = Controls::new(&feed());
    assert_eq!(c.phase(), SelectionPhase::Applied);

    c.stage_country("USA");
    c.stage_country("JPN");
    c.unstage_country("JPN");
    assert_eq!(c.phase(), SelectionPhase::Editing);
    assert!(c.filter_state().selected_countries.is_empty());

    c.apply();
    assert_eq!(c.phase(), SelectionPhase::Applied);
    let committed = c.filter_state().selected_countries;
    assert_eq!(committed.len(), 1);
    assert!(committed.contains("USA"));
}

#[test]
fn empty_feed_has_no_year() {
    let c = Controls::new(&[]);
    assert_eq!(c.selected_year(), None);
    assert!(c.year_options().is_empty());
    assert!(c.country_options().is_empty());
}
