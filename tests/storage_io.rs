use podium::storage;
use podium::Record;
use std::fs;

fn sample(n: usize) -> Vec<Record> {
    (0..n)
        .map(|i| {
            Record::new(2000 + i as i32, "DEU")
                .with_metric("Gold", 10.0 + i as f64)
                .with_metric("Silver", 5.0 + i as f64)
        })
        .collect()
}

#[test]
fn save_csv_and_json() {
    let rows = sample(3);
    let tmp = tempfile::tempdir().unwrap();

    let csv_path = tmp.path().join("podium_test.csv");
    storage::save_csv(&rows, &csv_path).unwrap();
    let csv_txt = fs::read_to_string(&csv_path).unwrap();
    assert!(csv_txt.starts_with("year,country,"));
    assert_eq!(csv_txt.lines().count(), 1 + rows.len());

    let json_path = tmp.path().join("podium_test.json");
    storage::save_json(&rows, &json_path).unwrap();
    let json_txt = fs::read_to_string(&json_path).unwrap();
    let v: serde_json::Value = serde_json::from_str(&json_txt).unwrap();
    assert_eq!(v.as_array().unwrap().len(), rows.len());
}

#[test]
fn load_round_trips_preserve_records() {
    let rows = sample(4);
    let tmp = tempfile::tempdir().unwrap();

    let csv_path = tmp.path().join("roundtrip.csv");
    storage::save_csv(&rows, &csv_path).unwrap();
    assert_eq!(storage::load_csv(&csv_path).unwrap(), rows);

    let json_path = tmp.path().join("roundtrip.json");
    storage::save_json(&rows, &json_path).unwrap();
    assert_eq!(storage::load_json(&json_path).unwrap(), rows);
}

#[test]
fn ragged_metric_columns_stay_sparse() {
    let rows = vec![
        Record::new(2021, "USA").with_metric("Gold", 39.0),
        Record::new(2021, "CHN")
            .with_metric("Gold", 38.0)
            .with_metric("Bronze", 18.0),
    ];
    let tmp = tempfile::tempdir().unwrap();
    let path = tmp.path().join("ragged.csv");
    storage::save_csv(&rows, &path).unwrap();
    let back = storage::load_csv(&path).unwrap();
    assert_eq!(back[0].metric("Bronze"), None);
    assert_eq!(back[1].metric("Bronze"), Some(18.0));
}

#[test]
fn malformed_csv_value_is_an_error() {
    let tmp = tempfile::tempdir().unwrap();
    let path = tmp.path().join("bad.csv");
    fs::write(&path, "year,country,Gold\n2021,USA,not-a-number\n").unwrap();
    assert!(storage::load_csv(&path).is_err());
}
