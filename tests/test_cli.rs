//! Integration test: CLI commands over local files

use catalog_features::annotate::OutlierMarker;
use catalog_features::cli::{cmd_apply, cmd_prepare, load_data, prepare_table};
use catalog_features::preprocessing::FittedFeatures;
use std::io::Write;
use std::path::Path;

fn write_items(path: &Path, rows: usize, extra_column: bool) {
    let mut file = std::fs::File::create(path).unwrap();
    let header = "id,price,base_price,sold_quantity,date_created,tags,attributes,target";
    if extra_column {
        writeln!(file, "{},seller_nickname", header).unwrap();
    } else {
        writeln!(file, "{}", header).unwrap();
    }
    let brands = ["Acme", "Globex", "Initech"];
    for i in 0..rows {
        let id = if i % 9 == 4 { String::new() } else { i.to_string() };
        let tags = if i % 2 == 0 {
            "\"['good_quality_thumbnail', 'immediate_payment']\""
        } else {
            "\"['dragged_bids_and_visits']\""
        };
        let attributes = format!(
            "\"[{{'name': 'Marca', 'value_name': '{}'}}]\"",
            brands[i % 3]
        );
        let target = u8::from((i * 7) % 10 < 3 + (i % 3) * 2);
        write!(
            file,
            "{},{},{},{},2015-09-{:02}T10:00:00.000Z,{},{},{}",
            id,
            100 + (i % 11) * 10,
            120 + (i % 5) * 10,
            i % 4,
            1 + i % 28,
            tags,
            attributes,
            target
        )
        .unwrap();
        if extra_column {
            write!(file, ",seller_{}", i).unwrap();
        }
        writeln!(file).unwrap();
    }
}

#[test]
fn test_prepare_table_expands_and_annotates() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("items.csv");
    write_items(&path, 12, false);

    let df = load_data(&path).unwrap();
    let table = prepare_table(
        df,
        &["tags".to_string()],
        &["attributes".to_string()],
        &OutlierMarker::default(),
    )
    .unwrap();

    for column in [
        "tags_0",
        "tags_1",
        "Marca",
        "outlier_rule_for_price",
        "inconsistence_rule",
        "date_created_converted",
    ] {
        assert!(table.contains(column), "missing {}", column);
    }
    assert!(!table.contains("tags"));
    assert!(!table.contains("attributes"));
    assert_eq!(table.height(), 12);
}

#[test]
fn test_prepare_then_apply() {
    let dir = tempfile::tempdir().unwrap();
    let train = dir.path().join("train.csv");
    let new = dir.path().join("new.csv");
    let encoded = dir.path().join("encoded.csv");
    let applied = dir.path().join("applied.csv");
    let state = dir.path().join("state.json");
    write_items(&train, 60, false);
    write_items(&new, 10, true);

    let lists = vec!["tags".to_string()];
    let nested = vec!["attributes".to_string()];
    cmd_prepare(&train, "target", &lists, &nested, None, 3.0, &encoded, &state).unwrap();

    let fitted = FittedFeatures::load(&state).unwrap();
    assert!(fitted.model("Marca").is_some());
    assert!(!fitted.schema().contains("target"));

    cmd_apply(&new, &state, &lists, &nested, 3.0, &applied).unwrap();
    let out = load_data(&applied).unwrap();
    assert_eq!(out.height(), 10);
    for name in out.get_column_names() {
        assert!(fitted.schema().contains(name.as_str()), "{} leaked", name);
    }
    assert!(out.column("seller_nickname").is_err());
}

#[test]
fn test_apply_without_state_fails() {
    let dir = tempfile::tempdir().unwrap();
    let data = dir.path().join("new.csv");
    write_items(&data, 5, false);
    let result = cmd_apply(
        &data,
        &dir.path().join("missing.json"),
        &[],
        &[],
        3.0,
        &dir.path().join("out.csv"),
    );
    assert!(result.is_err());
}
