use offermerge::io::{load_courses, load_timetable, load_timetable_snapshot, resolve_data_path, write_courses};
use offermerge::{MergeError, TimetableDocument};
use std::fs;
use std::path::Path;
use tempfile::tempdir;

const CATALOG: &str = r#"[
  {"department": "CS", "number": 1, "name": "Intro", "periods": ["10"], "offered": true, "terms_offered": ["19F"]},
  {"department": "MUS", "number": 7.01, "name": "First-Year Seminar", "distribs": ["ART"]}
]"#;

#[test]
fn test_load_courses_with_optional_fields() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("courses.json");
    fs::write(&path, CATALOG).unwrap();

    let courses = load_courses(&path).expect("debe leer el catálogo");
    assert_eq!(courses.len(), 2);
    assert_eq!(courses[0].department, "CS");
    assert_eq!(courses[0].terms_offered, Some(vec!["19F".to_string()]));
    assert_eq!(courses[1].periods, None);
    assert!(!courses[1].offered);
    assert_eq!(courses[1].extra["distribs"], serde_json::json!(["ART"]));
}

#[test]
fn test_missing_department_is_a_json_error() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("bad.json");
    fs::write(&path, r#"[{"number": 1}]"#).unwrap();

    match load_courses(&path) {
        Err(MergeError::Json { path: p, .. }) => assert_eq!(p, path),
        other => panic!("expected a JSON error, got {:?}", other),
    }
}

#[test]
fn test_missing_file_is_an_io_error() {
    let dir = tempdir().unwrap();
    let err = load_courses(dir.path().join("nope.json")).unwrap_err();
    assert!(matches!(err, MergeError::Io { .. }));
    assert!(!err.is_input_error());
}

#[test]
fn test_timetable_envelope_and_plain_array() {
    let dir = tempdir().unwrap();
    let envelope = dir.path().join("timetable20S.json");
    fs::write(
        &envelope,
        r#"{"courses": [
            {"subj": "CS", "num": 1, "term": 202003, "period": "10", "crn": 31001, "instructors": ["A"]},
            {"subj": "CS", "num": 1, "term": 202001, "period": null, "crn": 31002}
        ], "total": 2, "updated": "2020-03-01 10:00:00"}"#,
    )
    .unwrap();
    let plain = dir.path().join("plain.json");
    fs::write(&plain, r#"[{"subj": "CS", "num": 1, "term": 202003, "period": "10"}]"#).unwrap();

    let doc = load_timetable(&envelope).unwrap();
    assert!(matches!(doc, TimetableDocument::Envelope { .. }));
    assert_eq!(doc.updated(), Some("2020-03-01 10:00:00"));
    let records = doc.into_records();
    assert_eq!(records.len(), 2);
    assert_eq!(records[0].extra["crn"], serde_json::json!(31001));
    assert_eq!(records[1].period, "");

    let doc = load_timetable(&plain).unwrap();
    assert_eq!(doc.updated(), None);
    assert_eq!(doc.into_records().len(), 1);
}

#[test]
fn test_timetable_error_names_the_bad_field() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("timetable.json");
    fs::write(&path, r#"{"courses": [{"subj": "CS", "num": 1, "period": "10"}]}"#).unwrap();

    let err = load_timetable(&path).unwrap_err();
    assert!(matches!(err, MergeError::Json { .. }));
    assert!(err.to_string().contains("term"), "unexpected message: {}", err);

    fs::write(&path, r#"[{"subj": "CS", "num": "one", "term": 202003}]"#).unwrap();
    let err = load_timetable(&path).unwrap_err();
    assert!(!err.to_string().contains("untagged"), "unexpected message: {}", err);
}

#[test]
fn test_snapshot_keeps_records_as_written() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("snapshot.json");
    fs::write(
        &path,
        r#"{"courses": [{"subj": "CS", "num": 1, "term": 202003, "period": null, "crn": 1}], "total": 1}"#,
    )
    .unwrap();
    let records = load_timetable_snapshot(&path).unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0]["period"], serde_json::Value::Null);

    fs::write(&path, r#"{"updated": "2020-03-01"}"#).unwrap();
    let err = load_timetable_snapshot(&path).unwrap_err();
    assert!(err.is_input_error());
}

#[test]
fn test_write_preserves_catalog_fields() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("courses.json");
    fs::write(&input, CATALOG).unwrap();
    let courses = load_courses(&input).unwrap();

    let output = dir.path().join("out/nested/coursesUpdated.json");
    write_courses(&output, &courses, false).unwrap();

    let written: serde_json::Value = serde_json::from_str(&fs::read_to_string(&output).unwrap()).unwrap();
    assert_eq!(written[0]["name"], "Intro");
    assert_eq!(written[0]["number"], serde_json::json!(1));
    assert_eq!(written[1]["number"], serde_json::json!(7.01));
    assert_eq!(written[1]["periods"], serde_json::Value::Null);
    assert_eq!(written[1]["terms_offered"], serde_json::Value::Null);
    assert_eq!(written[1]["offered"], serde_json::json!(false));
}

#[test]
fn test_resolve_data_path_uses_data_dir() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("courses.json"), "[]").unwrap();
    let data_dir = dir.path().to_string_lossy().to_string();
    let lookup = move |k: &str| if k == "OFFERMERGE_DATA_DIR" { Some(data_dir.clone()) } else { None };

    let resolved = resolve_data_path(Path::new("courses.json"), &lookup);
    assert_eq!(resolved, dir.path().join("courses.json"));

    let missing = resolve_data_path(Path::new("missing.json"), &lookup);
    assert_eq!(missing, Path::new("missing.json"));
}
