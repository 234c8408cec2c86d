use offermerge::pipeline::{run_diff, run_merge, MergeJob};
use offermerge::report::MergeReport;
use offermerge::{MergeCounters, TermConfig};
use std::fs;
use tempfile::tempdir;

#[test]
fn test_run_merge_end_to_end() {
    let dir = tempdir().unwrap();
    let courses = dir.path().join("coursesUpdated.json");
    let timetable = dir.path().join("timetable20S.json");
    let output = dir.path().join("coursesUpdatedUpdated.json");
    let report_path = dir.path().join("report.json");

    fs::write(
        &courses,
        r#"[
            {"department": "CS", "number": 1, "terms_offered": ["19F"]},
            {"department": "CS", "number": 10, "terms_offered": null},
            {"department": "HIST", "number": 3, "terms_offered": null}
        ]"#,
    )
    .unwrap();
    fs::write(
        &timetable,
        r#"{"courses": [
            {"subj": "CS", "num": 1, "term": 202003, "period": "10"},
            {"subj": "CS", "num": 1, "term": 202003, "period": "2"},
            {"subj": "CS", "num": 10, "term": 202001, "period": "11"}
        ], "total": 3, "updated": "2020-02-20 12:00:00"}"#,
    )
    .unwrap();

    for workers in [1usize, 2] {
        let job = MergeJob {
            courses: courses.clone(),
            timetable: timetable.clone(),
            output: output.clone(),
            terms: TermConfig::default(),
            workers,
            report: Some(report_path.clone()),
            pretty: true,
        };
        let report = run_merge(&job).expect("merge debe completar");
        assert_eq!(report.counters, MergeCounters { new_sections: 2, new_courses: 1, winter_patch: 1 });
        assert_eq!(report.courses_total, 3);
        assert_eq!(report.courses_offered, 1);
        assert_eq!(report.timetable_records, 3);
        assert_eq!(report.timetable_updated.as_deref(), Some("2020-02-20 12:00:00"));

        let written: serde_json::Value = serde_json::from_str(&fs::read_to_string(&output).unwrap()).unwrap();
        assert_eq!(written[0]["periods"], serde_json::json!(["10", "2"]));
        assert_eq!(written[0]["terms_offered"], serde_json::json!(["20S", "19F"]));
        assert_eq!(written[1]["terms_offered"], serde_json::json!(["20W"]));
        assert_eq!(written[2]["terms_offered"], serde_json::Value::Null);

        let saved: MergeReport = serde_json::from_str(&fs::read_to_string(&report_path).unwrap()).unwrap();
        assert_eq!(saved.counters, report.counters);
        assert_eq!(
            report.summary_lines(),
            vec!["Winter Patches: 1", "New Sections: 2", "New Courses: 1"]
        );
    }
}

#[test]
fn test_run_merge_propagates_load_errors() {
    let dir = tempdir().unwrap();
    let job = MergeJob {
        courses: dir.path().join("missing.json"),
        timetable: dir.path().join("missing-too.json"),
        output: dir.path().join("out.json"),
        terms: TermConfig::default(),
        workers: 1,
        report: None,
        pretty: false,
    };
    assert!(run_merge(&job).is_err());
    assert!(!dir.path().join("out.json").exists());
}

#[test]
fn test_run_diff_writes_output() {
    let dir = tempdir().unwrap();
    let previous = dir.path().join("prev.json");
    let next = dir.path().join("next.json");
    let out = dir.path().join("diff.json");
    fs::write(&previous, r#"[{"subj": "CS", "num": 1, "term": 202003, "period": "10", "crn": 1}]"#).unwrap();
    fs::write(&next, r#"[{"subj": "CS", "num": 1, "term": 202003, "period": "2", "crn": 1}]"#).unwrap();

    let result = run_diff(&previous, &next, Some(out.as_path())).unwrap();
    assert_eq!(result.changed.len(), 1);
    let written: serde_json::Value = serde_json::from_str(&fs::read_to_string(&out).unwrap()).unwrap();
    assert_eq!(written["changed"]["1"]["changed"], serde_json::json!(["period"]));

    // null frente a ausente no se normaliza
    fs::write(&previous, r#"[{"subj": "CS", "num": 1, "term": 202003, "period": null, "crn": 1}]"#).unwrap();
    fs::write(&next, r#"[{"subj": "CS", "num": 1, "term": 202003, "crn": 1}]"#).unwrap();
    let result = run_diff(&previous, &next, None).unwrap();
    assert_eq!(result.changed[&1].removed, vec!["period"]);
}
