// Orquestador: carga -> merge -> escritura -> reporte.

use std::path::{Path, PathBuf};
use crate::aggregate::{aggregate, aggregate_parallel};
use crate::config::TermConfig;
use crate::diff::{diff, TimetableDiff};
use crate::error::Result;
use crate::io::{load_courses, load_timetable, load_timetable_snapshot, write_courses, write_json};
use crate::report::MergeReport;

/// Parámetros de una ejecución de `merge`.
#[derive(Debug, Clone)]
pub struct MergeJob {
    pub courses: PathBuf,
    pub timetable: PathBuf,
    pub output: PathBuf,
    pub terms: TermConfig,
    /// 1 = secuencial, 0 = un hilo por CPU.
    pub workers: usize,
    pub report: Option<PathBuf>,
    pub pretty: bool,
}

pub fn run_merge(job: &MergeJob) -> Result<MergeReport> {
    let courses = load_courses(&job.courses)?;
    let doc = load_timetable(&job.timetable)?;
    let updated = doc.updated().map(|s| s.to_string());
    let timetable = doc.into_records();

    log::info!(
        "merging {} courses against {} timetable records (current {} = {}, prior {} = {})",
        courses.len(),
        timetable.len(),
        job.terms.current_code,
        job.terms.current_label,
        job.terms.prior_code,
        job.terms.prior_label
    );

    let (merged, counters) = if job.workers == 1 {
        aggregate(courses, &timetable, &job.terms)
    } else {
        aggregate_parallel(courses, &timetable, &job.terms, job.workers)
    };

    write_courses(&job.output, &merged, job.pretty)?;

    let report = MergeReport::new(&merged, timetable.len(), &job.terms, counters)
        .with_timetable_updated(updated.as_deref());
    report.log();

    if let Some(path) = &job.report {
        write_json(path, &report, true)?;
        log::info!("report written to {}", path.display());
    }
    Ok(report)
}

/// Diff entre dos snapshots de timetable en disco.
pub fn run_diff(previous: &Path, next: &Path, output: Option<&Path>) -> Result<TimetableDiff> {
    let before = load_timetable_snapshot(previous)?;
    let after = load_timetable_snapshot(next)?;
    let result = diff(&before, &after);
    log::info!(
        "timetable diff: {} added, {} removed, {} changed",
        result.added.len(),
        result.removed.len(),
        result.changed.len()
    );
    if let Some(path) = output {
        write_json(path, &result, true)?;
    }
    Ok(result)
}
