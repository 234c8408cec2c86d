use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use crate::config::TermConfig;
use crate::models::{Course, MergeCounters};

/// Resumen de una pasada de merge.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MergeReport {
    pub generated_at: DateTime<Utc>,
    pub courses_total: usize,
    pub courses_offered: usize,
    pub timetable_records: usize,
    pub timetable_updated: Option<String>,
    pub terms: TermConfig,
    pub counters: MergeCounters,
}

impl MergeReport {
    pub fn new(courses: &[Course], timetable_records: usize, terms: &TermConfig, counters: MergeCounters) -> Self {
        MergeReport {
            generated_at: Utc::now(),
            courses_total: courses.len(),
            courses_offered: courses.iter().filter(|c| c.offered).count(),
            timetable_records,
            timetable_updated: None,
            terms: terms.clone(),
            counters,
        }
    }

    pub fn with_timetable_updated(mut self, updated: Option<&str>) -> Self {
        self.timetable_updated = updated.map(|s| s.to_string());
        self
    }

    /// Lines printed at the end of a CLI run.
    pub fn summary_lines(&self) -> Vec<String> {
        vec![
            format!("Winter Patches: {}", self.counters.winter_patch),
            format!("New Sections: {}", self.counters.new_sections),
            format!("New Courses: {}", self.counters.new_courses),
        ]
    }

    pub fn log(&self) {
        log::info!(
            "merge finished: {} courses ({} offered in {}), {} timetable records",
            self.courses_total,
            self.courses_offered,
            self.terms.current_label,
            self.timetable_records
        );
        log::info!(
            "counters: new_sections={} new_courses={} winter_patch={}",
            self.counters.new_sections,
            self.counters.new_courses,
            self.counters.winter_patch
        );
    }
}
