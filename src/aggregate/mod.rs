// Merge del catálogo con el timetable.
//
// Para cada curso se recorren sus coincidencias en el timetable y se acumulan
// períodos, la marca `offered` y las etiquetas de `terms_offered`. Los
// contadores se devuelven como valor; no hay estado global.

mod index;

pub use index::TimetableIndex;

use crate::config::TermConfig;
use crate::models::{Course, MergeCounters, TimetableRecord};

/// Procesa un curso contra una secuencia de registros del timetable.
///
/// `records` puede ser el timetable completo o sólo las coincidencias del
/// índice: el predicado (subj, num) se vuelve a comprobar aquí. `periods` y
/// `offered` se reinician; `terms_offered` se conserva y se extiende.
pub fn merge_course<'r, I>(mut course: Course, records: I, terms: &TermConfig) -> (Course, MergeCounters)
where
    I: IntoIterator<Item = &'r TimetableRecord>,
{
    let mut counters = MergeCounters::default();
    let mut seen_current = false;

    course.periods = None;
    course.offered = false;

    for record in records {
        if !course.matches(record) {
            continue;
        }
        log::debug!(
            "Found matching course: {}{} and {}{}",
            record.subj, record.num, course.department, course.number
        );

        if record.term == terms.current_code {
            counters.new_sections += 1;
            if !seen_current {
                counters.new_courses += 1;
                seen_current = true;
            }
            push_unique(&mut course.periods, &record.period);
            course.offered = true;
            insert_front_unique(&mut course.terms_offered, &terms.current_label);
        } else if record.term == terms.prior_code {
            counters.winter_patch += 1;
            insert_front_unique(&mut course.terms_offered, &terms.prior_label);
        }
    }

    (course, counters)
}

/// Pasada completa, secuencial, en el orden de entrada de los cursos.
pub fn aggregate(
    courses: Vec<Course>,
    timetable: &[TimetableRecord],
    terms: &TermConfig,
) -> (Vec<Course>, MergeCounters) {
    let index = TimetableIndex::build(timetable);
    merge_all(courses, &index, terms)
}

/// Igual que [`aggregate`] pero repartiendo los cursos en bloques contiguos
/// entre `workers` hilos (0 = uno por CPU). Cada bloque acumula sus propios
/// contadores y al final se suman; el orden de salida es el de entrada.
pub fn aggregate_parallel(
    courses: Vec<Course>,
    timetable: &[TimetableRecord],
    terms: &TermConfig,
    workers: usize,
) -> (Vec<Course>, MergeCounters) {
    let workers = if workers == 0 { num_cpus::get() } else { workers }.max(1);
    if workers == 1 || courses.len() < 2 {
        return aggregate(courses, timetable, terms);
    }

    let index = TimetableIndex::build(timetable);
    let chunks = split_chunks(courses, workers);
    log::debug!(
        "aggregate_parallel: {} chunks over {} workers, {} timetable records indexed",
        chunks.len(),
        workers,
        index.len()
    );

    let partials: Vec<(Vec<Course>, MergeCounters)> = std::thread::scope(|scope| {
        let index = &index;
        let handles: Vec<_> = chunks
            .into_iter()
            .map(|chunk| scope.spawn(move || merge_all(chunk, index, terms)))
            .collect();
        handles
            .into_iter()
            .map(|h| h.join().unwrap_or_else(|payload| std::panic::resume_unwind(payload)))
            .collect()
    });

    let mut merged = Vec::with_capacity(partials.iter().map(|(c, _)| c.len()).sum());
    let mut counters = MergeCounters::default();
    for (chunk, partial) in partials {
        merged.extend(chunk);
        counters += partial;
    }
    (merged, counters)
}

fn merge_all(courses: Vec<Course>, index: &TimetableIndex<'_>, terms: &TermConfig) -> (Vec<Course>, MergeCounters) {
    let mut counters = MergeCounters::default();
    let mut out = Vec::with_capacity(courses.len());
    for course in courses {
        let matches = index.matches(&course).iter().copied();
        let (merged, partial) = merge_course(course, matches, terms);
        counters += partial;
        out.push(merged);
    }
    (out, counters)
}

fn split_chunks(mut courses: Vec<Course>, parts: usize) -> Vec<Vec<Course>> {
    let size = courses.len().div_ceil(parts).max(1);
    let mut chunks = Vec::with_capacity(parts);
    while !courses.is_empty() {
        let tail = courses.split_off(size.min(courses.len()));
        chunks.push(courses);
        courses = tail;
    }
    chunks
}

fn push_unique(list: &mut Option<Vec<String>>, value: &str) {
    match list {
        None => *list = Some(vec![value.to_string()]),
        Some(items) => {
            if !items.iter().any(|p| p == value) {
                items.push(value.to_string());
            }
        }
    }
}

// Las etiquetas nuevas van al frente, no al final.
fn insert_front_unique(list: &mut Option<Vec<String>>, label: &str) {
    match list {
        None => *list = Some(vec![label.to_string()]),
        Some(items) => {
            if !items.iter().any(|t| t == label) {
                items.insert(0, label.to_string());
            }
        }
    }
}
