use std::collections::HashMap;
use crate::models::{Course, NumberKey, TimetableRecord};

/// Índice del timetable por (subj, num).
///
/// Cada lista conserva el orden original del timetable, de modo que recorrer
/// sólo las coincidencias de un curso produce exactamente las mismas
/// inserciones en `periods`/`terms_offered` que recorrer el timetable completo.
#[derive(Debug, Default)]
pub struct TimetableIndex<'a> {
    by_subj: HashMap<&'a str, HashMap<NumberKey, Vec<&'a TimetableRecord>>>,
    records: usize,
}

impl<'a> TimetableIndex<'a> {
    pub fn build(timetable: &'a [TimetableRecord]) -> Self {
        let mut by_subj: HashMap<&'a str, HashMap<NumberKey, Vec<&'a TimetableRecord>>> = HashMap::new();
        for record in timetable {
            by_subj
                .entry(record.subj.as_str())
                .or_default()
                .entry(record.num.key())
                .or_default()
                .push(record);
        }
        TimetableIndex { by_subj, records: timetable.len() }
    }

    /// Registros cuyo (subj, num) coincide con el curso, en orden de timetable.
    pub fn matches(&self, course: &Course) -> &[&'a TimetableRecord] {
        self.by_subj
            .get(course.department.as_str())
            .and_then(|by_num| by_num.get(&course.number.key()))
            .map(|v| v.as_slice())
            .unwrap_or(&[])
    }

    pub(crate) fn len(&self) -> usize {
        self.records
    }
}
