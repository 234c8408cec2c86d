//! Shallow diff between two timetable snapshots, keyed by CRN.
//!
//! A section is `added` when its CRN only exists in the next snapshot,
//! `removed` when it only exists in the previous one, and `changed` when both
//! have it but at least one field differs.
//!
//! Records are compared as written in the snapshot: `"period": null`,
//! `"period": ""` and a missing `period` are three different states.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::{BTreeMap, BTreeSet};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldChanges {
    pub added: Vec<String>,
    pub removed: Vec<String>,
    pub changed: Vec<String>,
}

impl FieldChanges {
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty() && self.changed.is_empty()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimetableDiff {
    pub added: BTreeSet<i64>,
    pub removed: BTreeSet<i64>,
    pub changed: BTreeMap<i64, FieldChanges>,
    /// Records without a numeric `crn` (or not objects) in either snapshot.
    pub skipped: usize,
}

impl TimetableDiff {
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty() && self.changed.is_empty()
    }
}

/// Registros de un snapshot: arreglo plano o sobre `{"courses": [...]}`.
/// `None` si el documento no tiene ninguna de las dos formas.
pub fn snapshot_records(doc: Value) -> Option<Vec<Value>> {
    match doc {
        Value::Array(records) => Some(records),
        Value::Object(mut map) => match map.remove("courses") {
            Some(Value::Array(records)) => Some(records),
            _ => None,
        },
        _ => None,
    }
}

pub fn diff(previous: &[Value], next: &[Value]) -> TimetableDiff {
    let mut skipped = 0usize;
    let prev = by_crn(previous, &mut skipped);
    let next = by_crn(next, &mut skipped);
    if skipped > 0 {
        log::warn!("{} timetable records have no crn and were left out of the diff", skipped);
    }

    let added: BTreeSet<i64> = next.keys().filter(|crn| !prev.contains_key(*crn)).copied().collect();
    let removed: BTreeSet<i64> = prev.keys().filter(|crn| !next.contains_key(*crn)).copied().collect();

    let mut changed = BTreeMap::new();
    for (crn, before) in prev.iter() {
        if let Some(after) = next.get(crn) {
            let changes = compare_fields(before, after);
            if !changes.is_empty() {
                changed.insert(*crn, changes);
            }
        }
    }

    TimetableDiff { added, removed, changed, skipped }
}

fn by_crn<'a>(records: &'a [Value], skipped: &mut usize) -> BTreeMap<i64, &'a Map<String, Value>> {
    let mut out = BTreeMap::new();
    for record in records.iter().filter_map(Value::as_object) {
        match record.get("crn").and_then(Value::as_i64) {
            // first occurrence wins
            Some(crn) => {
                out.entry(crn).or_insert(record);
            }
            None => *skipped += 1,
        }
    }
    *skipped += records.iter().filter(|r| !r.is_object()).count();
    out
}

fn compare_fields(a: &Map<String, Value>, b: &Map<String, Value>) -> FieldChanges {
    let mut changes = FieldChanges::default();
    for (key, value) in b.iter() {
        match a.get(key) {
            None => changes.added.push(key.clone()),
            Some(old) if old != value => changes.changed.push(key.clone()),
            Some(_) => {}
        }
    }
    for key in a.keys() {
        if !b.contains_key(key) {
            changes.removed.push(key.clone());
        }
    }
    changes
}
