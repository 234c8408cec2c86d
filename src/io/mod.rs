//! Lectura y escritura de los documentos JSON del catálogo y del timetable.
//!
//! - `load_courses`: arreglo de cursos del catálogo
//! - `load_timetable`: timetable del scraper (sobre `{"courses": [...]}`) o arreglo plano
//! - `load_timetable_snapshot`: los mismos registros sin normalizar, para el diff
//! - `write_courses` / `write_json`: persistencia del resultado

use crate::config;
use crate::diff::snapshot_records;
use crate::error::{MergeError, Result};
use crate::models::{Course, TimetableDocument};
use serde::Serialize;
use serde::de::{DeserializeOwned, Error as _};
use serde_json::Value;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// Resuelve un nombre de archivo: si no existe tal cual, se intenta dentro
/// del directorio de datos (`OFFERMERGE_DATA_DIR` o `data/`).
pub fn resolve_data_path<F>(name: &Path, lookup: F) -> PathBuf
where
    F: Fn(&str) -> Option<String>,
{
    if name.exists() || name.is_absolute() {
        return name.to_path_buf();
    }
    let candidate = config::data_dir(lookup).join(name);
    if candidate.exists() {
        log::debug!("resolved '{}' to '{}'", name.display(), candidate.display());
        candidate
    } else {
        name.to_path_buf()
    }
}

fn resolve_env(name: &Path) -> PathBuf {
    config::load_dotenv();
    resolve_data_path(name, |k| std::env::var(k).ok())
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let text = fs::read_to_string(path).map_err(|e| MergeError::io(path, e))?;
    serde_json::from_str::<T>(&text).map_err(|e| MergeError::json(path, e))
}

/// Lee el catálogo de cursos. Un curso sin `department` o `number` hace
/// fallar la carga completa con la posición del error.
pub fn load_courses(path: impl AsRef<Path>) -> Result<Vec<Course>> {
    let resolved = resolve_env(path.as_ref());
    let courses: Vec<Course> = read_json(&resolved)?;
    log::info!("loaded {} courses from {}", courses.len(), resolved.display());
    Ok(courses)
}

/// Lee un timetable en cualquiera de sus dos formas.
pub fn load_timetable(path: impl AsRef<Path>) -> Result<TimetableDocument> {
    let resolved = resolve_env(path.as_ref());
    let doc: TimetableDocument = read_json(&resolved)?;
    match &doc {
        TimetableDocument::Envelope { courses, total, updated } => {
            log::info!(
                "loaded {} timetable records from {} (updated: {})",
                courses.len(),
                resolved.display(),
                updated.as_deref().unwrap_or("unknown")
            );
            if let Some(t) = total {
                if *t != courses.len() {
                    log::warn!("timetable declares total={} but contains {} records", t, courses.len());
                }
            }
        }
        TimetableDocument::Records(records) => {
            log::info!("loaded {} timetable records from {}", records.len(), resolved.display());
        }
    }
    Ok(doc)
}

/// Lee un snapshot de timetable tal como está escrito (sin `null` -> `""`
/// ni campos por defecto).
pub fn load_timetable_snapshot(path: impl AsRef<Path>) -> Result<Vec<Value>> {
    let resolved = resolve_env(path.as_ref());
    let doc: Value = read_json(&resolved)?;
    let records = snapshot_records(doc).ok_or_else(|| {
        MergeError::json(
            &resolved,
            serde_json::Error::custom("expected an array of records or an object with a `courses` array"),
        )
    })?;
    log::info!("loaded {} snapshot records from {}", records.len(), resolved.display());
    Ok(records)
}

/// Serializa cualquier valor a disco, creando el directorio padre si hace falta.
pub fn write_json<T: Serialize + ?Sized>(path: impl AsRef<Path>, value: &T, pretty: bool) -> Result<()> {
    let path = path.as_ref();
    if let Some(dir) = path.parent() {
        if !dir.as_os_str().is_empty() && !dir.exists() {
            fs::create_dir_all(dir).map_err(|e| MergeError::io(dir, e))?;
        }
    }
    let file = File::create(path).map_err(|e| MergeError::io(path, e))?;
    let mut writer = BufWriter::new(file);
    if pretty {
        serde_json::to_writer_pretty(&mut writer, value)?;
    } else {
        serde_json::to_writer(&mut writer, value)?;
    }
    writer.flush().map_err(|e| MergeError::io(path, e))?;
    Ok(())
}

pub fn write_courses(path: impl AsRef<Path>, courses: &[Course], pretty: bool) -> Result<()> {
    write_json(path.as_ref(), courses, pretty)?;
    log::info!("wrote {} courses to {}", courses.len(), path.as_ref().display());
    Ok(())
}
