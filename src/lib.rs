// Biblioteca raíz del crate `offermerge`.
// Reexporta los módulos principales; `pipeline::run_merge` orquesta el flujo
// completo carga -> merge -> escritura.
pub mod aggregate;
pub mod config;
pub mod diff;
pub mod error;
pub mod io;
pub mod models;
pub mod pipeline;
pub mod report;
pub mod server;

pub use aggregate::{aggregate, aggregate_parallel, merge_course, TimetableIndex};
pub use config::{TermConfig, TermOverrides};
pub use error::MergeError;
pub use models::{Course, CourseNumber, MergeCounters, NumberKey, TimetableDocument, TimetableRecord};

/// Ejecuta el servidor HTTP (reexport para facilitar uso desde `main`)
pub use server::run_server;
