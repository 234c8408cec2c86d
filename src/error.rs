use std::path::PathBuf;
use thiserror::Error;

/// Errores del flujo carga -> merge -> escritura.
///
/// El algoritmo de agregación en sí no falla; todo lo que puede fallar está
/// alrededor (lectura de archivos, JSON mal formado, configuración de términos).
#[derive(Error, Debug)]
pub enum MergeError {
    #[error("IO error on '{}': {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid JSON in '{}': {source}", .path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("configuration error: {0}")]
    Config(String),
    #[error("course number must be finite, got {0}")]
    NonFiniteNumber(f64),
    #[error("serialization failed: {0}")]
    Serialize(#[from] serde_json::Error),
}

impl MergeError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        MergeError::Io { path: path.into(), source }
    }

    pub fn json(path: impl Into<PathBuf>, source: serde_json::Error) -> Self {
        MergeError::Json { path: path.into(), source }
    }

    /// True when the error comes from the caller's input rather than from
    /// the environment. `server` answers 400 for these and 500 otherwise.
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            MergeError::Json { .. } | MergeError::Config(_) | MergeError::NonFiniteNumber(_)
        )
    }
}


pub type Result<T> = std::result::Result<T, MergeError>;
