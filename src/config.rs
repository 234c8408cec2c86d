//! Term configuration and environment lookup.
//!
//! Values resolve as: explicit override (CLI flag / request body) > environment
//! (`.env` honored through `dotenv`) > built-in default. Environment access goes
//! through a lookup closure so callers (and tests) can inject their own source.

use crate::error::{MergeError, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub const ENV_CURRENT_TERM: &str = "OFFERMERGE_CURRENT_TERM";
pub const ENV_PRIOR_TERM: &str = "OFFERMERGE_PRIOR_TERM";
pub const ENV_CURRENT_LABEL: &str = "OFFERMERGE_CURRENT_LABEL";
pub const ENV_PRIOR_LABEL: &str = "OFFERMERGE_PRIOR_LABEL";
pub const ENV_DATA_DIR: &str = "OFFERMERGE_DATA_DIR";
pub const ENV_BIND: &str = "OFFERMERGE_BIND";

pub const DEFAULT_CURRENT_TERM: i64 = 202003;
pub const DEFAULT_PRIOR_TERM: i64 = 202001;
pub const DEFAULT_DATA_DIR: &str = "data";
pub const DEFAULT_BIND: &str = "127.0.0.1:8080";

/// The two term codes the merge distinguishes, plus the labels written into
/// `terms_offered` for each.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TermConfig {
    pub current_code: i64,
    pub prior_code: i64,
    pub current_label: String,
    pub prior_label: String,
}

impl Default for TermConfig {
    fn default() -> Self {
        TermConfig {
            current_code: DEFAULT_CURRENT_TERM,
            prior_code: DEFAULT_PRIOR_TERM,
            current_label: "20S".to_string(),
            prior_label: "20W".to_string(),
        }
    }
}

/// Partial term settings as they arrive from the CLI or an HTTP body.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TermOverrides {
    #[serde(default)]
    pub current_code: Option<i64>,
    #[serde(default)]
    pub prior_code: Option<i64>,
    #[serde(default)]
    pub current_label: Option<String>,
    #[serde(default)]
    pub prior_label: Option<String>,
}

impl TermConfig {
    /// Build a config from two codes, deriving both labels.
    pub fn new(current_code: i64, prior_code: i64) -> Result<Self> {
        let current_label = term_label(current_code)?;
        let prior_label = term_label(prior_code)?;
        Self::with_labels(current_code, prior_code, &current_label, &prior_label)
    }

    pub fn with_labels(
        current_code: i64,
        prior_code: i64,
        current_label: &str,
        prior_label: &str,
    ) -> Result<Self> {
        if current_code == prior_code {
            return Err(MergeError::Config(format!(
                "current and prior term codes must differ (both are {})",
                current_code
            )));
        }
        if current_label.trim().is_empty() || prior_label.trim().is_empty() {
            return Err(MergeError::Config("term labels must not be empty".to_string()));
        }
        if current_label == prior_label {
            log::warn!(
                "current and prior terms share the label '{}'; prior-term matches will not add a separate entry",
                current_label
            );
        }
        Ok(TermConfig {
            current_code,
            prior_code,
            current_label: current_label.to_string(),
            prior_label: prior_label.to_string(),
        })
    }

    /// Resolve overrides against `lookup` (environment-like source) and defaults.
    pub fn resolve<F>(overrides: &TermOverrides, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let current_code = match overrides.current_code {
            Some(c) => c,
            None => parse_code(ENV_CURRENT_TERM, lookup(ENV_CURRENT_TERM))?.unwrap_or(DEFAULT_CURRENT_TERM),
        };
        let prior_code = match overrides.prior_code {
            Some(c) => c,
            None => parse_code(ENV_PRIOR_TERM, lookup(ENV_PRIOR_TERM))?.unwrap_or(DEFAULT_PRIOR_TERM),
        };

        let current_label = match pick_label(overrides.current_label.as_deref(), lookup(ENV_CURRENT_LABEL)) {
            Some(l) => l,
            None => term_label(current_code)?,
        };
        let prior_label = match pick_label(overrides.prior_label.as_deref(), lookup(ENV_PRIOR_LABEL)) {
            Some(l) => l,
            None => term_label(prior_code)?,
        };

        Self::with_labels(current_code, prior_code, &current_label, &prior_label)
    }

    /// Apply request-level overrides on top of an already resolved config. A
    /// label not given explicitly follows its code: kept when the code is
    /// unchanged, derived again when the code was overridden.
    pub fn merged_with(&self, overrides: &TermOverrides) -> Result<Self> {
        let current_code = overrides.current_code.unwrap_or(self.current_code);
        let prior_code = overrides.prior_code.unwrap_or(self.prior_code);

        let current_label = match overrides.current_label.as_deref().filter(|s| !s.trim().is_empty()) {
            Some(l) => l.to_string(),
            None if current_code == self.current_code => self.current_label.clone(),
            None => term_label(current_code)?,
        };
        let prior_label = match overrides.prior_label.as_deref().filter(|s| !s.trim().is_empty()) {
            Some(l) => l.to_string(),
            None if prior_code == self.prior_code => self.prior_label.clone(),
            None => term_label(prior_code)?,
        };

        Self::with_labels(current_code, prior_code, &current_label, &prior_label)
    }

    /// Same as [`TermConfig::resolve`] reading the process environment after
    /// loading `.env` if present.
    pub fn from_env(overrides: &TermOverrides) -> Result<Self> {
        load_dotenv();
        Self::resolve(overrides, |k| std::env::var(k).ok())
    }
}

fn pick_label(explicit: Option<&str>, from_env: Option<String>) -> Option<String> {
    explicit
        .map(|s| s.to_string())
        .or(from_env)
        .filter(|s| !s.trim().is_empty())
}

fn parse_code(var: &str, raw: Option<String>) -> Result<Option<i64>> {
    match raw {
        Some(s) if !s.trim().is_empty() => s
            .trim()
            .parse::<i64>()
            .map(Some)
            .map_err(|e| MergeError::Config(format!("{} must be an integer term code: {}", var, e))),
        _ => Ok(None),
    }
}

/// Short label for a registrar term code: `YYYYMM` -> two-digit year plus a
/// season letter (01 W, 03 S, 06 X, 09 F). `202003` -> `"20S"`.
pub fn term_label(code: i64) -> Result<String> {
    let year = code / 100;
    let season = match code % 100 {
        1 => 'W',
        3 => 'S',
        6 => 'X',
        9 => 'F',
        other => {
            return Err(MergeError::Config(format!(
                "cannot derive a label for term code {} (unknown month {:02}); pass the label explicitly",
                code, other
            )))
        }
    };
    if year <= 0 {
        return Err(MergeError::Config(format!("invalid term code {}", code)));
    }
    Ok(format!("{:02}{}", year % 100, season))
}

/// Directory used to resolve relative data file names.
pub fn data_dir<F>(lookup: F) -> PathBuf
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(ENV_DATA_DIR) {
        Some(p) if !p.trim().is_empty() => PathBuf::from(p),
        _ => PathBuf::from(DEFAULT_DATA_DIR),
    }
}

/// Bind address for `serve` when no flag is given.
pub fn bind_address() -> String {
    load_dotenv();
    std::env::var(ENV_BIND).unwrap_or_else(|_| DEFAULT_BIND.to_string())
}

// load .env if present
pub fn load_dotenv() {
    let _ = dotenv::dotenv();
}
