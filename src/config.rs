use std::env;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::analysis::filter::{clamp_year, DEFAULT_YEAR_MAX, DEFAULT_YEAR_MIN};

/// Fallback marker colors when an institution doesn't set one.
pub const DEFAULT_COLOR_A: &str = "#2563eb";
pub const DEFAULT_COLOR_B: &str = "#059669";

/// Central configuration loaded from environment variables.
///
/// The .env file is loaded automatically at startup via dotenvy. The
/// comparison itself (which institutions exist, where their files live) is
/// a separate JSON file, see `CompareConfig`.
pub struct Config {
    /// Path to the comparison JSON.
    pub config_path: PathBuf,
    /// Base directory for relative dataset paths.
    pub data_dir: PathBuf,
    /// Fixed embedding seed (TANDEM_SEED). Unset means a fresh seed per run.
    pub seed: Option<u64>,
    /// Where markdown and JSON reports are written.
    pub output_dir: PathBuf,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Everything has a default; only a malformed TANDEM_SEED is an error.
    pub fn load() -> Result<Self> {
        let config_path = env::var("TANDEM_CONFIG")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("./compare_config.json"));

        let data_dir = match env::var("TANDEM_DATA_DIR") {
            Ok(dir) => PathBuf::from(dir),
            Err(_) => config_path
                .parent()
                .map(Path::to_path_buf)
                .unwrap_or_else(|| PathBuf::from(".")),
        };

        let seed = match env::var("TANDEM_SEED") {
            Ok(raw) if !raw.trim().is_empty() => Some(
                raw.trim()
                    .parse::<u64>()
                    .with_context(|| format!("TANDEM_SEED must be an unsigned integer, got '{raw}'"))?,
            ),
            _ => None,
        };

        Ok(Self {
            config_path,
            data_dir,
            seed,
            output_dir: env::var("TANDEM_OUTPUT_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("output")),
        })
    }

    /// Read and validate the comparison JSON named by `config_path`.
    pub fn load_comparison(&self) -> Result<CompareConfig> {
        CompareConfig::load(&self.config_path)
    }
}

/// One institution's data package locations, as written in the JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InstitutionConfig {
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub color: Option<String>,
    /// Roster CSV.
    pub roster: String,
    /// Optional per-author publication CSV.
    #[serde(default)]
    pub per_author: Option<String>,
    /// Deduplicated publication CSV.
    pub dedup: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct RawDefaults {
    #[serde(rename = "A")]
    a: Option<String>,
    #[serde(rename = "B")]
    b: Option<String>,
    #[serde(rename = "yearMin")]
    year_min: Option<f64>,
    #[serde(rename = "yearMax")]
    year_max: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct RawCompareConfig {
    schools: Map<String, Value>,
    #[serde(default)]
    defaults: Option<RawDefaults>,
}

/// Resolved starting selection.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompareDefaults {
    pub a: String,
    pub b: String,
    pub year_min: i32,
    pub year_max: i32,
}

/// The comparison config: institutions in file order plus defaults.
#[derive(Debug, Clone)]
pub struct CompareConfig {
    institutions: Vec<(String, InstitutionConfig)>,
    pub defaults: CompareDefaults,
}

impl CompareConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read comparison config {}", path.display()))?;
        Self::from_json(&text).with_context(|| format!("Invalid comparison config {}", path.display()))
    }

    pub fn from_json(text: &str) -> Result<Self> {
        let raw: RawCompareConfig = serde_json::from_str(text).context("Failed to parse JSON")?;

        let mut institutions = Vec::with_capacity(raw.schools.len());
        for (key, value) in raw.schools {
            let mut institution: InstitutionConfig = serde_json::from_value(value)
                .with_context(|| format!("Invalid entry for institution '{key}'"))?;
            if institution.label.trim().is_empty() {
                institution.label = key.clone();
            }
            institutions.push((key, institution));
        }

        let first = match institutions.first() {
            Some((key, _)) => key.clone(),
            None => anyhow::bail!("No institutions configured under \"schools\""),
        };
        let second = institutions
            .get(1)
            .map(|(key, _)| key.clone())
            .unwrap_or_else(|| first.clone());

        let raw_defaults = raw.defaults.unwrap_or_default();
        let defaults = CompareDefaults {
            a: raw_defaults.a.filter(|k| !k.is_empty()).unwrap_or(first),
            b: raw_defaults.b.filter(|k| !k.is_empty()).unwrap_or(second),
            year_min: clamp_year(raw_defaults.year_min.unwrap_or(0.0), DEFAULT_YEAR_MIN),
            year_max: clamp_year(raw_defaults.year_max.unwrap_or(0.0), DEFAULT_YEAR_MAX),
        };

        let config = Self {
            institutions,
            defaults,
        };
        config.institution(&config.defaults.a)?;
        config.institution(&config.defaults.b)?;
        Ok(config)
    }

    /// Look up an institution by key.
    pub fn institution(&self, key: &str) -> Result<&InstitutionConfig> {
        match self.institutions.iter().find(|(k, _)| k == key) {
            Some((_, institution)) => Ok(institution),
            None => anyhow::bail!(
                "Unknown institution '{}'. Configured: {}",
                key,
                self.keys().collect::<Vec<_>>().join(", ")
            ),
        }
    }

    /// Institution keys in file order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.institutions.iter().map(|(k, _)| k.as_str())
    }

    pub fn institutions(&self) -> &[(String, InstitutionConfig)] {
        &self.institutions
    }
}
