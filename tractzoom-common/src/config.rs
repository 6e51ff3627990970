//! Configuration loading and resolution
//!
//! Bootstrap configuration comes from a single TOML file. The file itself is
//! located with the following priority order:
//! 1. Command-line argument (highest priority)
//! 2. Environment variable (`TRACTZOOM_CONFIG`)
//! 3. Per-user config file (`~/.config/tractzoom/config.toml`)
//! 4. Compiled defaults (fallback)
//!
//! Every field has a built-in default, so an empty file is a valid config.

use crate::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Environment variable naming an explicit config file
pub const CONFIG_ENV_VAR: &str = "TRACTZOOM_CONFIG";

/// Bootstrap configuration loaded from TOML file
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TomlConfig {
    /// Score table (CSV, one row per tract)
    pub score_csv: PathBuf,

    /// Census tract boundaries (GeoJSON FeatureCollection)
    pub census_geojson: PathBuf,

    /// Directory receiving both output layers
    pub output_dir: PathBuf,

    /// File name of the high zoom layer inside `output_dir`
    pub high_file_name: String,

    /// File name of the low zoom layer inside `output_dir`
    pub low_file_name: String,

    /// Column and property names
    pub fields: FieldNames,

    /// Bucketing parameters
    pub bucketing: BucketingConfig,

    /// Logging configuration (optional)
    pub logging: LoggingConfig,
}

/// Names of the columns read from the inputs and written to the outputs
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FieldNames {
    /// Tract identifier column of the score CSV
    pub score_tract_field: String,

    /// Tract identifier property of the census GeoJSON (also written to
    /// the high zoom layer)
    pub geoid_field: String,

    /// Land area property of the census GeoJSON
    pub land_field: String,

    /// Score column of the score CSV
    pub score_field: String,

    /// Score property name on both output layers
    pub score_output_field: String,
}

/// Parameters of the bucket assignment
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct BucketingConfig {
    /// Starting bucket count; grows during refinement
    pub initial_bucket_count: usize,

    /// Refinement stops once `sum(scores) % bucket_size` is at or below this
    pub homogeneity_threshold: f64,

    /// States with this many tracts or fewer are kept at high zoom
    pub high_zoom_tract_threshold: usize,

    /// Refinement iteration cap (defaults to the bucketing pool size)
    pub max_refinement_iterations: Option<usize>,

    /// Decimal places kept on low zoom scores
    pub score_decimals: u32,
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,
}

impl Default for TomlConfig {
    fn default() -> Self {
        Self {
            score_csv: PathBuf::from("data/score/csv/tiles/usa.csv"),
            census_geojson: PathBuf::from("data/census/geojson/us.json"),
            output_dir: PathBuf::from("data/score/geojson"),
            high_file_name: "usa-high.json".to_string(),
            low_file_name: "usa-low.json".to_string(),
            fields: FieldNames::default(),
            bucketing: BucketingConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Default for FieldNames {
    fn default() -> Self {
        Self {
            score_tract_field: "GTF".to_string(),
            geoid_field: "GEOID10".to_string(),
            land_field: "ALAND10".to_string(),
            score_field: "P_IND".to_string(),
            score_output_field: "P_IND".to_string(),
        }
    }
}

impl Default for BucketingConfig {
    fn default() -> Self {
        Self {
            initial_bucket_count: 10,
            homogeneity_threshold: 200.0,
            high_zoom_tract_threshold: 150,
            max_refinement_iterations: None,
            score_decimals: 2,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl TomlConfig {
    /// Parse configuration from TOML text
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: TomlConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a file that must exist
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::Config(format!("Read config {} failed: {}", path.display(), e))
        })?;
        Self::from_toml_str(&content)
            .map_err(|e| Error::Config(format!("Parse config {} failed: {}", path.display(), e)))
    }

    /// Resolve and load configuration
    ///
    /// An explicit path (CLI or environment) must be readable. The per-user
    /// file is optional: when absent, compiled defaults are used. Returns
    /// the file the configuration came from, if any.
    pub fn resolve(cli_arg: Option<&Path>) -> Result<(Self, Option<PathBuf>)> {
        // Priority 1: Command-line argument
        if let Some(path) = cli_arg {
            return Ok((Self::load(path)?, Some(path.to_path_buf())));
        }

        // Priority 2: Environment variable
        if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
            let path = PathBuf::from(path);
            return Ok((Self::load(&path)?, Some(path)));
        }

        // Priority 3: Per-user config file
        if let Some(path) = user_config_path() {
            if path.exists() {
                return Ok((Self::load(&path)?, Some(path)));
            }
        }

        // Priority 4: Compiled defaults
        Ok((Self::default(), None))
    }

    /// Reject values the pipeline cannot run with
    pub fn validate(&self) -> Result<()> {
        if self.bucketing.initial_bucket_count == 0 {
            return Err(Error::Config(
                "initial_bucket_count must be at least 1".to_string(),
            ));
        }
        if !self.bucketing.homogeneity_threshold.is_finite() {
            return Err(Error::Config(
                "homogeneity_threshold must be finite".to_string(),
            ));
        }
        if self.bucketing.max_refinement_iterations == Some(0) {
            return Err(Error::Config(
                "max_refinement_iterations must be at least 1".to_string(),
            ));
        }

        let names = [
            ("score_tract_field", &self.fields.score_tract_field),
            ("geoid_field", &self.fields.geoid_field),
            ("land_field", &self.fields.land_field),
            ("score_field", &self.fields.score_field),
            ("score_output_field", &self.fields.score_output_field),
        ];
        for (key, value) in names {
            if value.trim().is_empty() {
                return Err(Error::Config(format!("{} must not be empty", key)));
            }
        }

        if self.high_file_name.trim().is_empty() || self.low_file_name.trim().is_empty() {
            return Err(Error::Config("output file names must not be empty".to_string()));
        }
        if self.high_file_name == self.low_file_name {
            return Err(Error::Config(
                "high and low zoom layers must use different file names".to_string(),
            ));
        }

        Ok(())
    }

    /// Full path of the high zoom layer
    pub fn high_zoom_path(&self) -> PathBuf {
        self.output_dir.join(&self.high_file_name)
    }

    /// Full path of the low zoom layer
    pub fn low_zoom_path(&self) -> PathBuf {
        self.output_dir.join(&self.low_file_name)
    }
}

/// Get per-user configuration file path for the platform
fn user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("tractzoom").join("config.toml"))
}
