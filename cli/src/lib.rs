use outline::{BlurMethod, OutlineParameters};

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum OutlineCliError {
    #[error(transparent)]
    SerdeError(#[from] serde_json::Error),
    #[error(transparent)]
    TomlDeError(#[from] toml::de::Error),
    #[error(transparent)]
    TomlSerError(#[from] toml::ser::Error),
    #[error(transparent)]
    IoError(#[from] std::io::Error),
    #[error("Job '{0}' has an empty input path")]
    MissingInput(String),
    #[error("Duplicate job name '{0}'")]
    DuplicateJob(String),
    #[error("Unsupported file format. Please use .toml or .json files")]
    UnsupportedFileFormat,
}

/// One image to outline
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct OutlineJob {
    pub name: String,
    pub input: String,
    /// Output file name inside the batch output directory; generated when absent
    pub output: Option<String>,
    #[serde(default)]
    pub parameters: OutlineParameters,
}

/// Batch configuration
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct OutlineBatch {
    pub output_dir: String,
    #[serde(default)]
    pub blur: BlurMethod,
    pub jobs: Vec<OutlineJob>,
}

impl OutlineBatch {
    /// Load OutlineBatch configuration from a TOML file
    pub fn from_toml_file<P: AsRef<Path>>(path: P) -> Result<Self, OutlineCliError> {
        let content = fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Load OutlineBatch configuration from TOML string
    pub fn from_toml(content: &str) -> Result<Self, OutlineCliError> {
        let batch: OutlineBatch = toml::from_str(content)?;
        batch.validate()?;
        Ok(batch)
    }

    /// Load OutlineBatch configuration from a JSON file
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self, OutlineCliError> {
        let content = fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    /// Load OutlineBatch configuration from JSON string
    pub fn from_json(content: &str) -> Result<Self, OutlineCliError> {
        let batch: OutlineBatch = serde_json::from_str(content)?;
        batch.validate()?;
        Ok(batch)
    }

    /// Auto-detect file format and load configuration
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, OutlineCliError> {
        let path_ref = path.as_ref();
        match path_ref.extension().and_then(|ext| ext.to_str()) {
            Some("toml") => Self::from_toml_file(path),
            Some("json") => Self::from_json_file(path),
            _ => Err(OutlineCliError::UnsupportedFileFormat),
        }
    }

    /// Convert OutlineBatch to TOML string
    pub fn to_toml(&self) -> Result<String, OutlineCliError> {
        Ok(toml::to_string_pretty(&self)?)
    }

    /// Convert OutlineBatch to JSON string
    pub fn to_json(&self) -> Result<String, OutlineCliError> {
        Ok(serde_json::to_string_pretty(&self)?)
    }

    fn validate(&self) -> Result<(), OutlineCliError> {
        let mut seen = std::collections::HashSet::new();
        for job in &self.jobs {
            if job.input.trim().is_empty() {
                return Err(OutlineCliError::MissingInput(job.name.clone()));
            }
            if !seen.insert(job.name.as_str()) {
                return Err(OutlineCliError::DuplicateJob(job.name.clone()));
            }
        }
        Ok(())
    }

    /// Where a job's result is written
    pub fn output_path(&self, job: &OutlineJob) -> PathBuf {
        let file_name = job
            .output
            .clone()
            .unwrap_or_else(|| format!("{}.png", job.name));
        Path::new(&self.output_dir).join(file_name)
    }
}

/// Resolve `--output`: directories get a generated, parameter-stamped file name
pub fn resolve_output_path(output: &Path, params: &OutlineParameters) -> PathBuf {
    if output.is_dir() {
        output.join(outline::io::default_export_file_name(params))
    } else {
        output.to_path_buf()
    }
}
