use crate::error::{CliError, Result};
use lynx::surface::{Dimensions, Stoichiometry};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::debug;

/// The on-disk TOML configuration. Every key is optional; absent keys fall
/// through to the built-in defaults.
#[derive(Deserialize, Debug, Default, Clone)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    pub forcefield: Option<FileForceFieldConfig>,
    pub generate: Option<FileGenerateConfig>,
    pub ci: Option<FileCiConfig>,
}

#[derive(Deserialize, Debug, Default, Clone)]
#[serde(deny_unknown_fields)]
pub struct FileForceFieldConfig {
    pub library: Option<PathBuf>,
}

#[derive(Deserialize, Debug, Default, Clone)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
pub struct FileGenerateConfig {
    pub stoichiometry: Option<Stoichiometry>,
    pub dimensions: Option<Dimensions>,
    pub template: Option<String>,
    pub organic: Option<String>,
    pub crystal_separation: Option<f64>,
    pub z_box_size: Option<f64>,
    pub bonds_periodic: Option<bool>,
    pub number_of_organic_mols: Option<usize>,
    pub forcefield: Option<String>,
    pub seed: Option<u64>,
}

#[derive(Deserialize, Debug, Default, Clone)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
pub struct FileCiConfig {
    pub branch_variable: Option<String>,
    pub environment_name: Option<String>,
    pub environment_file: Option<String>,
    pub package: Option<String>,
    pub protected_branch: Option<String>,
}

impl FileConfig {
    pub fn from_file(path: &Path) -> Result<Self> {
        debug!("Loading configuration from file: {:?}", path);
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content).map_err(|e| CliError::FileParsing {
            path: path.to_path_buf(),
            source: e.into(),
        })
    }

    pub fn from_toml_str(content: &str) -> std::result::Result<Self, toml::de::Error> {
        toml::from_str(content)
    }
}
