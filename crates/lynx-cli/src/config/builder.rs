use super::defaults::DefaultsConfig;
use super::file::FileConfig;
use super::models::GenerateConfig;
use crate::cli::GenerateArgs;
use crate::error::{CliError, Result};
use lynx::provision::ProvisionSettings;
use lynx::surface::{Dimensions, GenerationParams, Stoichiometry};
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Reads the configuration file, if any, and applies `--set` overrides.
pub fn load_file_config(path: Option<&Path>, set_values: &[String]) -> Result<FileConfig> {
    let file_config = if let Some(config_path) = path {
        FileConfig::from_file(config_path)?
    } else {
        FileConfig::default()
    };
    apply_set_values(file_config, set_values)
}

pub fn resolve_library(cli_arg: Option<&Path>, file_config: &FileConfig) -> PathBuf {
    cli_arg
        .map(Path::to_path_buf)
        .or_else(|| {
            file_config
                .forcefield
                .as_ref()
                .and_then(|f| f.library.clone())
        })
        .unwrap_or_else(|| DefaultsConfig::default().library)
}

pub fn build_generate_config(args: &GenerateArgs, file_config: &FileConfig) -> Result<GenerateConfig> {
    let defaults = DefaultsConfig::default().generation;
    let file = file_config.generate.clone().unwrap_or_default();

    let stoichiometry = match &args.stoichiometry {
        Some(raw) => Stoichiometry::from_str(raw)?,
        None => file.stoichiometry.unwrap_or(defaults.stoichiometry),
    };
    let dimensions = match &args.dimensions {
        Some(raw) => Dimensions::from_str(raw)?,
        None => file.dimensions.unwrap_or(defaults.dimensions),
    };
    let bonds_periodic = if args.no_periodic_bonds {
        false
    } else {
        file.bonds_periodic.unwrap_or(defaults.bonds_periodic)
    };

    let params = GenerationParams {
        stoichiometry,
        dimensions,
        template: args
            .template
            .clone()
            .or(file.template)
            .unwrap_or(defaults.template),
        organic: file.organic.unwrap_or(defaults.organic),
        crystal_separation: args
            .crystal_separation
            .or(file.crystal_separation)
            .unwrap_or(defaults.crystal_separation),
        z_box_size: args
            .z_box_size
            .or(file.z_box_size)
            .unwrap_or(defaults.z_box_size),
        bonds_periodic,
        number_of_organic_mols: args
            .number_of_organic_mols
            .or(file.number_of_organic_mols)
            .unwrap_or(defaults.number_of_organic_mols),
        forcefield: args.forcefield.clone().or(file.forcefield).or(defaults.forcefield),
    };
    params.check()?;

    Ok(GenerateConfig {
        params,
        seed: args.seed.or(file.seed),
        library: resolve_library(args.library.as_deref(), file_config),
        output: args.output.clone(),
    })
}

pub fn build_provision_settings(file_config: &FileConfig) -> ProvisionSettings {
    let defaults = DefaultsConfig::default().provision;
    let file = file_config.ci.clone().unwrap_or_default();
    ProvisionSettings {
        branch_variable: file.branch_variable.unwrap_or(defaults.branch_variable),
        environment_name: file.environment_name.unwrap_or(defaults.environment_name),
        environment_file: file.environment_file.unwrap_or(defaults.environment_file),
        package: file.package.unwrap_or(defaults.package),
        protected_branch: file.protected_branch.unwrap_or(defaults.protected_branch),
    }
}

fn parse_value<T: FromStr>(key: &str, value_str: &str, kind: &str) -> Result<T> {
    value_str.parse().map_err(|_| {
        CliError::Config(format!("Invalid {} value for {}: {}", kind, key, value_str))
    })
}

fn apply_set_values(mut config: FileConfig, set_values: &[String]) -> Result<FileConfig> {
    for kv_pair in set_values {
        let Some((key, value_str)) = kv_pair.split_once('=') else {
            return Err(CliError::Config(format!(
                "Invalid --set format: '{}'. Expected KEY=VALUE.",
                kv_pair
            )));
        };

        match key {
            "forcefield.library" => {
                config
                    .forcefield
                    .get_or_insert_with(Default::default)
                    .library = Some(PathBuf::from(value_str));
            }
            "generate.stoichiometry" => {
                config
                    .generate
                    .get_or_insert_with(Default::default)
                    .stoichiometry = Some(value_str.parse()?);
            }
            "generate.dimensions" => {
                config.generate.get_or_insert_with(Default::default).dimensions =
                    Some(value_str.parse()?);
            }
            "generate.template" => {
                config.generate.get_or_insert_with(Default::default).template =
                    Some(value_str.to_string());
            }
            "generate.organic" => {
                config.generate.get_or_insert_with(Default::default).organic =
                    Some(value_str.to_string());
            }
            "generate.number-of-organic-mols" => {
                config
                    .generate
                    .get_or_insert_with(Default::default)
                    .number_of_organic_mols = Some(parse_value(key, value_str, "integer")?);
            }
            "generate.crystal-separation" => {
                config
                    .generate
                    .get_or_insert_with(Default::default)
                    .crystal_separation = Some(parse_value(key, value_str, "float")?);
            }
            "generate.z-box-size" => {
                config.generate.get_or_insert_with(Default::default).z_box_size =
                    Some(parse_value(key, value_str, "float")?);
            }
            "generate.bonds-periodic" => {
                config
                    .generate
                    .get_or_insert_with(Default::default)
                    .bonds_periodic = Some(parse_value(key, value_str, "boolean")?);
            }
            "generate.forcefield" => {
                config.generate.get_or_insert_with(Default::default).forcefield =
                    Some(value_str.to_string());
            }
            "generate.seed" => {
                config.generate.get_or_insert_with(Default::default).seed =
                    Some(parse_value(key, value_str, "integer")?);
            }
            "ci.branch-variable" => {
                config.ci.get_or_insert_with(Default::default).branch_variable =
                    Some(value_str.to_string());
            }
            "ci.environment-name" => {
                config.ci.get_or_insert_with(Default::default).environment_name =
                    Some(value_str.to_string());
            }
            "ci.environment-file" => {
                config.ci.get_or_insert_with(Default::default).environment_file =
                    Some(value_str.to_string());
            }
            "ci.protected-branch" => {
                config.ci.get_or_insert_with(Default::default).protected_branch =
                    Some(value_str.to_string());
            }
            "ci.package" => {
                config.ci.get_or_insert_with(Default::default).package =
                    Some(value_str.to_string());
            }
            _ => {
                return Err(CliError::Config(format!(
                    "Unsupported configuration key for --set: '{}'",
                    key
                )));
            }
        }
    }
    Ok(config)
}
