use crate::cli::GenerateArgs;
use crate::config::{FileConfig, GenerateConfig, build_generate_config};
use crate::error::{CliError, Result};
use lynx::forcefield::{ForceField, resolve_forcefield_path};
use lynx::morphology::Morphology;
use lynx::surface::{Compound, assemble_system, build_surface, output_file_name};
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

pub fn run(args: GenerateArgs, file_config: &FileConfig) -> Result<()> {
    info!("Merging configuration from file and CLI arguments...");
    let config = build_generate_config(&args, file_config)?;
    debug!("Generation parameters: {:?}", config.params);
    let output = generate(&config)?;
    println!("✓ System written to: {}", output.display());
    Ok(())
}

fn generate(config: &GenerateConfig) -> Result<PathBuf> {
    let params = &config.params;

    if let Some(name) = &params.forcefield {
        let path = resolve_forcefield_path(name, Some(&config.library));
        info!("Validating force field {:?}", path);
        let ff = ForceField::load_validated(&path)?;
        info!(
            "Force field accepted: {} atom types, {} parameter records.",
            ff.atom_types.len(),
            ff.parameter_count()
        );
    }

    let template_path = Path::new(&params.template);
    info!("Loading unit-cell template from {:?}", template_path);
    let template = Morphology::load(template_path).map_err(|e| CliError::FileParsing {
        path: template_path.to_path_buf(),
        source: e.into(),
    })?;
    let template = Compound::from_morphology(&template)?;

    let mut rng = match config.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    let bottom = build_surface(
        &template,
        params.dimensions,
        &params.stoichiometry,
        params.bonds_periodic,
        &mut rng,
    )?;
    let top = build_surface(
        &template,
        params.dimensions,
        &params.stoichiometry,
        params.bonds_periodic,
        &mut rng,
    )?;
    let system = assemble_system(
        bottom,
        top,
        params.crystal_separation,
        params.z_box_size,
        params.dimensions,
    );

    if params.number_of_organic_mols > 0 {
        warn!(
            "Packing {} x {} between the plates is not performed; the system contains the plates only.",
            params.number_of_organic_mols, params.organic
        );
    }

    let mut morphology = system.to_morphology();
    let summary = morphology.fix_images()?;
    debug!("Image repair: {:?}", summary);

    let output = config
        .output
        .clone()
        .unwrap_or_else(|| PathBuf::from(output_file_name(params, "hoomdxml")));
    morphology.save(&output)?;
    info!(
        "Wrote {} particles and {} bonds to {:?}",
        morphology.atom_count(),
        system.compound.bonds.len(),
        output
    );
    Ok(output)
}
