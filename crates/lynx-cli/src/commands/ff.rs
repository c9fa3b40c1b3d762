use crate::cli::{FfArgs, FfCommands};
use crate::config::{FileConfig, resolve_library};
use crate::error::{CliError, Result};
use lynx::forcefield::{ForceField, Severity, ValidationReport, resolve_forcefield_path};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

pub fn run(args: FfArgs, file_config: &FileConfig) -> Result<()> {
    match args.command {
        FfCommands::Validate {
            forcefield,
            library,
            strict,
        } => {
            let path = locate(&forcefield, library.as_deref(), file_config);
            handle_validate(&path, strict)
        }
        FfCommands::Show {
            forcefield,
            library,
        } => {
            let path = locate(&forcefield, library.as_deref(), file_config);
            handle_show(&path)
        }
        FfCommands::Normalize {
            forcefield,
            library,
            output,
        } => {
            let path = locate(&forcefield, library.as_deref(), file_config);
            handle_normalize(&path, &output)
        }
    }
}

fn locate(name: &str, library: Option<&Path>, file_config: &FileConfig) -> PathBuf {
    let library = resolve_library(library, file_config);
    let path = resolve_forcefield_path(name, Some(&library));
    info!("Using force field file {:?}", path);
    path
}

fn handle_validate(path: &Path, strict: bool) -> Result<()> {
    let ff = ForceField::load(path)?;
    let report = ff.validate();

    print_summary(path, &ff);
    print_report(&report);

    let failed = !report.is_valid() || (strict && report.warning_count() > 0);
    if failed {
        return Err(CliError::Validation {
            errors: report.error_count(),
            warnings: report.warning_count(),
        });
    }
    println!("✓ {} is valid.", path.display());
    Ok(())
}

fn handle_show(path: &Path) -> Result<()> {
    let ff = ForceField::load(path)?;
    print_summary(path, &ff);

    println!();
    println!(
        "{:<12} {:<10} {:<8} {:>10}  {}",
        "TYPE", "CLASS", "ELEMENT", "MASS", "DESCRIPTION"
    );
    for atom_type in &ff.atom_types {
        println!(
            "{:<12} {:<10} {:<8} {:>10.5}  {}",
            atom_type.name,
            atom_type.class,
            atom_type.element.as_deref().unwrap_or("-"),
            atom_type.mass,
            atom_type.description.as_deref().unwrap_or("")
        );
    }
    Ok(())
}

fn handle_normalize(path: &Path, output: &Path) -> Result<()> {
    let ff = ForceField::load(path)?;
    let report = ff.validate();
    if report.warning_count() > 0 {
        warn!(
            "{} has {} validation warning(s); writing it anyway.",
            path.display(),
            report.warning_count()
        );
    }
    ff.save(output)?;
    println!(
        "✓ Wrote {} parameter record(s) to {}",
        ff.parameter_count(),
        output.display()
    );
    Ok(())
}

fn print_summary(path: &Path, ff: &ForceField) {
    println!("Force field: {}", path.display());
    if let Some(name) = &ff.name {
        println!("  name            {}", name);
    }
    if let Some(version) = &ff.version {
        println!("  version         {}", version);
    }
    if let Some(rule) = &ff.combining_rule {
        println!("  combining rule  {}", rule);
    }
    println!("  atom types      {}", ff.atom_types.len());
    println!("  classes         {}", ff.classes().len());
    println!("  bonds           {}", ff.bonds.len());
    println!("  angles          {}", ff.angles.len());
    println!("  torsions        {}", ff.torsions.len());
    match &ff.nonbonded {
        Some(nb) => println!(
            "  nonbonded       {} (coulomb14scale {}, lj14scale {})",
            nb.atoms.len(),
            nb.coulomb14scale,
            nb.lj14scale
        ),
        None => println!("  nonbonded       none"),
    }
}

fn print_report(report: &ValidationReport) {
    if report.issues.is_empty() {
        return;
    }
    println!();
    for issue in &report.issues {
        let marker = match issue.severity() {
            Severity::Error => "✗",
            Severity::Warning => "!",
        };
        println!("  {} [{}] {}", marker, issue.severity(), issue);
    }
    println!(
        "\n{} error(s), {} warning(s)",
        report.error_count(),
        report.warning_count()
    );
}
