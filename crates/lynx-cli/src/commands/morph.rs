use crate::cli::{MorphArgs, MorphCommands};
use crate::error::Result;
use lynx::morphology::Morphology;
use std::path::Path;
use tracing::info;

pub fn run(args: MorphArgs) -> Result<()> {
    match args.command {
        MorphCommands::FixImages { input, output } => {
            handle_fix_images(&input, output.as_deref().unwrap_or(&input))
        }
        MorphCommands::Wrap { input, output } => {
            handle_wrap(&input, output.as_deref().unwrap_or(&input))
        }
    }
}

fn handle_fix_images(input: &Path, output: &Path) -> Result<()> {
    info!("Loading morphology from {:?}", input);
    let mut morphology = Morphology::load(input)?;
    let summary = morphology.fix_images()?;
    morphology.save(output)?;
    println!(
        "✓ Repaired {} periodic bond(s) ({} atom move(s)); written to {}",
        summary.stretched_bonds,
        summary.moved_atoms,
        output.display()
    );
    Ok(())
}

fn handle_wrap(input: &Path, output: &Path) -> Result<()> {
    info!("Loading morphology from {:?}", input);
    let mut morphology = Morphology::load(input)?;
    morphology.wrap_positions()?;
    morphology.save(output)?;
    println!(
        "✓ Wrapped {} atom(s); written to {}",
        morphology.atom_count(),
        output.display()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    const SPLIT_DIMER: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<hoomd_xml version="1.6">
<configuration time_step="0">
<box lx="10" ly="10" lz="10"/>
<position>
4.5 0 0
-4.5 0 0
</position>
<type>
C
C
</type>
<bond>
C-C 0 1
</bond>
</configuration>
</hoomd_xml>
"#;

    #[test]
    fn fix_images_rewrites_file_in_place() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("dimer.hoomdxml");
        fs::write(&path, SPLIT_DIMER).unwrap();

        handle_fix_images(&path, &path).unwrap();

        let fixed = Morphology::load(&path).unwrap();
        assert_eq!(fixed.images().unwrap(), vec![[0, 0, 0], [1, 0, 0]]);
        let positions = fixed.positions().unwrap();
        assert!((positions[1].x - (-4.5)).abs() < 1e-12);
    }

    #[test]
    fn wrap_writes_to_separate_output() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("in.hoomdxml");
        let output = dir.path().join("out.hoomdxml");
        fs::write(&input, SPLIT_DIMER.replace("4.5 0 0\n-4.5", "14.5 0 0\n-4.5")).unwrap();

        handle_wrap(&input, &output).unwrap();

        let wrapped = Morphology::load(&output).unwrap();
        assert_eq!(wrapped.images().unwrap()[0], [1, 0, 0]);
        // The input is untouched.
        assert!(fs::read_to_string(&input).unwrap().contains("14.5 0 0"));
    }

    #[test]
    fn missing_input_is_an_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("missing.hoomdxml");
        assert!(handle_wrap(&path, &path).is_err());
    }
}
