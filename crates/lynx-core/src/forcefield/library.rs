use std::path::{Path, PathBuf};
use tracing::debug;

/// Resolves a force-field name to a file path.
///
/// The name may be given with or without its `.xml` extension. A file of
/// that name inside `library_dir` takes precedence; otherwise the name is
/// resolved relative to the working directory.
pub fn resolve_forcefield_path(name: &str, library_dir: Option<&Path>) -> PathBuf {
    let stem = name.strip_suffix(".xml").unwrap_or(name);
    let file_name = format!("{}.xml", stem);

    if let Some(dir) = library_dir {
        let candidate = dir.join(&file_name);
        if candidate.is_file() {
            debug!("Resolved force field '{}' in library: {:?}", name, candidate);
            return candidate;
        }
    }
    debug!("Force field '{}' not found in library; using working directory.", name);
    PathBuf::from(file_name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn library_file_takes_precedence() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("FF_opls_uff.xml"), "<ForceField/>").unwrap();
        let path = resolve_forcefield_path("FF_opls_uff", Some(dir.path()));
        assert_eq!(path, dir.path().join("FF_opls_uff.xml"));
    }

    #[test]
    fn extension_is_not_duplicated() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("FF_opls_uff.xml"), "<ForceField/>").unwrap();
        let path = resolve_forcefield_path("FF_opls_uff.xml", Some(dir.path()));
        assert_eq!(path, dir.path().join("FF_opls_uff.xml"));
    }

    #[test]
    fn falls_back_to_working_directory() {
        let dir = tempdir().unwrap();
        let path = resolve_forcefield_path("custom", Some(dir.path()));
        assert_eq!(path, PathBuf::from("custom.xml"));
        assert_eq!(resolve_forcefield_path("custom.xml", None), PathBuf::from("custom.xml"));
    }
}
