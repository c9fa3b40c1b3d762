use lynx::surface::GenerationParams;
use std::path::PathBuf;

pub struct GenerateConfig {
    pub params: GenerationParams,
    pub seed: Option<u64>,
    pub library: PathBuf,
    pub output: Option<PathBuf>,
}
