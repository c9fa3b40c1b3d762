use lynx::provision::ProvisionSettings;
use lynx::surface::GenerationParams;
use std::path::PathBuf;

pub struct DefaultsConfig {
    pub generation: GenerationParams,
    pub provision: ProvisionSettings,
    pub library: PathBuf,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            generation: GenerationParams::default(),
            provision: ProvisionSettings::default(),
            library: PathBuf::from("forcefields"),
        }
    }
}
