mod builder;
mod defaults;
mod file;
mod models;

pub use builder::{build_generate_config, build_provision_settings, load_file_config, resolve_library};
pub use file::FileConfig;
pub use models::GenerateConfig;
