use dipolar::core::io::dipole_file::LoadOptions;
use dipolar::engine::config::PipelineConfig;
use std::path::PathBuf;

/// Fully resolved settings for one `compute` invocation.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub input_path: PathBuf,
    pub output_path: PathBuf,
    pub load: LoadOptions,
    pub pipeline: PipelineConfig,
    pub verify: bool,
}
