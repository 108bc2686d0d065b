// bicflow-core/src/infrastructure/config/mod.rs

pub mod pipeline;

pub use crate::domain::configuration::PipelineConfig;
pub use pipeline::{apply_env_overrides, load_or_default, load_pipeline_config, load_pipeline_config_file};
