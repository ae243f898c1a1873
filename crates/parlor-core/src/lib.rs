mod config;
mod engine;
mod error;
mod init;
mod snapshot;

pub use config::{
    EngineConfig, ExportConfig, ProjectConfig, PromptConfig, load_project_config,
};
pub use engine::Engine;
pub use error::CoreError;
pub use snapshot::{ChatSnapshot, load_character, load_snapshot};
