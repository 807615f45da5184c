//! Shared types, error model, and configuration for Rinku.
//!
//! This crate is the foundation depended on by all other Rinku crates.
//! It provides:
//! - [`RinkuError`] — the unified error type
//! - Pipeline definition types ([`PipelineDef`], [`StepDef`], [`RunId`])
//! - Configuration ([`AppConfig`], config loading)

pub mod config;
pub mod error;
pub mod types;

// Re-export public API at crate root for ergonomic imports.
pub use config::{
    AppConfig, DefaultsConfig, OutputFormat, PipelineEntry, config_dir, config_file_path,
    init_config, init_config_in, load_config, load_config_from,
};
pub use error::{Result, RinkuError};
pub use types::{DEFAULT_SEED_NAME, PipelineDef, RunId, StepDef};
