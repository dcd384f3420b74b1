//! Shared types, error model, and configuration for nbpress.
//!
//! This crate is the foundation depended on by all other nbpress crates.
//! It provides:
//! - [`NbpressError`], the unified error type
//! - [`ArtifactPaths`], the files touched by one conversion run
//! - Configuration ([`AppConfig`], config loading)

pub mod config;
pub mod error;
pub mod types;

// Re-export public API at crate root for ergonomic imports.
pub use config::{
    AppConfig, DefaultsConfig, PAPER_FORMATS, RenderConfig, ToolsConfig, config_dir,
    config_file_path, init_config, load_config, load_config_from, validate_config,
};
pub use error::{NbpressError, Result};
pub use types::{ArtifactPaths, FILTERED_SUFFIX, filtered_path};
