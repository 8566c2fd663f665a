//! File-backed configuration and step registries for funnel.

pub mod config_service;
pub mod dto;
pub mod paths;
pub mod toml_file;
pub mod toml_registry;

pub use crate::config_service::ConfigService;
pub use crate::paths::{FunnelPaths, PathError};
pub use crate::toml_file::TomlFile;
pub use crate::toml_registry::TomlRegistryLoader;
