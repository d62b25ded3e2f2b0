//! Installer configuration
//!
//! Loaded from `vainstall.toml`, either the path given on the command line or
//! `<config_dir>/vainstall/vainstall.toml`. A missing file yields defaults.

pub mod parser;
pub mod schema;
pub mod store;

pub use parser::{parse_config_str, parse_config_toml};
pub use schema::ProvisionConfig;
pub use store::ConfigStore;
