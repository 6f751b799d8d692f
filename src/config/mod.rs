//! Binary configuration: types, config path resolution and XML loading.

pub mod paths;
pub mod types;
pub mod xml;

pub use paths::{CONFIG_ENV, default_config_path, path_has_symlink_ancestor, resolve_config_path};
pub use types::{Config, LogLevel, parse_mode};
pub use xml::{load_config, load_config_from_xml_path};
