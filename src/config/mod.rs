//! Tool configuration.
//!
//! A small YAML or TOML file naming the store, output, report and parser
//! rules paths. CLI flags override whatever the file sets.

mod loader;
mod path;
mod schema;

pub use loader::{CONFIG_ENV, default_config_paths, find_config, load, load_config, load_config_from_str};
pub use path::{PathResolver, home_dir, resolve_path};
pub use schema::{ConfigFormat, DEFAULT_CSV, DEFAULT_MODELS, DEFAULT_OUTPUT, ToolConfig};
