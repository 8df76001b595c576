pub mod loader;
pub mod schema;

pub use loader::{
    expand_env_string, find_config_file, load_config, load_config_from_file, ConfigFormat,
    ResolvedConfig, CONFIG_ENV, DATA_FILE_ENV,
};
pub use schema::{HopConfig, MatchingSettings};
