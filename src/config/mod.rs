// Configuration module
// Public interface for configuration loading

mod loader;
mod settings;

pub use loader::{
    atles_home, default_config_path, load_config, load_config_file, parse_config, CONFIG_ENV_VAR,
};
pub use settings::{BackendConfig, Config, LoggingConfig, TruthSeekingConfig};
