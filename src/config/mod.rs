//! Configuration module
//!
//! Configuration types and loading for the dialer statistics pipeline.

mod defaults;
mod loading;
mod types;
mod validation;

pub use loading::{
    ConfigSource, apply_env_overrides_from, create_default_config, has_env_overrides,
    load_config, load_config_from_env, load_config_with_fallback, parse_config,
};
pub use types::{AggregatorConfig, Config, PayloadLayout, SourceConfig};

pub use defaults::{channel_capacity, history_points, window_size};
