//! Configuration management for studyviz

pub mod loader;
pub mod settings;
pub mod validation;

pub use loader::{ConfigError, ConfigLoader};
pub use settings::{
    ChartOutputConfig, ChartsConfig, Config, InputConfig, LoggingConfig, OutputConfig,
    PaletteName, ReferenceConfig, StyleConfig,
};
