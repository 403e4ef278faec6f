#[cfg(feature = "cli")]
pub mod cli;
pub mod toml_config;

#[cfg(feature = "cli")]
pub use cli::{CliConfig, DaemonArgs};
pub use toml_config::{
    ClientConfig, ControlConfig, DaemonConfig, FanConfig, HardwareConfig, PowerConfig,
};
